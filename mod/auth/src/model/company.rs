use serde::{Deserialize, Serialize};

/// A tenant. Name is the only user-supplied lookup key, so lookups
/// must tolerate Unicode normalization mismatches (NFC vs NFD) between
/// stored and queried forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,

    /// User-facing, unique tenant name.
    pub name: String,

    /// The founding/primary manager's account id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,

    /// `active` | `disabled`.
    pub status: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// A company search result, enriched with the manager's display name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySearchHit {
    pub id: String,
    pub name: String,
    pub manager_name: String,
    pub created_at: String,
}
