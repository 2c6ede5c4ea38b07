use serde::{Deserialize, Serialize};

/// Locally cached view of a provider document.
///
/// The provider owns `status` and `name`; `property_id` and `file_key`
/// are local-only overlay fields that survive refreshes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    pub id: String,

    /// Canonical account id of the owner.
    pub user_id: String,

    /// Tenant, denormalized from the owner at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    /// Provider document id.
    pub document_id: String,

    /// Provider lifecycle state: `on_going`, `completed`, `canceled`,
    /// `rejected`, `expired`, `trashed`.
    pub status: String,

    pub name: String,

    /// Local link to a property record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,

    /// Blob key of the downloaded signed PDF.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_key: Option<String>,

    pub created_at: String,
    pub updated_at: String,

    /// When the signed PDF was stored locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub contract_id: String,
}

/// What the on-demand sync managed to do. The flow is deliberately
/// non-transactional: each step is reported on its own.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub status: String,
    pub status_updated: bool,
    pub file_saved: bool,
    pub property_linked: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub contract_id: String,
    /// `cancel` | `remind` | `delete` | `destroy` | `restore` |
    /// `permanent_delete` | `extend_expiry`.
    pub action: String,
    /// Optional message forwarded with `cancel`.
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFromTemplateRequest {
    pub template_id: String,
    pub document_name: String,
    /// Participant/field payload forwarded to the provider untouched.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Optional local property link for the cached row.
    #[serde(default)]
    pub property_id: Option<String>,
}
