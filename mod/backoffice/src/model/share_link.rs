use serde::{Deserialize, Serialize};

/// A public briefing link for a property. The token is the public
/// handle; everything else stays server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub id: String,
    pub token: String,
    pub property_id: String,
    /// The staff member who shared the property; their contact details
    /// are shown on the public page.
    pub consultant_id: String,
    /// RFC 3339 expiry.
    pub expires_at: String,
    pub view_count: i64,
    /// Display options: `hideAddress`, `showBriefingPrice`, ...
    #[serde(default)]
    pub options: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareLink {
    pub property_id: String,
    /// Days until expiry; defaults to 7.
    #[serde(default)]
    pub expires_in_days: Option<i64>,
    #[serde(default)]
    pub options: Option<serde_json::Value>,
}
