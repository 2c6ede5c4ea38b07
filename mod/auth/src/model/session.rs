use serde::{Deserialize, Serialize};

/// A JWT issuance record. Tokens whose session has been revoked are
/// rejected even before their `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub issued_at: String,
    pub expires_at: String,
    pub revoked: bool,
}

/// JWT claims carried by access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Canonical account id.
    pub sub: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    /// Session id, for revocation checks.
    pub sid: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signed token pair returned by login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
