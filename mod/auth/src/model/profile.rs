use serde::{Deserialize, Serialize};

/// An account, keyed by the canonical account id.
///
/// The stored email encodes the legacy login id by convention:
/// `<legacyId>@<legacy_email_domain>` unless the legacy id already
/// contained an `@`. This struct is the persisted document shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Canonical account identifier (UUIDv4, no dashes).
    pub id: String,

    /// Email address; the primary lookup key for legacy login ids.
    pub email: String,

    /// Display name.
    pub name: String,

    /// Role: `admin` | `manager` | `staff`.
    pub role: String,

    /// Tenant reference. Admins may have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    /// Account status: `active` | `pending_approval` | `disabled`.
    pub status: String,

    /// Argon2id password hash.
    pub password_hash: String,

    /// Contact number, shown on share-link briefings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,

    /// E-signature provider tokens, present while the account is linked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esign: Option<EsignTokens>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Stored provider tokens for a linked e-signature account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsignTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix millis after which the access token is considered stale.
    pub expires_at_ms: i64,
    /// RFC 3339 timestamp of when the account was linked.
    pub linked_at: String,
}

/// Public projection of a Profile — no password hash, no provider tokens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePublic {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub company_id: Option<String>,
    pub status: String,
    pub joined_at: String,
}

impl From<Profile> for ProfilePublic {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            name: p.name,
            role: p.role,
            company_id: p.company_id,
            status: p.status,
            joined_at: p.created_at,
        }
    }
}

/// The user object the frontend works with: legacy login id up front,
/// canonical id as `uid`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedUser {
    /// Legacy login id (email with the configured domain stripped).
    pub id: String,
    /// Canonical account id.
    pub uid: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub company_name: String,
    pub company_id: Option<String>,
    pub status: String,
    /// Whether the e-signature provider is linked.
    pub esign_connected: bool,
}

/// Resolved requester identity used by the authorization guard.
#[derive(Debug, Clone)]
pub struct RequesterProfile {
    pub id: String,
    pub role: String,
    pub company_id: Option<String>,
}

/// Input for creating a new profile.
#[derive(Debug, Clone)]
pub struct CreateProfile {
    pub email: String,
    pub name: String,
    pub role: String,
    pub company_id: Option<String>,
    pub status: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub id: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub id: String,
    pub password: String,
    pub name: String,
    pub company_name: String,
    /// Requested role; the service may override it (first member of a
    /// new company is always the manager).
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffActionRequest {
    pub target_user_id: String,
    /// `approve` | `promote` | `demote`.
    pub action: String,
    pub requester_id: String,
}
