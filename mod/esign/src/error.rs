use thiserror::Error;

/// E-signature module error type.
#[derive(Debug, Error)]
pub enum EsignError {
    /// The provider rejected the stored credentials; the account must
    /// re-run the authorization flow.
    #[error("{0}")]
    NeedAuth(String),

    /// Provider answered 402: no signing points left on the account.
    #[error("{0}")]
    PointsExhausted(String),

    /// Any other provider-side failure, carrying the provider's
    /// message.
    #[error("provider: {0}")]
    Upstream(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<EsignError> for realdesk_core::ServiceError {
    fn from(e: EsignError) -> Self {
        match e {
            EsignError::NeedAuth(m) => realdesk_core::ServiceError::NeedAuth(m),
            EsignError::PointsExhausted(m) => realdesk_core::ServiceError::PointsExhausted(m),
            EsignError::Upstream(m) => realdesk_core::ServiceError::Upstream(m),
            EsignError::NotFound(m) => realdesk_core::ServiceError::NotFound(m),
            EsignError::Validation(m) => realdesk_core::ServiceError::Validation(m),
            EsignError::Unauthorized(m) => realdesk_core::ServiceError::Unauthorized(m),
            EsignError::Storage(m) => realdesk_core::ServiceError::Storage(m),
            EsignError::Internal(m) => realdesk_core::ServiceError::Internal(m),
        }
    }
}

impl From<auth::service::AuthError> for EsignError {
    fn from(e: auth::service::AuthError) -> Self {
        use auth::service::AuthError;
        match e {
            AuthError::NotFound(m) => EsignError::NotFound(m),
            AuthError::Unauthorized(m) => EsignError::Unauthorized(m),
            AuthError::Validation(m) => EsignError::Validation(m),
            AuthError::Storage(m) => EsignError::Storage(m),
            other => EsignError::Internal(other.to_string()),
        }
    }
}
