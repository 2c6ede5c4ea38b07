//! Auth module — accounts, tenancy, and sessions.
//!
//! # Resources
//!
//! - **Profile** — account with role, company membership, and the
//!   e-signature provider token slice
//! - **Company** — tenant, found/created by NFC-normalized name
//! - **Session** — JWT issuance record supporting revocation
//!
//! # Usage
//!
//! ```ignore
//! use auth::{AuthModule, service::AuthConfig};
//!
//! let module = AuthModule::new(sql, AuthConfig::default())?;
//! let router = module.routes(); // merged under /api
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use realdesk_core::Module;

use crate::service::{AuthConfig, AuthService};

/// Auth module implementing the Module trait.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    /// Create a new AuthModule, initializing the schema.
    pub fn new(
        sql: Arc<dyn realdesk_sql::SQLStore>,
        config: AuthConfig,
    ) -> Result<Self, realdesk_core::ServiceError> {
        let service = AuthService::new(sql, config).map_err(realdesk_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying AuthService.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
