//! E-signature module — UCanSign integration.
//!
//! # Resources
//!
//! - **UcanSignClient** — provider HTTP client with per-account token
//!   refresh and a single forced-refresh retry
//! - **ContractRecord** — local cache of a provider document plus the
//!   local overlay (property link, stored PDF key)
//! - OAuth-style account linking, contract list/detail sync, the
//!   on-demand completion workflow, action dispatch, and folder/points
//!   passthroughs

pub mod api;
pub mod client;
pub mod error;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use realdesk_core::Module;

use crate::service::{EsignConfig, EsignService};

pub use crate::error::EsignError;

/// E-signature module implementing the Module trait.
pub struct EsignModule {
    service: Arc<EsignService>,
}

impl EsignModule {
    /// Create a new EsignModule, initializing the contract cache.
    pub fn new(
        sql: Arc<dyn realdesk_sql::SQLStore>,
        blob: Arc<dyn realdesk_blob::BlobStore>,
        auth: Arc<auth::service::AuthService>,
        office: Arc<backoffice::service::OfficeService>,
        config: EsignConfig,
    ) -> Result<Self, realdesk_core::ServiceError> {
        let service = EsignService::new(sql, blob, auth, office, config)
            .map_err(realdesk_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying EsignService.
    pub fn service(&self) -> &Arc<EsignService> {
        &self.service
    }
}

impl Module for EsignModule {
    fn name(&self) -> &str {
        "esign"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
