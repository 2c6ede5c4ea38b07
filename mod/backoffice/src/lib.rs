//! Back-office module — company-scoped CRUD for the brokerage's
//! day-to-day records.
//!
//! # Resources
//!
//! - **Property / Customer / Schedule / BusinessCard / Notice /
//!   Template** — one CRUD surface over a shared envelope; payloads
//!   are schemaless documents owned by the frontend
//! - **ShareLink** — public, expiring briefing view of a property with
//!   sensitive fields masked
//! - **AppSettings** — announcement banner and feature flags, stored
//!   as a JSON file

pub mod api;
pub mod model;
pub mod service;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;

use realdesk_core::Module;

use crate::service::OfficeService;

/// Back-office module implementing the Module trait.
pub struct BackofficeModule {
    service: Arc<OfficeService>,
}

impl BackofficeModule {
    /// Create a new BackofficeModule, initializing the schema.
    pub fn new(
        sql: Arc<dyn realdesk_sql::SQLStore>,
        auth: Arc<auth::service::AuthService>,
        settings_path: PathBuf,
    ) -> Result<Self, realdesk_core::ServiceError> {
        let service = OfficeService::new(sql, auth, settings_path)
            .map_err(realdesk_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying OfficeService.
    pub fn service(&self) -> &Arc<OfficeService> {
        &self.service
    }
}

impl Module for BackofficeModule {
    fn name(&self) -> &str {
        "backoffice"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
