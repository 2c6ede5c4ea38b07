pub mod actions;
pub mod cache;
pub mod oauth;
pub mod proxy;
pub mod schema;
pub mod sync;

use std::sync::Arc;

use auth::service::AuthService;
use backoffice::service::OfficeService;
use realdesk_blob::BlobStore;
use realdesk_sql::SQLStore;

use crate::client::UcanSignClient;
use crate::error::EsignError;

/// Configuration for the e-signature integration.
#[derive(Debug, Clone)]
pub struct EsignConfig {
    /// Provider API base, e.g. `https://app.ucansign.com/openapi`.
    pub base_url: String,
    /// Browser-facing authorization page.
    pub authorize_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Our callback endpoint, registered with the provider.
    pub redirect_url: String,
    /// Frontend base URL for post-callback redirects.
    pub app_url: String,
    /// Secret for signing the OAuth `state` parameter.
    pub state_secret: String,
    /// How long a minted `state` stays valid.
    pub state_ttl_secs: i64,
}

impl Default for EsignConfig {
    fn default() -> Self {
        Self {
            base_url: "https://app.ucansign.com/openapi".to_string(),
            authorize_url: "https://app.ucansign.com/oauth/authorize".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: "http://localhost:8080/api/ucansign/callback".to_string(),
            app_url: "http://localhost:3000".to_string(),
            state_secret: "realdesk-dev-state-secret".to_string(),
            state_ttl_secs: 300,
        }
    }
}

/// The e-signature service: provider client, contract cache, and the
/// completion workflow against the back-office property records.
pub struct EsignService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) blob: Arc<dyn BlobStore>,
    pub(crate) auth: Arc<AuthService>,
    pub(crate) office: Arc<OfficeService>,
    pub(crate) client: UcanSignClient,
    pub(crate) config: EsignConfig,
}

impl EsignService {
    /// Create a new EsignService, initializing the contract cache
    /// schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        blob: Arc<dyn BlobStore>,
        auth: Arc<AuthService>,
        office: Arc<OfficeService>,
        config: EsignConfig,
    ) -> Result<Arc<Self>, EsignError> {
        schema::init_schema(sql.as_ref())?;
        let client = UcanSignClient::new(
            config.base_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            auth.clone(),
        );
        Ok(Arc::new(Self {
            sql,
            blob,
            auth,
            office,
            client,
            config,
        }))
    }

    /// Resolve a raw requester identifier to a canonical account id.
    pub(crate) fn resolve_account(&self, raw: &str) -> Result<String, EsignError> {
        self.auth
            .resolve_account(raw)?
            .ok_or_else(|| EsignError::Unauthorized("requester identity could not be resolved".into()))
    }
}
