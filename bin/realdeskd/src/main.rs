//! `realdeskd` — the RealDesk server binary.
//!
//! Usage:
//!   realdeskd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/realdesk/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use realdesk_core::Module;
use tracing::info;

use config::ServerConfig;

/// RealDesk server.
#[derive(Parser, Debug)]
#[command(name = "realdeskd", about = "RealDesk brokerage back-office server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    server_config.verify()?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = realdesk_core::ServiceConfig {
        data_dir: Some(data_dir.clone()),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    // Initialize embedded stores (shared by all modules).
    let sql: Arc<dyn realdesk_sql::SQLStore> = Arc::new(
        realdesk_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    let blob: Arc<dyn realdesk_blob::BlobStore> = Arc::new(
        realdesk_blob::FileStore::open(&core_config.resolve_blob_dir())
            .map_err(|e| anyhow::anyhow!("failed to open blob store: {}", e))?,
    );

    // ── Initialize modules ──

    let auth_config = auth::service::AuthConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        legacy_email_domain: server_config.auth.legacy_email_domain.clone(),
        ..Default::default()
    };
    let auth_module = auth::AuthModule::new(Arc::clone(&sql), auth_config)?;
    info!("Auth module initialized");

    let office_module = backoffice::BackofficeModule::new(
        Arc::clone(&sql),
        Arc::clone(auth_module.service()),
        core_config.resolve_settings_path(),
    )?;
    info!("Backoffice module initialized");

    let esign_config = esign::service::EsignConfig {
        base_url: server_config.ucansign.base_url.clone(),
        authorize_url: server_config.ucansign.authorize_url.clone(),
        client_id: server_config.ucansign.client_id.clone(),
        client_secret: server_config.ucansign.client_secret.clone(),
        redirect_url: server_config.ucansign.redirect_url.clone(),
        app_url: server_config.app.url.clone(),
        state_secret: server_config.state_secret(),
        ..Default::default()
    };
    let esign_module = esign::EsignModule::new(
        Arc::clone(&sql),
        Arc::clone(&blob),
        Arc::clone(auth_module.service()),
        Arc::clone(office_module.service()),
        esign_config,
    )?;
    info!("Esign module initialized");

    let module_routes = vec![
        (auth_module.name(), auth_module.routes()),
        (office_module.name(), office_module.routes()),
        (esign_module.name(), esign_module.routes()),
    ];

    // Build router.
    let app = routes::build_router(module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("RealDesk server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
