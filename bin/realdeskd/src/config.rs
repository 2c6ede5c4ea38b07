//! Server-side configuration file.
//!
//! A bare context name resolves to `/etc/realdesk/<name>.toml`; anything
//! containing `/` or `.` is treated as a literal path.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Server configuration, loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub jwt: JwtConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub auth: AuthSection,

    #[serde(default)]
    pub ucansign: UcanSignSection,

    #[serde(default)]
    pub app: AppSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret for access and refresh tokens.
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Base data directory (SQLite db, blobs and settings live under it).
    #[serde(default)]
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSection {
    /// Domain appended to bare legacy login ids (`test1` → `test1@example.com`).
    #[serde(default = "default_legacy_email_domain")]
    pub legacy_email_domain: String,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            legacy_email_domain: default_legacy_email_domain(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UcanSignSection {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    /// Provider API base.
    #[serde(default = "default_ucansign_base_url")]
    pub base_url: String,

    /// Browser-facing authorization page.
    #[serde(default = "default_ucansign_authorize_url")]
    pub authorize_url: String,

    /// Our callback endpoint, as registered with the provider.
    #[serde(default = "default_ucansign_redirect_url")]
    pub redirect_url: String,

    /// Secret for signing the OAuth `state` parameter.
    /// Falls back to the JWT secret when empty.
    #[serde(default)]
    pub state_secret: String,
}

impl Default for UcanSignSection {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            base_url: default_ucansign_base_url(),
            authorize_url: default_ucansign_authorize_url(),
            redirect_url: default_ucansign_redirect_url(),
            state_secret: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    /// Frontend base URL, used for post-OAuth redirects.
    #[serde(default = "default_app_url")]
    pub url: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            url: default_app_url(),
        }
    }
}

fn default_legacy_email_domain() -> String {
    "example.com".to_string()
}

fn default_ucansign_base_url() -> String {
    "https://app.ucansign.com/openapi".to_string()
}

fn default_ucansign_authorize_url() -> String {
    "https://app.ucansign.com/oauth/authorize".to_string()
}

fn default_ucansign_redirect_url() -> String {
    "http://localhost:8080/api/ucansign/callback".to_string()
}

fn default_app_url() -> String {
    "http://localhost:3000".to_string()
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/realdesk/{}.toml", name_or_path))
        }
    }

    /// Load configuration from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Verify the configuration is complete enough to start a server.
    pub fn verify(&self) -> anyhow::Result<()> {
        if self.jwt.secret.is_empty() {
            anyhow::bail!("JWT secret is empty in configuration.");
        }
        if self.storage.data_dir.is_empty() {
            anyhow::bail!("Storage data_dir is empty in configuration.");
        }
        Ok(())
    }

    /// The state-signing secret, defaulting to the JWT secret.
    pub fn state_secret(&self) -> String {
        if self.ucansign.state_secret.is_empty() {
            self.jwt.secret.clone()
        } else {
            self.ucansign.state_secret.clone()
        }
    }
}
