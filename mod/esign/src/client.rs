//! UCanSign HTTP client.
//!
//! Tokens are short-lived (the provider invalidates them after ~30
//! minutes) and stored per account behind the [`TokenStore`] seam. The
//! client refreshes ahead of expiry and retries a rejected request
//! exactly once with a forced refresh before giving up with
//! [`EsignError::NeedAuth`].

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use auth::model::EsignTokens;

use crate::error::EsignError;
use realdesk_core::now_rfc3339;

/// Provider access tokens live this long after issue/refresh.
pub const TOKEN_TTL_MINUTES: i64 = 29;

/// Refresh this many seconds before the stored expiry.
const REFRESH_BUFFER_SECS: i64 = 120;

/// Per-account provider token storage. Implemented by the auth service
/// over the profile table.
pub trait TokenStore: Send + Sync {
    fn tokens(&self, account_id: &str) -> Result<Option<EsignTokens>, EsignError>;
    fn store(&self, account_id: &str, tokens: EsignTokens) -> Result<(), EsignError>;
    fn clear(&self, account_id: &str) -> Result<(), EsignError>;
}

impl TokenStore for auth::service::AuthService {
    fn tokens(&self, account_id: &str) -> Result<Option<EsignTokens>, EsignError> {
        Ok(self.esign_tokens(account_id)?)
    }

    fn store(&self, account_id: &str, tokens: EsignTokens) -> Result<(), EsignError> {
        Ok(self.set_esign_tokens(account_id, tokens)?)
    }

    fn clear(&self, account_id: &str) -> Result<(), EsignError> {
        Ok(self.clear_esign_tokens(account_id)?)
    }
}

pub struct UcanSignClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    tokens: Arc<dyn TokenStore>,
}

impl UcanSignClient {
    pub fn new(
        base_url: String,
        client_id: String,
        client_secret: String,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange an authorization code for tokens and store them for
    /// the account.
    pub async fn exchange_code(&self, account_id: &str, code: &str) -> Result<(), EsignError> {
        let body = serde_json::json!({
            "clientId": self.client_id,
            "clientSecret": self.client_secret,
            "grantType": "code",
            "code": code,
        });
        let tokens = self.token_request(&body).await?;
        self.tokens.store(account_id, tokens)
    }

    /// A bearer access token for the account, refreshed when within
    /// the expiry buffer (or unconditionally when `force`).
    async fn access_token(&self, account_id: &str, force: bool) -> Result<String, EsignError> {
        let stored = self
            .tokens
            .tokens(account_id)?
            .ok_or_else(|| EsignError::NeedAuth("e-signature account is not linked".into()))?;

        let now_ms = chrono::Utc::now().timestamp_millis();
        if !force && now_ms < stored.expires_at_ms - REFRESH_BUFFER_SECS * 1000 {
            return Ok(stored.access_token);
        }

        let Some(refresh_token) = stored.refresh_token else {
            self.tokens.clear(account_id)?;
            return Err(EsignError::NeedAuth(
                "stored token expired and no refresh token is available".into(),
            ));
        };

        debug!(account = account_id, "refreshing provider token");
        let body = serde_json::json!({
            "clientId": self.client_id,
            "clientSecret": self.client_secret,
            "grantType": "refresh",
            "refreshToken": refresh_token,
        });
        match self.token_request(&body).await {
            Ok(tokens) => {
                let access = tokens.access_token.clone();
                self.tokens.store(account_id, tokens)?;
                Ok(access)
            }
            Err(e) => {
                // A dead refresh token means the link is gone; drop it
                // so the frontend re-runs authorization.
                warn!(account = account_id, error = %e, "token refresh failed, disconnecting");
                self.tokens.clear(account_id)?;
                Err(EsignError::NeedAuth(
                    "provider session expired; authorization required".into(),
                ))
            }
        }
    }

    async fn token_request(&self, body: &Value) -> Result<EsignTokens, EsignError> {
        let resp = self
            .http
            .post(self.url("/user/oauth/auth"))
            .json(body)
            .send()
            .await
            .map_err(|e| EsignError::Upstream(format!("token endpoint unreachable: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(EsignError::Upstream(format!(
                "token endpoint returned {}: {}",
                status, text
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| EsignError::Upstream(format!("token response parse failed: {}", e)))?;

        let access_token = token_field(&json, "accessToken")
            .ok_or_else(|| EsignError::Upstream("missing accessToken in token response".into()))?;
        let refresh_token = token_field(&json, "refreshToken");

        Ok(EsignTokens {
            access_token,
            refresh_token,
            expires_at_ms: chrono::Utc::now().timestamp_millis()
                + TOKEN_TTL_MINUTES * 60 * 1000,
            linked_at: now_rfc3339(),
        })
    }

    /// Authenticated provider call. Retries once with a forced token
    /// refresh when the provider answers HTTP 401 or a body-level
    /// `code: 401`.
    pub async fn request(
        &self,
        account_id: &str,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, EsignError> {
        let mut forced = false;
        loop {
            let token = self.access_token(account_id, forced).await?;

            let mut req = self.http.request(method.clone(), self.url(path)).bearer_auth(&token);
            if let Some(body) = body {
                req = req.json(body);
            }
            let resp = req
                .send()
                .await
                .map_err(|e| EsignError::Upstream(format!("provider unreachable: {}", e)))?;

            let status = resp.status();
            if status == reqwest::StatusCode::PAYMENT_REQUIRED {
                return Err(EsignError::PointsExhausted(
                    "e-signature points are exhausted".into(),
                ));
            }
            if status == reqwest::StatusCode::UNAUTHORIZED {
                if forced {
                    self.tokens.clear(account_id)?;
                    return Err(EsignError::NeedAuth(
                        "provider rejected the token; authorization required".into(),
                    ));
                }
                forced = true;
                continue;
            }
            if status == reqwest::StatusCode::NO_CONTENT {
                return Ok(Value::Null);
            }

            let json: Value = resp
                .json()
                .await
                .map_err(|e| EsignError::Upstream(format!("provider response parse failed: {}", e)))?;

            // Some endpoints answer 200 with an embedded auth error.
            if json.get("code").and_then(|v| v.as_i64()) == Some(401) {
                if forced {
                    self.tokens.clear(account_id)?;
                    return Err(EsignError::NeedAuth(
                        "provider rejected the token; authorization required".into(),
                    ));
                }
                forced = true;
                continue;
            }

            if !status.is_success() {
                let msg = json
                    .get("msg")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unexpected provider error");
                return Err(EsignError::Upstream(format!("{} ({})", msg, status)));
            }

            return Ok(json);
        }
    }

    /// Fetch a signed-file URL (no bearer; the URL itself is signed).
    pub async fn fetch_file(&self, url: &str) -> Result<Vec<u8>, EsignError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| EsignError::Upstream(format!("file download failed: {}", e)))?;
        if !resp.status().is_success() {
            return Err(EsignError::Upstream(format!(
                "file download returned {}",
                resp.status()
            )));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| EsignError::Upstream(format!("file download read failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

fn token_field(json: &Value, key: &str) -> Option<String> {
    json.get(key)
        .or_else(|| json.get("result").and_then(|r| r.get(key)))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
