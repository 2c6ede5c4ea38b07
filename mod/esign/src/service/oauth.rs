//! Provider account linking.
//!
//! The browser round-trip carries a short-lived signed `state` instead
//! of a server-side session: the JWT holds the account id, so the
//! callback knows whose profile to attach the tokens to.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EsignError;
use crate::service::EsignService;

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    /// Canonical account id being linked.
    sub: String,
    iat: i64,
    exp: i64,
}

impl EsignService {
    /// Build the provider authorize URL for a requester, minting the
    /// signed `state`.
    pub fn authorize_url(&self, requester_raw: &str) -> Result<String, EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        let state = self.mint_state(&account_id)?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&state={}",
            self.config.authorize_url,
            urlencoded(&self.config.client_id),
            urlencoded(&self.config.redirect_url),
            urlencoded(&state),
        ))
    }

    /// Handle the provider callback: verify the state, exchange the
    /// code, and store the tokens on the profile. Returns the frontend
    /// URL to redirect the browser to.
    pub async fn handle_callback(&self, code: &str, state: &str) -> Result<String, EsignError> {
        let account_id = self.verify_state(state)?;
        self.client.exchange_code(&account_id, code).await?;
        info!(account = %account_id, "e-signature account linked");
        Ok(format!("{}/profile", self.config.app_url))
    }

    /// Unlink the provider account.
    pub fn disconnect(&self, requester_raw: &str) -> Result<(), EsignError> {
        let account_id = self.resolve_account(requester_raw)?;
        self.auth.clear_esign_tokens(&account_id)?;
        info!(account = %account_id, "e-signature account disconnected");
        Ok(())
    }

    fn mint_state(&self, account_id: &str) -> Result<String, EsignError> {
        let now = Utc::now().timestamp();
        let claims = StateClaims {
            sub: account_id.to_string(),
            iat: now,
            exp: now + self.config.state_ttl_secs,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.state_secret.as_bytes()),
        )
        .map_err(|e| EsignError::Internal(e.to_string()))
    }

    fn verify_state(&self, state: &str) -> Result<String, EsignError> {
        let data = decode::<StateClaims>(
            state,
            &DecodingKey::from_secret(self.config.state_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| EsignError::Unauthorized(format!("invalid state: {}", e)))?;
        Ok(data.claims.sub)
    }
}

/// Percent-encode a query parameter value.
fn urlencoded(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => result.push(ch),
            _ => {
                let mut buf = [0u8; 4];
                let encoded = ch.encode_utf8(&mut buf);
                for byte in encoded.bytes() {
                    result.push('%');
                    result.push_str(&format!("{:02X}", byte));
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::urlencoded;
    use crate::error::EsignError;
    use crate::service::test_support::{make_user, test_env};

    #[test]
    fn authorize_url_carries_signed_state() {
        let env = test_env();
        let user = make_user(&env.auth, None);

        let url = env.esign.authorize_url(&user).unwrap();
        assert!(url.starts_with("https://app.ucansign.com/oauth/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080"));

        // JWTs are URL-safe, so the state survives encoding untouched
        // and round-trips back to the account id.
        let state = url.split("state=").nth(1).unwrap();
        let account = env.esign.verify_state(state).unwrap();
        assert_eq!(account, user);
    }

    #[test]
    fn tampered_state_is_rejected() {
        let env = test_env();
        let user = make_user(&env.auth, None);
        let state = env.esign.mint_state(&user).unwrap();

        let mut tampered = state.clone();
        tampered.push('x');
        assert!(matches!(
            env.esign.verify_state(&tampered).unwrap_err(),
            EsignError::Unauthorized(_)
        ));
        assert!(env.esign.verify_state("garbage").is_err());
    }

    #[test]
    fn unknown_requester_cannot_start_linking() {
        let env = test_env();
        assert!(matches!(
            env.esign.authorize_url("nobody").unwrap_err(),
            EsignError::Unauthorized(_)
        ));
    }

    #[test]
    fn disconnect_clears_tokens() {
        let env = test_env();
        let user = make_user(&env.auth, None);
        env.auth
            .set_esign_tokens(
                &user,
                auth::model::EsignTokens {
                    access_token: "at".to_string(),
                    refresh_token: None,
                    expires_at_ms: 0,
                    linked_at: realdesk_core::now_rfc3339(),
                },
            )
            .unwrap();

        env.esign.disconnect(&user).unwrap();
        assert!(env.auth.esign_tokens(&user).unwrap().is_none());
    }

    #[test]
    fn query_encoding() {
        assert_eq!(urlencoded("a b/c"), "a%20b%2Fc");
        assert_eq!(urlencoded("plain-1.2~x_"), "plain-1.2~x_");
    }
}
