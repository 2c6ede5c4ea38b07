//! JWT sessions. Every issued access token carries a session id that
//! maps to a row here, so tokens can be revoked server-side before
//! they expire.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use realdesk_sql::Value;

use crate::model::{Claims, Profile, Session, TokenPair};
use crate::service::{AuthError, AuthService};
use realdesk_core::{new_id, now_rfc3339};

impl AuthService {
    /// Issue an access/refresh token pair and record the session.
    pub fn issue_tokens(&self, profile: &Profile) -> Result<TokenPair, AuthError> {
        let now = Utc::now().timestamp();
        let session = Session {
            id: new_id(),
            user_id: profile.id.clone(),
            issued_at: now_rfc3339(),
            expires_at: chrono::DateTime::from_timestamp(now + self.config.refresh_token_ttl, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            revoked: false,
        };

        self.insert_record(
            "sessions",
            &session.id,
            &session,
            &[
                ("user_id", Value::Text(session.user_id.clone())),
                ("revoked", Value::from_bool(session.revoked)),
                ("issued_at", Value::Text(session.issued_at.clone())),
                ("expires_at", Value::Text(session.expires_at.clone())),
                ("created_at", Value::Text(session.issued_at.clone())),
                ("updated_at", Value::Text(session.issued_at.clone())),
            ],
        )?;

        let claims = Claims {
            sub: profile.id.clone(),
            name: profile.name.clone(),
            role: profile.role.clone(),
            company_id: profile.company_id.clone(),
            sid: session.id.clone(),
            iat: now,
            exp: now + self.config.access_token_ttl,
        };
        let access_token = self.encode_claims(&claims)?;

        let refresh_claims = Claims {
            exp: now + self.config.refresh_token_ttl,
            ..claims
        };
        let refresh_token = self.encode_claims(&refresh_claims)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl,
        })
    }

    pub(crate) fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Decode and validate a token, then check the session row hasn't
    /// been revoked.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AuthError::Unauthorized(format!("invalid token: {}", e)))?;

        let session: Session = self
            .get_record("sessions", &data.claims.sid)
            .map_err(|_| AuthError::Unauthorized("unknown session".into()))?;
        if session.revoked {
            return Err(AuthError::Unauthorized("session revoked".into()));
        }

        Ok(data.claims)
    }

    /// Revoke every session of an account. Used on password reset.
    pub fn revoke_all_user_sessions(&self, user_id: &str) -> Result<usize, AuthError> {
        let sessions: Vec<Session> =
            self.list_records("sessions", &[("user_id", Value::Text(user_id.to_string()))])?;

        let mut revoked = 0;
        for mut session in sessions {
            if session.revoked {
                continue;
            }
            session.revoked = true;
            self.update_record(
                "sessions",
                &session.id.clone(),
                &session,
                &[
                    ("revoked", Value::from_bool(session.revoked)),
                    ("updated_at", Value::Text(now_rfc3339())),
                ],
            )?;
            revoked += 1;
        }
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use crate::service::AuthError;
    use crate::service::test_support::{staff_profile, test_service};

    #[test]
    fn issued_token_verifies_and_carries_identity() {
        let svc = test_service();
        let profile = svc.create_profile(staff_profile("manager", Some("c1"))).unwrap();

        let tokens = svc.issue_tokens(&profile).unwrap();
        assert_eq!(tokens.token_type, "Bearer");

        let claims = svc.verify_token(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, profile.id);
        assert_eq!(claims.role, "manager");
        assert_eq!(claims.company_id.as_deref(), Some("c1"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        let svc = test_service();
        let err = svc.verify_token("not.a.jwt").unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[test]
    fn revocation_kills_live_tokens() {
        let svc = test_service();
        let profile = svc.create_profile(staff_profile("staff", None)).unwrap();
        let first = svc.issue_tokens(&profile).unwrap();
        let second = svc.issue_tokens(&profile).unwrap();

        assert_eq!(svc.revoke_all_user_sessions(&profile.id).unwrap(), 2);
        assert!(svc.verify_token(&first.access_token).is_err());
        assert!(svc.verify_token(&second.access_token).is_err());
        // Second pass is a no-op.
        assert_eq!(svc.revoke_all_user_sessions(&profile.id).unwrap(), 0);
    }
}
