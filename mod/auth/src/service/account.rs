//! Account lifecycle: creation, login, signup, password reset, and the
//! e-signature token slice stored on the profile.

use realdesk_sql::Value;
use tracing::info;

use crate::model::{
    CreateProfile, EsignTokens, LoginRequest, NormalizedUser, Profile, SignupRequest, TokenPair,
};
use crate::service::company::normalize_name;
use crate::service::{AuthError, AuthService};
use realdesk_core::{new_id, now_rfc3339};

// ── Password helpers ──

/// Hash a plain password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    use argon2::Argon2;
    use password_hash::rand_core::OsRng;
    use password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Internal(e.to_string()))
}

/// Verify a password against an argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::Argon2;
    use password_hash::{PasswordHash, PasswordVerifier};

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

impl AuthService {
    /// Create a profile row. `Conflict` when the email is taken.
    pub fn create_profile(&self, input: CreateProfile) -> Result<Profile, AuthError> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("a valid email is required".into()));
        }
        if input.password.len() < 6 {
            return Err(AuthError::Validation(
                "password must be at least 6 characters".into(),
            ));
        }

        let now = now_rfc3339();
        let profile = Profile {
            id: new_id(),
            email: email.clone(),
            name: input.name.trim().to_string(),
            role: input.role,
            company_id: input.company_id,
            status: input.status,
            password_hash: hash_password(&input.password)?,
            mobile: None,
            esign: None,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "profiles",
            &profile.id,
            &profile,
            &[
                ("email", Value::Text(email)),
                ("name", Value::Text(profile.name.clone())),
                ("role", Value::Text(profile.role.clone())),
                ("company_id", match &profile.company_id {
                    Some(id) => Value::Text(id.clone()),
                    None => Value::Null,
                }),
                ("status", Value::Text(profile.status.clone())),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;

        Ok(profile)
    }

    /// Get a profile by canonical id.
    pub fn get_profile(&self, id: &str) -> Result<Profile, AuthError> {
        self.get_record("profiles", id)
    }

    /// Persist a changed profile, refreshing its indexed columns.
    pub(crate) fn save_profile(&self, profile: &mut Profile) -> Result<(), AuthError> {
        profile.updated_at = now_rfc3339();
        self.update_record(
            "profiles",
            &profile.id.clone(),
            profile,
            &[
                ("email", Value::Text(profile.email.clone())),
                ("name", Value::Text(profile.name.clone())),
                ("role", Value::Text(profile.role.clone())),
                ("company_id", match &profile.company_id {
                    Some(id) => Value::Text(id.clone()),
                    None => Value::Null,
                }),
                ("status", Value::Text(profile.status.clone())),
                ("updated_at", Value::Text(profile.updated_at.clone())),
            ],
        )
    }

    /// Project a profile into the shape the frontend consumes.
    pub fn normalized_user(&self, profile: &Profile) -> Result<NormalizedUser, AuthError> {
        let suffix = format!("@{}", self.config.legacy_email_domain);
        let legacy_id = profile
            .email
            .strip_suffix(&suffix)
            .unwrap_or(&profile.email)
            .to_string();

        let company_name = match profile.company_id.as_deref() {
            Some(id) => self.get_company(id).map(|c| c.name).unwrap_or_default(),
            None => String::new(),
        };

        Ok(NormalizedUser {
            id: legacy_id,
            uid: profile.id.clone(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            role: profile.role.clone(),
            company_name,
            company_id: profile.company_id.clone(),
            status: profile.status.clone(),
            esign_connected: profile.esign.is_some(),
        })
    }

    /// Authenticate with a legacy login id (or email) and password.
    ///
    /// Pending accounts are rejected with a domain message rather than
    /// the generic credential failure, so the frontend can explain the
    /// approval step.
    pub fn login(&self, req: &LoginRequest) -> Result<(TokenPair, NormalizedUser), AuthError> {
        let Some(account_id) = self.resolve_account(&req.id)? else {
            return Err(AuthError::Unauthorized("invalid credentials".into()));
        };
        let profile = self.get_profile(&account_id).map_err(|e| match e {
            AuthError::NotFound(_) => AuthError::Unauthorized("invalid credentials".into()),
            other => other,
        })?;

        if !verify_password(&req.password, &profile.password_hash) {
            return Err(AuthError::Unauthorized("invalid credentials".into()));
        }
        if profile.status == "pending_approval" {
            return Err(AuthError::Forbidden(
                "account is awaiting manager approval".into(),
            ));
        }
        if profile.status != "active" {
            return Err(AuthError::Forbidden("account is not active".into()));
        }

        let tokens = self.issue_tokens(&profile)?;
        let user = self.normalized_user(&profile)?;
        info!(user = %profile.id, "login succeeded");
        Ok((tokens, user))
    }

    /// Register a new account.
    ///
    /// Company membership rules:
    /// - the company does not exist yet: it is created and the new
    ///   account becomes its active manager, whatever role was asked;
    /// - the company exists and the caller asked for `manager`: rejected
    ///   when a manager already holds the seat;
    /// - otherwise the account joins as staff with `pending_approval`.
    pub fn signup(&self, req: &SignupRequest) -> Result<NormalizedUser, AuthError> {
        let login_id = req.id.trim();
        if login_id.is_empty() {
            return Err(AuthError::Validation("login id is required".into()));
        }
        if normalize_name(&req.company_name).is_empty() {
            return Err(AuthError::Validation("company name is required".into()));
        }
        let email = self.candidate_email(login_id);

        let company = match self.find_company_by_name(&req.company_name)? {
            Some(existing) => {
                if req.role.as_deref() == Some("manager")
                    && self.company_has_manager(&existing.id)?
                {
                    return Err(AuthError::Conflict(
                        "company already has a manager".into(),
                    ));
                }
                existing
            }
            None => match self.create_company(&req.company_name, None) {
                Ok(created) => created,
                // Lost the race on the unique name: join the winner.
                Err(AuthError::Conflict(_)) => self
                    .find_company_by_name(&req.company_name)?
                    .ok_or_else(|| AuthError::Internal("company vanished after conflict".into()))?,
                Err(e) => return Err(e),
            },
        };

        // Founder of a brand-new company is forced to active manager.
        let is_founder = company.manager_id.is_none() && !self.company_has_manager(&company.id)?;
        let (role, status) = if is_founder {
            ("manager", "active")
        } else if req.role.as_deref() == Some("manager") {
            ("manager", "active")
        } else {
            ("staff", "pending_approval")
        };

        let profile = self.create_profile(CreateProfile {
            email,
            name: req.name.clone(),
            role: role.to_string(),
            company_id: Some(company.id.clone()),
            status: status.to_string(),
            password: req.password.clone(),
        })?;

        if is_founder {
            self.set_company_manager(&company.id, &profile.id)?;
        }

        info!(user = %profile.id, company = %company.id, role, "signup completed");
        self.normalized_user(&profile)
    }

    /// Admin-only password reset. Revokes every live session of the
    /// target account so stolen tokens die with the old password.
    pub fn reset_password(
        &self,
        requester_raw: &str,
        target_raw: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let requester = self.require_requester(Some(requester_raw))?;
        if !super::guard::is_admin(&requester) {
            return Err(AuthError::Forbidden(
                "only admins may reset passwords".into(),
            ));
        }
        if new_password.len() < 6 {
            return Err(AuthError::Validation(
                "password must be at least 6 characters".into(),
            ));
        }

        let target_id = self
            .resolve_account(target_raw)?
            .ok_or_else(|| AuthError::NotFound(format!("account {}", target_raw)))?;
        let mut profile = self.get_profile(&target_id)?;
        profile.password_hash = hash_password(new_password)?;
        self.save_profile(&mut profile)?;
        self.revoke_all_user_sessions(&target_id)?;
        info!(target = %target_id, "password reset by admin");
        Ok(())
    }

    fn company_has_manager(&self, company_id: &str) -> Result<bool, AuthError> {
        let count = self.count_records(
            "profiles",
            &[
                ("company_id", Value::Text(company_id.to_string())),
                ("role", Value::Text("manager".to_string())),
            ],
        )?;
        Ok(count > 0)
    }

    // ── E-signature token slice ──

    /// Stored provider tokens for an account, if linked.
    pub fn esign_tokens(&self, account_id: &str) -> Result<Option<EsignTokens>, AuthError> {
        Ok(self.get_profile(account_id)?.esign)
    }

    /// Store (or replace) the provider tokens for an account.
    pub fn set_esign_tokens(
        &self,
        account_id: &str,
        tokens: EsignTokens,
    ) -> Result<(), AuthError> {
        let mut profile = self.get_profile(account_id)?;
        profile.esign = Some(tokens);
        self.save_profile(&mut profile)
    }

    /// Drop the provider tokens (disconnect).
    pub fn clear_esign_tokens(&self, account_id: &str) -> Result<(), AuthError> {
        let mut profile = self.get_profile(account_id)?;
        if profile.esign.is_none() {
            return Ok(());
        }
        profile.esign = None;
        self.save_profile(&mut profile)
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};
    use crate::model::{EsignTokens, LoginRequest, SignupRequest};
    use crate::service::AuthError;
    use crate::service::test_support::{staff_profile, test_service};

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("hunter2-long").unwrap();
        assert!(verify_password("hunter2-long", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("hunter2-long", "not-a-phc-string"));
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let svc = test_service();
        let mut input = staff_profile("staff", None);
        input.email = "dup@example.com".to_string();
        svc.create_profile(input.clone()).unwrap();
        assert!(matches!(
            svc.create_profile(input).unwrap_err(),
            AuthError::Conflict(_)
        ));
    }

    #[test]
    fn signup_founder_becomes_active_manager() {
        let svc = test_service();
        let user = svc
            .signup(&SignupRequest {
                id: "alice".to_string(),
                password: "pw-123456".to_string(),
                name: "Alice".to_string(),
                company_name: "New Co".to_string(),
                role: Some("staff".to_string()),
            })
            .unwrap();

        assert_eq!(user.role, "manager");
        assert_eq!(user.status, "active");
        assert_eq!(user.company_name, "New Co");

        let company = svc.find_company_by_name("New Co").unwrap().unwrap();
        assert_eq!(company.manager_id.as_deref(), Some(user.uid.as_str()));
    }

    #[test]
    fn signup_second_member_is_pending_staff() {
        let svc = test_service();
        svc.signup(&SignupRequest {
            id: "alice".to_string(),
            password: "pw-123456".to_string(),
            name: "Alice".to_string(),
            company_name: "New Co".to_string(),
            role: None,
        })
        .unwrap();

        let bob = svc
            .signup(&SignupRequest {
                id: "bob".to_string(),
                password: "pw-123456".to_string(),
                name: "Bob".to_string(),
                company_name: "New Co".to_string(),
                role: None,
            })
            .unwrap();
        assert_eq!(bob.role, "staff");
        assert_eq!(bob.status, "pending_approval");
    }

    #[test]
    fn signup_manager_seat_taken_is_conflict() {
        let svc = test_service();
        svc.signup(&SignupRequest {
            id: "alice".to_string(),
            password: "pw-123456".to_string(),
            name: "Alice".to_string(),
            company_name: "New Co".to_string(),
            role: None,
        })
        .unwrap();

        let err = svc
            .signup(&SignupRequest {
                id: "carol".to_string(),
                password: "pw-123456".to_string(),
                name: "Carol".to_string(),
                company_name: "New Co".to_string(),
                role: Some("manager".to_string()),
            })
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
    }

    #[test]
    fn login_happy_path_and_pending_rejection() {
        let svc = test_service();
        svc.signup(&SignupRequest {
            id: "alice".to_string(),
            password: "pw-123456".to_string(),
            name: "Alice".to_string(),
            company_name: "New Co".to_string(),
            role: None,
        })
        .unwrap();
        svc.signup(&SignupRequest {
            id: "bob".to_string(),
            password: "pw-123456".to_string(),
            name: "Bob".to_string(),
            company_name: "New Co".to_string(),
            role: None,
        })
        .unwrap();

        let (tokens, user) = svc
            .login(&LoginRequest {
                id: "alice".to_string(),
                password: "pw-123456".to_string(),
            })
            .unwrap();
        assert!(!tokens.access_token.is_empty());
        // The frontend id is the legacy login id, not the email.
        assert_eq!(user.id, "alice");
        assert_eq!(user.email, "alice@example.com");

        let wrong = svc.login(&LoginRequest {
            id: "alice".to_string(),
            password: "nope".to_string(),
        });
        assert!(matches!(wrong.unwrap_err(), AuthError::Unauthorized(_)));

        let pending = svc.login(&LoginRequest {
            id: "bob".to_string(),
            password: "pw-123456".to_string(),
        });
        assert!(matches!(pending.unwrap_err(), AuthError::Forbidden(_)));
    }

    #[test]
    fn reset_password_is_admin_only_and_revokes_sessions() {
        let svc = test_service();
        let mut admin_input = staff_profile("admin", None);
        admin_input.email = "admin@example.com".to_string();
        svc.create_profile(admin_input).unwrap();

        let (tokens, user) = {
            svc.signup(&SignupRequest {
                id: "alice".to_string(),
                password: "pw-123456".to_string(),
                name: "Alice".to_string(),
                company_name: "New Co".to_string(),
                role: None,
            })
            .unwrap();
            svc.login(&LoginRequest {
                id: "alice".to_string(),
                password: "pw-123456".to_string(),
            })
            .unwrap()
        };
        assert!(svc.verify_token(&tokens.access_token).is_ok());

        // Non-admin requester is refused.
        let err = svc
            .reset_password("alice", "alice", "new-password")
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));

        svc.reset_password("admin", "alice", "new-password").unwrap();

        // Old password dead, old session dead, new password live.
        assert!(svc
            .login(&LoginRequest {
                id: "alice".to_string(),
                password: "pw-123456".to_string(),
            })
            .is_err());
        assert!(svc.verify_token(&tokens.access_token).is_err());
        let (_, relogged) = svc
            .login(&LoginRequest {
                id: "alice".to_string(),
                password: "new-password".to_string(),
            })
            .unwrap();
        assert_eq!(relogged.uid, user.uid);
    }

    #[test]
    fn esign_token_slice_roundtrip() {
        let svc = test_service();
        let profile = svc.create_profile(staff_profile("staff", None)).unwrap();

        assert!(svc.esign_tokens(&profile.id).unwrap().is_none());
        svc.set_esign_tokens(
            &profile.id,
            EsignTokens {
                access_token: "at-1".to_string(),
                refresh_token: Some("rt-1".to_string()),
                expires_at_ms: 1_700_000_000_000,
                linked_at: realdesk_core::now_rfc3339(),
            },
        )
        .unwrap();

        let stored = svc.esign_tokens(&profile.id).unwrap().unwrap();
        assert_eq!(stored.access_token, "at-1");
        let user = svc.normalized_user(&svc.get_profile(&profile.id).unwrap()).unwrap();
        assert!(user.esign_connected);

        svc.clear_esign_tokens(&profile.id).unwrap();
        assert!(svc.esign_tokens(&profile.id).unwrap().is_none());
        // Idempotent.
        svc.clear_esign_tokens(&profile.id).unwrap();
    }
}
