//! Identity Resolver — maps legacy login ids and emails to canonical
//! account ids.
//!
//! Every route handler that accepts a `userId`/`requesterId` query
//! parameter goes through here; the `<legacyId>@<domain>` convention
//! lives in `AuthConfig`, not in handlers.

use realdesk_sql::{Value, escape_like};
use tracing::warn;

use crate::model::RequesterProfile;
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Build the candidate lookup email for a raw identifier.
    ///
    /// An identifier that already contains `@` is used as-is;
    /// otherwise the configured legacy domain is appended.
    pub fn candidate_email(&self, raw: &str) -> String {
        if raw.contains('@') {
            raw.to_string()
        } else {
            format!("{}@{}", raw, self.config.legacy_email_domain)
        }
    }

    /// Resolve a raw identifier (canonical id, legacy login id, or
    /// email) to the canonical account id.
    ///
    /// Returns `Ok(None)` when nothing matches — callers treat that as
    /// an authentication failure, never as an internal error.
    pub fn resolve_account(&self, raw: &str) -> Result<Option<String>, AuthError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        // Canonical ids pass through untouched (idempotent).
        if uuid::Uuid::parse_str(raw).is_ok() {
            return Ok(Some(raw.to_string()));
        }

        let email = self.candidate_email(raw);
        let rows = self
            .sql
            .query(
                "SELECT id FROM profiles WHERE email = ?1",
                &[Value::Text(email)],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        if let Some(id) = rows.first().and_then(|r| r.get_str("id")) {
            return Ok(Some(id.to_string()));
        }

        // Historical fallback for the bootstrap admin account: any
        // email starting with "admin". The match is ordered so the
        // result is deterministic, and ambiguity is logged because the
        // heuristic predates email uniqueness guarantees.
        if raw == "admin" {
            let pattern = format!("{}%", escape_like(raw));
            let rows = self
                .sql
                .query(
                    "SELECT id, email FROM profiles WHERE email LIKE ?1 ESCAPE '\\' ORDER BY email",
                    &[Value::Text(pattern)],
                )
                .map_err(|e| AuthError::Storage(e.to_string()))?;
            if rows.len() > 1 {
                warn!(
                    matches = rows.len(),
                    "multiple accounts match the admin email prefix; using the first"
                );
            }
            if let Some(id) = rows.first().and_then(|r| r.get_str("id")) {
                return Ok(Some(id.to_string()));
            }
        }

        Ok(None)
    }

    /// Resolve a raw identifier and load the requester's profile slice
    /// used by the authorization guard.
    pub fn requester_profile(
        &self,
        raw: Option<&str>,
    ) -> Result<Option<RequesterProfile>, AuthError> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        let Some(id) = self.resolve_account(raw)? else {
            return Ok(None);
        };

        let rows = self
            .sql
            .query(
                "SELECT id, role, company_id FROM profiles WHERE id = ?1",
                &[Value::Text(id)],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(rows.first().map(|row| RequesterProfile {
            id: row.get_str("id").unwrap_or_default().to_string(),
            role: row.get_str("role").unwrap_or("staff").to_string(),
            company_id: row.get_str("company_id").map(|s| s.to_string()),
        }))
    }

    /// Like `requester_profile`, but failure to resolve is an error
    /// (HTTP 401) instead of `None`.
    pub fn require_requester(&self, raw: Option<&str>) -> Result<RequesterProfile, AuthError> {
        self.requester_profile(raw)?
            .ok_or_else(|| AuthError::Unauthorized("requester identity could not be resolved".into()))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::CreateProfile;
    use crate::service::test_support::test_service;

    #[test]
    fn canonical_id_passes_through_unchanged() {
        let svc = test_service();
        // Hyphenated and simple UUID forms both short-circuit.
        let hyphenated = "123e4567-e89b-12d3-a456-426614174000";
        let simple = "123e4567e89b12d3a456426614174000";
        assert_eq!(
            svc.resolve_account(hyphenated).unwrap().as_deref(),
            Some(hyphenated)
        );
        assert_eq!(
            svc.resolve_account(simple).unwrap().as_deref(),
            Some(simple)
        );
    }

    #[test]
    fn legacy_id_resolves_via_conventional_email() {
        let svc = test_service();
        let profile = svc
            .create_profile(CreateProfile {
                email: "test1@example.com".to_string(),
                name: "Tester".to_string(),
                role: "staff".to_string(),
                company_id: None,
                status: "active".to_string(),
                password: "pw-123456".to_string(),
            })
            .unwrap();

        assert_eq!(svc.candidate_email("test1"), "test1@example.com");
        assert_eq!(
            svc.resolve_account("test1").unwrap().as_deref(),
            Some(profile.id.as_str())
        );
        // An identifier that already carries a domain is used as-is.
        assert_eq!(
            svc.resolve_account("test1@example.com").unwrap().as_deref(),
            Some(profile.id.as_str())
        );
    }

    #[test]
    fn unknown_identifier_is_none_not_error() {
        let svc = test_service();
        assert_eq!(svc.resolve_account("nobody").unwrap(), None);
        assert_eq!(svc.resolve_account("   ").unwrap(), None);
    }

    #[test]
    fn admin_falls_back_to_email_prefix() {
        let svc = test_service();
        // No admin@example.com — only a prefixed variant exists.
        let profile = svc
            .create_profile(CreateProfile {
                email: "admin-hq@realdesk.io".to_string(),
                name: "Admin".to_string(),
                role: "admin".to_string(),
                company_id: None,
                status: "active".to_string(),
                password: "pw-123456".to_string(),
            })
            .unwrap();

        assert_eq!(
            svc.resolve_account("admin").unwrap().as_deref(),
            Some(profile.id.as_str())
        );
        // The fallback only fires for the literal "admin".
        assert_eq!(svc.resolve_account("admin2").unwrap(), None);
    }

    #[test]
    fn exact_email_wins_over_admin_prefix() {
        let svc = test_service();
        let prefixed = svc
            .create_profile(CreateProfile {
                email: "admin-alt@realdesk.io".to_string(),
                name: "Alt".to_string(),
                role: "admin".to_string(),
                company_id: None,
                status: "active".to_string(),
                password: "pw-123456".to_string(),
            })
            .unwrap();
        let exact = svc
            .create_profile(CreateProfile {
                email: "admin@example.com".to_string(),
                name: "Root".to_string(),
                role: "admin".to_string(),
                company_id: None,
                status: "active".to_string(),
                password: "pw-123456".to_string(),
            })
            .unwrap();

        // The conventional email must be queried before the prefix
        // heuristic kicks in.
        let resolved = svc.resolve_account("admin").unwrap().unwrap();
        assert_eq!(resolved, exact.id);
        assert_ne!(resolved, prefixed.id);
    }

    #[test]
    fn requester_profile_loads_guard_slice() {
        let svc = test_service();
        svc.create_profile(CreateProfile {
            email: "mgr@example.com".to_string(),
            name: "Manager".to_string(),
            role: "manager".to_string(),
            company_id: Some("c1".to_string()),
            status: "active".to_string(),
            password: "pw-123456".to_string(),
        })
        .unwrap();

        let requester = svc.requester_profile(Some("mgr")).unwrap().unwrap();
        assert_eq!(requester.role, "manager");
        assert_eq!(requester.company_id.as_deref(), Some("c1"));

        assert!(svc.requester_profile(Some("ghost")).unwrap().is_none());
        assert!(svc.requester_profile(None).unwrap().is_none());
        assert!(svc.require_requester(Some("ghost")).is_err());
    }
}
