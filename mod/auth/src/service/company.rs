//! Tenant lookup and search.
//!
//! Company names arrive from user input and from macOS/iOS clients in
//! decomposed form, so both lookup and search normalize to NFC before
//! comparing.

use realdesk_sql::Value;
use unicode_normalization::UnicodeNormalization;

use crate::model::{Company, CompanySearchHit};
use crate::service::{AuthError, AuthService};
use realdesk_core::{new_id, now_rfc3339};

/// NFC-normalize and trim a user-supplied name.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().nfc().collect()
}

impl AuthService {
    /// Create a new company. Returns `Conflict` when the name is taken
    /// (callers racing on signup re-fetch and join instead).
    pub fn create_company(
        &self,
        name: &str,
        manager_id: Option<&str>,
    ) -> Result<Company, AuthError> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(AuthError::Validation("company name cannot be empty".into()));
        }

        let now = now_rfc3339();
        let company = Company {
            id: new_id(),
            name: name.clone(),
            manager_id: manager_id.map(|s| s.to_string()),
            status: "active".to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "companies",
            &company.id,
            &company,
            &[
                ("name", Value::Text(name)),
                ("manager_id", match &company.manager_id {
                    Some(id) => Value::Text(id.clone()),
                    None => Value::Null,
                }),
                ("status", Value::Text(company.status.clone())),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;

        Ok(company)
    }

    /// Get a company by id.
    pub fn get_company(&self, id: &str) -> Result<Company, AuthError> {
        self.get_record("companies", id)
    }

    /// Find a company by user-facing name, tolerating NFC/NFD
    /// mismatches between the stored and queried forms.
    pub fn find_company_by_name(&self, name: &str) -> Result<Option<Company>, AuthError> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return Ok(None);
        }

        // Fast path: the stored form matches the normalized query.
        let rows = self
            .sql
            .query(
                "SELECT data FROM companies WHERE name = ?1",
                &[Value::Text(wanted.clone())],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        if let Some(data) = rows.first().and_then(|r| r.get_str("data")) {
            let company: Company =
                serde_json::from_str(data).map_err(|e| AuthError::Internal(e.to_string()))?;
            return Ok(Some(company));
        }

        // Slow path: rows written before normalization was enforced may
        // be stored decomposed. Tenant counts are small enough to scan.
        let all: Vec<Company> = self.list_records("companies", &[])?;
        Ok(all.into_iter().find(|c| normalize_name(&c.name) == wanted))
    }

    /// Case-insensitive, normalization-tolerant substring search over
    /// company names, newest first, capped at `limit`. Each hit carries
    /// the manager's display name.
    pub fn search_companies(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CompanySearchHit>, AuthError> {
        let needle = normalize_name(query).to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let all: Vec<Company> = self.list_records("companies", &[])?;
        let mut hits = Vec::new();
        for company in all {
            if !normalize_name(&company.name).to_lowercase().contains(&needle) {
                continue;
            }

            let manager_name = match company.manager_id.as_deref() {
                Some(id) => self
                    .get_record::<crate::model::Profile>("profiles", id)
                    .map(|p| p.name)
                    .unwrap_or_else(|_| "-".to_string()),
                None => "-".to_string(),
            };

            hits.push(CompanySearchHit {
                id: company.id,
                name: company.name,
                manager_name,
                created_at: company.created_at,
            });
            if hits.len() >= limit {
                break;
            }
        }
        Ok(hits)
    }

    /// Set the company's primary manager reference.
    pub(crate) fn set_company_manager(
        &self,
        company_id: &str,
        manager_id: &str,
    ) -> Result<(), AuthError> {
        let mut company: Company = self.get_record("companies", company_id)?;
        company.manager_id = Some(manager_id.to_string());
        company.updated_at = now_rfc3339();
        self.update_record(
            "companies",
            company_id,
            &company,
            &[
                ("manager_id", Value::Text(manager_id.to_string())),
                ("updated_at", Value::Text(company.updated_at.clone())),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::service::test_support::{staff_profile, test_service};

    #[test]
    fn create_and_find_by_name() {
        let svc = test_service();
        let company = svc.create_company("한빛공인중개사", None).unwrap();
        let found = svc.find_company_by_name("한빛공인중개사").unwrap().unwrap();
        assert_eq!(found.id, company.id);
        assert!(svc.find_company_by_name("없는회사").unwrap().is_none());
    }

    #[test]
    fn duplicate_name_is_conflict() {
        let svc = test_service();
        svc.create_company("acme", None).unwrap();
        let err = svc.create_company("acme", None).unwrap_err();
        assert!(matches!(err, crate::service::AuthError::Conflict(_)));
    }

    #[test]
    fn lookup_tolerates_nfd_queries() {
        let svc = test_service();
        // Stored composed (NFC)…
        let company = svc.create_company("한빛", None).unwrap();
        // …queried decomposed (NFD), as macOS clients send it.
        let decomposed: String =
            unicode_normalization::UnicodeNormalization::nfd("한빛".chars()).collect();
        assert_ne!(decomposed, "한빛".to_string());
        let found = svc.find_company_by_name(&decomposed).unwrap().unwrap();
        assert_eq!(found.id, company.id);
    }

    #[test]
    fn search_is_case_insensitive_and_normalization_tolerant() {
        let svc = test_service();
        svc.create_company("Acme Realty", None).unwrap();
        svc.create_company("한빛공인", None).unwrap();

        let hits = svc.search_companies("acme", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Acme Realty");

        let decomposed: String =
            unicode_normalization::UnicodeNormalization::nfd("한빛".chars()).collect();
        let hits = svc.search_companies(&decomposed, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "한빛공인");

        assert!(svc.search_companies("   ", 10).unwrap().is_empty());
    }

    #[test]
    fn search_enriches_manager_name() {
        let svc = test_service();
        let manager = svc.create_profile(staff_profile("manager", None)).unwrap();
        svc.create_company("Managed Co", Some(&manager.id)).unwrap();

        let hits = svc.search_companies("managed", 10).unwrap();
        assert_eq!(hits[0].manager_name, "Test User");
    }
}
