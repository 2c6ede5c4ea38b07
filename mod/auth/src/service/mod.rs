pub mod account;
pub mod company;
pub mod guard;
pub mod identity;
pub mod schema;
pub mod session;
pub mod staff;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use realdesk_sql::{SQLStore, Value};

/// Auth service error type.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<AuthError> for realdesk_core::ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::NotFound(m) => realdesk_core::ServiceError::NotFound(m),
            AuthError::Conflict(m) => realdesk_core::ServiceError::Conflict(m),
            AuthError::Validation(m) => realdesk_core::ServiceError::Validation(m),
            AuthError::Unauthorized(m) => realdesk_core::ServiceError::Unauthorized(m),
            AuthError::Forbidden(m) => realdesk_core::ServiceError::PermissionDenied(m),
            AuthError::Storage(m) => realdesk_core::ServiceError::Storage(m),
            AuthError::Internal(m) => realdesk_core::ServiceError::Internal(m),
        }
    }
}

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 24h).
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds (default: 7 days).
    pub refresh_token_ttl: i64,
    /// Domain appended to bare legacy login ids to form the lookup
    /// email (`test1` → `test1@example.com`). Configuration, not a
    /// scattered string convention.
    pub legacy_email_domain: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "realdesk-dev-secret-change-me".to_string(),
            access_token_ttl: 86400,   // 24h
            refresh_token_ttl: 604800, // 7 days
            legacy_email_domain: "example.com".to_string(),
        }
    }
}

/// The Auth service. Holds the SQL store and configuration.
pub struct AuthService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) config: AuthConfig,
}

impl AuthService {
    /// Create a new AuthService, initializing the DB schema.
    pub fn new(sql: Arc<dyn SQLStore>, config: AuthConfig) -> Result<Arc<Self>, AuthError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql, config }))
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    // ── Generic CRUD helpers (shared pattern with OfficeService) ──

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AuthError> {
        let json = serde_json::to_string(record)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 3;
            cols.push(col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(|e| {
            if e.is_unique_violation() {
                AuthError::Conflict(e.to_string())
            } else {
                AuthError::Storage(e.to_string())
            }
        })?;

        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, AuthError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self.sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| AuthError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| AuthError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AuthError> {
        let json = serde_json::to_string(record)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            sets.join(", "),
            id_idx,
        );

        let affected = self.sql
            .exec(&sql, &params)
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(AuthError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }

    /// Delete a record by id.
    pub(crate) fn delete_record(&self, table: &str, id: &str) -> Result<(), AuthError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table);
        let affected = self.sql
            .exec(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(AuthError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }

    /// List records with equality filters, newest first.
    pub(crate) fn list_records<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<T>, AuthError> {
        let mut where_clauses = Vec::new();
        let mut params = Vec::new();

        for (i, (col, val)) in filters.iter().enumerate() {
            where_clauses.push(format!("{} = ?{}", col, i + 1));
            params.push(val.clone());
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT data FROM {}{} ORDER BY created_at DESC",
            table, where_sql,
        );

        let rows = self.sql
            .query(&sql, &params)
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| AuthError::Internal("missing data column".into()))?;
            let item: T =
                serde_json::from_str(data).map_err(|e| AuthError::Internal(e.to_string()))?;
            items.push(item);
        }

        Ok(items)
    }

    /// Count records matching equality filters.
    pub(crate) fn count_records(
        &self,
        table: &str,
        filters: &[(&str, Value)],
    ) -> Result<usize, AuthError> {
        let mut where_clauses = Vec::new();
        let mut params = Vec::new();

        for (i, (col, val)) in filters.iter().enumerate() {
            where_clauses.push(format!("{} = ?{}", col, i + 1));
            params.push(val.clone());
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let sql = format!("SELECT COUNT(*) AS cnt FROM {}{}", table, where_sql);
        let rows = self.sql
            .query(&sql, &params)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use realdesk_sql::SqliteStore;

    use super::{AuthConfig, AuthService};
    use crate::model::CreateProfile;

    pub fn test_service() -> Arc<AuthService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AuthService::new(sql, AuthConfig::default()).unwrap()
    }

    pub fn staff_profile(role: &str, company_id: Option<&str>) -> CreateProfile {
        CreateProfile {
            email: format!("{}@example.com", realdesk_core::new_id()),
            name: "Test User".to_string(),
            role: role.to_string(),
            company_id: company_id.map(|s| s.to_string()),
            status: "active".to_string(),
            password: "pw-123456".to_string(),
        }
    }
}
