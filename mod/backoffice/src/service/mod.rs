pub mod dashboard;
pub mod records;
pub mod schema;
pub mod settings;
pub mod share_link;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use auth::service::AuthService;
use realdesk_sql::{SQLStore, Value};

/// Back-office service error type.
#[derive(Debug, Error)]
pub enum OfficeError {
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

    #[error("gone: {0}")]
    Gone(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<OfficeError> for realdesk_core::ServiceError {
    fn from(e: OfficeError) -> Self {
        match e {
            OfficeError::NotFound(m) => realdesk_core::ServiceError::NotFound(m),
            OfficeError::Conflict(m) => realdesk_core::ServiceError::Conflict(m),
            OfficeError::Validation(m) => realdesk_core::ServiceError::Validation(m),
            OfficeError::Unauthorized(m) => realdesk_core::ServiceError::Unauthorized(m),
            OfficeError::Forbidden(m) => realdesk_core::ServiceError::PermissionDenied(m),
            OfficeError::Gone(m) => realdesk_core::ServiceError::Gone(m),
            OfficeError::Storage(m) => realdesk_core::ServiceError::Storage(m),
            OfficeError::Internal(m) => realdesk_core::ServiceError::Internal(m),
        }
    }
}

impl From<auth::service::AuthError> for OfficeError {
    fn from(e: auth::service::AuthError) -> Self {
        use auth::service::AuthError;
        match e {
            AuthError::NotFound(m) => OfficeError::NotFound(m),
            AuthError::Conflict(m) => OfficeError::Conflict(m),
            AuthError::Validation(m) => OfficeError::Validation(m),
            AuthError::Unauthorized(m) => OfficeError::Unauthorized(m),
            AuthError::Forbidden(m) => OfficeError::Forbidden(m),
            AuthError::Storage(m) => OfficeError::Storage(m),
            AuthError::Internal(m) => OfficeError::Internal(m),
        }
    }
}

/// The back-office service. Company-scoped CRUD over the entity
/// tables, share links, settings, and the dashboard.
pub struct OfficeService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) auth: Arc<AuthService>,
    pub(crate) settings_path: PathBuf,
}

impl OfficeService {
    /// Create a new OfficeService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        auth: Arc<AuthService>,
        settings_path: PathBuf,
    ) -> Result<Arc<Self>, OfficeError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self {
            sql,
            auth,
            settings_path,
        }))
    }

    /// Resolve a raw requester identifier, 401 on failure.
    pub(crate) fn require_requester(
        &self,
        raw: &str,
    ) -> Result<auth::model::RequesterProfile, OfficeError> {
        Ok(self.auth.require_requester(Some(raw))?)
    }

    // ── Generic CRUD helpers (shared pattern with AuthService) ──

    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), OfficeError> {
        let json =
            serde_json::to_string(record).map_err(|e| OfficeError::Internal(e.to_string()))?;

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
                OfficeError::Conflict(e.to_string())
            } else {
                OfficeError::Storage(e.to_string())
            }
        })?;

        Ok(())
    }

    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, OfficeError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| OfficeError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| OfficeError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| OfficeError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| OfficeError::Internal(e.to_string()))
    }

    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), OfficeError> {
        let json =
            serde_json::to_string(record).map_err(|e| OfficeError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!("UPDATE {} SET {} WHERE id = ?{}", table, sets.join(", "), id_idx);

        let affected = self
            .sql
            .exec(&sql, &params)
            .map_err(|e| OfficeError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(OfficeError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }

    pub(crate) fn delete_record(&self, table: &str, id: &str) -> Result<(), OfficeError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table);
        let affected = self
            .sql
            .exec(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| OfficeError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(OfficeError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }

    /// List records with equality filters, newest first.
    pub(crate) fn list_records<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<T>, OfficeError> {
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

        let rows = self
            .sql
            .query(&sql, &params)
            .map_err(|e| OfficeError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| OfficeError::Internal("missing data column".into()))?;
            let item: T =
                serde_json::from_str(data).map_err(|e| OfficeError::Internal(e.to_string()))?;
            items.push(item);
        }

        Ok(items)
    }

    pub(crate) fn count_records(
        &self,
        table: &str,
        filters: &[(&str, Value)],
    ) -> Result<usize, OfficeError> {
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
        let rows = self
            .sql
            .query(&sql, &params)
            .map_err(|e| OfficeError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize)
    }
}
