//! Contract cache rows: the local mirror of provider documents plus
//! the local-only overlay (`property_id`, `file_key`).

use realdesk_sql::Value;

use crate::error::EsignError;
use crate::model::ContractRecord;
use crate::service::EsignService;
use realdesk_core::{new_id, now_rfc3339};

fn row_indexes(record: &ContractRecord) -> [(&'static str, Value); 6] {
    [
        ("user_id", Value::Text(record.user_id.clone())),
        ("company_id", match &record.company_id {
            Some(id) => Value::Text(id.clone()),
            None => Value::Null,
        }),
        ("document_id", Value::Text(record.document_id.clone())),
        ("status", Value::Text(record.status.clone())),
        ("created_at", Value::Text(record.created_at.clone())),
        ("updated_at", Value::Text(record.updated_at.clone())),
    ]
}

impl EsignService {
    /// Cached rows for an account, newest first.
    pub(crate) fn cached_contracts(
        &self,
        user_id: &str,
    ) -> Result<Vec<ContractRecord>, EsignError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM contracts WHERE user_id = ?1 ORDER BY created_at DESC",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| EsignError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| EsignError::Internal("missing data column".into()))?;
            items.push(
                serde_json::from_str(data).map_err(|e| EsignError::Internal(e.to_string()))?,
            );
        }
        Ok(items)
    }

    /// A cached row by provider document id, scoped to the account.
    pub(crate) fn cached_contract(
        &self,
        user_id: &str,
        document_id: &str,
    ) -> Result<Option<ContractRecord>, EsignError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM contracts WHERE user_id = ?1 AND document_id = ?2",
                &[
                    Value::Text(user_id.to_string()),
                    Value::Text(document_id.to_string()),
                ],
            )
            .map_err(|e| EsignError::Storage(e.to_string()))?;
        match rows.first().and_then(|r| r.get_str("data")) {
            Some(data) => Ok(Some(
                serde_json::from_str(data).map_err(|e| EsignError::Internal(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    /// Insert a fresh cache row for a newly created provider document.
    pub(crate) fn insert_cached_contract(
        &self,
        user_id: &str,
        document_id: &str,
        name: &str,
        status: &str,
        property_id: Option<String>,
    ) -> Result<ContractRecord, EsignError> {
        let company_id = self.auth.get_profile(user_id).ok().and_then(|p| p.company_id);
        let now = now_rfc3339();
        let record = ContractRecord {
            id: new_id(),
            user_id: user_id.to_string(),
            company_id,
            document_id: document_id.to_string(),
            status: status.to_string(),
            name: name.to_string(),
            property_id,
            file_key: None,
            created_at: now.clone(),
            updated_at: now,
            downloaded_at: None,
        };

        let json =
            serde_json::to_string(&record).map_err(|e| EsignError::Internal(e.to_string()))?;
        let indexes = row_indexes(&record);
        let mut params = vec![
            Value::Text(record.id.clone()),
            Value::Text(json),
        ];
        params.extend(indexes.iter().map(|(_, v)| v.clone()));
        self.sql
            .exec(
                "INSERT INTO contracts (id, data, user_id, company_id, document_id, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                &params,
            )
            .map_err(|e| EsignError::Storage(e.to_string()))?;

        Ok(record)
    }

    /// Persist a changed cache row.
    pub(crate) fn save_cached_contract(
        &self,
        record: &mut ContractRecord,
    ) -> Result<(), EsignError> {
        record.updated_at = now_rfc3339();
        let json =
            serde_json::to_string(record).map_err(|e| EsignError::Internal(e.to_string()))?;
        let indexes = row_indexes(record);
        let mut params = vec![Value::Text(json)];
        params.extend(indexes.iter().map(|(_, v)| v.clone()));
        params.push(Value::Text(record.id.clone()));
        let affected = self
            .sql
            .exec(
                "UPDATE contracts SET data = ?1, user_id = ?2, company_id = ?3,
                 document_id = ?4, status = ?5, created_at = ?6, updated_at = ?7
                 WHERE id = ?8",
                &params,
            )
            .map_err(|e| EsignError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(EsignError::NotFound(format!("contracts/{}", record.id)));
        }
        Ok(())
    }
}
