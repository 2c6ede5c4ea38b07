use realdesk_sql::SQLStore;

use crate::error::EsignError;

/// Initialize the contract cache table.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), EsignError> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS contracts (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            company_id TEXT,
            document_id TEXT NOT NULL,
            status TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_contracts_user ON contracts(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_contracts_document ON contracts(document_id)",
        "CREATE INDEX IF NOT EXISTS idx_contracts_company ON contracts(company_id)",
    ];
    for stmt in statements {
        sql.exec(stmt, &[])
            .map_err(|e| EsignError::Storage(e.to_string()))?;
    }
    Ok(())
}
