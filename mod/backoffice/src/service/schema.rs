use realdesk_sql::SQLStore;

use crate::model::EntityKind;
use crate::service::OfficeError;

/// Initialize the back-office tables. The entity tables all share one
/// shape; share links add a unique public token.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), OfficeError> {
    for kind in EntityKind::ALL {
        let table = kind.table();
        let create = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                company_id TEXT,
                manager_id TEXT NOT NULL,
                status TEXT,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            table
        );
        sql.exec(&create, &[])
            .map_err(|e| OfficeError::Storage(e.to_string()))?;
        let idx_company = format!(
            "CREATE INDEX IF NOT EXISTS idx_{t}_company ON {t}(company_id)",
            t = table
        );
        sql.exec(&idx_company, &[])
            .map_err(|e| OfficeError::Storage(e.to_string()))?;
        let idx_manager = format!(
            "CREATE INDEX IF NOT EXISTS idx_{t}_manager ON {t}(manager_id)",
            t = table
        );
        sql.exec(&idx_manager, &[])
            .map_err(|e| OfficeError::Storage(e.to_string()))?;
    }

    let statements = [
        "CREATE TABLE IF NOT EXISTS share_links (
            id TEXT PRIMARY KEY,
            token TEXT NOT NULL UNIQUE,
            property_id TEXT NOT NULL,
            consultant_id TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            view_count INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_share_links_token ON share_links(token)",
        "CREATE INDEX IF NOT EXISTS idx_share_links_consultant ON share_links(consultant_id)",
    ];
    for stmt in statements {
        sql.exec(stmt, &[])
            .map_err(|e| OfficeError::Storage(e.to_string()))?;
    }

    Ok(())
}
