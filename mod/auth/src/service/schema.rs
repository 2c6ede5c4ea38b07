use realdesk_sql::SQLStore;

use crate::service::AuthError;

/// Initialize the SQLite schema for accounts, tenants and sessions.
///
/// Every table follows the same shape: `id` + a JSON `data` document +
/// a few indexed columns used in WHERE clauses.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), AuthError> {
    let statements = [
        // Tenants. Name is unique and user-facing.
        "CREATE TABLE IF NOT EXISTS companies (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            manager_id TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_companies_name ON companies(name)",

        // Accounts. Email is the legacy-login lookup key.
        "CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            company_id TEXT,
            status TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_profiles_email ON profiles(email)",
        "CREATE INDEX IF NOT EXISTS idx_profiles_company ON profiles(company_id)",
        "CREATE INDEX IF NOT EXISTS idx_profiles_role ON profiles(company_id, role)",

        // JWT issuance records.
        "CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            revoked INTEGER NOT NULL DEFAULT 0,
            issued_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
    ];

    for stmt in statements {
        sql.exec(stmt, &[])
            .map_err(|e| AuthError::Storage(e.to_string()))?;
    }

    Ok(())
}
