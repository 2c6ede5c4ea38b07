use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl SQLError {
    /// Whether this error came from a UNIQUE constraint violation.
    ///
    /// Used to detect insert races (e.g. two signups creating the same
    /// company) so the loser can re-fetch and join the existing row.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            SQLError::Execution(m) | SQLError::Query(m) => m.contains("UNIQUE constraint"),
            SQLError::Connection(_) => false,
        }
    }
}
