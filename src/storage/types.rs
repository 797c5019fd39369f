use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Local state store errors with user-facing messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another techflow process holds the state database
    #[error("Another instance of techflow appears to be running. Please close it and try again.")]
    InstanceLocked,

    #[error("State database migration failed: {0}")]
    Migration(String),

    #[error("State database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Lock and open failures become `InstanceLocked`; everything else is
    /// passed through.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if is_lock_message(&err.to_string()) {
            return DatabaseError::InstanceLocked;
        }
        DatabaseError::Other(err)
    }
}

/// SQLITE_BUSY (5), SQLITE_LOCKED (6) and SQLITE_CANTOPEN (14) all surface
/// as one of these strings.
pub(crate) fn is_lock_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("database is locked")
        || lower.contains("database table is locked")
        || lower.contains("sqlite_busy")
        || lower.contains("sqlite_locked")
        || lower.contains("unable to open database file")
}

// ============================================================================
// Rows
// ============================================================================

/// One persisted key/value entry.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StateEntry {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_messages_are_detected() {
        assert!(is_lock_message("error returned from database: database is locked"));
        assert!(is_lock_message("SQLITE_BUSY"));
        assert!(is_lock_message("(code: 14) unable to open database file"));
        assert!(!is_lock_message("no such table: local_state"));
    }
}
