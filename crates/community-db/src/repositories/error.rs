//! Error handling utilities for repositories

use community_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError.
///
/// Failures to reach the database at all become `DatabaseUnavailable` so the
/// error classifier can escalate them as critical.
pub fn map_db_error(e: SqlxError) -> DomainError {
    match e {
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) | SqlxError::Tls(_) => {
            DomainError::DatabaseUnavailable(e.to_string())
        }
        other => DomainError::DatabaseError(other.to_string()),
    }
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failures_are_unavailable() {
        assert!(map_db_error(SqlxError::PoolTimedOut).is_unavailable());
        assert!(map_db_error(SqlxError::PoolClosed).is_unavailable());
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(map_db_error(SqlxError::Io(io)).is_unavailable());
    }

    #[test]
    fn test_other_failures_are_database_errors() {
        let err = map_db_error(SqlxError::RowNotFound);
        assert!(matches!(err, DomainError::DatabaseError(_)));
        assert!(!err.is_unavailable());
    }
}
