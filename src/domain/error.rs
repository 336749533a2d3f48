use thiserror::Error;

/// Errors surfaced by repository implementations
///
/// Absence of a row is never an error; lookups return `Option`. These
/// variants cover the failures a caller may want to tell apart: a write
/// rejected by a database constraint, a singular lookup that matched more
/// than one row, and everything infrastructural.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("constraint violation: {message}")]
    Conflict { message: String },

    #[error("lookup for {context} matched {count} rows, expected at most one")]
    NonUnique { context: String, count: usize },

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn non_unique(context: impl Into<String>, count: usize) -> Self {
        Self::NonUnique {
            context: context.into(),
            count,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// True for write failures caused by a unique or foreign key constraint
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_conflict() {
        assert!(RepositoryError::conflict("duplicate key").is_conflict());
        assert!(!RepositoryError::storage("connection reset").is_conflict());
    }

    #[test]
    fn non_unique_names_the_lookup() {
        let err = RepositoryError::non_unique("username = 'AAA'", 2);
        let message = err.to_string();
        assert!(message.contains("username = 'AAA'"));
        assert!(message.contains("2 rows"));
    }
}
