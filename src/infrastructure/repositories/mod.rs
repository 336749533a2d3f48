// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory;
pub mod postgres_member_repository;
pub mod postgres_team_repository;

pub use in_memory::{InMemoryMemberRepository, InMemoryStore, InMemoryTeamRepository};
pub use postgres_member_repository::PostgresMemberRepository;
pub use postgres_team_repository::PostgresTeamRepository;

use crate::domain::RepositoryError;

/// Maps a sqlx error onto the repository taxonomy
///
/// Unique (23505) and foreign key (23503) violations become conflicts;
/// everything else is an infrastructure failure.
pub(crate) fn map_db_err(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db) = err {
        if matches!(db.code().as_deref(), Some("23505") | Some("23503")) {
            return RepositoryError::conflict(db.message().to_string());
        }
    }
    RepositoryError::storage(err.to_string())
}
