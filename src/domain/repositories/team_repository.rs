use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::RepositoryError;
use crate::domain::team::Team;

/// Repository trait for the Team aggregate
///
/// Defines the contract for persisting and retrieving teams.
/// Implementations should handle database-specific details.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Save a team (insert or update, keyed on id)
    ///
    /// Team names are unique; saving a second team with an existing name is
    /// a [`RepositoryError::Conflict`].
    async fn save(&self, team: &Team) -> Result<(), RepositoryError>;

    /// Find a team by its id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, RepositoryError>;

    /// Find all teams, in name order
    async fn find_all(&self) -> Result<Vec<Team>, RepositoryError>;

    /// Count all teams
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Delete a team by id; returns whether a row was removed
    ///
    /// Deleting a team that members still reference is a
    /// [`RepositoryError::Conflict`].
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
