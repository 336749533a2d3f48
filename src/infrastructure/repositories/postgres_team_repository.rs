use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::map_db_err;
use crate::domain::repositories::TeamRepository;
use crate::domain::team::Team;
use crate::domain::RepositoryError;

/// PostgreSQL implementation of TeamRepository
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Creates a new PostgresTeamRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Team::from_persistence(row.id, row.name, row.created_at)
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn save(&self, team: &Team) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO team (id, name, created_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(team.id())
        .bind(team.name())
        .bind(team.created_at())
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, RepositoryError> {
        let row = sqlx::query_as::<_, TeamRow>(
            "SELECT id, name, created_at FROM team WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(row.map(Team::from))
    }

    async fn find_all(&self) -> Result<Vec<Team>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, TeamRow>("SELECT id, name, created_at FROM team ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Team::from).collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM team")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(count as u64)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM team WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected() > 0)
    }
}
