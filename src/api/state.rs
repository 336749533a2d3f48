//! Shared application state

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::PageLimits;
use crate::domain::repositories::{MemberRepository, TeamRepository};
use crate::infrastructure::repositories::{
    InMemoryMemberRepository, InMemoryStore, InMemoryTeamRepository, PostgresMemberRepository,
    PostgresTeamRepository,
};

/// Application state handed to every handler
///
/// Repositories are behind dynamic dispatch so the same router runs against
/// PostgreSQL in production and the in-memory tables in tests.
#[derive(Clone)]
pub struct AppState {
    pub members: Arc<dyn MemberRepository>,
    pub teams: Arc<dyn TeamRepository>,
    pub page_limits: PageLimits,
}

impl AppState {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        teams: Arc<dyn TeamRepository>,
        page_limits: PageLimits,
    ) -> Self {
        Self {
            members,
            teams,
            page_limits,
        }
    }

    /// State backed by PostgreSQL repositories over one shared pool
    pub fn postgres(pool: PgPool, page_limits: PageLimits) -> Self {
        Self::new(
            Arc::new(PostgresMemberRepository::new(pool.clone())),
            Arc::new(PostgresTeamRepository::new(pool)),
            page_limits,
        )
    }

    /// State backed by in-memory tables, starting empty
    pub fn in_memory(page_limits: PageLimits) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(
            Arc::new(InMemoryMemberRepository::new(store.clone())),
            Arc::new(InMemoryTeamRepository::new(store)),
            page_limits,
        )
    }
}
