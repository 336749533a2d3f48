//! In-memory repository implementations
//!
//! Useful for tests and local development. Data is lost when the process
//! terminates. Both repositories share one [`InMemoryStore`] so that join
//! queries and referential checks see the same tables.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::member::{Member, MemberDto};
use crate::domain::page::{Direction, Page, PageRequest, Sort, SortField};
use crate::domain::repositories::{
    MemberFilter, MemberRepository, MemberWithTeam, TeamRepository,
};
use crate::domain::team::Team;
use crate::domain::RepositoryError;

/// Thread-safe in-memory member and team tables
#[derive(Debug, Default)]
pub struct InMemoryStore {
    members: RwLock<HashMap<Uuid, Member>>,
    teams: RwLock<HashMap<Uuid, Team>>,
}

impl InMemoryStore {
    /// Creates empty tables
    pub fn new() -> Self {
        Self::default()
    }

    fn read_members(&self) -> Result<Vec<Member>, RepositoryError> {
        let members = self
            .members
            .read()
            .map_err(|e| RepositoryError::storage(format!("Failed to acquire read lock: {e}")))?;
        Ok(members.values().cloned().collect())
    }

    fn read_teams(&self) -> Result<HashMap<Uuid, Team>, RepositoryError> {
        let teams = self
            .teams
            .read()
            .map_err(|e| RepositoryError::storage(format!("Failed to acquire read lock: {e}")))?;
        Ok(teams.clone())
    }
}

/// Mirrors the SQL implementation's comparator, id tiebreaker included
fn compare(a: &Member, b: &Member, sort: &Sort) -> Ordering {
    for order in sort.orders() {
        let by_field = match order.field {
            SortField::Id => a.id().cmp(&b.id()),
            SortField::Username => a.username().cmp(b.username()),
            SortField::Age => a.age().cmp(&b.age()),
        };
        let by_field = match order.direction {
            Direction::Asc => by_field,
            Direction::Desc => by_field.reverse(),
        };
        if by_field != Ordering::Equal {
            return by_field;
        }
    }
    a.id().cmp(&b.id())
}

/// Applies offset pagination to an already-filtered, already-sorted list
fn paginate<T>(mut items: Vec<T>, page: PageRequest) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let offset = page.offset() as usize;

    if offset < items.len() {
        items = items.into_iter().skip(offset).collect();
    } else {
        items.clear();
    }
    items.truncate(page.size() as usize);

    (items, total)
}

/// In-memory implementation of MemberRepository
pub struct InMemoryMemberRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryMemberRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }

    fn filtered_sorted(
        &self,
        filter: &MemberFilter,
        sort: &Sort,
    ) -> Result<Vec<Member>, RepositoryError> {
        let mut members: Vec<Member> = self
            .store
            .read_members()?
            .into_iter()
            .filter(|m| filter.matches(m))
            .collect();
        members.sort_by(|a, b| compare(a, b, sort));
        Ok(members)
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn save(&self, member: &Member) -> Result<(), RepositoryError> {
        if let Some(team_id) = member.team_id() {
            let teams = self.store.teams.read().map_err(|e| {
                RepositoryError::storage(format!("Failed to acquire read lock: {e}"))
            })?;
            if !teams.contains_key(&team_id) {
                return Err(RepositoryError::conflict(format!(
                    "foreign key violation: team {team_id} does not exist"
                )));
            }
        }

        let mut members = self
            .store
            .members
            .write()
            .map_err(|e| RepositoryError::storage(format!("Failed to acquire write lock: {e}")))?;
        members.insert(member.id(), member.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut members = self
            .store
            .members
            .write()
            .map_err(|e| RepositoryError::storage(format!("Failed to acquire write lock: {e}")))?;
        Ok(members.remove(&id).is_some())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.store.read_members()?.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>, RepositoryError> {
        let members = self
            .store
            .members
            .read()
            .map_err(|e| RepositoryError::storage(format!("Failed to acquire read lock: {e}")))?;
        Ok(members.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Member>, RepositoryError> {
        let mut members = self.store.read_members()?;
        members.sort_by_key(Member::id);
        Ok(members)
    }

    async fn find_by_username(&self, username: &str) -> Result<Vec<Member>, RepositoryError> {
        Ok(self
            .store
            .read_members()?
            .into_iter()
            .filter(|m| m.username() == username)
            .collect())
    }

    async fn find_one_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Member>, RepositoryError> {
        let matches = self.find_by_username(username).await?;

        match matches.len() {
            0 | 1 => Ok(matches.into_iter().next()),
            count => Err(RepositoryError::non_unique(
                format!("username = '{username}'"),
                count,
            )),
        }
    }

    async fn find_by_username_and_age(
        &self,
        username: &str,
        age: i32,
    ) -> Result<Vec<Member>, RepositoryError> {
        Ok(self
            .store
            .read_members()?
            .into_iter()
            .filter(|m| m.username() == username && m.age() == age)
            .collect())
    }

    async fn find_by_usernames(&self, names: &[String]) -> Result<Vec<Member>, RepositoryError> {
        let mut members: Vec<Member> = self
            .store
            .read_members()?
            .into_iter()
            .filter(|m| names.iter().any(|n| n == m.username()))
            .collect();
        members.sort_by_key(Member::id);
        Ok(members)
    }

    async fn find_usernames(&self) -> Result<Vec<String>, RepositoryError> {
        let mut usernames: Vec<String> = self
            .store
            .read_members()?
            .into_iter()
            .map(|m| m.username().to_string())
            .collect();
        usernames.sort();
        Ok(usernames)
    }

    async fn find_member_dtos(&self) -> Result<Vec<MemberDto>, RepositoryError> {
        let teams = self.store.read_teams()?;
        let mut members = self.store.read_members()?;
        members.sort_by_key(Member::id);

        Ok(members
            .into_iter()
            .filter_map(|m| {
                let team = m.team_id().and_then(|id| teams.get(&id))?;
                Some(MemberDto::new(
                    m.id(),
                    m.username(),
                    Some(team.name().to_string()),
                ))
            })
            .collect())
    }

    async fn find_all_with_team(&self) -> Result<Vec<MemberWithTeam>, RepositoryError> {
        let teams = self.store.read_teams()?;
        let mut members = self.store.read_members()?;
        members.sort_by_key(Member::id);

        Ok(members
            .into_iter()
            .map(|member| {
                let team = member.team_id().and_then(|id| teams.get(&id).cloned());
                MemberWithTeam { member, team }
            })
            .collect())
    }

    async fn find_page(
        &self,
        filter: &MemberFilter,
        sort: &Sort,
        page: PageRequest,
    ) -> Result<Page<Member>, RepositoryError> {
        let members = self.filtered_sorted(filter, sort)?;
        let (content, total) = paginate(members, page);

        Ok(Page::with_total(content, page.page(), page.size(), total))
    }

    async fn find_page_with_team(
        &self,
        filter: &MemberFilter,
        sort: &Sort,
        page: PageRequest,
    ) -> Result<Page<MemberWithTeam>, RepositoryError> {
        let teams = self.store.read_teams()?;
        let members = self.filtered_sorted(filter, sort)?;
        let (content, total) = paginate(members, page);

        let content = content
            .into_iter()
            .map(|member| {
                let team = member.team_id().and_then(|id| teams.get(&id).cloned());
                MemberWithTeam { member, team }
            })
            .collect();

        Ok(Page::with_total(content, page.page(), page.size(), total))
    }
}

/// In-memory implementation of TeamRepository
pub struct InMemoryTeamRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryTeamRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn save(&self, team: &Team) -> Result<(), RepositoryError> {
        let mut teams = self
            .store
            .teams
            .write()
            .map_err(|e| RepositoryError::storage(format!("Failed to acquire write lock: {e}")))?;

        let duplicate = teams
            .values()
            .any(|t| t.id() != team.id() && t.name() == team.name());
        if duplicate {
            return Err(RepositoryError::conflict(format!(
                "duplicate key: team name '{}' already exists",
                team.name()
            )));
        }

        teams.insert(team.id(), team.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, RepositoryError> {
        let teams = self
            .store
            .teams
            .read()
            .map_err(|e| RepositoryError::storage(format!("Failed to acquire read lock: {e}")))?;
        Ok(teams.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Team>, RepositoryError> {
        let mut teams: Vec<Team> = self.store.read_teams()?.into_values().collect();
        teams.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(teams)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.store.read_teams()?.len() as u64)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let referenced = self
            .store
            .read_members()?
            .iter()
            .any(|m| m.team_id() == Some(id));
        if referenced {
            return Err(RepositoryError::conflict(format!(
                "foreign key violation: members still reference team {id}"
            )));
        }

        let mut teams = self
            .store
            .teams
            .write()
            .map_err(|e| RepositoryError::storage(format!("Failed to acquire write lock: {e}")))?;
        Ok(teams.remove(&id).is_some())
    }
}
