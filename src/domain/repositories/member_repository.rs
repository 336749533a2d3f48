use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::RepositoryError;
use crate::domain::member::{Member, MemberDto};
use crate::domain::page::{Page, PageRequest, Sort};
use crate::domain::team::Team;

/// Conjunctive exact-match filter for member queries
///
/// Every set field must match; an empty filter matches all members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberFilter {
    pub username: Option<String>,
    pub age: Option<i32>,
}

impl MemberFilter {
    pub fn by_age(age: i32) -> Self {
        Self {
            age: Some(age),
            ..Self::default()
        }
    }

    pub fn by_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, member: &Member) -> bool {
        if let Some(ref username) = self.username {
            if member.username() != username {
                return false;
            }
        }
        if let Some(age) = self.age {
            if member.age() != age {
                return false;
            }
        }
        true
    }
}

/// A member with its team association loaded by the same query
#[derive(Debug, Clone, PartialEq)]
pub struct MemberWithTeam {
    pub member: Member,
    pub team: Option<Team>,
}

impl MemberWithTeam {
    pub fn to_dto(&self) -> MemberDto {
        MemberDto::project(&self.member, self.team.as_ref())
    }
}

/// Repository trait for the Member aggregate
///
/// Defines the contract for persisting and querying members. Absent rows
/// are `None`/empty results, never errors; implementations surface write
/// conflicts and infrastructure failures as [`RepositoryError`].
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Save a member (insert or update, keyed on id)
    async fn save(&self, member: &Member) -> Result<(), RepositoryError>;

    /// Delete a member by id; returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// Count all members
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Find a member by its id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>, RepositoryError>;

    /// Find all members
    async fn find_all(&self) -> Result<Vec<Member>, RepositoryError>;

    /// Exact-match username lookup
    async fn find_by_username(&self, username: &str) -> Result<Vec<Member>, RepositoryError>;

    /// Singular username lookup
    ///
    /// Zero matches is `Ok(None)`; more than one match is
    /// [`RepositoryError::NonUnique`], never a silently picked row.
    async fn find_one_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Member>, RepositoryError>;

    /// Conjunctive exact-match filter on username and age
    async fn find_by_username_and_age(
        &self,
        username: &str,
        age: i32,
    ) -> Result<Vec<Member>, RepositoryError>;

    /// Membership filter: members whose username is in `names`
    async fn find_by_usernames(&self, names: &[String]) -> Result<Vec<Member>, RepositoryError>;

    /// Single-column projection of every username, in username order
    async fn find_usernames(&self) -> Result<Vec<String>, RepositoryError>;

    /// Joins members to their teams and projects DTOs in one query
    ///
    /// Members without a team are excluded (inner join).
    async fn find_member_dtos(&self) -> Result<Vec<MemberDto>, RepositoryError>;

    /// Loads every member with its team association eagerly, one query for
    /// the whole result set rather than one per row
    async fn find_all_with_team(&self) -> Result<Vec<MemberWithTeam>, RepositoryError>;

    /// One page of members matching `filter`, ordered per `sort`
    ///
    /// Returns at most `page.size()` rows starting at `page.offset()`; the
    /// total count comes from a separate query over the same filter.
    async fn find_page(
        &self,
        filter: &MemberFilter,
        sort: &Sort,
        page: PageRequest,
    ) -> Result<Page<Member>, RepositoryError>;

    /// Paged variant of [`MemberRepository::find_all_with_team`]: the team
    /// association is eager-loaded by the page query itself
    async fn find_page_with_team(
        &self,
        filter: &MemberFilter,
        sort: &Sort,
        page: PageRequest,
    ) -> Result<Page<MemberWithTeam>, RepositoryError>;
}
