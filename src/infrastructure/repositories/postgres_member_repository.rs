use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::map_db_err;
use crate::domain::member::{Member, MemberDto};
use crate::domain::page::{Direction, Page, PageRequest, Sort, SortField};
use crate::domain::repositories::{MemberFilter, MemberRepository, MemberWithTeam};
use crate::domain::team::Team;
use crate::domain::RepositoryError;

/// PostgreSQL implementation of MemberRepository
///
/// Queries are runtime-checked so the crate builds without a live database.
/// Filters bind optional parameters (`$n IS NULL OR column = $n`) instead of
/// assembling SQL from request input; order-by clauses come from the closed
/// [`SortField`] set.
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    /// Creates a new PostgresMemberRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Total count over the same filter used by the page query
    async fn count_filtered(&self, filter: &MemberFilter) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM member \
             WHERE ($1::text IS NULL OR username = $1) \
               AND ($2::int4 IS NULL OR age = $2)",
        )
        .bind(filter.username.as_deref())
        .bind(filter.age)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(count as u64)
    }
}

const MEMBER_COLUMNS: &str = "member_id, username, age, team_id, created_at";

#[derive(sqlx::FromRow)]
struct MemberRow {
    member_id: Uuid,
    username: String,
    age: i32,
    team_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member::from_persistence(
            row.member_id,
            row.username,
            row.age,
            row.team_id,
            row.created_at,
        )
    }
}

#[derive(sqlx::FromRow)]
struct MemberTeamRow {
    member_id: Uuid,
    username: String,
    age: i32,
    team_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    team_name: Option<String>,
    team_created_at: Option<DateTime<Utc>>,
}

impl From<MemberTeamRow> for MemberWithTeam {
    fn from(row: MemberTeamRow) -> Self {
        let MemberTeamRow {
            member_id,
            username,
            age,
            team_id,
            created_at,
            team_name,
            team_created_at,
        } = row;

        let team = match (team_id, team_name, team_created_at) {
            (Some(id), Some(name), Some(team_created_at)) => {
                Some(Team::from_persistence(id, name, team_created_at))
            }
            _ => None,
        };

        Self {
            member: Member::from_persistence(member_id, username, age, team_id, created_at),
            team,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MemberDtoRow {
    member_id: Uuid,
    username: String,
    team_name: String,
}

fn column(field: SortField) -> &'static str {
    match field {
        SortField::Id => "member_id",
        SortField::Username => "username",
        SortField::Age => "age",
    }
}

fn keyword(direction: Direction) -> &'static str {
    match direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
    }
}

/// Renders an ORDER BY clause from whitelisted sort fields
///
/// A `member_id ASC` tiebreaker is appended unless id is already a sort key,
/// so page boundaries stay deterministic for non-unique keys.
fn order_by(sort: &Sort, prefix: &str) -> String {
    let mut parts: Vec<String> = sort
        .orders()
        .iter()
        .map(|order| {
            format!(
                "{}{} {}",
                prefix,
                column(order.field),
                keyword(order.direction)
            )
        })
        .collect();

    if !sort.orders().iter().any(|o| o.field == SortField::Id) {
        parts.push(format!("{}member_id ASC", prefix));
    }

    parts.join(", ")
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn save(&self, member: &Member) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO member (member_id, username, age, team_id, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (member_id) DO UPDATE SET \
                 username = EXCLUDED.username, \
                 age = EXCLUDED.age, \
                 team_id = EXCLUDED.team_id",
        )
        .bind(member.id())
        .bind(member.username())
        .bind(member.age())
        .bind(member.team_id())
        .bind(member.created_at())
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM member WHERE member_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM member")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(count as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>, RepositoryError> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member WHERE member_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(row.map(Member::from))
    }

    async fn find_all(&self) -> Result<Vec<Member>, RepositoryError> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member ORDER BY member_id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Member::from).collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Vec<Member>, RepositoryError> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member WHERE username = $1"
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Member::from).collect())
    }

    async fn find_one_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Member>, RepositoryError> {
        let rows = self.find_by_username(username).await?;

        match rows.len() {
            0 | 1 => Ok(rows.into_iter().next()),
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
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member WHERE username = $1 AND age = $2"
        ))
        .bind(username)
        .bind(age)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Member::from).collect())
    }

    async fn find_by_usernames(&self, names: &[String]) -> Result<Vec<Member>, RepositoryError> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member WHERE username = ANY($1) ORDER BY member_id"
        ))
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Member::from).collect())
    }

    async fn find_usernames(&self) -> Result<Vec<String>, RepositoryError> {
        sqlx::query_scalar("SELECT username FROM member ORDER BY username")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)
    }

    async fn find_member_dtos(&self) -> Result<Vec<MemberDto>, RepositoryError> {
        let rows = sqlx::query_as::<_, MemberDtoRow>(
            "SELECT m.member_id, m.username, t.name AS team_name \
             FROM member m \
             JOIN team t ON t.id = m.team_id \
             ORDER BY m.member_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| MemberDto::new(r.member_id, r.username, Some(r.team_name)))
            .collect())
    }

    async fn find_all_with_team(&self) -> Result<Vec<MemberWithTeam>, RepositoryError> {
        let rows = sqlx::query_as::<_, MemberTeamRow>(
            "SELECT m.member_id, m.username, m.age, m.team_id, m.created_at, \
                    t.name AS team_name, t.created_at AS team_created_at \
             FROM member m \
             LEFT JOIN team t ON t.id = m.team_id \
             ORDER BY m.member_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.into_iter().map(MemberWithTeam::from).collect())
    }

    async fn find_page(
        &self,
        filter: &MemberFilter,
        sort: &Sort,
        page: PageRequest,
    ) -> Result<Page<Member>, RepositoryError> {
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM member \
             WHERE ($1::text IS NULL OR username = $1) \
               AND ($2::int4 IS NULL OR age = $2) \
             ORDER BY {} \
             LIMIT $3 OFFSET $4",
            order_by(sort, "")
        );

        let rows = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(filter.username.as_deref())
            .bind(filter.age)
            .bind(i64::from(page.size()))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;

        let total = self.count_filtered(filter).await?;

        Ok(Page::with_total(
            rows.into_iter().map(Member::from).collect(),
            page.page(),
            page.size(),
            total,
        ))
    }

    async fn find_page_with_team(
        &self,
        filter: &MemberFilter,
        sort: &Sort,
        page: PageRequest,
    ) -> Result<Page<MemberWithTeam>, RepositoryError> {
        let sql = format!(
            "SELECT m.member_id, m.username, m.age, m.team_id, m.created_at, \
                    t.name AS team_name, t.created_at AS team_created_at \
             FROM member m \
             LEFT JOIN team t ON t.id = m.team_id \
             WHERE ($1::text IS NULL OR m.username = $1) \
               AND ($2::int4 IS NULL OR m.age = $2) \
             ORDER BY {} \
             LIMIT $3 OFFSET $4",
            order_by(sort, "m.")
        );

        let rows = sqlx::query_as::<_, MemberTeamRow>(&sql)
            .bind(filter.username.as_deref())
            .bind(filter.age)
            .bind(i64::from(page.size()))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;

        let total = self.count_filtered(filter).await?;

        Ok(Page::with_total(
            rows.into_iter().map(MemberWithTeam::from).collect(),
            page.page(),
            page.size(),
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_by_appends_id_tiebreaker() {
        let sort = Sort::by(SortField::Username, Direction::Desc);

        assert_eq!(order_by(&sort, ""), "username DESC, member_id ASC");
    }

    #[test]
    fn order_by_skips_tiebreaker_when_sorting_by_id() {
        let sort = Sort::by(SortField::Id, Direction::Desc);

        assert_eq!(order_by(&sort, ""), "member_id DESC");
    }

    #[test]
    fn order_by_prefixes_every_column() {
        let sort = Sort::by(SortField::Age, Direction::Asc).and(SortField::Username, Direction::Desc);

        assert_eq!(
            order_by(&sort, "m."),
            "m.age ASC, m.username DESC, m.member_id ASC"
        );
    }

    #[test]
    fn unsorted_falls_back_to_id() {
        assert_eq!(order_by(&Sort::unsorted(), ""), "member_id ASC");
    }
}
