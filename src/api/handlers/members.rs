use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::params::ListParams;
use crate::api::state::AppState;
use crate::domain::member::{Member, MemberDto};
use crate::domain::page::Page;

/// One page of results plus its pagination metadata, as sent on the wire
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    pub first: bool,
    pub has_next: bool,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            page: page.number(),
            size: page.size(),
            total_elements: page.total_elements(),
            total_pages: page.total_pages(),
            first: page.is_first(),
            has_next: page.has_next(),
            content: page.into_content(),
        }
    }
}

/// Request body for creating a member
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    pub username: String,
    #[serde(default)]
    pub age: i32,
    pub team_id: Option<Uuid>,
}

/// List members as DTOs, one page at a time
///
/// GET /members?page=0&size=3&sort=username,desc
///
/// The team name is eager-loaded by the page query itself, so mapping to
/// DTOs never goes back to the database per row.
pub async fn list_members(
    State(state): State<AppState>,
    Query(raw): Query<Vec<(String, String)>>,
) -> Result<Json<PageResponse<MemberDto>>, ApiError> {
    let params = ListParams::from_pairs(&raw, state.page_limits)?;

    let page = state
        .members
        .find_page_with_team(&params.filter, &params.sort, params.page)
        .await?;

    let dtos = page.map(|entry| entry.to_dto());

    Ok(Json(dtos.into()))
}

/// Get a single member as a DTO
///
/// GET /members/:id
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemberDto>, ApiError> {
    let member = state
        .members
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Member not found: {id}")))?;

    // Single-row path: resolving the team is one extra lookup at most
    let team = match member.team_id() {
        Some(team_id) => state.teams.find_by_id(team_id).await?,
        None => None,
    };

    Ok(Json(MemberDto::project(&member, team.as_ref())))
}

/// Create a new member, optionally assigned to a team
///
/// POST /members
pub async fn create_member(
    State(state): State<AppState>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<MemberDto>), ApiError> {
    let mut member = Member::new(req.username, req.age).map_err(ApiError::bad_request)?;

    let team = match req.team_id {
        Some(team_id) => {
            let mut team = state
                .teams
                .find_by_id(team_id)
                .await?
                .ok_or_else(|| ApiError::bad_request(format!("Team not found: {team_id}")))?;
            member.change_team(&mut team);
            Some(team)
        }
        None => None,
    };

    state.members.save(&member).await?;

    Ok((
        StatusCode::CREATED,
        Json(MemberDto::project(&member, team.as_ref())),
    ))
}
