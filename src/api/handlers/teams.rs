use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::domain::team::Team;

/// Request body for creating a team
#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
}

/// Response from team lookups and creation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id(),
            name: team.name().to_string(),
            created_at: team.created_at(),
        }
    }
}

/// Create a new team
///
/// POST /teams
pub async fn create_team(
    State(state): State<AppState>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let team = Team::new(req.name).map_err(ApiError::bad_request)?;

    state.teams.save(&team).await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(&team))))
}

/// Get a team by ID
///
/// GET /teams/:id
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state
        .teams
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Team not found: {id}")))?;

    Ok(Json(TeamResponse::from(&team)))
}

/// Delete a team
///
/// DELETE /teams/:id
///
/// Fails with 409 while members still reference the team.
pub async fn delete_team(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let removed = state.teams.delete(id).await?;
    if !removed {
        return Err(ApiError::not_found(format!("Team not found: {id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}
