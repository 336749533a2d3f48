use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::member::Member;
use crate::domain::team::Team;

/// Read-only projection of a member joined with its team's name
///
/// Never persisted; constructed fresh per query result, either directly by
/// a projecting query or from an already-loaded member/team pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub id: Uuid,
    pub username: String,
    pub team_name: Option<String>,
}

impl MemberDto {
    pub fn new(id: Uuid, username: impl Into<String>, team_name: Option<String>) -> Self {
        Self {
            id,
            username: username.into(),
            team_name,
        }
    }

    /// Projects a member together with its (optionally loaded) team
    pub fn project(member: &Member, team: Option<&Team>) -> Self {
        Self {
            id: member.id(),
            username: member.username().to_string(),
            team_name: team.map(|t| t.name().to_string()),
        }
    }
}
