use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::team::Team;

/// Member aggregate root
///
/// # Invariants
/// - Username cannot be empty
/// - Team assignment goes through [`Member::change_team`], which updates the
///   owning reference and the team's member collection in one step
///
/// # Example
/// ```
/// use roster_api::domain::member::Member;
/// use roster_api::domain::team::Team;
///
/// let mut team = Team::new("teamA").expect("valid team");
/// let mut member = Member::new("member1", 10).expect("valid member");
///
/// member.change_team(&mut team);
///
/// assert_eq!(member.team_id(), Some(team.id()));
/// assert!(team.members().contains(&member.id()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    id: Uuid,
    username: String,
    age: i32,
    team_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl Member {
    /// Creates a new Member with no team
    ///
    /// # Returns
    /// * `Ok(Member)` - New member with a fresh id
    /// * `Err(String)` - If the username is empty
    pub fn new(username: impl Into<String>, age: i32) -> Result<Self, String> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err("Username cannot be empty".to_string());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            username,
            age,
            team_id: None,
            created_at: Utc::now(),
        })
    }

    /// Creates a member already assigned to a team
    pub fn with_team(
        username: impl Into<String>,
        age: i32,
        team: &mut Team,
    ) -> Result<Self, String> {
        let mut member = Self::new(username, age)?;
        member.change_team(team);
        Ok(member)
    }

    /// Assigns the member to a team
    ///
    /// The single mutator for the bidirectional association: sets the owning
    /// reference and enrolls the member on the team's collection together,
    /// so the two sides cannot diverge.
    pub fn change_team(&mut self, team: &mut Team) {
        self.team_id = Some(team.id());
        team.enroll(self.id);
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn team_id(&self) -> Option<Uuid> {
        self.team_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Reconstructs a Member from persistence layer data
    ///
    /// Bypasses validation since stored rows already satisfied it. Only to
    /// be used by repository implementations.
    pub fn from_persistence(
        id: Uuid,
        username: String,
        age: i32,
        team_id: Option<Uuid>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            age,
            team_id,
            created_at,
        }
    }
}
