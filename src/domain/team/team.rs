use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Team aggregate root
///
/// A named group that members can be assigned to. The `members` collection
/// is the inverse side of the association: bookkeeping only, kept in sync
/// by [`Member::change_team`](crate::domain::member::Member::change_team),
/// never written independently. The authoritative association is the
/// member's own team reference.
///
/// # Invariants
/// - Name cannot be empty
///
/// # Example
/// ```
/// use roster_api::domain::team::Team;
///
/// let team = Team::new("teamA").expect("valid team");
/// assert_eq!(team.name(), "teamA");
/// assert!(team.members().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    id: Uuid,
    name: String,
    members: Vec<Uuid>,
    created_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new Team aggregate
    ///
    /// # Returns
    /// * `Ok(Team)` - New team with a fresh id and empty member collection
    /// * `Err(String)` - If the name is empty
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Team name cannot be empty".to_string());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            members: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Records a member on the inverse side of the association
    ///
    /// Called from the member's team mutator so both sides change together.
    pub(crate) fn enroll(&mut self, member_id: Uuid) {
        if !self.members.contains(&member_id) {
            self.members.push(member_id);
        }
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member ids enrolled through this process's mutations
    ///
    /// Not authoritative: teams loaded from persistence start empty and the
    /// member table is queried for the real roster.
    pub fn members(&self) -> &[Uuid] {
        &self.members
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Reconstructs a Team from persistence layer data
    ///
    /// Bypasses validation since stored rows already satisfied it. The
    /// member collection is left empty; only repository implementations
    /// should call this.
    pub fn from_persistence(id: Uuid, name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            members: Vec::new(),
            created_at,
        }
    }
}
