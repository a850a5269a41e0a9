use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SkillSet;

/// A hackathon team with bounded capacity.
///
/// `member_skills` is never stored; it is recomputed from the current
/// members every time the team is loaded, so it always reflects the roster.
/// `current_size` is the column the workflow compares-and-increments when a
/// join request is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: Uuid,
    pub hackathon_id: Uuid,
    pub name: String,
    /// The member who answers join requests addressed to the team.
    pub leader_id: Uuid,
    pub member_ids: Vec<Uuid>,
    pub member_skills: SkillSet,
    pub current_size: u32,
    pub max_size: u32,
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Remaining capacity. Never negative.
    pub fn open_roles(&self) -> u32 {
        self.max_size.saturating_sub(self.current_size)
    }

    pub fn has_open_roles(&self) -> bool {
        self.open_roles() > 0
    }

    pub fn has_member(&self, participant_id: Uuid) -> bool {
        self.member_ids.contains(&participant_id)
    }
}

/// Input for creating a team. The leader becomes the first member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeamInput {
    pub name: String,
    pub leader_id: Uuid,
    pub max_size: u32,
}
