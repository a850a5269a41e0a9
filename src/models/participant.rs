use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SkillSet;

/// A hackathon participant as seen by the matching core.
///
/// Participants are registered per hackathon. The core treats a loaded
/// participant as an immutable snapshot for the duration of one
/// recommendation pass; a profile edit produces a new snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub id: Uuid,
    pub hackathon_id: Uuid,
    pub name: String,
    pub skills: SkillSet,
    pub experience_level: ExperienceLevel,
    /// Whether the participant wants to be suggested to teams.
    /// Cleared when they join a team, restored when they leave one.
    pub looking_for_team: bool,
    pub created_at: DateTime<Utc>,
}

/// Self-reported experience level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

/// Input for registering a participant in a hackathon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateParticipantInput {
    pub name: String,
    #[serde(default)]
    pub skills: SkillSet,
    /// Defaults to `Beginner` if not specified.
    pub experience_level: Option<ExperienceLevel>,
    /// Defaults to `true`: registering interest means looking for a team.
    pub looking_for_team: Option<bool>,
}

/// Input for updating a participant's profile. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateParticipantInput {
    pub name: Option<String>,
    /// Replaces the whole skill set when present.
    pub skills: Option<SkillSet>,
    pub experience_level: Option<ExperienceLevel>,
    pub looking_for_team: Option<bool>,
}
