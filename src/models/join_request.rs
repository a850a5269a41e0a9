use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A directional proposal to add a participant to a team.
///
/// Either side may initiate: a participant asking to join ("Request to Join")
/// or a team inviting a participant ("Invite"). Exactly one of initiator and
/// target is a team. `team_id` and `participant_id` name the two sides
/// regardless of direction.
///
/// # Lifecycle
/// `Pending` → `Accepted` | `Rejected`. Resolved requests are immutable
/// history and cannot be reopened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoinRequest {
    pub id: Uuid,
    pub initiator_id: Uuid,
    pub initiator_type: PartyType,
    pub target_id: Uuid,
    pub target_type: PartyType,
    pub team_id: Uuid,
    pub participant_id: Uuid,
    pub message: Option<String>,
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Which kind of roster entity a side of a join request is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PartyType {
    Participant,
    Team,
}

impl PartyType {
    /// The other kind; a join request always pairs one of each.
    pub fn opposite(self) -> Self {
        match self {
            Self::Participant => Self::Team,
            Self::Team => Self::Participant,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Team => "team",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "participant" => Some(Self::Participant),
            "team" => Some(Self::Team),
            _ => None,
        }
    }
}

/// The status of a join request.
///
/// - `Pending`: Waiting for the target to respond
/// - `Accepted`: The participant joined the team
/// - `Rejected`: The target declined
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JoinRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl JoinRequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A responder's answer to a pending join request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn resulting_status(self) -> JoinRequestStatus {
        match self {
            Self::Accept => JoinRequestStatus::Accepted,
            Self::Reject => JoinRequestStatus::Rejected,
        }
    }
}

/// Input for creating a join request. The target's type is implied by the
/// initiator's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJoinRequestInput {
    pub initiator_id: Uuid,
    pub initiator_type: PartyType,
    pub target_id: Uuid,
    #[serde(default)]
    pub message: Option<String>,
}

/// Input for answering a join request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondJoinRequestInput {
    pub decision: Decision,
}

/// Result of creating a join request: the pending record and the
/// notification delivered to the target's recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequestCreated {
    pub request: JoinRequest,
    pub notification: super::Notification,
}

/// Result of resolving a join request: the terminal record and the
/// notification delivered back to the initiator's recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequestResolved {
    pub request: JoinRequest,
    pub notification: super::Notification,
}
