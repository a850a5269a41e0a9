use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{JoinRequestStatus, PartyType};

/// A record of a workflow event addressed to one recipient.
///
/// Notifications are append-only from the system's point of view: once
/// delivered they are only ever mutated to flip `read`, or to mirror the
/// terminal `status` of the join request they refer to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub payload: NotificationPayload,
    pub read: bool,
    /// Mirrors the referenced join request's status for request-type notifications.
    pub status: Option<JoinRequestStatus>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// A fresh, unread notification. The mirrored status starts from what
    /// the payload type implies about the join request.
    pub fn new(recipient_id: Uuid, payload: NotificationPayload) -> Self {
        let status = match payload.kind() {
            NotificationKind::TeamJoinRequest => JoinRequestStatus::Pending,
            NotificationKind::TeamRequestAccepted => JoinRequestStatus::Accepted,
            NotificationKind::TeamRequestRejected => JoinRequestStatus::Rejected,
        };

        Self {
            id: Uuid::new_v4(),
            recipient_id,
            payload,
            read: false,
            status: Some(status),
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> NotificationKind {
        self.payload.kind()
    }
}

/// Typed notification body, tagged by notification type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationPayload {
    /// A new join request awaits the recipient's answer.
    TeamJoinRequest(JoinRequestContext),
    /// A join request the recipient's side initiated was accepted.
    TeamRequestAccepted(JoinRequestContext),
    /// A join request the recipient's side initiated was rejected.
    TeamRequestRejected(JoinRequestContext),
}

impl NotificationPayload {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::TeamJoinRequest(_) => NotificationKind::TeamJoinRequest,
            Self::TeamRequestAccepted(_) => NotificationKind::TeamRequestAccepted,
            Self::TeamRequestRejected(_) => NotificationKind::TeamRequestRejected,
        }
    }

    pub fn context(&self) -> &JoinRequestContext {
        match self {
            Self::TeamJoinRequest(ctx)
            | Self::TeamRequestAccepted(ctx)
            | Self::TeamRequestRejected(ctx) => ctx,
        }
    }
}

/// The join request a notification is about, with enough team and
/// participant context to render it without another lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoinRequestContext {
    pub request_id: Uuid,
    pub team_id: Uuid,
    pub team_name: String,
    pub participant_id: Uuid,
    pub participant_name: String,
    /// Which side sent the request.
    pub initiator_type: PartyType,
}

/// Notification type discriminant, stored alongside the JSON payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    TeamJoinRequest,
    TeamRequestAccepted,
    TeamRequestRejected,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TeamJoinRequest => "TEAM_JOIN_REQUEST",
            Self::TeamRequestAccepted => "TEAM_REQUEST_ACCEPTED",
            Self::TeamRequestRejected => "TEAM_REQUEST_REJECTED",
        }
    }
}

/// Unread counter for one recipient.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnreadCount {
    pub recipient_id: Uuid,
    pub unread: u32,
}
