//! The team formation service: the action surface a UI or transport drives.
//!
//! `TeamFormation` ties the store to the push channel. Every workflow
//! transition is committed to the [`Database`] first; the notification it
//! produced is then published on the [`NotificationHub`] so live
//! subscribers see it without polling.

use uuid::Uuid;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::hub::{NotificationFeed, NotificationHub};
use crate::matching;
use crate::models::*;

#[derive(Clone)]
pub struct TeamFormation {
    db: Database,
    hub: NotificationHub,
}

impl TeamFormation {
    pub fn new(db: Database) -> Self {
        Self::with_hub(db, NotificationHub::new())
    }

    pub fn with_hub(db: Database, hub: NotificationHub) -> Self {
        Self { db, hub }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    // ============================================================
    // Roster boundary
    // ============================================================

    /// Teams of a hackathon that can still take members.
    pub fn list_candidate_teams(&self, hackathon_id: Uuid) -> Result<Vec<Team>> {
        let teams = self.db.get_teams_by_hackathon(hackathon_id)?;
        Ok(teams.into_iter().filter(Team::has_open_roles).collect())
    }

    /// Participants of a hackathon who are looking for a team.
    pub fn list_candidate_participants(&self, hackathon_id: Uuid) -> Result<Vec<Participant>> {
        let participants = self.db.get_participants_by_hackathon(hackathon_id)?;
        Ok(participants
            .into_iter()
            .filter(|p| p.looking_for_team)
            .collect())
    }

    // ============================================================
    // Recommendations
    // ============================================================

    /// Top-`k` counterparts for a participant (teams) or a team (participants),
    /// drawn from the subject's hackathon. Teams or participants the subject
    /// is already joined with are left out.
    pub fn get_recommendations(
        &self,
        subject_id: Uuid,
        subject_type: PartyType,
        k: usize,
    ) -> Result<Vec<MatchResult>> {
        match subject_type {
            PartyType::Participant => {
                let participant = self
                    .db
                    .get_participant(subject_id)?
                    .ok_or_else(|| Error::not_found(format!("Participant {}", subject_id)))?;
                let teams: Vec<Team> = self
                    .list_candidate_teams(participant.hackathon_id)?
                    .into_iter()
                    .filter(|team| !team.has_member(participant.id))
                    .collect();
                Ok(matching::recommend_teams(&participant, &teams, k))
            }
            PartyType::Team => {
                let team = self
                    .db
                    .get_team(subject_id)?
                    .ok_or_else(|| Error::not_found(format!("Team {}", subject_id)))?;
                let participants: Vec<Participant> = self
                    .list_candidate_participants(team.hackathon_id)?
                    .into_iter()
                    .filter(|p| !team.has_member(p.id))
                    .collect();
                Ok(matching::recommend_participants(&team, &participants, k))
            }
        }
    }

    // ============================================================
    // Join-request workflow
    // ============================================================

    pub fn create_join_request(&self, input: CreateJoinRequestInput) -> Result<JoinRequestCreated> {
        let created = self.db.create_join_request(input)?;
        self.hub.publish(&created.notification);
        Ok(created)
    }

    pub fn respond_to_join_request(
        &self,
        request_id: Uuid,
        decision: Decision,
    ) -> Result<JoinRequestResolved> {
        let resolved = self.db.resolve_join_request(request_id, decision)?;
        self.hub.publish(&resolved.notification);
        Ok(resolved)
    }

    pub fn leave_team(&self, team_id: Uuid, participant_id: Uuid) -> Result<Team> {
        self.db.remove_team_member(team_id, participant_id)
    }

    // ============================================================
    // Notification channel
    // ============================================================

    /// Store and push a notification. A repeated id is neither stored nor
    /// pushed again; the return value says whether this call delivered it.
    pub fn deliver(&self, notification: &Notification) -> Result<bool> {
        let delivered = self.db.deliver_notification(notification)?;
        if delivered {
            self.hub.publish(notification);
        } else {
            tracing::debug!(notification_id = %notification.id, "Duplicate delivery ignored");
        }
        Ok(delivered)
    }

    pub fn mark_read(&self, notification_id: Uuid) -> Result<Notification> {
        self.db.mark_notification_read(notification_id)
    }

    pub fn mark_all_read(&self, recipient_id: Uuid) -> Result<UnreadCount> {
        let changed = self.db.mark_all_notifications_read(recipient_id)?;
        tracing::debug!(recipient_id = %recipient_id, changed, "Marked all notifications read");
        self.unread_count(recipient_id)
    }

    pub fn list_notifications(&self, recipient_id: Uuid) -> Result<Vec<Notification>> {
        self.db.get_notifications(recipient_id)
    }

    pub fn unread_count(&self, recipient_id: Uuid) -> Result<UnreadCount> {
        Ok(UnreadCount {
            recipient_id,
            unread: self.db.unread_count(recipient_id)?,
        })
    }

    /// Live notifications for one recipient.
    pub fn subscribe(&self, recipient_id: Uuid) -> tokio::sync::broadcast::Receiver<Notification> {
        self.hub.subscribe(recipient_id)
    }

    /// Live notifications as a stream that releases its channel when dropped.
    pub fn feed(&self, recipient_id: Uuid) -> NotificationFeed {
        self.hub.feed(recipient_id)
    }
}
