use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::notifications::{insert_notification, mirror_request_status};
use super::roster::{
    current_team_id, insert_member, load_participant, load_team, set_looking_for_team,
};
use super::{format_datetime, parse_datetime, parse_uuid, Database};
use crate::error::{Error, Result};
use crate::models::*;

const JOIN_REQUEST_COLUMNS: &str = "id, initiator_id, initiator_type, target_id, target_type, \
     team_id, participant_id, message, status, created_at, resolved_at";

fn join_request_from_row(row: &Row) -> rusqlite::Result<JoinRequest> {
    Ok(JoinRequest {
        id: parse_uuid(row.get(0)?),
        initiator_id: parse_uuid(row.get(1)?),
        initiator_type: PartyType::from_str(&row.get::<_, String>(2)?)
            .unwrap_or(PartyType::Participant),
        target_id: parse_uuid(row.get(3)?),
        target_type: PartyType::from_str(&row.get::<_, String>(4)?).unwrap_or(PartyType::Team),
        team_id: parse_uuid(row.get(5)?),
        participant_id: parse_uuid(row.get(6)?),
        message: row.get(7)?,
        status: JoinRequestStatus::from_str(&row.get::<_, String>(8)?)
            .unwrap_or(JoinRequestStatus::Pending),
        created_at: parse_datetime(row.get(9)?),
        resolved_at: row.get::<_, Option<String>>(10)?.map(parse_datetime),
    })
}

fn load_join_request(conn: &Connection, id: Uuid) -> Result<Option<JoinRequest>> {
    let request = conn
        .query_row(
            &format!("SELECT {} FROM join_requests WHERE id = ?", JOIN_REQUEST_COLUMNS),
            [id.to_string()],
            join_request_from_row,
        )
        .optional()?;
    Ok(request)
}

/// The participant and team a join request connects.
struct Sides {
    participant: Participant,
    team: Team,
}

impl Sides {
    /// Who answers for a side: the participant themselves, or the team's leader.
    fn recipient_for(&self, party: PartyType) -> Uuid {
        match party {
            PartyType::Participant => self.participant.id,
            PartyType::Team => self.team.leader_id,
        }
    }

    /// A participant holds at most one team per hackathon.
    fn ensure_free_agent(&self, conn: &Connection) -> Result<()> {
        match current_team_id(conn, &self.participant)? {
            Some(team_id) => Err(Error::invalid_pairing(format!(
                "participant {} already belongs to team {}",
                self.participant.id, team_id
            ))),
            None => Ok(()),
        }
    }

    fn context(&self, request_id: Uuid, initiator_type: PartyType) -> JoinRequestContext {
        JoinRequestContext {
            request_id,
            team_id: self.team.id,
            team_name: self.team.name.clone(),
            participant_id: self.participant.id,
            participant_name: self.participant.name.clone(),
            initiator_type,
        }
    }
}

/// Resolve the initiator and target into one participant and one team.
///
/// A target of the same kind as the initiator is an invalid pairing rather
/// than a missing record.
fn resolve_sides(
    conn: &Connection,
    initiator_id: Uuid,
    initiator_type: PartyType,
    target_id: Uuid,
) -> Result<Sides> {
    match initiator_type {
        PartyType::Participant => {
            let participant = load_participant(conn, initiator_id)?
                .ok_or_else(|| Error::not_found(format!("Participant {}", initiator_id)))?;
            let team = match load_team(conn, target_id)? {
                Some(team) => team,
                None if load_participant(conn, target_id)?.is_some() => {
                    return Err(Error::invalid_pairing(
                        "a participant can only send a join request to a team",
                    ));
                }
                None => return Err(Error::not_found(format!("Team {}", target_id))),
            };
            Ok(Sides { participant, team })
        }
        PartyType::Team => {
            let team = load_team(conn, initiator_id)?
                .ok_or_else(|| Error::not_found(format!("Team {}", initiator_id)))?;
            let participant = match load_participant(conn, target_id)? {
                Some(participant) => participant,
                None if load_team(conn, target_id)?.is_some() => {
                    return Err(Error::invalid_pairing(
                        "a team can only invite a participant",
                    ));
                }
                None => return Err(Error::not_found(format!("Participant {}", target_id))),
            };
            Ok(Sides { participant, team })
        }
    }
}

fn has_pending_request(conn: &Connection, initiator_id: Uuid, target_id: Uuid) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM join_requests WHERE initiator_id = ? AND target_id = ? AND status = 'pending'",
        (initiator_id.to_string(), target_id.to_string()),
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

impl Database {
    // ============================================================
    // Join request operations
    // ============================================================

    /// Open a pending join request and deliver a `TEAM_JOIN_REQUEST`
    /// notification to whoever answers for the target.
    pub fn create_join_request(&self, input: CreateJoinRequestInput) -> Result<JoinRequestCreated> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        let sides = resolve_sides(&tx, input.initiator_id, input.initiator_type, input.target_id)?;

        if sides.participant.hackathon_id != sides.team.hackathon_id {
            return Err(Error::invalid_pairing(
                "participant and team belong to different hackathons",
            ));
        }
        if sides.team.has_member(sides.participant.id) {
            return Err(Error::invalid_pairing(format!(
                "participant {} is already a member of team {}",
                sides.participant.id, sides.team.id
            )));
        }
        sides.ensure_free_agent(&tx)?;
        if !sides.team.has_open_roles() {
            return Err(Error::invalid_pairing(format!(
                "team {} has no open roles",
                sides.team.id
            )));
        }
        if has_pending_request(&tx, input.initiator_id, input.target_id)? {
            return Err(Error::invalid_pairing(
                "a pending join request already exists for this pair",
            ));
        }

        let request = JoinRequest {
            id: Uuid::new_v4(),
            initiator_id: input.initiator_id,
            initiator_type: input.initiator_type,
            target_id: input.target_id,
            target_type: input.initiator_type.opposite(),
            team_id: sides.team.id,
            participant_id: sides.participant.id,
            message: input.message,
            status: JoinRequestStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        };

        tx.execute(
            "INSERT INTO join_requests (id, initiator_id, initiator_type, target_id, target_type, team_id, participant_id, message, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                request.id.to_string(),
                request.initiator_id.to_string(),
                request.initiator_type.as_str(),
                request.target_id.to_string(),
                request.target_type.as_str(),
                request.team_id.to_string(),
                request.participant_id.to_string(),
                &request.message,
                request.status.as_str(),
                format_datetime(request.created_at),
            ),
        )?;

        let notification = Notification::new(
            sides.recipient_for(request.target_type),
            NotificationPayload::TeamJoinRequest(sides.context(request.id, request.initiator_type)),
        );
        insert_notification(&tx, &notification)?;

        tx.commit()?;

        tracing::info!(
            request_id = %request.id,
            team_id = %request.team_id,
            participant_id = %request.participant_id,
            initiator = request.initiator_type.as_str(),
            "Join request created"
        );

        Ok(JoinRequestCreated {
            request,
            notification,
        })
    }

    /// Accept or reject a pending join request.
    ///
    /// Accepting claims one open role with a conditional update; if the team
    /// filled up in the meantime the call fails with `CapacityExceeded` and
    /// the request stays pending.
    pub fn resolve_join_request(&self, id: Uuid, decision: Decision) -> Result<JoinRequestResolved> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        let request = load_join_request(&tx, id)?
            .ok_or_else(|| Error::not_found(format!("Join request {}", id)))?;
        if request.status.is_terminal() {
            return Err(Error::AlreadyResolved(id));
        }

        let participant = load_participant(&tx, request.participant_id)?
            .ok_or_else(|| Error::not_found(format!("Participant {}", request.participant_id)))?;
        let team = load_team(&tx, request.team_id)?
            .ok_or_else(|| Error::not_found(format!("Team {}", request.team_id)))?;
        let sides = Sides { participant, team };

        if decision == Decision::Accept {
            if sides.team.has_member(sides.participant.id) {
                return Err(Error::invalid_pairing(format!(
                    "participant {} is already a member of team {}",
                    sides.participant.id, sides.team.id
                )));
            }
            sides.ensure_free_agent(&tx)?;

            let claimed = tx.execute(
                "UPDATE teams SET current_size = current_size + 1 WHERE id = ? AND current_size < max_size",
                [sides.team.id.to_string()],
            )?;
            if claimed == 0 {
                tracing::warn!(request_id = %id, team_id = %sides.team.id, "Accept refused, team is full");
                return Err(Error::CapacityExceeded(sides.team.id));
            }

            insert_member(&tx, sides.team.id, sides.participant.id)?;
            set_looking_for_team(&tx, sides.participant.id, false)?;
        }

        let status = decision.resulting_status();
        let now = Utc::now();

        tx.execute(
            "UPDATE join_requests SET status = ?, resolved_at = ? WHERE id = ? AND status = 'pending'",
            (status.as_str(), format_datetime(now), id.to_string()),
        )?;
        mirror_request_status(&tx, id, status)?;

        let context = sides.context(id, request.initiator_type);
        let payload = match decision {
            Decision::Accept => NotificationPayload::TeamRequestAccepted(context),
            Decision::Reject => NotificationPayload::TeamRequestRejected(context),
        };
        let notification = Notification::new(sides.recipient_for(request.initiator_type), payload);
        insert_notification(&tx, &notification)?;

        tx.commit()?;

        tracing::info!(
            request_id = %id,
            team_id = %request.team_id,
            participant_id = %request.participant_id,
            status = status.as_str(),
            "Join request resolved"
        );

        Ok(JoinRequestResolved {
            request: JoinRequest {
                status,
                resolved_at: Some(now),
                ..request
            },
            notification,
        })
    }

    pub fn get_join_request(&self, id: Uuid) -> Result<Option<JoinRequest>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        load_join_request(&conn, id)
    }

    /// Every join request involving a team, newest first.
    pub fn get_join_requests_by_team(&self, team_id: Uuid) -> Result<Vec<JoinRequest>> {
        self.get_join_requests_where("team_id", team_id)
    }

    /// Every join request involving a participant, newest first.
    pub fn get_join_requests_by_participant(&self, participant_id: Uuid) -> Result<Vec<JoinRequest>> {
        self.get_join_requests_where("participant_id", participant_id)
    }

    fn get_join_requests_where(&self, column: &'static str, id: Uuid) -> Result<Vec<JoinRequest>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM join_requests WHERE {} = ? ORDER BY created_at DESC, rowid DESC",
            JOIN_REQUEST_COLUMNS, column
        ))?;

        let requests = stmt
            .query_map([id.to_string()], join_request_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(requests)
    }
}
