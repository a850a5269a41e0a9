use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid, Database};
use crate::error::{Error, Result};
use crate::models::*;

const PARTICIPANT_COLUMNS: &str =
    "id, hackathon_id, name, skills, experience_level, looking_for_team, created_at";

const TEAM_COLUMNS: &str = "id, hackathon_id, name, leader_id, current_size, max_size, created_at";

fn participant_from_row(row: &Row) -> rusqlite::Result<Participant> {
    let skills_json: String = row.get(3)?;
    Ok(Participant {
        id: parse_uuid(row.get(0)?),
        hackathon_id: parse_uuid(row.get(1)?),
        name: row.get(2)?,
        skills: serde_json::from_str(&skills_json).unwrap_or_default(),
        experience_level: ExperienceLevel::from_str(&row.get::<_, String>(4)?)
            .unwrap_or(ExperienceLevel::Beginner),
        looking_for_team: row.get::<_, i32>(5)? != 0,
        created_at: parse_datetime(row.get(6)?),
    })
}

/// Team columns only; membership is attached separately.
fn team_from_row(row: &Row) -> rusqlite::Result<Team> {
    Ok(Team {
        id: parse_uuid(row.get(0)?),
        hackathon_id: parse_uuid(row.get(1)?),
        name: row.get(2)?,
        leader_id: parse_uuid(row.get(3)?),
        member_ids: Vec::new(),
        member_skills: SkillSet::new(),
        current_size: row.get(4)?,
        max_size: row.get(5)?,
        created_at: parse_datetime(row.get(6)?),
    })
}

/// Fill in member ids and the union of their skills.
fn attach_members(conn: &Connection, team: &mut Team) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.skills
         FROM team_members m JOIN participants p ON p.id = m.participant_id
         WHERE m.team_id = ? ORDER BY m.rowid",
    )?;

    let rows = stmt
        .query_map([team.id.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (id, skills_json) in rows {
        team.member_ids.push(parse_uuid(id));
        let skills: SkillSet = serde_json::from_str(&skills_json).unwrap_or_default();
        team.member_skills.extend(skills);
    }

    Ok(())
}

pub(super) fn load_participant(conn: &Connection, id: Uuid) -> Result<Option<Participant>> {
    let participant = conn
        .query_row(
            &format!("SELECT {} FROM participants WHERE id = ?", PARTICIPANT_COLUMNS),
            [id.to_string()],
            participant_from_row,
        )
        .optional()?;
    Ok(participant)
}

pub(super) fn load_team(conn: &Connection, id: Uuid) -> Result<Option<Team>> {
    let team = conn
        .query_row(
            &format!("SELECT {} FROM teams WHERE id = ?", TEAM_COLUMNS),
            [id.to_string()],
            team_from_row,
        )
        .optional()?;

    match team {
        Some(mut team) => {
            attach_members(conn, &mut team)?;
            Ok(Some(team))
        }
        None => Ok(None),
    }
}

pub(super) fn set_looking_for_team(conn: &Connection, participant_id: Uuid, looking: bool) -> Result<()> {
    conn.execute(
        "UPDATE participants SET looking_for_team = ? WHERE id = ?",
        (looking as i32, participant_id.to_string()),
    )?;
    Ok(())
}

/// The team a participant belongs to within their hackathon, if any.
pub(super) fn current_team_id(conn: &Connection, participant: &Participant) -> Result<Option<Uuid>> {
    let team_id = conn
        .query_row(
            "SELECT m.team_id FROM team_members m JOIN teams t ON t.id = m.team_id
             WHERE m.participant_id = ? AND t.hackathon_id = ?
             LIMIT 1",
            (participant.id.to_string(), participant.hackathon_id.to_string()),
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(team_id.map(parse_uuid))
}

pub(super) fn insert_member(conn: &Connection, team_id: Uuid, participant_id: Uuid) -> Result<()> {
    conn.execute(
        "INSERT INTO team_members (team_id, participant_id, joined_at) VALUES (?, ?, ?)",
        (
            team_id.to_string(),
            participant_id.to_string(),
            format_datetime(Utc::now()),
        ),
    )?;
    Ok(())
}

impl Database {
    // ============================================================
    // Participant operations
    // ============================================================

    pub fn create_participant(
        &self,
        hackathon_id: Uuid,
        input: CreateParticipantInput,
    ) -> Result<Participant> {
        if input.name.trim().is_empty() {
            return Err(Error::Invalid("participant name must not be empty".to_string()));
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let participant = Participant {
            id: Uuid::new_v4(),
            hackathon_id,
            name: input.name,
            skills: input.skills,
            experience_level: input.experience_level.unwrap_or(ExperienceLevel::Beginner),
            looking_for_team: input.looking_for_team.unwrap_or(true),
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO participants (id, hackathon_id, name, skills, experience_level, looking_for_team, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                participant.id.to_string(),
                hackathon_id.to_string(),
                &participant.name,
                serde_json::to_string(&participant.skills)?,
                participant.experience_level.as_str(),
                participant.looking_for_team as i32,
                format_datetime(participant.created_at),
            ),
        )?;

        Ok(participant)
    }

    pub fn get_participant(&self, id: Uuid) -> Result<Option<Participant>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        load_participant(&conn, id)
    }

    /// All participants registered for a hackathon, in registration order.
    pub fn get_participants_by_hackathon(&self, hackathon_id: Uuid) -> Result<Vec<Participant>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM participants WHERE hackathon_id = ? ORDER BY created_at, rowid",
            PARTICIPANT_COLUMNS
        ))?;

        let participants = stmt
            .query_map([hackathon_id.to_string()], participant_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(participants)
    }

    pub fn update_participant(
        &self,
        id: Uuid,
        input: UpdateParticipantInput,
    ) -> Result<Option<Participant>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(existing) = load_participant(&conn, id)? else {
            return Ok(None);
        };

        if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(Error::Invalid("participant name must not be empty".to_string()));
        }

        let updated = Participant {
            name: input.name.unwrap_or(existing.name),
            skills: input.skills.unwrap_or(existing.skills),
            experience_level: input.experience_level.unwrap_or(existing.experience_level),
            looking_for_team: input.looking_for_team.unwrap_or(existing.looking_for_team),
            ..existing
        };

        conn.execute(
            "UPDATE participants SET name = ?, skills = ?, experience_level = ?, looking_for_team = ? WHERE id = ?",
            (
                &updated.name,
                serde_json::to_string(&updated.skills)?,
                updated.experience_level.as_str(),
                updated.looking_for_team as i32,
                id.to_string(),
            ),
        )?;

        Ok(Some(updated))
    }

    // ============================================================
    // Team operations
    // ============================================================

    /// Create a team led by an existing participant of the same hackathon.
    /// The leader becomes the first member and stops looking for a team.
    pub fn create_team(&self, hackathon_id: Uuid, input: CreateTeamInput) -> Result<Team> {
        if input.name.trim().is_empty() {
            return Err(Error::Invalid("team name must not be empty".to_string()));
        }
        if input.max_size == 0 {
            return Err(Error::Invalid("max_size must be at least 1".to_string()));
        }

        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        let leader = load_participant(&tx, input.leader_id)?
            .ok_or_else(|| Error::not_found(format!("Participant {}", input.leader_id)))?;
        if leader.hackathon_id != hackathon_id {
            return Err(Error::Invalid(
                "team leader is registered for a different hackathon".to_string(),
            ));
        }
        if let Some(team_id) = current_team_id(&tx, &leader)? {
            return Err(Error::Invalid(format!(
                "participant {} already belongs to team {}",
                leader.id, team_id
            )));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        tx.execute(
            "INSERT INTO teams (id, hackathon_id, name, leader_id, current_size, max_size, created_at)
             VALUES (?, ?, ?, ?, 1, ?, ?)",
            (
                id.to_string(),
                hackathon_id.to_string(),
                &input.name,
                leader.id.to_string(),
                input.max_size,
                format_datetime(now),
            ),
        )?;
        insert_member(&tx, id, leader.id)?;
        set_looking_for_team(&tx, leader.id, false)?;

        tx.commit()?;

        Ok(Team {
            id,
            hackathon_id,
            name: input.name,
            leader_id: leader.id,
            member_ids: vec![leader.id],
            member_skills: leader.skills,
            current_size: 1,
            max_size: input.max_size,
            created_at: now,
        })
    }

    pub fn get_team(&self, id: Uuid) -> Result<Option<Team>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        load_team(&conn, id)
    }

    /// All teams of a hackathon, in creation order, with membership attached.
    pub fn get_teams_by_hackathon(&self, hackathon_id: Uuid) -> Result<Vec<Team>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM teams WHERE hackathon_id = ? ORDER BY created_at, rowid",
            TEAM_COLUMNS
        ))?;

        let mut teams = stmt
            .query_map([hackathon_id.to_string()], team_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for team in &mut teams {
            attach_members(&conn, team)?;
        }

        Ok(teams)
    }

    /// Remove a member from a team, freeing one open role.
    ///
    /// The leader cannot leave; they answer the team's join requests.
    pub fn remove_team_member(&self, team_id: Uuid, participant_id: Uuid) -> Result<Team> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        let team = load_team(&tx, team_id)?
            .ok_or_else(|| Error::not_found(format!("Team {}", team_id)))?;

        if team.leader_id == participant_id {
            return Err(Error::Invalid("the team leader cannot leave the team".to_string()));
        }

        let removed = tx.execute(
            "DELETE FROM team_members WHERE team_id = ? AND participant_id = ?",
            (team_id.to_string(), participant_id.to_string()),
        )?;
        if removed == 0 {
            return Err(Error::not_found(format!(
                "Member {} of team {}",
                participant_id, team_id
            )));
        }

        tx.execute(
            "UPDATE teams SET current_size = current_size - 1 WHERE id = ? AND current_size > 0",
            [team_id.to_string()],
        )?;
        if let Some(participant) = load_participant(&tx, participant_id)? {
            if current_team_id(&tx, &participant)?.is_none() {
                set_looking_for_team(&tx, participant_id, true)?;
            }
        }

        let team = load_team(&tx, team_id)?
            .ok_or_else(|| Error::not_found(format!("Team {}", team_id)))?;
        tx.commit()?;

        tracing::info!(team_id = %team_id, participant_id = %participant_id, "Member left team");
        Ok(team)
    }
}
