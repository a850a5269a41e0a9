use rusqlite::{types::Type, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid, Database};
use crate::error::{Error, Result};
use crate::models::*;

const NOTIFICATION_COLUMNS: &str = "id, recipient_id, payload, read, status, created_at";

fn notification_from_row(row: &Row) -> rusqlite::Result<Notification> {
    let payload_json: String = row.get(2)?;
    let payload: NotificationPayload = serde_json::from_str(&payload_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(Notification {
        id: parse_uuid(row.get(0)?),
        recipient_id: parse_uuid(row.get(1)?),
        payload,
        read: row.get::<_, i32>(3)? != 0,
        status: row
            .get::<_, Option<String>>(4)?
            .and_then(|s| JoinRequestStatus::from_str(&s)),
        created_at: parse_datetime(row.get(5)?),
    })
}

/// Insert unless a notification with the same id exists.
/// Returns whether this call delivered it.
pub(super) fn insert_notification(conn: &Connection, notification: &Notification) -> Result<bool> {
    let rows = conn.execute(
        "INSERT OR IGNORE INTO notifications (id, recipient_id, kind, payload, join_request_id, read, status, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        (
            notification.id.to_string(),
            notification.recipient_id.to_string(),
            notification.kind().as_str(),
            serde_json::to_string(&notification.payload)?,
            notification.payload.context().request_id.to_string(),
            notification.read as i32,
            notification.status.map(|s| s.as_str()),
            format_datetime(notification.created_at),
        ),
    )?;
    Ok(rows > 0)
}

/// Copy a join request's status onto the request-type notification that
/// announced it.
pub(super) fn mirror_request_status(
    conn: &Connection,
    request_id: Uuid,
    status: JoinRequestStatus,
) -> Result<usize> {
    let rows = conn.execute(
        "UPDATE notifications SET status = ? WHERE join_request_id = ? AND kind = ?",
        (
            status.as_str(),
            request_id.to_string(),
            NotificationKind::TeamJoinRequest.as_str(),
        ),
    )?;
    Ok(rows)
}

impl Database {
    // ============================================================
    // Notification operations
    // ============================================================

    /// Store a notification for its recipient. Delivering the same id twice
    /// is a no-op and returns `false`.
    pub fn deliver_notification(&self, notification: &Notification) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        insert_notification(&conn, notification)
    }

    pub fn get_notification(&self, id: Uuid) -> Result<Option<Notification>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let notification = conn
            .query_row(
                &format!("SELECT {} FROM notifications WHERE id = ?", NOTIFICATION_COLUMNS),
                [id.to_string()],
                notification_from_row,
            )
            .optional()?;
        Ok(notification)
    }

    /// A recipient's notifications, newest first.
    pub fn get_notifications(&self, recipient_id: Uuid) -> Result<Vec<Notification>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notifications WHERE recipient_id = ? ORDER BY created_at DESC, rowid DESC",
            NOTIFICATION_COLUMNS
        ))?;

        let notifications = stmt
            .query_map([recipient_id.to_string()], notification_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notifications)
    }

    /// Mark one notification read. Marking an already-read notification
    /// changes nothing.
    pub fn mark_notification_read(&self, id: Uuid) -> Result<Notification> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "UPDATE notifications SET read = 1 WHERE id = ?",
            [id.to_string()],
        )?;

        conn.query_row(
            &format!("SELECT {} FROM notifications WHERE id = ?", NOTIFICATION_COLUMNS),
            [id.to_string()],
            notification_from_row,
        )
        .optional()?
        .ok_or_else(|| Error::not_found(format!("Notification {}", id)))
    }

    /// Mark every notification of a recipient read. Returns how many changed.
    pub fn mark_all_notifications_read(&self, recipient_id: Uuid) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "UPDATE notifications SET read = 1 WHERE recipient_id = ? AND read = 0",
            [recipient_id.to_string()],
        )?;
        Ok(rows)
    }

    /// Number of unread notifications. Counted, not tracked, so it always
    /// matches the stored read flags.
    pub fn unread_count(&self, recipient_id: Uuid) -> Result<u32> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ? AND read = 0",
            [recipient_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
