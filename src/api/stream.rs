//! Server-sent events for live notifications.
//!
//! GET /api/v1/participants/{id}/notifications/stream
//!
//! Subscribes to the recipient's channel on the notification hub and
//! forwards each notification as an SSE event named after its type
//! (`TEAM_JOIN_REQUEST`, ...). Notifications are stored before they are
//! pushed, so a client that reconnects can catch up from the list endpoint.
//! The hub channel is released when the client disconnects.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use uuid::Uuid;

use super::handlers::api_error;
use crate::service::TeamFormation;

pub async fn stream_notifications(
    State(service): State<TeamFormation>,
    Path(recipient_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, String)> {
    service
        .db()
        .get_participant(recipient_id)
        .map_err(api_error)?
        .ok_or((StatusCode::NOT_FOUND, "Participant not found".to_string()))?;

    let feed = service.feed(recipient_id);
    tracing::debug!(
        recipient_id = %recipient_id,
        subscribers = service.hub().subscriber_count(recipient_id),
        "Notification stream opened"
    );

    let connected =
        stream::once(async { Ok::<_, Infallible>(Event::default().event("connected").data("ok")) });

    let events = feed.filter_map(|result| async move {
        match result {
            Ok(notification) => Event::default()
                .event(notification.kind().as_str())
                .id(notification.id.to_string())
                .json_data(&notification)
                .ok()
                .map(Ok),
            Err(BroadcastStreamRecvError::Lagged(n)) => Event::default()
                .event("lagged")
                .json_data(serde_json::json!({ "missed": n }))
                .ok()
                .map(Ok),
        }
    });

    Ok(Sse::new(connected.chain(events)).keep_alive(KeepAlive::default()))
}
