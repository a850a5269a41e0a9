use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::Error;
use crate::models::*;
use crate::service::TeamFormation;

/// Suggestions returned to a participant browsing teams when `k` is omitted.
const DEFAULT_TEAM_SUGGESTIONS: usize = 3;

/// Suggestions returned to a team browsing participants when `k` is omitted.
const DEFAULT_PARTICIPANT_SUGGESTIONS: usize = 5;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a core error to an HTTP response.
///
/// Workflow and validation failures are returned verbatim so the UI can
/// decide what to show. Storage failures are logged in full server-side and
/// the client only sees a generic message.
pub(super) fn api_error(e: Error) -> (StatusCode, String) {
    if !e.is_client_error() {
        tracing::error!("Internal error: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        );
    }

    let status = match &e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::AlreadyResolved(_) | Error::CapacityExceeded(_) => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    };

    tracing::warn!("Request failed: {}", e);
    (status, e.to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Roster
// ============================================================

pub async fn list_participants(
    State(service): State<TeamFormation>,
    Path(hackathon_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Participant>>> {
    service
        .db()
        .get_participants_by_hackathon(hackathon_id)
        .map(Json)
        .map_err(api_error)
}

pub async fn create_participant(
    State(service): State<TeamFormation>,
    Path(hackathon_id): Path<Uuid>,
    Json(input): Json<CreateParticipantInput>,
) -> ApiResult<(StatusCode, Json<Participant>)> {
    service
        .db()
        .create_participant(hackathon_id, input)
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(api_error)
}

pub async fn get_participant(
    State(service): State<TeamFormation>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Participant>> {
    service
        .db()
        .get_participant(id)
        .map_err(api_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Participant not found".to_string()))
}

pub async fn update_participant(
    State(service): State<TeamFormation>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateParticipantInput>,
) -> ApiResult<Json<Participant>> {
    service
        .db()
        .update_participant(id, input)
        .map_err(api_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Participant not found".to_string()))
}

pub async fn list_teams(
    State(service): State<TeamFormation>,
    Path(hackathon_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Team>>> {
    service
        .db()
        .get_teams_by_hackathon(hackathon_id)
        .map(Json)
        .map_err(api_error)
}

pub async fn create_team(
    State(service): State<TeamFormation>,
    Path(hackathon_id): Path<Uuid>,
    Json(input): Json<CreateTeamInput>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    service
        .db()
        .create_team(hackathon_id, input)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(api_error)
}

pub async fn get_team(
    State(service): State<TeamFormation>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Team>> {
    service
        .db()
        .get_team(id)
        .map_err(api_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Team not found".to_string()))
}

pub async fn leave_team(
    State(service): State<TeamFormation>,
    Path((team_id, participant_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Team>> {
    service
        .leave_team(team_id, participant_id)
        .map(Json)
        .map_err(api_error)
}

// ============================================================
// Recommendations
// ============================================================

pub async fn get_recommendations(
    State(service): State<TeamFormation>,
    Query(query): Query<RecommendationQuery>,
) -> ApiResult<Json<RecommendationResponse>> {
    let k = query.k.unwrap_or(match query.subject_type {
        PartyType::Participant => DEFAULT_TEAM_SUGGESTIONS,
        PartyType::Team => DEFAULT_PARTICIPANT_SUGGESTIONS,
    });

    let matches = service
        .get_recommendations(query.subject_id, query.subject_type, k)
        .map_err(api_error)?;

    Ok(Json(RecommendationResponse {
        subject_id: query.subject_id,
        subject_type: query.subject_type,
        matches,
    }))
}

// ============================================================
// Join Requests
// ============================================================

pub async fn create_join_request(
    State(service): State<TeamFormation>,
    Json(input): Json<CreateJoinRequestInput>,
) -> ApiResult<(StatusCode, Json<JoinRequestCreated>)> {
    service
        .create_join_request(input)
        .map(|created| (StatusCode::CREATED, Json(created)))
        .map_err(api_error)
}

pub async fn get_join_request(
    State(service): State<TeamFormation>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JoinRequest>> {
    service
        .db()
        .get_join_request(id)
        .map_err(api_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Join request not found".to_string()))
}

pub async fn respond_to_join_request(
    State(service): State<TeamFormation>,
    Path(id): Path<Uuid>,
    Json(input): Json<RespondJoinRequestInput>,
) -> ApiResult<Json<JoinRequestResolved>> {
    service
        .respond_to_join_request(id, input.decision)
        .map(Json)
        .map_err(api_error)
}

pub async fn list_team_join_requests(
    State(service): State<TeamFormation>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<Vec<JoinRequest>>> {
    service
        .db()
        .get_join_requests_by_team(team_id)
        .map(Json)
        .map_err(api_error)
}

pub async fn list_participant_join_requests(
    State(service): State<TeamFormation>,
    Path(participant_id): Path<Uuid>,
) -> ApiResult<Json<Vec<JoinRequest>>> {
    service
        .db()
        .get_join_requests_by_participant(participant_id)
        .map(Json)
        .map_err(api_error)
}

// ============================================================
// Notifications
// ============================================================

pub async fn list_notifications(
    State(service): State<TeamFormation>,
    Path(recipient_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Notification>>> {
    service
        .list_notifications(recipient_id)
        .map(Json)
        .map_err(api_error)
}

pub async fn unread_count(
    State(service): State<TeamFormation>,
    Path(recipient_id): Path<Uuid>,
) -> ApiResult<Json<UnreadCount>> {
    service
        .unread_count(recipient_id)
        .map(Json)
        .map_err(api_error)
}

pub async fn mark_all_read(
    State(service): State<TeamFormation>,
    Path(recipient_id): Path<Uuid>,
) -> ApiResult<Json<UnreadCount>> {
    service
        .mark_all_read(recipient_id)
        .map(Json)
        .map_err(api_error)
}

pub async fn mark_read(
    State(service): State<TeamFormation>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Notification>> {
    service.mark_read(id).map(Json).map_err(api_error)
}
