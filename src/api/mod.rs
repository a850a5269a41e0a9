mod handlers;
mod stream;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::service::TeamFormation;

pub fn create_router(service: TeamFormation) -> Router {
    create_router_with_config(service, &Config::local())
}

pub fn create_router_with_config(service: TeamFormation, config: &Config) -> Router {
    let api = Router::new()
        // Roster
        .route(
            "/hackathons/{id}/participants",
            get(handlers::list_participants).post(handlers::create_participant),
        )
        .route(
            "/hackathons/{id}/teams",
            get(handlers::list_teams).post(handlers::create_team),
        )
        .route(
            "/participants/{id}",
            get(handlers::get_participant).put(handlers::update_participant),
        )
        .route("/teams/{id}", get(handlers::get_team))
        .route(
            "/teams/{id}/members/{participant_id}",
            delete(handlers::leave_team),
        )
        // Recommendations
        .route("/recommendations", get(handlers::get_recommendations))
        // Join requests
        .route("/join-requests", post(handlers::create_join_request))
        .route("/join-requests/{id}", get(handlers::get_join_request))
        .route(
            "/join-requests/{id}/respond",
            post(handlers::respond_to_join_request),
        )
        .route(
            "/teams/{id}/join-requests",
            get(handlers::list_team_join_requests),
        )
        .route(
            "/participants/{id}/join-requests",
            get(handlers::list_participant_join_requests),
        )
        // Notifications
        .route(
            "/participants/{id}/notifications",
            get(handlers::list_notifications),
        )
        .route(
            "/participants/{id}/notifications/unread-count",
            get(handlers::unread_count),
        )
        .route(
            "/participants/{id}/notifications/read-all",
            post(handlers::mark_all_read),
        )
        .route(
            "/participants/{id}/notifications/stream",
            get(stream::stream_notifications),
        )
        .route("/notifications/{id}/read", post(handlers::mark_read))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config)),
        )
        .with_state(service)
}

fn cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}
