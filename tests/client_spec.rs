//! HTTP client tests against a live server on an ephemeral port.

use hackmatch::api::create_router;
use hackmatch::client::{ClientError, HackmatchClient};
use hackmatch::db::Database;
use hackmatch::models::*;
use hackmatch::service::TeamFormation;
use uuid::Uuid;

/// Start a server on 127.0.0.1:0 and return a client for it, plus the
/// database for seeding the roster.
async fn setup() -> (HackmatchClient, Database) {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(TeamFormation::new(db.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = HackmatchClient::new(format!("http://{}/api/v1/", addr));
    (client, db)
}

fn register(db: &Database, hackathon_id: Uuid, name: &str, skills: &[&str]) -> Participant {
    db.create_participant(
        hackathon_id,
        CreateParticipantInput {
            name: name.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience_level: None,
            looking_for_team: None,
        },
    )
    .expect("Failed to create participant")
}

fn create_team(db: &Database, hackathon_id: Uuid, leader: &Participant, max_size: u32) -> Team {
    db.create_team(
        hackathon_id,
        CreateTeamInput {
            name: format!("{}'s team", leader.name),
            leader_id: leader.id,
            max_size,
        },
    )
    .expect("Failed to create team")
}

fn join(participant: &Participant, team: &Team) -> CreateJoinRequestInput {
    CreateJoinRequestInput {
        initiator_id: participant.id,
        initiator_type: PartyType::Participant,
        target_id: team.id,
        message: None,
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_a_running_server() {
        let (client, _db) = setup().await;

        assert!(client.health().await.expect("Health check failed"));
    }
}

mod workflow {
    use super::*;

    #[tokio::test]
    async fn creates_and_accepts_a_request() {
        let (client, db) = setup().await;
        let hackathon = Uuid::new_v4();
        let leader = register(&db, hackathon, "Lead", &["React"]);
        let seeker = register(&db, hackathon, "Seeker", &["Rust"]);
        let team = create_team(&db, hackathon, &leader, 3);

        let created = client
            .create_join_request(&join(&seeker, &team))
            .await
            .expect("Create failed");
        let resolved = client
            .respond_to_join_request(created.request.id, Decision::Accept)
            .await
            .expect("Accept failed");

        assert_eq!(resolved.request.status, JoinRequestStatus::Accepted);
        let inbox = client.list_notifications(seeker.id).await.expect("List failed");
        assert_eq!(inbox.len(), 1);
        assert_eq!(client.unread_count(seeker.id).await.expect("Count failed").unread, 1);
    }

    #[tokio::test]
    async fn fetches_recommendations_with_an_explicit_k() {
        let (client, db) = setup().await;
        let hackathon = Uuid::new_v4();
        let seeker = register(&db, hackathon, "Seeker", &["Rust"]);
        for name in ["A", "B", "C"] {
            let lead = register(&db, hackathon, name, &["Rust"]);
            create_team(&db, hackathon, &lead, 4);
        }

        let response = client
            .get_recommendations(seeker.id, PartyType::Participant, Some(2))
            .await
            .expect("Recommendation failed");

        assert_eq!(response.subject_id, seeker.id);
        assert_eq!(response.matches.len(), 2);
    }
}

mod errors {
    use super::*;

    #[tokio::test]
    async fn maps_404_to_not_found() {
        let (client, _db) = setup().await;

        let result = client
            .respond_to_join_request(Uuid::new_v4(), Decision::Accept)
            .await;

        assert!(matches!(result, Err(ClientError::NotFound(_))));
    }

    #[tokio::test]
    async fn maps_400_to_bad_request() {
        let (client, db) = setup().await;
        let hackathon = Uuid::new_v4();
        let a = register(&db, hackathon, "A", &[]);
        let b = register(&db, hackathon, "B", &[]);

        let result = client
            .create_join_request(&CreateJoinRequestInput {
                initiator_id: a.id,
                initiator_type: PartyType::Participant,
                target_id: b.id,
                message: None,
            })
            .await;

        assert!(matches!(result, Err(ClientError::BadRequest(_))));
    }

    #[tokio::test]
    async fn maps_409_to_conflict() {
        let (client, db) = setup().await;
        let hackathon = Uuid::new_v4();
        let leader = register(&db, hackathon, "Lead", &[]);
        let seeker = register(&db, hackathon, "Seeker", &[]);
        let team = create_team(&db, hackathon, &leader, 3);
        let created = client
            .create_join_request(&join(&seeker, &team))
            .await
            .expect("Create failed");
        client
            .respond_to_join_request(created.request.id, Decision::Reject)
            .await
            .expect("Reject failed");

        let result = client
            .respond_to_join_request(created.request.id, Decision::Accept)
            .await;

        match result {
            Err(ClientError::Conflict(body)) => assert!(body.contains("already resolved")),
            other => panic!("expected a conflict, got {:?}", other.map(|r| r.request.status)),
        }
    }

    #[tokio::test]
    async fn reports_an_unreachable_server() {
        let client = HackmatchClient::new("http://127.0.0.1:9/api/v1");

        assert!(matches!(client.health().await, Err(ClientError::Http(_))));
    }
}
