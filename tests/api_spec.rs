use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use hackmatch::api::{create_router, create_router_with_config};
use hackmatch::config::Config;
use hackmatch::db::Database;
use hackmatch::models::*;
use hackmatch::service::TeamFormation;
use uuid::Uuid;

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(TeamFormation::new(db));
    TestServer::new(app).expect("Failed to create test server")
}

fn skills(items: &[&str]) -> SkillSet {
    items.iter().map(|s| s.to_string()).collect()
}

async fn create_participant(
    server: &TestServer,
    hackathon_id: Uuid,
    name: &str,
    items: &[&str],
) -> Participant {
    let response = server
        .post(&format!("/api/v1/hackathons/{}/participants", hackathon_id))
        .json(&CreateParticipantInput {
            name: name.to_string(),
            skills: skills(items),
            experience_level: None,
            looking_for_team: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Participant>()
}

async fn create_team(server: &TestServer, hackathon_id: Uuid, leader: &Participant, max_size: u32) -> Team {
    let response = server
        .post(&format!("/api/v1/hackathons/{}/teams", hackathon_id))
        .json(&CreateTeamInput {
            name: format!("{}'s team", leader.name),
            leader_id: leader.id,
            max_size,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Team>()
}

async fn request_to_join(server: &TestServer, participant: &Participant, team: &Team) -> JoinRequestCreated {
    let response = server
        .post("/api/v1/join-requests")
        .json(&CreateJoinRequestInput {
            initiator_id: participant.id,
            initiator_type: PartyType::Participant,
            target_id: team.id,
            message: Some("Hi".to_string()),
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<JoinRequestCreated>()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();

        let response = server.get("/api/v1/health").await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "status": "ok" }));
    }
}

mod cors {
    use super::*;

    fn setup_with_origins(origins: &[&str]) -> TestServer {
        let db = Database::open_memory().expect("Failed to create database");
        db.migrate().expect("Failed to migrate");
        let config = Config::local()
            .with_cors_origins(origins.iter().map(|o| o.to_string()).collect());
        let app = create_router_with_config(TeamFormation::new(db), &config);
        TestServer::new(app).expect("Failed to create test server")
    }

    #[tokio::test]
    async fn echoes_an_allowed_origin() {
        let server = setup_with_origins(&["https://app.example"]);

        let response = server
            .get("/api/v1/health")
            .add_header(
                HeaderName::from_static("origin"),
                HeaderValue::from_static("https://app.example"),
            )
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.headers().get("access-control-allow-origin"),
            Some(&HeaderValue::from_static("https://app.example"))
        );
    }

    #[tokio::test]
    async fn omits_the_header_for_other_origins() {
        let server = setup_with_origins(&["https://app.example"]);

        let response = server
            .get("/api/v1/health")
            .add_header(
                HeaderName::from_static("origin"),
                HeaderValue::from_static("https://elsewhere.example"),
            )
            .await;

        response.assert_status_ok();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }
}

mod roster {
    use super::*;

    #[tokio::test]
    async fn creates_and_fetches_a_participant() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let created = create_participant(&server, hackathon, "Ada", &["Rust"]).await;

        let response = server.get(&format!("/api/v1/participants/{}", created.id)).await;

        response.assert_status_ok();
        let fetched: Participant = response.json();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.skills, skills(&["Rust"]));
    }

    #[tokio::test]
    async fn returns_404_for_unknown_participant() {
        let server = setup();

        let response = server.get(&format!("/api/v1/participants/{}", Uuid::new_v4())).await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejects_empty_participant_name() {
        let server = setup();

        let response = server
            .post(&format!("/api/v1/hackathons/{}/participants", Uuid::new_v4()))
            .json(&serde_json::json!({ "name": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn updates_participant_skills() {
        let server = setup();
        let created = create_participant(&server, Uuid::new_v4(), "Ada", &["Rust"]).await;

        let response = server
            .put(&format!("/api/v1/participants/{}", created.id))
            .json(&UpdateParticipantInput {
                skills: Some(skills(&["Rust", "Go"])),
                ..Default::default()
            })
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Participant>().skills, skills(&["Go", "Rust"]));
    }

    #[tokio::test]
    async fn lists_teams_of_a_hackathon() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let leader = create_participant(&server, hackathon, "Lead", &["React"]).await;
        let team = create_team(&server, hackathon, &leader, 4).await;

        let response = server.get(&format!("/api/v1/hackathons/{}/teams", hackathon)).await;

        response.assert_status_ok();
        let teams: Vec<Team> = response.json();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].id, team.id);
        assert_eq!(teams[0].member_skills, skills(&["React"]));
    }

    #[tokio::test]
    async fn refuses_to_let_the_leader_leave() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let leader = create_participant(&server, hackathon, "Lead", &[]).await;
        let team = create_team(&server, hackathon, &leader, 4).await;

        let response = server
            .delete(&format!("/api/v1/teams/{}/members/{}", team.id, leader.id))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

mod recommendations {
    use super::*;

    #[tokio::test]
    async fn defaults_to_three_teams_for_a_participant() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let seeker = create_participant(&server, hackathon, "Seeker", &["Rust"]).await;
        for name in ["A", "B", "C", "D"] {
            let lead = create_participant(&server, hackathon, name, &["Rust"]).await;
            create_team(&server, hackathon, &lead, 4).await;
        }

        let response = server
            .get(&format!(
                "/api/v1/recommendations?subject_id={}&subject_type=participant",
                seeker.id
            ))
            .await;

        response.assert_status_ok();
        let body: RecommendationResponse = response.json();
        assert_eq!(body.subject_id, seeker.id);
        assert_eq!(body.matches.len(), 3);
        assert!(body.matches.iter().all(|m| m.score == 2));
    }

    #[tokio::test]
    async fn honors_an_explicit_k() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let leader = create_participant(&server, hackathon, "Lead", &["React"]).await;
        let team = create_team(&server, hackathon, &leader, 6).await;
        for name in ["A", "B", "C"] {
            create_participant(&server, hackathon, name, &["React"]).await;
        }

        let response = server
            .get(&format!(
                "/api/v1/recommendations?subject_id={}&subject_type=team&k=2",
                team.id
            ))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<RecommendationResponse>().matches.len(), 2);
    }

    #[tokio::test]
    async fn returns_404_for_unknown_subject() {
        let server = setup();

        let response = server
            .get(&format!(
                "/api/v1/recommendations?subject_id={}&subject_type=team",
                Uuid::new_v4()
            ))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod join_requests {
    use super::*;

    #[tokio::test]
    async fn creates_a_request_and_notifies_the_leader() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let leader = create_participant(&server, hackathon, "Lead", &[]).await;
        let seeker = create_participant(&server, hackathon, "Seeker", &[]).await;
        let team = create_team(&server, hackathon, &leader, 3).await;

        let created = request_to_join(&server, &seeker, &team).await;
        assert_eq!(created.request.status, JoinRequestStatus::Pending);

        let response = server
            .get(&format!("/api/v1/participants/{}/notifications/unread-count", leader.id))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<UnreadCount>().unread, 1);
    }

    #[tokio::test]
    async fn returns_400_for_a_duplicate_pending_request() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let leader = create_participant(&server, hackathon, "Lead", &[]).await;
        let seeker = create_participant(&server, hackathon, "Seeker", &[]).await;
        let team = create_team(&server, hackathon, &leader, 3).await;
        request_to_join(&server, &seeker, &team).await;

        let response = server
            .post("/api/v1/join-requests")
            .json(&CreateJoinRequestInput {
                initiator_id: seeker.id,
                initiator_type: PartyType::Participant,
                target_id: team.id,
                message: None,
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn returns_404_for_an_unknown_target() {
        let server = setup();
        let seeker = create_participant(&server, Uuid::new_v4(), "Seeker", &[]).await;

        let response = server
            .post("/api/v1/join-requests")
            .json(&CreateJoinRequestInput {
                initiator_id: seeker.id,
                initiator_type: PartyType::Participant,
                target_id: Uuid::new_v4(),
                message: None,
            })
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn accepts_and_then_conflicts_on_a_second_answer() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let leader = create_participant(&server, hackathon, "Lead", &[]).await;
        let seeker = create_participant(&server, hackathon, "Seeker", &[]).await;
        let team = create_team(&server, hackathon, &leader, 3).await;
        let created = request_to_join(&server, &seeker, &team).await;
        let path = format!("/api/v1/join-requests/{}/respond", created.request.id);

        let response = server
            .post(&path)
            .json(&RespondJoinRequestInput { decision: Decision::Accept })
            .await;
        response.assert_status_ok();
        let resolved: JoinRequestResolved = response.json();
        assert_eq!(resolved.request.status, JoinRequestStatus::Accepted);
        assert_eq!(resolved.notification.recipient_id, seeker.id);

        let again = server
            .post(&path)
            .json(&RespondJoinRequestInput { decision: Decision::Reject })
            .await;
        again.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn returns_409_when_the_team_is_full() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let leader = create_participant(&server, hackathon, "Lead", &[]).await;
        let a = create_participant(&server, hackathon, "A", &[]).await;
        let b = create_participant(&server, hackathon, "B", &[]).await;
        let team = create_team(&server, hackathon, &leader, 2).await;
        let first = request_to_join(&server, &a, &team).await;
        let second = request_to_join(&server, &b, &team).await;

        server
            .post(&format!("/api/v1/join-requests/{}/respond", first.request.id))
            .json(&RespondJoinRequestInput { decision: Decision::Accept })
            .await
            .assert_status_ok();

        let response = server
            .post(&format!("/api/v1/join-requests/{}/respond", second.request.id))
            .json(&RespondJoinRequestInput { decision: Decision::Accept })
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn lists_requests_for_a_team() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let leader = create_participant(&server, hackathon, "Lead", &[]).await;
        let seeker = create_participant(&server, hackathon, "Seeker", &[]).await;
        let team = create_team(&server, hackathon, &leader, 3).await;
        let created = request_to_join(&server, &seeker, &team).await;

        let response = server.get(&format!("/api/v1/teams/{}/join-requests", team.id)).await;

        response.assert_status_ok();
        let requests: Vec<JoinRequest> = response.json();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, created.request.id);
        assert_eq!(requests[0].message.as_deref(), Some("Hi"));
    }
}

mod notifications {
    use super::*;

    #[tokio::test]
    async fn marks_one_notification_read() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let leader = create_participant(&server, hackathon, "Lead", &[]).await;
        let seeker = create_participant(&server, hackathon, "Seeker", &[]).await;
        let team = create_team(&server, hackathon, &leader, 3).await;
        let created = request_to_join(&server, &seeker, &team).await;

        let response = server
            .post(&format!("/api/v1/notifications/{}/read", created.notification.id))
            .await;

        response.assert_status_ok();
        assert!(response.json::<Notification>().read);
    }

    #[tokio::test]
    async fn returns_404_when_marking_an_unknown_notification() {
        let server = setup();

        let response = server
            .post(&format!("/api/v1/notifications/{}/read", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn marks_all_read_and_reports_zero_unread() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let leader = create_participant(&server, hackathon, "Lead", &[]).await;
        let team = create_team(&server, hackathon, &leader, 5).await;
        for name in ["A", "B"] {
            let p = create_participant(&server, hackathon, name, &[]).await;
            request_to_join(&server, &p, &team).await;
        }

        let response = server
            .post(&format!("/api/v1/participants/{}/notifications/read-all", leader.id))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<UnreadCount>().unread, 0);

        let list = server
            .get(&format!("/api/v1/participants/{}/notifications", leader.id))
            .await
            .json::<Vec<Notification>>();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|n| n.read));
    }

    #[tokio::test]
    async fn serializes_the_payload_with_its_type_tag() {
        let server = setup();
        let hackathon = Uuid::new_v4();
        let leader = create_participant(&server, hackathon, "Lead", &[]).await;
        let seeker = create_participant(&server, hackathon, "Seeker", &[]).await;
        let team = create_team(&server, hackathon, &leader, 3).await;
        request_to_join(&server, &seeker, &team).await;

        let list = server
            .get(&format!("/api/v1/participants/{}/notifications", leader.id))
            .await
            .json::<serde_json::Value>();

        assert_eq!(list[0]["payload"]["type"], "TEAM_JOIN_REQUEST");
        assert_eq!(list[0]["payload"]["team_name"], "Lead's team");
        assert_eq!(list[0]["status"], "pending");
    }

    #[tokio::test]
    async fn refuses_a_stream_for_an_unknown_participant() {
        let server = setup();

        let response = server
            .get(&format!("/api/v1/participants/{}/notifications/stream", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
