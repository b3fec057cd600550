//! Integration tests for the study HTTP API.
//!
//! Requests go through the full router (CORS, tracing, JSON rejection
//! handling) via `tower::ServiceExt::oneshot`, against a live study runtime.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    Router,
};
use http::{header, Method, Request, StatusCode};
use futures::StreamExt;
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite};
use tower::ServiceExt;

use ux_study_chat::adapters::ai::{CannedTextGenerator, MockTextGenerator, CANNED_INSIGHT};
use ux_study_chat::adapters::http::{app_router, StudyHandlers};
use ux_study_chat::application::{StudyHandle, StudyRuntime, StudyRuntimeConfig};
use ux_study_chat::domain::study::{prompts, PersonaFeedback, Stage, StudySnapshot, StudyStatus};
use ux_study_chat::ports::TextGenerator;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn spawn_study(generator: Arc<dyn TextGenerator>, stage_delay: Duration) -> StudyHandle {
    StudyRuntime::spawn(
        generator,
        Arc::new(PersonaFeedback::builtin()),
        StudyRuntimeConfig::default().with_stage_delay(stage_delay),
    )
}

/// App whose stages never advance during a test.
fn frozen_app() -> (Router, StudyHandle) {
    let study = spawn_study(
        Arc::new(MockTextGenerator::new()),
        Duration::from_secs(3600),
    );
    (app_router(StudyHandlers::new(study.clone()), &[]), study)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn setup_body() -> Value {
    json!({ "goal": "Add DOLO to cart", "criteria": "rural users", "agent_count": 3 })
}

async fn wait_for(study: &StudyHandle, condition: impl Fn(&StudySnapshot) -> bool) -> StudySnapshot {
    let mut rx = study.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let snapshot = rx.borrow_and_update();
                if condition(&*snapshot) {
                    return snapshot.clone();
                }
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("condition not reached in time")
}

// =============================================================================
// Endpoints
// =============================================================================

#[tokio::test]
async fn health_check_returns_ok() {
    let (app, _study) = frozen_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn idle_study_reports_not_started() {
    let (app, _study) = frozen_app();
    let (status, body) = send(&app, Method::GET, "/api/study", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");
    assert_eq!(body["stage_index"], -1);
    assert_eq!(body["messages"], json!([]));
    assert_eq!(body["stage_labels"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn start_study_returns_created_snapshot() {
    let (app, _study) = frozen_app();
    let (status, body) = send(&app, Method::POST, "/api/study", Some(setup_body())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["stage"], "creating_agents");
    assert_eq!(body["config"]["goal"], "Add DOLO to cart");
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["sender"], "agent");
}

#[tokio::test]
async fn start_study_with_blank_goal_is_bad_request() {
    let (app, _study) = frozen_app();
    let body = json!({ "goal": "   ", "criteria": "rural users" });
    let (status, body) = send(&app, Method::POST, "/api/study", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["details"]["field"], "goal");
}

#[tokio::test]
async fn start_study_with_malformed_json_is_bad_request() {
    let (app, _study) = frozen_app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/study")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn second_start_conflicts() {
    let (app, _study) = frozen_app();
    send(&app, Method::POST, "/api/study", Some(setup_body())).await;
    let (status, body) = send(&app, Method::POST, "/api/study", Some(setup_body())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn message_before_start_conflicts() {
    let (app, _study) = frozen_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/study/messages",
        Some(json!({ "text": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn message_is_accepted_and_answered() {
    let (app, study) = frozen_app();
    send(&app, Method::POST, "/api/study", Some(setup_body())).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/study/messages",
        Some(json!({ "text": "What did users struggle with?" })),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    let last = body["messages"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["sender"], "user");
    assert_eq!(last["text"], "What did users struggle with?");

    let snapshot = wait_for(&study, |s| s.pending_replies == 0 && s.messages.len() == 3).await;
    assert_eq!(snapshot.messages[2].text(), "Mock response");
}

#[tokio::test]
async fn blank_message_is_bad_request() {
    let (app, _study) = frozen_app();
    send(&app, Method::POST, "/api/study", Some(setup_body())).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/study/messages",
        Some(json!({ "text": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_resets_to_idle() {
    let (app, _study) = frozen_app();
    let (_, started) = send(&app, Method::POST, "/api/study", Some(setup_body())).await;
    let (status, body) = send(&app, Method::DELETE, "/api/study", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");
    assert_ne!(body["study_id"], started["study_id"]);

    let (status, _) = send(&app, Method::POST, "/api/study", Some(setup_body())).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn stopped_runtime_is_unavailable() {
    let (app, study) = frozen_app();
    study.shutdown().await.unwrap();

    let (status, body) = send(&app, Method::POST, "/api/study", Some(setup_body())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let study = spawn_study(Arc::new(MockTextGenerator::new()), Duration::from_secs(3600));
    let app = app_router(
        StudyHandlers::new(study),
        &["http://localhost:5173".to_string()],
    );

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/study")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn canned_study_runs_to_completion() {
    let study = spawn_study(Arc::new(CannedTextGenerator::new()), Duration::from_millis(10));
    let app = app_router(StudyHandlers::new(study.clone()), &[]);

    let (status, _) = send(&app, Method::POST, "/api/study", Some(setup_body())).await;
    assert_eq!(status, StatusCode::CREATED);

    let done = wait_for(&study, |s| s.status == StudyStatus::Completed).await;
    assert_eq!(done.stage, Stage::Done);
    let insight = prompts::format_insight(CANNED_INSIGHT);
    assert!(done.messages.iter().any(|m| m.text() == insight));
    assert_eq!(done.stage_work[3], insight);

    let (_, body) = send(&app, Method::GET, "/api/study", None).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["stage_index"], 4);
}

// =============================================================================
// Snapshot stream
// =============================================================================

async fn next_snapshot<S>(socket: &mut S) -> Value
where
    S: futures::Stream<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin,
{
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("no frame in time")
            .expect("stream closed")
            .unwrap();
        if let tungstenite::Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn stream_pushes_current_snapshot_then_changes() {
    let (app, study) = frozen_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (mut socket, _) = connect_async(format!("ws://{addr}/api/study/stream"))
        .await
        .unwrap();

    let first = next_snapshot(&mut socket).await;
    assert_eq!(first["status"], "idle");
    assert_eq!(first["stage_index"], -1);

    study
        .submit(ux_study_chat::domain::study::StudySetupForm {
            goal: "Add DOLO to cart".to_string(),
            criteria: "rural users".to_string(),
            agent_count: 3,
        })
        .await
        .unwrap();

    let started = next_snapshot(&mut socket).await;
    assert_eq!(started["stage_index"], 0);
    assert_eq!(started["status"], "running");
    assert_eq!(started["messages"].as_array().unwrap().len(), 1);
}
