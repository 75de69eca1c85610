// End-to-end tests: real Firebase and LINE clients against mock servers

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use feeder::api::{create_webhook_router, WebhookAppState};
use feeder::config::{LineConfig, StoreConfig};
use feeder::line::{sign, LineClient, SIGNATURE_HEADER};
use feeder::monitor::{ChangeMonitor, TickOutcome};
use feeder::store::FirebaseClient;
use feeder::CommandDispatcher;
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

const SECRET: &str = "e2e-secret";

fn firebase(url: String) -> Arc<FirebaseClient> {
    Arc::new(
        FirebaseClient::new(&StoreConfig {
            database_url: url,
            auth_token: None,
            request_timeout_seconds: 5,
        })
        .unwrap(),
    )
}

fn line(url: String) -> Arc<LineClient> {
    Arc::new(
        LineClient::new(&LineConfig {
            channel_secret: SECRET.to_string(),
            channel_access_token: "e2e-token".to_string(),
            api_base: url,
            request_timeout_seconds: 1,
        })
        .unwrap(),
    )
}

/// "feed" with a low food level reads food/state, writes motor/state and replies.
#[tokio::test]
async fn test_feed_command_round_trip() {
    let mut db = Server::new_async().await;
    let mut chat = Server::new_async().await;

    let read_food = db
        .mock("GET", "/food/state.json")
        .with_status(200)
        .with_body("12")
        .create_async()
        .await;
    let write_motor = db
        .mock("PUT", "/motor/state.json")
        .match_body(Matcher::Json(json!(1)))
        .with_status(200)
        .with_body("1")
        .create_async()
        .await;
    let reply = chat
        .mock("POST", "/v2/bot/message/reply")
        .match_header("authorization", "Bearer e2e-token")
        .match_body(Matcher::Json(json!({
            "replyToken": "r-1",
            "messages": [{"type": "text", "text": "Feeding initiated!"}]
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let app = create_webhook_router(
        WebhookAppState {
            dispatcher: CommandDispatcher::new(firebase(db.url()), line(chat.url())),
            channel_secret: SECRET.to_string(),
        },
        "/callback",
    );

    let body = json!({
        "destination": "Ubot",
        "events": [{
            "type": "message",
            "replyToken": "r-1",
            "message": {"id": "1", "type": "text", "text": "feed"}
        }]
    })
    .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/callback")
                .header(SIGNATURE_HEADER, sign(SECRET, body.as_bytes()))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    read_food.assert_async().await;
    write_motor.assert_async().await;
    reply.assert_async().await;
}

/// A monitor tick reads the root document and broadcasts each transition.
#[tokio::test]
async fn test_monitor_tick_broadcasts() {
    let mut db = Server::new_async().await;
    let mut chat = Server::new_async().await;

    let _root = db
        .mock("GET", "/.json")
        .with_status(200)
        .with_body(r#"{"temp": {"state": 2}, "quality": {"state": 0}, "food": {"state": 50}}"#)
        .create_async()
        .await;
    let broadcast = chat
        .mock("POST", "/v2/bot/message/broadcast")
        .match_body(Matcher::Json(json!({
            "messages": [{"type": "text", "text": "Temperature is too high!"}]
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let mut monitor =
        ChangeMonitor::new(firebase(db.url()), line(chat.url()), Duration::from_secs(30));

    match monitor.tick().await {
        TickOutcome::Polled { notifications } => assert_eq!(notifications.len(), 1),
        other => panic!("expected a successful poll, got {:?}", other),
    }

    // Same state again: nothing new to broadcast
    match monitor.tick().await {
        TickOutcome::Polled { notifications } => assert!(notifications.is_empty()),
        other => panic!("expected a successful poll, got {:?}", other),
    }

    broadcast.assert_async().await;
}

/// A store error during a tick is reported and does not broadcast.
#[tokio::test]
async fn test_monitor_tick_store_error() {
    let mut db = Server::new_async().await;
    let chat = Server::new_async().await;

    let _root = db
        .mock("GET", "/.json")
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let mut monitor =
        ChangeMonitor::new(firebase(db.url()), line(chat.url()), Duration::from_secs(30));

    assert!(matches!(monitor.tick().await, TickOutcome::FetchFailed(_)));
    assert_eq!(monitor.status().lock().await.error_count, 1);
}

/// A LINE endpoint that accepts the connection but never answers does not
/// stall the monitor: the broadcast times out and counts as failed.
#[tokio::test]
async fn test_monitor_tick_survives_unanswered_broadcast() {
    let mut db = Server::new_async().await;
    let _root = db
        .mock("GET", "/.json")
        .with_status(200)
        .with_body(r#"{"temp": {"state": 2}}"#)
        .create_async()
        .await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let silent_chat = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut monitor =
        ChangeMonitor::new(firebase(db.url()), line(silent_chat), Duration::from_secs(30));

    let outcome = tokio::time::timeout(Duration::from_secs(20), monitor.tick())
        .await
        .expect("tick should finish once the broadcast times out");

    match outcome {
        TickOutcome::Polled { notifications } => assert_eq!(notifications.len(), 1),
        other => panic!("expected a successful poll, got {:?}", other),
    }

    let status = monitor.status();
    let status = status.lock().await;
    assert_eq!(status.notifications_sent, 0);
    assert_eq!(status.notifications_failed, 1);
    assert_eq!(status.previous.temp.state, 2);
}
