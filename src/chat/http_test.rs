use super::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tokio::time::timeout;

// =========================================================================
// Stub relay
// =========================================================================

type Store = Arc<Mutex<HashMap<String, Vec<RelayEnvelope>>>>;

async fn post_handler(State(store): State<Store>, Path(doc): Path<String>, Json(msg): Json<ChatMessage>) {
    let mut store = store.lock().unwrap();
    let log = store.entry(doc).or_default();
    let seq = log.len() as u64;
    log.push(RelayEnvelope { seq, sender: msg.sender, body: msg.body });
}

async fn list_handler(
    State(store): State<Store>,
    Path(doc): Path<String>,
    Query(params): Query<HashMap<String, u64>>,
) -> Json<Vec<RelayEnvelope>> {
    let since = params.get("since").copied().unwrap_or(0);
    let store = store.lock().unwrap();
    let log = store.get(&doc).cloned().unwrap_or_default();
    Json(log.into_iter().filter(|m| m.seq >= since).collect())
}

async fn spawn_relay() -> (String, Store) {
    let store: Store = Arc::default();
    let app = Router::new()
        .route("/documents/{doc}/messages", get(list_handler).post(post_handler))
        .with_state(store.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), store)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn post_then_fetch_round_trips_through_relay() {
    let (base, _store) = spawn_relay().await;
    let transport = HttpChatTransport::new(&base, "sheet1");

    transport.post_message(&ChatMessage::new("bob", "6*4")).await.unwrap();
    transport.post_message(&ChatMessage::new("alice", "6*4-1")).await.unwrap();

    let all = transport.fetch_since(0).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].sender, "bob");

    let tail = transport.fetch_since(1).await.unwrap();
    assert_eq!(tail, vec![RelayEnvelope { seq: 1, sender: "alice".into(), body: "6*4-1".into() }]);
}

#[tokio::test]
async fn poller_republishes_to_subscribers_once() {
    let (base, _store) = spawn_relay().await;
    let sender = HttpChatTransport::new(&base, "sheet1");
    let receiver = HttpChatTransport::new(&base, "sheet1");
    let mut rx = receiver.subscribe();
    let poller = receiver.spawn_poller(Duration::from_millis(10));

    sender.send_message("bob", "6*4");

    let msg = timeout(Duration::from_secs(2), rx.recv()).await.expect("relay delivery timed out").unwrap();
    assert_eq!(msg, ChatMessage::new("bob", "6*4"));
    assert!(
        timeout(Duration::from_millis(100), rx.recv()).await.is_err(),
        "message should not be redelivered"
    );
    poller.abort();
}

#[tokio::test]
async fn fetch_reports_non_success_status() {
    let (base, _store) = spawn_relay().await;
    let transport = HttpChatTransport::new(&format!("{base}missing"), "sheet1");
    let err = transport.fetch_since(0).await.expect_err("should fail");
    assert!(matches!(err, ChatError::Status { status: 404, .. }));
}

#[tokio::test]
async fn poller_survives_max_sequence_without_redelivery() {
    let (base, store) = spawn_relay().await;
    store.lock().unwrap().insert(
        "sheet1".into(),
        vec![
            RelayEnvelope { seq: 7, sender: "bob".into(), body: "6".into() },
            RelayEnvelope { seq: u64::MAX, sender: "bob".into(), body: "6*4".into() },
        ],
    );
    let receiver = HttpChatTransport::new(&base, "sheet1");
    let mut rx = receiver.subscribe();
    let poller = receiver.spawn_poller(Duration::from_millis(10));

    for body in ["6", "6*4"] {
        let msg = timeout(Duration::from_secs(2), rx.recv()).await.expect("relay delivery timed out").unwrap();
        assert_eq!(msg, ChatMessage::new("bob", body));
    }
    assert!(
        timeout(Duration::from_millis(100), rx.recv()).await.is_err(),
        "last message should not be redelivered"
    );
    assert!(!poller.is_finished(), "poller should keep running");
    poller.abort();
}
