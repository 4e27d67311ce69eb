use super::*;
use tokio::time::{Duration, timeout};

async fn assert_topic_empty(rx: &mut broadcast::Receiver<ChatMessage>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected topic to remain empty"
    );
}

#[tokio::test]
async fn transports_for_same_document_share_topic() {
    let hub = ChatHub::new();
    let alice = hub.transport("sheet1");
    let bob = hub.transport("sheet1");
    let mut rx = bob.subscribe();

    alice.send_message("alice", "6*4");

    let msg = rx.recv().await.expect("message");
    assert_eq!(msg, ChatMessage::new("alice", "6*4"));
    assert_eq!(hub.topic_count(), 1);
}

#[tokio::test]
async fn documents_are_isolated() {
    let hub = ChatHub::new();
    let sheet1 = hub.transport("sheet1");
    let sheet2 = hub.transport("sheet2");
    let mut rx = sheet2.subscribe();

    sheet1.send_message("alice", "1+1");

    assert_topic_empty(&mut rx).await;
    assert_eq!(sheet2.document(), "sheet2");
}

#[test]
fn send_without_subscribers_is_not_an_error() {
    let hub = ChatHub::new();
    hub.transport("lonely").send_message("alice", "9");
}
