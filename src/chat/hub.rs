//! In-memory chat hub: one `broadcast` topic per document.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tracing::debug;

use super::{ChatMessage, ChatTransport, TOPIC_CAPACITY};

#[cfg(test)]
#[path = "hub_test.rs"]
mod hub_test;

/// Shared registry of document topics. Clones share the same topics.
#[derive(Clone, Default)]
pub struct ChatHub {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<ChatMessage>>>>,
}

impl ChatHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport bound to `document`'s topic, creating the topic on first use.
    #[must_use]
    pub fn transport(&self, document: &str) -> HubTransport {
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = topics
            .entry(document.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .clone();
        HubTransport { document: document.to_string(), tx }
    }

    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[derive(Clone)]
pub struct HubTransport {
    document: String,
    tx: broadcast::Sender<ChatMessage>,
}

impl HubTransport {
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }
}

impl ChatTransport for HubTransport {
    fn send_message(&self, sender: &str, body: &str) {
        // A topic with no subscribers drops the message.
        let receivers = self.tx.send(ChatMessage::new(sender, body)).unwrap_or(0);
        debug!(document = %self.document, %sender, receivers, "chat: message published");
    }

    fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.tx.subscribe()
    }
}
