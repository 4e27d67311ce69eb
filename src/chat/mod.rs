//! Chat transport used as a broadcast channel for game moves.
//!
//! DESIGN
//! ======
//! The transport is a publish/subscribe pipe with one topic per document.
//! It knows nothing about formulas: a game move is just a message body.
//! Sending is fire-and-forget; delivery and ordering belong to the
//! transport implementation.

pub mod hub;
pub mod http;

pub use hub::{ChatHub, HubTransport};
pub use http::{ChatError, HttpChatTransport};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Capacity of the local broadcast topic. Lagging subscribers skip ahead.
pub const TOPIC_CAPACITY: usize = 256;

/// A single chat message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub body: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self { sender: sender.into(), body: body.into() }
    }
}

/// Publish/subscribe endpoint bound to a single document topic.
pub trait ChatTransport: Send + Sync {
    /// Publish `body` under `sender`. Never blocks and never fails from the
    /// caller's point of view.
    fn send_message(&self, sender: &str, body: &str);

    /// Receive every message published on the topic from now on,
    /// including this client's own.
    fn subscribe(&self) -> broadcast::Receiver<ChatMessage>;
}
