//! HTTP chat relay transport.
//!
//! DESIGN
//! ======
//! Outgoing messages are POSTed to `{base}/documents/{doc}/messages` on a
//! spawned task. A background poller GETs the same path with `?since=<seq>`
//! and republishes every new message into a local `broadcast` topic, so
//! subscribers see relay traffic exactly like in-memory hub traffic.
//!
//! ERROR HANDLING
//! ==============
//! Send failures and poll failures are logged and dropped. The poller keeps
//! its cursor on failure, so a transient outage delays messages instead of
//! losing them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::{ChatMessage, ChatTransport, TOPIC_CAPACITY};

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat relay request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat relay returned {status} for {url}")]
    Status { status: u16, url: String },
}

/// Message as stored by the relay, with its sequence number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayEnvelope {
    pub seq: u64,
    pub sender: String,
    pub body: String,
}

#[derive(Clone)]
pub struct HttpChatTransport {
    client: reqwest::Client,
    base_url: String,
    document: String,
    tx: broadcast::Sender<ChatMessage>,
}

impl HttpChatTransport {
    #[must_use]
    pub fn new(base_url: &str, document: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            document: document.to_string(),
            tx: broadcast::channel(TOPIC_CAPACITY).0,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/documents/{}/messages", self.base_url, self.document)
    }

    /// POST one message to the relay.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError`] when the request fails or the relay answers
    /// with a non-success status.
    pub async fn post_message(&self, message: &ChatMessage) -> Result<(), ChatError> {
        let url = self.messages_url();
        let response = self.client.post(&url).json(message).send().await?;
        if !response.status().is_success() {
            return Err(ChatError::Status { status: response.status().as_u16(), url });
        }
        Ok(())
    }

    /// Fetch relay messages with sequence number `>= since`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError`] when the request fails, the relay answers with
    /// a non-success status, or the body is not a message list.
    pub async fn fetch_since(&self, since: u64) -> Result<Vec<RelayEnvelope>, ChatError> {
        let url = self.messages_url();
        let response = self
            .client
            .get(&url)
            .query(&[("since", since)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ChatError::Status { status: response.status().as_u16(), url });
        }
        Ok(response.json().await?)
    }

    /// Spawn the relay poller. Aborting the handle stops inbound delivery.
    #[must_use]
    pub fn spawn_poller(&self, period: Duration) -> JoinHandle<()> {
        let transport = self.clone();
        tokio::spawn(async move {
            // Highest sequence number already republished.
            let mut last_seen: Option<u64> = None;
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let since = last_seen.map_or(0, |seq| seq.saturating_add(1));
                match transport.fetch_since(since).await {
                    Ok(envelopes) => {
                        for envelope in envelopes {
                            if last_seen.is_some_and(|seen| envelope.seq <= seen) {
                                continue;
                            }
                            last_seen = Some(envelope.seq);
                            // No local subscribers drops the message, as on the hub.
                            let receivers =
                                transport.tx.send(ChatMessage::new(envelope.sender, envelope.body)).unwrap_or(0);
                            debug!(document = %transport.document, seq = envelope.seq, receivers, "chat: relay message received");
                        }
                    }
                    Err(e) => warn!(error = %e, document = %transport.document, "chat: relay poll failed"),
                }
            }
        })
    }
}

impl ChatTransport for HttpChatTransport {
    fn send_message(&self, sender: &str, body: &str) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(%sender, "chat: no async runtime; message dropped");
            return;
        };
        let transport = self.clone();
        let message = ChatMessage::new(sender, body);
        runtime.spawn(async move {
            match transport.post_message(&message).await {
                Ok(()) => debug!(document = %transport.document, sender = %message.sender, "chat: message relayed"),
                Err(e) => warn!(error = %e, document = %transport.document, "chat: relay send failed"),
            }
        });
    }

    fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.tx.subscribe()
    }
}
