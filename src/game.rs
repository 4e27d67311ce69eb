//! Game mode: a numeric puzzle played through the formula buffer.
//!
//! DESIGN
//! ======
//! Players build an expression equal to [`GAME_TARGET`] from the drawn game
//! numbers. Only [`GAME_HOST`] may turn the mode on or off; everyone else
//! observes it through the sync loop. Each completed move is broadcast as
//! plain formula text, and incoming moves are replayed into the engine by
//! the task started with [`spawn_replay_task`].
//!
//! Clients with separate engines learn about activation from the topic too:
//! the host publishes a [`GameControl`] body when it starts or stops the
//! game, and only control bodies sent by [`GAME_HOST`] are honored. A client
//! that subscribes after the start message stays inactive until the next one.
//!
//! ```text
//! Inactive --host activates--> ActiveAsHost | ActiveAsGuest --host deactivates--> Inactive
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::controller::SheetController;

#[cfg(test)]
#[path = "game_test.rs"]
mod game_test;

/// The single identity allowed to start and stop game mode.
pub const GAME_HOST: &str = "gameHost";

/// Value every game expression must reach.
pub const GAME_TARGET: u32 = 24;

/// Operators offered next to the game numbers.
pub const GAME_OPERATIONS: [&str; 6] = ["+", "-", "*", "/", "(", ")"];

/// Longest chat body replayed into the engine. Longer bodies are dropped.
pub const MAX_MOVE_LEN: usize = 256;

const CONTROL_PREFIX: &str = "!game ";

/// Host announcement carried over the chat topic. Formula bodies never
/// start with `!`, so the two cannot collide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameControl {
    Start(Vec<u32>),
    Stop,
}

impl GameControl {
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Start(numbers) => {
                let numbers: Vec<String> = numbers.iter().map(u32::to_string).collect();
                format!("{CONTROL_PREFIX}start {}", numbers.join(" "))
            }
            Self::Stop => format!("{CONTROL_PREFIX}stop"),
        }
    }

    /// Parse a chat body. `None` for ordinary moves and malformed controls.
    #[must_use]
    pub fn parse(body: &str) -> Option<Self> {
        let mut words = body.strip_prefix(CONTROL_PREFIX)?.split_whitespace();
        match words.next()? {
            "start" => {
                let numbers = words.map(str::parse).collect::<Result<Vec<u32>, _>>().ok()?;
                (!numbers.is_empty()).then_some(Self::Start(numbers))
            }
            "stop" => words.next().is_none().then_some(Self::Stop),
            _ => None,
        }
    }
}

#[must_use]
pub fn is_host(user_name: &str) -> bool {
    user_name == GAME_HOST
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameRole {
    Inactive,
    ActiveAsHost,
    ActiveAsGuest,
}

impl GameRole {
    #[must_use]
    pub fn of(game_mode: bool, user_name: &str) -> Self {
        match (game_mode, is_host(user_name)) {
            (false, _) => Self::Inactive,
            (true, true) => Self::ActiveAsHost,
            (true, false) => Self::ActiveAsGuest,
        }
    }
}

/// Replay moves from the chat topic into `controller` until the topic
/// closes or the handle is aborted.
pub fn spawn_replay_task(controller: Arc<SheetController>) -> JoinHandle<()> {
    let mut rx = controller.chat().subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(message) => controller.apply_remote_move(&message).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "game: replay lagged; skipped chat messages");
                }
                Err(RecvError::Closed) => {
                    debug!("game: chat topic closed; replay stopped");
                    break;
                }
            }
        }
    })
}
