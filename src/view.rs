//! View-facing state and the callbacks a rendering layer provides.
//!
//! DESIGN
//! ======
//! `DisplayState` is a cache of engine reads, rebuilt on every refresh and
//! published through a `watch` channel. It is never written back to the
//! engine. Alerts and page navigation are platform concerns and go
//! through the [`Notifier`] and [`Navigator`] traits.

use std::sync::Mutex;

use serde::Serialize;

use crate::engine::SheetSnapshot;

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

/// Everything the view renders, as of the last refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DisplayState {
    pub formula: String,
    pub result: String,
    pub status: String,
    pub cells: SheetSnapshot,
    pub working_cell: String,
    pub editing: bool,
    pub game_mode: bool,
    pub game_numbers: Vec<u32>,
    pub user_name: String,
    pub server: String,
    pub revision: u64,
}

impl DisplayState {
    /// Label of the game-mode toggle button.
    #[must_use]
    pub fn game_toggle_label(&self) -> &'static str {
        if self.game_mode { "Deactivate Game Mode" } else { "Activate Game Mode" }
    }
}

/// Blocking user notification, e.g. a dialog the user must dismiss.
///
/// The sync loop awaits `alert`, so no further ticks run until it returns.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn alert(&self, message: &str);
}

/// Page navigation provided by the hosting platform.
pub trait Navigator: Send + Sync {
    /// Replace the current location with `url` and reload the page.
    fn push_and_reload(&self, url: &str);
}

/// Notifier that records every alert. Useful for headless embedding.
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn alert(&self, message: &str) {
        self.alerts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(message.to_string());
    }
}
