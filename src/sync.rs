//! Sync loop: fixed-period refresh of the display from the engine.
//!
//! DESIGN
//! ======
//! A single task ticks every `period` and runs one
//! [`SheetController::tick`]. Ticks never overlap: the next tick is not
//! polled until the previous refresh, including any blocking alert, has
//! returned. Missed ticks are skipped rather than bursted.
//!
//! The loop is the only path by which foreign writes reach the view.
//! Conflicts are last-writer-wins: whatever the engine holds at tick time
//! replaces the display.
//!
//! A [`Mount`] owns the sync loop and the game replay task for one mounted
//! view. Dropping it aborts both.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::controller::SheetController;
use crate::game;

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

/// Spawn the sync loop. Returns a handle for cancellation.
pub fn spawn_sync_loop(controller: Arc<SheetController>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            controller.tick().await;
        }
    })
}

/// Background tasks of one mounted view.
pub struct Mount {
    document: String,
    tasks: Vec<JoinHandle<()>>,
}

impl Mount {
    /// Start the sync loop and the game replay task for `controller`.
    #[must_use]
    pub fn new(controller: Arc<SheetController>, period: Duration) -> Self {
        let document = controller.document_name();
        info!(%document, period_ms = period.as_millis(), "view mounted");
        let tasks = vec![
            spawn_sync_loop(controller.clone(), period),
            game::spawn_replay_task(controller),
        ];
        Self { document, tasks }
    }

    /// Attach another task to this mount's lifetime, e.g. a relay poller.
    pub fn attach(&mut self, task: JoinHandle<()>) {
        self.tasks.push(task);
    }

    /// Tear down explicitly. Equivalent to dropping.
    pub fn unmount(self) {}
}

impl Drop for Mount {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        info!(document = %self.document, "view unmounted");
    }
}
