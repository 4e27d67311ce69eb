//! Authoritative sheet engine boundary.
//!
//! DESIGN
//! ======
//! The engine owns every piece of mutable sheet state: the token buffer,
//! the working cell, the edit status, game mode, and the error signal. The
//! client only ever reads it through these accessors and mutates it through
//! these operations; the view-side copies are caches rebuilt each tick.
//!
//! Every method takes `&self` and must be individually atomic, since the
//! sync loop and UI handlers call into the engine from different tasks.
//! A multi-field read in one tick is not transactional across fields.
//!
//! ERROR HANDLING
//! ==============
//! Operations never return errors. A failed operation records a message
//! that [`SheetEngine::take_error`] hands out exactly once (clear-on-read).

pub mod cell;
pub mod eval;
pub mod local;

pub use cell::CellAddress;
pub use local::LocalEngine;

use serde::Serialize;

/// Pre-rendered display strings for every cell in the grid, row-major.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SheetSnapshot {
    rows: Vec<Vec<String>>,
}

impl SheetSnapshot {
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Display string for `label`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        let addr: CellAddress = label.parse().ok()?;
        self.rows.get(addr.row)?.get(addr.col).map(String::as_str)
    }
}

/// Operations the client consumes from the authoritative engine.
pub trait SheetEngine: Send + Sync {
    /// Formula text of the working cell.
    fn formula_string(&self) -> String;
    /// Evaluated result of the working cell.
    fn result_string(&self) -> String;
    fn sheet_display_strings(&self) -> SheetSnapshot;
    /// Human-readable edit status, e.g. `"editing: B2"`.
    fn edit_status_string(&self) -> String;
    fn working_cell_label(&self) -> String;
    fn edit_status(&self) -> bool;
    fn set_edit_status(&self, editing: bool);

    /// Return the last error message and clear it. Empty when no error.
    fn take_error(&self) -> String;

    fn game_mode(&self) -> bool;
    /// Enter game mode and draw a fresh set of game numbers.
    fn set_game_mode(&self);
    /// Enter game mode with numbers drawn by the host's engine.
    fn join_game_mode(&self, numbers: &[u32]);
    fn close_game_mode(&self);
    /// Game formula produced locally and not yet broadcast. Empty when none.
    fn game_formula_string(&self) -> String;
    /// User name the engine held when the pending game formula was
    /// produced. Empty when nothing is pending.
    fn game_formula_author(&self) -> String;
    /// Fold `formula` into the confirmed game state and clear the pending
    /// marker. When `formula` differs from the buffer (a replayed remote
    /// move), the buffer is replaced by it.
    fn update_game_formulas(&self, formula: &str);
    fn game_numbers(&self) -> Vec<u32>;

    fn add_token(&self, token: &str);
    /// Append a reference to `label`. Callers never pass an empty label.
    fn add_cell(&self, label: &str);
    /// Remove the last token; a no-op on an empty buffer.
    fn remove_token(&self);
    /// Empty the buffer. Never an error.
    fn clear_formula(&self);
    /// Move the working cell to `label` and load its formula and result.
    fn request_view_by_label(&self, label: &str);

    fn set_server_selector(&self, name: &str);
    fn set_user_name(&self, name: &str);
    fn set_document_name(&self, name: &str);

    /// Monotonic counter bumped by every mutation, local or remote.
    fn revision(&self) -> u64;
}
