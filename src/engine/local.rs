//! In-process authoritative engine.
//!
//! DESIGN
//! ======
//! `LocalEngine` keeps the whole sheet behind one `Mutex`, so each trait
//! method is a single critical section. Every mutation re-evaluates the
//! grid; the grid is small enough that dependency tracking is not worth it.
//!
//! Game mode tracks two formulas: the confirmed one (last value folded in
//! by `update_game_formulas`) and the pending one (a local edit that has
//! not been broadcast yet). Pending is set only when the buffer differs
//! from the confirmed formula, so an unchanged buffer is never re-sent.
//! The pending formula carries the user name the engine held when it was
//! produced, so clients sharing one engine only send their own moves.
//!
//! `remove_token` and `clear_formula` work in either edit status and never
//! raise an error; only appends require editing.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::cell::CellAddress;
use super::eval::{self, EvalError};
use super::{SheetEngine, SheetSnapshot};
use crate::tokens::TokenBuffer;

#[cfg(test)]
#[path = "local_test.rs"]
mod local_test;

pub const DEFAULT_ROWS: usize = 10;
pub const DEFAULT_COLS: usize = 8;
pub const GAME_NUMBER_COUNT: usize = 4;
pub const GAME_NUMBER_MAX: u32 = 13;

#[derive(Clone, Debug, Default)]
struct CellData {
    formula: TokenBuffer,
    display: String,
}

struct EngineState {
    cells: Vec<Vec<CellData>>,
    working: CellAddress,
    editing: bool,
    error: String,
    game_mode: bool,
    game_numbers: Vec<u32>,
    pending_game_formula: String,
    pending_game_author: String,
    confirmed_game_formula: String,
    server: String,
    user_name: String,
    document_name: String,
    revision: u64,
    rng: StdRng,
}

impl EngineState {
    fn in_grid(&self, addr: CellAddress) -> bool {
        addr.row < self.cells.len() && addr.col < self.cells[addr.row].len()
    }

    fn parse_label(&self, label: &str) -> Option<CellAddress> {
        label.parse::<CellAddress>().ok().filter(|addr| self.in_grid(*addr))
    }

    fn working_cell(&self) -> &CellData {
        &self.cells[self.working.row][self.working.col]
    }

    fn working_formula_mut(&mut self) -> &mut TokenBuffer {
        &mut self.cells[self.working.row][self.working.col].formula
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn require_editing(&mut self) -> bool {
        if !self.editing {
            self.error = format!("Cell {} is not being edited", self.working.label());
        }
        self.editing
    }

    fn enter_game(&mut self, numbers: Vec<u32>) {
        self.game_numbers = numbers;
        self.game_mode = true;
        self.pending_game_formula.clear();
        self.pending_game_author.clear();
        self.confirmed_game_formula = self.working_cell().formula.render();
        self.bump();
    }

    /// Shared tail of every buffer mutation.
    fn after_formula_change(&mut self) {
        self.recompute();
        if self.game_mode {
            let formula = self.working_cell().formula.render();
            if formula == self.confirmed_game_formula {
                self.pending_game_formula.clear();
                self.pending_game_author.clear();
            } else {
                self.pending_game_formula = formula;
                self.pending_game_author.clone_from(&self.user_name);
            }
        }
        self.bump();
    }

    fn recompute(&mut self) {
        let memo = RefCell::new(HashMap::new());
        let visiting = RefCell::new(HashSet::new());
        let mut displays = Vec::with_capacity(self.cells.len());
        for (row, cells) in self.cells.iter().enumerate() {
            let mut row_displays = Vec::with_capacity(cells.len());
            for (col, cell) in cells.iter().enumerate() {
                if cell.formula.is_empty() {
                    row_displays.push(String::new());
                    continue;
                }
                let value = evaluate_cell(&self.cells, CellAddress::new(col, row), 0, &memo, &visiting);
                row_displays.push(match value {
                    Ok(v) => eval::format_number(v),
                    Err(e) => e.display_code().to_string(),
                });
            }
            displays.push(row_displays);
        }
        for (cells, row_displays) in self.cells.iter_mut().zip(displays) {
            for (cell, display) in cells.iter_mut().zip(row_displays) {
                cell.display = display;
            }
        }
    }
}

fn evaluate_cell(
    cells: &[Vec<CellData>],
    addr: CellAddress,
    depth: usize,
    memo: &RefCell<HashMap<CellAddress, Result<f64, EvalError>>>,
    visiting: &RefCell<HashSet<CellAddress>>,
) -> Result<f64, EvalError> {
    if let Some(value) = memo.borrow().get(&addr) {
        return value.clone();
    }
    let Some(cell) = cells.get(addr.row).and_then(|r| r.get(addr.col)) else {
        return Err(EvalError::BadReference(addr.label()));
    };
    if !visiting.borrow_mut().insert(addr) {
        return Err(EvalError::Circular(addr.label()));
    }

    let result = if cell.formula.is_empty() {
        Ok(0.0)
    } else {
        eval::evaluate_at(cell.formula.tokens(), depth, |dep, depth| evaluate_cell(cells, dep, depth, memo, visiting))
    };

    visiting.borrow_mut().remove(&addr);
    // A budget failure depends on where the cell was reached from.
    if !matches!(result, Err(EvalError::TooDeep)) {
        memo.borrow_mut().insert(addr, result.clone());
    }
    result
}

/// Thread-safe in-memory sheet implementing [`SheetEngine`].
pub struct LocalEngine {
    inner: Mutex<EngineState>,
}

impl LocalEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::build(DEFAULT_ROWS, DEFAULT_COLS, StdRng::from_os_rng())
    }

    /// Deterministic game numbers for tests and replays.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::build(DEFAULT_ROWS, DEFAULT_COLS, StdRng::seed_from_u64(seed))
    }

    fn build(rows: usize, cols: usize, rng: StdRng) -> Self {
        Self {
            inner: Mutex::new(EngineState {
                cells: vec![vec![CellData::default(); cols]; rows],
                working: CellAddress::new(0, 0),
                editing: false,
                error: String::new(),
                game_mode: false,
                game_numbers: Vec::new(),
                pending_game_formula: String::new(),
                pending_game_author: String::new(),
                confirmed_game_formula: String::new(),
                server: crate::config::DEFAULT_SERVER.to_string(),
                user_name: String::new(),
                document_name: String::new(),
                revision: 0,
                rng,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn server(&self) -> String {
        self.state().server.clone()
    }

    #[must_use]
    pub fn user_name(&self) -> String {
        self.state().user_name.clone()
    }

    #[must_use]
    pub fn document_name(&self) -> String {
        self.state().document_name.clone()
    }

    /// Confirmed game formula, as last folded in by `update_game_formulas`.
    #[must_use]
    pub fn confirmed_game_formula(&self) -> String {
        self.state().confirmed_game_formula.clone()
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetEngine for LocalEngine {
    fn formula_string(&self) -> String {
        self.state().working_cell().formula.render()
    }

    fn result_string(&self) -> String {
        self.state().working_cell().display.clone()
    }

    fn sheet_display_strings(&self) -> SheetSnapshot {
        let state = self.state();
        SheetSnapshot::new(
            state
                .cells
                .iter()
                .map(|row| row.iter().map(|cell| cell.display.clone()).collect())
                .collect(),
        )
    }

    fn edit_status_string(&self) -> String {
        let state = self.state();
        if state.editing {
            format!("editing: {}", state.working.label())
        } else {
            format!("current cell: {}", state.working.label())
        }
    }

    fn working_cell_label(&self) -> String {
        self.state().working.label()
    }

    fn edit_status(&self) -> bool {
        self.state().editing
    }

    fn set_edit_status(&self, editing: bool) {
        let mut state = self.state();
        if state.editing != editing {
            state.editing = editing;
            state.bump();
        }
    }

    fn take_error(&self) -> String {
        std::mem::take(&mut self.state().error)
    }

    fn game_mode(&self) -> bool {
        self.state().game_mode
    }

    fn set_game_mode(&self) {
        let mut state = self.state();
        let numbers: Vec<u32> = (0..GAME_NUMBER_COUNT)
            .map(|_| state.rng.random_range(1..=GAME_NUMBER_MAX))
            .collect();
        state.enter_game(numbers);
    }

    fn join_game_mode(&self, numbers: &[u32]) {
        self.state().enter_game(numbers.to_vec());
    }

    fn close_game_mode(&self) {
        let mut state = self.state();
        if state.game_mode {
            state.game_mode = false;
            state.game_numbers.clear();
            state.pending_game_formula.clear();
            state.pending_game_author.clear();
            state.confirmed_game_formula.clear();
            state.bump();
        }
    }

    fn game_formula_string(&self) -> String {
        let state = self.state();
        if state.game_mode { state.pending_game_formula.clone() } else { String::new() }
    }

    fn game_formula_author(&self) -> String {
        let state = self.state();
        if state.game_mode { state.pending_game_author.clone() } else { String::new() }
    }

    fn update_game_formulas(&self, formula: &str) {
        let mut state = self.state();
        state.confirmed_game_formula = formula.to_string();
        state.pending_game_formula.clear();
        state.pending_game_author.clear();
        if state.working_cell().formula.render() != formula {
            *state.working_formula_mut() = TokenBuffer::from_formula(formula);
            state.recompute();
        }
        state.bump();
    }

    fn game_numbers(&self) -> Vec<u32> {
        self.state().game_numbers.clone()
    }

    fn add_token(&self, token: &str) {
        let mut state = self.state();
        if !state.require_editing() {
            return;
        }
        state.working_formula_mut().push(token);
        state.after_formula_change();
    }

    fn add_cell(&self, label: &str) {
        let mut state = self.state();
        if !state.require_editing() {
            return;
        }
        let Some(addr) = state.parse_label(label) else {
            state.error = format!("Invalid cell reference: {label}");
            return;
        };
        if addr == state.working {
            state.error = format!("Circular reference: {}", addr.label());
            return;
        }
        state.working_formula_mut().push(addr.label());
        state.after_formula_change();
    }

    fn remove_token(&self) {
        let mut state = self.state();
        if state.working_formula_mut().pop().is_some() {
            state.after_formula_change();
        }
    }

    fn clear_formula(&self) {
        let mut state = self.state();
        if state.working_cell().formula.is_empty() {
            return;
        }
        state.working_formula_mut().clear();
        state.after_formula_change();
    }

    fn request_view_by_label(&self, label: &str) {
        let mut state = self.state();
        match state.parse_label(label) {
            Some(addr) => {
                state.working = addr;
                state.bump();
            }
            None => state.error = format!("Invalid cell reference: {label}"),
        }
    }

    fn set_server_selector(&self, name: &str) {
        let mut state = self.state();
        state.server = name.to_string();
        state.bump();
    }

    fn set_user_name(&self, name: &str) {
        self.state().user_name = name.to_string();
    }

    fn set_document_name(&self, name: &str) {
        self.state().document_name = name.to_string();
    }

    fn revision(&self) -> u64 {
        self.state().revision
    }
}
