//! Sheet controller: UI callbacks and display refresh.
//!
//! DESIGN
//! ======
//! The controller sits between the rendering layer and the engine. Every
//! UI callback checks the session identity, performs its engine mutation,
//! then forces an immediate [`SheetController::refresh`], so the acting
//! user never waits for the next sync tick to see their own change.
//!
//! A cell click means two different things depending on the engine's edit
//! status: while editing it appends a reference to the clicked cell, while
//! viewing it moves the working cell. The edit status is always read from
//! the engine, never from the cached display.
//!
//! Refreshes are serialized by an async mutex. Reading the pending game
//! formula and folding it back is two engine calls, and without the lock a
//! tick and a handler refresh could both broadcast the same move.
//!
//! ERROR HANDLING
//! ==============
//! Missing identity raises a blocking alert and returns
//! [`ClientError::MissingIdentity`]. Button text that is not a formula token
//! returns [`ClientError::InvalidToken`]. Host-only commands from other users
//! are ignored without an error. Engine errors are surfaced by `refresh`.
//!
//! Moves replayed from chat are untrusted: bodies longer than
//! [`game::MAX_MOVE_LEN`] are dropped before they reach the engine.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::buttons::{Command, UnknownCommand};
use crate::chat::{ChatMessage, ChatTransport};
use crate::engine::SheetEngine;
use crate::game::{self, GameControl, GameRole};
use crate::navigation;
use crate::session::{MISSING_IDENTITY_MESSAGE, Session};
use crate::tokens;
use crate::view::{DisplayState, Navigator, Notifier};

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("missing user name")]
    MissingIdentity,
    #[error(transparent)]
    UnknownCommand(#[from] UnknownCommand),
    #[error("not a formula token: {0:?}")]
    InvalidToken(String),
}

/// Why a refresh happened. Only sync ticks can observe foreign writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RefreshCause {
    Local,
    Tick,
}

pub struct SheetController {
    engine: Arc<dyn SheetEngine>,
    chat: Arc<dyn ChatTransport>,
    notifier: Arc<dyn Notifier>,
    session: RwLock<Session>,
    server: RwLock<String>,
    display: watch::Sender<DisplayState>,
    refresh_lock: Mutex<()>,
}

impl SheetController {
    #[must_use]
    pub fn new(
        engine: Arc<dyn SheetEngine>,
        chat: Arc<dyn ChatTransport>,
        notifier: Arc<dyn Notifier>,
        session: Session,
        server: &str,
    ) -> Self {
        engine.set_server_selector(server);
        let initial = read_display(engine.as_ref(), session.user_name(), server);
        Self {
            engine,
            chat,
            notifier,
            session: RwLock::new(session),
            server: RwLock::new(server.to_string()),
            display: watch::Sender::new(initial),
            refresh_lock: Mutex::new(()),
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn engine(&self) -> &Arc<dyn SheetEngine> {
        &self.engine
    }

    #[must_use]
    pub fn chat(&self) -> &Arc<dyn ChatTransport> {
        &self.chat
    }

    fn session(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn user_name(&self) -> String {
        self.session().user_name().to_string()
    }

    #[must_use]
    pub fn document_name(&self) -> String {
        self.session().document_name().to_string()
    }

    /// Change the local identity. Reaches the engine on the next refresh.
    pub fn set_user_name(&self, user_name: &str) {
        self.session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_user_name(user_name);
    }

    #[must_use]
    pub fn server(&self) -> String {
        self.server.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Latest published display state.
    #[must_use]
    pub fn display(&self) -> DisplayState {
        self.display.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.display.subscribe()
    }

    /// Push the session identity into the engine. Returns the user name.
    fn push_identity(&self) -> String {
        let (user, document) = {
            let session = self.session();
            (session.user_name().to_string(), session.document_name().to_string())
        };
        self.engine.set_user_name(&user);
        self.engine.set_document_name(&document);
        user
    }

    /// Identity gate for every mutating handler. The identity reaches the
    /// engine before the mutation, so pending game moves carry the author.
    async fn require_identity(&self) -> Result<String, ClientError> {
        let identity = self.session().identity().map(str::to_string);
        match identity {
            Some(user) => {
                self.push_identity();
                Ok(user)
            }
            None => {
                self.notifier.alert(MISSING_IDENTITY_MESSAGE).await;
                Err(ClientError::MissingIdentity)
            }
        }
    }

    // =========================================================================
    // UI CALLBACKS
    // =========================================================================

    /// Command button callback.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingIdentity`] when no user name is set.
    pub async fn on_command_button_click(&self, command: Command) -> Result<(), ClientError> {
        let user = self.require_identity().await?;

        if command.host_only() && !game::is_host(&user) {
            debug!(%user, %command, "host-only command ignored");
            self.refresh().await;
            return Ok(());
        }

        match command {
            Command::EditToggle => {
                let editing = self.engine.edit_status();
                self.engine.set_edit_status(!editing);
            }
            Command::Clear => self.engine.remove_token(),
            Command::AllClear => self.engine.clear_formula(),
            Command::ActivateGameMode => {
                self.engine.set_game_mode();
                let numbers = self.engine.game_numbers();
                info!(%user, ?numbers, "game mode activated");
                self.chat.send_message(&user, &GameControl::Start(numbers).encode());
            }
            Command::DeactivateGameMode => {
                self.engine.close_game_mode();
                info!(%user, "game mode deactivated");
                self.chat.send_message(&user, &GameControl::Stop.encode());
            }
        }

        self.refresh().await;
        Ok(())
    }

    /// Command button callback by button name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownCommand`] for names outside the button
    /// vocabulary, otherwise as [`Self::on_command_button_click`].
    pub async fn on_command_name(&self, name: &str) -> Result<(), ClientError> {
        let command: Command = name.parse()?;
        self.on_command_button_click(command).await
    }

    /// Numeral, operator, and parenthesis buttons. Pressing one always
    /// starts editing the working cell.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidToken`] for text that is not a single
    /// formula token, and [`ClientError::MissingIdentity`] when no user name
    /// is set.
    pub async fn on_button_click(&self, text: &str) -> Result<(), ClientError> {
        if tokens::classify(text).is_none() {
            return Err(ClientError::InvalidToken(text.to_string()));
        }
        self.require_identity().await?;
        self.engine.set_edit_status(true);
        self.engine.add_token(text);
        self.refresh().await;
        Ok(())
    }

    /// Cell click: reference insertion while editing, selection otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingIdentity`] when no user name is set.
    pub async fn on_cell_click(&self, label: &str) -> Result<(), ClientError> {
        self.require_identity().await?;
        // The grid always passes the clicked cell's own label.
        if label.is_empty() {
            return Ok(());
        }

        if self.engine.edit_status() {
            self.engine.add_cell(label);
        } else {
            self.engine.request_view_by_label(label);
        }

        self.refresh().await;
        Ok(())
    }

    /// Game keypad callback. Ignored unless game mode is on.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidToken`] for text that is not a single
    /// formula token, and [`ClientError::MissingIdentity`] when no user name
    /// is set.
    pub async fn on_number_or_operation_select(&self, value: &str) -> Result<(), ClientError> {
        if !self.engine.game_mode() {
            return Ok(());
        }
        if tokens::classify(value).is_none() {
            return Err(ClientError::InvalidToken(value.to_string()));
        }
        self.require_identity().await?;
        self.engine.set_edit_status(true);
        self.engine.add_token(value);
        self.refresh().await;
        Ok(())
    }

    /// Server selection callback. Not gated on identity.
    pub fn server_selector(&self, name: &str) {
        *self.server.write().unwrap_or_else(PoisonError::into_inner) = name.to_string();
        self.engine.set_server_selector(name);
        info!(server = %name, "server selected");
    }

    /// Replay a game move or host control received from the chat topic.
    pub async fn apply_remote_move(&self, message: &ChatMessage) {
        if message.sender == self.user_name() {
            return;
        }
        if message.body.len() > game::MAX_MOVE_LEN {
            warn!(sender = %message.sender, len = message.body.len(), "game: oversized move dropped");
            return;
        }

        if let Some(control) = GameControl::parse(&message.body) {
            if !game::is_host(&message.sender) {
                debug!(sender = %message.sender, "game: control from non-host ignored");
                return;
            }
            match control {
                GameControl::Start(numbers) => {
                    info!(host = %message.sender, ?numbers, "game mode joined");
                    self.engine.join_game_mode(&numbers);
                }
                GameControl::Stop => {
                    info!(host = %message.sender, "game mode closed by host");
                    self.engine.close_game_mode();
                }
            }
            self.refresh().await;
            return;
        }

        if !self.engine.game_mode() {
            return;
        }
        debug!(sender = %message.sender, body = %message.body, "game: replaying remote move");
        self.engine.update_game_formulas(&message.body);
        self.refresh().await;
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Prompt to show if the page is about to unload.
    #[must_use]
    pub fn before_unload(&self) -> Option<&'static str> {
        navigation::unload_warning(self.engine.edit_status())
    }

    /// Record the document name, then navigate to the documents page and
    /// reload. Everything held in memory is lost with the reload.
    pub fn return_to_login_page(&self, navigator: &dyn Navigator, href: &str) -> String {
        let document = self.document_name();
        self.engine.set_document_name(&document);
        let url = navigation::login_url(href);
        info!(%document, %url, "returning to login page");
        navigator.push_and_reload(&url);
        url
    }

    // =========================================================================
    // REFRESH
    // =========================================================================

    /// Re-read display state from the engine and publish it.
    pub async fn refresh(&self) {
        self.refresh_with(RefreshCause::Local).await;
    }

    /// One sync-loop tick.
    pub async fn tick(&self) {
        self.refresh_with(RefreshCause::Tick).await;
    }

    async fn refresh_with(&self, cause: RefreshCause) {
        let _guard = self.refresh_lock.lock().await;

        let user = self.push_identity();

        let next = read_display(self.engine.as_ref(), &user, &self.server());
        let (previous_revision, previous_game_mode) = {
            let current = self.display.borrow();
            (current.revision, current.game_mode)
        };
        if cause == RefreshCause::Tick && next.revision != previous_revision {
            debug!(from = previous_revision, to = next.revision, "display overwritten by newer engine state");
        }
        if next.game_mode != previous_game_mode {
            info!(%user, role = ?GameRole::of(next.game_mode, &user), "game mode changed");
        }
        let game_mode = next.game_mode;
        self.display.send_replace(next);

        let error = self.engine.take_error();
        if !error.is_empty() {
            warn!(%error, "engine reported an error");
            self.notifier.alert(&error).await;
        }

        if game_mode {
            let pending = self.engine.game_formula_string();
            if !pending.is_empty() {
                let author = self.engine.game_formula_author();
                if author == user {
                    self.chat.send_message(&user, &pending);
                    self.engine.update_game_formulas(&pending);
                    debug!(%user, formula = %pending, "game: move broadcast");
                } else {
                    debug!(%user, %author, "game: pending move belongs to another client");
                }
            }
        }
    }
}

fn read_display(engine: &dyn SheetEngine, user_name: &str, server: &str) -> DisplayState {
    DisplayState {
        formula: engine.formula_string(),
        result: engine.result_string(),
        status: engine.edit_status_string(),
        cells: engine.sheet_display_strings(),
        working_cell: engine.working_cell_label(),
        editing: engine.edit_status(),
        game_mode: engine.game_mode(),
        game_numbers: engine.game_numbers(),
        user_name: user_name.to_string(),
        server: server.to_string(),
        revision: engine.revision(),
    }
}
