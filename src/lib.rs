//! # collabsheet
//!
//! Client-side editing state machine and synchronization loop for a
//! collaborative spreadsheet.
//!
//! DESIGN
//! ======
//! The authoritative sheet lives behind the [`engine::SheetEngine`] trait.
//! The [`controller::SheetController`] translates UI events into engine
//! mutations and republishes derived display state; the [`sync`] loop
//! re-reads that state on a fixed period. Game mode reuses the same token
//! path and rebroadcasts formula text over a [`chat::ChatTransport`].

pub mod buttons;
pub mod chat;
pub mod config;
pub mod controller;
pub mod engine;
pub mod game;
pub mod navigation;
pub mod session;
pub mod sync;
pub mod tokens;
pub mod view;
