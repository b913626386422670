//! Chat application module for reviewing code interactively.
//!
//! This module provides the session controller behind the `codereview-chat`
//! REPL.  It supports:
//!
//! - A transcript seeded with a greeting that only ever grows
//! - One review request in flight at a time
//! - An API key prompt that can be re-entered at any point
//! - Copying messages with a short-lived acknowledgment
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: The session controller and review requests
//! - [`commands`]: Slash command parsing

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command, parse_draft_line};
pub use config::{ChatArgs, ChatConfig};
pub use session::{
    COPY_ACK_DURATION, ChatSession, GREETING, PendingReview, SessionMode, SessionStats,
};
