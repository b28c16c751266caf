//! Chat application module for the login/register/query backend.
//!
//! This module provides the screens of an interactive front end built on top
//! of the querent client library. It supports:
//!
//! - Login and registration forms with a shared submit state machine
//! - A chat screen whose turns are appended in (user, bot) pairs
//! - Slash commands for moving between screens and session control
//! - Configurable backend URL, session file and timeout
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`views`]: Login, Register and Chat view state
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod views;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, SESSION_FILE_ENV};
pub use views::{
    ChatView, Exchange, FAILED_REPLY, FormState, LoginView, Navigation, PendingQuery,
    RegisterView,
};
