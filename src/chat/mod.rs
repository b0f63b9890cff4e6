//! Chat sessions over a completion service.
//!
//! This module provides everything between a user's input line and the transcript:
//!
//! - Session-scoped, append-only transcripts
//! - Recovery of failed model calls as visible error turns
//! - Slash commands for session control
//! - Configurable model, system prompt, and sampling parameters
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`credentials`]: API-key lookup across the secrets file and the environment
//! - [`session`]: the session object and the per-input turn step
//! - [`commands`]: Slash command parsing

mod commands;
mod config;
mod credentials;
mod session;

pub use crate::render::{NullRenderer, PlainTextRenderer, Renderer, render_transcript};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, ContextMode, DEFAULT_BIND_ADDRESS, DEFAULT_SECRETS_PATH};
pub use credentials::{
    API_KEY_NAME, CredentialSource, Environment, SECRETS_SECTION, SecretsFile, resolve_api_key,
};
pub use session::{ChatSession, SessionStats, TurnOutcome, take_turn};
