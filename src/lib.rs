// Public modules
pub mod chat;
pub mod client;
pub mod completion;
pub mod error;
pub mod render;
pub mod transcript;
pub mod types;
pub mod web;

mod observability;
mod sse;

// Re-exports
pub use client::Gemini;
pub use completion::{Completion, CompletionRequest, CompletionService};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{NullRenderer, PlainTextRenderer, Renderer, render_transcript};
pub use transcript::{Role, Transcript, Turn};
pub use types::*;
