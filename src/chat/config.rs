//! Configuration types for the chat programs.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use arrrg_derive::CommandLine;

use crate::types::{GenerationConfig, Model};

/// Default location of the secrets file.
pub const DEFAULT_SECRETS_PATH: &str = "secrets.toml";

/// Default listen address of the web surface.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8501";

/// Command-line arguments for the gemini-chat programs.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-1.5-flash)", "MODEL")]
    pub model: Option<String>,

    /// System prompt to set context for the conversation.
    #[arrrg(optional, "System prompt for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max tokens per response (default: model limit)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Path to the TOML secrets file.
    #[arrrg(
        optional,
        "Secrets file holding [general] GOOGLE_API_KEY (default: secrets.toml)",
        "PATH"
    )]
    pub secrets: Option<String>,

    /// Send only the newest input to the model.
    #[arrrg(flag, "Do not send earlier turns to the model as context")]
    pub stateless: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Listen address for the web surface.
    #[arrrg(
        optional,
        "Address gemini-chat-web listens on (default: 127.0.0.1:8501)",
        "ADDR"
    )]
    pub bind: Option<String>,
}

/// What the model sees of the conversation on each turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContextMode {
    /// Earlier successful exchanges are sent along with the new input.
    #[default]
    Transcript,
    /// Only the new input is sent; the transcript is display-only.
    Stateless,
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextMode::Transcript => f.write_str("transcript"),
            ContextMode::Stateless => f.write_str("stateless"),
        }
    }
}

impl FromStr for ContextMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "transcript" | "full" | "on" => Ok(ContextMode::Transcript),
            "stateless" | "none" | "off" => Ok(ContextMode::Stateless),
            _ => Err(format!("expects 'transcript' or 'stateless', not {s:?}")),
        }
    }
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Optional system prompt to set conversation context.
    pub system_prompt: Option<String>,

    /// Optional cap on tokens per response.
    pub max_tokens: Option<u32>,

    /// Optional sampling temperature.
    pub temperature: Option<f32>,

    /// Optional top-p nucleus sampling value.
    pub top_p: Option<f32>,

    /// Optional top-k sampling limit.
    pub top_k: Option<u32>,

    /// Custom stop sequences supplied on every request.
    pub stop_sequences: Vec<String>,

    /// Whether earlier turns are sent as context.
    pub context: ContextMode,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Where to look for the secrets file.
    pub secrets_path: PathBuf,

    /// Listen address for the web surface.
    pub bind: String,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-1.5-flash
    /// - Max tokens, temperature, top-p, top-k: model defaults
    /// - Context: transcript
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            top_k: None,
            stop_sequences: Vec::new(),
            context: ContextMode::default(),
            use_color: true,
            secrets_path: PathBuf::from(DEFAULT_SECRETS_PATH),
            bind: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the top-p value.
    pub fn with_top_p(mut self, top_p: Option<f32>) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the top-k value.
    pub fn with_top_k(mut self, top_k: Option<u32>) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the stop sequences.
    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.stop_sequences = stop_sequences;
        self
    }

    /// Sets the context mode.
    pub fn with_context(mut self, context: ContextMode) -> Self {
        self.context = context;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the secrets file path.
    pub fn with_secrets_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.secrets_path = path.into();
        self
    }

    /// The generation controls sent with every request.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: self.max_tokens,
            stop_sequences: self.stop_sequences.clone(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let model = args
            .model
            .and_then(|s| s.parse::<Model>().ok())
            .unwrap_or_default();
        let context = if args.stateless {
            ContextMode::Stateless
        } else {
            ContextMode::Transcript
        };

        ChatConfig {
            model,
            system_prompt: args.system,
            max_tokens: args.max_tokens,
            context,
            use_color: !args.no_color,
            secrets_path: args
                .secrets
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_PATH)),
            bind: args.bind.unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            ..ChatConfig::new()
        }
    }
}
