//! Core chat session management.
//!
//! This module provides `ChatSession`, which owns one conversation's transcript, and
//! `take_turn`, the step that processes a single user input against a transcript.

use std::path::Path;
use std::time::Instant;

use crate::chat::config::{ChatConfig, ContextMode};
use crate::chat::credentials::{CredentialSource, resolve_api_key};
use crate::completion::{CompletionRequest, CompletionService};
use crate::error::Result;
use crate::observability::{SESSION_FAILED_TURNS, SESSION_TURN_DURATION, SESSION_TURNS};
use crate::render::{NullRenderer, Renderer};
use crate::transcript::{Role, Transcript, Turn};
use crate::types::{Model, UsageMetadata};
use crate::Gemini;

/// What happened to one user input.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Whether the model answered.
    pub succeeded: bool,
    /// Token accounting for the call, when reported.
    pub usage: Option<UsageMetadata>,
    /// Position of the appended assistant turn in the transcript.
    pub index: usize,
}

/// Process one user input against `transcript`.
///
/// Appends the user turn, asks `service` for an answer, and appends the assistant turn.
/// A failed call appends an assistant turn reading `"Error: <message>"`; nothing is
/// returned to the caller as an error.
pub async fn take_turn<S: CompletionService + ?Sized>(
    service: &S,
    config: &ChatConfig,
    transcript: &mut Transcript,
    input: &str,
    renderer: &mut dyn Renderer,
) -> TurnOutcome {
    let history = match config.context {
        ContextMode::Transcript => transcript.exchanges(),
        ContextMode::Stateless => Vec::new(),
    };
    transcript.append(Turn::user(input));

    let request = CompletionRequest {
        model: config.model.clone(),
        system_prompt: config.system_prompt.clone(),
        generation: config.generation_config(),
        history,
        input: input.to_string(),
    };

    let start = Instant::now();
    renderer.start_turn(Role::Assistant);
    renderer.start_waiting();
    let result = service.generate_streaming(&request, renderer).await;
    renderer.stop_waiting();
    SESSION_TURN_DURATION.add(start.elapsed().as_secs_f64());
    SESSION_TURNS.click();

    let index = transcript.len();
    let outcome = match result {
        Ok(completion) => {
            transcript.append(Turn::assistant(completion.text));
            TurnOutcome {
                succeeded: true,
                usage: completion.usage,
                index,
            }
        }
        Err(err) => {
            SESSION_FAILED_TURNS.click();
            let turn = Turn::error(&err);
            renderer.print_error(turn.content());
            transcript.append(turn);
            TurnOutcome {
                succeeded: false,
                usage: None,
                index,
            }
        }
    };
    renderer.finish_response();
    outcome
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: Model,
    /// The number of turns in the transcript.
    pub turn_count: usize,
    /// The number of assistant turns that record a failure.
    pub failed_turns: usize,
    /// Whether earlier turns are sent as context.
    pub context: ContextMode,
    /// The system prompt, if any.
    pub system_prompt: Option<String>,
    /// The maximum tokens per response, if set.
    pub max_tokens: Option<u32>,
    /// The sampling temperature, if set.
    pub temperature: Option<f32>,
    /// The top-p value, if set.
    pub top_p: Option<f32>,
    /// The top-k value, if set.
    pub top_k: Option<u32>,
    /// Total number of model calls made.
    pub total_requests: u64,
    /// Total prompt tokens across all requests.
    pub total_prompt_tokens: u64,
    /// Total candidate tokens across all requests.
    pub total_candidate_tokens: u64,
}

/// A chat session: one transcript and the service that answers into it.
///
/// A session is created when a conversation starts, grows through `submit`, and is
/// discarded when the conversation ends.  Inputs are processed one at a time.
pub struct ChatSession<S: CompletionService = Gemini> {
    service: S,
    config: ChatConfig,
    transcript: Transcript,
    usage_totals: UsageMetadata,
    request_count: u64,
}

impl ChatSession<Gemini> {
    /// Resolve the API key and open a session against the Gemini API.
    pub fn connect(sources: &[&dyn CredentialSource], config: ChatConfig) -> Result<Self> {
        Self::bootstrap(sources, config, Gemini::new)
    }
}

impl<S: CompletionService> ChatSession<S> {
    /// Creates a new chat session with the given service and configuration.
    pub fn new(service: S, config: ChatConfig) -> Self {
        Self {
            service,
            config,
            transcript: Transcript::new(),
            usage_totals: UsageMetadata::default(),
            request_count: 0,
        }
    }

    /// Resolve the API key, then build the service with `connect`.
    ///
    /// When no source has the key this fails before `connect` runs, so no service exists
    /// and no turn can be appended.
    pub fn bootstrap<F>(
        sources: &[&dyn CredentialSource],
        config: ChatConfig,
        connect: F,
    ) -> Result<Self>
    where
        F: FnOnce(String) -> Result<S>,
    {
        let api_key = resolve_api_key(sources)?;
        let service = connect(api_key)?;
        Ok(Self::new(service, config))
    }

    /// Sends a user message and renders the answer as it arrives.
    ///
    /// This method:
    /// 1. Adds the user message to the transcript
    /// 2. Asks the completion service for an answer
    /// 3. Renders response text as it arrives
    /// 4. Adds the answer, or the error in its place, to the transcript
    ///
    /// Returns the assistant turn that was appended.
    pub async fn submit(&mut self, input: &str, renderer: &mut dyn Renderer) -> &Turn {
        let outcome = take_turn(
            &self.service,
            &self.config,
            &mut self.transcript,
            input,
            renderer,
        )
        .await;
        self.request_count = self.request_count.saturating_add(1);
        if let Some(usage) = outcome.usage {
            self.usage_totals = self.usage_totals + usage;
        }
        &self.transcript.all()[outcome.index]
    }

    /// Like [`ChatSession::submit`], without rendering.
    pub async fn respond(&mut self, input: &str) -> &Turn {
        self.submit(input, &mut NullRenderer).await
    }

    /// The session's transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// End the session, keeping its transcript.
    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }

    /// The completion service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// The active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Changes the model used for responses.
    pub fn set_model(&mut self, model: Model) {
        self.config.model = model;
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Sets or clears the system prompt.
    pub fn set_system_prompt(&mut self, prompt: Option<String>) {
        self.config.system_prompt = prompt;
    }

    /// Returns the current system prompt, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.config.system_prompt.as_deref()
    }

    /// Sets or clears the maximum tokens per response.
    pub fn set_max_tokens(&mut self, max_tokens: Option<u32>) {
        self.config.max_tokens = max_tokens;
    }

    /// Sets the sampling temperature.
    pub fn set_temperature(&mut self, temperature: Option<f32>) {
        self.config.temperature = temperature;
    }

    /// Sets the top-p value.
    pub fn set_top_p(&mut self, top_p: Option<f32>) {
        self.config.top_p = top_p;
    }

    /// Sets the top-k value.
    pub fn set_top_k(&mut self, top_k: Option<u32>) {
        self.config.top_k = top_k;
    }

    /// Sets whether earlier turns are sent as context.
    pub fn set_context(&mut self, context: ContextMode) {
        self.config.context = context;
    }

    /// Saves the transcript to the specified path.
    pub fn save_transcript_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.transcript.save_to(path)
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            turn_count: self.transcript.len(),
            failed_turns: self.transcript.error_count(),
            context: self.config.context,
            system_prompt: self.config.system_prompt.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            top_k: self.config.top_k,
            total_requests: self.request_count,
            total_prompt_tokens: u64::from(self.usage_totals.prompt_token_count),
            total_candidate_tokens: u64::from(self.usage_totals.candidates_token_count),
        }
    }
}
