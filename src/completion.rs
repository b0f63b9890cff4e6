//! The completion-service seam between a chat session and a model.
//!
//! A session hands a [`CompletionRequest`] to a [`CompletionService`] and gets back either
//! a [`Completion`] or an [`Error`].  [`Gemini`] is the production implementation; tests
//! substitute scripted services.

use futures::StreamExt;

use crate::error::{Error, Result};
use crate::render::Renderer;
use crate::transcript::{Role, Turn};
use crate::types::{
    Content, FinishReason, GenerateContentRequest, GenerationConfig, Model, UsageMetadata,
};
use crate::Gemini;

/// Everything a service needs to answer one user input.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// The model to ask.
    pub model: Model,
    /// Optional system instruction.
    pub system_prompt: Option<String>,
    /// Sampling and length controls.
    pub generation: GenerationConfig,
    /// Earlier exchanges to send as context.  Empty for stateless sessions.
    pub history: Vec<Turn>,
    /// The new user input.
    pub input: String,
}

impl CompletionRequest {
    /// A request for a single stateless prompt with default settings.
    pub fn single(input: impl Into<String>) -> Self {
        Self {
            model: Model::default(),
            system_prompt: None,
            generation: GenerationConfig::default(),
            history: Vec::new(),
            input: input.into(),
        }
    }

    /// The request body as the Gemini API expects it.
    pub fn to_generate_request(&self) -> GenerateContentRequest {
        let mut contents: Vec<Content> = self
            .history
            .iter()
            .map(|turn| match turn.role() {
                Role::User => Content::user(turn.content()),
                Role::Assistant => Content::model(turn.content()),
            })
            .collect();
        contents.push(Content::user(self.input.as_str()));

        let request = GenerateContentRequest::new(contents)
            .with_generation_config(self.generation.clone());
        match &self.system_prompt {
            Some(prompt) => request.with_system_instruction(prompt.as_str()),
            None => request,
        }
    }
}

/// A successful answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// The answer text.
    pub text: String,
    /// Token accounting, when the service reports it.
    pub usage: Option<UsageMetadata>,
    /// Why generation stopped, when the service reports it.
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// A completion carrying only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
            finish_reason: None,
        }
    }
}

/// A model that turns a request into text.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Produce a complete answer.
    async fn generate(&self, request: &CompletionRequest) -> Result<Completion>;

    /// Produce an answer, printing text to the renderer as it arrives.
    ///
    /// The default implementation waits for [`CompletionService::generate`] and prints the
    /// whole answer at once.
    async fn generate_streaming(
        &self,
        request: &CompletionRequest,
        renderer: &mut dyn Renderer,
    ) -> Result<Completion> {
        let completion = self.generate(request).await?;
        renderer.print_text(&completion.text);
        Ok(completion)
    }
}

#[async_trait::async_trait]
impl CompletionService for Gemini {
    async fn generate(&self, request: &CompletionRequest) -> Result<Completion> {
        let response = self
            .generate_content(&request.model, &request.to_generate_request())
            .await?;
        Ok(Completion {
            text: response.text()?,
            usage: response.usage_metadata,
            finish_reason: response.finish_reason(),
        })
    }

    async fn generate_streaming(
        &self,
        request: &CompletionRequest,
        renderer: &mut dyn Renderer,
    ) -> Result<Completion> {
        let stream = self
            .stream_generate_content(&request.model, &request.to_generate_request())
            .await?;
        futures::pin_mut!(stream);

        let mut text = String::new();
        let mut usage = None;
        let mut finish_reason = None;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if let Some(err) = chunk.blocked() {
                return Err(err);
            }
            let delta = chunk.text_delta();
            renderer.print_text(&delta);
            text.push_str(&delta);
            if chunk.usage_metadata.is_some() {
                usage = chunk.usage_metadata;
            }
            if let Some(reason) = chunk.finish_reason() {
                finish_reason = Some(reason);
            }
        }

        if text.is_empty() {
            return Err(Error::blocked(
                "the response contained no text",
                finish_reason.map(|r| r.to_string()),
            ));
        }
        Ok(Completion {
            text,
            usage,
            finish_reason,
        })
    }
}
