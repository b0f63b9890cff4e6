// Public modules
pub mod content;
pub mod finish_reason;
pub mod generate_content_request;
pub mod generate_content_response;
pub mod model;
pub mod usage;

// Re-exports
pub use content::{Content, ContentRole, Part};
pub use finish_reason::FinishReason;
pub use generate_content_request::{GenerateContentRequest, GenerationConfig};
pub use generate_content_response::{Candidate, GenerateContentResponse, PromptFeedback};
pub use model::{KnownModel, Model, ModelParseError};
pub use usage::UsageMetadata;
