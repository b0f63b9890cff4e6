use serde::{Deserialize, Serialize};

/// The author of a piece of content, as the Gemini API names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    /// Content written by the user.
    User,

    /// Content written by the model.
    Model,
}

/// One part of a multi-part content message.
///
/// Only text parts are produced by this crate; parts of other kinds in a response
/// deserialize with `text` unset and are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Text of the part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Set by thinking models on parts that carry reasoning rather than the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: None,
        }
    }

    fn is_thought(&self) -> bool {
        self.thought.unwrap_or(false)
    }
}

/// A message: a role and the parts that make it up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// Author of the content.  Omitted for system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ContentRole>,

    /// Ordered parts of the content.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a single-part user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some(ContentRole::User),
            parts: vec![Part::text(text)],
        }
    }

    /// Create a single-part model message.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some(ContentRole::Model),
            parts: vec![Part::text(text)],
        }
    }

    /// Create a role-less system instruction.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenate the answer text of every part, skipping thought parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|part| !part.is_thought())
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}
