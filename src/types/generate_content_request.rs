use serde::{Deserialize, Serialize};

use crate::types::Content;

/// Sampling and length controls sent with a request.
///
/// Unset fields are omitted so the model's own defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling probability mass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Top-k sampling limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    /// Cap on generated tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Sequences that end generation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

impl GenerationConfig {
    /// Returns true when every field is unset.
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.top_p.is_none()
            && self.top_k.is_none()
            && self.max_output_tokens.is_none()
            && self.stop_sequences.is_empty()
    }
}

/// Body of a `generateContent` or `streamGenerateContent` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation so far, ending with the newest user message.
    pub contents: Vec<Content>,

    /// Optional system instruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Optional generation controls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Create a request with the given contents and no extra settings.
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            system_instruction: None,
            generation_config: None,
        }
    }

    /// Set the system instruction.
    pub fn with_system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::system(text));
        self
    }

    /// Set generation controls; an empty config is left off the wire.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = if config.is_empty() {
            None
        } else {
            Some(config)
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn minimal_request() {
        let request = GenerateContentRequest::new(vec![Content::user("hello")]);
        assert_eq!(
            to_value(&request).unwrap(),
            json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn full_request_uses_camel_case() {
        let request = GenerateContentRequest::new(vec![
            Content::user("hi"),
            Content::model("hello"),
            Content::user("again"),
        ])
        .with_system_instruction("Be brief.")
        .with_generation_config(GenerationConfig {
            temperature: Some(0.5),
            top_k: Some(40),
            max_output_tokens: Some(256),
            stop_sequences: vec!["END".to_string()],
            ..GenerationConfig::default()
        });
        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "hi"}]},
                    {"role": "model", "parts": [{"text": "hello"}]},
                    {"role": "user", "parts": [{"text": "again"}]}
                ],
                "systemInstruction": {"parts": [{"text": "Be brief."}]},
                "generationConfig": {
                    "temperature": 0.5,
                    "topK": 40,
                    "maxOutputTokens": 256,
                    "stopSequences": ["END"]
                }
            })
        );
    }

    #[test]
    fn empty_generation_config_is_omitted() {
        let request = GenerateContentRequest::new(vec![Content::user("x")])
            .with_generation_config(GenerationConfig::default());
        assert!(request.generation_config.is_none());
    }
}
