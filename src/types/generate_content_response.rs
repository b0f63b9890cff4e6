use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Content, FinishReason, UsageMetadata};

/// One generated answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content.  Absent when the candidate was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Why generation stopped.  Absent on intermediate stream chunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,

    /// Position of the candidate in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// Feedback about the prompt itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was refused outright.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// A whole `generateContent` response, or one chunk of a streamed one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates; this crate only ever reads the first.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Feedback on the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,

    /// Token accounting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,

    /// The concrete model version that served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// The finish reason of the first candidate, if reported.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.candidates.first().and_then(|c| c.finish_reason)
    }

    /// Text of the first candidate, or the empty string.
    ///
    /// Use this on stream chunks, where an empty chunk is normal.
    pub fn text_delta(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(Content::text)
            .unwrap_or_default()
    }

    /// Returns the error describing why the prompt or the candidate was withheld.
    pub fn blocked(&self) -> Option<Error> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
        {
            return Some(Error::blocked(
                format!("the prompt was blocked ({reason})"),
                Some(reason.clone()),
            ));
        }
        let reason = self.finish_reason()?;
        if reason.is_blocking() && self.text_delta().is_empty() {
            return Some(Error::blocked(
                format!("the response was stopped ({reason})"),
                Some(reason.to_string()),
            ));
        }
        None
    }

    /// Text of a complete response.
    ///
    /// Fails when the response was blocked, has no candidates, or carries no text.
    pub fn text(&self) -> Result<String> {
        if let Some(err) = self.blocked() {
            return Err(err);
        }
        if self.candidates.is_empty() {
            return Err(Error::blocked("the response contained no candidates", None));
        }
        let text = self.text_delta();
        if text.is_empty() {
            return Err(Error::blocked(
                "the response contained no text",
                self.finish_reason().map(|r| r.to_string()),
            ));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_of_successful_response() {
        let response = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "hi"}]},
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": {"promptTokenCount": 1, "candidatesTokenCount": 1, "totalTokenCount": 2},
            "modelVersion": "gemini-1.5-flash-002"
        }));
        assert_eq!(response.text().unwrap(), "hi");
        assert_eq!(response.finish_reason(), Some(FinishReason::Stop));
        assert_eq!(response.usage_metadata, Some(UsageMetadata::new(1, 1)));
    }

    #[test]
    fn blocked_prompt() {
        let response = parse(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        let err = response.text().unwrap_err();
        assert!(err.is_blocked());
        assert_eq!(err.message(), "the prompt was blocked (SAFETY)");
    }

    #[test]
    fn blocked_candidate() {
        let response = parse(json!({"candidates": [{"finishReason": "RECITATION"}]}));
        let err = response.text().unwrap_err();
        assert_eq!(err.message(), "the response was stopped (RECITATION)");
    }

    #[test]
    fn no_candidates() {
        let err = parse(json!({})).text().unwrap_err();
        assert_eq!(err.message(), "the response contained no candidates");
    }

    #[test]
    fn empty_text_after_max_tokens() {
        let response = parse(json!({
            "candidates": [{"content": {"role": "model", "parts": []}, "finishReason": "MAX_TOKENS"}]
        }));
        let err = response.text().unwrap_err();
        assert_eq!(err.message(), "the response contained no text");
        assert!(response.blocked().is_none());
    }

    #[test]
    fn stream_chunk_without_content_is_empty_delta() {
        let chunk = parse(json!({"candidates": [{"finishReason": "STOP"}]}));
        assert_eq!(chunk.text_delta(), "");
        assert!(chunk.blocked().is_none());
    }
}
