use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Token accounting reported alongside a response.
///
/// When streaming, each chunk reports the running totals for the whole response, so the
/// last chunk's metadata is the one to keep.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt, including any conversation context.
    #[serde(default)]
    pub prompt_token_count: u32,

    /// Tokens across all generated candidates.
    #[serde(default)]
    pub candidates_token_count: u32,

    /// Total tokens billed for the request.
    #[serde(default)]
    pub total_token_count: u32,
}

impl UsageMetadata {
    /// Create usage metadata from prompt and candidate token counts.
    pub fn new(prompt_token_count: u32, candidates_token_count: u32) -> Self {
        Self {
            prompt_token_count,
            candidates_token_count,
            total_token_count: prompt_token_count.saturating_add(candidates_token_count),
        }
    }
}

impl Add for UsageMetadata {
    type Output = UsageMetadata;

    fn add(self, rhs: UsageMetadata) -> UsageMetadata {
        UsageMetadata {
            prompt_token_count: self.prompt_token_count.saturating_add(rhs.prompt_token_count),
            candidates_token_count: self
                .candidates_token_count
                .saturating_add(rhs.candidates_token_count),
            total_token_count: self.total_token_count.saturating_add(rhs.total_token_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_with_missing_counts() {
        let usage: UsageMetadata =
            serde_json::from_value(json!({"promptTokenCount": 7, "totalTokenCount": 7})).unwrap();
        assert_eq!(usage.prompt_token_count, 7);
        assert_eq!(usage.candidates_token_count, 0);
    }

    #[test]
    fn add_sums_every_field() {
        let sum = UsageMetadata::new(3, 4) + UsageMetadata::new(10, 20);
        assert_eq!(sum, UsageMetadata::new(13, 24));
        assert_eq!(sum.total_token_count, 37);
    }
}
