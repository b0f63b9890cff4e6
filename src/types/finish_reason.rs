use serde::{Deserialize, Serialize};
use std::fmt;

/// Reasons why the model stopped generating a candidate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// The server did not say.
    FinishReasonUnspecified,

    /// Natural stop point or a stop sequence.
    Stop,

    /// The output token limit was reached.
    MaxTokens,

    /// The candidate was flagged for safety reasons.
    Safety,

    /// The candidate was flagged for recitation.
    Recitation,

    /// The candidate used an unsupported language.
    Language,

    /// The candidate contained forbidden terms.
    Blocklist,

    /// The candidate contained prohibited content.
    ProhibitedContent,

    /// The candidate contained sensitive personally identifiable information.
    Spii,

    /// The model produced an invalid function call.
    MalformedFunctionCall,

    /// Some other reason.
    Other,

    /// A reason this crate does not know about yet.
    #[serde(other)]
    Unknown,
}

impl FinishReason {
    /// Returns true when the candidate was withheld rather than completed.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            FinishReason::Safety
                | FinishReason::Recitation
                | FinishReason::Language
                | FinishReason::Blocklist
                | FinishReason::ProhibitedContent
                | FinishReason::Spii
                | FinishReason::Other
        )
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FinishReason::FinishReasonUnspecified => "FINISH_REASON_UNSPECIFIED",
            FinishReason::Stop => "STOP",
            FinishReason::MaxTokens => "MAX_TOKENS",
            FinishReason::Safety => "SAFETY",
            FinishReason::Recitation => "RECITATION",
            FinishReason::Language => "LANGUAGE",
            FinishReason::Blocklist => "BLOCKLIST",
            FinishReason::ProhibitedContent => "PROHIBITED_CONTENT",
            FinishReason::Spii => "SPII",
            FinishReason::MalformedFunctionCall => "MALFORMED_FUNCTION_CALL",
            FinishReason::Other => "OTHER",
            FinishReason::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_known_and_unknown() {
        let reason: FinishReason = serde_json::from_str(r#""MAX_TOKENS""#).unwrap();
        assert_eq!(reason, FinishReason::MaxTokens);

        let reason: FinishReason = serde_json::from_str(r#""IMAGE_SAFETY""#).unwrap();
        assert_eq!(reason, FinishReason::Unknown);
    }

    #[test]
    fn display_matches_wire_name() {
        for reason in [
            FinishReason::Stop,
            FinishReason::ProhibitedContent,
            FinishReason::MalformedFunctionCall,
        ] {
            assert_eq!(
                serde_json::to_string(&reason).unwrap(),
                format!("\"{reason}\"")
            );
        }
    }

    #[test]
    fn blocking_reasons() {
        assert!(FinishReason::Safety.is_blocking());
        assert!(!FinishReason::Stop.is_blocking());
        assert!(!FinishReason::MaxTokens.is_blocking());
    }
}
