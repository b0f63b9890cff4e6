use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents a Gemini model identifier.
///
/// This can be a predefined model version or a custom string value
/// for models that may be added in the future.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for future models or tuned models)
    Custom(String),
}

/// Known Gemini model versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Gemini 1.5 Flash
    #[serde(rename = "gemini-1.5-flash")]
    Gemini15Flash,

    /// Gemini 1.5 Pro
    #[serde(rename = "gemini-1.5-pro")]
    Gemini15Pro,

    /// Gemini 2.0 Flash
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,

    /// Gemini 2.0 Flash-Lite
    #[serde(rename = "gemini-2.0-flash-lite")]
    Gemini20FlashLite,

    /// Gemini 2.5 Flash
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,

    /// Gemini 2.5 Pro
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,
}

impl KnownModel {
    /// Every known model, in the order `/help` lists them.
    pub const ALL: [KnownModel; 6] = [
        KnownModel::Gemini15Flash,
        KnownModel::Gemini15Pro,
        KnownModel::Gemini20Flash,
        KnownModel::Gemini20FlashLite,
        KnownModel::Gemini25Flash,
        KnownModel::Gemini25Pro,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Gemini15Flash => "gemini-1.5-flash",
            KnownModel::Gemini15Pro => "gemini-1.5-pro",
            KnownModel::Gemini20Flash => "gemini-2.0-flash",
            KnownModel::Gemini20FlashLite => "gemini-2.0-flash-lite",
            KnownModel::Gemini25Flash => "gemini-2.5-flash",
            KnownModel::Gemini25Pro => "gemini-2.5-pro",
        }
    }
}

impl Model {
    /// The identifier as it appears in a `models/{id}:method` path.
    ///
    /// A leading `models/` prefix on custom identifiers is dropped.
    pub fn path_id(&self) -> &str {
        match self {
            Model::Known(known) => known.as_str(),
            Model::Custom(custom) => custom.strip_prefix("models/").unwrap_or(custom),
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::Gemini15Flash)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{known_model}"),
            Model::Custom(custom) => write!(f, "{custom}"),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnownModel {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownModel::ALL
            .into_iter()
            .find(|known| known.as_str() == s)
            .ok_or_else(|| ModelParseError {
                invalid_value: s.to_string(),
            })
    }
}

impl FromStr for Model {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ModelParseError {
                invalid_value: s.to_string(),
            });
        }
        Ok(s.parse::<KnownModel>()
            .map(Model::Known)
            .unwrap_or_else(|_| Model::Custom(s.to_string())))
    }
}

/// Error returned when parsing a model identifier fails.
#[derive(Debug)]
pub struct ModelParseError {
    /// The invalid string value that could not be parsed.
    pub invalid_value: String,
}

impl fmt::Display for ModelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown model: {:?}", self.invalid_value)
    }
}

impl std::error::Error for ModelParseError {}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_serialization() {
        let model = Model::Known(KnownModel::Gemini15Flash);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""gemini-1.5-flash""#);

        let model: Model = serde_json::from_str(r#""gemini-2.5-pro""#).unwrap();
        assert_eq!(model, Model::Known(KnownModel::Gemini25Pro));
    }

    #[test]
    fn custom_model_round_trips_through_json() {
        let model: Model = serde_json::from_str(r#""gemini-exp-1206""#).unwrap();
        assert_eq!(model, Model::Custom("gemini-exp-1206".to_string()));
    }

    #[test]
    fn parse_known_and_custom() {
        assert_eq!(
            "gemini-2.0-flash".parse::<Model>().unwrap(),
            Model::Known(KnownModel::Gemini20Flash)
        );
        assert_eq!(
            "tunedModels/my-model".parse::<Model>().unwrap(),
            Model::Custom("tunedModels/my-model".to_string())
        );
        assert!("   ".parse::<Model>().is_err());
    }

    #[test]
    fn display_matches_wire_name() {
        for known in KnownModel::ALL {
            assert_eq!(
                serde_json::to_string(&known).unwrap(),
                format!("\"{known}\"")
            );
        }
    }

    #[test]
    fn path_id_strips_models_prefix() {
        assert_eq!(Model::default().path_id(), "gemini-1.5-flash");
        assert_eq!(
            Model::Custom("models/gemini-exp".to_string()).path_id(),
            "gemini-exp"
        );
    }
}
