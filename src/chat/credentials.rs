//! API-key resolution.
//!
//! The key is looked up in an ordered chain of sources; the first non-empty value wins.
//! The default chain is the TOML secrets file followed by the process environment.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the credential in every source.
pub const API_KEY_NAME: &str = "GOOGLE_API_KEY";

/// Table of the secrets file that holds the credential.
pub const SECRETS_SECTION: &str = "general";

/// A place a credential can come from.
pub trait CredentialSource {
    /// Short description used in error messages.
    fn describe(&self) -> String;

    /// Look up `key`.  `Ok(None)` means the source has no value and the next one is tried.
    fn lookup(&self, key: &str) -> Result<Option<String>>;
}

/// A TOML secrets file whose `[general]` table holds the credential:
///
/// ```toml
/// [general]
/// GOOGLE_API_KEY = "..."
/// ```
#[derive(Debug, Clone)]
pub struct SecretsFile {
    path: PathBuf,
}

impl SecretsFile {
    /// A secrets file at `path`.  The file does not need to exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the file is expected.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialSource for SecretsFile {
    fn describe(&self) -> String {
        format!("secrets file {}", self.path.display())
    }

    fn lookup(&self, key: &str) -> Result<Option<String>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(Error::configuration(format!(
                    "cannot read {}: {err}",
                    self.path.display()
                )));
            }
        };
        let table: toml::Table = toml::from_str(&text).map_err(|err| {
            Error::configuration(format!("cannot parse {}: {err}", self.path.display()))
        })?;
        Ok(table
            .get(SECRETS_SECTION)
            .and_then(|section| section.get(key))
            .and_then(|value| value.as_str())
            .map(str::to_string))
    }
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Environment;

impl CredentialSource for Environment {
    fn describe(&self) -> String {
        "environment".to_string()
    }

    fn lookup(&self, key: &str) -> Result<Option<String>> {
        Ok(std::env::var(key).ok())
    }
}

/// An in-memory map, handy for embedding and tests.
impl CredentialSource for HashMap<String, String> {
    fn describe(&self) -> String {
        "in-memory credentials".to_string()
    }

    fn lookup(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key).cloned())
    }
}

/// Find the API key in the first source that has a non-empty value.
///
/// # Errors
///
/// Returns a configuration error when a source fails or no source has the key.
pub fn resolve_api_key(sources: &[&dyn CredentialSource]) -> Result<String> {
    for source in sources {
        if let Some(value) = source.lookup(API_KEY_NAME)? {
            let value = value.trim();
            if !value.is_empty() {
                return Ok(value.to_string());
            }
        }
    }
    let searched = sources
        .iter()
        .map(|s| s.describe())
        .collect::<Vec<_>>()
        .join(", ");
    Err(Error::configuration(format!(
        "Please set your {API_KEY_NAME} in the secrets file or the environment (searched: {searched})"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_secrets(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "gemini-chat-{name}-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn env_with(value: &str) -> HashMap<String, String> {
        HashMap::from([(API_KEY_NAME.to_string(), value.to_string())])
    }

    #[test]
    fn secrets_file_wins_over_environment() {
        let path = temp_secrets("wins", "[general]\nGOOGLE_API_KEY = \"from-file\"\n");
        let secrets = SecretsFile::new(&path);
        let env = env_with("from-env");
        let key = resolve_api_key(&[&secrets, &env]).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(key, "from-file");
    }

    #[test]
    fn missing_file_falls_back_to_environment() {
        let secrets = SecretsFile::new("/nonexistent/gemini-chat/secrets.toml");
        let env = env_with("from-env");
        assert_eq!(resolve_api_key(&[&secrets, &env]).unwrap(), "from-env");
    }

    #[test]
    fn file_without_key_falls_back_to_environment() {
        let path = temp_secrets("nokey", "[general]\nOTHER = \"x\"\n");
        let secrets = SecretsFile::new(&path);
        let env = env_with("from-env");
        let key = resolve_api_key(&[&secrets, &env]).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn empty_values_count_as_missing() {
        let path = temp_secrets("empty", "[general]\nGOOGLE_API_KEY = \"\"\n");
        let secrets = SecretsFile::new(&path);
        let env = env_with("   ");
        let err = resolve_api_key(&[&secrets, &env]).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn missing_everywhere_is_a_configuration_error() {
        let secrets = SecretsFile::new("/nonexistent/gemini-chat/secrets.toml");
        let env = HashMap::new();
        let err = resolve_api_key(&[&secrets, &env]).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.message().starts_with("Please set your GOOGLE_API_KEY"));
        assert!(err.message().contains("secrets file /nonexistent"));
    }

    #[test]
    fn malformed_file_is_fatal() {
        let path = temp_secrets("malformed", "[general\nGOOGLE_API_KEY = ");
        let secrets = SecretsFile::new(&path);
        let env = env_with("from-env");
        let err = resolve_api_key(&[&secrets, &env]).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(err.is_configuration());
        assert!(err.message().starts_with("cannot parse"));
    }

    #[test]
    fn key_is_trimmed() {
        let env = env_with("  abc123\n");
        assert_eq!(resolve_api_key(&[&env]).unwrap(), "abc123");
    }
}
