//! Environment-driven configuration.
//!
//! Settings are resolved once at startup from process environment
//! variables (a `.env` file is honored via `dotenvy`), with compiled
//! defaults for everything except the API key. Nothing in the crate
//! reads the environment after [`Settings::from_env`] returns.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default chat model used by the OpenAI backend.
pub const DEFAULT_MODEL: &str = "gpt-4o";
/// Default per-request backend timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default bounded retry budget for a backend invocation.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or blank.
    #[error("missing required environment variable {key}")]
    MissingVar {
        /// The environment variable name.
        key: &'static str,
    },

    /// An environment variable was present but unparseable.
    #[error("failed to parse environment variable {key}: {message}")]
    EnvParse {
        /// The environment variable name.
        key: &'static str,
        /// What went wrong.
        message: String,
    },
}

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key for the generation backend.
    pub openai_api_key: String,
    /// Chat model identifier.
    pub openai_model: String,
    /// Directory of static knowledge entry files (`*.json`).
    pub knowledge_dir: PathBuf,
    /// Directory where uploaded documents are persisted.
    pub documents_dir: PathBuf,
    /// Per-request timeout for one backend invocation.
    pub backend_timeout: Duration,
    /// Retries performed inside the backend before it reports failure.
    pub backend_max_retries: u32,
}

impl Settings {
    /// Resolve settings from the process environment.
    ///
    /// Loads `.env` if present (silently skipped otherwise), then reads:
    ///
    /// * `OPENAI_API_KEY` (required; trimmed, the original shipped keys
    ///   with stray whitespace often enough to warrant it)
    /// * `OPENAI_MODEL` (default `gpt-4o`)
    /// * `TUTOR_KNOWLEDGE_DIR` (default `knowledge`)
    /// * `TUTOR_DOCUMENTS_DIR` (default `data/documents`)
    /// * `TUTOR_BACKEND_TIMEOUT_SECS` (default `30`)
    /// * `TUTOR_BACKEND_MAX_RETRIES` (default `3`)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let openai_api_key = read_var("OPENAI_API_KEY")
            .ok_or(ConfigError::MissingVar {
                key: "OPENAI_API_KEY",
            })?
            .trim()
            .to_string();
        if openai_api_key.is_empty() {
            return Err(ConfigError::MissingVar {
                key: "OPENAI_API_KEY",
            });
        }

        let openai_model = read_var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let knowledge_dir =
            PathBuf::from(read_var("TUTOR_KNOWLEDGE_DIR").unwrap_or_else(|| "knowledge".into()));
        let documents_dir = PathBuf::from(
            read_var("TUTOR_DOCUMENTS_DIR").unwrap_or_else(|| "data/documents".into()),
        );

        let backend_timeout = Duration::from_secs(parse_var(
            "TUTOR_BACKEND_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);
        let backend_max_retries = parse_var("TUTOR_BACKEND_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;

        Ok(Self {
            openai_api_key,
            openai_model,
            knowledge_dir,
            documents_dir,
            backend_timeout,
            backend_max_retries,
        })
    }
}

fn read_var(key: &'static str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match read_var(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|err: T::Err| ConfigError::EnvParse {
            key,
            message: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        assert_eq!(DEFAULT_MODEL, "gpt-4o");
        assert_eq!(DEFAULT_MAX_RETRIES, 3);
    }

    #[test]
    fn parse_var_falls_back_to_default() {
        // Variable known not to exist in the test environment.
        let parsed: u64 = parse_var("TUTOR_TEST_UNSET_VAR_XYZ", 7).unwrap();
        assert_eq!(parsed, 7);
    }
}
