//! Application settings and credential resolution.

use std::path::PathBuf;

use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};

/// Telegram API credentials and session configuration.
///
/// Resolved once at startup and passed into the lookup workflow as an
/// immutable value; business logic never reads the environment directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Telegram API ID (obtain from <https://my.telegram.org>).
    pub api_id: i32,

    /// Telegram API hash (obtain from <https://my.telegram.org>).
    pub api_hash: String,

    /// Phone number of the account performing the lookups.
    pub phone_number: String,

    /// Account password for two-factor authentication, if enabled.
    pub password: Option<String>,

    /// Path to the session file.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
}

fn default_session_path() -> PathBuf {
    PathBuf::from("phone_checker.session")
}

/// Credential values supplied on the command line.
///
/// A `None` field falls back to the matching `TG_*` environment variable,
/// then to an interactive prompt.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub api_id: Option<i32>,
    pub api_hash: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<String>,
}

impl CheckerConfig {
    /// Creates a new configuration with the default session path.
    #[must_use]
    pub fn new(api_id: i32, api_hash: String, phone_number: String) -> Self {
        Self {
            api_id,
            api_hash,
            phone_number,
            password: None,
            session_path: default_session_path(),
        }
    }

    /// Resolves the configuration with flag > environment > prompt
    /// precedence.
    ///
    /// Expects `TG_API_ID`, `TG_API_HASH` and `TG_PHONE_NUMBER` when the
    /// matching flags are absent; anything still missing is asked for
    /// interactively. `TG_PASSWORD` and `TG_SESSION_PATH` are optional.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment value is malformed or an
    /// interactive prompt cannot be served.
    pub fn resolve(overrides: CredentialOverrides) -> Result<Self, ConfigError> {
        let api_id = match overrides.api_id {
            Some(id) => id,
            None => match env_var("TG_API_ID") {
                Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidApiId)?,
                None => prompt_api_id()?,
            },
        };

        let api_hash = resolve_value(overrides.api_hash, "TG_API_HASH", prompt_api_hash)?;
        let phone_number =
            resolve_value(overrides.phone_number, "TG_PHONE_NUMBER", prompt_phone_number)?;

        let password = match overrides.password.or_else(|| env_var("TG_PASSWORD")) {
            Some(password) => Some(password),
            None => prompt_password()?,
        };

        let session_path =
            env_var("TG_SESSION_PATH").map_or_else(default_session_path, PathBuf::from);

        Ok(Self {
            api_id,
            api_hash,
            phone_number,
            password,
            session_path,
        })
    }
}

/// Reads an environment variable, treating blank values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Resolves one string credential: override, then environment, then prompt.
fn resolve_value(
    override_value: Option<String>,
    env_name: &str,
    prompt: fn() -> Result<String, ConfigError>,
) -> Result<String, ConfigError> {
    match override_value.or_else(|| env_var(env_name)) {
        Some(value) => Ok(value),
        None => prompt(),
    }
}

fn prompt_api_id() -> Result<i32, ConfigError> {
    // dialoguer re-prompts until the input parses as an integer.
    let api_id: i32 = Input::new()
        .with_prompt("Enter your Telegram App api_id")
        .interact_text()?;
    Ok(api_id)
}

fn prompt_api_hash() -> Result<String, ConfigError> {
    Ok(Password::new()
        .with_prompt("Enter your Telegram App api_hash")
        .interact()?)
}

fn prompt_phone_number() -> Result<String, ConfigError> {
    Ok(Input::new()
        .with_prompt("Enter the number associated with your Telegram account")
        .interact_text()?)
}

fn prompt_password() -> Result<Option<String>, ConfigError> {
    let password = Password::new()
        .with_prompt("Enter the password associated with your Telegram account (leave empty if none)")
        .allow_empty_password(true)
        .interact()?;
    Ok((!password.is_empty()).then_some(password))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TG_API_ID value (must be a positive integer)")]
    InvalidApiId,

    #[error("Interactive prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = CheckerConfig::new(12345, "abc123".to_owned(), "+15550100".to_owned());
        assert_eq!(config.api_id, 12345);
        assert_eq!(config.api_hash, "abc123");
        assert_eq!(config.phone_number, "+15550100");
        assert!(config.password.is_none());
        assert_eq!(config.session_path, PathBuf::from("phone_checker.session"));
    }

    #[test]
    fn test_resolve_value_prefers_override() {
        let value = resolve_value(Some("from-cli".to_owned()), "TG_PHONE_CHECKER_UNSET", || {
            Ok("from-prompt".to_owned())
        });
        assert_eq!(value.ok().as_deref(), Some("from-cli"));
    }

    #[test]
    fn test_resolve_with_full_overrides_skips_prompts() {
        let config = CheckerConfig::resolve(CredentialOverrides {
            api_id: Some(42),
            api_hash: Some("hash".to_owned()),
            phone_number: Some("+15550100".to_owned()),
            password: Some("secret".to_owned()),
        })
        .ok();

        let config = config.unwrap();
        assert_eq!(config.api_id, 42);
        assert_eq!(config.api_hash, "hash");
        assert_eq!(config.phone_number, "+15550100");
        assert_eq!(config.password.as_deref(), Some("secret"));
    }
}
