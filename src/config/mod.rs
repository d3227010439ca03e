//! Configuration module for the phone checker.
//!
//! Handles resolution of Telegram API credentials from command-line
//! flags, environment variables, and interactive prompts.

mod settings;

pub use settings::{CheckerConfig, ConfigError, CredentialOverrides};
