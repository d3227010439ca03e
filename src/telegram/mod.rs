//! Telegram client wrapper module.
//!
//! Provides high-level abstractions for interacting with Telegram:
//! connection and session handling, authentication, and the raw API
//! operations the lookup workflow needs.

mod client;

pub use client::{LoginToken, LookupClient, PasswordToken, TelegramError};
