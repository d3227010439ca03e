//! Telegram Phone Checker Library
//!
//! Checks whether phone numbers belong to valid Telegram accounts.
//!
//! This crate provides the core functionality for:
//! - Resolving phone numbers to Telegram accounts via `MTProto`
//! - Temporarily importing unknown numbers as contacts for the lookup
//! - Projecting full user details into a serializable profile record
//! - Reporting the results as JSON to the console and a file

pub mod config;
pub mod lookup;
pub mod report;
pub mod telegram;
