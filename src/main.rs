//! Telegram Phone Checker - Main Entry Point
//!
//! Checks whether phone numbers belong to valid Telegram accounts and
//! saves the collected profile data as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Input, Password};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tg_phone_checker::config::{CheckerConfig, CredentialOverrides};
use tg_phone_checker::lookup::{parse_numbers, run_lookup};
use tg_phone_checker::report;
use tg_phone_checker::telegram::{LookupClient, TelegramError};

/// Check whether phone numbers belong to valid Telegram accounts.
///
/// Requires a Telegram account and an App api_id/api_hash pair, which
/// you can get by creating a Telegram App at <https://my.telegram.org/apps>.
/// Credentials may also be stored in a `.env` file (TG_API_ID,
/// TG_API_HASH, TG_PHONE_NUMBER, TG_PASSWORD).
#[derive(Parser, Debug)]
#[command(name = "phone_checker")]
#[command(about = "Check whether phone numbers belong to valid Telegram accounts")]
#[command(version)]
struct Args {
    /// Comma-separated list of phone numbers to check.
    #[arg(short, long)]
    phone_numbers: Option<String>,

    /// Telegram App api_id (falls back to TG_API_ID, then a prompt).
    #[arg(long)]
    api_id: Option<i32>,

    /// Telegram App api_hash (falls back to TG_API_HASH, then a prompt).
    #[arg(long)]
    api_hash: Option<String>,

    /// Phone number of your own Telegram account (falls back to
    /// TG_PHONE_NUMBER, then a prompt).
    #[arg(long)]
    api_phone_number: Option<String>,

    /// Password of your own Telegram account (falls back to TG_PASSWORD,
    /// then a prompt).
    #[arg(long)]
    api_phone_password: Option<String>,

    /// Filename to store results.
    #[arg(short, long, default_value = "results.json")]
    output: String,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Resolve credentials once: flag > environment variable > prompt
    let config = CheckerConfig::resolve(CredentialOverrides {
        api_id: args.api_id,
        api_hash: args.api_hash.clone(),
        phone_number: args.api_phone_number.clone(),
        password: args.api_phone_password.clone(),
    })
    .context("Failed to resolve Telegram configuration")?;

    // Connect to Telegram
    let client = LookupClient::connect(&config)
        .await
        .context("Failed to connect to Telegram")?;

    // Handle authentication if needed
    if !client.is_authorized().await.context("Failed to check authorization")? {
        authenticate(&client, &config).await?;
    }

    let raw_numbers = match args.phone_numbers {
        Some(ref numbers) if !numbers.trim().is_empty() => numbers.clone(),
        _ => Input::new()
            .with_prompt("Enter the phone numbers to check, separated by commas")
            .interact_text()
            .context("Failed to read phone numbers")?,
    };

    let numbers = parse_numbers(&raw_numbers);
    info!("Checking {} phone number(s)", numbers.len());

    let results = run_lookup(&client, &numbers)
        .await
        .context("Phone number lookup failed")?;

    report::save(&results, &args.output).context("Failed to save results")?;

    client.disconnect();

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Handles Telegram authentication.
async fn authenticate(client: &LookupClient, config: &CheckerConfig) -> Result<()> {
    info!("Authentication required");

    let token = client
        .request_login_code(&config.phone_number, &config.api_hash)
        .await
        .context("Failed to request login code")?;

    info!("Login code sent to your Telegram app");

    let code: String = Input::new()
        .with_prompt("Enter the login code")
        .interact_text()?;

    match client.sign_in(&token, &code).await {
        Ok(()) => {
            info!("Successfully signed in!");
            Ok(())
        }
        Err(TelegramError::PasswordRequired(password_token)) => {
            info!("Two-factor authentication is enabled");

            let password = match config.password.clone() {
                Some(password) => password,
                None => {
                    let hint = password_token.hint().unwrap_or("no hint");
                    info!("Password hint: {}", hint);

                    Password::new()
                        .with_prompt("Enter your 2FA password")
                        .interact()?
                }
            };

            client
                .check_password(password_token, &password)
                .await
                .context("2FA authentication failed")?;

            info!("Successfully signed in with 2FA!");
            Ok(())
        }
        Err(e) => Err(e).context("Authentication failed"),
    }
}
