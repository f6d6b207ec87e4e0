//! Quizkit - command-line client for the quiz platform.
//!
//! Logs in, runs one command against the API and logs out again. Access tokens
//! live only in memory; an expired token is renewed transparently by the
//! client's refresh gate.

mod commands;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Command;
use quizkit_core::{ApiClient, Config, SessionTeardown};

// ============================================================================
// Constants
// ============================================================================

const EMAIL_ENV: &str = "QUIZKIT_EMAIL";
const PASSWORD_ENV: &str = "QUIZKIT_PASSWORD";
const LOG_FILE: &str = "quizkit.log";

const USAGE: &str = "\
Usage: quizkit <command> [args]

Commands:
  quizzes [search]        List popular quizzes, optionally filtered
  quiz <id>               Show one quiz and its questions
  teams                   List teams
  leaderboard [quiz-id]   Show the global or per-quiz leaderboard
  stats                   Show your performance summary
  whoami                  Show the logged-in account

Environment:
  QUIZKIT_API_URL, QUIZKIT_EMAIL, QUIZKIT_PASSWORD, RUST_LOG";

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG to control the level (e.g. RUST_LOG=quizkit_core=debug).
/// Besides stderr, logs go to a daily file in the cache directory when one
/// exists. The returned guard flushes that file on drop.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match Config::cache_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        println!("{}", USAGE);
        return Ok(());
    }
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let mut config = Config::load()?;
    let client_config = config.client_config();
    info!(api = %client_config.base_url, "quizkit starting");

    let teardown: Arc<dyn SessionTeardown> = Arc::new(|| {
        eprintln!("Your session has expired. Run the command again to log in.");
    });
    let client = ApiClient::with_teardown(&client_config, Some(teardown))?;

    let email = login(&client, &config).await?;
    if config.last_email.as_deref() != Some(email.as_str()) {
        config.last_email = Some(email);
        if let Err(e) = config.save() {
            warn!(error = %e, "Could not remember email");
        }
    }

    let result = commands::run(&client, &command).await;
    client.logout().await;
    result
}

/// Log in with credentials from the environment, the config or a prompt.
/// Returns the email that worked.
async fn login(client: &ApiClient, config: &Config) -> Result<String> {
    let email = match std::env::var(EMAIL_ENV).ok().or_else(|| config.last_email.clone()) {
        Some(email) if !email.trim().is_empty() => email.trim().to_string(),
        _ => prompt("Email: ")?,
    };
    if email.is_empty() {
        bail!("An email address is required");
    }

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password(format!("Password for {}: ", email))
            .context("Failed to read password")?,
    };

    let user = client
        .login(&email, &password)
        .await
        .with_context(|| format!("Login failed for {}", email))?;
    eprintln!("Logged in as {}", user.username);
    Ok(email)
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
