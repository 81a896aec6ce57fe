//! fyersdesk - a terminal client for the Fyers API v3.
//!
//! Walks through the authorization-code login in the browser, then shows
//! live quotes, the account profile, and historical candles. The session
//! lives only as long as the process.

mod app;
mod ui;

use std::io;

use anyhow::Result;
use fyersdesk_core::Config;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, Command, Outcome};
use ui::input::{complete_credentials, parse_command, read_line};
use ui::render::{render, render_error, HELP};

// ============================================================================
// Constants
// ============================================================================

/// Shell prompt when no session is active
const PROMPT: &str = "fyersdesk> ";

/// Shell prompt while authenticated
const PROMPT_AUTHENTICATED: &str = "fyersdesk*> ";

/// Prefix for daily log files when `log_dir` is configured
const LOG_FILE_PREFIX: &str = "fyersdesk.log";

const USAGE: &str = "\
Usage: fyersdesk [--login-url | --help | --version]

Without flags, starts the interactive shell.
Environment: FYERS_APP_ID, FYERS_SECRET_KEY, FYERS_REDIRECT_URI (a .env file is read if present).
RUST_LOG overrides the configured log level.";

/// Initialize the tracing subscriber for logging.
/// Returns the file writer guard when logging to `log_dir`; keep it alive.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config_result = Config::load();
    let config = config_result.as_ref().cloned().unwrap_or_default();
    let log_guard = init_tracing(&config);
    if let Err(ref e) = config_result {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    // Check for CLI flags
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--help") | Some("-h") => {
            println!("{}\n\n{}", USAGE, HELP);
            return Ok(());
        }
        Some("--version") | Some("-V") => {
            println!("fyersdesk {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some("--login-url") => {
            let mut app = App::new(config)?;
            let outcome = app.handle(Command::LoginUrl).await?;
            println!("{}", render(&outcome));
            return Ok(());
        }
        Some(other) => {
            warn!(argument = %other, "Unknown argument");
            eprintln!("Unknown argument: {}\n\n{}", other, USAGE);
            // exit() skips destructors; flush the log writer first
            drop(log_guard);
            std::process::exit(2);
        }
        None => {}
    }

    info!("fyersdesk starting");
    let mut app = App::new(config)?;

    println!("fyersdesk {} - type `help` for commands", env!("CARGO_PKG_VERSION"));
    if !app.has_credentials() {
        println!("Start with `creds` to enter your App ID and secret key.");
    }

    run_shell(&mut app).await?;

    // Session is dropped with the process; nothing to persist
    info!("fyersdesk shutting down");
    Ok(())
}

/// Read-handle-print loop. Each command completes before the next prompt.
async fn run_shell(app: &mut App) -> Result<()> {
    loop {
        let prompt = if app.is_authenticated() {
            PROMPT_AUTHENTICATED
        } else {
            PROMPT
        };
        let Some(line) = read_line(prompt)? else {
            println!();
            return Ok(());
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", render_error(&e));
                continue;
            }
        };

        let command = match complete_credentials(command, app.app_id()) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", render_error(&e));
                continue;
            }
        };

        match app.handle(command).await {
            Ok(Outcome::Quit) => return Ok(()),
            Ok(outcome) => println!("{}", render(&outcome)),
            Err(e) => println!("{}", render_error(&e)),
        }
    }
}
