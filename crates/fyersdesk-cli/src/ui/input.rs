//! Command-line parsing for the interactive shell.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use chrono::NaiveDate;
use fyersdesk_core::api::ApiError;
use fyersdesk_core::models::Resolution;

use crate::app::Command;

/// Date format accepted by `history`
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse one shell line. Blank lines give `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut parts = line.split_whitespace();
    let Some(name) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();

    let command = match name.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "creds" | "credentials" => Command::Creds {
            app_id: args.first().map(|s| s.to_string()),
            secret_key: None,
        },
        "redirect" => Command::Redirect(single_arg(&args, "redirect <URI>")?),
        "login-url" | "url" => Command::LoginUrl,
        "auth" | "login" => Command::Auth(single_arg(&args, "auth <AUTH_CODE | REDIRECT_URL>")?),
        "quote" | "quotes" => {
            if args.is_empty() {
                return Err(usage("quote <SYMBOL>[,<SYMBOL>...]"));
            }
            // Allow "quote A, B" as well as "quote A,B"
            Command::Quote(args.join(""))
        }
        "profile" => Command::Profile,
        "history" | "hist" => parse_history(&args)?,
        "status" => Command::Status,
        "logout" => Command::Logout,
        other => {
            return Err(ApiError::Validation(format!(
                "Unknown command '{}' (type `help`)",
                other
            ))
            .into())
        }
    };
    Ok(Some(command))
}

fn parse_history(args: &[&str]) -> Result<Command> {
    const USAGE: &str = "history <SYMBOL> <1|5|15|60|D> <FROM YYYY-MM-DD> <TO YYYY-MM-DD>";
    let [symbol, resolution, from, to] = args else {
        return Err(usage(USAGE));
    };

    Ok(Command::History {
        symbol: symbol.to_string(),
        resolution: resolution.parse::<Resolution>()?,
        from_date: parse_date(from)?,
        to_date: parse_date(to)?,
    })
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| {
        ApiError::Validation(format!("Invalid date '{}' (expected YYYY-MM-DD)", s)).into()
    })
}

fn single_arg(args: &[&str], usage_text: &str) -> Result<String> {
    match args {
        [value] => Ok(value.to_string()),
        _ => Err(usage(usage_text)),
    }
}

fn usage(text: &str) -> anyhow::Error {
    ApiError::Validation(format!("usage: {}", text)).into()
}

/// Read one line from stdin after printing `prompt`. `None` on EOF.
pub fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Fill in whatever `creds` left out: App ID by prompt, secret by hidden prompt
pub fn complete_credentials(command: Command, default_app_id: Option<&str>) -> Result<Command> {
    let Command::Creds { app_id, secret_key } = command else {
        return Ok(command);
    };

    let app_id = match app_id {
        Some(id) => Some(id),
        None => {
            let prompt = match default_app_id {
                Some(id) => format!("App ID [{}]: ", id),
                None => "App ID: ".to_string(),
            };
            let input = read_line(&prompt)?.unwrap_or_default();
            let input = input.trim();
            if input.is_empty() {
                default_app_id.map(str::to_string)
            } else {
                Some(input.to_string())
            }
        }
    };

    let secret_key = match secret_key {
        Some(secret) => Some(secret),
        None => Some(rpassword::prompt_password("Secret key: ")?),
    };

    Ok(Command::Creds { app_id, secret_key })
}
