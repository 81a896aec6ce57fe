//! Plain-text rendering of command outcomes and errors.

use std::backtrace::BacktraceStatus;
use std::fmt::Write;

use fyersdesk_core::api::ApiError;
use fyersdesk_core::models::{Candle, CandleSummary, HistoryRequest, Profile, Quote, QuoteValues};
use fyersdesk_core::utils::{
    format_change, format_date, format_datetime, format_price, format_volume, truncate_string,
};

use crate::app::{Outcome, StatusInfo};

/// Widest symbol shown in the quote table
const SYMBOL_COLUMN_WIDTH: usize = 24;

pub const HELP: &str = "\
Commands:
  creds [APP_ID]                      set App ID and secret key (secret is prompted)
  redirect <URI>                      set the redirect URI
  login-url                           print the authorization URL to open in a browser
  auth <AUTH_CODE | REDIRECT_URL>     exchange the auth code for an access token
  quote <SYMBOL>[,<SYMBOL>...]        live quotes, e.g. quote NSE:SBIN-EQ
  profile                             account name and email
  history <SYMBOL> <RES> <FROM> <TO>  candles; RES is 1, 5, 15, 60 or D; dates YYYY-MM-DD
  status                              credentials and session summary
  logout                              discard the session
  quit                                exit";

/// Render a successful outcome. `Quit` renders as nothing.
pub fn render(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Help => HELP.to_string(),
        Outcome::Message(msg) => msg.clone(),
        Outcome::LoginUrl(url) => format!(
            "Open this URL in a browser and log in:\n\n  {}\n\n\
             You will be redirected to a URL like https://127.0.0.1/?s=ok&code=200&auth_code=...\n\
             Paste that URL (or just the auth_code) into: auth <...>",
            url
        ),
        Outcome::Authenticated { app_id } => format!("Authenticated as {}", app_id),
        Outcome::Quotes(quotes) => render_quotes(quotes),
        Outcome::Profile(profile) => render_profile(profile),
        Outcome::History { request, candles } => render_history(request, candles),
        Outcome::NoData(msg) => format!("Warning: {}", msg),
        Outcome::Status(info) => render_status(info),
        Outcome::LoggedOut => {
            "Logged out. Run `login-url` and `auth` to sign in again.".to_string()
        }
        Outcome::Quit => String::new(),
    }
}

/// Absolute and percent change, e.g. `-3.55 (-0.45%)`
fn quote_change(values: &QuoteValues) -> String {
    match values.ch {
        Some(ch) => format!("{:+.2} ({})", ch, format_change(values.ch_per)),
        None => format_change(values.ch_per),
    }
}

pub fn render_quotes(quotes: &[Quote]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<w$}  {:>10}  {:>18}  {:>10}  {:>10}  {:>10}  {:>10}  {:>15}",
        "SYMBOL",
        "LTP",
        "CHANGE",
        "OPEN",
        "HIGH",
        "LOW",
        "PREV CLOSE",
        "VOLUME",
        w = SYMBOL_COLUMN_WIDTH
    );
    for q in quotes {
        let symbol = truncate_string(&q.symbol, SYMBOL_COLUMN_WIDTH);
        if !q.is_ok() {
            let reason = q.values.error_message.as_deref().unwrap_or("error");
            let _ = writeln!(out, "{:<w$}  {}", symbol, reason, w = SYMBOL_COLUMN_WIDTH);
            continue;
        }
        let _ = writeln!(
            out,
            "{:<w$}  {:>10}  {:>18}  {:>10}  {:>10}  {:>10}  {:>10}  {:>15}",
            symbol,
            format_price(q.values.lp),
            quote_change(&q.values),
            format_price(q.values.open_price),
            format_price(q.values.high_price),
            format_price(q.values.low_price),
            format_price(q.values.prev_close_price),
            format_volume(q.values.volume),
            w = SYMBOL_COLUMN_WIDTH
        );
    }
    out.trim_end().to_string()
}

pub fn render_profile(profile: &Profile) -> String {
    let mut out = format!(
        "Name:  {}\nEmail: {}",
        profile.display_name(),
        profile.display_email()
    );
    if let Some(ref fy_id) = profile.fy_id {
        let _ = write!(out, "\nID:    {}", fy_id);
    }
    out
}

pub fn render_history(request: &HistoryRequest, candles: &[Candle]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}) {} to {}",
        request.symbol,
        request.resolution.display_name(),
        request.from_date,
        request.to_date
    );

    if let Some(summary) = CandleSummary::from_candles(candles) {
        let _ = writeln!(
            out,
            "Candles: {}  Open: {}  Close: {}  High: {}  Low: {}  Change: {} ({})  Volume: {}",
            summary.count,
            format_price(Some(summary.first_open)),
            format_price(Some(summary.last_close)),
            format_price(Some(summary.high)),
            format_price(Some(summary.low)),
            format_price(Some(summary.change)),
            format_change(Some(summary.change_pct)),
            format_volume(Some(summary.total_volume)),
        );
    }

    let _ = writeln!(
        out,
        "\n{:<16}  {:>10}  {:>10}  {:>10}  {:>10}  {:>14}",
        "TIME", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME"
    );
    for c in candles {
        let time = if request.resolution.is_intraday() {
            format_datetime(c.timestamp)
        } else {
            format_date(c.timestamp)
        };
        let _ = writeln!(
            out,
            "{:<16}  {:>10}  {:>10}  {:>10}  {:>10}  {:>14}",
            time,
            format_price(Some(c.open)),
            format_price(Some(c.high)),
            format_price(Some(c.low)),
            format_price(Some(c.close)),
            format_volume(Some(c.volume)),
        );
    }
    out.trim_end().to_string()
}

pub fn render_status(info: &StatusInfo) -> String {
    let session = if info.authenticated {
        format!(
            "authenticated (token {}, {} min old)",
            info.token_hint.as_deref().unwrap_or("***"),
            info.session_minutes.unwrap_or(0)
        )
    } else {
        "not authenticated".to_string()
    };
    format!(
        "App ID:       {}\nSecret key:   {}\nRedirect URI: {}\nSession:      {}",
        info.app_id.as_deref().unwrap_or("(not set)"),
        if info.secret_set { "set" } else { "(not set)" },
        info.redirect_uri,
        session
    )
}

/// Render a failed command. Transport failures always include the full cause
/// chain and the stack trace captured where they were raised.
pub fn render_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Validation(msg)) => format!("Invalid input: {}", msg),
        Some(ApiError::NotAuthenticated) => format!("Error: {}", err),
        Some(ApiError::Http { status, body }) => {
            format!("Error: request failed with HTTP {}\n{}", status, body)
        }
        Some(ApiError::Rejected(diagnostic)) => {
            format!("Warning: unexpected response from server:\n{}", diagnostic)
        }
        Some(ApiError::NetworkError { trace, .. }) => {
            format!("{}\n\nStack trace:\n{}", render_chain(err), trace)
        }
        Some(ApiError::InvalidResponse(msg)) => format!("Error: invalid response: {}", msg),
        None => render_chain_with_backtrace(err),
    }
}

fn render_chain(err: &anyhow::Error) -> String {
    let mut out = format!("Error: {}", err);
    for cause in err.chain().skip(1) {
        let _ = write!(out, "\n  caused by: {}", cause);
    }
    out
}

/// Error text plus the anyhow backtrace when `RUST_BACKTRACE` captured one
fn render_chain_with_backtrace(err: &anyhow::Error) -> String {
    let mut out = render_chain(err);
    let backtrace = err.backtrace();
    if backtrace.status() == BacktraceStatus::Captured {
        let _ = write!(out, "\n\nStack trace:\n{}", backtrace);
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fyersdesk_core::api::{ApiClient, Endpoints};
    use fyersdesk_core::models::Resolution;

    use super::*;

    fn quote(symbol: &str, lp: f64) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            status: Some("ok".to_string()),
            values: QuoteValues {
                lp: Some(lp),
                volume: Some(1_234_567.0),
                ch_per: Some(-0.45),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_render_quotes() {
        let out = render_quotes(&[quote("NSE:SBIN-EQ", 781.2)]);
        assert!(out.contains("NSE:SBIN-EQ"));
        assert!(out.contains("781.20"));
        assert!(out.contains("-0.45%"));
        assert!(out.contains("1,234,567"));
    }

    #[test]
    fn test_render_quotes_full_row() {
        let q = Quote {
            symbol: "NSE:SBIN-EQ".to_string(),
            status: Some("ok".to_string()),
            values: QuoteValues {
                lp: Some(781.2),
                ch: Some(-3.55),
                ch_per: Some(-0.45),
                open_price: Some(786.0),
                high_price: Some(788.9),
                low_price: Some(778.1),
                prev_close_price: Some(784.75),
                volume: Some(9_812_345.0),
                ..Default::default()
            },
        };
        let out = render_quotes(&[q]);
        let header = out.lines().next().unwrap();
        for column in ["OPEN", "HIGH", "LOW", "PREV CLOSE"] {
            assert!(header.contains(column), "missing column {}", column);
        }
        let row = out.lines().nth(1).unwrap();
        assert!(row.contains("-3.55 (-0.45%)"));
        assert!(row.contains("786.00"));
        assert!(row.contains("788.90"));
        assert!(row.contains("778.10"));
        assert!(row.contains("784.75"));
    }

    #[test]
    fn test_render_history_daily() {
        let request = HistoryRequest::new(
            "NSE:SBIN-EQ",
            Resolution::Daily,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        )
        .unwrap();
        let candles = vec![
            Candle::from((1_704_067_200, 100.0, 110.0, 95.0, 105.0, 1000.0)),
            Candle::from((1_704_153_600, 105.0, 120.0, 100.0, 115.0, 500.0)),
        ];
        let out = render_history(&request, &candles);
        assert!(out.contains("Candles: 2"));
        assert!(out.contains("2024-01-02"));
        assert!(out.contains("+15.00%"));
        assert!(out.contains("1,500"));
    }

    #[test]
    fn test_render_no_data() {
        let out = render(&Outcome::NoData("No quote data for NSE:X".to_string()));
        assert!(out.starts_with("Warning:"));
    }

    #[test]
    fn test_render_http_error_shows_body() {
        let err: anyhow::Error = ApiError::from_status(
            fyersdesk_core::StatusCode::UNAUTHORIZED,
            r#"{"s":"error","message":"invalid token"}"#,
        )
        .into();
        let out = render_error(&err);
        assert!(out.contains("401"));
        assert!(out.contains("invalid token"));
    }

    #[test]
    fn test_render_chain() {
        let err = anyhow::anyhow!("connection refused").context("Failed to reach server");
        let out = render_error(&err);
        assert!(out.contains("Failed to reach server"));
        assert!(out.contains("caused by: connection refused"));
    }

    #[tokio::test]
    async fn test_render_connection_refused() {
        let api = ApiClient::with_endpoints(Endpoints::from_host("http://127.0.0.1:1")).unwrap();
        let err = api.exchange_auth_code("hash", "CODE1").await.unwrap_err();

        let out = render_error(&err);
        assert!(out.starts_with("Error: Network error"));
        assert!(out.contains("caused by:"));
        assert!(out.contains("Stack trace:"));
        assert_eq!(out.matches("error sending request").count(), 1);
    }

    #[test]
    fn test_render_status_hides_secrets() {
        let info = StatusInfo {
            app_id: Some("ABC-100".to_string()),
            secret_set: true,
            redirect_uri: "https://127.0.0.1/".to_string(),
            authenticated: true,
            token_hint: Some("eyJh***".to_string()),
            session_minutes: Some(3),
        };
        let out = render_status(&info);
        assert!(out.contains("ABC-100"));
        assert!(out.contains("eyJh***"));
        assert!(out.contains("3 min old"));
    }
}
