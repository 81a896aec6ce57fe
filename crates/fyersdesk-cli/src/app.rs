//! Application state and command handlers.
//!
//! `App` owns the config, the API client, the in-memory credentials and the
//! session. Each `Command` is handled to completion before the next one is
//! read; nothing runs in the background.

use anyhow::Result;
use chrono::NaiveDate;
use fyersdesk_core::api::{ApiClient, ApiError};
use fyersdesk_core::auth::{extract_auth_code, Credentials, Session, SessionData};
use fyersdesk_core::config::{Config, ENV_SECRET_KEY};
use fyersdesk_core::models::{Candle, HistoryRequest, Profile, Quote, Resolution};
use fyersdesk_core::utils::mask_secret;
use fyersdesk_core::Url;
use tracing::{debug, info, warn};

/// One user action, parsed from a shell line by `ui::input`.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    /// Set credentials. `None` fields fall back to config or a prompt.
    Creds {
        app_id: Option<String>,
        secret_key: Option<String>,
    },
    Redirect(String),
    LoginUrl,
    /// Bare auth code or the full redirect URL
    Auth(String),
    Quote(String),
    Profile,
    History {
        symbol: String,
        resolution: Resolution,
        from_date: NaiveDate,
        to_date: NaiveDate,
    },
    Status,
    Logout,
    Quit,
}

/// Credential and session summary for `status`. Holds no secrets.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusInfo {
    pub app_id: Option<String>,
    pub secret_set: bool,
    pub redirect_uri: String,
    pub authenticated: bool,
    pub token_hint: Option<String>,
    pub session_minutes: Option<i64>,
}

/// Result of a handled command, ready for `ui::render`.
#[derive(Debug, Clone)]
pub enum Outcome {
    Help,
    Message(String),
    LoginUrl(Url),
    Authenticated { app_id: String },
    Quotes(Vec<Quote>),
    Profile(Profile),
    History {
        request: HistoryRequest,
        candles: Vec<Candle>,
    },
    /// A 200 that carried nothing to show
    NoData(String),
    Status(StatusInfo),
    LoggedOut,
    Quit,
}

pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub session: Session,
    credentials: Option<Credentials>,
    // Write config back to disk after a successful login
}

impl App {
    /// Create the app from the loaded config plus `FYERS_*` environment
    pub fn new(mut config: Config) -> Result<Self> {
        config.apply_env();
        debug!(app_id = ?config.app_id, redirect_uri = %config.redirect_uri, "Config loaded");

        let api = ApiClient::with_endpoints(config.endpoints())?;
        let mut app = Self::with_parts(config, api);

        // Both halves from the environment means no prompt is needed
        let from_env = (app.config.app_id.clone(), std::env::var(ENV_SECRET_KEY));
        if let (Some(app_id), Ok(secret)) = from_env {
            match Credentials::new(&app_id, &secret) {
                Ok(creds) => {
                    debug!(?creds, "Credentials loaded from environment");
                    app.credentials = Some(creds);
                }
                Err(e) => warn!(error = %e, "Ignoring credentials from environment"),
            }
        }

        Ok(app)
    }

    /// App over an explicit config and client
    pub fn with_parts(config: Config, api: ApiClient) -> Self {
        Self {
            config,
            api,
            session: Session::new(),
            credentials: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// App ID from the current credentials, else from config
    pub fn app_id(&self) -> Option<&str> {
        self.credentials
            .as_ref()
            .map(|c| c.app_id())
            .or(self.config.app_id.as_deref())
    }

    /// Run one command to completion
    pub async fn handle(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Help => Ok(Outcome::Help),
            Command::Quit => Ok(Outcome::Quit),
            Command::Creds { app_id, secret_key } => self.set_credentials(app_id, secret_key),
            Command::Redirect(uri) => self.set_redirect(&uri),
            Command::LoginUrl => self.login_url(),
            Command::Auth(input) => self.authenticate(&input).await,
            Command::Quote(symbols) => self.quote(&symbols).await,
            Command::Profile => self.profile().await,
            Command::History {
                symbol,
                resolution,
                from_date,
                to_date,
            } => {
                let request = HistoryRequest::new(&symbol, resolution, from_date, to_date)?;
                self.history(request).await
            }
            Command::Status => Ok(Outcome::Status(self.status())),
            Command::Logout => Ok(self.logout()),
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    fn set_credentials(
        &mut self,
        app_id: Option<String>,
        secret_key: Option<String>,
    ) -> Result<Outcome> {
        let app_id = app_id
            .or_else(|| self.config.app_id.clone())
            .ok_or_else(|| ApiError::Validation("App ID is required".to_string()))?;
        let secret_key = secret_key
            .ok_or_else(|| ApiError::Validation("Secret key is required".to_string()))?;

        let creds = Credentials::new(&app_id, &secret_key)?;
        info!(
            app_id = %creds.app_id(),
            hash = %mask_secret(&creds.app_id_hash()),
            "Credentials set"
        );

        self.config.app_id = Some(creds.app_id().to_string());
        let message = format!("Credentials set for {}", creds.app_id());
        self.credentials = Some(creds);
        Ok(Outcome::Message(message))
    }

    fn set_redirect(&mut self, uri: &str) -> Result<Outcome> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(ApiError::Validation("Redirect URI is required".to_string()).into());
        }
        self.config.redirect_uri = uri.to_string();
        Ok(Outcome::Message(format!("Redirect URI set to {}", uri)))
    }

    fn login_url(&self) -> Result<Outcome> {
        let app_id = self
            .app_id()
            .ok_or_else(|| ApiError::Validation("Set an App ID first with `creds`".to_string()))?;
        let url = self.api.login_url(app_id, &self.config.redirect_uri)?;
        Ok(Outcome::LoginUrl(url))
    }

    /// Exchange an auth code for a fresh session.
    ///
    /// Any existing session is dropped first, so a failed exchange always
    /// leaves the app logged out.
    async fn authenticate(&mut self, input: &str) -> Result<Outcome> {
        let code = extract_auth_code(input)?;
        let creds = self.credentials.clone().ok_or_else(|| {
            ApiError::Validation("Set App ID and secret key first with `creds`".to_string())
        })?;

        self.session.clear();

        let token = match self.api.exchange_auth_code(&creds.app_id_hash(), &code).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Token exchange failed");
                return Err(e);
            }
        };

        self.session.update(SessionData::new(creds.app_id(), token));
        info!(app_id = %creds.app_id(), "Login successful");

        Ok(Outcome::Authenticated {
            app_id: creds.app_id().to_string(),
        })
    }

    fn logout(&mut self) -> Outcome {
        self.session.clear();
        info!("Logged out");
        Outcome::LoggedOut
    }

    fn status(&self) -> StatusInfo {
        StatusInfo {
            app_id: self.app_id().map(str::to_string),
            secret_set: self.credentials.is_some(),
            redirect_uri: self.config.redirect_uri.clone(),
            authenticated: self.session.is_authenticated(),
            token_hint: self.session.token().map(mask_secret),
            session_minutes: self.session.data.as_ref().map(|d| d.age().num_minutes()),
        }
    }

    // =========================================================================
    // Market data
    // =========================================================================

    async fn quote(&self, symbols: &str) -> Result<Outcome> {
        let quotes = self.api.fetch_quotes(&self.session, symbols).await?;
        if quotes.is_empty() {
            return Ok(Outcome::NoData(format!("No quote data for {}", symbols.trim())));
        }
        Ok(Outcome::Quotes(quotes))
    }

    async fn profile(&self) -> Result<Outcome> {
        let profile = self.api.fetch_profile(&self.session).await?;
        Ok(Outcome::Profile(profile))
    }

    async fn history(&self, request: HistoryRequest) -> Result<Outcome> {
        match self.api.fetch_history(&self.session, &request).await? {
            Some(candles) if !candles.is_empty() => Ok(Outcome::History { request, candles }),
            _ => Ok(Outcome::NoData(format!(
                "No data available for {} ({}, {} to {})",
                request.symbol,
                request.resolution.display_name(),
                request.from_date,
                request.to_date
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use fyersdesk_core::api::Endpoints;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn app_for(server: &MockServer) -> App {
        let api = ApiClient::with_endpoints(Endpoints::from_host(&server.uri())).unwrap();
        App::with_parts(Config::default(), api)
    }

    fn creds_command() -> Command {
        Command::Creds {
            app_id: Some("ABC-100".to_string()),
            secret_key: Some("s3cret".to_string()),
        }
    }

    async fn mount_token(server: &MockServer, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/api/v3/validate-authcode"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    fn api_error(err: &anyhow::Error) -> &ApiError {
        err.downcast_ref::<ApiError>().expect("expected ApiError")
    }

    #[tokio::test]
    async fn test_auth_success_populates_session() {
        let server = MockServer::start().await;
        mount_token(&server, 200, json!({"s": "ok", "access_token": "T1"})).await;

        let mut app = app_for(&server);
        app.handle(creds_command()).await.unwrap();
        let outcome = app
            .handle(Command::Auth(
                "https://127.0.0.1/?s=ok&auth_code=CODE1&state=fyersdesk".to_string(),
            ))
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Authenticated { ref app_id } if app_id == "ABC-100"));
        assert!(app.is_authenticated());
        assert_eq!(app.session.token(), Some("T1"));
    }

    #[tokio::test]
    async fn test_auth_401_leaves_session_empty() {
        let server = MockServer::start().await;
        mount_token(&server, 401, json!({"s": "error", "message": "invalid app id hash"})).await;

        let mut app = app_for(&server);
        app.handle(creds_command()).await.unwrap();
        let err = app.handle(Command::Auth("CODE1".to_string())).await.unwrap_err();

        assert!(!app.is_authenticated());
        assert!(err.to_string().contains("invalid app id hash"));
    }

    #[tokio::test]
    async fn test_failed_reauth_drops_old_session() {
        let server = MockServer::start().await;
        mount_token(&server, 200, json!({"s": "error", "message": "code used"})).await;

        let mut app = app_for(&server);
        app.handle(creds_command()).await.unwrap();
        app.session.update(SessionData::new("ABC-100", "OLD".to_string()));

        let err = app.handle(Command::Auth("CODE2".to_string())).await.unwrap_err();
        assert!(matches!(api_error(&err), ApiError::Rejected(_)));
        assert!(!app.is_authenticated());
    }

    #[tokio::test]
    async fn test_auth_without_credentials() {
        let server = MockServer::start().await;
        let mut app = app_for(&server);
        let err = app.handle(Command::Auth("CODE1".to_string())).await.unwrap_err();
        assert!(matches!(api_error(&err), ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_quote_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/quotes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"s": "ok", "d": []})))
            .mount(&server)
            .await;

        let mut app = app_for(&server);
        app.session.update(SessionData::new("ABC-100", "T1".to_string()));

        let outcome = app.handle(Command::Quote("NSE:SBIN-EQ".to_string())).await.unwrap();
        assert!(matches!(outcome, Outcome::NoData(_)));
    }

    #[tokio::test]
    async fn test_null_quote_list_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/quotes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"s": "ok", "d": null})))
            .mount(&server)
            .await;

        let mut app = app_for(&server);
        app.session.update(SessionData::new("ABC-100", "T1".to_string()));

        match app.handle(Command::Quote("NSE:SBIN-EQ".to_string())).await.unwrap() {
            Outcome::NoData(msg) => assert_eq!(msg, "No quote data for NSE:SBIN-EQ"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_history_without_candles_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"s": "no_data"})))
            .mount(&server)
            .await;

        let mut app = app_for(&server);
        app.session.update(SessionData::new("ABC-100", "T1".to_string()));

        let outcome = app
            .handle(Command::History {
                symbol: "NSE:SBIN-EQ".to_string(),
                resolution: Resolution::Daily,
                from_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                to_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            })
            .await
            .unwrap();
        match outcome {
            Outcome::NoData(msg) => assert!(msg.contains("No data available")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_logout_blocks_market_data() {
        let server = MockServer::start().await;
        mount_token(&server, 200, json!({"s": "ok", "access_token": "T1"})).await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"s": "ok", "d": []})))
            .expect(0)
            .mount(&server)
            .await;

        let mut app = app_for(&server);
        app.handle(creds_command()).await.unwrap();
        app.handle(Command::Auth("CODE1".to_string())).await.unwrap();
        assert!(app.is_authenticated());

        assert!(matches!(app.handle(Command::Logout).await.unwrap(), Outcome::LoggedOut));
        assert!(app.session.data.is_none());

        let err = app.handle(Command::Quote("NSE:SBIN-EQ".to_string())).await.unwrap_err();
        assert!(matches!(api_error(&err), ApiError::NotAuthenticated));
        let err = app.handle(Command::Profile).await.unwrap_err();
        assert!(matches!(api_error(&err), ApiError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_login_url_and_status() {
        let server = MockServer::start().await;
        let mut app = app_for(&server);

        assert!(app.handle(Command::LoginUrl).await.is_err());

        app.handle(creds_command()).await.unwrap();
        app.handle(Command::Redirect("https://localhost:5000/cb".to_string()))
            .await
            .unwrap();

        match app.handle(Command::LoginUrl).await.unwrap() {
            Outcome::LoginUrl(url) => {
                let query = url.query().unwrap_or_default();
                assert!(query.contains("client_id=ABC-100"));
                assert!(query.contains("response_type=code"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        match app.handle(Command::Status).await.unwrap() {
            Outcome::Status(info) => {
                assert_eq!(info.app_id.as_deref(), Some("ABC-100"));
                assert!(info.secret_set);
                assert!(!info.authenticated);
                assert_eq!(info.redirect_uri, "https://localhost:5000/cb");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_creds_requires_secret() {
        let server = MockServer::start().await;
        let mut app = app_for(&server);
        let err = app
            .handle(Command::Creds {
                app_id: Some("ABC-100".to_string()),
                secret_key: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(api_error(&err), ApiError::Validation(_)));
        assert!(!app.has_credentials());
    }

    #[tokio::test]
    async fn test_auth_leaves_config_dir_untouched() {
        let server = MockServer::start().await;
        mount_token(&server, 200, json!({"s": "ok", "access_token": "T1"})).await;

        let config_home = std::env::temp_dir()
            .join(format!("fyersdesk-app-config-{}", std::process::id()));
        std::env::set_var("XDG_CONFIG_HOME", &config_home);

        let config = Config {
            api_base_url: Some(format!("{}/api/v3", server.uri())),
            data_base_url: Some(format!("{}/data", server.uri())),
            ..Config::default()
        };
        let mut app = App::new(config).unwrap();
        app.handle(creds_command()).await.unwrap();
        app.handle(Command::Auth("CODE1".to_string())).await.unwrap();

        assert!(app.is_authenticated());
        assert!(!config_home.join("fyersdesk").join("config.json").exists());
        let _ = std::fs::remove_dir_all(&config_home);
    }
}
