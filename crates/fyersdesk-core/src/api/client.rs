//! API client for communicating with the Fyers API v3.
//!
//! This module provides the `ApiClient` struct for the authorization-code
//! token exchange and the three authenticated reads: quotes, profile and
//! historical candles.

use anyhow::Result;
use reqwest::{header, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::{authorization_url, Session};
use crate::models::{
    Candle, HistoryRequest, HistoryResponse, Profile, ProfileResponse, Quote, QuotesResponse,
};
use crate::utils::mask_secret;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for auth and account endpoints
const API_BASE_URL: &str = "https://api-t1.fyers.in/api/v3";

/// Base URL for market data endpoints
const DATA_BASE_URL: &str = "https://api-t1.fyers.in/data";

/// `date_format=0`: ranges are epoch seconds
const HISTORY_DATE_FORMAT: &str = "0";

/// `cont_flag=1`: continuous data for futures
const HISTORY_CONT_FLAG: &str = "1";

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    #[serde(rename = "appIdHash")]
    app_id_hash: &'a str,
    code: &'a str,
}

/// Base URLs for the two API hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_base: String,
    pub data_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: API_BASE_URL.to_string(),
            data_base: DATA_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Both bases under one host, laid out like the production API
    pub fn from_host(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            api_base: format!("{}/api/v3", host),
            data_base: format!("{}/data", host),
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    fn data(&self, path: &str) -> String {
        format!("{}/{}", self.data_base.trim_end_matches('/'), path)
    }
}

/// API client for Fyers.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    /// Create a new API client against the production endpoints
    pub fn new() -> Result<Self> {
        Self::with_endpoints(Endpoints::default())
    }

    /// Create a client against custom base URLs.
    /// Uses the HTTP library's default timeouts.
    pub fn with_endpoints(endpoints: Endpoints) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, endpoints })
    }

    /// Consent URL for this client's authorization endpoint
    pub fn login_url(&self, app_id: &str, redirect_uri: &str) -> Result<Url> {
        authorization_url(&self.endpoints.api_base, app_id, redirect_uri)
    }

    // =========================================================================
    // Token exchange
    // =========================================================================

    /// Exchange a one-time authorization code for an access token.
    ///
    /// Succeeds only on HTTP 200 with `s == "ok"` and an `access_token`.
    pub async fn exchange_auth_code(&self, app_id_hash: &str, auth_code: &str) -> Result<String> {
        if app_id_hash.is_empty() {
            return Err(ApiError::Validation("App ID hash is required".to_string()).into());
        }
        let auth_code = auth_code.trim();
        if auth_code.is_empty() {
            return Err(ApiError::Validation("Authorization code is required".to_string()).into());
        }

        let url = self.endpoints.api("validate-authcode");
        debug!(url = %url, code = %mask_secret(auth_code), "Exchanging authorization code");

        let body = TokenRequest {
            grant_type: "authorization_code",
            app_id_hash,
            code: auth_code,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::network)?;

        let value = Self::read_json(response).await?;

        let status_ok = value.get("s").and_then(Value::as_str) == Some("ok");
        let token = value
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());

        match (status_ok, token) {
            (true, Some(token)) => {
                info!(token = %mask_secret(token), "Access token issued");
                Ok(token.to_string())
            }
            _ => {
                warn!("Token endpoint returned 200 without an access token");
                Err(ApiError::rejected(&value).into())
            }
        }
    }

    // =========================================================================
    // Market data
    // =========================================================================

    /// Live quotes for one or more comma-separated symbols.
    /// An empty list means the API had nothing for them.
    pub async fn fetch_quotes(&self, session: &Session, symbols: &str) -> Result<Vec<Quote>> {
        let symbols = normalize_symbols(symbols)?;
        let url = self.endpoints.data("quotes");

        let resp: QuotesResponse = self
            .get(session, &url, &[("symbols", symbols.as_str())])
            .await?;

        let quotes = resp.into_quotes();
        debug!(symbols = %symbols, count = quotes.len(), "Quotes fetched");
        Ok(quotes)
    }

    /// Account profile of the authenticated user
    pub async fn fetch_profile(&self, session: &Session) -> Result<Profile> {
        let url = self.endpoints.api("profile");
        let value: Value = self.get(session, &url, &[]).await?;

        let resp: ProfileResponse = serde_json::from_value(value.clone())
            .map_err(|e| ApiError::InvalidResponse(format!("profile: {}", e)))?;

        resp.data.ok_or_else(|| ApiError::rejected(&value).into())
    }

    /// Historical candles for a symbol and date range.
    /// Returns `None` when the response carries no `candles` field.
    pub async fn fetch_history(
        &self,
        session: &Session,
        request: &HistoryRequest,
    ) -> Result<Option<Vec<Candle>>> {
        let url = self.endpoints.data("history");
        let (range_from, range_to) = request.range();
        let range_from = range_from.to_string();
        let range_to = range_to.to_string();

        let resp: HistoryResponse = self
            .get(
                session,
                &url,
                &[
                    ("symbol", request.symbol.as_str()),
                    ("resolution", request.resolution.as_api_str()),
                    ("date_format", HISTORY_DATE_FORMAT),
                    ("range_from", range_from.as_str()),
                    ("range_to", range_to.as_str()),
                    ("cont_flag", HISTORY_CONT_FLAG),
                ],
            )
            .await?;

        match resp.candles {
            Some(candles) => {
                debug!(symbol = %request.symbol, count = candles.len(), "History fetched");
                Ok(Some(candles))
            }
            None => {
                debug!(
                    symbol = %request.symbol,
                    status = ?resp.s,
                    message = ?resp.message,
                    "History response has no candles"
                );
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn auth_headers(session: &Session) -> Result<header::HeaderMap> {
        let data = session.require()?;
        let mut headers = header::HeaderMap::new();
        let value = header::HeaderValue::from_str(&data.authorization())
            .map_err(|_| {
                ApiError::Validation("Access token is not a valid header value".to_string())
            })?;
        headers.insert(header::AUTHORIZATION, value);
        Ok(headers)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        session: &Session,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        // Fails before any I/O when logged out
        let headers = Self::auth_headers(session)?;

        debug!(url = url, ?query, "GET");
        let response = self
            .client
            .get(url)
            .headers(headers)
            .query(query)
            .send()
            .await
            .map_err(ApiError::network)?;

        let value = Self::read_json(response).await?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)).into())
    }

    /// Anything but 200 becomes `ApiError::Http` with the raw body.
    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await.map_err(ApiError::network)?;

        if status != StatusCode::OK {
            warn!(
                status = status.as_u16(),
                body = %ApiError::truncate_body(&body),
                "Request failed"
            );
            return Err(ApiError::from_status(status, &body).into());
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("{} in body: {}", e, ApiError::truncate_body(&body)))
                .into()
        })
    }
}

/// Trim each comma-separated symbol and drop blanks
fn normalize_symbols(symbols: &str) -> Result<String> {
    let parts: Vec<&str> = symbols
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(ApiError::Validation("At least one symbol is required".to_string()).into());
    }
    Ok(parts.join(","))
}
