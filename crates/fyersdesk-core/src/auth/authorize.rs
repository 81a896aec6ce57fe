//! Both ends of the browser consent redirect.
//!
//! `authorization_url` builds the link the user opens; after consent the
//! broker redirects to `redirect_uri?...&auth_code=XXXX&state=...` and
//! `extract_auth_code` pulls the code back out of whatever the user pastes.

use anyhow::{Context, Result};
use reqwest::Url;

use crate::api::ApiError;

/// Opaque `state` value sent with every consent request
pub const AUTH_STATE: &str = "fyersdesk";

/// Path of the consent page, relative to the API base
const AUTHCODE_PATH: &str = "generate-authcode";

/// Query parameter carrying the code on the redirect back
const AUTH_CODE_PARAM: &str = "auth_code";

/// Build the consent URL for `app_id`, redirecting back to `redirect_uri`.
pub fn authorization_url(api_base: &str, app_id: &str, redirect_uri: &str) -> Result<Url> {
    if app_id.trim().is_empty() {
        return Err(ApiError::Validation("App ID is required".to_string()).into());
    }
    if redirect_uri.trim().is_empty() {
        return Err(ApiError::Validation("Redirect URI is required".to_string()).into());
    }

    let endpoint = format!("{}/{}", api_base.trim_end_matches('/'), AUTHCODE_PATH);
    Url::parse_with_params(
        &endpoint,
        &[
            ("client_id", app_id.trim()),
            ("redirect_uri", redirect_uri.trim()),
            ("response_type", "code"),
            ("state", AUTH_STATE),
        ],
    )
    .with_context(|| format!("Invalid authorization endpoint: {}", endpoint))
}

/// Accept either a bare auth code or the full redirect URL and return the code.
pub fn extract_auth_code(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ApiError::Validation("Authorization code is required".to_string()).into());
    }

    // Anything that doesn't parse as an absolute URL is taken as the code itself
    let url = match Url::parse(input) {
        Ok(url) if url.has_host() => url,
        _ => return Ok(input.to_string()),
    };

    url.query_pairs()
        .find(|(key, _)| key == AUTH_CODE_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| {
            ApiError::Validation(format!("No {} parameter in redirect URL", AUTH_CODE_PARAM)).into()
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const BASE: &str = "https://api-t1.fyers.in/api/v3";

    fn query_map(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_authorization_url_params() {
        let url = authorization_url(BASE, "ABC-100", "https://127.0.0.1/").unwrap();
        assert_eq!(url.path(), "/api/v3/generate-authcode");

        let params = query_map(&url);
        assert_eq!(params.len(), 4);
        assert_eq!(params["client_id"], "ABC-100");
        assert_eq!(params["redirect_uri"], "https://127.0.0.1/");
        assert_eq!(params["response_type"], "code");
        assert!(!params["state"].is_empty());
    }

    #[test]
    fn test_authorization_url_trailing_slash_base() {
        let url = authorization_url("https://example.com/api/v3/", "ABC-100", "https://127.0.0.1/")
            .unwrap();
        assert_eq!(url.path(), "/api/v3/generate-authcode");
    }

    #[test]
    fn test_authorization_url_requires_inputs() {
        let err = authorization_url(BASE, "", "https://127.0.0.1/").unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Validation(_))));

        let err = authorization_url(BASE, "ABC-100", "  ").unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Validation(_))));
    }

    #[test]
    fn test_extract_auth_code() {
        // Bare code passes through
        assert_eq!(extract_auth_code("  eyJ0eXAi.abc ").unwrap(), "eyJ0eXAi.abc");

        // Full redirect URL
        let redirect = "https://127.0.0.1/?s=ok&code=200&auth_code=eyJ0eXAi.abc&state=fyersdesk";
        assert_eq!(extract_auth_code(redirect).unwrap(), "eyJ0eXAi.abc");
    }

    #[test]
    fn test_extract_auth_code_errors() {
        assert!(extract_auth_code("").is_err());
        let err = extract_auth_code("https://127.0.0.1/?s=error&code=-413").unwrap_err();
        assert!(err.to_string().contains("auth_code"));
    }
}
