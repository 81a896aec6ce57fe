use std::fmt;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::api::ApiError;
use crate::utils::mask_secret;

/// An authenticated session, created by a successful token exchange.
#[derive(Clone)]
pub struct SessionData {
    pub app_id: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(app_id: &str, access_token: String) -> Self {
        Self {
            app_id: app_id.to_string(),
            access_token,
            created_at: Utc::now(),
        }
    }

    /// Value of the `Authorization` header: `<app_id>:<access_token>`
    pub fn authorization(&self) -> String {
        format!("{}:{}", self.app_id, self.access_token)
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.created_at
    }
}

impl fmt::Debug for SessionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionData")
            .field("app_id", &self.app_id)
            .field("access_token", &mask_secret(&self.access_token))
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Session state for the running process.
///
/// Empty until a token exchange succeeds; `clear` returns it to empty.
/// Never saved, never refreshed.
#[derive(Debug, Default)]
pub struct Session {
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new() -> Self {
        Self { data: None }
    }

    /// Replace the session with a freshly issued token
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Discard all session fields (logout)
    pub fn clear(&mut self) {
        self.data = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.is_some()
    }

    /// Get the bearer token if authenticated
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.access_token.as_str())
    }

    /// Session data, or `NotAuthenticated` if there is none
    pub fn require(&self) -> Result<&SessionData> {
        self.data
            .as_ref()
            .ok_or_else(|| ApiError::NotAuthenticated.into())
    }
}
