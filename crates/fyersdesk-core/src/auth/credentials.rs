use std::fmt;

use anyhow::Result;

use crate::api::ApiError;
use crate::utils::mask_secret;

use super::hash::app_id_hash;

/// App ID and secret key for the registered API app.
///
/// Lives only in memory; neither field is ever written to config or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    app_id: String,
    secret_key: String,
}

impl Credentials {
    /// Build credentials, rejecting blank fields
    pub fn new(app_id: &str, secret_key: &str) -> Result<Self> {
        let app_id = app_id.trim();
        if app_id.is_empty() {
            return Err(ApiError::Validation("App ID is required".to_string()).into());
        }
        if secret_key.is_empty() {
            return Err(ApiError::Validation("Secret key is required".to_string()).into());
        }
        Ok(Self {
            app_id: app_id.to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Derived on every call so it always matches the current pair
    pub fn app_id_hash(&self) -> String {
        app_id_hash(&self.app_id, &self.secret_key)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("secret_key", &mask_secret(&self.secret_key))
            .finish()
    }
}
