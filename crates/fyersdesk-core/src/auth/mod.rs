//! Authentication module for the authorization-code flow.
//!
//! This module provides:
//! - `app_id_hash`: SHA-256 identity hash sent to the token endpoint
//! - `authorization_url` / `extract_auth_code`: both ends of the consent redirect
//! - `Credentials`: app id and secret, held in memory only
//! - `Session`: the bearer token for the lifetime of the process
//!
//! Nothing here touches disk. Tokens are never refreshed; a new session
//! requires a new authorization code.

pub mod authorize;
pub mod credentials;
pub mod hash;
pub mod session;

pub use authorize::{authorization_url, extract_auth_code, AUTH_STATE};
pub use credentials::Credentials;
pub use hash::app_id_hash;
pub use session::{Session, SessionData};
