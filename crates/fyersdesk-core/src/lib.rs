//! Core library for fyersdesk.
//!
//! Everything the terminal client needs to talk to the Fyers API v3:
//!
//! - `auth`: appIdHash derivation, the consent URL, and the in-memory `Session`
//! - `api`: the `ApiClient` for token exchange and market-data reads
//! - `models`: response types for quotes, profile, and candles
//! - `config`: user configuration stored under the platform config directory
//! - `utils`: display formatting and secret masking

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, Endpoints};
pub use auth::{Credentials, Session, SessionData};
pub use config::Config;
pub use reqwest::{StatusCode, Url};
