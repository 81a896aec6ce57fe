//! REST API client module for the Fyers API v3.
//!
//! This module provides the `ApiClient` for exchanging an authorization
//! code for an access token and for reading quotes, the account profile,
//! and historical candles.
//!
//! Authenticated requests send `Authorization: <app_id>:<access_token>`.
//! Nothing is retried: every failure goes straight back to the caller.

pub mod client;
pub mod error;

pub use client::{ApiClient, Endpoints};
pub use error::ApiError;
