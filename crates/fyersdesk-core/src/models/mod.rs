//! Data models for Fyers API responses.
//!
//! - `Quote`, `QuoteValues`: live quote entries from the quotes endpoint
//! - `Profile`: account holder details
//! - `Candle`, `Resolution`, `HistoryRequest`, `CandleSummary`: historical OHLCV data

pub mod candle;
pub mod profile;
pub mod quote;

pub use candle::{Candle, CandleSummary, HistoryRequest, HistoryResponse, Resolution};
pub use profile::{Profile, ProfileResponse};
pub use quote::{Quote, QuoteValues, QuotesResponse};
