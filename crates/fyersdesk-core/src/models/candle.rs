//! Historical candle types and the request that fetches them.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Candle granularity accepted by the history endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    SixtyMinutes,
    Daily,
}

impl Resolution {
    /// Value of the `resolution` query parameter
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Resolution::OneMinute => "1",
            Resolution::FiveMinutes => "5",
            Resolution::FifteenMinutes => "15",
            Resolution::SixtyMinutes => "60",
            Resolution::Daily => "D",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Resolution::OneMinute => "1 min",
            Resolution::FiveMinutes => "5 min",
            Resolution::FifteenMinutes => "15 min",
            Resolution::SixtyMinutes => "60 min",
            Resolution::Daily => "Daily",
        }
    }

    /// Intraday resolutions print a time column; daily prints dates only
    pub fn is_intraday(&self) -> bool {
        !matches!(self, Resolution::Daily)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

impl FromStr for Resolution {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1" | "1M" => Ok(Resolution::OneMinute),
            "5" | "5M" => Ok(Resolution::FiveMinutes),
            "15" | "15M" => Ok(Resolution::FifteenMinutes),
            "60" | "60M" | "1H" => Ok(Resolution::SixtyMinutes),
            "D" | "1D" | "DAY" | "DAILY" => Ok(Resolution::Daily),
            other => Err(ApiError::Validation(format!(
                "Unknown resolution '{}' (expected 1, 5, 15, 60 or D)",
                other
            ))),
        }
    }
}

/// One OHLCV record, decoded from `[timestamp, open, high, low, close, volume]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "CandleRow", into = "CandleRow")]
pub struct Candle {
    /// Unix epoch seconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

type CandleRow = (i64, f64, f64, f64, f64, f64);

impl From<CandleRow> for Candle {
    fn from((timestamp, open, high, low, close, volume): CandleRow) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl From<Candle> for CandleRow {
    fn from(c: Candle) -> Self {
        (c.timestamp, c.open, c.high, c.low, c.close, c.volume)
    }
}

/// Body of `GET /data/history`. `candles` is absent when there is no data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub s: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub candles: Option<Vec<Candle>>,
}

/// Parameters for one history query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: String,
    pub resolution: Resolution,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

impl HistoryRequest {
    pub fn new(
        symbol: &str,
        resolution: Resolution,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<Self> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(ApiError::Validation("Symbol is required".to_string()).into());
        }
        if from_date > to_date {
            return Err(ApiError::Validation(format!(
                "From date {} is after to date {}",
                from_date, to_date
            ))
            .into());
        }
        Ok(Self {
            symbol: symbol.to_string(),
            resolution,
            from_date,
            to_date,
        })
    }

    /// `range_from` / `range_to`: epoch seconds at midnight UTC of each date
    pub fn range(&self) -> (i64, i64) {
        (midnight_utc(self.from_date), midnight_utc(self.to_date))
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Headline numbers for a candle series.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSummary {
    pub count: usize,
    pub first_open: f64,
    pub last_close: f64,
    pub high: f64,
    pub low: f64,
    pub change: f64,
    pub change_pct: f64,
    pub total_volume: f64,
}

impl CandleSummary {
    /// `None` for an empty series
    pub fn from_candles(candles: &[Candle]) -> Option<Self> {
        let first = candles.first()?;
        let last = candles.last()?;

        let high = candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let low = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        let total_volume = candles.iter().map(|c| c.volume).sum();

        let change = last.close - first.open;
        let change_pct = if first.open != 0.0 {
            change / first.open * 100.0
        } else {
            0.0
        };

        Some(Self {
            count: candles.len(),
            first_open: first.open,
            last_close: last.close,
            high,
            low,
            change,
            change_pct,
            total_volume,
        })
    }
}
