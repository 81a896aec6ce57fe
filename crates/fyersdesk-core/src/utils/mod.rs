//! Utility functions for display formatting and secret masking.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    format_change, format_date, format_datetime, format_price, format_volume, mask_secret,
    truncate_string,
};
