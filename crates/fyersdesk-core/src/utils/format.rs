use chrono::DateTime;

/// Characters of a secret left visible by `mask_secret`
const MASK_VISIBLE_CHARS: usize = 4;

/// Mask a secret for logs and debug output, keeping only a short prefix
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= MASK_VISIBLE_CHARS * 2 {
        "***".to_string()
    } else {
        let prefix: String = secret.chars().take(MASK_VISIBLE_CHARS).collect();
        format!("{}***", prefix)
    }
}

/// Format a price with two decimals, or a dash when missing
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("{:.2}", p),
        None => "-".to_string(),
    }
}

/// Format a volume with thousands separators (1234567 -> 1,234,567)
pub fn format_volume(volume: Option<f64>) -> String {
    let Some(volume) = volume else {
        return "-".to_string();
    };

    let whole = volume.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if whole < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// Format a percentage change with explicit sign (+1.25%)
pub fn format_change(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{:+.2}%", p),
        None => "-".to_string(),
    }
}

/// Format epoch seconds as `YYYY-MM-DD` (UTC)
pub fn format_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Format epoch seconds as `YYYY-MM-DD HH:MM` (UTC)
pub fn format_datetime(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
