use serde::{Deserialize, Serialize};

/// Body of `GET /data/quotes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotesResponse {
    #[serde(default)]
    pub s: Option<String>,
    /// Absent or `null` when the API has nothing for the symbols
    #[serde(default)]
    pub d: Option<Vec<Quote>>,
}

impl QuotesResponse {
    /// Quote entries, empty when `d` was missing or null
    pub fn into_quotes(self) -> Vec<Quote> {
        self.d.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol, e.g. `NSE:SBIN-EQ`
    #[serde(rename = "n", default)]
    pub symbol: String,
    /// Per-symbol status (`ok` or `error`)
    #[serde(rename = "s", default)]
    pub status: Option<String>,
    #[serde(rename = "v", default)]
    pub values: QuoteValues,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteValues {
    /// Last traded price
    pub lp: Option<f64>,
    pub volume: Option<f64>,
    /// Absolute change
    pub ch: Option<f64>,
    /// Percentage change
    pub ch_per: Option<f64>,
    pub open_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub prev_close_price: Option<f64>,
    #[serde(rename = "errmsg")]
    pub error_message: Option<String>,
}

impl Quote {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref().map(|s| s == "ok").unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quotes_response() {
        let json = r#"{"s":"ok","code":200,"d":[{"n":"NSE:SBIN-EQ","s":"ok","v":{"ch":-3.55,"chp":-0.45,"ch_per":-0.45,"lp":781.2,"spread":0.05,"ask":781.25,"bid":781.2,"open_price":786.0,"high_price":788.9,"low_price":778.1,"prev_close_price":784.75,"volume":9812345,"short_name":"SBIN-EQ","exchange":"NSE"}}]}"#;

        let resp: QuotesResponse =
            serde_json::from_str(json).expect("Failed to parse quotes JSON");
        let quotes = resp.into_quotes();
        assert_eq!(quotes.len(), 1);

        let q = &quotes[0];
        assert!(q.is_ok());
        assert_eq!(q.symbol, "NSE:SBIN-EQ");
        assert_eq!(q.values.lp, Some(781.2));
        assert_eq!(q.values.ch_per, Some(-0.45));
        assert_eq!(q.values.volume, Some(9812345.0));
    }

    #[test]
    fn test_missing_d_is_empty() {
        let resp: QuotesResponse = serde_json::from_str(r#"{"s":"ok"}"#).unwrap();
        assert!(resp.into_quotes().is_empty());
    }

    #[test]
    fn test_null_d_is_empty() {
        let resp: QuotesResponse = serde_json::from_str(r#"{"s":"ok","d":null}"#).unwrap();
        assert!(resp.into_quotes().is_empty());
    }

    #[test]
    fn test_errored_symbol() {
        let json = r#"{"s":"ok","d":[{"n":"NSE:NOPE-EQ","s":"error","v":{"errmsg":"invalid symbol"}}]}"#;
        let resp: QuotesResponse = serde_json::from_str(json).unwrap();
        let quotes = resp.into_quotes();
        let q = &quotes[0];
        assert!(!q.is_ok());
        assert_eq!(q.values.error_message.as_deref(), Some("invalid symbol"));
        assert!(q.values.lp.is_none());
    }
}
