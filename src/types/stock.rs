use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::types::DataOrigin;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub collected_at: DateTime<Utc>,
    pub origin: DataOrigin,
}

impl StockQuote {
    /// Build a quote from the last trade and the prior session close.
    /// A zero previous close yields a zero percent change.
    pub fn from_session(
        symbol: &str,
        price: f64,
        previous_close: f64,
        volume: u64,
        origin: DataOrigin,
    ) -> Self {
        let change = price - previous_close;
        let change_percent = if previous_close != 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        };

        StockQuote {
            symbol: symbol.to_string(),
            price,
            change,
            change_percent,
            volume,
            collected_at: Utc::now(),
            origin,
        }
    }
}
