use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::types::{CryptoQuote, NewsDigest, StockQuote, WeatherRecord};

/// What a display reads: the newest record per source, plus the newest
/// quote for each configured symbol. `None`/empty means the source has not
/// produced anything yet.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Snapshot {
    pub weather: Option<WeatherRecord>,
    pub stocks: Vec<StockQuote>,
    pub news: Option<NewsDigest>,
    pub crypto: Option<CryptoQuote>,
    /// Completed cycles; zero before the first one.
    pub cycle: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.weather.is_none()
            && self.stocks.is_empty()
            && self.news.is_none()
            && self.crypto.is_none()
    }

    pub fn stock(&self, symbol: &str) -> Option<&StockQuote> {
        self.stocks.iter().find(|q| q.symbol == symbol)
    }
}

/// Current length of every history buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HistoryLens {
    pub weather: usize,
    pub stocks: usize,
    pub news: usize,
    pub crypto: usize,
}
