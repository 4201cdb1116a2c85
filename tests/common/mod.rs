#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use chrono::Utc;
use rand::RngCore;
use pulseboard::aggregator::{DataManager, Feeds};
use pulseboard::config::history::HistoryConfig;
use pulseboard::error::{Error, Result};
use pulseboard::feeds::circuit_breaker::SourceBreaker;
use pulseboard::feeds::{Feed, FetchPolicy, SourceAdapter, SourceKind};
use pulseboard::types::{CryptoQuote, DataOrigin, NewsDigest, StockQuote, WeatherRecord};

type LiveFn<R> = Box<dyn Fn(u64) -> Result<R> + Send + Sync>;

/// Adapter whose live path is a closure over the call number (1-based).
/// The synthetic path is the live closure's output retagged, or a panic
/// when the live closure panics.
pub struct Scripted<R> {
    kind: SourceKind,
    calls: AtomicU64,
    live: LiveFn<R>,
    synthetic: Box<dyn Fn(u64) -> R + Send + Sync>,
}

impl<R> Scripted<R> {
    pub fn new(
        kind: SourceKind,
        live: impl Fn(u64) -> Result<R> + Send + Sync + 'static,
        synthetic: impl Fn(u64) -> R + Send + Sync + 'static,
    ) -> Self {
        Scripted {
            kind,
            calls: AtomicU64::new(0),
            live: Box::new(live),
            synthetic: Box::new(synthetic),
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: Send + 'static> SourceAdapter for Scripted<R> {
    type Record = R;

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch_live(&self) -> Result<R> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        (self.live)(call)
    }

    fn synthesize(&self, _rng: &mut dyn RngCore) -> R {
        (self.synthetic)(self.calls.load(Ordering::SeqCst))
    }
}

pub fn feed<R: Send + 'static>(adapter: Scripted<R>) -> Feed<dyn SourceAdapter<Record = R>> {
    let kind = adapter.kind;
    let adapter: Arc<dyn SourceAdapter<Record = R>> = Arc::new(adapter);
    let policy = FetchPolicy {
        timeout: Duration::from_secs(5),
        retries: 0,
        backoff: Duration::from_millis(1),
    };
    Feed::new(adapter, policy, SourceBreaker::disabled(kind.as_str()))
}

pub fn weather(n: u64, origin: DataOrigin) -> WeatherRecord {
    WeatherRecord {
        city: "Testville".to_string(),
        temperature: n as f64,
        humidity: 50.0,
        pressure: 1010.0,
        condition: "Clear".to_string(),
        collected_at: Utc::now(),
        origin,
    }
}

/// One quote per symbol, volume set to `n` so tests can tell cycles apart.
pub fn quotes(symbols: &[&str], n: u64, origin: DataOrigin) -> Vec<StockQuote> {
    symbols
        .iter()
        .map(|s| StockQuote {
            symbol: s.to_string(),
            price: 100.0,
            change: 0.0,
            change_percent: 0.0,
            volume: n,
            collected_at: Utc::now(),
            origin,
        })
        .collect()
}

pub fn news(n: u64, origin: DataOrigin) -> NewsDigest {
    NewsDigest::new(n as usize, vec![format!("Headline {}", n)], origin)
}

pub fn crypto(n: u64, origin: DataOrigin) -> CryptoQuote {
    CryptoQuote {
        price: 50_000.0 + n as f64,
        change_24h: 0.0,
        collected_at: Utc::now(),
        origin,
    }
}

pub fn weather_feed() -> Scripted<WeatherRecord> {
    Scripted::new(
        SourceKind::Weather,
        |n| Ok(weather(n, DataOrigin::Live)),
        |n| weather(n, DataOrigin::Synthetic),
    )
}

pub fn stock_feed(symbols: &'static [&'static str]) -> Scripted<Vec<StockQuote>> {
    Scripted::new(
        SourceKind::Stocks,
        move |n| Ok(quotes(symbols, n, DataOrigin::Live)),
        move |n| quotes(symbols, n, DataOrigin::Synthetic),
    )
}

pub fn news_feed() -> Scripted<NewsDigest> {
    Scripted::new(
        SourceKind::News,
        |n| Ok(news(n, DataOrigin::Live)),
        |n| news(n, DataOrigin::Synthetic),
    )
}

pub fn crypto_feed() -> Scripted<CryptoQuote> {
    Scripted::new(
        SourceKind::Crypto,
        |n| Ok(crypto(n, DataOrigin::Live)),
        |n| crypto(n, DataOrigin::Synthetic),
    )
}

pub fn network_down<R>(kind: SourceKind, synthetic: impl Fn(u64) -> R + Send + Sync + 'static) -> Scripted<R> {
    Scripted::new(
        kind,
        |_| Err(Error::NetworkFailure("connection refused".into())),
        synthetic,
    )
}

pub const SYMBOLS: &[&str] = &["AAPL", "MSFT"];

pub fn healthy_feeds() -> Feeds {
    Feeds {
        weather: feed(weather_feed()),
        stocks: feed(stock_feed(SYMBOLS)),
        news: feed(news_feed()),
        crypto: feed(crypto_feed()),
    }
}

pub fn manager(feeds: Feeds, history: HistoryConfig) -> DataManager {
    DataManager::new(feeds, SYMBOLS.iter().map(|s| s.to_string()).collect(), &history)
}
