use std::sync::Arc;
use std::time::{Duration, Instant};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{error, info, Instrument};
use crate::aggregator::history::HistoryBuffer;
use crate::aggregator::snapshot::{HistoryLens, Snapshot};
use crate::config::history::HistoryConfig;
use crate::config::loader::AppConfig;
use crate::error::{Error, Result};
use crate::feeds::crypto::CryptoAdapter;
use crate::feeds::http::build_client;
use crate::feeds::news::NewsAdapter;
use crate::feeds::stocks::StockAdapter;
use crate::feeds::weather::WeatherAdapter;
use crate::feeds::{Feed, Fetched, SourceAdapter, SourceKind};
use crate::observability::metrics::{CYCLES_TOTAL, CYCLE_DURATION, HISTORY_LEN, SOURCE_DEFECTS};
use crate::observability::tracing::cycle_span;
use crate::types::{CryptoQuote, DataOrigin, NewsDigest, StockQuote, WeatherRecord};
use crate::utils::helper::panic_message;

pub type WeatherFeed = Feed<dyn SourceAdapter<Record = WeatherRecord>>;
pub type StockFeed = Feed<dyn SourceAdapter<Record = Vec<StockQuote>>>;
pub type NewsFeed = Feed<dyn SourceAdapter<Record = NewsDigest>>;
pub type CryptoFeed = Feed<dyn SourceAdapter<Record = CryptoQuote>>;

/// The four feeds one cycle drives.
pub struct Feeds {
    pub weather: WeatherFeed,
    pub stocks: StockFeed,
    pub news: NewsFeed,
    pub crypto: CryptoFeed,
}

impl Feeds {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = build_client(&config.fetch)?;

        let weather: Arc<dyn SourceAdapter<Record = WeatherRecord>> =
            Arc::new(WeatherAdapter::new(client.clone(), config.weather.clone()));
        let stocks: Arc<dyn SourceAdapter<Record = Vec<StockQuote>>> =
            Arc::new(StockAdapter::new(client.clone(), config.stocks.clone()));
        let news: Arc<dyn SourceAdapter<Record = NewsDigest>> =
            Arc::new(NewsAdapter::new(client.clone(), config.news.clone()));
        let crypto: Arc<dyn SourceAdapter<Record = CryptoQuote>> =
            Arc::new(CryptoAdapter::new(client, config.crypto.clone()));

        Ok(Feeds {
            weather: Feed::with_config(weather, &config.fetch),
            stocks: Feed::with_config(stocks, &config.fetch),
            news: Feed::with_config(news, &config.fetch),
            crypto: Feed::with_config(crypto, &config.fetch),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceOutcome {
    Live,
    Synthetic,
    /// The update did not happen this cycle.
    Defect(String),
}

#[derive(Clone, Debug)]
pub struct CycleReport {
    pub cycle: u64,
    pub elapsed: Duration,
    pub outcomes: Vec<(SourceKind, SourceOutcome)>,
}

impl CycleReport {
    pub fn outcome(&self, kind: SourceKind) -> Option<&SourceOutcome> {
        self.outcomes.iter().find(|(k, _)| *k == kind).map(|(_, o)| o)
    }

    pub fn defects(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, SourceOutcome::Defect(_)))
            .count()
    }
}

struct Histories {
    weather: HistoryBuffer<WeatherRecord>,
    stocks: HistoryBuffer<StockQuote>,
    news: HistoryBuffer<NewsDigest>,
    crypto: HistoryBuffer<CryptoQuote>,
    cycle: u64,
    updated_at: Option<DateTime<Utc>>,
}

impl Histories {
    fn lens(&self) -> HistoryLens {
        HistoryLens {
            weather: self.weather.len(),
            stocks: self.stocks.len(),
            news: self.news.len(),
            crypto: self.crypto.len(),
        }
    }
}

/// Owns one history buffer per source and the feeds that fill them.
///
/// `update_all` is meant to be driven by a single scheduler; concurrent
/// calls are serialized. `get_latest` can be called from any number of
/// threads at any time. All appends of a cycle are applied under one write
/// lock, so a reader sees either the previous cycle or the complete new
/// one across all four fields.
pub struct DataManager {
    feeds: Feeds,
    symbols: Vec<String>,
    state: RwLock<Histories>,
    cycle_lock: Mutex<()>,
}

impl DataManager {
    pub fn new(feeds: Feeds, symbols: Vec<String>, history: &HistoryConfig) -> Self {
        DataManager {
            feeds,
            symbols,
            state: RwLock::new(Histories {
                weather: HistoryBuffer::new(history.weather_capacity),
                stocks: HistoryBuffer::new(history.stock_capacity),
                news: HistoryBuffer::new(history.news_capacity),
                crypto: HistoryBuffer::new(history.crypto_capacity),
                cycle: 0,
                updated_at: None,
            }),
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let feeds = Feeds::from_config(config)?;
        Ok(DataManager::new(feeds, config.stocks.symbols.clone(), &config.history))
    }

    /// Run every feed once, concurrently, and append the results.
    ///
    /// A feed that panics is logged and contributes nothing this cycle;
    /// the other sources are still appended.
    pub async fn update_all(&self) -> CycleReport {
        let _cycle = self.cycle_lock.lock().await;
        let cycle = self.state.read().cycle + 1;

        self.run_cycle(cycle).instrument(cycle_span(cycle)).await
    }

    async fn run_cycle(&self, cycle: u64) -> CycleReport {
        let started = Instant::now();

        let (weather, stocks, news, crypto) = tokio::join!(
            run_isolated(self.feeds.weather.clone()),
            run_isolated(self.feeds.stocks.clone()),
            run_isolated(self.feeds.news.clone()),
            run_isolated(self.feeds.crypto.clone()),
        );

        let outcomes = vec![
            (SourceKind::Weather, outcome_of(&weather)),
            (SourceKind::Stocks, outcome_of(&stocks)),
            (SourceKind::News, outcome_of(&news)),
            (SourceKind::Crypto, outcome_of(&crypto)),
        ];

        let lens = {
            let mut state = self.state.write();
            if let Ok(fetched) = weather {
                state.weather.push(fetched.record);
            }
            if let Ok(fetched) = stocks {
                state.stocks.extend(fetched.record);
            }
            if let Ok(fetched) = news {
                state.news.push(fetched.record);
            }
            if let Ok(fetched) = crypto {
                state.crypto.push(fetched.record);
            }
            state.cycle = cycle;
            state.updated_at = Some(Utc::now());
            state.lens()
        };

        let elapsed = started.elapsed();
        record_cycle_metrics(lens, elapsed);

        let report = CycleReport { cycle, elapsed, outcomes };
        info!(
            cycle,
            elapsed_ms = elapsed.as_millis() as u64,
            weather = ?report.outcome(SourceKind::Weather),
            stocks = ?report.outcome(SourceKind::Stocks),
            news = ?report.outcome(SourceKind::News),
            crypto = ?report.outcome(SourceKind::Crypto),
            "Update cycle complete"
        );
        report
    }

    /// Never blocks on a cycle in progress beyond the final append, and
    /// never fails. Before the first cycle every field is empty.
    pub fn get_latest(&self) -> Snapshot {
        let state = self.state.read();

        // newest quote per configured symbol, in configured order
        let stocks = self.symbols
            .iter()
            .filter_map(|symbol| state.stocks.iter().rev().find(|q| &q.symbol == symbol))
            .cloned()
            .collect();

        Snapshot {
            weather: state.weather.latest().cloned(),
            stocks,
            news: state.news.latest().cloned(),
            crypto: state.crypto.latest().cloned(),
            cycle: state.cycle,
            updated_at: state.updated_at,
        }
    }

    /// Oldest first.
    pub fn weather_history(&self) -> Vec<WeatherRecord> {
        self.state.read().weather.iter().cloned().collect()
    }

    /// Quotes for one symbol, oldest first.
    pub fn stock_history(&self, symbol: &str) -> Vec<StockQuote> {
        self.state
            .read()
            .stocks
            .iter()
            .filter(|q| q.symbol == symbol)
            .cloned()
            .collect()
    }

    pub fn history_lens(&self) -> HistoryLens {
        self.state.read().lens()
    }
}

/// Run one feed on its own task so a panic inside the adapter surfaces as a
/// `JoinError` instead of unwinding through the cycle.
async fn run_isolated<A>(feed: Feed<A>) -> Result<Fetched<A::Record>>
where
    A: SourceAdapter + ?Sized + 'static,
{
    let source = feed.adapter().kind().as_str();
    tokio::spawn(async move { feed.fetch().await })
        .await
        .map_err(|join_error| {
            let details = if join_error.is_panic() {
                panic_message(join_error.into_panic())
            } else {
                join_error.to_string()
            };
            error!(source, details = %details, "Source update lost to an unexpected defect");
            SOURCE_DEFECTS.with_label_values(&[source]).inc();
            Error::UnexpectedDefect { source_name: source, details }
        })
}

fn outcome_of<R>(result: &Result<Fetched<R>>) -> SourceOutcome {
    match result {
        Ok(fetched) if fetched.origin == DataOrigin::Live => SourceOutcome::Live,
        Ok(_) => SourceOutcome::Synthetic,
        Err(e) => SourceOutcome::Defect(e.to_string()),
    }
}

fn record_cycle_metrics(lens: HistoryLens, elapsed: Duration) {
    CYCLES_TOTAL.inc();
    CYCLE_DURATION.observe(elapsed.as_secs_f64());
    HISTORY_LEN.with_label_values(&[SourceKind::Weather.as_str()]).set(lens.weather as i64);
    HISTORY_LEN.with_label_values(&[SourceKind::Stocks.as_str()]).set(lens.stocks as i64);
    HISTORY_LEN.with_label_values(&[SourceKind::News.as_str()]).set(lens.news as i64);
    HISTORY_LEN.with_label_values(&[SourceKind::Crypto.as_str()]).set(lens.crypto as i64);
}
