use crate::config::history::HistoryConfig;
use crate::config::sources::{CryptoConfig, NewsConfig, StockConfig, WeatherConfig};
use crate::config::*;
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scheduler: SchedulerConfig,
    pub fetch: FetchConfig,
    pub weather: WeatherConfig,
    pub stocks: StockConfig,
    pub news: NewsConfig,
    pub crypto: CryptoConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("PULSEBOARD")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("stocks.symbols")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Load a single file with no environment overlay.
    pub fn load_from(path: &str) -> Result<Self> {
        let app: AppConfig = Config::builder()
            .add_source(File::with_name(path))
            .build()?
            .try_deserialize()?;

        app.validate()?;
        Ok(app)
    }

    /// Structural checks only; credentials are never validated here so a
    /// bad key degrades the weather feed instead of failing startup.
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.update_interval_secs == 0 {
            return Err(Error::ConfigError("scheduler.update_interval_secs must be > 0".into()));
        }
        if self.scheduler.report_interval_secs == 0 {
            return Err(Error::ConfigError("scheduler.report_interval_secs must be > 0".into()));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(Error::ConfigError("fetch.timeout_secs must be > 0".into()));
        }
        if self.stocks.symbols.is_empty() {
            return Err(Error::ConfigError("stocks.symbols must not be empty".into()));
        }
        if self.news.max_headlines == 0 {
            return Err(Error::ConfigError("news.max_headlines must be > 0".into()));
        }
        if self.stocks.jitter < 0.0 {
            return Err(Error::ConfigError("stocks.jitter must not be negative".into()));
        }

        let capacities = [
            ("weather", self.history.weather_capacity),
            ("stocks", self.history.stock_capacity),
            ("news", self.history.news_capacity),
            ("crypto", self.history.crypto_capacity),
        ];
        for (name, capacity) in capacities {
            if capacity == 0 {
                return Err(Error::ConfigError(format!("history capacity for {} must be > 0", name)));
            }
        }

        Ok(())
    }
}
