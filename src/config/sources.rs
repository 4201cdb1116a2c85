use std::collections::HashMap;
use serde::{Deserialize, Serialize};

const PLACEHOLDER_API_KEY: &str = "your_weather_api_key";

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_url: String,
    pub city: String,
    pub api_key: Option<String>,
}

impl WeatherConfig {
    /// The configured key, unless it is blank or the shipped placeholder.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            api_url: "http://api.openweathermap.org/data/2.5/weather".to_string(),
            city: "Beijing".to_string(),
            api_key: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct StockConfig {
    pub api_url: String,
    pub symbols: Vec<String>,
    pub base_prices: HashMap<String, f64>,
    pub default_base_price: f64,
    pub jitter: f64,
}

impl StockConfig {
    /// Reference price for synthetic quotes. Keys are matched
    /// case-insensitively since layered config sources may lowercase them.
    pub fn base_price(&self, symbol: &str) -> f64 {
        self.base_prices
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(symbol))
            .map(|(_, price)| *price)
            .unwrap_or(self.default_base_price)
    }
}

impl Default for StockConfig {
    fn default() -> Self {
        let base_prices = [
            ("AAPL", 150.0),
            ("GOOGL", 2500.0),
            ("MSFT", 300.0),
            ("TSLA", 800.0),
            ("AMZN", 3000.0),
            ("NVDA", 900.0),
        ]
        .into_iter()
        .map(|(symbol, price)| (symbol.to_string(), price))
        .collect();

        StockConfig {
            api_url: "https://query1.finance.yahoo.com".to_string(),
            symbols: ["AAPL", "GOOGL", "MSFT", "TSLA", "AMZN", "NVDA"]
                .into_iter()
                .map(String::from)
                .collect(),
            base_prices,
            default_base_price: 100.0,
            jitter: 10.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsConfig {
    pub page_url: String,
    pub max_headlines: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        NewsConfig {
            page_url: "https://news.ycombinator.com/".to_string(),
            max_headlines: 10,
        }
    }
}

/// Without an `api_url` the crypto feed only produces synthetic quotes.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CryptoConfig {
    pub api_url: Option<String>,
}
