use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub weather_capacity: usize,
    pub stock_capacity: usize,
    pub news_capacity: usize,
    pub crypto_capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            weather_capacity: 100,
            stock_capacity: 500,
            news_capacity: 50,
            crypto_capacity: 100,
        }
    }
}
