pub mod weather;
pub mod stock;
pub mod news;
pub mod crypto;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use crypto::CryptoQuote;
pub use news::NewsDigest;
pub use stock::StockQuote;
pub use weather::WeatherRecord;

/// Where a record came from. Synthetic data is a normal steady state,
/// not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Live,
    Synthetic,
}

impl DataOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataOrigin::Live => "live",
            DataOrigin::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
