use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::types::DataOrigin;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuote {
    pub price: f64,
    pub change_24h: f64,  // percent
    pub collected_at: DateTime<Utc>,
    pub origin: DataOrigin,
}
