use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::types::DataOrigin;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    pub temperature: f64,  // °C
    pub humidity: f64,     // %
    pub pressure: f64,     // hPa
    pub condition: String,
    pub collected_at: DateTime<Utc>,
    pub origin: DataOrigin,
}
