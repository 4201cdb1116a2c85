use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::types::DataOrigin;

pub const MAX_HEADLINES: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsDigest {
    /// Count reported by the source; may exceed `headlines.len()`.
    pub item_count: usize,
    pub headlines: Vec<String>,
    pub collected_at: DateTime<Utc>,
    pub origin: DataOrigin,
}

impl NewsDigest {
    pub fn new(item_count: usize, mut headlines: Vec<String>, origin: DataOrigin) -> Self {
        headlines.truncate(MAX_HEADLINES);
        NewsDigest {
            item_count,
            headlines,
            collected_at: Utc::now(),
            origin,
        }
    }
}
