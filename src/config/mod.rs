use std::time::Duration;
use serde::{Deserialize, Serialize};

pub mod sources;
pub mod history;
pub mod loader;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub update_interval_secs: u64,
    pub report_interval_secs: u64,
}

impl SchedulerConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            update_interval_secs: 30,
            report_interval_secs: 30,
        }
    }
}

/// Limits shared by every live fetch.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    /// Extra attempts after the first one fails.
    pub retries: u32,
    pub breaker_failure_threshold: u32,
    pub breaker_cooldown_secs: u64,
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.breaker_cooldown_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            timeout_secs: 10,
            retries: 0,
            breaker_failure_threshold: 3,
            breaker_cooldown_secs: 300,  // 5 minutes
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) pulseboard/0.1".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}
