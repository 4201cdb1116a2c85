use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed { consecutive_failures: u32 },
    Open { tripped_at: Instant },
}

/// Per-source breaker. While open, live fetches are skipped and the feed
/// goes straight to its synthetic generator.
#[derive(Debug)]
pub struct SourceBreaker {
    source: &'static str,
    state: Mutex<BreakerState>,
    failure_threshold: u32,
    cooldown: Duration,
}

impl SourceBreaker {
    pub fn new(source: &'static str, failure_threshold: u32, cooldown: Duration) -> Self {
        SourceBreaker {
            source,
            state: Mutex::new(BreakerState::Closed { consecutive_failures: 0 }),
            failure_threshold,
            cooldown,
        }
    }

    /// A threshold of zero disables the breaker.
    pub fn disabled(source: &'static str) -> Self {
        Self::new(source, 0, Duration::ZERO)
    }

    /// After the cooldown the next call is let through; its outcome decides
    /// whether the breaker closes or re-opens.
    pub fn is_allowed(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            BreakerState::Closed { .. } => true,
            BreakerState::Open { tripped_at } => {
                if tripped_at.elapsed() >= self.cooldown {
                    tracing::info!(source = self.source, "Circuit breaker half-open, retrying live fetch");
                    // one more failure re-opens it
                    *state = BreakerState::Closed {
                        consecutive_failures: self.failure_threshold.saturating_sub(1),
                    };
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();
        if let BreakerState::Closed { consecutive_failures } = *state {
            if consecutive_failures > 0 {
                tracing::info!(source = self.source, "Live fetch recovered");
            }
        }
        *state = BreakerState::Closed { consecutive_failures: 0 };
    }

    pub fn record_failure(&self) {
        if self.failure_threshold == 0 {
            return;
        }

        let mut state = self.state.lock();
        if let BreakerState::Closed { consecutive_failures } = *state {
            let failures = consecutive_failures + 1;
            if failures >= self.failure_threshold {
                tracing::warn!(
                    source = self.source,
                    failures,
                    cooldown_secs = self.cooldown.as_secs(),
                    "Circuit breaker tripped, serving synthetic data"
                );
                *state = BreakerState::Open { tripped_at: Instant::now() };
            } else {
                *state = BreakerState::Closed { consecutive_failures: failures };
            }
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.state.lock(), BreakerState::Open { .. })
    }

    pub fn reset(&self) {
        *self.state.lock() = BreakerState::Closed { consecutive_failures: 0 };
        tracing::info!(source = self.source, "Circuit breaker reset");
    }
}
