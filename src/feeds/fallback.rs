use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn, Instrument};
use crate::config::FetchConfig;
use crate::error::{Error, FailureCategory, Result};
use crate::feeds::circuit_breaker::SourceBreaker;
use crate::feeds::SourceAdapter;
use crate::observability::metrics::{BREAKER_SKIPS, FETCH_FAILURES, FETCH_TOTAL};
use crate::observability::tracing::source_span;
use crate::types::DataOrigin;

#[derive(Clone, Copy, Debug)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub retries: u32,
    pub backoff: Duration,
}

impl FetchPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        FetchPolicy {
            timeout: config.timeout(),
            retries: config.retries,
            backoff: Duration::from_millis(250),
        }
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        FetchPolicy::from_config(&FetchConfig::default())
    }
}

#[derive(Debug)]
pub struct Fetched<R> {
    pub record: R,
    pub origin: DataOrigin,
    /// Why the live path was abandoned, when it was.
    pub failure: Option<FailureCategory>,
}

/// Never fails: live attempts are bounded by `policy.timeout`, retried on
/// transient errors, and replaced by a synthetic record once exhausted or
/// while the breaker is open.
pub async fn fetch_with_fallback<A>(
    adapter: &A,
    policy: &FetchPolicy,
    breaker: &SourceBreaker,
) -> Fetched<A::Record>
where
    A: SourceAdapter + ?Sized,
{
    let source = adapter.kind().as_str();

    let failure = if adapter.live_enabled() {
        match attempt_live(adapter, policy, breaker).await {
            Ok(record) => {
                FETCH_TOTAL.with_label_values(&[source, DataOrigin::Live.as_str()]).inc();
                return Fetched {
                    record,
                    origin: DataOrigin::Live,
                    failure: None,
                };
            }
            Err(err) => {
                let category = err.category();
                match err {
                    Error::CircuitOpen(_) => {
                        debug!(source, "Breaker open, skipping live fetch");
                        BREAKER_SKIPS.with_label_values(&[source]).inc();
                    }
                    err => {
                        warn!(source, category = %category, error = %err, "Live fetch failed, using synthetic data");
                        FETCH_FAILURES.with_label_values(&[source, category.as_str()]).inc();
                    }
                }
                Some(category)
            }
        }
    } else {
        None
    };

    let record = {
        let mut rng = rand::thread_rng();
        adapter.synthesize(&mut rng)
    };
    FETCH_TOTAL.with_label_values(&[source, DataOrigin::Synthetic.as_str()]).inc();

    Fetched {
        record,
        origin: DataOrigin::Synthetic,
        failure,
    }
}

async fn attempt_live<A>(adapter: &A, policy: &FetchPolicy, breaker: &SourceBreaker) -> Result<A::Record>
where
    A: SourceAdapter + ?Sized,
{
    let source = adapter.kind().as_str();
    if !breaker.is_allowed() {
        return Err(Error::CircuitOpen(source));
    }

    let mut attempt = 0;
    loop {
        let result = match timeout(policy.timeout, adapter.fetch_live()).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(policy.timeout)),
        };

        match result {
            Ok(record) => {
                breaker.record_success();
                return Ok(record);
            }
            Err(err) if err.is_retryable() && attempt < policy.retries => {
                attempt += 1;
                debug!(source, attempt, error = %err, "Retrying live fetch");
                sleep(policy.backoff * attempt).await;
            }
            Err(err) => {
                breaker.record_failure();
                return Err(err);
            }
        }
    }
}

/// An adapter bundled with its breaker and fetch policy. Cheap to clone so
/// each cycle can move it into its own task.
pub struct Feed<A: SourceAdapter + ?Sized> {
    adapter: Arc<A>,
    breaker: Arc<SourceBreaker>,
    policy: FetchPolicy,
}

impl<A: SourceAdapter + ?Sized> Clone for Feed<A> {
    fn clone(&self) -> Self {
        Feed {
            adapter: Arc::clone(&self.adapter),
            breaker: Arc::clone(&self.breaker),
            policy: self.policy,
        }
    }
}

impl<A: SourceAdapter + ?Sized> Feed<A> {
    pub fn new(adapter: Arc<A>, policy: FetchPolicy, breaker: SourceBreaker) -> Self {
        Feed {
            adapter,
            breaker: Arc::new(breaker),
            policy,
        }
    }

    /// Feed with a breaker built from the shared fetch settings.
    pub fn with_config(adapter: Arc<A>, config: &FetchConfig) -> Self {
        let breaker = SourceBreaker::new(
            adapter.kind().as_str(),
            config.breaker_failure_threshold,
            config.breaker_cooldown(),
        );
        Feed::new(adapter, FetchPolicy::from_config(config), breaker)
    }

    pub async fn fetch(&self) -> Fetched<A::Record> {
        let span = source_span(self.adapter.kind().as_str());
        fetch_with_fallback(self.adapter.as_ref(), &self.policy, &self.breaker)
            .instrument(span)
            .await
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn breaker(&self) -> &SourceBreaker {
        &self.breaker
    }
}
