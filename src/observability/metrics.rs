use lazy_static::lazy_static;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
};
use crate::error::Result;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Cycle metrics
    pub static ref CYCLES_TOTAL: IntCounter = IntCounter::new(
        "pulseboard_cycles_total",
        "Total number of completed update cycles"
    ).expect("valid metric definition");

    pub static ref CYCLE_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "pulseboard_cycle_duration_seconds",
            "Wall time of one update cycle"
        ).buckets(vec![0.01, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0])
    ).expect("valid metric definition");

    // Source metrics
    pub static ref FETCH_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("pulseboard_fetch_total", "Records produced per source and origin"),
        &["source", "origin"]
    ).expect("valid metric definition");

    pub static ref FETCH_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("pulseboard_fetch_failures_total", "Absorbed live fetch failures"),
        &["source", "category"]
    ).expect("valid metric definition");

    pub static ref BREAKER_SKIPS: IntCounterVec = IntCounterVec::new(
        Opts::new("pulseboard_breaker_skips_total", "Live fetches skipped while the breaker was open"),
        &["source"]
    ).expect("valid metric definition");

    pub static ref SOURCE_DEFECTS: IntCounterVec = IntCounterVec::new(
        Opts::new("pulseboard_source_defects_total", "Source updates lost to an unexpected defect"),
        &["source"]
    ).expect("valid metric definition");

    // History metrics
    pub static ref HISTORY_LEN: IntGaugeVec = IntGaugeVec::new(
        Opts::new("pulseboard_history_len", "Current length of each history buffer"),
        &["source"]
    ).expect("valid metric definition");
}

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(CYCLES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CYCLE_DURATION.clone()))?;
    REGISTRY.register(Box::new(FETCH_TOTAL.clone()))?;
    REGISTRY.register(Box::new(FETCH_FAILURES.clone()))?;
    REGISTRY.register(Box::new(BREAKER_SKIPS.clone()))?;
    REGISTRY.register(Box::new(SOURCE_DEFECTS.clone()))?;
    REGISTRY.register(Box::new(HISTORY_LEN.clone()))?;
    Ok(())
}
