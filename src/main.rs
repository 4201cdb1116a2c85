use std::sync::Arc;
use std::time::Duration;
use pulseboard::aggregator::{DataManager, Snapshot};
use pulseboard::config::loader::AppConfig;
use pulseboard::observability::metrics::register_metrics;
use pulseboard::observability::tracing::init_tracing;
use pulseboard::scheduler::{UpdateScheduler, SCHEDULER_TASK};
use pulseboard::utils::task_supervisor::TaskSupervisor;
use pulseboard::{APP_ENV_VAR, DEFAULT_APP_ENV};
use tracing::{info, warn};

const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(60);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var(APP_ENV_VAR).unwrap_or_else(|_| DEFAULT_APP_ENV.to_string());
    let config = AppConfig::load(&env)?;

    init_tracing(&config.logging);
    register_metrics()?;
    info!(env = %env, symbols = ?config.stocks.symbols, "Starting pulseboard");

    let manager = Arc::new(DataManager::from_config(&config)?);
    let mut supervisor = TaskSupervisor::new();

    let scheduler = UpdateScheduler::new(Arc::clone(&manager), config.scheduler.update_interval());
    let handle = scheduler.start(&mut supervisor).await;
    supervisor.spawn(
        "snapshot_reporter",
        report_snapshots(Arc::clone(&manager), config.scheduler.report_interval()),
    );

    let mut health = tokio::time::interval(HEALTH_CHECK_INTERVAL);
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                break;
            }
            _ = health.tick() => {
                if let Err(e) = supervisor.check_health() {
                    warn!("{}", e);
                }
            }
        }
    }

    info!("Shutdown requested");
    handle.shutdown();
    if let Err(e) = supervisor.wait_for_task(SCHEDULER_TASK, SHUTDOWN_GRACE).await {
        warn!("{}", e);
    }
    supervisor.shutdown_all();
    Ok(())
}

/// Stand-in for the display layer: read the snapshot on its own cadence.
async fn report_snapshots(manager: Arc<DataManager>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        log_snapshot(&manager.get_latest());
    }
}

fn log_snapshot(snapshot: &Snapshot) {
    if snapshot.is_empty() {
        info!("No data collected yet");
        return;
    }

    if let Some(w) = &snapshot.weather {
        info!(
            city = %w.city,
            origin = %w.origin,
            "Weather: {:.1}°C, {:.0}% humidity, {:.0} hPa, {}",
            w.temperature, w.humidity, w.pressure, w.condition
        );
    }
    for q in &snapshot.stocks {
        info!(
            origin = %q.origin,
            "{}: {:.2} ({:+.2}, {:+.2}%), volume {}",
            q.symbol, q.price, q.change, q.change_percent, q.volume
        );
    }
    if let Some(n) = &snapshot.news {
        info!(
            origin = %n.origin,
            "News: {} items, latest: {}",
            n.item_count,
            n.headlines.first().map(String::as_str).unwrap_or("-")
        );
    }
    if let Some(c) = &snapshot.crypto {
        info!(origin = %c.origin, "BTC: ${:.2} ({:+.2}% 24h)", c.price, c.change_24h);
    }
}
