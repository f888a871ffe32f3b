// Background collection loop: sample -> rotate -> record -> append, then
// sleep a fixed interval. Per-iteration failures are logged and the loop
// carries on; only the shutdown signal ends it.

use crate::daily_log::DailyLog;
use crate::error::{CollectError, Result};
use crate::models::Sample;
use crate::retention::RetentionStore;
use crate::sampler::Sampler;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant};
use tracing::Instrument;

pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 4000;

/// Shared components and the shutdown signal for the loop.
pub struct CollectorDeps {
    pub sampler: Arc<Mutex<Sampler>>,
    pub store: Arc<RetentionStore>,
    pub log: Arc<DailyLog>,
    /// Firing or dropping the sender stops the loop after the current
    /// iteration.
    pub shutdown_rx: oneshot::Receiver<()>,
}

pub struct CollectorConfig {
    /// Sleep after each iteration, regardless of how long the work took.
    pub sample_interval_ms: u64,
    /// How often to log collection counters at INFO level.
    pub stats_log_interval_secs: u64,
}

/// One collection tick. Provider reads and file I/O run on blocking threads;
/// the store lock is only taken for the record itself.
pub async fn run_iteration(
    sampler: &Arc<Mutex<Sampler>>,
    store: &RetentionStore,
    log: &Arc<DailyLog>,
) -> Result<Sample> {
    let sampler = sampler.clone();
    let sample = tokio::task::spawn_blocking(move || {
        sampler
            .lock()
            .map_err(|e| CollectError::acquisition("sample", format!("sampler lock poisoned: {e}")))?
            .sample()
    })
    .await??;
    store_sample(sample, store, log).await?;
    Ok(sample)
}

/// Rotate, record, append. Rotation follows the sample's own date so a row
/// stamped 23:59:59 and written after midnight still lands in its day's file.
pub async fn store_sample(
    sample: Sample,
    store: &RetentionStore,
    log: &Arc<DailyLog>,
) -> Result<()> {
    let rotate_log = log.clone();
    let day = sample.timestamp.date();
    if tokio::task::spawn_blocking(move || rotate_log.rotate_if_day_changed(day)).await?? {
        tracing::debug!(active_date = %log.active_date(), "collector switched to new log file");
    }

    store.record(sample);

    let append_log = log.clone();
    tokio::task::spawn_blocking(move || append_log.append(&sample)).await??;
    Ok(())
}

pub fn spawn(deps: CollectorDeps, config: CollectorConfig) -> tokio::task::JoinHandle<()> {
    let CollectorDeps {
        sampler,
        store,
        log,
        mut shutdown_rx,
    } = deps;
    let CollectorConfig {
        sample_interval_ms,
        stats_log_interval_secs,
    } = config;
    let interval = Duration::from_millis(sample_interval_ms);
    let stats_log_interval = Duration::from_secs(stats_log_interval_secs);
    let span = tracing::debug_span!("collector", sample_interval_ms);

    tokio::spawn(
        async move {
            tracing::info!("collection loop started");
            let mut samples_total: u64 = 0;
            let mut failures_total: u64 = 0;
            let mut last_stats_log = Instant::now();

            loop {
                match run_iteration(&sampler, &store, &log).await {
                    Ok(sample) => {
                        samples_total += 1;
                        tracing::trace!(?sample, "sample collected");
                    }
                    Err(e @ CollectError::Acquisition { .. }) => {
                        failures_total += 1;
                        tracing::warn!(error = %e, operation = "sample", "sample dropped");
                    }
                    Err(e) => {
                        failures_total += 1;
                        tracing::error!(error = %e, operation = "collect", "collection iteration failed");
                    }
                }

                if last_stats_log.elapsed() >= stats_log_interval {
                    tracing::info!(
                        samples_total,
                        failures_total,
                        short_window = store.len(crate::retention::Window::Short),
                        long_window = store.len(crate::retention::Window::Long),
                        "collector stats"
                    );
                    last_stats_log = Instant::now();
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = &mut shutdown_rx => {
                        tracing::debug!("collector shutting down");
                        break;
                    }
                }
            }
        }
        .instrument(span),
    )
}
