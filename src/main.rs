use anyhow::Result;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sysmonitor::*;

#[tokio::main]
async fn main() -> Result<()> {
    let app_config = config::AppConfig::load()?;
    let _log_guard = logging::init(Path::new(&app_config.storage.log_dir))?;
    let monitoring = &app_config.monitoring;

    let log = Arc::new(
        daily_log::DailyLog::open(
            &app_config.storage.log_dir,
            app_config.storage.archive_after_days,
        )
        .map_err(|e| anyhow::anyhow!("log directory: {}", e))?,
    );
    match log.archive_old() {
        Ok(report) => tracing::info!(
            moved = report.moved.len(),
            skipped = report.skipped,
            failed = report.failed,
            "startup archival pass"
        ),
        Err(e) => tracing::error!(error = %e, "startup archival pass failed"),
    }

    let provider: Arc<dyn provider::MetricsProvider> = Arc::new(provider::SysinfoProvider::new());
    let sampler = Arc::new(Mutex::new(sampler::Sampler::new(
        provider,
        monitoring.link_capacity_mbps,
        monitoring.smoothing_window,
    )));
    let store = Arc::new(retention::RetentionStore::new(
        monitoring.short_window_capacity,
        monitoring.long_window_hours,
    ));
    let history = Arc::new(history::HistoryIndex::new(
        log.clone(),
        Duration::from_secs(app_config.history.date_index_refresh_secs),
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let collector_handle = collector::spawn(
        collector::CollectorDeps {
            sampler,
            store: store.clone(),
            log: log.clone(),
            shutdown_rx,
        },
        collector::CollectorConfig {
            sample_interval_ms: monitoring.sample_interval_ms,
            stats_log_interval_secs: monitoring.stats_log_interval_secs,
        },
    );

    let app = routes::app(monitor::Monitor::new(store, history));
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        log_dir = %log.layout().log_dir().display(),
        "Listening on http://{}",
        addr
    );

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let _ = collector_handle.await;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
