// Tracing setup: human-readable stdout plus a persistent `sysmonitor.log` in
// the log directory, both stamped with local time.

use anyhow::Context;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub const APP_LOG_PREFIX: &str = "sysmonitor";
pub const APP_LOG_SUFFIX: &str = "log";

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// Non-blocking appender for `<log_dir>/sysmonitor.log`. Never rotated; the
/// daily CSV files are the rotating artifact. Keep the guard alive to flush.
pub fn file_writer(log_dir: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(APP_LOG_PREFIX)
        .filename_suffix(APP_LOG_SUFFIX)
        .build(log_dir)
        .with_context(|| format!("opening app log in {}", log_dir.display()))?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`.
pub fn init(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (writer, guard) = file_writer(log_dir)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_timer(LocalTimer))
        .with(
            fmt::layer()
                .with_timer(LocalTimer)
                .with_ansi(false)
                .with_writer(writer),
        )
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(guard)
}
