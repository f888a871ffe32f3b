// Metrics provider: raw host readings consumed by the sampler.
// The sampler only sees the trait; SysinfoProvider is the production source.

mod nvidia;

use crate::error::{CollectError, Result};
use std::sync::Mutex;
use sysinfo::{Networks, System};
use tracing::instrument;

/// Cumulative interface byte counters, summed over all interfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

impl NetCounters {
    /// Bytes moved since `prev`. A counter that went backwards (interface
    /// reset, device removed) contributes zero.
    pub fn delta_since(&self, prev: &NetCounters) -> u64 {
        self.bytes_sent.saturating_sub(prev.bytes_sent)
            + self.bytes_recv.saturating_sub(prev.bytes_recv)
    }
}

/// One GPU device; `load` is a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuReading {
    pub load: f64,
}

/// Source of raw host readings. Calls may block; callers run them off the
/// async runtime.
pub trait MetricsProvider: Send + Sync {
    fn cpu_percent(&self) -> Result<f64>;
    fn ram_percent(&self) -> Result<f64>;
    fn net_io_counters(&self) -> Result<NetCounters>;
    fn gpu_list(&self) -> Result<Vec<GpuReading>>;
}

pub struct SysinfoProvider {
    sys: Mutex<System>,
    networks: Mutex<Networks>,
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoProvider {
    pub fn new() -> Self {
        let mut sys = System::new();
        // Baseline for the first usage delta.
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        let networks = Networks::new_with_refreshed_list();
        Self {
            sys: Mutex::new(sys),
            networks: Mutex::new(networks),
        }
    }

    fn lock_sys(&self, operation: &'static str) -> Result<std::sync::MutexGuard<'_, System>> {
        self.sys
            .lock()
            .map_err(|e| CollectError::acquisition(operation, format!("sysinfo lock poisoned: {e}")))
    }
}

impl MetricsProvider for SysinfoProvider {
    /// Usage since the previous call; the first call reads close to 0.
    #[instrument(skip(self), fields(provider = "sysinfo", operation = "cpu_percent"))]
    fn cpu_percent(&self) -> Result<f64> {
        let mut sys = self.lock_sys("cpu_percent")?;
        sys.refresh_cpu_usage();
        Ok((sys.global_cpu_usage() as f64).clamp(0.0, 100.0))
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "ram_percent"))]
    fn ram_percent(&self) -> Result<f64> {
        let mut sys = self.lock_sys("ram_percent")?;
        sys.refresh_memory();
        let total = sys.total_memory();
        let used = total.saturating_sub(sys.available_memory());
        Ok(if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        })
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "net_io_counters"))]
    fn net_io_counters(&self) -> Result<NetCounters> {
        let mut networks = self.networks.lock().map_err(|e| {
            CollectError::acquisition(
                "net_io_counters",
                format!("sysinfo networks lock poisoned: {e}"),
            )
        })?;
        networks.refresh(true);
        Ok(networks
            .list()
            .values()
            .fold(NetCounters::default(), |acc, data| NetCounters {
                bytes_sent: acc.bytes_sent + data.total_transmitted(),
                bytes_recv: acc.bytes_recv + data.total_received(),
            }))
    }

    #[instrument(skip(self), fields(provider = "nvidia-smi", operation = "gpu_list"))]
    fn gpu_list(&self) -> Result<Vec<GpuReading>> {
        nvidia::query_gpu_loads()
    }
}
