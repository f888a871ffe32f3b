// Turns raw provider readings into one fixed-schema Sample per tick.
// CPU and RAM pass through; network throughput is derived from counter
// deltas and smoothed; GPU loads are padded to three slots.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use tracing::instrument;

use crate::error::Result;
use crate::models::Sample;
use crate::provider::{MetricsProvider, NetCounters};

pub const GPU_SLOTS: usize = 3;
pub const DEFAULT_SMOOTHING_WINDOW: usize = 3;
pub const DEFAULT_LINK_CAPACITY_MBPS: f64 = 2500.0;

/// Rolling mean over the last `capacity` raw values, clamped to 100 after
/// averaging.
#[derive(Debug, Clone)]
pub struct NetSmoother {
    buf: VecDeque<f64>,
    capacity: usize,
}

impl NetSmoother {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, raw: f64) -> f64 {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(raw);
        let mean = self.buf.iter().sum::<f64>() / self.buf.len() as f64;
        mean.min(100.0)
    }
}

/// Link utilization in percent for `bytes` moved over `elapsed_secs`.
pub fn net_percent(bytes: u64, elapsed_secs: f64, link_capacity_mbps: f64) -> f64 {
    if elapsed_secs <= 0.0 || link_capacity_mbps <= 0.0 {
        return 0.0;
    }
    let mbps = (bytes as f64 * 8.0) / elapsed_secs / 1_000_000.0;
    (mbps / link_capacity_mbps) * 100.0
}

pub struct Sampler {
    provider: Arc<dyn MetricsProvider>,
    link_capacity_mbps: f64,
    prev_net: Option<(NetCounters, Instant)>,
    smoother: NetSmoother,
}

impl Sampler {
    pub fn new(
        provider: Arc<dyn MetricsProvider>,
        link_capacity_mbps: f64,
        smoothing_window: usize,
    ) -> Self {
        Self {
            provider,
            link_capacity_mbps,
            prev_net: None,
            smoother: NetSmoother::new(smoothing_window),
        }
    }

    /// Reads the provider now. Blocking; run it on a blocking thread.
    pub fn sample(&mut self) -> Result<Sample> {
        self.sample_at(Local::now().naive_local(), Instant::now())
    }

    /// Same as [`Sampler::sample`] with explicit wall-clock stamp and
    /// monotonic instant for the throughput delta.
    #[instrument(skip(self), fields(operation = "sample"))]
    pub fn sample_at(&mut self, timestamp: NaiveDateTime, at: Instant) -> Result<Sample> {
        let cpu = self.provider.cpu_percent()?;
        let ram = self.provider.ram_percent()?;
        let counters = self.provider.net_io_counters()?;

        let raw_net = match self.prev_net {
            Some((prev, prev_at)) => net_percent(
                counters.delta_since(&prev),
                at.saturating_duration_since(prev_at).as_secs_f64(),
                self.link_capacity_mbps,
            ),
            None => 0.0,
        };
        self.prev_net = Some((counters, at));
        let net = self.smoother.push(raw_net);

        let mut gpus = [0.0f64; GPU_SLOTS];
        for (slot, gpu) in gpus.iter_mut().zip(self.provider.gpu_list()?) {
            *slot = (gpu.load * 100.0).clamp(0.0, 100.0);
        }
        let [gpu0, gpu1, gpu2] = gpus;

        Ok(Sample {
            timestamp,
            cpu,
            ram,
            net,
            gpu0,
            gpu1,
            gpu2,
        })
    }
}
