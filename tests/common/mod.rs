// Shared test helpers
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use sysmonitor::error::{CollectError, Result};
use sysmonitor::models::Sample;
use sysmonitor::provider::{GpuReading, MetricsProvider, NetCounters};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn ts(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, mi, s).unwrap()
}

pub fn sample(timestamp: NaiveDateTime, cpu: f64) -> Sample {
    Sample {
        timestamp,
        cpu,
        ram: 40.0,
        net: 1.5,
        gpu0: 0.0,
        gpu1: 0.0,
        gpu2: 0.0,
    }
}

pub const HEADER: &str = "Timestamp,CPU(%),RAM(%),NET(%),GPU0(%),GPU1(%),GPU2(%)";

/// Writes a log file from raw lines (header included by the caller).
pub fn write_lines(path: &Path, lines: &[&str]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut body = lines.join("\n");
    body.push('\n');
    std::fs::write(path, body).unwrap();
}

/// Provider with fixed CPU/RAM/GPU readings and a steady traffic counter.
pub struct FakeProvider {
    pub cpu: f64,
    pub ram: f64,
    pub gpu_loads: Vec<f64>,
    pub bytes_per_call: u64,
    pub fail: AtomicBool,
    sent: AtomicU64,
}

impl FakeProvider {
    pub fn new(cpu: f64, ram: f64, gpu_loads: Vec<f64>) -> Self {
        Self {
            cpu,
            ram,
            gpu_loads,
            bytes_per_call: 0,
            fail: AtomicBool::new(false),
            sent: AtomicU64::new(0),
        }
    }

    pub fn with_traffic(mut self, bytes_per_call: u64) -> Self {
        self.bytes_per_call = bytes_per_call;
        self
    }

    pub fn failing() -> Self {
        let p = Self::new(0.0, 0.0, vec![]);
        p.fail.store(true, Ordering::SeqCst);
        p
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CollectError::Acquisition {
                operation,
                message: "provider offline".into(),
            });
        }
        Ok(())
    }
}

impl MetricsProvider for FakeProvider {
    fn cpu_percent(&self) -> Result<f64> {
        self.check("cpu_percent")?;
        Ok(self.cpu)
    }

    fn ram_percent(&self) -> Result<f64> {
        self.check("ram_percent")?;
        Ok(self.ram)
    }

    fn net_io_counters(&self) -> Result<NetCounters> {
        self.check("net_io_counters")?;
        let total = self.sent.fetch_add(self.bytes_per_call, Ordering::SeqCst) + self.bytes_per_call;
        Ok(NetCounters {
            bytes_sent: total,
            bytes_recv: 0,
        })
    }

    fn gpu_list(&self) -> Result<Vec<GpuReading>> {
        self.check("gpu_list")?;
        Ok(self
            .gpu_loads
            .iter()
            .map(|&load| GpuReading { load })
            .collect())
    }
}
