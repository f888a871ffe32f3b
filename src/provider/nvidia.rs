// GPU utilization via nvidia-smi. A host without the binary has no GPUs.

use super::GpuReading;
use crate::error::{CollectError, Result};
use std::io::ErrorKind;
use std::process::Command;

const NVIDIA_SMI: &str = "nvidia-smi";

pub(super) fn query_gpu_loads() -> Result<Vec<GpuReading>> {
    let output = match Command::new(NVIDIA_SMI)
        .args([
            "--query-gpu=utilization.gpu",
            "--format=csv,noheader,nounits",
        ])
        .output()
    {
        Ok(o) => o,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(CollectError::acquisition("gpu_list", e)),
    };
    if !output.status.success() {
        return Err(CollectError::acquisition(
            "gpu_list",
            format!(
                "{NVIDIA_SMI} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        ));
    }
    Ok(parse_utilization(&String::from_utf8_lossy(&output.stdout)))
}

/// One utilization percentage per line, e.g. `"37\n0\n"`. Devices reporting
/// `[N/A]` or `[Not Supported]` read as idle and keep their slot.
fn parse_utilization(stdout: &str) -> Vec<GpuReading> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
        .map(|(index, l)| match l.parse::<f64>() {
            Ok(pct) if pct.is_finite() => GpuReading { load: pct / 100.0 },
            _ => {
                tracing::debug!(index, value = l, "gpu utilization unavailable");
                GpuReading { load: 0.0 }
            }
        })
        .collect()
}
