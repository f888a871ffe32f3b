// Columnar series for dashboards (one array per metric, index-aligned).

use serde::{Deserialize, Serialize};

use super::Sample;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesPayload {
    /// ISO-8601 local timestamps.
    pub time: Vec<String>,
    pub cpu: Vec<f64>,
    pub ram: Vec<f64>,
    pub net: Vec<f64>,
    pub gpu0: Vec<f64>,
    pub gpu1: Vec<f64>,
    pub gpu2: Vec<f64>,
}

impl From<&[Sample]> for SeriesPayload {
    fn from(samples: &[Sample]) -> Self {
        let mut out = SeriesPayload {
            time: Vec::with_capacity(samples.len()),
            cpu: Vec::with_capacity(samples.len()),
            ram: Vec::with_capacity(samples.len()),
            net: Vec::with_capacity(samples.len()),
            gpu0: Vec::with_capacity(samples.len()),
            gpu1: Vec::with_capacity(samples.len()),
            gpu2: Vec::with_capacity(samples.len()),
        };
        for s in samples {
            out.time
                .push(s.timestamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
            out.cpu.push(s.cpu);
            out.ram.push(s.ram);
            out.net.push(s.net);
            out.gpu0.push(s.gpu0);
            out.gpu1.push(s.gpu1);
            out.gpu2.push(s.gpu2);
        }
        out
    }
}
