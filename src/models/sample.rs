// Point-in-time host metrics

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One collection tick. All metric fields are percentages in `[0, 100]`.
///
/// `timestamp` is local wall-clock time; the daily logs carry no offset, so
/// neither does the sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub cpu: f64,
    pub ram: f64,
    pub net: f64,
    pub gpu0: f64,
    pub gpu1: f64,
    pub gpu2: f64,
}

impl Sample {
    /// GPU loads in device order.
    pub fn gpus(&self) -> [f64; 3] {
        [self.gpu0, self.gpu1, self.gpu2]
    }
}
