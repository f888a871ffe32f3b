// Daily log CSV schema. Writer and parser both go through this table so the
// column order and names live in one place.

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::models::Sample;

pub const TIMESTAMP_HEADER: &str = "Timestamp";

/// `2024-01-01 01:05:09 PM`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p";

/// Formats the parser also accepts (hand-edited or exported files).
const ALT_TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A numeric column: header text and the sample field it carries.
pub struct MetricColumn {
    pub header: &'static str,
    pub value: fn(&Sample) -> f64,
}

/// Metric columns in file order, after the timestamp.
pub const METRIC_COLUMNS: [MetricColumn; 6] = [
    MetricColumn {
        header: "CPU(%)",
        value: |s| s.cpu,
    },
    MetricColumn {
        header: "RAM(%)",
        value: |s| s.ram,
    },
    MetricColumn {
        header: "NET(%)",
        value: |s| s.net,
    },
    MetricColumn {
        header: "GPU0(%)",
        value: |s| s.gpu0,
    },
    MetricColumn {
        header: "GPU1(%)",
        value: |s| s.gpu1,
    },
    MetricColumn {
        header: "GPU2(%)",
        value: |s| s.gpu2,
    },
];

pub fn header() -> Vec<&'static str> {
    std::iter::once(TIMESTAMP_HEADER)
        .chain(METRIC_COLUMNS.iter().map(|c| c.header))
        .collect()
}

/// One data row: timestamp then every metric with two decimals.
pub fn format_row(sample: &Sample) -> Vec<String> {
    std::iter::once(sample.timestamp.format(TIMESTAMP_FORMAT).to_string())
        .chain(
            METRIC_COLUMNS
                .iter()
                .map(|c| format!("{:.2}", (c.value)(sample))),
        )
        .collect()
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    std::iter::once(TIMESTAMP_FORMAT)
        .chain(ALT_TIMESTAMP_FORMATS)
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Date of a timestamp-ish cell; also accepts a bare `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw)
        .map(|ts| ts.date())
        .or_else(|| NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok())
}

/// Picks the column holding row dates: `Timestamp` if present, otherwise the
/// first header mentioning "time" or "date".
pub fn find_time_column(headers: &StringRecord) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim() == TIMESTAMP_HEADER)
        .or_else(|| {
            headers.iter().position(|h| {
                let h = h.to_lowercase();
                h.contains("time") || h.contains("date")
            })
        })
}

/// Column positions of a parsed header row.
#[derive(Debug, Clone, Copy)]
pub struct RowLayout {
    timestamp: usize,
    metrics: [usize; 6],
}

impl RowLayout {
    /// Maps headers to positions. `Err` carries the first missing column name.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, &'static str> {
        let position = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(name)
        };
        let timestamp = position(TIMESTAMP_HEADER)?;
        let mut metrics = [0usize; 6];
        for (slot, column) in metrics.iter_mut().zip(METRIC_COLUMNS.iter()) {
            *slot = position(column.header)?;
        }
        Ok(Self { timestamp, metrics })
    }

    /// `None` for rows with a bad timestamp or a non-numeric metric.
    pub fn parse(&self, record: &StringRecord) -> Option<Sample> {
        let timestamp = parse_timestamp(record.get(self.timestamp)?)?;
        let mut values = [0.0f64; 6];
        for (value, &idx) in values.iter_mut().zip(self.metrics.iter()) {
            *value = record.get(idx)?.trim().parse().ok()?;
        }
        let [cpu, ram, net, gpu0, gpu1, gpu2] = values;
        Some(Sample {
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
