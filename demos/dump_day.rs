// Print one day of logged samples as JSON.
//
// Usage: cargo run --example dump_day -- [LOG_DIR] [YYYY-MM-DD]
//   LOG_DIR  default: ./logs
//   DATE     default: today

use std::env;
use std::sync::Arc;
use sysmonitor::daily_log::{DEFAULT_ARCHIVE_AFTER_DAYS, DailyLog};
use sysmonitor::history::{DEFAULT_DATE_INDEX_REFRESH, HistoryIndex};
use sysmonitor::models::SeriesPayload;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let log_dir = args.get(1).map(String::as_str).unwrap_or("./logs");
    let today = chrono::Local::now().date_naive();
    let date = match args.get(2) {
        Some(s) => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")?,
        None => today,
    };

    // Read-only: no header, archive dir or date index is written.
    let log = Arc::new(DailyLog::attach(log_dir, DEFAULT_ARCHIVE_AFTER_DAYS, today));
    let history = HistoryIndex::new(log, DEFAULT_DATE_INDEX_REFRESH);
    let rows = history.query(date);

    println!(
        "{}",
        serde_json::to_string_pretty(&SeriesPayload::from(rows.as_slice()))?
    );
    Ok(())
}
