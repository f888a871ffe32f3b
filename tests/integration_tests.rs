// Integration tests: HTTP endpoints over a Monitor backed by temp logs

mod common;

use axum_test::TestServer;
use chrono::Local;
use common::{HEADER, sample, write_lines};
use std::sync::Arc;
use std::time::Duration;
use sysmonitor::daily_log::DailyLog;
use sysmonitor::history::HistoryIndex;
use sysmonitor::models::{Sample, SeriesPayload};
use sysmonitor::monitor::Monitor;
use sysmonitor::retention::RetentionStore;
use sysmonitor::routes;
use tempfile::TempDir;

fn test_server() -> (TestServer, TempDir, Arc<RetentionStore>) {
    let dir = TempDir::new().unwrap();
    let log = Arc::new(DailyLog::open(dir.path(), 30).unwrap());
    let history = Arc::new(HistoryIndex::new(log, Duration::from_secs(60)));
    let store = Arc::new(RetentionStore::new(3, 6));
    let app = routes::app(Monitor::new(store.clone(), history));
    (TestServer::try_new(app).unwrap(), dir, store)
}

#[tokio::test]
async fn test_version_endpoint() {
    let (server, _dir, _store) = test_server();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("sysmonitor")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_current_is_404_before_first_sample() {
    let (server, _dir, _store) = test_server();
    let response = server.get("/api/current").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_current_returns_latest_sample() {
    let (server, _dir, store) = test_server();
    let now = Local::now().naive_local();
    store.record(sample(now, 10.0));
    store.record(sample(now, 20.0));
    let response = server.get("/api/current").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    for key in ["timestamp", "cpu", "ram", "net", "gpu0", "gpu1", "gpu2"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    let current: Sample = serde_json::from_value(json).unwrap();
    assert_eq!(current.cpu, 20.0);
}

#[tokio::test]
async fn test_short_history_is_columnar_and_bounded() {
    let (server, _dir, store) = test_server();
    let now = Local::now().naive_local();
    for i in 0..5 {
        store.record(sample(now, f64::from(i)));
    }
    let response = server.get("/api/short-history").await;
    response.assert_status_ok();
    let series: SeriesPayload = response.json();
    assert_eq!(series.cpu, vec![2.0, 3.0, 4.0]);
    assert_eq!(series.time.len(), 3);
    assert_eq!(series.gpu2.len(), 3);

    let long: SeriesPayload = server.get("/api/long-history").await.json();
    assert_eq!(long.len(), 5);
}

#[tokio::test]
async fn test_log_data_for_date() {
    let (server, dir, _store) = test_server();
    write_lines(
        &dir.path().join("system_stats_2024-01-01.csv"),
        &[
            HEADER,
            "2024-01-01 02:00:00 PM,2,0,0,0,0,0",
            "2024-01-01 01:00:00 PM,1,0,0,0,0,0",
        ],
    );
    let response = server.get("/api/log-data/2024-01-01").await;
    response.assert_status_ok();
    let series: SeriesPayload = response.json();
    assert_eq!(series.cpu, vec![1.0, 2.0]);
    assert_eq!(series.time[0], "2024-01-01T13:00:00");
}

#[tokio::test]
async fn test_log_data_missing_date_is_404() {
    let (server, _dir, _store) = test_server();
    let response = server.get("/api/log-data/2001-01-01").await;
    response.assert_status_not_found();
    let json: serde_json::Value = response.json();
    assert!(
        json["error"]
            .as_str()
            .is_some_and(|e| e.contains("2001-01-01"))
    );
}

#[tokio::test]
async fn test_log_data_rejects_bad_date() {
    let (server, _dir, _store) = test_server();
    let response = server.get("/api/log-data/yesterday").await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_available_dates() {
    let (server, dir, _store) = test_server();
    write_lines(
        &dir.path().join("archive/2024-01/system_stats_2024-01-15.csv"),
        &[HEADER, "2024-01-15 10:00:00 AM,1,0,0,0,0,0"],
    );
    write_lines(
        &dir.path().join("system_stats_2024-01-01.csv"),
        &[HEADER, "2024-01-01 10:00:00 AM,1,0,0,0,0,0"],
    );

    let response = server.get("/api/available-dates").await;
    response.assert_status_ok();
    let dates: Vec<String> = response.json();
    assert_eq!(dates, vec!["2024-01-01", "2024-01-15"]);
}
