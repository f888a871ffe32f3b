// DailyLog tests: header idempotence, append format, rotation, archival

mod common;

use common::{HEADER, date, sample, ts, write_lines};
use sysmonitor::daily_log::{DailyLog, LogLayout, date_from_file_name};
use tempfile::TempDir;

fn read(path: &std::path::Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn open_creates_directories_and_header() {
    let dir = TempDir::new().unwrap();
    let log_dir = dir.path().join("logs");
    let log = DailyLog::open_at(&log_dir, 30, date(2024, 1, 1)).unwrap();

    assert!(log_dir.join("archive").is_dir());
    assert_eq!(
        log.active_path(),
        log_dir.join("system_stats_2024-01-01.csv")
    );
    assert_eq!(read(&log.active_path()), format!("{HEADER}\n"));
}

#[test]
fn ensure_header_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("system_stats_2024-01-01.csv");
    std::fs::write(&path, "").unwrap();

    assert!(DailyLog::ensure_header(&path).unwrap());
    assert!(!DailyLog::ensure_header(&path).unwrap());
    assert_eq!(read(&path).lines().filter(|l| *l == HEADER).count(), 1);

    // Populated file stays untouched.
    std::fs::write(&path, format!("{HEADER}\n2024-01-01 09:00:00 AM,1,2,3,4,5,6\n")).unwrap();
    assert!(!DailyLog::ensure_header(&path).unwrap());
    assert_eq!(read(&path).lines().count(), 2);
}

#[test]
fn append_writes_fixed_column_rows() {
    let dir = TempDir::new().unwrap();
    let log = DailyLog::open_at(dir.path(), 30, date(2024, 1, 1)).unwrap();
    let mut s = sample(ts(2024, 1, 1, 13, 5, 9), 12.0);
    s.gpu1 = 33.333;
    log.append(&s).unwrap();
    log.append(&sample(ts(2024, 1, 1, 0, 0, 4), 1.0)).unwrap();

    let body = read(&log.active_path());
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(
        lines,
        vec![
            HEADER,
            "2024-01-01 01:05:09 PM,12.00,40.00,1.50,0.00,33.33,0.00",
            "2024-01-01 12:00:04 AM,1.00,40.00,1.50,0.00,0.00,0.00",
        ]
    );
}

#[test]
fn append_rewrites_header_when_file_was_removed() {
    let dir = TempDir::new().unwrap();
    let log = DailyLog::open_at(dir.path(), 30, date(2024, 1, 1)).unwrap();
    std::fs::remove_file(log.active_path()).unwrap();
    log.append(&sample(ts(2024, 1, 1, 9, 0, 0), 5.0)).unwrap();
    let body = read(&log.active_path());
    assert!(body.starts_with(HEADER));
    assert_eq!(body.lines().count(), 2);
}

#[test]
fn rotation_creates_new_day_file_and_keeps_previous() {
    let dir = TempDir::new().unwrap();
    let log = DailyLog::open_at(dir.path(), 30, date(2024, 1, 1)).unwrap();
    log.append(&sample(ts(2024, 1, 1, 23, 59, 58), 1.0)).unwrap();
    let before = read(&dir.path().join("system_stats_2024-01-01.csv"));

    assert!(!log.rotate_if_day_changed(date(2024, 1, 1)).unwrap());
    assert!(log.rotate_if_day_changed(date(2024, 1, 2)).unwrap());

    assert_eq!(log.active_date(), date(2024, 1, 2));
    let new_path = dir.path().join("system_stats_2024-01-02.csv");
    assert_eq!(log.active_path(), new_path);
    assert_eq!(read(&new_path), format!("{HEADER}\n"));
    assert_eq!(
        read(&dir.path().join("system_stats_2024-01-01.csv")),
        before
    );

    log.append(&sample(ts(2024, 1, 2, 0, 0, 2), 2.0)).unwrap();
    assert_eq!(read(&new_path).lines().count(), 2);
    assert_eq!(read(&dir.path().join("system_stats_2024-01-01.csv")), before);
}

#[test]
fn rotation_archives_files_past_threshold() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("system_stats_2023-11-15.csv");
    write_lines(&old, &[HEADER]);
    let log = DailyLog::open_at(dir.path(), 30, date(2024, 1, 1)).unwrap();

    log.rotate_if_day_changed(date(2024, 1, 2)).unwrap();
    assert!(!old.exists());
    assert!(
        dir.path()
            .join("archive/2023-11/system_stats_2023-11-15.csv")
            .is_file()
    );
}

#[test]
fn archive_moves_only_files_older_than_threshold() {
    let dir = TempDir::new().unwrap();
    let log = DailyLog::open_at(dir.path(), 30, date(2024, 2, 1)).unwrap();
    let old = dir.path().join("system_stats_2023-01-01.csv");
    let recent = dir.path().join("system_stats_2024-01-20.csv");
    write_lines(&old, &[HEADER, "2023-01-01 10:00:00 AM,1,1,1,1,1,1"]);
    write_lines(&recent, &[HEADER]);
    let old_body = read(&old);

    let report = log.archive_old_at(date(2024, 2, 1), 30).unwrap();

    let archived = dir.path().join("archive/2023-01/system_stats_2023-01-01.csv");
    assert_eq!(report.moved, vec![archived.clone()]);
    assert!(!old.exists());
    assert_eq!(read(&archived), old_body);
    assert!(recent.is_file());
    assert!(log.active_path().is_file());
}

#[test]
fn archive_boundary_is_strictly_older() {
    let dir = TempDir::new().unwrap();
    let log = DailyLog::open_at(dir.path(), 30, date(2024, 2, 1)).unwrap();
    // 2024-02-01 minus 30 days.
    let at_cutoff = dir.path().join("system_stats_2024-01-02.csv");
    let past_cutoff = dir.path().join("system_stats_2024-01-01.csv");
    write_lines(&at_cutoff, &[HEADER]);
    write_lines(&past_cutoff, &[HEADER]);

    let report = log.archive_old_at(date(2024, 2, 1), 30).unwrap();
    assert_eq!(report.moved.len(), 1);
    assert!(at_cutoff.is_file());
    assert!(!past_cutoff.exists());
}

#[test]
fn archive_skips_unexpected_file_names() {
    let dir = TempDir::new().unwrap();
    let log = DailyLog::open_at(dir.path(), 30, date(2024, 2, 1)).unwrap();
    let odd = dir.path().join("system_stats_backup.csv");
    let other = dir.path().join("notes.csv");
    write_lines(&odd, &[HEADER]);
    write_lines(&other, &["a,b"]);

    let report = log.archive_old_at(date(2024, 2, 1), 30).unwrap();
    assert!(report.moved.is_empty());
    assert_eq!(report.skipped, 1);
    assert!(odd.is_file());
    assert!(other.is_file());
}

#[test]
fn archive_continues_past_a_failed_move() {
    let dir = TempDir::new().unwrap();
    let log = DailyLog::open_at(dir.path(), 30, date(2024, 2, 1)).unwrap();
    let blocked = dir.path().join("system_stats_2023-01-05.csv");
    let movable = dir.path().join("system_stats_2023-02-10.csv");
    write_lines(&blocked, &[HEADER]);
    write_lines(&movable, &[HEADER]);
    // A plain file where the 2023-01 month directory should go.
    std::fs::write(dir.path().join("archive/2023-01"), "").unwrap();

    let report = log.archive_old_at(date(2024, 2, 1), 30).unwrap();

    assert_eq!(report.failed, 1);
    assert!(blocked.is_file());
    let archived = dir.path().join("archive/2023-02/system_stats_2023-02-10.csv");
    assert_eq!(report.moved, vec![archived.clone()]);
    assert!(archived.is_file());
    assert!(!movable.exists());
}

#[test]
fn attach_leaves_directory_untouched() {
    let dir = TempDir::new().unwrap();
    let log_dir = dir.path().join("logs");
    let log = DailyLog::attach(&log_dir, 30, date(2024, 1, 1));

    assert!(!log_dir.exists());
    assert_eq!(log.active_path(), log_dir.join("system_stats_2024-01-01.csv"));

    std::fs::create_dir(&log_dir).unwrap();
    let _ = DailyLog::attach(&log_dir, 30, date(2024, 1, 1));
    assert_eq!(std::fs::read_dir(&log_dir).unwrap().count(), 0);
}

#[test]
fn layout_paths_follow_naming_convention() {
    let layout = LogLayout::new("/var/log/sysmon");
    let d = date(2024, 3, 7);
    assert_eq!(
        layout.archive_path(d),
        std::path::PathBuf::from("/var/log/sysmon/archive/2024-03/system_stats_2024-03-07.csv")
    );
    assert_eq!(date_from_file_name(&LogLayout::file_name(d)).unwrap(), d);
}
