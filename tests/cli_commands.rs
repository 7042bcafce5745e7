use assert_cmd::Command;
use chrono::{TimeZone, Utc};
use predicates::prelude::*;
use std::path::Path;
use tempfile::{tempdir, TempDir};

use pullups::history::{HistoryStore, SessionRecord};
use pullups::store::SqliteStore;

// Drives the non-interactive subcommands of the compiled binary.
// HOME points at a temp dir so logs and configs never touch the real one.

fn pullups(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pullups").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .arg("--config")
        .arg(home.path().join("config.json"));
    cmd
}

fn seed(db: &Path) {
    let mut store = HistoryStore::new(Box::new(SqliteStore::open(db).unwrap()));
    store
        .append(SessionRecord::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            10,
            "00:05:30",
        ))
        .unwrap();
    store
        .append(SessionRecord::new(
            Utc.with_ymd_and_hms(2024, 5, 3, 18, 0, 0).unwrap(),
            17,
            "00:09:12",
        ))
        .unwrap();
}

#[test]
fn history_on_fresh_database() {
    let home = tempdir().unwrap();
    pullups(&home)
        .arg("--db")
        .arg(home.path().join("h.db"))
        .arg("history")
        .assert()
        .success()
        .stdout("No sessions recorded yet.\n");
}

#[test]
fn history_lists_seeded_sessions() {
    let home = tempdir().unwrap();
    let db = home.path().join("h.db");
    seed(&db);

    pullups(&home)
        .arg("--db")
        .arg(&db)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("time: 00:05:30"))
        .stdout(predicate::str::contains("2 sessions, 27 pull-ups total"))
        .stdout(predicate::str::contains("best: 17"));
}

#[test]
fn history_json_is_parseable() {
    let home = tempdir().unwrap();
    let db = home.path().join("h.db");
    seed(&db);

    let output = pullups(&home)
        .arg("--db")
        .arg(&db)
        .args(["history", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: Vec<SessionRecord> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].pullups, 17);
}

#[test]
fn export_writes_csv() {
    let home = tempdir().unwrap();
    let db = home.path().join("h.db");
    let out = home.path().join("sessions.csv");
    seed(&db);

    pullups(&home)
        .arg("--db")
        .arg(&db)
        .arg("export")
        .arg(&out)
        .assert()
        .success();

    let csv = std::fs::read_to_string(&out).unwrap();
    assert_eq!(
        csv,
        "date,pullups,time\n\
         2024-05-01T09:30:00.000Z,10,00:05:30\n\
         2024-05-03T18:00:00.000Z,17,00:09:12\n"
    );
}

#[test]
fn tui_refuses_without_tty() {
    let home = tempdir().unwrap();
    pullups(&home)
        .arg("--db")
        .arg(home.path().join("h.db"))
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("stdin must be a tty"));
}

#[test]
fn config_write_saves_overrides() {
    let home = tempdir().unwrap();
    pullups(&home)
        .args(["--undo-depth", "25", "config", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"))
        .stdout(predicate::str::contains("\"undo_depth\": 25"));

    let saved = std::fs::read_to_string(home.path().join("config.json")).unwrap();
    assert!(saved.contains("\"undo_depth\": 25"));
}

#[test]
fn zero_undo_depth_is_rejected() {
    let home = tempdir().unwrap();
    pullups(&home)
        .args(["--undo-depth", "0", "history"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}
