// Drives the compiled binary's non-interactive surface. HOME and the XDG
// dirs point into a temp dir so config, logs and sessions stay isolated.

use std::path::Path;

use assert_cmd::Command;
use paceline::session::SessionStore;
use paceline::storage::JsonSessionRepository;
use paceline::summary::summarize;
use paceline::timer::Lap;
use tempfile::tempdir;

fn paceline(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("paceline").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"));
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn prints_version() {
    let home = tempdir().unwrap();
    let out = stdout_of(paceline(home.path()).arg("--version"));
    assert!(out.starts_with("paceline "));
}

#[test]
fn sessions_on_empty_archive() {
    let home = tempdir().unwrap();
    let data = home.path().join("laps");
    let out = stdout_of(
        paceline(home.path())
            .arg("--data-dir")
            .arg(&data)
            .arg("sessions"),
    );
    assert_eq!(out.trim(), "no saved sessions");
}

#[test]
fn lists_and_exports_saved_session() {
    let home = tempdir().unwrap();
    let data = home.path().join("laps");

    let laps = [
        Lap {
            lap_time: 61_000,
            delta: 1_000,
        },
        Lap {
            lap_time: 59_500,
            delta: -500,
        },
    ];
    let mut store = SessionStore::load(Box::new(JsonSessionRepository::with_path(
        data.join("sessions.json"),
    )));
    store.save("Tempo", &laps, summarize(&laps, 1_000));

    let out = stdout_of(
        paceline(home.path())
            .arg("--data-dir")
            .arg(&data)
            .arg("sessions"),
    );
    assert!(out.contains("1. Tempo ("));
    assert!(out.contains("2 laps, Avg: 01:00.2"));

    let csv_path = home.path().join("tempo.csv");
    paceline(home.path())
        .args(["--goal", "60", "--tolerance", "1", "--data-dir"])
        .arg(&data)
        .args(["export", "1", "--out"])
        .arg(&csv_path)
        .assert()
        .success();

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(
        csv,
        "Lap #,Time,Goal,Delta (s),Status\n\
         1,01:01.0,01:00.0,1.0,ON\n\
         2,00:59.5,01:00.0,-0.5,ON"
    );
}

#[test]
fn export_of_missing_session_fails() {
    let home = tempdir().unwrap();
    paceline(home.path())
        .arg("--data-dir")
        .arg(home.path().join("laps"))
        .args(["export", "3"])
        .assert()
        .failure();
}
