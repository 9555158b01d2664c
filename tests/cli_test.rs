//! CLI integration tests.

#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("marksplit");
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("split"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_plan_prints_segment_names() {
    let mut cmd = cargo_bin_cmd!("marksplit");
    cmd.args(["plan", "song.mp3", "--at", "7", "--at", "3", "--duration", "10"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("song-segments.zip"))
        .stdout(predicate::str::contains("song000.mp3  00:00.000 - 00:03.000"))
        .stdout(predicate::str::contains("song001.mp3  00:03.000 - 00:07.000"))
        .stdout(predicate::str::contains("song002.mp3  00:07.000 - end"));
}

#[test]
fn test_plan_json_envelope() {
    let mut cmd = cargo_bin_cmd!("marksplit");
    cmd.args(["plan", "song.mp3", "--at", "1:00", "--json"]);

    let output = cmd.assert().success().get_output().stdout.clone();
    let line = String::from_utf8(output).unwrap();
    let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();

    assert_eq!(value["event"], "plan");
    assert_eq!(value["payload"]["segments"][1]["name"], "song001.mp3");
    assert_eq!(value["payload"]["segments"][1]["start"], 60.0);
    assert_eq!(value["payload"]["segments"][1]["end"], "open");
}

#[test]
fn test_plan_reads_marker_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "0:30\n# note\n1:30").unwrap();

    let mut cmd = cargo_bin_cmd!("marksplit");
    cmd.args(["plan", "podcast.mp3", "--markers"]).arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("podcast002.mp3  01:30.000 - end"));
}

#[test]
fn test_plan_without_markers_fails() {
    let mut cmd = cargo_bin_cmd!("marksplit");
    cmd.args(["plan", "song.mp3"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no markers set"));
}

#[test]
fn test_plan_rejects_malformed_marker() {
    let mut cmd = cargo_bin_cmd!("marksplit");
    cmd.args(["plan", "song.mp3", "--at", "1:99"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("below 60"));
}

#[test]
fn test_split_missing_source_fails_before_engine() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.mp3");

    let mut cmd = cargo_bin_cmd!("marksplit");
    cmd.arg("split").arg(&missing).args(["--at", "5"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no source audio loaded"));
    assert!(!dir.path().join("missing-segments.zip").exists());
}

#[test]
fn test_split_without_markers_fails() {
    let mut source = NamedTempFile::new().unwrap();
    source.write_all(b"data").unwrap();

    let mut cmd = cargo_bin_cmd!("marksplit");
    cmd.arg("split").arg(source.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no markers set"));
}

#[test]
fn test_config_path_points_to_toml() {
    let mut cmd = cargo_bin_cmd!("marksplit");
    cmd.env_remove("MARKSPLIT_CONFIG").args(["config", "path"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_honours_env_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");

    let mut cmd = cargo_bin_cmd!("marksplit");
    cmd.env("MARKSPLIT_CONFIG", &path).args(["config", "init"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[defaults]"));
}

#[test]
fn test_split_rejects_source_without_extension() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("recording");
    std::fs::write(&source, b"audio").unwrap();

    let mut cmd = cargo_bin_cmd!("marksplit");
    cmd.arg("split").arg(&source).args(["--at", "5"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("has no extension"));
}
