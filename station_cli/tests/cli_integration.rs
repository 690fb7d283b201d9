use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::Command;
use std::thread;
use tempfile::tempdir;

// Fast, deterministic config: no pacing, no cooldown, no glitches.
fn write_config(dir: &tempfile::TempDir, endpoint: &str, extra: &str) -> PathBuf {
    let toml = format!(
        r#"
[sensors]
sample_count = 3
sampling_interval_ms = 0

[cycle]
cooldown_s = 0

[network]
endpoint = "{endpoint}"
device_id = "cli-test"
timeout_ms = 2000
max_retries = 1
retry_pause_ms = 0

[simulation]
seed = 11
glitch_rate = 0.0

{extra}
"#
    );
    let path = dir.path().join("station.toml");
    fs::write(&path, toml).unwrap();
    path
}

/// Endpoint on which nothing listens.
fn dead_endpoint() -> String {
    let l = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = l.local_addr().unwrap();
    drop(l);
    format!("http://{addr}/api/data")
}

/// Answer `n` requests with 200 and an empty body.
fn ok_server(n: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/api/data", listener.local_addr().unwrap());
    thread::spawn(move || {
        for _ in 0..n {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut len = 0usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    len = v.trim().parse().unwrap_or(0);
                }
            }
            let mut body = vec![0u8; len];
            let _ = reader.read_exact(&mut body);
            let mut stream = stream;
            let _ = write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            );
        }
    });
    url
}

fn station() -> Command {
    Command::cargo_bin("station").unwrap()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["run", "--cycles", "1", "--dry-run"], 0, "skipped (dry run)", "stdout")]
#[case(&["run", "--cycles", "0"], 2, "invalid value", "stderr")]
#[case(&["self-check"], 0, "temperature    ok", "stdout")]
#[case(&["run", "--cycles", "1"], 3, "No report reached", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, &dead_endpoint(), "");

    let mut cmd = station();
    cmd.arg("--config").arg(&cfg).arg("--log-level").arg("warn");
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        _ => {
            assert.stderr(predicate::str::contains(needle));
        }
    }
}

#[test]
fn dry_run_report_text_has_every_section() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, &dead_endpoint(), "");
    station()
        .args(["--config"])
        .arg(&cfg)
        .args(["run", "--cycles", "1", "--dry-run"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("== report cli-test @")
                .and(predicate::str::contains("pressure"))
                .and(predicate::str::contains("forecast"))
                .and(predicate::str::contains("comfort")),
        );
}

#[test]
fn json_run_emits_one_line_per_cycle_with_wire_keys() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, &dead_endpoint(), "");
    let out = station()
        .arg("--config")
        .arg(&cfg)
        .args(["--json", "--log-level", "error", "run", "--cycles", "2", "--dry-run"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    assert_eq!(lines.len(), 2, "{stdout}");
    for line in lines {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        let payload = v["payload"].as_object().unwrap();
        for key in [
            "temp", "humi", "pres", "soil", "ptrend", "ah", "dew", "rain", "comfort", "desc",
            "device_id", "timestamp",
        ] {
            assert!(payload.contains_key(key), "missing {key}");
        }
        assert_eq!(payload["device_id"], "cli-test");
        assert_eq!(v["delivery"]["status"], "skipped");
    }
}

#[test]
fn run_delivers_to_live_endpoint() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, &ok_server(1), "");
    station()
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--cycles", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("upload       delivered"));
}

#[test]
fn invalid_config_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[sensors]\nsample_count = 0\n").unwrap();
    station()
        .arg("--config")
        .arg(&path)
        .args(["run", "--cycles", "1", "--dry-run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("sensors.sample_count must be >= 1"));
}

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    station()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("show-config")
        .assert()
        .code(2);
}

#[test]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[[bands]]\nid = \"tropical\"\n").unwrap();
    let out = station()
        .arg("--config")
        .arg(&path)
        .args(["--json", "show-config"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8(out.stderr).unwrap();
    let v: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert_eq!(v["reason"], "Config");
}

#[test]
fn self_check_fails_on_unusable_reading() {
    let dir = tempdir().unwrap();
    let cfg = write_config(
        &dir,
        &dead_endpoint(),
        "[bounds]\ntemperature = { min = 90.0, max = 95.0 }\n",
    );
    station()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("temperature    FAIL"))
        .stderr(predicate::str::contains("temperature sensor"));
}

#[test]
fn show_config_round_trips_through_toml() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, &dead_endpoint(), "");
    let out = station()
        .arg("--config")
        .arg(&cfg)
        .arg("show-config")
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    let v: toml::Value = toml::from_str(&text).unwrap();
    assert_eq!(v["sensors"]["sample_count"].as_integer(), Some(3));
    assert_eq!(v["network"]["device_id"].as_str(), Some("cli-test"));
    // Defaults are filled in for sections the file omits.
    assert_eq!(v["bands"].as_array().map(Vec::len), Some(4));
}
