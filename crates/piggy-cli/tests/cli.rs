use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `piggy` isolated in a scratch directory: config, ledger and .env lookups
/// all resolve inside `dir`.
fn piggy(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("piggy").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .env("PIGGY_LEDGER_PATH", dir.join("ledger.json"))
        .env_remove("PIGGY_LLM_URL")
        .env_remove("LLM_HOST")
        .env_remove("LLM_PORT");
    cmd
}

const SUSHI_REPLY: &str = r#"[{"generated_text": "Sure! {\"expense-type\": \"wants\", \"date\": \"2024-05-20\", \"total\": \"42.5\", \"expense-name\": \"Sushi dinner\"}"}]"#;

const SUSHI_JSON: &str =
    r#"{"expense-type":"wants","date":"2024-05-20","total":"42.50","expense-name":"Sushi dinner"}"#;

/// Generation service answering `requests` connections with `reply`, one at a
/// time. Joins to the request bodies it saw.
fn generation_service(requests: usize, reply: &'static str) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut bodies = Vec::new();
        for _ in 0..requests {
            let (mut stream, _) = listener.accept().unwrap();
            bodies.push(read_request(&mut stream));
            let response = format!(
                "HTTP/1.1 200 OK\r\n\
                 content-type: application/json\r\n\
                 content-length: {}\r\n\
                 connection: close\r\n\r\n{}",
                reply.len(),
                reply
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
        bodies
    });

    (url, handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
        let length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let body_start = end + 4;
        if buf.len() >= body_start + length {
            return String::from_utf8_lossy(&buf[body_start..body_start + length]).to_string();
        }
    }
}

fn service_config(dir: &Path, base_url: &str) -> PathBuf {
    let path = dir.join("service.json");
    let config = serde_json::json!({
        "llm": {"base_url": base_url, "timeout_secs": 10, "max_retries": 0}
    });
    fs::write(&path, config.to_string()).unwrap();
    path
}

fn ledger_json(dir: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(dir.join("ledger.json")).unwrap()).unwrap()
}

/// Config pointing at a port nothing listens on, without retries.
fn unreachable_config(dir: &Path) -> PathBuf {
    let path = dir.join("unreachable.json");
    fs::write(
        &path,
        r#"{"llm": {"base_url": "http://127.0.0.1:9", "timeout_secs": 5, "max_retries": 0}}"#,
    )
    .unwrap();
    path
}

#[test]
fn config_path_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    piggy(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn config_show_prints_defaults() {
    let dir = TempDir::new().unwrap();
    piggy(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"similarity_threshold\": 0.6"))
        .stdout(predicate::str::contains("\"endpoint\": \"/prompt\""));
}

#[test]
fn config_init_set_get() {
    let dir = TempDir::new().unwrap();

    piggy(dir.path()).args(["config", "init"]).assert().success();
    piggy(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    piggy(dir.path())
        .args(["config", "set", "llm.max_retries", "3"])
        .assert()
        .success();
    piggy(dir.path())
        .args(["config", "get", "llm.max_retries"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));

    piggy(dir.path())
        .args(["config", "set", "llm.nonexistent", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn extract_fails_when_service_unreachable() {
    let dir = TempDir::new().unwrap();
    let config = unreachable_config(dir.path());
    let receipt = dir.path().join("receipt.txt");
    fs::write(&receipt, "CORNER STORE\nMILK 2.49\nTOTAL 2.49\n").unwrap();

    piggy(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("extract")
        .arg(&receipt)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unavailable"));
}

#[test]
fn extract_reads_stdin() {
    let dir = TempDir::new().unwrap();
    let config = unreachable_config(dir.path());

    piggy(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["extract", "-"])
        .write_stdin("TOTAL 9.99")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unavailable"));
}

#[test]
fn extract_prints_normalized_record() {
    let dir = TempDir::new().unwrap();
    let (url, service) = generation_service(1, SUSHI_REPLY);
    let config = service_config(dir.path(), &url);
    let receipt = dir.path().join("receipt.txt");
    fs::write(&receipt, "SUSHI BAR\nTOTAL 42.50\n").unwrap();

    piggy(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("extract")
        .arg(&receipt)
        .assert()
        .success()
        .stdout(predicate::str::contains(SUSHI_JSON));

    let bodies = service.join().unwrap();
    let sent: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
    assert!(sent["prompt"].as_str().unwrap().ends_with("SUSHI BAR\nTOTAL 42.50\n"));
    assert_eq!(sent["max_new_tokens"], 400);
}

#[test]
fn extract_records_expense_and_awards_coin() {
    let dir = TempDir::new().unwrap();
    piggy(dir.path())
        .args(["ledger", "register", "ada@example.com", "Ada", "Lovelace"])
        .assert()
        .success();

    let (url, service) = generation_service(1, SUSHI_REPLY);
    let config = service_config(dir.path(), &url);

    piggy(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["extract", "-", "--format", "csv", "--record", "ada@example.com"])
        .write_stdin("SUSHI BAR TOTAL 42.50")
        .assert()
        .success()
        .stdout(predicate::str::contains("expense-type,date,total,expense-name"))
        .stdout(predicate::str::contains("wants,2024-05-20,42.50,Sushi dinner"))
        .stdout(predicate::str::contains("Recorded expense"));
    service.join().unwrap();

    let ledger = ledger_json(dir.path());
    let account = &ledger["ada@example.com"];
    assert_eq!(account["coins"], 4);

    let expenses = account["expenses"].as_array().unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0]["expense-type"], "wants");
    assert_eq!(expenses[0]["total"], "42.50");
    assert_eq!(expenses[0]["expense-name"], "Sushi dinner");

    let id = expenses[0]["id"].as_str().unwrap();
    assert_eq!(id.len(), 36);
    assert_eq!(id.matches('-').count(), 4);
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let receipts = dir.path().join("receipts");
    fs::create_dir_all(&receipts).unwrap();
    fs::write(receipts.join("a.txt"), "SUSHI BAR 42.50").unwrap();
    fs::write(receipts.join("b.txt"), "SUSHI BAR AGAIN 42.50").unwrap();
    fs::write(receipts.join("notes.md"), "not a receipt").unwrap();

    let (url, service) = generation_service(2, SUSHI_REPLY);
    let config = service_config(dir.path(), &url);
    let out = dir.path().join("out");

    piggy(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("batch")
        .arg(receipts.join("*").to_str().unwrap())
        .args(["-j", "2", "--summary", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("2 successful, 0 failed"));
    assert_eq!(service.join().unwrap().len(), 2);

    for name in ["a.json", "b.json"] {
        assert_eq!(fs::read_to_string(out.join(name)).unwrap(), SUSHI_JSON);
    }

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let lines: Vec<_> = summary.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("filename,status,expense-type"));
    assert!(lines[1].starts_with("a.txt,success,wants,2024-05-20,42.50,Sushi dinner,"));
    assert!(lines[2].starts_with("b.txt,success,wants,2024-05-20,42.50,Sushi dinner,"));
}

#[test]
fn extract_rejects_empty_input() {
    let dir = TempDir::new().unwrap();
    let receipt = dir.path().join("blank.txt");
    fs::write(&receipt, "  \n").unwrap();

    piggy(dir.path())
        .arg("extract")
        .arg(&receipt)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No OCR text"));
}

#[test]
fn batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("*.txt");

    piggy(dir.path())
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn ledger_account_lifecycle() {
    let dir = TempDir::new().unwrap();

    piggy(dir.path())
        .args(["ledger", "register", "Ada@Example.com", "Ada", "Lovelace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ada@example.com"));

    piggy(dir.path())
        .args(["ledger", "register", "ada@example.com", "Ada", "Lovelace"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already registered"));

    piggy(dir.path())
        .args(["ledger", "rename", "ada@example.com", "Augusta", "King"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Augusta King"));

    piggy(dir.path())
        .args(["ledger", "level-up", "ada@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("level 2"));

    piggy(dir.path())
        .args(["ledger", "spend", "ada@example.com", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 left"));

    piggy(dir.path())
        .args(["ledger", "spend", "ada@example.com", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("insufficient coins"));

    piggy(dir.path())
        .args(["ledger", "budget", "ada@example.com", "250"])
        .assert()
        .success();

    piggy(dir.path())
        .args(["ledger", "show", "ada@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Account: Augusta King <ada@example.com>"))
        .stdout(predicate::str::contains("Level:   2"))
        .stdout(predicate::str::contains("Coins:   1"))
        .stdout(predicate::str::contains("Budget:  250"));

    piggy(dir.path())
        .args(["ledger", "summary", "ada@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Spent:   0"));

    assert!(dir.path().join("ledger.json").exists());

    piggy(dir.path())
        .args(["ledger", "delete", "ada@example.com"])
        .assert()
        .success();

    piggy(dir.path())
        .args(["ledger", "show", "ada@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("account not found"));
}
