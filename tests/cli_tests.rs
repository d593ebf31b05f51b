use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bulletin_cmd(endpoint: &str, db_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bulletin").unwrap();
    cmd.env("BULLETIN_ENDPOINT", endpoint)
        .env("BULLETIN_DB_PATH", db_path.to_str().unwrap())
        .env_remove("NOTEBROOK_URL")
        .env_remove("NOTEBROOK_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// Serve each body as a 200 JSON response to one connection, in order.
/// The crate's own canned server is `cfg(test)` only, so it is not visible here.
fn serve_bodies(bodies: Vec<&'static str>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for body in bodies {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{}/api/annonces_publiees", addr)
}

/// An endpoint on a port nothing listens on
fn unreachable_endpoint() -> String {
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    format!("http://127.0.0.1:{}/api/annonces_publiees", port)
}

const FIRST_BATCH: &str = r#"[{"id": 1, "titre": "Fête de la musique"}, {"id": 2, "titre": "Travaux rue de Noyon"}]"#;
const SECOND_BATCH: &str = r#"{"publiees": [{"id": 1, "titre": "Fête de la musique"}, {"id": 2, "titre": "Travaux rue de Noyon"}, {"id": 3, "titre": "Marché de Noël"}]}"#;

#[test]
fn test_help_shows_skip_notify_flag() {
    Command::cargo_bin("bulletin")
        .unwrap()
        .arg("sync")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--skip-notify"));
}

#[test]
fn test_help_shows_dry_run_flag() {
    Command::cargo_bin("bulletin")
        .unwrap()
        .arg("sync")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_missing_endpoint_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    Command::cargo_bin("bulletin")
        .unwrap()
        .arg("status")
        .env_remove("BULLETIN_ENDPOINT")
        .env("BULLETIN_DB_PATH", db_path.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("BULLETIN_ENDPOINT"));
}

#[test]
fn test_status_on_fresh_database() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    bulletin_cmd("http://localhost:9/feed", &db_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No announcements recorded yet"));
}

#[test]
fn test_first_sync_records_baseline_then_notifies_new() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let endpoint = serve_bodies(vec![FIRST_BATCH, SECOND_BATCH]);

    bulletin_cmd(&endpoint, &db_path)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Baseline recorded: 2 announcements"))
        .stdout(predicate::str::contains("[NOTIFY]").not());

    bulletin_cmd(&endpoint, &db_path)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 new announcements"))
        .stdout(predicate::str::contains("[3] Marché de Noël"))
        .stdout(predicate::str::contains("[NOTIFY] New announcements: Marché de Noël"));

    bulletin_cmd(&endpoint, &db_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Known announcements: 3"))
        .stdout(predicate::str::contains("Ids: 1, 2, 3"));
}

#[test]
fn test_dry_run_does_not_record() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let endpoint = serve_bodies(vec![FIRST_BATCH]);

    bulletin_cmd(&endpoint, &db_path)
        .arg("sync")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetching announcements"))
        .stdout(predicate::str::contains("Dry run complete"))
        .stdout(predicate::str::contains("skip-notify mode").not());

    bulletin_cmd(&endpoint, &db_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No announcements recorded yet"));
}

#[test]
fn test_skip_notify_takes_precedence_and_records() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let endpoint = serve_bodies(vec![FIRST_BATCH]);

    bulletin_cmd(&endpoint, &db_path)
        .arg("sync")
        .arg("--dry-run")
        .arg("--skip-notify")
        .assert()
        .success()
        .stdout(predicate::str::contains("skip-notify mode"));

    bulletin_cmd(&endpoint, &db_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Known announcements: 2"));
}

#[test]
fn test_reset_clears_recorded_state() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let endpoint = serve_bodies(vec![FIRST_BATCH]);

    bulletin_cmd(&endpoint, &db_path).arg("sync").assert().success();

    bulletin_cmd(&endpoint, &db_path)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded announcements cleared"));

    bulletin_cmd(&endpoint, &db_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No announcements recorded yet"));
}

#[test]
fn test_list_prints_announcements() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let endpoint = serve_bodies(vec![
        r#"[{"id": 4, "titre": "Concert", "epingle": true, "adresses": "Théâtre\nPlace d'Armes"}]"#,
    ]);

    bulletin_cmd(&endpoint, &db_path)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("[4] Concert (pinned)"))
        .stdout(predicate::str::contains("at: Place d'Armes"));
}

#[test]
fn test_sync_against_unreachable_endpoint_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    bulletin_cmd(&unreachable_endpoint(), &db_path)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_watch_stops_after_max_polls() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let endpoint = serve_bodies(vec![FIRST_BATCH]);

    bulletin_cmd(&endpoint, &db_path)
        .arg("watch")
        .arg("--max-polls")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopped after 1 polls"));
}
