use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use tempfile::tempdir;

fn httpcall(base_url: &str) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("httpcall"));
    cmd.env_remove("HTTPCALL_TIMEOUT")
        .env_remove("HTTPCALL_RELEASE")
        .arg("--base-url")
        .arg(base_url);
    cmd
}

#[test]
fn test_get_prints_payload() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/items/1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":1}"#)
        .create();

    httpcall(&server.url())
        .arg("get")
        .arg("/items/1")
        .arg("--release")
        .assert()
        .success()
        .stdout(predicates::str::contains(r#""id": 1"#));

    mock.assert();
}

#[test]
fn test_not_found_fails_with_status() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/items/1")
        .with_status(404)
        .with_body(r#"{"error":"not found"}"#)
        .create();

    httpcall(&server.url())
        .arg("get")
        .arg("/items/1")
        .arg("--release")
        .assert()
        .failure()
        .stderr(predicates::str::contains("404"));

    mock.assert();
}

#[test]
fn test_logging_goes_to_stderr_unless_release() {
    let mut server = Server::new();
    let _mock = server
        .mock("DELETE", "/items/1")
        .with_status(200)
        .with_body("{}")
        .expect(2)
        .create();

    httpcall(&server.url())
        .env("RUST_LOG", "info")
        .arg("delete")
        .arg("/items/1")
        .arg("--service")
        .arg("items-api")
        .assert()
        .success()
        .stderr(predicates::str::contains("[items-api] --> DELETE"));

    httpcall(&server.url())
        .env("RUST_LOG", "info")
        .arg("delete")
        .arg("/items/1")
        .arg("--service")
        .arg("items-api")
        .arg("--release")
        .assert()
        .success()
        .stderr(predicates::str::contains("items-api").not());
}

#[test]
fn test_release_is_silent_even_at_debug_level() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/secret-path")
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(2)
        .create();

    for filter in ["info", "debug"] {
        httpcall(&server.url())
            .env("RUST_LOG", filter)
            .arg("get")
            .arg("/secret-path")
            .arg("--release")
            .assert()
            .success()
            .stderr(predicates::str::is_empty());
    }
}

#[test]
fn test_default_filter_hides_trace_spans() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/items")
        .with_status(200)
        .with_body("{}")
        .create();

    httpcall(&server.url())
        .env_remove("RUST_LOG")
        .arg("get")
        .arg("/items")
        .assert()
        .success()
        .stderr(predicates::str::contains("--> GET"))
        .stderr(predicates::str::contains("send;").not());
}

#[test]
fn test_post_sends_headers() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/users")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_header("authorization", "Bearer abc")
        .match_body(Matcher::Json(serde_json::json!({"name": "a"})))
        .with_status(201)
        .with_body(r#"{"id":7}"#)
        .create();

    httpcall(&server.url())
        .arg("post")
        .arg("/users")
        .arg("--data")
        .arg(r#"{"name":"a"}"#)
        .arg("-H")
        .arg("Authorization=Bearer abc")
        .arg("--release")
        .assert()
        .success()
        .stdout(predicates::str::contains(r#""id": 7"#));

    mock.assert();
}

#[test]
fn test_only_header_replaces_defaults() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/ping")
        .match_header("x-api-key", "k")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("{}")
        .create();

    httpcall(&server.url())
        .arg("get")
        .arg("/ping")
        .arg("-H")
        .arg("Authorization=Bearer abc")
        .arg("--only-header")
        .arg("X-Api-Key=k")
        .arg("--release")
        .assert()
        .success();

    mock.assert();
}

#[test]
fn test_multipart_upload() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/upload")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="title""#.to_string()),
            Matcher::Regex("quarterly".to_string()),
            Matcher::Regex(r#"filename="report.txt""#.to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"stored":true}"#)
        .create();

    let dir = tempdir().unwrap();
    let report = dir.path().join("report.txt");
    std::fs::write(&report, "numbers").unwrap();

    httpcall(&server.url())
        .arg("multipart")
        .arg("/upload")
        .arg("--field")
        .arg("title=quarterly")
        .arg("--file")
        .arg(format!("doc={}", report.display()))
        .arg("--release")
        .assert()
        .success()
        .stdout(predicates::str::contains(r#""stored": true"#));

    mock.assert();
}

#[test]
fn test_multipart_missing_file_fails_cleanly() {
    let server = Server::new();
    let dir = tempdir().unwrap();

    httpcall(&server.url())
        .arg("multipart")
        .arg("/upload")
        .arg("--file")
        .arg(format!("doc={}", dir.path().join("missing.txt").display()))
        .arg("--release")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Failed to open file"));
}

#[test]
fn test_invalid_post_data_fails() {
    let server = Server::new();

    httpcall(&server.url())
        .arg("post")
        .arg("/users")
        .arg("--data")
        .arg("not json")
        .arg("--release")
        .assert()
        .failure()
        .stderr(predicates::str::contains("--data must be a JSON object"));
}
