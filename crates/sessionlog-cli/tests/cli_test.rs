use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use sessionlog_testing::TestWorld;

fn build_world() -> TestWorld {
    TestWorld::new()
        .with_session(
            "build-1",
            &[
                json!({"id": "e2", "name": "compile", "created": "2024-06-01T12:00:05Z", "level": "warning",
                       "resolved": {"kind": "text", "value": "3 warnings in src/lib.rs"}}),
                json!({"id": "e1", "name": "start", "created": "2024-06-01T12:00:00Z", "level": "debug"}),
                json!({"id": "e3", "name": "link", "created": "2024-06-01T12:00:09Z", "category": "linker"}),
            ],
        )
        .with_session("build-2", &[json!({"name": "other"})])
}

#[test]
fn test_sessions_lists_keys() {
    let world = build_world();
    let root = world.log_root().display().to_string();

    let mut cmd = cargo_bin_cmd!("sessionlog");
    world
        .configure_command(&mut cmd)
        .args(["sessions", "--root", &root])
        .assert()
        .success()
        .stdout("build-1\nbuild-2\n");
}

#[test]
fn test_sessions_json() {
    let world = build_world();
    let root = world.log_root().display().to_string();

    let mut cmd = cargo_bin_cmd!("sessionlog");
    let output = world
        .configure_command(&mut cmd)
        .args(["sessions", "--root", &root, "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["key"], "build-1");
    assert_eq!(rows[0]["resource"], "local://build-1");
    assert_eq!(rows.as_array().unwrap().len(), 2);
}

#[test]
fn test_dump_prints_chronological_events() {
    let world = build_world();
    let root = world.log_root().display().to_string();

    let mut cmd = cargo_bin_cmd!("sessionlog");
    let output = world
        .configure_command(&mut cmd)
        .args(["dump", "--root", &root, "--session", "build-1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("DEBUG   start #e1"));
    assert!(lines[1].contains("WARNING compile #e2"));
    assert!(lines[2].contains("INFO    link (linker) #e3"));
}

#[test]
fn test_dump_min_level_json() {
    let world = build_world();
    let root = world.log_root().display().to_string();

    let mut cmd = cargo_bin_cmd!("sessionlog");
    let output = world
        .configure_command(&mut cmd)
        .args([
            "dump",
            "--root",
            &root,
            "--session",
            "local://build-1",
            "--min-level",
            "info",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let events: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["compile", "link"]);
    assert_eq!(events[0]["session_resource"], "local://build-1");
}

#[test]
fn test_dump_skips_malformed_lines() {
    let world = TestWorld::new();
    std::fs::write(
        world.log_root().join("broken.jsonl"),
        "{\"name\": \"ok\"}\nnot json\n{\"missing\": \"name\"}\n",
    )
    .unwrap();
    let root = world.log_root().display().to_string();

    let mut cmd = cargo_bin_cmd!("sessionlog");
    world
        .configure_command(&mut cmd)
        .args(["dump", "--root", &root, "--session", "broken"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"))
        .stderr(predicate::str::contains("skipping malformed record"));
}

#[test]
fn test_dump_unknown_session_is_empty() {
    let world = build_world();
    let root = world.log_root().display().to_string();

    let mut cmd = cargo_bin_cmd!("sessionlog");
    world
        .configure_command(&mut cmd)
        .args(["dump", "--root", &root, "--session", "missing"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_dump_rejects_path_traversal() {
    let world = build_world();
    let root = world.log_root().display().to_string();

    let mut cmd = cargo_bin_cmd!("sessionlog");
    world
        .configure_command(&mut cmd)
        .args(["dump", "--root", &root, "--session", ".."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid session key"));
}

#[test]
fn test_dump_respects_configured_scope() {
    let world = build_world().with_config("local_schemes = [\"file\"]\n");
    let root = world.log_root().display().to_string();

    let mut cmd = cargo_bin_cmd!("sessionlog");
    world
        .configure_command(&mut cmd)
        .args(["dump", "--root", &root, "--session", "build-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the configured scope"));
}

#[test]
fn test_resolve_prints_content() {
    let world = build_world();
    let root = world.log_root().display().to_string();

    let mut cmd = cargo_bin_cmd!("sessionlog");
    world
        .configure_command(&mut cmd)
        .args(["resolve", "--root", &root, "--id", "e2"])
        .assert()
        .success()
        .stdout("3 warnings in src/lib.rs\n");
}

#[test]
fn test_resolve_unknown_id_fails() {
    let world = build_world();
    let root = world.log_root().display().to_string();

    let mut cmd = cargo_bin_cmd!("sessionlog");
    world
        .configure_command(&mut cmd)
        .args(["resolve", "--root", &root, "--id", "e1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no provider resolved event 'e1'"));
}

#[test]
fn test_invalid_config_is_reported() {
    let world = build_world().with_config("capacity = \"lots\"\n");
    let root = world.log_root().display().to_string();

    let mut cmd = cargo_bin_cmd!("sessionlog");
    world
        .configure_command(&mut cmd)
        .args(["sessions", "--root", &root])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
