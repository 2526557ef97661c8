use std::{env, fs};

use octopush_cli::config::loader::load_config;
use octopush_notifications::ReferencePolicy;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("octopush.toml");

    let toml_content = r#"
[logging]
level = "debug"

[push]
gateway_url = "http://localhost:5000/_matrix/push/v1/notify"
app_id = "org.example.ward"
request_timeout_ms = 5000
accepted_statuses = [200]
self_references = "strict"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses, unset keys keep their defaults
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.push.app_id, "org.example.ward");
    assert_eq!(cfg.push.request_timeout_ms, 5000);
    assert_eq!(cfg.push.connect_timeout_ms, 10_000);
    assert!(!cfg.push.response_policy().accepts(400));
    assert_eq!(cfg.push.self_references, ReferencePolicy::Strict);
    assert_eq!(cfg.push.routing_references, ReferencePolicy::Strict);
    assert!(cfg.push.enabled);

    // 2) Env override should win over file
    unsafe {
        env::set_var("OCTOPUSH__PUSH__REQUEST_TIMEOUT_MS", "750");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.push.request_timeout_ms, 750);
    unsafe {
        env::remove_var("OCTOPUSH__PUSH__REQUEST_TIMEOUT_MS");
    }

    // 3) Enabled push without a gateway URL should error
    let invalid_path = dir.path().join("invalid.toml");
    fs::write(&invalid_path, "[push]\napp_id = \"org.example.ward\"\n").expect("write toml");
    let err = load_config(invalid_path.to_str()).expect_err("gateway_url is required");
    assert!(err.contains("gateway_url"), "unexpected error: {err}");

    // 4) Out-of-range status codes are rejected
    let bad_status = dir.path().join("bad_status.toml");
    fs::write(
        &bad_status,
        "[push]\ngateway_url = \"http://gw/notify\"\naccepted_statuses = [200, 1000]\n",
    )
    .expect("write toml");
    let err = load_config(bad_status.to_str()).expect_err("1000 is not an HTTP status");
    assert!(err.contains("1000"), "unexpected error: {err}");
}

#[test]
fn disabled_push_needs_no_gateway() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("octopush.toml");
    fs::write(&path, "[push]\nenabled = false\n").expect("write toml");

    let cfg = load_config(path.to_str()).expect("disabled push is valid");
    assert!(!cfg.push.enabled);
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("nope.toml");
    let err = load_config(path.to_str()).expect_err("file does not exist");
    assert!(err.contains("not found"));
}
