// tests/integration/error_handling.rs

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use taskgraph::config::{load_and_validate, parse_duration, ConfigFile, RawConfigFile};
use taskgraph::errors::TaskgraphError;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn empty_config_uses_defaults() {
    let file = config_file("");

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.queue.root_url, "http://taskcluster/queue");
    assert_eq!(cfg.queue.concurrency, 10);
    assert_eq!(cfg.submit_timeout(), Some(Duration::from_secs(30)));
    assert_eq!(cfg.decision.task_id_env, "TASK_ID");
}

#[test]
fn full_config_is_parsed() {
    let file = config_file(
        r#"
[queue]
root_url = "https://queue.example.com/"
concurrency = 4
timeout = "1500ms"

[decision]
task_id_env = "DECISION_TASK_ID"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.queue.root_url, "https://queue.example.com/");
    assert_eq!(cfg.queue.concurrency, 4);
    assert_eq!(cfg.submit_timeout(), Some(Duration::from_millis(1500)));

    let options = cfg.scheduler_options(Some("decision".to_string()));
    assert_eq!(options.concurrency, 4);
    assert_eq!(options.gating_id.as_deref(), Some("decision"));
    assert_eq!(options.submit_timeout, Some(Duration::from_millis(1500)));
}

#[test]
fn zero_timeout_disables_the_deadline() {
    let file = config_file(
        r#"
[queue]
timeout = "0s"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.submit_timeout(), None);
}

#[test]
fn zero_concurrency_returns_config_error() {
    let file = config_file(
        r#"
[queue]
concurrency = 0
"#,
    );

    match load_and_validate(file.path()) {
        Err(TaskgraphError::ConfigError(msg)) => assert!(msg.contains("concurrency")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn invalid_root_url_returns_config_error() {
    let file = config_file(
        r#"
[queue]
root_url = "ftp://queue.example.com"
"#,
    );

    match load_and_validate(file.path()) {
        Err(TaskgraphError::ConfigError(msg)) => assert!(msg.contains("http or https")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn bad_timeout_returns_config_error() {
    let file = config_file(
        r#"
[queue]
timeout = "soon"
"#,
    );

    match load_and_validate(file.path()) {
        Err(TaskgraphError::ConfigError(msg)) => assert!(msg.contains("[queue].timeout")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn malformed_toml_returns_toml_error() {
    let file = config_file("[queue\nroot_url = ");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(TaskgraphError::TomlError(_))
    ));
}

#[test]
fn missing_file_returns_io_error() {
    assert!(matches!(
        load_and_validate("/definitely/not/here/Taskgraph.toml"),
        Err(TaskgraphError::IoError(_))
    ));
}

#[test]
fn durations_accept_common_units() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
    assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("10d").is_err());
    assert!(parse_duration("").is_err());
}

#[test]
fn oversized_durations_are_rejected() {
    assert!(parse_duration("6000000000000000000h").is_err());
    assert!(parse_duration("600000000000000000000s").is_err());
    assert_eq!(
        parse_duration("18446744073709551615s"),
        Ok(Duration::from_secs(u64::MAX))
    );
}

#[test]
fn oversized_timeout_returns_config_error() {
    let file = config_file(
        r#"
[queue]
timeout = "6000000000000000000h"
"#,
    );

    match load_and_validate(file.path()) {
        Err(TaskgraphError::ConfigError(msg)) => assert!(msg.contains("too large")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn gating_id_comes_from_the_configured_env_var() {
    let raw = RawConfigFile {
        decision: taskgraph::config::DecisionSection {
            task_id_env: "TASKGRAPH_TEST_GATING_ID".to_string(),
        },
        ..RawConfigFile::default()
    };
    let cfg = ConfigFile::try_from(raw).unwrap();

    // SAFETY: no other test reads or writes this variable.
    unsafe { std::env::remove_var("TASKGRAPH_TEST_GATING_ID") };
    assert_eq!(cfg.gating_id_from_env(), None);

    unsafe { std::env::set_var("TASKGRAPH_TEST_GATING_ID", "  ") };
    assert_eq!(cfg.gating_id_from_env(), None);

    unsafe { std::env::set_var("TASKGRAPH_TEST_GATING_ID", "decision-task") };
    assert_eq!(cfg.gating_id_from_env(), Some("decision-task".to_string()));

    unsafe { std::env::remove_var("TASKGRAPH_TEST_GATING_ID") };
}
