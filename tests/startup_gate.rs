//! End-to-end tests for the startup gate.
#![cfg(unix)]

use std::fs;
use std::time::{Duration, Instant};

use startup_gate::config::{CommandConfig, DependencyCheck};
use startup_gate::error::{exit_codes, GateError};
use startup_gate::lifecycle::dispatch::DEFAULT_GRACE;
use startup_gate::lifecycle::{run_gate, Shutdown, StartupMode};

mod common;

#[tokio::test]
async fn test_each_mode_runs_only_its_command() {
    let redis = common::start_mock_dependency("redis").await;
    let mongo = common::start_mock_dependency("mongodb").await;

    for mode in StartupMode::ALL {
        let tmp = tempfile::tempdir().unwrap();
        let config = common::gate_config(tmp.path(), vec![redis.clone(), mongo.clone()]);

        let code = run_gate(&config, mode, &Shutdown::new(), DEFAULT_GRACE).await.unwrap();

        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(tmp.path().join("ran")).unwrap(), mode.as_str());
    }
}

#[tokio::test]
async fn test_unrecognized_mode_runs_serve() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::gate_config(tmp.path(), vec![]);

    let mode = StartupMode::from_arg(Some("production"));
    run_gate(&config, mode, &Shutdown::new(), DEFAULT_GRACE).await.unwrap();

    assert_eq!(fs::read_to_string(tmp.path().join("ran")).unwrap(), "serve");
}

#[tokio::test]
async fn test_unreachable_dependency_blocks_dispatch() {
    let tmp = tempfile::tempdir().unwrap();
    let up = common::start_mock_dependency("redis").await;
    let down = DependencyCheck::new("mongodb", "127.0.0.1", common::free_port().await);
    let config = common::gate_config(tmp.path(), vec![up, down]);

    let err = run_gate(&config, StartupMode::Serve, &Shutdown::new(), DEFAULT_GRACE)
        .await
        .unwrap_err();

    match &err {
        GateError::DependencyTimedOut { label, attempts, .. } => {
            assert_eq!(label, "mongodb");
            assert_eq!(*attempts, config.wait.max_attempts);
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(err.exit_code(), exit_codes::UNAVAILABLE);
    assert!(!tmp.path().join("ran").exists());
    assert!(!tmp.path().join("public/health.html").exists());
}

#[tokio::test]
async fn test_deadline_bounds_the_wait() {
    let tmp = tempfile::tempdir().unwrap();
    let down = DependencyCheck::new("db", "127.0.0.1", common::free_port().await);
    let mut config = common::gate_config(tmp.path(), vec![down]);
    config.wait.max_attempts = 1_000;
    config.wait.timeout_secs = 1;

    let started = Instant::now();
    let err = run_gate(&config, StartupMode::Dev, &Shutdown::new(), DEFAULT_GRACE)
        .await
        .unwrap_err();

    assert!(matches!(err, GateError::DependencyTimedOut { .. }));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_waits_for_late_dependency() {
    let tmp = tempfile::tempdir().unwrap();
    let late = common::start_delayed_dependency("redis", Duration::from_millis(150)).await;
    let mut config = common::gate_config(tmp.path(), vec![late]);
    config.wait.max_attempts = 50;

    let code = run_gate(&config, StartupMode::Build, &Shutdown::new(), DEFAULT_GRACE)
        .await
        .unwrap();

    assert_eq!(code, 0);
    assert_eq!(fs::read_to_string(tmp.path().join("ran")).unwrap(), "build");
}

#[tokio::test]
async fn test_health_page_copied_only_into_existing_build_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let dep = common::start_mock_dependency("redis").await;
    let config = common::gate_config(tmp.path(), vec![dep]);

    run_gate(&config, StartupMode::Serve, &Shutdown::new(), DEFAULT_GRACE).await.unwrap();
    let page = fs::read_to_string(tmp.path().join("public/health.html")).unwrap();
    assert!(page.contains(r#"id="timestamp""#));
    assert!(page.contains("redis (127.0.0.1:"));
    assert!(!tmp.path().join("dist").exists());

    fs::create_dir(tmp.path().join("dist")).unwrap();
    run_gate(&config, StartupMode::Serve, &Shutdown::new(), DEFAULT_GRACE).await.unwrap();
    assert!(tmp.path().join("dist/health.html").is_file());
}

#[tokio::test]
async fn test_child_exit_code_is_returned() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = common::gate_config(tmp.path(), vec![]);
    config.modes.serve = CommandConfig::new("sh", ["-c", "exit 3"]);

    let code = run_gate(&config, StartupMode::Serve, &Shutdown::new(), DEFAULT_GRACE)
        .await
        .unwrap();
    assert_eq!(code, 3);
}

#[tokio::test]
async fn test_missing_program_maps_to_spawn_exit_code() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = common::gate_config(tmp.path(), vec![]);
    config.health_page.enabled = false;
    config.modes.dev = CommandConfig::new("no-such-toolchain-binary", Vec::<String>::new());

    let err = run_gate(&config, StartupMode::Dev, &Shutdown::new(), DEFAULT_GRACE)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::SPAWN);
}

#[tokio::test]
async fn test_shutdown_during_wait_cancels() {
    let tmp = tempfile::tempdir().unwrap();
    let down = DependencyCheck::new("db", "127.0.0.1", common::free_port().await);
    let mut config = common::gate_config(tmp.path(), vec![down]);
    config.wait.max_attempts = 10_000;
    config.wait.timeout_secs = 60;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.trigger();
    });

    let err = run_gate(&config, StartupMode::Serve, &shutdown, DEFAULT_GRACE)
        .await
        .unwrap_err();
    assert!(matches!(err, GateError::Cancelled));
    assert_eq!(err.exit_code(), exit_codes::CANCELLED);
    assert!(!tmp.path().join("ran").exists());
}

#[tokio::test]
async fn test_shutdown_before_dispatch_skips_command() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::gate_config(tmp.path(), vec![]);

    let shutdown = Shutdown::new();
    shutdown.trigger();

    let err = run_gate(&config, StartupMode::Serve, &shutdown, DEFAULT_GRACE)
        .await
        .unwrap_err();

    assert!(matches!(err, GateError::Cancelled));
    assert_eq!(err.exit_code(), exit_codes::CANCELLED);
    assert!(!tmp.path().join("ran").exists());
    assert!(!tmp.path().join("public/health.html").exists());
}
