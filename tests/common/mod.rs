//! Shared utilities for integration tests.

use std::path::Path;
use std::time::Duration;

use startup_gate::config::{CommandConfig, DependencyCheck, GateConfig};
use tokio::net::TcpListener;

/// Start a dependency that accepts and immediately drops connections.
pub async fn start_mock_dependency(label: &str) -> DependencyCheck {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            drop(socket);
        }
    });

    DependencyCheck::new(label, "127.0.0.1", port)
}

/// Reserve a port, release it and start listening on it after `delay`.
#[allow(dead_code)]
pub async fn start_delayed_dependency(label: &str, delay: Duration) -> DependencyCheck {
    let port = free_port().await;

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
        while let Ok((socket, _)) = listener.accept().await {
            drop(socket);
        }
    });

    DependencyCheck::new(label, "127.0.0.1", port)
}

/// A port nothing listens on.
pub async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Config with fast retries whose mode commands record the mode in `dir/ran`.
pub fn gate_config(dir: &Path, dependencies: Vec<DependencyCheck>) -> GateConfig {
    let mut config = GateConfig::default();
    config.dependencies = dependencies;
    config.wait.connect_timeout_ms = 200;
    config.wait.base_delay_ms = 20;
    config.wait.max_delay_ms = 100;
    config.wait.max_attempts = 5;
    config.wait.timeout_secs = 5;
    config.wait.jitter = false;

    let marker = dir.join("ran").to_string_lossy().into_owned();
    config.modes.dev = record_mode("dev", &marker);
    config.modes.build = record_mode("build", &marker);
    config.modes.serve = record_mode("serve", &marker);

    config.health_page.path = dir.join("public/health.html").to_string_lossy().into_owned();
    config.health_page.build_dir = dir.join("dist").to_string_lossy().into_owned();
    config
}

fn record_mode(mode: &str, marker: &str) -> CommandConfig {
    CommandConfig::new("sh", ["-c".to_string(), format!("printf {} >> '{}'", mode, marker)])
}
