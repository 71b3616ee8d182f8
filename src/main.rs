//! Container startup gate.
//!
//! ```text
//!   args + gate.toml + GATE_* env
//!              │
//!              ▼
//!      ┌───────────────┐     ┌─────────────────────────────┐
//!      │    config     │────▶│ observability (log, metrics)│
//!      └───────┬───────┘     └─────────────────────────────┘
//!              ▼
//!      ┌───────────────┐  probe  ┌──────────────┐
//!      │ await deps    │────────▶│ redis:6379   │  backoff + deadline
//!      │ (sequential)  │────────▶│ mongodb:27017│  per dependency
//!      └───────┬───────┘         └──────────────┘
//!              ▼
//!      ┌───────────────┐
//!      │ health page   │  public/health.html (+ copy into dist/)
//!      └───────┬───────┘
//!              ▼
//!      ┌───────────────┐
//!      │ dispatch mode │  dev | build | serve  → exit with child's status
//!      └───────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use startup_gate::config::{resolve_config, ConfigOverrides, DependencyCheck};
use startup_gate::error::exit_codes;
use startup_gate::lifecycle::dispatch::DEFAULT_GRACE;
use startup_gate::lifecycle::signals::spawn_signal_listener;
use startup_gate::lifecycle::{run_gate, Shutdown, StartupMode};
use startup_gate::observability::{init_logging, metrics};

#[derive(Parser)]
#[command(name = "startup-gate", version)]
#[command(about = "Wait for service dependencies, then start the application", long_about = None)]
struct Cli {
    /// Startup mode: dev, build or serve. Anything else runs serve.
    mode: Option<String>,

    /// Path to a TOML config file.
    #[arg(short, long, env = "GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Dependency to wait for, as host:port or label=host:port.
    /// Repeatable; replaces the configured list.
    #[arg(short = 'd', long = "dependency", value_name = "SPEC")]
    dependencies: Vec<DependencyCheck>,

    /// Per-dependency deadline in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log format: pretty or json.
    #[arg(long)]
    log_format: Option<String>,

    /// Do not write the health page.
    #[arg(long)]
    no_health_page: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        dependencies: (!cli.dependencies.is_empty()).then(|| cli.dependencies.clone()),
        timeout_secs: cli.timeout_secs,
        log_format: cli.log_format.clone(),
    };

    let mut config = match resolve_config(cli.config.as_deref(), |key| std::env::var(key).ok(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("startup-gate: {}", e);
            return to_exit_code(exit_codes::CONFIG);
        }
    };
    if cli.no_health_page {
        config.health_page.enabled = false;
    }

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("startup-gate: failed to initialize logging: {}", e);
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "startup-gate starting");

    // Validation already rejected an unparseable address when metrics are on.
    if let Some(addr) = config.observability.metrics_listen_addr() {
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics exporter");
        }
    }

    let mode = StartupMode::from_arg(cli.mode.as_deref());

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    match run_gate(&config, mode, &shutdown, DEFAULT_GRACE).await {
        Ok(code) => to_exit_code(code),
        Err(e) => {
            tracing::error!(error = %e, "Startup gate failed");
            to_exit_code(e.exit_code())
        }
    }
}

fn to_exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
