//! Startup orchestration.
//!
//! # Responsibilities
//! - Wait for every dependency, in order, within the retry budget
//! - Publish the health page
//! - Dispatch the selected mode's command
//!
//! # Design Decisions
//! - Fail fast: the first dependency that times out ends startup
//! - Dependencies are checked sequentially, never concurrently
//! - The child only starts once every dependency is ready

use std::time::Duration;

use tokio::sync::broadcast;

use crate::config::{DependencyCheck, GateConfig};
use crate::error::GateError;
use crate::health::page;
use crate::health::probe::probe_tcp;
use crate::health::state::{GateOutcome, ReadyReport, WaitOutcome};
use crate::lifecycle::dispatch::{self, exit_code};
use crate::lifecycle::mode::StartupMode;
use crate::lifecycle::shutdown::{self, Shutdown};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;

/// Wait for each check in order.
///
/// Stops at the first check that exhausts its budget, or when `shutdown` fires.
pub async fn await_dependencies(
    checks: &[DependencyCheck],
    policy: &RetryPolicy,
    shutdown: &mut broadcast::Receiver<()>,
) -> GateOutcome {
    let mut reports = Vec::with_capacity(checks.len());

    for check in checks {
        let outcome = tokio::select! {
            outcome = wait_for_dependency(check, policy) => outcome,
            _ = shutdown::wait_for(shutdown) => {
                tracing::info!(dependency = %check.label, "Shutdown requested while waiting");
                return GateOutcome::Cancelled;
            }
        };

        match outcome {
            WaitOutcome::Ready { attempts, elapsed } => {
                reports.push(ReadyReport::new(check, attempts, elapsed));
            }
            WaitOutcome::TimedOut { attempts, elapsed, last_error } => {
                return GateOutcome::TimedOut {
                    check: check.clone(),
                    attempts,
                    elapsed,
                    last_error,
                };
            }
        }
    }

    GateOutcome::Ready(reports)
}

/// Probe one dependency until it accepts a connection or the budget is spent.
pub async fn wait_for_dependency(check: &DependencyCheck, policy: &RetryPolicy) -> WaitOutcome {
    let address = check.address();
    let mut budget = policy.start();
    let mut last_error = String::from("no attempt was made");

    metrics::set_dependency_ready(&check.label, false);

    while budget.begin_attempt() {
        let attempt = budget.attempts();
        match probe_tcp(check, budget.attempt_timeout()).await {
            Ok(peer) => {
                let elapsed = budget.elapsed();
                tracing::info!(
                    dependency = %check.label,
                    address = %address,
                    %peer,
                    attempts = attempt,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Dependency ready"
                );
                metrics::record_probe(&check.label, "ok");
                metrics::record_wait(&check.label, "ready", elapsed);
                metrics::set_dependency_ready(&check.label, true);
                return WaitOutcome::Ready { attempts: attempt, elapsed };
            }
            Err(e) => {
                metrics::record_probe(&check.label, e.kind());
                last_error = e.to_string();

                let Some(delay) = budget.next_delay() else { break };
                if attempt == 1 {
                    tracing::info!(
                        dependency = %check.label,
                        address = %address,
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "Waiting for dependency"
                    );
                } else {
                    tracing::warn!(
                        dependency = %check.label,
                        address = %address,
                        attempt,
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "Dependency still unreachable"
                    );
                }
                tokio::time::sleep(delay).await;
            }
        }
    }

    let elapsed = budget.elapsed();
    tracing::error!(
        dependency = %check.label,
        address = %address,
        attempts = budget.attempts(),
        elapsed_ms = elapsed.as_millis() as u64,
        error = %last_error,
        "Dependency did not become ready"
    );
    metrics::record_wait(&check.label, "timed_out", elapsed);

    WaitOutcome::TimedOut {
        attempts: budget.attempts(),
        elapsed,
        last_error,
    }
}

/// Run the whole gate and return the exit code of the dispatched command.
pub async fn run_gate(
    config: &GateConfig,
    mode: StartupMode,
    shutdown: &Shutdown,
    grace: Duration,
) -> Result<i32, GateError> {
    let policy = RetryPolicy::from(&config.wait);
    // Subscribe before waiting so a signal during the wait is not missed.
    let mut wait_rx = shutdown.subscribe();
    let child_rx = shutdown.subscribe();

    if shutdown.is_triggered() {
        return Err(GateError::Cancelled);
    }

    tracing::info!(
        mode = %mode,
        dependencies = config.dependencies.len(),
        timeout_secs = config.wait.timeout_secs,
        max_attempts = config.wait.max_attempts,
        "Waiting for dependencies"
    );

    let reports = match await_dependencies(&config.dependencies, &policy, &mut wait_rx).await {
        GateOutcome::Ready(reports) => reports,
        GateOutcome::TimedOut { check, attempts, elapsed, last_error } => {
            return Err(GateError::DependencyTimedOut {
                address: check.address(),
                label: check.label,
                attempts,
                elapsed,
                last_error,
            });
        }
        GateOutcome::Cancelled => return Err(GateError::Cancelled),
    };

    tracing::info!("All dependencies ready");

    if config.health_page.enabled {
        let published = page::publish(&config.health_page, mode, &reports)?;
        tracing::info!(
            written = ?published.written,
            copied = ?published.copied,
            "Health page published"
        );
    }

    // A signal that arrived after the last dependency became ready.
    if shutdown.is_triggered() {
        tracing::info!("Shutdown requested before dispatch");
        return Err(GateError::Cancelled);
    }

    let command = mode.command(&config.modes);
    tracing::info!(mode = %mode, command = %command.display(), "Dispatching startup mode");
    metrics::record_dispatch(mode.as_str());

    let status = dispatch::run_command(command, child_rx, grace).await?;
    Ok(exit_code(&status))
}
