//! Hand-off to the external toolchain command.
//!
//! # Responsibilities
//! - Spawn the configured command with inherited stdio
//! - Wait for it; its exit status becomes the gate's
//! - On shutdown, send the child SIGTERM and give it a grace period
//! - Kill the child when the grace period ends or a second signal arrives
//!
//! # Design Decisions
//! - The gate stays alive as the parent so signals and exit status flow through it
//! - Exit code for signal-terminated children follows the shell convention (128 + signal)

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::broadcast;

use crate::config::CommandConfig;
use crate::lifecycle::shutdown;

/// How long a child gets to exit on its own after a shutdown signal.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    #[error("failed to wait for child process: {0}")]
    Wait(#[source] io::Error),
}

/// Build the tokio command for `config` without spawning it.
pub fn build_command(config: &CommandConfig) -> Command {
    let mut cmd = Command::new(&config.program);
    cmd.args(&config.args).envs(&config.env).kill_on_drop(true);
    if let Some(dir) = &config.working_dir {
        cmd.current_dir(dir);
    }
    cmd
}

/// Run `config` to completion and return its exit status.
pub async fn run_command(
    config: &CommandConfig,
    mut shutdown: broadcast::Receiver<()>,
    grace: Duration,
) -> Result<ExitStatus, DispatchError> {
    let mut child = build_command(config)
        .spawn()
        .map_err(|source| DispatchError::Spawn {
            program: config.program.clone(),
            source,
        })?;

    tracing::info!(
        command = %config.display(),
        pid = ?child.id(),
        "Child process started"
    );

    let status = tokio::select! {
        status = child.wait() => status.map_err(DispatchError::Wait)?,
        _ = shutdown::wait_for(&mut shutdown) => stop_child(&mut child, &mut shutdown, grace).await?,
    };

    tracing::info!(exit_code = exit_code(&status), "Child process exited");
    Ok(status)
}

async fn stop_child(
    child: &mut Child,
    shutdown: &mut broadcast::Receiver<()>,
    grace: Duration,
) -> Result<ExitStatus, DispatchError> {
    terminate(child);
    tracing::info!(grace_secs = grace.as_secs(), "Waiting for child process to exit");

    tokio::select! {
        waited = tokio::time::timeout(grace, child.wait()) => match waited {
            Ok(status) => return status.map_err(DispatchError::Wait),
            Err(_) => tracing::warn!("Child process did not exit within grace period, killing"),
        },
        _ = shutdown::wait_for(shutdown) => {
            tracing::warn!("Second shutdown signal received, killing child process");
        }
    }

    child.kill().await.map_err(DispatchError::Wait)?;
    child.wait().await.map_err(DispatchError::Wait)
}

/// Ask the child to exit with SIGTERM.
#[cfg(unix)]
fn terminate(child: &Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    // No id means the child has already been reaped.
    let Some(id) = child.id() else { return };
    match i32::try_from(id) {
        Ok(raw) => {
            if let Err(e) = kill(Pid::from_raw(raw), Signal::SIGTERM) {
                tracing::warn!(pid = id, error = %e, "Failed to send SIGTERM to child process");
            }
        }
        Err(_) => tracing::warn!(pid = id, "Child pid out of range, cannot signal"),
    }
}

#[cfg(not(unix))]
fn terminate(_child: &Child) {}

/// Exit code the gate should report for a child's status.
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
