//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT (and SIGTERM on Unix)
//! - Trigger the shared [`Shutdown`] coordinator on every signal
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The listener runs for the life of the process
//! - First signal stops gracefully; a second one forces the child down

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Spawn a task that triggers `shutdown` on each termination signal.
pub fn spawn_signal_listener(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut signals = TerminationSignals::new();
        while let Some(signal) = signals.recv().await {
            if shutdown.is_triggered() {
                tracing::warn!(signal, "Repeated termination signal, forcing shutdown");
            } else {
                tracing::info!(signal, "Termination signal received");
            }
            shutdown.trigger();
        }
    })
}

#[cfg(unix)]
struct TerminationSignals {
    term: Option<tokio::signal::unix::Signal>,
}

#[cfg(unix)]
impl TerminationSignals {
    fn new() -> Self {
        use tokio::signal::unix::{signal, SignalKind};

        let term = match signal(SignalKind::terminate()) {
            Ok(term) => Some(term),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler, listening for SIGINT only");
                None
            }
        };
        Self { term }
    }

    /// Next signal name, or `None` once no handler can deliver anything.
    async fn recv(&mut self) -> Option<&'static str> {
        let term = async {
            match self.term.as_mut() {
                Some(term) => term.recv().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            res = tokio::signal::ctrl_c() => match res {
                Ok(()) => Some("SIGINT"),
                Err(e) => {
                    tracing::warn!(error = %e, "SIGINT listener failed");
                    None
                }
            },
            Some(()) = term => Some("SIGTERM"),
        }
    }
}

#[cfg(not(unix))]
struct TerminationSignals;

#[cfg(not(unix))]
impl TerminationSignals {
    fn new() -> Self {
        Self
    }

    async fn recv(&mut self) -> Option<&'static str> {
        tokio::signal::ctrl_c().await.ok().map(|()| "ctrl-c")
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    use nix::sys::signal::{raise, Signal};

    #[tokio::test]
    async fn test_listener_keeps_running_after_first_signal() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let listener = spawn_signal_listener(shutdown.clone());

        // Let the listener install its handlers before raising.
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        raise(Signal::SIGTERM).unwrap();
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(shutdown.is_triggered());

        raise(Signal::SIGTERM).unwrap();
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(!listener.is_finished());

        listener.abort();
    }
}
