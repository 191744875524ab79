// Connectivity watcher - background health probing
//
// A single tokio task probes the backend on a fixed cadence and publishes
// the latest reachability snapshot through a watch channel. The UI reads
// the snapshot to gate sends; it never waits on a probe. A Notify handle
// lets the UI request an immediate re-probe (bound to Ctrl-R in the chat
// view), the equivalent of re-testing the server when a browser fires its
// "online" event.
//
// Probe failures are silent state transitions: logged at debug level,
// never surfaced as discrete errors.

use crate::api::{ApiClient, ApiError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};

/// Server reachability as seen from this client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerStatus {
    /// No probe has settled yet
    #[default]
    Unknown,
    /// Last probe succeeded
    Online,
    /// The host answered, but not with a healthy response
    Degraded,
    /// No network path to the server
    Offline,
}

impl ServerStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, ServerStatus::Online)
    }

    /// Short label for the status bar
    pub fn label(&self) -> &'static str {
        match self {
            ServerStatus::Unknown => "checking",
            ServerStatus::Online => "online",
            ServerStatus::Degraded => "error",
            ServerStatus::Offline => "offline",
        }
    }
}

/// Latest connectivity snapshot, shared process-wide
#[derive(Debug, Clone, Default)]
pub struct ConnectivityState {
    pub server: ServerStatus,
    pub last_checked: Option<DateTime<Utc>>,
}

/// Map a probe outcome to the next status
///
/// Transitions: any state reaches Online on a successful probe, Offline on
/// a network-level failure, and Degraded on an HTTP/schema failure. The
/// current state only matters for logging the edge.
fn next_status(outcome: &Result<(), ApiError>) -> ServerStatus {
    match outcome {
        Ok(()) => ServerStatus::Online,
        Err(ApiError::Unreachable(_)) => ServerStatus::Offline,
        Err(_) => ServerStatus::Degraded,
    }
}

/// Spawn the background watcher task
///
/// Returns the receiving side of the snapshot channel and a Notify handle
/// for on-demand re-probes. The task exits when every receiver is dropped.
pub fn spawn_watcher(
    client: Arc<ApiClient>,
    interval: Duration,
) -> (watch::Receiver<ConnectivityState>, Arc<Notify>) {
    let (tx, rx) = watch::channel(ConnectivityState::default());
    let notify = Arc::new(Notify::new());
    let trigger = notify.clone();

    tokio::spawn(async move {
        loop {
            let outcome = client.probe().await;
            let status = next_status(&outcome);

            let previous = tx.borrow().server;
            if previous != status {
                tracing::debug!(from = previous.label(), to = status.label(), "server status changed");
            }

            tx.send_replace(ConnectivityState {
                server: status,
                last_checked: Some(Utc::now()),
            });

            if tx.is_closed() {
                break;
            }

            // Sleep until the next cycle, or wake early on demand
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = trigger.notified() => {
                    tracing::debug!("re-probe requested");
                }
            }
        }
    });

    (rx, notify)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_success_reaches_online() {
        assert_eq!(next_status(&Ok(())), ServerStatus::Online);
    }

    #[test]
    fn http_failure_is_degraded_not_offline() {
        let outcome = Err(ApiError::Transport { status: 503 });
        assert_eq!(next_status(&outcome), ServerStatus::Degraded);

        let outcome = Err(ApiError::MalformedResponse("bad body".to_string()));
        assert_eq!(next_status(&outcome), ServerStatus::Degraded);
    }

    #[test]
    fn default_snapshot_is_unknown_and_unchecked() {
        let state = ConnectivityState::default();
        assert_eq!(state.server, ServerStatus::Unknown);
        assert!(state.last_checked.is_none());
        assert!(!state.server.is_online());
    }

    #[test]
    fn labels_match_the_four_states() {
        assert_eq!(ServerStatus::Unknown.label(), "checking");
        assert_eq!(ServerStatus::Online.label(), "online");
        assert_eq!(ServerStatus::Degraded.label(), "error");
        assert_eq!(ServerStatus::Offline.label(), "offline");
    }
}
