//! Identity-change observer.
//!
//! A long-lived consumer of the gate's identity events. Registration
//! resolves the initial state to `Anonymous`; afterwards a background task
//! tracks sign-ins and sign-outs and exposes the current gate-level state
//! through a watch channel.

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use m2verse_core::UserId;

use super::AuthGate;

/// Gate-level authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentityState {
    /// No identity notification processed yet.
    #[default]
    Loading,
    /// No identity is signed in.
    Anonymous,
    /// An identity is signed in.
    Authenticated {
        /// Platform uid of the signed-in identity.
        uid: UserId,
    },
}

/// Identity-change notification published by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    /// A password, registration, or federated sign-in completed.
    SignedIn {
        /// Platform uid of the signed-in identity.
        uid: UserId,
    },
    /// The identity signed out or was invalidated externally.
    SignedOut,
}

/// Long-lived consumer of the gate's identity events.
///
/// Started once at application startup and stopped at shutdown. Dropping
/// the observer without calling [`stop`](Self::stop) leaves the task
/// running until the gate itself is dropped.
pub struct IdentityObserver {
    state: watch::Receiver<IdentityState>,
    task: JoinHandle<()>,
}

impl IdentityObserver {
    /// Register on the gate and start consuming events.
    ///
    /// The registration itself resolves the initial state from `Loading`
    /// to `Anonymous`.
    #[must_use]
    pub fn start(gate: &AuthGate) -> Self {
        let mut events = gate.subscribe();
        let (tx, mut state) = watch::channel(IdentityState::Loading);
        let _ = tx.send(IdentityState::Anonymous);
        // Watchers cloned from this receiver wake only on later changes.
        state.mark_unchanged();

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(IdentityEvent::SignedIn { uid }) => {
                        debug!(uid = %uid, "Identity signed in");
                        let _ = tx.send(IdentityState::Authenticated { uid });
                    }
                    Ok(IdentityEvent::SignedOut) => {
                        debug!("Identity signed out");
                        let _ = tx.send(IdentityState::Anonymous);
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Identity observer lagged; state resyncs on the next event");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self { state, task }
    }

    /// Current gate-level state.
    #[must_use]
    pub fn state(&self) -> IdentityState {
        self.state.borrow().clone()
    }

    /// Receiver for awaiting state changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<IdentityState> {
        self.state.clone()
    }

    /// Stop consuming events.
    pub fn stop(self) {
        self.task.abort();
    }
}
