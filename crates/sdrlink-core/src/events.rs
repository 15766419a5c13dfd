//! Session event types.
//!
//! Events are the single "notify" boundary between the orchestration core
//! and whatever UI surrounds it: state changes and one-shot failure
//! reports are both delivered here, so the UI can choose to surface
//! failures modally or silently without the core knowing or caring.
//!
//! The orchestrator broadcasts these through a [`tokio::sync::broadcast`]
//! channel; slow subscribers may miss events under load.

use crate::types::{AuxStreamKind, ConnectionState};

/// An event emitted by the connection orchestrator.
///
/// Failure events are emitted exactly once per failed operation -- the
/// core never retries on its own.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The connection state machine transitioned.
    StateChanged(ConnectionState),

    /// A connect attempt failed; the machine has returned to disconnected.
    ConnectFailed(String),

    /// A disconnect failed; local state was forced to disconnected anyway.
    DisconnectFailed(String),

    /// An auxiliary stream create or remove request failed.
    ///
    /// On a create failure the corresponding user-facing toggle has been
    /// reverted to its prior value.
    StreamFailed {
        /// Which stream kind the failed request was for.
        kind: AuxStreamKind,
        /// Why it failed.
        reason: String,
    },

    /// A cloud relay login attempt failed.
    LoginFailed(String),
}
