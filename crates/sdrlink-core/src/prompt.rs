//! Interactive selection boundary.
//!
//! The connection orchestrator cannot finish a connect cycle without user
//! decisions it is not allowed to make itself: which target to use, which
//! existing session to evict, what address or credentials to use. The
//! [`SelectionPrompt`] trait is that request/response boundary -- the
//! orchestrator awaits a prompt call while logically remaining in the
//! discovering/negotiating state, and every prompt can be answered with a
//! cancellation, which aborts the cycle without error.

use async_trait::async_trait;

use crate::target::{DiscoveredTarget, GuiClientSession};
use crate::types::{ClientRole, SessionHandle};

/// Outcome of the client-chooser arbitration step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arbitration {
    /// Proceed with the connection, optionally evicting the session with
    /// the given handle.
    Connect(Option<SessionHandle>),
    /// User declined; abort back to disconnected. Not an error.
    Cancel,
}

/// Cloud relay login credentials supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account user name (email).
    pub user: String,
    /// Account password.
    pub password: String,
}

/// Request/response boundary to the surrounding UI.
///
/// Every method returning an `Option` treats `None` as cancellation.
#[async_trait]
pub trait SelectionPrompt: Send + Sync {
    /// Ask the user to pick a target from the current registry contents.
    ///
    /// Returns the id of the chosen target.
    async fn pick_target(&self, targets: &[DiscoveredTarget]) -> Option<String>;

    /// Ask the user to arbitrate with the sessions already attached to
    /// the chosen target.
    async fn arbitrate(
        &self,
        target: &DiscoveredTarget,
        sessions: &[GuiClientSession],
    ) -> Arbitration;

    /// Ask the user for a direct address for the given role.
    async fn direct_address(&self, role: ClientRole) -> Option<String>;

    /// Ask the user for cloud relay credentials.
    async fn login(&self) -> Option<Credentials>;
}
