//! Scriptable mock of the interactive selection boundary.
//!
//! [`MockPrompt`] answers picker, arbitration, direct-address, and login
//! requests from pre-loaded queues. An empty queue answers with
//! cancellation, which the orchestrator treats as a normal abort.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use sdrlink_core::{
    Arbitration, ClientRole, Credentials, DiscoveredTarget, GuiClientSession, SelectionPrompt,
};

/// One recorded prompt request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptCall {
    /// Picker shown with this many targets.
    PickTarget(usize),
    /// Arbitration shown for this target id with this many sessions.
    Arbitrate(String, usize),
    /// Direct address requested for this role.
    DirectAddress(ClientRole),
    /// Login requested.
    Login,
}

#[derive(Default)]
struct PromptInner {
    picks: VecDeque<Option<String>>,
    arbitrations: VecDeque<Arbitration>,
    addresses: VecDeque<Option<String>>,
    logins: VecDeque<Option<Credentials>>,
    calls: Vec<PromptCall>,
}

/// A scriptable [`SelectionPrompt`] double.
#[derive(Default)]
pub struct MockPrompt {
    inner: Mutex<PromptInner>,
}

impl MockPrompt {
    /// Create a mock that cancels every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a picker answer (`None` cancels).
    pub fn push_pick(&self, selection: Option<&str>) {
        self.inner
            .lock()
            .unwrap()
            .picks
            .push_back(selection.map(str::to_string));
    }

    /// Queue an arbitration answer.
    pub fn push_arbitration(&self, outcome: Arbitration) {
        self.inner.lock().unwrap().arbitrations.push_back(outcome);
    }

    /// Queue a direct-address answer (`None` cancels).
    pub fn push_direct_address(&self, address: Option<&str>) {
        self.inner
            .lock()
            .unwrap()
            .addresses
            .push_back(address.map(str::to_string));
    }

    /// Queue a login answer (`None` cancels).
    pub fn push_login(&self, credentials: Option<Credentials>) {
        self.inner.lock().unwrap().logins.push_back(credentials);
    }

    /// Snapshot of every prompt request made so far, in order.
    pub fn calls(&self) -> Vec<PromptCall> {
        self.inner.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl SelectionPrompt for MockPrompt {
    async fn pick_target(&self, targets: &[DiscoveredTarget]) -> Option<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PromptCall::PickTarget(targets.len()));
        inner.picks.pop_front().flatten()
    }

    async fn arbitrate(
        &self,
        target: &DiscoveredTarget,
        sessions: &[GuiClientSession],
    ) -> Arbitration {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push(PromptCall::Arbitrate(target.id.clone(), sessions.len()));
        inner
            .arbitrations
            .pop_front()
            .unwrap_or(Arbitration::Cancel)
    }

    async fn direct_address(&self, role: ClientRole) -> Option<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PromptCall::DirectAddress(role));
        inner.addresses.pop_front().flatten()
    }

    async fn login(&self) -> Option<Credentials> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PromptCall::Login);
        inner.logins.pop_front().flatten()
    }
}
