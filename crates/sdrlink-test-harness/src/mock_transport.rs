//! Scriptable mock of the radio transport boundary.
//!
//! [`MockTransport`] implements [`RadioTransport`] with pre-loaded
//! results and a recorded call log, enabling deterministic testing of the
//! connection orchestrator without a radio or a network.
//!
//! Results are consumed in FIFO order per operation; when no result is
//! queued the operation succeeds with a generated handle or stream id.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use sdrlink_core::error::{Error, Result};
use sdrlink_core::{
    AuxStreamKind, ClientRole, ConnectParams, DiscoveredTarget, RadioTransport, SessionHandle,
    StreamId, StreamParams,
};

/// One recorded call into the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    /// `connect` with the target id, role, and eviction handle passed.
    Connect {
        /// Id of the target passed to connect.
        target_id: String,
        /// Requested role.
        role: ClientRole,
        /// Eviction handle passed through from arbitration, if any.
        evict: Option<SessionHandle>,
    },
    /// `disconnect`.
    Disconnect,
    /// `send_command` with the command text.
    SendCommand(String),
    /// `request_stream` with the kind and compression flag.
    RequestStream {
        /// Requested stream kind.
        kind: AuxStreamKind,
        /// Compression flag from the stream parameters.
        compressed: bool,
    },
    /// `remove_stream` with the stream id.
    RemoveStream(StreamId),
}

#[derive(Default)]
struct MockInner {
    connect_results: VecDeque<std::result::Result<SessionHandle, String>>,
    disconnect_results: VecDeque<std::result::Result<(), String>>,
    stream_results: VecDeque<std::result::Result<StreamId, String>>,
    remove_results: VecDeque<std::result::Result<(), String>>,
    next_handle: u32,
    next_stream: u32,
    calls: Vec<TransportCall>,
}

/// A scriptable [`RadioTransport`] double.
pub struct MockTransport {
    inner: Mutex<MockInner>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a mock whose every operation succeeds by default.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MockInner {
                next_handle: 0x4000_0001,
                next_stream: 0x2000_0001,
                ..MockInner::default()
            }),
        }
    }

    /// Queue a successful connect returning the given handle.
    pub fn push_connect_ok(&self, handle: u32) {
        self.inner
            .lock()
            .unwrap()
            .connect_results
            .push_back(Ok(SessionHandle(handle)));
    }

    /// Queue a failing connect.
    pub fn push_connect_err(&self, reason: &str) {
        self.inner
            .lock()
            .unwrap()
            .connect_results
            .push_back(Err(reason.to_string()));
    }

    /// Queue a failing disconnect.
    pub fn push_disconnect_err(&self, reason: &str) {
        self.inner
            .lock()
            .unwrap()
            .disconnect_results
            .push_back(Err(reason.to_string()));
    }

    /// Queue a successful stream creation returning the given id.
    pub fn push_stream_ok(&self, id: u32) {
        self.inner
            .lock()
            .unwrap()
            .stream_results
            .push_back(Ok(StreamId(id)));
    }

    /// Queue a failing stream creation.
    pub fn push_stream_err(&self, reason: &str) {
        self.inner
            .lock()
            .unwrap()
            .stream_results
            .push_back(Err(reason.to_string()));
    }

    /// Queue a failing stream removal.
    pub fn push_remove_err(&self, reason: &str) {
        self.inner
            .lock()
            .unwrap()
            .remove_results
            .push_back(Err(reason.to_string()));
    }

    /// Snapshot of every call made so far, in order.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Number of `connect` calls made so far.
    pub fn connect_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, TransportCall::Connect { .. }))
            .count()
    }

    /// Number of `disconnect` calls made so far.
    pub fn disconnect_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, TransportCall::Disconnect))
            .count()
    }
}

#[async_trait]
impl RadioTransport for MockTransport {
    async fn connect(
        &self,
        target: &DiscoveredTarget,
        role: ClientRole,
        evict: Option<SessionHandle>,
        _params: &ConnectParams,
    ) -> Result<SessionHandle> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(TransportCall::Connect {
            target_id: target.id.clone(),
            role,
            evict,
        });
        match inner.connect_results.pop_front() {
            Some(Ok(handle)) => Ok(handle),
            Some(Err(reason)) => Err(Error::Connect(reason)),
            None => {
                let handle = SessionHandle(inner.next_handle);
                inner.next_handle += 1;
                Ok(handle)
            }
        }
    }

    async fn disconnect(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(TransportCall::Disconnect);
        match inner.disconnect_results.pop_front() {
            Some(Ok(())) | None => Ok(()),
            Some(Err(reason)) => Err(Error::Disconnect(reason)),
        }
    }

    async fn send_command(&self, text: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(TransportCall::SendCommand(text.to_string()));
        Ok(())
    }

    async fn request_stream(
        &self,
        kind: AuxStreamKind,
        params: &StreamParams,
    ) -> Result<StreamId> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(TransportCall::RequestStream {
            kind,
            compressed: params.compressed,
        });
        match inner.stream_results.pop_front() {
            Some(Ok(id)) => Ok(id),
            Some(Err(reason)) => Err(Error::Stream(reason)),
            None => {
                let id = StreamId(inner.next_stream);
                inner.next_stream += 1;
                Ok(id)
            }
        }
    }

    async fn remove_stream(&self, id: StreamId) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(TransportCall::RemoveStream(id));
        match inner.remove_results.pop_front() {
            Some(Ok(())) | None => Ok(()),
            Some(Err(reason)) => Err(Error::Stream(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> DiscoveredTarget {
        DiscoveredTarget::direct("127.0.0.1:4992")
    }

    #[tokio::test]
    async fn default_results_succeed_with_generated_ids() {
        let mock = MockTransport::new();
        let h1 = mock
            .connect(&target(), ClientRole::Gui, None, &ConnectParams::default())
            .await
            .unwrap();
        let h2 = mock
            .connect(&target(), ClientRole::Gui, None, &ConnectParams::default())
            .await
            .unwrap();
        assert_ne!(h1, h2);

        let s1 = mock
            .request_stream(AuxStreamKind::RemoteRxAudio, &StreamParams::default())
            .await
            .unwrap();
        assert_eq!(s1, StreamId(0x2000_0001));
    }

    #[tokio::test]
    async fn queued_results_consumed_in_order() {
        let mock = MockTransport::new();
        mock.push_connect_err("radio busy");
        mock.push_connect_ok(0x42);

        let first = mock
            .connect(&target(), ClientRole::Gui, None, &ConnectParams::default())
            .await;
        assert!(matches!(first, Err(Error::Connect(_))));

        let second = mock
            .connect(&target(), ClientRole::Gui, None, &ConnectParams::default())
            .await
            .unwrap();
        assert_eq!(second, SessionHandle(0x42));
    }

    #[tokio::test]
    async fn call_log_records_arguments() {
        let mock = MockTransport::new();
        mock.connect(
            &target(),
            ClientRole::NonGui,
            Some(SessionHandle(7)),
            &ConnectParams::default(),
        )
        .await
        .unwrap();
        mock.send_command("info").await.unwrap();
        mock.disconnect().await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0],
            TransportCall::Connect {
                target_id: "direct|127.0.0.1:4992".to_string(),
                role: ClientRole::NonGui,
                evict: Some(SessionHandle(7)),
            }
        );
        assert_eq!(calls[1], TransportCall::SendCommand("info".to_string()));
        assert_eq!(calls[2], TransportCall::Disconnect);
        assert_eq!(mock.connect_count(), 1);
        assert_eq!(mock.disconnect_count(), 1);
    }
}
