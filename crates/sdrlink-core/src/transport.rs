//! Transport boundary to the radio-protocol library.
//!
//! The [`RadioTransport`] trait abstracts the low-level protocol client
//! that owns the actual TCP/UDP link to the radio. The orchestration core
//! drives connect/disconnect and stream lifecycle through this trait and
//! never touches the wire format itself.
//!
//! Stream creation is a typed request/response: [`request_stream`]
//! returns the radio-assigned [`StreamId`] directly, so callers never
//! re-parse command echoes to recover the identifier.
//!
//! [`request_stream`]: RadioTransport::request_stream

use async_trait::async_trait;

use crate::error::Result;
use crate::target::DiscoveredTarget;
use crate::types::{
    AuxStreamKind, ClientRole, ConnectParams, SessionHandle, StreamId, StreamParams,
};

/// Asynchronous protocol-client boundary.
///
/// All calls may suspend for network round-trips. Timeouts are the
/// implementation's responsibility; the orchestrator runs every call to
/// completion and accepts no new intent while one is outstanding.
#[async_trait]
pub trait RadioTransport: Send + Sync {
    /// Establish the primary connection to `target`.
    ///
    /// `evict`, when present, names an existing session on the radio to
    /// disconnect as part of taking full control.
    async fn connect(
        &self,
        target: &DiscoveredTarget,
        role: ClientRole,
        evict: Option<SessionHandle>,
        params: &ConnectParams,
    ) -> Result<SessionHandle>;

    /// Tear down the primary connection.
    async fn disconnect(&self) -> Result<()>;

    /// Send one command line to the radio.
    async fn send_command(&self, text: &str) -> Result<()>;

    /// Request creation of an auxiliary stream and return the identifier
    /// the radio assigned to it.
    async fn request_stream(&self, kind: AuxStreamKind, params: &StreamParams)
        -> Result<StreamId>;

    /// Request removal of an auxiliary stream.
    async fn remove_stream(&self, id: StreamId) -> Result<()>;
}
