//! Auxiliary stream lifecycle.
//!
//! [`AuxStreamManager`] requests and releases the secondary data streams
//! (remote audio in/out, DAX channel audio) that are layered on an
//! active primary connection. Each stream kind is independent of the
//! others; none of them can outlive the connection.
//!
//! All operations go through one async mutex, so no two stream requests
//! are ever in flight concurrently and a channel switch can never
//! produce two simultaneous streams of the same kind.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use sdrlink_core::error::Result;
use sdrlink_core::{AuxStreamKind, RadioTransport, SessionHandle, StreamId, StreamParams};

/// One active auxiliary stream.
#[derive(Debug, Clone)]
pub struct AuxStream {
    /// Identifier the radio assigned on creation.
    pub id: StreamId,
    /// Which kind of stream this is.
    pub kind: AuxStreamKind,
    /// Connection handle the stream belongs to.
    pub handle: SessionHandle,
    /// Whether the compressed variant was requested.
    pub compressed: bool,
}

/// Tracks active auxiliary streams and drives their create/remove
/// requests through the transport.
pub struct AuxStreamManager {
    transport: Arc<dyn RadioTransport>,
    streams: Mutex<HashMap<AuxStreamKind, AuxStream>>,
}

impl AuxStreamManager {
    /// Create a manager with no active streams.
    pub fn new(transport: Arc<dyn RadioTransport>) -> Self {
        Self {
            transport,
            streams: Mutex::new(HashMap::new()),
        }
    }

    /// Request a stream of the given kind and record it.
    ///
    /// Idempotent: when a stream of this kind is already active its id is
    /// returned without another request. On failure nothing is recorded
    /// and the error propagates to the caller, which reverts the
    /// user-facing toggle.
    pub async fn enable(
        &self,
        kind: AuxStreamKind,
        compressed: bool,
        handle: SessionHandle,
    ) -> Result<StreamId> {
        let mut streams = self.streams.lock().await;
        if let Some(existing) = streams.get(&kind) {
            return Ok(existing.id);
        }
        let id = self
            .transport
            .request_stream(kind, &StreamParams { compressed })
            .await?;
        tracing::debug!(kind = %kind, id = %id, "Auxiliary stream created");
        streams.insert(
            kind,
            AuxStream {
                id,
                kind,
                handle,
                compressed,
            },
        );
        Ok(id)
    }

    /// Remove the stream of the given kind, if one is recorded.
    ///
    /// The local record is discarded before the removal request is even
    /// attempted: a lingering remote stream is preferable to a
    /// client-side resource leak. Returns `Ok` when no stream was
    /// recorded.
    pub async fn disable(&self, kind: AuxStreamKind) -> Result<()> {
        let mut streams = self.streams.lock().await;
        let Some(stream) = streams.remove(&kind) else {
            return Ok(());
        };
        tracing::debug!(kind = %kind, id = %stream.id, "Auxiliary stream removed");
        self.transport.remove_stream(stream.id).await
    }

    /// Replace one stream with another of a related kind, old before new.
    ///
    /// Used for DAX channel switches: the old channel's stream is removed
    /// strictly before the new one is requested. A failed removal is
    /// logged and does not block the new request.
    pub async fn switch(
        &self,
        old: AuxStreamKind,
        new: AuxStreamKind,
        compressed: bool,
        handle: SessionHandle,
    ) -> Result<StreamId> {
        if let Err(e) = self.disable(old).await {
            tracing::warn!(kind = %old, error = %e, "Stream removal failed during switch");
        }
        self.enable(new, compressed, handle).await
    }

    /// Tear down every active stream, in any order.
    ///
    /// Removal requests are best-effort; failures are logged and do not
    /// stop the teardown. Returns the number of streams that were active.
    pub async fn disable_all(&self) -> usize {
        let drained: Vec<AuxStream> = {
            let mut streams = self.streams.lock().await;
            streams.drain().map(|(_, s)| s).collect()
        };
        let count = drained.len();
        for stream in drained {
            if let Err(e) = self.transport.remove_stream(stream.id).await {
                tracing::warn!(id = %stream.id, error = %e, "Stream removal failed during teardown");
            }
        }
        count
    }

    /// Whether a stream of the given kind is active.
    pub async fn is_active(&self, kind: AuxStreamKind) -> bool {
        self.streams.lock().await.contains_key(&kind)
    }

    /// Snapshot of the active streams.
    pub async fn active(&self) -> Vec<AuxStream> {
        self.streams.lock().await.values().cloned().collect()
    }
}
