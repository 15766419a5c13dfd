//! Discovered radios and stations.
//!
//! A [`DiscoveredTarget`] is one reachable radio, or one reachable
//! multi-user station on a radio, as advertised by a discovery feed. The
//! registry in `sdrlink-discovery` keys targets by [`DiscoveredTarget::id`].

use crate::types::{SessionHandle, TargetSource};

/// One client session currently attached to a radio.
///
/// Advertised alongside the radio so a new full-control connection can
/// arbitrate (choose a session to evict) before connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiClientSession {
    /// Handle the radio assigned to the attached client.
    pub handle: SessionHandle,
    /// Program name the client registered.
    pub program: String,
    /// Station name the client registered.
    pub station: String,
    /// Whether the session holds local exclusive control.
    pub is_local: bool,
}

/// A radio or station reachable through one of the discovery sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredTarget {
    /// Unique identifier within the registry (serial number for radios,
    /// `<serial>|<station>` for station entries).
    pub id: String,
    /// Display name (nickname, falling back to model).
    pub name: String,
    /// Which discovery path produced this target.
    pub source: TargetSource,
    /// Network address (`host:port`) of the command channel.
    pub address: String,
    /// Firmware/protocol version advertised by the radio.
    pub version: String,
    /// Radio model (e.g. "FLEX-6600").
    pub model: String,
    /// Radio serial number.
    pub serial: String,
    /// Station name when this entry is a multi-user station rather than
    /// the radio itself.
    pub station: Option<String>,
    /// Client sessions currently attached to the radio.
    pub gui_clients: Vec<GuiClientSession>,
}

impl DiscoveredTarget {
    /// Create a minimal target for a manually-entered address.
    ///
    /// Direct targets never appear in advertisements, so most advertised
    /// fields are left empty.
    pub fn direct(address: &str) -> Self {
        Self {
            id: format!("direct|{address}"),
            name: address.to_string(),
            source: TargetSource::Direct,
            address: address.to_string(),
            version: String::new(),
            model: String::new(),
            serial: String::new(),
            station: None,
            gui_clients: Vec::new(),
        }
    }

    /// Whether this entry names a multi-user station rather than a radio.
    pub fn is_station(&self) -> bool {
        self.station.is_some()
    }
}
