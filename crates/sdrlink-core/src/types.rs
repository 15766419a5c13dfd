//! Core types used throughout sdrlink.
//!
//! These types form the shared vocabulary between the discovery registry,
//! the message classifier, and the connection orchestrator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which discovery path produced a target.
///
/// Sources are independently enabled; disabling one purges its targets
/// from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSource {
    /// LAN broadcast advertisement.
    Local,
    /// Cloud relay (remote access service).
    Cloud,
    /// Manually-entered address, no advertisement.
    Direct,
}

impl fmt::Display for TargetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetSource::Local => "local",
            TargetSource::Cloud => "cloud",
            TargetSource::Direct => "direct",
        };
        write!(f, "{s}")
    }
}

/// The role a client connects with.
///
/// A `Gui` client takes full control of the radio (at most one per
/// radio without arbitration); a `NonGui` client attaches to an existing
/// station in shared, non-exclusive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientRole {
    /// Full-control connection.
    Gui,
    /// Shared (station) connection.
    NonGui,
}

/// Client handle assigned by the radio for the lifetime of a connection.
///
/// Printed as 8-digit hex, matching the wire representation in status
/// messages (`S<handle>|...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(pub u32);

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Identifier the radio assigns to an auxiliary data stream on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub u32);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Connection lifecycle state.
///
/// The machine starts in `Disconnected` and returns there at the end of
/// every cycle. `ErrorOnConnect` and `ErrorOnDisconnect` are transient,
/// observational states: they are broadcast once and immediately followed
/// by `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection, no cycle in flight.
    #[default]
    Disconnected,
    /// Interactive target selection pending.
    Discovering,
    /// Arbitration or credential step pending.
    Negotiating,
    /// Transport connect call in flight.
    Connecting,
    /// Primary connection active.
    Connected,
    /// Transport disconnect call in flight.
    Disconnecting,
    /// Connect attempt failed; returning to `Disconnected`.
    ErrorOnConnect,
    /// Disconnect failed; local state is forced to `Disconnected` anyway.
    ErrorOnDisconnect,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Discovering => "discovering",
            ConnectionState::Negotiating => "negotiating",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnecting => "disconnecting",
            ConnectionState::ErrorOnConnect => "error on connect",
            ConnectionState::ErrorOnDisconnect => "error on disconnect",
        };
        write!(f, "{s}")
    }
}

/// Kind of auxiliary data stream layered on the primary connection.
///
/// Each kind is independent of the others; all of them require an active
/// primary connection and are torn down when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuxStreamKind {
    /// Compressed or uncompressed audio from the radio to this client.
    RemoteRxAudio,
    /// Audio from this client to the radio.
    RemoteTxAudio,
    /// DAX receive audio for one channel (1-8).
    DaxRxAudio(u8),
    /// DAX microphone audio.
    DaxMicAudio,
}

impl fmt::Display for AuxStreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuxStreamKind::RemoteRxAudio => write!(f, "remote RX audio"),
            AuxStreamKind::RemoteTxAudio => write!(f, "remote TX audio"),
            AuxStreamKind::DaxRxAudio(ch) => write!(f, "DAX RX audio (channel {ch})"),
            AuxStreamKind::DaxMicAudio => write!(f, "DAX mic audio"),
        }
    }
}

/// Transport parameters negotiated at connect time.
#[derive(Debug, Clone)]
pub struct ConnectParams {
    /// Program name registered with the radio.
    pub program: String,
    /// Station name registered with the radio.
    pub station: String,
    /// Maximum transmission unit for the command channel.
    pub mtu: u32,
    /// Request reduced-bandwidth framing for the primary connection.
    pub low_bandwidth_connect: bool,
    /// Request compressed DAX audio by default.
    pub low_bandwidth_dax: bool,
}

impl Default for ConnectParams {
    fn default() -> Self {
        Self {
            program: "sdrlink".to_string(),
            station: "sdrlink".to_string(),
            mtu: 1_300,
            low_bandwidth_connect: false,
            low_bandwidth_dax: false,
        }
    }
}

/// Parameters for an auxiliary stream creation request.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamParams {
    /// Request a compressed (reduced-bandwidth) stream.
    pub compressed: bool,
}

/// Classification rule applied to the message history.
///
/// `Prefix`, `Includes`, and `Excludes` match case-insensitively against a
/// free-text string and degrade to `All` when that string is empty. The
/// remaining kinds are anchored on the protocol's reserved capital
/// prefix letters and are case-sensitive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MessageFilter {
    /// Every message.
    #[default]
    All,
    /// Messages containing `"|" + match text`.
    Prefix,
    /// Messages containing the match text.
    Includes,
    /// Messages NOT containing the match text.
    Excludes,
    /// Command lines (first character `C`).
    Command,
    /// Radio-level status lines (literal `S0|` prefix).
    S0,
    /// Status lines other than radio-level (`S` but not `S0|`).
    Status,
    /// Reply lines (first character `R`).
    Reply,
}

impl MessageFilter {
    /// Whether `text` passes this filter with the given match text.
    pub fn matches(&self, filter_text: &str, text: &str) -> bool {
        match self {
            MessageFilter::All => true,
            MessageFilter::Prefix => {
                filter_text.is_empty() || contains_ci(text, &format!("|{filter_text}"))
            }
            MessageFilter::Includes => filter_text.is_empty() || contains_ci(text, filter_text),
            MessageFilter::Excludes => filter_text.is_empty() || !contains_ci(text, filter_text),
            MessageFilter::Command => text.starts_with('C'),
            MessageFilter::S0 => text.starts_with("S0|"),
            MessageFilter::Status => text.starts_with('S') && !text.starts_with("S0|"),
            MessageFilter::Reply => text.starts_with('R'),
        }
    }
}

/// Case-insensitive substring test.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_handle_display() {
        assert_eq!(SessionHandle(0x1234_5678).to_string(), "0x12345678");
        assert_eq!(StreamId(0x42).to_string(), "0x00000042");
    }

    #[test]
    fn connection_state_default() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn dax_kinds_distinct_per_channel() {
        assert_ne!(AuxStreamKind::DaxRxAudio(1), AuxStreamKind::DaxRxAudio(2));
        assert_ne!(AuxStreamKind::DaxRxAudio(1), AuxStreamKind::DaxMicAudio);
    }

    #[test]
    fn filter_all_matches_everything() {
        assert!(MessageFilter::All.matches("", "C1|info"));
        assert!(MessageFilter::All.matches("anything", ""));
    }

    #[test]
    fn filter_prefix_requires_pipe_boundary() {
        // contains "|freq"
        assert!(MessageFilter::Prefix.matches("freq", "S0|freq=14000000"));
        // contains "mode" but not "|freq"
        assert!(!MessageFilter::Prefix.matches("freq", "S0|mode=USB"));
        // empty match text degrades to All
        assert!(MessageFilter::Prefix.matches("", "S0|mode=USB"));
    }

    #[test]
    fn filter_includes_excludes_case_insensitive() {
        assert!(MessageFilter::Includes.matches("SLICE", "C4|slice list"));
        assert!(!MessageFilter::Excludes.matches("SLICE", "C4|slice list"));
        assert!(MessageFilter::Excludes.matches("meter", "C4|slice list"));
        // empty match text degrades to All for both
        assert!(MessageFilter::Includes.matches("", "anything"));
        assert!(MessageFilter::Excludes.matches("", "anything"));
    }

    #[test]
    fn filter_command_status_reply_case_sensitive() {
        assert!(MessageFilter::Command.matches("", "C12|slice tune 0"));
        assert!(!MessageFilter::Command.matches("", "c12|slice tune 0"));
        assert!(MessageFilter::Reply.matches("", "R12|0|"));
        assert!(!MessageFilter::Reply.matches("", "r12|0|"));
    }

    #[test]
    fn filter_s0_vs_status() {
        assert!(MessageFilter::S0.matches("", "S0|voltage=13.8"));
        assert!(!MessageFilter::S0.matches("", "S1|voltage=13.8"));
        assert!(MessageFilter::Status.matches("", "S1ABCDEF|slice 0 mode=USB"));
        assert!(!MessageFilter::Status.matches("", "S0|voltage=13.8"));
    }

    #[test]
    fn filter_serde_round_trip() {
        let json = serde_json::to_string(&MessageFilter::S0).unwrap();
        let back: MessageFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MessageFilter::S0);
    }
}
