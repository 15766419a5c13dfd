//! Persisted application settings.
//!
//! All user preferences the orchestration core consumes live in one
//! explicit struct, persisted as a single JSON document. Defaults match a
//! first-launch configuration: local discovery on, full-control role,
//! nothing saved.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::MessageFilter;

/// Persisted defaults and toggles.
///
/// The per-role saved defaults (`gui_default` / `non_gui_default` and the
/// two direct addresses) let a connect intent bypass interactive target
/// selection when `use_default` is set and the saved target is still
/// reachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Connect in full-control (GUI) role rather than shared.
    pub is_gui: bool,
    /// LAN broadcast discovery enabled.
    pub local_enabled: bool,
    /// Cloud relay discovery enabled.
    pub cloud_enabled: bool,
    /// Direct-address mode enabled (mutually exclusive with the two
    /// discovery modes).
    pub direct_enabled: bool,

    /// Saved default target id for full-control connections.
    pub gui_default: String,
    /// Saved default target id for shared connections.
    pub non_gui_default: String,
    /// Saved direct address for full-control connections.
    pub direct_gui_address: String,
    /// Saved direct address for shared connections.
    pub direct_non_gui_address: String,
    /// Bypass the picker when a saved default is valid.
    pub use_default: bool,

    /// Cloud relay account name.
    pub cloud_user: String,
    /// Force an interactive login on the next cloud relay start.
    pub login_required: bool,

    /// Station name registered with the radio.
    pub station: String,
    /// Command-channel MTU.
    pub mtu: u32,
    /// Reduced-bandwidth primary connection.
    pub low_bandwidth_connect: bool,
    /// Compressed DAX audio.
    pub low_bandwidth_dax: bool,

    /// Remote RX audio toggle; reconciled with the connection state on
    /// every transition into or out of connected.
    pub remote_rx_audio_enabled: bool,
    /// Request the compressed variant of remote RX audio.
    pub remote_rx_audio_compressed: bool,
    /// Remote TX audio toggle.
    pub remote_tx_audio_enabled: bool,
    /// Selected DAX channel: -1 off, 0 mic, 1-8 receive channels.
    pub dax_channel: i8,

    /// Active message filter kind.
    pub message_filter: MessageFilter,
    /// Free-text match string for the active filter.
    pub message_filter_text: String,
    /// Retain sent keep-alive messages in the history.
    pub show_pings: bool,
    /// Display time offsets alongside messages.
    pub show_times: bool,
    /// Clear the message history when a connection starts.
    pub clear_on_start: bool,
    /// Clear the message history when a connection stops.
    pub clear_on_stop: bool,
    /// Clear the pending command text after sending it.
    pub clear_on_send: bool,

    /// Previously sent commands, oldest first.
    pub commands: Vec<String>,
    /// Cursor into `commands` for history recall.
    pub command_index: usize,
    /// Pending command text: the last sent or recalled command, cleared
    /// on send when `clear_on_send` is set.
    pub command_to_send: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            is_gui: true,
            local_enabled: true,
            cloud_enabled: false,
            direct_enabled: false,
            gui_default: String::new(),
            non_gui_default: String::new(),
            direct_gui_address: String::new(),
            direct_non_gui_address: String::new(),
            use_default: false,
            cloud_user: String::new(),
            login_required: false,
            station: "sdrlink".to_string(),
            mtu: 1_300,
            low_bandwidth_connect: false,
            low_bandwidth_dax: false,
            remote_rx_audio_enabled: false,
            remote_rx_audio_compressed: false,
            remote_tx_audio_enabled: false,
            dax_channel: -1,
            message_filter: MessageFilter::All,
            message_filter_text: String::new(),
            show_pings: false,
            show_times: true,
            clear_on_start: true,
            clear_on_stop: true,
            clear_on_send: false,
            commands: Vec::new(),
            command_index: 0,
            command_to_send: String::new(),
        }
    }
}

impl AppSettings {
    /// Read settings from a JSON file, falling back to defaults when the
    /// file does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| Error::Settings(e.to_string()))
    }

    /// Write settings to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text =
            serde_json::to_string_pretty(self).map_err(|e| Error::Settings(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// The saved default target id for the given role, if any.
    pub fn default_for(&self, is_gui: bool) -> &str {
        if is_gui {
            &self.gui_default
        } else {
            &self.non_gui_default
        }
    }

    /// The saved direct address for the given role, if any.
    pub fn direct_address_for(&self, is_gui: bool) -> &str {
        if is_gui {
            &self.direct_gui_address
        } else {
            &self.direct_non_gui_address
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_first_launch() {
        let s = AppSettings::default();
        assert!(s.is_gui);
        assert!(s.local_enabled);
        assert!(!s.cloud_enabled);
        assert!(!s.direct_enabled);
        assert!(!s.use_default);
        assert_eq!(s.dax_channel, -1);
        assert_eq!(s.message_filter, MessageFilter::All);
        assert!(s.clear_on_start);
        assert!(s.clear_on_stop);
        assert!(!s.clear_on_send);
        assert!(s.command_to_send.is_empty());
    }

    #[test]
    fn json_round_trip() {
        let mut s = AppSettings::default();
        s.gui_default = "1234-5678".to_string();
        s.use_default = true;
        s.message_filter = MessageFilter::Status;
        s.message_filter_text = "slice".to_string();
        s.dax_channel = 3;

        let json = serde_json::to_string(&s).unwrap();
        let back: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("sdrlink-settings-missing.json");
        let _ = std::fs::remove_file(&path);
        let s = AppSettings::load(&path).unwrap();
        assert_eq!(s, AppSettings::default());
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join("sdrlink-settings-roundtrip.json");
        let mut s = AppSettings::default();
        s.non_gui_default = "1234-5678|Shack".to_string();
        s.remote_rx_audio_enabled = true;
        s.save(&path).unwrap();

        let back = AppSettings::load(&path).unwrap();
        assert_eq!(back, s);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unknown_fields_use_defaults() {
        // A settings file from an older build may be missing newer keys.
        let s: AppSettings = serde_json::from_str(r#"{"is_gui": false}"#).unwrap();
        assert!(!s.is_gui);
        assert!(s.local_enabled);
        assert_eq!(s.mtu, 1_300);
    }

    #[test]
    fn per_role_accessors() {
        let mut s = AppSettings::default();
        s.gui_default = "radio-a".to_string();
        s.non_gui_default = "radio-a|Shack".to_string();
        s.direct_gui_address = "10.0.0.1:4992".to_string();

        assert_eq!(s.default_for(true), "radio-a");
        assert_eq!(s.default_for(false), "radio-a|Shack");
        assert_eq!(s.direct_address_for(true), "10.0.0.1:4992");
        assert_eq!(s.direct_address_for(false), "");
    }
}
