//! LAN advertisement feed.
//!
//! Radios announce themselves by broadcasting `key=value` advertisement
//! datagrams on UDP port 4992. [`LanFeed`] listens passively, parses each
//! datagram into a [`DiscoveredTarget`] (plus one station entry per
//! advertised client with a station name), and applies the result to the
//! registry. Targets that stop being re-advertised are expired after a
//! staleness timeout.
//!
//! Feed errors are non-fatal: a receive error is logged and the loop
//! keeps listening, so the registry simply stops receiving updates until
//! the feed recovers.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::Instant;

use sdrlink_core::error::{Error, Result};
use sdrlink_core::{DiscoveredTarget, GuiClientSession, SessionHandle, TargetSource};

use crate::registry::DiscoveryRegistry;

/// Default UDP port radios broadcast advertisements on.
pub const ADVERTISEMENT_PORT: u16 = 4992;

/// Default time after which a non-re-advertised target is expired.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(15);

/// Passive UDP listener feeding the discovery registry.
///
/// The background task runs until [`stop`](LanFeed::stop) is called or
/// the feed is dropped.
pub struct LanFeed {
    task: tokio::task::JoinHandle<()>,
}

impl LanFeed {
    /// Start listening on the default advertisement port.
    pub async fn start(registry: Arc<DiscoveryRegistry>) -> Result<Self> {
        Self::start_on_port(registry, ADVERTISEMENT_PORT, DEFAULT_STALE_AFTER).await
    }

    /// Start listening on a specific port with a specific staleness
    /// timeout.
    ///
    /// This variant allows tests to use a non-privileged port and a short
    /// expiry for mock advertisements sent via loopback.
    pub async fn start_on_port(
        registry: Arc<DiscoveryRegistry>,
        port: u16,
        stale_after: Duration,
    ) -> Result<Self> {
        let bind_addr = format!("0.0.0.0:{port}");
        let socket = UdpSocket::bind(&bind_addr).await.map_err(|e| {
            Error::Discovery(format!(
                "failed to bind advertisement socket on {bind_addr}: {e}"
            ))
        })?;

        tracing::debug!(port, "Listening for radio advertisements");

        let task = tokio::spawn(async move {
            listen_loop(socket, registry, stale_after).await;
        });

        Ok(Self { task })
    }

    /// Stop the feed. Targets it produced remain in the registry until
    /// purged by [`DiscoveryRegistry::set_source_enabled`].
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for LanFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Background task: receive datagrams, upsert targets, expire stale ones.
async fn listen_loop(socket: UdpSocket, registry: Arc<DiscoveryRegistry>, stale_after: Duration) {
    let mut buf = [0u8; 4096];
    // Expiry bookkeeping, keyed by registry id.
    let mut last_seen: HashMap<String, Instant> = HashMap::new();
    // Station entry ids derived from each radio's latest advertisement.
    let mut derived: HashMap<String, Vec<String>> = HashMap::new();

    let tick = (stale_after / 4).max(Duration::from_millis(50));

    loop {
        match tokio::time::timeout(tick, socket.recv_from(&mut buf)).await {
            Ok(Ok((n, src_addr))) => {
                let Ok(payload) = std::str::from_utf8(&buf[..n]) else {
                    continue;
                };
                let Some(radio) = parse_advertisement(payload, src_addr.ip()) else {
                    continue;
                };

                let stations = station_entries(&radio);
                let mut ids = vec![radio.id.clone()];
                ids.extend(stations.iter().map(|s| s.id.clone()));

                // Retire station entries the radio no longer advertises.
                if let Some(previous) = derived.insert(radio.id.clone(), ids.clone()) {
                    for gone in previous.iter().filter(|p| !ids.contains(p)) {
                        registry.remove(gone);
                        last_seen.remove(gone);
                    }
                }

                let now = Instant::now();
                for id in &ids {
                    last_seen.insert(id.clone(), now);
                }

                tracing::trace!(
                    id = %radio.id,
                    model = %radio.model,
                    stations = stations.len(),
                    "Advertisement received"
                );
                registry.upsert(radio);
                for station in stations {
                    registry.upsert(station);
                }
            }
            Ok(Err(e)) => {
                tracing::trace!(error = %e, "Advertisement recv error");
            }
            Err(_) => {
                // Tick elapsed with no datagram; fall through to the sweep.
            }
        }

        let now = Instant::now();
        let stale: Vec<String> = last_seen
            .iter()
            .filter(|(_, seen)| now.duration_since(**seen) > stale_after)
            .map(|(id, _)| id.clone())
            .collect();
        for id in stale {
            last_seen.remove(&id);
            derived.remove(&id);
            registry.remove(&id);
            tracing::debug!(id = %id, "Target expired (no re-advertisement)");
        }
    }
}

/// Parse one advertisement datagram payload.
///
/// The payload is ASCII `key=value` pairs separated by whitespace. A
/// serial number is required; the address falls back to the datagram's
/// source IP when no `ip` key is present.
pub fn parse_advertisement(payload: &str, src_ip: IpAddr) -> Option<DiscoveredTarget> {
    let mut kv: HashMap<&str, &str> = HashMap::new();
    for token in payload.split_whitespace() {
        if let Some(eq_pos) = token.find('=') {
            kv.insert(&token[..eq_pos], &token[eq_pos + 1..]);
        }
    }

    let serial = (*kv.get("serial")?).to_string();
    if serial.is_empty() {
        return None;
    }

    let model = kv.get("model").copied().unwrap_or_default().to_string();
    let nickname = kv
        .get("nickname")
        .or_else(|| kv.get("callsign"))
        .copied()
        .unwrap_or_default()
        .to_string();
    let ip: IpAddr = kv
        .get("ip")
        .and_then(|s| s.parse().ok())
        .unwrap_or(src_ip);
    let port: u16 = kv
        .get("port")
        .and_then(|p| p.parse().ok())
        .unwrap_or(ADVERTISEMENT_PORT);
    let version = kv.get("version").copied().unwrap_or_default().to_string();

    let gui_clients = parse_gui_clients(
        kv.get("gui_client_handles").copied().unwrap_or_default(),
        kv.get("gui_client_programs").copied().unwrap_or_default(),
        kv.get("gui_client_stations").copied().unwrap_or_default(),
    );

    Some(DiscoveredTarget {
        id: serial.clone(),
        name: if nickname.is_empty() {
            model.clone()
        } else {
            nickname
        },
        source: TargetSource::Local,
        address: format!("{ip}:{port}"),
        version,
        model,
        serial,
        station: None,
        gui_clients,
    })
}

/// Parse the comma-separated attached-client lists from an advertisement.
///
/// The three lists are positional; programs and stations may be shorter
/// than the handle list when a client has not registered them yet.
fn parse_gui_clients(handles: &str, programs: &str, stations: &str) -> Vec<GuiClientSession> {
    if handles.is_empty() {
        return Vec::new();
    }
    let programs: Vec<&str> = programs.split(',').collect();
    let stations: Vec<&str> = stations.split(',').collect();

    handles
        .split(',')
        .filter_map(|h| u32::from_str_radix(h.trim().trim_start_matches("0x"), 16).ok())
        .enumerate()
        .map(|(i, handle)| GuiClientSession {
            handle: SessionHandle(handle),
            program: programs.get(i).copied().unwrap_or_default().to_string(),
            station: stations.get(i).copied().unwrap_or_default().to_string(),
            is_local: false,
        })
        .collect()
}

/// Derive one registry entry per advertised station on a radio.
fn station_entries(radio: &DiscoveredTarget) -> Vec<DiscoveredTarget> {
    radio
        .gui_clients
        .iter()
        .filter(|c| !c.station.is_empty())
        .map(|c| DiscoveredTarget {
            id: format!("{}|{}", radio.id, c.station),
            name: c.station.clone(),
            station: Some(c.station.clone()),
            ..radio.clone()
        })
        .collect()
}
