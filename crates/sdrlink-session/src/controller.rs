//! Connection state machine.
//!
//! [`SessionController`] is the central orchestrator: it owns the current
//! connection mode, drives transitions between the connection states, and
//! reconciles auxiliary stream enablement whenever the connection state
//! changes. It is constructed once per application session and passed by
//! reference to any collaborator that needs to read or drive it.
//!
//! Only one connect/disconnect cycle may be in flight at a time. That is
//! enforced by state-gating: an intent atomically claims the machine by
//! moving it out of its gate state, and an intent arriving while any
//! cycle is in flight is ignored as a no-op. Callers are never blocked.
//!
//! Failures never retry. A connect failure is broadcast once and the
//! machine returns to disconnected; a disconnect failure is broadcast
//! once and local state is forced to disconnected anyway, on the
//! assumption that the underlying transport has already torn down.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use sdrlink_core::error::{Error, Result};
use sdrlink_core::{
    AppSettings, Arbitration, AuxStreamKind, ClientRole, ConnectParams, ConnectionState,
    DiscoveredTarget, RadioTransport, SelectionPrompt, SessionEvent, SessionHandle, TargetSource,
};
use sdrlink_discovery::DiscoveryRegistry;
use sdrlink_messages::{Direction, MessagesModel};

use crate::aux::{AuxStream, AuxStreamManager};

/// Program name registered with the radio at connect time.
const PROGRAM_NAME: &str = "sdrlink";

/// Broadcast channel capacity for session event subscribers.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// The single active primary connection.
#[derive(Debug, Clone)]
pub struct ConnectionSession {
    /// The target the session is connected to.
    pub target: DiscoveredTarget,
    /// Role the session was negotiated with.
    pub role: ClientRole,
    /// Handle the radio assigned to this client.
    pub handle: SessionHandle,
    /// Transport parameters the session was negotiated with.
    pub params: ConnectParams,
}

/// The connection orchestrator.
pub struct SessionController {
    transport: Arc<dyn RadioTransport>,
    registry: Arc<DiscoveryRegistry>,
    messages: Arc<MessagesModel>,
    prompt: Arc<dyn SelectionPrompt>,
    settings: Mutex<AppSettings>,
    state: Mutex<ConnectionState>,
    session: Mutex<Option<ConnectionSession>>,
    aux: AuxStreamManager,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    /// Create a controller in the disconnected state.
    pub fn new(
        transport: Arc<dyn RadioTransport>,
        registry: Arc<DiscoveryRegistry>,
        messages: Arc<MessagesModel>,
        prompt: Arc<dyn SelectionPrompt>,
        settings: AppSettings,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let aux = AuxStreamManager::new(Arc::clone(&transport));
        messages.set_show_pings(settings.show_pings);
        Self {
            transport,
            registry,
            messages,
            prompt,
            settings: Mutex::new(settings),
            state: Mutex::new(ConnectionState::Disconnected),
            session: Mutex::new(None),
            aux,
            event_tx,
        }
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap()
    }

    /// Whether the primary connection is active.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Snapshot of the active session, if any.
    pub fn session(&self) -> Option<ConnectionSession> {
        self.session.lock().unwrap().clone()
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> AppSettings {
        self.settings.lock().unwrap().clone()
    }

    /// Subscribe to session events (state changes and failure reports).
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// The message model this controller feeds.
    pub fn messages(&self) -> Arc<MessagesModel> {
        Arc::clone(&self.messages)
    }

    /// The discovery registry this controller consults.
    pub fn registry(&self) -> Arc<DiscoveryRegistry> {
        Arc::clone(&self.registry)
    }

    /// Snapshot of the active auxiliary streams.
    pub async fn active_streams(&self) -> Vec<AuxStream> {
        self.aux.active().await
    }

    // -----------------------------------------------------------------------
    // Connect / disconnect intents
    // -----------------------------------------------------------------------

    /// Process a connect intent.
    ///
    /// Ignored unless the machine is disconnected. The cycle runs to
    /// completion (connected, or back to disconnected) before any new
    /// intent is accepted; outcomes are reported through the event
    /// channel.
    pub async fn connect(&self) {
        let settings = self.settings();
        let role = role_of(&settings);

        if settings.direct_enabled {
            let address = settings.direct_address_for(settings.is_gui).to_string();
            if address.is_empty() {
                // No saved address for this role: ask for one. The machine
                // stays disconnected until the address is supplied.
                if self.state() != ConnectionState::Disconnected {
                    return;
                }
                self.begin_message_cycle(&settings);
                let Some(address) = self.prompt.direct_address(role).await else {
                    tracing::debug!("Direct address request cancelled");
                    return;
                };
                {
                    let mut s = self.settings.lock().unwrap();
                    if settings.is_gui {
                        s.direct_gui_address = address.clone();
                    } else {
                        s.direct_non_gui_address = address.clone();
                    }
                }
                if !self.claim(ConnectionState::Disconnected, ConnectionState::Connecting) {
                    return;
                }
                self.do_connect(DiscoveredTarget::direct(&address), role, None, &settings)
                    .await;
            } else {
                if !self.claim(ConnectionState::Disconnected, ConnectionState::Connecting) {
                    return;
                }
                self.begin_message_cycle(&settings);
                self.do_connect(DiscoveredTarget::direct(&address), role, None, &settings)
                    .await;
            }
            return;
        }

        // Local/cloud mode with a usable saved default skips the picker.
        if settings.use_default {
            let preferred = settings.default_for(settings.is_gui);
            if let Some(target) = self.registry.resolve_default(preferred, role) {
                if !self.claim(ConnectionState::Disconnected, ConnectionState::Negotiating) {
                    return;
                }
                tracing::debug!(id = %target.id, "Using saved default target");
                self.begin_message_cycle(&settings);
                self.negotiate(target, role, &settings).await;
                return;
            }
            tracing::debug!(preferred, "Saved default is not usable; opening picker");
        }

        if !self.claim(ConnectionState::Disconnected, ConnectionState::Discovering) {
            return;
        }
        self.begin_message_cycle(&settings);

        let candidates = self.registry.targets();
        match self.prompt.pick_target(&candidates).await {
            None => {
                tracing::debug!("Target selection cancelled");
                self.set_state(ConnectionState::Disconnected);
            }
            Some(id) => match self.registry.get(&id) {
                Some(target) => self.negotiate(target, role, &settings).await,
                None => {
                    // The target vanished between the snapshot and the pick.
                    tracing::warn!(id = %id, "Selected target is no longer reachable");
                    self.notify(SessionEvent::ConnectFailed(format!(
                        "{id} is no longer reachable"
                    )));
                    self.set_state(ConnectionState::ErrorOnConnect);
                    self.set_state(ConnectionState::Disconnected);
                }
            },
        }
    }

    /// Process a disconnect intent.
    ///
    /// Ignored unless the machine is connected. All auxiliary streams are
    /// torn down (order-independent) before the transport disconnect, and
    /// local state ends up disconnected even when the transport call
    /// fails.
    pub async fn disconnect(&self) {
        if !self.claim(ConnectionState::Connected, ConnectionState::Disconnecting) {
            tracing::debug!(state = %self.state(), "Disconnect intent ignored");
            return;
        }

        let settings = self.settings();
        if settings.clear_on_stop {
            self.messages.clear();
        }

        let removed = self.aux.disable_all().await;
        if removed > 0 {
            tracing::debug!(removed, "Auxiliary streams torn down");
        }

        match self.transport.disconnect().await {
            Ok(()) => {
                tracing::debug!("Disconnected");
                self.set_state(ConnectionState::Disconnected);
            }
            Err(e) => {
                // Local state is authoritative over remote acknowledgment.
                tracing::warn!(error = %e, "Disconnect failed; forcing local state");
                self.notify(SessionEvent::DisconnectFailed(e.to_string()));
                self.set_state(ConnectionState::ErrorOnDisconnect);
                self.set_state(ConnectionState::Disconnected);
            }
        }
        *self.session.lock().unwrap() = None;
    }

    // -----------------------------------------------------------------------
    // Mode toggles
    // -----------------------------------------------------------------------

    /// Enable or disable LAN discovery.
    ///
    /// Disabling purges all locally-sourced targets. Changing either
    /// discovery mode leaves direct mode.
    pub fn set_local_enabled(&self, enabled: bool) {
        {
            let mut s = self.settings.lock().unwrap();
            s.local_enabled = enabled;
            s.direct_enabled = false;
        }
        self.registry.set_source_enabled(TargetSource::Local, enabled);
    }

    /// Enable or disable cloud relay discovery.
    ///
    /// Disabling purges all cloud-sourced targets. Enabling may require a
    /// login; a cancelled login turns the mode back off.
    pub async fn set_cloud_enabled(&self, enabled: bool) {
        {
            let mut s = self.settings.lock().unwrap();
            s.cloud_enabled = enabled;
            s.direct_enabled = false;
        }
        self.registry.set_source_enabled(TargetSource::Cloud, enabled);
        if !enabled {
            return;
        }

        let settings = self.settings();
        if settings.login_required || settings.cloud_user.is_empty() {
            match self.prompt.login().await {
                Some(credentials)
                    if !credentials.user.is_empty() && !credentials.password.is_empty() =>
                {
                    let mut s = self.settings.lock().unwrap();
                    s.cloud_user = credentials.user;
                    s.login_required = false;
                }
                Some(credentials) => {
                    self.notify(SessionEvent::LoginFailed(format!(
                        "incomplete credentials for {}",
                        credentials.user
                    )));
                    self.settings.lock().unwrap().cloud_enabled = false;
                    self.registry.set_source_enabled(TargetSource::Cloud, false);
                }
                None => {
                    tracing::debug!("Cloud login cancelled");
                    self.settings.lock().unwrap().cloud_enabled = false;
                    self.registry.set_source_enabled(TargetSource::Cloud, false);
                }
            }
        }
    }

    /// Enable or disable direct-address mode.
    ///
    /// Direct mode is mutually exclusive with both discovery modes;
    /// enabling it purges all advertised targets.
    pub fn set_direct_enabled(&self, enabled: bool) {
        {
            let mut s = self.settings.lock().unwrap();
            s.direct_enabled = enabled;
            if enabled {
                s.local_enabled = false;
                s.cloud_enabled = false;
            }
        }
        if enabled {
            self.registry.set_source_enabled(TargetSource::Local, false);
            self.registry.set_source_enabled(TargetSource::Cloud, false);
        }
    }

    /// Toggle the saved default target for the current role.
    ///
    /// Selecting the current default clears it; selecting anything else
    /// replaces it and arms the default for the next connect.
    pub fn set_default(&self, selection: &str) {
        let mut s = self.settings.lock().unwrap();
        if s.is_gui {
            if s.gui_default == selection {
                s.gui_default.clear();
                s.use_default = false;
            } else {
                s.gui_default = selection.to_string();
                s.use_default = true;
            }
        } else if s.non_gui_default == selection {
            s.non_gui_default.clear();
            s.use_default = false;
        } else {
            s.non_gui_default = selection.to_string();
            s.use_default = true;
        }
    }

    // -----------------------------------------------------------------------
    // Commands and message policies
    // -----------------------------------------------------------------------

    /// Send one command line to the radio and record it in the history.
    ///
    /// The pending command text keeps the sent line for re-editing
    /// unless `clear_on_send` is set, in which case it is emptied.
    pub async fn send_command(&self, text: &str) -> Result<()> {
        if self.state() != ConnectionState::Connected {
            return Err(Error::NotConnected);
        }
        {
            let mut s = self.settings.lock().unwrap();
            s.commands.push(text.to_string());
            s.command_index = s.commands.len().saturating_sub(1);
            s.command_to_send = if s.clear_on_send {
                String::new()
            } else {
                text.to_string()
            };
        }
        self.messages.record(Direction::Sent, text);
        self.transport.send_command(text).await
    }

    /// Recall the next command from the history into the pending text,
    /// wrapping at the end.
    pub fn command_next(&self) -> Option<String> {
        let mut s = self.settings.lock().unwrap();
        if s.commands.is_empty() {
            return None;
        }
        if s.command_index >= s.commands.len() - 1 {
            s.command_index = 0;
        } else {
            s.command_index += 1;
        }
        s.command_to_send = s.commands[s.command_index].clone();
        Some(s.command_to_send.clone())
    }

    /// Recall the previous command from the history into the pending
    /// text, wrapping at the start.
    pub fn command_previous(&self) -> Option<String> {
        let mut s = self.settings.lock().unwrap();
        if s.commands.is_empty() {
            return None;
        }
        if s.command_index == 0 {
            s.command_index = s.commands.len() - 1;
        } else {
            s.command_index -= 1;
        }
        s.command_to_send = s.commands[s.command_index].clone();
        Some(s.command_to_send.clone())
    }

    /// Change the active message filter and rebuild the filtered view.
    pub fn re_filter(&self, filter: sdrlink_core::MessageFilter, filter_text: &str) {
        {
            let mut s = self.settings.lock().unwrap();
            s.message_filter = filter;
            s.message_filter_text = filter_text.to_string();
        }
        self.messages.re_filter(filter, filter_text);
    }

    /// Retain or suppress sent keep-alives from now on.
    pub fn set_show_pings(&self, show: bool) {
        self.settings.lock().unwrap().show_pings = show;
        self.messages.set_show_pings(show);
    }

    // -----------------------------------------------------------------------
    // Auxiliary stream toggles
    // -----------------------------------------------------------------------

    /// Toggle remote RX audio.
    ///
    /// While disconnected this only records the preference; it is
    /// reconciled on the next transition into connected.
    pub async fn set_remote_rx_audio(&self, enabled: bool) {
        {
            self.settings.lock().unwrap().remote_rx_audio_enabled = enabled;
        }
        if self.state() != ConnectionState::Connected {
            return;
        }
        if enabled {
            let compressed = self.settings().remote_rx_audio_compressed;
            if !self.enable_aux(AuxStreamKind::RemoteRxAudio, compressed).await {
                self.settings.lock().unwrap().remote_rx_audio_enabled = false;
            }
        } else {
            self.disable_aux(AuxStreamKind::RemoteRxAudio).await;
        }
    }

    /// Change the remote RX audio compression preference.
    ///
    /// An active stream cannot change format in place: the stream is
    /// stopped and the toggle cleared, so the user re-enables with the
    /// new format.
    pub async fn set_remote_rx_audio_compressed(&self, compressed: bool) {
        {
            self.settings.lock().unwrap().remote_rx_audio_compressed = compressed;
        }
        if self.state() == ConnectionState::Connected && self.settings().remote_rx_audio_enabled {
            self.settings.lock().unwrap().remote_rx_audio_enabled = false;
            self.disable_aux(AuxStreamKind::RemoteRxAudio).await;
        }
    }

    /// Toggle remote TX audio.
    pub async fn set_remote_tx_audio(&self, enabled: bool) {
        {
            self.settings.lock().unwrap().remote_tx_audio_enabled = enabled;
        }
        if self.state() != ConnectionState::Connected {
            return;
        }
        if enabled {
            if !self.enable_aux(AuxStreamKind::RemoteTxAudio, false).await {
                self.settings.lock().unwrap().remote_tx_audio_enabled = false;
            }
        } else {
            self.disable_aux(AuxStreamKind::RemoteTxAudio).await;
        }
    }

    /// Change the selected DAX channel: -1 off, 0 mic, 1-8 receive.
    ///
    /// A channel switch removes the old channel's stream strictly before
    /// requesting the new one, so two streams of the same kind never
    /// coexist.
    pub async fn set_dax_channel(&self, channel: i8) {
        let previous = {
            let mut s = self.settings.lock().unwrap();
            let previous = s.dax_channel;
            s.dax_channel = channel;
            previous
        };
        if previous == channel || self.state() != ConnectionState::Connected {
            return;
        }

        let compressed = self.settings().low_bandwidth_dax;
        if channel < 0 {
            self.disable_aux(dax_kind(previous)).await;
        } else if previous < 0 {
            if !self.enable_aux(dax_kind(channel), compressed).await {
                self.settings.lock().unwrap().dax_channel = -1;
            }
        } else {
            let Some(handle) = self.session_handle() else {
                return;
            };
            match self
                .aux
                .switch(dax_kind(previous), dax_kind(channel), compressed, handle)
                .await
            {
                Ok(id) => {
                    tracing::debug!(channel, id = %id, "DAX channel switched");
                }
                Err(e) => {
                    tracing::warn!(channel, error = %e, "DAX channel switch failed");
                    self.notify(SessionEvent::StreamFailed {
                        kind: dax_kind(channel),
                        reason: e.to_string(),
                    });
                    self.settings.lock().unwrap().dax_channel = -1;
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Atomically verify the machine is in `from` and move it to `to`.
    ///
    /// This is the single enforcement point for the one-cycle-in-flight
    /// guarantee.
    fn claim(&self, from: ConnectionState, to: ConnectionState) -> bool {
        {
            let mut state = self.state.lock().unwrap();
            if *state != from {
                tracing::debug!(state = %*state, "Intent ignored (cycle in flight)");
                return false;
            }
            *state = to;
        }
        self.notify(SessionEvent::StateChanged(to));
        true
    }

    fn set_state(&self, next: ConnectionState) {
        {
            let mut state = self.state.lock().unwrap();
            if *state == next {
                return;
            }
            tracing::debug!(from = %*state, to = %next, "Connection state changed");
            *state = next;
        }
        self.notify(SessionEvent::StateChanged(next));
    }

    fn notify(&self, event: SessionEvent) {
        // No subscribers is fine; the UI may not be listening yet.
        let _ = self.event_tx.send(event);
    }

    fn session_handle(&self) -> Option<SessionHandle> {
        self.session.lock().unwrap().as_ref().map(|s| s.handle)
    }

    /// Message-history policy at the start of a connect cycle.
    fn begin_message_cycle(&self, settings: &AppSettings) {
        if settings.clear_on_start {
            self.messages.clear();
        }
        self.messages.reset_start_time();
    }

    /// Arbitrate if the target has conflicting sessions, then connect.
    async fn negotiate(&self, target: DiscoveredTarget, role: ClientRole, settings: &AppSettings) {
        self.set_state(ConnectionState::Negotiating);

        let evict = if role == ClientRole::Gui && !target.gui_clients.is_empty() {
            match self.prompt.arbitrate(&target, &target.gui_clients).await {
                Arbitration::Cancel => {
                    // A declined eviction is a normal abort, not an error.
                    tracing::debug!(id = %target.id, "Arbitration cancelled");
                    self.set_state(ConnectionState::Disconnected);
                    return;
                }
                Arbitration::Connect(evict) => evict,
            }
        } else {
            None
        };

        self.set_state(ConnectionState::Connecting);
        self.do_connect(target, role, evict, settings).await;
    }

    /// Invoke the transport connect and settle the cycle.
    async fn do_connect(
        &self,
        target: DiscoveredTarget,
        role: ClientRole,
        evict: Option<SessionHandle>,
        settings: &AppSettings,
    ) {
        let params = ConnectParams {
            program: PROGRAM_NAME.to_string(),
            station: settings.station.clone(),
            mtu: settings.mtu,
            low_bandwidth_connect: settings.low_bandwidth_connect,
            low_bandwidth_dax: settings.low_bandwidth_dax,
        };

        match self.transport.connect(&target, role, evict, &params).await {
            Ok(handle) => {
                tracing::debug!(id = %target.id, handle = %handle, "Connected");
                {
                    let mut session = self.session.lock().unwrap();
                    *session = Some(ConnectionSession {
                        target,
                        role,
                        handle,
                        params,
                    });
                }
                self.set_state(ConnectionState::Connected);
                self.reconcile_aux().await;
            }
            Err(e) => {
                tracing::warn!(id = %target.id, error = %e, "Connect failed");
                self.notify(SessionEvent::ConnectFailed(e.to_string()));
                self.set_state(ConnectionState::ErrorOnConnect);
                self.set_state(ConnectionState::Disconnected);
            }
        }
    }

    /// Re-activate auxiliary streams whose toggles are already enabled.
    ///
    /// Connection state and auxiliary enablement are independently
    /// toggled by the user and reconciled on every transition into
    /// connected.
    async fn reconcile_aux(&self) {
        let settings = self.settings();
        if settings.remote_rx_audio_enabled
            && !self
                .enable_aux(
                    AuxStreamKind::RemoteRxAudio,
                    settings.remote_rx_audio_compressed,
                )
                .await
        {
            self.settings.lock().unwrap().remote_rx_audio_enabled = false;
        }
        if settings.remote_tx_audio_enabled
            && !self.enable_aux(AuxStreamKind::RemoteTxAudio, false).await
        {
            self.settings.lock().unwrap().remote_tx_audio_enabled = false;
        }
        if settings.dax_channel >= 0
            && !self
                .enable_aux(dax_kind(settings.dax_channel), settings.low_bandwidth_dax)
                .await
        {
            self.settings.lock().unwrap().dax_channel = -1;
        }
    }

    /// Enable one auxiliary stream, reporting failure once.
    async fn enable_aux(&self, kind: AuxStreamKind, compressed: bool) -> bool {
        let Some(handle) = self.session_handle() else {
            return false;
        };
        match self.aux.enable(kind, compressed, handle).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "Auxiliary stream request failed");
                self.notify(SessionEvent::StreamFailed {
                    kind,
                    reason: e.to_string(),
                });
                false
            }
        }
    }

    /// Disable one auxiliary stream, reporting a failed removal once.
    async fn disable_aux(&self, kind: AuxStreamKind) {
        if let Err(e) = self.aux.disable(kind).await {
            tracing::warn!(kind = %kind, error = %e, "Auxiliary stream removal failed");
            self.notify(SessionEvent::StreamFailed {
                kind,
                reason: e.to_string(),
            });
        }
    }
}

/// The stream kind selected by a DAX channel number (0 = mic).
fn dax_kind(channel: i8) -> AuxStreamKind {
    if channel == 0 {
        AuxStreamKind::DaxMicAudio
    } else {
        AuxStreamKind::DaxRxAudio(channel as u8)
    }
}

fn role_of(settings: &AppSettings) -> ClientRole {
    if settings.is_gui {
        ClientRole::Gui
    } else {
        ClientRole::NonGui
    }
}
