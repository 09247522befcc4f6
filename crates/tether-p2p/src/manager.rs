//! The coordinator's single-owner message loop.
//!
//! Everything mutable lives here: the service registry, the request
//! tracker, the link slot, the local device info, and the peer roster
//! snapshot. API calls, radio events, command completions, and timer
//! ticks arrive on one queue, so handling is strictly serialized.
//!
//! Radio commands are fire-and-forget sends; the continuation for each
//! in-flight command is kept in a token→pending-op map and applied when
//! the correlated completion arrives. Every completion handler
//! re-checks the state it is about to mutate, so a stale completion
//! arriving after a newer transition is dropped instead of applied.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use tether_core::bus::BusSignal;
use tether_core::config::TetherConfig;
use tether_core::handle::{peer_handle, PeerHandle, Status, NO_HANDLE};
use tether_core::radio::{CommandToken, RadioCommand, RadioError, RadioEvent, RadioRequest};
use tether_core::record::{
    ConnectionInfo, DeviceInfo, LocalService, PeerConfig, DEFAULT_SERVICE_TTL, SERVICE_SUFFIX,
    TXT_GUID, TXT_TIMER,
};

use crate::client::P2pClient;
use crate::iface;
use crate::link::{LinkSlot, PeerState};
use crate::registry::{vanished_devices, RecordChange, ServiceRegistry};
use crate::timers::{Tick, Timers};
use crate::tracker::{canonical_prefix, RequestTracker};

/// Whether the driver is currently running service discovery for us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FindState {
    Idle,
    Discovering,
}

/// Upward API calls, each with a oneshot for the synchronous status.
pub enum ApiCall {
    FindAdvertisedName {
        name: String,
        reply: oneshot::Sender<Status>,
    },
    CancelFindAdvertisedName {
        name: String,
        reply: oneshot::Sender<Status>,
    },
    AdvertiseName {
        name: String,
        guid: String,
        reply: oneshot::Sender<Status>,
    },
    CancelAdvertiseName {
        name: String,
        guid: String,
        reply: oneshot::Sender<Status>,
    },
    EstablishLink {
        device_address: String,
        group_owner_intent: u32,
        reply: oneshot::Sender<i32>,
    },
    ReleaseLink {
        handle: PeerHandle,
        reply: oneshot::Sender<Status>,
    },
    InterfaceNameFromHandle {
        handle: PeerHandle,
        reply: oneshot::Sender<Option<String>>,
    },
}

/// Everything the manager task receives.
pub enum Msg {
    Api(ApiCall),
    Radio(RadioEvent),
    Tick(Tick),
    Shutdown { done: oneshot::Sender<()> },
}

/// Continuation for an in-flight radio command.
enum PendingOp {
    GlobalServiceRequest { prefix: String },
    InstanceServiceRequest { instance: String },
    RemoveServiceRequest { instance: String },
    ClearServiceRequests,
    DiscoverServices,
    DiscoverPeers,
    AddLocalService { name: String },
    Tombstone { name: String },
    RemoveLocalService { name: String },
    Connect,
    CancelConnect,
    RemoveGroup,
    RequestConnectionInfo,
    StopPeerDiscovery,
}

/// Spawn the manager and hand back the API client plus the task handle.
///
/// `radio_tx`/`radio_rx` are the command/event channel pair toward the
/// radio driver; `bus_tx` carries signals toward the bus layer.
pub fn spawn_manager(
    config: &TetherConfig,
    radio_tx: mpsc::UnboundedSender<RadioRequest>,
    radio_rx: mpsc::UnboundedReceiver<RadioEvent>,
    bus_tx: mpsc::UnboundedSender<BusSignal>,
) -> (P2pClient, JoinHandle<()>) {
    let (msg_tx, msg_rx) = mpsc::unbounded_channel();

    // Fold radio events into the single message queue so every
    // mutation happens on the manager task.
    {
        let forward = msg_tx.clone();
        let mut events = radio_rx;
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if forward.send(Msg::Radio(event)).is_err() {
                    return;
                }
            }
        });
    }

    let manager = P2pManager {
        enabled: true,
        find_state: FindState::Idle,
        device: None,
        roster: None,
        registry: ServiceRegistry::new(),
        tracker: RequestTracker::new(),
        link: LinkSlot::new(),
        timers: Timers::new(msg_tx.clone(), &config.timing),
        pending: HashMap::new(),
        next_token: 1,
        radio_tx,
        bus_tx,
        rx: msg_rx,
    };

    let client = P2pClient::new(msg_tx);
    let task = tokio::spawn(manager.run());
    (client, task)
}

pub struct P2pManager {
    enabled: bool,
    find_state: FindState,
    device: Option<DeviceInfo>,
    /// Previous roster snapshot, diffed against the next one for loss
    /// detection. Nothing else reads it.
    roster: Option<Vec<DeviceInfo>>,
    registry: ServiceRegistry,
    tracker: RequestTracker,
    link: LinkSlot,
    timers: Timers,
    pending: HashMap<CommandToken, PendingOp>,
    next_token: CommandToken,
    radio_tx: mpsc::UnboundedSender<RadioRequest>,
    bus_tx: mpsc::UnboundedSender<BusSignal>,
    rx: mpsc::UnboundedReceiver<Msg>,
}

impl P2pManager {
    async fn run(mut self) {
        tracing::info!("p2p manager starting");
        while let Some(msg) = self.rx.recv().await {
            match msg {
                Msg::Api(call) => self.handle_api(call),
                Msg::Radio(event) => self.handle_radio(event),
                Msg::Tick(tick) => self.handle_tick(tick),
                Msg::Shutdown { done } => {
                    self.shutdown();
                    let _ = done.send(());
                    break;
                }
            }
        }
        tracing::info!("p2p manager stopped");
    }

    // ── API calls ─────────────────────────────────────────────────────────

    fn handle_api(&mut self, call: ApiCall) {
        match call {
            ApiCall::FindAdvertisedName { name, reply } => {
                let _ = reply.send(self.find_advertised_name(&name));
            }
            ApiCall::CancelFindAdvertisedName { name, reply } => {
                let _ = reply.send(self.cancel_find_advertised_name(&name));
            }
            ApiCall::AdvertiseName { name, guid, reply } => {
                let _ = reply.send(self.advertise_name(&name, &guid));
            }
            ApiCall::CancelAdvertiseName { name, guid, reply } => {
                let _ = reply.send(self.cancel_advertise_name(&name, &guid));
            }
            ApiCall::EstablishLink {
                device_address,
                group_owner_intent,
                reply,
            } => {
                let _ = reply.send(self.establish_link(&device_address, group_owner_intent));
            }
            ApiCall::ReleaseLink { handle, reply } => {
                let _ = reply.send(self.release_link(handle));
            }
            ApiCall::InterfaceNameFromHandle { handle, reply } => {
                let name = self
                    .device
                    .as_ref()
                    .and_then(|d| iface::interface_name_for_address(&d.device_address));
                tracing::debug!(
                    handle,
                    name = name.as_deref().unwrap_or("<none>"),
                    "interface lookup"
                );
                let _ = reply.send(name);
            }
        }
    }

    fn find_advertised_name(&mut self, name: &str) -> Status {
        if !self.enabled {
            tracing::debug!("find_advertised_name: subsystem is off");
            return Status::Error;
        }

        let prefix = canonical_prefix(name).to_string();
        tracing::debug!(prefix = %prefix, "find_advertised_name");

        if !self.tracker.add_requested(&prefix) {
            tracing::debug!(prefix = %prefix, "request already outstanding");
            if self.find_state != FindState::Discovering {
                self.timers.start_service_discovery();
            }
            return Status::Ok;
        }

        // One global subscription backs every outstanding prefix.
        if self.tracker.global_request() || self.find_state == FindState::Discovering {
            return Status::Ok;
        }

        self.tracker.set_global_request(true);
        self.issue(
            RadioCommand::AddServiceRequest { instance: None },
            PendingOp::GlobalServiceRequest { prefix },
        );
        Status::Ok
    }

    fn cancel_find_advertised_name(&mut self, name: &str) -> Status {
        if !self.enabled {
            tracing::debug!("cancel_find_advertised_name: subsystem is off");
            return Status::Error;
        }

        let prefix = canonical_prefix(name);
        tracing::debug!(prefix, "cancel_find_advertised_name");

        // Bookkeeping is cleared up front; a failed remove is logged and
        // the radio stack stays the source of truth.
        for instance in self.tracker.take_instances_matching(prefix) {
            tracing::debug!(instance = %instance, "removing instance subscription");
            self.issue(
                RadioCommand::RemoveServiceRequest {
                    instance: instance.clone(),
                },
                PendingOp::RemoveServiceRequest { instance },
            );
        }

        self.tracker.remove_requested(prefix);

        if self.tracker.no_requests() {
            tracing::debug!("last find request cancelled, clearing subscriptions");
            self.tracker.clear_subscriptions();
            self.issue(
                RadioCommand::ClearServiceRequests,
                PendingOp::ClearServiceRequests,
            );
            self.timers.stop_service_discovery();
            self.find_state = FindState::Idle;

            if self.tracker.any_local() {
                // Advertisements still need the driver scanning.
                tracing::debug!("advertisements outstanding, keeping peer discovery");
            } else {
                self.issue(RadioCommand::StopPeerDiscovery, PendingOp::StopPeerDiscovery);
            }
        }

        Status::Ok
    }

    fn advertise_name(&mut self, name: &str, guid: &str) -> Status {
        if !self.enabled {
            tracing::debug!("advertise_name: subsystem is off");
            return Status::Error;
        }

        tracing::debug!(name, guid, "advertise_name");
        let service = LocalService::advertisement(name, guid);
        self.tracker.add_local(service.clone());
        self.issue(
            RadioCommand::AddLocalService { service },
            PendingOp::AddLocalService {
                name: name.to_string(),
            },
        );
        Status::Ok
    }

    fn cancel_advertise_name(&mut self, name: &str, guid: &str) -> Status {
        if !self.enabled {
            tracing::debug!("cancel_advertise_name: subsystem is off");
            return Status::Error;
        }

        tracing::debug!(name, "cancel_advertise_name");

        // Republish with a zero timer so remote caches expire the name,
        // then actually withdraw once the propagation window elapses.
        let tombstone = LocalService::tombstone(name, guid);
        self.issue(
            RadioCommand::AddLocalService {
                service: tombstone.clone(),
            },
            PendingOp::Tombstone {
                name: name.to_string(),
            },
        );
        self.timers.schedule_advertise_removal(tombstone);
        Status::Ok
    }

    fn establish_link(&mut self, device_address: &str, group_owner_intent: u32) -> i32 {
        if !self.enabled {
            tracing::debug!("establish_link: subsystem is off");
            return Status::Error.code();
        }

        if self.link.state() != PeerState::Disconnected {
            tracing::warn!(state = ?self.link.state(), "link slot already occupied");
            return Status::Error.code();
        }

        if device_address.is_empty() {
            // "Become discoverable as group owner": report our own
            // handle without occupying the slot.
            let Some(device) = &self.device else {
                tracing::warn!("establish_link: no local device known");
                return Status::Error.code();
            };
            self.timers.disarm_connection_timeout();
            return peer_handle(&device.device_address);
        }

        let config = PeerConfig {
            device_address: device_address.to_string(),
            group_owner_intent,
        };
        let handle = self.link.initiate(config.clone());
        self.issue(RadioCommand::Connect { config }, PendingOp::Connect);
        tracing::debug!(handle, device_address, "link initiated");
        handle
    }

    fn release_link(&mut self, handle: PeerHandle) -> Status {
        if !self.enabled {
            tracing::debug!("release_link: subsystem is off");
            return Status::Error;
        }

        tracing::debug!(handle, state = ?self.link.state(), "release_link");

        match self.link.state() {
            PeerState::Initiated | PeerState::Connecting => {
                self.link.begin_disconnect();
                self.issue(RadioCommand::CancelConnect, PendingOp::CancelConnect);
            }
            PeerState::Connected => {
                // LinkLost is emitted once the connection-info event for
                // the removed group arrives.
                self.link.begin_disconnect();
                self.issue(RadioCommand::RemoveGroup, PendingOp::RemoveGroup);
            }
            other => {
                tracing::warn!(state = ?other, "no link to release");
            }
        }

        Status::Ok
    }

    // ── Radio events ──────────────────────────────────────────────────────

    fn handle_radio(&mut self, event: RadioEvent) {
        match event {
            RadioEvent::CommandDone { token, result } => self.handle_completion(token, result),
            RadioEvent::StateChanged { enabled } => {
                tracing::info!(enabled, "subsystem state changed");
                self.enabled = enabled;
                if !enabled {
                    // Keep-alives die with the subsystem; link loss is
                    // reported by the connection-info event that follows.
                    self.timers.stop_peer_find();
                    self.timers.stop_service_discovery();
                }
            }
            RadioEvent::ConnectionChanged(info) => self.handle_connection_info(&info),
            RadioEvent::ThisDeviceChanged(device) => {
                tracing::debug!(address = %device.device_address, "local device updated");
                self.device = Some(device);
            }
            RadioEvent::PeersChanged { devices } => self.handle_peers_changed(devices),
            RadioEvent::DiscoveryChanged { started } => {
                tracing::debug!(started, "discovery state changed");
            }
            RadioEvent::ServiceAvailable {
                instance,
                registration_type,
                device_address,
            } => self.handle_service_available(instance, &registration_type, &device_address),
            RadioEvent::TxtRecordAvailable {
                full_domain_name,
                txt,
                device_address,
            } => self.handle_txt_record(&full_domain_name, &txt, device_address),
        }
    }

    fn handle_connection_info(&mut self, info: &ConnectionInfo) {
        tracing::debug!(
            group_formed = info.group_formed,
            is_group_owner = info.is_group_owner,
            owner = info.group_owner_address.as_deref().unwrap_or("<unknown>"),
            "connection info"
        );

        self.timers.disarm_connection_timeout();

        if let Some(signal) = self.link.apply_connection_info(info) {
            self.signal(signal);
        }
    }

    fn handle_peers_changed(&mut self, devices: Vec<DeviceInfo>) {
        tracing::debug!(count = devices.len(), "peer roster updated");

        if let Some(previous) = self.roster.take() {
            for address in vanished_devices(&previous, &devices) {
                self.device_lost(&address);
            }
        }
        self.roster = Some(devices);
    }

    fn device_lost(&mut self, address: &str) {
        tracing::debug!(address, "device no longer visible");
        for record in self.registry.evict_device(address) {
            self.signal(BusSignal::LostAdvertisedName {
                name: record.name,
                name_prefix: record.name_prefix,
                guid: record.guid,
                device_address: address.to_string(),
            });
        }
    }

    fn handle_service_available(
        &mut self,
        instance: String,
        registration_type: &str,
        device_address: &str,
    ) {
        tracing::debug!(
            instance = %instance,
            registration_type,
            device = device_address,
            "service available"
        );

        if self.tracker.no_requests() {
            tracing::debug!("no outstanding find requests, ignoring sighting");
            return;
        }

        if self.tracker.prefixes_matching(&instance).is_empty() {
            return;
        }
        if self.tracker.has_instance(&instance) || self.instance_request_pending(&instance) {
            return;
        }

        tracing::debug!(instance = %instance, "subscribing to instance");
        self.issue(
            RadioCommand::AddServiceRequest {
                instance: Some(instance.clone()),
            },
            PendingOp::InstanceServiceRequest { instance },
        );
    }

    fn instance_request_pending(&self, instance: &str) -> bool {
        self.pending.values().any(
            |op| matches!(op, PendingOp::InstanceServiceRequest { instance: i } if i == instance),
        )
    }

    fn handle_txt_record(
        &mut self,
        full_domain_name: &str,
        txt: &HashMap<String, String>,
        device_address: String,
    ) {
        tracing::debug!(domain = full_domain_name, device = %device_address, "txt record");

        let Some(prefix) = self
            .tracker
            .match_instance_prefix(full_domain_name)
            .map(str::to_string)
        else {
            tracing::debug!(domain = full_domain_name, "no subscription matches, ignoring");
            return;
        };

        let guid = txt.get(TXT_GUID).cloned().unwrap_or_default();
        let ttl = match txt.get(TXT_TIMER) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(raw = %raw, "unparseable TIMER value, assuming live");
                DEFAULT_SERVICE_TTL
            }),
            None => DEFAULT_SERVICE_TTL,
        };

        // Strip the service-type suffix to get the advertised name.
        let name = match full_domain_name.rfind(SERVICE_SUFFIX) {
            Some(idx) if idx > 0 => &full_domain_name[..idx],
            _ => full_domain_name,
        };

        match self
            .registry
            .record_observed(name, &prefix, &guid, ttl, &device_address)
        {
            RecordChange::Found(record) => self.signal(BusSignal::FoundAdvertisedName {
                name: record.name,
                name_prefix: record.name_prefix,
                guid: record.guid,
                device_address,
            }),
            RecordChange::Lost(record) => self.signal(BusSignal::LostAdvertisedName {
                name: record.name,
                name_prefix: record.name_prefix,
                guid: record.guid,
                device_address,
            }),
            RecordChange::Refreshed => tracing::trace!(name, "record refreshed"),
            RecordChange::Ignored => tracing::trace!(name, "expiry for unknown record ignored"),
        }
    }

    // ── Command completions ───────────────────────────────────────────────

    fn handle_completion(&mut self, token: CommandToken, result: Result<(), RadioError>) {
        let Some(op) = self.pending.remove(&token) else {
            tracing::warn!(token, "completion for unknown command token");
            return;
        };

        match op {
            PendingOp::GlobalServiceRequest { prefix } => match result {
                Ok(()) => {
                    tracing::debug!("global service request accepted");
                    if self.enabled {
                        self.timers.start_service_discovery();
                    }
                }
                Err(error) => {
                    // Leave the system as if the request was never made.
                    tracing::warn!(error = %error, prefix = %prefix, "global service request failed");
                    self.tracker.set_global_request(false);
                    self.tracker.remove_requested(&prefix);
                }
            },

            PendingOp::InstanceServiceRequest { instance } => match result {
                Ok(()) => {
                    tracing::debug!(instance = %instance, "instance subscription added");
                    self.tracker.add_instance(&instance);
                }
                Err(error) => {
                    tracing::warn!(error = %error, instance = %instance, "instance subscription failed");
                }
            },

            PendingOp::RemoveServiceRequest { instance } => {
                if let Err(error) = result {
                    tracing::warn!(error = %error, instance = %instance, "remove service request failed");
                }
            }

            PendingOp::ClearServiceRequests => {
                if let Err(error) = result {
                    tracing::warn!(error = %error, "clear service requests failed");
                }
            }

            PendingOp::DiscoverServices => match result {
                Ok(()) => {
                    tracing::debug!("service discovery started");
                    self.find_state = FindState::Discovering;
                }
                Err(error) => {
                    tracing::debug!(error = %error, "service discovery failed");
                    self.find_state = FindState::Idle;
                }
            },

            PendingOp::DiscoverPeers => {
                if let Err(error) = result {
                    tracing::debug!(error = %error, "discover peers failed");
                }
            }

            PendingOp::AddLocalService { name } => match result {
                Ok(()) => {
                    tracing::debug!(name = %name, "advertisement registered");
                    // Records only propagate while the driver keeps
                    // scanning for peers.
                    if self.enabled && self.find_state != FindState::Discovering {
                        self.timers.start_peer_find();
                    }
                }
                Err(error) => {
                    tracing::warn!(error = %error, name = %name, "advertisement failed");
                    self.tracker.remove_local(&name);
                }
            },

            PendingOp::Tombstone { name } => match result {
                Ok(()) => tracing::debug!(name = %name, "withdrawal tombstone published"),
                Err(error) => {
                    tracing::warn!(error = %error, name = %name, "tombstone publish failed");
                }
            },

            PendingOp::RemoveLocalService { name } => {
                if let Err(error) = result {
                    tracing::warn!(error = %error, name = %name, "remove local service failed");
                }
            }

            PendingOp::Connect => match result {
                Ok(()) => {
                    tracing::debug!("connect initiated");
                    self.link.connect_accepted();
                    self.timers.arm_connection_timeout();
                }
                Err(error) => {
                    if matches!(
                        self.link.state(),
                        PeerState::Initiated | PeerState::Connecting
                    ) {
                        self.timers.disarm_connection_timeout();
                        let handle = self.link.reset();
                        tracing::warn!(error = %error, handle, "connect failed");
                        self.signal(BusSignal::LinkError {
                            handle,
                            reason: error.reason_code(),
                        });
                    } else {
                        tracing::debug!(error = %error, state = ?self.link.state(), "stale connect failure ignored");
                    }
                }
            },

            PendingOp::CancelConnect => {
                // Success or failure alike the attempt is over. A failure
                // usually means the connection completed first, in which
                // case the connection-info event already moved us on.
                if self.link.state() == PeerState::Disconnecting {
                    self.timers.disarm_connection_timeout();
                    self.link.reset();
                }
                if let Err(error) = result {
                    tracing::debug!(error = %error, "cancel connect reported failure");
                }
            }

            PendingOp::RemoveGroup => match result {
                Ok(()) => tracing::debug!("group removal initiated"),
                Err(error) => {
                    if self.link.state() == PeerState::Disconnecting {
                        self.timers.disarm_connection_timeout();
                        let handle = self.link.reset();
                        tracing::warn!(error = %error, handle, "group removal failed");
                        if handle != NO_HANDLE {
                            self.signal(BusSignal::LinkError {
                                handle,
                                reason: error.reason_code(),
                            });
                        }
                    } else {
                        tracing::debug!(error = %error, "stale group removal failure ignored");
                    }
                }
            },

            PendingOp::RequestConnectionInfo => {
                if let Err(error) = result {
                    tracing::warn!(error = %error, "connection info request failed");
                }
            }

            PendingOp::StopPeerDiscovery => {
                if let Err(error) = result {
                    tracing::warn!(error = %error, "stop peer discovery failed");
                }
            }
        }
    }

    // ── Timer ticks ───────────────────────────────────────────────────────

    fn handle_tick(&mut self, tick: Tick) {
        match tick {
            Tick::PeerFind => {
                // A tick queued just before its timer was cancelled is
                // not a keep-alive anymore.
                if !self.enabled || !self.timers.peer_find_active() {
                    return;
                }
                tracing::debug!("keep peer discovery alive");
                self.issue(RadioCommand::DiscoverPeers, PendingOp::DiscoverPeers);
            }

            Tick::ServiceDiscovery => {
                if !self.enabled || !self.timers.service_discovery_active() {
                    return;
                }
                tracing::debug!("keep service discovery alive");
                self.issue(RadioCommand::DiscoverServices, PendingOp::DiscoverServices);
            }

            Tick::ConnectionTimeout { generation } => {
                if !self.timers.connection_timeout_current(generation) || !self.enabled {
                    return;
                }
                // The poll result arrives as a connection-info event and
                // drives the actual transition.
                tracing::debug!("connection initiation timed out, polling connection info");
                self.issue(
                    RadioCommand::RequestConnectionInfo,
                    PendingOp::RequestConnectionInfo,
                );
            }

            Tick::AdvertiseExpired { service } => {
                if !self.enabled {
                    return;
                }
                let name = service.name.clone();
                tracing::debug!(name = %name, "withdrawing local service");
                self.tracker.remove_local(&name);
                self.issue(
                    RadioCommand::RemoveLocalService { service },
                    PendingOp::RemoveLocalService { name },
                );
                if self.find_state != FindState::Discovering && !self.tracker.any_local() {
                    tracing::debug!("nothing left to advertise, stopping peer discovery keep-alive");
                    self.timers.stop_peer_find();
                }
            }
        }
    }

    // ── Shutdown ──────────────────────────────────────────────────────────

    fn shutdown(&mut self) {
        tracing::debug!("shutting down: clearing subscriptions and discovery");
        self.tracker.clear_subscriptions();
        self.issue(
            RadioCommand::ClearServiceRequests,
            PendingOp::ClearServiceRequests,
        );
        self.timers.stop_service_discovery();
        self.timers.stop_peer_find();
        self.issue(RadioCommand::StopPeerDiscovery, PendingOp::StopPeerDiscovery);
        self.find_state = FindState::Idle;
    }

    // ── Plumbing ──────────────────────────────────────────────────────────

    fn issue(&mut self, command: RadioCommand, op: PendingOp) {
        let token = self.next_token;
        self.next_token += 1;
        tracing::trace!(token, command = ?command, "issuing radio command");
        self.pending.insert(token, op);
        if self.radio_tx.send(RadioRequest { token, command }).is_err() {
            tracing::warn!(token, "radio command channel closed");
            self.pending.remove(&token);
        }
    }

    fn signal(&self, signal: BusSignal) {
        tracing::debug!(signal = ?signal, "bus signal");
        if self.bus_tx.send(signal).is_err() {
            tracing::warn!("bus signal channel closed");
        }
    }
}
