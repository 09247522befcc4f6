//! Simulated radio driver.
//!
//! Answers every command against a scripted world of peers and their
//! services. Useful for running tetherd without hardware and for
//! end-to-end tests that do not need to control completion ordering by
//! hand. The simulation honors the driver contract: exactly one
//! CommandDone per command, sightings only for subscribed services, and
//! connection info delivered as events rather than completions.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::sync::mpsc;

use tether_core::config::SimConfig;
use tether_core::radio::{RadioCommand, RadioError, RadioEvent, RadioRequest};
use tether_core::record::{
    ConnectionInfo, DeviceInfo, LocalService, REGISTRATION_TYPE, SERVICE_SUFFIX, TXT_GUID,
    TXT_TIMER,
};

/// A service a simulated peer advertises.
#[derive(Debug, Clone)]
pub struct SimService {
    pub name: String,
    pub guid: String,
    pub ttl: u32,
}

/// One simulated remote device.
#[derive(Debug, Clone)]
pub struct SimPeer {
    pub device: DeviceInfo,
    pub services: Vec<SimService>,
}

pub struct SimRadio {
    commands: mpsc::UnboundedReceiver<RadioRequest>,
    events: mpsc::UnboundedSender<RadioEvent>,
    latency: Duration,
    local_device: DeviceInfo,
    peers: Vec<SimPeer>,
    global_request: bool,
    instance_requests: HashSet<String>,
    local_services: HashMap<String, LocalService>,
    connected_to: Option<String>,
    /// Events triggered by a command, delivered after its completion.
    queued: Vec<RadioEvent>,
}

impl SimRadio {
    pub fn new(
        config: &SimConfig,
        commands: mpsc::UnboundedReceiver<RadioRequest>,
        events: mpsc::UnboundedSender<RadioEvent>,
    ) -> Self {
        Self {
            commands,
            events,
            latency: Duration::from_millis(config.latency_ms),
            local_device: DeviceInfo {
                device_address: config.device_address.clone(),
                device_name: config.device_name.clone(),
            },
            peers: Vec::new(),
            global_request: false,
            instance_requests: HashSet::new(),
            local_services: HashMap::new(),
            connected_to: None,
            queued: Vec::new(),
        }
    }

    /// Add a peer to the scripted world before starting the driver.
    pub fn add_peer(&mut self, peer: SimPeer) {
        self.peers.push(peer);
    }

    pub async fn run(mut self) {
        tracing::info!(
            device = %self.local_device.device_address,
            peers = self.peers.len(),
            "simulated radio starting"
        );

        // Announce the world the way a real driver does at startup.
        self.emit(RadioEvent::StateChanged { enabled: true });
        self.emit(RadioEvent::ThisDeviceChanged(self.local_device.clone()));

        while let Some(RadioRequest { token, command }) = self.commands.recv().await {
            tokio::time::sleep(self.latency).await;
            let result = self.apply(command);
            self.emit(RadioEvent::CommandDone { token, result });
            for event in std::mem::take(&mut self.queued) {
                self.emit(event);
            }
        }

        tracing::info!("simulated radio stopped");
    }

    fn apply(&mut self, command: RadioCommand) -> Result<(), RadioError> {
        tracing::trace!(command = ?command, "sim command");
        match command {
            RadioCommand::DiscoverPeers => {
                let devices = self.peers.iter().map(|p| p.device.clone()).collect();
                self.queued.push(RadioEvent::PeersChanged { devices });
                Ok(())
            }

            RadioCommand::DiscoverServices => {
                self.queued.push(RadioEvent::DiscoveryChanged { started: true });
                self.queue_sightings();
                Ok(())
            }

            RadioCommand::AddServiceRequest { instance: None } => {
                self.global_request = true;
                Ok(())
            }

            RadioCommand::AddServiceRequest {
                instance: Some(instance),
            } => {
                self.instance_requests.insert(instance);
                Ok(())
            }

            RadioCommand::RemoveServiceRequest { instance } => {
                self.instance_requests.remove(&instance);
                Ok(())
            }

            RadioCommand::ClearServiceRequests => {
                self.global_request = false;
                self.instance_requests.clear();
                Ok(())
            }

            RadioCommand::AddLocalService { service } => {
                self.local_services.insert(service.name.clone(), service);
                Ok(())
            }

            RadioCommand::RemoveLocalService { service } => {
                if self.local_services.remove(&service.name).is_none() {
                    tracing::trace!(name = %service.name, "removal of unknown local service");
                }
                Ok(())
            }

            RadioCommand::Connect { config } => {
                if self.connected_to.is_some() {
                    return Err(RadioError::Busy);
                }
                let known = self
                    .peers
                    .iter()
                    .any(|p| p.device.device_address == config.device_address);
                if !known {
                    return Err(RadioError::Rejected(-1));
                }
                self.connected_to = Some(config.device_address.clone());
                self.queued.push(RadioEvent::ConnectionChanged(ConnectionInfo {
                    group_formed: true,
                    is_group_owner: config.group_owner_intent >= 8,
                    group_owner_address: Some(config.device_address),
                }));
                Ok(())
            }

            RadioCommand::CancelConnect => {
                self.connected_to = None;
                Ok(())
            }

            RadioCommand::RemoveGroup => {
                if self.connected_to.take().is_none() {
                    return Err(RadioError::Rejected(-2));
                }
                self.queued.push(RadioEvent::ConnectionChanged(ConnectionInfo {
                    group_formed: false,
                    is_group_owner: false,
                    group_owner_address: None,
                }));
                Ok(())
            }

            RadioCommand::RequestConnectionInfo => {
                self.queued.push(RadioEvent::ConnectionChanged(ConnectionInfo {
                    group_formed: self.connected_to.is_some(),
                    is_group_owner: false,
                    group_owner_address: self.connected_to.clone(),
                }));
                Ok(())
            }

            RadioCommand::StopPeerDiscovery => {
                self.queued.push(RadioEvent::DiscoveryChanged { started: false });
                Ok(())
            }
        }
    }

    /// Report subscribed services. Instance sightings carry no TXT data;
    /// the TXT record follows only for per-instance subscriptions, the
    /// way the real stack answers instance queries.
    fn queue_sightings(&mut self) {
        let mut sightings = Vec::new();
        for peer in &self.peers {
            for service in &peer.services {
                let subscribed =
                    self.global_request || self.instance_requests.contains(&service.name);
                if !subscribed {
                    continue;
                }

                sightings.push(RadioEvent::ServiceAvailable {
                    instance: service.name.clone(),
                    registration_type: REGISTRATION_TYPE.to_string(),
                    device_address: peer.device.device_address.clone(),
                });

                if self.instance_requests.contains(&service.name) {
                    let mut txt = HashMap::new();
                    txt.insert(TXT_GUID.to_string(), service.guid.clone());
                    txt.insert(TXT_TIMER.to_string(), service.ttl.to_string());
                    sightings.push(RadioEvent::TxtRecordAvailable {
                        full_domain_name: format!("{}{}", service.name, SERVICE_SUFFIX),
                        txt,
                        device_address: peer.device.device_address.clone(),
                    });
                }
            }
        }
        self.queued.extend(sightings);
    }

    fn emit(&self, event: RadioEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("event channel closed");
        }
    }
}
