//! The radio stack boundary.
//!
//! The driver is an external collaborator: commands flow out on one
//! channel, results and unsolicited events flow back on another. Every
//! command carries a correlation token; the driver answers each command
//! with exactly one [`RadioEvent::CommandDone`] for that token. Results
//! for a given command arrive at most once and in issue order, but no
//! ordering is assumed across different commands in flight.

use std::collections::HashMap;

use crate::record::{ConnectionInfo, DeviceInfo, LocalService, PeerConfig};

/// Correlates a command with its completion event.
pub type CommandToken = u64;

/// Commands issued toward the radio driver. All complete asynchronously.
#[derive(Debug, Clone)]
pub enum RadioCommand {
    /// Refresh the peer roster. Also keeps the link layer in a state
    /// where connects and service propagation are possible.
    DiscoverPeers,
    /// Run one service discovery sweep over the current subscriptions.
    DiscoverServices,
    /// Subscribe to service sightings. `None` subscribes to everything
    /// under the Tether registration type.
    AddServiceRequest { instance: Option<String> },
    /// Drop a per-instance subscription.
    RemoveServiceRequest { instance: String },
    /// Drop every subscription at once.
    ClearServiceRequests,
    /// Publish a local service record.
    AddLocalService { service: LocalService },
    /// Withdraw a local service record.
    RemoveLocalService { service: LocalService },
    /// Initiate a link to a peer.
    Connect { config: PeerConfig },
    /// Abort an in-flight connect.
    CancelConnect,
    /// Tear down the formed group.
    RemoveGroup,
    /// Force the driver to re-report connection info (arrives as a
    /// [`RadioEvent::ConnectionChanged`], not as part of the completion).
    RequestConnectionInfo,
    /// Stop the peer discovery the driver is running on our behalf.
    StopPeerDiscovery,
}

/// One outward command with its correlation token.
#[derive(Debug, Clone)]
pub struct RadioRequest {
    pub token: CommandToken,
    pub command: RadioCommand,
}

/// Driver-reported command failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RadioError {
    #[error("radio driver busy")]
    Busy,
    #[error("operation unsupported by driver")]
    Unsupported,
    #[error("driver rejected command (reason {0})")]
    Rejected(i32),
}

impl RadioError {
    /// Numeric reason forwarded in upward error signals.
    pub fn reason_code(&self) -> i32 {
        match self {
            RadioError::Busy => -2,
            RadioError::Unsupported => -3,
            RadioError::Rejected(code) => *code,
        }
    }
}

/// Everything the driver sends back: command completions plus
/// unsolicited state.
#[derive(Debug, Clone)]
pub enum RadioEvent {
    /// Completion for the command issued under `token`.
    CommandDone {
        token: CommandToken,
        result: Result<(), RadioError>,
    },
    /// Subsystem toggled on or off.
    StateChanged { enabled: bool },
    /// Link-layer connection state changed (or was polled).
    ConnectionChanged(ConnectionInfo),
    /// The local device description became known or changed.
    ThisDeviceChanged(DeviceInfo),
    /// Full peer roster snapshot.
    PeersChanged { devices: Vec<DeviceInfo> },
    /// The driver's discovery machinery started or stopped.
    DiscoveryChanged { started: bool },
    /// A service instance was sighted (no TXT data yet).
    ServiceAvailable {
        instance: String,
        registration_type: String,
        device_address: String,
    },
    /// A service's TXT record arrived.
    TxtRecordAvailable {
        full_domain_name: String,
        txt: HashMap<String, String>,
        device_address: String,
    },
}
