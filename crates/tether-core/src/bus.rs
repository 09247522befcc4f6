//! Upward notifications toward the bus/RPC layer.

use crate::handle::PeerHandle;

/// Signals emitted by the coordinator. Delivered on an outbound channel;
/// the host decides how they cross the RPC boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusSignal {
    FoundAdvertisedName {
        name: String,
        name_prefix: String,
        guid: String,
        device_address: String,
    },
    LostAdvertisedName {
        name: String,
        name_prefix: String,
        guid: String,
        device_address: String,
    },
    LinkEstablished {
        handle: PeerHandle,
    },
    LinkError {
        handle: PeerHandle,
        reason: i32,
    },
    LinkLost {
        handle: PeerHandle,
    },
}
