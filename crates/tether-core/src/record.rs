//! Service records and device descriptions shared across the workspace.

use std::collections::HashMap;

/// Registration type under which Tether services are published.
pub const REGISTRATION_TYPE: &str = "_tether._tcp";

/// Suffix carried by full domain names on the wire. Stripped before any
/// registry bookkeeping.
pub const SERVICE_SUFFIX: &str = "._tether._tcp.local.";

/// TXT key carrying the advertising daemon's GUID.
pub const TXT_GUID: &str = "GUID";

/// TXT key carrying the record lifetime hint. Zero means "withdrawn".
pub const TXT_TIMER: &str = "TIMER";

/// Lifetime hint attached to a live advertisement.
pub const DEFAULT_SERVICE_TTL: u32 = 255;

/// A discovered service, scoped to one remote device address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Advertised well-known name, suffix already stripped.
    pub name: String,
    /// The outstanding request prefix this record matched.
    pub name_prefix: String,
    /// GUID of the advertising daemon.
    pub guid: String,
}

/// A locally advertised service: the name/GUID pair plus the TXT map
/// handed to the radio stack verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalService {
    pub name: String,
    pub guid: String,
    pub txt: HashMap<String, String>,
}

impl LocalService {
    /// A live advertisement (TIMER = 255).
    pub fn advertisement(name: &str, guid: &str) -> Self {
        Self::with_timer(name, guid, DEFAULT_SERVICE_TTL)
    }

    /// A withdrawal tombstone (TIMER = 0). Republished in place of the
    /// live record so remote caches expire the name before the local
    /// record is actually removed.
    pub fn tombstone(name: &str, guid: &str) -> Self {
        Self::with_timer(name, guid, 0)
    }

    fn with_timer(name: &str, guid: &str, timer: u32) -> Self {
        let mut txt = HashMap::new();
        txt.insert(TXT_GUID.to_string(), guid.to_string());
        txt.insert(TXT_TIMER.to_string(), timer.to_string());
        Self {
            name: name.to_string(),
            guid: guid.to_string(),
            txt,
        }
    }
}

/// A device as reported by the radio stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Hardware address, lowercase colon-separated hex.
    pub device_address: String,
    /// Human-readable name. Informational only.
    pub device_name: String,
}

/// Snapshot of link-layer connection state from the radio stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub group_formed: bool,
    pub is_group_owner: bool,
    pub group_owner_address: Option<String>,
}

/// A requested link target. Exists only while a link attempt is
/// outstanding or established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerConfig {
    pub device_address: String,
    /// 0 = must act as station, 15 = must act as group owner.
    pub group_owner_intent: u32,
}
