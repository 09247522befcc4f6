//! Discovered-service registry — per-device record sets and the
//! found/lost transitions derived from TXT sightings and roster diffs.

use std::collections::HashMap;

use tether_core::record::{DeviceInfo, ServiceRecord};

/// What a TXT sighting did to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordChange {
    /// First sighting of this name on this device.
    Found(ServiceRecord),
    /// A zero-ttl sighting removed a known record.
    Lost(ServiceRecord),
    /// Re-announcement of a known record. No signal.
    Refreshed,
    /// Zero-ttl sighting for a name never seen. No entry, no signal.
    Ignored,
}

/// Per-device sets of discovered service records.
///
/// Names are unique within a device's set. Entries are created on first
/// sighting and removed when the device's last record expires or the
/// device vanishes from the roster.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    devices: HashMap<String, Vec<ServiceRecord>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one TXT sighting.
    ///
    /// `ttl == 0` is an expiry: the matching record (by name) is removed
    /// if present, otherwise nothing happens. A nonzero ttl inserts the
    /// record on first sighting and refreshes silently after that.
    pub fn record_observed(
        &mut self,
        name: &str,
        name_prefix: &str,
        guid: &str,
        ttl: u32,
        device_address: &str,
    ) -> RecordChange {
        let records = self.devices.entry(device_address.to_string()).or_default();
        let known = records.iter().position(|r| r.name == name);

        let change = match (known, ttl) {
            (Some(idx), 0) => RecordChange::Lost(records.remove(idx)),
            (Some(_), _) => RecordChange::Refreshed,
            (None, 0) => RecordChange::Ignored,
            (None, _) => {
                let record = ServiceRecord {
                    name: name.to_string(),
                    name_prefix: name_prefix.to_string(),
                    guid: guid.to_string(),
                };
                records.push(record.clone());
                RecordChange::Found(record)
            }
        };

        if records.is_empty() {
            self.devices.remove(device_address);
        }
        change
    }

    /// Remove every record for a device. Returns the evicted records so
    /// the caller can signal "lost" for each.
    pub fn evict_device(&mut self, device_address: &str) -> Vec<ServiceRecord> {
        self.devices.remove(device_address).unwrap_or_default()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn records_for(&self, device_address: &str) -> &[ServiceRecord] {
        self.devices
            .get(device_address)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Device addresses present in `previous` but absent from `current`.
pub fn vanished_devices(previous: &[DeviceInfo], current: &[DeviceInfo]) -> Vec<String> {
    previous
        .iter()
        .filter(|old| {
            !current
                .iter()
                .any(|new| new.device_address == old.device_address)
        })
        .map(|old| old.device_address.clone())
        .collect()
}
