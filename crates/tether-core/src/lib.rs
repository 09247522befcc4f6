//! tether-core — shared types for the Tether peer/link coordinator.
//! All other Tether crates depend on this one.

pub mod bus;
pub mod config;
pub mod handle;
pub mod radio;
pub mod record;

pub use bus::BusSignal;
pub use handle::{peer_handle, PeerHandle, Status, NO_HANDLE};
pub use record::{ConnectionInfo, DeviceInfo, LocalService, PeerConfig, ServiceRecord};
