//! tether-p2p — the peer/link/discovery coordinator.
//!
//! One manager task owns all mutable state: the per-device service
//! registry, the request tracker, and the single link slot. API calls,
//! radio command completions, unsolicited radio events, and timer ticks
//! are serialized through its message queue; radio commands go out on a
//! channel and complete later via correlated events.

pub mod client;
pub mod iface;
pub mod link;
pub mod manager;
pub mod registry;
pub mod sim;
pub mod timers;
pub mod tracker;

pub use client::P2pClient;
pub use link::PeerState;
pub use manager::spawn_manager;
pub use sim::SimRadio;
