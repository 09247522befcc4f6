//! Single-slot peer link state machine.
//!
//! Exactly one link attempt or link can exist at a time. The slot is a
//! pure bookkeeping struct: it applies events and returns the bus
//! signal the transition calls for, while the manager owns the side
//! effects (radio commands, timers). Every asynchronous command failure
//! lands back in Disconnected with an explicit upward signal; the slot
//! never retries on its own.

use tether_core::bus::BusSignal;
use tether_core::handle::{peer_handle, PeerHandle, NO_HANDLE};
use tether_core::record::{ConnectionInfo, PeerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    Disconnected,
    Initiated,
    Connecting,
    Connected,
    Disconnecting,
}

#[derive(Debug)]
pub struct LinkSlot {
    state: PeerState,
    config: Option<PeerConfig>,
}

impl Default for LinkSlot {
    fn default() -> Self {
        Self {
            state: PeerState::Disconnected,
            config: None,
        }
    }
}

impl LinkSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PeerState {
        self.state
    }

    pub fn config(&self) -> Option<&PeerConfig> {
        self.config.as_ref()
    }

    /// Handle of the current target, [`NO_HANDLE`] if the slot is empty
    /// or holds the synthetic empty-address config.
    pub fn handle(&self) -> PeerHandle {
        self.config
            .as_ref()
            .map(|c| peer_handle(&c.device_address))
            .unwrap_or(NO_HANDLE)
    }

    /// Store the target and enter Initiated. Caller must have checked
    /// the slot is Disconnected.
    pub fn initiate(&mut self, config: PeerConfig) -> PeerHandle {
        self.config = Some(config);
        self.state = PeerState::Initiated;
        self.handle()
    }

    /// Connect command accepted by the driver.
    pub fn connect_accepted(&mut self) {
        if self.state == PeerState::Initiated {
            self.state = PeerState::Connecting;
        }
    }

    /// A release is in flight; the config stays until the terminal
    /// transition arrives.
    pub fn begin_disconnect(&mut self) {
        self.state = PeerState::Disconnecting;
    }

    /// Terminal transition: back to Disconnected, config cleared.
    /// Returns the handle that was occupying the slot.
    pub fn reset(&mut self) -> PeerHandle {
        let handle = self.handle();
        self.state = PeerState::Disconnected;
        self.config = None;
        handle
    }

    /// Apply a connection-info event and return the signal to emit, if
    /// any.
    pub fn apply_connection_info(&mut self, info: &ConnectionInfo) -> Option<BusSignal> {
        match self.state {
            PeerState::Initiated | PeerState::Connecting => {
                if info.group_formed {
                    self.state = PeerState::Connected;
                    Some(BusSignal::LinkEstablished {
                        handle: self.handle(),
                    })
                } else {
                    let handle = self.reset();
                    (handle != NO_HANDLE).then_some(BusSignal::LinkError { handle, reason: -1 })
                }
            }

            PeerState::Connected => {
                if info.group_formed {
                    None
                } else {
                    let handle = self.reset();
                    Some(BusSignal::LinkLost { handle })
                }
            }

            PeerState::Disconnecting | PeerState::Disconnected => {
                if info.group_formed {
                    // Incoming connection we did not initiate. The radio
                    // stack does not tell us who connected.
                    self.state = PeerState::Connected;
                    self.config = Some(PeerConfig {
                        device_address: String::new(),
                        group_owner_intent: 0,
                    });
                    Some(BusSignal::LinkEstablished { handle: NO_HANDLE })
                } else {
                    let handle = self.reset();
                    Some(BusSignal::LinkLost { handle })
                }
            }
        }
    }
}
