//! Tether integration harness.
//!
//! Tests drive the manager in-process against a scripted radio: the
//! test reads the command channel, injects completions and unsolicited
//! events by hand, and asserts on the outbound bus channel. The
//! sim_driver tests run the same flows end-to-end against SimRadio
//! instead. Timing-sensitive paths use millisecond-scale intervals.

mod advertise;
mod discovery;
mod sim_driver;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use tether_core::bus::BusSignal;
use tether_core::config::TetherConfig;
use tether_core::radio::{CommandToken, RadioCommand, RadioError, RadioEvent, RadioRequest};
use tether_p2p::{spawn_manager, P2pClient};

// ── Harness ───────────────────────────────────────────────────────────────────

pub struct Harness {
    pub client: P2pClient,
    pub commands: mpsc::UnboundedReceiver<RadioRequest>,
    pub events: mpsc::UnboundedSender<RadioEvent>,
    pub bus: mpsc::UnboundedReceiver<BusSignal>,
}

/// Fast keep-alive/withdrawal intervals; connection timeout long enough
/// that it never fires unless a test wants it to.
pub fn test_config() -> TetherConfig {
    let mut config = TetherConfig::default();
    config.timing.periodic_interval_ms = 50;
    config.timing.connection_timeout_ms = 5_000;
    config.timing.advertise_timeout_ms = 80;
    config
}

pub fn start() -> Harness {
    start_with(test_config())
}

pub fn start_with(config: TetherConfig) -> Harness {
    let (radio_tx, commands) = mpsc::unbounded_channel();
    let (events, radio_rx) = mpsc::unbounded_channel();
    let (bus_tx, bus) = mpsc::unbounded_channel();
    let (client, _task) = spawn_manager(&config, radio_tx, radio_rx, bus_tx);
    Harness {
        client,
        commands,
        events,
        bus,
    }
}

impl Harness {
    /// Next radio command, whatever it is.
    pub async fn next_command(&mut self) -> RadioRequest {
        timeout(Duration::from_secs(2), self.commands.recv())
            .await
            .expect("timed out waiting for radio command")
            .expect("command channel closed")
    }

    /// Next radio command that is not keep-alive traffic. Skipped
    /// keep-alives are left uncompleted so they cannot perturb state.
    pub async fn next_non_keepalive(&mut self) -> RadioRequest {
        loop {
            let request = self.next_command().await;
            match request.command {
                RadioCommand::DiscoverPeers | RadioCommand::DiscoverServices => continue,
                _ => return request,
            }
        }
    }

    /// Commands observed within the window.
    pub async fn collect_commands(&mut self, window: Duration) -> Vec<RadioCommand> {
        let mut seen = Vec::new();
        let deadline = tokio::time::Instant::now() + window;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match timeout(remaining, self.commands.recv()).await {
                Ok(Some(request)) => seen.push(request.command),
                _ => return seen,
            }
        }
    }

    /// Assert no radio command arrives for a window longer than the
    /// keep-alive interval.
    pub async fn expect_quiet(&mut self) {
        if let Ok(Some(request)) = timeout(Duration::from_millis(150), self.commands.recv()).await {
            panic!("unexpected radio command: {:?}", request.command);
        }
    }

    pub fn complete(&self, token: CommandToken) {
        self.events
            .send(RadioEvent::CommandDone {
                token,
                result: Ok(()),
            })
            .unwrap();
    }

    pub fn fail(&self, token: CommandToken, error: RadioError) {
        self.events
            .send(RadioEvent::CommandDone {
                token,
                result: Err(error),
            })
            .unwrap();
    }

    pub async fn next_signal(&mut self) -> BusSignal {
        timeout(Duration::from_secs(2), self.bus.recv())
            .await
            .expect("timed out waiting for bus signal")
            .expect("bus channel closed")
    }

    pub async fn no_signal(&mut self) {
        if let Ok(Some(signal)) = timeout(Duration::from_millis(150), self.bus.recv()).await {
            panic!("unexpected bus signal: {signal:?}");
        }
    }

    /// Give the manager a chance to drain already-queued events before
    /// the next assertion (events and API calls travel on different
    /// channels, so ordering between them is not otherwise guaranteed).
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
