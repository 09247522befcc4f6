//! Keep-alive and timeout timers.
//!
//! Timer tasks never touch state: they post tick messages back into
//! the manager queue and the manager acts on them. Keep-alives are
//! self-scheduling (run immediately, then re-arm after the interval).
//! Cancelling aborts the task but never interrupts an in-flight radio
//! command; a tick already queued when its timer is cancelled is
//! detected by the manager's state checks (and, for the connection
//! timeout, a generation counter).

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tether_core::config::TimingConfig;
use tether_core::record::LocalService;

use crate::manager::Msg;

/// Timer-originated messages.
#[derive(Debug)]
pub enum Tick {
    /// Reissue discover-peers.
    PeerFind,
    /// Reissue discover-services.
    ServiceDiscovery,
    /// The connection-establishment window elapsed.
    ConnectionTimeout { generation: u64 },
    /// A withdrawal tombstone's propagation window elapsed.
    AdvertiseExpired { service: LocalService },
}

pub struct Timers {
    tx: mpsc::UnboundedSender<Msg>,
    interval: Duration,
    connection_timeout: Duration,
    advertise_timeout: Duration,
    peer_find: Option<JoinHandle<()>>,
    service_discovery: Option<JoinHandle<()>>,
    connection: Option<JoinHandle<()>>,
    connection_generation: u64,
}

impl Timers {
    pub fn new(tx: mpsc::UnboundedSender<Msg>, timing: &TimingConfig) -> Self {
        Self {
            tx,
            interval: Duration::from_millis(timing.periodic_interval_ms),
            connection_timeout: Duration::from_millis(timing.connection_timeout_ms),
            advertise_timeout: Duration::from_millis(timing.advertise_timeout_ms),
            peer_find: None,
            service_discovery: None,
            connection: None,
            connection_generation: 0,
        }
    }

    // ── Keep-alives ───────────────────────────────────────────────────────

    pub fn start_peer_find(&mut self) {
        self.stop_peer_find();
        self.peer_find = Some(spawn_keepalive(
            self.tx.clone(),
            self.interval,
            || Tick::PeerFind,
        ));
    }

    pub fn stop_peer_find(&mut self) {
        if let Some(task) = self.peer_find.take() {
            task.abort();
        }
    }

    pub fn peer_find_active(&self) -> bool {
        self.peer_find.is_some()
    }

    pub fn start_service_discovery(&mut self) {
        self.stop_service_discovery();
        self.service_discovery = Some(spawn_keepalive(
            self.tx.clone(),
            self.interval,
            || Tick::ServiceDiscovery,
        ));
    }

    pub fn stop_service_discovery(&mut self) {
        if let Some(task) = self.service_discovery.take() {
            task.abort();
        }
    }

    pub fn service_discovery_active(&self) -> bool {
        self.service_discovery.is_some()
    }

    // ── Connection timeout ────────────────────────────────────────────────

    /// Arm the one-shot connection timeout, replacing any armed one.
    pub fn arm_connection_timeout(&mut self) {
        self.disarm_connection_timeout();
        let generation = self.connection_generation;
        let tx = self.tx.clone();
        let delay = self.connection_timeout;
        self.connection = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Msg::Tick(Tick::ConnectionTimeout { generation }));
        }));
    }

    /// Disarm and invalidate any tick already queued.
    pub fn disarm_connection_timeout(&mut self) {
        self.connection_generation += 1;
        if let Some(task) = self.connection.take() {
            task.abort();
        }
    }

    /// Whether a queued timeout tick is still the armed one.
    pub fn connection_timeout_current(&self, generation: u64) -> bool {
        self.connection.is_some() && generation == self.connection_generation
    }

    // ── Deferred advertisement withdrawal ─────────────────────────────────

    /// Fire-and-forget: after the propagation window, ask the manager to
    /// actually withdraw the record. Redundant expiries are harmless —
    /// the manager re-checks at fire time.
    pub fn schedule_advertise_removal(&self, service: LocalService) {
        let tx = self.tx.clone();
        let delay = self.advertise_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Msg::Tick(Tick::AdvertiseExpired { service }));
        });
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.stop_peer_find();
        self.stop_service_discovery();
        self.disarm_connection_timeout();
    }
}

fn spawn_keepalive(
    tx: mpsc::UnboundedSender<Msg>,
    interval: Duration,
    tick: impl Fn() -> Tick + Send + 'static,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if tx.send(Msg::Tick(tick())).is_err() {
                return;
            }
            tokio::time::sleep(interval).await;
        }
    })
}
