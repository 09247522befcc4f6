//! tetherd — Tether peer/link coordinator daemon.
//!
//! Hosts the p2p manager against the simulated radio driver. The bus
//! boundary is a log sink here; a real deployment replaces it with the
//! RPC bridge and the simulation with a hardware driver.

use anyhow::Result;
use tokio::sync::mpsc;

use tether_core::config::TetherConfig;
use tether_core::record::DeviceInfo;
use tether_p2p::sim::{SimPeer, SimService};
use tether_p2p::{spawn_manager, SimRadio};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = TetherConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = TetherConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        TetherConfig::default()
    });

    let guid = if config.daemon.guid.is_empty() {
        format!("tetherd-{}", std::process::id())
    } else {
        config.daemon.guid.clone()
    };
    tracing::info!(guid = %guid, "tetherd starting");

    // Radio driver wiring: commands out, events back.
    let (radio_tx, radio_cmd_rx) = mpsc::unbounded_channel();
    let (radio_event_tx, radio_event_rx) = mpsc::unbounded_channel();
    let (bus_tx, mut bus_rx) = mpsc::unbounded_channel();

    let mut radio = SimRadio::new(&config.sim, radio_cmd_rx, radio_event_tx);
    radio.add_peer(SimPeer {
        device: DeviceInfo {
            device_address: "02:00:00:00:20:02".to_string(),
            device_name: "sim-peer".to_string(),
        },
        services: vec![SimService {
            name: "org.tether.demo".to_string(),
            guid: "sim-peer-guid".to_string(),
            ttl: 255,
        }],
    });
    let radio_task = tokio::spawn(radio.run());

    let (client, manager_task) = spawn_manager(&config, radio_tx, radio_event_rx, bus_tx);

    // Bus signals land in the log until an RPC bridge consumes them.
    let bus_task = tokio::spawn(async move {
        while let Some(signal) = bus_rx.recv().await {
            tracing::info!(signal = ?signal, "bus");
        }
    });

    // Startup requests from config.
    for name in &config.daemon.advertise_names {
        let status = client.advertise_name(name, &guid).await;
        tracing::info!(name = %name, status = ?status, "advertise requested");
    }
    for prefix in &config.daemon.find_prefixes {
        let status = client.find_advertised_name(prefix).await;
        tracing::info!(prefix = %prefix, status = ?status, "find requested");
    }

    // ── Wait for exit ────────────────────────────────────────────────────────

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("shutdown signal received"),
        r = manager_task => tracing::error!("manager task exited: {:?}", r),
        r = radio_task   => tracing::error!("radio task exited: {:?}", r),
        r = bus_task     => tracing::error!("bus logger exited: {:?}", r),
    }

    client.shutdown().await;
    Ok(())
}
