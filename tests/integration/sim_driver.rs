//! End-to-end flows against the simulated radio driver.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use tether_core::bus::BusSignal;
use tether_core::handle::Status;
use tether_core::record::DeviceInfo;
use tether_p2p::sim::{SimPeer, SimService};
use tether_p2p::{spawn_manager, P2pClient, SimRadio};

const PEER_ADDR: &str = "02:00:00:00:20:02";

fn start_sim() -> (P2pClient, mpsc::UnboundedReceiver<BusSignal>) {
    let mut config = crate::test_config();
    config.sim.latency_ms = 5;

    let (radio_tx, radio_cmd_rx) = mpsc::unbounded_channel();
    let (radio_event_tx, radio_event_rx) = mpsc::unbounded_channel();
    let (bus_tx, bus_rx) = mpsc::unbounded_channel();

    let mut radio = SimRadio::new(&config.sim, radio_cmd_rx, radio_event_tx);
    radio.add_peer(SimPeer {
        device: DeviceInfo {
            device_address: PEER_ADDR.to_string(),
            device_name: "sim-peer".to_string(),
        },
        services: vec![SimService {
            name: "org.tether.demo".to_string(),
            guid: "sim-guid".to_string(),
            ttl: 255,
        }],
    });
    tokio::spawn(radio.run());

    let (client, _task) = spawn_manager(&config, radio_tx, radio_event_rx, bus_tx);
    (client, bus_rx)
}

async fn next_signal(bus: &mut mpsc::UnboundedReceiver<BusSignal>) -> BusSignal {
    timeout(Duration::from_secs(5), bus.recv())
        .await
        .expect("timed out waiting for bus signal")
        .expect("bus channel closed")
}

#[tokio::test]
async fn discovery_end_to_end() {
    let (client, mut bus) = start_sim();

    assert_eq!(
        client.find_advertised_name("org.tether*").await,
        Status::Ok
    );

    // Global subscription → sweep → instance subscription → next sweep
    // carries the TXT record → found.
    match next_signal(&mut bus).await {
        BusSignal::FoundAdvertisedName {
            name,
            guid,
            device_address,
            ..
        } => {
            assert_eq!(name, "org.tether.demo");
            assert_eq!(guid, "sim-guid");
            assert_eq!(device_address, PEER_ADDR);
        }
        other => panic!("expected FoundAdvertisedName, got {other:?}"),
    }
}

#[tokio::test]
async fn link_end_to_end() {
    let (client, mut bus) = start_sim();

    // Give the driver a moment to announce the world.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let handle = client.establish_link(PEER_ADDR, 1).await;
    assert!(handle > 0);
    assert_eq!(
        next_signal(&mut bus).await,
        BusSignal::LinkEstablished { handle }
    );

    assert_eq!(client.release_link(handle).await, Status::Ok);
    assert_eq!(next_signal(&mut bus).await, BusSignal::LinkLost { handle });

    client.shutdown().await;
}
