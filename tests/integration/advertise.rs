use std::time::Duration;

use crate::*;
use tether_core::handle::Status;
use tether_core::record::TXT_TIMER;

/// Advertise a name and accept the driver-side registration.
async fn advertise(h: &mut Harness, name: &str) {
    assert_eq!(h.client.advertise_name(name, "local-guid").await, Status::Ok);
    let request = h.next_command().await;
    match &request.command {
        RadioCommand::AddLocalService { service } => {
            assert_eq!(service.name, name);
            assert_eq!(service.txt.get(TXT_TIMER).unwrap(), "255");
        }
        other => panic!("expected AddLocalService, got {other:?}"),
    }
    h.complete(request.token);
}

#[tokio::test]
async fn advertise_starts_the_peer_find_keepalive() {
    let mut h = start();
    advertise(&mut h, "org.example.svc").await;

    // The keep-alive reissues discover-peers on its own.
    for _ in 0..2 {
        let tick = h.next_command().await;
        assert!(matches!(tick.command, RadioCommand::DiscoverPeers));
        h.complete(tick.token);
    }
}

#[tokio::test]
async fn cancel_advertise_tombstones_then_withdraws() {
    let mut h = start();
    advertise(&mut h, "org.example.svc").await;

    assert_eq!(
        h.client
            .cancel_advertise_name("org.example.svc", "local-guid")
            .await,
        Status::Ok
    );

    // Tombstone republish with a zero timer.
    let tombstone = h.next_non_keepalive().await;
    match &tombstone.command {
        RadioCommand::AddLocalService { service } => {
            assert_eq!(service.txt.get(TXT_TIMER).unwrap(), "0");
        }
        other => panic!("expected tombstone AddLocalService, got {other:?}"),
    }
    h.complete(tombstone.token);

    // After the propagation window the record is actually withdrawn.
    let removal = h.next_non_keepalive().await;
    match &removal.command {
        RadioCommand::RemoveLocalService { service } => {
            assert_eq!(service.name, "org.example.svc");
        }
        other => panic!("expected RemoveLocalService, got {other:?}"),
    }
    h.complete(removal.token);

    // Nothing left to advertise: the keep-alive winds down.
    h.expect_quiet().await;
}

#[tokio::test]
async fn double_cancel_advertise_is_harmless() {
    let mut h = start();
    advertise(&mut h, "org.example.svc").await;

    for _ in 0..2 {
        assert_eq!(
            h.client
                .cancel_advertise_name("org.example.svc", "local-guid")
                .await,
            Status::Ok
        );
        let tombstone = h.next_non_keepalive().await;
        assert!(matches!(
            tombstone.command,
            RadioCommand::AddLocalService { .. }
        ));
        h.complete(tombstone.token);
    }

    // Both scheduled withdrawals fire; the second is redundant.
    for _ in 0..2 {
        let removal = h.next_non_keepalive().await;
        assert!(matches!(
            removal.command,
            RadioCommand::RemoveLocalService { .. }
        ));
        h.complete(removal.token);
    }
    h.expect_quiet().await;
}

#[tokio::test]
async fn cancel_last_find_keeps_peer_discovery_while_advertising() {
    let mut h = start();
    advertise(&mut h, "org.example.svc").await;

    h.client.find_advertised_name("org.example").await;
    let global = h.next_non_keepalive().await;
    assert!(matches!(
        global.command,
        RadioCommand::AddServiceRequest { instance: None }
    ));
    h.complete(global.token);

    h.client.cancel_find_advertised_name("org.example").await;

    // Subscriptions are cleared, but peer discovery must survive for
    // the advertisement.
    let seen = h.collect_commands(Duration::from_millis(300)).await;
    assert!(
        seen.iter()
            .any(|c| matches!(c, RadioCommand::ClearServiceRequests)),
        "expected ClearServiceRequests in {seen:?}"
    );
    assert!(
        !seen
            .iter()
            .any(|c| matches!(c, RadioCommand::StopPeerDiscovery)),
        "peer discovery stopped despite outstanding advertisement: {seen:?}"
    );
}

#[tokio::test]
async fn failed_advertisement_rolls_back_housekeeping() {
    let mut h = start();

    assert_eq!(
        h.client.advertise_name("org.example.svc", "local-guid").await,
        Status::Ok
    );
    let request = h.next_command().await;
    h.fail(request.token, RadioError::Rejected(4));
    h.settle().await;

    // With no advertisement on the books, cancelling the only find
    // request stops peer discovery.
    h.client.find_advertised_name("org.example").await;
    let global = h.next_command().await;
    h.complete(global.token);
    h.client.cancel_find_advertised_name("org.example").await;

    let seen = h.collect_commands(Duration::from_millis(300)).await;
    assert!(
        seen.iter()
            .any(|c| matches!(c, RadioCommand::StopPeerDiscovery)),
        "expected StopPeerDiscovery in {seen:?}"
    );
}
