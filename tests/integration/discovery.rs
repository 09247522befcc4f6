use std::collections::HashMap;

use crate::*;
use tether_core::handle::Status;
use tether_core::record::{DeviceInfo, REGISTRATION_TYPE, SERVICE_SUFFIX, TXT_GUID, TXT_TIMER};

fn txt(guid: &str, timer: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert(TXT_GUID.to_string(), guid.to_string());
    map.insert(TXT_TIMER.to_string(), timer.to_string());
    map
}

fn device(addr: &str) -> DeviceInfo {
    DeviceInfo {
        device_address: addr.to_string(),
        device_name: String::new(),
    }
}

/// Walk a harness through: find a prefix, accept the global
/// subscription, sight an instance, accept its subscription.
async fn subscribe_instance(h: &mut Harness, prefix: &str, instance: &str, device_addr: &str) {
    assert_eq!(h.client.find_advertised_name(prefix).await, Status::Ok);
    let global = h.next_command().await;
    assert!(matches!(
        global.command,
        RadioCommand::AddServiceRequest { instance: None }
    ));
    h.complete(global.token);

    h.events
        .send(RadioEvent::ServiceAvailable {
            instance: instance.to_string(),
            registration_type: REGISTRATION_TYPE.to_string(),
            device_address: device_addr.to_string(),
        })
        .unwrap();

    let sub = h.next_non_keepalive().await;
    match &sub.command {
        RadioCommand::AddServiceRequest {
            instance: Some(name),
        } => assert_eq!(name, instance),
        other => panic!("expected instance subscription, got {other:?}"),
    }
    h.complete(sub.token);
    h.settle().await;
}

#[tokio::test]
async fn duplicate_find_issues_one_global_subscription() {
    let mut h = start();

    assert_eq!(h.client.find_advertised_name("org.example*").await, Status::Ok);
    let global = h.next_command().await;
    assert!(matches!(
        global.command,
        RadioCommand::AddServiceRequest { instance: None }
    ));
    h.complete(global.token);

    // Same prefix again (wildcard stripped to the same canonical form).
    assert_eq!(h.client.find_advertised_name("org.example").await, Status::Ok);

    // Only keep-alive traffic may follow — never a second subscription.
    for _ in 0..3 {
        let request = h.next_command().await;
        match request.command {
            RadioCommand::DiscoverServices => h.complete(request.token),
            other => panic!("unexpected command after duplicate find: {other:?}"),
        }
    }
}

#[tokio::test]
async fn failed_global_subscription_rolls_back_the_request() {
    let mut h = start();

    h.client.find_advertised_name("org.example").await;
    let global = h.next_command().await;
    h.fail(global.token, RadioError::Rejected(3));
    h.settle().await;

    // The prefix is gone, so re-finding issues a fresh subscription.
    h.client.find_advertised_name("org.example").await;
    let again = h.next_command().await;
    assert!(matches!(
        again.command,
        RadioCommand::AddServiceRequest { instance: None }
    ));
}

#[tokio::test]
async fn cancel_last_find_clears_and_stops_discovery() {
    let mut h = start();

    h.client.find_advertised_name("org.example").await;
    let global = h.next_command().await;
    h.complete(global.token);

    // Let the keep-alive mark discovery active.
    let tick = h.next_command().await;
    assert!(matches!(tick.command, RadioCommand::DiscoverServices));
    h.complete(tick.token);

    assert_eq!(
        h.client.cancel_find_advertised_name("org.example").await,
        Status::Ok
    );

    // Cleanup commands arrive amid possibly-queued keep-alive ticks.
    let clear = h.next_non_keepalive().await;
    assert!(matches!(clear.command, RadioCommand::ClearServiceRequests));
    let stop = h.next_non_keepalive().await;
    assert!(matches!(stop.command, RadioCommand::StopPeerDiscovery));

    // Keep-alive is dead: nothing further.
    h.expect_quiet().await;
}

#[tokio::test]
async fn found_then_lost_signals_exactly_once_each() {
    let mut h = start();
    subscribe_instance(&mut h, "org.example", "org.example.chat", "aa:bb").await;

    let domain = format!("org.example.chat{SERVICE_SUFFIX}");

    // Live record → found.
    h.events
        .send(RadioEvent::TxtRecordAvailable {
            full_domain_name: domain.clone(),
            txt: txt("guid-1", "255"),
            device_address: "aa:bb".to_string(),
        })
        .unwrap();
    match h.next_signal().await {
        BusSignal::FoundAdvertisedName {
            name,
            guid,
            device_address,
            ..
        } => {
            assert_eq!(name, "org.example.chat");
            assert_eq!(guid, "guid-1");
            assert_eq!(device_address, "aa:bb");
        }
        other => panic!("expected FoundAdvertisedName, got {other:?}"),
    }

    // Refresh → silence.
    h.events
        .send(RadioEvent::TxtRecordAvailable {
            full_domain_name: domain.clone(),
            txt: txt("guid-1", "255"),
            device_address: "aa:bb".to_string(),
        })
        .unwrap();
    h.no_signal().await;

    // Withdrawal → lost, exactly once.
    h.events
        .send(RadioEvent::TxtRecordAvailable {
            full_domain_name: domain,
            txt: txt("guid-1", "0"),
            device_address: "aa:bb".to_string(),
        })
        .unwrap();
    match h.next_signal().await {
        BusSignal::LostAdvertisedName { name, .. } => assert_eq!(name, "org.example.chat"),
        other => panic!("expected LostAdvertisedName, got {other:?}"),
    }
    h.no_signal().await;
}

#[tokio::test]
async fn zero_ttl_for_unknown_name_is_pure_noop() {
    let mut h = start();
    subscribe_instance(&mut h, "org.example", "org.example.gone", "aa:bb").await;

    h.events
        .send(RadioEvent::TxtRecordAvailable {
            full_domain_name: format!("org.example.gone{SERVICE_SUFFIX}"),
            txt: txt("guid-1", "0"),
            device_address: "aa:bb".to_string(),
        })
        .unwrap();

    h.no_signal().await;
}

#[tokio::test]
async fn txt_record_without_subscription_is_ignored() {
    let mut h = start();
    subscribe_instance(&mut h, "org.example", "org.example.chat", "aa:bb").await;

    h.events
        .send(RadioEvent::TxtRecordAvailable {
            full_domain_name: format!("net.other.thing{SERVICE_SUFFIX}"),
            txt: txt("guid-9", "255"),
            device_address: "cc:dd".to_string(),
        })
        .unwrap();

    h.no_signal().await;
}

#[tokio::test]
async fn vanished_device_loses_all_its_records() {
    let mut h = start();
    subscribe_instance(&mut h, "org.example", "org.example.chat", "aa:bb").await;

    // Second instance on the same device.
    h.events
        .send(RadioEvent::ServiceAvailable {
            instance: "org.example.files".to_string(),
            registration_type: REGISTRATION_TYPE.to_string(),
            device_address: "aa:bb".to_string(),
        })
        .unwrap();
    let sub = h.next_non_keepalive().await;
    h.complete(sub.token);
    h.settle().await;

    for instance in ["org.example.chat", "org.example.files"] {
        h.events
            .send(RadioEvent::TxtRecordAvailable {
                full_domain_name: format!("{instance}{SERVICE_SUFFIX}"),
                txt: txt("guid-1", "255"),
                device_address: "aa:bb".to_string(),
            })
            .unwrap();
        assert!(matches!(
            h.next_signal().await,
            BusSignal::FoundAdvertisedName { .. }
        ));
    }

    // Roster snapshot with the device, then one without it.
    h.events
        .send(RadioEvent::PeersChanged {
            devices: vec![device("aa:bb"), device("cc:dd")],
        })
        .unwrap();
    h.events
        .send(RadioEvent::PeersChanged {
            devices: vec![device("cc:dd")],
        })
        .unwrap();

    let mut lost = Vec::new();
    for _ in 0..2 {
        match h.next_signal().await {
            BusSignal::LostAdvertisedName {
                name,
                device_address,
                ..
            } => {
                assert_eq!(device_address, "aa:bb");
                lost.push(name);
            }
            other => panic!("expected LostAdvertisedName, got {other:?}"),
        }
    }
    lost.sort();
    assert_eq!(lost, vec!["org.example.chat", "org.example.files"]);
    h.no_signal().await;
}
