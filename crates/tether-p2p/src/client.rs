//! Cloneable API handle fronting the manager task.
//!
//! Each call is a message round-trip: the manager applies it
//! synchronously within its loop and answers on a oneshot. The effect
//! of the asynchronous primitives (find/advertise/establish/release)
//! completes later via the bus signal channel.

use tokio::sync::{mpsc, oneshot};

use tether_core::handle::{PeerHandle, Status};

use crate::manager::{ApiCall, Msg};

#[derive(Clone)]
pub struct P2pClient {
    tx: mpsc::UnboundedSender<Msg>,
}

impl P2pClient {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Msg>) -> Self {
        Self { tx }
    }

    /// Register interest in a name prefix. A trailing `*` is stripped.
    pub async fn find_advertised_name(&self, name: &str) -> Status {
        self.call(|reply| ApiCall::FindAdvertisedName {
            name: name.to_string(),
            reply,
        })
        .await
        .unwrap_or(Status::Error)
    }

    /// Cancel interest in a name prefix.
    pub async fn cancel_find_advertised_name(&self, name: &str) -> Status {
        self.call(|reply| ApiCall::CancelFindAdvertisedName {
            name: name.to_string(),
            reply,
        })
        .await
        .unwrap_or(Status::Error)
    }

    /// Publish a well-known name for discovery by other daemons.
    pub async fn advertise_name(&self, name: &str, guid: &str) -> Status {
        self.call(|reply| ApiCall::AdvertiseName {
            name: name.to_string(),
            guid: guid.to_string(),
            reply,
        })
        .await
        .unwrap_or(Status::Error)
    }

    /// Withdraw a published name. Safe to repeat.
    pub async fn cancel_advertise_name(&self, name: &str, guid: &str) -> Status {
        self.call(|reply| ApiCall::CancelAdvertiseName {
            name: name.to_string(),
            guid: guid.to_string(),
            reply,
        })
        .await
        .unwrap_or(Status::Error)
    }

    /// Initiate a link to a peer. Returns a positive handle on success,
    /// -1 on precondition failure. The outcome arrives later as a
    /// LinkEstablished or LinkError signal.
    pub async fn establish_link(&self, device_address: &str, group_owner_intent: u32) -> i32 {
        self.call(|reply| ApiCall::EstablishLink {
            device_address: device_address.to_string(),
            group_owner_intent,
            reply,
        })
        .await
        .unwrap_or_else(|| Status::Error.code())
    }

    /// Tear down the current link attempt or link.
    pub async fn release_link(&self, handle: PeerHandle) -> Status {
        self.call(|reply| ApiCall::ReleaseLink { handle, reply })
            .await
            .unwrap_or(Status::Error)
    }

    /// Name of the network interface backing an established link.
    pub async fn get_interface_name_from_handle(&self, handle: PeerHandle) -> Option<String> {
        self.call(|reply| ApiCall::InterfaceNameFromHandle { handle, reply })
            .await
            .flatten()
    }

    /// Stop the manager: clears subscriptions and discovery on the
    /// driver, then exits the task.
    pub async fn shutdown(&self) {
        let (done, rx) = oneshot::channel();
        if self.tx.send(Msg::Shutdown { done }).is_ok() {
            let _ = rx.await;
        }
    }

    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> ApiCall) -> Option<T> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Msg::Api(make(reply))).ok()?;
        rx.await.ok()
    }
}
