//! Map a hardware address to the OS interface that carries it.
//!
//! Used to answer `get_interface_name_from_handle`: the bus layer needs
//! to know which interface to bind once a link exists.

use nix::ifaddrs::getifaddrs;

/// Scan OS interfaces for one whose hardware address matches.
///
/// Addresses are compared as lowercase colon-separated hex, the format
/// the radio stack reports. Returns `None` when no interface matches or
/// the scan itself fails.
pub fn interface_name_for_address(device_address: &str) -> Option<String> {
    let addrs = match getifaddrs() {
        Ok(addrs) => addrs,
        Err(error) => {
            tracing::warn!(error = %error, "could not enumerate network interfaces");
            return None;
        }
    };

    for ifaddr in addrs {
        let Some(storage) = ifaddr.address else {
            continue;
        };
        let Some(link) = storage.as_link_addr() else {
            continue;
        };
        let Some(mac) = link.addr() else {
            continue;
        };

        if format_mac(&mac).eq_ignore_ascii_case(device_address) {
            tracing::debug!(interface = %ifaddr.interface_name, "matched hardware address");
            return Some(ifaddr.interface_name);
        }
    }

    None
}

fn format_mac(mac: &[u8; 6]) -> String {
    mac.iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
