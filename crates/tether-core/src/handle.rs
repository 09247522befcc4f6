//! Link handles and upward status codes.
//!
//! A handle identifies a link/peer to the bus layer. It is derived
//! deterministically from the peer's hardware address so both sides of
//! an RPC boundary can compute it independently.

/// Opaque link identifier handed to the bus layer. Always non-negative.
pub type PeerHandle = i32;

/// The "no handle" value — unknown peer or empty address.
pub const NO_HANDLE: PeerHandle = 0;

/// Derive a handle from a device hardware address.
///
/// First four bytes of `blake3(address)`, little-endian, shifted right
/// one bit so the result is never negative. An empty address maps to
/// [`NO_HANDLE`]. Distinct addresses can theoretically collide; callers
/// accept that risk.
pub fn peer_handle(address: &str) -> PeerHandle {
    if address.is_empty() {
        return NO_HANDLE;
    }
    let digest = blake3::hash(address.as_bytes());
    let word = u32::from_le_bytes(digest.as_bytes()[..4].try_into().unwrap());
    (word >> 1) as PeerHandle
}

/// Status code returned by every upward API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    /// Numeric code at the RPC boundary: OK = 0, ERROR = -1.
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Error => -1,
        }
    }
}
