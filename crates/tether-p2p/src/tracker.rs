//! Outstanding-request bookkeeping.
//!
//! Tracks the name prefixes the bus layer asked us to find, the
//! low-level subscriptions backing them (one global "everything"
//! subscription plus one per concrete instance name), and the names we
//! advertise locally. Multiple logical find requests share one
//! subscription; duplicates are idempotent.

use std::collections::HashMap;

use tether_core::record::LocalService;

/// Strip one trailing wildcard marker to get the canonical prefix.
pub fn canonical_prefix(name: &str) -> &str {
    name.strip_suffix('*').unwrap_or(name)
}

/// Case-insensitive prefix test. The radio stack lowercases domain
/// names somewhere on the way up, so matching must not be exact.
fn matches_prefix(candidate: &str, prefix: &str) -> bool {
    candidate
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    /// Prefixes the bus layer asked us to find. Presence is all that
    /// matters; duplicates are rejected at insert.
    requested: Vec<String>,
    /// Whether the global "discover everything" subscription is out.
    global_request: bool,
    /// Concrete instance names with their own subscription.
    instances: Vec<String>,
    /// Locally advertised services by name.
    local: HashMap<String, LocalService>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Find requests ─────────────────────────────────────────────────────

    /// Record a prefix as outstanding. Returns false if already present.
    pub fn add_requested(&mut self, prefix: &str) -> bool {
        if self.has_requested(prefix) {
            return false;
        }
        self.requested.push(prefix.to_string());
        true
    }

    pub fn remove_requested(&mut self, prefix: &str) -> bool {
        let before = self.requested.len();
        self.requested.retain(|p| p != prefix);
        self.requested.len() != before
    }

    pub fn has_requested(&self, prefix: &str) -> bool {
        self.requested.iter().any(|p| p == prefix)
    }

    pub fn no_requests(&self) -> bool {
        self.requested.is_empty()
    }

    /// Requested prefixes matching a sighted instance name.
    pub fn prefixes_matching(&self, instance: &str) -> Vec<&str> {
        self.requested
            .iter()
            .filter(|p| matches_prefix(instance, p))
            .map(String::as_str)
            .collect()
    }

    // ── Low-level subscriptions ───────────────────────────────────────────

    pub fn set_global_request(&mut self, active: bool) {
        self.global_request = active;
    }

    pub fn global_request(&self) -> bool {
        self.global_request
    }

    pub fn add_instance(&mut self, instance: &str) {
        if !self.has_instance(instance) {
            self.instances.push(instance.to_string());
        }
    }

    pub fn has_instance(&self, instance: &str) -> bool {
        self.instances.iter().any(|i| i == instance)
    }

    /// Remove and return every per-instance subscription under a prefix.
    pub fn take_instances_matching(&mut self, prefix: &str) -> Vec<String> {
        let (matching, rest) = std::mem::take(&mut self.instances)
            .into_iter()
            .partition(|i| matches_prefix(i, prefix));
        self.instances = rest;
        matching
    }

    /// Drop all subscription bookkeeping (global and per-instance).
    pub fn clear_subscriptions(&mut self) {
        self.instances.clear();
        self.global_request = false;
    }

    /// The subscription prefix a full domain name was matched under, if
    /// any. Full domain names still carry the service-type suffix, so
    /// this is a prefix test against the bare instance names.
    pub fn match_instance_prefix(&self, full_domain_name: &str) -> Option<&str> {
        self.instances
            .iter()
            .find(|i| matches_prefix(full_domain_name, i))
            .map(String::as_str)
    }

    // ── Local advertisements ──────────────────────────────────────────────

    pub fn add_local(&mut self, service: LocalService) {
        self.local.insert(service.name.clone(), service);
    }

    pub fn remove_local(&mut self, name: &str) -> Option<LocalService> {
        self.local.remove(name)
    }

    pub fn any_local(&self) -> bool {
        !self.local.is_empty()
    }
}
