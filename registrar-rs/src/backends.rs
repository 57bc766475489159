//! Composition root: which backends exist, and the node name they register under.

use registrar_core::AdapterRegistry;

use crate::consul::ConsulFactory;

pub const CONSUL_SCHEME: &str = "consul";

/// Registry with every built-in backend registered. `hostname` becomes the node name of all registrations.
pub fn default_registry(hostname: impl Into<String>) -> AdapterRegistry {
    AdapterRegistry::new().with(CONSUL_SCHEME, ConsulFactory::new(hostname))
}

/// Machine hostname, or "" when it cannot be read. Resolve once at startup and pass it down.
pub fn resolve_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_default()
}
