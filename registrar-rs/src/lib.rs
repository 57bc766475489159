//! Registrar for Rust: Consul registry adapter on registrar-core, plus the composition root that wires backends in.

pub mod backends;
pub mod consul;

pub use backends::{default_registry, resolve_hostname, CONSUL_SCHEME};
pub use consul::{
    build_check, interpolate_service, ConsulAdapter, ConsulApi, ConsulClient, ConsulConfig,
    ConsulError, ConsulFactory,
};
pub use registrar_core::{
    AdapterFactory, AdapterRegistry, BridgeError, RegistryAdapter, RegistryUri, Service,
    ServicePort,
};
