//! Registry adapter contract: what every backend implements, and how it is built from a URI.

use async_trait::async_trait;

use crate::{BridgeError, RegistryUri, Service};

/// One service registry backend (Consul, ...). Each call is a single round trip to the registry.
/// Implementations hold no per-service state; services are supplied per call.
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Check connectivity with the registry.
    async fn ping(&self) -> Result<(), BridgeError>;

    /// Publish a service.
    async fn register(&self, service: &Service) -> Result<(), BridgeError>;

    /// Remove a previously registered service.
    async fn deregister(&self, service: &Service) -> Result<(), BridgeError>;

    /// Renew a registration. Backends without renewal return Ok.
    async fn refresh(&self, service: &Service) -> Result<(), BridgeError>;

    /// Services currently known to the registry. Order is unspecified.
    async fn services(&self) -> Result<Vec<Service>, BridgeError>;
}

/// Builds an adapter from a registry URI. Registered in AdapterRegistry under a scheme.
pub trait AdapterFactory: Send + Sync {
    fn create(&self, uri: &RegistryUri) -> Result<Box<dyn RegistryAdapter>, BridgeError>;
}
