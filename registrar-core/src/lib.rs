//! Registrar core: service model, registry adapter contract, scheme -> factory registry.

pub mod adapter;
pub mod into_bridge_error;
pub mod registry;
pub mod service;
pub mod uri;

pub use adapter::{AdapterFactory, RegistryAdapter};
pub use into_bridge_error::IntoBridgeError;
pub use registry::AdapterRegistry;
pub use service::{Service, ServicePort};
pub use uri::RegistryUri;

use thiserror::Error;

/// Boxed backend error, as produced by a registry client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("unknown registry scheme: {0}")]
    UnknownScheme(String),
    #[error("invalid registry URI: {0}")]
    InvalidUri(String),
    #[error("{scheme}: cannot build registry client: {reason}")]
    Construction { scheme: String, reason: String },
    /// Error from the registry backend, passed through unchanged.
    #[error(transparent)]
    Backend(BoxError),
}

impl BridgeError {
    /// Borrow the backend error as `E`. None for non-backend errors or a different type.
    pub fn backend<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            BridgeError::Backend(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}
