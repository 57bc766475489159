//! Boxing of backend client errors for the adapter trait.

use crate::BridgeError;

/// Wraps a registry client's own error in `BridgeError::Backend` without changing its message or source.
pub trait IntoBridgeError {
    fn into_bridge_error(self) -> BridgeError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoBridgeError for E {
    fn into_bridge_error(self) -> BridgeError {
        BridgeError::Backend(Box::new(self))
    }
}
