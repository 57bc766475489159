//! Adapter registry: scheme -> factory. Built once by the composition root, then used to create adapters.

use std::collections::HashMap;

use crate::{AdapterFactory, BridgeError, RegistryAdapter, RegistryUri};

/// Map from URI scheme to adapter factory. Nothing registers itself; the caller decides which backends exist.
pub struct AdapterRegistry {
    factories: HashMap<String, Box<dyn AdapterFactory>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under a scheme (case-insensitive). A second registration for the same scheme replaces the first.
    pub fn register(&mut self, scheme: &str, factory: impl AdapterFactory + 'static) -> &mut Self {
        self.factories
            .insert(scheme.to_ascii_lowercase(), Box::new(factory));
        self
    }

    /// Builder form of register.
    pub fn with(mut self, scheme: &str, factory: impl AdapterFactory + 'static) -> Self {
        self.register(scheme, factory);
        self
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.factories.contains_key(&scheme.to_ascii_lowercase())
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Parse the URI and build an adapter with the factory registered for its scheme.
    pub fn build(&self, uri: &str) -> Result<Box<dyn RegistryAdapter>, BridgeError> {
        let uri: RegistryUri = uri.parse()?;
        self.build_from(&uri)
    }

    pub fn build_from(&self, uri: &RegistryUri) -> Result<Box<dyn RegistryAdapter>, BridgeError> {
        let factory = self
            .factories
            .get(uri.scheme())
            .ok_or_else(|| BridgeError::UnknownScheme(uri.scheme().to_string()))?;
        factory.create(uri)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
