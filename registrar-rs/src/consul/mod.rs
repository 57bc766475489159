//! Consul backend: ConsulAdapter (RegistryAdapter) and ConsulFactory (AdapterFactory).

mod check;
mod client;
mod records;

pub use check::{build_check, interpolate_service, DEFAULT_INTERVAL};
pub use client::{
    ConsulApi, ConsulClient, ConsulConfig, ConsulError, HttpBasicAuth, DEFAULT_ADDRESS,
};
pub use records::{
    AgentService, AgentServiceCheck, AgentServiceEntry, CatalogDeregistration,
    CatalogRegistration, CheckKind, WriteOptions,
};

use async_trait::async_trait;
use registrar_core::{
    AdapterFactory, BridgeError, IntoBridgeError, RegistryAdapter, RegistryUri, Service,
};
use tracing::{debug, info};

/// Registers services in the Consul catalog under one node name.
/// Holds only the client and the hostname, both fixed at construction.
pub struct ConsulAdapter<C = ConsulClient> {
    client: C,
    hostname: String,
}

impl<C: ConsulApi> ConsulAdapter<C> {
    pub fn new(client: C, hostname: impl Into<String>) -> Self {
        Self {
            client,
            hostname: hostname.into(),
        }
    }

    /// Node name used in every registration.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Catalog record for a service. The node address is the origin host IP, the service address is the service IP.
    /// No check is attached.
    pub fn registration(&self, service: &Service) -> CatalogRegistration {
        CatalogRegistration {
            node: self.hostname.clone(),
            address: service.origin.host_ip.clone(),
            datacenter: service.attr_or_empty("region").to_string(),
            service: AgentService {
                id: service.id.clone(),
                service: service.name.clone(),
                tags: service.tags.clone(),
                port: service.port,
                address: service.ip.clone(),
            },
            check: None,
        }
    }

    pub fn deregistration(&self, service: &Service) -> CatalogDeregistration {
        CatalogDeregistration {
            node: self.hostname.clone(),
            address: String::new(),
            datacenter: service.attr_or_empty("region").to_string(),
            service_id: service.id.clone(),
            check_id: String::new(),
        }
    }
}

fn write_options(service: &Service) -> WriteOptions {
    WriteOptions::datacenter(service.attr_or_empty("region"))
}

fn from_agent_service(entry: AgentServiceEntry) -> Service {
    Service {
        id: entry.id,
        name: entry.service,
        port: entry.port,
        tags: entry.tags.unwrap_or_default(),
        ip: entry.address,
        ..Service::default()
    }
}

#[async_trait]
impl<C: ConsulApi> RegistryAdapter for ConsulAdapter<C> {
    async fn ping(&self) -> Result<(), BridgeError> {
        let leader = self
            .client
            .leader()
            .await
            .map_err(IntoBridgeError::into_bridge_error)?;
        info!("consul: current leader {}", leader);
        Ok(())
    }

    async fn register(&self, service: &Service) -> Result<(), BridgeError> {
        let check = build_check(service);
        debug!(service = %service.id, ?check, "consul: computed health check");

        let registration = self.registration(service);
        let out = serde_json::to_string(&registration).unwrap_or_default();
        info!("REGISTERING : {}", out);

        self.client
            .catalog_register(&registration, &write_options(service))
            .await
            .map_err(IntoBridgeError::into_bridge_error)
    }

    async fn deregister(&self, service: &Service) -> Result<(), BridgeError> {
        let deregistration = self.deregistration(service);
        let out = serde_json::to_string(&deregistration).unwrap_or_default();
        info!("DE-REGISTERING : {}", out);

        self.client
            .catalog_deregister(&deregistration, &write_options(service))
            .await
            .map_err(IntoBridgeError::into_bridge_error)
    }

    /// Consul runs TTL checks itself; nothing to renew here.
    async fn refresh(&self, _service: &Service) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn services(&self) -> Result<Vec<Service>, BridgeError> {
        let services = self
            .client
            .agent_services()
            .await
            .map_err(IntoBridgeError::into_bridge_error)?;
        Ok(services.into_values().map(from_agent_service).collect())
    }
}

/// Builds ConsulAdapter from `consul://[host[:port]]`. The URI host overrides the configured address.
#[derive(Clone, Debug)]
pub struct ConsulFactory {
    hostname: String,
    config: Option<ConsulConfig>,
}

impl ConsulFactory {
    /// Factory whose base config comes from the environment (ConsulConfig::from_env) at each create.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            config: None,
        }
    }

    /// Use a fixed base config instead of the environment.
    pub fn with_config(mut self, config: ConsulConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Typed form of AdapterFactory::create.
    pub fn adapter(&self, uri: &RegistryUri) -> Result<ConsulAdapter, BridgeError> {
        let mut config = self.config.clone().unwrap_or_else(ConsulConfig::from_env);
        if let Some(host) = uri.host() {
            config.address = host.to_string();
        }
        let client = ConsulClient::new(config).map_err(|e| BridgeError::Construction {
            scheme: uri.scheme().to_string(),
            reason: e.to_string(),
        })?;
        debug!(address = client.address(), node = %self.hostname, "consul: client ready");
        Ok(ConsulAdapter::new(client, self.hostname.clone()))
    }
}

impl AdapterFactory for ConsulFactory {
    fn create(&self, uri: &RegistryUri) -> Result<Box<dyn RegistryAdapter>, BridgeError> {
        Ok(Box::new(self.adapter(uri)?))
    }
}
