//! AdapterRegistry and RegistryUri without any real backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use registrar_core::{
    AdapterFactory, AdapterRegistry, BridgeError, IntoBridgeError, RegistryAdapter, RegistryUri,
    Service,
};

#[derive(Debug, thiserror::Error)]
#[error("agent unreachable")]
struct Unreachable;

struct FakeAdapter {
    host: Option<String>,
}

#[async_trait]
impl RegistryAdapter for FakeAdapter {
    async fn ping(&self) -> Result<(), BridgeError> {
        match self.host.as_deref() {
            Some("down:1") => Err(Unreachable.into_bridge_error()),
            _ => Ok(()),
        }
    }

    async fn register(&self, _service: &Service) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn deregister(&self, _service: &Service) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn refresh(&self, _service: &Service) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn services(&self) -> Result<Vec<Service>, BridgeError> {
        Ok(vec![])
    }
}

/// Records the host of every URI it is asked to build.
#[derive(Clone, Default)]
struct FakeFactory {
    seen: Arc<Mutex<Vec<Option<String>>>>,
}

impl AdapterFactory for FakeFactory {
    fn create(&self, uri: &RegistryUri) -> Result<Box<dyn RegistryAdapter>, BridgeError> {
        let host = uri.host().map(String::from);
        self.seen.lock().unwrap().push(host.clone());
        Ok(Box::new(FakeAdapter { host }))
    }
}

struct FailingFactory;

impl AdapterFactory for FailingFactory {
    fn create(&self, uri: &RegistryUri) -> Result<Box<dyn RegistryAdapter>, BridgeError> {
        Err(BridgeError::Construction {
            scheme: uri.scheme().to_string(),
            reason: "no client".into(),
        })
    }
}

#[test]
fn parse_uri_with_host_and_port() {
    let uri: RegistryUri = "consul://10.0.0.2:8500".parse().unwrap();
    assert_eq!(uri.scheme(), "consul");
    assert_eq!(uri.host(), Some("10.0.0.2:8500"));
    assert_eq!(uri.path(), "");
    assert_eq!(uri.to_string(), "consul://10.0.0.2:8500");
}

#[test]
fn parse_uri_without_host() {
    for raw in ["consul://", "consul:", "CONSUL://"] {
        let uri: RegistryUri = raw.parse().unwrap();
        assert_eq!(uri.scheme(), "consul", "{raw}");
        assert_eq!(uri.host(), None, "{raw}");
    }
    let uri: RegistryUri = "consul:///services".parse().unwrap();
    assert_eq!(uri.host(), None);
    assert_eq!(uri.path(), "/services");
}

#[test]
fn parse_uri_rejects_bad_scheme() {
    for raw in ["", "://host", "1consul://host", "con sul://host"] {
        match raw.parse::<RegistryUri>() {
            Err(BridgeError::InvalidUri(_)) => {}
            other => panic!("expected InvalidUri for {raw:?}, got {other:?}"),
        }
    }
}

#[test]
fn build_passes_host_to_factory() {
    let factory = FakeFactory::default();
    let seen = Arc::clone(&factory.seen);
    let registry = AdapterRegistry::new().with("consul", factory);

    registry.build("consul://agent.local:8500").unwrap();
    registry.build("consul://").unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, vec![Some("agent.local:8500".to_string()), None]);
}

#[test]
fn build_unknown_scheme() {
    let registry = AdapterRegistry::new().with("consul", FakeFactory::default());
    match registry.build("etcd://localhost:2379") {
        Err(BridgeError::UnknownScheme(s)) => assert_eq!(s, "etcd"),
        Err(e) => panic!("expected UnknownScheme, got {e}"),
        Ok(_) => panic!("expected UnknownScheme"),
    }
}

#[test]
fn construction_error_is_returned_not_fatal() {
    let registry = AdapterRegistry::new().with("consul", FailingFactory);
    let err = registry.build("consul://").err().expect("construction must fail");
    assert!(matches!(err, BridgeError::Construction { ref scheme, .. } if scheme == "consul"));
    assert_eq!(err.to_string(), "consul: cannot build registry client: no client");
}

#[test]
fn schemes_sorted_and_case_insensitive() {
    let mut registry = AdapterRegistry::default();
    registry
        .register("Consul", FakeFactory::default())
        .register("alpha", FakeFactory::default());
    assert_eq!(registry.schemes(), vec!["alpha", "consul"]);
    assert!(registry.contains("CONSUL"));
    assert!(!registry.contains("etcd"));
}

#[tokio::test]
async fn backend_error_passes_through() {
    let registry = AdapterRegistry::new().with("fake", FakeFactory::default());
    let adapter = registry.build("fake://down:1").unwrap();
    let err = adapter.ping().await.unwrap_err();
    assert_eq!(err.to_string(), "agent unreachable");
    assert!(err.backend::<Unreachable>().is_some());
    assert!(err.backend::<std::io::Error>().is_none());

    let adapter = registry.build("fake://up:1").unwrap();
    adapter.ping().await.unwrap();
}

#[test]
fn service_attr_treats_empty_as_absent() {
    let mut service = Service::default();
    service.attrs.insert("region".into(), "eu-west".into());
    service.attrs.insert("check_ttl".into(), String::new());
    assert_eq!(service.attr("region"), Some("eu-west"));
    assert_eq!(service.attr("check_ttl"), None);
    assert_eq!(service.attr_or_empty("missing"), "");
}

#[test]
fn service_deserializes_with_defaults() {
    let service: Service = serde_json::from_str(
        r#"{"id":"web-1","name":"web","port":80,"origin":{"host_ip":"10.0.0.5"}}"#,
    )
    .unwrap();
    assert_eq!(service.id, "web-1");
    assert_eq!(service.port, 80);
    assert!(service.tags.is_empty());
    assert_eq!(service.origin.host_ip, "10.0.0.5");
    assert_eq!(service.origin.host_port, "");
}

#[test]
fn uri_host_drops_userinfo() {
    let uri: RegistryUri = "consul://user:pw@agent.local:8500".parse().unwrap();
    assert_eq!(uri.host(), Some("agent.local:8500"));
    assert_eq!(uri.to_string(), "consul://agent.local:8500");

    let factory = FakeFactory::default();
    let seen = Arc::clone(&factory.seen);
    AdapterRegistry::new()
        .with("consul", factory)
        .build("consul://token@10.0.0.2:8500")
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![Some("10.0.0.2:8500".to_string())]);
}
