//! Generic service model shared by the host and every registry backend.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Where a service was published from: host side and container side of one port mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePort {
    pub host_ip: String,
    pub host_port: String,
    pub exposed_ip: String,
    pub exposed_port: String,
    pub port_type: String,
    pub container_id: String,
    pub container_name: String,
    pub container_hostname: String,
}

/// One running service instance. `id` is unique per instance.
/// Attributes are optional; a missing or empty attribute means the feature is off.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub port: u16,
    pub ip: String,
    pub tags: Vec<String>,
    pub attrs: HashMap<String, String>,
    pub origin: ServicePort,
}

impl Service {
    /// Attribute value, treating an empty string as absent.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Attribute value or "" when absent.
    pub fn attr_or_empty(&self, key: &str) -> &str {
        self.attr(key).unwrap_or("")
    }
}
