//! Consul catalog/agent records, with Consul's JSON field names.

use serde::{Deserialize, Serialize};

/// Service part of a catalog registration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentService {
    #[serde(rename = "ID")]
    pub id: String,
    pub service: String,
    pub tags: Vec<String>,
    pub port: u16,
    pub address: String,
}

/// Health check descriptor. Exactly one of script, http or ttl is set; empty fields are not sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AgentServiceCheck {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub script: String,
    #[serde(rename = "HTTP", skip_serializing_if = "String::is_empty")]
    pub http: String,
    #[serde(rename = "TTL", skip_serializing_if = "String::is_empty")]
    pub ttl: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub interval: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timeout: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckKind {
    Http,
    Script,
    Ttl,
}

impl AgentServiceCheck {
    pub fn kind(&self) -> Option<CheckKind> {
        if !self.http.is_empty() {
            Some(CheckKind::Http)
        } else if !self.script.is_empty() {
            Some(CheckKind::Script)
        } else if !self.ttl.is_empty() {
            Some(CheckKind::Ttl)
        } else {
            None
        }
    }
}

/// Body of PUT /v1/catalog/register.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogRegistration {
    pub node: String,
    pub address: String,
    pub datacenter: String,
    pub service: AgentService,
    pub check: Option<AgentServiceCheck>,
}

/// Body of PUT /v1/catalog/deregister.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogDeregistration {
    pub node: String,
    pub address: String,
    pub datacenter: String,
    #[serde(rename = "ServiceID")]
    pub service_id: String,
    #[serde(rename = "CheckID")]
    pub check_id: String,
}

/// One value of the GET /v1/agent/services map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AgentServiceEntry {
    #[serde(rename = "ID")]
    pub id: String,
    pub service: String,
    pub tags: Option<Vec<String>>,
    pub port: u16,
    pub address: String,
}

/// Per-request write options. An empty datacenter means the agent's own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub datacenter: String,
}

impl WriteOptions {
    pub fn datacenter(datacenter: impl Into<String>) -> Self {
        Self {
            datacenter: datacenter.into(),
        }
    }
}
