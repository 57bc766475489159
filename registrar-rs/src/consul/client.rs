//! Consul agent client: the status, catalog and agent endpoints the adapter calls, over reqwest.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use url::Url;

use super::records::{AgentServiceEntry, CatalogDeregistration, CatalogRegistration, WriteOptions};

/// Agent address used when neither the environment nor the URI names one.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8500";

const TOKEN_HEADER: &str = "X-Consul-Token";

#[derive(Error, Debug)]
pub enum ConsulError {
    #[error("invalid consul address: {0}")]
    InvalidAddress(String),
    #[error("invalid consul token")]
    InvalidToken,
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response code: {status} ({body})")]
    Status { status: StatusCode, body: String },
}

/// HTTP basic auth credentials (CONSUL_HTTP_AUTH).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpBasicAuth {
    pub username: String,
    pub password: Option<String>,
}

/// Client configuration. Default: local agent over plain HTTP, no credentials, agent's own datacenter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsulConfig {
    /// `host:port` of the agent. A `http://` or `https://` prefix also sets the scheme.
    pub address: String,
    /// "http" or "https".
    pub scheme: String,
    /// Datacenter for requests that do not name one.
    pub datacenter: Option<String>,
    /// ACL token sent as X-Consul-Token.
    pub token: Option<String>,
    pub http_auth: Option<HttpBasicAuth>,
    /// Accept any server certificate (CONSUL_HTTP_SSL_VERIFY=false).
    pub tls_skip_verify: bool,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            scheme: "http".to_string(),
            datacenter: None,
            token: None,
            http_auth: None,
            tls_skip_verify: false,
        }
    }
}

/// Go-style boolean: 1, t, T, TRUE, true, True and their false counterparts.
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl ConsulConfig {
    /// Defaults overridden by CONSUL_HTTP_ADDR, CONSUL_HTTP_TOKEN, CONSUL_HTTP_AUTH,
    /// CONSUL_HTTP_SSL and CONSUL_HTTP_SSL_VERIFY.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as from_env, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(address) = var("CONSUL_HTTP_ADDR") {
            config.set_address(&address);
        }
        config.token = var("CONSUL_HTTP_TOKEN");
        config.http_auth = var("CONSUL_HTTP_AUTH").map(|auth| match auth.split_once(':') {
            Some((user, pass)) => HttpBasicAuth {
                username: user.to_string(),
                password: Some(pass.to_string()),
            },
            None => HttpBasicAuth {
                username: auth.clone(),
                password: None,
            },
        });
        if let Some(raw) = var("CONSUL_HTTP_SSL") {
            match parse_bool(&raw) {
                Some(true) => config.scheme = "https".to_string(),
                Some(false) => {}
                None => warn!("consul: cannot parse CONSUL_HTTP_SSL={:?}", raw),
            }
        }
        if let Some(raw) = var("CONSUL_HTTP_SSL_VERIFY") {
            match parse_bool(&raw) {
                Some(verify) => config.tls_skip_verify = !verify,
                None => warn!("consul: cannot parse CONSUL_HTTP_SSL_VERIFY={:?}", raw),
            }
        }
        config
    }

    /// Set the agent address; an `http://` or `https://` prefix sets the scheme too.
    pub fn set_address(&mut self, address: &str) {
        let address = address.trim();
        if let Some(rest) = address.strip_prefix("https://") {
            self.scheme = "https".to_string();
            self.address = rest.to_string();
        } else if let Some(rest) = address.strip_prefix("http://") {
            self.scheme = "http".to_string();
            self.address = rest.to_string();
        } else {
            self.address = address.to_string();
        }
    }
}

/// Registry client operations used by the adapter.
#[async_trait]
pub trait ConsulApi: Send + Sync {
    /// GET /v1/status/leader: raft address of the current leader.
    async fn leader(&self) -> Result<String, ConsulError>;

    /// PUT /v1/catalog/register.
    async fn catalog_register(
        &self,
        registration: &CatalogRegistration,
        options: &WriteOptions,
    ) -> Result<(), ConsulError>;

    /// PUT /v1/catalog/deregister.
    async fn catalog_deregister(
        &self,
        deregistration: &CatalogDeregistration,
        options: &WriteOptions,
    ) -> Result<(), ConsulError>;

    /// GET /v1/agent/services: service ID -> service.
    async fn agent_services(&self) -> Result<HashMap<String, AgentServiceEntry>, ConsulError>;
}

/// Pooled client for one agent. Cheap to clone; safe to share between tasks.
#[derive(Clone, Debug)]
pub struct ConsulClient {
    http: reqwest::Client,
    base: Url,
    address: String,
    datacenter: Option<String>,
    http_auth: Option<HttpBasicAuth>,
}

impl ConsulClient {
    pub fn new(mut config: ConsulConfig) -> Result<Self, ConsulError> {
        let raw = config.address.clone();
        config.set_address(&raw);
        let scheme = config.scheme.to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(ConsulError::InvalidAddress(format!(
                "unsupported scheme {:?}",
                config.scheme
            )));
        }
        let address = config.address.trim().trim_end_matches('/');
        if address.is_empty() || address.contains(['/', '?', '#', '@']) {
            return Err(ConsulError::InvalidAddress(config.address.clone()));
        }
        let base = Url::parse(&format!("{}://{}/", scheme, address))
            .map_err(|e| ConsulError::InvalidAddress(format!("{}: {}", config.address, e)))?;
        let host = base
            .host_str()
            .ok_or_else(|| ConsulError::InvalidAddress(config.address.clone()))?;
        let address = match base.port_or_known_default() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let mut headers = HeaderMap::new();
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(token).map_err(|_| ConsulError::InvalidToken)?;
            headers.insert(TOKEN_HEADER, value);
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(config.tls_skip_verify)
            .build()?;

        Ok(Self {
            http,
            base,
            address,
            datacenter: config.datacenter.filter(|dc| !dc.is_empty()),
            http_auth: config.http_auth,
        })
    }

    /// `host:port` this client talks to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// "http" or "https".
    pub fn scheme(&self) -> &str {
        self.base.scheme()
    }

    fn url(&self, path: &str, datacenter: &str) -> Result<Url, ConsulError> {
        let mut url = self.base.join(path)?;
        let dc = Some(datacenter)
            .filter(|dc| !dc.is_empty())
            .or(self.datacenter.as_deref());
        if let Some(dc) = dc {
            url.query_pairs_mut().append_pair("dc", dc);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<reqwest::Response, ConsulError> {
        let mut request = self.http.request(method, url);
        if let Some(auth) = &self.http_auth {
            request = request.basic_auth(&auth.username, auth.password.as_ref());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConsulError::Status {
                status,
                body: body.trim().to_string(),
            });
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConsulError> {
        let url = self.url(path, "")?;
        let response = self.send(Method::GET, url, None::<&()>).await?;
        Ok(response.json().await?)
    }

    async fn put(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
        options: &WriteOptions,
    ) -> Result<(), ConsulError> {
        let url = self.url(path, &options.datacenter)?;
        self.send(Method::PUT, url, Some(body)).await?;
        Ok(())
    }
}

#[async_trait]
impl ConsulApi for ConsulClient {
    async fn leader(&self) -> Result<String, ConsulError> {
        self.get("v1/status/leader").await
    }

    async fn catalog_register(
        &self,
        registration: &CatalogRegistration,
        options: &WriteOptions,
    ) -> Result<(), ConsulError> {
        self.put("v1/catalog/register", registration, options).await
    }

    async fn catalog_deregister(
        &self,
        deregistration: &CatalogDeregistration,
        options: &WriteOptions,
    ) -> Result<(), ConsulError> {
        self.put("v1/catalog/deregister", deregistration, options).await
    }

    async fn agent_services(&self) -> Result<HashMap<String, AgentServiceEntry>, ConsulError> {
        self.get("v1/agent/services").await
    }
}
