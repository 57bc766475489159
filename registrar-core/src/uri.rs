//! Registry URI: `scheme://[host[:port]][/path]`. The scheme picks the backend, the host overrides its address.

use std::fmt;
use std::str::FromStr;

use http::uri::Authority;

use crate::BridgeError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryUri {
    scheme: String,
    authority: Option<Authority>,
    path: String,
}

impl RegistryUri {
    /// Lowercased scheme, e.g. "consul".
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// `host[:port]` without any userinfo, None when the URI has no host.
    pub fn host(&self) -> Option<&str> {
        self.authority.as_ref().map(|authority| {
            let raw = authority.as_str();
            raw.rsplit_once('@').map_or(raw, |(_, host)| host)
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn valid_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl FromStr for RegistryUri {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (scheme, rest, hierarchical) = match s.split_once("://") {
            Some((scheme, rest)) => (scheme, rest, true),
            None => match s.split_once(':') {
                Some((scheme, rest)) => (scheme, rest, false),
                None => (s, "", false),
            },
        };
        if !valid_scheme(scheme) {
            return Err(BridgeError::InvalidUri(s.to_string()));
        }

        let (authority, path) = if hierarchical {
            let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
            let (host, path) = rest.split_at(end);
            let authority = if host.is_empty() {
                None
            } else {
                Some(
                    host.parse::<Authority>()
                        .map_err(|e| BridgeError::InvalidUri(format!("{}: {}", s, e)))?,
                )
            };
            (authority, path.to_string())
        } else {
            (None, rest.to_string())
        };

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            authority,
            path,
        })
    }
}

impl fmt::Display for RegistryUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.host().unwrap_or(""), self.path)
    }
}
