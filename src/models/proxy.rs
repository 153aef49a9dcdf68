use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use crate::utils::error::{AppError, Result};

/// Scheme-to-endpoint proxy descriptor, e.g. `{"http": "http://10.0.0.1:3128"}`.
///
/// Every outbound request of a session is tunneled through one of these entries.
/// Recognised schemes are `http`, `https` and `all`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ProxyConfig {
    endpoints: BTreeMap<String, String>,
}

impl ProxyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, scheme: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(scheme.into().to_lowercase(), endpoint.into());
        self
    }

    /// Parse a CLI style `scheme=endpoint` pair.
    pub fn parse_pair(pair: &str) -> Result<(String, String)> {
        let (scheme, endpoint) = pair.split_once('=').ok_or_else(|| AppError::InvalidProxy {
            scheme: pair.to_string(),
            message: "expected scheme=endpoint".to_string(),
        })?;
        Ok((scheme.trim().to_lowercase(), endpoint.trim().to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> impl Iterator<Item = (&str, &str)> {
        self.endpoints.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check every entry without building a client.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(AppError::MissingProxy);
        }

        for (scheme, endpoint) in self.endpoints() {
            if !matches!(scheme, "http" | "https" | "all") {
                return Err(AppError::InvalidProxy {
                    scheme: scheme.to_string(),
                    message: "unsupported scheme".to_string(),
                });
            }

            let parsed = Url::parse(endpoint).map_err(|e| AppError::InvalidProxy {
                scheme: scheme.to_string(),
                message: e.to_string(),
            })?;
            if parsed.host_str().is_none() {
                return Err(AppError::InvalidProxy {
                    scheme: scheme.to_string(),
                    message: "endpoint has no host".to_string(),
                });
            }
        }

        Ok(())
    }

    /// True when an entry routes `scheme`. An `all` entry routes every scheme.
    pub fn covers(&self, scheme: &str) -> bool {
        self.endpoints.contains_key("all") || self.endpoints.contains_key(&scheme.to_lowercase())
    }

    /// Reject `target` unless some entry routes its scheme; reqwest sends uncovered
    /// schemes straight to the origin.
    pub fn ensure_routes(&self, target: &str) -> Result<()> {
        let url = Url::parse(target)
            .map_err(|e| AppError::Validation(format!("Invalid URL {}: {}", target, e)))?;

        if self.covers(url.scheme()) {
            Ok(())
        } else {
            Err(AppError::InvalidProxy {
                scheme: url.scheme().to_string(),
                message: format!("no entry routes {}", target),
            })
        }
    }

    /// Build the reqwest proxy list for this descriptor.
    pub fn to_reqwest(&self) -> Result<Vec<reqwest::Proxy>> {
        self.validate()?;

        self.endpoints()
            .map(|(scheme, endpoint)| {
                let proxy = match scheme {
                    "http" => reqwest::Proxy::http(endpoint),
                    "https" => reqwest::Proxy::https(endpoint),
                    _ => reqwest::Proxy::all(endpoint),
                };
                proxy.map_err(|e| AppError::InvalidProxy {
                    scheme: scheme.to_string(),
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

impl FromIterator<(String, String)> for ProxyConfig {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ProxyConfig::new(), |proxy, (scheme, endpoint)| proxy.with(scheme, endpoint))
    }
}
