//! HTTP performer configuration and validation.
//!
//! The URL and header map are validated and built once, at construction,
//! so a misconfigured performer fails before any probe session starts.

use std::collections::HashMap;

use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building an invalid [`HttpPerformerConfig`].
#[derive(Debug, Error)]
pub enum HttpConfigError {
    #[error("host must be a non-empty string")]
    EmptyHost,

    #[error("port must be between 1 and 65535")]
    ZeroPort,

    #[error("invalid header name: {0:?}")]
    InvalidHeaderName(String),

    #[error("invalid header value for {0:?}")]
    InvalidHeaderValue(String),

    #[error("invalid probe url: {0}")]
    InvalidUrl(String),

    #[error("failed to build http client: {0}")]
    Client(String),
}

/// URL scheme for the probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// Configuration for the HTTP performer.
///
/// Only `host` is required. Wire names are camelCase, so the struct
/// deserializes from the same shape orchestrator probe configs use
/// (`{"host": ..., "httpHeaders": {...}}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpPerformerConfig {
    /// Host to probe (name or address), without scheme or port.
    pub host: String,
    /// `HTTP` or `HTTPS`. Default: `HTTP`.
    #[serde(default)]
    pub scheme: Scheme,
    /// Request path. Default: `/`.
    #[serde(default)]
    pub path: Option<String>,
    /// Extra headers sent with every probe request.
    #[serde(default)]
    pub http_headers: HashMap<String, String>,
    /// Port. Default: the scheme's default port.
    #[serde(default)]
    pub port: Option<u16>,
}

impl HttpPerformerConfig {
    /// Validate the config and assemble the probe URL.
    pub(crate) fn build_url(&self) -> Result<Url, HttpConfigError> {
        if self.host.is_empty() {
            return Err(HttpConfigError::EmptyHost);
        }
        if self.port == Some(0) {
            return Err(HttpConfigError::ZeroPort);
        }

        let scheme = self.scheme.as_str();
        let path = self.path.as_deref().unwrap_or("/");
        let slash = if path.starts_with('/') { "" } else { "/" };

        let raw = match self.port {
            Some(port) => format!("{scheme}://{}:{port}{slash}{path}", self.host),
            None => format!("{scheme}://{}{slash}{path}", self.host),
        };

        Url::parse(&raw).map_err(|e| HttpConfigError::InvalidUrl(e.to_string()))
    }

    /// Validate and assemble the request header map.
    pub(crate) fn build_headers(&self) -> Result<HeaderMap, HttpConfigError> {
        let mut headers = HeaderMap::with_capacity(self.http_headers.len());
        for (name, value) in &self.http_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| HttpConfigError::InvalidHeaderName(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| HttpConfigError::InvalidHeaderValue(name.to_string()))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}
