//! The HTTP GET performer.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use pulse_probe::Performer;

use crate::config::{HttpConfigError, HttpPerformerConfig};

/// Probes an HTTP endpoint with one GET request per check attempt.
///
/// The URL, header map, and client are built once at construction. The
/// performer is stateless per attempt, so one instance can back any
/// number of concurrent probe sessions.
#[derive(Debug, Clone)]
pub struct HttpPerformer {
    client: reqwest::Client,
    url: reqwest::Url,
    headers: reqwest::header::HeaderMap,
}

impl HttpPerformer {
    /// Validate the config and build the performer.
    pub fn new(config: HttpPerformerConfig) -> Result<Self, HttpConfigError> {
        let url = config.build_url()?;
        let headers = config.build_headers()?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| HttpConfigError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url,
            headers,
        })
    }

    /// The URL probed on every attempt.
    pub fn url(&self) -> &reqwest::Url {
        &self.url
    }

    /// Run one GET attempt under the given timeout.
    ///
    /// The timeout is enforced here as a request timeout; the probe
    /// engine's dead-man switch remains the backstop. A final status in
    /// `[200, 400)` passes, anything else fails.
    pub async fn check(&self, timeout: Duration) -> anyhow::Result<()> {
        let response = self
            .client
            .get(self.url.clone())
            .headers(self.headers.clone())
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() < 200 || status.as_u16() >= 400 {
            debug!(%status, url = %self.url, "probe request returned failing status");
            anyhow::bail!("HTTP status code: {status}");
        }
        Ok(())
    }

    /// Adapt into a core [`Performer`].
    pub fn into_performer(self) -> Performer {
        let this = Arc::new(self);
        Performer::new(move |timeout| {
            let this = this.clone();
            async move { this.check(timeout).await }
        })
    }
}
