//! pulse-probe-http — HTTP GET performer for pulse-probe.
//!
//! Probes an endpoint with a single GET request per check attempt. A
//! response status in `[200, 400)` passes; any other status, transport
//! error, or timeout fails. Redirects are followed and the final response
//! is what gets classified.
//!
//! ```no_run
//! use pulse_probe::{Probe, ProbeConfig};
//! use pulse_probe_http::{HttpPerformer, HttpPerformerConfig};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let performer = HttpPerformer::new(HttpPerformerConfig {
//!     host: "example.com".to_string(),
//!     ..Default::default()
//! })?
//! .into_performer();
//!
//! let probe = Probe::new(ProbeConfig::builder(performer).build()?);
//! let mut stream = probe.observe();
//! while let Some(status) = stream.recv().await {
//!     println!("{status}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod performer;

pub use config::{HttpConfigError, HttpPerformerConfig, Scheme};
pub use performer::HttpPerformer;
