//! pulse-probe — debounced health probing, modeled on orchestrator probes.
//!
//! A [`Probe`] repeatedly runs a pluggable health check (a [`Performer`])
//! on a fixed period and turns the raw pass/fail outcomes into a stable
//! [`ProbeStatus`] stream (`unknown` → `healthy`/`unhealthy`) using
//! consecutive-outcome thresholds.
//!
//! # Architecture
//!
//! ```text
//! Probe::observe()
//!   ├── emits `unknown`, spawns one session task
//!   │   ├── initial delay
//!   │   └── loop: arm period timer
//!   │       ├── race { Performer::check(timeout), dead-man timer } → bool
//!   │       ├── StatusTracker::record(bool) → Option<ProbeStatus>
//!   │       └── wait out the period timer
//!   └── StatusStream (recv / cancel; drop cancels)
//! ```
//!
//! # Debouncing
//!
//! Status only changes on a threshold edge: `healthy` after
//! `success_threshold` consecutive passes, `unhealthy` after
//! `failure_threshold` consecutive failures. A single contrary outcome
//! resets the opposite counter, so thresholds are a full restart, not a
//! sliding window. No two identical statuses are ever emitted in a row.
//!
//! # Timing
//!
//! Each cycle lasts `max(period, check duration)`: checks never overlap,
//! check starts are at least `period` apart, and a slow check is never
//! pre-empted. A check that never settles is cut off by a dead-man timer
//! at `timeout + 50ms` and counted as a failure.

pub mod config;
pub mod performer;
pub mod probe;
pub mod tracker;

pub use config::{ConfigError, ProbeConfig, ProbeConfigBuilder};
pub use performer::Performer;
pub use probe::{Probe, ProbeStatus, StatusStream};
pub use tracker::StatusTracker;
