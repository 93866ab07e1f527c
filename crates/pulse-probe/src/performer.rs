//! Pluggable health-check operations.
//!
//! A [`Performer`] wraps an arbitrary async (or blocking) check function
//! and exposes it as a single-shot attempt that yields exactly one boolean
//! outcome. Check errors are absorbed, never propagated.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

type BoxCheckFuture = std::pin::Pin<
    Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
>;

type CheckFn = dyn Fn(Duration) -> BoxCheckFuture + Send + Sync;

/// A shared, reentrant handle to one health-check operation.
///
/// The wrapped function receives the per-attempt timeout budget in case it
/// can enforce it itself (e.g. as a request timeout). The probe engine does
/// not rely on that: a dead-man timer backstops misbehaving checks.
///
/// Cloning is cheap and clones share the same underlying operation, so one
/// `Performer` can serve any number of concurrent probe sessions. It holds
/// no per-session state.
#[derive(Clone)]
pub struct Performer {
    run_check: Arc<CheckFn>,
}

impl Performer {
    /// Wrap an async check function. The check passes when it returns
    /// `Ok(())` and fails on any `Err`.
    pub fn new<F, Fut>(run_check: F) -> Self
    where
        F: Fn(Duration) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            run_check: Arc::new(move |timeout| Box::pin(run_check(timeout))),
        }
    }

    /// Wrap a blocking (non-async) check function.
    pub fn from_blocking<F>(run_check: F) -> Self
    where
        F: Fn(Duration) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(move |timeout| std::future::ready(run_check(timeout)))
    }

    /// Run one check attempt and settle it into a boolean outcome.
    ///
    /// Resolves exactly once: `true` if the check returned `Ok(())`,
    /// `false` if it returned an error. The error itself is logged at
    /// debug level and dropped.
    pub async fn check(&self, timeout: Duration) -> bool {
        match (self.run_check)(timeout).await {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        }
    }
}

impl fmt::Debug for Performer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Performer").finish_non_exhaustive()
    }
}
