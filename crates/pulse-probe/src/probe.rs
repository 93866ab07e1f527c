//! Probe engine — the scheduling loop and status stream.
//!
//! Each `Probe::observe()` call spawns one session task that runs the
//! timing loop and feeds outcomes through a fresh [`StatusTracker`].
//! Sessions are independent; the shared [`Performer`] holds no state.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ProbeConfig;
use crate::performer::Performer;
use crate::tracker::StatusTracker;

/// Grace margin past the timeout budget before the dead-man switch
/// forces a failure outcome on a check that never settles.
const DEAD_MAN_GRACE: Duration = Duration::from_millis(50);

/// Coarse health status emitted by a probe session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// No threshold crossed yet; always the first value of a session.
    Unknown,
    /// `success_threshold` consecutive checks passed.
    Healthy,
    /// `failure_threshold` consecutive checks failed.
    Unhealthy,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbeStatus::Unknown => "unknown",
            ProbeStatus::Healthy => "healthy",
            ProbeStatus::Unhealthy => "unhealthy",
        };
        f.write_str(s)
    }
}

/// A health probe for one monitored target.
///
/// Construct with a validated [`ProbeConfig`], then call [`Probe::observe`]
/// to start a session. A probe can be observed any number of times; each
/// session gets its own counters and its own schedule.
#[derive(Debug, Clone)]
pub struct Probe {
    config: ProbeConfig,
}

impl Probe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Start a probe session and return its status stream.
    ///
    /// `ProbeStatus::Unknown` is queued synchronously, before the session
    /// task is spawned and before any check executes. Must be called from
    /// within a tokio runtime.
    pub fn observe(&self) -> StatusStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // First value of every session, ahead of any scheduling.
        let _ = tx.send(ProbeStatus::Unknown);

        let config = self.config.clone();
        let handle = tokio::spawn(run_session(config, tx, shutdown_rx));

        StatusStream {
            rx,
            shutdown_tx,
            handle,
        }
    }
}

/// Handle to one probe session: the ordered status stream plus its
/// cancellation switch.
///
/// The stream never errors and never ends on its own; it only stops
/// producing values after [`StatusStream::cancel`] or drop. Cancellation
/// is cooperative: the loop stops at its next suspension point, and the
/// result of an in-flight check is discarded rather than interrupted.
#[derive(Debug)]
pub struct StatusStream {
    rx: mpsc::UnboundedReceiver<ProbeStatus>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl StatusStream {
    /// Wait for the next status. Returns `None` once the session has been
    /// cancelled and all previously emitted values have been drained.
    pub async fn recv(&mut self) -> Option<ProbeStatus> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`StatusStream::recv`]; `None` when nothing
    /// is currently queued.
    pub fn try_recv(&mut self) -> Option<ProbeStatus> {
        self.rx.try_recv().ok()
    }

    /// Stop the session before its next cycle. No further statuses are
    /// emitted after the loop observes the signal.
    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for StatusStream {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        self.handle.abort();
    }
}

/// The scheduling loop for one session.
async fn run_session(
    config: ProbeConfig,
    tx: mpsc::UnboundedSender<ProbeStatus>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut tracker = StatusTracker::new(config.success_threshold, config.failure_threshold);

    debug!(
        period = ?config.period,
        timeout = ?config.timeout,
        "probe session starting"
    );

    tokio::select! {
        _ = tokio::time::sleep(config.initial_delay) => {}
        _ = shutdown.changed() => return,
    }

    loop {
        // Armed before the check so the cycle lasts max(period, check):
        // the period elapses concurrently with the attempt.
        let period_timer = tokio::time::sleep(config.period);
        tokio::pin!(period_timer);

        let outcome = tokio::select! {
            outcome = bounded_check(&config.performer, config.timeout) => outcome,
            _ = shutdown.changed() => {
                debug!("probe session cancelled; in-flight check discarded");
                return;
            }
        };

        // Fed to the tracker the moment the check settles, not at the
        // end of the period.
        if let Some(status) = tracker.record(outcome) {
            info!(%status, "probe status changed");
            if tx.send(status).is_err() {
                return;
            }
        }

        tokio::select! {
            _ = &mut period_timer => {}
            _ = shutdown.changed() => {
                debug!("probe session cancelled");
                return;
            }
        }
    }
}

/// One check attempt, backstopped by the dead-man switch.
///
/// The performer gets the timeout budget but is not trusted to honor it:
/// if nothing settles within `timeout + DEAD_MAN_GRACE`, the outcome is
/// forced to `false`.
async fn bounded_check(performer: &Performer, timeout: Duration) -> bool {
    tokio::select! {
        outcome = performer.check(timeout) => outcome,
        _ = tokio::time::sleep(timeout + DEAD_MAN_GRACE) => {
            debug!(?timeout, "check did not settle in time; dead-man switch fired");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::time::Instant;

    fn probe_with(performer: Performer, f: impl FnOnce(crate::ProbeConfigBuilder) -> crate::ProbeConfigBuilder) -> Probe {
        Probe::new(f(ProbeConfig::builder(performer)).build().unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn first_value_is_unknown_before_any_check() {
        let checks = Arc::new(AtomicU32::new(0));
        let counter = checks.clone();
        let performer = Performer::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        });

        let probe = probe_with(performer, |b| b);
        let mut stream = probe.observe();

        // Queued synchronously by observe(), before the task even runs.
        assert_eq!(stream.try_recv(), Some(ProbeStatus::Unknown));
        assert_eq!(checks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_from_unhealthy_to_healthy() {
        // A service that starts broken and is fixed once the probe
        // notices: unknown → unhealthy → healthy across one session.
        let healthy = Arc::new(AtomicBool::new(false));
        let flag = healthy.clone();
        let performer = Performer::new(move |_| {
            let up = flag.load(Ordering::SeqCst);
            async move {
                anyhow::ensure!(up, "service is unhealthy");
                Ok(())
            }
        });

        let probe = probe_with(performer, |b| {
            b.initial_delay(Duration::from_secs(1))
                .period(Duration::from_secs(1))
                .timeout(Duration::from_secs(1))
                .success_threshold(3)
                .failure_threshold(1)
        });
        let mut stream = probe.observe();

        assert_eq!(stream.recv().await, Some(ProbeStatus::Unknown));
        assert_eq!(stream.recv().await, Some(ProbeStatus::Unhealthy));

        healthy.store(true, Ordering::SeqCst);
        assert_eq!(stream.recv().await, Some(ProbeStatus::Healthy));
    }

    #[tokio::test(start_paused = true)]
    async fn status_changes_when_check_settles_not_at_period_end() {
        let performer = Performer::new(|_| async { Ok(()) });
        let probe = probe_with(performer, |b| b.period(Duration::from_secs(10)));
        let mut stream = probe.observe();

        let start = Instant::now();
        assert_eq!(stream.recv().await, Some(ProbeStatus::Unknown));
        assert_eq!(stream.recv().await, Some(ProbeStatus::Healthy));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn dead_man_switch_forces_failure() {
        // A check that neither resolves nor rejects, ever.
        let performer = Performer::new(|_| std::future::pending::<anyhow::Result<()>>());

        let probe = probe_with(performer, |b| {
            b.period(Duration::from_secs(1))
                .timeout(Duration::from_secs(1))
                .failure_threshold(1)
        });
        let mut stream = probe.observe();

        let start = Instant::now();
        assert_eq!(stream.recv().await, Some(ProbeStatus::Unknown));
        assert_eq!(stream.recv().await, Some(ProbeStatus::Unhealthy));
        // timeout + the 50ms grace margin, on the paused clock.
        assert_eq!(start.elapsed(), Duration::from_millis(1050));
    }

    #[tokio::test(start_paused = true)]
    async fn check_starts_are_spaced_by_period() {
        let starts = Arc::new(Mutex::new(Vec::new()));
        let log = starts.clone();
        let performer = Performer::new(move |_| {
            log.lock().unwrap().push(Instant::now());
            async { Ok(()) }
        });

        let probe = probe_with(performer, |b| b.period(Duration::from_millis(100)));
        let stream = probe.observe();

        tokio::time::sleep(Duration::from_millis(250)).await;
        stream.cancel();

        let starts = starts.lock().unwrap();
        assert!(starts.len() >= 3);
        for pair in starts.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_millis(100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_check_delays_but_never_overlaps_the_next() {
        // Each check takes 250ms against a 100ms period: the next check
        // must start immediately after the previous one settles.
        let spans = Arc::new(Mutex::new(Vec::new()));
        let log = spans.clone();
        let performer = Performer::new(move |_| {
            let log = log.clone();
            let started = Instant::now();
            async move {
                tokio::time::sleep(Duration::from_millis(250)).await;
                log.lock().unwrap().push((started, Instant::now()));
                Ok(())
            }
        });

        let probe = probe_with(performer, |b| {
            b.period(Duration::from_millis(100))
                .timeout(Duration::from_secs(1))
        });
        let stream = probe.observe();

        tokio::time::sleep(Duration::from_millis(600)).await;
        stream.cancel();

        let spans = spans.lock().unwrap();
        assert!(spans.len() >= 2);
        for pair in spans.windows(2) {
            let (_, prev_end) = pair[0];
            let (next_start, _) = pair[1];
            // No overlap, and no idle gap either: back to back.
            assert_eq!(next_start, prev_end);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_checks_and_emissions() {
        let checks = Arc::new(AtomicU32::new(0));
        let counter = checks.clone();
        let performer = Performer::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow::anyhow!("down")) }
        });

        let probe = probe_with(performer, |b| {
            b.period(Duration::from_millis(100)).failure_threshold(100)
        });
        let mut stream = probe.observe();

        assert_eq!(stream.recv().await, Some(ProbeStatus::Unknown));
        tokio::time::sleep(Duration::from_millis(250)).await;
        stream.cancel();
        tokio::task::yield_now().await;

        let seen = checks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(checks.load(Ordering::SeqCst), seen);
        assert_eq!(stream.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_initial_delay_runs_no_checks() {
        let checks = Arc::new(AtomicU32::new(0));
        let counter = checks.clone();
        let performer = Performer::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        });

        let probe = probe_with(performer, |b| b.initial_delay(Duration::from_secs(60)));
        let mut stream = probe.observe();

        assert_eq!(stream.recv().await, Some(ProbeStatus::Unknown));
        stream.cancel();

        assert_eq!(stream.recv().await, None);
        assert_eq!(checks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_are_independent_and_restartable() {
        let performer = Performer::new(|_| async { Ok(()) });
        let probe = probe_with(performer, |b| {
            b.period(Duration::from_millis(10)).success_threshold(2)
        });

        for _ in 0..2 {
            let mut stream = probe.observe();
            // Fresh counters every session: unknown first, then the
            // threshold has to be climbed from scratch.
            assert_eq!(stream.recv().await, Some(ProbeStatus::Unknown));
            assert_eq!(stream.recv().await, Some(ProbeStatus::Healthy));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn flapping_target_never_reaches_healthy() {
        // true, true, false, ... : the climb restarts after every dip.
        let n = Arc::new(AtomicU32::new(0));
        let counter = n.clone();
        let performer = Performer::new(move |_| {
            let i = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                anyhow::ensure!(i % 3 != 2, "flapped");
                Ok(())
            }
        });

        let probe = probe_with(performer, |b| {
            b.period(Duration::from_millis(10))
                .success_threshold(3)
                .failure_threshold(100)
        });
        let mut stream = probe.observe();

        assert_eq!(stream.recv().await, Some(ProbeStatus::Unknown));
        tokio::time::sleep(Duration::from_secs(2)).await;
        stream.cancel();
        assert_eq!(stream.recv().await, None);
    }

    #[test]
    fn status_serializes_to_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&ProbeStatus::Unknown).unwrap(),
            "\"unknown\""
        );
        assert_eq!(
            serde_json::to_string(&ProbeStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::from_str::<ProbeStatus>("\"unhealthy\"").unwrap(),
            ProbeStatus::Unhealthy
        );
        assert_eq!(ProbeStatus::Healthy.to_string(), "healthy");
    }
}
