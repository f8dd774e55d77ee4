//! Reconciliation loop
//!
//! Turns an eventually-consistent remote operation into a single awaited
//! call. A probe runs once per interval, the first run one interval after
//! the start, until it reports completion, returns an error, or the timeout
//! elapses. Probes never overlap.

use crate::error::{OpcError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(3600);

/// What to wait for, how often to look, and for how long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSpec {
    pub description: String,
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSpec {
    pub fn new(description: impl Into<String>, interval: Duration, timeout: Duration) -> Self {
        Self {
            description: description.into(),
            interval,
            timeout,
        }
    }
}

impl Default for PollSpec {
    fn default() -> Self {
        Self::new("resource", DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT)
    }
}

/// Run `probe` until it yields a value.
///
/// `Ok(None)` keeps polling, `Ok(Some(v))` finishes with `v`, and any error
/// stops the loop and is returned unchanged.
pub async fn poll<T, F, Fut>(spec: &PollSpec, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    if spec.interval.is_zero() {
        return Err(OpcError::InvalidConfig(format!(
            "poll interval for {} must be greater than zero",
            spec.description
        )));
    }

    let start = Instant::now();
    let deadline = saturating_add(start, spec.timeout);
    let mut next_tick = saturating_add(start, spec.interval);

    loop {
        if next_tick > deadline {
            sleep_until(deadline).await;
            debug!(description = %spec.description, "Timed out");
            return Err(OpcError::Timeout {
                description: spec.description.clone(),
                timeout: spec.timeout,
            });
        }
        sleep_until(next_tick).await;

        debug!(
            "Waiting for {} ({}/{}s)",
            spec.description,
            start.elapsed().as_secs(),
            spec.timeout.as_secs()
        );
        if let Some(value) = probe().await? {
            debug!(description = %spec.description, "Done waiting");
            return Ok(value);
        }

        next_tick = saturating_add(next_tick, spec.interval);
        let now = Instant::now();
        if next_tick < now {
            next_tick = saturating_add(now, spec.interval);
        }
    }
}

/// Roughly 30 years; stands in for durations an `Instant` cannot hold
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

fn saturating_add(instant: Instant, duration: Duration) -> Instant {
    instant
        .checked_add(duration)
        .or_else(|| instant.checked_add(FAR_FUTURE))
        .unwrap_or(instant)
}

/// Wait until `probe` returns `Ok(true)` or an error.
pub async fn wait_for<F, Fut>(spec: &PollSpec, mut probe: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    poll(spec, move || {
        let check = probe();
        async move { Ok(check.await?.then_some(())) }
    })
    .await
}

/// [`poll`] that also stops with [`OpcError::Cancelled`] when `token` fires.
///
/// A probe in flight at cancellation is dropped.
pub async fn poll_cancellable<T, F, Fut>(
    spec: &PollSpec,
    token: &CancellationToken,
    probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            debug!(description = %spec.description, "Wait cancelled");
            Err(OpcError::Cancelled { description: spec.description.clone() })
        }
        result = poll(spec, probe) => result,
    }
}

pub async fn wait_for_cancellable<F, Fut>(
    spec: &PollSpec,
    token: &CancellationToken,
    mut probe: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    poll_cancellable(spec, token, move || {
        let check = probe();
        async move { Ok(check.await?.then_some(())) }
    })
    .await
}
