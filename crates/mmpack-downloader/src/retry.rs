//! Blocking retry with exponential backoff for transient HTTP failures.

use std::time::Duration;

use backon::{BlockingRetryable, ExponentialBuilder};
use mmpack_core::error::{Error, Result};
use tracing::warn;

/// Default retry policy: up to 3 attempts, starting at 200ms and
/// doubling, capped at 5s.
#[must_use]
pub fn default_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(200))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(3)
}

/// Run `op`, retrying on failure per [`default_backoff`]. Every retry
/// is logged at `warn` with the error that triggered it.
pub fn with_retry<T>(op: impl FnMut() -> Result<T>) -> Result<T> {
    op.retry(default_backoff())
        .notify(|err: &Error, dur: Duration| {
            warn!(error = %err, delay = ?dur, "retrying after transient failure");
        })
        .call()
}
