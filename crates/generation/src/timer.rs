//! Delay primitive used between status checks.

use std::time::Duration;

/// Suspends the current task for `duration` without blocking the runtime.
///
/// Runs on tokio's timer, so tests can drive it with a paused clock.
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}
