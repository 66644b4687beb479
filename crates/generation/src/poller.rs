//! Status poller: turns an asynchronous render job into a resolved image URL.
//!
//! ```text
//! Submitted ──wait──▶ check ──pending / not found──▶ wait ──▶ check ...
//!                       │
//!                       ├── completed + url ──▶ Ok(url)
//!                       ├── failed          ──▶ Err(RemoteFailure)
//!                       └── other error     ──▶ Err(error)
//! after max_attempts checks without a terminal state ──▶ Err(TimedOut)
//! ```
//!
//! The cadence is fixed (no back-off). The attempt cap bounds how long a stuck
//! job is held.

use std::time::Duration;

use imaging::{JobStatus, JobUid, RenderError, RenderService};
use tracing::{debug, info, instrument};

use crate::timer;

/// Delay before each status check.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Status checks made before a job is declared timed out (90 s at the default
/// interval).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 45;

const UNKNOWN_REMOTE_ERROR: &str = "Unknown error";

/// Polling cadence and attempt cap for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    interval: Duration,
    max_attempts: u32,
}

impl PollPolicy {
    /// Creates a policy, returning `None` if the interval is zero or no attempts
    /// are allowed.
    pub fn new(interval: Duration, max_attempts: u32) -> Option<Self> {
        if interval.is_zero() || max_attempts == 0 {
            None
        } else {
            Some(Self {
                interval,
                max_attempts,
            })
        }
    }

    /// Delay before each status check.
    pub fn interval(self) -> Duration {
        self.interval
    }

    /// Maximum number of status checks.
    pub fn max_attempts(self) -> u32 {
        self.max_attempts
    }

    /// Total time a job may spend polling before it times out. Saturates at
    /// [`Duration::MAX`].
    pub fn budget(self) -> Duration {
        self.interval
            .checked_mul(self.max_attempts)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Polls one job until it completes, fails, or exhausts its policy.
///
/// Holds no state between calls; every call owns its own attempt counter.
pub struct StatusPoller<'a> {
    service: &'a dyn RenderService,
    policy: PollPolicy,
}

impl<'a> StatusPoller<'a> {
    /// Creates a poller over `service`.
    pub fn new(service: &'a dyn RenderService, policy: PollPolicy) -> Self {
        Self { service, policy }
    }

    /// Waits for job `uid` to produce an image and returns its URL.
    ///
    /// The first check happens one interval after the call, never immediately.
    ///
    /// # Errors
    ///
    /// - [`RenderError::RemoteFailure`] if the job reaches the `failed` state.
    /// - [`RenderError::TimedOut`] after `max_attempts` non-terminal checks.
    /// - Any status-check error other than [`RenderError::JobNotFound`],
    ///   returned as soon as it occurs.
    #[instrument(skip_all, fields(uid = %uid))]
    pub async fn wait_for_image(&self, uid: &JobUid) -> Result<String, RenderError> {
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            timer::sleep(self.policy.interval).await;

            match self.service.check_status(uid).await {
                Ok(JobStatus::Completed {
                    image_url: Some(url),
                }) => {
                    info!(attempt, url = %url, "Image completed");
                    return Ok(url);
                }
                Ok(JobStatus::Failed { error }) => {
                    let message = error
                        .filter(|e| !e.trim().is_empty())
                        .unwrap_or_else(|| UNKNOWN_REMOTE_ERROR.to_string());
                    return Err(RenderError::RemoteFailure { message });
                }
                Ok(JobStatus::Pending) | Ok(JobStatus::Completed { image_url: None }) => {
                    debug!(attempt, max_attempts, "Image still pending");
                }
                // The service does not index a job the instant it is accepted,
                // so "not found" here means "not visible yet". This is the only
                // status-check error that does not end polling.
                Err(RenderError::JobNotFound { .. }) => {
                    debug!(attempt, max_attempts, "Image not found yet");
                }
                Err(err) => return Err(err),
            }
        }

        Err(RenderError::TimedOut {
            attempts: max_attempts,
            elapsed: self.policy.budget(),
        })
    }
}
