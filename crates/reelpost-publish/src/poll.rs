//! Bounded status polling for media containers.
//!
//! Checks run at a fixed interval with no back-off. The loop ends on
//! `FINISHED`, fails on `ERROR`, and gives up once either the attempt cap or
//! the wall-clock timeout in [`PollPolicy`] is reached.

use std::future::Future;

use reelpost_core::{ContainerStatus, PollPolicy};
use tokio::time::Instant;

use crate::error::PublishError;

/// Calls `check` until it reports [`ContainerStatus::Finished`].
///
/// `check` returning `Ok(None)` (no `status_code` in the response) counts as
/// still in progress. Returns the number of checks made.
///
/// # Errors
///
/// - [`PublishError::ContainerFailed`] when a check reports `ERROR`.
/// - [`PublishError::PollExhausted`] after `policy.max_attempts` checks.
/// - [`PublishError::PollTimedOut`] when the next wait would pass `policy.timeout`.
/// - Any error returned by `check`, unchanged.
pub async fn poll_until_finished<F, Fut>(
    container_id: &str,
    policy: &PollPolicy,
    mut check: F,
) -> Result<u32, PublishError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<ContainerStatus>, PublishError>>,
{
    let started = Instant::now();
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let status = check().await?;
        tracing::info!(container_id, attempt, status = ?status, "checked container status");

        match status {
            Some(ContainerStatus::Finished) => return Ok(attempt),
            Some(ContainerStatus::Error) => {
                return Err(PublishError::ContainerFailed {
                    container_id: container_id.to_string(),
                });
            }
            _ => {}
        }

        if attempt >= policy.max_attempts {
            return Err(PublishError::PollExhausted {
                container_id: container_id.to_string(),
                attempts: attempt,
            });
        }
        let elapsed = started.elapsed();
        if elapsed + policy.interval > policy.timeout {
            return Err(PublishError::PollTimedOut {
                container_id: container_id.to_string(),
                elapsed_secs: elapsed.as_secs(),
            });
        }
        tokio::time::sleep(policy.interval).await;
    }
}
