use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::error::ClientError;
use super::{PollOutcome, SynthesisJobClient};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Delay between consecutive status fetches.
    pub poll_interval: Duration,
    /// Overall deadline for the wait. `None` keeps polling until the service
    /// reports a terminal status.
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

/// Progress updates emitted while waiting on a job, for incremental display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Submitted { job_id: String },
    Status { job_id: String, status: String },
}

pub type JobEventSender = mpsc::UnboundedSender<JobEvent>;

/// Poll `job_id` until the service reports a terminal status, sleeping
/// `poll_interval` between fetches. Returns the download URL on success.
///
/// The loop never asks the service to cancel the job; cancelling the token
/// only stops the local wait.
pub async fn wait_for_completion(
    client: &dyn SynthesisJobClient,
    job_id: &str,
    options: &WaitOptions,
    cancel_token: &CancellationToken,
    events: Option<&JobEventSender>,
) -> Result<String, ClientError> {
    let started = Instant::now();
    let deadline = options.timeout.map(|timeout| started + timeout);

    loop {
        match client.poll(job_id).await? {
            PollOutcome::Succeeded(url) => {
                info!(job_id, "batch synthesis job completed, download URL: {}", url);
                return Ok(url);
            }
            PollOutcome::Failed => {
                warn!(job_id, "batch synthesis job failed");
                return Err(ClientError::JobFailed {
                    job_id: job_id.to_string(),
                });
            }
            PollOutcome::Pending(status) => {
                info!(
                    job_id,
                    %status,
                    "job still pending, checking again in {}s",
                    options.poll_interval.as_secs()
                );
                if let Some(events) = events {
                    let _ = events.send(JobEvent::Status {
                        job_id: job_id.to_string(),
                        status: status.to_string(),
                    });
                }
            }
        }

        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(ClientError::Timeout {
                    job_id: job_id.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
        }

        tokio::select! {
            _ = sleep(options.poll_interval) => {}
            _ = cancel_token.cancelled() => {
                return Err(ClientError::Cancelled {
                    job_id: job_id.to_string(),
                });
            }
            _ = async { sleep_until(deadline.unwrap_or_else(Instant::now)).await }, if deadline.is_some() => {
                return Err(ClientError::Timeout {
                    job_id: job_id.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
        }
    }
}

/// Submit `text` and wait for the resulting job to finish. A submission
/// failure is returned without entering the polling loop.
pub async fn submit_and_wait(
    client: &dyn SynthesisJobClient,
    text: &str,
    options: &WaitOptions,
    cancel_token: &CancellationToken,
    events: Option<&JobEventSender>,
) -> Result<String, ClientError> {
    let job_id = client.submit(text).await?;
    if let Some(events) = events {
        let _ = events.send(JobEvent::Submitted {
            job_id: job_id.clone(),
        });
    }
    wait_for_completion(client, &job_id, options, cancel_token, events).await
}
