//! Phase 2: wait for the job to finish.
//!
//! The job is an explicit state machine:
//!
//! ```text
//!  Submitted ──status──▶ Polling ──status──▶ … ──▶ Done(result location)
//!      │                    │
//!      └────────────────────┴──▶ Failed(reason)
//! ```
//!
//! [`JobState::advance`] is the only transition function: it maps the
//! backend's reported status onto the next state. [`wait_for_result`] drives
//! it, sleeping [`PollPolicy::interval`] between polls. With the default
//! policy the loop has no attempt cap: a backend that accepts connections
//! but never reports completion is polled forever.
//!
//! A 5xx status reply counts as "still running". Any other non-2xx status
//! ends the job.

use crate::config::{resolve_location, PollPolicy};
use crate::error::Markdown2PdfError;
use crate::workflow::transport::HttpTransport;
use reqwest::Url;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Status value meaning the job has finished (compared ASCII case-insensitively).
pub const TERMINAL_STATUS: &str = "done";

const STATUS_SERVER_ERROR: u16 = 500;

/// What one GET on the job location reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(TERMINAL_STATUS))
    }
}

/// Where a conversion job stands.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    /// Accepted; not polled yet.
    Submitted { location: Url },
    /// Polled `attempts` times; still running.
    Polling { location: Url, attempts: u32 },
    /// Finished; the result lives at `result`.
    Done { result: Url },
    /// Cannot make progress.
    Failed { reason: String },
}

impl JobState {
    fn attempts(&self) -> u32 {
        match self {
            JobState::Polling { attempts, .. } => *attempts,
            _ => 0,
        }
    }

    /// Transition on one observed status.
    ///
    /// Terminal states absorb every observation.
    pub fn advance(self, observed: &JobStatus, base: &Url, policy: &PollPolicy) -> JobState {
        let attempts = self.attempts() + 1;
        let location = match self {
            JobState::Submitted { location } | JobState::Polling { location, .. } => location,
            terminal => return terminal,
        };

        if observed.is_terminal() {
            return match observed.path.as_deref().filter(|p| !p.is_empty()) {
                Some(path) => match resolve_location(base, path) {
                    Ok(result) => JobState::Done { result },
                    Err(e) => JobState::Failed {
                        reason: format!("invalid result path '{path}': {e}"),
                    },
                },
                None => JobState::Failed {
                    reason: "job finished without a result location".into(),
                },
            };
        }

        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return JobState::Failed {
                reason: format!("job still running after {attempts} status checks"),
            };
        }

        JobState::Polling { location, attempts }
    }
}

/// Poll `location` until the job is done; return the result location.
pub async fn wait_for_result(
    transport: &dyn HttpTransport,
    base: &Url,
    location: Url,
    policy: &PollPolicy,
) -> Result<Url, Markdown2PdfError> {
    let mut state = JobState::Submitted { location };

    loop {
        let location = match state {
            JobState::Done { result } => {
                info!(%result, "Job finished");
                return Ok(result);
            }
            JobState::Failed { reason } => return Err(Markdown2PdfError::PollFailed { reason }),
            JobState::Submitted { ref location } | JobState::Polling { ref location, .. } => {
                location.clone()
            }
        };

        let reply = transport
            .get(&location)
            .await
            .map_err(|source| Markdown2PdfError::PollTransport { source })?;
        let observed: JobStatus = match reply.status {
            _ if reply.is_success() => reply
                .json()
                .map_err(|source| Markdown2PdfError::PollTransport { source })?,
            status if status >= STATUS_SERVER_ERROR => {
                warn!(status, %location, "Job status unavailable, polling again");
                JobStatus::default()
            }
            status => {
                return Err(Markdown2PdfError::PollFailed {
                    reason: format!("Unexpected response: {status}"),
                });
            }
        };
        debug!(
            status = observed.status.as_deref().unwrap_or("<none>"),
            attempt = state.attempts() + 1,
            "Job status"
        );

        state = state.advance(&observed, base, policy);
        if matches!(state, JobState::Polling { .. }) {
            sleep(policy.interval).await;
        }
    }
}
