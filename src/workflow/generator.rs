//! workflow::generator
//!
//! Changelog generation: submit a request, then poll the job until it
//! finishes.
//!
//! # States
//!
//! ```text
//! Idle ──submit──► Submitting ──id──► Polling ──completed──► Completed
//!                      │                 │
//!                      └──── error ──────┴──── error / exhausted / cancelled ──► Failed
//! ```
//!
//! # Polling
//!
//! Each tick waits [`PollPolicy::interval`] and then issues one status
//! request. The next wait only starts after the previous response has been
//! handled, so status requests never overlap. Polling stops after
//! [`PollPolicy::max_attempts`] requests. Every tick is wrapped in explicit
//! failure handling: a transport error, a non-success status or an
//! undecodable payload all end in `Failed`.
//!
//! Polling honours a [`CancellationToken`]; the host cancels it on teardown.
//!
//! # Example
//!
//! ```ignore
//! let mut workflow = GeneratorWorkflow::new(PollPolicy::default());
//! let state = workflow
//!     .generate(&api, request, browser.can_generate(), &CancellationToken::new())
//!     .await?;
//! if let GenerationState::Completed { changelog, .. } = state {
//!     assert!(!changelog.sections.is_empty());
//! }
//! ```

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, ChangelogApi};
use crate::core::config::{Settings, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS};
use crate::core::types::{ChangelogEntry, ChangelogRequest, JobId};

/// How often and how long to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

impl From<&Settings> for PollPolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            interval: settings.poll_interval,
            max_attempts: settings.max_poll_attempts,
        }
    }
}

/// Why a generation attempt failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The submission request failed.
    #[error("failed to submit changelog request: {0}")]
    Submit(ApiError),
    /// A status request failed.
    #[error("failed to check changelog status: {0}")]
    Status(ApiError),
    /// The backend reported an error for the job.
    #[error("changelog generation failed: {0}")]
    Backend(String),
    /// The job reported completion without a changelog.
    #[error("job completed without returning a changelog")]
    MissingChangelog,
    /// `max_attempts` status requests without a terminal answer.
    #[error("gave up after {attempts} status checks")]
    Exhausted { attempts: u32 },
    /// The host cancelled the workflow.
    #[error("generation cancelled")]
    Cancelled,
}

/// Workflow state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Submitting,
    Polling { job: JobId, attempts: u32 },
    Completed { job: JobId, changelog: ChangelogEntry },
    Failed { job: Option<JobId>, reason: FailureReason },
}

impl GenerationState {
    /// Whether a request is in flight (the trigger must be disabled).
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            GenerationState::Submitting | GenerationState::Polling { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationState::Completed { .. } | GenerationState::Failed { .. }
        )
    }

    /// The job id, once one has been assigned.
    pub fn job(&self) -> Option<&JobId> {
        match self {
            GenerationState::Polling { job, .. } | GenerationState::Completed { job, .. } => {
                Some(job)
            }
            GenerationState::Failed { job, .. } => job.as_ref(),
            GenerationState::Idle | GenerationState::Submitting => None,
        }
    }
}

/// Reasons a submission is refused before any request is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("a changelog is already being generated")]
    Busy,

    #[error("no commits in the selected date range")]
    NoCommits,
}

type Observer = Box<dyn FnMut(&GenerationState) + Send>;

/// The generation state machine.
pub struct GeneratorWorkflow {
    state: GenerationState,
    policy: PollPolicy,
    observer: Option<Observer>,
}

impl fmt::Debug for GeneratorWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorWorkflow")
            .field("state", &self.state)
            .field("policy", &self.policy)
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}

impl GeneratorWorkflow {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            state: GenerationState::Idle,
            policy,
            observer: None,
        }
    }

    /// Register a callback invoked on every state transition.
    pub fn on_transition(mut self, observer: impl FnMut(&GenerationState) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Whether the generate trigger is enabled.
    pub fn can_submit(&self, commits_available: bool) -> bool {
        commits_available && !self.state.is_busy()
    }

    fn transition(&mut self, next: GenerationState) {
        match &next {
            GenerationState::Failed { reason, job } => {
                tracing::error!(job = ?job.as_ref().map(JobId::as_str), "{}", reason)
            }
            GenerationState::Completed { job, .. } => {
                tracing::info!(job = %job, "changelog generated")
            }
            other => tracing::debug!(state = ?other, "generation state"),
        }
        self.state = next;
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.state);
        }
    }

    fn fail(&mut self, job: Option<JobId>, reason: FailureReason) {
        self.transition(GenerationState::Failed { job, reason });
    }

    /// Submit `request` and poll until a terminal state.
    ///
    /// `commits_available` is the commit browser's `can_generate()`.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Busy` or `WorkflowError::NoCommits` without
    /// sending anything. Network and backend failures are not errors here;
    /// they end in [`GenerationState::Failed`].
    pub async fn generate(
        &mut self,
        api: &dyn ChangelogApi,
        request: ChangelogRequest,
        commits_available: bool,
        cancel: &CancellationToken,
    ) -> Result<&GenerationState, WorkflowError> {
        if self.state.is_busy() {
            return Err(WorkflowError::Busy);
        }
        if !commits_available {
            return Err(WorkflowError::NoCommits);
        }

        self.transition(GenerationState::Submitting);

        let submitted = tokio::select! {
            _ = cancel.cancelled() => None,
            result = api.submit_changelog(&request) => Some(result),
        };
        let job = match submitted {
            None => {
                self.fail(None, FailureReason::Cancelled);
                return Ok(&self.state);
            }
            Some(Err(err)) => {
                self.fail(None, FailureReason::Submit(err));
                return Ok(&self.state);
            }
            Some(Ok(job)) => job,
        };

        self.transition(GenerationState::Polling {
            job: job.clone(),
            attempts: 0,
        });
        self.poll(api, job, cancel).await;
        Ok(&self.state)
    }

    async fn poll(&mut self, api: &dyn ChangelogApi, job: JobId, cancel: &CancellationToken) {
        let mut attempts = 0;

        loop {
            if attempts >= self.policy.max_attempts {
                self.fail(Some(job), FailureReason::Exhausted { attempts });
                return;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    self.fail(Some(job), FailureReason::Cancelled);
                    return;
                }
                _ = tokio::time::sleep(self.policy.interval) => {}
            }

            attempts += 1;
            let tick = tokio::select! {
                _ = cancel.cancelled() => None,
                result = api.changelog_status(&job) => Some(result),
            };

            match tick {
                None => {
                    self.fail(Some(job), FailureReason::Cancelled);
                    return;
                }
                Some(Err(err)) => {
                    self.fail(Some(job), FailureReason::Status(err));
                    return;
                }
                Some(Ok(status)) if status.completed => {
                    match status.changelog {
                        Some(changelog) => {
                            self.transition(GenerationState::Completed { job, changelog })
                        }
                        None => self.fail(Some(job), FailureReason::MissingChangelog),
                    }
                    return;
                }
                Some(Ok(status)) => {
                    if let Some(error) = status.error {
                        self.fail(Some(job), FailureReason::Backend(error));
                        return;
                    }
                    self.transition(GenerationState::Polling {
                        job: job.clone(),
                        attempts,
                    });
                }
            }
        }
    }
}
