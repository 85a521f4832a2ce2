//! Session state machine.
//!
//! ```text
//! Idle ──submit(valid)──▶ Submitting ──ok──▶ Loaded
//!   │                        │
//!   └─submit(invalid)─▶ Failed ◀──err──┘
//! Loaded | Failed ──submit(valid)──▶ Submitting
//! ```
//!
//! Each accepted submission gets a fresh [`Ticket`]. A completion is applied only if
//! it carries the latest ticket, so a slow, superseded response can never overwrite
//! the state of a newer run.

use tracing::{debug, warn};

use crate::client::PipelineClient;
use crate::error::{RagscopeError, Result};
use crate::params::Parameters;
use crate::request::{RequestPayload, build_request};
use crate::result::{Answer, PipelineResult, Submission};

/// Identifies one accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the single live session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Submitting {
        ticket: Ticket,
    },
    Loaded {
        result: PipelineResult,
        answer: Answer,
    },
    Failed {
        message: String,
    },
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting { .. } => "submitting",
            Self::Loaded { .. } => "loaded",
            Self::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    next_ticket: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SessionState::Submitting { .. })
    }

    pub fn result(&self) -> Option<&PipelineResult> {
        match &self.state {
            SessionState::Loaded { result, .. } => Some(result),
            _ => None,
        }
    }

    /// The derived answer. Only a `Loaded` state has one.
    pub fn answer(&self) -> Option<&Answer> {
        match &self.state {
            SessionState::Loaded { answer, .. } => Some(answer),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// The ticket of the submission currently in flight, if any.
    pub fn in_flight(&self) -> Option<Ticket> {
        match self.state {
            SessionState::Submitting { ticket } => Some(ticket),
            _ => None,
        }
    }

    /// Start a submission from `params`.
    ///
    /// On a blank query the state becomes `Failed` with the validation message and
    /// `None` is returned: the caller must not issue a request. Otherwise the previous
    /// result, answer and error are dropped, the state becomes `Submitting`, and the
    /// caller gets the ticket plus the payload to send.
    pub fn begin(&mut self, params: &Parameters) -> Option<(Ticket, RequestPayload)> {
        match build_request(params, false) {
            Ok(payload) => {
                self.next_ticket += 1;
                let ticket = Ticket(self.next_ticket);
                self.state = SessionState::Submitting { ticket };
                debug!(%ticket, query_len = payload.query.len(), "Submission started");
                Some((ticket, payload))
            }
            Err(err) => {
                debug!(error = %err, "Submission rejected before sending");
                self.state = SessionState::Failed {
                    message: err.user_message(),
                };
                None
            }
        }
    }

    /// Apply the outcome of the submission identified by `ticket`.
    ///
    /// Returns `false` and leaves the state untouched when `ticket` is not the
    /// submission currently in flight.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<Submission>) -> bool {
        if self.in_flight() != Some(ticket) {
            debug!(%ticket, current = %self.state, "Discarding superseded response");
            return false;
        }
        self.state = match outcome {
            Ok(Submission { result, answer }) => SessionState::Loaded { result, answer },
            Err(err) => {
                warn!(%ticket, error = %err, "Submission failed");
                SessionState::Failed {
                    message: err.user_message(),
                }
            }
        };
        true
    }

    /// Record a failure that happened outside the pipeline client, such as a
    /// crashed submission task.
    pub fn fail(&mut self, ticket: Ticket, err: RagscopeError) -> bool {
        self.complete(ticket, Err(err))
    }

    /// Begin, submit and complete in one go.
    pub async fn run(&mut self, client: &PipelineClient, params: &Parameters) -> &SessionState {
        if let Some((ticket, payload)) = self.begin(params) {
            let outcome = client.submit(&payload).await;
            self.complete(ticket, outcome);
        }
        &self.state
    }
}
