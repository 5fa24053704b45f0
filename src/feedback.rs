//! Per-report feedback capture as an explicit state machine.
//!
//! One `FeedbackSession` exists per displayed report, created on first
//! render and destroyed with the view. Submission is at-most-once: the
//! `Submitted` state is terminal and repeated submits issue no further
//! outbound calls. A failed transport call leaves the session in
//! `AwaitingSubmit` so the user keeps exactly one retry path.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::enums::{FeedbackRating, FeedbackReason};
use crate::transport::{FeedbackSubmission, FeedbackTransport, TransportError};

/// States of the feedback flow.
///
/// `AwaitingReason` is only reachable from a NotHelpful rating; a Helpful
/// rating moves straight to `AwaitingSubmit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    AwaitingRating,
    AwaitingReason,
    AwaitingSubmit,
    Submitted,
}

#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("Validation failed: {0}")]
    Validation(&'static str),

    #[error("Action '{action}' is not valid in state {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: SessionState,
    },

    #[error("Feedback submission failed: {0}")]
    Transport(#[from] TransportError),
}

/// Feedback state for one displayed report, keyed by its report identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSession {
    report_id: Uuid,
    state: SessionState,
    rating: FeedbackRating,
    reason: Option<FeedbackReason>,
    free_text: Option<String>,
    submitted: bool,
}

impl FeedbackSession {
    pub fn new(report_id: Uuid) -> Self {
        FeedbackSession {
            report_id,
            state: SessionState::AwaitingRating,
            rating: FeedbackRating::Unset,
            reason: None,
            free_text: None,
            submitted: false,
        }
    }

    pub fn report_id(&self) -> Uuid {
        self.report_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn rating(&self) -> FeedbackRating {
        self.rating
    }

    pub fn reason(&self) -> Option<FeedbackReason> {
        self.reason
    }

    pub fn free_text(&self) -> Option<&str> {
        self.free_text.as_deref()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Record a rating. Allowed any time before submission; re-rating
    /// restarts at the new branch, and switching branches discards any
    /// previously entered reason and free text.
    pub fn rate(&mut self, rating: FeedbackRating) -> Result<(), FeedbackError> {
        if self.state == SessionState::Submitted {
            return Err(self.invalid("rate"));
        }
        if rating == FeedbackRating::Unset {
            return Err(FeedbackError::Validation("A rating must be chosen"));
        }

        self.rating = rating;
        self.reason = None;
        self.free_text = None;
        self.state = match rating {
            FeedbackRating::Helpful => SessionState::AwaitingSubmit,
            _ => SessionState::AwaitingReason,
        };
        Ok(())
    }

    /// Select a reason on the NotHelpful branch. `Other` unlocks the
    /// free-text field; any other code clears previously entered text.
    pub fn choose_reason(&mut self, code: FeedbackReason) -> Result<(), FeedbackError> {
        let on_not_helpful_branch = self.state == SessionState::AwaitingReason
            || (self.state == SessionState::AwaitingSubmit
                && self.rating == FeedbackRating::NotHelpful);
        if !on_not_helpful_branch {
            return Err(self.invalid("choose_reason"));
        }

        if code != FeedbackReason::Other {
            self.free_text = None;
        }
        self.reason = Some(code);
        self.state = SessionState::AwaitingSubmit;
        Ok(())
    }

    /// Attach free text; only meaningful (and only allowed) under the
    /// `Other` reason. Blank text clears the field.
    pub fn set_free_text(&mut self, text: &str) -> Result<(), FeedbackError> {
        if self.state != SessionState::AwaitingSubmit || self.reason != Some(FeedbackReason::Other)
        {
            return Err(self.invalid("set_free_text"));
        }
        let trimmed = text.trim();
        self.free_text = (!trimmed.is_empty()).then(|| trimmed.to_string());
        Ok(())
    }

    /// Submit the captured feedback through the transport collaborator.
    ///
    /// Issues exactly one outbound call per session lifetime: once
    /// `Submitted`, further calls are no-ops returning `Ok(false)`. A
    /// transport failure keeps the session in `AwaitingSubmit` and is
    /// surfaced as retryable. Returns `Ok(true)` when a call was issued
    /// and succeeded.
    pub fn submit(&mut self, transport: &dyn FeedbackTransport) -> Result<bool, FeedbackError> {
        match self.state {
            SessionState::Submitted => return Ok(false),
            SessionState::AwaitingRating => return Err(self.invalid("submit")),
            SessionState::AwaitingReason => {
                return Err(FeedbackError::Validation(
                    "A reason is required for not-helpful feedback",
                ))
            }
            SessionState::AwaitingSubmit => {}
        }
        if self.rating == FeedbackRating::NotHelpful && self.reason.is_none() {
            return Err(FeedbackError::Validation(
                "A reason is required for not-helpful feedback",
            ));
        }

        let submission = FeedbackSubmission {
            report_id: Some(self.report_id),
            helpful: self.rating == FeedbackRating::Helpful,
            reason: self.reason.map(|r| r.as_str().to_string()),
            comment: self.free_text.clone(),
        };

        transport.submit_feedback(&submission)?;

        self.submitted = true;
        self.state = SessionState::Submitted;
        tracing::info!(
            report_id = %self.report_id,
            helpful = submission.helpful,
            "Feedback submitted"
        );
        Ok(true)
    }

    /// Abandon the current rating/reason and return to the start.
    pub fn cancel(&mut self) -> Result<(), FeedbackError> {
        match self.state {
            SessionState::AwaitingReason | SessionState::AwaitingSubmit => {
                self.rating = FeedbackRating::Unset;
                self.reason = None;
                self.free_text = None;
                self.state = SessionState::AwaitingRating;
                Ok(())
            }
            _ => Err(self.invalid("cancel")),
        }
    }

    fn invalid(&self, action: &'static str) -> FeedbackError {
        FeedbackError::InvalidTransition {
            action,
            state: self.state,
        }
    }
}
