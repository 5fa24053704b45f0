//! Trait seams toward the transport collaborator.
//!
//! The core never talks HTTP itself: token attachment, retries, and endpoint
//! routing all live behind these traits, which also allow mocking in tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Backend unreachable: {0}")]
    Connection(String),

    #[error("Backend returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Response decoding error: {0}")]
    Decode(String),
}

/// Wire type for one feedback submission, following the backend's current
/// structured contract (boolean helpfulness + optional detail).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub report_id: Option<Uuid>,
    pub helpful: bool,
    pub reason: Option<String>,
    pub comment: Option<String>,
}

/// Outbound feedback call. Implementations resolve to exactly one of
/// success or error per invocation.
pub trait FeedbackTransport {
    fn submit_feedback(&self, submission: &FeedbackSubmission) -> Result<(), TransportError>;
}

/// Outbound document-export call. The returned bytes are opaque to the
/// core; the presentation layer turns them into a save-to-disk action.
pub trait ExportTransport {
    fn request_export(&self, user_identifier: &str) -> Result<Vec<u8>, TransportError>;
}
