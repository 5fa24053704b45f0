//! Conversation turns and the render pipeline.
//!
//! Inbound shape mirrors the history collaborator: an ordered sequence of
//! turns, each with a role, raw content, and an optional synthesized-speech
//! reference. Only assistant turns flow through normalization; user turns
//! are echoed as plain text by the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dispatch::{select_presentation, Presentation};
use crate::feedback::FeedbackSession;
use crate::models::enums::{SchemaVariant, TurnRole};
use crate::report::normalize::normalize_payload;
use crate::report::types::{NormalizedReport, RawPayload};

/// One turn as delivered by the conversation-history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub role: TurnRole,
    pub content: String,
    pub audio_ref: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ConversationTurn {
    pub fn assistant(content: impl Into<String>) -> Self {
        ConversationTurn {
            id: Uuid::new_v4(),
            role: TurnRole::Assistant,
            content: content.into(),
            audio_ref: None,
            timestamp: Some(Utc::now()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ConversationTurn {
            id: Uuid::new_v4(),
            role: TurnRole::User,
            content: content.into(),
            audio_ref: None,
            timestamp: Some(Utc::now()),
        }
    }

    fn payload(&self) -> RawPayload {
        RawPayload::text(self.content.clone())
    }
}

/// Everything the view needs for one assistant turn: the canonical report,
/// the dispatch decision, and a fresh feedback session bound to the turn.
#[derive(Debug)]
pub struct RenderedReport {
    pub turn_id: Uuid,
    pub report: NormalizedReport,
    pub presentation: Presentation,
    pub session: FeedbackSession,
}

/// Run classify → normalize → dispatch for an assistant turn.
///
/// Returns `None` for user turns. Normalization is recomputed on every
/// call; each rendered report owns an independent feedback session, so
/// concurrent views never share state.
pub fn render_assistant_turn(turn: &ConversationTurn) -> Option<RenderedReport> {
    if turn.role != TurnRole::Assistant {
        return None;
    }

    let _span = tracing::info_span!("render_turn", turn_id = %turn.id).entered();

    let report = normalize_payload(&turn.payload()).with_audio_ref(turn.audio_ref.clone());
    if report.variant == SchemaVariant::Malformed {
        tracing::warn!(turn_id = %turn.id, "Unrecognized payload shape, rendering raw text");
    }

    let presentation = select_presentation(&report);

    Some(RenderedReport {
        turn_id: turn.id,
        report,
        presentation,
        session: FeedbackSession::new(turn.id),
    })
}

/// Render every assistant turn of a history slice, in order.
pub fn render_history(turns: &[ConversationTurn]) -> Vec<RenderedReport> {
    turns.iter().filter_map(render_assistant_turn).collect()
}

/// Echoed text for a user turn; assistant turns yield `None`.
pub fn echo_user_turn(turn: &ConversationTurn) -> Option<&str> {
    (turn.role == TurnRole::User).then_some(turn.content.as_str())
}
