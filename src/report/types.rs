use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::enums::{FindingStatus, SchemaVariant, SeverityLevel};

/// A raw assistant-turn payload as handed over by the history store.
///
/// The producing service emits JSON-encoded text per turn, but historical
/// records sometimes carry plain prose, so the boundary stays untyped.
/// Read once per render; nothing here is cached.
#[derive(Debug, Clone)]
pub enum RawPayload {
    /// Undecoded text straight off the wire.
    Text(String),
    /// An already-decoded structured document.
    Document(Value),
}

impl RawPayload {
    pub fn text(s: impl Into<String>) -> Self {
        RawPayload::Text(s.into())
    }

    pub fn document(v: Value) -> Self {
        RawPayload::Document(v)
    }

    /// Decoded document view of the payload.
    ///
    /// `Text` is decoded on the fly; decode failure or a non-object result
    /// yields `None` (the payload degrades to raw-text display).
    pub fn as_document(&self) -> Option<Value> {
        match self {
            RawPayload::Text(s) => match serde_json::from_str::<Value>(s) {
                Ok(v) if v.is_object() => Some(v),
                _ => None,
            },
            RawPayload::Document(v) if v.is_object() => Some(v.clone()),
            RawPayload::Document(_) => None,
        }
    }

    /// The payload as displayable raw text, used by the raw-text template.
    pub fn raw_text(&self) -> String {
        match self {
            RawPayload::Text(s) => s.clone(),
            RawPayload::Document(v) => v.to_string(),
        }
    }
}

impl From<&str> for RawPayload {
    fn from(s: &str) -> Self {
        RawPayload::Text(s.to_string())
    }
}

impl From<Value> for RawPayload {
    fn from(v: Value) -> Self {
        RawPayload::Document(v)
    }
}

/// Canonical severity block of a normalized report.
///
/// `confidence` is always clamped to [0, 1]. `confidence_provided` tells the
/// view whether the producer actually supplied a confidence signal — a bar
/// must never render from the numeric fallback of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityAssessment {
    pub level: SeverityLevel,
    pub confidence: f32,
    pub confidence_provided: bool,
    pub presentation_hint: Option<String>,
}

impl Default for SeverityAssessment {
    fn default() -> Self {
        SeverityAssessment {
            level: SeverityLevel::Unknown,
            confidence: 0.0,
            confidence_provided: false,
            presentation_hint: None,
        }
    }
}

/// Advice block: one optional immediate action plus ordered advice lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Recommendations {
    pub immediate_action: Option<String>,
    pub lifestyle: Vec<String>,
    pub nutrition: Vec<String>,
}

/// Advisory, non-binding suggestion to consult a named type of clinician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistReferral {
    #[serde(rename = "type")]
    pub specialist_type: String,
    pub urgency: String,
    pub reason: String,
}

/// The producer's reasoning trail for an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub reasoning: String,
    pub history_factor: Option<String>,
    pub profile_factor: Option<String>,
}

/// One row of a lab/marker table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularFinding {
    pub name: String,
    pub value: String,
    pub reference_range: String,
    pub status: FindingStatus,
    pub explanation: Option<String>,
}

/// A knowledge source cited by the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSource {
    pub source: Option<String>,
    pub description: String,
}

/// The canonical internal model, one per assistant turn.
///
/// Fully defaulted: list fields are empty rather than absent, the disclaimer
/// always carries text. Immutable once produced — it is recomputed, never
/// mutated, on every render pass over the same raw turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReport {
    pub variant: SchemaVariant,
    pub summary_text: String,
    pub severity: SeverityAssessment,
    pub conditions: Vec<String>,
    pub recommendations: Recommendations,
    pub specialist_referral: Option<SpecialistReferral>,
    pub explanation: Option<Explanation>,
    pub tabular_findings: Vec<TabularFinding>,
    pub knowledge_sources: Vec<KnowledgeSource>,
    pub clarification_questions: Vec<String>,
    pub disclaimer: String,
    pub attached_audio_ref: Option<String>,
}

impl NormalizedReport {
    /// Attach the synthesized-speech reference carried by the originating turn.
    pub fn with_audio_ref(mut self, audio_ref: Option<String>) -> Self {
        self.attached_audio_ref = audio_ref;
        self
    }
}
