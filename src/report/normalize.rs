//! Report normalization — every field fallback chain lives here.
//!
//! The producing service has shipped at least six incompatible payload
//! generations. This module maps each of them (plus the legacy fallback
//! field names scattered across historical records) into one canonical
//! `NormalizedReport`. No other module reads a raw payload field directly.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::classify::classify;
use super::confidence::coerce_confidence;
use super::severity::resolve_severity;
use super::types::{
    Explanation, KnowledgeSource, NormalizedReport, RawPayload, Recommendations,
    SeverityAssessment, SpecialistReferral, TabularFinding,
};
use crate::config::DEFAULT_DISCLAIMER;
use crate::models::enums::{FindingStatus, SchemaVariant};

/// Classify and normalize in one pass. This is the per-render entry point:
/// normalization is recomputed on every render, never cached.
pub fn normalize_payload(payload: &RawPayload) -> NormalizedReport {
    normalize(payload, classify(payload))
}

/// Map a payload + its variant into the canonical model. Total for every
/// variant: `PlainText`/`Malformed` (and any payload whose document cannot
/// be decoded) yield a minimal report carrying only the raw text and the
/// default disclaimer.
pub fn normalize(payload: &RawPayload, variant: SchemaVariant) -> NormalizedReport {
    if matches!(variant, SchemaVariant::PlainText | SchemaVariant::Malformed) {
        return minimal_report(variant, payload.raw_text());
    }

    let Some(doc) = payload.as_document() else {
        tracing::warn!(
            variant = variant.as_str(),
            "Structured variant without a decodable document, degrading to raw text"
        );
        return minimal_report(SchemaVariant::Malformed, payload.raw_text());
    };

    match variant {
        SchemaVariant::HealthReport => normalize_assessment(&doc, SchemaVariant::HealthReport),
        SchemaVariant::GenericAssessment => {
            normalize_assessment(&doc, SchemaVariant::GenericAssessment)
        }
        SchemaVariant::MedicalAnalysis => normalize_medical_analysis(&doc),
        SchemaVariant::LegacyMedicalReport => normalize_legacy_report(&doc),
        SchemaVariant::ClarificationQuestions => normalize_clarification(&doc),
        SchemaVariant::ImageAnalysis => normalize_image_analysis(&doc),
        SchemaVariant::PlainText | SchemaVariant::Malformed => {
            minimal_report(variant, payload.raw_text())
        }
    }
}

/// Minimal report for the raw-text template: the payload itself as summary,
/// default disclaimer, everything else empty.
fn minimal_report(variant: SchemaVariant, raw_text: String) -> NormalizedReport {
    NormalizedReport {
        variant,
        summary_text: raw_text,
        severity: SeverityAssessment::default(),
        conditions: vec![],
        recommendations: Recommendations::default(),
        specialist_referral: None,
        explanation: None,
        tabular_findings: vec![],
        knowledge_sources: vec![],
        clarification_questions: vec![],
        disclaimer: DEFAULT_DISCLAIMER.to_string(),
        attached_audio_ref: None,
    }
}

// ── Per-variant field tables ────────────────────────────────────────────

/// Shared field table for `health_report` and the generic/unversioned
/// generations — the generic shape is a strict subset of the structured one.
fn normalize_assessment(doc: &Value, variant: SchemaVariant) -> NormalizedReport {
    NormalizedReport {
        variant,
        summary_text: summary_chain(doc).unwrap_or_else(|| "Health assessment".to_string()),
        severity: severity_assessment(doc),
        conditions: conditions(doc),
        recommendations: recommendations(doc),
        specialist_referral: specialist_referral(doc),
        explanation: explanation(doc),
        tabular_findings: vec![],
        knowledge_sources: knowledge_sources(doc),
        clarification_questions: vec![],
        disclaimer: disclaimer(doc),
        attached_audio_ref: None,
    }
}

/// `medical_report_analysis`: tabular findings from `test_analysis`.
/// Older records carried the OCR'd text under `content`, which serves as a
/// summary of last resort.
fn normalize_medical_analysis(doc: &Value) -> NormalizedReport {
    let summary_text = summary_chain(doc)
        .or_else(|| str_field(doc, "content"))
        .unwrap_or_else(|| "Medical report analysis".to_string());

    NormalizedReport {
        variant: SchemaVariant::MedicalAnalysis,
        summary_text,
        severity: severity_assessment(doc),
        conditions: conditions(doc),
        recommendations: recommendations(doc),
        specialist_referral: None,
        explanation: None,
        tabular_findings: findings(
            doc.get("test_analysis"),
            &["name", "test_name"],
            &["reference_range", "normal_range", "range"],
        ),
        knowledge_sources: knowledge_sources(doc),
        clarification_questions: vec![],
        disclaimer: disclaimer(doc),
        attached_audio_ref: None,
    }
}

/// Legacy lab-marker generation: `interpretation` prose + `lab_markers` rows.
fn normalize_legacy_report(doc: &Value) -> NormalizedReport {
    NormalizedReport {
        variant: SchemaVariant::LegacyMedicalReport,
        summary_text: summary_chain(doc)
            .unwrap_or_else(|| "Lab report interpretation".to_string()),
        severity: severity_assessment(doc),
        conditions: conditions(doc),
        recommendations: recommendations(doc),
        specialist_referral: None,
        explanation: None,
        tabular_findings: findings(
            doc.get("lab_markers"),
            &["marker", "name", "test_name"],
            &["range", "reference_range", "normal_range"],
        ),
        knowledge_sources: vec![],
        clarification_questions: vec![],
        disclaimer: disclaimer(doc),
        attached_audio_ref: None,
    }
}

/// Clarification turns: the `context` field is the displayed text, the
/// questions render as a list.
fn normalize_clarification(doc: &Value) -> NormalizedReport {
    let summary_text = str_field(doc, "context")
        .or_else(|| summary_chain(doc))
        .unwrap_or_else(|| "The assistant needs more information to continue.".to_string());

    NormalizedReport {
        variant: SchemaVariant::ClarificationQuestions,
        summary_text,
        severity: SeverityAssessment::default(),
        conditions: vec![],
        recommendations: Recommendations::default(),
        specialist_referral: None,
        explanation: None,
        tabular_findings: vec![],
        knowledge_sources: vec![],
        clarification_questions: string_list(doc.get("questions")),
        disclaimer: disclaimer(doc),
        attached_audio_ref: None,
    }
}

/// Image-observation generation. Observations double as considerations when
/// no condition list was supplied, and as a summary of last resort.
fn normalize_image_analysis(doc: &Value) -> NormalizedReport {
    let observations = string_list(doc.get("observations"));

    let summary_text = summary_chain(doc)
        .or_else(|| str_field(doc, "image_caption"))
        .or_else(|| {
            if observations.is_empty() {
                None
            } else {
                Some(observations.join("; "))
            }
        })
        .unwrap_or_else(|| "Image analysis".to_string());

    let mut conditions = first_list(doc, &["possible_conditions", "possible_causes", "conditions"]);
    if conditions.is_empty() {
        conditions = observations;
    }

    let mut recommendations = recommendations(doc);
    if recommendations.immediate_action.is_none() {
        recommendations.immediate_action = str_field(doc, "recommendation");
    }

    NormalizedReport {
        variant: SchemaVariant::ImageAnalysis,
        summary_text,
        severity: severity_assessment(doc),
        conditions,
        recommendations,
        specialist_referral: None,
        explanation: None,
        tabular_findings: vec![],
        knowledge_sources: knowledge_sources(doc),
        clarification_questions: vec![],
        disclaimer: disclaimer(doc),
        attached_audio_ref: None,
    }
}

// ── Field extraction helpers (the documented fallback chains) ───────────

/// Summary text precedence shared by every structured variant:
/// `health_information` → `summary` → `interpretation`.
fn summary_chain(doc: &Value) -> Option<String> {
    first_str(doc, &["health_information", "summary", "interpretation"])
}

/// Severity block: level by strict priority, confidence coerced from
/// `risk_assessment.confidence_score` → top-level `confidence_score` →
/// top-level `confidence`, uncertainty reason passed through as the
/// presentation hint.
fn severity_assessment(doc: &Value) -> SeverityAssessment {
    let risk = doc.get("risk_assessment");

    let confidence_raw = risk
        .and_then(|r| r.get("confidence_score"))
        .or_else(|| doc.get("confidence_score"))
        .or_else(|| doc.get("confidence"));

    let uncertainty_reason = risk
        .and_then(|r| r.get("uncertainty_reason"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| str_field(doc, "uncertainty_reason"));

    let coerced = coerce_confidence(confidence_raw, uncertainty_reason);

    SeverityAssessment {
        level: resolve_severity(doc),
        confidence: coerced.score,
        confidence_provided: coerced.provided,
        presentation_hint: coerced.uncertainty_reason,
    }
}

/// Possible causes/considerations: `possible_causes` → `conditions`.
fn conditions(doc: &Value) -> Vec<String> {
    first_list(doc, &["possible_causes", "conditions"])
}

/// Advice chains. The nested, newer field names win over the older
/// top-level ones whenever both are present:
/// `recommendations.lifestyle_advice` → `lifestyle_recommendations`,
/// `recommendations.food_advice` → `food_recommendations`.
fn recommendations(doc: &Value) -> Recommendations {
    let nested = doc.get("recommendations");

    let immediate_action = nested
        .and_then(|r| r.get("immediate_action"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let lifestyle = nested
        .and_then(|r| r.get("lifestyle_advice"))
        .filter(|v| v.is_array())
        .map(|v| string_list(Some(v)))
        .unwrap_or_else(|| string_list(doc.get("lifestyle_recommendations")));

    let nutrition = nested
        .and_then(|r| r.get("food_advice"))
        .filter(|v| v.is_array())
        .map(|v| string_list(Some(v)))
        .unwrap_or_else(|| string_list(doc.get("food_recommendations")));

    Recommendations {
        immediate_action,
        lifestyle,
        nutrition,
    }
}

fn specialist_referral(doc: &Value) -> Option<SpecialistReferral> {
    let referral = doc.get("recommended_specialist")?;
    let specialist_type = referral.get("type").and_then(Value::as_str)?;
    Some(SpecialistReferral {
        specialist_type: specialist_type.to_string(),
        urgency: str_field(referral, "urgency").unwrap_or_default(),
        reason: str_field(referral, "reason").unwrap_or_default(),
    })
}

fn explanation(doc: &Value) -> Option<Explanation> {
    let block = doc.get("explanation")?;
    let reasoning = str_field(block, "reasoning")?;
    Some(Explanation {
        reasoning,
        history_factor: str_field(block, "history_factor"),
        profile_factor: str_field(block, "profile_factor"),
    })
}

fn knowledge_sources(doc: &Value) -> Vec<KnowledgeSource> {
    parse_array_lenient(doc.get("knowledge_sources"))
}

fn disclaimer(doc: &Value) -> String {
    str_field(doc, "disclaimer").unwrap_or_else(|| DEFAULT_DISCLAIMER.to_string())
}

/// Lab/marker rows. Row-level names and range fields vary per generation,
/// so callers pass the per-variant key precedence. Rows without a name are
/// dropped.
fn findings(raw: Option<&Value>, name_keys: &[&str], range_keys: &[&str]) -> Vec<TabularFinding> {
    let Some(Value::Array(rows)) = raw else {
        return vec![];
    };

    rows.iter()
        .filter_map(|row| {
            let name = first_str(row, name_keys)?;
            Some(TabularFinding {
                name,
                value: row.get("value").and_then(display_value).unwrap_or_default(),
                reference_range: range_keys
                    .iter()
                    .find_map(|k| row.get(k).and_then(display_value))
                    .unwrap_or_default(),
                status: parse_finding_status(row.get("status")),
                explanation: str_field(row, "explanation"),
            })
        })
        .collect()
}

/// Map a row status label onto the canonical finding statuses. The legacy
/// format flagged out-of-range rows as "Low"/"High"; both are abnormal here.
fn parse_finding_status(raw: Option<&Value>) -> FindingStatus {
    match raw.and_then(Value::as_str).map(|s| s.to_lowercase()) {
        Some(s) => match s.trim() {
            "normal" => FindingStatus::Normal,
            "borderline" => FindingStatus::Borderline,
            "abnormal" | "low" | "high" => FindingStatus::Abnormal,
            _ => FindingStatus::Unknown,
        },
        None => FindingStatus::Unknown,
    }
}

// ── Low-level accessors ─────────────────────────────────────────────────

/// Non-empty string field, trimmed.
fn str_field(doc: &Value, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// First key in the precedence list with a non-empty string value.
fn first_str(doc: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| str_field(doc, k))
}

/// First key in the precedence list holding an array. A present-but-empty
/// newer field still wins over an older populated one.
fn first_list(doc: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|k| doc.get(k).filter(|v| v.is_array()))
        .map(|v| string_list(Some(v)))
        .unwrap_or_default()
}

/// Lenient list of display strings: non-displayable items are skipped.
fn string_list(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items.iter().filter_map(display_value).collect(),
        _ => vec![],
    }
}

/// Render a scalar JSON value for display.
fn display_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse an array leniently — skip items that fail to deserialize.
fn parse_array_lenient<T: DeserializeOwned>(raw: Option<&Value>) -> Vec<T> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::SeverityLevel;
    use serde_json::json;

    fn full_health_report() -> Value {
        json!({
            "type": "health_report",
            "summary": "Symptoms consistent with seasonal influenza.",
            "possible_causes": ["Influenza A", "Common cold"],
            "risk_assessment": {
                "severity": "MEDIUM",
                "confidence_score": 0.82,
                "uncertainty_reason": "Limited symptom history"
            },
            "explanation": {
                "reasoning": "Fever plus myalgia during flu season.",
                "history_factor": "Similar episode last winter",
                "profile_factor": null
            },
            "recommended_specialist": {
                "type": "General practitioner",
                "reason": "Persistent fever beyond 3 days",
                "urgency": "Soon"
            },
            "recommendations": {
                "immediate_action": "Rest and hydrate.",
                "lifestyle_advice": ["Sleep 8 hours", "Avoid exertion"],
                "food_advice": ["Warm fluids", "Vitamin C rich fruit"]
            },
            "knowledge_sources": [
                {"source": "WHO influenza factsheet", "description": "Symptom overview"},
                {"description": "General triage guidance"}
            ],
            "disclaimer": "Informational only."
        })
    }

    #[test]
    fn health_report_full_mapping() {
        let report = normalize_payload(&full_health_report().into());

        assert_eq!(report.variant, SchemaVariant::HealthReport);
        assert_eq!(
            report.summary_text,
            "Symptoms consistent with seasonal influenza."
        );
        assert_eq!(report.severity.level, SeverityLevel::Moderate);
        assert!((report.severity.confidence - 0.82).abs() < 1e-6);
        assert!(report.severity.confidence_provided);
        assert_eq!(
            report.severity.presentation_hint.as_deref(),
            Some("Limited symptom history")
        );
        assert_eq!(report.conditions, vec!["Influenza A", "Common cold"]);
        assert_eq!(
            report.recommendations.immediate_action.as_deref(),
            Some("Rest and hydrate.")
        );
        assert_eq!(report.recommendations.lifestyle.len(), 2);
        assert_eq!(report.recommendations.nutrition.len(), 2);

        let referral = report.specialist_referral.unwrap();
        assert_eq!(referral.specialist_type, "General practitioner");
        assert_eq!(referral.urgency, "Soon");

        let explanation = report.explanation.unwrap();
        assert_eq!(explanation.reasoning, "Fever plus myalgia during flu season.");
        assert_eq!(
            explanation.history_factor.as_deref(),
            Some("Similar episode last winter")
        );
        assert!(explanation.profile_factor.is_none());

        // Lenient source parsing keeps the entry without a named source.
        assert_eq!(report.knowledge_sources.len(), 2);
        assert!(report.knowledge_sources[1].source.is_none());

        assert_eq!(report.disclaimer, "Informational only.");
        assert!(report.tabular_findings.is_empty());
        assert!(report.clarification_questions.is_empty());
    }

    #[test]
    fn generic_assessment_scenario() {
        // Scenario B: top-level severity, no risk_assessment nesting.
        let report = normalize_payload(&json!({"summary": "flu-like", "severity": "HIGH"}).into());
        assert_eq!(report.variant, SchemaVariant::GenericAssessment);
        assert_eq!(report.severity.level, SeverityLevel::High);
        assert!(report.conditions.is_empty());
        assert!(!report.severity.confidence_provided);
        assert_eq!(report.disclaimer, DEFAULT_DISCLAIMER);
    }

    #[test]
    fn newer_food_field_wins_over_legacy() {
        let doc = json!({
            "summary": "s",
            "severity": "LOW",
            "recommendations": {"food_advice": ["New advice"]},
            "food_recommendations": ["Old advice"]
        });
        let report = normalize_payload(&doc.into());
        assert_eq!(report.recommendations.nutrition, vec!["New advice"]);
    }

    #[test]
    fn legacy_food_field_used_when_newer_absent() {
        let doc = json!({
            "summary": "s",
            "severity": "LOW",
            "food_recommendations": ["Old advice"]
        });
        let report = normalize_payload(&doc.into());
        assert_eq!(report.recommendations.nutrition, vec!["Old advice"]);
    }

    #[test]
    fn empty_newer_list_still_wins() {
        // A present-but-empty newer field shadows the legacy one.
        let doc = json!({
            "summary": "s",
            "recommendations": {"lifestyle_advice": []},
            "lifestyle_recommendations": ["Old"]
        });
        let report = normalize_payload(&doc.into());
        assert!(report.recommendations.lifestyle.is_empty());
    }

    #[test]
    fn medical_analysis_rows() {
        let doc = json!({
            "type": "medical_report_analysis",
            "summary": "CBC mostly within range.",
            "test_analysis": [
                {
                    "name": "Hemoglobin",
                    "value": 13.2,
                    "reference_range": "12.0-15.5 g/dL",
                    "status": "Normal"
                },
                {
                    "test_name": "WBC",
                    "value": "11.8",
                    "normal_range": "4.0-11.0",
                    "status": "High",
                    "explanation": "Mild elevation, possibly infection."
                },
                {"value": 1.0, "status": "Normal"}
            ]
        });
        let report = normalize_payload(&doc.into());
        assert_eq!(report.variant, SchemaVariant::MedicalAnalysis);
        assert_eq!(report.tabular_findings.len(), 2, "nameless row dropped");
        assert_eq!(report.tabular_findings[0].name, "Hemoglobin");
        assert_eq!(report.tabular_findings[0].value, "13.2");
        assert_eq!(report.tabular_findings[0].status, FindingStatus::Normal);
        assert_eq!(report.tabular_findings[1].name, "WBC");
        assert_eq!(report.tabular_findings[1].status, FindingStatus::Abnormal);
        assert_eq!(
            report.tabular_findings[1].explanation.as_deref(),
            Some("Mild elevation, possibly infection.")
        );
    }

    #[test]
    fn medical_analysis_content_as_summary_of_last_resort() {
        let doc = json!({
            "type": "medical_report_analysis",
            "content": "Hb: 13.2 (Range: 12.0-15.5) -> Normal",
            "filename": "cbc.pdf"
        });
        let report = normalize_payload(&doc.into());
        assert_eq!(report.summary_text, "Hb: 13.2 (Range: 12.0-15.5) -> Normal");
    }

    #[test]
    fn legacy_report_markers() {
        let doc = json!({
            "summary": "Routine panel",
            "interpretation": "Cholesterol borderline, rest normal.",
            "lab_markers": [
                {"marker": "Total cholesterol", "value": 215, "range": "< 200", "status": "Borderline"},
                {"marker": "HDL", "value": 52, "range": "> 40", "status": "Normal"}
            ]
        });
        let report = normalize_payload(&doc.into());
        assert_eq!(report.variant, SchemaVariant::LegacyMedicalReport);
        // health_information/summary outranks interpretation.
        assert_eq!(report.summary_text, "Routine panel");
        assert_eq!(report.tabular_findings.len(), 2);
        assert_eq!(report.tabular_findings[0].status, FindingStatus::Borderline);
        assert_eq!(report.tabular_findings[0].reference_range, "< 200");
    }

    #[test]
    fn clarification_questions_mapping() {
        // Scenario A payload.
        let doc = json!({"type": "clarification_questions", "context": "c", "questions": ["q1", "q2"]});
        let report = normalize_payload(&doc.into());
        assert_eq!(report.variant, SchemaVariant::ClarificationQuestions);
        assert_eq!(report.summary_text, "c");
        assert_eq!(report.clarification_questions, vec!["q1", "q2"]);
        assert!(report.tabular_findings.is_empty());
    }

    #[test]
    fn image_analysis_mapping() {
        let doc = json!({
            "observations": ["Localized redness", "No visible swelling"],
            "possible_conditions": ["Contact dermatitis"],
            "recommendation": "Keep the area clean and dry."
        });
        let report = normalize_payload(&doc.into());
        assert_eq!(report.variant, SchemaVariant::ImageAnalysis);
        // No summary field: observations stand in.
        assert_eq!(report.summary_text, "Localized redness; No visible swelling");
        assert_eq!(report.conditions, vec!["Contact dermatitis"]);
        assert_eq!(
            report.recommendations.immediate_action.as_deref(),
            Some("Keep the area clean and dry.")
        );
    }

    #[test]
    fn image_analysis_observations_double_as_conditions() {
        let doc = json!({"summary": "Skin photo", "observations": ["Redness"]});
        let report = normalize_payload(&doc.into());
        assert_eq!(report.summary_text, "Skin photo");
        assert_eq!(report.conditions, vec!["Redness"]);
    }

    #[test]
    fn plain_text_minimal_report() {
        // Scenario C.
        let report = normalize_payload(&"not json".into());
        assert_eq!(report.variant, SchemaVariant::PlainText);
        assert_eq!(report.summary_text, "not json");
        assert_eq!(report.disclaimer, DEFAULT_DISCLAIMER);
        assert!(report.conditions.is_empty());
    }

    #[test]
    fn malformed_minimal_report() {
        let report = normalize_payload(&json!({"unrelated": 1}).into());
        assert_eq!(report.variant, SchemaVariant::Malformed);
        assert_eq!(report.disclaimer, DEFAULT_DISCLAIMER);
    }

    #[test]
    fn mismatched_variant_degrades_not_panics() {
        // Caller passes a structured variant for undecodable text.
        let report = normalize(&"prose".into(), SchemaVariant::HealthReport);
        assert_eq!(report.variant, SchemaVariant::Malformed);
        assert_eq!(report.summary_text, "prose");
    }

    #[test]
    fn summary_non_empty_for_all_structured_variants() {
        let payloads = [
            json!({"type": "health_report"}),
            json!({"type": "medical_report_analysis"}),
            json!({"type": "legacy_medical_report"}),
            json!({"type": "clarification_questions"}),
            json!({"type": "image_analysis"}),
            json!({"type": "generic_assessment"}),
        ];
        for doc in payloads {
            let payload: RawPayload = doc.into();
            let report = normalize_payload(&payload);
            assert!(
                !report.summary_text.is_empty(),
                "empty summary for {:?}",
                report.variant
            );
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        let payload: RawPayload = full_health_report().into();
        let first = normalize_payload(&payload);
        let second = normalize_payload(&payload);
        assert_eq!(first, second);
    }

    #[test]
    fn findings_only_for_tabular_variants() {
        let generic = normalize_payload(&json!({"summary": "s", "severity": "LOW"}).into());
        assert!(generic.tabular_findings.is_empty());

        let image = normalize_payload(&json!({"observations": ["x"]}).into());
        assert!(image.tabular_findings.is_empty());
    }
}
