use serde_json::Value;

use super::types::RawPayload;
use crate::models::enums::SchemaVariant;

/// Classify a raw payload into exactly one schema variant.
///
/// Pure and total: every input maps to a variant, nothing throws.
/// `PlainText` and `Malformed` are the catch-alls. The check order below is
/// part of the contract — several heuristics are not mutually exclusive
/// (stale data can leave an `observations` field on a generic assessment),
/// so precedence decides deterministically.
pub fn classify(payload: &RawPayload) -> SchemaVariant {
    match payload {
        RawPayload::Text(s) => match serde_json::from_str::<Value>(s) {
            Ok(doc) if doc.is_object() => classify_document(&doc),
            // Non-object JSON ("42", a quoted string) is still prose to us.
            Ok(_) | Err(_) => SchemaVariant::PlainText,
        },
        RawPayload::Document(doc) if doc.is_object() => classify_document(doc),
        RawPayload::Document(_) => SchemaVariant::Malformed,
    }
}

/// Classify an already-decoded structured document.
fn classify_document(doc: &Value) -> SchemaVariant {
    // 1. An explicit discriminator wins outright.
    if let Some(variant) = doc
        .get("type")
        .and_then(Value::as_str)
        .and_then(classify_discriminator)
    {
        return variant;
    }

    // 2. Structural heuristics substitute for the missing discriminator,
    //    in fixed order.
    if doc.get("test_analysis").is_some_and(Value::is_array) {
        return SchemaVariant::MedicalAnalysis;
    }
    if doc.get("observations").is_some_and(Value::is_array) {
        return SchemaVariant::ImageAnalysis;
    }
    if doc.get("interpretation").is_some() && doc.get("lab_markers").is_some_and(Value::is_array) {
        return SchemaVariant::LegacyMedicalReport;
    }
    if has_summary_field(doc) {
        // With or without a severity signal: a summary-bearing document is a
        // generic assessment (severity resolves to Unknown downstream).
        return SchemaVariant::GenericAssessment;
    }

    // 3. No structural match and no summary field.
    SchemaVariant::Malformed
}

/// Map an explicit `type` discriminator to one of the six named generations.
/// Returns `None` for unrecognized tags so structural heuristics get a turn.
fn classify_discriminator(type_str: &str) -> Option<SchemaVariant> {
    match type_str.to_lowercase().trim() {
        "health_report" | "health report" => Some(SchemaVariant::HealthReport),
        "medical_report_analysis" | "medical report analysis" => {
            Some(SchemaVariant::MedicalAnalysis)
        }
        "legacy_medical_report" | "medical_report" => Some(SchemaVariant::LegacyMedicalReport),
        "clarification_questions" | "clarification" => Some(SchemaVariant::ClarificationQuestions),
        "image_analysis" | "image_observation" => Some(SchemaVariant::ImageAnalysis),
        "generic_assessment" | "risk_assessment" => Some(SchemaVariant::GenericAssessment),
        _ => None,
    }
}

/// Whether the document carries any summary-bearing field.
fn has_summary_field(doc: &Value) -> bool {
    ["health_information", "summary", "interpretation"]
        .iter()
        .any(|k| doc.get(k).is_some_and(|v| v.is_string()))
}
