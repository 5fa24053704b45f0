use serde_json::Value;

use crate::models::enums::SeverityLevel;

/// Parse a severity label from whichever schema generation supplied it.
/// Handles the casing and synonyms seen across historical records.
pub fn parse_severity_level(raw: &str) -> SeverityLevel {
    match raw.to_lowercase().trim() {
        "low" => SeverityLevel::Low,
        "medium" | "moderate" => SeverityLevel::Moderate,
        "high" => SeverityLevel::High,
        "emergency" | "critical" => SeverityLevel::Emergency,
        _ => SeverityLevel::Unknown,
    }
}

/// Derive the canonical severity level from a decoded document.
///
/// Strict priority: nested `risk_assessment.severity`, then top-level
/// `severity`, then `Unknown`. When the nested field is present its parse
/// result wins even if unrecognized. No keyword inference happens here —
/// escalation from free text is an upstream collaborator's job.
pub fn resolve_severity(doc: &Value) -> SeverityLevel {
    if let Some(nested) = doc
        .get("risk_assessment")
        .and_then(|ra| ra.get("severity"))
        .and_then(Value::as_str)
    {
        return parse_severity_level(nested);
    }
    doc.get("severity")
        .and_then(Value::as_str)
        .map(parse_severity_level)
        .unwrap_or(SeverityLevel::Unknown)
}
