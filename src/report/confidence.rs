use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Percentage bands for categorical confidence labels.
pub mod confidence_bands {
    /// Label contains "high"
    pub const HIGH: u8 = 90;

    /// Label contains "medium"
    pub const MEDIUM: u8 = 60;

    /// Label contains "low"
    pub const LOW: u8 = 30;
}

/// A confidence signal coerced onto a single scale.
///
/// `provided` distinguishes a genuine 0 from "the producer said nothing" —
/// the severity band must not render a bar with a false signal, so callers
/// check `provided` before using the numeric fallback of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoercedConfidence {
    pub score: f32,
    pub percent: u8,
    pub provided: bool,
    pub uncertainty_reason: Option<String>,
}

impl CoercedConfidence {
    fn absent(uncertainty_reason: Option<String>) -> Self {
        CoercedConfidence {
            score: 0.0,
            percent: 0,
            provided: false,
            uncertainty_reason,
        }
    }
}

/// Coerce a heterogeneous confidence field into a 0–1 score + percentage.
///
/// Numeric input is clamped to [0, 1] and rounded to a whole percentage.
/// Categorical input is matched case-insensitively by substring ("high" →
/// 90%, "medium" → 60%, "low" → 30%, in that order). Anything else counts
/// as not provided. The optional human-readable uncertainty reason passes
/// through unchanged.
pub fn coerce_confidence(raw: Option<&Value>, uncertainty_reason: Option<String>) -> CoercedConfidence {
    match raw {
        Some(Value::Number(n)) => {
            let score = n.as_f64().unwrap_or(0.0).clamp(0.0, 1.0);
            CoercedConfidence {
                score: score as f32,
                percent: (score * 100.0).round() as u8,
                provided: true,
                uncertainty_reason,
            }
        }
        Some(Value::String(s)) => match categorical_percent(s) {
            Some(percent) => CoercedConfidence {
                score: f32::from(percent) / 100.0,
                percent,
                provided: true,
                uncertainty_reason,
            },
            None => CoercedConfidence::absent(uncertainty_reason),
        },
        _ => CoercedConfidence::absent(uncertainty_reason),
    }
}

/// Map a categorical confidence label to its percentage band.
fn categorical_percent(label: &str) -> Option<u8> {
    let lower = label.to_lowercase();
    if lower.contains("high") {
        Some(confidence_bands::HIGH)
    } else if lower.contains("medium") {
        Some(confidence_bands::MEDIUM)
    } else if lower.contains("low") {
        Some(confidence_bands::LOW)
    } else {
        None
    }
}
