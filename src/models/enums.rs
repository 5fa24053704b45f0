use crate::models::ModelError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(SchemaVariant {
    HealthReport => "health_report",
    MedicalAnalysis => "medical_report_analysis",
    LegacyMedicalReport => "legacy_medical_report",
    ClarificationQuestions => "clarification_questions",
    ImageAnalysis => "image_analysis",
    GenericAssessment => "generic_assessment",
    PlainText => "plain_text",
    Malformed => "malformed",
});

str_enum!(SeverityLevel {
    Low => "low",
    Moderate => "moderate",
    High => "high",
    Emergency => "emergency",
    Unknown => "unknown",
});

str_enum!(FindingStatus {
    Normal => "normal",
    Borderline => "borderline",
    Abnormal => "abnormal",
    Unknown => "unknown",
});

str_enum!(FeedbackRating {
    Helpful => "helpful",
    NotHelpful => "not_helpful",
    Unset => "unset",
});

str_enum!(FeedbackReason {
    NotAccurate => "not_accurate",
    NotRelevant => "not_relevant",
    TooComplex => "too_complex",
    DidNotAnswer => "did_not_answer",
    Other => "other",
});

str_enum!(TemplateId {
    FullReport => "full_report",
    QuestionList => "question_list",
    RawText => "raw_text",
});

str_enum!(TurnRole {
    User => "user",
    Assistant => "assistant",
});
