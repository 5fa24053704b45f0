//! Presentation dispatch — the single place where schema variants map to
//! templates and user actions. The match is exhaustive over `SchemaVariant`
//! so adding a generation is a compile-time-visible change.

use serde::{Deserialize, Serialize};

use crate::models::enums::{SchemaVariant, TemplateId};
use crate::report::types::NormalizedReport;

/// An action the view may offer for a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportAction {
    Download,
    Feedback,
    PlayAudio,
}

/// The dispatch decision for one report: which template renders it and
/// which actions the view exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub template: TemplateId,
    pub actions: Vec<ReportAction>,
}

impl Presentation {
    pub fn has_action(&self, action: ReportAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Select the template and action set for a normalized report.
///
/// Clarification turns are not rated and not exported; raw text gets no
/// actions at all; every other variant is a full report with Download +
/// Feedback, plus PlayAudio when the originating turn carried speech.
pub fn select_presentation(report: &NormalizedReport) -> Presentation {
    match report.variant {
        SchemaVariant::ClarificationQuestions => Presentation {
            template: TemplateId::QuestionList,
            actions: vec![],
        },
        SchemaVariant::PlainText | SchemaVariant::Malformed => Presentation {
            template: TemplateId::RawText,
            actions: vec![],
        },
        SchemaVariant::HealthReport
        | SchemaVariant::MedicalAnalysis
        | SchemaVariant::LegacyMedicalReport
        | SchemaVariant::ImageAnalysis
        | SchemaVariant::GenericAssessment => {
            let mut actions = vec![ReportAction::Download, ReportAction::Feedback];
            if report.attached_audio_ref.is_some() {
                actions.push(ReportAction::PlayAudio);
            }
            Presentation {
                template: TemplateId::FullReport,
                actions,
            }
        }
    }
}
