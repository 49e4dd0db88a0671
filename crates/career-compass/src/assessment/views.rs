use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answers::AnswerMap;
use super::domain::{ProgramId, SectionId};
use super::recommendation::RecommendationResult;
use super::scoring::ProgramScoreTable;
use super::validation::SectionCheck;

/// One bar of the results chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdownEntry {
    pub program: ProgramId,
    pub program_code: String,
    pub program_label: String,
    pub score: u32,
    pub share_percent: f32,
}

pub fn score_breakdown(scores: &ProgramScoreTable) -> Vec<ScoreBreakdownEntry> {
    let total = scores.total();
    scores
        .iter()
        .map(|(program, score)| ScoreBreakdownEntry {
            program,
            program_code: program.code().to_string(),
            program_label: program.label().to_string(),
            score,
            share_percent: if total == 0 {
                0.0
            } else {
                (score as f32 / total as f32) * 100.0
            },
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationView {
    pub program: ProgramId,
    pub program_label: String,
    pub has_signal: bool,
    pub breakdown: Vec<ScoreBreakdownEntry>,
}

impl From<&RecommendationResult> for RecommendationView {
    fn from(result: &RecommendationResult) -> Self {
        Self {
            program: result.program(),
            program_label: result.program().label().to_string(),
            has_signal: result.has_signal(),
            breakdown: score_breakdown(result.scores()),
        }
    }
}

/// Everything handed to downstream evaluation and export once an assessment is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub answers: AnswerMap,
    pub scores: ProgramScoreTable,
    pub recommendation: RecommendationView,
    pub submitted_at: DateTime<Utc>,
}

/// Answered-versus-required counts for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionProgress {
    pub section: SectionId,
    pub section_label: &'static str,
    pub answered: usize,
    pub total: usize,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentProgress {
    pub sections: Vec<SectionProgress>,
    pub completed_sections: usize,
    pub total_sections: usize,
    pub percent: u8,
}

impl AssessmentProgress {
    pub(crate) fn from_sections(sections: Vec<SectionProgress>) -> Self {
        let total_sections = sections.len();
        let completed_sections = sections.iter().filter(|section| section.complete).count();
        let percent = if total_sections == 0 {
            0
        } else {
            ((completed_sections * 100) / total_sections) as u8
        };

        Self {
            sections,
            completed_sections,
            total_sections,
            percent,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total_sections > 0 && self.completed_sections == self.total_sections
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionCheckView {
    #[serde(flatten)]
    pub check: SectionCheck,
    pub section_label: &'static str,
}

impl From<SectionCheck> for SectionCheckView {
    fn from(check: SectionCheck) -> Self {
        Self {
            section_label: check.section.label(),
            check,
        }
    }
}
