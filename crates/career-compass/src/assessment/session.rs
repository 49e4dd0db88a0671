use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use super::answers::{AnswerDraft, AnswerStore, ProgramTags};
use super::catalog::AssessmentCatalog;
use super::domain::{AnswerEvent, QualifiedKey, SectionId};
use super::recommendation::{resolve, RecommendationResult};
use super::scoring::ProgramScoreTable;
use super::validation::{self, first_incomplete, satisfies, SectionCheck};
use super::views::{AssessmentProgress, RecommendationView, SectionProgress, SubmissionPayload};

/// Result of recording one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    pub key: QualifiedKey,
    /// Points added to the tagged program, if the answer was scored.
    pub points: Option<u32>,
}

/// Submission was blocked by an incomplete section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{}", .0.summary())]
pub struct IncompleteAssessment(pub SectionCheck);

/// Answers and running scores for one user's assessment.
///
/// A session has a single writer; callers serving several users keep one session per user.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    catalog: Arc<AssessmentCatalog>,
    answers: AnswerStore,
    tags: ProgramTags,
    scores: ProgramScoreTable,
}

impl AssessmentSession {
    pub fn new(catalog: Arc<AssessmentCatalog>) -> Self {
        Self {
            catalog,
            answers: AnswerStore::new(),
            tags: ProgramTags::new(),
            scores: ProgramScoreTable::new(),
        }
    }

    pub fn catalog(&self) -> &AssessmentCatalog {
        &self.catalog
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn scores(&self) -> &ProgramScoreTable {
        &self.scores
    }

    /// Store an answer and score it when it is an in-range Likert value with a program tag.
    ///
    /// The tag comes from the event, or from the catalog question when the event has none.
    /// Revising an answer scores it again without removing the earlier points.
    pub fn record(&mut self, event: AnswerEvent) -> RecordOutcome {
        let AnswerEvent {
            section,
            question_key,
            value,
            program,
        } = event;

        // Remember explicit tags so a restored draft scores the answer the same way.
        match program {
            Some(tag) => {
                self.tags
                    .entry(section)
                    .or_default()
                    .insert(question_key.clone(), tag);
            }
            None => {
                if let Some(tags) = self.tags.get_mut(&section) {
                    tags.remove(&question_key);
                }
            }
        }

        let program = program.or_else(|| self.catalog.program_for(section, &question_key));
        let points = program.and_then(|program| {
            value
                .likert()
                .map(|score| self.scores.accumulate_likert(program, score))
        });

        let key = QualifiedKey::new(section, question_key);
        debug!(%key, kind = value.type_name(), ?points, "answer recorded");
        self.answers.set(section, key.question.clone(), value);

        RecordOutcome { key, points }
    }

    pub fn check_section(&self, section: SectionId) -> SectionCheck {
        let required = self.catalog.required_questions(section);
        validation::validate(
            section,
            self.catalog.rule_for(section),
            &required,
            self.answers.section(section),
        )
    }

    pub fn check_all(&self) -> Vec<SectionCheck> {
        validation::validate_all(&self.catalog, &self.answers)
    }

    pub fn progress(&self) -> AssessmentProgress {
        let sections = self
            .catalog
            .sections()
            .iter()
            .map(|definition| {
                let rule = definition.rule();
                let slice = self.answers.section(definition.id);
                let answered = definition
                    .questions
                    .iter()
                    .filter(|question| {
                        satisfies(rule, slice.and_then(|answers| answers.get(&question.key)))
                    })
                    .count();

                SectionProgress {
                    section: definition.id,
                    section_label: definition.id.label(),
                    answered,
                    total: definition.questions.len(),
                    complete: self.check_section(definition.id).complete,
                }
            })
            .collect();

        AssessmentProgress::from_sections(sections)
    }

    /// Clear answers and scores together.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.tags.clear();
        self.scores.reset();
    }

    /// Answers plus the explicit program tags needed to rebuild the same scores.
    pub fn draft(&self) -> AnswerDraft {
        let mut program_tags = self.tags.clone();
        program_tags.retain(|_, tags| !tags.is_empty());
        AnswerDraft {
            answers: self.answers.snapshot(),
            program_tags,
        }
    }

    /// Replace answers with a saved draft, scoring each stored answer once.
    ///
    /// A saved tag wins over the catalog tag, matching how the answer was first recorded.
    pub fn restore(&mut self, draft: impl Into<AnswerDraft>) {
        let AnswerDraft {
            answers,
            program_tags,
        } = draft.into();
        self.answers = AnswerStore::from_snapshot(answers);
        self.tags = program_tags;
        self.scores.reset();

        for (key, value) in self.answers.iter() {
            let program = self
                .tags
                .get(&key.section)
                .and_then(|tags| tags.get(&key.question))
                .copied()
                .or_else(|| self.catalog.program_for(key.section, &key.question));
            if let (Some(program), Some(score)) = (program, value.likert()) {
                self.scores.accumulate_likert(program, score);
            }
        }
    }

    pub fn recommendation(&self) -> RecommendationResult {
        resolve(&self.scores)
    }

    /// Validate every section and, when all are complete, build the submission payload.
    pub fn submit(&self) -> Result<SubmissionPayload, IncompleteAssessment> {
        let checks = self.check_all();
        if let Some(check) = first_incomplete(&checks) {
            return Err(IncompleteAssessment(*check));
        }

        let recommendation = self.recommendation();
        Ok(SubmissionPayload {
            answers: self.answers.snapshot(),
            scores: self.scores,
            recommendation: RecommendationView::from(&recommendation),
            submitted_at: Utc::now(),
        })
    }
}
