use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{AnswerValue, ProgramId, QualifiedKey, SectionId};

/// Answers for a single section, keyed by question.
pub type SectionAnswers = BTreeMap<String, AnswerValue>;

/// Nested `section -> question -> value` map. This is the shape persisted and exported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(pub BTreeMap<SectionId, SectionAnswers>);

impl AnswerMap {
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Program tags that arrived with answer events, keyed like the answers they score.
pub type ProgramTags = BTreeMap<SectionId, BTreeMap<String, ProgramId>>;

/// Saved form of an in-progress assessment.
///
/// `answers` keeps the nested map shape; `program_tags` only lists answers whose event
/// carried an explicit program, so a plain answer map loads as a draft with no tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDraft {
    pub answers: AnswerMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub program_tags: ProgramTags,
}

impl AnswerDraft {
    pub fn tag_for(&self, section: SectionId, question_key: &str) -> Option<ProgramId> {
        self.program_tags
            .get(&section)
            .and_then(|tags| tags.get(question_key))
            .copied()
    }
}

impl From<AnswerMap> for AnswerDraft {
    fn from(answers: AnswerMap) -> Self {
        Self {
            answers,
            program_tags: ProgramTags::new(),
        }
    }
}

/// In-memory holder of the current answer for every question asked so far.
///
/// This is a pass-through map: value legality is the caller's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    answers: AnswerMap,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: AnswerMap) -> Self {
        Self { answers: snapshot }
    }

    /// Insert or overwrite the answer at `section.question_key`.
    pub fn set(
        &mut self,
        section: SectionId,
        question_key: impl Into<String>,
        value: impl Into<AnswerValue>,
    ) {
        self.answers
            .0
            .entry(section)
            .or_default()
            .insert(question_key.into(), value.into());
    }

    pub fn get(&self, section: SectionId, question_key: &str) -> Option<&AnswerValue> {
        self.answers
            .0
            .get(&section)
            .and_then(|answers| answers.get(question_key))
    }

    pub fn section(&self, section: SectionId) -> Option<&SectionAnswers> {
        self.answers.0.get(&section)
    }

    pub fn clear(&mut self) {
        self.answers.0.clear();
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QualifiedKey, &AnswerValue)> + '_ {
        self.answers.0.iter().flat_map(|(section, answers)| {
            answers
                .iter()
                .map(move |(question, value)| (QualifiedKey::new(*section, question), value))
        })
    }

    pub fn snapshot(&self) -> AnswerMap {
        self.answers.clone()
    }
}
