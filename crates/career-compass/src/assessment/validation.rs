use serde::{Serialize, Serializer};

use super::answers::{AnswerStore, SectionAnswers};
use super::catalog::AssessmentCatalog;
use super::domain::{AnswerValue, SectionId, SectionRule};

/// Completion verdict for one section plus the index of the first gap, for focus handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionCheck {
    pub section: SectionId,
    pub complete: bool,
    #[serde(serialize_with = "serialize_gap_index")]
    pub first_unanswered_index: Option<usize>,
}

impl SectionCheck {
    pub fn summary(&self) -> String {
        match (self.complete, self.first_unanswered_index) {
            (true, _) => format!("{} complete", self.section.label()),
            (false, Some(index)) => format!(
                "{} incomplete: question {} needs an answer",
                self.section.label(),
                index + 1
            ),
            (false, None) => format!("{} incomplete", self.section.label()),
        }
    }
}

// Clients expect -1 when there is no gap.
fn serialize_gap_index<S: Serializer>(index: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
    match index {
        Some(index) => serializer.serialize_i64(*index as i64),
        None => serializer.serialize_i64(-1),
    }
}

/// Whether `value` counts toward completion under `rule`.
pub fn satisfies(rule: SectionRule, value: Option<&AnswerValue>) -> bool {
    match (rule, value) {
        (SectionRule::Likert, Some(value)) => value.likert().is_some(),
        (SectionRule::MultiSelect, Some(value)) => value.as_bool() == Some(true),
        (SectionRule::FreeChoice, Some(value)) => {
            value.as_choice().is_some_and(|choice| !choice.is_empty())
        }
        (_, None) => false,
    }
}

/// Check a section's answers against its completion rule.
///
/// Never fails: missing or malformed answers count as unanswered.
pub fn validate<S: AsRef<str>>(
    section: SectionId,
    rule: SectionRule,
    required: &[S],
    answers: Option<&SectionAnswers>,
) -> SectionCheck {
    let lookup = |key: &S| answers.and_then(|answers| answers.get(key.as_ref()));

    let (complete, first_unanswered_index) = match rule {
        SectionRule::Likert | SectionRule::FreeChoice => {
            let gap = required
                .iter()
                .position(|key| !satisfies(rule, lookup(key)));
            (gap.is_none(), gap)
        }
        SectionRule::MultiSelect => {
            let any_selected = required.iter().any(|key| satisfies(rule, lookup(key)));
            let gap = if any_selected || required.is_empty() {
                None
            } else {
                Some(0)
            };
            (any_selected, gap)
        }
    };

    SectionCheck {
        section,
        complete,
        first_unanswered_index,
    }
}

/// Check every section of `catalog` in declared order.
pub fn validate_all(catalog: &AssessmentCatalog, answers: &AnswerStore) -> Vec<SectionCheck> {
    catalog
        .sections()
        .iter()
        .map(|definition| {
            let required = definition.question_keys();
            validate(
                definition.id,
                definition.rule(),
                &required,
                answers.section(definition.id),
            )
        })
        .collect()
}

pub fn first_incomplete(checks: &[SectionCheck]) -> Option<&SectionCheck> {
    checks.iter().find(|check| !check.complete)
}
