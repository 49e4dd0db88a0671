use std::fmt;

use serde::{Deserialize, Serialize};

/// Named group of related questions within one assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Foundational,
    Academic,
    Technical,
    Career,
    LearningStyle,
}

impl SectionId {
    pub const ALL: [SectionId; 5] = [
        SectionId::Foundational,
        SectionId::Academic,
        SectionId::Technical,
        SectionId::Career,
        SectionId::LearningStyle,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            SectionId::Foundational => "Foundational Knowledge",
            SectionId::Academic => "Academic Aptitude",
            SectionId::Technical => "Technical Skills",
            SectionId::Career => "Career Interest",
            SectionId::LearningStyle => "Learning Style",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            SectionId::Foundational => "foundational",
            SectionId::Academic => "academic",
            SectionId::Technical => "technical",
            SectionId::Career => "career",
            SectionId::LearningStyle => "learning_style",
        }
    }

    /// Completion rule applied when a catalog does not override it.
    pub const fn default_rule(self) -> SectionRule {
        match self {
            SectionId::Foundational | SectionId::Academic | SectionId::Career => {
                SectionRule::Likert
            }
            SectionId::Technical => SectionRule::MultiSelect,
            SectionId::LearningStyle => SectionRule::FreeChoice,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|section| section.slug() == normalized)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Section-specific rule deciding when a section counts as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionRule {
    /// Every question needs an agreement value between 1 and 5.
    Likert,
    /// At least one option must be selected.
    MultiSelect,
    /// Every question needs a non-empty option label.
    FreeChoice,
}

/// Recommendable programs, declared in canonical tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramId {
    ComputerScience,
    InformationTechnology,
    InformationSystems,
    DataScience,
    MultimediaArts,
}

impl ProgramId {
    pub const COUNT: usize = 5;

    pub const ALL: [ProgramId; Self::COUNT] = [
        ProgramId::ComputerScience,
        ProgramId::InformationTechnology,
        ProgramId::InformationSystems,
        ProgramId::DataScience,
        ProgramId::MultimediaArts,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ProgramId::ComputerScience => "BS Computer Science",
            ProgramId::InformationTechnology => "BS Information Technology",
            ProgramId::InformationSystems => "BS Information Systems",
            ProgramId::DataScience => "BS Data Science",
            ProgramId::MultimediaArts => "BS Multimedia Arts",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            ProgramId::ComputerScience => "computer_science",
            ProgramId::InformationTechnology => "information_technology",
            ProgramId::InformationSystems => "information_systems",
            ProgramId::DataScience => "data_science",
            ProgramId::MultimediaArts => "multimedia_arts",
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            ProgramId::ComputerScience => "BSCS",
            ProgramId::InformationTechnology => "BSIT",
            ProgramId::InformationSystems => "BSIS",
            ProgramId::DataScience => "BSDS",
            ProgramId::MultimediaArts => "BSMA",
        }
    }

    /// Accepts either the short code (`BSDS`) or the snake_case name (`data_science`).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|program| {
            program.code().eq_ignore_ascii_case(&normalized) || program.slug() == normalized
        })
    }

    pub(crate) const fn position(self) -> usize {
        match self {
            ProgramId::ComputerScience => 0,
            ProgramId::InformationTechnology => 1,
            ProgramId::InformationSystems => 2,
            ProgramId::DataScience => 3,
            ProgramId::MultimediaArts => 4,
        }
    }
}

/// Agreement/interest strength on the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LikertScore(u8);

impl LikertScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Points this answer contributes to its program.
    pub const fn points(self) -> u32 {
        (self.0 as u32 - 1) * 2
    }
}

impl TryFrom<i64> for LikertScore {
    type Error = i64;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&raw) {
            Ok(Self(raw as u8))
        } else {
            Err(raw)
        }
    }
}

/// A recorded answer. The variant is fixed when the answer is recorded.
///
/// Serialized untagged so the wire shape stays a plain JSON bool, integer, or string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    /// Raw scale value; not range checked on the way in.
    Likert(i64),
    Choice(String),
}

impl AnswerValue {
    /// The validated scale value, if this is an in-range Likert answer.
    pub fn likert(&self) -> Option<LikertScore> {
        match self {
            AnswerValue::Likert(raw) => LikertScore::try_from(*raw).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnswerValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            AnswerValue::Choice(value) => Some(value),
            _ => None,
        }
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            AnswerValue::Bool(_) => "bool",
            AnswerValue::Likert(_) => "likert",
            AnswerValue::Choice(_) => "choice",
        }
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        Self::Likert(value)
    }
}

impl From<i32> for AnswerValue {
    fn from(value: i32) -> Self {
        Self::Likert(i64::from(value))
    }
}

impl From<LikertScore> for AnswerValue {
    fn from(value: LikertScore) -> Self {
        Self::Likert(i64::from(value.get()))
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Choice(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Choice(value)
    }
}

/// Unique address of one answer: section plus question key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualifiedKey {
    pub section: SectionId,
    pub question: String,
}

impl QualifiedKey {
    pub fn new(section: SectionId, question: impl Into<String>) -> Self {
        Self {
            section,
            question: question.into(),
        }
    }
}

impl fmt::Display for QualifiedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.question)
    }
}

/// One answer as it arrives from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEvent {
    pub section: SectionId,
    pub question_key: String,
    pub value: AnswerValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<ProgramId>,
}

impl AnswerEvent {
    pub fn new(
        section: SectionId,
        question_key: impl Into<String>,
        value: impl Into<AnswerValue>,
    ) -> Self {
        Self {
            section,
            question_key: question_key.into(),
            value: value.into(),
            program: None,
        }
    }

    pub fn tagged(mut self, program: ProgramId) -> Self {
        self.program = Some(program);
        self
    }
}

/// Identifier wrapper for assessment sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
