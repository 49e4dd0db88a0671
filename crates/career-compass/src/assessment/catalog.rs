use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{ProgramId, SectionId, SectionRule};

/// Errors raised while loading a questionnaire definition.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("section {0} is declared more than once")]
    DuplicateSection(SectionId),
    #[error("question '{question}' appears twice in section {section}")]
    DuplicateQuestion { section: SectionId, question: String },
    #[error("catalog declares no sections")]
    Empty,
}

/// One question shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub key: String,
    #[serde(default)]
    pub prompt: String,
    /// Program that Likert answers to this question score toward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<ProgramId>,
    /// Selectable labels for free-choice questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl QuestionDefinition {
    fn likert(key: &str, program: ProgramId) -> Self {
        Self {
            key: key.to_string(),
            prompt: key.to_string(),
            program: Some(program),
            options: Vec::new(),
        }
    }

    fn checkbox(key: &str) -> Self {
        Self {
            key: key.to_string(),
            prompt: key.to_string(),
            program: None,
            options: Vec::new(),
        }
    }

    fn choice(key: &str, prompt: &str, options: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            prompt: prompt.to_string(),
            program: None,
            options: options.iter().map(|option| option.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub id: SectionId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule: Option<SectionRule>,
    pub questions: Vec<QuestionDefinition>,
}

impl SectionDefinition {
    pub fn new(id: SectionId, questions: Vec<QuestionDefinition>) -> Self {
        Self {
            id,
            title: id.label().to_string(),
            rule: None,
            questions,
        }
    }

    pub fn with_rule(mut self, rule: SectionRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Completion rule, falling back to the section's default.
    pub fn rule(&self) -> SectionRule {
        self.rule.unwrap_or_else(|| self.id.default_rule())
    }

    pub fn question_keys(&self) -> Vec<&str> {
        self.questions.iter().map(|question| question.key.as_str()).collect()
    }

    pub fn question(&self, key: &str) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|question| question.key == key)
    }
}

/// Ordered set of sections making up one assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentCatalog {
    sections: Vec<SectionDefinition>,
}

impl AssessmentCatalog {
    pub fn new(sections: Vec<SectionDefinition>) -> Result<Self, CatalogError> {
        if sections.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen_sections = BTreeSet::new();
        for section in &sections {
            if !seen_sections.insert(section.id) {
                return Err(CatalogError::DuplicateSection(section.id));
            }

            let mut seen_questions = BTreeSet::new();
            for question in &section.questions {
                if !seen_questions.insert(question.key.as_str()) {
                    return Err(CatalogError::DuplicateQuestion {
                        section: section.id,
                        question: question.key.clone(),
                    });
                }
            }
        }

        Ok(Self { sections })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_reader(reader)?;
        Self::new(raw.sections)
    }

    pub fn sections(&self) -> &[SectionDefinition] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> Option<&SectionDefinition> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn required_questions(&self, id: SectionId) -> Vec<&str> {
        self.section(id)
            .map(SectionDefinition::question_keys)
            .unwrap_or_default()
    }

    pub fn rule_for(&self, id: SectionId) -> SectionRule {
        self.section(id)
            .map(SectionDefinition::rule)
            .unwrap_or_else(|| id.default_rule())
    }

    pub fn program_for(&self, section: SectionId, question_key: &str) -> Option<ProgramId> {
        self.section(section)
            .and_then(|definition| definition.question(question_key))
            .and_then(|question| question.program)
    }

    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|section| section.questions.len()).sum()
    }

    /// Built-in questionnaire used when no catalog file is configured.
    pub fn standard() -> Self {
        use ProgramId::*;

        let foundational = SectionDefinition::new(
            SectionId::Foundational,
            vec![
                QuestionDefinition::likert("I enjoy solving logic puzzles and algorithms", ComputerScience),
                QuestionDefinition::likert("I am comfortable setting up computers and networks", InformationTechnology),
                QuestionDefinition::likert("I like understanding how organizations use information", InformationSystems),
                QuestionDefinition::likert("I find statistics and probability interesting", DataScience),
                QuestionDefinition::likert("I enjoy drawing, design, or visual storytelling", MultimediaArts),
            ],
        );

        let academic = SectionDefinition::new(
            SectionId::Academic,
            vec![
                QuestionDefinition::likert("I do well in mathematics courses", ComputerScience),
                QuestionDefinition::likert("I learn new software and tools quickly", InformationTechnology),
                QuestionDefinition::likert("I do well in business and management subjects", InformationSystems),
                QuestionDefinition::likert("I enjoy analyzing data in science experiments", DataScience),
                QuestionDefinition::likert("I do well in art and communication subjects", MultimediaArts),
            ],
        );

        let technical = SectionDefinition::new(
            SectionId::Technical,
            [
                "Programming",
                "Networking",
                "Database management",
                "Spreadsheet analysis",
                "Graphic design",
                "Video editing",
                "Web development",
            ]
            .into_iter()
            .map(QuestionDefinition::checkbox)
            .collect(),
        );

        let career = SectionDefinition::new(
            SectionId::Career,
            vec![
                QuestionDefinition::likert("I want to build software products", ComputerScience),
                QuestionDefinition::likert("I want to keep systems and infrastructure running", InformationTechnology),
                QuestionDefinition::likert("I want to bridge business needs and technology", InformationSystems),
                QuestionDefinition::likert("I want to find insights in large datasets", DataScience),
                QuestionDefinition::likert("I want to create games, animation, or digital media", MultimediaArts),
            ],
        );

        let learning_style = SectionDefinition::new(
            SectionId::LearningStyle,
            vec![
                QuestionDefinition::choice(
                    "preferred_format",
                    "How do you prefer to learn new material?",
                    &["Visual", "Auditory", "Reading/Writing", "Hands-on"],
                ),
                QuestionDefinition::choice(
                    "preferred_setting",
                    "Which setting helps you focus best?",
                    &["Independent study", "Small group", "Lecture", "Project team"],
                ),
            ],
        );

        Self {
            sections: vec![foundational, academic, technical, career, learning_style],
        }
    }
}

impl Default for AssessmentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Deserialize)]
struct RawCatalog {
    sections: Vec<SectionDefinition>,
}
