//! Career assessment core: answer capture, per-program scoring, section validation,
//! and program recommendation, plus the session service and HTTP router built on them.

pub mod answers;
pub mod catalog;
pub mod domain;
pub mod recommendation;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use answers::{AnswerDraft, AnswerMap, AnswerStore, ProgramTags, SectionAnswers};
pub use catalog::{AssessmentCatalog, CatalogError, QuestionDefinition, SectionDefinition};
pub use domain::{
    AnswerEvent, AnswerValue, AssessmentId, LikertScore, ProgramId, QualifiedKey, SectionId,
    SectionRule,
};
pub use recommendation::{resolve, RecommendationResult};
pub use repository::{AnswerSnapshotStore, SinkError, SnapshotError, SubmissionSink};
pub use router::assessment_router;
pub use scoring::ProgramScoreTable;
pub use service::{AssessmentService, AssessmentServiceError};
pub use session::{AssessmentSession, IncompleteAssessment, RecordOutcome};
pub use validation::{first_incomplete, validate, validate_all, SectionCheck};
pub use views::{
    score_breakdown, AssessmentProgress, RecommendationView, ScoreBreakdownEntry,
    SectionCheckView, SectionProgress, SubmissionPayload,
};
