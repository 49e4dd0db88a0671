use super::answers::AnswerDraft;
use super::views::SubmissionPayload;

/// Persistence port for in-progress answers, keyed by an opaque storage key.
pub trait AnswerSnapshotStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<AnswerDraft>, SnapshotError>;
    fn save(&self, key: &str, draft: &AnswerDraft) -> Result<(), SnapshotError>;
    fn remove(&self, key: &str) -> Result<(), SnapshotError>;
}

/// Error enumeration for snapshot storage failures.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot storage unavailable: {0}")]
    Unavailable(String),
    #[error("snapshot for '{key}' is corrupt: {detail}")]
    Corrupt { key: String, detail: String },
}

/// Outbound hook receiving submitted assessments (evaluation backend, exporters).
pub trait SubmissionSink: Send + Sync {
    fn publish(&self, submission: &SubmissionPayload) -> Result<(), SinkError>;
}

/// Submission dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("submission transport unavailable: {0}")]
    Transport(String),
}
