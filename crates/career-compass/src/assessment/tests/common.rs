use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::assessment::answers::AnswerDraft;
use crate::assessment::assessment_router;
use crate::assessment::catalog::AssessmentCatalog;
use crate::assessment::domain::{AnswerEvent, AnswerValue, SectionRule};
use crate::assessment::repository::{
    AnswerSnapshotStore, SinkError, SnapshotError, SubmissionSink,
};
use crate::assessment::service::AssessmentService;
use crate::assessment::session::AssessmentSession;
use crate::assessment::views::SubmissionPayload;

pub(super) fn catalog() -> Arc<AssessmentCatalog> {
    Arc::new(AssessmentCatalog::standard())
}

pub(super) fn session() -> AssessmentSession {
    AssessmentSession::new(catalog())
}

/// Answer every question in the standard catalog so that all sections are complete.
///
/// Likert answers use `likert_for(index)` within each section; only the first checkbox is ticked.
pub(super) fn answer_everything(
    session: &mut AssessmentSession,
    likert_for: impl Fn(usize) -> i64,
) {
    for event in complete_events(likert_for) {
        session.record(event);
    }
}

pub(super) fn complete_events(likert_for: impl Fn(usize) -> i64) -> Vec<AnswerEvent> {
    let catalog = catalog();
    let mut events = Vec::new();
    for section in catalog.sections() {
        for (index, question) in section.questions.iter().enumerate() {
            let value = match section.rule() {
                SectionRule::Likert => AnswerValue::Likert(likert_for(index)),
                SectionRule::MultiSelect => AnswerValue::Bool(index == 0),
                SectionRule::FreeChoice => AnswerValue::Choice(
                    question.options.first().cloned().unwrap_or_else(|| "Other".to_string()),
                ),
            };
            events.push(AnswerEvent::new(section.id, question.key.clone(), value));
        }
    }
    events
}

#[derive(Default, Clone)]
pub(super) struct MemorySnapshots {
    pub(super) drafts: Arc<Mutex<HashMap<String, AnswerDraft>>>,
}

impl MemorySnapshots {
    pub(super) fn draft(&self, key: &str) -> Option<AnswerDraft> {
        self.drafts.lock().expect("snapshot mutex poisoned").get(key).cloned()
    }
}

impl AnswerSnapshotStore for MemorySnapshots {
    fn load(&self, key: &str) -> Result<Option<AnswerDraft>, SnapshotError> {
        Ok(self.draft(key))
    }

    fn save(&self, key: &str, draft: &AnswerDraft) -> Result<(), SnapshotError> {
        self.drafts
            .lock()
            .expect("snapshot mutex poisoned")
            .insert(key.to_string(), draft.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SnapshotError> {
        self.drafts
            .lock()
            .expect("snapshot mutex poisoned")
            .remove(key);
        Ok(())
    }
}

pub(super) struct OfflineSnapshots;

impl AnswerSnapshotStore for OfflineSnapshots {
    fn load(&self, _key: &str) -> Result<Option<AnswerDraft>, SnapshotError> {
        Err(SnapshotError::Unavailable("storage offline".to_string()))
    }

    fn save(&self, _key: &str, _draft: &AnswerDraft) -> Result<(), SnapshotError> {
        Err(SnapshotError::Unavailable("storage offline".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), SnapshotError> {
        Err(SnapshotError::Unavailable("storage offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySink {
    published: Arc<Mutex<Vec<SubmissionPayload>>>,
}

impl MemorySink {
    pub(super) fn published(&self) -> Vec<SubmissionPayload> {
        self.published.lock().expect("sink mutex poisoned").clone()
    }
}

impl SubmissionSink for MemorySink {
    fn publish(&self, submission: &SubmissionPayload) -> Result<(), SinkError> {
        self.published
            .lock()
            .expect("sink mutex poisoned")
            .push(submission.clone());
        Ok(())
    }
}

pub(super) struct FailingSink;

impl SubmissionSink for FailingSink {
    fn publish(&self, _submission: &SubmissionPayload) -> Result<(), SinkError> {
        Err(SinkError::Transport("evaluation backend unreachable".to_string()))
    }
}

pub(super) fn build_service() -> (
    AssessmentService<MemorySnapshots, MemorySink>,
    Arc<MemorySnapshots>,
    Arc<MemorySink>,
) {
    let snapshots = Arc::new(MemorySnapshots::default());
    let sink = Arc::new(MemorySink::default());
    let service = AssessmentService::new(catalog(), snapshots.clone(), sink.clone());
    (service, snapshots, sink)
}

pub(super) fn router_with_service(
    service: AssessmentService<MemorySnapshots, MemorySink>,
) -> axum::Router {
    assessment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
