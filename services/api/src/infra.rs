use career_compass::assessment::{
    AnswerDraft, AnswerSnapshotStore, SinkError, SnapshotError, SubmissionPayload, SubmissionSink,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Draft storage that lives as long as the process.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAnswerSnapshots {
    drafts: Arc<Mutex<HashMap<String, AnswerDraft>>>,
}

impl AnswerSnapshotStore for InMemoryAnswerSnapshots {
    fn load(&self, key: &str) -> Result<Option<AnswerDraft>, SnapshotError> {
        Ok(lock(&self.drafts).get(key).cloned())
    }

    fn save(&self, key: &str, draft: &AnswerDraft) -> Result<(), SnapshotError> {
        lock(&self.drafts).insert(key.to_string(), draft.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SnapshotError> {
        lock(&self.drafts).remove(key);
        Ok(())
    }
}

/// Keeps submitted payloads and logs each hand-off.
#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionSink {
    submissions: Arc<Mutex<Vec<SubmissionPayload>>>,
}

impl SubmissionSink for InMemorySubmissionSink {
    fn publish(&self, submission: &SubmissionPayload) -> Result<(), SinkError> {
        info!(
            program = submission.recommendation.program.code(),
            answers = submission.answers.len(),
            "submission handed off for evaluation"
        );
        lock(&self.submissions).push(submission.clone());
        Ok(())
    }
}

impl InMemorySubmissionSink {
    pub(crate) fn submissions(&self) -> Vec<SubmissionPayload> {
        lock(&self.submissions).clone()
    }
}
