use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use super::catalog::AssessmentCatalog;
use super::domain::{AnswerEvent, AssessmentId, SectionId};
use super::repository::{AnswerSnapshotStore, SinkError, SnapshotError, SubmissionSink};
use super::scoring::ProgramScoreTable;
use super::session::{AssessmentSession, IncompleteAssessment, RecordOutcome};
use super::validation::SectionCheck;
use super::views::{AssessmentProgress, SubmissionPayload};

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asmt-{id:06}"))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-assessment state. A submitted assessment keeps only a marker so late writes are refused.
enum SessionSlot {
    Open(AssessmentSession),
    Submitted,
}

impl SessionSlot {
    fn open(
        &mut self,
        id: &AssessmentId,
    ) -> Result<&mut AssessmentSession, AssessmentServiceError> {
        match self {
            SessionSlot::Open(session) => Ok(session),
            SessionSlot::Submitted => Err(AssessmentServiceError::AlreadySubmitted(id.clone())),
        }
    }
}

/// Service owning one scoring session per assessment and wiring it to the storage and
/// submission ports.
///
/// Each session sits behind its own lock, so concurrent requests for the same assessment
/// are applied one at a time and no two assessments share a score table. Answers and the
/// saved draft are dropped once the assessment is submitted.
pub struct AssessmentService<S, P> {
    catalog: Arc<AssessmentCatalog>,
    sessions: Mutex<HashMap<AssessmentId, Arc<Mutex<SessionSlot>>>>,
    snapshots: Arc<S>,
    sink: Arc<P>,
    autosave: bool,
}

impl<S, P> AssessmentService<S, P>
where
    S: AnswerSnapshotStore + 'static,
    P: SubmissionSink + 'static,
{
    pub fn new(catalog: Arc<AssessmentCatalog>, snapshots: Arc<S>, sink: Arc<P>) -> Self {
        Self {
            catalog,
            sessions: Mutex::new(HashMap::new()),
            snapshots,
            sink,
            autosave: true,
        }
    }

    /// Toggle saving the draft after every recorded answer.
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    pub fn catalog(&self) -> &AssessmentCatalog {
        &self.catalog
    }

    /// Open a fresh assessment with empty answers and zeroed scores.
    pub fn start(&self) -> AssessmentId {
        let id = next_assessment_id();
        let slot = SessionSlot::Open(AssessmentSession::new(self.catalog.clone()));
        lock(&self.sessions).insert(id.clone(), Arc::new(Mutex::new(slot)));
        info!(assessment_id = %id, "assessment started");
        id
    }

    pub fn record(
        &self,
        id: &AssessmentId,
        event: AnswerEvent,
    ) -> Result<RecordOutcome, AssessmentServiceError> {
        let slot = self.slot(id)?;
        let mut slot = lock(&slot);
        let session = slot.open(id)?;

        let outcome = session.record(event);
        if self.autosave {
            self.snapshots.save(&id.0, &session.draft())?;
        }
        Ok(outcome)
    }

    pub fn check_section(
        &self,
        id: &AssessmentId,
        section: SectionId,
    ) -> Result<SectionCheck, AssessmentServiceError> {
        self.read(id, |session| session.check_section(section))
    }

    pub fn progress(&self, id: &AssessmentId) -> Result<AssessmentProgress, AssessmentServiceError> {
        self.read(id, AssessmentSession::progress)
    }

    pub fn scores(&self, id: &AssessmentId) -> Result<ProgramScoreTable, AssessmentServiceError> {
        self.read(id, |session| *session.scores())
    }

    /// Clear answers and scores and drop any saved draft.
    pub fn reset(&self, id: &AssessmentId) -> Result<(), AssessmentServiceError> {
        let slot = self.slot(id)?;
        let mut slot = lock(&slot);
        slot.open(id)?.reset();
        self.snapshots.remove(&id.0)?;
        info!(assessment_id = %id, "assessment reset");
        Ok(())
    }

    /// Rebuild a session from its saved draft, creating the session if it is not loaded.
    pub fn resume(&self, id: &AssessmentId) -> Result<AssessmentProgress, AssessmentServiceError> {
        if let Ok(slot) = self.slot(id) {
            if matches!(*lock(&slot), SessionSlot::Submitted) {
                return Err(AssessmentServiceError::AlreadySubmitted(id.clone()));
            }
        }

        let draft = self
            .snapshots
            .load(&id.0)?
            .ok_or_else(|| AssessmentServiceError::NotFound(id.clone()))?;

        let slot = {
            let mut sessions = lock(&self.sessions);
            sessions
                .entry(id.clone())
                .or_insert_with(|| {
                    Arc::new(Mutex::new(SessionSlot::Open(AssessmentSession::new(
                        self.catalog.clone(),
                    ))))
                })
                .clone()
        };

        let mut slot = lock(&slot);
        let session = slot.open(id)?;
        let restored = draft.answers.len();
        session.restore(draft);
        info!(assessment_id = %id, answers = restored, "assessment resumed from draft");
        Ok(session.progress())
    }

    /// Validate every section, resolve the recommendation, and publish the payload.
    ///
    /// After a successful publish the session is replaced by a submitted marker and the
    /// draft is removed from storage.
    pub fn submit(&self, id: &AssessmentId) -> Result<SubmissionPayload, AssessmentServiceError> {
        let slot = self.slot(id)?;
        let mut slot = lock(&slot);

        let payload = match slot.open(id)?.submit() {
            Ok(payload) => payload,
            Err(incomplete) => {
                warn!(assessment_id = %id, section = %incomplete.0.section, "submission blocked");
                return Err(incomplete.into());
            }
        };

        self.sink.publish(&payload)?;
        *slot = SessionSlot::Submitted;

        // The payload is already published, so a stale draft is logged rather than failing the submit.
        if let Err(error) = self.snapshots.remove(&id.0) {
            warn!(assessment_id = %id, %error, "failed to remove draft after submit");
        }

        info!(
            assessment_id = %id,
            program = payload.recommendation.program.code(),
            has_signal = payload.recommendation.has_signal,
            "assessment submitted"
        );
        Ok(payload)
    }

    /// Whether the assessment has been submitted.
    pub fn is_submitted(&self, id: &AssessmentId) -> Result<bool, AssessmentServiceError> {
        let slot = self.slot(id)?;
        let submitted = matches!(*lock(&slot), SessionSlot::Submitted);
        Ok(submitted)
    }

    fn slot(&self, id: &AssessmentId) -> Result<Arc<Mutex<SessionSlot>>, AssessmentServiceError> {
        lock(&self.sessions)
            .get(id)
            .cloned()
            .ok_or_else(|| AssessmentServiceError::NotFound(id.clone()))
    }

    fn read<T>(
        &self,
        id: &AssessmentId,
        f: impl FnOnce(&AssessmentSession) -> T,
    ) -> Result<T, AssessmentServiceError> {
        let slot = self.slot(id)?;
        let mut slot = lock(&slot);
        let session = slot.open(id)?;
        Ok(f(&*session))
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("assessment {0} not found")]
    NotFound(AssessmentId),
    #[error("assessment {0} has already been submitted")]
    AlreadySubmitted(AssessmentId),
    #[error(transparent)]
    Incomplete(#[from] IncompleteAssessment),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}
