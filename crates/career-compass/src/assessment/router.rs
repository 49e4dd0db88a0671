use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{AnswerEvent, AssessmentId, SectionId};
use super::repository::{AnswerSnapshotStore, SubmissionSink};
use super::service::{AssessmentService, AssessmentServiceError};
use super::views::{SectionCheckView, SubmissionPayload};

/// Router builder exposing HTTP endpoints for answering, checking, and submitting.
pub fn assessment_router<S, P>(service: Arc<AssessmentService<S, P>>) -> Router
where
    S: AnswerSnapshotStore + 'static,
    P: SubmissionSink + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(start_handler::<S, P>))
        .route(
            "/api/v1/assessments/:assessment_id/answers",
            put(record_handler::<S, P>).delete(reset_handler::<S, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/resume",
            post(resume_handler::<S, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/progress",
            get(progress_handler::<S, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/sections/:section",
            get(section_handler::<S, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/submit",
            post(submit_handler::<S, P>),
        )
        .with_state(service)
}

#[derive(Debug, Serialize)]
struct StartedView {
    assessment_id: AssessmentId,
    sections: usize,
    questions: usize,
}

#[derive(Debug, Serialize)]
struct SubmissionView {
    assessment_id: AssessmentId,
    #[serde(flatten)]
    submission: SubmissionPayload,
}

pub(crate) async fn start_handler<S, P>(
    State(service): State<Arc<AssessmentService<S, P>>>,
) -> Response
where
    S: AnswerSnapshotStore + 'static,
    P: SubmissionSink + 'static,
{
    let assessment_id = service.start();
    let view = StartedView {
        assessment_id,
        sections: service.catalog().sections().len(),
        questions: service.catalog().question_count(),
    };
    (StatusCode::CREATED, Json(view)).into_response()
}

pub(crate) async fn record_handler<S, P>(
    State(service): State<Arc<AssessmentService<S, P>>>,
    Path(assessment_id): Path<String>,
    Json(event): Json<AnswerEvent>,
) -> Response
where
    S: AnswerSnapshotStore + 'static,
    P: SubmissionSink + 'static,
{
    match service.record(&AssessmentId(assessment_id), event) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reset_handler<S, P>(
    State(service): State<Arc<AssessmentService<S, P>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    S: AnswerSnapshotStore + 'static,
    P: SubmissionSink + 'static,
{
    match service.reset(&AssessmentId(assessment_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resume_handler<S, P>(
    State(service): State<Arc<AssessmentService<S, P>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    S: AnswerSnapshotStore + 'static,
    P: SubmissionSink + 'static,
{
    match service.resume(&AssessmentId(assessment_id)) {
        Ok(progress) => (StatusCode::OK, Json(progress)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn progress_handler<S, P>(
    State(service): State<Arc<AssessmentService<S, P>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    S: AnswerSnapshotStore + 'static,
    P: SubmissionSink + 'static,
{
    match service.progress(&AssessmentId(assessment_id)) {
        Ok(progress) => (StatusCode::OK, Json(progress)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn section_handler<S, P>(
    State(service): State<Arc<AssessmentService<S, P>>>,
    Path((assessment_id, section)): Path<(String, String)>,
) -> Response
where
    S: AnswerSnapshotStore + 'static,
    P: SubmissionSink + 'static,
{
    let Some(section) = SectionId::parse(&section) else {
        let payload = json!({ "error": format!("unknown section '{section}'") });
        return (StatusCode::NOT_FOUND, Json(payload)).into_response();
    };

    match service.check_section(&AssessmentId(assessment_id), section) {
        Ok(check) => (StatusCode::OK, Json(SectionCheckView::from(check))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<S, P>(
    State(service): State<Arc<AssessmentService<S, P>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    S: AnswerSnapshotStore + 'static,
    P: SubmissionSink + 'static,
{
    let assessment_id = AssessmentId(assessment_id);
    match service.submit(&assessment_id) {
        Ok(submission) => {
            let view = SubmissionView {
                assessment_id,
                submission,
            };
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: AssessmentServiceError) -> Response {
    match error {
        AssessmentServiceError::NotFound(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        AssessmentServiceError::AlreadySubmitted(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        AssessmentServiceError::Incomplete(incomplete) => {
            let payload = json!({
                "error": incomplete.to_string(),
                "section_check": SectionCheckView::from(incomplete.0),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
