//! Integration specifications for the career assessment workflow.
//!
//! Scenarios drive the public session, service, and router facades end to end: answers go in,
//! section checks gate submission, and the recommendation comes out with its score table.

mod common {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use career_compass::assessment::{
        AnswerDraft, AnswerEvent, AnswerSnapshotStore, AssessmentCatalog, AssessmentService,
        SinkError, SnapshotError, SubmissionPayload, SubmissionSink,
    };

    /// Three-program questionnaire with one Likert section, one checklist and one choice.
    pub(super) const SMALL_CATALOG: &str = r#"{
        "sections": [
            {"id": "academic", "title": "Aptitude", "questions": [
                {"key": "Q1", "program": "computer_science"},
                {"key": "Q2", "program": "information_technology"},
                {"key": "Q3", "program": "information_systems"}
            ]},
            {"id": "technical", "title": "Skills", "questions": [
                {"key": "Python"}, {"key": "SQL"}, {"key": "Figma"}
            ]},
            {"id": "learning_style", "title": "Style", "questions": [
                {"key": "format", "options": ["Visual", "Hands-on"]}
            ]}
        ]
    }"#;

    pub(super) fn small_catalog() -> Arc<AssessmentCatalog> {
        Arc::new(AssessmentCatalog::from_reader(Cursor::new(SMALL_CATALOG)).expect("catalog parses"))
    }

    pub(super) fn academic(q1: i64, q2: i64, q3: i64) -> Vec<AnswerEvent> {
        use career_compass::assessment::SectionId::Academic;
        vec![
            AnswerEvent::new(Academic, "Q1", q1),
            AnswerEvent::new(Academic, "Q2", q2),
            AnswerEvent::new(Academic, "Q3", q3),
        ]
    }

    pub(super) fn skills_and_style() -> Vec<AnswerEvent> {
        use career_compass::assessment::SectionId::{LearningStyle, Technical};
        vec![
            AnswerEvent::new(Technical, "Python", false),
            AnswerEvent::new(Technical, "SQL", true),
            AnswerEvent::new(Technical, "Figma", false),
            AnswerEvent::new(LearningStyle, "format", "Hands-on"),
        ]
    }

    #[derive(Default, Clone)]
    pub(super) struct MemorySnapshots {
        drafts: Arc<Mutex<HashMap<String, AnswerDraft>>>,
    }

    impl MemorySnapshots {
        pub(super) fn has_draft(&self, key: &str) -> bool {
            self.drafts.lock().expect("lock").contains_key(key)
        }
    }

    impl AnswerSnapshotStore for MemorySnapshots {
        fn load(&self, key: &str) -> Result<Option<AnswerDraft>, SnapshotError> {
            Ok(self.drafts.lock().expect("lock").get(key).cloned())
        }

        fn save(&self, key: &str, draft: &AnswerDraft) -> Result<(), SnapshotError> {
            self.drafts
                .lock()
                .expect("lock")
                .insert(key.to_string(), draft.clone());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), SnapshotError> {
            self.drafts.lock().expect("lock").remove(key);
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemorySink {
        published: Arc<Mutex<Vec<SubmissionPayload>>>,
    }

    impl MemorySink {
        pub(super) fn published(&self) -> Vec<SubmissionPayload> {
            self.published.lock().expect("lock").clone()
        }
    }

    impl SubmissionSink for MemorySink {
        fn publish(&self, submission: &SubmissionPayload) -> Result<(), SinkError> {
            self.published.lock().expect("lock").push(submission.clone());
            Ok(())
        }
    }

    pub(super) fn build_service() -> (
        AssessmentService<MemorySnapshots, MemorySink>,
        Arc<MemorySnapshots>,
        Arc<MemorySink>,
    ) {
        let snapshots = Arc::new(MemorySnapshots::default());
        let sink = Arc::new(MemorySink::default());
        let service = AssessmentService::new(small_catalog(), snapshots.clone(), sink.clone());
        (service, snapshots, sink)
    }
}

mod session {
    use super::common::*;
    use career_compass::assessment::{AnswerDraft, AssessmentSession, ProgramId, SectionId};

    #[test]
    fn highest_program_wins_after_all_sections_complete() {
        let mut session = AssessmentSession::new(small_catalog());
        for event in academic(2, 5, 4).into_iter().chain(skills_and_style()) {
            session.record(event);
        }

        let payload = session.submit().expect("complete");

        assert_eq!(payload.recommendation.program, ProgramId::InformationTechnology);
        assert_eq!(payload.scores.get(ProgramId::ComputerScience), 2);
        assert_eq!(payload.scores.get(ProgramId::InformationTechnology), 8);
        assert_eq!(payload.scores.get(ProgramId::InformationSystems), 6);
        assert_eq!(payload.scores.get(ProgramId::DataScience), 0);
    }

    #[test]
    fn equal_leaders_resolve_to_earlier_program() {
        let mut session = AssessmentSession::new(small_catalog());
        for event in academic(1, 4, 4).into_iter().chain(skills_and_style()) {
            session.record(event);
        }

        assert_eq!(session.recommendation().program(), ProgramId::InformationTechnology);
    }

    #[test]
    fn partial_likert_section_blocks_at_missing_question() {
        let mut session = AssessmentSession::new(small_catalog());
        for event in academic(3, 3, 3).into_iter().take(2).chain(skills_and_style()) {
            session.record(event);
        }

        let blocked = session.submit().expect_err("Q3 unanswered");

        assert_eq!(blocked.0.section, SectionId::Academic);
        assert_eq!(blocked.0.first_unanswered_index, Some(2));
    }

    #[test]
    fn answer_map_survives_json_round_trip() {
        let mut session = AssessmentSession::new(small_catalog());
        for event in academic(5, 1, 3).into_iter().chain(skills_and_style()) {
            session.record(event);
        }

        let json = serde_json::to_string(&session.draft()).expect("serializes");
        let draft: AnswerDraft = serde_json::from_str(&json).expect("deserializes");
        let mut restored = AssessmentSession::new(small_catalog());
        restored.restore(draft);

        assert_eq!(restored.answers(), session.answers());
        assert_eq!(restored.scores(), session.scores());
        assert!(restored.progress().is_complete());
    }
}

mod service {
    use super::common::*;
    use career_compass::assessment::{AssessmentServiceError, ProgramId};

    #[test]
    fn draft_resumes_into_fresh_service() {
        let (service, snapshots, sink) = build_service();
        let id = service.start();
        for event in academic(4, 2, 2) {
            service.record(&id, event).expect("recorded");
        }

        let restarted = career_compass::assessment::AssessmentService::new(
            small_catalog(),
            snapshots.clone(),
            sink.clone(),
        );
        let progress = restarted.resume(&id).expect("draft found");
        assert_eq!(progress.completed_sections, 1);

        match restarted.submit(&id) {
            Err(AssessmentServiceError::Incomplete(blocked)) => {
                assert_eq!(blocked.0.first_unanswered_index, Some(0));
            }
            other => panic!("expected incomplete submission, got {other:?}"),
        }

        for event in skills_and_style() {
            restarted.record(&id, event).expect("recorded");
        }
        let payload = restarted.submit(&id).expect("submitted");

        assert_eq!(payload.recommendation.program, ProgramId::ComputerScience);
        assert_eq!(sink.published().len(), 1);
        assert!(!snapshots.has_draft(&id.0));
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use career_compass::assessment::assessment_router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("route executes");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn assessment_flows_from_start_to_submission() {
        let (service, _, sink) = build_service();
        let router = assessment_router(Arc::new(service));

        let (status, started) = send(&router, empty_request("POST", "/api/v1/assessments")).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = started["assessment_id"].as_str().expect("id").to_string();
        let base = format!("/api/v1/assessments/{id}");

        for event in academic(3, 3, 5).into_iter().chain(skills_and_style()) {
            let body = serde_json::to_value(&event).expect("event json");
            let (status, _) = send(&router, json_request("PUT", &format!("{base}/answers"), body)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, check) =
            send(&router, empty_request("GET", &format!("{base}/sections/technical"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(check["complete"], json!(true));
        assert_eq!(check["first_unanswered_index"], json!(-1));

        let (status, submitted) = send(&router, empty_request("POST", &format!("{base}/submit"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(submitted["recommendation"]["program"], json!("information_systems"));
        assert_eq!(submitted["scores"]["information_systems"], json!(8));
        assert_eq!(submitted["answers"]["learning_style"]["format"], json!("Hands-on"));
        assert_eq!(sink.published().len(), 1);
    }

    #[tokio::test]
    async fn explicit_program_tag_in_request_is_honored() {
        let (service, _, _) = build_service();
        let service = Arc::new(service);
        let id = service.start();
        let router = assessment_router(service.clone());

        let (status, outcome) = send(
            &router,
            json_request(
                "PUT",
                &format!("/api/v1/assessments/{}/answers", id.0),
                json!({
                    "section": "academic",
                    "question_key": "Q1",
                    "value": 4,
                    "program": "data_science"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["points"], json!(6));
        let scores = service.scores(&id).expect("scores");
        assert_eq!(scores.get(career_compass::assessment::ProgramId::DataScience), 6);
        assert_eq!(scores.get(career_compass::assessment::ProgramId::ComputerScience), 0);
    }
}
