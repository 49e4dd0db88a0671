use crate::infra::{InMemoryAnswerSnapshots, InMemorySubmissionSink};
use crate::server::load_catalog;
use career_compass::assessment::{
    AnswerEvent, AnswerMap, AnswerValue, AssessmentCatalog, AssessmentService,
    AssessmentId, AssessmentServiceError, AssessmentSession, ProgramId, SectionRule,
    SubmissionPayload,
};
use career_compass::config::AssessmentConfig;
use career_compass::error::AppError;
use career_compass::telemetry;
use clap::Args;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Saved answer map (JSON, `section -> question -> value`)
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Catalog to score against instead of the built-in questionnaire
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Program the scripted answers lean towards (code or name, e.g. BSDS or data_science).
    #[arg(long, value_parser = parse_program)]
    pub(crate) favor: Option<ProgramId>,
    /// Leave the learning style section blank to show a blocked submission.
    #[arg(long)]
    pub(crate) leave_incomplete: bool,
}

fn parse_program(raw: &str) -> Result<ProgramId, String> {
    ProgramId::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = ProgramId::ALL.iter().map(|program| program.code()).collect();
        format!("unknown program '{raw}' (expected one of {})", known.join(", "))
    })
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    telemetry::init_cli()?;

    let ScoreArgs { answers, catalog } = args;
    let catalog = load_catalog(&AssessmentConfig {
        catalog_path: catalog,
        autosave: false,
    })?;
    let snapshot: AnswerMap = serde_json::from_reader(BufReader::new(File::open(&answers)?))?;

    let mut session = AssessmentSession::new(Arc::new(catalog));
    session.restore(snapshot);

    println!("Assessment score for {}", answers.display());
    render_session(&session);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    telemetry::init_cli()?;

    let DemoArgs {
        favor,
        leave_incomplete,
    } = args;
    let favor = favor.unwrap_or(ProgramId::DataScience);

    println!("Career assessment demo");
    let catalog = Arc::new(AssessmentCatalog::standard());
    let snapshots = Arc::new(InMemoryAnswerSnapshots::default());
    let sink = Arc::new(InMemorySubmissionSink::default());
    let service = AssessmentService::new(catalog.clone(), snapshots, sink.clone());

    let id = service.start();
    println!(
        "- Started {} ({} sections, {} questions)",
        id,
        catalog.sections().len(),
        catalog.question_count()
    );

    let events = scripted_answers(&catalog, favor, leave_incomplete);
    let Some(payload) = play_script(&service, &id, events)? else {
        return Ok(());
    };

    println!(
        "- Recommended program: {} ({})",
        payload.recommendation.program_label,
        payload.recommendation.program.code()
    );
    for entry in &payload.recommendation.breakdown {
        println!(
            "    - {}: {} pts ({:.0}%)",
            entry.program_code, entry.score, entry.share_percent
        );
    }
    println!("  Submissions handed off: {}", sink.submissions().len());

    Ok(())
}

/// Record `events` and submit. An incomplete assessment is reported and yields `None`;
/// any other service failure is returned.
fn play_script(
    service: &AssessmentService<InMemoryAnswerSnapshots, InMemorySubmissionSink>,
    id: &AssessmentId,
    events: Vec<AnswerEvent>,
) -> Result<Option<SubmissionPayload>, AppError> {
    for event in events {
        service.record(id, event)?;
    }

    let progress = service.progress(id)?;
    println!(
        "- Progress: {}/{} sections complete ({}%)",
        progress.completed_sections, progress.total_sections, progress.percent
    );

    match service.submit(id) {
        Ok(payload) => Ok(Some(payload)),
        Err(AssessmentServiceError::Incomplete(blocked)) => {
            println!("  Submission blocked: {}", blocked);
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Answers that agree strongly with `favor` and mildly with everything else.
fn scripted_answers(
    catalog: &AssessmentCatalog,
    favor: ProgramId,
    leave_incomplete: bool,
) -> Vec<AnswerEvent> {
    let mut events = Vec::new();
    for section in catalog.sections() {
        let rule = section.rule();
        if leave_incomplete && rule == SectionRule::FreeChoice {
            continue;
        }
        for (index, question) in section.questions.iter().enumerate() {
            let value = match rule {
                SectionRule::Likert => {
                    AnswerValue::Likert(if question.program == Some(favor) { 5 } else { 2 })
                }
                SectionRule::MultiSelect => AnswerValue::Bool(index % 3 == 0),
                SectionRule::FreeChoice => match question.options.first() {
                    Some(option) => AnswerValue::Choice(option.clone()),
                    None => AnswerValue::Choice("No preference".to_string()),
                },
            };
            events.push(AnswerEvent::new(section.id, question.key.clone(), value));
        }
    }
    events
}

fn render_session(session: &AssessmentSession) {
    println!("Section checks:");
    for check in session.check_all() {
        println!("  - {}", check.summary());
    }

    let progress = session.progress();
    println!(
        "Progress: {}/{} sections complete ({}%)",
        progress.completed_sections, progress.total_sections, progress.percent
    );
    for section in &progress.sections {
        println!(
            "  - {}: {}/{} answered",
            section.section_label, section.answered, section.total
        );
    }

    let recommendation = session.recommendation();
    if recommendation.has_signal() {
        println!(
            "Recommendation: {} ({})",
            recommendation.program().label(),
            recommendation.program().code()
        );
    } else {
        println!(
            "Recommendation: no scored answers yet; defaulting to {}",
            recommendation.program().label()
        );
    }
    for (program, score) in recommendation.scores().iter() {
        println!("  - {}: {} pts", program.code(), score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use career_compass::assessment::SectionId;

    #[test]
    fn scripted_answers_complete_every_section() {
        let catalog = Arc::new(AssessmentCatalog::standard());
        let mut session = AssessmentSession::new(catalog.clone());
        for event in scripted_answers(&catalog, ProgramId::MultimediaArts, false) {
            session.record(event);
        }

        let payload = session.submit().expect("scripted answers are complete");
        assert_eq!(payload.recommendation.program, ProgramId::MultimediaArts);
    }

    #[test]
    fn scripted_answers_can_skip_learning_style() {
        let catalog = Arc::new(AssessmentCatalog::standard());
        let mut session = AssessmentSession::new(catalog.clone());
        for event in scripted_answers(&catalog, ProgramId::ComputerScience, true) {
            session.record(event);
        }

        let blocked = session.submit().expect_err("learning style left blank");
        assert_eq!(blocked.0.section, SectionId::LearningStyle);
    }

    fn demo_service() -> AssessmentService<InMemoryAnswerSnapshots, InMemorySubmissionSink> {
        AssessmentService::new(
            Arc::new(AssessmentCatalog::standard()),
            Arc::new(InMemoryAnswerSnapshots::default()),
            Arc::new(InMemorySubmissionSink::default()),
        )
    }

    #[test]
    fn replaying_a_submitted_script_surfaces_conflict() {
        let service = demo_service();
        let id = service.start();
        let events = scripted_answers(service.catalog(), ProgramId::DataScience, false);

        let payload = play_script(&service, &id, events.clone())
            .expect("first run succeeds")
            .expect("complete script submits");
        assert_eq!(payload.recommendation.program, ProgramId::DataScience);

        let error = play_script(&service, &id, events).expect_err("already submitted");
        assert!(matches!(
            error,
            AppError::Assessment(AssessmentServiceError::AlreadySubmitted(_))
        ));
        assert_eq!(error.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn incomplete_script_is_reported_not_failed() {
        let service = demo_service();
        let id = service.start();
        let events = scripted_answers(service.catalog(), ProgramId::DataScience, true);

        let outcome = play_script(&service, &id, events).expect("blocked submit is not an error");
        assert!(outcome.is_none());
    }

    #[test]
    fn program_argument_lists_known_codes_on_error() {
        assert_eq!(parse_program("bsit"), Ok(ProgramId::InformationTechnology));
        let err = parse_program("law").expect_err("unknown program");
        assert!(err.contains("BSCS"));
    }
}
