use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAnswerSnapshots, InMemorySubmissionSink};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use career_compass::assessment::{AssessmentCatalog, AssessmentService};
use career_compass::config::{AppConfig, AssessmentConfig};
use career_compass::error::AppError;
use career_compass::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(load_catalog(&config.assessment)?);
    let snapshots = Arc::new(InMemoryAnswerSnapshots::default());
    let sink = Arc::new(InMemorySubmissionSink::default());
    let assessment_service = Arc::new(
        AssessmentService::new(catalog.clone(), snapshots, sink)
            .with_autosave(config.assessment.autosave),
    );

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        sections = catalog.sections().len(),
        questions = catalog.question_count(),
        "career assessment service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn load_catalog(config: &AssessmentConfig) -> Result<AssessmentCatalog, AppError> {
    match &config.catalog_path {
        Some(path) => {
            let catalog = AssessmentCatalog::from_path(path)?;
            info!(path = %path.display(), "loaded assessment catalog");
            Ok(catalog)
        }
        None => Ok(AssessmentCatalog::standard()),
    }
}
