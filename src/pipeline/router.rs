use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::catalog::{ApplicationSource, RejectionReason, Stage};
use super::domain::{Actor, ApplicationId, CandidateIntake, HiringDetails};
use super::engine::{PipelineEngine, PipelineError};
use super::repository::{ApplicationRepository, NotificationPublisher};

/// Router builder exposing the pipeline operations over HTTP. Authentication
/// happens upstream; the resolved identity arrives as `x-actor-id` and
/// `x-actor-elevated` headers.
pub fn pipeline_router<R, N>(engine: Arc<PipelineEngine<R, N>>) -> Router
where
    R: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/job-applications", post(intake_handler::<R, N>))
        .route(
            "/api/v1/job-applications/check-duplicate",
            get(check_duplicate_handler::<R, N>),
        )
        .route("/api/v1/job-applications/:id", get(get_handler::<R, N>))
        .route(
            "/api/v1/job-applications/:id/move-stage",
            patch(move_stage_handler::<R, N>),
        )
        .route(
            "/api/v1/job-applications/:id/stage-note",
            patch(stage_note_handler::<R, N>),
        )
        .route(
            "/api/v1/job-applications/:id/reject",
            patch(reject_handler::<R, N>),
        )
        .route(
            "/api/v1/job-applications/:id/rollback",
            patch(rollback_handler::<R, N>),
        )
        .route(
            "/api/v1/job-applications/:id/hire",
            patch(hire_handler::<R, N>),
        )
        .with_state(engine)
}

/// Distinct status per error kind so clients can tell caller mistakes,
/// ordering violations, authorization failures, and terminal conflicts apart.
fn error_response(err: PipelineError) -> Response {
    let status = match &err {
        PipelineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::NotFound => StatusCode::NOT_FOUND,
        PipelineError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
        PipelineError::Forbidden(_) => StatusCode::FORBIDDEN,
        PipelineError::Conflict(_) => StatusCode::CONFLICT,
        PipelineError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, PipelineError> {
    let user_id = headers
        .get("x-actor-id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            PipelineError::Validation("missing or malformed x-actor-id header".to_string())
        })?;

    let elevated = headers
        .get("x-actor-elevated")
        .and_then(|value| value.to_str().ok())
        .map(|value| matches!(value.trim(), "true" | "1"))
        .unwrap_or(false);

    Ok(Actor::new(user_id, elevated))
}

#[derive(Debug, Deserialize)]
struct IntakeRequest {
    full_name: String,
    email: String,
    phone: String,
    #[serde(default)]
    location: String,
    source: ApplicationSource,
    resume_ref: String,
}

async fn intake_handler<R, N>(
    State(engine): State<Arc<PipelineEngine<R, N>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<IntakeRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return error_response(err),
    };

    let intake = CandidateIntake {
        full_name: request.full_name,
        email: request.email,
        phone: request.phone,
        location: request.location,
        source: request.source,
        resume_ref: request.resume_ref,
        created_by: actor.user_id,
    };

    match engine.intake(intake) {
        Ok(outcome) => {
            let payload = json!({
                "application": outcome.record.view(),
                "duplicate": outcome.duplicate,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct DuplicateQuery {
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
}

async fn check_duplicate_handler<R, N>(
    State(engine): State<Arc<PipelineEngine<R, N>>>,
    Query(query): Query<DuplicateQuery>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match engine.check_duplicate(&query.email, &query.phone) {
        Ok(existing) => {
            let payload = json!({
                "duplicate": existing.is_some(),
                "application_id": existing.map(|record| record.id),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn get_handler<R, N>(
    State(engine): State<Arc<PipelineEngine<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match engine.get(&ApplicationId(id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct MoveStageRequest {
    next_stage: Stage,
    #[serde(default)]
    notes: String,
}

async fn move_stage_handler<R, N>(
    State(engine): State<Arc<PipelineEngine<R, N>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<MoveStageRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return error_response(err),
    };
    match engine.advance(
        &ApplicationId(id),
        request.next_stage,
        &request.notes,
        &actor,
    ) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct StageNoteRequest {
    notes: String,
}

async fn stage_note_handler<R, N>(
    State(engine): State<Arc<PipelineEngine<R, N>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<StageNoteRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return error_response(err),
    };
    match engine.add_note(&ApplicationId(id), &request.notes, &actor) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct RejectRequest {
    rejection_reason: RejectionReason,
    #[serde(default)]
    notes: String,
}

async fn reject_handler<R, N>(
    State(engine): State<Arc<PipelineEngine<R, N>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<RejectRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return error_response(err),
    };
    match engine.reject(
        &ApplicationId(id),
        request.rejection_reason,
        &request.notes,
        &actor,
    ) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct RollbackRequest {
    reason: String,
}

async fn rollback_handler<R, N>(
    State(engine): State<Arc<PipelineEngine<R, N>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<RollbackRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return error_response(err),
    };
    match engine.rollback(&ApplicationId(id), &request.reason, &actor) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

async fn hire_handler<R, N>(
    State(engine): State<Arc<PipelineEngine<R, N>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    axum::Json(details): axum::Json<HiringDetails>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(err) => return error_response(err),
    };
    match engine.mark_hired(&ApplicationId(id), details, &actor) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}
