use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::auth::{Caller, TokenRegistry};
use super::domain::{ApplicationSubmission, JobPosting, StatusUpdate};
use super::repository::{ApplicationRepository, JobRepository, StoreError};
use super::service::{JobPortalService, PortalError};

/// Shared handler state: the service plus the token registry the [`Caller`] extractor reads.
pub struct PortalState<J, A> {
    pub service: Arc<JobPortalService<J, A>>,
    pub tokens: Arc<TokenRegistry>,
}

impl<J, A> Clone for PortalState<J, A> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<J, A> FromRef<PortalState<J, A>> for Arc<TokenRegistry> {
    fn from_ref(state: &PortalState<J, A>) -> Self {
        state.tokens.clone()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EmailQuery {
    #[serde(default)]
    pub(crate) email: Option<String>,
}

/// Router builder exposing the job board endpoints.
pub fn portal_router<J, A>(
    service: Arc<JobPortalService<J, A>>,
    tokens: Arc<TokenRegistry>,
) -> Router
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    Router::new()
        .route(
            "/jobs",
            get(list_jobs_handler::<J, A>).post(create_job_handler::<J, A>),
        )
        .route("/jobs/:id", get(job_handler::<J, A>))
        .route("/apply", post(apply_handler::<J, A>))
        .route("/applications", get(applicant_applications_handler::<J, A>))
        .route(
            "/applications/job/:job_id",
            get(job_applications_handler::<J, A>),
        )
        .route("/applications/:id", patch(update_status_handler::<J, A>))
        .with_state(PortalState { service, tokens })
}

pub(crate) async fn list_jobs_handler<J, A>(
    State(state): State<PortalState<J, A>>,
    Query(query): Query<EmailQuery>,
) -> Response
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let result = match query.email {
        Some(email) => state.service.list_by_poster(&email).await,
        None => state.service.list_jobs().await,
    };

    match result {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Answers with a single-element array, or an empty one when no job has the id.
pub(crate) async fn job_handler<J, A>(
    State(state): State<PortalState<J, A>>,
    Path(id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    match state.service.get_job(&id).await {
        Ok(job) => {
            let jobs: Vec<_> = job.into_iter().collect();
            (StatusCode::OK, Json(jobs)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_job_handler<J, A>(
    State(state): State<PortalState<J, A>>,
    caller: Caller,
    payload: Result<Json<JobPosting>, JsonRejection>,
) -> Response
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let Json(posting) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match state.service.create_job(&caller, posting).await {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn apply_handler<J, A>(
    State(state): State<PortalState<J, A>>,
    caller: Caller,
    payload: Result<Json<ApplicationSubmission>, JsonRejection>,
) -> Response
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match state.service.apply(&caller, submission).await {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn applicant_applications_handler<J, A>(
    State(state): State<PortalState<J, A>>,
    caller: Caller,
    Query(query): Query<EmailQuery>,
) -> Response
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let email = query.email.unwrap_or_default();
    match state.service.list_by_applicant(&caller, &email).await {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn job_applications_handler<J, A>(
    State(state): State<PortalState<J, A>>,
    caller: Caller,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    match state.service.list_by_job(&caller, &job_id).await {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_status_handler<J, A>(
    State(state): State<PortalState<J, A>>,
    caller: Caller,
    Path(application_id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Response
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let Json(update) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match state
        .service
        .update_status(&caller, &application_id, update.status)
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({ "error": rejection.body_text() });
    (rejection.status(), Json(payload)).into_response()
}

pub(crate) fn error_response(error: PortalError) -> Response {
    match error {
        PortalError::Validation(error) => {
            let payload = json!({
                "error": error.to_string(),
                "issues": error.issues,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        PortalError::Auth(error) => error.into_response(),
        PortalError::NotFound(what) => {
            let payload = json!({ "error": format!("{what} not found") });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        PortalError::Store(error) => {
            let status = match &error {
                StoreError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
                StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                StoreError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            if status != StatusCode::BAD_REQUEST {
                warn!(%error, "store request failed");
            }
            let payload = json!({ "error": error.to_string() });
            (status, Json(payload)).into_response()
        }
    }
}
