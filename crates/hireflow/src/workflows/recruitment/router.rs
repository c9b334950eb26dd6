use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ApplicationDraft, ApplicationId, ApplicationStatus, HrFeedback, InterviewId,
    InterviewSchedule, InterviewStatus, InterviewerFeedback, JobPostingId, OfferResponse,
};
use super::identity::{Actor, IdentityDirectory, UserId};
use super::lifecycle::LifecycleError;
use super::repository::{NotificationPublisher, RecruitmentStore, RepositoryError};
use super::service::{RecruitmentService, RecruitmentServiceError};
use super::views::{ApplicationDetailView, ApplicationView, InterviewView};

/// Header carrying the authenticated user id, set by the fronting auth proxy.
pub const ACTOR_HEADER: &str = "x-actor-id";

pub(crate) const ACCESS_DENIED: &str = "access denied";
pub(crate) const NOT_FOUND: &str = "not found";

type SharedService<S, D, N> = Arc<RecruitmentService<S, D, N>>;

/// Router builder exposing the applicant tracking endpoints.
pub fn application_router<S, D, N>(service: SharedService<S, D, N>) -> Router
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs/:job_id/applications",
            post(apply_handler::<S, D, N>),
        )
        .route("/api/v1/applications", get(list_handler::<S, D, N>))
        .route(
            "/api/v1/applications/mine",
            get(my_applications_handler::<S, D, N>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(detail_handler::<S, D, N>)
                .patch(edit_handler::<S, D, N>)
                .delete(delete_handler::<S, D, N>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(transition_handler::<S, D, N>),
        )
        .route(
            "/api/v1/applications/:application_id/offer-response",
            post(offer_response_handler::<S, D, N>),
        )
        .route(
            "/api/v1/applications/:application_id/withdraw",
            post(withdraw_handler::<S, D, N>),
        )
        .route(
            "/api/v1/applications/:application_id/interviews",
            post(schedule_handler::<S, D, N>),
        )
        .route(
            "/api/v1/applications/:application_id/interview",
            get(candidate_interview_handler::<S, D, N>),
        )
        .route("/api/v1/interviews", get(interviews_handler::<S, D, N>))
        .route(
            "/api/v1/interviews/:interview_id",
            put(update_interview_handler::<S, D, N>),
        )
        .route(
            "/api/v1/interviews/:interview_id/feedback",
            post(hr_feedback_handler::<S, D, N>),
        )
        .route(
            "/api/v1/interviews/:interview_id/interviewer-feedback",
            post(interviewer_feedback_handler::<S, D, N>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationFilter {
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InterviewFilter {
    #[serde(default)]
    pub status: Option<InterviewStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteOptions {
    #[serde(default)]
    pub confirm_with_interviews: bool,
}

#[derive(Debug, Deserialize)]
pub struct TransitionPayload {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub interviewer: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct OfferResponsePayload {
    pub response: OfferResponse,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterPayload {
    #[serde(default)]
    pub cover_letter: Option<String>,
}

pub(crate) async fn apply_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    axum::Json(draft): axum::Json<ApplicationDraft>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.apply(&actor, &JobPostingId(job_id), draft) {
        Ok(report) => (StatusCode::CREATED, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Query(filter): Query<ApplicationFilter>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.applications(&actor, filter.status) {
        Ok(applications) => {
            let views: Vec<ApplicationView> =
                applications.iter().map(ApplicationView::from).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn my_applications_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.my_applications(&actor) {
        Ok(applications) => {
            let views: Vec<ApplicationView> =
                applications.iter().map(ApplicationView::from).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detail_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.application_detail(&actor, &ApplicationId(application_id)) {
        Ok((application, interviews)) => {
            let view = ApplicationDetailView {
                application: ApplicationView::from(&application),
                interviews: interviews.iter().map(InterviewView::from).collect(),
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn edit_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    axum::Json(payload): axum::Json<CoverLetterPayload>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.edit_cover_letter(&actor, &ApplicationId(application_id), payload.cover_letter)
    {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Query(options): Query<DeleteOptions>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.delete_application(
        &actor,
        &ApplicationId(application_id),
        options.confirm_with_interviews,
    ) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transition_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    axum::Json(payload): axum::Json<TransitionPayload>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.request_transition(
        &actor,
        &ApplicationId(application_id),
        payload.status,
        payload.interviewer.as_ref(),
    ) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn offer_response_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    axum::Json(payload): axum::Json<OfferResponsePayload>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.respond_to_offer(
        &actor,
        &ApplicationId(application_id),
        payload.response,
        payload.comments.as_deref(),
    ) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn withdraw_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.withdraw(&actor, &ApplicationId(application_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn schedule_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    axum::Json(schedule): axum::Json<InterviewSchedule>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.schedule_interview(&actor, &ApplicationId(application_id), schedule) {
        Ok(report) => (StatusCode::CREATED, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn candidate_interview_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.candidate_interview(&actor, &ApplicationId(application_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn interviews_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Query(filter): Query<InterviewFilter>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.interviews(&actor, filter.status) {
        Ok(interviews) => {
            let views: Vec<InterviewView> = interviews.iter().map(InterviewView::from).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_interview_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Path(interview_id): Path<String>,
    axum::Json(schedule): axum::Json<InterviewSchedule>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.update_interview(&actor, &InterviewId(interview_id), schedule) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn hr_feedback_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Path(interview_id): Path<String>,
    axum::Json(feedback): axum::Json<HrFeedback>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.submit_hr_feedback(&actor, &InterviewId(interview_id), feedback) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn interviewer_feedback_handler<S, D, N>(
    State(service): State<SharedService<S, D, N>>,
    headers: HeaderMap,
    Path(interview_id): Path<String>,
    axum::Json(feedback): axum::Json<InterviewerFeedback>,
) -> Response
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let actor = match authenticate(&service, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.submit_interviewer_feedback(&actor, &InterviewId(interview_id), feedback) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

fn authenticate<S, D, N>(
    service: &RecruitmentService<S, D, N>,
    headers: &HeaderMap,
) -> Result<Actor, Response>
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let identity = headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| UserId(value.to_string()));

    let Some(identity) = identity else {
        return Err(unauthenticated());
    };

    match service.resolve_actor(&identity) {
        Ok(Some(actor)) => Ok(actor),
        Ok(None) => Err(unauthenticated()),
        Err(error) => Err(error_response(error)),
    }
}

fn unauthenticated() -> Response {
    let payload = json!({
        "error": "authentication required",
    });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

/// Ownership misses and absent records share one 404 body so callers cannot probe for
/// applications they do not own.
pub(crate) fn error_response(error: RecruitmentServiceError) -> Response {
    let (status, message) = match &error {
        RecruitmentServiceError::Lifecycle(
            LifecycleError::InvalidRole { .. } | LifecycleError::NotAssigned { .. },
        ) => (StatusCode::FORBIDDEN, ACCESS_DENIED.to_string()),
        RecruitmentServiceError::Lifecycle(
            LifecycleError::NotOwner { .. } | LifecycleError::NotFound(_),
        )
        | RecruitmentServiceError::Repository(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, NOT_FOUND.to_string())
        }
        RecruitmentServiceError::Lifecycle(
            LifecycleError::MissingInterviewer | LifecycleError::InvalidRating(_),
        ) => (StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
        RecruitmentServiceError::Lifecycle(
            LifecycleError::InvalidState { .. }
            | LifecycleError::ConfirmationRequired { .. }
            | LifecycleError::DuplicateApplication,
        )
        | RecruitmentServiceError::Repository(
            RepositoryError::Stale | RepositoryError::Conflict,
        ) => (StatusCode::CONFLICT, error.to_string()),
        RecruitmentServiceError::Repository(RepositoryError::Unavailable(_))
        | RecruitmentServiceError::Directory(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        }
    };

    let payload = json!({
        "error": message,
    });
    (status, axum::Json(payload)).into_response()
}
