use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::recruitment::domain::{
    ApplicationDraft, ApplicationId, ApplicationStatus, CandidateId, Interview, InterviewId,
    JobApplication, JobPostingId, JobPostingSnapshot,
};
use crate::workflows::recruitment::identity::{Actor, Role, UserAccount, UserId};
use crate::workflows::recruitment::memory::{
    InMemoryDirectory, InMemoryNotifier, InMemoryRecruitmentStore,
};
use crate::workflows::recruitment::repository::{
    ApplicationRepository, ChangeSet, CommitReceipt, InterviewRepository, JobCatalog,
    LifecycleNotice, NotificationPublisher, NotifyError, RecruitmentStore, RepositoryError,
};
use crate::workflows::recruitment::router::ACTOR_HEADER;
use crate::workflows::recruitment::{
    application_router, LifecycleConfig, LifecycleEngine, RecruitmentService,
};

pub(super) const CANDIDATE: &str = "u-casey";
pub(super) const OTHER_CANDIDATE: &str = "u-riley";
pub(super) const HR: &str = "u-hana";
pub(super) const OTHER_HR: &str = "u-hugo";
pub(super) const INTERVIEWER: &str = "u-ivan";
pub(super) const OTHER_INTERVIEWER: &str = "u-iris";
pub(super) const ADMIN: &str = "u-root";
pub(super) const JOB: &str = "job-backend";
pub(super) const CLOSED_JOB: &str = "job-archived";

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn account(id: &str, username: &str, full_name: &str, role: Role, is_admin: bool) -> UserAccount {
    UserAccount {
        id: UserId(id.to_string()),
        username: username.to_string(),
        full_name: full_name.to_string(),
        role,
        is_admin,
    }
}

pub(super) fn accounts() -> Vec<UserAccount> {
    vec![
        account(CANDIDATE, "casey", "Casey Nguyen", Role::Candidate, false),
        account(OTHER_CANDIDATE, "riley", "", Role::Candidate, false),
        account(HR, "hana", "Hana Okafor", Role::HrCoordinator, false),
        account(OTHER_HR, "hugo", "Hugo Lind", Role::HrCoordinator, false),
        account(INTERVIEWER, "ivan", "Ivan Petrov", Role::Interviewer, false),
        account(OTHER_INTERVIEWER, "iris", "Iris Bell", Role::Interviewer, false),
        account(ADMIN, "root", "Site Admin", Role::Interviewer, true),
    ]
}

pub(super) fn jobs() -> Vec<JobPostingSnapshot> {
    vec![
        JobPostingSnapshot {
            id: JobPostingId(JOB.to_string()),
            title: "Backend Engineer".to_string(),
            is_active: true,
        },
        JobPostingSnapshot {
            id: JobPostingId(CLOSED_JOB.to_string()),
            title: "Data Analyst".to_string(),
            is_active: false,
        },
    ]
}

pub(super) fn actor(id: &str) -> Actor {
    let account = accounts()
        .into_iter()
        .find(|account| account.id.0 == id)
        .expect("known fixture account");
    Actor::from(&account)
}

pub(super) fn user(id: &str) -> UserId {
    UserId(id.to_string())
}

pub(super) fn user_account(id: &str) -> UserAccount {
    accounts()
        .into_iter()
        .find(|account| account.id.0 == id)
        .expect("known fixture account")
}

pub(super) type MemoryService =
    RecruitmentService<InMemoryRecruitmentStore, InMemoryDirectory, InMemoryNotifier>;

pub(super) struct Harness {
    pub(super) service: Arc<MemoryService>,
    pub(super) store: Arc<InMemoryRecruitmentStore>,
    pub(super) notifier: Arc<InMemoryNotifier>,
}

pub(super) fn harness() -> Harness {
    let store = Arc::new(InMemoryRecruitmentStore::with_jobs(jobs()));
    let directory = Arc::new(InMemoryDirectory::from_accounts(accounts()).expect("directory"));
    let notifier = Arc::new(InMemoryNotifier::default());
    let service = RecruitmentService::new(
        store.clone(),
        directory,
        notifier.clone(),
        LifecycleConfig::default(),
    )
    .with_clock(Arc::new(now));

    Harness {
        service: Arc::new(service),
        store,
        notifier,
    }
}

impl Harness {
    pub(super) fn router(&self) -> axum::Router {
        application_router(self.service.clone())
    }

    pub(super) fn apply(&self) -> ApplicationId {
        self.service
            .apply(
                &actor(CANDIDATE),
                &JobPostingId(JOB.to_string()),
                ApplicationDraft {
                    cover_letter: Some("I build reliable services.".to_string()),
                },
            )
            .expect("candidate can apply")
            .application_id
    }

    /// Apply, then let HR move the application to interview with the fixture interviewer.
    pub(super) fn interviewing(&self) -> (ApplicationId, InterviewId) {
        let application_id = self.apply();
        let report = self
            .service
            .request_transition(
                &actor(HR),
                &application_id,
                ApplicationStatus::Interview,
                Some(&user(INTERVIEWER)),
            )
            .expect("hr can move to interview");
        let interview_id = report
            .interview_ids
            .first()
            .cloned()
            .expect("interview auto-created");
        (application_id, interview_id)
    }

    pub(super) fn application(&self, id: &ApplicationId) -> JobApplication {
        self.store
            .find(id)
            .expect("store readable")
            .expect("application present")
    }

    pub(super) fn interviews(&self, id: &ApplicationId) -> Vec<Interview> {
        self.store
            .find_by_application(id)
            .expect("store readable")
    }

    pub(super) fn templates(&self) -> Vec<String> {
        self.notifier
            .events()
            .into_iter()
            .map(|notice| notice.template)
            .collect()
    }
}

pub(super) fn engine() -> LifecycleEngine {
    LifecycleEngine::new(LifecycleConfig::default())
}

pub(super) fn application_in(status: ApplicationStatus) -> JobApplication {
    JobApplication {
        id: ApplicationId("app-fixture".to_string()),
        job: JobPostingId(JOB.to_string()),
        candidate: CandidateId(format!("cand-{CANDIDATE}")),
        candidate_user: user(CANDIDATE),
        status,
        cover_letter: None,
        notes: String::new(),
        applied_at: now(),
        version: 1,
    }
}

pub(super) fn interview_for(application: &JobApplication, id: &str, days: i64) -> Interview {
    Interview {
        version: 1,
        ..Interview::scheduled(
            InterviewId(id.to_string()),
            application.id.clone(),
            user(HR),
            Some(user(INTERVIEWER)),
            now() + chrono::Duration::days(days),
        )
    }
}

pub(super) struct FailingNotifier;

impl NotificationPublisher for FailingNotifier {
    fn publish(&self, _notice: LifecycleNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl ApplicationRepository for UnavailableStore {
    fn find(&self, _id: &ApplicationId) -> Result<Option<JobApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_candidate_and_job(
        &self,
        _candidate: &CandidateId,
        _job: &JobPostingId,
    ) -> Result<Option<JobApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(
        &self,
        _status: Option<ApplicationStatus>,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_for_candidate(
        &self,
        _candidate: &CandidateId,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl InterviewRepository for UnavailableStore {
    fn find_interview(&self, _id: &InterviewId) -> Result<Option<Interview>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_application(
        &self,
        _application: &ApplicationId,
    ) -> Result<Vec<Interview>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_interviews(
        &self,
        _interviewer: Option<&UserId>,
    ) -> Result<Vec<Interview>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl JobCatalog for UnavailableStore {
    fn job(&self, _id: &JobPostingId) -> Result<Option<JobPostingSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl RecruitmentStore for UnavailableStore {
    fn commit(&self, _changes: ChangeSet) -> Result<CommitReceipt, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn request(
    method: Method,
    uri: &str,
    actor: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header(ACTOR_HEADER, actor);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).expect("serializable payload"))
        }
        None => Body::empty(),
    };
    builder.body(body).expect("valid request")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
