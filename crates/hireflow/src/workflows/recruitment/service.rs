use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::authorization::{Denial, Operation};
use super::domain::{
    ApplicationDraft, ApplicationId, ApplicationStatus, CandidateId, HrFeedback, Interview,
    InterviewId, InterviewSchedule, InterviewStatus, InterviewerFeedback, JobApplication,
    JobPostingId, OfferResponse,
};
use super::identity::{Actor, DirectoryError, IdentityDirectory, Role, UserAccount, UserId};
use super::lifecycle::{
    IntakeRequest, InterviewChange, LifecycleConfig, LifecycleEngine, LifecycleError,
    LifecycleOutcome, OutcomeNarrative, ResourceKind, ScheduleRequest, TransitionRequest,
};
use super::repository::{
    ChangeSet, LifecycleNotice, NotificationPublisher, RecruitmentStore, RepositoryError,
};
use super::views::{
    CandidateInterviewView, InterviewUpdateReport, InterviewView, RemovalReport,
    TransitionReport,
};

/// Source of "now" for applied-at stamps and interview lead times.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static INTERVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

fn next_interview_id() -> InterviewId {
    let id = INTERVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    InterviewId(format!("int-{id:06}"))
}

/// Facade composing the identity directory, stores, lifecycle engine, and notifier.
///
/// Each operation reads the records it needs, lets the engine decide, and commits the
/// engine's output as one change set. A concurrent writer surfaces as
/// [`RepositoryError::Stale`] instead of being merged.
pub struct RecruitmentService<S, D, N> {
    store: Arc<S>,
    directory: Arc<D>,
    notifier: Arc<N>,
    engine: Arc<LifecycleEngine>,
    clock: Clock,
}

impl<S, D, N> RecruitmentService<S, D, N>
where
    S: RecruitmentStore + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(
        store: Arc<S>,
        directory: Arc<D>,
        notifier: Arc<N>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
            engine: Arc::new(LifecycleEngine::new(config)),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// `currentActor()` for a request carrying the given identity.
    pub fn resolve_actor(&self, id: &UserId) -> Result<Option<Actor>, RecruitmentServiceError> {
        Ok(self.directory.current_actor(id)?)
    }

    pub fn apply(
        &self,
        actor: &Actor,
        job_id: &JobPostingId,
        draft: ApplicationDraft,
    ) -> Result<TransitionReport, RecruitmentServiceError> {
        self.authorize(actor, Operation::Apply)?;

        let job = self
            .store
            .job(job_id)?
            .ok_or(LifecycleError::NotFound(ResourceKind::JobPosting))?;
        let candidate = self.candidate_profile(actor)?;
        let existing = self.store.find_by_candidate_and_job(&candidate, job_id)?;

        let application = self.engine.open_application(
            actor,
            IntakeRequest {
                candidate,
                job: &job,
                existing: existing.as_ref(),
                draft,
                id: next_application_id(),
                now: (self.clock)(),
            },
        )?;

        let receipt = self
            .store
            .commit(ChangeSet::Insert(application))
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    RecruitmentServiceError::Lifecycle(LifecycleError::DuplicateApplication)
                }
                other => other.into(),
            })?;
        let stored = receipt.application.ok_or(RepositoryError::NotFound)?;

        info!(
            application_id = %stored.id.0,
            job_id = %stored.job.0,
            "application submitted"
        );

        Ok(TransitionReport::new(
            stored.id.clone(),
            stored.status,
            stored.status,
            OutcomeNarrative::Applied {
                job_title: job.title,
            },
            Vec::new(),
        ))
    }

    pub fn request_transition(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
        target: ApplicationStatus,
        interviewer: Option<&UserId>,
    ) -> Result<TransitionReport, RecruitmentServiceError> {
        self.authorize(actor, Operation::RequestTransition)?;

        let application = self.load_application(application_id)?;
        let interviews = self.store.find_by_application(application_id)?;
        let interviewer = self.account(interviewer)?;

        let outcome = self.engine.request_transition(
            actor,
            TransitionRequest {
                application: &application,
                interviews: &interviews,
                target,
                interviewer: interviewer.as_ref(),
                proposed_interview_id: next_interview_id(),
                now: (self.clock)(),
            },
        )?;

        self.commit_outcome(Operation::RequestTransition, outcome)
    }

    pub fn submit_hr_feedback(
        &self,
        actor: &Actor,
        interview_id: &InterviewId,
        feedback: HrFeedback,
    ) -> Result<TransitionReport, RecruitmentServiceError> {
        self.authorize(actor, Operation::SubmitHrFeedback)?;

        let (interview, application) = self.load_interview_with_application(interview_id)?;
        let outcome = self
            .engine
            .submit_hr_feedback(actor, &application, &interview, feedback)?;

        self.commit_outcome(Operation::SubmitHrFeedback, outcome)
    }

    pub fn submit_interviewer_feedback(
        &self,
        actor: &Actor,
        interview_id: &InterviewId,
        feedback: InterviewerFeedback,
    ) -> Result<TransitionReport, RecruitmentServiceError> {
        self.authorize(actor, Operation::SubmitInterviewerFeedback)?;

        let (interview, application) = self.load_interview_with_application(interview_id)?;
        let outcome =
            self.engine
                .submit_interviewer_feedback(actor, &application, &interview, feedback)?;

        self.commit_outcome(Operation::SubmitInterviewerFeedback, outcome)
    }

    pub fn respond_to_offer(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
        response: OfferResponse,
        comments: Option<&str>,
    ) -> Result<TransitionReport, RecruitmentServiceError> {
        self.authorize(actor, Operation::RespondToOffer)?;

        let application = self.load_application(application_id)?;
        let outcome = self
            .engine
            .respond_to_offer(actor, &application, response, comments)?;

        self.commit_outcome(Operation::RespondToOffer, outcome)
    }

    pub fn edit_cover_letter(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
        cover_letter: Option<String>,
    ) -> Result<TransitionReport, RecruitmentServiceError> {
        self.authorize(actor, Operation::EditCoverLetter)?;

        let application = self.load_application(application_id)?;
        let outcome = self
            .engine
            .edit_cover_letter(actor, &application, cover_letter)?;

        self.commit_outcome(Operation::EditCoverLetter, outcome)
    }

    pub fn withdraw(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
    ) -> Result<RemovalReport, RecruitmentServiceError> {
        self.authorize(actor, Operation::Withdraw)?;

        let application = self.load_application(application_id)?;
        let job_title = self
            .store
            .job(&application.job)?
            .map(|job| job.title)
            .unwrap_or_else(|| application.job.0.clone());
        let narrative = self.engine.withdraw(actor, &application, &job_title)?;

        self.remove(Operation::Withdraw, &application, narrative)
    }

    pub fn delete_application(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
        confirm_with_interviews: bool,
    ) -> Result<RemovalReport, RecruitmentServiceError> {
        self.authorize(actor, Operation::DeleteApplication)?;

        let application = self.load_application(application_id)?;
        let interviews = self.store.find_by_application(application_id)?;
        let narrative = self
            .engine
            .delete(actor, interviews.len(), confirm_with_interviews)?;

        self.remove(Operation::DeleteApplication, &application, narrative)
    }

    pub fn schedule_interview(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
        schedule: InterviewSchedule,
    ) -> Result<TransitionReport, RecruitmentServiceError> {
        self.authorize(actor, Operation::ScheduleInterview)?;

        let application = self.load_application(application_id)?;
        let interviewer = self.account(schedule.interviewer.as_ref())?;

        let outcome = self.engine.schedule_interview(
            actor,
            ScheduleRequest {
                application: &application,
                schedule,
                interviewer: interviewer.as_ref(),
                proposed_interview_id: next_interview_id(),
            },
        )?;

        self.commit_outcome(Operation::ScheduleInterview, outcome)
    }

    pub fn update_interview(
        &self,
        actor: &Actor,
        interview_id: &InterviewId,
        schedule: InterviewSchedule,
    ) -> Result<InterviewUpdateReport, RecruitmentServiceError> {
        self.authorize(actor, Operation::UpdateInterview)?;

        let interview = self.load_interview(interview_id)?;
        let interviewer = self.account(schedule.interviewer.as_ref())?;
        let (updated, narrative) =
            self.engine
                .update_interview(actor, &interview, schedule, interviewer.as_ref())?;

        let receipt = self
            .store
            .commit(ChangeSet::Update {
                application: None,
                interviews: vec![InterviewChange::Update(updated)],
            })
            .map_err(|err| log_stale(Operation::UpdateInterview, err))?;
        let stored = receipt
            .interviews
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound)?;

        info!(
            interview_id = %stored.id.0,
            status = stored.status.label(),
            "interview updated"
        );
        self.notify(&stored.application, &narrative, Some(&stored));

        Ok(InterviewUpdateReport {
            interview: InterviewView::from(&stored),
            narrative: narrative.summary(),
        })
    }

    pub fn candidate_interview(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
    ) -> Result<CandidateInterviewView, RecruitmentServiceError> {
        self.authorize(actor, Operation::ViewCandidateInterview)?;

        let application = self.load_application(application_id)?;
        self.engine
            .gate()
            .check_owner(actor, Operation::ViewCandidateInterview, &application)?;

        let interview = self
            .store
            .most_recent_by_application(application_id)?
            .ok_or(LifecycleError::NotFound(ResourceKind::Interview))?;
        let interviewer_name = match &interview.interviewer {
            Some(id) => self
                .directory
                .account(id)?
                .map(|account| account.display_name().to_string()),
            None => None,
        };

        Ok(CandidateInterviewView::new(&interview, interviewer_name))
    }

    pub fn applications(
        &self,
        actor: &Actor,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<JobApplication>, RecruitmentServiceError> {
        self.authorize(actor, Operation::ListApplications)?;
        let applications = self.store.list(status)?;
        debug!(count = applications.len(), "listed applications");
        Ok(applications)
    }

    pub fn my_applications(
        &self,
        actor: &Actor,
    ) -> Result<Vec<JobApplication>, RecruitmentServiceError> {
        self.authorize(actor, Operation::ViewOwnApplications)?;
        let candidate = self.candidate_profile(actor)?;
        Ok(self.store.list_for_candidate(&candidate)?)
    }

    pub fn application_detail(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
    ) -> Result<(JobApplication, Vec<Interview>), RecruitmentServiceError> {
        self.authorize(actor, Operation::ViewApplication)?;
        let application = self.load_application(application_id)?;
        let interviews = self.store.find_by_application(application_id)?;
        Ok((application, interviews))
    }

    /// HR coordinators see every interview; interviewers only their own.
    pub fn interviews(
        &self,
        actor: &Actor,
        status: Option<InterviewStatus>,
    ) -> Result<Vec<Interview>, RecruitmentServiceError> {
        self.authorize(actor, Operation::ListInterviews)?;

        let scope = match actor.role {
            Role::Interviewer => Some(&actor.identity),
            Role::HrCoordinator | Role::Candidate => None,
        };
        let interviews = self
            .store
            .list_interviews(scope)?
            .into_iter()
            .filter(|interview| status.map_or(true, |status| interview.status == status))
            .collect();
        Ok(interviews)
    }

    fn authorize(&self, actor: &Actor, operation: Operation) -> Result<(), Denial> {
        self.engine.gate().check_role(actor, operation)
    }

    fn candidate_profile(
        &self,
        actor: &Actor,
    ) -> Result<CandidateId, RecruitmentServiceError> {
        Ok(self
            .directory
            .candidate_profile(&actor.identity)?
            .ok_or(LifecycleError::NotFound(ResourceKind::CandidateProfile))?)
    }

    fn account(&self, id: Option<&UserId>) -> Result<Option<UserAccount>, RecruitmentServiceError> {
        match id {
            Some(id) => {
                let account = self
                    .directory
                    .account(id)?
                    .ok_or(LifecycleError::NotFound(ResourceKind::User))?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    fn load_application(
        &self,
        id: &ApplicationId,
    ) -> Result<JobApplication, RecruitmentServiceError> {
        Ok(self
            .store
            .find(id)?
            .ok_or(LifecycleError::NotFound(ResourceKind::Application))?)
    }

    fn load_interview(&self, id: &InterviewId) -> Result<Interview, RecruitmentServiceError> {
        Ok(self
            .store
            .find_interview(id)?
            .ok_or(LifecycleError::NotFound(ResourceKind::Interview))?)
    }

    fn load_interview_with_application(
        &self,
        id: &InterviewId,
    ) -> Result<(Interview, JobApplication), RecruitmentServiceError> {
        let interview = self.load_interview(id)?;
        let application = self.load_application(&interview.application)?;
        Ok((interview, application))
    }

    fn commit_outcome(
        &self,
        operation: Operation,
        outcome: LifecycleOutcome,
    ) -> Result<TransitionReport, RecruitmentServiceError> {
        let LifecycleOutcome {
            previous_status,
            application,
            interviews,
            narrative,
        } = outcome;

        let receipt = self
            .store
            .commit(ChangeSet::Update {
                application: Some(application),
                interviews,
            })
            .map_err(|err| log_stale(operation, err))?;
        let committed = receipt.application.ok_or(RepositoryError::NotFound)?;

        info!(
            operation = operation.label(),
            application_id = %committed.id.0,
            from = previous_status.label(),
            to = committed.status.label(),
            narrative = %narrative.summary(),
            "lifecycle transition committed"
        );

        self.notify(&committed.id, &narrative, receipt.interviews.first());

        Ok(TransitionReport::new(
            committed.id,
            previous_status,
            committed.status,
            narrative,
            receipt
                .interviews
                .into_iter()
                .map(|interview| interview.id)
                .collect(),
        ))
    }

    fn remove(
        &self,
        operation: Operation,
        application: &JobApplication,
        narrative: OutcomeNarrative,
    ) -> Result<RemovalReport, RecruitmentServiceError> {
        let receipt = self
            .store
            .commit(ChangeSet::Delete {
                application: application.id.clone(),
                expected_version: application.version,
            })
            .map_err(|err| log_stale(operation, err))?;

        info!(
            operation = operation.label(),
            application_id = %application.id.0,
            interviews_removed = receipt.interviews_removed,
            "application removed"
        );

        Ok(RemovalReport {
            application_id: application.id.clone(),
            interviews_removed: receipt.interviews_removed,
            narrative: narrative.summary(),
        })
    }

    /// Runs after commit; a failed publish never undoes the transition.
    fn notify(
        &self,
        application_id: &ApplicationId,
        narrative: &OutcomeNarrative,
        interview: Option<&Interview>,
    ) {
        let Some(template) = narrative.notice_template() else {
            return;
        };

        let mut details = BTreeMap::new();
        details.insert("narrative".to_string(), narrative.summary());
        if let Some(interview) = interview {
            details.insert("interview_id".to_string(), interview.id.0.clone());
            details.insert(
                "scheduled_date".to_string(),
                interview.scheduled_date.to_rfc3339(),
            );
        }

        let notice = LifecycleNotice {
            template: template.to_string(),
            application_id: application_id.clone(),
            details,
        };

        if let Err(err) = self.notifier.publish(notice) {
            warn!(
                application_id = %application_id.0,
                template,
                error = %err,
                "lifecycle notice not delivered"
            );
        }
    }
}

fn log_stale(operation: Operation, err: RepositoryError) -> RepositoryError {
    if matches!(err, RepositoryError::Stale) {
        warn!(
            operation = operation.label(),
            "rejected write computed from a superseded read"
        );
    }
    err
}

/// Error raised by the recruitment service.
#[derive(Debug, thiserror::Error)]
pub enum RecruitmentServiceError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl From<Denial> for RecruitmentServiceError {
    fn from(denial: Denial) -> Self {
        Self::Lifecycle(denial.into())
    }
}
