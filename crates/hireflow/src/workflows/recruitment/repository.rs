use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, ApplicationStatus, CandidateId, Interview, InterviewId, JobApplication,
    JobPostingId, JobPostingSnapshot,
};
use super::identity::UserId;
use super::lifecycle::InterviewChange;

/// Read side of the application store.
pub trait ApplicationRepository: Send + Sync {
    fn find(&self, id: &ApplicationId) -> Result<Option<JobApplication>, RepositoryError>;
    fn find_by_candidate_and_job(
        &self,
        candidate: &CandidateId,
        job: &JobPostingId,
    ) -> Result<Option<JobApplication>, RepositoryError>;
    /// Newest first.
    fn list(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<JobApplication>, RepositoryError>;
    /// Newest first.
    fn list_for_candidate(
        &self,
        candidate: &CandidateId,
    ) -> Result<Vec<JobApplication>, RepositoryError>;
}

/// Read side of the interview store.
pub trait InterviewRepository: Send + Sync {
    fn find_interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError>;
    fn find_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Vec<Interview>, RepositoryError>;
    /// Ordered by scheduled date, soonest first.
    fn list_interviews(
        &self,
        interviewer: Option<&UserId>,
    ) -> Result<Vec<Interview>, RepositoryError>;

    /// The interview candidate-facing views treat as authoritative.
    fn most_recent_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Option<Interview>, RepositoryError> {
        Ok(self
            .find_by_application(application)?
            .into_iter()
            .max_by(|left, right| {
                left.scheduled_date
                    .cmp(&right.scheduled_date)
                    .then_with(|| left.id.cmp(&right.id))
            }))
    }
}

/// Job posting lookups needed at intake.
pub trait JobCatalog: Send + Sync {
    fn job(&self, id: &JobPostingId) -> Result<Option<JobPostingSnapshot>, RepositoryError>;
}

/// A set of writes applied atomically. Each write names the version it was computed from;
/// the store rejects the whole set with [`RepositoryError::Stale`] if any record moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSet {
    Insert(JobApplication),
    Update {
        application: Option<JobApplication>,
        interviews: Vec<InterviewChange>,
    },
    Delete {
        application: ApplicationId,
        expected_version: u64,
    },
}

/// Versions assigned by a committed change set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    pub application: Option<JobApplication>,
    pub interviews: Vec<Interview>,
    pub interviews_removed: usize,
}

/// Write side shared by the application and interview stores.
pub trait RecruitmentStore: ApplicationRepository + InterviewRepository + JobCatalog {
    fn commit(&self, changes: ChangeSet) -> Result<CommitReceipt, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record changed since it was read")]
    Stale,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook informing people about lifecycle outcomes (e-mail, chat, ...).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notice: LifecycleNotice) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleNotice {
    pub template: String,
    pub application_id: ApplicationId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
