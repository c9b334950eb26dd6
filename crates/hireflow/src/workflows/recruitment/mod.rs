//! Job application lifecycle, interview scheduling, and the role gate in front of both.
//!
//! [`RecruitmentService`] is the entry point. It loads records from a [`RecruitmentStore`],
//! asks the [`LifecycleEngine`] for the next state, and commits the result atomically.

pub mod authorization;
pub mod domain;
pub mod identity;
pub mod lifecycle;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use authorization::{AuthorizationGate, Denial, DenialReason, Operation};
pub use domain::{
    ApplicationDraft, ApplicationId, ApplicationStatus, CandidateId, HrFeedback, Interview,
    InterviewId, InterviewSchedule, InterviewStatus, InterviewerFeedback, JobApplication,
    JobPostingId, JobPostingSnapshot, OfferResponse, Rating, Recommendation,
};
pub use identity::{Actor, DirectoryError, IdentityDirectory, Role, UserAccount, UserId};
pub use lifecycle::{
    InterviewChange, LifecycleConfig, LifecycleEngine, LifecycleError, LifecycleOutcome,
    OutcomeNarrative, ResourceKind, HR_OFFER_THRESHOLD,
};
pub use memory::{InMemoryDirectory, InMemoryNotifier, InMemoryRecruitmentStore};
pub use repository::{
    ApplicationRepository, ChangeSet, CommitReceipt, InterviewRepository, JobCatalog,
    LifecycleNotice, NotificationPublisher, NotifyError, RecruitmentStore, RepositoryError,
};
pub use router::{application_router, ACTOR_HEADER};
pub use service::{Clock, RecruitmentService, RecruitmentServiceError};
pub use views::{
    ApplicationDetailView, ApplicationView, CandidateInterviewView, InterviewUpdateReport,
    InterviewView, RemovalReport, TransitionReport,
};
