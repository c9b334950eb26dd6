use std::fmt;

use super::super::authorization::{Denial, DenialReason, Operation};

/// Kinds of records a lookup can miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Application,
    Interview,
    User,
    JobPosting,
    CandidateProfile,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::Application => "application",
            ResourceKind::Interview => "interview",
            ResourceKind::User => "user",
            ResourceKind::JobPosting => "job posting",
            ResourceKind::CandidateProfile => "candidate profile",
        };
        f.write_str(label)
    }
}

/// Logical failures raised by the lifecycle engine and its authorization gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("{} is not available to this role", .operation.label())]
    InvalidRole { operation: Operation },
    #[error("application does not belong to the acting candidate")]
    NotOwner { operation: Operation },
    #[error("actor is not assigned to this interview")]
    NotAssigned { operation: Operation },
    #[error("moving an application to interview requires an assigned interviewer")]
    MissingInterviewer,
    #[error("cannot {action} while the {subject} is {current}")]
    InvalidState {
        subject: &'static str,
        current: &'static str,
        action: &'static str,
    },
    #[error("{0} not found")]
    NotFound(ResourceKind),
    #[error("candidate has already applied to this job")]
    DuplicateApplication,
    #[error("rating must be between 1 and 5 (found {0})")]
    InvalidRating(u8),
    #[error("application has {interviews} interview(s); deletion must be confirmed")]
    ConfirmationRequired { interviews: usize },
}

impl From<Denial> for LifecycleError {
    fn from(denial: Denial) -> Self {
        let operation = denial.operation;
        match denial.reason {
            DenialReason::RoleMismatch => LifecycleError::InvalidRole { operation },
            DenialReason::NotOwner => LifecycleError::NotOwner { operation },
            DenialReason::NotAssigned => LifecycleError::NotAssigned { operation },
        }
    }
}
