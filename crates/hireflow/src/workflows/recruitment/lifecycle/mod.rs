//! Application lifecycle engine.
//!
//! Every status change of a [`JobApplication`] is computed here. The engine never touches a
//! store: it receives the current records, checks the actor through the
//! [`AuthorizationGate`], and returns the records to write back. The service facade commits
//! the result as one change set.

mod config;
mod error;
mod narrative;

pub use config::LifecycleConfig;
pub use error::{LifecycleError, ResourceKind};
pub use narrative::OutcomeNarrative;

use chrono::{DateTime, Utc};

use super::authorization::{AuthorizationGate, Operation};
use super::domain::{
    ApplicationDraft, ApplicationId, ApplicationStatus, CandidateId, HrFeedback, Interview,
    InterviewId, InterviewSchedule, InterviewStatus, InterviewerFeedback, JobApplication,
    JobPostingSnapshot, OfferResponse, Recommendation,
};
use super::identity::{Actor, Role, UserAccount};

/// HR ratings at or above this value move the application to an offer.
pub const HR_OFFER_THRESHOLD: u8 = 4;

/// Interview record write produced by an engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewChange {
    Create(Interview),
    Update(Interview),
}

impl InterviewChange {
    pub fn interview(&self) -> &Interview {
        match self {
            InterviewChange::Create(interview) | InterviewChange::Update(interview) => interview,
        }
    }
}

/// Records to persist after a successful engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleOutcome {
    pub previous_status: ApplicationStatus,
    pub application: JobApplication,
    pub interviews: Vec<InterviewChange>,
    pub narrative: OutcomeNarrative,
}

/// Inputs for a candidate opening a new application.
#[derive(Debug, Clone)]
pub struct IntakeRequest<'a> {
    pub candidate: CandidateId,
    pub job: &'a JobPostingSnapshot,
    pub existing: Option<&'a JobApplication>,
    pub draft: ApplicationDraft,
    pub id: ApplicationId,
    pub now: DateTime<Utc>,
}

/// Inputs for an HR-requested status change.
#[derive(Debug, Clone)]
pub struct TransitionRequest<'a> {
    pub application: &'a JobApplication,
    pub interviews: &'a [Interview],
    pub target: ApplicationStatus,
    pub interviewer: Option<&'a UserAccount>,
    /// Used only when the transition creates an interview.
    pub proposed_interview_id: InterviewId,
    pub now: DateTime<Utc>,
}

/// Inputs for explicit interview scheduling by HR.
#[derive(Debug, Clone)]
pub struct ScheduleRequest<'a> {
    pub application: &'a JobApplication,
    pub schedule: InterviewSchedule,
    pub interviewer: Option<&'a UserAccount>,
    pub proposed_interview_id: InterviewId,
}

/// Stateless evaluator for lifecycle operations.
#[derive(Debug, Clone, Default)]
pub struct LifecycleEngine {
    config: LifecycleConfig,
    gate: AuthorizationGate,
}

impl LifecycleEngine {
    pub fn new(config: LifecycleConfig) -> Self {
        Self {
            config,
            gate: AuthorizationGate,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    pub fn open_application(
        &self,
        actor: &Actor,
        request: IntakeRequest<'_>,
    ) -> Result<JobApplication, LifecycleError> {
        self.gate.check_role(actor, Operation::Apply)?;

        if request.existing.is_some() {
            return Err(LifecycleError::DuplicateApplication);
        }
        if !request.job.is_active {
            return Err(LifecycleError::InvalidState {
                subject: "job posting",
                current: "closed",
                action: "apply",
            });
        }

        Ok(JobApplication {
            id: request.id,
            job: request.job.id.clone(),
            candidate: request.candidate,
            candidate_user: actor.identity.clone(),
            status: ApplicationStatus::Pending,
            cover_letter: normalize_text(request.draft.cover_letter),
            notes: String::new(),
            applied_at: request.now,
            version: 0,
        })
    }

    pub fn request_transition(
        &self,
        actor: &Actor,
        request: TransitionRequest<'_>,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        self.gate.check_role(actor, Operation::RequestTransition)?;

        let TransitionRequest {
            application,
            interviews,
            target,
            interviewer,
            proposed_interview_id,
            now,
        } = request;

        ensure_open(application, "change status")?;

        let previous_status = application.status;
        let updated = application.with_status(target);

        if target == ApplicationStatus::Interview {
            let interviewer = require_interviewer(interviewer)?;

            if !interviews.is_empty() {
                return Ok(LifecycleOutcome {
                    previous_status,
                    application: updated,
                    interviews: Vec::new(),
                    narrative: OutcomeNarrative::InterviewAlreadyScheduled { status: target },
                });
            }

            let scheduled_date = now + self.config.interview_lead_time();
            let interview = Interview::scheduled(
                proposed_interview_id,
                application.id.clone(),
                actor.identity.clone(),
                Some(interviewer.id.clone()),
                scheduled_date,
            );

            return Ok(LifecycleOutcome {
                previous_status,
                application: updated,
                interviews: vec![InterviewChange::Create(interview)],
                narrative: OutcomeNarrative::InterviewAssigned {
                    status: target,
                    interviewer: interviewer.display_name().to_string(),
                    scheduled_date,
                },
            });
        }

        if previous_status == ApplicationStatus::Interview && target == ApplicationStatus::Rejected
        {
            let cancelled: Vec<InterviewChange> = interviews
                .iter()
                .filter(|interview| interview.status == InterviewStatus::Scheduled)
                .map(|interview| {
                    InterviewChange::Update(Interview {
                        status: InterviewStatus::Cancelled,
                        ..interview.clone()
                    })
                })
                .collect();

            if !cancelled.is_empty() {
                let count = cancelled.len();
                return Ok(LifecycleOutcome {
                    previous_status,
                    application: updated,
                    interviews: cancelled,
                    narrative: OutcomeNarrative::InterviewsCancelled {
                        status: target,
                        count,
                    },
                });
            }
        }

        Ok(LifecycleOutcome {
            previous_status,
            application: updated,
            interviews: Vec::new(),
            narrative: OutcomeNarrative::StatusUpdated { status: target },
        })
    }

    pub fn submit_hr_feedback(
        &self,
        actor: &Actor,
        application: &JobApplication,
        interview: &Interview,
        feedback: HrFeedback,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        self.gate
            .check_assignment(actor, Operation::SubmitHrFeedback, interview)?;
        ensure_feedback_allowed(application, interview)?;

        let offer = feedback
            .rating
            .map(|rating| rating.value() >= HR_OFFER_THRESHOLD)
            .unwrap_or(false);
        let (status, narrative) = if offer {
            (ApplicationStatus::Offered, OutcomeNarrative::MovedToOffer)
        } else {
            (
                ApplicationStatus::Reviewing,
                OutcomeNarrative::ReturnedToReview,
            )
        };

        let completed = Interview {
            status: InterviewStatus::Completed,
            rating: feedback.rating,
            feedback: feedback.feedback,
            ..interview.clone()
        };

        Ok(LifecycleOutcome {
            previous_status: application.status,
            application: application.with_status(status),
            interviews: vec![InterviewChange::Update(completed)],
            narrative,
        })
    }

    pub fn submit_interviewer_feedback(
        &self,
        actor: &Actor,
        application: &JobApplication,
        interview: &Interview,
        feedback: InterviewerFeedback,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        self.gate
            .check_assignment(actor, Operation::SubmitInterviewerFeedback, interview)?;
        ensure_feedback_allowed(application, interview)?;

        let (status, narrative) = match feedback.recommendation {
            Recommendation::Accept => (
                ApplicationStatus::Offered,
                OutcomeNarrative::RecommendedForOffer,
            ),
            Recommendation::Reject => {
                (ApplicationStatus::Rejected, OutcomeNarrative::NotRecommended)
            }
        };

        let completed = Interview {
            status: InterviewStatus::Completed,
            interviewer_rating: feedback.rating,
            interviewer_feedback: feedback.feedback,
            ..interview.clone()
        };

        Ok(LifecycleOutcome {
            previous_status: application.status,
            application: application.with_status(status),
            interviews: vec![InterviewChange::Update(completed)],
            narrative,
        })
    }

    pub fn respond_to_offer(
        &self,
        actor: &Actor,
        application: &JobApplication,
        response: OfferResponse,
        comments: Option<&str>,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        self.gate
            .check_owner(actor, Operation::RespondToOffer, application)?;

        if application.status != ApplicationStatus::Offered {
            return Err(LifecycleError::InvalidState {
                subject: "application",
                current: application.status.label(),
                action: "respond to an offer",
            });
        }

        let (status, narrative) = match response {
            OfferResponse::Accept => {
                (ApplicationStatus::Accepted, OutcomeNarrative::OfferAccepted)
            }
            OfferResponse::Decline => {
                (ApplicationStatus::Rejected, OutcomeNarrative::OfferDeclined)
            }
        };

        let mut updated = application.with_status(status);
        if let Some(comments) = comments {
            updated.prepend_note(comments);
        }

        Ok(LifecycleOutcome {
            previous_status: application.status,
            application: updated,
            interviews: Vec::new(),
            narrative,
        })
    }

    pub fn schedule_interview(
        &self,
        actor: &Actor,
        request: ScheduleRequest<'_>,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        self.gate.check_role(actor, Operation::ScheduleInterview)?;

        let ScheduleRequest {
            application,
            schedule,
            interviewer,
            proposed_interview_id,
        } = request;

        ensure_open(application, "schedule an interview")?;
        let interviewer = match interviewer {
            Some(account) => Some(require_interviewer(Some(account))?.id.clone()),
            None => None,
        };

        let scheduled_date = schedule.scheduled_date;
        let interview = Interview {
            location: schedule.location,
            is_online: schedule.is_online,
            meeting_link: normalize_text(schedule.meeting_link),
            ..Interview::scheduled(
                proposed_interview_id,
                application.id.clone(),
                actor.identity.clone(),
                interviewer,
                scheduled_date,
            )
        };

        Ok(LifecycleOutcome {
            previous_status: application.status,
            application: application.with_status(ApplicationStatus::Interview),
            interviews: vec![InterviewChange::Create(interview)],
            narrative: OutcomeNarrative::InterviewScheduled { scheduled_date },
        })
    }

    /// Change an interview's logistics. Moving the date of a scheduled interview marks it
    /// rescheduled.
    pub fn update_interview(
        &self,
        actor: &Actor,
        interview: &Interview,
        schedule: InterviewSchedule,
        interviewer: Option<&UserAccount>,
    ) -> Result<(Interview, OutcomeNarrative), LifecycleError> {
        self.gate
            .check_assignment(actor, Operation::UpdateInterview, interview)?;

        if interview.status == InterviewStatus::Cancelled {
            return Err(LifecycleError::InvalidState {
                subject: "interview",
                current: interview.status.label(),
                action: "update the interview",
            });
        }

        let interviewer = match interviewer {
            Some(account) => Some(require_interviewer(Some(account))?.id.clone()),
            None => interview.interviewer.clone(),
        };

        let rescheduled = schedule.scheduled_date != interview.scheduled_date
            && matches!(
                interview.status,
                InterviewStatus::Scheduled | InterviewStatus::Rescheduled
            );
        let status = if rescheduled {
            InterviewStatus::Rescheduled
        } else {
            interview.status
        };

        let updated = Interview {
            interviewer,
            scheduled_date: schedule.scheduled_date,
            location: schedule.location,
            is_online: schedule.is_online,
            meeting_link: normalize_text(schedule.meeting_link),
            status,
            ..interview.clone()
        };

        Ok((updated, OutcomeNarrative::InterviewUpdated { rescheduled }))
    }

    pub fn edit_cover_letter(
        &self,
        actor: &Actor,
        application: &JobApplication,
        cover_letter: Option<String>,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        self.gate
            .check_owner(actor, Operation::EditCoverLetter, application)?;
        ensure_candidate_editable(application, "edit the application")?;

        let updated = JobApplication {
            cover_letter: normalize_text(cover_letter),
            ..application.clone()
        };

        Ok(LifecycleOutcome {
            previous_status: application.status,
            application: updated,
            interviews: Vec::new(),
            narrative: OutcomeNarrative::CoverLetterUpdated,
        })
    }

    /// Candidate withdrawal removes the record; it is not a status change.
    pub fn withdraw(
        &self,
        actor: &Actor,
        application: &JobApplication,
        job_title: &str,
    ) -> Result<OutcomeNarrative, LifecycleError> {
        self.gate.check_owner(actor, Operation::Withdraw, application)?;
        ensure_candidate_editable(application, "withdraw the application")?;

        Ok(OutcomeNarrative::Withdrawn {
            job_title: job_title.to_string(),
        })
    }

    pub fn delete(
        &self,
        actor: &Actor,
        interview_count: usize,
        confirmed: bool,
    ) -> Result<OutcomeNarrative, LifecycleError> {
        self.gate.check_role(actor, Operation::DeleteApplication)?;

        if interview_count > 0 && !confirmed {
            return Err(LifecycleError::ConfirmationRequired {
                interviews: interview_count,
            });
        }

        Ok(OutcomeNarrative::Deleted {
            interviews_removed: interview_count,
        })
    }
}

fn ensure_open(application: &JobApplication, action: &'static str) -> Result<(), LifecycleError> {
    if application.status.is_terminal() {
        return Err(LifecycleError::InvalidState {
            subject: "application",
            current: application.status.label(),
            action,
        });
    }
    Ok(())
}

fn ensure_candidate_editable(
    application: &JobApplication,
    action: &'static str,
) -> Result<(), LifecycleError> {
    if application.status.is_candidate_editable() {
        Ok(())
    } else {
        Err(LifecycleError::InvalidState {
            subject: "application",
            current: application.status.label(),
            action,
        })
    }
}

fn ensure_feedback_allowed(
    application: &JobApplication,
    interview: &Interview,
) -> Result<(), LifecycleError> {
    ensure_open(application, "record interview feedback")?;
    if interview.status == InterviewStatus::Cancelled {
        return Err(LifecycleError::InvalidState {
            subject: "interview",
            current: interview.status.label(),
            action: "record interview feedback",
        });
    }
    Ok(())
}

fn require_interviewer(account: Option<&UserAccount>) -> Result<&UserAccount, LifecycleError> {
    account
        .filter(|account| account.role == Role::Interviewer)
        .ok_or(LifecycleError::MissingInterviewer)
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
