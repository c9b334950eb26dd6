use chrono::{DateTime, Utc};
use serde::Serialize;

use super::super::domain::ApplicationStatus;

/// What a lifecycle operation did, in a form the presentation layer can render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeNarrative {
    Applied {
        job_title: String,
    },
    StatusUpdated {
        status: ApplicationStatus,
    },
    InterviewAssigned {
        status: ApplicationStatus,
        interviewer: String,
        scheduled_date: DateTime<Utc>,
    },
    InterviewAlreadyScheduled {
        status: ApplicationStatus,
    },
    InterviewsCancelled {
        status: ApplicationStatus,
        count: usize,
    },
    InterviewScheduled {
        scheduled_date: DateTime<Utc>,
    },
    InterviewUpdated {
        rescheduled: bool,
    },
    MovedToOffer,
    ReturnedToReview,
    RecommendedForOffer,
    NotRecommended,
    OfferAccepted,
    OfferDeclined,
    CoverLetterUpdated,
    Withdrawn {
        job_title: String,
    },
    Deleted {
        interviews_removed: usize,
    },
}

impl OutcomeNarrative {
    pub fn summary(&self) -> String {
        match self {
            OutcomeNarrative::Applied { job_title } => {
                format!("You have successfully applied for {job_title}!")
            }
            OutcomeNarrative::StatusUpdated { status } => {
                format!("Application status updated to {}", status.display_name())
            }
            OutcomeNarrative::InterviewAssigned {
                status,
                interviewer,
                scheduled_date,
            } => format!(
                "Application status updated to {} and interview assigned to {} on {}",
                status.display_name(),
                interviewer,
                scheduled_date.format("%Y-%m-%d")
            ),
            OutcomeNarrative::InterviewAlreadyScheduled { status } => format!(
                "Application status updated to {}. An interview is already scheduled.",
                status.display_name()
            ),
            OutcomeNarrative::InterviewsCancelled { status, count } => format!(
                "Application status updated to {}. Cancelled {} scheduled interview(s).",
                status.display_name(),
                count
            ),
            OutcomeNarrative::InterviewScheduled { scheduled_date } => format!(
                "Interview scheduled for {}",
                scheduled_date.format("%Y-%m-%d %H:%M UTC")
            ),
            OutcomeNarrative::InterviewUpdated { rescheduled: true } => {
                "Interview rescheduled successfully!".to_string()
            }
            OutcomeNarrative::InterviewUpdated { rescheduled: false } => {
                "Interview updated successfully!".to_string()
            }
            OutcomeNarrative::MovedToOffer => {
                "Interview feedback submitted. Candidate has been moved to Job Offer stage!"
                    .to_string()
            }
            OutcomeNarrative::ReturnedToReview => {
                "Interview feedback submitted. Application has been moved back to Review stage."
                    .to_string()
            }
            OutcomeNarrative::RecommendedForOffer => {
                "Feedback submitted. The candidate has been recommended for job offer.".to_string()
            }
            OutcomeNarrative::NotRecommended => {
                "Feedback submitted. The candidate has not been recommended for this position."
                    .to_string()
            }
            OutcomeNarrative::OfferAccepted => {
                "Congratulations! You have accepted the job offer.".to_string()
            }
            OutcomeNarrative::OfferDeclined => {
                "You have declined the job offer. Thank you for your consideration.".to_string()
            }
            OutcomeNarrative::CoverLetterUpdated => {
                "Your application has been updated successfully.".to_string()
            }
            OutcomeNarrative::Withdrawn { job_title } => format!(
                "Your application for '{job_title}' has been withdrawn. You may apply again if you wish."
            ),
            OutcomeNarrative::Deleted { interviews_removed: 0 } => {
                "Application deleted.".to_string()
            }
            OutcomeNarrative::Deleted { interviews_removed } => {
                format!("Application deleted along with {interviews_removed} interview(s).")
            }
        }
    }

    /// Outbound notice template for outcomes worth telling someone about.
    pub fn notice_template(&self) -> Option<&'static str> {
        match self {
            OutcomeNarrative::InterviewAssigned { .. }
            | OutcomeNarrative::InterviewScheduled { .. } => Some("interview_scheduled"),
            OutcomeNarrative::InterviewUpdated { rescheduled: true } => {
                Some("interview_rescheduled")
            }
            OutcomeNarrative::InterviewsCancelled { count, .. } if *count > 0 => {
                Some("interviews_cancelled")
            }
            OutcomeNarrative::MovedToOffer | OutcomeNarrative::RecommendedForOffer => {
                Some("offer_extended")
            }
            OutcomeNarrative::NotRecommended
            | OutcomeNarrative::StatusUpdated {
                status: ApplicationStatus::Rejected,
            } => Some("application_rejected"),
            OutcomeNarrative::OfferAccepted => Some("offer_accepted"),
            OutcomeNarrative::OfferDeclined => Some("offer_declined"),
            _ => None,
        }
    }
}
