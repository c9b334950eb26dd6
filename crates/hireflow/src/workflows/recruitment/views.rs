use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    ApplicationId, ApplicationStatus, CandidateId, Interview, InterviewId, JobApplication,
    JobPostingId,
};
use super::identity::UserId;
use super::lifecycle::OutcomeNarrative;

/// Result handed to the presentation layer after a committed lifecycle operation.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionReport {
    pub application_id: ApplicationId,
    pub previous_status: &'static str,
    pub status: &'static str,
    pub narrative: String,
    pub outcome: OutcomeNarrative,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interview_ids: Vec<InterviewId>,
}

impl TransitionReport {
    pub fn new(
        application_id: ApplicationId,
        previous_status: ApplicationStatus,
        status: ApplicationStatus,
        outcome: OutcomeNarrative,
        interview_ids: Vec<InterviewId>,
    ) -> Self {
        Self {
            application_id,
            previous_status: previous_status.label(),
            status: status.label(),
            narrative: outcome.summary(),
            outcome,
            interview_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub application_id: ApplicationId,
    pub job_id: JobPostingId,
    pub candidate_id: CandidateId,
    pub status: &'static str,
    pub status_display: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    pub applied_at: DateTime<Utc>,
}

impl From<&JobApplication> for ApplicationView {
    fn from(application: &JobApplication) -> Self {
        Self {
            application_id: application.id.clone(),
            job_id: application.job.clone(),
            candidate_id: application.candidate.clone(),
            status: application.status.label(),
            status_display: application.status.display_name(),
            cover_letter: application.cover_letter.clone(),
            notes: application.notes.clone(),
            applied_at: application.applied_at,
        }
    }
}

/// Staff-facing interview record including both feedback channels.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewView {
    pub interview_id: InterviewId,
    pub application_id: ApplicationId,
    pub hr_coordinator: UserId,
    pub interviewer: Option<UserId>,
    pub scheduled_date: DateTime<Utc>,
    pub location: String,
    pub is_online: bool,
    pub meeting_link: Option<String>,
    pub status: &'static str,
    pub feedback: String,
    pub rating: Option<u8>,
    pub interviewer_feedback: String,
    pub interviewer_rating: Option<u8>,
}

impl From<&Interview> for InterviewView {
    fn from(interview: &Interview) -> Self {
        Self {
            interview_id: interview.id.clone(),
            application_id: interview.application.clone(),
            hr_coordinator: interview.hr_coordinator.clone(),
            interviewer: interview.interviewer.clone(),
            scheduled_date: interview.scheduled_date,
            location: interview.location.clone(),
            is_online: interview.is_online,
            meeting_link: interview.meeting_link.clone(),
            status: interview.status.label(),
            feedback: interview.feedback.clone(),
            rating: interview.rating.map(u8::from),
            interviewer_feedback: interview.interviewer_feedback.clone(),
            interviewer_rating: interview.interviewer_rating.map(u8::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetailView {
    pub application: ApplicationView,
    pub interviews: Vec<InterviewView>,
}

/// What a candidate sees of the authoritative interview. HR's internal feedback is omitted.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateInterviewView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub scheduled_date: DateTime<Utc>,
    pub location: String,
    pub is_online: bool,
    pub meeting_link: Option<String>,
    pub interviewer_name: String,
    pub interviewer_feedback: String,
    /// Zero until the interviewer rates the interview.
    pub interviewer_rating: u8,
}

pub(crate) const UNASSIGNED_INTERVIEWER: &str = "Not Assigned";
pub(crate) const NO_FEEDBACK_YET: &str = "No feedback provided yet.";

impl CandidateInterviewView {
    pub fn new(interview: &Interview, interviewer_name: Option<String>) -> Self {
        let interviewer_feedback = if interview.interviewer_feedback.trim().is_empty() {
            NO_FEEDBACK_YET.to_string()
        } else {
            interview.interviewer_feedback.clone()
        };

        Self {
            application_id: interview.application.clone(),
            status: interview.status.label(),
            scheduled_date: interview.scheduled_date,
            location: interview.location.clone(),
            is_online: interview.is_online,
            meeting_link: interview.meeting_link.clone(),
            interviewer_name: interviewer_name
                .unwrap_or_else(|| UNASSIGNED_INTERVIEWER.to_string()),
            interviewer_feedback,
            interviewer_rating: interview.interviewer_rating.map(u8::from).unwrap_or(0),
        }
    }
}

/// Result of a withdrawal or an HR deletion; the application record no longer exists.
#[derive(Debug, Clone, Serialize)]
pub struct RemovalReport {
    pub application_id: ApplicationId,
    pub interviews_removed: usize,
    pub narrative: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewUpdateReport {
    pub interview: InterviewView,
    pub narrative: String,
}
