use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::UserId;
use super::lifecycle::LifecycleError;

/// Identifier wrapper for submitted job applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for interview records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterviewId(pub String);

/// Identifier of a provisioned candidate profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier of a job posting owned by the posting catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobPostingId(pub String);

/// The subset of a job posting the lifecycle needs at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPostingSnapshot {
    pub id: JobPostingId,
    pub title: String,
    pub is_active: bool,
}

/// Status tracked throughout the job application lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Interview,
    Offered,
    Rejected,
    Accepted,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Interview,
        ApplicationStatus::Offered,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
        ApplicationStatus::Withdrawn,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending Review",
            ApplicationStatus::Reviewing => "Under Review",
            ApplicationStatus::Interview => "Interview Stage",
            ApplicationStatus::Offered => "Job Offered",
            ApplicationStatus::Rejected => "Application Rejected",
            ApplicationStatus::Accepted => "Offer Accepted",
            ApplicationStatus::Withdrawn => "Application Withdrawn",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.label() == needle)
    }

    /// No lifecycle operation moves an application out of these statuses.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    /// Statuses in which the candidate may still edit or withdraw.
    pub const fn is_candidate_editable(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Pending | ApplicationStatus::Reviewing
        )
    }
}

/// Status of a single interview record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

impl InterviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
            InterviewStatus::Rescheduled => "rescheduled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "rescheduled" => Some(Self::Rescheduled),
            _ => None,
        }
    }
}

/// A 1-5 score attached to interview feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, LifecycleError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(LifecycleError::InvalidRating(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = LifecycleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Interviewer verdict; authoritative over the interviewer's numeric rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Accept,
    Reject,
}

/// Candidate answer to an extended offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferResponse {
    Accept,
    Decline,
}

/// Persisted job application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: ApplicationId,
    pub job: JobPostingId,
    pub candidate: CandidateId,
    pub candidate_user: UserId,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub notes: String,
    pub applied_at: DateTime<Utc>,
    /// Bumped by the store on every committed write.
    pub version: u64,
}

impl JobApplication {
    pub fn with_status(&self, status: ApplicationStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Offer comments go on top so the newest response reads first.
    pub fn prepend_note(&mut self, comments: &str) {
        let comments = comments.trim();
        if comments.is_empty() {
            return;
        }
        self.notes = if self.notes.is_empty() {
            format!("Candidate response: {comments}")
        } else {
            format!("Candidate response: {comments}\n\n{}", self.notes)
        };
    }
}

/// Persisted interview linked to exactly one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub id: InterviewId,
    pub application: ApplicationId,
    pub hr_coordinator: UserId,
    pub interviewer: Option<UserId>,
    pub scheduled_date: DateTime<Utc>,
    pub location: String,
    pub is_online: bool,
    pub meeting_link: Option<String>,
    pub status: InterviewStatus,
    pub feedback: String,
    pub rating: Option<Rating>,
    pub interviewer_feedback: String,
    pub interviewer_rating: Option<Rating>,
    pub version: u64,
}

impl Interview {
    pub fn scheduled(
        id: InterviewId,
        application: ApplicationId,
        hr_coordinator: UserId,
        interviewer: Option<UserId>,
        scheduled_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            application,
            hr_coordinator,
            interviewer,
            scheduled_date,
            location: String::new(),
            is_online: false,
            meeting_link: None,
            status: InterviewStatus::Scheduled,
            feedback: String::new(),
            rating: None,
            interviewer_feedback: String::new(),
            interviewer_rating: None,
            version: 0,
        }
    }
}

/// Candidate intake payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    #[serde(default)]
    pub cover_letter: Option<String>,
}

/// HR-chosen interview logistics for explicit scheduling and updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewSchedule {
    pub scheduled_date: DateTime<Utc>,
    #[serde(default)]
    pub interviewer: Option<UserId>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub meeting_link: Option<String>,
}

/// HR-authored feedback channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrFeedback {
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub feedback: String,
}

/// Interviewer-authored feedback channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewerFeedback {
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub feedback: String,
    pub recommendation: Recommendation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip_through_parse() {
        for status in ApplicationStatus::ALL {
            assert_eq!(ApplicationStatus::parse(status.label()), Some(status));
        }
        assert_eq!(ApplicationStatus::parse(" Offered "), Some(ApplicationStatus::Offered));
        assert_eq!(ApplicationStatus::parse("hired"), None);
    }

    #[test]
    fn rating_rejects_values_outside_scale() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(4).map(Rating::value).ok(), Some(4));
        let parsed: Result<Rating, _> = serde_json::from_str("9");
        assert!(parsed.is_err());
    }

    #[test]
    fn prepend_note_keeps_prior_notes_below() {
        let mut application = JobApplication {
            id: ApplicationId("app-000001".to_string()),
            job: JobPostingId("job-1".to_string()),
            candidate: CandidateId("cand-1".to_string()),
            candidate_user: UserId("u-1".to_string()),
            status: ApplicationStatus::Offered,
            cover_letter: None,
            notes: String::new(),
            applied_at: Utc::now(),
            version: 1,
        };

        application.prepend_note("Looking forward to it");
        application.prepend_note("   ");
        application.prepend_note("Start date works");

        assert_eq!(
            application.notes,
            "Candidate response: Start date works\n\nCandidate response: Looking forward to it"
        );
    }
}
