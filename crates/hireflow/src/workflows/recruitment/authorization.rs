//! Role and ownership checks wrapped around every lifecycle entry point.

use serde::Serialize;

use super::domain::{Interview, JobApplication};
use super::identity::{Actor, Role};

/// Operations the gate knows how to authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Apply,
    EditCoverLetter,
    Withdraw,
    RespondToOffer,
    ViewOwnApplications,
    ViewCandidateInterview,
    RequestTransition,
    DeleteApplication,
    ListApplications,
    ViewApplication,
    ScheduleInterview,
    UpdateInterview,
    SubmitHrFeedback,
    SubmitInterviewerFeedback,
    ListInterviews,
}

/// Who an operation is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Audience {
    Candidate,
    Hr,
    Interviewer,
    Staff,
}

impl Operation {
    pub const fn label(self) -> &'static str {
        match self {
            Operation::Apply => "apply",
            Operation::EditCoverLetter => "edit_cover_letter",
            Operation::Withdraw => "withdraw",
            Operation::RespondToOffer => "respond_to_offer",
            Operation::ViewOwnApplications => "view_own_applications",
            Operation::ViewCandidateInterview => "view_candidate_interview",
            Operation::RequestTransition => "request_transition",
            Operation::DeleteApplication => "delete_application",
            Operation::ListApplications => "list_applications",
            Operation::ViewApplication => "view_application",
            Operation::ScheduleInterview => "schedule_interview",
            Operation::UpdateInterview => "update_interview",
            Operation::SubmitHrFeedback => "submit_hr_feedback",
            Operation::SubmitInterviewerFeedback => "submit_interviewer_feedback",
            Operation::ListInterviews => "list_interviews",
        }
    }

    const fn audience(self) -> Audience {
        match self {
            Operation::Apply
            | Operation::EditCoverLetter
            | Operation::Withdraw
            | Operation::RespondToOffer
            | Operation::ViewOwnApplications
            | Operation::ViewCandidateInterview => Audience::Candidate,
            Operation::RequestTransition
            | Operation::DeleteApplication
            | Operation::ListApplications
            | Operation::ViewApplication
            | Operation::ScheduleInterview
            | Operation::UpdateInterview
            | Operation::SubmitHrFeedback => Audience::Hr,
            Operation::SubmitInterviewerFeedback => Audience::Interviewer,
            Operation::ListInterviews => Audience::Staff,
        }
    }
}

/// Reason code attached to a denied request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenialReason {
    RoleMismatch,
    NotOwner,
    NotAssigned,
}

impl DenialReason {
    pub const fn code(self) -> &'static str {
        match self {
            DenialReason::RoleMismatch => "role-mismatch",
            DenialReason::NotOwner => "not-owner",
            DenialReason::NotAssigned => "not-assigned",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denial {
    pub operation: Operation,
    pub reason: DenialReason,
}

/// Stateless gate. Admins pass HR role checks but never ownership or assignment checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGate;

impl AuthorizationGate {
    pub fn check_role(&self, actor: &Actor, operation: Operation) -> Result<(), Denial> {
        let permitted = match (operation.audience(), actor.role) {
            (Audience::Candidate, Role::Candidate) => true,
            (Audience::Candidate, Role::HrCoordinator | Role::Interviewer) => false,
            (Audience::Hr, Role::HrCoordinator) => true,
            (Audience::Hr, Role::Candidate | Role::Interviewer) => actor.is_admin,
            (Audience::Interviewer, Role::Interviewer) => true,
            (Audience::Interviewer, Role::Candidate | Role::HrCoordinator) => false,
            (Audience::Staff, Role::HrCoordinator | Role::Interviewer) => true,
            (Audience::Staff, Role::Candidate) => actor.is_admin,
        };

        if permitted {
            Ok(())
        } else {
            Err(deny(operation, DenialReason::RoleMismatch))
        }
    }

    /// Candidate operations on a specific application.
    pub fn check_owner(
        &self,
        actor: &Actor,
        operation: Operation,
        application: &JobApplication,
    ) -> Result<(), Denial> {
        self.check_role(actor, operation)?;
        if application.candidate_user == actor.identity {
            Ok(())
        } else {
            Err(deny(operation, DenialReason::NotOwner))
        }
    }

    /// Interview-scoped operations: HR must be the owning coordinator, interviewers the
    /// assigned interviewer.
    pub fn check_assignment(
        &self,
        actor: &Actor,
        operation: Operation,
        interview: &Interview,
    ) -> Result<(), Denial> {
        self.check_role(actor, operation)?;
        let assigned = match operation.audience() {
            Audience::Hr => interview.hr_coordinator == actor.identity,
            Audience::Interviewer => interview.interviewer.as_ref() == Some(&actor.identity),
            Audience::Staff => match actor.role {
                Role::HrCoordinator => true,
                Role::Interviewer => interview.interviewer.as_ref() == Some(&actor.identity),
                Role::Candidate => actor.is_admin,
            },
            Audience::Candidate => false,
        };

        if assigned {
            Ok(())
        } else {
            Err(deny(operation, DenialReason::NotAssigned))
        }
    }
}

fn deny(operation: Operation, reason: DenialReason) -> Denial {
    tracing::warn!(
        operation = operation.label(),
        reason = reason.code(),
        "authorization denied"
    );
    Denial { operation, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::recruitment::domain::{
        ApplicationId, ApplicationStatus, CandidateId, InterviewId, JobPostingId,
    };
    use crate::workflows::recruitment::identity::UserId;
    use chrono::Utc;

    fn actor(id: &str, role: Role) -> Actor {
        Actor::new(UserId(id.to_string()), role)
    }

    fn application(owner: &str) -> JobApplication {
        JobApplication {
            id: ApplicationId("app-1".to_string()),
            job: JobPostingId("job-1".to_string()),
            candidate: CandidateId("cand-1".to_string()),
            candidate_user: UserId(owner.to_string()),
            status: ApplicationStatus::Pending,
            cover_letter: None,
            notes: String::new(),
            applied_at: Utc::now(),
            version: 1,
        }
    }

    fn interview(hr: &str, interviewer: Option<&str>) -> Interview {
        Interview::scheduled(
            InterviewId("int-1".to_string()),
            ApplicationId("app-1".to_string()),
            UserId(hr.to_string()),
            interviewer.map(|id| UserId(id.to_string())),
            Utc::now(),
        )
    }

    #[test]
    fn hr_operations_admit_coordinators_and_admins_only() {
        let gate = AuthorizationGate;
        assert!(gate
            .check_role(&actor("hr", Role::HrCoordinator), Operation::RequestTransition)
            .is_ok());
        assert!(gate
            .check_role(
                &Actor::admin(UserId("root".to_string()), Role::Candidate),
                Operation::RequestTransition
            )
            .is_ok());

        let denial = gate
            .check_role(&actor("int", Role::Interviewer), Operation::RequestTransition)
            .expect_err("interviewers cannot move applications");
        assert_eq!(denial.reason, DenialReason::RoleMismatch);
    }

    #[test]
    fn admin_flag_does_not_grant_candidate_or_interviewer_operations() {
        let gate = AuthorizationGate;
        let admin = Actor::admin(UserId("root".to_string()), Role::HrCoordinator);
        assert!(gate.check_role(&admin, Operation::RespondToOffer).is_err());
        assert!(gate
            .check_role(&admin, Operation::SubmitInterviewerFeedback)
            .is_err());
    }

    #[test]
    fn owner_check_distinguishes_role_from_ownership() {
        let gate = AuthorizationGate;
        let owned = application("cand-user");

        assert!(gate
            .check_owner(&actor("cand-user", Role::Candidate), Operation::Withdraw, &owned)
            .is_ok());

        let stranger = gate
            .check_owner(&actor("other", Role::Candidate), Operation::Withdraw, &owned)
            .expect_err("other candidates are not owners");
        assert_eq!(stranger.reason, DenialReason::NotOwner);

        let hr = gate
            .check_owner(&actor("cand-user", Role::HrCoordinator), Operation::Withdraw, &owned)
            .expect_err("role is checked before ownership");
        assert_eq!(hr.reason, DenialReason::RoleMismatch);
    }

    #[test]
    fn assignment_check_follows_operation_audience() {
        let gate = AuthorizationGate;
        let record = interview("hr-1", Some("int-1"));

        assert!(gate
            .check_assignment(
                &actor("hr-1", Role::HrCoordinator),
                Operation::SubmitHrFeedback,
                &record,
            )
            .is_ok());
        assert_eq!(
            gate.check_assignment(
                &actor("hr-2", Role::HrCoordinator),
                Operation::SubmitHrFeedback,
                &record
            )
            .map_err(|denial| denial.reason),
            Err(DenialReason::NotAssigned)
        );
        assert!(gate
            .check_assignment(
                &actor("int-1", Role::Interviewer),
                Operation::SubmitInterviewerFeedback,
                &record
            )
            .is_ok());
        assert_eq!(
            gate.check_assignment(
                &actor("int-2", Role::Interviewer),
                Operation::SubmitInterviewerFeedback,
                &record
            )
            .map_err(|denial| denial.reason),
            Err(DenialReason::NotAssigned)
        );
    }

    #[test]
    fn staff_listing_scopes_interviewers_to_their_own_records() {
        let gate = AuthorizationGate;
        let unassigned = interview("hr-1", None);

        assert!(gate
            .check_assignment(
                &actor("hr-9", Role::HrCoordinator),
                Operation::ListInterviews,
                &unassigned,
            )
            .is_ok());
        assert!(gate
            .check_assignment(
                &actor("int-1", Role::Interviewer),
                Operation::ListInterviews,
                &unassigned,
            )
            .is_err());
        assert!(gate
            .check_role(&actor("cand", Role::Candidate), Operation::ListInterviews)
            .is_err());
    }
}
