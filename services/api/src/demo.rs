use crate::infra::{build_service, MemoryRecruitmentService};
use clap::Args;
use hireflow::error::AppError;
use hireflow::workflows::recruitment::{
    Actor, ApplicationDraft, ApplicationStatus, InMemoryNotifier, InterviewerFeedback,
    JobPostingId, LifecycleConfig, LifecycleError, OfferResponse, Rating, Recommendation,
    RecruitmentServiceError, ResourceKind, TransitionReport, UserId,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Days between moving to interview and the auto-created interview slot.
    #[arg(long)]
    pub(crate) interview_lead_days: Option<u32>,
    /// Interviewer rating (1-5) recorded after the interview.
    #[arg(long, default_value_t = 4)]
    pub(crate) rating: u8,
    /// Have the interviewer recommend rejection instead of an offer.
    #[arg(long)]
    pub(crate) recommend_reject: bool,
    /// Decline the offer instead of accepting it.
    #[arg(long)]
    pub(crate) decline: bool,
}

const CANDIDATE: &str = "u-casey";
const HR: &str = "u-hana";
const INTERVIEWER: &str = "u-ivan";
const JOB: &str = "job-backend";

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let mut lifecycle = LifecycleConfig::default();
    if let Some(days) = args.interview_lead_days.filter(|days| *days > 0) {
        lifecycle.interview_lead_days = days;
    }

    let service = build_service(lifecycle, None, Arc::new(InMemoryNotifier::default()))?;

    println!("Hiring lifecycle demo");
    println!(
        "  Interview lead time: {} days",
        lifecycle.interview_lead_days
    );

    if let Err(err) = walk_lifecycle(&service, &args) {
        println!("  Demo stopped: {err}");
    }

    let notices = service_notices(&service);
    if notices.is_empty() {
        println!("\nNotifications: none published");
    } else {
        println!("\nNotifications");
        for (template, application) in notices {
            println!("  - {template} ({application})");
        }
    }

    Ok(())
}

fn walk_lifecycle(
    service: &MemoryRecruitmentService,
    args: &DemoArgs,
) -> Result<(), RecruitmentServiceError> {
    let candidate = demo_actor(service, CANDIDATE)?;
    let hr = demo_actor(service, HR)?;
    let interviewer = demo_actor(service, INTERVIEWER)?;

    let applied = service.apply(
        &candidate,
        &JobPostingId(JOB.to_string()),
        ApplicationDraft {
            cover_letter: Some("Five years building payment backends.".to_string()),
        },
    )?;
    print_step("Candidate applies", &applied);
    let application_id = applied.application_id.clone();

    let reviewing =
        service.request_transition(&hr, &application_id, ApplicationStatus::Reviewing, None)?;
    print_step("HR starts review", &reviewing);

    let interviewing = service.request_transition(
        &hr,
        &application_id,
        ApplicationStatus::Interview,
        Some(&interviewer.identity),
    )?;
    print_step("HR moves to interview", &interviewing);

    let Some(interview_id) = interviewing.interview_ids.first().cloned() else {
        println!("  No interview was scheduled");
        return Ok(());
    };

    let view = service.candidate_interview(&candidate, &application_id)?;
    println!(
        "  Candidate sees: {} with {} at {}",
        view.status,
        view.interviewer_name,
        view.scheduled_date.format("%Y-%m-%d %H:%M UTC")
    );

    let recommendation = if args.recommend_reject {
        Recommendation::Reject
    } else {
        Recommendation::Accept
    };
    let rating = Rating::new(args.rating)?;
    let evaluated = service.submit_interviewer_feedback(
        &interviewer,
        &interview_id,
        InterviewerFeedback {
            rating: Some(rating),
            feedback: "Clear system design reasoning.".to_string(),
            recommendation,
        },
    )?;
    print_step("Interviewer submits feedback", &evaluated);

    if evaluated.status != ApplicationStatus::Offered.label() {
        return Ok(());
    }

    let (response, comments) = if args.decline {
        (OfferResponse::Decline, Some("Accepted a competing offer."))
    } else {
        (OfferResponse::Accept, None)
    };
    let answered = service.respond_to_offer(&candidate, &application_id, response, comments)?;
    print_step("Candidate responds to the offer", &answered);

    Ok(())
}

fn demo_actor(
    service: &MemoryRecruitmentService,
    id: &str,
) -> Result<Actor, RecruitmentServiceError> {
    service
        .resolve_actor(&UserId(id.to_string()))?
        .ok_or(RecruitmentServiceError::Lifecycle(LifecycleError::NotFound(
            ResourceKind::User,
        )))
}

fn print_step(label: &str, report: &TransitionReport) {
    println!("\n{label}");
    println!(
        "  {} -> {} ({})",
        report.previous_status, report.status, report.application_id.0
    );
    println!("  {}", report.narrative);
}

fn service_notices(service: &MemoryRecruitmentService) -> Vec<(String, String)> {
    service
        .notifier()
        .events()
        .into_iter()
        .map(|notice| (notice.template, notice.application_id.0))
        .collect()
}
