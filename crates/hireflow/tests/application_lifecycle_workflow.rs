//! End-to-end lifecycle scenarios driven through the public service facade and HTTP router.

mod common {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::response::Response;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::Value;

    use hireflow::workflows::recruitment::{
        InMemoryDirectory, InMemoryNotifier, InMemoryRecruitmentStore, JobPostingId,
        JobPostingSnapshot, LifecycleConfig, RecruitmentService, Role, UserAccount, UserId,
        ACTOR_HEADER,
    };

    pub(super) type Service =
        RecruitmentService<InMemoryRecruitmentStore, InMemoryDirectory, InMemoryNotifier>;

    pub(super) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 8, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    fn account(id: &str, name: &str, role: Role) -> UserAccount {
        UserAccount {
            id: UserId(id.to_string()),
            username: id.trim_start_matches("u-").to_string(),
            full_name: name.to_string(),
            role,
            is_admin: false,
        }
    }

    pub(super) fn build() -> (
        Arc<Service>,
        Arc<InMemoryRecruitmentStore>,
        Arc<InMemoryNotifier>,
    ) {
        let store = Arc::new(InMemoryRecruitmentStore::with_jobs([JobPostingSnapshot {
            id: JobPostingId("job-sre".to_string()),
            title: "Site Reliability Engineer".to_string(),
            is_active: true,
        }]));
        let directory = Arc::new(
            InMemoryDirectory::from_accounts([
                account("u-cam", "Cam Ortiz", Role::Candidate),
                account("u-hr", "Harper Quinn", Role::HrCoordinator),
                account("u-iv", "Indra Vale", Role::Interviewer),
            ])
            .expect("directory"),
        );
        let notifier = Arc::new(InMemoryNotifier::default());
        let service = RecruitmentService::new(
            store.clone(),
            directory,
            notifier.clone(),
            LifecycleConfig::default(),
        )
        .with_clock(Arc::new(now));
        (Arc::new(service), store, notifier)
    }

    pub(super) fn post(uri: &str, actor: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(ACTOR_HEADER, actor)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("json")))
            .expect("request")
    }

    pub(super) fn get(uri: &str, actor: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(ACTOR_HEADER, actor)
            .body(Body::empty())
            .expect("request")
    }

    pub(super) async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }
}

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use common::*;
use hireflow::workflows::recruitment::{
    application_router, ApplicationId, ApplicationRepository, ApplicationStatus,
    InterviewRepository, InterviewStatus,
};

#[tokio::test]
async fn offer_accepted_scenario_over_http() {
    let (service, store, notifier) = build();
    let router = application_router(service);

    let applied = router
        .clone()
        .oneshot(post(
            "/api/v1/jobs/job-sre/applications",
            "u-cam",
            json!({ "cover_letter": "On-call veteran" }),
        ))
        .await
        .expect("apply");
    assert_eq!(applied.status(), StatusCode::CREATED);
    let application_id = json_body(applied).await["application_id"]
        .as_str()
        .expect("id")
        .to_string();
    let id = ApplicationId(application_id.clone());
    assert_eq!(
        store.find(&id).unwrap().expect("stored").status,
        ApplicationStatus::Pending
    );

    let moved = router
        .clone()
        .oneshot(post(
            &format!("/api/v1/applications/{application_id}/status"),
            "u-hr",
            json!({ "status": "interview", "interviewer": "u-iv" }),
        ))
        .await
        .expect("transition");
    assert_eq!(moved.status(), StatusCode::OK);
    let interviews = store.find_by_application(&id).unwrap();
    assert_eq!(interviews.len(), 1);
    assert_eq!(interviews[0].status, InterviewStatus::Scheduled);
    assert_eq!(interviews[0].scheduled_date, now() + chrono::Duration::days(7));

    let feedback = router
        .clone()
        .oneshot(post(
            &format!("/api/v1/interviews/{}/interviewer-feedback", interviews[0].id.0),
            "u-iv",
            json!({ "rating": 4, "feedback": "Calm under pressure", "recommendation": "accept" }),
        ))
        .await
        .expect("feedback");
    assert_eq!(feedback.status(), StatusCode::OK);
    assert_eq!(
        store.find(&id).unwrap().expect("stored").status,
        ApplicationStatus::Offered
    );

    let interview_view = router
        .clone()
        .oneshot(get(
            &format!("/api/v1/applications/{application_id}/interview"),
            "u-cam",
        ))
        .await
        .expect("candidate view");
    let view = json_body(interview_view).await;
    assert_eq!(view["interviewer_name"], "Indra Vale");
    assert_eq!(view["interviewer_feedback"], "Calm under pressure");
    assert_eq!(view["interviewer_rating"], 4);

    let accepted = router
        .oneshot(post(
            &format!("/api/v1/applications/{application_id}/offer-response"),
            "u-cam",
            json!({ "response": "accept" }),
        ))
        .await
        .expect("offer response");
    assert_eq!(accepted.status(), StatusCode::OK);
    assert_eq!(json_body(accepted).await["status"], "accepted");
    assert_eq!(
        store.find(&id).unwrap().expect("stored").status,
        ApplicationStatus::Accepted
    );

    let templates: Vec<String> = notifier
        .events()
        .into_iter()
        .map(|notice| notice.template)
        .collect();
    assert_eq!(
        templates,
        vec!["interview_scheduled", "offer_extended", "offer_accepted"]
    );
}

#[tokio::test]
async fn accepted_applications_are_final() {
    let (service, _, _) = build();
    let router = application_router(service);

    let applied = router
        .clone()
        .oneshot(post("/api/v1/jobs/job-sre/applications", "u-cam", json!({})))
        .await
        .expect("apply");
    let application_id = json_body(applied).await["application_id"]
        .as_str()
        .expect("id")
        .to_string();

    for status in ["offered", "accepted", "reviewing"] {
        let response = router
            .clone()
            .oneshot(post(
                &format!("/api/v1/applications/{application_id}/status"),
                "u-hr",
                json!({ "status": status }),
            ))
            .await
            .expect("transition");
        let expected = if status == "reviewing" {
            StatusCode::CONFLICT
        } else {
            StatusCode::OK
        };
        assert_eq!(response.status(), expected, "moving to {status}");
    }
}

#[tokio::test]
async fn out_of_enum_status_is_refused() {
    let (service, _, _) = build();
    let router = application_router(service);

    let applied = router
        .clone()
        .oneshot(post("/api/v1/jobs/job-sre/applications", "u-cam", json!({})))
        .await
        .expect("apply");
    let application_id = json_body(applied).await["application_id"]
        .as_str()
        .expect("id")
        .to_string();

    let response = router
        .oneshot(post(
            &format!("/api/v1/applications/{application_id}/status"),
            "u-hr",
            json!({ "status": "hired" }),
        ))
        .await
        .expect("transition");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
