use hireflow::error::AppError;
use hireflow::workflows::recruitment::{
    InMemoryDirectory, InMemoryNotifier, InMemoryRecruitmentStore, JobPostingId,
    JobPostingSnapshot, LifecycleConfig, LifecycleNotice, NotificationPublisher, NotifyError,
    RecruitmentService, Role, UserAccount, UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemoryRecruitmentService<N = InMemoryNotifier> =
    RecruitmentService<InMemoryRecruitmentStore, InMemoryDirectory, N>;

/// Emits each notice as a structured log event; nothing is retained.
#[derive(Debug, Default)]
pub(crate) struct TracingNotifier;

impl NotificationPublisher for TracingNotifier {
    fn publish(&self, notice: LifecycleNotice) -> Result<(), NotifyError> {
        info!(
            template = %notice.template,
            application_id = %notice.application_id.0,
            details = ?notice.details,
            "lifecycle notification"
        );
        Ok(())
    }
}

/// Wire the in-memory stores and directory with the given notifier.
pub(crate) fn build_service<N>(
    lifecycle: LifecycleConfig,
    directory_seed: Option<&Path>,
    notifier: Arc<N>,
) -> Result<Arc<MemoryRecruitmentService<N>>, AppError>
where
    N: NotificationPublisher + 'static,
{
    let accounts = match directory_seed {
        Some(path) => load_directory_seed(path)?,
        None => demo_accounts(),
    };

    let account_count = accounts.len();
    let jobs = demo_jobs();
    let job_count = jobs.len();

    let store = Arc::new(InMemoryRecruitmentStore::with_jobs(jobs));
    let directory = InMemoryDirectory::from_accounts(accounts)?;
    info!(
        accounts = account_count,
        jobs = job_count,
        "identity directory and job catalog seeded"
    );

    Ok(Arc::new(RecruitmentService::new(
        store,
        Arc::new(directory),
        notifier,
        lifecycle,
    )))
}

/// Read a JSON array of user accounts.
pub(crate) fn load_directory_seed(path: &Path) -> Result<Vec<UserAccount>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    parse_directory_seed(path, &raw)
}

pub(crate) fn parse_directory_seed(path: &Path, raw: &str) -> Result<Vec<UserAccount>, AppError> {
    serde_json::from_str(raw).map_err(|err| AppError::seed(path, err))
}

fn account(id: &str, username: &str, full_name: &str, role: Role) -> UserAccount {
    UserAccount {
        id: UserId(id.to_string()),
        username: username.to_string(),
        full_name: full_name.to_string(),
        role,
        is_admin: false,
    }
}

pub(crate) fn demo_accounts() -> Vec<UserAccount> {
    let mut admin = account("u-admin", "admin", "Site Administrator", Role::HrCoordinator);
    admin.is_admin = true;

    vec![
        account("u-casey", "casey", "Casey Nguyen", Role::Candidate),
        account("u-jordan", "jordan", "Jordan Blake", Role::Candidate),
        account("u-hana", "hana", "Hana Okafor", Role::HrCoordinator),
        account("u-ivan", "ivan", "Ivan Petrov", Role::Interviewer),
        admin,
    ]
}

pub(crate) fn demo_jobs() -> Vec<JobPostingSnapshot> {
    vec![
        JobPostingSnapshot {
            id: JobPostingId("job-backend".to_string()),
            title: "Backend Engineer".to_string(),
            is_active: true,
        },
        JobPostingSnapshot {
            id: JobPostingId("job-design".to_string()),
            title: "Product Designer".to_string(),
            is_active: true,
        },
        JobPostingSnapshot {
            id: JobPostingId("job-archived".to_string()),
            title: "Data Analyst".to_string(),
            is_active: false,
        },
    ]
}
