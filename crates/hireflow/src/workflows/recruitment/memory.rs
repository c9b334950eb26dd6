//! Process-local implementations of the store, directory, and notification contracts.
//!
//! A single mutex guards all application and interview records, so every
//! [`ChangeSet`] is validated and applied as one unit.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, RwLock};

use super::domain::{
    ApplicationId, ApplicationStatus, CandidateId, Interview, InterviewId, JobApplication,
    JobPostingId, JobPostingSnapshot,
};
use super::identity::{DirectoryError, IdentityDirectory, Role, UserAccount, UserId};
use super::lifecycle::InterviewChange;
use super::repository::{
    ApplicationRepository, ChangeSet, CommitReceipt, InterviewRepository, JobCatalog,
    LifecycleNotice, NotificationPublisher, NotifyError, RecruitmentStore, RepositoryError,
};

#[derive(Debug, Default)]
struct StoreState {
    applications: HashMap<ApplicationId, JobApplication>,
    interviews: HashMap<InterviewId, Interview>,
    jobs: HashMap<JobPostingId, JobPostingSnapshot>,
}

#[derive(Debug, Default)]
pub struct InMemoryRecruitmentStore {
    state: Mutex<StoreState>,
}

impl InMemoryRecruitmentStore {
    pub fn with_jobs(jobs: impl IntoIterator<Item = JobPostingSnapshot>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                jobs: jobs.into_iter().map(|job| (job.id.clone(), job)).collect(),
                ..StoreState::default()
            }),
        }
    }

    pub fn add_job(&self, job: JobPostingSnapshot) -> Result<(), RepositoryError> {
        self.lock()?.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    pub fn application_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.applications.len())
    }

    pub fn interview_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.interviews.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

fn newest_first(mut applications: Vec<JobApplication>) -> Vec<JobApplication> {
    applications.sort_by(|left, right| {
        right
            .applied_at
            .cmp(&left.applied_at)
            .then_with(|| right.id.cmp(&left.id))
    });
    applications
}

impl ApplicationRepository for InMemoryRecruitmentStore {
    fn find(&self, id: &ApplicationId) -> Result<Option<JobApplication>, RepositoryError> {
        Ok(self.lock()?.applications.get(id).cloned())
    }

    fn find_by_candidate_and_job(
        &self,
        candidate: &CandidateId,
        job: &JobPostingId,
    ) -> Result<Option<JobApplication>, RepositoryError> {
        Ok(self
            .lock()?
            .applications
            .values()
            .find(|application| &application.candidate == candidate && &application.job == job)
            .cloned())
    }

    fn list(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        let state = self.lock()?;
        let matching = state
            .applications
            .values()
            .filter(|application| status.map_or(true, |status| application.status == status))
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }

    fn list_for_candidate(
        &self,
        candidate: &CandidateId,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        let state = self.lock()?;
        let matching = state
            .applications
            .values()
            .filter(|application| &application.candidate == candidate)
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }
}

impl InterviewRepository for InMemoryRecruitmentStore {
    fn find_interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError> {
        Ok(self.lock()?.interviews.get(id).cloned())
    }

    fn find_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Vec<Interview>, RepositoryError> {
        let state = self.lock()?;
        let mut interviews: Vec<Interview> = state
            .interviews
            .values()
            .filter(|interview| &interview.application == application)
            .cloned()
            .collect();
        interviews.sort_by(|left, right| left.scheduled_date.cmp(&right.scheduled_date));
        Ok(interviews)
    }

    fn list_interviews(
        &self,
        interviewer: Option<&UserId>,
    ) -> Result<Vec<Interview>, RepositoryError> {
        let state = self.lock()?;
        let mut interviews: Vec<Interview> = state
            .interviews
            .values()
            .filter(|interview| {
                interviewer.map_or(true, |id| interview.interviewer.as_ref() == Some(id))
            })
            .cloned()
            .collect();
        interviews.sort_by(|left, right| {
            left.scheduled_date
                .cmp(&right.scheduled_date)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(interviews)
    }
}

impl JobCatalog for InMemoryRecruitmentStore {
    fn job(&self, id: &JobPostingId) -> Result<Option<JobPostingSnapshot>, RepositoryError> {
        Ok(self.lock()?.jobs.get(id).cloned())
    }
}

impl RecruitmentStore for InMemoryRecruitmentStore {
    fn commit(&self, changes: ChangeSet) -> Result<CommitReceipt, RepositoryError> {
        let mut state = self.lock()?;

        match changes {
            ChangeSet::Insert(mut application) => {
                let duplicate = state.applications.values().any(|existing| {
                    existing.candidate == application.candidate && existing.job == application.job
                });
                if duplicate || state.applications.contains_key(&application.id) {
                    return Err(RepositoryError::Conflict);
                }
                application.version = 1;
                state
                    .applications
                    .insert(application.id.clone(), application.clone());
                Ok(CommitReceipt {
                    application: Some(application),
                    ..CommitReceipt::default()
                })
            }
            ChangeSet::Update {
                application,
                interviews,
            } => {
                validate_update(&state, application.as_ref(), &interviews)?;

                let application = application.map(|mut application| {
                    application.version += 1;
                    state
                        .applications
                        .insert(application.id.clone(), application.clone());
                    application
                });

                let interviews = interviews
                    .into_iter()
                    .map(|change| {
                        let mut interview = match change {
                            InterviewChange::Create(mut interview) => {
                                interview.version = 0;
                                interview
                            }
                            InterviewChange::Update(interview) => interview,
                        };
                        interview.version += 1;
                        state
                            .interviews
                            .insert(interview.id.clone(), interview.clone());
                        interview
                    })
                    .collect();

                Ok(CommitReceipt {
                    application,
                    interviews,
                    interviews_removed: 0,
                })
            }
            ChangeSet::Delete {
                application,
                expected_version,
            } => {
                let stored = state
                    .applications
                    .get(&application)
                    .ok_or(RepositoryError::NotFound)?;
                if stored.version != expected_version {
                    return Err(RepositoryError::Stale);
                }

                state.applications.remove(&application);
                let before = state.interviews.len();
                state
                    .interviews
                    .retain(|_, interview| interview.application != application);
                let interviews_removed = before - state.interviews.len();

                Ok(CommitReceipt {
                    application: None,
                    interviews: Vec::new(),
                    interviews_removed,
                })
            }
        }
    }
}

fn validate_update(
    state: &StoreState,
    application: Option<&JobApplication>,
    interviews: &[InterviewChange],
) -> Result<(), RepositoryError> {
    if let Some(application) = application {
        let stored = state
            .applications
            .get(&application.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != application.version {
            return Err(RepositoryError::Stale);
        }
    }

    for change in interviews {
        match change {
            InterviewChange::Create(interview) => {
                if state.interviews.contains_key(&interview.id) {
                    return Err(RepositoryError::Conflict);
                }
                if !state.applications.contains_key(&interview.application) {
                    return Err(RepositoryError::NotFound);
                }
            }
            InterviewChange::Update(interview) => {
                let stored = state
                    .interviews
                    .get(&interview.id)
                    .ok_or(RepositoryError::NotFound)?;
                if stored.version != interview.version {
                    return Err(RepositoryError::Stale);
                }
            }
        }
    }

    Ok(())
}

/// Account directory with candidate profiles provisioned at registration time.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    accounts: RwLock<HashMap<UserId, UserAccount>>,
    profiles: RwLock<HashMap<UserId, CandidateId>>,
}

impl InMemoryDirectory {
    pub fn from_accounts(
        accounts: impl IntoIterator<Item = UserAccount>,
    ) -> Result<Self, DirectoryError> {
        let directory = Self::default();
        directory.register_all(accounts)?;
        Ok(directory)
    }

    /// Register every account, stopping at the first failure.
    pub fn register_all(
        &self,
        accounts: impl IntoIterator<Item = UserAccount>,
    ) -> Result<usize, DirectoryError> {
        let mut registered = 0;
        for account in accounts {
            self.register(account)?;
            registered += 1;
        }
        Ok(registered)
    }

    /// Store the account and, for candidates, provision the matching profile.
    pub fn register(&self, account: UserAccount) -> Result<Option<CandidateId>, DirectoryError> {
        let profile = match account.role {
            Role::Candidate => Some(CandidateId(format!("cand-{}", account.id.0))),
            Role::HrCoordinator | Role::Interviewer => None,
        };

        if let Some(profile) = &profile {
            self.profiles
                .write()
                .map_err(|_| poisoned())?
                .insert(account.id.clone(), profile.clone());
        }
        self.accounts
            .write()
            .map_err(|_| poisoned())?
            .insert(account.id.clone(), account);

        Ok(profile)
    }
}

fn poisoned() -> DirectoryError {
    DirectoryError::Unavailable("directory lock poisoned".to_string())
}

impl IdentityDirectory for InMemoryDirectory {
    fn account(&self, id: &UserId) -> Result<Option<UserAccount>, DirectoryError> {
        Ok(self
            .accounts
            .read()
            .map_err(|_| poisoned())?
            .get(id)
            .cloned())
    }

    fn candidate_profile(&self, user: &UserId) -> Result<Option<CandidateId>, DirectoryError> {
        Ok(self
            .profiles
            .read()
            .map_err(|_| poisoned())?
            .get(user)
            .cloned())
    }
}

/// Collects notices so callers can inspect what would have been sent.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    events: Mutex<Vec<LifecycleNotice>>,
}

impl InMemoryNotifier {
    pub fn events(&self) -> Vec<LifecycleNotice> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl NotificationPublisher for InMemoryNotifier {
    fn publish(&self, notice: LifecycleNotice) -> Result<(), NotifyError> {
        self.events
            .lock()
            .map_err(|_| NotifyError::Transport("notifier mutex poisoned".to_string()))?
            .push(notice);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn application(id: &str, candidate: &str, job: &str) -> JobApplication {
        JobApplication {
            id: ApplicationId(id.to_string()),
            job: JobPostingId(job.to_string()),
            candidate: CandidateId(candidate.to_string()),
            candidate_user: UserId(format!("user-{candidate}")),
            status: ApplicationStatus::Pending,
            cover_letter: None,
            notes: String::new(),
            applied_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            version: 0,
        }
    }

    fn interview(id: &str, application: &str, days: i64) -> Interview {
        Interview::scheduled(
            InterviewId(id.to_string()),
            ApplicationId(application.to_string()),
            UserId("hr-1".to_string()),
            Some(UserId("int-1".to_string())),
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap() + Duration::days(days),
        )
    }

    #[test]
    fn insert_enforces_one_application_per_candidate_and_job() {
        let store = InMemoryRecruitmentStore::default();
        store
            .commit(ChangeSet::Insert(application("app-1", "c1", "j1")))
            .expect("first insert");

        let duplicate = store.commit(ChangeSet::Insert(application("app-2", "c1", "j1")));
        assert!(matches!(duplicate, Err(RepositoryError::Conflict)));
        assert_eq!(store.application_count().unwrap(), 1);
    }

    #[test]
    fn stale_application_version_discards_whole_change_set() {
        let store = InMemoryRecruitmentStore::default();
        let receipt = store
            .commit(ChangeSet::Insert(application("app-1", "c1", "j1")))
            .expect("insert");
        let stored = receipt.application.expect("stored application");

        store
            .commit(ChangeSet::Update {
                application: Some(stored.with_status(ApplicationStatus::Reviewing)),
                interviews: Vec::new(),
            })
            .expect("first writer wins");

        let stale = store.commit(ChangeSet::Update {
            application: Some(stored.with_status(ApplicationStatus::Interview)),
            interviews: vec![InterviewChange::Create(interview("int-1", "app-1", 7))],
        });

        assert!(matches!(stale, Err(RepositoryError::Stale)));
        assert_eq!(store.interview_count().unwrap(), 0);
        let current = store
            .find(&ApplicationId("app-1".to_string()))
            .unwrap()
            .expect("present");
        assert_eq!(current.status, ApplicationStatus::Reviewing);
        assert_eq!(current.version, 2);
    }

    #[test]
    fn delete_cascades_to_interviews() {
        let store = InMemoryRecruitmentStore::default();
        store
            .commit(ChangeSet::Insert(application("app-1", "c1", "j1")))
            .expect("insert");
        store
            .commit(ChangeSet::Update {
                application: None,
                interviews: vec![
                    InterviewChange::Create(interview("int-1", "app-1", 7)),
                    InterviewChange::Create(interview("int-2", "app-1", 9)),
                ],
            })
            .expect("interviews created");

        let receipt = store
            .commit(ChangeSet::Delete {
                application: ApplicationId("app-1".to_string()),
                expected_version: 1,
            })
            .expect("delete succeeds");

        assert_eq!(receipt.interviews_removed, 2);
        assert_eq!(store.interview_count().unwrap(), 0);
    }

    #[test]
    fn most_recent_interview_uses_latest_scheduled_date() {
        let store = InMemoryRecruitmentStore::default();
        store
            .commit(ChangeSet::Insert(application("app-1", "c1", "j1")))
            .expect("insert");
        store
            .commit(ChangeSet::Update {
                application: None,
                interviews: vec![
                    InterviewChange::Create(interview("int-late", "app-1", 14)),
                    InterviewChange::Create(interview("int-early", "app-1", 3)),
                ],
            })
            .expect("interviews created");

        let latest = store
            .most_recent_by_application(&ApplicationId("app-1".to_string()))
            .unwrap()
            .expect("interview present");
        assert_eq!(latest.id.0, "int-late");
    }

    #[test]
    fn register_provisions_profiles_for_candidates_only() {
        let directory = InMemoryDirectory::default();
        let candidate = directory
            .register(UserAccount {
                id: UserId("u-1".to_string()),
                username: "casey".to_string(),
                full_name: "Casey Nguyen".to_string(),
                role: Role::Candidate,
                is_admin: false,
            })
            .unwrap();
        let staff = directory
            .register(UserAccount {
                id: UserId("u-2".to_string()),
                username: "morgan".to_string(),
                full_name: String::new(),
                role: Role::Interviewer,
                is_admin: false,
            })
            .unwrap();

        assert_eq!(candidate, Some(CandidateId("cand-u-1".to_string())));
        assert!(staff.is_none());
        assert!(directory
            .candidate_profile(&UserId("u-2".to_string()))
            .unwrap()
            .is_none());
    }

    fn staff(id: &str) -> UserAccount {
        UserAccount {
            id: UserId(id.to_string()),
            username: id.to_string(),
            full_name: String::new(),
            role: Role::HrCoordinator,
            is_admin: false,
        }
    }

    #[test]
    fn most_recent_interview_breaks_date_ties_by_id() {
        let store = InMemoryRecruitmentStore::default();
        store
            .commit(ChangeSet::Insert(application("app-1", "c1", "j1")))
            .expect("insert");
        store
            .commit(ChangeSet::Update {
                application: None,
                interviews: vec![
                    InterviewChange::Create(interview("int-b", "app-1", 5)),
                    InterviewChange::Create(interview("int-a", "app-1", 5)),
                    InterviewChange::Create(interview("int-c", "app-1", 5)),
                ],
            })
            .expect("interviews created");

        for _ in 0..5 {
            let latest = store
                .most_recent_by_application(&ApplicationId("app-1".to_string()))
                .unwrap()
                .expect("interview present");
            assert_eq!(latest.id.0, "int-c");
        }
    }

    #[test]
    fn with_jobs_seeds_the_catalog() {
        let store = InMemoryRecruitmentStore::with_jobs([JobPostingSnapshot {
            id: JobPostingId("job-1".to_string()),
            title: "Platform Engineer".to_string(),
            is_active: true,
        }]);

        let job = store
            .job(&JobPostingId("job-1".to_string()))
            .unwrap()
            .expect("seeded job");
        assert_eq!(job.title, "Platform Engineer");
    }

    #[test]
    fn from_accounts_loads_every_account() {
        let directory =
            InMemoryDirectory::from_accounts([staff("u-1"), staff("u-2")]).expect("directory");

        assert!(directory.account(&UserId("u-1".to_string())).unwrap().is_some());
        assert!(directory.account(&UserId("u-2".to_string())).unwrap().is_some());
    }

    #[test]
    fn register_all_surfaces_a_poisoned_directory() {
        let directory = InMemoryDirectory::default();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = directory.accounts.write().unwrap();
            panic!("writer died while holding the lock");
        }));

        let result = directory.register_all([staff("u-1"), staff("u-2")]);

        assert!(matches!(result, Err(DirectoryError::Unavailable(_))));
    }
}
