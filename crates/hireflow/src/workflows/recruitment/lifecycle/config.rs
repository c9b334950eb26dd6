use chrono::Duration;

/// Tunables for the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Days between an automatic interview assignment and its scheduled date.
    pub interview_lead_days: u32,
}

impl LifecycleConfig {
    pub const DEFAULT_INTERVIEW_LEAD_DAYS: u32 = 7;

    pub fn interview_lead_time(&self) -> Duration {
        Duration::days(i64::from(self.interview_lead_days))
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            interview_lead_days: Self::DEFAULT_INTERVIEW_LEAD_DAYS,
        }
    }
}
