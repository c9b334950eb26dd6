use serde::{Deserialize, Serialize};

use super::domain::CandidateId;

/// Identifier of an authenticated user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Role tag stored on every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Candidate,
    HrCoordinator,
    Interviewer,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::HrCoordinator => "hr_coordinator",
            Role::Interviewer => "interviewer",
        }
    }
}

/// Account record exposed by the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub is_admin: bool,
}

impl UserAccount {
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

/// The authenticated identity performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub identity: UserId,
    pub role: Role,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(identity: UserId, role: Role) -> Self {
        Self {
            identity,
            role,
            is_admin: false,
        }
    }

    pub fn admin(identity: UserId, role: Role) -> Self {
        Self {
            identity,
            role,
            is_admin: true,
        }
    }
}

impl From<&UserAccount> for Actor {
    fn from(account: &UserAccount) -> Self {
        Self {
            identity: account.id.clone(),
            role: account.role,
            is_admin: account.is_admin,
        }
    }
}

/// Authentication and account lookup collaborator.
///
/// Candidate profiles are provisioned when the account registers, so
/// `candidate_profile` never creates anything.
pub trait IdentityDirectory: Send + Sync {
    fn account(&self, id: &UserId) -> Result<Option<UserAccount>, DirectoryError>;
    fn candidate_profile(&self, user: &UserId) -> Result<Option<CandidateId>, DirectoryError>;

    /// Resolve the caller of the current request into an [`Actor`].
    fn current_actor(&self, id: &UserId) -> Result<Option<Actor>, DirectoryError> {
        Ok(self.account(id)?.as_ref().map(Actor::from))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("identity directory unavailable: {0}")]
    Unavailable(String),
}
