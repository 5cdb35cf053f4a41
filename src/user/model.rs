use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Subscriber,
}

impl Role {
    /// Administrators hold the moderation capabilities.
    pub fn can_moderate(&self) -> bool {
        matches!(self, Role::Administrator)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// The identity a request acts as. Always passed explicitly; handlers never
/// consult ambient state to find out who is calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User { id: u64, role: Role },
}

impl Caller {
    pub fn id(&self) -> Option<u64> {
        match self {
            Caller::Anonymous => None,
            Caller::User { id, .. } => Some(*id),
        }
    }

    pub fn is_administrator(&self) -> bool {
        matches!(self, Caller::User { role, .. } if role.can_moderate())
    }

    /// Whether this caller is the authenticated owner of the given author
    /// reference. Anonymous comments are owned by nobody.
    pub fn owns(&self, author_id: Option<u64>) -> bool {
        match (self.id(), author_id) {
            (Some(caller_id), Some(author_id)) => caller_id == author_id,
            _ => false,
        }
    }
}

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
}
