use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::policy::Action;

/// Resource
///
/// The resource families guarded by this crate. Carried by every error so that a
/// caller can tell *what* was missing or refused without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Profile,
    Course,
    Lecture,
    Homework,
    Mark,
    Comment,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Profile => "profile",
            Resource::Course => "course",
            Resource::Lecture => "lecture",
            Resource::Homework => "homework solution",
            Resource::Mark => "mark",
            Resource::Comment => "comment",
        };
        f.write_str(name)
    }
}

/// StoreError
///
/// Failures reported by a `Repository` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{resource} {id} does not exist")]
    NotFound { resource: Resource, id: Uuid },
    #[error("{resource} conflict: {reason}")]
    Conflict {
        resource: Resource,
        reason: &'static str,
    },
    #[error(transparent)]
    Database(sqlx::Error),
}

/// Every unexpected database failure passes through here and is logged once.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("database error: {:?}", err);
        StoreError::Database(err)
    }
}

/// AuthzError
///
/// The request-level outcome of a rejected operation. `NotFound` and `Denied`
/// are deliberately separate variants: the first means the target does not
/// exist for this actor, the second that it exists and the rule refused.
#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("request carries no valid credentials")]
    Unauthenticated,
    #[error("{resource} {id} not found")]
    NotFound { resource: Resource, id: Uuid },
    #[error("{action} on {resource} denied: {reason}")]
    Denied {
        resource: Resource,
        action: Action,
        reason: &'static str,
    },
    #[error("{resource} conflict: {reason}")]
    Conflict {
        resource: Resource,
        reason: &'static str,
    },
    #[error(transparent)]
    Storage(sqlx::Error),
}

impl AuthzError {
    pub fn not_found(resource: Resource, id: Uuid) -> Self {
        AuthzError::NotFound { resource, id }
    }
}

impl From<StoreError> for AuthzError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { resource, id } => AuthzError::NotFound { resource, id },
            StoreError::Conflict { resource, reason } => AuthzError::Conflict { resource, reason },
            StoreError::Database(e) => AuthzError::Storage(e),
        }
    }
}

/// Domain value errors raised while parsing roles and mark values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    #[error("mark value {0} is outside 1..=5")]
    InvalidMarkValue(i16),
}
