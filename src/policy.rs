//! Action authorization rules.
//!
//! Every function here is a pure decision over already-loaded entities: callers
//! look the targets up (and apply the scope gate) first, then ask for a
//! `Decision`. Nothing in this module touches storage.

use std::fmt;
use uuid::Uuid;

use crate::{
    auth::Principal,
    error::{AuthzError, Resource},
    models::{Actor, Comment, Course, HomeworkSolution, Mark},
};

/// Action
///
/// The operation being authorized. Listing and retrieval are both `Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Decision
///
/// Allow/deny outcome for one (actor, action, object) triple. The deny reason is
/// a static, client-safe explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }

    fn require(condition: bool, reason: &'static str) -> Decision {
        if condition {
            Decision::Allow
        } else {
            Decision::Deny(reason)
        }
    }

    /// Converts the decision into the error taxonomy used by the operations layer.
    pub fn check(self, resource: Resource, action: Action) -> Result<(), AuthzError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => {
                tracing::debug!(%resource, %action, reason, "authorization denied");
                Err(AuthzError::Denied {
                    resource,
                    action,
                    reason,
                })
            }
        }
    }
}

// --- Profiles ---

/// A profile may only be created for the requesting identity. An empty probe
/// (no identity proposed yet) is let through to payload validation.
pub fn profile_create(principal: &Principal, proposed_user: Option<Uuid>) -> Decision {
    match proposed_user {
        None => Decision::Allow,
        Some(user) => Decision::require(
            user == principal.user_id,
            "profiles can only be created for the requesting identity",
        ),
    }
}

pub fn profile_change(actor: &Actor, profile: &Actor) -> Decision {
    Decision::require(
        profile.user_id == actor.user_id,
        "profiles can only be changed by their owner",
    )
}

// --- Courses ---

pub fn course_create(actor: &Actor) -> Decision {
    Decision::require(actor.is_teacher(), "only teachers can create courses")
}

/// Update and delete: teachers who author or teach the course.
pub fn course_change(actor: &Actor, course: &Course) -> Decision {
    Decision::require(
        actor.is_teacher() && course.is_taught_by(actor.id),
        "only the course author or its teachers can change it",
    )
}

// --- Lectures ---

/// `course` is the proposed parent; `None` is an empty pre-validation probe.
pub fn lecture_create(actor: &Actor, course: Option<&Course>) -> Decision {
    match course {
        None => Decision::Allow,
        Some(course) => Decision::require(
            actor.is_teacher() && course.is_taught_by(actor.id),
            "lectures can only be added by the course author or its teachers",
        ),
    }
}

/// `course` is the course currently owning the lecture.
pub fn lecture_change(actor: &Actor, course: &Course) -> Decision {
    Decision::require(
        actor.is_teacher() && course.is_taught_by(actor.id),
        "lectures can only be changed by the course author or its teachers",
    )
}

// --- Homework solutions ---

/// Teachers are read-only on solutions; this holds even for an empty probe.
pub fn homework_create(actor: &Actor) -> Decision {
    Decision::require(actor.is_student(), "only students can submit solutions")
}

pub fn homework_change(actor: &Actor, solution: &HomeworkSolution) -> Decision {
    Decision::require(
        actor.is_student() && solution.author == actor.id,
        "solutions can only be changed by the student who submitted them",
    )
}

// --- Marks ---

/// `course` is the course of the homework being graded.
pub fn mark_create(actor: &Actor, course: Option<&Course>) -> Decision {
    match course {
        None => Decision::Allow,
        Some(course) => Decision::require(
            course.is_taught_by(actor.id),
            "marks can only be given by the course author or its teachers",
        ),
    }
}

pub fn mark_change(actor: &Actor, mark: &Mark, course: &Course) -> Decision {
    Decision::require(
        actor.is_teacher() && (mark.checking_teacher == actor.id || course.is_taught_by(actor.id)),
        "marks can only be changed by the checking teacher or the course teachers",
    )
}

// --- Comments ---

pub fn comment_create(actor: &Actor, course: Option<&Course>) -> Decision {
    match course {
        None => Decision::Allow,
        Some(course) => Decision::require(
            course.is_taught_by(actor.id),
            "comments can only be left by the course author or its teachers",
        ),
    }
}

/// Author-only, whatever the actor's standing in the course.
pub fn comment_change(actor: &Actor, comment: &Comment) -> Decision {
    Decision::require(
        comment.author == actor.id,
        "comments can only be changed by their author",
    )
}
