//! Row-level visibility.
//!
//! Each resource type gets a scope value computed from the actor. The same value
//! answers "is this row visible?" here and is translated into a query filter by
//! the storage layer, so listing and object lookups can never disagree.

use uuid::Uuid;

use crate::models::{Actor, Course, HomeworkSolution, Role};

/// Visibility
///
/// Outcome of a scope check. `Hidden` rows are unreachable and reported as
/// not found by the operations layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }
}

/// CourseScope
///
/// Filter over courses, used for lectures (a lecture is visible when its course is).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseScope {
    /// No row-level restriction.
    All,
    /// Courses the actor authored or is listed as teacher of.
    Taught(Uuid),
    /// Courses listing the actor among `students`.
    Enrolled(Uuid),
}

impl CourseScope {
    pub fn admits(&self, course: &Course) -> bool {
        match *self {
            CourseScope::All => true,
            CourseScope::Taught(actor) => course.is_taught_by(actor),
            CourseScope::Enrolled(actor) => course.is_enrolled(actor),
        }
    }
}

/// SolutionScope
///
/// Filter over homework solutions and the rows hanging off them (marks, comments).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionScope {
    /// Solutions submitted under a course admitted by the inner scope.
    Course(CourseScope),
    /// Solutions the actor submitted.
    Submitted(Uuid),
}

impl SolutionScope {
    /// `course` must be the course owning `solution`'s lecture.
    pub fn admits(&self, solution: &HomeworkSolution, course: &Course) -> bool {
        match self {
            SolutionScope::Course(scope) => scope.admits(course),
            SolutionScope::Submitted(actor) => solution.author == *actor,
        }
    }
}

// --- Per-resource scopes ---

pub fn courses(_actor: &Actor) -> CourseScope {
    CourseScope::All
}

pub fn lectures(actor: &Actor) -> CourseScope {
    match actor.role {
        Role::Teacher => CourseScope::Taught(actor.id),
        Role::Student => CourseScope::Enrolled(actor.id),
    }
}

pub fn homeworks(actor: &Actor) -> SolutionScope {
    match actor.role {
        Role::Teacher => SolutionScope::Course(CourseScope::Taught(actor.id)),
        Role::Student => SolutionScope::Submitted(actor.id),
    }
}

pub fn marks(actor: &Actor) -> SolutionScope {
    homeworks(actor)
}

pub fn comments(actor: &Actor) -> SolutionScope {
    homeworks(actor)
}

// --- Object-level predicates ---

pub fn lecture_visibility(actor: &Actor, course: &Course) -> Visibility {
    lectures(actor).admits(course).into()
}

pub fn homework_visibility(
    actor: &Actor,
    solution: &HomeworkSolution,
    course: &Course,
) -> Visibility {
    homeworks(actor).admits(solution, course).into()
}

pub fn mark_visibility(actor: &Actor, solution: &HomeworkSolution, course: &Course) -> Visibility {
    marks(actor).admits(solution, course).into()
}

pub fn comment_visibility(
    actor: &Actor,
    solution: &HomeworkSolution,
    course: &Course,
) -> Visibility {
    comments(actor).admits(solution, course).into()
}
