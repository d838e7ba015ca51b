//! Request operations.
//!
//! Each function is one client action: it receives the shared `AppState`, the
//! resolved `Actor` and a typed payload, and runs the pipeline
//! lookup → scope gate → authorization → attribution → persistence.
//! Objects outside the actor's scope are reported as `NotFound`; objects in
//! scope that fail a rule are reported as `Denied`.

use uuid::Uuid;

use crate::{
    AppState,
    attribution::Attribute,
    auth::Principal,
    error::{AuthzError, Resource},
    models::{
        Actor, Comment, Course, CreateCommentRequest, CreateCourseRequest, CreateHomeworkRequest,
        CreateLectureRequest, CreateMarkRequest, CreateProfileRequest, HomeworkSolution, Lecture,
        Mark, UpdateCommentRequest, UpdateCourseRequest, UpdateHomeworkRequest,
        UpdateLectureRequest, UpdateMarkRequest, UpdateProfileRequest,
    },
    policy::{self, Action},
    repository::Repository,
    scope::{self, Visibility},
};

// --- Lookup helpers ---

fn reveal<T>(
    visibility: Visibility,
    resource: Resource,
    id: Uuid,
    value: T,
) -> Result<T, AuthzError> {
    match visibility {
        Visibility::Visible => Ok(value),
        Visibility::Hidden => {
            tracing::debug!(%resource, %id, "target outside actor scope");
            Err(AuthzError::not_found(resource, id))
        }
    }
}

async fn course_of_homework(
    state: &AppState,
    solution: &HomeworkSolution,
) -> Result<Course, AuthzError> {
    let lecture = state.repo.get_lecture(solution.lecture).await?;
    Ok(state.repo.get_course(lecture.course).await?)
}

async fn visible_lecture(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
) -> Result<(Lecture, Course), AuthzError> {
    let lecture = state.repo.get_lecture(id).await?;
    let course = state.repo.get_course(lecture.course).await?;
    let visibility = scope::lecture_visibility(actor, &course);
    reveal(visibility, Resource::Lecture, id, (lecture, course))
}

async fn visible_homework(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
) -> Result<(HomeworkSolution, Course), AuthzError> {
    let solution = state.repo.get_homework(id).await?;
    let course = course_of_homework(state, &solution).await?;
    let visibility = scope::homework_visibility(actor, &solution, &course);
    reveal(visibility, Resource::Homework, id, (solution, course))
}

async fn visible_mark(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
) -> Result<(Mark, Course), AuthzError> {
    let mark = state.repo.get_mark(id).await?;
    let solution = state.repo.get_homework(mark.homework).await?;
    let course = course_of_homework(state, &solution).await?;
    let visibility = scope::mark_visibility(actor, &solution, &course);
    reveal(visibility, Resource::Mark, id, (mark, course))
}

async fn visible_comment(state: &AppState, actor: &Actor, id: Uuid) -> Result<Comment, AuthzError> {
    let comment = state.repo.get_comment(id).await?;
    let solution = state.repo.get_homework(comment.homework).await?;
    let course = course_of_homework(state, &solution).await?;
    let visibility = scope::comment_visibility(actor, &solution, &course);
    reveal(visibility, Resource::Comment, id, comment)
}

// --- Create probe ---

/// check_create
///
/// Decides whether `actor` may create a `resource` linked to `parent` (the
/// course of a lecture, the lecture of a solution, the solution of a mark or
/// comment, the identity of a profile). `parent: None` is the empty-payload
/// probe: linkage-dependent rules let it through and leave the verdict to
/// payload validation, role-only rules still apply.
///
/// A parent id that does not exist fails with `NotFound` before any rule runs.
pub async fn check_create(
    state: &AppState,
    actor: &Actor,
    resource: Resource,
    parent: Option<Uuid>,
) -> Result<(), AuthzError> {
    let decision = match resource {
        Resource::Profile => policy::profile_create(
            &Principal {
                user_id: actor.user_id,
            },
            parent,
        ),
        Resource::Course => policy::course_create(actor),
        Resource::Lecture => {
            let course = match parent {
                Some(id) => Some(state.repo.get_course(id).await?),
                None => None,
            };
            policy::lecture_create(actor, course.as_ref())
        }
        Resource::Homework => {
            if let Some(id) = parent {
                state.repo.get_lecture(id).await?;
            }
            policy::homework_create(actor)
        }
        Resource::Mark | Resource::Comment => {
            let course = match parent {
                Some(id) => {
                    let solution = state.repo.get_homework(id).await?;
                    Some(course_of_homework(state, &solution).await?)
                }
                None => None,
            };
            if resource == Resource::Mark {
                policy::mark_create(actor, course.as_ref())
            } else {
                policy::comment_create(actor, course.as_ref())
            }
        }
    };
    decision.check(resource, Action::Create)
}

// --- Profiles ---

pub async fn list_profiles(state: &AppState, _actor: &Actor) -> Result<Vec<Actor>, AuthzError> {
    Ok(state.repo.list_profiles().await?)
}

pub async fn get_profile(state: &AppState, _actor: &Actor, id: Uuid) -> Result<Actor, AuthzError> {
    Ok(state.repo.get_profile(id).await?)
}

/// create_profile
///
/// Provisions the profile for a freshly authenticated identity, so it works
/// from a `Principal` rather than an `Actor`.
pub async fn create_profile(
    state: &AppState,
    principal: &Principal,
    req: CreateProfileRequest,
) -> Result<Actor, AuthzError> {
    policy::profile_create(principal, Some(req.user)).check(Resource::Profile, Action::Create)?;

    let profile = Actor {
        id: Uuid::new_v4(),
        user_id: req.user,
        role: req.role,
    };
    let profile = state.repo.create_profile(profile).await?;
    tracing::info!(profile = %profile.id, role = %profile.role, "profile created");
    Ok(profile)
}

pub async fn update_profile(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    req: UpdateProfileRequest,
) -> Result<Actor, AuthzError> {
    let mut profile = state.repo.get_profile(id).await?;
    policy::profile_change(actor, &profile).check(Resource::Profile, Action::Update)?;

    if let Some(role) = req.role {
        profile.role = role;
    }
    Ok(state.repo.update_profile(profile).await?)
}

pub async fn delete_profile(state: &AppState, actor: &Actor, id: Uuid) -> Result<(), AuthzError> {
    let profile = state.repo.get_profile(id).await?;
    policy::profile_change(actor, &profile).check(Resource::Profile, Action::Delete)?;

    state.repo.delete_profile(id).await?;
    tracing::info!(profile = %id, "profile deleted");
    Ok(())
}

// --- Courses ---

pub async fn list_courses(state: &AppState, actor: &Actor) -> Result<Vec<Course>, AuthzError> {
    Ok(state.repo.list_courses(scope::courses(actor)).await?)
}

pub async fn get_course(state: &AppState, _actor: &Actor, id: Uuid) -> Result<Course, AuthzError> {
    Ok(state.repo.get_course(id).await?)
}

pub async fn create_course(
    state: &AppState,
    actor: &Actor,
    req: CreateCourseRequest,
) -> Result<Course, AuthzError> {
    check_create(state, actor, Resource::Course, None).await?;

    let course = state.repo.create_course(req.attribute(actor)).await?;
    tracing::info!(course = %course.id, author = %actor.id, "course created");
    Ok(course)
}

pub async fn update_course(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    req: UpdateCourseRequest,
) -> Result<Course, AuthzError> {
    let mut course = state.repo.get_course(id).await?;
    policy::course_change(actor, &course).check(Resource::Course, Action::Update)?;

    course.apply(req);
    Ok(state.repo.update_course(course).await?)
}

/// Removes the course together with its lectures, their solutions, and the
/// marks and comments on those solutions.
pub async fn delete_course(state: &AppState, actor: &Actor, id: Uuid) -> Result<(), AuthzError> {
    let course = state.repo.get_course(id).await?;
    policy::course_change(actor, &course).check(Resource::Course, Action::Delete)?;

    state.repo.delete_course(id).await?;
    tracing::info!(course = %id, by = %actor.id, "course deleted");
    Ok(())
}

// --- Lectures ---

pub async fn list_lectures(state: &AppState, actor: &Actor) -> Result<Vec<Lecture>, AuthzError> {
    Ok(state.repo.list_lectures(scope::lectures(actor)).await?)
}

pub async fn get_lecture(state: &AppState, actor: &Actor, id: Uuid) -> Result<Lecture, AuthzError> {
    let (lecture, _) = visible_lecture(state, actor, id).await?;
    Ok(lecture)
}

pub async fn create_lecture(
    state: &AppState,
    actor: &Actor,
    req: CreateLectureRequest,
) -> Result<Lecture, AuthzError> {
    check_create(state, actor, Resource::Lecture, Some(req.course)).await?;

    let lecture = state.repo.create_lecture(req.attribute(actor)).await?;
    tracing::info!(lecture = %lecture.id, course = %lecture.course, "lecture created");
    Ok(lecture)
}

/// Moving a lecture to another course also requires the create rule on the
/// destination course.
pub async fn update_lecture(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    req: UpdateLectureRequest,
) -> Result<Lecture, AuthzError> {
    let (mut lecture, course) = visible_lecture(state, actor, id).await?;
    policy::lecture_change(actor, &course).check(Resource::Lecture, Action::Update)?;

    if let Some(destination) = req.course.filter(|dest| *dest != lecture.course) {
        let destination = state.repo.get_course(destination).await?;
        policy::lecture_create(actor, Some(&destination))
            .check(Resource::Lecture, Action::Update)?;
    }

    lecture.apply(req);
    Ok(state.repo.update_lecture(lecture).await?)
}

pub async fn delete_lecture(state: &AppState, actor: &Actor, id: Uuid) -> Result<(), AuthzError> {
    let (_, course) = visible_lecture(state, actor, id).await?;
    policy::lecture_change(actor, &course).check(Resource::Lecture, Action::Delete)?;

    state.repo.delete_lecture(id).await?;
    tracing::info!(lecture = %id, by = %actor.id, "lecture deleted");
    Ok(())
}

// --- Homework solutions ---

pub async fn list_homeworks(
    state: &AppState,
    actor: &Actor,
) -> Result<Vec<HomeworkSolution>, AuthzError> {
    Ok(state.repo.list_homeworks(scope::homeworks(actor)).await?)
}

pub async fn get_homework(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
) -> Result<HomeworkSolution, AuthzError> {
    let (solution, _) = visible_homework(state, actor, id).await?;
    Ok(solution)
}

pub async fn create_homework(
    state: &AppState,
    actor: &Actor,
    req: CreateHomeworkRequest,
) -> Result<HomeworkSolution, AuthzError> {
    check_create(state, actor, Resource::Homework, Some(req.lecture)).await?;

    let solution = state.repo.create_homework(req.attribute(actor)).await?;
    tracing::info!(homework = %solution.id, lecture = %solution.lecture, "solution submitted");
    Ok(solution)
}

pub async fn update_homework(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    req: UpdateHomeworkRequest,
) -> Result<HomeworkSolution, AuthzError> {
    let (mut solution, _) = visible_homework(state, actor, id).await?;
    policy::homework_change(actor, &solution).check(Resource::Homework, Action::Update)?;

    solution.apply(req);
    Ok(state.repo.update_homework(solution).await?)
}

pub async fn delete_homework(state: &AppState, actor: &Actor, id: Uuid) -> Result<(), AuthzError> {
    let (solution, _) = visible_homework(state, actor, id).await?;
    policy::homework_change(actor, &solution).check(Resource::Homework, Action::Delete)?;

    state.repo.delete_homework(id).await?;
    tracing::info!(homework = %id, "solution withdrawn");
    Ok(())
}

// --- Marks ---

pub async fn list_marks(state: &AppState, actor: &Actor) -> Result<Vec<Mark>, AuthzError> {
    Ok(state.repo.list_marks(scope::marks(actor)).await?)
}

pub async fn get_mark(state: &AppState, actor: &Actor, id: Uuid) -> Result<Mark, AuthzError> {
    let (mark, _) = visible_mark(state, actor, id).await?;
    Ok(mark)
}

/// create_mark
///
/// A second mark for the same solution is rejected by storage with
/// `Conflict`, whoever asks.
pub async fn create_mark(
    state: &AppState,
    actor: &Actor,
    req: CreateMarkRequest,
) -> Result<Mark, AuthzError> {
    check_create(state, actor, Resource::Mark, Some(req.homework)).await?;

    let mark = state.repo.create_mark(req.attribute(actor)).await?;
    tracing::info!(
        mark = %mark.id,
        homework = %mark.homework,
        value = mark.value.get(),
        "mark given"
    );
    Ok(mark)
}

pub async fn update_mark(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    req: UpdateMarkRequest,
) -> Result<Mark, AuthzError> {
    let (mut mark, course) = visible_mark(state, actor, id).await?;
    policy::mark_change(actor, &mark, &course).check(Resource::Mark, Action::Update)?;

    if let Some(value) = req.value {
        mark.value = value;
    }
    Ok(state.repo.update_mark(mark).await?)
}

pub async fn delete_mark(state: &AppState, actor: &Actor, id: Uuid) -> Result<(), AuthzError> {
    let (mark, course) = visible_mark(state, actor, id).await?;
    policy::mark_change(actor, &mark, &course).check(Resource::Mark, Action::Delete)?;

    state.repo.delete_mark(id).await?;
    tracing::info!(mark = %id, by = %actor.id, "mark removed");
    Ok(())
}

// --- Comments ---

pub async fn list_comments(state: &AppState, actor: &Actor) -> Result<Vec<Comment>, AuthzError> {
    Ok(state.repo.list_comments(scope::comments(actor)).await?)
}

pub async fn get_comment(state: &AppState, actor: &Actor, id: Uuid) -> Result<Comment, AuthzError> {
    visible_comment(state, actor, id).await
}

pub async fn create_comment(
    state: &AppState,
    actor: &Actor,
    req: CreateCommentRequest,
) -> Result<Comment, AuthzError> {
    check_create(state, actor, Resource::Comment, Some(req.homework)).await?;

    let comment = state.repo.create_comment(req.attribute(actor)).await?;
    tracing::info!(comment = %comment.id, homework = %comment.homework, "comment added");
    Ok(comment)
}

pub async fn update_comment(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    req: UpdateCommentRequest,
) -> Result<Comment, AuthzError> {
    let mut comment = visible_comment(state, actor, id).await?;
    policy::comment_change(actor, &comment).check(Resource::Comment, Action::Update)?;

    if let Some(text) = req.text {
        comment.text = text;
    }
    Ok(state.repo.update_comment(comment).await?)
}

pub async fn delete_comment(state: &AppState, actor: &Actor, id: Uuid) -> Result<(), AuthzError> {
    let comment = visible_comment(state, actor, id).await?;
    policy::comment_change(actor, &comment).check(Resource::Comment, Action::Delete)?;

    state.repo.delete_comment(id).await?;
    tracing::info!(comment = %id, "comment deleted");
    Ok(())
}
