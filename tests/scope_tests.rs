mod common;

use common::World;
use course_acl::{
    handlers,
    models::{CreateCourseRequest, CreateHomeworkRequest, CreateLectureRequest, Role},
    scope::{self, CourseScope, SolutionScope, Visibility},
};

#[test]
fn test_scope_selection_by_role() {
    let teacher = common::actor(Role::Teacher);
    let student = common::actor(Role::Student);

    assert_eq!(scope::courses(&student), CourseScope::All);
    assert_eq!(scope::lectures(&teacher), CourseScope::Taught(teacher.id));
    assert_eq!(scope::lectures(&student), CourseScope::Enrolled(student.id));
    assert_eq!(
        scope::homeworks(&teacher),
        SolutionScope::Course(CourseScope::Taught(teacher.id))
    );
    assert_eq!(scope::homeworks(&student), SolutionScope::Submitted(student.id));
    assert_eq!(scope::marks(&student), scope::homeworks(&student));
    assert_eq!(scope::comments(&teacher), scope::homeworks(&teacher));
}

#[tokio::test]
async fn test_object_visibility_matches_listing() {
    let w = World::new().await;

    for actor in [&w.author, &w.co_teacher, &w.outsider, &w.student, &w.stranger] {
        let listed = handlers::list_homeworks(&w.state, actor)
            .await
            .unwrap()
            .iter()
            .any(|s| s.id == w.solution.id);
        let visible = scope::homework_visibility(actor, &w.solution, &w.course).is_visible();
        assert_eq!(listed, visible, "listing and lookup disagree for {:?}", actor.role);
    }

    assert_eq!(scope::lecture_visibility(&w.stranger, &w.course), Visibility::Hidden);
    assert_eq!(scope::lecture_visibility(&w.student, &w.course), Visibility::Visible);
}

#[tokio::test]
async fn test_teacher_listing_excludes_other_courses() {
    let w = World::new().await;

    // A second, unrelated course with its own student and solution.
    let other_course = handlers::create_course(
        &w.state,
        &w.outsider,
        CreateCourseRequest {
            title: "Cryptography".to_string(),
            teachers: vec![],
            students: vec![w.stranger.id],
        },
    )
    .await
    .unwrap();
    let other_lecture = handlers::create_lecture(
        &w.state,
        &w.outsider,
        CreateLectureRequest {
            topic: "RSA".to_string(),
            course: other_course.id,
            file: None,
            homework_text: None,
        },
    )
    .await
    .unwrap();
    let other_solution = handlers::create_homework(
        &w.state,
        &w.stranger,
        CreateHomeworkRequest {
            lecture: other_lecture.id,
            solution_text: None,
            file: None,
        },
    )
    .await
    .unwrap();

    let lectures = handlers::list_lectures(&w.state, &w.author).await.unwrap();
    assert_eq!(lectures, vec![w.lecture.clone()]);

    let solutions = handlers::list_homeworks(&w.state, &w.co_teacher).await.unwrap();
    assert_eq!(solutions, vec![w.solution.clone()]);

    let solutions = handlers::list_homeworks(&w.state, &w.outsider).await.unwrap();
    assert_eq!(solutions, vec![other_solution.clone()]);

    let lectures = handlers::list_lectures(&w.state, &w.stranger).await.unwrap();
    assert_eq!(lectures, vec![other_lecture]);
}
