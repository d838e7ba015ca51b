mod common;

use common::actor;
use course_acl::{
    auth::Principal,
    models::{Actor, Comment, Course, HomeworkSolution, Mark, MarkValue, Role},
    policy::{self, Decision},
};
use std::collections::BTreeSet;
use uuid::Uuid;

fn course(author: &Actor, teachers: &[&Actor], students: &[&Actor]) -> Course {
    Course {
        id: Uuid::new_v4(),
        title: "Databases".to_string(),
        author: author.id,
        teachers: teachers.iter().map(|a| a.id).collect::<BTreeSet<_>>(),
        students: students.iter().map(|a| a.id).collect::<BTreeSet<_>>(),
    }
}

#[test]
fn test_course_rules() {
    let author = actor(Role::Teacher);
    let listed = actor(Role::Teacher);
    let other = actor(Role::Teacher);
    let student = actor(Role::Student);
    let c = course(&author, &[&listed], &[&student]);

    assert!(policy::course_create(&other).is_allowed());
    assert!(!policy::course_create(&student).is_allowed());

    assert!(policy::course_change(&author, &c).is_allowed());
    assert!(policy::course_change(&listed, &c).is_allowed());
    assert!(!policy::course_change(&other, &c).is_allowed());
    assert!(!policy::course_change(&student, &c).is_allowed());
}

#[test]
fn test_author_counts_as_teacher_without_listing() {
    let author = actor(Role::Teacher);
    let c = course(&author, &[], &[]);
    assert!(c.teachers.is_empty());

    assert!(policy::lecture_create(&author, Some(&c)).is_allowed());
    assert!(policy::lecture_change(&author, &c).is_allowed());
    assert!(policy::mark_create(&author, Some(&c)).is_allowed());
    assert!(policy::comment_create(&author, Some(&c)).is_allowed());
}

#[test]
fn test_student_listed_as_teacher_still_cannot_change_course() {
    let author = actor(Role::Teacher);
    let student = actor(Role::Student);
    let c = course(&author, &[&student], &[]);

    assert!(!policy::course_change(&student, &c).is_allowed());
    assert!(!policy::lecture_change(&student, &c).is_allowed());
}

#[test]
fn test_empty_probes_are_allowed_for_linked_resources() {
    let student = actor(Role::Student);
    assert_eq!(policy::lecture_create(&student, None), Decision::Allow);
    assert_eq!(policy::mark_create(&student, None), Decision::Allow);
    assert_eq!(policy::comment_create(&student, None), Decision::Allow);
    assert_eq!(
        policy::profile_create(&Principal { user_id: Uuid::new_v4() }, None),
        Decision::Allow
    );
}

#[test]
fn test_homework_rules() {
    let student = actor(Role::Student);
    let other = actor(Role::Student);
    let teacher = actor(Role::Teacher);
    let solution = HomeworkSolution {
        id: Uuid::new_v4(),
        author: student.id,
        lecture: Uuid::new_v4(),
        solution_text: None,
        file: None,
    };

    assert!(policy::homework_create(&student).is_allowed());
    assert!(matches!(policy::homework_create(&teacher), Decision::Deny(_)));

    assert!(policy::homework_change(&student, &solution).is_allowed());
    assert!(!policy::homework_change(&other, &solution).is_allowed());
    assert!(!policy::homework_change(&teacher, &solution).is_allowed());
}

#[test]
fn test_mark_change_allows_checking_teacher_or_course_teacher() {
    let author = actor(Role::Teacher);
    let checker = actor(Role::Teacher);
    let stranger = actor(Role::Teacher);
    let student = actor(Role::Student);
    let c = course(&author, &[], &[&student]);
    let mark = Mark {
        id: Uuid::new_v4(),
        homework: Uuid::new_v4(),
        value: MarkValue::try_from(3i16).unwrap(),
        checking_teacher: checker.id,
    };

    assert!(policy::mark_change(&author, &mark, &c).is_allowed());
    assert!(policy::mark_change(&checker, &mark, &c).is_allowed());
    assert!(!policy::mark_change(&stranger, &mark, &c).is_allowed());
    assert!(!policy::mark_change(&student, &mark, &c).is_allowed());
}

#[test]
fn test_comment_change_is_author_only() {
    let author = actor(Role::Teacher);
    let writer = actor(Role::Teacher);
    let comment = Comment {
        id: Uuid::new_v4(),
        homework: Uuid::new_v4(),
        author: writer.id,
        text: "ok".to_string(),
    };

    assert!(policy::comment_change(&writer, &comment).is_allowed());
    assert!(!policy::comment_change(&author, &comment).is_allowed());
}

#[test]
fn test_profile_rules() {
    let me = actor(Role::Student);
    let principal = Principal { user_id: me.user_id };

    assert!(policy::profile_create(&principal, Some(me.user_id)).is_allowed());
    assert!(!policy::profile_create(&principal, Some(Uuid::new_v4())).is_allowed());

    let other = actor(Role::Teacher);
    assert!(policy::profile_change(&me, &me).is_allowed());
    assert!(!policy::profile_change(&other, &me).is_allowed());
}
