use course_acl::{
    error::ModelError,
    models::{Course, Lecture, MarkValue, Role, UpdateCourseRequest, UpdateLectureRequest},
};
use std::collections::BTreeSet;
use uuid::Uuid;

// --- MarkValue ---

#[test]
fn test_mark_value_bounds() {
    for value in MarkValue::MIN..=MarkValue::MAX {
        assert_eq!(i16::from(MarkValue::try_from(value).unwrap()), value);
    }
    assert_eq!(MarkValue::try_from(0i16), Err(ModelError::InvalidMarkValue(0)));
    assert_eq!(MarkValue::try_from(6i16), Err(ModelError::InvalidMarkValue(6)));
}

#[test]
fn test_mark_value_rejected_at_deserialization() {
    assert!(serde_json::from_str::<MarkValue>("7").is_err());
    assert!(serde_json::from_str::<MarkValue>("-1").is_err());
    assert_eq!(serde_json::from_str::<MarkValue>("5").unwrap().get(), 5);
    assert_eq!(serde_json::to_string(&MarkValue::try_from(2i16).unwrap()).unwrap(), "2");
}

// --- Role ---

#[test]
fn test_role_round_trips_as_lowercase_text() {
    assert_eq!("teacher".parse::<Role>(), Ok(Role::Teacher));
    assert_eq!("student".parse::<Role>(), Ok(Role::Student));
    assert_eq!(
        "admin".parse::<Role>(),
        Err(ModelError::UnknownRole("admin".to_string()))
    );
    assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"teacher\"");
    assert!(serde_json::from_str::<Role>("\"Teacher\"").is_err());
}

// --- Partial updates ---

#[test]
fn test_course_apply_keeps_author_and_unset_fields() {
    let author = Uuid::new_v4();
    let student = Uuid::new_v4();
    let mut course = Course {
        id: Uuid::new_v4(),
        title: "Algorithms".to_string(),
        author,
        teachers: BTreeSet::new(),
        students: BTreeSet::from([student]),
    };

    let teacher = Uuid::new_v4();
    course.apply(UpdateCourseRequest {
        teachers: Some(vec![teacher, teacher]),
        ..Default::default()
    });

    assert_eq!(course.title, "Algorithms");
    assert_eq!(course.author, author);
    assert_eq!(course.teachers, BTreeSet::from([teacher]));
    assert_eq!(course.students, BTreeSet::from([student]));
}

#[test]
fn test_lecture_apply_only_touches_present_fields() {
    let course = Uuid::new_v4();
    let mut lecture = Lecture {
        id: Uuid::new_v4(),
        topic: "Heaps".to_string(),
        course,
        file: Some("slides/heaps.pdf".into()),
        homework_text: None,
    };

    let patch: UpdateLectureRequest =
        serde_json::from_value(serde_json::json!({ "homework_text": "Build a heap" })).unwrap();
    lecture.apply(patch);

    assert_eq!(lecture.topic, "Heaps");
    assert_eq!(lecture.course, course);
    assert_eq!(lecture.file.as_ref().map(|f| f.as_str()), Some("slides/heaps.pdf"));
    assert_eq!(lecture.homework_text.as_deref(), Some("Build a heap"));
}
