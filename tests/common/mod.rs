#![allow(dead_code)]

use course_acl::{
    AppConfig, AppState, MemoryRepository, handlers,
    repository::Repository,
    models::{
        Actor, Course, CreateCourseRequest, CreateHomeworkRequest, CreateLectureRequest,
        HomeworkSolution, Lecture, Role,
    },
};
use std::sync::Arc;
use uuid::Uuid;

// --- Fixture Builders ---

pub fn state() -> AppState {
    AppState {
        repo: Arc::new(MemoryRepository::new()),
        config: AppConfig::default(),
    }
}

pub fn actor(role: Role) -> Actor {
    Actor {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        role,
    }
}

pub async fn profile(state: &AppState, role: Role) -> Actor {
    state
        .repo
        .create_profile(actor(role))
        .await
        .expect("profile insert")
}

/// A populated course graph:
/// `author` owns `course`, `co_teacher` is listed as a teacher, `student` is
/// enrolled and has submitted `solution` for `lecture`. `outsider` is a teacher
/// and `stranger` a student with no relation to the course.
pub struct World {
    pub state: AppState,
    pub author: Actor,
    pub co_teacher: Actor,
    pub outsider: Actor,
    pub student: Actor,
    pub stranger: Actor,
    pub course: Course,
    pub lecture: Lecture,
    pub solution: HomeworkSolution,
}

impl World {
    pub async fn new() -> Self {
        let state = state();
        let author = profile(&state, Role::Teacher).await;
        let co_teacher = profile(&state, Role::Teacher).await;
        let outsider = profile(&state, Role::Teacher).await;
        let student = profile(&state, Role::Student).await;
        let stranger = profile(&state, Role::Student).await;

        let course = handlers::create_course(
            &state,
            &author,
            CreateCourseRequest {
                title: "Operating Systems".to_string(),
                teachers: vec![co_teacher.id],
                students: vec![student.id],
            },
        )
        .await
        .expect("course");

        let lecture = handlers::create_lecture(
            &state,
            &author,
            CreateLectureRequest {
                topic: "Scheduling".to_string(),
                course: course.id,
                file: None,
                homework_text: Some("Implement round robin".to_string()),
            },
        )
        .await
        .expect("lecture");

        let solution = handlers::create_homework(
            &state,
            &student,
            CreateHomeworkRequest {
                lecture: lecture.id,
                solution_text: Some("see attached".to_string()),
                file: None,
            },
        )
        .await
        .expect("solution");

        World {
            state,
            author,
            co_teacher,
            outsider,
            student,
            stranger,
            course,
            lecture,
            solution,
        }
    }
}
