use uuid::Uuid;

use crate::models::{
    Actor, Comment, Course, CreateCommentRequest, CreateCourseRequest, CreateHomeworkRequest,
    CreateLectureRequest, CreateMarkRequest, HomeworkSolution, Lecture, Mark,
};

/// Attribute
///
/// Turns an authorized create payload into the entity to persist. Ownership
/// fields come from the acting profile only, and ids are generated here.
pub trait Attribute {
    type Entity;

    fn attribute(self, actor: &Actor) -> Self::Entity;
}

impl Attribute for CreateCourseRequest {
    type Entity = Course;

    fn attribute(self, actor: &Actor) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: self.title,
            author: actor.id,
            teachers: self.teachers.into_iter().collect(),
            students: self.students.into_iter().collect(),
        }
    }
}

// Lectures carry no ownership field; the course link is client-chosen and authorized.
impl Attribute for CreateLectureRequest {
    type Entity = Lecture;

    fn attribute(self, _actor: &Actor) -> Lecture {
        Lecture {
            id: Uuid::new_v4(),
            topic: self.topic,
            course: self.course,
            file: self.file,
            homework_text: self.homework_text,
        }
    }
}

impl Attribute for CreateHomeworkRequest {
    type Entity = HomeworkSolution;

    fn attribute(self, actor: &Actor) -> HomeworkSolution {
        HomeworkSolution {
            id: Uuid::new_v4(),
            author: actor.id,
            lecture: self.lecture,
            solution_text: self.solution_text,
            file: self.file,
        }
    }
}

impl Attribute for CreateMarkRequest {
    type Entity = Mark;

    fn attribute(self, actor: &Actor) -> Mark {
        Mark {
            id: Uuid::new_v4(),
            homework: self.homework,
            value: self.value,
            checking_teacher: actor.id,
        }
    }
}

impl Attribute for CreateCommentRequest {
    type Entity = Comment;

    fn attribute(self, actor: &Actor) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            homework: self.homework,
            author: actor.id,
            text: self.text,
        }
    }
}
