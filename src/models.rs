use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ModelError;

// --- Roles & Identity ---

/// Role
///
/// The closed set of profile roles. Persisted as lowercase text and parsed back
/// at the storage boundary, so comparisons are always by variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(ModelError::UnknownRole(other.to_string())),
        }
    }
}

/// Actor
///
/// The resolved domain identity behind a request: the profile row bound 1:1 to
/// an external identity (`user_id`, the token subject).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    /// External identity this profile belongs to. Unique across profiles.
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}

/// FileHandle
///
/// Opaque reference handed out by the file storage collaborator (an object key,
/// a path, ...). Stored and forwarded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileHandle(pub String);

impl FileHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FileHandle {
    fn from(s: &str) -> Self {
        FileHandle(s.to_string())
    }
}

// --- Entity Graph ---

/// Course
///
/// The root of the ownership graph. `author` counts as a teacher of the course
/// whether or not it also appears in `teachers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub author: Uuid,
    pub teachers: BTreeSet<Uuid>,
    pub students: BTreeSet<Uuid>,
}

impl Course {
    /// True for the author and for every listed teacher.
    pub fn is_taught_by(&self, actor_id: Uuid) -> bool {
        self.author == actor_id || self.teachers.contains(&actor_id)
    }

    pub fn is_enrolled(&self, actor_id: Uuid) -> bool {
        self.students.contains(&actor_id)
    }

    pub fn apply(&mut self, req: UpdateCourseRequest) {
        if let Some(title) = req.title {
            self.title = title;
        }
        if let Some(teachers) = req.teachers {
            self.teachers = teachers.into_iter().collect();
        }
        if let Some(students) = req.students {
            self.students = students.into_iter().collect();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: Uuid,
    pub topic: String,
    pub course: Uuid,
    pub file: Option<FileHandle>,
    /// The assignment text students answer with a `HomeworkSolution`.
    pub homework_text: Option<String>,
}

impl Lecture {
    pub fn apply(&mut self, req: UpdateLectureRequest) {
        if let Some(topic) = req.topic {
            self.topic = topic;
        }
        if let Some(course) = req.course {
            self.course = course;
        }
        if let Some(file) = req.file {
            self.file = Some(file);
        }
        if let Some(text) = req.homework_text {
            self.homework_text = Some(text);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeworkSolution {
    pub id: Uuid,
    pub author: Uuid,
    pub lecture: Uuid,
    pub solution_text: Option<String>,
    pub file: Option<FileHandle>,
}

impl HomeworkSolution {
    pub fn apply(&mut self, req: UpdateHomeworkRequest) {
        if let Some(text) = req.solution_text {
            self.solution_text = Some(text);
        }
        if let Some(file) = req.file {
            self.file = Some(file);
        }
    }
}

/// MarkValue
///
/// A grade on the 1..=5 scale. Out-of-range numbers fail to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct MarkValue(u8);

impl MarkValue {
    pub const MIN: i16 = 1;
    pub const MAX: i16 = 5;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i16> for MarkValue {
    type Error = ModelError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(MarkValue(value as u8))
        } else {
            Err(ModelError::InvalidMarkValue(value))
        }
    }
}

impl From<MarkValue> for i16 {
    fn from(value: MarkValue) -> Self {
        i16::from(value.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub id: Uuid,
    /// At most one mark exists per homework solution.
    pub homework: Uuid,
    pub value: MarkValue,
    pub checking_teacher: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub homework: Uuid,
    pub author: Uuid,
    pub text: String,
}

// --- Request Payloads ---
//
// Ownership fields (author, checking_teacher) are absent on purpose: a client
// value for them is dropped during deserialization and the field is filled in
// by `attribution`.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub user: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub teachers: Vec<Uuid>,
    #[serde(default)]
    pub students: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teachers: Option<Vec<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLectureRequest {
    pub topic: String,
    pub course: Uuid,
    #[serde(default)]
    pub file: Option<FileHandle>,
    #[serde(default)]
    pub homework_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLectureRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homework_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHomeworkRequest {
    pub lecture: Uuid,
    #[serde(default)]
    pub solution_text: Option<String>,
    #[serde(default)]
    pub file: Option<FileHandle>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHomeworkRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileHandle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMarkRequest {
    pub homework: Uuid,
    pub value: MarkValue,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMarkRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<MarkValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub homework: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
