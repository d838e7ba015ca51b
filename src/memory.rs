use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{Resource, StoreError},
    models::{Actor, Comment, Course, HomeworkSolution, Lecture, Mark},
    repository::Repository,
    scope::{CourseScope, SolutionScope},
};

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Actor>,
    courses: HashMap<Uuid, Course>,
    lectures: HashMap<Uuid, Lecture>,
    homeworks: HashMap<Uuid, HomeworkSolution>,
    marks: HashMap<Uuid, Mark>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn course_of_solution(&self, solution: &HomeworkSolution) -> Option<&Course> {
        self.lectures
            .get(&solution.lecture)
            .and_then(|lecture| self.courses.get(&lecture.course))
    }

    fn solution_admitted(&self, scope: SolutionScope, solution: &HomeworkSolution) -> bool {
        self.course_of_solution(solution)
            .is_some_and(|course| scope.admits(solution, course))
    }

    fn solution_admitted_by_id(&self, scope: SolutionScope, id: Uuid) -> bool {
        self.homeworks
            .get(&id)
            .is_some_and(|solution| self.solution_admitted(scope, solution))
    }

    /// Every listed teacher and student must be an existing profile.
    fn check_members(&self, course: &Course) -> Result<(), StoreError> {
        match course
            .teachers
            .iter()
            .chain(&course.students)
            .find(|id| !self.profiles.contains_key(id))
        {
            Some(id) => Err(not_found(Resource::Profile, *id)),
            None => Ok(()),
        }
    }

    // --- cascades ---

    fn remove_homework(&mut self, id: Uuid) -> bool {
        if self.homeworks.remove(&id).is_none() {
            return false;
        }
        self.marks.retain(|_, mark| mark.homework != id);
        self.comments.retain(|_, comment| comment.homework != id);
        true
    }

    fn remove_lecture(&mut self, id: Uuid) -> bool {
        if self.lectures.remove(&id).is_none() {
            return false;
        }
        let orphaned: Vec<Uuid> = self
            .homeworks
            .values()
            .filter(|solution| solution.lecture == id)
            .map(|solution| solution.id)
            .collect();
        for solution in orphaned {
            self.remove_homework(solution);
        }
        true
    }

    fn remove_course(&mut self, id: Uuid) -> bool {
        if self.courses.remove(&id).is_none() {
            return false;
        }
        let orphaned: Vec<Uuid> = self
            .lectures
            .values()
            .filter(|lecture| lecture.course == id)
            .map(|lecture| lecture.id)
            .collect();
        for lecture in orphaned {
            self.remove_lecture(lecture);
        }
        true
    }

    fn remove_profile(&mut self, id: Uuid) -> bool {
        if self.profiles.remove(&id).is_none() {
            return false;
        }
        let authored: Vec<Uuid> = self
            .courses
            .values()
            .filter(|course| course.author == id)
            .map(|course| course.id)
            .collect();
        for course in authored {
            self.remove_course(course);
        }
        for course in self.courses.values_mut() {
            course.teachers.remove(&id);
            course.students.remove(&id);
        }
        let submitted: Vec<Uuid> = self
            .homeworks
            .values()
            .filter(|solution| solution.author == id)
            .map(|solution| solution.id)
            .collect();
        for solution in submitted {
            self.remove_homework(solution);
        }
        self.marks.retain(|_, mark| mark.checking_teacher != id);
        self.comments.retain(|_, comment| comment.author != id);
        true
    }
}

fn not_found(resource: Resource, id: Uuid) -> StoreError {
    StoreError::NotFound { resource, id }
}

fn fetch<T: Clone>(
    table: &HashMap<Uuid, T>,
    resource: Resource,
    id: Uuid,
) -> Result<T, StoreError> {
    table.get(&id).cloned().ok_or(not_found(resource, id))
}

fn replace<T>(
    table: &mut HashMap<Uuid, T>,
    resource: Resource,
    id: Uuid,
    value: T,
) -> Result<(), StoreError> {
    match table.get_mut(&id) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(not_found(resource, id)),
    }
}

fn insert<T>(
    table: &mut HashMap<Uuid, T>,
    resource: Resource,
    id: Uuid,
    value: T,
) -> Result<(), StoreError> {
    if table.contains_key(&id) {
        return Err(StoreError::Conflict {
            resource,
            reason: "id already taken",
        });
    }
    table.insert(id, value);
    Ok(())
}

fn removed(found: bool, resource: Resource, id: Uuid) -> Result<(), StoreError> {
    if found {
        tracing::debug!(%resource, %id, "removed with dependants");
        Ok(())
    } else {
        Err(not_found(resource, id))
    }
}

/// MemoryRepository
///
/// A `Repository` kept entirely in process memory. It enforces the same
/// structural invariants as the Postgres schema (unique profile per identity,
/// unique mark per solution, parent existence on insert, cascading deletes), so
/// it can stand in for the database in tests and single-process deployments.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    // --- PROFILES ---

    async fn get_profile(&self, id: Uuid) -> Result<Actor, StoreError> {
        fetch(&self.tables.read().await.profiles, Resource::Profile, id)
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<Actor>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .find(|profile| profile.user_id == user_id)
            .cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<Actor>, StoreError> {
        Ok(self.tables.read().await.profiles.values().cloned().collect())
    }

    async fn create_profile(&self, profile: Actor) -> Result<Actor, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .profiles
            .values()
            .any(|existing| existing.user_id == profile.user_id)
        {
            return Err(StoreError::Conflict {
                resource: Resource::Profile,
                reason: "identity already has a profile",
            });
        }
        insert(&mut tables.profiles, Resource::Profile, profile.id, profile.clone())?;
        Ok(profile)
    }

    async fn update_profile(&self, profile: Actor) -> Result<Actor, StoreError> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.profiles, Resource::Profile, profile.id, profile.clone())?;
        Ok(profile)
    }

    async fn delete_profile(&self, id: Uuid) -> Result<(), StoreError> {
        let found = self.tables.write().await.remove_profile(id);
        removed(found, Resource::Profile, id)
    }

    // --- COURSES ---

    async fn get_course(&self, id: Uuid) -> Result<Course, StoreError> {
        fetch(&self.tables.read().await.courses, Resource::Course, id)
    }

    async fn list_courses(&self, scope: CourseScope) -> Result<Vec<Course>, StoreError> {
        let tables = self.tables.read().await;
        let mut courses: Vec<Course> = tables
            .courses
            .values()
            .filter(|course| scope.admits(course))
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(courses)
    }

    async fn create_course(&self, course: Course) -> Result<Course, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.profiles.contains_key(&course.author) {
            return Err(not_found(Resource::Profile, course.author));
        }
        tables.check_members(&course)?;
        insert(&mut tables.courses, Resource::Course, course.id, course.clone())?;
        Ok(course)
    }

    async fn update_course(&self, course: Course) -> Result<Course, StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_members(&course)?;
        replace(&mut tables.courses, Resource::Course, course.id, course.clone())?;
        Ok(course)
    }

    async fn delete_course(&self, id: Uuid) -> Result<(), StoreError> {
        let found = self.tables.write().await.remove_course(id);
        removed(found, Resource::Course, id)
    }

    // --- LECTURES ---

    async fn get_lecture(&self, id: Uuid) -> Result<Lecture, StoreError> {
        fetch(&self.tables.read().await.lectures, Resource::Lecture, id)
    }

    async fn list_lectures(&self, scope: CourseScope) -> Result<Vec<Lecture>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .lectures
            .values()
            .filter(|lecture| {
                tables
                    .courses
                    .get(&lecture.course)
                    .is_some_and(|course| scope.admits(course))
            })
            .cloned()
            .collect())
    }

    async fn create_lecture(&self, lecture: Lecture) -> Result<Lecture, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.courses.contains_key(&lecture.course) {
            return Err(not_found(Resource::Course, lecture.course));
        }
        insert(&mut tables.lectures, Resource::Lecture, lecture.id, lecture.clone())?;
        Ok(lecture)
    }

    async fn update_lecture(&self, lecture: Lecture) -> Result<Lecture, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.courses.contains_key(&lecture.course) {
            return Err(not_found(Resource::Course, lecture.course));
        }
        replace(&mut tables.lectures, Resource::Lecture, lecture.id, lecture.clone())?;
        Ok(lecture)
    }

    async fn delete_lecture(&self, id: Uuid) -> Result<(), StoreError> {
        let found = self.tables.write().await.remove_lecture(id);
        removed(found, Resource::Lecture, id)
    }

    // --- HOMEWORK SOLUTIONS ---

    async fn get_homework(&self, id: Uuid) -> Result<HomeworkSolution, StoreError> {
        fetch(&self.tables.read().await.homeworks, Resource::Homework, id)
    }

    async fn list_homeworks(
        &self,
        scope: SolutionScope,
    ) -> Result<Vec<HomeworkSolution>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .homeworks
            .values()
            .filter(|solution| tables.solution_admitted(scope, solution))
            .cloned()
            .collect())
    }

    async fn create_homework(
        &self,
        solution: HomeworkSolution,
    ) -> Result<HomeworkSolution, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.lectures.contains_key(&solution.lecture) {
            return Err(not_found(Resource::Lecture, solution.lecture));
        }
        insert(&mut tables.homeworks, Resource::Homework, solution.id, solution.clone())?;
        Ok(solution)
    }

    async fn update_homework(
        &self,
        solution: HomeworkSolution,
    ) -> Result<HomeworkSolution, StoreError> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.homeworks, Resource::Homework, solution.id, solution.clone())?;
        Ok(solution)
    }

    async fn delete_homework(&self, id: Uuid) -> Result<(), StoreError> {
        let found = self.tables.write().await.remove_homework(id);
        removed(found, Resource::Homework, id)
    }

    // --- MARKS ---

    async fn get_mark(&self, id: Uuid) -> Result<Mark, StoreError> {
        fetch(&self.tables.read().await.marks, Resource::Mark, id)
    }

    async fn list_marks(&self, scope: SolutionScope) -> Result<Vec<Mark>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .marks
            .values()
            .filter(|mark| tables.solution_admitted_by_id(scope, mark.homework))
            .cloned()
            .collect())
    }

    async fn create_mark(&self, mark: Mark) -> Result<Mark, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.homeworks.contains_key(&mark.homework) {
            return Err(not_found(Resource::Homework, mark.homework));
        }
        if tables.marks.values().any(|existing| existing.homework == mark.homework) {
            return Err(StoreError::Conflict {
                resource: Resource::Mark,
                reason: "homework solution already has a mark",
            });
        }
        insert(&mut tables.marks, Resource::Mark, mark.id, mark.clone())?;
        Ok(mark)
    }

    async fn update_mark(&self, mark: Mark) -> Result<Mark, StoreError> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.marks, Resource::Mark, mark.id, mark.clone())?;
        Ok(mark)
    }

    async fn delete_mark(&self, id: Uuid) -> Result<(), StoreError> {
        let found = self.tables.write().await.marks.remove(&id).is_some();
        removed(found, Resource::Mark, id)
    }

    // --- COMMENTS ---

    async fn get_comment(&self, id: Uuid) -> Result<Comment, StoreError> {
        fetch(&self.tables.read().await.comments, Resource::Comment, id)
    }

    async fn list_comments(&self, scope: SolutionScope) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|comment| tables.solution_admitted_by_id(scope, comment.homework))
            .cloned()
            .collect())
    }

    async fn create_comment(&self, comment: Comment) -> Result<Comment, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.homeworks.contains_key(&comment.homework) {
            return Err(not_found(Resource::Homework, comment.homework));
        }
        insert(&mut tables.comments, Resource::Comment, comment.id, comment.clone())?;
        Ok(comment)
    }

    async fn update_comment(&self, comment: Comment) -> Result<Comment, StoreError> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.comments, Resource::Comment, comment.id, comment.clone())?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<(), StoreError> {
        let found = self.tables.write().await.comments.remove(&id).is_some();
        removed(found, Resource::Comment, id)
    }
}
