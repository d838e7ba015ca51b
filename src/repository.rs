use crate::{
    config::AppConfig,
    error::{ModelError, Resource, StoreError},
    models::{Actor, Comment, Course, FileHandle, HomeworkSolution, Lecture, Mark, MarkValue},
    scope::{CourseScope, SolutionScope},
};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, postgres::PgPoolOptions};
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The persistence contract the operations layer is written against. Lookups by
/// id fail with `StoreError::NotFound`; listing methods take the scope value
/// computed by `crate::scope` and must return exactly the rows it admits.
///
/// Implementations own the structural invariants: one mark per homework
/// solution, one profile per identity, and cascading deletes down the
/// course → lecture → solution → {mark, comment} graph.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Profiles ---
    async fn get_profile(&self, id: Uuid) -> Result<Actor, StoreError>;
    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<Actor>, StoreError>;
    async fn list_profiles(&self) -> Result<Vec<Actor>, StoreError>;
    async fn create_profile(&self, profile: Actor) -> Result<Actor, StoreError>;
    async fn update_profile(&self, profile: Actor) -> Result<Actor, StoreError>;
    async fn delete_profile(&self, id: Uuid) -> Result<(), StoreError>;

    // --- Courses ---
    async fn get_course(&self, id: Uuid) -> Result<Course, StoreError>;
    async fn list_courses(&self, scope: CourseScope) -> Result<Vec<Course>, StoreError>;
    async fn create_course(&self, course: Course) -> Result<Course, StoreError>;
    async fn update_course(&self, course: Course) -> Result<Course, StoreError>;
    async fn delete_course(&self, id: Uuid) -> Result<(), StoreError>;

    // --- Lectures ---
    async fn get_lecture(&self, id: Uuid) -> Result<Lecture, StoreError>;
    async fn list_lectures(&self, scope: CourseScope) -> Result<Vec<Lecture>, StoreError>;
    async fn create_lecture(&self, lecture: Lecture) -> Result<Lecture, StoreError>;
    async fn update_lecture(&self, lecture: Lecture) -> Result<Lecture, StoreError>;
    async fn delete_lecture(&self, id: Uuid) -> Result<(), StoreError>;

    // --- Homework solutions ---
    async fn get_homework(&self, id: Uuid) -> Result<HomeworkSolution, StoreError>;
    async fn list_homeworks(
        &self,
        scope: SolutionScope,
    ) -> Result<Vec<HomeworkSolution>, StoreError>;
    async fn create_homework(
        &self,
        solution: HomeworkSolution,
    ) -> Result<HomeworkSolution, StoreError>;
    async fn update_homework(
        &self,
        solution: HomeworkSolution,
    ) -> Result<HomeworkSolution, StoreError>;
    async fn delete_homework(&self, id: Uuid) -> Result<(), StoreError>;

    // --- Marks ---
    async fn get_mark(&self, id: Uuid) -> Result<Mark, StoreError>;
    async fn list_marks(&self, scope: SolutionScope) -> Result<Vec<Mark>, StoreError>;
    /// Fails with `StoreError::Conflict` when the homework already has a mark.
    async fn create_mark(&self, mark: Mark) -> Result<Mark, StoreError>;
    async fn update_mark(&self, mark: Mark) -> Result<Mark, StoreError>;
    async fn delete_mark(&self, id: Uuid) -> Result<(), StoreError>;

    // --- Comments ---
    async fn get_comment(&self, id: Uuid) -> Result<Comment, StoreError>;
    async fn list_comments(&self, scope: SolutionScope) -> Result<Vec<Comment>, StoreError>;
    async fn create_comment(&self, comment: Comment) -> Result<Comment, StoreError>;
    async fn update_comment(&self, comment: Comment) -> Result<Comment, StoreError>;
    async fn delete_comment(&self, id: Uuid) -> Result<(), StoreError>;
}

/// RepositoryState
///
/// The shared handle to whichever persistence backend the application runs on.
pub type RepositoryState = Arc<dyn Repository>;

// --- Row Mapping ---

#[derive(FromRow)]
struct ProfileRow {
    id: Uuid,
    user_id: Uuid,
    role: String,
}

#[derive(FromRow)]
struct CourseRow {
    id: Uuid,
    title: String,
    author_id: Uuid,
    teachers: Vec<Uuid>,
    students: Vec<Uuid>,
}

#[derive(FromRow)]
struct LectureRow {
    id: Uuid,
    topic: String,
    course_id: Uuid,
    file: Option<String>,
    homework_text: Option<String>,
}

#[derive(FromRow)]
struct HomeworkRow {
    id: Uuid,
    author_id: Uuid,
    lecture_id: Uuid,
    solution_text: Option<String>,
    file: Option<String>,
}

#[derive(FromRow)]
struct MarkRow {
    id: Uuid,
    homework_id: Uuid,
    value: i16,
    checking_teacher_id: Uuid,
}

#[derive(FromRow)]
struct CommentRow {
    id: Uuid,
    homework_id: Uuid,
    author_id: Uuid,
    text: String,
}

fn corrupt(err: ModelError) -> StoreError {
    StoreError::from(sqlx::Error::Decode(Box::new(err)))
}

impl TryFrom<ProfileRow> for Actor {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Actor {
            id: row.id,
            user_id: row.user_id,
            role: row.role.parse().map_err(corrupt)?,
        })
    }
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: row.id,
            title: row.title,
            author: row.author_id,
            teachers: row.teachers.into_iter().collect(),
            students: row.students.into_iter().collect(),
        }
    }
}

impl From<LectureRow> for Lecture {
    fn from(row: LectureRow) -> Self {
        Lecture {
            id: row.id,
            topic: row.topic,
            course: row.course_id,
            file: row.file.map(FileHandle),
            homework_text: row.homework_text,
        }
    }
}

impl From<HomeworkRow> for HomeworkSolution {
    fn from(row: HomeworkRow) -> Self {
        HomeworkSolution {
            id: row.id,
            author: row.author_id,
            lecture: row.lecture_id,
            solution_text: row.solution_text,
            file: row.file.map(FileHandle),
        }
    }
}

impl TryFrom<MarkRow> for Mark {
    type Error = StoreError;

    fn try_from(row: MarkRow) -> Result<Self, Self::Error> {
        Ok(Mark {
            id: row.id,
            homework: row.homework_id,
            value: MarkValue::try_from(row.value).map_err(corrupt)?,
            checking_teacher: row.checking_teacher_id,
        })
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            homework: row.homework_id,
            author: row.author_id,
            text: row.text,
        }
    }
}

// --- Query Fragments ---

const PROFILE_SELECT: &str = "SELECT id, user_id, role FROM profiles";

const COURSE_SELECT: &str = r#"
    SELECT c.id, c.title, c.author_id,
           ARRAY(SELECT ct.profile_id FROM course_teachers ct
                 WHERE ct.course_id = c.id) AS teachers,
           ARRAY(SELECT cs.profile_id FROM course_students cs
                 WHERE cs.course_id = c.id) AS students
    FROM courses c
"#;

const LECTURE_SELECT: &str = r#"
    SELECT l.id, l.topic, l.course_id, l.file, l.homework_text
    FROM lectures l
    JOIN courses c ON c.id = l.course_id
"#;

const HOMEWORK_SELECT: &str = r#"
    SELECT h.id, h.author_id, h.lecture_id, h.solution_text, h.file
    FROM homework_solutions h
    JOIN lectures l ON l.id = h.lecture_id
    JOIN courses c ON c.id = l.course_id
"#;

const MARK_SELECT: &str = r#"
    SELECT m.id, m.homework_id, m.value, m.checking_teacher_id
    FROM marks m
    JOIN homework_solutions h ON h.id = m.homework_id
    JOIN lectures l ON l.id = h.lecture_id
    JOIN courses c ON c.id = l.course_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT cm.id, cm.homework_id, cm.author_id, cm.text
    FROM comments cm
    JOIN homework_solutions h ON h.id = cm.homework_id
    JOIN lectures l ON l.id = h.lecture_id
    JOIN courses c ON c.id = l.course_id
"#;

/// Appends the course filter. Expects the course table aliased as `c`.
fn push_course_scope(builder: &mut QueryBuilder<'_, Postgres>, scope: CourseScope) {
    match scope {
        CourseScope::All => {
            builder.push("TRUE");
        }
        CourseScope::Taught(actor) => {
            builder
                .push("(c.author_id = ")
                .push_bind(actor)
                .push(" OR EXISTS (SELECT 1 FROM course_teachers t")
                .push(" WHERE t.course_id = c.id AND t.profile_id = ")
                .push_bind(actor)
                .push("))");
        }
        CourseScope::Enrolled(actor) => {
            builder
                .push("EXISTS (SELECT 1 FROM course_students s")
                .push(" WHERE s.course_id = c.id AND s.profile_id = ")
                .push_bind(actor)
                .push(")");
        }
    }
}

/// Appends the solution filter. Expects solutions aliased as `h`, courses as `c`.
fn push_solution_scope(builder: &mut QueryBuilder<'_, Postgres>, scope: SolutionScope) {
    match scope {
        SolutionScope::Course(course_scope) => push_course_scope(builder, course_scope),
        SolutionScope::Submitted(actor) => {
            builder.push("h.author_id = ").push_bind(actor);
        }
    }
}

/// Maps unique-constraint violations to `Conflict` and foreign-key violations
/// to `Conflict` with a dangling-reference reason. Everything else becomes
/// `Database`.
fn write_error(
    resource: Resource,
    reason: &'static str,
) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::Conflict { resource, reason };
            }
            if db.is_foreign_key_violation() {
                return StoreError::Conflict {
                    resource,
                    reason: "referenced row does not exist",
                };
            }
        }
        StoreError::from(err)
    }
}

fn expect_row(rows_affected: u64, resource: Resource, id: Uuid) -> Result<(), StoreError> {
    if rows_affected == 0 {
        Err(StoreError::NotFound { resource, id })
    } else {
        Ok(())
    }
}

/// PostgresRepository
///
/// The production `Repository`, backed by PostgreSQL. Scope values become
/// `WHERE` clauses built with `QueryBuilder`, so every argument is bound.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// connect
    ///
    /// Opens a pool against `config.db_url` and brings the schema up to date.
    pub async fn connect(config: &AppConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.db_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database schema is up to date.");

        Ok(Self::new(pool))
    }

    /// Rewrites the teacher and student lists of `course`. A member id without a
    /// profile fails with `NotFound` before anything is written.
    async fn replace_members(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        course: &Course,
    ) -> Result<(), StoreError> {
        let members: Vec<Uuid> = course.teachers.iter().chain(&course.students).copied().collect();
        let missing: Option<Uuid> = sqlx::query_scalar(
            "SELECT m.id FROM UNNEST($1::uuid[]) AS m(id) \
             WHERE NOT EXISTS (SELECT 1 FROM profiles p WHERE p.id = m.id) LIMIT 1",
        )
        .bind(&members)
        .fetch_optional(&mut **tx)
        .await?;
        if let Some(id) = missing {
            return Err(StoreError::NotFound {
                resource: Resource::Profile,
                id,
            });
        }

        sqlx::query("DELETE FROM course_teachers WHERE course_id = $1")
            .bind(course.id)
            .execute(&mut **tx)
            .await?;
        sqlx::query("DELETE FROM course_students WHERE course_id = $1")
            .bind(course.id)
            .execute(&mut **tx)
            .await?;

        let teachers: Vec<Uuid> = course.teachers.iter().copied().collect();
        let students: Vec<Uuid> = course.students.iter().copied().collect();

        sqlx::query(
            "INSERT INTO course_teachers (course_id, profile_id) SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(course.id)
        .bind(teachers)
        .execute(&mut **tx)
        .await?;
        sqlx::query(
            "INSERT INTO course_students (course_id, profile_id) SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(course.id)
        .bind(students)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- PROFILES ---

    async fn get_profile(&self, id: Uuid) -> Result<Actor, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(PROFILE_SELECT);
        builder.push(" WHERE id = ").push_bind(id);
        builder
            .build_query_as::<ProfileRow>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound {
                resource: Resource::Profile,
                id,
            })?
            .try_into()
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<Actor>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(PROFILE_SELECT);
        builder.push(" WHERE user_id = ").push_bind(user_id);
        builder
            .build_query_as::<ProfileRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(Actor::try_from)
            .transpose()
    }

    async fn list_profiles(&self) -> Result<Vec<Actor>, StoreError> {
        sqlx::query_as::<_, ProfileRow>(PROFILE_SELECT)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Actor::try_from)
            .collect()
    }

    async fn create_profile(&self, profile: Actor) -> Result<Actor, StoreError> {
        sqlx::query("INSERT INTO profiles (id, user_id, role) VALUES ($1, $2, $3)")
            .bind(profile.id)
            .bind(profile.user_id)
            .bind(profile.role.as_str())
            .execute(&self.pool)
            .await
            .map_err(write_error(
                Resource::Profile,
                "identity already has a profile",
            ))?;
        Ok(profile)
    }

    async fn update_profile(&self, profile: Actor) -> Result<Actor, StoreError> {
        let res = sqlx::query("UPDATE profiles SET role = $2 WHERE id = $1")
            .bind(profile.id)
            .bind(profile.role.as_str())
            .execute(&self.pool)
            .await?;
        expect_row(res.rows_affected(), Resource::Profile, profile.id)?;
        Ok(profile)
    }

    async fn delete_profile(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_row(res.rows_affected(), Resource::Profile, id)
    }

    // --- COURSES ---

    async fn get_course(&self, id: Uuid) -> Result<Course, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(COURSE_SELECT);
        builder.push(" WHERE c.id = ").push_bind(id);
        builder
            .build_query_as::<CourseRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(Course::from)
            .ok_or(StoreError::NotFound {
                resource: Resource::Course,
                id,
            })
    }

    async fn list_courses(&self, scope: CourseScope) -> Result<Vec<Course>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(COURSE_SELECT);
        builder.push(" WHERE ");
        push_course_scope(&mut builder, scope);
        builder.push(" ORDER BY c.title");
        let rows = builder
            .build_query_as::<CourseRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn create_course(&self, course: Course) -> Result<Course, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO courses (id, title, author_id) VALUES ($1, $2, $3)")
            .bind(course.id)
            .bind(&course.title)
            .bind(course.author)
            .execute(&mut *tx)
            .await
            .map_err(write_error(Resource::Course, "course id already taken"))?;
        Self::replace_members(&mut tx, &course).await?;
        tx.commit().await?;
        Ok(course)
    }

    async fn update_course(&self, course: Course) -> Result<Course, StoreError> {
        let mut tx = self.pool.begin().await?;
        let res = sqlx::query("UPDATE courses SET title = $2 WHERE id = $1")
            .bind(course.id)
            .bind(&course.title)
            .execute(&mut *tx)
            .await?;
        expect_row(res.rows_affected(), Resource::Course, course.id)?;
        Self::replace_members(&mut tx, &course).await?;
        tx.commit().await?;
        Ok(course)
    }

    async fn delete_course(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_row(res.rows_affected(), Resource::Course, id)
    }

    // --- LECTURES ---

    async fn get_lecture(&self, id: Uuid) -> Result<Lecture, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(LECTURE_SELECT);
        builder.push(" WHERE l.id = ").push_bind(id);
        builder
            .build_query_as::<LectureRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(Lecture::from)
            .ok_or(StoreError::NotFound {
                resource: Resource::Lecture,
                id,
            })
    }

    async fn list_lectures(&self, scope: CourseScope) -> Result<Vec<Lecture>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(LECTURE_SELECT);
        builder.push(" WHERE ");
        push_course_scope(&mut builder, scope);
        let rows = builder
            .build_query_as::<LectureRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Lecture::from).collect())
    }

    async fn create_lecture(&self, lecture: Lecture) -> Result<Lecture, StoreError> {
        sqlx::query(
            "INSERT INTO lectures (id, topic, course_id, file, homework_text) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(lecture.id)
        .bind(&lecture.topic)
        .bind(lecture.course)
        .bind(lecture.file.as_ref().map(FileHandle::as_str))
        .bind(lecture.homework_text.as_deref())
        .execute(&self.pool)
        .await
        .map_err(write_error(Resource::Lecture, "lecture id already taken"))?;
        Ok(lecture)
    }

    async fn update_lecture(&self, lecture: Lecture) -> Result<Lecture, StoreError> {
        let res = sqlx::query(
            "UPDATE lectures SET topic = $2, course_id = $3, file = $4, homework_text = $5 \
             WHERE id = $1",
        )
        .bind(lecture.id)
        .bind(&lecture.topic)
        .bind(lecture.course)
        .bind(lecture.file.as_ref().map(FileHandle::as_str))
        .bind(lecture.homework_text.as_deref())
        .execute(&self.pool)
        .await?;
        expect_row(res.rows_affected(), Resource::Lecture, lecture.id)?;
        Ok(lecture)
    }

    async fn delete_lecture(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM lectures WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_row(res.rows_affected(), Resource::Lecture, id)
    }

    // --- HOMEWORK SOLUTIONS ---

    async fn get_homework(&self, id: Uuid) -> Result<HomeworkSolution, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(HOMEWORK_SELECT);
        builder.push(" WHERE h.id = ").push_bind(id);
        builder
            .build_query_as::<HomeworkRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(HomeworkSolution::from)
            .ok_or(StoreError::NotFound {
                resource: Resource::Homework,
                id,
            })
    }

    async fn list_homeworks(
        &self,
        scope: SolutionScope,
    ) -> Result<Vec<HomeworkSolution>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(HOMEWORK_SELECT);
        builder.push(" WHERE ");
        push_solution_scope(&mut builder, scope);
        let rows = builder
            .build_query_as::<HomeworkRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(HomeworkSolution::from).collect())
    }

    async fn create_homework(
        &self,
        solution: HomeworkSolution,
    ) -> Result<HomeworkSolution, StoreError> {
        sqlx::query(
            "INSERT INTO homework_solutions (id, author_id, lecture_id, solution_text, file) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(solution.id)
        .bind(solution.author)
        .bind(solution.lecture)
        .bind(solution.solution_text.as_deref())
        .bind(solution.file.as_ref().map(FileHandle::as_str))
        .execute(&self.pool)
        .await
        .map_err(write_error(Resource::Homework, "solution id already taken"))?;
        Ok(solution)
    }

    async fn update_homework(
        &self,
        solution: HomeworkSolution,
    ) -> Result<HomeworkSolution, StoreError> {
        let res = sqlx::query(
            "UPDATE homework_solutions SET solution_text = $2, file = $3 WHERE id = $1",
        )
        .bind(solution.id)
        .bind(solution.solution_text.as_deref())
        .bind(solution.file.as_ref().map(FileHandle::as_str))
        .execute(&self.pool)
        .await?;
        expect_row(res.rows_affected(), Resource::Homework, solution.id)?;
        Ok(solution)
    }

    async fn delete_homework(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM homework_solutions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_row(res.rows_affected(), Resource::Homework, id)
    }

    // --- MARKS ---

    async fn get_mark(&self, id: Uuid) -> Result<Mark, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(MARK_SELECT);
        builder.push(" WHERE m.id = ").push_bind(id);
        builder
            .build_query_as::<MarkRow>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound {
                resource: Resource::Mark,
                id,
            })?
            .try_into()
    }

    async fn list_marks(&self, scope: SolutionScope) -> Result<Vec<Mark>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(MARK_SELECT);
        builder.push(" WHERE ");
        push_solution_scope(&mut builder, scope);
        builder
            .build_query_as::<MarkRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Mark::try_from)
            .collect()
    }

    async fn create_mark(&self, mark: Mark) -> Result<Mark, StoreError> {
        sqlx::query(
            "INSERT INTO marks (id, homework_id, value, checking_teacher_id) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(mark.id)
        .bind(mark.homework)
        .bind(i16::from(mark.value))
        .bind(mark.checking_teacher)
        .execute(&self.pool)
        .await
        .map_err(write_error(Resource::Mark, "homework solution already has a mark"))?;
        Ok(mark)
    }

    async fn update_mark(&self, mark: Mark) -> Result<Mark, StoreError> {
        let res = sqlx::query("UPDATE marks SET value = $2 WHERE id = $1")
            .bind(mark.id)
            .bind(i16::from(mark.value))
            .execute(&self.pool)
            .await?;
        expect_row(res.rows_affected(), Resource::Mark, mark.id)?;
        Ok(mark)
    }

    async fn delete_mark(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM marks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_row(res.rows_affected(), Resource::Mark, id)
    }

    // --- COMMENTS ---

    async fn get_comment(&self, id: Uuid) -> Result<Comment, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(COMMENT_SELECT);
        builder.push(" WHERE cm.id = ").push_bind(id);
        builder
            .build_query_as::<CommentRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(Comment::from)
            .ok_or(StoreError::NotFound {
                resource: Resource::Comment,
                id,
            })
    }

    async fn list_comments(&self, scope: SolutionScope) -> Result<Vec<Comment>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(COMMENT_SELECT);
        builder.push(" WHERE ");
        push_solution_scope(&mut builder, scope);
        let rows = builder
            .build_query_as::<CommentRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn create_comment(&self, comment: Comment) -> Result<Comment, StoreError> {
        sqlx::query(
            "INSERT INTO comments (id, homework_id, author_id, text) VALUES ($1, $2, $3, $4)",
        )
        .bind(comment.id)
        .bind(comment.homework)
        .bind(comment.author)
        .bind(&comment.text)
        .execute(&self.pool)
        .await
        .map_err(write_error(Resource::Comment, "comment id already taken"))?;
        Ok(comment)
    }

    async fn update_comment(&self, comment: Comment) -> Result<Comment, StoreError> {
        let res = sqlx::query("UPDATE comments SET text = $2 WHERE id = $1")
            .bind(comment.id)
            .bind(&comment.text)
            .execute(&self.pool)
            .await?;
        expect_row(res.rows_affected(), Resource::Comment, comment.id)?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_row(res.rows_affected(), Resource::Comment, id)
    }
}
