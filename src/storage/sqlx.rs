use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Pool, Postgres, Sqlite};
use std::borrow::Cow;
use std::path::PathBuf;
use std::str::FromStr;

use crate::models::{
    ApiError, Group, NewGroup, NewScheduleSlot, NewStudent, NewSubject, ScheduleSlot, Student,
    Subject,
};
use crate::storage::Storage;

#[derive(Clone, Debug)]
enum DatabasePool {
    Sqlite(Pool<Sqlite>),
    Postgres(Pool<Postgres>),
}

/// SQL-backed storage implementation (SQLite/Postgres) using SQLx.
pub struct SqlxStorage {
    pool: DatabasePool,
}

impl SqlxStorage {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = if database_url.starts_with("postgres") {
            DatabasePool::Postgres(Pool::<Postgres>::connect(database_url).await?)
        } else {
            // A common failure mode with local sqlite defaults is that the
            // directory for the DB file doesn't exist or the file can't be
            // created in URI mode. Pre-create both; if we can't (permissions,
            // etc.), sqlx will surface the underlying error on connect.
            if let Some(path) = sqlite_db_path(database_url) {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        let _ = std::fs::create_dir_all(parent);
                    }
                }

                if !path.as_os_str().is_empty() && !path.exists() {
                    let _ = std::fs::File::create(&path);
                }
            }

            let connect_url = sqlite_url_with_create_mode(database_url);
            // sqlx turns `PRAGMA foreign_keys` on by default, unlike raw
            // SQLite; deletes here are documented to leave references
            // dangling rather than cascade or fail, so keep it off.
            let options = SqliteConnectOptions::from_str(connect_url.as_ref())?
                .foreign_keys(false);
            DatabasePool::Sqlite(Pool::<Sqlite>::connect_with(options).await?)
        };

        Ok(Self { pool })
    }

    /// Bootstrap the four tables and their FK-column indexes. Statements are
    /// idempotent, so `init()` is safe to call on every startup; there is no
    /// migration system.
    async fn bootstrap_schema(&self) -> Result<(), sqlx::Error> {
        let (groups, students, subjects, schedules) = match &self.pool {
            DatabasePool::Sqlite(_) => (
                r#"
                CREATE TABLE IF NOT EXISTS groups (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    description TEXT
                );
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS students (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    surname TEXT NOT NULL,
                    group_id INTEGER REFERENCES groups(id),
                    email TEXT,
                    phone TEXT
                );
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS subjects (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    description TEXT
                );
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS schedules (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    group_id INTEGER NOT NULL REFERENCES groups(id),
                    subject_id INTEGER NOT NULL REFERENCES subjects(id),
                    day_of_week TEXT NOT NULL,
                    lesson_number INTEGER NOT NULL,
                    room TEXT
                );
                "#,
            ),
            DatabasePool::Postgres(_) => (
                r#"
                CREATE TABLE IF NOT EXISTS groups (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    description TEXT
                );
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS students (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL,
                    surname TEXT NOT NULL,
                    group_id BIGINT REFERENCES groups(id),
                    email TEXT,
                    phone TEXT
                );
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS subjects (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT
                );
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS schedules (
                    id BIGSERIAL PRIMARY KEY,
                    group_id BIGINT NOT NULL REFERENCES groups(id),
                    subject_id BIGINT NOT NULL REFERENCES subjects(id),
                    day_of_week TEXT NOT NULL,
                    lesson_number BIGINT NOT NULL,
                    room TEXT
                );
                "#,
            ),
        };

        let statements = [
            groups,
            students,
            subjects,
            schedules,
            r#"CREATE INDEX IF NOT EXISTS idx_students_group_id ON students(group_id);"#,
            r#"CREATE INDEX IF NOT EXISTS idx_schedules_group_id ON schedules(group_id);"#,
            r#"CREATE INDEX IF NOT EXISTS idx_schedules_subject_id ON schedules(subject_id);"#,
        ];

        for statement in statements {
            match &self.pool {
                DatabasePool::Sqlite(pool) => {
                    sqlx::query(statement).execute(pool).await?;
                }
                DatabasePool::Postgres(pool) => {
                    sqlx::query(statement).execute(pool).await?;
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Storage for SqlxStorage {
    async fn init(&self) -> Result<(), ApiError> {
        self.bootstrap_schema().await.map_err(Into::into)
    }

    async fn healthcheck(&self) -> Result<(), ApiError> {
        // Keep readiness/liveness cheap: don't re-run the bootstrap.
        match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
        }

        Ok(())
    }

    // --- Students ---

    async fn list_students(&self) -> Result<Vec<Student>, ApiError> {
        let students = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY id")
                    .fetch_all(pool)
                    .await?
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY id")
                    .fetch_all(pool)
                    .await?
            }
        };

        Ok(students)
    }

    async fn get_student(&self, id: i64) -> Result<Option<Student>, ApiError> {
        let student = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = ?")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
            }
        };

        Ok(student)
    }

    async fn insert_student(&self, new: &NewStudent) -> Result<Student, ApiError> {
        let id: i64 = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO students (name, surname, group_id, email, phone)
                    VALUES (?, ?, ?, ?, ?)
                    RETURNING id
                    "#,
                )
                .bind(&new.name)
                .bind(&new.surname)
                .bind(new.group_id)
                .bind(&new.email)
                .bind(&new.phone)
                .fetch_one(pool)
                .await?
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO students (name, surname, group_id, email, phone)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id
                    "#,
                )
                .bind(&new.name)
                .bind(&new.surname)
                .bind(new.group_id)
                .bind(&new.email)
                .bind(&new.phone)
                .fetch_one(pool)
                .await?
            }
        };

        Ok(Student::from_new(id, new))
    }

    async fn update_student(
        &self,
        id: i64,
        new: &NewStudent,
    ) -> Result<Option<Student>, ApiError> {
        let result = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query(
                    r#"
                    UPDATE students
                    SET name = ?, surname = ?, group_id = ?, email = ?, phone = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&new.name)
                .bind(&new.surname)
                .bind(new.group_id)
                .bind(&new.email)
                .bind(&new.phone)
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected()
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query(
                    r#"
                    UPDATE students
                    SET name = $1, surname = $2, group_id = $3, email = $4, phone = $5
                    WHERE id = $6
                    "#,
                )
                .bind(&new.name)
                .bind(&new.surname)
                .bind(new.group_id)
                .bind(&new.email)
                .bind(&new.phone)
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected()
            }
        };

        Ok((result > 0).then(|| Student::from_new(id, new)))
    }

    async fn delete_student(&self, id: i64) -> Result<bool, ApiError> {
        let result = match &self.pool {
            DatabasePool::Sqlite(pool) => sqlx::query("DELETE FROM students WHERE id = ?")
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected(),
            DatabasePool::Postgres(pool) => sqlx::query("DELETE FROM students WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected(),
        };

        Ok(result > 0)
    }

    // --- Groups ---

    async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        let groups = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query_as::<_, Group>("SELECT * FROM groups ORDER BY id")
                    .fetch_all(pool)
                    .await?
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query_as::<_, Group>("SELECT * FROM groups ORDER BY id")
                    .fetch_all(pool)
                    .await?
            }
        };

        Ok(groups)
    }

    async fn get_group(&self, id: i64) -> Result<Option<Group>, ApiError> {
        let group = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = ?")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
            }
        };

        Ok(group)
    }

    async fn insert_group(&self, new: &NewGroup) -> Result<Group, ApiError> {
        let id: i64 = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query_scalar(
                    "INSERT INTO groups (name, description) VALUES (?, ?) RETURNING id",
                )
                .bind(&new.name)
                .bind(&new.description)
                .fetch_one(pool)
                .await?
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query_scalar(
                    "INSERT INTO groups (name, description) VALUES ($1, $2) RETURNING id",
                )
                .bind(&new.name)
                .bind(&new.description)
                .fetch_one(pool)
                .await?
            }
        };

        Ok(Group::from_new(id, new))
    }

    async fn update_group(&self, id: i64, new: &NewGroup) -> Result<Option<Group>, ApiError> {
        let result = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query("UPDATE groups SET name = ?, description = ? WHERE id = ?")
                    .bind(&new.name)
                    .bind(&new.description)
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query("UPDATE groups SET name = $1, description = $2 WHERE id = $3")
                    .bind(&new.name)
                    .bind(&new.description)
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
        };

        Ok((result > 0).then(|| Group::from_new(id, new)))
    }

    async fn delete_group(&self, id: i64) -> Result<bool, ApiError> {
        // No cascade: students and slots referencing the group keep their
        // reference.
        let result = match &self.pool {
            DatabasePool::Sqlite(pool) => sqlx::query("DELETE FROM groups WHERE id = ?")
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected(),
            DatabasePool::Postgres(pool) => sqlx::query("DELETE FROM groups WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected(),
        };

        Ok(result > 0)
    }

    // --- Subjects ---

    async fn list_subjects(&self) -> Result<Vec<Subject>, ApiError> {
        let subjects = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query_as::<_, Subject>("SELECT * FROM subjects ORDER BY id")
                    .fetch_all(pool)
                    .await?
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query_as::<_, Subject>("SELECT * FROM subjects ORDER BY id")
                    .fetch_all(pool)
                    .await?
            }
        };

        Ok(subjects)
    }

    async fn get_subject(&self, id: i64) -> Result<Option<Subject>, ApiError> {
        let subject = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query_as::<_, Subject>("SELECT * FROM subjects WHERE id = ?")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query_as::<_, Subject>("SELECT * FROM subjects WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
            }
        };

        Ok(subject)
    }

    async fn insert_subject(&self, new: &NewSubject) -> Result<Subject, ApiError> {
        let id: i64 = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query_scalar(
                    "INSERT INTO subjects (name, description) VALUES (?, ?) RETURNING id",
                )
                .bind(&new.name)
                .bind(&new.description)
                .fetch_one(pool)
                .await?
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query_scalar(
                    "INSERT INTO subjects (name, description) VALUES ($1, $2) RETURNING id",
                )
                .bind(&new.name)
                .bind(&new.description)
                .fetch_one(pool)
                .await?
            }
        };

        Ok(Subject::from_new(id, new))
    }

    async fn update_subject(
        &self,
        id: i64,
        new: &NewSubject,
    ) -> Result<Option<Subject>, ApiError> {
        let result = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query("UPDATE subjects SET name = ?, description = ? WHERE id = ?")
                    .bind(&new.name)
                    .bind(&new.description)
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query("UPDATE subjects SET name = $1, description = $2 WHERE id = $3")
                    .bind(&new.name)
                    .bind(&new.description)
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
        };

        Ok((result > 0).then(|| Subject::from_new(id, new)))
    }

    async fn delete_subject(&self, id: i64) -> Result<bool, ApiError> {
        let result = match &self.pool {
            DatabasePool::Sqlite(pool) => sqlx::query("DELETE FROM subjects WHERE id = ?")
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected(),
            DatabasePool::Postgres(pool) => sqlx::query("DELETE FROM subjects WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected(),
        };

        Ok(result > 0)
    }

    // --- Schedule slots ---

    async fn list_slots(&self, group_id: Option<i64>) -> Result<Vec<ScheduleSlot>, ApiError> {
        let slots = match (&self.pool, group_id) {
            (DatabasePool::Sqlite(pool), Some(gid)) => sqlx::query_as::<_, ScheduleSlot>(
                "SELECT * FROM schedules WHERE group_id = ? ORDER BY id",
            )
            .bind(gid)
            .fetch_all(pool)
            .await?,
            (DatabasePool::Sqlite(pool), None) => {
                sqlx::query_as::<_, ScheduleSlot>("SELECT * FROM schedules ORDER BY id")
                    .fetch_all(pool)
                    .await?
            }
            (DatabasePool::Postgres(pool), Some(gid)) => sqlx::query_as::<_, ScheduleSlot>(
                "SELECT * FROM schedules WHERE group_id = $1 ORDER BY id",
            )
            .bind(gid)
            .fetch_all(pool)
            .await?,
            (DatabasePool::Postgres(pool), None) => {
                sqlx::query_as::<_, ScheduleSlot>("SELECT * FROM schedules ORDER BY id")
                    .fetch_all(pool)
                    .await?
            }
        };

        Ok(slots)
    }

    async fn get_slot(&self, id: i64) -> Result<Option<ScheduleSlot>, ApiError> {
        let slot = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query_as::<_, ScheduleSlot>("SELECT * FROM schedules WHERE id = ?")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query_as::<_, ScheduleSlot>("SELECT * FROM schedules WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
            }
        };

        Ok(slot)
    }

    async fn insert_slot(&self, new: &NewScheduleSlot) -> Result<ScheduleSlot, ApiError> {
        let id: i64 = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO schedules (group_id, subject_id, day_of_week, lesson_number, room)
                    VALUES (?, ?, ?, ?, ?)
                    RETURNING id
                    "#,
                )
                .bind(new.group_id)
                .bind(new.subject_id)
                .bind(&new.day_of_week)
                .bind(new.lesson_number)
                .bind(&new.room)
                .fetch_one(pool)
                .await?
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO schedules (group_id, subject_id, day_of_week, lesson_number, room)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id
                    "#,
                )
                .bind(new.group_id)
                .bind(new.subject_id)
                .bind(&new.day_of_week)
                .bind(new.lesson_number)
                .bind(&new.room)
                .fetch_one(pool)
                .await?
            }
        };

        Ok(ScheduleSlot::from_new(id, new))
    }

    async fn update_slot(
        &self,
        id: i64,
        new: &NewScheduleSlot,
    ) -> Result<Option<ScheduleSlot>, ApiError> {
        let result = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query(
                    r#"
                    UPDATE schedules
                    SET group_id = ?, subject_id = ?, day_of_week = ?, lesson_number = ?, room = ?
                    WHERE id = ?
                    "#,
                )
                .bind(new.group_id)
                .bind(new.subject_id)
                .bind(&new.day_of_week)
                .bind(new.lesson_number)
                .bind(&new.room)
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected()
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query(
                    r#"
                    UPDATE schedules
                    SET group_id = $1, subject_id = $2, day_of_week = $3, lesson_number = $4, room = $5
                    WHERE id = $6
                    "#,
                )
                .bind(new.group_id)
                .bind(new.subject_id)
                .bind(&new.day_of_week)
                .bind(new.lesson_number)
                .bind(&new.room)
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected()
            }
        };

        Ok((result > 0).then(|| ScheduleSlot::from_new(id, new)))
    }

    async fn delete_slot(&self, id: i64) -> Result<bool, ApiError> {
        let result = match &self.pool {
            DatabasePool::Sqlite(pool) => sqlx::query("DELETE FROM schedules WHERE id = ?")
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected(),
            DatabasePool::Postgres(pool) => sqlx::query("DELETE FROM schedules WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?
                .rows_affected(),
        };

        Ok(result > 0)
    }
}

fn sqlite_db_path(database_url: &str) -> Option<PathBuf> {
    if !database_url.starts_with("sqlite:") {
        return None;
    }
    if database_url.starts_with("sqlite::memory:") {
        return None;
    }

    let mut rest = &database_url["sqlite:".len()..];

    // Normalize URL-ish forms into a filesystem-ish path by reducing
    // multiple leading slashes to a single leading slash.
    if rest.starts_with("///") {
        rest = &rest[2..];
    } else if rest.starts_with("//") {
        rest = &rest[1..];
    }

    // Drop any query string.
    let path_part = rest.split('?').next().unwrap_or(rest);
    if path_part.is_empty() {
        return None;
    }

    Some(PathBuf::from(path_part))
}

fn sqlite_url_with_create_mode(database_url: &str) -> Cow<'_, str> {
    if !database_url.starts_with("sqlite:") {
        return Cow::Borrowed(database_url);
    }
    if database_url.starts_with("sqlite::memory:") {
        return Cow::Borrowed(database_url);
    }

    // Ensure the sqlite database file is created when it doesn't exist;
    // URI mode won't do that without the flag.
    if database_url.contains("mode=") {
        return Cow::Borrowed(database_url);
    }

    let sep = if database_url.contains('?') { '&' } else { '?' };
    Cow::Owned(format!("{database_url}{sep}mode=rwc"))
}
