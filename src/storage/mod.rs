//! Persistence layer: the backend trait and URL-based construction.

pub mod sqlx;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{
    ApiError, Group, NewGroup, NewScheduleSlot, NewStudent, NewSubject, ScheduleSlot, Student,
    Subject,
};

/// Trait implemented by persistence backends.
///
/// Operations are single-record-at-a-time and every mutation commits
/// immediately; there are no batch or multi-entity transactions. `replace`
/// semantics: the whole record is overwritten, `None` is returned when the
/// id does not exist. `delete` reports whether a row was removed.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the backing store (bootstrap schema / create indexes).
    async fn init(&self) -> Result<(), ApiError>;

    // Students
    async fn list_students(&self) -> Result<Vec<Student>, ApiError>;
    async fn get_student(&self, id: i64) -> Result<Option<Student>, ApiError>;
    async fn insert_student(&self, new: &NewStudent) -> Result<Student, ApiError>;
    async fn update_student(&self, id: i64, new: &NewStudent)
        -> Result<Option<Student>, ApiError>;
    async fn delete_student(&self, id: i64) -> Result<bool, ApiError>;

    // Groups
    async fn list_groups(&self) -> Result<Vec<Group>, ApiError>;
    async fn get_group(&self, id: i64) -> Result<Option<Group>, ApiError>;
    async fn insert_group(&self, new: &NewGroup) -> Result<Group, ApiError>;
    async fn update_group(&self, id: i64, new: &NewGroup) -> Result<Option<Group>, ApiError>;
    async fn delete_group(&self, id: i64) -> Result<bool, ApiError>;

    // Subjects
    async fn list_subjects(&self) -> Result<Vec<Subject>, ApiError>;
    async fn get_subject(&self, id: i64) -> Result<Option<Subject>, ApiError>;
    async fn insert_subject(&self, new: &NewSubject) -> Result<Subject, ApiError>;
    async fn update_subject(&self, id: i64, new: &NewSubject)
        -> Result<Option<Subject>, ApiError>;
    async fn delete_subject(&self, id: i64) -> Result<bool, ApiError>;

    // Schedule slots. `list_slots(Some(gid))` returns exactly the slots
    // whose group reference equals `gid`; `None` returns all slots.
    async fn list_slots(&self, group_id: Option<i64>) -> Result<Vec<ScheduleSlot>, ApiError>;
    async fn get_slot(&self, id: i64) -> Result<Option<ScheduleSlot>, ApiError>;
    async fn insert_slot(&self, new: &NewScheduleSlot) -> Result<ScheduleSlot, ApiError>;
    async fn update_slot(
        &self,
        id: i64,
        new: &NewScheduleSlot,
    ) -> Result<Option<ScheduleSlot>, ApiError>;
    async fn delete_slot(&self, id: i64) -> Result<bool, ApiError>;

    /// Lightweight liveness/readiness check.
    ///
    /// Implementations may override to do something cheaper than `init()`.
    async fn healthcheck(&self) -> Result<(), ApiError> {
        self.init().await
    }
}

pub type DynStorage = Arc<dyn Storage>;

/// Create a storage backend from a connection string.
///
/// `postgres://...` and `sqlite:...` URLs are both served by the SQLx
/// backend.
pub async fn create_storage(database_url: &str) -> Result<DynStorage, ApiError> {
    let storage = sqlx::SqlxStorage::new(database_url)
        .await
        .map_err(ApiError::from)?;
    Ok(Arc::new(storage))
}
