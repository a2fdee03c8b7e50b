use serde::{Deserialize, Serialize};

/// A student record as stored and as returned to clients.
///
/// `group_id` is a reference into `groups`; deleting a group leaves the
/// reference dangling rather than cascading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub group_id: Option<i64>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Writable fields of a student. The same shape is accepted for create and
/// update; an update overwrites every field, including unchanged ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Student {
    /// Field-by-field mapping from the writable shape; the full writable
    /// field set is enumerated here.
    pub fn from_new(id: i64, new: &NewStudent) -> Self {
        Self {
            id,
            name: new.name.clone(),
            surname: new.surname.clone(),
            group_id: new.group_id,
            email: new.email.clone(),
            phone: new.phone.clone(),
        }
    }
}
