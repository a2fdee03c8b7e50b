use serde::{Deserialize, Serialize};

/// A taught subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Writable fields of a subject, identical for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Subject {
    pub fn from_new(id: i64, new: &NewSubject) -> Self {
        Self {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
        }
    }
}
