use serde::{Deserialize, Serialize};

/// A study group. Names are unique across the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Writable fields of a group, identical for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Group {
    pub fn from_new(id: i64, new: &NewGroup) -> Self {
        Self {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
        }
    }
}
