use serde::{Deserialize, Serialize};

/// One scheduled (group, subject, weekday, lesson-number) occupancy record.
///
/// `day_of_week` is free-text in storage; the timetable renderer matches it
/// against the six Russian weekday names. `lesson_number` is unconstrained
/// here; the renderer's time table covers 1..4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScheduleSlot {
    pub id: i64,
    pub group_id: i64,
    pub subject_id: i64,
    pub day_of_week: String,
    pub lesson_number: i64,
    pub room: Option<String>,
}

/// Writable fields of a schedule slot, identical for create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScheduleSlot {
    pub group_id: i64,
    pub subject_id: i64,
    pub day_of_week: String,
    pub lesson_number: i64,
    #[serde(default)]
    pub room: Option<String>,
}

impl ScheduleSlot {
    pub fn from_new(id: i64, new: &NewScheduleSlot) -> Self {
        Self {
            id,
            group_id: new.group_id,
            subject_id: new.subject_id,
            day_of_week: new.day_of_week.clone(),
            lesson_number: new.lesson_number,
            room: new.room.clone(),
        }
    }
}
