use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::models::{ApiError, NewScheduleSlot};
use crate::storage::DynStorage;

#[derive(Debug, Deserialize)]
pub struct ScheduleFilter {
    pub group_id: Option<i64>,
}

fn validate(new: &NewScheduleSlot) -> Result<(), ApiError> {
    if new.day_of_week.trim().is_empty() {
        return Err(ApiError::invalid_request("day_of_week must not be blank"));
    }
    Ok(())
}

/// List slots, optionally narrowed to one group via `?group_id=N`. The
/// filter applies whenever the parameter is present, including `0`.
pub async fn list(
    storage: web::Data<DynStorage>,
    filter: web::Query<ScheduleFilter>,
) -> Result<HttpResponse, ApiError> {
    let slots = storage.list_slots(filter.group_id).await?;
    Ok(HttpResponse::Ok().json(slots))
}

pub async fn create(
    storage: web::Data<DynStorage>,
    new: web::Json<NewScheduleSlot>,
) -> Result<HttpResponse, ApiError> {
    validate(&new)?;
    let slot = storage.insert_slot(&new).await?;
    tracing::info!(slot_id = slot.id, group_id = slot.group_id, "slot created");
    Ok(HttpResponse::Ok().json(slot))
}

pub async fn update(
    storage: web::Data<DynStorage>,
    path: web::Path<i64>,
    new: web::Json<NewScheduleSlot>,
) -> Result<HttpResponse, ApiError> {
    validate(&new)?;
    let id = path.into_inner();
    match storage.update_slot(id, &new).await? {
        Some(slot) => Ok(HttpResponse::Ok().json(slot)),
        None => Err(ApiError::not_found("schedule slot not found")),
    }
}

pub async fn delete(
    storage: web::Data<DynStorage>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if storage.delete_slot(id).await? {
        tracing::info!(slot_id = id, "slot deleted");
        Ok(HttpResponse::Ok().json(json!({ "message": "schedule slot deleted" })))
    } else {
        Err(ApiError::not_found("schedule slot not found"))
    }
}
