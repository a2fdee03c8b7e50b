use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::models::{ApiError, NewGroup};
use crate::storage::DynStorage;

fn validate(new: &NewGroup) -> Result<(), ApiError> {
    if new.name.trim().is_empty() {
        return Err(ApiError::invalid_request("group name must not be blank"));
    }
    Ok(())
}

pub async fn list(storage: web::Data<DynStorage>) -> Result<HttpResponse, ApiError> {
    let groups = storage.list_groups().await?;
    Ok(HttpResponse::Ok().json(groups))
}

pub async fn create(
    storage: web::Data<DynStorage>,
    new: web::Json<NewGroup>,
) -> Result<HttpResponse, ApiError> {
    validate(&new)?;
    let group = storage.insert_group(&new).await?;
    tracing::info!(group_id = group.id, "group created");
    Ok(HttpResponse::Ok().json(group))
}

pub async fn update(
    storage: web::Data<DynStorage>,
    path: web::Path<i64>,
    new: web::Json<NewGroup>,
) -> Result<HttpResponse, ApiError> {
    validate(&new)?;
    let id = path.into_inner();
    match storage.update_group(id, &new).await? {
        Some(group) => Ok(HttpResponse::Ok().json(group)),
        None => Err(ApiError::not_found("group not found")),
    }
}

pub async fn delete(
    storage: web::Data<DynStorage>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if storage.delete_group(id).await? {
        tracing::info!(group_id = id, "group deleted");
        Ok(HttpResponse::Ok().json(json!({ "message": "group deleted" })))
    } else {
        Err(ApiError::not_found("group not found"))
    }
}
