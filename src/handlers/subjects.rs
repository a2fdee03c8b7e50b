use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::models::{ApiError, NewSubject};
use crate::storage::DynStorage;

fn validate(new: &NewSubject) -> Result<(), ApiError> {
    if new.name.trim().is_empty() {
        return Err(ApiError::invalid_request("subject name must not be blank"));
    }
    Ok(())
}

pub async fn list(storage: web::Data<DynStorage>) -> Result<HttpResponse, ApiError> {
    let subjects = storage.list_subjects().await?;
    Ok(HttpResponse::Ok().json(subjects))
}

pub async fn create(
    storage: web::Data<DynStorage>,
    new: web::Json<NewSubject>,
) -> Result<HttpResponse, ApiError> {
    validate(&new)?;
    let subject = storage.insert_subject(&new).await?;
    tracing::info!(subject_id = subject.id, "subject created");
    Ok(HttpResponse::Ok().json(subject))
}

pub async fn update(
    storage: web::Data<DynStorage>,
    path: web::Path<i64>,
    new: web::Json<NewSubject>,
) -> Result<HttpResponse, ApiError> {
    validate(&new)?;
    let id = path.into_inner();
    match storage.update_subject(id, &new).await? {
        Some(subject) => Ok(HttpResponse::Ok().json(subject)),
        None => Err(ApiError::not_found("subject not found")),
    }
}

pub async fn delete(
    storage: web::Data<DynStorage>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if storage.delete_subject(id).await? {
        tracing::info!(subject_id = id, "subject deleted");
        Ok(HttpResponse::Ok().json(json!({ "message": "subject deleted" })))
    } else {
        Err(ApiError::not_found("subject not found"))
    }
}
