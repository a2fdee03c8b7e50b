use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::models::{ApiError, NewStudent};
use crate::storage::DynStorage;

fn validate(new: &NewStudent) -> Result<(), ApiError> {
    if new.name.trim().is_empty() {
        return Err(ApiError::invalid_request("student name must not be blank"));
    }
    if new.surname.trim().is_empty() {
        return Err(ApiError::invalid_request(
            "student surname must not be blank",
        ));
    }
    Ok(())
}

pub async fn list(storage: web::Data<DynStorage>) -> Result<HttpResponse, ApiError> {
    let students = storage.list_students().await?;
    Ok(HttpResponse::Ok().json(students))
}

pub async fn create(
    storage: web::Data<DynStorage>,
    new: web::Json<NewStudent>,
) -> Result<HttpResponse, ApiError> {
    validate(&new)?;
    let student = storage.insert_student(&new).await?;
    tracing::info!(student_id = student.id, "student created");
    Ok(HttpResponse::Ok().json(student))
}

pub async fn update(
    storage: web::Data<DynStorage>,
    path: web::Path<i64>,
    new: web::Json<NewStudent>,
) -> Result<HttpResponse, ApiError> {
    validate(&new)?;
    let id = path.into_inner();
    match storage.update_student(id, &new).await? {
        Some(student) => Ok(HttpResponse::Ok().json(student)),
        None => Err(ApiError::not_found("student not found")),
    }
}

pub async fn delete(
    storage: web::Data<DynStorage>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if storage.delete_student(id).await? {
        tracing::info!(student_id = id, "student deleted");
        Ok(HttpResponse::Ok().json(json!({ "message": "student deleted" })))
    } else {
        Err(ApiError::not_found("student not found"))
    }
}
