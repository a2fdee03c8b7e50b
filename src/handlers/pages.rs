use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::config::Config;
use crate::models::ApiError;
use crate::storage::DynStorage;

/// Serve the static single-page frontend.
pub async fn index(config: web::Data<Config>) -> Result<HttpResponse, ApiError> {
    let html = std::fs::read_to_string(&config.export.index_path)
        .map_err(|_| ApiError::resource_missing("index page not found"))?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

pub async fn health(storage: web::Data<DynStorage>) -> Result<HttpResponse, ApiError> {
    storage.healthcheck().await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "healthy" })))
}
