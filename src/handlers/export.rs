//! Document export endpoints.
//!
//! Each handler loads the involved records, delegates rendering to
//! `crate::export`, and ships the bytes back as an attachment download.

use actix_web::{web, HttpResponse};
use chrono::Local;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::Config;
use crate::export::{certificate, pdf, timetable};
use crate::models::ApiError;
use crate::storage::DynStorage;

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PDF_MIME: &str = "application/pdf";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Characters kept verbatim in the percent-encoded filename.
const FILENAME_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'_')
    .remove(b'-');

/// Build an attachment response. The filename is carried both as the plain
/// `filename` parameter and as RFC 5987 `filename*` so non-ASCII names
/// survive every browser.
fn attachment(buffer: Vec<u8>, mime: &str, filename: &str) -> HttpResponse {
    let quoted = utf8_percent_encode(filename, FILENAME_SET).to_string();

    HttpResponse::Ok()
        .content_type(mime)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename={quoted}; filename*=UTF-8''{quoted}"),
        ))
        .body(buffer)
}

/// Read the group name for a student that may have no group.
async fn group_name_for(
    storage: &DynStorage,
    group_id: Option<i64>,
) -> Result<Option<String>, ApiError> {
    match group_id {
        Some(id) => Ok(storage.get_group(id).await?.map(|g| g.name)),
        None => Ok(None),
    }
}

pub async fn certificate_word(
    storage: web::Data<DynStorage>,
    config: web::Data<Config>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let student = storage
        .get_student(id)
        .await?
        .ok_or_else(|| ApiError::not_found("student not found"))?;
    let group_name = group_name_for(&storage, student.group_id).await?;

    let template = std::fs::read(&config.export.template_path)
        .map_err(|_| ApiError::resource_missing("certificate template not found"))?;
    // The stamp is optional; certificates render without it.
    let stamp = std::fs::read(&config.export.stamp_path).ok();

    let today = Local::now().date_naive();
    let buffer = certificate::render(
        &template,
        stamp.as_deref(),
        &student,
        group_name.as_deref(),
        today,
    )?;

    tracing::info!(student_id = id, "word certificate generated");
    let filename = format!("certificate_{}_{}.docx", student.surname, student.name);
    Ok(attachment(buffer, DOCX_MIME, &filename))
}

pub async fn certificate_pdf(
    storage: web::Data<DynStorage>,
    config: web::Data<Config>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let student = storage
        .get_student(id)
        .await?
        .ok_or_else(|| ApiError::not_found("student not found"))?;
    let group_name = group_name_for(&storage, student.group_id).await?;

    let stamp = std::fs::read(&config.export.stamp_path).ok();

    let today = Local::now().date_naive();
    let buffer = pdf::render(&student, group_name.as_deref(), stamp.as_deref(), today);

    tracing::info!(student_id = id, "pdf certificate generated");
    let filename = format!("certificate_{}_{}.pdf", student.surname, student.name);
    Ok(attachment(buffer, PDF_MIME, &filename))
}

pub async fn schedule_excel(
    storage: web::Data<DynStorage>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let group_id = path.into_inner();
    let group = storage
        .get_group(group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("group not found"))?;

    let slots = storage.list_slots(Some(group_id)).await?;
    let subjects = storage.list_subjects().await?;

    let today = Local::now().date_naive();
    let buffer = timetable::render(&group, &slots, &subjects, today)?;

    tracing::info!(group_id, "timetable workbook generated");
    let filename = format!("schedule_{}.xlsx", group.name);
    Ok(attachment(buffer, XLSX_MIME, &filename))
}
