//! HTTP surface: route wiring and per-entity handlers.

pub mod export;
pub mod groups;
pub mod pages;
pub mod schedule;
pub mod students;
pub mod subjects;

use actix_web::web;

/// Wire every route onto the service config. Kept separate from server
/// startup so integration tests can mount the same surface on a test app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pages::index))
        .route("/health", web::get().to(pages::health))
        .service(
            web::scope("/api")
                .route("/students", web::get().to(students::list))
                .route("/students", web::post().to(students::create))
                .route("/students/{id}", web::put().to(students::update))
                .route("/students/{id}", web::delete().to(students::delete))
                .route("/groups", web::get().to(groups::list))
                .route("/groups", web::post().to(groups::create))
                .route("/groups/{id}", web::put().to(groups::update))
                .route("/groups/{id}", web::delete().to(groups::delete))
                .route("/subjects", web::get().to(subjects::list))
                .route("/subjects", web::post().to(subjects::create))
                .route("/subjects/{id}", web::put().to(subjects::update))
                .route("/subjects/{id}", web::delete().to(subjects::delete))
                .route("/schedule", web::get().to(schedule::list))
                .route("/schedule", web::post().to(schedule::create))
                .route("/schedule/{id}", web::put().to(schedule::update))
                .route("/schedule/{id}", web::delete().to(schedule::delete))
                .route(
                    "/export/student/{id}/certificate-word",
                    web::get().to(export::certificate_word),
                )
                .route(
                    "/export/student/{id}/certificate-pdf",
                    web::get().to(export::certificate_pdf),
                )
                .route(
                    "/export/schedule/{group_id}/excel",
                    web::get().to(export::schedule_excel),
                ),
        );
}
