//! End-to-end tests mounting the full route surface on an actix test app
//! backed by a temporary SQLite database.

use std::io::Cursor;

use actix_web::{test, web, App};
use docx_rs::{read_docx, Docx, Paragraph, Run};
use tempfile::TempDir;

use student_records::config::{Config, DatabaseConfig, ExportConfig, ServerConfig};
use student_records::handlers;
use student_records::models::{Group, ScheduleSlot, Student, Subject};
use student_records::storage::{create_storage, DynStorage};

async fn test_context(dir: &TempDir) -> (DynStorage, Config) {
    let db_path = dir.path().join("records_test.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = create_storage(&url).await.unwrap();
    storage.init().await.unwrap();

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig { url },
        export: ExportConfig {
            template_path: dir
                .path()
                .join("certificate_template.docx")
                .display()
                .to_string(),
            stamp_path: dir.path().join("stamp.png").display().to_string(),
            index_path: dir.path().join("index.html").display().to_string(),
        },
    };

    (storage, config)
}

macro_rules! test_app {
    ($storage:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($storage.clone()))
                .app_data(web::Data::new($config.clone()))
                .configure(handlers::configure),
        )
        .await
    };
}

fn write_template(dir: &TempDir) {
    let docx = Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Справка № {{ref_number}}")))
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text("Выдана {{student_fio}}, группа {{group_name}}")),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text("Email: {{email}}, телефон: {{phone}}")),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text("Обучается с {{study_year}} года. {{issue_date}}")),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("М.П.")));

    let mut cursor = Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();
    std::fs::write(dir.path().join("certificate_template.docx"), cursor.into_inner()).unwrap();
}

fn docx_text(bytes: &[u8]) -> String {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let docx = read_docx(bytes).unwrap();
    let mut out = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            for p_child in &paragraph.children {
                if let ParagraphChild::Run(run) = p_child {
                    for r_child in &run.children {
                        if let RunChild::Text(text) = r_child {
                            out.push_str(&text.text);
                        }
                    }
                }
            }
            out.push('\n');
        }
    }
    out
}

#[actix_web::test]
async fn health_endpoint_reports_healthy() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, config) = test_context(&dir).await;
    let app = test_app!(storage, config);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn index_page_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, config) = test_context(&dir).await;
    std::fs::write(dir.path().join("index.html"), "<html><body>ok</body></html>").unwrap();
    let app = test_app!(storage, config);

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"<html>"));
}

#[actix_web::test]
async fn student_crud_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, config) = test_context(&dir).await;
    let app = test_app!(storage, config);

    let req = test::TestRequest::post()
        .uri("/api/groups")
        .set_json(serde_json::json!({ "name": "ИТ-21" }))
        .to_request();
    let group: Group = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/students")
        .set_json(serde_json::json!({
            "name": "Иван",
            "surname": "Петров",
            "group_id": group.id,
            "email": "ivan@example.com"
        }))
        .to_request();
    let student: Student = test::call_and_read_body_json(&app, req).await;
    assert_eq!(student.surname, "Петров");
    assert_eq!(student.group_id, Some(group.id));

    let req = test::TestRequest::get().uri("/api/students").to_request();
    let students: Vec<Student> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(students, vec![student.clone()]);

    let req = test::TestRequest::put()
        .uri(&format!("/api/students/{}", student.id))
        .set_json(serde_json::json!({
            "name": "Иван",
            "surname": "Петров",
            "phone": "+7 900 000-00-00"
        }))
        .to_request();
    let updated: Student = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.group_id, None);
    assert_eq!(updated.email, None);
    assert_eq!(updated.phone.as_deref(), Some("+7 900 000-00-00"));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/students/{}", student.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    // Second delete is a 404.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/students/{}", student.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn blank_student_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, config) = test_context(&dir).await;
    let app = test_app!(storage, config);

    let req = test::TestRequest::post()
        .uri("/api/students")
        .set_json(serde_json::json!({ "name": "   ", "surname": "Петров" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn duplicate_group_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, config) = test_context(&dir).await;
    let app = test_app!(storage, config);

    let req = test::TestRequest::post()
        .uri("/api/groups")
        .set_json(serde_json::json!({ "name": "ИТ-21" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::post()
        .uri("/api/groups")
        .set_json(serde_json::json!({ "name": "ИТ-21" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn schedule_filter_narrows_to_one_group() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, config) = test_context(&dir).await;
    let app = test_app!(storage, config);

    let req = test::TestRequest::post()
        .uri("/api/groups")
        .set_json(serde_json::json!({ "name": "ИТ-21" }))
        .to_request();
    let group_a: Group = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/groups")
        .set_json(serde_json::json!({ "name": "ИТ-22" }))
        .to_request();
    let group_b: Group = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/subjects")
        .set_json(serde_json::json!({ "name": "Математика" }))
        .to_request();
    let subject: Subject = test::call_and_read_body_json(&app, req).await;

    for (group, day) in [(&group_a, "Понедельник"), (&group_b, "Вторник")] {
        let req = test::TestRequest::post()
            .uri("/api/schedule")
            .set_json(serde_json::json!({
                "group_id": group.id,
                "subject_id": subject.id,
                "day_of_week": day,
                "lesson_number": 1
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/schedule?group_id={}", group_a.id))
        .to_request();
    let slots: Vec<ScheduleSlot> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].group_id, group_a.id);
    assert_eq!(slots[0].day_of_week, "Понедельник");

    let req = test::TestRequest::get().uri("/api/schedule").to_request();
    let all: Vec<ScheduleSlot> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(all.len(), 2);
}

#[actix_web::test]
async fn word_certificate_is_rendered_from_the_template() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, config) = test_context(&dir).await;
    write_template(&dir);
    let app = test_app!(storage, config);

    let req = test::TestRequest::post()
        .uri("/api/groups")
        .set_json(serde_json::json!({ "name": "ИТ-21" }))
        .to_request();
    let group: Group = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/students")
        .set_json(serde_json::json!({
            "name": "Иван",
            "surname": "Петров",
            "group_id": group.id
        }))
        .to_request();
    let student: Student = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/export/student/{}/certificate-word",
            student.id
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains("filename*=UTF-8''"));

    let body = test::read_body(resp).await;
    let text = docx_text(&body);
    let today = chrono::Local::now().date_naive();

    assert!(text.contains("Петров Иван"));
    assert!(text.contains("группа ИТ-21"));
    assert!(text.contains("Email: Не указан, телефон: Не указан"));
    assert!(text.contains(&today.format("%d.%m.%Y").to_string()));
    assert!(!text.contains("{{"));
}

#[actix_web::test]
async fn certificate_export_for_missing_student_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, config) = test_context(&dir).await;
    write_template(&dir);
    let app = test_app!(storage, config);

    let req = test::TestRequest::get()
        .uri("/api/export/student/9999/certificate-word")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn missing_template_is_a_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, config) = test_context(&dir).await;
    let app = test_app!(storage, config);

    let req = test::TestRequest::post()
        .uri("/api/students")
        .set_json(serde_json::json!({ "name": "Иван", "surname": "Петров" }))
        .to_request();
    let student: Student = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/export/student/{}/certificate-word",
            student.id
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);
}

#[actix_web::test]
async fn pdf_certificate_is_rendered() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, config) = test_context(&dir).await;
    let app = test_app!(storage, config);

    let req = test::TestRequest::post()
        .uri("/api/students")
        .set_json(serde_json::json!({ "name": "Анна", "surname": "Смирнова" }))
        .to_request();
    let student: Student = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/export/student/{}/certificate-pdf",
            student.id
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/pdf"
    );

    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"%PDF"));
}

#[actix_web::test]
async fn schedule_excel_is_rendered() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, config) = test_context(&dir).await;
    let app = test_app!(storage, config);

    let req = test::TestRequest::post()
        .uri("/api/groups")
        .set_json(serde_json::json!({ "name": "ИТ-21" }))
        .to_request();
    let group: Group = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/subjects")
        .set_json(serde_json::json!({ "name": "Физика" }))
        .to_request();
    let subject: Subject = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/schedule")
        .set_json(serde_json::json!({
            "group_id": group.id,
            "subject_id": subject.id,
            "day_of_week": "Среда",
            "lesson_number": 3,
            "room": "101"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri(&format!("/api/export/schedule/{}/excel", group.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("schedule_"));

    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"PK"));
}
