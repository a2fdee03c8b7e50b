//! Word certificate rendering.
//!
//! The template is a regular `.docx` with `{{token}}` placeholders. Tokens
//! are substituted only when a placeholder sits inside a single text run;
//! a token the editor split across runs is left as-is, matching how the
//! issued templates are authored.

use std::io::Cursor;

use chrono::{Datelike, NaiveDate};
use docx_rs::{
    read_docx, AlignmentType, DocumentChild, Docx, Paragraph, ParagraphChild, Pic, Run, RunChild,
    TableCellContent, TableChild, TableRowChild,
};

use crate::export::{format_date, study_year, ExportError, NOT_SPECIFIED_F, NOT_SPECIFIED_M};
use crate::models::Student;

/// Stamp image square, 4cm each side (EMU).
const STAMP_SIZE_EMU: u32 = 1_440_000;
/// Left indent of the stamp paragraph, 0.5cm (twips).
const STAMP_INDENT_TWIPS: i32 = 284;

/// The placeholder-to-value table for one student.
fn placeholder_values(
    student: &Student,
    group_name: Option<&str>,
    today: NaiveDate,
) -> Vec<(&'static str, String)> {
    vec![
        (
            "{{ref_number}}",
            format!("{}-СТ/{}", student.id, today.year()),
        ),
        (
            "{{student_fio}}",
            format!("{} {}", student.surname, student.name),
        ),
        (
            "{{group_name}}",
            group_name.unwrap_or(NOT_SPECIFIED_F).to_string(),
        ),
        ("{{study_year}}", study_year(today).to_string()),
        (
            "{{email}}",
            student
                .email
                .clone()
                .unwrap_or_else(|| NOT_SPECIFIED_M.to_string()),
        ),
        (
            "{{phone}}",
            student
                .phone
                .clone()
                .unwrap_or_else(|| NOT_SPECIFIED_M.to_string()),
        ),
        ("{{issue_date}}", format_date(today)),
    ]
}

fn replace_in_paragraph(paragraph: &mut Paragraph, values: &[(&'static str, String)]) {
    for child in &mut paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &mut run.children {
                if let RunChild::Text(text) = run_child {
                    for (token, value) in values {
                        if text.text.contains(token) {
                            text.text = text.text.replace(token, value);
                        }
                    }
                }
            }
        }
    }
}

fn substitute(docx: &mut Docx, values: &[(&'static str, String)]) {
    for child in &mut docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => replace_in_paragraph(paragraph, values),
            DocumentChild::Table(table) => {
                for row in &mut table.rows {
                    let TableChild::TableRow(row) = row;
                    for cell in &mut row.cells {
                        let TableRowChild::TableCell(cell) = cell;
                        for content in &mut cell.children {
                            if let TableCellContent::Paragraph(paragraph) = content {
                                replace_in_paragraph(paragraph, values);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// Insert the stamp image just before the document's last paragraph, where
/// the signature block sits.
fn insert_stamp(docx: &mut Docx, image: &[u8]) {
    let pic = Pic::new(image).size(STAMP_SIZE_EMU, STAMP_SIZE_EMU);
    let stamp_paragraph = Paragraph::new()
        .add_run(Run::new().add_image(pic))
        .align(AlignmentType::Left)
        .indent(Some(STAMP_INDENT_TWIPS), None, None, None);

    let last_paragraph = docx
        .document
        .children
        .iter()
        .rposition(|child| matches!(child, DocumentChild::Paragraph(_)));

    let stamp_child = DocumentChild::Paragraph(Box::new(stamp_paragraph));
    match last_paragraph {
        Some(index) => docx.document.children.insert(index, stamp_child),
        None => docx.document.children.push(stamp_child),
    }
}

/// Render a certificate for `student` from the template bytes, returning the
/// packed `.docx`.
pub fn render(
    template: &[u8],
    stamp: Option<&[u8]>,
    student: &Student,
    group_name: Option<&str>,
    today: NaiveDate,
) -> Result<Vec<u8>, ExportError> {
    let mut docx = read_docx(template).map_err(|e| ExportError::TemplateParse(e.to_string()))?;

    let values = placeholder_values(student, group_name, today);
    substitute(&mut docx, &values);

    if let Some(image) = stamp {
        insert_stamp(&mut docx, image);
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| ExportError::Pack(e.to_string()))?;

    Ok(cursor.into_inner())
}
