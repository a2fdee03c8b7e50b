//! Excel timetable rendering.
//!
//! One worksheet with an institution banner, a weekday-by-lesson grid for
//! a single group, and a date/signature footer. Occupied cells show the
//! subject name (plus room), empty cells show a dash.

use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

use crate::export::{format_date, ExportError};
use crate::models::{Group, ScheduleSlot, Subject};

/// Grid columns, Monday through Saturday. Slot `day_of_week` values must
/// match these names exactly to land in the grid.
pub const WEEKDAYS: [&str; 6] = [
    "Понедельник",
    "Вторник",
    "Среда",
    "Четверг",
    "Пятница",
    "Суббота",
];

/// Fixed time ranges for lessons 1 through 4.
pub const LESSON_TIMES: [&str; 4] = [
    "08:30 - 10:00",
    "10:10 - 11:40",
    "12:00 - 13:30",
    "13:40 - 15:10",
];

/// Shown when a slot references a subject that no longer exists.
const UNKNOWN_SUBJECT: &str = "Неизвестно";

const HEADER_FILL: Color = Color::RGB(0x4472C4);
const MATCH_FILL: Color = Color::RGB(0xE7E6E6);

const HEADER_ROW: u32 = 8;
const DATE_ROW: u32 = 15;
const SIGNATURE_ROW: u32 = 17;
const LAST_COL: u16 = 6;

/// Content of the grid cell for (`lesson_number`, `weekday`): the first
/// matching slot wins; `None` when the cell is free.
fn cell_text(
    slots: &[ScheduleSlot],
    subjects: &[Subject],
    lesson_number: i64,
    weekday: &str,
) -> Option<String> {
    let slot = slots
        .iter()
        .find(|s| s.lesson_number == lesson_number && s.day_of_week == weekday)?;

    let subject_name = subjects
        .iter()
        .find(|s| s.id == slot.subject_id)
        .map(|s| s.name.as_str())
        .unwrap_or(UNKNOWN_SUBJECT);

    match &slot.room {
        Some(room) => Some(format!("{subject_name}\n(ауд. {room})")),
        None => Some(subject_name.to_string()),
    }
}

/// Render the timetable workbook for `group` to `.xlsx` bytes.
pub fn render(
    group: &Group,
    slots: &[ScheduleSlot],
    subjects: &[Subject],
    today: NaiveDate,
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Расписание").map_err(wrap)?;

    let centered = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    // Banner.
    let banner_title = centered
        .clone()
        .set_font_name("Arial")
        .set_font_size(16)
        .set_bold();
    let banner_sub = centered
        .clone()
        .set_font_name("Arial")
        .set_font_size(14)
        .set_bold();
    let banner_small = centered.clone().set_font_name("Arial").set_font_size(10);

    worksheet
        .merge_range(
            0,
            0,
            0,
            LAST_COL,
            "ГОСУДАРСТВЕННОЕ ОБРАЗОВАТЕЛЬНОЕ УЧРЕЖДЕНИЕ",
            &banner_title,
        )
        .map_err(wrap)?;
    worksheet.set_row_height(0, 25).map_err(wrap)?;
    worksheet
        .merge_range(1, 0, 1, LAST_COL, "\"ТЕХНИЧЕСКИЙ КОЛЛЕДЖ\"", &banner_sub)
        .map_err(wrap)?;
    worksheet.set_row_height(1, 20).map_err(wrap)?;
    worksheet
        .merge_range(
            2,
            0,
            2,
            LAST_COL,
            "г. Москва, ул. Профессиональная, д. 15",
            &banner_small,
        )
        .map_err(wrap)?;

    // Title block.
    worksheet
        .merge_range(4, 0, 4, LAST_COL, "РАСПИСАНИЕ ЗАНЯТИЙ", &banner_sub)
        .map_err(wrap)?;
    worksheet.set_row_height(4, 25).map_err(wrap)?;

    let subtitle = centered
        .clone()
        .set_font_name("Arial")
        .set_font_size(12)
        .set_bold();
    worksheet
        .merge_range(5, 0, 5, LAST_COL, &format!("Группа: {}", group.name), &subtitle)
        .map_err(wrap)?;
    worksheet.set_row_height(5, 20).map_err(wrap)?;

    let italic_small = centered
        .clone()
        .set_font_name("Arial")
        .set_font_size(10)
        .set_italic();
    worksheet
        .merge_range(
            6,
            0,
            6,
            LAST_COL,
            &format!("Учебный год: {}-{}", today.year(), today.year() + 1),
            &italic_small,
        )
        .map_err(wrap)?;

    // Grid header.
    let header = centered
        .clone()
        .set_font_name("Arial")
        .set_font_size(14)
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(HEADER_FILL)
        .set_border(FormatBorder::Thin);

    worksheet
        .write_with_format(HEADER_ROW, 0, "Пара", &header)
        .map_err(wrap)?;
    for (i, weekday) in WEEKDAYS.iter().enumerate() {
        worksheet
            .write_with_format(HEADER_ROW, (i + 1) as u16, *weekday, &header)
            .map_err(wrap)?;
    }
    worksheet.set_row_height(HEADER_ROW, 30).map_err(wrap)?;

    worksheet.set_column_width(0, 10).map_err(wrap)?;
    for col in 1..=LAST_COL {
        worksheet.set_column_width(col, 22).map_err(wrap)?;
    }

    // Lesson rows.
    let lesson_label = centered
        .clone()
        .set_font_name("Arial")
        .set_font_size(10)
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_text_wrap();
    let free_cell = centered
        .clone()
        .set_font_name("Arial")
        .set_font_size(11)
        .set_border(FormatBorder::Thin)
        .set_text_wrap();
    let occupied_cell = free_cell.clone().set_background_color(MATCH_FILL);

    for lesson_number in 1..=4i64 {
        let row = HEADER_ROW + lesson_number as u32;

        worksheet
            .write_with_format(
                row,
                0,
                format!("{}\n{}", lesson_number, LESSON_TIMES[lesson_number as usize - 1]),
                &lesson_label,
            )
            .map_err(wrap)?;

        for (i, weekday) in WEEKDAYS.iter().enumerate() {
            let col = (i + 1) as u16;
            match cell_text(slots, subjects, lesson_number, weekday) {
                Some(text) => worksheet
                    .write_with_format(row, col, text, &occupied_cell)
                    .map_err(wrap)?,
                None => worksheet
                    .write_with_format(row, col, "-", &free_cell)
                    .map_err(wrap)?,
            };
        }

        worksheet.set_row_height(row, 50).map_err(wrap)?;
    }

    // Footer.
    worksheet
        .merge_range(
            DATE_ROW,
            0,
            DATE_ROW,
            LAST_COL,
            &format!("Дата формирования расписания: {}", format_date(today)),
            &italic_small,
        )
        .map_err(wrap)?;

    let plain = Format::new().set_font_name("Arial").set_font_size(11);
    let plain_centered = plain
        .clone()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let signer = plain.clone().set_bold();

    worksheet
        .merge_range(
            SIGNATURE_ROW,
            0,
            SIGNATURE_ROW,
            3,
            "Заместитель директора по УР:",
            &plain,
        )
        .map_err(wrap)?;
    worksheet
        .merge_range(SIGNATURE_ROW, 4, SIGNATURE_ROW, 5, "_________________", &plain_centered)
        .map_err(wrap)?;
    worksheet
        .write_with_format(SIGNATURE_ROW, 6, "С.П. Сидоров", &signer)
        .map_err(wrap)?;

    workbook.save_to_buffer().map_err(wrap)
}

fn wrap(err: rust_xlsxwriter::XlsxError) -> ExportError {
    ExportError::Workbook(err.to_string())
}
