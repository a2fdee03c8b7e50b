//! PDF certificate rendering.
//!
//! The page is drawn from scratch with absolute coordinates (PDF user
//! space, origin bottom-left): a colored frame, centered institution
//! header, reference number, body text, a boxed contact table, date and
//! signature lines, and the optional stamp image next to the seal mark.

use chrono::{Datelike, NaiveDate};
use printpdf::font::ParsedFont;
use printpdf::graphics::{LinePoint, PaintMode, Point, Polygon, PolygonRing, WindingOrder};
use printpdf::image::RawImage;
use printpdf::matrix::TextMatrix;
use printpdf::ops::Op;
use printpdf::text::TextItem;
use printpdf::xobject::{XObject, XObjectTransform};
use printpdf::{
    BuiltinFont, FontId, Mm, PdfDocument, PdfPage, PdfSaveOptions, Pt, Rgb, XObjectId,
};

use crate::export::{format_date, study_year, NOT_SPECIFIED_F, NOT_SPECIFIED_M};
use crate::models::Student;

const A4_WIDTH_PT: f32 = 595.28;
const A4_HEIGHT_PT: f32 = 841.89;

/// Stamp square size and its fixed horizontal offset next to the seal mark.
const STAMP_SIZE_PT: f32 = 80.0;
const STAMP_X_PT: f32 = 110.0;

/// Cyrillic-capable font files tried in order: DejaVu (Linux paths), then
/// Arial files in the working directory. The builtin Helvetica fallback
/// keeps rendering alive without Cyrillic glyph coverage, so it must stay
/// last.
const FONT_CANDIDATES: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    ),
    ("arial.ttf", "arialbd.ttf"),
];

#[derive(Clone)]
enum Font {
    Embedded(FontId),
    Builtin(BuiltinFont),
}

fn load_fonts(doc: &mut PdfDocument) -> (Font, Font) {
    for (regular_path, bold_path) in FONT_CANDIDATES {
        let Ok(regular_data) = std::fs::read(regular_path) else {
            continue;
        };
        let Ok(bold_data) = std::fs::read(bold_path) else {
            continue;
        };

        let mut warnings = Vec::new();
        let regular = ParsedFont::from_bytes(&regular_data, 0, &mut warnings);
        let bold = ParsedFont::from_bytes(&bold_data, 0, &mut warnings);

        if let (Some(regular), Some(bold)) = (regular, bold) {
            return (
                Font::Embedded(doc.add_font(&regular)),
                Font::Embedded(doc.add_font(&bold)),
            );
        }
    }

    tracing::warn!("no Cyrillic-capable font found, falling back to builtin Helvetica");
    (
        Font::Builtin(BuiltinFont::Helvetica),
        Font::Builtin(BuiltinFont::HelveticaBold),
    )
}

/// Rough width estimate for centering, in points. There is no shaping
/// engine here; per-character factors are tuned for DejaVu Sans.
fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars()
        .map(|c| match c {
            ' ' => 0.28,
            '.' | ',' | ':' | ';' | '\'' | '"' | '«' | '»' => 0.30,
            'i' | 'l' | 'j' | 't' | 'f' | '!' | '(' | ')' => 0.33,
            '№' => 0.90,
            c if c.is_uppercase() => 0.70,
            c if c.is_ascii_digit() => 0.56,
            _ => 0.54,
        })
        .sum::<f32>()
        * size
}

/// Stateful op accumulator mirroring a painter's canvas: shape ops close
/// any open text section, text ops open one.
struct Canvas {
    ops: Vec<Op>,
    in_text: bool,
}

impl Canvas {
    fn new() -> Self {
        Self {
            ops: Vec::new(),
            in_text: false,
        }
    }

    fn begin_text(&mut self) {
        if !self.in_text {
            self.ops.push(Op::StartTextSection);
            self.in_text = true;
        }
    }

    fn end_text(&mut self) {
        if self.in_text {
            self.ops.push(Op::EndTextSection);
            self.in_text = false;
        }
    }

    fn set_stroke_color(&mut self, r: f32, g: f32, b: f32) {
        self.end_text();
        self.ops.push(Op::SetOutlineColor {
            col: printpdf::color::Color::Rgb(Rgb::new(r, g, b, None)),
        });
    }

    fn set_line_width(&mut self, width: f32) {
        self.end_text();
        self.ops.push(Op::SetOutlineThickness { pt: Pt(width) });
    }

    fn rect_stroke(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.end_text();
        let corners = [
            (x, y),
            (x + width, y),
            (x + width, y + height),
            (x, y + height),
            (x, y),
        ];
        self.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: corners
                        .iter()
                        .map(|&(px, py)| LinePoint {
                            p: Point { x: Pt(px), y: Pt(py) },
                            bezier: false,
                        })
                        .collect(),
                }],
                mode: PaintMode::Stroke,
                winding_order: WindingOrder::EvenOdd,
            },
        });
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.end_text();
        self.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: vec![
                        LinePoint {
                            p: Point { x: Pt(x1), y: Pt(y1) },
                            bezier: false,
                        },
                        LinePoint {
                            p: Point { x: Pt(x2), y: Pt(y2) },
                            bezier: false,
                        },
                    ],
                }],
                mode: PaintMode::Stroke,
                winding_order: WindingOrder::EvenOdd,
            },
        });
    }

    fn text(&mut self, font: &Font, size: f32, x: f32, y: f32, content: &str) {
        self.begin_text();
        let items = vec![TextItem::Text(content.to_string())];
        let matrix = TextMatrix::Translate(Pt(x), Pt(y));

        match font {
            Font::Embedded(id) => {
                self.ops.push(Op::SetFontSize {
                    size: Pt(size),
                    font: id.clone(),
                });
                self.ops.push(Op::SetTextMatrix { matrix });
                self.ops.push(Op::WriteText {
                    items,
                    font: id.clone(),
                });
            }
            Font::Builtin(builtin) => {
                self.ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(size),
                    font: *builtin,
                });
                self.ops.push(Op::SetTextMatrix { matrix });
                self.ops.push(Op::WriteTextBuiltinFont {
                    items,
                    font: *builtin,
                });
            }
        }
    }

    fn text_centered(&mut self, font: &Font, size: f32, center_x: f32, y: f32, content: &str) {
        let x = center_x - approx_text_width(content, size) / 2.0;
        self.text(font, size, x, y, content);
    }

    fn finish(mut self) -> Vec<Op> {
        self.end_text();
        self.ops
    }
}

/// Render the certificate for `student` to a finished PDF byte buffer.
pub fn render(
    student: &Student,
    group_name: Option<&str>,
    stamp: Option<&[u8]>,
    today: NaiveDate,
) -> Vec<u8> {
    let mut doc = PdfDocument::new("Справка");
    let (regular, bold) = load_fonts(&mut doc);

    let width = A4_WIDTH_PT;
    let height = A4_HEIGHT_PT;
    let mut c = Canvas::new();

    // Frame.
    c.set_stroke_color(0.2, 0.2, 0.8);
    c.set_line_width(2.0);
    c.rect_stroke(40.0, 40.0, width - 80.0, height - 80.0);

    // Institution header.
    c.text_centered(&bold, 16.0, width / 2.0, height - 80.0, "МИНИСТЕРСТВО ОБРАЗОВАНИЯ");
    c.text_centered(
        &bold,
        14.0,
        width / 2.0,
        height - 105.0,
        "ГОСУДАРСТВЕННОЕ ОБРАЗОВАТЕЛЬНОЕ УЧРЕЖДЕНИЕ",
    );
    c.text_centered(&bold, 14.0, width / 2.0, height - 125.0, "\"ТЕХНИЧЕСКИЙ КОЛЛЕДЖ\"");

    c.set_stroke_color(0.5, 0.5, 0.5);
    c.set_line_width(1.0);
    c.line(80.0, height - 140.0, width - 80.0, height - 140.0);

    // Title and reference number.
    c.text_centered(&bold, 20.0, width / 2.0, height - 180.0, "СПРАВКА");
    let ref_number = format!("№ {}-PDF/{}", student.id, today.year());
    c.text_centered(&bold, 12.0, width / 2.0, height - 205.0, &ref_number);

    // Body.
    let mut y = height - 250.0;
    c.text(
        &regular,
        12.0,
        80.0,
        y,
        &format!("Выдана студенту(ке) {} {}", student.surname, student.name),
    );
    y -= 25.0;
    c.text(&regular, 12.0, 80.0, y, "в том, что он(а) обучается в");
    y -= 20.0;
    c.text(&bold, 12.0, 80.0, y, "Государственном образовательном учреждении");
    y -= 20.0;
    c.text(&bold, 12.0, 80.0, y, "\"Технический колледж\"");
    y -= 25.0;
    c.text(
        &regular,
        12.0,
        80.0,
        y,
        "по программе среднего профессионального образования",
    );
    y -= 20.0;
    c.text(
        &regular,
        12.0,
        80.0,
        y,
        &format!("в группе: {}", group_name.unwrap_or(NOT_SPECIFIED_F)),
    );
    y -= 20.0;
    c.text(
        &regular,
        12.0,
        80.0,
        y,
        &format!("с {} года по настоящее время.", study_year(today)),
    );

    // Contact table.
    y -= 40.0;
    c.text(&bold, 11.0, 80.0, y, "Контактные данные студента:");
    y -= 25.0;

    c.set_stroke_color(0.3, 0.3, 0.3);
    c.set_line_width(0.5);

    c.text(&bold, 10.0, 90.0, y, "ФИО:");
    c.text(&bold, 10.0, 90.0, y - 20.0, "Группа:");
    c.text(&bold, 10.0, 90.0, y - 40.0, "Email:");
    c.text(&bold, 10.0, 90.0, y - 60.0, "Телефон:");

    c.text(
        &regular,
        10.0,
        200.0,
        y,
        &format!("{} {}", student.surname, student.name),
    );
    c.text(
        &regular,
        10.0,
        200.0,
        y - 20.0,
        group_name.unwrap_or(NOT_SPECIFIED_F),
    );
    c.text(
        &regular,
        10.0,
        200.0,
        y - 40.0,
        student.email.as_deref().unwrap_or(NOT_SPECIFIED_M),
    );
    c.text(
        &regular,
        10.0,
        200.0,
        y - 60.0,
        student.phone.as_deref().unwrap_or(NOT_SPECIFIED_M),
    );

    c.rect_stroke(85.0, y - 75.0, width - 170.0, 90.0);

    // Purpose line.
    y -= 100.0;
    c.text(
        &regular,
        11.0,
        80.0,
        y,
        "Справка дана для предъявления по месту требования.",
    );

    // Issue date.
    y -= 40.0;
    c.text(
        &bold,
        11.0,
        80.0,
        y,
        &format!("Дата выдачи: {}", format_date(today)),
    );

    // Signatures.
    y -= 60.0;
    c.text(&regular, 11.0, 80.0, y, "Директор колледжа");
    c.text(&regular, 11.0, 270.0, y, "_________________");
    c.text(&bold, 11.0, 420.0, y, "И.И. Иванов");

    y -= 30.0;
    c.text(&regular, 11.0, 80.0, y, "Зам. директора по УР");
    c.text(&regular, 11.0, 270.0, y, "_________________");
    c.text(&bold, 11.0, 420.0, y, "С.П. Сидоров");

    // Seal mark and stamp image.
    y -= 40.0;
    c.text(&regular, 10.0, 80.0, y, "М.П.");

    if let Some(image) = stamp {
        let mut warnings = Vec::new();
        match RawImage::decode_from_bytes(image, &mut warnings) {
            Ok(raw) => {
                let (img_w, img_h) = (raw.width as f32, raw.height as f32);
                let id = XObjectId::new();
                doc.resources
                    .xobjects
                    .map
                    .insert(id.clone(), XObject::Image(raw));

                c.end_text();
                c.ops.push(Op::UseXobject {
                    id,
                    transform: XObjectTransform {
                        translate_x: Some(Pt(STAMP_X_PT)),
                        translate_y: Some(Pt(y - 50.0)),
                        scale_x: Some(STAMP_SIZE_PT / img_w),
                        scale_y: Some(STAMP_SIZE_PT / img_h),
                        rotate: None,
                        dpi: Some(72.0),
                    },
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "stamp image could not be decoded, skipping");
            }
        }
    }

    doc.pages.push(PdfPage::new(Mm(210.0), Mm(297.0), c.finish()));

    let mut buffer = Vec::new();
    let mut warnings = Vec::new();
    doc.save_writer(&mut buffer, &PdfSaveOptions::default(), &mut warnings);
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        Student {
            id: 3,
            name: "Анна".to_string(),
            surname: "Смирнова".to_string(),
            group_id: None,
            email: None,
            phone: Some("+7 900 000-00-00".to_string()),
        }
    }

    #[test]
    fn renders_a_pdf_document() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let bytes = render(&student(), Some("ИТ-21"), None, today);
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn undecodable_stamp_is_skipped() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let bytes = render(&student(), None, Some(b"not an image"), today);
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn centering_estimate_grows_with_text() {
        let short = approx_text_width("СПРАВКА", 20.0);
        let long = approx_text_width("МИНИСТЕРСТВО ОБРАЗОВАНИЯ", 20.0);
        assert!(long > short);
        assert!(short > 0.0);
    }
}
