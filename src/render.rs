//! Certificate compositing.
//!
//! Draws one record onto a fresh copy of the background template. Every
//! configured coordinate whose field is present in the record is drawn
//! left-aligned with its baseline at the configured position; fields the
//! record does not carry are skipped silently. Output is a single encoded
//! PNG buffer; the renderer never touches disk.

use chrono::NaiveDate;
use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use thiserror::Error;

use crate::extract::{CellValue, Record};
use crate::registry::TemplateConfig;

const TEXT_SIZE: f32 = 28.0;
const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Fields carrying calendar-date semantics, re-rendered human readable.
const DATE_FIELDS: &[&str] = &["date", "from", "to"];

// Accepted spellings for dates that arrive as text cells.
const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("png encode: {0}")]
    Encode(String),
}

pub fn render(
    template: &RgbaImage,
    record: &Record,
    config: &TemplateConfig,
    font: &Font<'static>,
) -> Result<Vec<u8>, RenderError> {
    let mut out = template.clone();

    for (field, (x, y)) in config.coords {
        let Some(value) = record.get(field) else {
            continue;
        };
        let text = format_value(field, value);
        draw_text(&mut out, font, TEXT_SIZE, *x, *y, TEXT_COLOR, &text);
    }

    let mut buf = Vec::new();
    let enc = PngEncoder::new(&mut buf);
    enc.write_image(&out, out.width(), out.height(), ExtendedColorType::Rgba8)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Type-aware formatting. Date-like fields are re-rendered as
/// "5 Jun 2024" when they parse; anything unparseable is drawn verbatim.
pub fn format_value(field: &str, value: &CellValue) -> String {
    if !DATE_FIELDS.contains(&field) {
        return value.display();
    }
    match value {
        CellValue::Date(d) => format_date(*d),
        CellValue::Text(s) => match parse_date_text(s) {
            Some(d) => format_date(d),
            None => s.clone(),
        },
        other => other.display(),
    }
}

fn format_date(d: NaiveDate) -> String {
    d.format("%-d %b %Y").to_string()
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn draw_text(
    img: &mut RgbaImage,
    font: &Font<'static>,
    px: f32,
    x: f32,
    y: f32,
    color: Rgba<u8>,
    text: &str,
) {
    let scale = Scale::uniform(px);
    // (x, y) is the baseline origin of the first glyph.
    for glyph in font.layout(text, scale, point(x, y)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let dx = gx as i32 + bb.min.x;
                let dy = gy as i32 + bb.min.y;
                if dx < 0 || dy < 0 {
                    return;
                }
                let (dx, dy) = (dx as u32, dy as u32);
                if dx >= img.width() || dy >= img.height() {
                    return;
                }
                let a = (v * 255.0) as u8;
                if a == 0 {
                    return;
                }
                let dst = img.get_pixel_mut(dx, dy);
                // src-over blend of the glyph coverage onto the template.
                let sa = a as f32 / 255.0;
                let inv = 1.0 - sa;
                dst.0[0] = (color.0[0] as f32 * sa + dst.0[0] as f32 * inv) as u8;
                dst.0[1] = (color.0[1] as f32 * sa + dst.0[1] as f32 * inv) as u8;
                dst.0[2] = (color.0[2] as f32 * sa + dst.0[2] as f32 * inv) as u8;
                dst.0[3] = 255;
            });
        }
    }
}
