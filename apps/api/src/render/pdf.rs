//! PDF writer — justified paragraph blocks on A4 pages.
//!
//! Uses the base-14 Helvetica font with WinAnsi encoding, so no font
//! program is embedded and line measurement comes from the static metric
//! table. Justification stretches inter-word spaces (`Tw`) on every line
//! except a paragraph's last. A paragraph that cannot be encoded is
//! skipped with a warning — one bad paragraph never aborts the document.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use tracing::warn;

use super::metrics::{wrap_paragraph, Line};
use super::RenderError;

const A4_WIDTH_PT: f32 = 595.28;
const A4_HEIGHT_PT: f32 = 841.89;
const MARGIN_PT: f32 = 72.0;
const FONT_SIZE_PT: f32 = 11.0;
const LINE_HEIGHT_PT: f32 = 15.0;
const PARAGRAPH_SPACING_PT: f32 = 12.0;

#[derive(Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Paragraphs dropped because they could not be encoded.
    pub skipped_paragraphs: usize,
}

/// Lays the paragraphs out in order and assembles the document.
pub fn render_letter(paragraphs: &[String]) -> Result<RenderedPdf, RenderError> {
    let text_width = A4_WIDTH_PT - 2.0 * MARGIN_PT;
    let top_baseline = A4_HEIGHT_PT - MARGIN_PT - FONT_SIZE_PT;

    let mut pages: Vec<Vec<Operation>> = Vec::new();
    let mut ops: Vec<Operation> = Vec::new();
    let mut y = top_baseline;
    let mut skipped = 0usize;

    for paragraph in paragraphs {
        let normalized = normalize_typography(paragraph);
        let encodable = normalized.chars().all(|c| winansi_byte(c).is_some());
        if !encodable {
            warn!("Skipping paragraph that cannot be encoded: {normalized:.40}...");
            skipped += 1;
            continue;
        }

        let lines = wrap_paragraph(&normalized, FONT_SIZE_PT, text_width);
        if lines.is_empty() {
            continue;
        }

        for line in &lines {
            if y < MARGIN_PT {
                pages.push(std::mem::take(&mut ops));
                y = top_baseline;
            }
            emit_line(&mut ops, line, MARGIN_PT, y, text_width);
            y -= LINE_HEIGHT_PT;
        }
        y -= PARAGRAPH_SPACING_PT;
    }

    if !ops.is_empty() {
        pages.push(ops);
    }
    if pages.is_empty() {
        return Err(RenderError::NothingToRender);
    }

    let page_count = pages.len();
    let bytes = assemble_document(page_count, pages)?;
    Ok(RenderedPdf {
        bytes,
        page_count,
        skipped_paragraphs: skipped,
    })
}

/// One text object per line: set font, word spacing, position, show text.
fn emit_line(ops: &mut Vec<Operation>, line: &Line, x: f32, y: f32, text_width: f32) {
    let word_spacing = if !line.is_last && line.space_count > 0 {
        let extra = text_width - line.width_pt;
        if extra > 0.0 {
            extra / line.space_count as f32
        } else {
            0.0
        }
    } else {
        0.0
    };

    let encoded: Vec<u8> = line
        .text
        .chars()
        .filter_map(winansi_byte)
        .collect();

    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE_PT.into()]));
    ops.push(Operation::new("Tw", vec![word_spacing.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encoded, StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn assemble_document(
    page_count: usize,
    pages: Vec<Vec<Operation>>,
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Assembly(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH_PT.into(), A4_HEIGHT_PT.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Assembly(e.to_string()))?;
    Ok(bytes)
}

/// Maps common typographic punctuation down to its ASCII equivalent before
/// the encodability check.
fn normalize_typography(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

/// WinAnsi code for a character, when one exists. ASCII maps through
/// directly and the Latin-1 supplement coincides with WinAnsi.
fn winansi_byte(c: char) -> Option<u8> {
    match c as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(c as u8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_produces_a_pdf() {
        let paragraphs = vec![
            "Dear Hiring Manager, I am excited to apply.".to_string(),
            "Sincerely, Jane Doe".to_string(),
        ];
        let rendered = render_letter(&paragraphs).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.page_count, 1);
        assert_eq!(rendered.skipped_paragraphs, 0);
    }

    #[test]
    fn test_unencodable_paragraph_is_skipped_not_fatal() {
        let paragraphs = vec![
            "Readable paragraph.".to_string(),
            "打つことができない".to_string(),
            "Another readable one.".to_string(),
        ];
        let rendered = render_letter(&paragraphs).unwrap();
        assert_eq!(rendered.skipped_paragraphs, 1);
        assert!(rendered.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_all_paragraphs_unrenderable_is_an_error() {
        let paragraphs = vec!["打つ".to_string()];
        assert!(matches!(
            render_letter(&paragraphs),
            Err(RenderError::NothingToRender)
        ));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(
            render_letter(&[]),
            Err(RenderError::NothingToRender)
        ));
    }

    #[test]
    fn test_long_letter_breaks_across_pages() {
        let paragraphs = vec!["A short paragraph of letter text.".to_string(); 60];
        let rendered = render_letter(&paragraphs).unwrap();
        assert!(rendered.page_count >= 2, "got {} pages", rendered.page_count);
    }

    #[test]
    fn test_typographic_punctuation_is_normalized_not_skipped() {
        let paragraphs = vec!["It\u{2019}s a \u{201C}great\u{201D} fit \u{2014} truly.".to_string()];
        let rendered = render_letter(&paragraphs).unwrap();
        assert_eq!(rendered.skipped_paragraphs, 0);
    }

    #[test]
    fn test_normalize_typography_maps_to_ascii() {
        assert_eq!(normalize_typography("a\u{2013}b\u{2026}"), "a-b...");
    }

    #[test]
    fn test_winansi_rejects_outside_latin1() {
        assert_eq!(winansi_byte('A'), Some(b'A'));
        assert_eq!(winansi_byte('é'), Some(0xE9));
        assert_eq!(winansi_byte('€'), None);
        assert_eq!(winansi_byte('中'), None);
    }
}
