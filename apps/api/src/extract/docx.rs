//! DOCX text extraction.
//!
//! A .docx file is a ZIP archive; the document body lives in
//! `word/document.xml`. Text runs (`w:t`) are grouped per paragraph (`w:p`)
//! and paragraphs are joined with a single newline, preserving blank
//! paragraphs so line positions survive for the name heuristic downstream.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractError;

pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Decode(format!("DOCX is not a readable archive: {e}")))?;

    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Decode(format!("DOCX has no word/document.xml: {e}")))?
        .read_to_string(&mut document_xml)
        .map_err(|e| ExtractError::Decode(format!("DOCX document.xml unreadable: {e}")))?;

    let paragraphs = paragraphs_from_xml(&document_xml)?;
    Ok(paragraphs.join("\n"))
}

/// Walks the document XML and collects the text of each `w:p` element.
/// Text events outside `w:t` (markup whitespace) are ignored; whitespace
/// inside a run is significant and kept.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut current_paragraph = String::new();
    let mut in_text = false;
    let mut in_paragraph = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:p" => {
                    in_paragraph = true;
                    current_paragraph.clear();
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    in_paragraph = false;
                    paragraphs.push(current_paragraph.trim().to_string());
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text && in_paragraph {
                    let text = e
                        .unescape()
                        .map_err(|e| ExtractError::Decode(format!("DOCX XML text: {e}")))?;
                    current_paragraph.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::Decode(format!(
                    "DOCX XML parse error at position {}: {e:?}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}
