//! Output formatting — turns LetterText into justified A4 pages.
//!
//! Paragraph splitting is the only piece of logic the generation service
//! does not own: blank-line boundaries delimit paragraphs, intra-paragraph
//! newlines collapse to spaces, and empty paragraphs are discarded. The
//! PDF writer lays each surviving paragraph out as a justified block with
//! fixed spacing after it.

pub mod metrics;
pub mod pdf;

use thiserror::Error;

pub use pdf::{render_letter, RenderedPdf};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("letter text contained no renderable paragraphs")]
    NothingToRender,

    #[error("PDF assembly failed: {0}")]
    Assembly(String),
}

/// Splits letter text on blank-line boundaries into paragraphs.
/// Lines inside a paragraph are joined with a space; text with no blank
/// line anywhere becomes a single paragraph.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_boundaries_delimit_paragraphs() {
        let text = "Dear Hiring Manager,\n\nPara one.\n\nPara two.";
        assert_eq!(
            split_paragraphs(text),
            vec!["Dear Hiring Manager,", "Para one.", "Para two."]
        );
    }

    #[test]
    fn test_single_newline_merges_salutation_into_first_paragraph() {
        let text = "Dear Hiring Manager,\nPara one.\n\nPara two.";
        assert_eq!(
            split_paragraphs(text),
            vec!["Dear Hiring Manager, Para one.", "Para two."]
        );
    }

    #[test]
    fn test_no_blank_lines_is_one_paragraph() {
        let text = "line one\nline two\nline three";
        assert_eq!(split_paragraphs(text), vec!["line one line two line three"]);
    }

    #[test]
    fn test_runs_of_blank_lines_collapse() {
        let text = "a\n\n\n   \n\nb";
        assert_eq!(split_paragraphs(text), vec!["a", "b"]);
    }

    #[test]
    fn test_leading_and_trailing_blank_lines_are_dropped() {
        let text = "\n\nbody text\n\n";
        assert_eq!(split_paragraphs(text), vec!["body text"]);
    }

    #[test]
    fn test_empty_text_yields_no_paragraphs() {
        assert!(split_paragraphs("").is_empty());
        assert!(split_paragraphs("\n \n\t\n").is_empty());
    }
}
