//! Axum route handlers for the letter pipeline.

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::contact::{extract_contact, ContactInfo};
use crate::errors::AppError;
use crate::extract::extract_text;
use crate::letter::composer::{compose_letter, JobContext};
use crate::render::{render_letter, split_paragraphs};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub resume_text: String,
    pub contact: ContactInfo,
    /// Set when the upload could not be decoded; resume_text is empty and
    /// all three contact fields fall back to manual entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateLetterRequest {
    pub resume_text: String,
    /// Extracted triple with any absent field overwritten by manual entry.
    pub contact: ContactInfo,
    pub job: JobContext,
}

#[derive(Debug, Serialize)]
pub struct GenerateLetterResponse {
    pub letter_text: String,
    /// Model that produced the letter (primary, or the fallback if used).
    pub model: String,
    pub word_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct RenderLetterRequest {
    pub letter_text: String,
    #[serde(default)]
    pub applicant_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/letters/extract
///
/// Multipart upload of one résumé file. Decode failures are recovered, not
/// propagated: the response carries empty text plus a warning so the client
/// prompts for all three contact fields manually.
pub async fn handle_extract(
    State(_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let media_type = field.content_type().unwrap_or_default().to_string();
        let data: bytes::Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;

        let response = match extract_text(&media_type, &data) {
            Ok(text) => {
                let contact = extract_contact(&text);
                info!(
                    "Extracted {} bytes of text (name: {}, email: {}, phone: {})",
                    text.len(),
                    contact.name.is_some(),
                    contact.email.is_some(),
                    contact.phone.is_some()
                );
                ExtractResponse {
                    resume_text: text,
                    contact,
                    warning: None,
                }
            }
            Err(e) => {
                warn!("Extraction failed: {e}");
                ExtractResponse {
                    resume_text: String::new(),
                    contact: ContactInfo::default(),
                    warning: Some(e.to_string()),
                }
            }
        };
        return Ok(Json(response));
    }

    Err(AppError::Validation(
        "multipart field 'file' is required".to_string(),
    ))
}

/// POST /api/v1/letters/generate
///
/// Runs the composition pipeline against the configured model. Rejects
/// before the generation call when any required field is blank.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateLetterRequest>,
) -> Result<Json<GenerateLetterResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty — upload a résumé first".to_string(),
        ));
    }

    let composed = compose_letter(
        state.llm.as_ref(),
        &state.config.model,
        state.config.fallback_model.as_deref(),
        &request.resume_text,
        &request.contact,
        &request.job,
    )
    .await?;

    let word_count = composed.text.split_whitespace().count();
    Ok(Json(GenerateLetterResponse {
        letter_text: composed.text,
        model: composed.model,
        word_count,
    }))
}

/// POST /api/v1/letters/render
///
/// Formats letter text into a paginated A4 PDF attachment.
pub async fn handle_render(
    State(_state): State<AppState>,
    Json(request): Json<RenderLetterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.letter_text.trim().is_empty() {
        return Err(AppError::Validation(
            "letter_text cannot be empty".to_string(),
        ));
    }

    let paragraphs = split_paragraphs(&request.letter_text);
    let rendered = render_letter(&paragraphs).map_err(|e| AppError::Render(e.to_string()))?;
    if rendered.skipped_paragraphs > 0 {
        warn!(
            "Rendered letter with {} skipped paragraph(s)",
            rendered.skipped_paragraphs
        );
    }

    let filename = download_filename(
        request.applicant_name.as_deref(),
        request.company.as_deref(),
    );
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, rendered.bytes))
}

/// `Cover_Letter[_{name}][_{company}].pdf`, spaces collapsed to
/// underscores and anything outside [A-Za-z0-9_-] dropped.
fn download_filename(applicant_name: Option<&str>, company: Option<&str>) -> String {
    let mut stem = String::from("Cover_Letter");
    for part in [applicant_name, company].into_iter().flatten() {
        let clean: String = part
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        if !clean.is_empty() {
            stem.push('_');
            stem.push_str(&clean);
        }
    }
    format!("{stem}.pdf")
}
