//! Letter composition — validation gate, prompt assembly, generation call.
//!
//! The contact triple and required job fields are checked before anything
//! touches the generation service; a missing field blocks the call
//! entirely. Prompt assembly is a deterministic function of its inputs
//! plus the current date.

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::contact::ContactInfo;
use crate::errors::AppError;
use crate::letter::prompts::{LETTER_PROMPT_TEMPLATE, LETTER_SYSTEM};
use crate::llm_client::{GenerationService, LlmErrorKind};

/// Bounds of the word-count target, matching the submission form's slider.
pub const MIN_WORD_COUNT: u32 = 40;
pub const MAX_WORD_COUNT: u32 = 800;

/// Output language of the generated letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    #[serde(alias = "Bahasa Indonesia")]
    Indonesian,
}

impl Language {
    /// The name used inside the prompt.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Indonesian => "Indonesian (Bahasa Indonesia)",
        }
    }
}

/// User-supplied job-posting fields driving prompt assembly.
/// Requirements and HR fields are optional and degrade gracefully.
#[derive(Debug, Clone, Deserialize)]
pub struct JobContext {
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub hr_name: Option<String>,
    #[serde(default)]
    pub hr_role: Option<String>,
    pub word_count: u32,
    pub language: Language,
}

/// Result of a successful composition.
#[derive(Debug, Clone, Serialize)]
pub struct ComposedLetter {
    pub text: String,
    /// The model that actually produced the letter (primary or fallback).
    pub model: String,
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Names every required field that is still blank. Requirements and HR
/// fields are optional and never reported.
pub fn missing_fields(contact: &ContactInfo, job: &JobContext) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if is_blank(contact.name.as_deref()) {
        missing.push("name");
    }
    if is_blank(contact.email.as_deref()) {
        missing.push("email");
    }
    if is_blank(contact.phone.as_deref()) {
        missing.push("phone");
    }
    if job.title.trim().is_empty() {
        missing.push("job title");
    }
    if job.company.trim().is_empty() {
        missing.push("company name");
    }
    if job.description.trim().is_empty() {
        missing.push("job description");
    }
    missing
}

/// Who the letter is addressed to. Both HR fields → "to {name}, {role}";
/// name alone → the name; anything else → the generic target.
pub fn greeting_target(hr_name: Option<&str>, hr_role: Option<&str>) -> String {
    let name = hr_name.map(str::trim).filter(|s| !s.is_empty());
    let role = hr_role.map(str::trim).filter(|s| !s.is_empty());
    match (name, role) {
        (Some(name), Some(role)) => format!("to {name}, {role}"),
        (Some(name), None) => name.to_string(),
        _ => "the Hiring Manager".to_string(),
    }
}

/// Assembles the full generation prompt. Deterministic: same inputs and
/// date always produce the same string.
pub fn build_prompt(
    resume_text: &str,
    contact: &ContactInfo,
    job: &JobContext,
    date: &str,
) -> String {
    let requirements = if job.requirements.trim().is_empty() {
        "None specified."
    } else {
        job.requirements.trim()
    };

    LETTER_PROMPT_TEMPLATE
        .replace("{date}", date)
        .replace("{name}", contact.name.as_deref().unwrap_or_default())
        .replace("{email}", contact.email.as_deref().unwrap_or_default())
        .replace("{phone}", contact.phone.as_deref().unwrap_or_default())
        .replace("{resume_text}", resume_text)
        .replace("{job_title}", &job.title)
        .replace("{company}", &job.company)
        .replace("{job_description}", &job.description)
        .replace("{job_requirements}", requirements)
        .replace("{language}", job.language.prompt_name())
        .replace("{word_count}", &job.word_count.to_string())
        .replace(
            "{greeting_target}",
            &greeting_target(job.hr_name.as_deref(), job.hr_role.as_deref()),
        )
}

/// A primary-attempt failure is eligible for the one fallback attempt only
/// when switching models could plausibly change the outcome.
fn fallback_eligible(kind: LlmErrorKind) -> bool {
    matches!(
        kind,
        LlmErrorKind::UnknownModel | LlmErrorKind::QuotaExceeded
    )
}

/// Runs the composition pipeline: field gate → prompt assembly → one
/// generation call, plus at most one explicit fallback-model attempt.
pub async fn compose_letter(
    llm: &dyn GenerationService,
    model: &str,
    fallback_model: Option<&str>,
    resume_text: &str,
    contact: &ContactInfo,
    job: &JobContext,
) -> Result<ComposedLetter, AppError> {
    let missing = missing_fields(contact, job);
    if !missing.is_empty() {
        return Err(AppError::MissingFields(missing));
    }
    if !(MIN_WORD_COUNT..=MAX_WORD_COUNT).contains(&job.word_count) {
        return Err(AppError::Validation(format!(
            "word_count must be between {MIN_WORD_COUNT} and {MAX_WORD_COUNT}, got {}",
            job.word_count
        )));
    }

    let date = Local::now().format("%d %B %Y").to_string();
    let prompt = build_prompt(resume_text, contact, job, &date);

    info!(
        "Generating cover letter: position={}, company={}, language={:?}, target_words={}",
        job.title, job.company, job.language, job.word_count
    );

    let primary = match llm.generate(model, LETTER_SYSTEM, &prompt).await {
        Ok(text) => {
            return Ok(ComposedLetter {
                text,
                model: model.to_string(),
            })
        }
        Err(e) => e,
    };

    if let Some(fallback) = fallback_model {
        if fallback_eligible(primary.kind()) {
            warn!("Model '{model}' failed ({primary}); trying fallback '{fallback}' once");
            match llm.generate(fallback, LETTER_SYSTEM, &prompt).await {
                Ok(text) => {
                    return Ok(ComposedLetter {
                        text,
                        model: fallback.to_string(),
                    })
                }
                Err(e) => warn!("Fallback model '{fallback}' also failed: {e}"),
            }
        }
    }

    Err(AppError::Generation(primary))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::LlmError;

    fn job() -> JobContext {
        JobContext {
            title: "Backend Engineer".to_string(),
            company: "PT Maju Jaya".to_string(),
            description: "Build APIs in Rust.".to_string(),
            requirements: String::new(),
            hr_name: None,
            hr_role: None,
            word_count: 100,
            language: Language::English,
        }
    }

    fn contact() -> ContactInfo {
        ContactInfo {
            name: Some("John Smith".to_string()),
            email: Some("john.smith@mail.com".to_string()),
            phone: Some("08123456789".to_string()),
        }
    }

    /// Scripted mock: per-model outcome, counting every invocation.
    struct ScriptedLlm {
        calls: AtomicUsize,
        // model -> Ok(text) or Err(http status)
        outcomes: HashMap<String, Result<String, u16>>,
    }

    impl ScriptedLlm {
        fn new(outcomes: &[(&str, Result<&str, u16>)]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcomes: outcomes
                    .iter()
                    .map(|(m, o)| (m.to_string(), o.map(str::to_string)))
                    .collect(),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationService for ScriptedLlm {
        async fn generate(
            &self,
            model: &str,
            _system: &str,
            _prompt: &str,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcomes.get(model) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(status)) => Err(LlmError::Api {
                    status: *status,
                    message: format!("scripted failure for {model}"),
                }),
                None => Err(LlmError::EmptyContent),
            }
        }
    }

    #[test]
    fn test_greeting_with_name_and_role() {
        assert_eq!(
            greeting_target(Some("Sarah Johnson"), Some("HR Manager")),
            "to Sarah Johnson, HR Manager"
        );
    }

    #[test]
    fn test_greeting_with_name_only_is_the_name_alone() {
        assert_eq!(greeting_target(Some("Sarah Johnson"), Some("")), "Sarah Johnson");
        assert_eq!(greeting_target(Some("Sarah Johnson"), None), "Sarah Johnson");
    }

    #[test]
    fn test_greeting_without_name_is_generic() {
        assert_eq!(greeting_target(None, None), "the Hiring Manager");
        assert_eq!(greeting_target(None, Some("HR Manager")), "the Hiring Manager");
        assert_eq!(greeting_target(Some("   "), None), "the Hiring Manager");
    }

    #[test]
    fn test_missing_fields_lists_every_blank_required_field() {
        let empty_job = JobContext {
            title: String::new(),
            company: "  ".to_string(),
            description: String::new(),
            ..job()
        };
        let missing = missing_fields(&ContactInfo::default(), &empty_job);
        assert_eq!(
            missing,
            vec![
                "name",
                "email",
                "phone",
                "job title",
                "company name",
                "job description"
            ]
        );
    }

    #[test]
    fn test_missing_fields_empty_when_required_fields_present() {
        assert!(missing_fields(&contact(), &job()).is_empty());
    }

    #[test]
    fn test_optional_fields_are_never_reported() {
        let mut j = job();
        j.requirements = String::new();
        j.hr_name = None;
        j.hr_role = None;
        assert!(missing_fields(&contact(), &j).is_empty());
    }

    #[test]
    fn test_prompt_contains_the_assembled_pieces() {
        let prompt = build_prompt("Ten years of Rust.", &contact(), &job(), "06 August 2026");
        assert!(prompt.contains("Date: 06 August 2026"));
        assert!(prompt.contains("Name: John Smith"));
        assert!(prompt.contains("Position: Backend Engineer"));
        assert!(prompt.contains("Ten years of Rust."));
        assert!(prompt.contains("approximately 100 words (plus or minus 15%)"));
        assert!(prompt.contains("write the letter in English"));
        assert!(prompt.contains("Address the letter to the Hiring Manager."));
        assert!(prompt.contains("Requirements: None specified."));
        assert!(!prompt.contains("{"), "unreplaced placeholder:\n{prompt}");
    }

    #[test]
    fn test_prompt_assembly_is_deterministic() {
        let a = build_prompt("resume", &contact(), &job(), "01 January 2026");
        let b = build_prompt("resume", &contact(), &job(), "01 January 2026");
        assert_eq!(a, b);
    }

    #[test]
    fn test_indonesian_language_is_spelled_out() {
        let mut j = job();
        j.language = Language::Indonesian;
        let prompt = build_prompt("resume", &contact(), &j, "06 August 2026");
        assert!(prompt.contains("Indonesian (Bahasa Indonesia)"));
    }

    #[test]
    fn test_language_accepts_form_alias() {
        let lang: Language = serde_json::from_str(r#""Bahasa Indonesia""#).unwrap();
        assert_eq!(lang, Language::Indonesian);
    }

    #[tokio::test]
    async fn test_generation_is_not_invoked_while_fields_are_missing() {
        let llm = ScriptedLlm::new(&[("m", Ok("letter"))]);
        let mut incomplete = contact();
        incomplete.email = None;

        let result = compose_letter(&llm, "m", None, "resume", &incomplete, &job()).await;

        assert!(matches!(result, Err(AppError::MissingFields(ref f)) if f == &vec!["email"]));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_word_count_out_of_range_blocks_generation() {
        let llm = ScriptedLlm::new(&[("m", Ok("letter"))]);
        let mut j = job();
        j.word_count = 1000;

        let result = compose_letter(&llm, "m", None, "resume", &contact(), &j).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_composition_reports_primary_model() {
        let llm = ScriptedLlm::new(&[("m", Ok("Dear Hiring Manager,"))]);
        let composed = compose_letter(&llm, "m", Some("backup"), "resume", &contact(), &job())
            .await
            .unwrap();
        assert_eq!(composed.text, "Dear Hiring Manager,");
        assert_eq!(composed.model, "m");
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_model_falls_back_once() {
        let llm = ScriptedLlm::new(&[("m", Err(404)), ("backup", Ok("letter"))]);
        let composed = compose_letter(&llm, "m", Some("backup"), "resume", &contact(), &job())
            .await
            .unwrap();
        assert_eq!(composed.model, "backup");
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_credential_failure_is_not_eligible_for_fallback() {
        let llm = ScriptedLlm::new(&[("m", Err(401)), ("backup", Ok("letter"))]);
        let result = compose_letter(&llm, "m", Some("backup"), "resume", &contact(), &job()).await;
        assert!(matches!(result, Err(AppError::Generation(_))));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_fallback_configured_means_single_attempt() {
        let llm = ScriptedLlm::new(&[("m", Err(429))]);
        let result = compose_letter(&llm, "m", None, "resume", &contact(), &job()).await;
        assert!(matches!(result, Err(AppError::Generation(_))));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_fallback_reports_the_primary_error() {
        let llm = ScriptedLlm::new(&[("m", Err(429)), ("backup", Err(500))]);
        let result = compose_letter(&llm, "m", Some("backup"), "resume", &contact(), &job()).await;
        match result {
            Err(AppError::Generation(e)) => assert!(e.to_string().contains("scripted failure for m")),
            other => panic!("expected generation error, got {other:?}"),
        }
        assert_eq!(llm.call_count(), 2);
    }
}
