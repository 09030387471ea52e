//! Coercion of free-text model output into typed domain objects.
//!
//! The backend returns prose with JSON somewhere inside it. Extraction
//! prefers a fenced code block; failing that the whole response is parsed as
//! JSON. Validation goes through an untyped intermediate first so a shape
//! problem reports as a schema error rather than a parse error.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::domain::FeedbackReport;
use crate::models::dto::generation::GeneratedQuizDto;

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").expect("FENCED_BLOCK is a valid regex pattern")
});

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelOutputError {
    #[error("Model output is not valid JSON: {0}")]
    Parse(String),

    #[error("Model output has the wrong shape: {0}")]
    Schema(String),
}

/// Content of the first fenced code block, or the trimmed response when no
/// fence is present.
pub fn extract_json_block(response: &str) -> &str {
    FENCED_BLOCK
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or_else(|| response.trim())
}

pub fn parse_generated_quiz(response: &str) -> Result<GeneratedQuizDto, ModelOutputError> {
    let block = extract_json_block(response);

    let value: serde_json::Value =
        serde_json::from_str(block).map_err(|e| ModelOutputError::Parse(e.to_string()))?;

    let questions = value
        .as_object()
        .and_then(|obj| obj.get("questions"))
        .ok_or_else(|| {
            ModelOutputError::Schema("expected an object with a 'questions' field".to_string())
        })?;
    if !questions.is_array() {
        return Err(ModelOutputError::Schema(
            "'questions' must be an array".to_string(),
        ));
    }

    let quiz: GeneratedQuizDto =
        serde_json::from_value(value).map_err(|e| ModelOutputError::Schema(e.to_string()))?;

    if quiz.questions.is_empty() {
        return Err(ModelOutputError::Schema(
            "'questions' array is empty".to_string(),
        ));
    }

    for (index, question) in quiz.questions.iter().enumerate() {
        if question.question.trim().is_empty() {
            return Err(ModelOutputError::Schema(format!(
                "question {} has empty text",
                index
            )));
        }
        if question.options.len() < 2 {
            return Err(ModelOutputError::Schema(format!(
                "question {} has fewer than two options",
                index
            )));
        }
        if question.question_type == crate::models::domain::QuestionType::TrueFalse
            && question.options.len() != 2
        {
            return Err(ModelOutputError::Schema(format!(
                "true/false question {} must have exactly two options",
                index
            )));
        }
        let option_count = question.options.len() as i16;
        if question.correct_option < 0 || question.correct_option >= option_count {
            return Err(ModelOutputError::Schema(format!(
                "question {} correct option {} is out of range",
                index, question.correct_option
            )));
        }
    }

    Ok(quiz)
}

/// Minimal validation for feedback: a non-empty `overallFeedback` string and
/// a `questionFeedback` array must both be present. Anything richer is
/// optional and defaulted by the report type itself.
pub fn parse_feedback_report(response: &str) -> Result<FeedbackReport, ModelOutputError> {
    let block = extract_json_block(response);

    let value: serde_json::Value =
        serde_json::from_str(block).map_err(|e| ModelOutputError::Parse(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| ModelOutputError::Schema("expected a JSON object".to_string()))?;

    let overall_ok = object
        .get("overallFeedback")
        .and_then(|v| v.as_str())
        .is_some_and(|s| !s.trim().is_empty());
    if !overall_ok {
        return Err(ModelOutputError::Schema(
            "missing or empty 'overallFeedback'".to_string(),
        ));
    }
    if !object
        .get("questionFeedback")
        .is_some_and(|v| v.is_array())
    {
        return Err(ModelOutputError::Schema(
            "missing 'questionFeedback' array".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| ModelOutputError::Schema(e.to_string()))
}
