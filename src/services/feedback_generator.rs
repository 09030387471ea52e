use std::sync::Arc;

use crate::constants::prompts;
use crate::models::domain::{AttemptAnswer, FeedbackReport, GraphData, QuizQuestion};
use crate::services::generation::GenerationBackend;
use crate::services::model_output;

const FEEDBACK_FALLBACK_TEXT: &str = "Could not generate detailed feedback at this time.";

/// The feedback prompt only needs enough corpus to anchor recommendations.
const CORPUS_EXCERPT_CHAR_LIMIT: usize = 3_000;

/// Produces the structured feedback report for a graded attempt. Feedback is
/// best-effort: a backend failure or unusable output yields a degraded
/// report carrying the raw text, never an error.
pub struct FeedbackGenerator {
    backend: Arc<dyn GenerationBackend>,
}

impl FeedbackGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub async fn generate(
        &self,
        questions: &[QuizQuestion],
        answers: &[AttemptAnswer],
        score: i16,
        corpus: &str,
    ) -> FeedbackReport {
        let correct = answers.iter().filter(|a| a.is_correct).count() as i16;
        let incorrect = answers.len() as i16 - correct;

        let questions_json =
            serde_json::to_string(questions).unwrap_or_else(|_| "[]".to_string());
        let answers_json = serde_json::to_string(answers).unwrap_or_else(|_| "[]".to_string());
        let excerpt: String = corpus.chars().take(CORPUS_EXCERPT_CHAR_LIMIT).collect();

        let prompt =
            prompts::build_feedback_prompt(&questions_json, &answers_json, score, &excerpt);

        let response = match self.backend.generate(&prompt).await {
            Ok(response) => response,
            Err(err) => {
                log::warn!("Feedback generation failed: {}", err);
                return degraded_report(correct, incorrect, err.to_string());
            }
        };

        match model_output::parse_feedback_report(&response) {
            Ok(report) => report,
            Err(err) => {
                log::warn!("Unusable feedback output: {}", err);
                degraded_report(correct, incorrect, response)
            }
        }
    }
}

fn degraded_report(correct: i16, incorrect: i16, debug: String) -> FeedbackReport {
    FeedbackReport {
        overall_feedback: FEEDBACK_FALLBACK_TEXT.to_string(),
        question_feedback: Vec::new(),
        recommendations: String::new(),
        graph_data: GraphData {
            correct,
            incorrect,
            concept_breakdown: Vec::new(),
        },
        interactive: None,
        debug: Some(debug),
    }
}
