use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{QuestionType, QuizQuestion};

/// Shape the question-generation prompt asks the backend to produce.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct GeneratedQuizDto {
    #[serde(default)]
    pub title: Option<String>,
    pub questions: Vec<GeneratedQuestionDto>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestionDto {
    pub question: String,
    pub options: Vec<String>,
    pub correct_option: i16,
    pub question_type: QuestionType,
}

impl GeneratedQuestionDto {
    pub fn into_question(self, quiz_id: &str) -> QuizQuestion {
        QuizQuestion {
            id: Uuid::new_v4().to_string(),
            quiz_id: quiz_id.to_string(),
            question: self.question,
            options: self.options,
            correct_option: self.correct_option,
            question_type: self.question_type,
            created_at: Some(Utc::now()),
        }
    }
}
