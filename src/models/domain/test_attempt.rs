use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::feedback::FeedbackReport;
use crate::models::domain::quiz_question::QuizQuestion;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TestAttempt {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    /// One entry per quiz question, in question order. Selections are null
    /// until the attempt is submitted.
    pub answers: Vec<AttemptAnswer>,
    pub score: i16, // 0-100, rounded
    pub correct_count: i16,
    pub incorrect_count: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttemptAnswer {
    pub quiz_question_id: String,
    pub selected_option: Option<i16>,
    pub is_correct: bool,
}

impl TestAttempt {
    /// Placeholder attempt created when the user starts a quiz: one null
    /// answer per question, no score, no feedback.
    pub fn new_placeholder(user_id: &str, quiz_id: &str, questions: &[QuizQuestion]) -> Self {
        TestAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            quiz_id: quiz_id.to_string(),
            answers: questions
                .iter()
                .map(|q| AttemptAnswer {
                    quiz_question_id: q.id.clone(),
                    selected_option: None,
                    is_correct: false,
                })
                .collect(),
            score: 0,
            correct_count: 0,
            incorrect_count: 0,
            feedback: None,
            taken_at: None,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    /// An attempt counts as submitted once any answer carries a selection.
    pub fn is_submitted(&self) -> bool {
        self.answers.iter().any(|a| a.selected_option.is_some())
    }
}
