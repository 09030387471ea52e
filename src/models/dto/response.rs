use serde::Serialize;

use crate::models::domain::{FeedbackReport, Quiz, QuizQuestion, QuizStatus, TestAttempt};

/// Returned immediately on upload; the client polls the quiz until its
/// status reaches a terminal value.
#[derive(Debug, Clone, Serialize)]
pub struct CreateQuizResponse {
    pub quiz_id: String,
    pub status: QuizStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizDetailResponse {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizListResponse {
    pub quizzes: Vec<Quiz>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartAttemptResponse {
    pub attempt_id: String,
    pub quiz_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitAttemptResponse {
    pub attempt_id: String,
    pub score: i16,
    pub correct_count: i16,
    pub incorrect_count: i16,
    pub already_submitted: bool,
    pub feedback: Option<FeedbackReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptListResponse {
    pub attempts: Vec<TestAttempt>,
    pub total: i64,
}

impl SubmitAttemptResponse {
    pub fn from_attempt(attempt: &TestAttempt, already_submitted: bool) -> Self {
        Self {
            attempt_id: attempt.id.clone(),
            score: attempt.score,
            correct_count: attempt.correct_count,
            incorrect_count: attempt.incorrect_count,
            already_submitted,
            feedback: attempt.feedback.clone(),
        }
    }
}
