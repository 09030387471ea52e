use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub created_by_user_id: String,
    pub title: Option<String>, // Set when generation completes
    pub status: QuizStatus,
    pub max_questions: i16,
    pub config: QuizGenerationConfig,
    pub content_summary: Option<String>, // Short corpus summary supplied at upload
    pub question_count: i16,             // Count of generated questions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

/// Requested question counts per type.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizGenerationConfig {
    pub mcq: i16,
    pub true_false: i16,
}

impl QuizGenerationConfig {
    pub fn total(&self) -> i16 {
        self.mcq + self.true_false
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuizStatus {
    Starting,
    Generating,
    Completed,
    Failed,
}

impl QuizStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizStatus::Starting => "STARTING",
            QuizStatus::Generating => "GENERATING",
            QuizStatus::Completed => "COMPLETED",
            QuizStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QuizStatus::Completed | QuizStatus::Failed)
    }

    /// Status only moves forward; terminal states are absorbing.
    pub fn can_transition_to(&self, next: QuizStatus) -> bool {
        match self {
            QuizStatus::Starting => matches!(
                next,
                QuizStatus::Generating | QuizStatus::Completed | QuizStatus::Failed
            ),
            QuizStatus::Generating => {
                matches!(next, QuizStatus::Completed | QuizStatus::Failed)
            }
            QuizStatus::Completed | QuizStatus::Failed => false,
        }
    }
}

impl Quiz {
    pub fn new_starting(
        created_by_user_id: &str,
        title: Option<String>,
        config: QuizGenerationConfig,
        content_summary: Option<String>,
    ) -> Self {
        let max_questions = config.total();
        Quiz {
            id: Uuid::new_v4().to_string(),
            created_by_user_id: created_by_user_id.to_string(),
            title,
            status: QuizStatus::Starting,
            max_questions,
            config,
            content_summary,
            question_count: 0,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }
}
