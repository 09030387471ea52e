use serde::{Deserialize, Serialize};
use validator::Validate;

/// Upload payload for quiz creation. File bytes travel base64-encoded so the
/// whole request stays one JSON document.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(nested)]
    pub config: QuizConfigDto,

    #[validate(length(min = 1, message = "At least one file is required"))]
    #[validate(nested)]
    pub files: Vec<UploadFileDto>,

    #[validate(length(max = 2000))]
    pub content_summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuizConfigDto {
    #[validate(range(min = 1, max = 50))]
    pub total_questions: i16,

    #[validate(nested)]
    pub types: QuestionTypesDto,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionTypesDto {
    #[validate(range(min = 0, max = 50))]
    pub mcq: i16,

    #[validate(range(min = 0, max = 50))]
    pub true_false: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadFileDto {
    #[validate(length(min = 1, max = 255))]
    pub original_name: String,

    #[validate(length(min = 1))]
    pub content_base64: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(length(min = 1, message = "At least one answer is required"))]
    #[validate(nested)]
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnswerInput {
    #[validate(length(min = 1))]
    pub quiz_question_id: String,

    pub selected_option: Option<i16>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).min(100)
    }
}
