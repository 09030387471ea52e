pub mod feedback;
pub mod quiz;
pub mod quiz_question;
pub mod test_attempt;

pub use feedback::{FeedbackReport, GraphData, QuestionFeedback};
pub use quiz::{Quiz, QuizGenerationConfig, QuizStatus};
pub use quiz_question::{QuestionType, QuizQuestion};
pub use test_attempt::{AttemptAnswer, TestAttempt};
