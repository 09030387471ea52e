pub mod quiz_question_repository;
pub mod quiz_repository;
pub mod test_attempt_repository;

pub use quiz_question_repository::{MongoQuizQuestionRepository, QuizQuestionRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
pub use test_attempt_repository::{
    MongoTestAttemptRepository, SubmitOutcome, TestAttemptRepository,
};
