use std::sync::Arc;

use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{FeedbackReport, Quiz, QuizStatus, TestAttempt};
use crate::models::dto::request::{PaginationParams, SubmitAttemptRequest};
use crate::models::dto::response::{
    AttemptListResponse, StartAttemptResponse, SubmitAttemptResponse,
};
use crate::repositories::{
    QuizQuestionRepository, QuizRepository, SubmitOutcome, TestAttemptRepository,
};
use crate::services::attempt_scorer;
use crate::services::context_aggregator;
use crate::services::feedback_generator::FeedbackGenerator;
use crate::services::file_store::FileStore;

/// Attempt lifecycle: start a placeholder, grade and record one submission,
/// serve reads. Submission is idempotent; the first write wins and every
/// later submit returns the stored result unchanged.
pub struct TestAttemptService {
    attempts: Arc<dyn TestAttemptRepository>,
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuizQuestionRepository>,
    feedback: Arc<FeedbackGenerator>,
    file_store: FileStore,
}

impl TestAttemptService {
    pub fn new(
        attempts: Arc<dyn TestAttemptRepository>,
        quizzes: Arc<dyn QuizRepository>,
        questions: Arc<dyn QuizQuestionRepository>,
        feedback: Arc<FeedbackGenerator>,
        file_store: FileStore,
    ) -> Self {
        Self {
            attempts,
            quizzes,
            questions,
            feedback,
            file_store,
        }
    }

    pub async fn start_attempt(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<StartAttemptResponse> {
        let quiz = self.require_quiz(quiz_id).await?;
        if quiz.status != QuizStatus::Completed {
            return Err(AppError::BadRequest(format!(
                "Quiz '{}' is {} and cannot be attempted",
                quiz_id,
                quiz.status.as_str()
            )));
        }

        let questions = self.questions.find_by_quiz(quiz_id).await?;
        let attempt = TestAttempt::new_placeholder(user_id, quiz_id, &questions);
        let attempt = self.attempts.create(attempt).await?;
        log::info!(
            "Started attempt {} on quiz {} for user {}",
            attempt.id,
            quiz_id,
            user_id
        );

        Ok(StartAttemptResponse {
            attempt_id: attempt.id,
            quiz_id: quiz_id.to_string(),
        })
    }

    pub async fn submit_attempt(
        &self,
        user_id: &str,
        attempt_id: &str,
        request: SubmitAttemptRequest,
    ) -> AppResult<SubmitAttemptResponse> {
        request.validate()?;

        let attempt = self.require_attempt(user_id, attempt_id).await?;
        if attempt.is_submitted() {
            return Ok(SubmitAttemptResponse::from_attempt(&attempt, true));
        }

        let quiz = self.require_quiz(&attempt.quiz_id).await?;
        let questions = self.questions.find_by_quiz(&quiz.id).await?;

        let scored = attempt_scorer::score_attempt(&questions, &request.answers);
        let corpus = context_aggregator::rebuild_corpus(
            &self.file_store,
            &quiz.id,
            quiz.content_summary.as_deref(),
        )
        .await?;
        let report = self
            .feedback
            .generate(&questions, &scored.answers, scored.score, &corpus)
            .await;

        let outcome = self
            .attempts
            .submit_scored(
                attempt_id,
                &scored.answers,
                scored.score,
                scored.correct_count,
                scored.incorrect_count,
                Some(&report),
            )
            .await?;

        match outcome {
            SubmitOutcome::Recorded => {
                log::info!(
                    "Recorded attempt {} with score {} for user {}",
                    attempt_id,
                    scored.score,
                    user_id
                );
                let stored = self.require_attempt(user_id, attempt_id).await?;
                Ok(SubmitAttemptResponse::from_attempt(&stored, false))
            }
            SubmitOutcome::AlreadySubmitted => {
                // A concurrent submit won the conditional write. The stored
                // result stands; this submission is discarded.
                let stored = self.require_attempt(user_id, attempt_id).await?;
                Ok(SubmitAttemptResponse::from_attempt(&stored, true))
            }
        }
    }

    pub async fn get_attempt(&self, user_id: &str, attempt_id: &str) -> AppResult<TestAttempt> {
        self.require_attempt(user_id, attempt_id).await
    }

    pub async fn list_attempts(
        &self,
        user_id: &str,
        pagination: &PaginationParams,
    ) -> AppResult<AttemptListResponse> {
        let (attempts, total) = self
            .attempts
            .list_by_user(user_id, pagination.offset(), pagination.limit())
            .await?;
        Ok(AttemptListResponse { attempts, total })
    }

    /// Recompute feedback for a submitted attempt from the stored answers
    /// and the rebuilt corpus, replacing the stored report.
    pub async fn regenerate_feedback(
        &self,
        user_id: &str,
        attempt_id: &str,
    ) -> AppResult<FeedbackReport> {
        let attempt = self.require_attempt(user_id, attempt_id).await?;
        if !attempt.is_submitted() {
            return Err(AppError::BadRequest(format!(
                "Attempt '{}' has not been submitted yet",
                attempt_id
            )));
        }

        let quiz = self.require_quiz(&attempt.quiz_id).await?;
        let questions = self.questions.find_by_quiz(&quiz.id).await?;
        let corpus = context_aggregator::rebuild_corpus(
            &self.file_store,
            &quiz.id,
            quiz.content_summary.as_deref(),
        )
        .await?;

        let report = self
            .feedback
            .generate(&questions, &attempt.answers, attempt.score, &corpus)
            .await;
        self.attempts.set_feedback(attempt_id, &report).await?;

        Ok(report)
    }

    async fn require_quiz(&self, quiz_id: &str) -> AppResult<Quiz> {
        self.quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))
    }

    /// Attempts are private to their owner; someone else's id reads as
    /// missing.
    async fn require_attempt(&self, user_id: &str, attempt_id: &str) -> AppResult<TestAttempt> {
        self.attempts
            .find_by_id(attempt_id)
            .await?
            .filter(|attempt| attempt.user_id == user_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Test attempt with id '{}' not found", attempt_id))
            })
    }
}
