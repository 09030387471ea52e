use std::sync::Arc;

use crate::constants::prompts;
use crate::models::domain::Quiz;
use crate::repositories::{QuizQuestionRepository, QuizRepository};
use crate::services::generation::GenerationBackend;
use crate::services::model_output;

const DEFAULT_QUIZ_TITLE: &str = "Untitled Quiz";

/// Runs the background generation task for one quiz: one backend call, parse,
/// bulk question insert, terminal status transition. Never returns an error;
/// every failure path lands the quiz in FAILED with no questions persisted.
pub struct QuestionGenerator {
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuizQuestionRepository>,
    backend: Arc<dyn GenerationBackend>,
}

impl QuestionGenerator {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        questions: Arc<dyn QuizQuestionRepository>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            quizzes,
            questions,
            backend,
        }
    }

    pub async fn run(&self, quiz: &Quiz, corpus: &str) {
        if corpus.trim().is_empty() {
            log::warn!("Quiz {} has no corpus text, failing generation", quiz.id);
            self.fail(&quiz.id).await;
            return;
        }

        match self.quizzes.mark_generating(&quiz.id).await {
            Ok(true) => {}
            Ok(false) => {
                log::warn!(
                    "Quiz {} is no longer in STARTING, skipping generation",
                    quiz.id
                );
                return;
            }
            Err(err) => {
                log::error!("Failed to mark quiz {} as generating: {}", quiz.id, err);
                return;
            }
        }

        let prompt = prompts::build_quiz_prompt(quiz.config.mcq, quiz.config.true_false, corpus);

        let response = match self.backend.generate(&prompt).await {
            Ok(response) => response,
            Err(err) => {
                log::error!("Generation call failed for quiz {}: {}", quiz.id, err);
                self.fail(&quiz.id).await;
                return;
            }
        };

        let generated = match model_output::parse_generated_quiz(&response) {
            Ok(generated) => generated,
            Err(err) => {
                log::error!("Unusable model output for quiz {}: {}", quiz.id, err);
                self.fail(&quiz.id).await;
                return;
            }
        };

        let title = generated
            .title
            .clone()
            .or_else(|| quiz.title.clone())
            .unwrap_or_else(|| DEFAULT_QUIZ_TITLE.to_string());

        let questions: Vec<_> = generated
            .questions
            .into_iter()
            .map(|q| q.into_question(&quiz.id))
            .collect();
        let question_count = questions.len() as i16;

        if let Err(err) = self.questions.create_many(questions).await {
            log::error!("Failed to persist questions for quiz {}: {}", quiz.id, err);
            self.fail(&quiz.id).await;
            return;
        }

        match self
            .quizzes
            .complete_generation(&quiz.id, &title, question_count)
            .await
        {
            Ok(true) => {
                log::info!(
                    "Quiz {} completed with {} questions",
                    quiz.id,
                    question_count
                );
            }
            Ok(false) => {
                log::warn!("Quiz {} reached a terminal state concurrently", quiz.id);
            }
            Err(err) => {
                log::error!("Failed to complete quiz {}: {}", quiz.id, err);
            }
        }
    }

    async fn fail(&self, quiz_id: &str) {
        match self.quizzes.fail_generation(quiz_id).await {
            Ok(_) => {}
            Err(err) => log::error!("Failed to mark quiz {} as failed: {}", quiz_id, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::models::domain::QuizStatus;
    use crate::test_utils::{
        sample_quiz, valid_quiz_response, InMemoryQuizQuestionRepository, InMemoryQuizRepository,
        ScriptedBackend,
    };

    struct Harness {
        quizzes: Arc<InMemoryQuizRepository>,
        questions: Arc<InMemoryQuizQuestionRepository>,
        generator: QuestionGenerator,
    }

    fn harness(responses: Vec<crate::errors::AppResult<String>>) -> Harness {
        let quizzes = Arc::new(InMemoryQuizRepository::default());
        let questions = Arc::new(InMemoryQuizQuestionRepository::default());
        let backend = Arc::new(ScriptedBackend::replying(responses));
        let generator =
            QuestionGenerator::new(quizzes.clone(), questions.clone(), backend);
        Harness {
            quizzes,
            questions,
            generator,
        }
    }

    #[tokio::test]
    async fn successful_generation_completes_quiz_with_questions() {
        let h = harness(vec![Ok(valid_quiz_response("Water Cycle"))]);
        let quiz = h
            .quizzes
            .create(sample_quiz("user-1", 1, 1))
            .await
            .unwrap();

        h.generator.run(&quiz, "the water cycle is driven by the sun").await;

        let stored = h.quizzes.get(&quiz.id).unwrap();
        assert_eq!(stored.status, QuizStatus::Completed);
        assert_eq!(stored.title.as_deref(), Some("Water Cycle"));
        assert_eq!(stored.question_count, 2);
        assert_eq!(h.questions.count_by_quiz(&quiz.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn empty_corpus_fails_without_calling_backend() {
        let h = harness(vec![]);
        let quiz = h
            .quizzes
            .create(sample_quiz("user-1", 1, 1))
            .await
            .unwrap();

        h.generator.run(&quiz, "   \n  ").await;

        let stored = h.quizzes.get(&quiz.id).unwrap();
        assert_eq!(stored.status, QuizStatus::Failed);
        assert_eq!(h.questions.count_by_quiz(&quiz.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn non_json_response_fails_with_no_partial_questions() {
        let h = harness(vec![Ok("Sorry, I cannot help with that.".to_string())]);
        let quiz = h
            .quizzes
            .create(sample_quiz("user-1", 2, 0))
            .await
            .unwrap();

        h.generator.run(&quiz, "some corpus").await;

        let stored = h.quizzes.get(&quiz.id).unwrap();
        assert_eq!(stored.status, QuizStatus::Failed);
        assert_eq!(stored.question_count, 0);
        assert_eq!(h.questions.count_by_quiz(&quiz.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn backend_error_fails_generation() {
        let h = harness(vec![Err(AppError::GenerationError("quota".to_string()))]);
        let quiz = h
            .quizzes
            .create(sample_quiz("user-1", 1, 0))
            .await
            .unwrap();

        h.generator.run(&quiz, "corpus").await;

        assert_eq!(h.quizzes.get(&quiz.id).unwrap().status, QuizStatus::Failed);
    }

    #[tokio::test]
    async fn missing_title_falls_back_to_default() {
        let response = r#"{"questions": [
            {"question": "Pick one", "options": ["a", "b"], "correctOption": 0, "questionType": "MULTIPLE_CHOICE"}
        ]}"#;
        let h = harness(vec![Ok(response.to_string())]);
        let quiz = h
            .quizzes
            .create(sample_quiz("user-1", 1, 0))
            .await
            .unwrap();

        h.generator.run(&quiz, "corpus").await;

        let stored = h.quizzes.get(&quiz.id).unwrap();
        assert_eq!(stored.status, QuizStatus::Completed);
        assert_eq!(stored.title.as_deref(), Some(DEFAULT_QUIZ_TITLE));
    }

    #[tokio::test]
    async fn quiz_not_in_starting_is_skipped() {
        let h = harness(vec![Ok(valid_quiz_response("Ignored"))]);
        let quiz = h
            .quizzes
            .create(sample_quiz("user-1", 1, 1))
            .await
            .unwrap();
        h.quizzes.fail_generation(&quiz.id).await.unwrap();

        h.generator.run(&quiz, "corpus").await;

        // Terminal status is absorbing, so the earlier FAILED wins.
        assert_eq!(h.quizzes.get(&quiz.id).unwrap().status, QuizStatus::Failed);
        assert_eq!(h.questions.count_by_quiz(&quiz.id).await.unwrap(), 0);
    }
}
