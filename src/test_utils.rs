//! Shared fixtures for unit tests: in-memory repository implementations with
//! the same conditional-update semantics as the Mongo ones, plus a scripted
//! generation backend.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{
    AttemptAnswer, FeedbackReport, QuestionType, Quiz, QuizGenerationConfig, QuizQuestion,
    QuizStatus, TestAttempt,
};
use crate::repositories::{
    QuizQuestionRepository, QuizRepository, SubmitOutcome, TestAttemptRepository,
};
use crate::services::generation::GenerationBackend;

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: Mutex<Vec<Quiz>>,
}

impl InMemoryQuizRepository {
    pub fn get(&self, id: &str) -> Option<Quiz> {
        self.quizzes
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id == id)
            .cloned()
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.quizzes.lock().unwrap().push(quiz.clone());
        Ok(quiz)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        Ok(self.get(id))
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Quiz>, i64)> {
        let quizzes = self.quizzes.lock().unwrap();
        let matching: Vec<Quiz> = quizzes
            .iter()
            .filter(|q| q.created_by_user_id == user_id)
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn mark_generating(&self, id: &str) -> AppResult<bool> {
        let mut quizzes = self.quizzes.lock().unwrap();
        match quizzes
            .iter_mut()
            .find(|q| q.id == id && q.status == QuizStatus::Starting)
        {
            Some(quiz) => {
                quiz.status = QuizStatus::Generating;
                quiz.modified_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn complete_generation(
        &self,
        id: &str,
        title: &str,
        question_count: i16,
    ) -> AppResult<bool> {
        let mut quizzes = self.quizzes.lock().unwrap();
        match quizzes
            .iter_mut()
            .find(|q| q.id == id && !q.status.is_terminal())
        {
            Some(quiz) => {
                quiz.status = QuizStatus::Completed;
                quiz.title = Some(title.to_string());
                quiz.question_count = question_count;
                quiz.modified_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn fail_generation(&self, id: &str) -> AppResult<bool> {
        let mut quizzes = self.quizzes.lock().unwrap();
        match quizzes
            .iter_mut()
            .find(|q| q.id == id && !q.status.is_terminal())
        {
            Some(quiz) => {
                quiz.status = QuizStatus::Failed;
                quiz.modified_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryQuizQuestionRepository {
    questions: Mutex<Vec<QuizQuestion>>,
}

#[async_trait]
impl QuizQuestionRepository for InMemoryQuizQuestionRepository {
    async fn create_many(&self, questions: Vec<QuizQuestion>) -> AppResult<Vec<QuizQuestion>> {
        self.questions
            .lock()
            .unwrap()
            .extend(questions.iter().cloned());
        Ok(questions)
    }

    async fn find_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizQuestion>> {
        Ok(self
            .questions
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect())
    }

    async fn count_by_quiz(&self, quiz_id: &str) -> AppResult<usize> {
        Ok(self
            .questions
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .count())
    }
}

#[derive(Default)]
pub struct InMemoryTestAttemptRepository {
    attempts: Mutex<Vec<TestAttempt>>,
}

#[async_trait]
impl TestAttemptRepository for InMemoryTestAttemptRepository {
    async fn create(&self, attempt: TestAttempt) -> AppResult<TestAttempt> {
        self.attempts.lock().unwrap().push(attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestAttempt>> {
        Ok(self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<TestAttempt>, i64)> {
        let attempts = self.attempts.lock().unwrap();
        let matching: Vec<TestAttempt> = attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn submit_scored(
        &self,
        id: &str,
        answers: &[AttemptAnswer],
        score: i16,
        correct_count: i16,
        incorrect_count: i16,
        feedback: Option<&FeedbackReport>,
    ) -> AppResult<SubmitOutcome> {
        let mut attempts = self.attempts.lock().unwrap();
        let Some(attempt) = attempts.iter_mut().find(|a| a.id == id) else {
            return Err(AppError::NotFound(format!(
                "Test attempt with id '{}' not found",
                id
            )));
        };

        if attempt.is_submitted() {
            return Ok(SubmitOutcome::AlreadySubmitted);
        }

        attempt.answers = answers.to_vec();
        attempt.score = score;
        attempt.correct_count = correct_count;
        attempt.incorrect_count = incorrect_count;
        attempt.feedback = feedback.cloned();
        attempt.taken_at = Some(Utc::now());
        attempt.modified_at = Some(Utc::now());
        Ok(SubmitOutcome::Recorded)
    }

    async fn set_feedback(&self, id: &str, feedback: &FeedbackReport) -> AppResult<()> {
        let mut attempts = self.attempts.lock().unwrap();
        let Some(attempt) = attempts.iter_mut().find(|a| a.id == id) else {
            return Err(AppError::NotFound(format!(
                "Test attempt with id '{}' not found",
                id
            )));
        };
        attempt.feedback = Some(feedback.clone());
        attempt.modified_at = Some(Utc::now());
        Ok(())
    }
}

/// Backend that replays a queue of canned responses and records every prompt
/// it receives.
#[derive(Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<AppResult<String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn replying(responses: Vec<AppResult<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn next_response(&self) -> AppResult<String> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::GenerationError("no scripted response".to_string())))
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.next_response()
    }

    async fn describe_image(&self, prompt: &str, _image_data_url: &str) -> AppResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.next_response()
    }
}

pub fn sample_quiz(user_id: &str, mcq: i16, true_false: i16) -> Quiz {
    Quiz::new_starting(
        user_id,
        None,
        QuizGenerationConfig { mcq, true_false },
        Some("study material summary".to_string()),
    )
}

pub fn sample_question(quiz_id: &str, correct_option: i16) -> QuizQuestion {
    QuizQuestion {
        id: uuid::Uuid::new_v4().to_string(),
        quiz_id: quiz_id.to_string(),
        question: "Which option is right?".to_string(),
        options: vec![
            "alpha".to_string(),
            "beta".to_string(),
            "gamma".to_string(),
            "delta".to_string(),
        ],
        correct_option,
        question_type: QuestionType::MultipleChoice,
        created_at: Some(Utc::now()),
    }
}

pub fn valid_quiz_response(title: &str) -> String {
    format!(
        r#"```json
{{
  "title": "{}",
  "questions": [
    {{"question": "What drives the water cycle?", "options": ["Sun", "Wind", "Moon", "Soil"], "correctOption": 0, "questionType": "MULTIPLE_CHOICE"}},
    {{"question": "Rain falls upward.", "options": ["True", "False"], "correctOption": 1, "questionType": "TRUE_FALSE"}}
  ]
}}
```"#,
        title
    )
}
