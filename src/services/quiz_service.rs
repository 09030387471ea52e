use std::sync::Arc;

use base64::Engine;
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{Quiz, QuizGenerationConfig};
use crate::models::dto::request::{CreateQuizRequest, PaginationParams};
use crate::models::dto::response::{CreateQuizResponse, QuizDetailResponse, QuizListResponse};
use crate::repositories::{QuizQuestionRepository, QuizRepository};
use crate::services::content_normalizer::{ContentNormalizer, NormalizedContent, NormalizedFile};
use crate::services::context_aggregator;
use crate::services::file_store::FileStore;
use crate::services::question_generator::QuestionGenerator;

/// Quiz lifecycle: upload, background generation kickoff, reads. Creation
/// returns as soon as the quiz record exists; the client polls the quiz
/// until generation reaches a terminal status.
pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuizQuestionRepository>,
    normalizer: Arc<ContentNormalizer>,
    file_store: FileStore,
    generator: Arc<QuestionGenerator>,
}

impl QuizService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        questions: Arc<dyn QuizQuestionRepository>,
        normalizer: Arc<ContentNormalizer>,
        file_store: FileStore,
        generator: Arc<QuestionGenerator>,
    ) -> Self {
        Self {
            quizzes,
            questions,
            normalizer,
            file_store,
            generator,
        }
    }

    pub async fn create_quiz(
        &self,
        user_id: &str,
        request: CreateQuizRequest,
    ) -> AppResult<CreateQuizResponse> {
        request.validate()?;

        let config = QuizGenerationConfig {
            mcq: request.config.types.mcq,
            true_false: request.config.types.true_false,
        };
        if config.total() != request.config.total_questions {
            return Err(AppError::BadRequest(format!(
                "Question type counts sum to {} but total_questions is {}",
                config.total(),
                request.config.total_questions
            )));
        }

        // Decode everything before the quiz row exists, so a bad upload is a
        // plain 400 and never leaves a quiz stuck in STARTING.
        let mut decoded: Vec<(String, Vec<u8>)> = Vec::with_capacity(request.files.len());
        for file in &request.files {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(&file.content_base64)
                .map_err(|e| {
                    AppError::BadRequest(format!(
                        "File '{}' is not valid base64: {}",
                        file.original_name, e
                    ))
                })?;
            decoded.push((file.original_name.clone(), bytes));
        }

        let quiz = Quiz::new_starting(
            user_id,
            request.title.clone(),
            config,
            request.content_summary.clone(),
        );
        let quiz = self.quizzes.create(quiz).await?;
        log::info!("Created quiz {} for user {}", quiz.id, user_id);

        let corpus = match self.ingest_files(&quiz.id, &decoded).await {
            Ok(corpus) => corpus,
            Err(err) => {
                // The quiz row exists; make sure polling still terminates.
                if let Err(fail_err) = self.quizzes.fail_generation(&quiz.id).await {
                    log::error!("Failed to mark quiz {} as failed: {}", quiz.id, fail_err);
                }
                return Err(err);
            }
        };

        let generator = self.generator.clone();
        let spawned_quiz = quiz.clone();
        tokio::spawn(async move {
            generator.run(&spawned_quiz, &corpus).await;
        });

        Ok(CreateQuizResponse {
            quiz_id: quiz.id,
            status: quiz.status,
        })
    }

    /// Store and normalize every upload in order. A file that fails to
    /// normalize keeps its raw copy on disk and is skipped; the batch
    /// continues so one bad file cannot sink the whole quiz.
    async fn ingest_files(&self, quiz_id: &str, files: &[(String, Vec<u8>)]) -> AppResult<String> {
        let mut normalized: Vec<NormalizedFile> = Vec::with_capacity(files.len());

        for (original_name, bytes) in files {
            self.file_store
                .save_original(quiz_id, original_name, bytes)
                .await?;

            match self.normalizer.normalize(original_name, bytes).await {
                Ok(result) => {
                    if let Some(text) = result.content.corpus_text() {
                        self.file_store
                            .save_processed_text(quiz_id, original_name, text)
                            .await?;
                    }
                    normalized.push(result);
                }
                Err(err) => {
                    log::warn!(
                        "Skipping file '{}' for quiz {}: {}",
                        original_name,
                        quiz_id,
                        err
                    );
                    normalized.push(NormalizedFile {
                        original_name: original_name.clone(),
                        content: NormalizedContent::Opaque,
                    });
                }
            }
        }

        Ok(context_aggregator::build_corpus(&normalized))
    }

    pub async fn get_quiz(&self, id: &str) -> AppResult<QuizDetailResponse> {
        let quiz = self
            .quizzes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))?;
        let questions = self.questions.find_by_quiz(id).await?;

        Ok(QuizDetailResponse { quiz, questions })
    }

    pub async fn list_quizzes(
        &self,
        user_id: &str,
        pagination: &PaginationParams,
    ) -> AppResult<QuizListResponse> {
        let (quizzes, total) = self
            .quizzes
            .list_by_user(user_id, pagination.offset(), pagination.limit())
            .await?;
        Ok(QuizListResponse { quizzes, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::models::domain::QuizStatus;
    use crate::models::dto::request::{QuestionTypesDto, QuizConfigDto, UploadFileDto};
    use crate::services::content_normalizer::MockImageFetcher;
    use crate::services::media_resolver::MockMediaResolver;
    use crate::test_utils::{
        valid_quiz_response, InMemoryQuizQuestionRepository, InMemoryQuizRepository,
        ScriptedBackend,
    };

    struct Harness {
        quizzes: Arc<InMemoryQuizRepository>,
        service: QuizService,
    }

    fn harness(responses: Vec<crate::errors::AppResult<String>>) -> Harness {
        let quizzes = Arc::new(InMemoryQuizRepository::default());
        let questions = Arc::new(InMemoryQuizQuestionRepository::default());
        let backend = Arc::new(ScriptedBackend::replying(responses));
        let normalizer = Arc::new(ContentNormalizer::new(
            Arc::new(MockMediaResolver::new()),
            Arc::new(MockImageFetcher::new()),
        ));
        let file_store = FileStore::new(
            std::env::temp_dir().join(format!("studyquiz-test-{}", uuid::Uuid::new_v4())),
        );
        let generator = Arc::new(QuestionGenerator::new(
            quizzes.clone(),
            questions.clone(),
            backend,
        ));
        let service = QuizService::new(
            quizzes.clone(),
            questions,
            normalizer,
            file_store,
            generator,
        );
        Harness { quizzes, service }
    }

    fn request(files: Vec<UploadFileDto>) -> CreateQuizRequest {
        CreateQuizRequest {
            title: None,
            config: QuizConfigDto {
                total_questions: 2,
                types: QuestionTypesDto {
                    mcq: 1,
                    true_false: 1,
                },
            },
            files,
            content_summary: None,
        }
    }

    fn text_upload(name: &str, text: &str) -> UploadFileDto {
        UploadFileDto {
            original_name: name.to_string(),
            content_base64: base64::engine::general_purpose::STANDARD.encode(text),
        }
    }

    async fn wait_for_terminal(quizzes: &InMemoryQuizRepository, quiz_id: &str) -> QuizStatus {
        for _ in 0..100 {
            if let Some(quiz) = quizzes.get(quiz_id) {
                if quiz.status.is_terminal() {
                    return quiz.status;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("quiz never reached a terminal status");
    }

    #[tokio::test]
    async fn create_quiz_returns_starting_and_completes_in_background() {
        let h = harness(vec![Ok(valid_quiz_response("Water Cycle"))]);

        let response = h
            .service
            .create_quiz("user-1", request(vec![text_upload("notes.txt", "the sun")]))
            .await
            .unwrap();

        assert_eq!(response.status, QuizStatus::Starting);
        let status = wait_for_terminal(&h.quizzes, &response.quiz_id).await;
        assert_eq!(status, QuizStatus::Completed);
    }

    #[tokio::test]
    async fn quiz_with_no_usable_text_fails_generation() {
        let h = harness(vec![]);

        // A binary upload yields an empty corpus.
        let upload = UploadFileDto {
            original_name: "slides.pdf".to_string(),
            content_base64: base64::engine::general_purpose::STANDARD.encode([0xFFu8, 0x00]),
        };
        let response = h
            .service
            .create_quiz("user-1", request(vec![upload]))
            .await
            .unwrap();

        let status = wait_for_terminal(&h.quizzes, &response.quiz_id).await;
        assert_eq!(status, QuizStatus::Failed);
    }

    #[tokio::test]
    async fn mismatched_type_counts_are_rejected() {
        let h = harness(vec![]);

        let mut bad = request(vec![text_upload("notes.txt", "text")]);
        bad.config.total_questions = 10;

        let err = h.service.create_quiz("user-1", bad).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn invalid_base64_is_rejected_up_front() {
        let h = harness(vec![]);

        let upload = UploadFileDto {
            original_name: "notes.txt".to_string(),
            content_base64: "!!! not base64 !!!".to_string(),
        };
        let err = h
            .service
            .create_quiz("user-1", request(vec![upload]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        // Rejected before any quiz row was written.
        let (_, total) = h.quizzes.list_by_user("user-1", 0, 10).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn get_quiz_returns_not_found_for_unknown_id() {
        let h = harness(vec![]);
        let err = h.service.get_quiz("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
