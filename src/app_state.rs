use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{MongoQuizQuestionRepository, MongoQuizRepository, MongoTestAttemptRepository},
    services::{
        content_normalizer::{ContentNormalizer, HttpImageFetcher},
        feedback_generator::FeedbackGenerator,
        file_store::FileStore,
        generation::{ApiKeyCodec, GenerationBackend, OpenAiBackend},
        media_resolver::AiMediaResolver,
        question_generator::QuestionGenerator,
        quiz_service::QuizService,
        test_attempt_service::TestAttemptService,
        transcripts::YoutubeTranscriptClient,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub test_attempt_service: Arc<TestAttemptService>,
    pub db: Arc<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quiz_repository = Arc::new(MongoQuizRepository::new(&db));
        quiz_repository.ensure_indexes().await?;
        let question_repository = Arc::new(MongoQuizQuestionRepository::new(&db));
        question_repository.ensure_indexes().await?;
        let attempt_repository = Arc::new(MongoTestAttemptRepository::new(&db));
        attempt_repository.ensure_indexes().await?;

        let backend: Arc<dyn GenerationBackend> = Arc::new(OpenAiBackend::from_encoded_key(
            &ApiKeyCodec,
            config.openai_api_key_encoded.expose_secret(),
            &config.openai_model,
        )?);

        let http = reqwest::Client::new();
        let transcripts = Arc::new(YoutubeTranscriptClient::new(http.clone()));
        let resolver = Arc::new(AiMediaResolver::new(backend.clone(), transcripts));
        let normalizer = Arc::new(ContentNormalizer::new(
            resolver,
            Arc::new(HttpImageFetcher::new(http)),
        ));
        let file_store = FileStore::new(config.upload_dir.clone());

        let generator = Arc::new(QuestionGenerator::new(
            quiz_repository.clone(),
            question_repository.clone(),
            backend.clone(),
        ));
        let quiz_service = Arc::new(QuizService::new(
            quiz_repository.clone(),
            question_repository.clone(),
            normalizer,
            file_store.clone(),
            generator,
        ));

        let feedback = Arc::new(FeedbackGenerator::new(backend));
        let test_attempt_service = Arc::new(TestAttemptService::new(
            attempt_repository,
            quiz_repository,
            question_repository,
            feedback,
            file_store,
        ));

        Ok(Self {
            quiz_service,
            test_attempt_service,
            db: Arc::new(db),
            config: Arc::new(config),
        })
    }
}
