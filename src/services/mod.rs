pub mod attempt_scorer;
pub mod content_normalizer;
pub mod context_aggregator;
pub mod feedback_generator;
pub mod file_store;
pub mod generation;
pub mod media_resolver;
pub mod model_output;
pub mod question_generator;
pub mod quiz_service;
pub mod test_attempt_service;
pub mod transcripts;
