use std::sync::Arc;

use async_trait::async_trait;

use crate::constants::prompts;
use crate::services::generation::{image_data_url, GenerationBackend};
use crate::services::transcripts::{
    extract_youtube_video_id, filter_window, join_segments, TranscriptFetcher,
};

pub const IMAGE_CAPTION_FALLBACK: &str = "Unable to get a description for this image.";
pub const VIDEO_SUMMARY_FALLBACK: &str = "Unable to get a summary for this YouTube video.";
pub const VIDEO_ID_FALLBACK: &str =
    "Unable to extract video ID from the provided YouTube URL.";

/// Very long videos produce transcripts far beyond what one prompt should
/// carry; only the first 25K characters are forwarded.
const TRANSCRIPT_CHAR_LIMIT: usize = 25_000;

/// Resolves embedded media into descriptive text. Every operation degrades to
/// a fixed placeholder string instead of failing, and none of them retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn caption_image(&self, bytes: &[u8], mime_type: &str) -> String;
    async fn summarize_video(&self, url: &str) -> String;
    async fn summarize_video_window(
        &self,
        video_id: &str,
        start: Option<f64>,
        end: Option<f64>,
    ) -> String;
}

pub struct AiMediaResolver {
    backend: Arc<dyn GenerationBackend>,
    transcripts: Arc<dyn TranscriptFetcher>,
}

impl AiMediaResolver {
    pub fn new(backend: Arc<dyn GenerationBackend>, transcripts: Arc<dyn TranscriptFetcher>) -> Self {
        Self {
            backend,
            transcripts,
        }
    }

    async fn transcript_text(&self, video_id: &str) -> Option<String> {
        match self.transcripts.fetch(video_id).await {
            Ok(segments) if !segments.is_empty() => Some(join_segments(&segments)),
            Ok(_) => None,
            Err(err) => {
                log::warn!("Transcript fetch failed for video {}: {}", video_id, err);
                None
            }
        }
    }
}

fn cap_transcript(transcript: &str) -> String {
    transcript.chars().take(TRANSCRIPT_CHAR_LIMIT).collect()
}

#[async_trait]
impl MediaResolver for AiMediaResolver {
    async fn caption_image(&self, bytes: &[u8], mime_type: &str) -> String {
        let data_url = image_data_url(bytes, mime_type);

        match self
            .backend
            .describe_image(prompts::IMAGE_CAPTION_PROMPT, &data_url)
            .await
        {
            Ok(caption) if !caption.trim().is_empty() => caption,
            Ok(_) => IMAGE_CAPTION_FALLBACK.to_string(),
            Err(err) => {
                log::warn!("Image captioning failed: {}", err);
                IMAGE_CAPTION_FALLBACK.to_string()
            }
        }
    }

    async fn summarize_video(&self, url: &str) -> String {
        let Some(video_id) = extract_youtube_video_id(url) else {
            return VIDEO_ID_FALLBACK.to_string();
        };

        let prompt = match self.transcript_text(video_id).await {
            Some(transcript) => {
                prompts::build_video_transcript_prompt(video_id, &cap_transcript(&transcript))
            }
            None => prompts::build_video_url_prompt(video_id, url),
        };

        match self.backend.generate(&prompt).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => VIDEO_SUMMARY_FALLBACK.to_string(),
            Err(err) => {
                log::warn!("Video summary failed for {}: {}", video_id, err);
                VIDEO_SUMMARY_FALLBACK.to_string()
            }
        }
    }

    async fn summarize_video_window(
        &self,
        video_id: &str,
        start: Option<f64>,
        end: Option<f64>,
    ) -> String {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        let transcript = match self.transcripts.fetch(video_id).await {
            Ok(segments) if !segments.is_empty() => {
                let windowed = match (start, end) {
                    (Some(start), Some(end)) => filter_window(&segments, start, end),
                    _ => segments,
                };
                let text = join_segments(&windowed);
                if text.trim().is_empty() {
                    None
                } else {
                    Some(text)
                }
            }
            Ok(_) => None,
            Err(err) => {
                log::warn!("Transcript fetch failed for video {}: {}", video_id, err);
                None
            }
        };

        let prompt = match transcript {
            Some(transcript) => prompts::build_video_window_transcript_prompt(
                video_id,
                &cap_transcript(&transcript),
            ),
            None => prompts::build_video_window_url_prompt(video_id, &url, start, end),
        };

        match self.backend.generate(&prompt).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => VIDEO_SUMMARY_FALLBACK.to_string(),
            Err(err) => {
                log::warn!("Video window summary failed for {}: {}", video_id, err);
                VIDEO_SUMMARY_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::services::generation::MockGenerationBackend;
    use crate::services::transcripts::{MockTranscriptFetcher, TranscriptSegment};

    fn segment(start: f64, duration: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            text: text.to_string(),
            start,
            duration,
        }
    }

    #[tokio::test]
    async fn caption_image_returns_backend_text() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_describe_image()
            .returning(|_, _| Ok("a cat on a mat".to_string()));
        let transcripts = MockTranscriptFetcher::new();

        let resolver = AiMediaResolver::new(Arc::new(backend), Arc::new(transcripts));
        let caption = resolver.caption_image(&[1, 2, 3], "image/png").await;

        assert_eq!(caption, "a cat on a mat");
    }

    #[tokio::test]
    async fn caption_image_degrades_on_backend_error() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_describe_image()
            .returning(|_, _| Err(AppError::GenerationError("boom".to_string())));
        let transcripts = MockTranscriptFetcher::new();

        let resolver = AiMediaResolver::new(Arc::new(backend), Arc::new(transcripts));
        let caption = resolver.caption_image(&[1, 2, 3], "image/jpeg").await;

        assert_eq!(caption, IMAGE_CAPTION_FALLBACK);
    }

    #[tokio::test]
    async fn summarize_video_rejects_unrecognized_url() {
        let backend = MockGenerationBackend::new();
        let transcripts = MockTranscriptFetcher::new();

        let resolver = AiMediaResolver::new(Arc::new(backend), Arc::new(transcripts));
        let summary = resolver.summarize_video("https://example.com/watch").await;

        assert_eq!(summary, VIDEO_ID_FALLBACK);
    }

    #[tokio::test]
    async fn summarize_video_uses_transcript_when_available() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_generate()
            .withf(|prompt| prompt.contains("TRANSCRIPT") && prompt.contains("hello world"))
            .returning(|_| Ok("TextBook Content: greetings".to_string()));

        let mut transcripts = MockTranscriptFetcher::new();
        transcripts
            .expect_fetch()
            .returning(|_| Ok(vec![segment(0.0, 2.0, "hello"), segment(2.0, 2.0, "world")]));

        let resolver = AiMediaResolver::new(Arc::new(backend), Arc::new(transcripts));
        let summary = resolver
            .summarize_video("https://youtu.be/dQw4w9WgXcQ")
            .await;

        assert_eq!(summary, "TextBook Content: greetings");
    }

    #[tokio::test]
    async fn summarize_video_falls_back_to_url_prompt_without_transcript() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_generate()
            .withf(|prompt| !prompt.contains("TRANSCRIPT") && prompt.contains("dQw4w9WgXcQ"))
            .returning(|_| Ok("best-effort description".to_string()));

        let mut transcripts = MockTranscriptFetcher::new();
        transcripts.expect_fetch().returning(|_| Ok(vec![]));

        let resolver = AiMediaResolver::new(Arc::new(backend), Arc::new(transcripts));
        let summary = resolver
            .summarize_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .await;

        assert_eq!(summary, "best-effort description");
    }

    #[tokio::test]
    async fn window_summary_filters_transcript_to_bounds() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_generate()
            .withf(|prompt| prompt.contains("middle") && !prompt.contains("before"))
            .returning(|_| Ok("windowed summary".to_string()));

        let mut transcripts = MockTranscriptFetcher::new();
        transcripts.expect_fetch().returning(|_| {
            Ok(vec![
                segment(0.0, 2.0, "before"),
                segment(10.0, 2.0, "middle"),
                segment(40.0, 2.0, "after"),
            ])
        });

        let resolver = AiMediaResolver::new(Arc::new(backend), Arc::new(transcripts));
        let summary = resolver
            .summarize_video_window("dQw4w9WgXcQ", Some(9.0), Some(15.0))
            .await;

        assert_eq!(summary, "windowed summary");
    }

    #[tokio::test]
    async fn window_summary_degrades_on_backend_error() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_generate()
            .returning(|_| Err(AppError::GenerationError("down".to_string())));

        let mut transcripts = MockTranscriptFetcher::new();
        transcripts.expect_fetch().returning(|_| Ok(vec![]));

        let resolver = AiMediaResolver::new(Arc::new(backend), Arc::new(transcripts));
        let summary = resolver
            .summarize_video_window("dQw4w9WgXcQ", None, None)
            .await;

        assert_eq!(summary, VIDEO_SUMMARY_FALLBACK);
    }
}
