use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{AppError, AppResult};

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#,
    )
    .expect("VIDEO_ID is a valid regex pattern")
});

static TIMEDTEXT_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<text start="([0-9.]+)" dur="([0-9.]+)"[^>]*>(.*?)</text>"#)
        .expect("TIMEDTEXT_SEGMENT is a valid regex pattern")
});

/// Pulls the 11-character video identifier out of any accepted YouTube URL
/// shape (watch, share, embed).
pub fn extract_youtube_video_id(url: &str) -> Option<&str> {
    VIDEO_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,    // seconds
    pub duration: f64, // seconds
}

impl TranscriptSegment {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Keep segments overlapping the [start, end] window: a segment counts if its
/// start or end falls inside the window, or it spans the whole window.
pub fn filter_window(segments: &[TranscriptSegment], start: f64, end: f64) -> Vec<TranscriptSegment> {
    segments
        .iter()
        .filter(|segment| {
            let seg_start = segment.start;
            let seg_end = segment.end();
            (seg_start >= start && seg_start <= end)
                || (seg_end >= start && seg_end <= end)
                || (seg_start <= start && seg_end >= end)
        })
        .cloned()
        .collect()
}

pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Spoken transcript for a video. An empty list means no transcript is
    /// available; transport failures surface as errors and are treated the
    /// same way by callers.
    async fn fetch(&self, video_id: &str) -> AppResult<Vec<TranscriptSegment>>;
}

pub struct YoutubeTranscriptClient {
    http: reqwest::Client,
}

impl YoutubeTranscriptClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn parse_timedtext(xml: &str) -> Vec<TranscriptSegment> {
        TIMEDTEXT_SEGMENT
            .captures_iter(xml)
            .filter_map(|caps| {
                let start = caps.get(1)?.as_str().parse::<f64>().ok()?;
                let duration = caps.get(2)?.as_str().parse::<f64>().ok()?;
                let text = unescape_xml(caps.get(3)?.as_str());
                Some(TranscriptSegment {
                    text,
                    start,
                    duration,
                })
            })
            .collect()
    }
}

#[async_trait]
impl TranscriptFetcher for YoutubeTranscriptClient {
    async fn fetch(&self, video_id: &str) -> AppResult<Vec<TranscriptSegment>> {
        let url = format!(
            "https://video.google.com/timedtext?lang=en&v={}",
            video_id
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::InternalError(format!("Transcript fetch failed: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::InternalError(format!("Transcript fetch failed: {}", e)))?;

        Ok(Self::parse_timedtext(&body))
    }
}

fn unescape_xml(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}
