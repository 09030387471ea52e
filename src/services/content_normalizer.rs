use std::ops::Range;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{AppError, AppResult};
use crate::services::media_resolver::{MediaResolver, IMAGE_CAPTION_FALLBACK};

static IMAGE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[(.*?)\]\((https?://.*?)\)").expect("IMAGE_REF is a valid regex pattern")
});

static YOUTUBE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:https?://)?(?:www\.)?(?:youtube\.com/(?:watch\?v=|embed/)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("YOUTUBE_LINK is a valid regex pattern")
});

static VIDEO_EMBED_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<Youtube\s+videoId=['"]([^'"]+)['"](?:\s+start=['"]([^'"]+)['"])?(?:\s+end=['"]([^'"]+)['"])?.*?/>"#,
    )
    .expect("VIDEO_EMBED_TAG is a valid regex pattern")
});

/// One embedded reference found in the source markdown, with its byte span
/// against the original text.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownEmbed {
    pub span: Range<usize>,
    pub kind: EmbedKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmbedKind {
    Image {
        url: String,
    },
    VideoLink {
        url: String,
    },
    VideoEmbed {
        video_id: String,
        start: Option<String>,
        end: Option<String>,
    },
}

/// Collect all three embed kinds against the original text, in scan order,
/// dropping any match overlapping an earlier one. The rewrite then walks the
/// spans left to right exactly once, so substituted text is never re-scanned.
pub fn scan_embeds(text: &str) -> Vec<MarkdownEmbed> {
    let mut embeds: Vec<MarkdownEmbed> = Vec::new();

    for caps in IMAGE_REF.captures_iter(text) {
        let whole = caps.get(0).expect("capture group 0 always matches");
        embeds.push(MarkdownEmbed {
            span: whole.range(),
            kind: EmbedKind::Image {
                url: caps[2].to_string(),
            },
        });
    }

    for caps in YOUTUBE_LINK.captures_iter(text) {
        let whole = caps.get(0).expect("capture group 0 always matches");
        embeds.push(MarkdownEmbed {
            span: whole.range(),
            kind: EmbedKind::VideoLink {
                url: whole.as_str().to_string(),
            },
        });
    }

    for caps in VIDEO_EMBED_TAG.captures_iter(text) {
        let whole = caps.get(0).expect("capture group 0 always matches");
        embeds.push(MarkdownEmbed {
            span: whole.range(),
            kind: EmbedKind::VideoEmbed {
                video_id: caps[1].to_string(),
                start: caps.get(2).map(|m| m.as_str().to_string()),
                end: caps.get(3).map(|m| m.as_str().to_string()),
            },
        });
    }

    embeds.sort_by_key(|e| (e.span.start, e.span.end));

    let mut disjoint: Vec<MarkdownEmbed> = Vec::new();
    for embed in embeds {
        let overlaps = disjoint
            .last()
            .is_some_and(|kept| embed.span.start < kept.span.end);
        if !overlaps {
            disjoint.push(embed);
        }
    }
    disjoint
}

/// Infer an image MIME type from the URL extension. JPEG is the default.
pub fn mime_type_for_url(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else {
        "image/jpeg"
    }
}

/// Downloads embedded images. Bytes are transient: handed to the resolver and
/// dropped, never persisted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> AppResult<Vec<u8>>;
}

pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> AppResult<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::InternalError(format!("Image download failed: {}", e)))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::InternalError(format!("Image download failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

/// Result of normalizing one uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFile {
    pub original_name: String,
    pub content: NormalizedContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedContent {
    /// Plain text read verbatim.
    Text(String),
    /// Markdown flattened to prose; persisted as a processed `.txt` sibling.
    Markdown(String),
    /// Neither markdown nor text; stored as-is, contributes nothing to the
    /// corpus.
    Opaque,
}

impl NormalizedContent {
    pub fn corpus_text(&self) -> Option<&str> {
        match self {
            NormalizedContent::Text(text) | NormalizedContent::Markdown(text) => Some(text),
            NormalizedContent::Opaque => None,
        }
    }
}

pub struct ContentNormalizer {
    resolver: Arc<dyn MediaResolver>,
    images: Arc<dyn ImageFetcher>,
}

impl ContentNormalizer {
    pub fn new(resolver: Arc<dyn MediaResolver>, images: Arc<dyn ImageFetcher>) -> Self {
        Self { resolver, images }
    }

    /// Normalize one uploaded file into corpus text. Per-item media failures
    /// degrade to placeholder text; a file-level failure (bad encoding)
    /// surfaces as an error for the caller to move the raw file aside.
    pub async fn normalize(&self, original_name: &str, bytes: &[u8]) -> AppResult<NormalizedFile> {
        let extension = file_extension(original_name);

        let content = match extension.as_str() {
            "md" => {
                let markdown = decode_utf8(original_name, bytes)?;
                let flattened = self.flatten_markdown(&markdown).await;
                NormalizedContent::Markdown(markdown_to_plain_text(&flattened))
            }
            "txt" => NormalizedContent::Text(decode_utf8(original_name, bytes)?),
            _ => NormalizedContent::Opaque,
        };

        Ok(NormalizedFile {
            original_name: original_name.to_string(),
            content,
        })
    }

    /// Replace every embedded reference with derived descriptive text, in
    /// scan order against the original buffer.
    async fn flatten_markdown(&self, markdown: &str) -> String {
        let embeds = scan_embeds(markdown);
        if embeds.is_empty() {
            return markdown.to_string();
        }

        let mut output = String::with_capacity(markdown.len());
        let mut cursor = 0usize;
        for embed in embeds {
            output.push_str(&markdown[cursor..embed.span.start]);
            let replacement = self.resolve_embed(&embed.kind).await;
            output.push_str(&replacement);
            cursor = embed.span.end;
        }
        output.push_str(&markdown[cursor..]);
        output
    }

    async fn resolve_embed(&self, kind: &EmbedKind) -> String {
        match kind {
            EmbedKind::Image { url } => {
                let caption = match self.images.fetch(url).await {
                    Ok(bytes) => {
                        let mime_type = mime_type_for_url(url);
                        self.resolver.caption_image(&bytes, mime_type).await
                    }
                    Err(err) => {
                        log::warn!("Failed to download image {}: {}", url, err);
                        IMAGE_CAPTION_FALLBACK.to_string()
                    }
                };
                format!("image to text: {}", caption)
            }
            EmbedKind::VideoLink { url } => {
                let summary = self.resolver.summarize_video(url).await;
                format!("Video TextBook: {}", summary)
            }
            EmbedKind::VideoEmbed {
                video_id,
                start,
                end,
            } => {
                let start_secs = start.as_deref().and_then(|s| s.parse::<f64>().ok());
                let end_secs = end.as_deref().and_then(|s| s.parse::<f64>().ok());
                let summary = self
                    .resolver
                    .summarize_video_window(video_id, start_secs, end_secs)
                    .await;
                format!(
                    "Video summary ({} to {}): {}",
                    start.as_deref().unwrap_or("start"),
                    end.as_deref().unwrap_or("end"),
                    summary
                )
            }
        }
    }
}

pub fn file_extension(name: &str) -> String {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

fn decode_utf8(name: &str, bytes: &[u8]) -> AppResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| AppError::BadRequest(format!("File '{}' is not valid UTF-8", name)))
}

static MD_CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^```.*$").expect("MD_CODE_FENCE is a valid regex pattern"));
static MD_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+").expect("MD_HEADING is a valid regex pattern"));
static MD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("MD_LINK is a valid regex pattern"));
static MD_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*{1,3}|\b_{1,3}|_{1,3}\b").expect("MD_EMPHASIS is a valid regex pattern"));
static MD_LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+").expect("MD_LIST_MARKER is a valid regex pattern")
});
static MD_BLOCKQUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^>\s?").expect("MD_BLOCKQUOTE is a valid regex pattern"));
static MD_HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("MD_HTML_TAG is a valid regex pattern"));
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("BLANK_LINES is a valid regex pattern"));

/// Strip remaining markdown syntax down to plain prose. Replacements from the
/// embed pass are ordinary text by the time this runs.
pub fn markdown_to_plain_text(markdown: &str) -> String {
    let text = MD_CODE_FENCE.replace_all(markdown, "");
    let text = MD_HEADING.replace_all(&text, "");
    let text = MD_LINK.replace_all(&text, "$1");
    let text = MD_EMPHASIS.replace_all(&text, "$2");
    let text = MD_LIST_MARKER.replace_all(&text, "");
    let text = MD_BLOCKQUOTE.replace_all(&text, "");
    let text = MD_HTML_TAG.replace_all(&text, "");
    let text = text.replace('`', "");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}
