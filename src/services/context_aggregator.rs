use crate::errors::AppResult;
use crate::services::content_normalizer::NormalizedFile;
use crate::services::file_store::FileStore;

/// Concatenate normalized file text into one generation corpus, preserving
/// upload order. Each contributing file ends with a newline so adjacent files
/// never run together. Opaque files contribute nothing.
pub fn build_corpus(files: &[NormalizedFile]) -> String {
    let mut corpus = String::new();
    for file in files {
        if let Some(text) = file.content.corpus_text() {
            corpus.push_str(text);
            corpus.push('\n');
        }
    }
    corpus
}

/// Recover a corpus for a quiz created earlier, preferring the processed
/// text files on disk, then the stored content summary, then nothing.
pub async fn rebuild_corpus(
    store: &FileStore,
    quiz_id: &str,
    content_summary: Option<&str>,
) -> AppResult<String> {
    let texts = store.read_processed_texts(quiz_id).await?;
    if !texts.is_empty() {
        return Ok(texts.join("\n\n"));
    }
    Ok(content_summary.unwrap_or_default().to_string())
}
