use std::path::{Path, PathBuf};

use tokio::fs;

use crate::errors::AppResult;

/// Per-quiz storage on the local filesystem. Each quiz gets its own directory
/// under the upload root holding the original uploads plus a processed `.txt`
/// sibling for every file that contributed corpus text.
#[derive(Clone, Debug)]
pub struct FileStore {
    upload_dir: PathBuf,
}

impl FileStore {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn quiz_dir(&self, quiz_id: &str) -> PathBuf {
        self.upload_dir.join(quiz_id)
    }

    pub async fn save_original(
        &self,
        quiz_id: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> AppResult<PathBuf> {
        let dir = self.quiz_dir(quiz_id);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(sanitize_file_name(original_name));
        fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Persist normalized text next to the original, as `<stem>.txt`. A
    /// `notes.md` upload yields a `notes.txt` sibling.
    pub async fn save_processed_text(
        &self,
        quiz_id: &str,
        original_name: &str,
        text: &str,
    ) -> AppResult<PathBuf> {
        let dir = self.quiz_dir(quiz_id);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(processed_file_name(original_name));
        fs::write(&path, text).await?;
        Ok(path)
    }

    /// Every processed `.txt` file for a quiz, sorted by filename so corpus
    /// rebuilds are deterministic.
    pub async fn read_processed_texts(&self, quiz_id: &str) -> AppResult<Vec<String>> {
        let dir = self.quiz_dir(quiz_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("txt") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut texts = Vec::with_capacity(paths.len());
        for path in paths {
            texts.push(fs::read_to_string(&path).await?);
        }
        Ok(texts)
    }
}

/// Strip any path components a client-supplied name might carry.
fn sanitize_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string()
}

fn processed_file_name(original_name: &str) -> String {
    let sanitized = sanitize_file_name(original_name);
    let stem = Path::new(&sanitized)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload");
    format!("{}.txt", stem)
}
