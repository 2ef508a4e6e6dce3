//! File store for generated books, rooted at `OUTPUT_DIR`.
//!
//! Layout: `markdown/<id>_<method>_<timestamp>.md` and `books/<id>_<timestamp>.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::book::Book;

const MARKDOWN_DIR: &str = "markdown";
const BOOKS_DIR: &str = "books";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Markdown,
    Book,
}

impl FileKind {
    fn dir(&self) -> &'static str {
        match self {
            FileKind::Markdown => MARKDOWN_DIR,
            FileKind::Book => BOOKS_DIR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFiles {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub name: String,
    pub kind: FileKind,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BookStore {
    root: PathBuf,
}

impl BookStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the rendered Markdown and the book JSON side by side.
    pub async fn save(&self, book: &Book, markdown: &str) -> Result<SavedFiles, StoreError> {
        let timestamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        let markdown_dir = self.root.join(MARKDOWN_DIR);
        let books_dir = self.root.join(BOOKS_DIR);
        tokio::fs::create_dir_all(&markdown_dir).await?;
        tokio::fs::create_dir_all(&books_dir).await?;

        let stem = file_stem(&book.id);
        let markdown_path = markdown_dir.join(format!(
            "{stem}_{}_{timestamp}.md",
            book.metadata.generation_method.file_tag()
        ));
        tokio::fs::write(&markdown_path, markdown).await?;

        let json_path = books_dir.join(format!("{stem}_{timestamp}.json"));
        tokio::fs::write(&json_path, serde_json::to_vec_pretty(book)?).await?;

        info!(
            markdown = %markdown_path.display(),
            json = %json_path.display(),
            "book saved"
        );
        Ok(SavedFiles {
            markdown: markdown_path,
            json: json_path,
        })
    }

    /// Every saved file, newest first.
    pub async fn list(&self) -> Result<Vec<StoredFile>, StoreError> {
        let mut files = Vec::new();

        for kind in [FileKind::Markdown, FileKind::Book] {
            let dir = self.root.join(kind.dir());
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                if !metadata.is_file() {
                    continue;
                }
                files.push(StoredFile {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    kind,
                    path: entry.path(),
                    size_bytes: metadata.len(),
                    modified: DateTime::<Utc>::from(metadata.modified()?),
                });
            }
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(files)
    }

    /// Deletes saved files last modified more than `days` days ago. Returns how many.
    pub async fn clean_older_than(&self, days: u64) -> Result<usize, StoreError> {
        let cutoff = SystemTime::now()
            .checked_sub(Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY)))
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let mut deleted = 0;

        for file in self.list().await? {
            if SystemTime::from(file.modified) < cutoff {
                tokio::fs::remove_file(&file.path).await?;
                debug!(path = %file.path.display(), "deleted old file");
                deleted += 1;
            }
        }

        if deleted > 0 {
            info!("Cleaned {deleted} files older than {days} days");
        }
        Ok(deleted)
    }
}

/// Book id made safe for a single path component: separators, control and
/// reserved characters become `_`.
fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::assembler::{assemble, BookDraft};
    use crate::book::extractor::extract;
    use crate::book::GenerationMethod;

    fn book() -> Book {
        let draft = BookDraft {
            theme: "Le Trésor Inca",
            total_sections: 2,
            intro_text: "Bonsoir",
            review_text: "",
            method: GenerationMethod::Crew,
        };
        assemble(&draft, extract("", 2))
    }

    #[tokio::test]
    async fn test_save_writes_markdown_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = BookStore::new(dir.path());
        let book = book();

        let saved = store.save(&book, "# Livre").await.unwrap();

        let md_name = saved.markdown.file_name().unwrap().to_string_lossy().into_owned();
        assert!(md_name.starts_with("lachasseautresor_le_trésor_inca_crew_"));
        assert!(md_name.ends_with(".md"));
        assert!(saved.markdown.starts_with(dir.path().join("markdown")));
        assert_eq!(tokio::fs::read_to_string(&saved.markdown).await.unwrap(), "# Livre");

        let json = tokio::fs::read_to_string(&saved.json).await.unwrap();
        let reloaded: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, book);
    }

    #[tokio::test]
    async fn test_save_with_separator_in_theme_stays_in_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = BookStore::new(dir.path());
        let mut book = book();
        book.id = crate::book::book_id("Égypte / Nubie");

        let saved = store.save(&book, "# Livre").await.unwrap();

        assert_eq!(saved.markdown.parent().unwrap(), dir.path().join("markdown"));
        assert_eq!(saved.json.parent().unwrap(), dir.path().join("books"));
        let md_name = saved.markdown.file_name().unwrap().to_string_lossy().into_owned();
        assert!(md_name.starts_with("lachasseautresor_égypte___nubie_crew_"));
    }

    #[test]
    fn test_file_stem_replaces_unsafe_characters() {
        assert_eq!(file_stem("a/b\\c:d\ne"), "a_b_c_d_e");
        assert_eq!(file_stem("lachasseautresor_le_nil"), "lachasseautresor_le_nil");
    }

    #[tokio::test]
    async fn test_list_on_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = BookStore::new(dir.path().join("absent"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_reports_both_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let store = BookStore::new(dir.path());
        store.save(&book(), "# Livre").await.unwrap();

        let files = store.list().await.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.kind == FileKind::Markdown && f.size_bytes == 7));
        assert!(files.iter().any(|f| f.kind == FileKind::Book));
    }

    #[tokio::test]
    async fn test_clean_removes_only_old_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = BookStore::new(dir.path());
        let saved = store.save(&book(), "# Livre").await.unwrap();

        let forty_days_ago = SystemTime::now() - Duration::from_secs(40 * SECONDS_PER_DAY);
        std::fs::File::options()
            .write(true)
            .open(&saved.markdown)
            .unwrap()
            .set_modified(forty_days_ago)
            .unwrap();

        assert_eq!(store.clean_older_than(30).await.unwrap(), 1);
        assert!(!saved.markdown.exists());
        assert!(saved.json.exists());
        assert_eq!(store.clean_older_than(30).await.unwrap(), 0);
    }
}
