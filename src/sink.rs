use colored::*;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::SinkError;
use crate::renderer::RenderedDocument;

/// Writes rendered documents as `<title>.md` into one directory.
pub struct MarkdownSink {
    out_dir: PathBuf,
}

impl MarkdownSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Path a document with this title is written to.
    pub fn path_for(&self, title: &str) -> PathBuf {
        self.out_dir.join(format!("{}.md", file_stem(title)))
    }

    /// Write one document, creating the output directory if needed.
    /// An existing file with the same name is overwritten.
    pub async fn write(&self, document: &RenderedDocument) -> Result<PathBuf, SinkError> {
        fs::create_dir_all(&self.out_dir)
            .await
            .map_err(|source| SinkError::CreateDir {
                path: self.out_dir.clone(),
                source,
            })?;

        let path = self.path_for(&document.title);
        fs::write(&path, document.body.as_bytes())
            .await
            .map_err(|source| SinkError::Write {
                path: path.clone(),
                source,
            })?;

        debug!("Wrote {}", path.display().to_string().blue());
        Ok(path)
    }
}

/// Keep titles inside the output directory: separators and NUL become `_`.
fn file_stem(title: &str) -> String {
    if title.is_empty() {
        return "untitled".to_string();
    }
    title
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn document(title: &str, body: &str) -> RenderedDocument {
        RenderedDocument {
            title: title.to_string(),
            body: body.to_string(),
            entries: 0,
        }
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Demo"), "Demo");
        assert_eq!(file_stem("Either/Or"), "Either_Or");
        assert_eq!(file_stem("a\\b"), "a_b");
        assert_eq!(file_stem(""), "untitled");
        assert_eq!(file_stem("Ünïcode: 書"), "Ünïcode: 書");
    }

    #[tokio::test]
    async fn test_write_creates_directory() {
        let dir = TempDir::new().unwrap();
        let sink = MarkdownSink::new(dir.path().join("nested").join("out"));

        let path = sink.write(&document("Demo", "# Demo\n")).await.unwrap();

        assert_eq!(path, dir.path().join("nested/out/Demo.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Demo\n");
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let sink = MarkdownSink::new(dir.path());

        sink.write(&document("B1", "old")).await.unwrap();
        let path = sink.write(&document("B1", "new")).await.unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_write_fails_when_out_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "").unwrap();

        let sink = MarkdownSink::new(&blocker);
        let err = sink.write(&document("Demo", "")).await.unwrap_err();
        assert!(matches!(err, SinkError::CreateDir { .. }));
    }
}
