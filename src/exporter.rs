use anyhow::{anyhow, Result};
use chrono::Local;
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::aggregator::{group_annotations, ExportGroup};
use crate::model::BookLookup;
use crate::renderer::render;
use crate::sink::MarkdownSink;
use crate::source::{list_annotations, list_books, DEFAULT_ANNOTATIONS_DIR, DEFAULT_BOOKS_DIR};

pub const DEFAULT_OUT_DIR: &str = "./ibook_notes";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory holding the library `*.sqlite` file. `~` is expanded.
    pub books_dir: String,
    /// Directory holding the annotation `*.sqlite` file. `~` is expanded.
    pub annotations_dir: String,
    pub out_dir: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            books_dir: DEFAULT_BOOKS_DIR.to_string(),
            annotations_dir: DEFAULT_ANNOTATIONS_DIR.to_string(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub books: usize,
    pub groups: usize,
    pub annotations: usize,
    pub files: Vec<PathBuf>,
}

/// One annotated book, as printed by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookReport {
    pub asset_id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub annotations: usize,
}

pub struct Exporter {
    options: ExportOptions,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    async fn load(&self) -> Result<(BookLookup, Vec<ExportGroup>)> {
        let books = list_books(&self.options.books_dir)
            .await
            .map_err(|e| anyhow!("Failed to list books: {}", e))?;
        info!("Books found: {}", books.len());

        let annotations = list_annotations(&self.options.annotations_dir)
            .await
            .map_err(|e| anyhow!("Failed to list annotations: {}", e))?;
        let groups = group_annotations(annotations);
        info!("Books with notes: {}", groups.len());

        Ok((books, groups))
    }

    /// Read both stores and write one Markdown file per annotated book.
    pub async fn run(&self) -> Result<ExportSummary> {
        let (books, groups) = self.load().await?;
        let sink = MarkdownSink::new(&self.options.out_dir);
        let exported_at = Local::now();

        let mut summary = ExportSummary {
            books: books.len(),
            groups: groups.len(),
            ..Default::default()
        };

        for group in &groups {
            let document = render(group, &books, &exported_at);
            debug!(
                "Rendered \"{}\" with {} entries",
                document.title, document.entries
            );

            let path = sink
                .write(&document)
                .await
                .map_err(|e| anyhow!("Failed to export \"{}\": {}", document.title, e))?;

            summary.annotations += document.entries;
            summary.files.push(path);
        }

        info!(
            "Export finished: {}",
            sink.out_dir().display().to_string().green()
        );
        Ok(summary)
    }

    /// Annotated books with their exportable annotation counts, by asset id.
    pub async fn report(&self) -> Result<Vec<BookReport>> {
        let (books, groups) = self.load().await?;

        Ok(groups
            .into_iter()
            .map(|group| {
                let book = books.get(&group.book_id);
                BookReport {
                    title: book.map(|b| b.title.clone()),
                    author: book.map(|b| b.author.clone()),
                    annotations: group.annotations.len(),
                    asset_id: group.book_id,
                }
            })
            .collect())
    }
}
