//! Readers for the Apple Books library and annotation databases.
//!
//! Both stores are single `*.sqlite` files inside a container directory.
//! A missing directory or file reads as an empty result; a file the
//! driver cannot open or query is an error.

use colored::*;
use futures_util::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::model::{book_lookup, Annotation, Book, BookLookup};

pub const DEFAULT_BOOKS_DIR: &str =
    "~/Library/Containers/com.apple.iBooksX/Data/Documents/BKLibrary";
pub const DEFAULT_ANNOTATIONS_DIR: &str =
    "~/Library/Containers/com.apple.iBooksX/Data/Documents/AEAnnotation";

const LIST_BOOKS_SQL: &str = r#"
    SELECT ZASSETID AS id, ZTITLE AS title, ZAUTHOR AS author
    FROM ZBKLIBRARYASSET
    WHERE ZTITLE IS NOT NULL
"#;

const LIST_ANNOTATIONS_SQL: &str = r#"
    SELECT
        ZANNOTATIONREPRESENTATIVETEXT AS broader_text,
        ZANNOTATIONSELECTEDTEXT AS selected_text,
        ZANNOTATIONNOTE AS note,
        ZFUTUREPROOFING5 AS chapter,
        CAST(ZANNOTATIONCREATIONDATE AS TEXT) AS created,
        CAST(ZANNOTATIONMODIFICATIONDATE AS TEXT) AS modified,
        ZANNOTATIONASSETID AS book_id,
        ZANNOTATIONLOCATION AS location
    FROM ZAEANNOTATION
    WHERE ZANNOTATIONSELECTEDTEXT IS NOT NULL AND ZANNOTATIONDELETED = 0
"#;

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: Option<String>,
    title: Option<String>,
    author: Option<String>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id.unwrap_or_default(),
            title: row.title.unwrap_or_default(),
            author: row.author.unwrap_or_default(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AnnotationRow {
    broader_text: Option<String>,
    selected_text: Option<String>,
    note: Option<String>,
    chapter: Option<String>,
    created: Option<String>,
    modified: Option<String>,
    book_id: Option<String>,
    location: Option<String>,
}

impl From<AnnotationRow> for Annotation {
    fn from(row: AnnotationRow) -> Self {
        Self {
            book_id: row.book_id.unwrap_or_default(),
            broader_text: row.broader_text.unwrap_or_default(),
            selected_text: row.selected_text.unwrap_or_default(),
            note: row.note.unwrap_or_default(),
            chapter: row.chapter.unwrap_or_default(),
            created: row.created.unwrap_or_default(),
            modified: row.modified.unwrap_or_default(),
            location: row.location.unwrap_or_default(),
        }
    }
}

/// Expand a leading `~` to `$HOME`. `None` if `HOME` is needed but unset.
pub fn expand_home(dir: &str) -> Option<PathBuf> {
    let home = if dir.starts_with('~') {
        std::env::var_os("HOME")
    } else {
        None
    };
    expand_home_with(dir, home.as_deref())
}

fn expand_home_with(dir: &str, home: Option<&OsStr>) -> Option<PathBuf> {
    match dir.strip_prefix('~') {
        Some(rest) => {
            let rest = rest.trim_start_matches('/');
            Some(PathBuf::from(home?).join(rest))
        }
        None if dir.is_empty() => Some(PathBuf::from(".")),
        None => Some(PathBuf::from(dir)),
    }
}

/// First `*.sqlite` file in `dir`, by file name.
pub async fn find_database_file(dir: &str) -> Option<PathBuf> {
    let dir = expand_home(dir)?;
    let mut entries = match fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot read {}: {}", dir.display(), e);
            return None;
        }
    };

    let mut candidates = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "sqlite") {
                    candidates.push(path);
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!("Stopped listing {}: {}", dir.display(), e);
                break;
            }
        }
    }

    candidates.sort();
    candidates.into_iter().next()
}

async fn open_read_only(path: &Path) -> Result<SqlitePool, SourceError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Books with a title, keyed by asset id. Empty if the store is missing.
pub async fn list_books(dir: &str) -> Result<BookLookup, SourceError> {
    let Some(path) = find_database_file(dir).await else {
        warn!("Cannot get database file for ibook in {}", dir.yellow());
        return Ok(BookLookup::new());
    };
    info!("booksDatabaseFile: {}", path.display().to_string().blue());

    let pool = open_read_only(&path).await?;
    let mut rows = sqlx::query_as::<_, BookRow>(LIST_BOOKS_SQL).fetch(&pool);
    let mut books = Vec::new();
    loop {
        match rows.try_next().await {
            Ok(Some(row)) => books.push(Book::from(row)),
            Ok(None) => break,
            Err(source) => return Err(SourceError::Query { path, source }),
        }
    }
    drop(rows);
    pool.close().await;

    Ok(book_lookup(books))
}

/// Live (not deleted) annotations with selected text, in storage order.
/// Empty if the store is missing.
pub async fn list_annotations(dir: &str) -> Result<Vec<Annotation>, SourceError> {
    let Some(path) = find_database_file(dir).await else {
        warn!("Cannot get annotation database file in {}", dir.yellow());
        return Ok(Vec::new());
    };
    info!("notesDatabaseFile: {}", path.display().to_string().blue());

    let pool = open_read_only(&path).await?;
    let annotations = sqlx::query_as::<_, AnnotationRow>(LIST_ANNOTATIONS_SQL)
        .fetch_all(&pool)
        .await
        .map_err(|source| SourceError::Query { path, source })?;
    pool.close().await;

    Ok(annotations.into_iter().map(Annotation::from).collect())
}
