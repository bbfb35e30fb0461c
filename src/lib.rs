//! # ibook-notes
//!
//! A CLI utility to export Apple Books highlights and notes into one
//! Markdown file per book, ordered by reading position.
//!
//! ## Current Features
//!
//! - Reads the Apple Books library and annotation SQLite stores read-only
//! - Orders annotations by their position in the book
//! - Chapter headings, notes as quotes, one `<title>.md` per book
//!
//! ## Usage
//!
//! ```bash
//! ibook-notes export --outDir ./ibook_notes
//! ```

pub mod aggregator;
pub mod error;
mod exporter;
pub mod location;
pub mod model;
pub mod renderer;
pub mod sink;
pub mod source;

pub use aggregator::{group_annotations, ExportGroup};
pub use error::{SinkError, SourceError};
pub use exporter::{BookReport, ExportOptions, ExportSummary, Exporter, DEFAULT_OUT_DIR};
pub use location::{compare_locations, LocationKey};
pub use model::{Annotation, Book, BookLookup};
pub use renderer::{render, RenderedDocument};
pub use sink::MarkdownSink;
