use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use colored::*;
use ibook_notes::{BookReport, ExportOptions, Exporter, DEFAULT_OUT_DIR};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ibook-notes")]
#[command(about = "CLI utility to export Apple Books highlights and notes into Markdown, one file per book")]
#[command(version = "0.1.0")]
struct Args {
    /// Runs `export` with default locations when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(ClapArgs)]
struct SourceArgs {
    /// Directory containing the library database (BKLibrary*.sqlite)
    #[arg(long = "books-dir", default_value = ibook_notes::source::DEFAULT_BOOKS_DIR)]
    books_dir: String,

    /// Directory containing the annotation database (AEAnnotation*.sqlite)
    #[arg(long = "annotations-dir", default_value = ibook_notes::source::DEFAULT_ANNOTATIONS_DIR)]
    annotations_dir: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every annotated book to <title>.md
    Export {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output directory used to save files
        #[arg(short = 'o', long = "outDir", default_value = DEFAULT_OUT_DIR)]
        out_dir: PathBuf,
    },
    /// List annotated books without writing anything
    List {
        #[command(flatten)]
        sources: SourceArgs,

        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
}

async fn export(options: ExportOptions) -> Result<()> {
    let summary = Exporter::new(options).run().await?;
    info!(
        "Exported {} annotations from {} books ({} files)",
        summary.annotations,
        summary.groups,
        summary.files.len().to_string().green()
    );
    Ok(())
}

async fn list(options: ExportOptions, json: bool) -> Result<()> {
    let report = Exporter::new(options).report().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for BookReport { asset_id, title, author, annotations } in &report {
        let title = title.as_deref().unwrap_or(asset_id);
        let author = author.as_deref().unwrap_or("unknown author");
        println!(
            "{} {} ({}) {}",
            title.green(),
            format!("- {}", author).dimmed(),
            asset_id.blue(),
            format!("{} notes", annotations).yellow()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::from_default_env()
        .add_directive("sqlx=warn".parse().unwrap())
        .add_directive("ibook_notes=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let args = Args::parse();

    let result = match args.command {
        None => export(ExportOptions::default()).await,
        Some(Commands::Export { sources, out_dir }) => {
            export(ExportOptions {
                books_dir: sources.books_dir,
                annotations_dir: sources.annotations_dir,
                out_dir,
            })
            .await
        }
        Some(Commands::List { sources, json }) => {
            let options = ExportOptions {
                books_dir: sources.books_dir,
                annotations_dir: sources.annotations_dir,
                ..Default::default()
            };
            list(options, json).await
        }
    };

    if let Err(e) = result {
        error!("{}", format!("Error: {}", e).red());
        process::exit(1);
    }
}
