use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use childcare_extract::aggregate::{self, AggregateOptions};
use childcare_extract::batch::{self, BatchOutcome, PageFailure};
use childcare_extract::model::ContentBlock;
use childcare_extract::{db, retrieval, source, Settings};

#[derive(Parser)]
#[command(
    name = "childcare-extract",
    about = "Structured extraction of crawled childcare portal pages"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every page into a JSON array of Documents
    Process {
        /// Crawl directory holding `<id>_<name>/` category folders
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Flat per-type records for tabular export, as JSON
    Aggregate {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Treat the first row of headerless tables as a header row
        #[arg(long)]
        promote_header_row: bool,
    },
    /// One flattened text record per section for the retrieval index
    Index {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the aggregate records into a SQLite database
    Export {
        input: PathBuf,
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        promote_header_row: bool,
    },
    /// Page, section and block counts
    Stats { input: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    info!(?settings, "settings loaded");

    match cli.command {
        Commands::Process { input, output } => {
            let outcome = extract(&input, &settings)?;
            write_json(output.as_deref(), &outcome.documents)?;
        }
        Commands::Aggregate { input, output, promote_header_row } => {
            settings.promote_header_row |= promote_header_row;
            let outcome = extract(&input, &settings)?;
            let agg = aggregate::project(&outcome.documents, &AggregateOptions::from(&settings));
            write_json(output.as_deref(), &agg)?;
        }
        Commands::Index { input, output } => {
            let outcome = extract(&input, &settings)?;
            let records: Vec<_> = outcome
                .documents
                .iter()
                .flat_map(retrieval::index_records)
                .collect();
            eprintln!("{} index records from {} documents", records.len(), outcome.documents.len());
            write_json(output.as_deref(), &records)?;
        }
        Commands::Export { input, db: db_path, promote_header_row } => {
            settings.promote_header_row |= promote_header_row;
            let outcome = extract(&input, &settings)?;
            let agg = aggregate::project(&outcome.documents, &AggregateOptions::from(&settings));

            let conn = db::connect(&db_path)
                .with_context(|| format!("opening {}", db_path.display()))?;
            db::init_schema(&conn)?;
            db::save_aggregate(&conn, &agg)?;
            for (table, n) in db::table_counts(&conn)? {
                eprintln!("{:<14} {}", table, n);
            }
        }
        Commands::Stats { input } => {
            let outcome = extract(&input, &settings)?;
            print_stats(&outcome);
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

fn extract(input: &Path, settings: &Settings) -> Result<BatchOutcome> {
    let pages = source::load_pages(input)?;
    eprintln!("Extracting {} pages...", pages.len());

    let pb = ProgressBar::new(pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );
    let outcome = batch::process_batch_with(&pages, settings, |n| pb.inc(n as u64))?;
    pb.finish_and_clear();

    report_failures(&outcome.failures);
    Ok(outcome)
}

fn report_failures(failures: &[PageFailure]) {
    if failures.is_empty() {
        return;
    }
    eprintln!("{} pages failed:", failures.len());
    for f in failures {
        eprintln!("  {}/{}: {}", f.category, f.file, f.error);
    }
}

fn write_json<T: Serialize + ?Sized>(output: Option<&Path>, value: &T) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
            eprintln!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, value)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

#[derive(Default)]
struct BlockCounts {
    paragraphs: usize,
    lists: usize,
    tables: usize,
    images: usize,
    highlights: usize,
}

impl BlockCounts {
    fn add(&mut self, blocks: &[ContentBlock]) {
        for block in blocks {
            match block {
                ContentBlock::Paragraph { .. } => self.paragraphs += 1,
                ContentBlock::List { .. } => self.lists += 1,
                ContentBlock::Table(_) => self.tables += 1,
                ContentBlock::Image { .. } => self.images += 1,
                ContentBlock::HighlightBox { .. } => self.highlights += 1,
            }
        }
    }
}

fn print_stats(outcome: &BatchOutcome) {
    let docs = &outcome.documents;
    let sections: usize = docs.iter().map(|d| d.sections.len()).sum();
    let unsectioned = docs.iter().filter(|d| d.sections.is_empty()).count();

    let mut blocks = BlockCounts::default();
    for doc in docs {
        for section in &doc.sections {
            blocks.add(&section.content);
        }
        blocks.add(&doc.unsectioned);
    }

    println!("Documents:   {}", docs.len());
    println!("Failures:    {}", outcome.failures.len());
    println!("Sections:    {}", sections);
    println!("Unsectioned: {}", unsectioned);
    println!("Paragraphs:  {}", blocks.paragraphs);
    println!("Lists:       {}", blocks.lists);
    println!("Tables:      {}", blocks.tables);
    println!("Images:      {}", blocks.images);
    println!("Highlights:  {}", blocks.highlights);
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
