// src/main.rs
mod batch;
mod extractors;
mod storage;
mod utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use batch::BatchOptions;
use extractors::{EpsExtractor, ExtractorConfig};
use storage::StorageManager;
use utils::html_debug::DebugPatterns;
use utils::AppError;

/// Extracts earnings per share from a directory of HTML quarterly filings
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing the HTML filings
    input_dir: PathBuf,

    /// Output CSV file path
    output_file: PathBuf,

    /// Extension of the files to process
    #[arg(long, default_value = "html")]
    extension: String,

    /// Number of documents processed in parallel
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// JSON file overriding the built-in term catalogs and search windows
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Debug mode - save annotated copies of every filing into this directory
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Also write run statistics to <output_file>.meta.json
    #[arg(long)]
    metadata: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting processing for args: {:?}", args);

    check_input_dir(&args.input_dir)?;

    // 3. Load the extractor configuration
    let config = match &args.config {
        Some(path) => ExtractorConfig::from_json_file(path)?,
        None => ExtractorConfig::default(),
    };

    // 4. Initialize storage and the extractor
    let storage = StorageManager::new(&args.output_file)?;
    let extractor = Arc::new(EpsExtractor::new(&config));

    let options = BatchOptions {
        extension: args.extension.trim_start_matches('.').to_string(),
        jobs: args.jobs,
        debug: args
            .debug_dir
            .clone()
            .map(|dir| (dir, Arc::new(DebugPatterns::from_config(&config)))),
    };

    // 5. Process every filing
    let results = batch::process_directory(&args.input_dir, extractor, &options).await?;
    if results.is_empty() {
        tracing::warn!("No .{} files found in {}", options.extension, args.input_dir.display());
    }

    // 6. Write results
    storage.save_results(&results)?;
    if args.metadata {
        storage.save_run_metadata(&args.input_dir, &results)?;
    }

    let found = results.iter().filter(|r| r.extraction.is_found()).count();
    let failed = results.iter().filter(|r| r.failed).count();
    tracing::info!(
        "Processing finished. Documents: {}, EPS found: {}, Failures: {}",
        results.len(),
        found,
        failed
    );
    println!("Results written to {}", args.output_file.display());

    Ok(())
}

fn check_input_dir(dir: &Path) -> Result<(), AppError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(AppError::Config(format!("Input directory '{}' does not exist", dir.display())))
    }
}
