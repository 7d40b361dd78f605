// src/batch/mod.rs
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::extractors::{EpsExtractor, Extraction, Filing};
use crate::utils::html_debug::{create_debug_html, DebugPatterns};
use crate::utils::AppError;

/// How a directory is processed.
pub struct BatchOptions {
    /// File extension, without the dot, that marks a filing.
    pub extension: String,
    /// Documents processed at once. 1 means strictly sequential.
    pub jobs: usize,
    /// Where annotated copies go, if wanted.
    pub debug: Option<(PathBuf, Arc<DebugPatterns>)>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            extension: "html".to_string(),
            jobs: 1,
            debug: None,
        }
    }
}

/// Outcome for one input file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileResult {
    pub filename: String,
    pub extraction: Extraction,
    /// The file could not be read; the extraction is absent.
    pub failed: bool,
}

impl FileResult {
    fn unreadable(filename: String) -> Self {
        Self {
            filename,
            extraction: Extraction::absent(),
            failed: true,
        }
    }
}

/// Filings in `dir` with the given extension, sorted by file name.
pub fn list_documents(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches_extension = path
            .extension()
            .map_or(false, |ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
        if path.is_file() && matches_extension {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Loads and searches one file. Never fails: problems become an absent result.
pub fn process_file(path: &Path, extractor: &EpsExtractor, debug: Option<(&Path, &DebugPatterns)>) -> FileResult {
    let filename = file_name(path);

    let loaded = match debug {
        Some((dir, patterns)) => Filing::read_raw(path).map(|raw| {
            let target = dir.join(format!("{}.annotated.html", filename));
            match create_debug_html(&raw, &target, patterns) {
                Ok(count) => tracing::debug!("Annotated {} matches in {}", count, target.display()),
                Err(e) => tracing::warn!("Failed to create debug HTML for {}: {}", filename, e),
            }
            Filing::parse(&raw)
        }),
        None => Filing::load(path),
    };

    let filing = match loaded {
        Ok(filing) => filing,
        Err(e) => {
            tracing::error!("Error processing {}: {}", filename, e);
            return FileResult::unreadable(filename);
        }
    };

    let extraction = extractor.extract(&filing);
    match (&extraction.value, &extraction.term) {
        (Some(value), Some(term)) => tracing::info!(
            "{}: EPS {} ('{}', via {})",
            filename,
            value,
            term,
            extraction.strategy.unwrap_or("unknown")
        ),
        _ => tracing::info!("{}: no EPS found", filename),
    }

    FileResult {
        filename,
        extraction,
        failed: false,
    }
}

/// Processes every filing in `dir`, at most `options.jobs` at a time.
/// Results come back sorted by file name whatever the scheduling.
pub async fn process_directory(
    dir: &Path,
    extractor: Arc<EpsExtractor>,
    options: &BatchOptions,
) -> Result<Vec<FileResult>, AppError> {
    let paths = list_documents(dir, &options.extension)?;
    tracing::info!("Found {} .{} documents in {}", paths.len(), options.extension, dir.display());

    if let Some((debug_dir, _)) = &options.debug {
        std::fs::create_dir_all(debug_dir)?;
    }

    let semaphore = Arc::new(Semaphore::new(options.jobs.clamp(1, Semaphore::MAX_PERMITS)));
    let mut workers = JoinSet::new();

    for path in paths {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| AppError::Processing(format!("Worker pool closed: {}", e)))?;
        let extractor = Arc::clone(&extractor);
        let debug = options.debug.clone();

        workers.spawn_blocking(move || {
            let debug_ref = debug.as_ref().map(|(dir, patterns)| (dir.as_path(), patterns.as_ref()));
            // A panic inside the parser must not take the batch down
            let result = panic::catch_unwind(AssertUnwindSafe(|| process_file(&path, &extractor, debug_ref)))
                .unwrap_or_else(|_| {
                    let filename = file_name(&path);
                    tracing::error!("Error processing {}: extraction panicked", filename);
                    FileResult::unreadable(filename)
                });
            drop(permit);
            result
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = workers.join_next().await {
        let result = joined.map_err(|e| AppError::Processing(format!("Worker task failed: {}", e)))?;
        results.push(result);
    }

    results.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(results)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
