//! Batch parsing of Jack source directories
//!
//! Discovers `.jack` files and runs each through [`pipeline::parse_jack_file`],
//! sequentially or split across worker threads. Every file is processed under
//! its own file context so the error collector can group diagnostics.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::RuntimeConfig;
use crate::logging::{self, codes};
use crate::pipeline::{self, PipelineError, PipelineResult, JACK_EXTENSION};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: usize,
    pub progress_reporting: bool,
    pub fail_fast: bool,
    pub runtime: RuntimeConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4)
                .max(1),
            recursive: false,
            max_files: MAX_FILES_PER_BATCH,
            progress_reporting: true,
            fail_fast: false,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Clamp the thread count into `1..=MAX_WORKER_THREADS`
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.max_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.successful_files.len() as f64 / self.files_processed as f64
        }
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.files_processed += other.files_processed;
    }

    /// Restore discovery order after parallel merges
    fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch processing completed: {} files processed, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No Jack files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Worker thread failed: {message}")]
    ThreadError { message: String },
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

pub fn discover_jack_files(dir_path: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        });
    }

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config.recursive)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }

    let limit = config.max_files.min(MAX_FILES_PER_BATCH);
    if files.len() > limit {
        return Err(BatchError::TooManyFiles {
            count: files.len(),
            max: limit,
        });
    }

    files.sort();

    crate::log_debug!("File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn visit_directory(dir_path: &Path, files: &mut Vec<PathBuf>, recursive: bool) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir_path).map_err(|e| BatchError::IoError {
        error: e.to_string(),
    })?;

    for entry in entries {
        let path = entry
            .map_err(|e| BatchError::IoError {
                error: e.to_string(),
            })?
            .path();

        if path.is_dir() {
            if recursive {
                visit_directory(&path, files, recursive)?;
            }
        } else if is_jack_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_jack_file(path: &Path) -> bool {
    path.is_file() && pipeline::has_extension(path, JACK_EXTENSION)
}

/// Whether `dir` holds any `.jack` file directly
pub fn contains_jack_files(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| entries.flatten().any(|entry| is_jack_file(&entry.path())))
        .unwrap_or(false)
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

fn process_one(file_path: &Path, file_id: usize, runtime: &RuntimeConfig, results: &mut BatchResults) -> bool {
    logging::with_file_context(file_path.to_path_buf(), file_id, || {
        match pipeline::parse_jack_file(file_path, None, runtime) {
            Ok(result) => {
                results.add_success(file_path.to_path_buf(), result);
                true
            }
            Err(error) => {
                crate::log_error!(error.error_code(), "File processing failed",
                    "file" => file_path.display(),
                    "stage" => error.stage()
                );
                results.add_failure(file_path.to_path_buf(), error);
                false
            }
        }
    })
}

pub fn process_directory_sequential(dir_path: &Path, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch processing",
        "directory" => dir_path.display()
    );

    let files = discover_jack_files(dir_path, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for (file_id, file_path) in files.iter().enumerate() {
        if config.progress_reporting {
            println!(
                "Processing file {} of {}: {}",
                file_id + 1,
                files.len(),
                file_path.display()
            );
        }

        let succeeded = process_one(file_path, file_id, &config.runtime, &mut results);
        if !succeeded && config.fail_fast {
            crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
            break;
        }
    }

    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, 1);
    Ok(results)
}

pub fn process_directory_parallel(dir_path: &Path, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let threads = config.max_threads.clamp(1, MAX_WORKER_THREADS);

    crate::log_info!("Starting parallel batch processing",
        "directory" => dir_path.display(),
        "max_threads" => threads
    );

    let files = discover_jack_files(dir_path, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    let chunk_size = calculate_chunk_size(files.len(), threads);
    crate::log_debug!("Parallel processing configuration",
        "total_files" => files.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    let runtime = Arc::new(config.runtime.clone());
    for (chunk_index, chunk) in files.chunks(chunk_size).enumerate() {
        let first_id = chunk_index * chunk_size;
        let chunk_results = process_chunk_parallel(chunk, first_id, threads, &runtime)?;
        results.merge(chunk_results);

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
            break;
        }
    }

    results.sort();
    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, threads);
    Ok(results)
}

fn process_chunk_parallel(
    files: &[PathBuf],
    first_id: usize,
    threads: usize,
    runtime: &Arc<RuntimeConfig>,
) -> Result<BatchResults, BatchError> {
    let files_per_thread = files.len().div_ceil(threads).max(1);
    let mut handles = Vec::new();

    for (thread_index, thread_files) in files.chunks(files_per_thread).enumerate() {
        let thread_files = thread_files.to_vec();
        let start_id = first_id + thread_index * files_per_thread;
        let runtime = Arc::clone(runtime);

        handles.push(thread::spawn(move || {
            let mut results = BatchResults::new();
            for (offset, file_path) in thread_files.iter().enumerate() {
                process_one(file_path, start_id + offset, &runtime, &mut results);
            }
            results
        }));
    }

    let mut merged = BatchResults::new();
    for handle in handles {
        let results = handle.join().map_err(|_| BatchError::ThreadError {
            message: "Thread panicked during processing".to_string(),
        })?;
        merged.merge(results);
    }

    Ok(merged)
}

fn calculate_chunk_size(file_count: usize, max_threads: usize) -> usize {
    const MAX_CHUNK_SIZE: usize = 50;

    file_count.div_ceil(max_threads.max(1)).clamp(1, MAX_CHUNK_SIZE)
}

fn log_batch_complete(results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch processing completed",
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

pub fn process_directory_with_config(dir_path: &Path, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    if config.max_threads <= 1 {
        process_directory_sequential(dir_path, config)
    } else {
        process_directory_parallel(dir_path, config)
    }
}
