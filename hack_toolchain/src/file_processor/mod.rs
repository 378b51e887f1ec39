//! Source file loading shared by the parser, assembler and VM translator

mod processor;

use crate::config::runtime::FileProcessorPreferences;
use std::path::Path;

pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

/// Read a file expected to carry `extension`, using default preferences
pub fn process_file(
    file_path: &Path,
    extension: &str,
) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new()
        .with_expected_extension(extension)
        .process_file(file_path)
}

/// Create a file processor from runtime preferences
pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}

/// Get the compile-time maximum file size limit
pub fn get_max_file_size() -> u64 {
    FileProcessor::max_file_size()
}
