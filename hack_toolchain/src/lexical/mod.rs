//! Lexical analysis for Jack source text
//!
//! [`Scanner`] is the streaming token source the parser pulls from;
//! [`LexicalAnalyzer`] scans a whole file up front and collects metrics.

pub mod analyzer;
pub mod scanner;

use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::tokens::TokenStream;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};
pub use scanner::Scanner;

/// Tokenize a loaded file with default preferences
pub fn tokenize_file_result(file_result: &FileProcessingResult) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize_file_result(file_result)
}

/// Tokenize a loaded file with custom runtime preferences
pub fn tokenize_file_result_with_preferences(
    file_result: &FileProcessingResult,
    preferences: LexicalPreferences,
) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::with_preferences(preferences).tokenize_file_result(file_result)
}

/// Tokenize an in-memory source string
pub fn tokenize_source(source: &str) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize(source)
}
