//! Whole-file tokenization with metrics and global logging integration

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::lexical::Scanner;
use crate::logging::codes;
use crate::tokens::{SourceMap, Token, TokenClass, TokenSource, TokenStream};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_success};

/// Lexical analysis errors with compile-time limits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character: '{character}' at line {line}, column {column}")]
    InvalidCharacter {
        character: char,
        line: u32,
        column: u32,
    },

    #[error("Unterminated string constant starting at line {line}, column {column}")]
    UnterminatedString { line: u32, column: u32 },

    #[error("Invalid integer constant '{text}' at line {line}, column {column} (max {MAX_INTEGER_VALUE})")]
    InvalidNumber { text: String, line: u32, column: u32 },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize },

    #[error("Unterminated block comment starting at line {line}, column {column}")]
    UnterminatedComment { line: u32, column: u32 },

    #[error("Comment too long: {length} characters (max {MAX_COMMENT_LENGTH})")]
    CommentTooLong { length: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::UnterminatedComment { .. } => codes::lexical::UNTERMINATED_COMMENT,
            LexerError::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    /// Source position of the error, for the variants that know it
    pub fn position(&self) -> Option<(u32, u32)> {
        match self {
            LexerError::InvalidCharacter { line, column, .. }
            | LexerError::UnterminatedString { line, column }
            | LexerError::InvalidNumber { line, column, .. }
            | LexerError::UnterminatedComment { line, column } => Some((*line, *column)),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub symbol_tokens: usize,
    pub identifier_tokens: usize,
    pub integer_tokens: usize,
    pub string_tokens: usize,
    pub max_string_length: usize,
    pub comment_count: usize,
    pub max_comment_length: usize,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;
        if !preferences.collect_detailed_metrics {
            return;
        }

        match token.category() {
            TokenClass::Keyword => self.keyword_tokens += 1,
            TokenClass::Symbol => self.symbol_tokens += 1,
            TokenClass::Identifier => self.identifier_tokens += 1,
            TokenClass::IntegerConstant => self.integer_tokens += 1,
            TokenClass::StringConstant => {
                self.string_tokens += 1;
                self.record_string_length(token.literal.len(), preferences);
            }
            TokenClass::EndOfInput => {}
        }
    }

    fn record_string_length(&mut self, length: usize, preferences: &LexicalPreferences) {
        self.max_string_length = self.max_string_length.max(length);

        if preferences.log_string_statistics {
            log_debug!("String constant processed",
                "length" => length,
                "max_so_far" => self.max_string_length
            );
        }
    }
}

pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Tokenize a loaded file; the resulting stream carries a source map
    pub fn tokenize_file_result(
        &mut self,
        file_result: &FileProcessingResult,
    ) -> Result<TokenStream, LexerError> {
        let file_path = file_result.metadata.path.display().to_string();

        log_debug!("Starting lexical analysis",
            "file" => file_path,
            "char_count" => file_result.char_count(),
            "line_count" => file_result.metadata.line_count,
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        let tokens = self.tokenize(&file_result.source)?;
        let stream = TokenStream::with_source_map(
            tokens.tokens().to_vec(),
            SourceMap::new(file_result.source.clone()),
        );

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization completed",
            "file" => file_path,
            "tokens" => self.metrics.total_tokens,
            "comments" => self.metrics.comment_count
        );
        Ok(stream)
    }

    /// Scan `source` to completion
    pub fn tokenize(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();

        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = match scanner.next_token() {
                Ok(token) => token,
                Err(error) => {
                    let span = error
                        .position()
                        .map(|(line, column)| Span::single(Position::new(0, line, column)))
                        .unwrap_or_else(Span::dummy);
                    log_error!(error.error_code(), &error.to_string(),
                        span = span,
                        "tokens_before_error" => tokens.len()
                    );
                    return Err(error);
                }
            };

            if token.value.is_eof() {
                tokens.push(token);
                break;
            }
            self.metrics.record_token(&token.value, &self.preferences);
            tokens.push(token);
        }

        self.metrics.comment_count = scanner.comment_count();
        self.metrics.max_comment_length = scanner.max_comment_length();

        log_debug!("Token processing summary",
            "total_tokens" => self.metrics.total_tokens,
            "keywords" => self.metrics.keyword_tokens,
            "identifiers" => self.metrics.identifier_tokens,
            "symbols" => self.metrics.symbol_tokens
        );

        Ok(TokenStream::new(tokens))
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
