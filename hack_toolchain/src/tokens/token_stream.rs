//! Token streams and the token source seam consumed by the parser

use crate::{
    lexical::LexerError,
    tokens::token::{Token, TokenKind},
    utils::{SourceMap, Span, Spanned},
};

/// A token with span information
pub type SpannedToken = Spanned<Token>;

/// Anything the parser can pull tokens from.
///
/// Whitespace and comments are skipped before a token is yielded. Once the
/// input is exhausted every call returns a token of kind [`TokenKind::Eof`].
pub trait TokenSource {
    fn next_token(&mut self) -> Result<SpannedToken, LexerError>;
}

/// Pre-scanned, in-memory token sequence.
///
/// The stream always ends with an `Eof` token; one is appended when the
/// supplied tokens do not carry their own.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<SpannedToken>,
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        let ends_with_eof = tokens
            .last()
            .map(|token| token.value.is_eof())
            .unwrap_or(false);
        if !ends_with_eof {
            let span = tokens
                .last()
                .map(|token| Span::single(token.span.end()))
                .unwrap_or_else(Span::dummy);
            tokens.push(Spanned::new(Token::eof(), span));
        }

        Self {
            tokens,
            position: 0,
            source_map: None,
        }
    }

    /// Create stream with source map for enhanced error reporting
    pub fn with_source_map(tokens: Vec<SpannedToken>, source_map: SourceMap) -> Self {
        let mut stream = Self::new(tokens);
        stream.source_map = Some(source_map);
        stream
    }

    pub fn current(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.position)
    }

    pub fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.position + 1)
    }

    pub fn advance(&mut self) -> Option<&SpannedToken> {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        self.current()
    }

    pub fn is_at_end(&self) -> bool {
        self.current()
            .map(|token| token.value.is_eof())
            .unwrap_or(true)
    }

    /// Number of tokens, excluding the trailing `Eof`
    pub fn len(&self) -> usize {
        self.tokens.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tokens(&self) -> &[SpannedToken] {
        &self.tokens
    }

    pub fn span_at_position(&self, position: usize) -> Option<Span> {
        self.tokens.get(position).map(|token| token.span)
    }

    /// Count of tokens of one kind, used by the analyzer metrics
    pub fn count_kind(&self, kind: TokenKind) -> usize {
        self.tokens
            .iter()
            .filter(|token| token.value.kind == kind)
            .count()
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    /// Render an error at the current token, with source context when available
    pub fn format_error_at_current(&self, message: &str) -> String {
        let span = self.current().map(|token| token.span).unwrap_or_else(Span::dummy);
        match &self.source_map {
            Some(source_map) => source_map.format_error(&span, message),
            None => format!("{} at {}", message, span),
        }
    }
}

impl TokenSource for TokenStream {
    fn next_token(&mut self) -> Result<SpannedToken, LexerError> {
        let token = match self.tokens.get(self.position) {
            Some(token) => token.clone(),
            None => return Ok(Spanned::new(Token::eof(), Span::dummy())),
        };
        if !token.value.is_eof() {
            self.position += 1;
        }
        Ok(token)
    }
}
