//! Syntax errors with error code mapping and span-accurate reporting

use crate::grammar::RuleName;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::utils::Span;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Empty input: no tokens to parse")]
    EmptyInput,

    #[error("Incomplete {rule}: expected {expected}, found {found} at {span}")]
    IncompleteRule {
        rule: RuleName,
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected token: expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected {found} after the end of the class at {span}")]
    TrailingInput { found: String, span: Span },

    #[error("Maximum parse depth {depth} exceeded")]
    MaxRecursionDepth { depth: usize },

    #[error("{rule} is not allowed here inside {enclosing} at {span}")]
    MisplacedRule {
        rule: RuleName,
        enclosing: RuleName,
        span: Span,
    },

    #[error("Lexical error: {0}")]
    Lexical(#[from] LexerError),
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn incomplete_rule(rule: RuleName, expected: &str, found: &str, span: Span) -> Self {
        Self::IncompleteRule {
            rule,
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::EmptyInput => codes::syntax::EMPTY_INPUT,
            Self::IncompleteRule { .. } => codes::syntax::INCOMPLETE_RULE,
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::TrailingInput { .. } => codes::syntax::TRAILING_INPUT,
            Self::MaxRecursionDepth { .. } => codes::syntax::MAX_RECURSION_DEPTH,
            Self::MisplacedRule { .. } => codes::syntax::MISPLACED_RULE,
            Self::Lexical(_) => codes::syntax::LEXICAL_FAILURE,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::IncompleteRule { span, .. }
            | Self::UnexpectedToken { span, .. }
            | Self::TrailingInput { span, .. }
            | Self::MisplacedRule { span, .. } => Some(*span),
            Self::EmptyInput | Self::MaxRecursionDepth { .. } | Self::Lexical(_) => None,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}
