//! Symbol collection errors

use crate::grammar::RuleName;
use crate::logging::{codes, Code};

pub type SymbolResult<T> = Result<T, SymbolError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("Duplicate symbol '{name}' in {scope}")]
    DuplicateSymbol { name: String, scope: String },

    #[error("Too many symbols in {scope} (max {limit})")]
    TooManySymbols { scope: String, limit: usize },

    #[error("Malformed {rule}: {detail}")]
    MalformedDeclaration { rule: RuleName, detail: String },
}

impl SymbolError {
    pub fn duplicate_symbol(name: &str, scope: &str) -> Self {
        Self::DuplicateSymbol {
            name: name.to_string(),
            scope: scope.to_string(),
        }
    }

    pub fn malformed(rule: RuleName, detail: impl Into<String>) -> Self {
        Self::MalformedDeclaration {
            rule,
            detail: detail.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::DuplicateSymbol { .. } => codes::symbols::DUPLICATE_SYMBOL,
            Self::TooManySymbols { .. } => codes::symbols::TOO_MANY_SYMBOLS,
            Self::MalformedDeclaration { .. } => codes::symbols::MALFORMED_DECLARATION,
        }
    }
}
