//! Flat symbol tables with per-kind running indices

use crate::config::compile_time::symbols::MAX_SYMBOLS_PER_SCOPE;
use crate::symbols::error::{SymbolError, SymbolResult};
use crate::tokens::{Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Static,
    Field,
    Argument,
    Local,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Static => "static",
            SymbolKind::Field => "field",
            SymbolKind::Argument => "argument",
            SymbolKind::Local => "local",
        }
    }

    /// VM memory segment that backs variables of this kind
    pub fn segment(&self) -> &'static str {
        match self {
            SymbolKind::Static => "static",
            SymbolKind::Field => "this",
            SymbolKind::Argument => "argument",
            SymbolKind::Local => "local",
        }
    }

    /// Kind introduced by a declaration keyword
    pub fn from_keyword(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Static => Some(SymbolKind::Static),
            TokenKind::Field => Some(SymbolKind::Field),
            TokenKind::Var => Some(SymbolKind::Local),
            _ => None,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolType {
    Int,
    Char,
    Boolean,
    ClassName(String),
}

impl SymbolType {
    pub fn from_token(token: &Token) -> Option<Self> {
        match token.kind {
            TokenKind::Int => Some(SymbolType::Int),
            TokenKind::Char => Some(SymbolType::Char),
            TokenKind::Boolean => Some(SymbolType::Boolean),
            TokenKind::Identifier => Some(SymbolType::ClassName(token.literal.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolType::Int => write!(f, "int"),
            SymbolType::Char => write!(f, "char"),
            SymbolType::Boolean => write!(f, "boolean"),
            SymbolType::ClassName(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub symbol_type: SymbolType,
    pub index: usize,
}

/// One scope: names map to (kind, type, index), indices count per kind from 0
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    scope: String,
    symbols: HashMap<String, Symbol>,
    order: Vec<String>,
    counts: HashMap<SymbolKind, usize>,
}

impl SymbolTable {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Self::default()
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn define(
        &mut self,
        name: &str,
        kind: SymbolKind,
        symbol_type: SymbolType,
    ) -> SymbolResult<&Symbol> {
        if self.symbols.contains_key(name) {
            return Err(SymbolError::duplicate_symbol(name, &self.scope));
        }
        if self.symbols.len() >= MAX_SYMBOLS_PER_SCOPE {
            return Err(SymbolError::TooManySymbols {
                scope: self.scope.clone(),
                limit: MAX_SYMBOLS_PER_SCOPE,
            });
        }

        let count = self.counts.entry(kind).or_insert(0);
        let symbol = Symbol {
            name: name.to_string(),
            kind,
            symbol_type,
            index: *count,
        };
        *count += 1;

        self.order.push(name.to_string());
        Ok(self.symbols.entry(name.to_string()).or_insert(symbol))
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Number of symbols of `kind`, which is also the next index for it
    pub fn count(&self, kind: SymbolKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.order.iter().filter_map(|name| self.symbols.get(name))
    }
}
