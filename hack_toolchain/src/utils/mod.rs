//! Shared source-location types used by the scanner, parser and reporting.

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
