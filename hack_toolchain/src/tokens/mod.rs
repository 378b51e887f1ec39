//! Token system for Jack lexical analysis
//!
//! Tokens are `(kind, literal)` pairs. [`TokenKind`] is a closed enumeration
//! with one variant per keyword and symbol plus the identifier, integer,
//! string and end-of-input kinds; [`TokenClass`] groups kinds into the
//! categories used by tree output.
//!
//! The parser consumes tokens through the [`TokenSource`] trait, implemented
//! by the streaming scanner in `lexical` and by the pre-scanned
//! [`TokenStream`].

pub mod token;
pub mod token_stream;

pub use token::{Token, TokenClass, TokenKind};
pub use token_stream::{SpannedToken, TokenSource, TokenStream};

pub use crate::utils::{Position, SourceMap, Span, Spanned};
