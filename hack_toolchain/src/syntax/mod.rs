//! Syntax analysis: token source to parse tree
//!
//! The grammar lives in [`crate::grammar`] as data; this module holds the
//! incremental matcher ([`node`]) and the driver that feeds it ([`parser`]).

pub mod error;
pub mod node;
pub mod parser;

pub use error::{SyntaxError, SyntaxResult};
pub use node::{Node, RuleInstance, RuleNode};
pub use parser::Parser;

use crate::grammar::RuleName;
use crate::lexical::Scanner;
use crate::logging::codes;
use crate::tokens::TokenStream;
use crate::{log_debug, log_error, log_success};

/// Parse a pre-scanned Jack class with global logging
pub fn parse_token_stream(token_stream: TokenStream) -> SyntaxResult<Node> {
    log_debug!("Starting syntax analysis", "tokens" => token_stream.len());

    let source_map = token_stream.source_map().cloned();
    let result = Parser::new(token_stream).parse_class();

    match &result {
        Ok(node) => {
            log_success!(
                codes::success::PARSE_COMPLETE,
                "Syntax analysis completed successfully",
                "class" => class_name(node).unwrap_or("?"),
                "terminals" => node.tokens().len()
            );
        }
        Err(error) => {
            let detail = match (error.span(), &source_map) {
                (Some(span), Some(map)) => map.format_error(&span, &error.to_string()),
                _ => error.to_string(),
            };
            match error.span() {
                Some(span) => log_error!(error.error_code(), "Syntax analysis failed",
                    span = span,
                    "error" => detail
                ),
                None => log_error!(error.error_code(), "Syntax analysis failed",
                    "error" => detail
                ),
            }
        }
    }

    result
}

/// Scan and parse a Jack class straight from source text
pub fn parse_source(source: &str) -> SyntaxResult<Node> {
    Parser::new(Scanner::new(source)).parse_class()
}

/// Name of a parsed class: the identifier after `class`
pub fn class_name(node: &Node) -> Option<&str> {
    if !node.is_rule(RuleName::Class) {
        return None;
    }
    match node.children() {
        [_, Node::Terminal(name), ..] => Some(name.literal.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize_source;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_source_and_stream_agree() {
        let source = "class Point { field int x, y; method int getX() { return x; } }";
        let from_source = parse_source(source).unwrap();
        let from_stream = parse_token_stream(tokenize_source(source).unwrap()).unwrap();
        assert_eq!(from_source, from_stream);
        assert_eq!(class_name(&from_source), Some("Point"));
    }

    #[test]
    fn test_empty_source_is_an_error() {
        assert_matches!(parse_source(""), Err(SyntaxError::EmptyInput));
        assert_matches!(parse_source("// only a comment\n"), Err(SyntaxError::EmptyInput));
    }

    #[test]
    fn test_errors_are_returned() {
        let tokens = tokenize_source("class {").unwrap();
        assert_matches!(
            parse_token_stream(tokens),
            Err(SyntaxError::IncompleteRule { .. })
        );
    }
}
