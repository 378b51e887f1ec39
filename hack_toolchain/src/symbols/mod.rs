//! Symbol tables for parsed Jack classes

pub mod collector;
pub mod error;
pub mod table;

pub use collector::{collect_class_symbols, ClassSymbols, SubroutineKind, SubroutineSymbols};
pub use error::{SymbolError, SymbolResult};
pub use table::{Symbol, SymbolKind, SymbolTable, SymbolType};

use crate::logging::codes;
use crate::syntax::Node;
use crate::{log_success, log_warning};

/// Collect symbols with global logging. A failure is reported as a warning;
/// the tree it came from is still valid.
pub fn collect_symbols(node: &Node) -> SymbolResult<ClassSymbols> {
    let result = collect_class_symbols(node);

    match &result {
        Ok(symbols) => {
            log_success!(
                codes::success::SYMBOL_COLLECTION_COMPLETE,
                "Symbol collection completed",
                "class" => symbols.name,
                "subroutines" => symbols.subroutines.len(),
                "symbols" => symbols.symbol_count()
            );
        }
        Err(error) => {
            log_warning!("Symbol collection failed",
                "code" => error.error_code().as_str(),
                "error" => error
            );
        }
    }

    result
}
