// Internal modules
pub mod assembler;
pub mod batch;
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod symbols;
pub mod syntax;
pub mod tokens;
pub mod tree;
pub mod utils;
pub mod vm_translator;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use pipeline::{PipelineError, PipelineResult, PipelineSummary};
pub use syntax::{parse_source, Node, SyntaxError};
