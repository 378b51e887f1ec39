use crate::assembler::AssemblerError;
use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::symbols::SymbolError;
use crate::syntax::SyntaxError;
use crate::tree::TreeError;
use crate::vm_translator::VmError;
use std::path::PathBuf;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Syntax analysis failed: {0}")]
    SyntaxAnalysis(#[from] SyntaxError),

    #[error("Symbol collection failed: {0}")]
    SymbolCollection(#[from] SymbolError),

    #[error("Assembly failed: {0}")]
    Assembly(#[from] AssemblerError),

    #[error("VM translation failed: {0}")]
    Translation(#[from] VmError),

    #[error("Tree output failed: {0}")]
    TreeOutput(#[from] TreeError),

    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(e) => e.error_code(),
            Self::LexicalAnalysis(e) => e.error_code(),
            Self::SyntaxAnalysis(e) => e.error_code(),
            Self::SymbolCollection(e) => e.error_code(),
            Self::Assembly(e) => e.error_code(),
            Self::Translation(e) => e.error_code(),
            Self::TreeOutput(e) => e.error_code(),
            Self::Write { .. } => codes::output::WRITE_FAILED,
            Self::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    /// Stage name for summaries
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileProcessing(_) => "file processing",
            Self::LexicalAnalysis(_) => "lexical analysis",
            Self::SyntaxAnalysis(_) => "syntax analysis",
            Self::SymbolCollection(_) => "symbol collection",
            Self::Assembly(_) => "assembly",
            Self::Translation(_) => "VM translation",
            Self::TreeOutput(_) | Self::Write { .. } => "output",
            Self::Pipeline { .. } => "pipeline",
        }
    }
}
