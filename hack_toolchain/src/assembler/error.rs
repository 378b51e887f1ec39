//! Assembler errors

use crate::logging::{codes, Code};

pub type AssemblerResult<T> = Result<T, AssemblerError>;

/// Every variant carries the 1-based source line it was raised on
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblerError {
    #[error("Invalid computation '{comp}' at line {line}")]
    InvalidComp { comp: String, line: usize },

    #[error("Invalid destination '{dest}' at line {line}")]
    InvalidDest { dest: String, line: usize },

    #[error("Invalid jump '{jump}' at line {line}")]
    InvalidJump { jump: String, line: usize },

    #[error("Constant {value} at line {line} exceeds {max}")]
    ConstantOutOfRange { value: String, max: u16, line: usize },

    #[error("Label '{label}' at line {line} was already defined at line {first_line}")]
    DuplicateLabel {
        label: String,
        line: usize,
        first_line: usize,
    },

    #[error("Malformed label declaration '{text}' at line {line}")]
    MalformedLabel { text: String, line: usize },

    #[error("Invalid symbol '{symbol}' at line {line}")]
    InvalidSymbol { symbol: String, line: usize },

    #[error("Program exceeds ROM capacity of {limit} instructions")]
    RomOverflow { limit: usize },

    #[error("No RAM left for variable '{symbol}' (next address {address})")]
    RamExhausted { symbol: String, address: u16 },
}

impl AssemblerError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::InvalidComp { .. } => codes::assembler::INVALID_COMP,
            Self::InvalidDest { .. } => codes::assembler::INVALID_DEST,
            Self::InvalidJump { .. } => codes::assembler::INVALID_JUMP,
            Self::ConstantOutOfRange { .. } => codes::assembler::CONSTANT_OUT_OF_RANGE,
            Self::DuplicateLabel { .. } => codes::assembler::DUPLICATE_LABEL,
            Self::MalformedLabel { .. } => codes::assembler::MALFORMED_LABEL,
            Self::InvalidSymbol { .. } => codes::assembler::INVALID_SYMBOL,
            Self::RomOverflow { .. } => codes::assembler::ROM_OVERFLOW,
            Self::RamExhausted { .. } => codes::assembler::RAM_EXHAUSTED,
        }
    }

    /// Source line, when the error is tied to one
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidComp { line, .. }
            | Self::InvalidDest { line, .. }
            | Self::InvalidJump { line, .. }
            | Self::ConstantOutOfRange { line, .. }
            | Self::DuplicateLabel { line, .. }
            | Self::MalformedLabel { line, .. }
            | Self::InvalidSymbol { line, .. } => Some(*line),
            Self::RomOverflow { .. } | Self::RamExhausted { .. } => None,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}
