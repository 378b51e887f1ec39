//! VM translation errors

use crate::logging::{codes, Code};

pub type VmResult<T> = Result<T, VmError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    #[error("Unknown VM command '{command}' at line {line}")]
    UnknownCommand { command: String, line: usize },

    #[error("Malformed VM command '{text}' at line {line}: {reason}")]
    MalformedCommand {
        text: String,
        reason: String,
        line: usize,
    },

    #[error("Invalid memory segment '{segment}' at line {line}")]
    InvalidSegment { segment: String, line: usize },

    #[error("Cannot pop into the constant segment at line {line}")]
    PopToConstant { line: usize },

    #[error("Index {index} is outside segment '{segment}' (size {size}) at line {line}")]
    SegmentIndexOutOfRange {
        segment: String,
        index: u16,
        size: u16,
        line: usize,
    },

    #[error("Invalid index '{value}' at line {line}")]
    InvalidIndex { value: String, line: usize },

    #[error("{module} has more than {limit} commands")]
    TooManyCommands { module: String, limit: usize },

    #[error("No .vm files found in {path}")]
    NoVmFiles { path: String },
}

impl VmError {
    pub fn malformed(text: &str, reason: &str, line: usize) -> Self {
        Self::MalformedCommand {
            text: text.to_string(),
            reason: reason.to_string(),
            line,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownCommand { .. } => codes::vm::UNKNOWN_COMMAND,
            Self::MalformedCommand { .. } => codes::vm::MALFORMED_COMMAND,
            Self::InvalidSegment { .. } => codes::vm::INVALID_SEGMENT,
            Self::PopToConstant { .. } => codes::vm::POP_TO_CONSTANT,
            Self::SegmentIndexOutOfRange { .. } => codes::vm::SEGMENT_INDEX_OUT_OF_RANGE,
            Self::InvalidIndex { .. } => codes::vm::INVALID_INDEX,
            Self::TooManyCommands { .. } => codes::vm::TOO_MANY_COMMANDS,
            Self::NoVmFiles { .. } => codes::vm::NO_VM_FILES,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnknownCommand { line, .. }
            | Self::MalformedCommand { line, .. }
            | Self::InvalidSegment { line, .. }
            | Self::PopToConstant { line }
            | Self::SegmentIndexOutOfRange { line, .. }
            | Self::InvalidIndex { line, .. } => Some(*line),
            Self::TooManyCommands { .. } | Self::NoVmFiles { .. } => None,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}
