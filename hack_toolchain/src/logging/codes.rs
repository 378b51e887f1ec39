//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes and their metadata.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E025");
    pub const COMMENT_TOO_LONG: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

/// Syntax analysis error codes
pub mod syntax {
    use super::Code;

    pub const EMPTY_INPUT: Code = Code::new("E040");
    pub const INCOMPLETE_RULE: Code = Code::new("E041");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E042");
    pub const TRAILING_INPUT: Code = Code::new("E043");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E044");
    pub const LEXICAL_FAILURE: Code = Code::new("E045");
    pub const MISPLACED_RULE: Code = Code::new("E046");
}

/// Symbol table error codes
pub mod symbols {
    use super::Code;

    pub const DUPLICATE_SYMBOL: Code = Code::new("E060");
    pub const TOO_MANY_SYMBOLS: Code = Code::new("E061");
    pub const MALFORMED_DECLARATION: Code = Code::new("E062");
}

/// Assembler error codes
pub mod assembler {
    use super::Code;

    pub const INVALID_COMP: Code = Code::new("E080");
    pub const INVALID_DEST: Code = Code::new("E081");
    pub const INVALID_JUMP: Code = Code::new("E082");
    pub const CONSTANT_OUT_OF_RANGE: Code = Code::new("E083");
    pub const DUPLICATE_LABEL: Code = Code::new("E084");
    pub const MALFORMED_LABEL: Code = Code::new("E085");
    pub const ROM_OVERFLOW: Code = Code::new("E086");
    pub const RAM_EXHAUSTED: Code = Code::new("E087");
    pub const INVALID_SYMBOL: Code = Code::new("E088");
}

/// VM translator error codes
pub mod vm {
    use super::Code;

    pub const UNKNOWN_COMMAND: Code = Code::new("E100");
    pub const MALFORMED_COMMAND: Code = Code::new("E101");
    pub const INVALID_SEGMENT: Code = Code::new("E102");
    pub const POP_TO_CONSTANT: Code = Code::new("E103");
    pub const SEGMENT_INDEX_OUT_OF_RANGE: Code = Code::new("E104");
    pub const INVALID_INDEX: Code = Code::new("E105");
    pub const TOO_MANY_COMMANDS: Code = Code::new("E106");
    pub const NO_VM_FILES: Code = Code::new("E107");
}

/// Output serialization error codes
pub mod output {
    use super::Code;

    pub const SERIALIZATION_FAILED: Code = Code::new("E120");
    pub const WRITE_FAILED: Code = Code::new("E121");
}

// ============================================================================
// SUCCESS CODES
// ============================================================================

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I002");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I003");
    pub const PARSE_COMPLETE: Code = Code::new("I004");
    pub const SYMBOL_COLLECTION_COMPLETE: Code = Code::new("I005");
    pub const ASSEMBLY_COMPLETE: Code = Code::new("I006");
    pub const TRANSLATION_COMPLETE: Code = Code::new("I007");
    pub const OUTPUT_WRITTEN: Code = Code::new("I008");
    pub const BATCH_COMPLETE: Code = Code::new("I009");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        use Severity::*;

        let entries = [
            // System
            ErrorMetadata::new("ERR001", "System", Critical, false, true,
                "Critical internal error",
                "File a bug report with the input that triggered it"),
            ErrorMetadata::new("ERR002", "System", Critical, false, true,
                "Initialization failure",
                "Check logging configuration and environment variables"),
            ErrorMetadata::new("ERR003", "System", High, false, true,
                "Invalid runtime configuration",
                "Fix the runtime configuration file or HACK_* variables"),
            // File processing
            ErrorMetadata::new("E005", "FileProcessing", High, false, true,
                "Input file not found",
                "Verify the file path"),
            ErrorMetadata::new("E006", "FileProcessing", Medium, true, false,
                "Unexpected file extension",
                "Use .jack, .vm or .asm inputs"),
            ErrorMetadata::new("E007", "FileProcessing", High, false, true,
                "File exceeds the configured size limit",
                "Split the input or raise max_file_size in the build profile"),
            ErrorMetadata::new("E008", "FileProcessing", Medium, false, true,
                "Input file is empty",
                "Provide a non-empty source file"),
            ErrorMetadata::new("E009", "FileProcessing", High, false, true,
                "Permission denied",
                "Check file permissions"),
            ErrorMetadata::new("E010", "FileProcessing", High, false, true,
                "File is not valid UTF-8",
                "Re-encode the file as UTF-8"),
            ErrorMetadata::new("E011", "FileProcessing", High, false, true,
                "I/O error",
                "Check the file system and retry"),
            ErrorMetadata::new("E012", "FileProcessing", High, false, true,
                "Invalid path",
                "Pass a path to an existing file or directory"),
            ErrorMetadata::new("E013", "FileProcessing", High, false, true,
                "File exceeds the configured line limit",
                "Split the input or raise max_line_count_for_analysis"),
            // Lexical
            ErrorMetadata::new("E020", "Lexical", High, false, true,
                "Invalid character in source",
                "Remove the character or move it into a string or comment"),
            ErrorMetadata::new("E021", "Lexical", High, false, true,
                "Unterminated string constant",
                "Close the string with a double quote on the same line"),
            ErrorMetadata::new("E022", "Lexical", High, false, true,
                "Integer constant out of range",
                "Integer constants must be between 0 and 32767"),
            ErrorMetadata::new("E023", "Lexical", Medium, false, true,
                "Identifier too long",
                "Shorten the identifier"),
            ErrorMetadata::new("E024", "Lexical", Medium, false, true,
                "String constant too large",
                "Shorten the string constant"),
            ErrorMetadata::new("E025", "Lexical", High, false, true,
                "Unterminated block comment",
                "Close the comment with */"),
            ErrorMetadata::new("E026", "Lexical", Medium, false, true,
                "Comment too long",
                "Shorten the comment"),
            ErrorMetadata::new("E027", "Lexical", High, false, true,
                "Token limit exceeded",
                "Split the class into smaller files"),
            // Syntax
            ErrorMetadata::new("E040", "Syntax", Medium, false, true,
                "No tokens to parse",
                "Provide a class declaration"),
            ErrorMetadata::new("E041", "Syntax", High, false, true,
                "Grammar rule ended before its required parts",
                "Complete the construct reported at the given location"),
            ErrorMetadata::new("E042", "Syntax", High, false, true,
                "Unexpected token",
                "Check the syntax at the given location"),
            ErrorMetadata::new("E043", "Syntax", High, false, true,
                "Input continues after the class declaration",
                "Each file holds exactly one class"),
            ErrorMetadata::new("E044", "Syntax", Critical, false, true,
                "Maximum nesting depth exceeded",
                "Reduce expression or statement nesting"),
            ErrorMetadata::new("E045", "Syntax", High, false, true,
                "Tokenization failed during parsing",
                "Fix the lexical error reported at the given location"),
            ErrorMetadata::new("E046", "Syntax", High, false, true,
                "Construct is not allowed at this position",
                "Move the declaration or statement to where the grammar expects it"),
            // Symbols
            ErrorMetadata::new("E060", "Symbols", High, false, true,
                "Symbol declared twice in the same scope",
                "Rename or remove one declaration"),
            ErrorMetadata::new("E061", "Symbols", High, false, true,
                "Scope exceeds the configured symbol limit",
                "Reduce the number of declarations"),
            ErrorMetadata::new("E062", "Symbols", High, false, true,
                "Declaration node is missing its type or name",
                "Re-parse the class; the tree is malformed"),
            // Assembler
            ErrorMetadata::new("E080", "Assembler", High, false, true,
                "Unknown computation mnemonic",
                "Use one of the 28 Hack computations"),
            ErrorMetadata::new("E081", "Assembler", High, false, true,
                "Unknown destination mnemonic",
                "Use a combination of A, M and D in AMD order"),
            ErrorMetadata::new("E082", "Assembler", High, false, true,
                "Unknown jump mnemonic",
                "Use JGT, JEQ, JGE, JLT, JNE, JLE or JMP"),
            ErrorMetadata::new("E083", "Assembler", High, false, true,
                "Constant does not fit in 15 bits",
                "A-instruction constants must be between 0 and 32767"),
            ErrorMetadata::new("E084", "Assembler", High, false, true,
                "Label defined twice",
                "Rename one of the labels"),
            ErrorMetadata::new("E085", "Assembler", High, false, true,
                "Malformed label declaration",
                "Labels are written as (NAME) on their own line"),
            ErrorMetadata::new("E086", "Assembler", Critical, false, true,
                "Program does not fit in ROM",
                "Reduce program size"),
            ErrorMetadata::new("E087", "Assembler", Critical, false, true,
                "No free RAM for new variables",
                "Reduce the number of variables"),
            ErrorMetadata::new("E088", "Assembler", High, false, true,
                "Invalid symbol name",
                "Symbols may not start with a digit"),
            // VM
            ErrorMetadata::new("E100", "VmTranslator", High, false, true,
                "Unknown VM command",
                "Check the command spelling"),
            ErrorMetadata::new("E101", "VmTranslator", High, false, true,
                "Wrong number of arguments for VM command",
                "Check the command arguments"),
            ErrorMetadata::new("E102", "VmTranslator", High, false, true,
                "Unknown memory segment",
                "Use local, argument, this, that, constant, static, temp or pointer"),
            ErrorMetadata::new("E103", "VmTranslator", High, false, true,
                "Cannot pop into the constant segment",
                "Pop into a writable segment"),
            ErrorMetadata::new("E104", "VmTranslator", High, false, true,
                "Segment index out of range",
                "pointer takes 0 or 1, temp takes 0 to 7"),
            ErrorMetadata::new("E105", "VmTranslator", High, false, true,
                "Invalid numeric argument",
                "Indices and counts must be non-negative integers"),
            ErrorMetadata::new("E106", "VmTranslator", High, false, true,
                "Too many VM commands in one file",
                "Split the file"),
            ErrorMetadata::new("E107", "VmTranslator", Medium, false, true,
                "Directory contains no .vm files",
                "Point the translator at a directory with .vm files"),
            // Output
            ErrorMetadata::new("E120", "Output", High, false, true,
                "Failed to serialize output",
                "File a bug report"),
            ErrorMetadata::new("E121", "Output", High, false, true,
                "Failed to write output file",
                "Check that the output directory is writable"),
        ];

        entries.into_iter().map(|meta| (meta.code, meta)).collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get complete error metadata
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|meta| meta.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|meta| meta.recoverable)
        .unwrap_or(false)
}

/// Check if error requires halting processing
pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|meta| meta.requires_halt)
        .unwrap_or(false)
}

/// Get error description
pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|meta| meta.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action
pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|meta| meta.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category
pub fn get_category(code: &str) -> &'static str {
    match get_error_metadata(code) {
        Some(meta) => meta.category,
        None if code.starts_with('I') => "Success",
        None if code.starts_with('W') => "Warning",
        None if code.starts_with('D') => "Debug",
        None => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_code_is_registered() {
        let all = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            system::CONFIGURATION_ERROR,
            file_processing::FILE_NOT_FOUND,
            file_processing::TOO_MANY_LINES,
            lexical::INVALID_CHARACTER,
            lexical::TOO_MANY_TOKENS,
            syntax::EMPTY_INPUT,
            syntax::LEXICAL_FAILURE,
            symbols::DUPLICATE_SYMBOL,
            symbols::MALFORMED_DECLARATION,
            assembler::INVALID_COMP,
            assembler::INVALID_SYMBOL,
            vm::UNKNOWN_COMMAND,
            vm::NO_VM_FILES,
            output::SERIALIZATION_FAILED,
            output::WRITE_FAILED,
        ];

        for code in all {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E080"), "Assembler");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("E041"));
        assert!(is_recoverable("E006"));
        assert_eq!(get_category("I004"), "Success");
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_action("E999"), "No specific action available");
    }
}
