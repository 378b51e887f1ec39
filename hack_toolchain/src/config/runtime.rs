// RUNTIME PREFERENCES (User Experience)

use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Reject files whose extension does not match the requested stage
    pub require_matching_extension: bool,

    /// Whether to enable detailed performance logging
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_matching_extension: env_flag(env_vars::REQUIRE_MATCHING_EXTENSION, true),
            enable_performance_logging: env_flag(env_vars::ENABLE_PERFORMANCE_LOGGING, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether to collect per-category token counts
    pub collect_detailed_metrics: bool,

    /// Whether to log string length statistics
    pub log_string_statistics: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_flag(env_vars::LEXICAL_DETAILED_METRICS, true),
            log_string_statistics: env_flag(env_vars::LEXICAL_LOG_STRING_STATS, false),
        }
    }
}

/// Serialization target for parse trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeFormat {
    Xml,
    Json,
}

impl TreeFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TreeFormat::Xml => "xml",
            TreeFormat::Json => "json",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "xml" => Some(TreeFormat::Xml),
            "json" => Some(TreeFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOutputPreferences {
    pub format: TreeFormat,

    /// Spaces per nesting level in XML output
    pub indent_width: usize,

    /// Pretty-print JSON output
    pub pretty_json: bool,
}

impl Default for TreeOutputPreferences {
    fn default() -> Self {
        Self {
            format: env::var(env_vars::TREE_FORMAT)
                .ok()
                .and_then(|v| TreeFormat::parse(&v))
                .unwrap_or(TreeFormat::Xml),
            indent_width: env::var(env_vars::TREE_INDENT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            pretty_json: env_flag(env_vars::TREE_PRETTY_JSON, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorPreferences {
    /// Emit the SP=256 / call Sys.init prologue when translating a directory
    pub write_bootstrap: bool,

    /// Prefix every translated command with a `// <command>` line
    pub annotate_commands: bool,
}

impl Default for TranslatorPreferences {
    fn default() -> Self {
        Self {
            write_bootstrap: env_flag(env_vars::VM_BOOTSTRAP, true),
            annotate_commands: env_flag(env_vars::VM_ANNOTATE, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Emit JSON lines instead of plain text
    pub use_structured_logging: bool,

    /// Whether console output is enabled at all
    pub enable_console_logging: bool,

    pub min_log_level: LogLevel,

    /// Print the cargo-style summary after processing
    pub cargo_style_summary: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
            cargo_style_summary: env_flag(env_vars::LOGGING_CARGO_STYLE, true),
        }
    }
}

pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Errors loading a runtime configuration file
#[derive(Debug, thiserror::Error)]
pub enum RuntimeConfigError {
    #[error("Failed to read runtime config {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid runtime config {path}: {message}")]
    Parse { path: String, message: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub tree: TreeOutputPreferences,
    pub translator: TranslatorPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse preferences from TOML text. Missing sections fall back to the
    /// environment-derived defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, RuntimeConfigError> {
        let content = fs::read_to_string(path).map_err(|e| RuntimeConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_toml_str(&content).map_err(|e| RuntimeConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_MATCHING_EXTENSION: &str = "HACK_REQUIRE_MATCHING_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "HACK_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "HACK_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_LOG_STRING_STATS: &str = "HACK_LEXICAL_LOG_STRING_STATS";

    // Tree output
    pub const TREE_FORMAT: &str = "HACK_TREE_FORMAT";
    pub const TREE_INDENT: &str = "HACK_TREE_INDENT";
    pub const TREE_PRETTY_JSON: &str = "HACK_TREE_PRETTY_JSON";

    // VM translator
    pub const VM_BOOTSTRAP: &str = "HACK_VM_BOOTSTRAP";
    pub const VM_ANNOTATE: &str = "HACK_VM_ANNOTATE";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "HACK_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "HACK_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "HACK_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "HACK_LOGGING_CARGO_STYLE";
}
