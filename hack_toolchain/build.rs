// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    symbols: SymbolLimits,
    assembler: AssemblerLimits,
    vm: VmLimits,
    batch_processing: BatchProcessingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    large_file_threshold: u64,
    max_line_count_for_analysis: usize,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_string_size: usize,
    max_identifier_length: usize,
    max_comment_length: usize,
    max_token_count: usize,
    max_integer_value: u32,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_parse_depth: usize,
}

#[derive(serde::Deserialize)]
struct SymbolLimits {
    max_symbols_per_scope: usize,
    max_subroutines_per_class: usize,
}

#[derive(serde::Deserialize)]
struct AssemblerLimits {
    variable_base_address: u16,
    max_address: u16,
    max_rom_size: usize,
}

#[derive(serde::Deserialize)]
struct VmLimits {
    stack_base_address: u16,
    temp_base_address: u16,
    temp_segment_size: u16,
    max_commands_per_file: usize,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_files_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=HACK_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=HACK_CONFIG_DIR");

    let profile = env::var("HACK_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("HACK_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the crate directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);

    println!(
        "cargo:warning=Generated constants from {}",
        config_path.display()
    );
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const HACK_ADDRESS_LIMIT: u16 = 32767;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("LIMITS: max_file_size exceeds absolute maximum");
    }

    // Integer constants must fit the 15-bit A-instruction payload
    if config.lexical.max_integer_value > HACK_ADDRESS_LIMIT as u32 {
        panic!("LIMITS: max_integer_value cannot exceed {}", HACK_ADDRESS_LIMIT);
    }

    if config.assembler.max_address > HACK_ADDRESS_LIMIT {
        panic!("LIMITS: max_address cannot exceed {}", HACK_ADDRESS_LIMIT);
    }

    if config.assembler.max_rom_size > HACK_ADDRESS_LIMIT as usize + 1 {
        panic!("LIMITS: max_rom_size cannot exceed {}", HACK_ADDRESS_LIMIT as usize + 1);
    }

    if config.assembler.variable_base_address < 16 {
        panic!("LIMITS: variable_base_address overlaps the R0-R15 registers");
    }

    if config.vm.temp_base_address + config.vm.temp_segment_size > 13 {
        panic!("LIMITS: temp segment overlaps the R13-R15 scratch registers");
    }

    if config.vm.stack_base_address < config.assembler.variable_base_address {
        panic!("LIMITS: stack_base_address overlaps the static variable area");
    }

    if config.syntax.max_parse_depth == 0 {
        panic!("LIMITS: max_parse_depth cannot be zero");
    }

    if config.batch_processing.max_worker_threads == 0 {
        panic!("LIMITS: max_worker_threads cannot be zero");
    }

    if profile == "production" && config.file_processing.max_file_size > 50_000_000 {
        panic!("PRODUCTION: max_file_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const LARGE_FILE_THRESHOLD: u64 = {};
        pub const MAX_LINE_COUNT_FOR_ANALYSIS: usize = {};
    }}

    pub mod lexical {{
        pub const MAX_STRING_SIZE: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const MAX_COMMENT_LENGTH: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
        pub const MAX_INTEGER_VALUE: u32 = {};
    }}

    pub mod syntax {{
        pub const MAX_PARSE_DEPTH: usize = {};
    }}

    pub mod symbols {{
        pub const MAX_SYMBOLS_PER_SCOPE: usize = {};
        pub const MAX_SUBROUTINES_PER_CLASS: usize = {};
    }}

    pub mod assembler {{
        pub const VARIABLE_BASE_ADDRESS: u16 = {};
        pub const MAX_ADDRESS: u16 = {};
        pub const MAX_ROM_SIZE: usize = {};
    }}

    pub mod vm {{
        pub const STACK_BASE_ADDRESS: u16 = {};
        pub const TEMP_BASE_ADDRESS: u16 = {};
        pub const TEMP_SEGMENT_SIZE: u16 = {};
        pub const MAX_COMMANDS_PER_FILE: usize = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_FILES_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
    }}
}}
"#,
        profile,
        // File Processing
        config.file_processing.max_file_size,
        config.file_processing.large_file_threshold,
        config.file_processing.max_line_count_for_analysis,
        // Lexical
        config.lexical.max_string_size,
        config.lexical.max_identifier_length,
        config.lexical.max_comment_length,
        config.lexical.max_token_count,
        config.lexical.max_integer_value,
        // Syntax
        config.syntax.max_parse_depth,
        // Symbols
        config.symbols.max_symbols_per_scope,
        config.symbols.max_subroutines_per_class,
        // Assembler
        config.assembler.variable_base_address,
        config.assembler.max_address,
        config.assembler.max_rom_size,
        // VM
        config.vm.stack_base_address,
        config.vm.temp_base_address,
        config.vm.temp_segment_size,
        config.vm.max_commands_per_file,
        // Batch Processing
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_files_per_batch,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_file,
    );

    fs::write(output_path, constants_code).unwrap();
}
