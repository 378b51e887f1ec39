//! End-to-end processing of a single input path
//!
//! `.jack` files are parsed into trees, `.asm` files assembled to `.hack`,
//! and `.vm` files or directories of them translated to `.asm`.

mod error;
mod result;

pub use error::PipelineError;
pub use result::{PipelineResult, PipelineSummary};

use crate::config::RuntimeConfig;
use crate::file_processor::{FileProcessingResult, FileProcessor};
use crate::logging::{self, codes};
use crate::vm_translator::VmError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const JACK_EXTENSION: &str = "jack";
pub const ASM_EXTENSION: &str = "asm";
pub const VM_EXTENSION: &str = "vm";
pub const HACK_EXTENSION: &str = "hack";

/// Run `f` under a file context, keeping one the caller already set
fn in_file_context<R>(path: &Path, f: impl FnOnce() -> R) -> R {
    if logging::get_current_file_context().is_some() {
        f()
    } else {
        logging::with_file_context(path.to_path_buf(), 0, f)
    }
}

fn load(path: &Path, extension: &str, config: &RuntimeConfig) -> Result<FileProcessingResult, PipelineError> {
    let result = FileProcessor::from_preferences(&config.file_processor)
        .with_expected_extension(extension)
        .process_file(path)?;
    Ok(result)
}

fn write_output(path: &Path, contents: &str) -> Result<(), PipelineError> {
    fs::write(path, contents).map_err(|e| {
        let error = PipelineError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        crate::log_error!(error.error_code(), "Failed to write output",
            "path" => path.display(),
            "error" => e
        );
        error
    })?;

    crate::log_success!(codes::success::OUTPUT_WRITTEN, "Output written",
        "path" => path.display(),
        "bytes" => contents.len()
    );
    Ok(())
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Scan and parse a Jack class and write its tree. Symbol collection runs
/// afterwards and only feeds the summary.
pub fn parse_jack_file(
    path: &Path,
    output: Option<&Path>,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    in_file_context(path, || {
        crate::log_info!("Starting Jack parse pipeline", "file" => path.display());

        let file_result = load(path, JACK_EXTENSION, config)?;
        let tokens = crate::lexical::tokenize_file_result_with_preferences(
            &file_result,
            config.lexical.clone(),
        )?;
        let token_count = tokens.len();

        let tree = crate::syntax::parse_token_stream(tokens)?;
        let written = crate::tree::write_tree(&tree, path, output, &config.tree)?;

        let summary = match crate::symbols::collect_symbols(&tree) {
            Ok(symbols) => PipelineSummary::Parse {
                class_name: symbols.name.clone(),
                token_count,
                symbol_count: symbols.symbol_count(),
                subroutine_count: symbols.subroutines.len(),
                symbol_issue: None,
            },
            Err(error) => PipelineSummary::Parse {
                class_name: crate::syntax::class_name(&tree)
                    .unwrap_or_default()
                    .to_string(),
                token_count,
                symbol_count: 0,
                subroutine_count: 0,
                symbol_issue: Some(error.to_string()),
            },
        };

        let result = PipelineResult::new(
            path.to_path_buf(),
            written,
            summary,
            file_result.metadata.size,
            start_time.elapsed(),
        );
        result.log_success();
        Ok(result)
    })
}

/// Assemble a `.asm` file into `.hack` binary text
pub fn assemble_file(
    path: &Path,
    output: Option<&Path>,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    in_file_context(path, || {
        crate::log_info!("Starting assembly pipeline", "file" => path.display());

        let file_result = load(path, ASM_EXTENSION, config)?;
        let assembled = crate::assembler::assemble_source(&file_result.source)?;

        let target = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| path.with_extension(HACK_EXTENSION));
        write_output(&target, &assembled.to_hack())?;

        let result = PipelineResult::new(
            path.to_path_buf(),
            target,
            PipelineSummary::Assembly(assembled.stats),
            file_result.metadata.size,
            start_time.elapsed(),
        );
        result.log_success();
        Ok(result)
    })
}

/// `.vm` files in `dir`, sorted by name
pub fn discover_vm_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        PipelineError::pipeline_error(&format!("Cannot read directory {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| PipelineError::pipeline_error(&e.to_string()))?
            .path();
        if path.is_file() && has_extension(&path, VM_EXTENSION) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(VmError::NoVmFiles {
            path: dir.display().to_string(),
        }
        .into());
    }

    files.sort();
    Ok(files)
}

/// Translate a `.vm` file, or every `.vm` file in a directory, to one `.asm`.
/// Directories get the bootstrap prologue when enabled.
pub fn translate_vm_path(
    path: &Path,
    output: Option<&Path>,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    in_file_context(path, || {
        crate::log_info!("Starting VM translation pipeline", "path" => path.display());

        let is_directory = path.is_dir();
        let files = if is_directory {
            discover_vm_files(path)?
        } else {
            vec![path.to_path_buf()]
        };

        let mut modules = Vec::with_capacity(files.len());
        let mut input_bytes = 0;
        for file in &files {
            let loaded = load(file, VM_EXTENSION, config)?;
            input_bytes += loaded.metadata.size;
            modules.push((loaded.metadata.module_name(), loaded.source));
        }

        let bootstrap = is_directory && config.translator.write_bootstrap;
        let translated =
            crate::vm_translator::translate_modules(&modules, bootstrap, &config.translator)?;

        let target = match output {
            Some(output) => output.to_path_buf(),
            None if is_directory => default_directory_output(path)?,
            None => path.with_extension(ASM_EXTENSION),
        };
        write_output(&target, &translated.assembly)?;

        let result = PipelineResult::new(
            path.to_path_buf(),
            target,
            PipelineSummary::Translation(translated.stats),
            input_bytes,
            start_time.elapsed(),
        );
        result.log_success();
        Ok(result)
    })
}

/// `Dir/` translates to `Dir/Dir.asm`
fn default_directory_output(dir: &Path) -> Result<PathBuf, PipelineError> {
    let name = dir
        .canonicalize()
        .ok()
        .and_then(|full| full.file_name().map(|name| name.to_owned()))
        .ok_or_else(|| {
            PipelineError::pipeline_error(&format!("Cannot name output for {}", dir.display()))
        })?;
    Ok(dir.join(name).with_extension(ASM_EXTENSION))
}

/// Dispatch on the input: `.jack`, `.asm`, `.vm` or a directory of `.vm` files
pub fn process_path(
    path: &Path,
    output: Option<&Path>,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    if path.is_dir() {
        return translate_vm_path(path, output, config);
    }

    if has_extension(path, JACK_EXTENSION) {
        parse_jack_file(path, output, config)
    } else if has_extension(path, ASM_EXTENSION) {
        assemble_file(path, output, config)
    } else if has_extension(path, VM_EXTENSION) {
        translate_vm_path(path, output, config)
    } else {
        let error = PipelineError::pipeline_error(&format!(
            "Unsupported input {} (expected .jack, .asm, .vm or a directory)",
            path.display()
        ));
        crate::log_error!(error.error_code(), "Unsupported input", "path" => path.display());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeFormat;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn config() -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.tree.format = TreeFormat::Xml;
        config.translator.write_bootstrap = true;
        config.translator.annotate_commands = false;
        config
    }

    #[test]
    fn test_parse_jack_file_writes_tree() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("Main.jack");
        fs::write(
            &source,
            "class Main { field int x; method int get() { return x; } }",
        )
        .unwrap();

        let result = parse_jack_file(&source, None, &config()).unwrap();
        assert_eq!(result.output, source.with_extension("xml"));
        assert_matches!(
            result.summary,
            PipelineSummary::Parse { ref class_name, symbol_count: 2, subroutine_count: 1, .. }
                if class_name == "Main"
        );
        let xml = fs::read_to_string(&result.output).unwrap();
        assert!(xml.starts_with("<class>"));
    }

    #[test]
    fn test_duplicate_symbol_still_writes_tree() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("A.jack");
        fs::write(
            &source,
            "class A { field int x; field int x; function void f() { return; } }",
        )
        .unwrap();

        let result = parse_jack_file(&source, None, &config()).unwrap();
        assert!(result.output.exists());
        assert_matches!(
            result.summary,
            PipelineSummary::Parse { ref class_name, symbol_issue: Some(ref issue), .. }
                if class_name == "A" && issue.contains('x')
        );
        assert!(result.describe().contains("symbols skipped"));
        assert!(fs::read_to_string(&result.output)
            .unwrap()
            .contains("<identifier> x </identifier>"));
    }

    #[test]
    fn test_parse_jack_file_reports_syntax_errors() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("Broken.jack");
        fs::write(&source, "class Broken { function void f( { } }").unwrap();

        let error = parse_jack_file(&source, None, &config()).unwrap_err();
        assert_matches!(error, PipelineError::SyntaxAnalysis(_));
        assert_eq!(error.stage(), "syntax analysis");
        assert!(!source.with_extension("xml").exists());
    }

    #[test]
    fn test_assemble_file_to_explicit_output() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("Add.asm");
        let target = dir.path().join("out.hack");
        fs::write(&source, "@2\nD=A\n@3\nD=D+A\n@0\nM=D\n").unwrap();

        let result = assemble_file(&source, Some(&target), &config()).unwrap();
        assert_eq!(result.output, target);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "0000000000000010\n1110110000010000\n0000000000000011\n\
             1110000010010000\n0000000000000000\n1110001100001000\n"
        );
    }

    #[test]
    fn test_translate_directory_with_bootstrap() {
        let dir = TempDir::new().unwrap();
        let program = dir.path().join("Program");
        fs::create_dir(&program).unwrap();
        fs::write(program.join("Sys.vm"), "function Sys.init 0\nlabel END\ngoto END\n").unwrap();
        fs::write(program.join("Main.vm"), "function Main.main 0\npush constant 1\nreturn\n").unwrap();
        fs::write(program.join("notes.txt"), "ignored").unwrap();

        let result = process_path(&program, None, &config()).unwrap();
        assert_eq!(result.output, program.join("Program.asm"));
        assert_matches!(
            result.summary,
            PipelineSummary::Translation(ref stats) if stats.modules == 2 && stats.bootstrap
        );

        let asm = fs::read_to_string(&result.output).unwrap();
        assert!(asm.starts_with("@256\nD=A\n@SP\nM=D\n"));
        assert!(asm.find("(Main.main)").unwrap() < asm.find("(Sys.init)").unwrap());
    }

    #[test]
    fn test_single_vm_file_has_no_bootstrap() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("Simple.vm");
        fs::write(&source, "push constant 1\npush static 0\nadd\n").unwrap();

        let result = translate_vm_path(&source, None, &config()).unwrap();
        let asm = fs::read_to_string(source.with_extension("asm")).unwrap();
        assert!(asm.starts_with("@1\nD=A\n"));
        assert!(asm.contains("@Simple.0\n"));
        assert_matches!(result.summary, PipelineSummary::Translation(ref stats) if !stats.bootstrap);
    }

    #[test]
    fn test_directory_without_vm_files() {
        let dir = TempDir::new().unwrap();
        assert_matches!(
            translate_vm_path(dir.path(), None, &config()),
            Err(PipelineError::Translation(VmError::NoVmFiles { .. }))
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("notes.txt");
        fs::write(&source, "hello").unwrap();
        assert_matches!(
            process_path(&source, None, &config()),
            Err(PipelineError::Pipeline { .. })
        );
    }
}
