use hack_toolchain::config::{RuntimeConfig, TreeFormat};
use hack_toolchain::{batch, logging, pipeline};
use std::env;
use std::path::{Path, PathBuf};

/// Parsed command line
#[derive(Debug, Default)]
struct CliOptions {
    input: PathBuf,
    output: Option<PathBuf>,
    format: Option<TreeFormat>,
    config_file: Option<PathBuf>,
    threads: Option<usize>,
    recursive: bool,
    fail_fast: bool,
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("hack");

    if args.len() < 2 {
        eprintln!("Usage: {} <input.jack|input.asm|input.vm|directory> [options]", program_name);
        eprintln!("       {} --help", program_name);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(program_name);
        return Ok(());
    }

    let options = match parse_options(&args[1], &args[2..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(2);
        }
    };

    let mut config = match &options.config_file {
        Some(path) => RuntimeConfig::from_toml_file(path)?,
        None => RuntimeConfig::default(),
    };
    if let Some(format) = options.format {
        config.tree.format = format;
    }

    logging::config::init_runtime_preferences(config.logging.clone())?;
    logging::init_global_logging()?;

    let input = options.input.as_path();
    if input.is_dir() && batch::contains_jack_files(input) {
        process_directory_batch(input, &options, config)
    } else if input.exists() {
        process_single_input(input, options.output.as_deref(), &config)
    } else {
        eprintln!("Error: Input not found: {}", input.display());
        std::process::exit(1);
    }
}

fn print_help(program_name: &str) {
    println!("Hack toolchain v{}", env!("CARGO_PKG_VERSION"));
    println!("Jack parser, VM translator and Hack assembler");
    println!();
    println!("USAGE:");
    println!("    {} <file.jack>        # Parse to a .xml or .json tree", program_name);
    println!("    {} <file.asm>         # Assemble to .hack", program_name);
    println!("    {} <file.vm>          # Translate to .asm", program_name);
    println!("    {} <directory>        # .vm files: translate to one .asm", program_name);
    println!("                               # .jack files: parse each in a batch");
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --output PATH       Write output to PATH (single inputs only)");
    println!("    --format xml|json   Parse tree format (default: xml)");
    println!("    --config FILE       Load runtime preferences from a TOML file");
    println!("    --threads N         Worker threads for Jack batches");
    println!("    --sequential        Process Jack batches on one thread");
    println!("    --recursive         Search subdirectories for .jack files");
    println!("    --fail-fast         Stop a batch on the first failure");
    println!("    --quiet             Suppress batch progress lines");
    println!();
    println!("ENVIRONMENT:");
    println!("    HACK_TREE_FORMAT, HACK_TREE_INDENT, HACK_VM_BOOTSTRAP, HACK_VM_ANNOTATE,");
    println!("    HACK_LOGGING_MIN_LEVEL, HACK_LOGGING_USE_STRUCTURED");
    println!();
    println!("BUILD:");
    println!("    {}", hack_toolchain::config::build_info::source_info());
}

fn parse_options(input: &str, args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        input: PathBuf::from(input),
        ..CliOptions::default()
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--output" | "-o" => {
                let value = iter.next().ok_or("--output requires a path")?;
                options.output = Some(PathBuf::from(value));
            }
            "--format" => {
                let value = iter.next().ok_or("--format requires xml or json")?;
                options.format = Some(
                    TreeFormat::parse(value)
                        .ok_or_else(|| format!("Unknown tree format '{}'", value))?,
                );
            }
            "--config" => {
                let value = iter.next().ok_or("--config requires a file")?;
                options.config_file = Some(PathBuf::from(value));
            }
            "--threads" => {
                let value = iter.next().ok_or("--threads requires a number")?;
                let threads = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid thread count '{}'", value))?;
                options.threads = Some(threads);
            }
            "--sequential" => options.threads = Some(1),
            "--recursive" => options.recursive = true,
            "--fail-fast" => options.fail_fast = true,
            "--quiet" => options.quiet = true,
            other => {
                eprintln!("Warning: Unknown option '{}'", other);
            }
        }
    }

    Ok(options)
}

fn process_single_input(
    input: &Path,
    output: Option<&Path>,
    config: &RuntimeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Processing: {}", input.display());

    match pipeline::process_path(input, output, config) {
        Ok(result) => {
            println!("Wrote {} ({})", result.output.display(), result.describe());
            logging::print_cargo_style_summary();
        }
        Err(error) => {
            eprintln!("\nFAILED during {}: {}", error.stage(), error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn process_directory_batch(
    dir_path: &Path,
    options: &CliOptions,
    runtime: RuntimeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if options.output.is_some() {
        eprintln!("Warning: --output is ignored for Jack directories");
    }

    let mut config = batch::BatchConfig {
        recursive: options.recursive,
        fail_fast: options.fail_fast,
        progress_reporting: !options.quiet,
        runtime,
        ..batch::BatchConfig::default()
    };
    if let Some(threads) = options.threads {
        config = config.with_threads(threads);
    }

    println!("Starting batch processing: {}", dir_path.display());
    println!(
        "Configuration: {} threads, recursive={}, fail_fast={}",
        config.max_threads, config.recursive, config.fail_fast
    );

    match batch::process_directory_with_config(dir_path, &config) {
        Ok(results) => {
            print_batch_results(&results);
            logging::print_cargo_style_summary();

            if results.failure_count() > 0 {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("Batch processing failed: {}", error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_batch_results(results: &batch::BatchResults) {
    println!("\n{}", results.summary());
    println!("  Files discovered: {}", results.files_discovered);

    if results.failure_count() > 0 {
        println!("\nFailed Files:");
        for (file_path, error) in &results.failed_files {
            println!("  {}: {} error", file_path.display(), error.stage());
        }
    }

    if results.success_count() > 0 && results.success_count() <= 10 {
        println!("\nSuccessful Files:");
        for (file_path, result) in &results.successful_files {
            println!("  {}: {}", file_path.display(), result.describe());
        }
    } else if results.success_count() > 10 {
        println!("\n{} files parsed successfully", results.success_count());
    }
}
