use crate::assembler::AssemblyStats;
use crate::vm_translator::TranslationStats;
use std::path::PathBuf;
use std::time::Duration;

/// What the pipeline produced, per input kind
#[derive(Debug, Clone)]
pub enum PipelineSummary {
    Parse {
        class_name: String,
        token_count: usize,
        symbol_count: usize,
        subroutine_count: usize,
        /// Why symbols could not be collected, if they could not
        symbol_issue: Option<String>,
    },
    Assembly(AssemblyStats),
    Translation(TranslationStats),
}

/// Result of running one input through its pipeline
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub summary: PipelineSummary,
    pub input_bytes: u64,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn new(
        input: PathBuf,
        output: PathBuf,
        summary: PipelineSummary,
        input_bytes: u64,
        processing_duration: Duration,
    ) -> Self {
        Self {
            input,
            output,
            summary,
            input_bytes,
            processing_duration,
        }
    }

    /// One-line human summary of the produced artifact
    pub fn describe(&self) -> String {
        match &self.summary {
            PipelineSummary::Parse {
                class_name,
                token_count,
                symbol_count,
                symbol_issue: None,
                ..
            } => format!(
                "class {}: {} tokens, {} symbols",
                class_name, token_count, symbol_count
            ),
            PipelineSummary::Parse {
                class_name,
                token_count,
                symbol_issue: Some(issue),
                ..
            } => format!(
                "class {}: {} tokens, symbols skipped ({})",
                class_name, token_count, issue
            ),
            PipelineSummary::Assembly(stats) => format!(
                "{} instructions, {} labels, {} variables",
                stats.instructions, stats.labels, stats.variables
            ),
            PipelineSummary::Translation(stats) => format!(
                "{} modules, {} commands, {} functions",
                stats.modules, stats.commands, stats.functions
            ),
        }
    }

    pub fn log_success(&self) {
        let seconds = self.processing_duration.as_secs_f64();
        crate::log_success!(
            crate::logging::codes::success::FILE_PROCESSING_SUCCESS,
            "Pipeline completed",
            "input" => self.input.display(),
            "output" => self.output.display(),
            "summary" => self.describe(),
            "duration_ms" => format!("{:.2}", seconds * 1000.0),
            "bytes_per_sec" => format!("{:.0}", if seconds > 0.0 { self.input_bytes as f64 / seconds } else { 0.0 })
        );
    }
}
