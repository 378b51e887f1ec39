//! Two-pass Hack assembler
//!
//! The first pass binds `(LABEL)` declarations to ROM addresses, the second
//! encodes A- and C-instructions as 16-character binary words.

pub mod error;
pub mod symbol_table;
pub mod tables;

pub use error::{AssemblerError, AssemblerResult};
pub use symbol_table::AsmSymbolTable;

use crate::config::compile_time::assembler::{MAX_ADDRESS, MAX_ROM_SIZE};
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use serde::Serialize;

/// One significant source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction<'a> {
    Label(&'a str),
    Address(&'a str),
    Compute {
        dest: &'a str,
        comp: &'a str,
        jump: &'a str,
    },
}

impl<'a> Instruction<'a> {
    /// Parse a line with comments and whitespace already removed
    pub fn parse(text: &'a str, line: usize) -> AssemblerResult<Self> {
        if let Some(rest) = text.strip_prefix('(') {
            let label = rest
                .strip_suffix(')')
                .filter(|label| is_symbol(label))
                .ok_or_else(|| AssemblerError::MalformedLabel {
                    text: text.to_string(),
                    line,
                })?;
            return Ok(Instruction::Label(label));
        }

        if let Some(value) = text.strip_prefix('@') {
            if value.is_empty() {
                return Err(AssemblerError::InvalidSymbol {
                    symbol: text.to_string(),
                    line,
                });
            }
            return Ok(Instruction::Address(value));
        }

        let (assignment, jump) = text.split_once(';').unwrap_or((text, ""));
        let (dest, comp) = assignment.split_once('=').unwrap_or(("", assignment));
        Ok(Instruction::Compute { dest, comp, jump })
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Instruction::Label(_))
    }
}

/// Labels and variables: letters, digits, `_ . $ :`, not starting with a digit
fn is_symbol(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if !first.is_ascii_digit() => {}
        _ => return false,
    }
    text.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':'))
}

/// Strip a trailing `//` comment and surrounding whitespace
fn significant(line: &str) -> &str {
    line.split("//").next().unwrap_or("").trim()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyStats {
    pub instructions: usize,
    pub labels: usize,
    pub variables: usize,
}

#[derive(Debug, Clone)]
pub struct AssemblyOutput {
    /// One 16-bit binary word per instruction
    pub words: Vec<String>,
    pub stats: AssemblyStats,
}

impl AssemblyOutput {
    /// `.hack` file contents
    pub fn to_hack(&self) -> String {
        let mut out = String::with_capacity(self.words.len() * 17);
        for word in &self.words {
            out.push_str(word);
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Default)]
pub struct Assembler {
    symbols: AsmSymbolTable,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbols(&self) -> &AsmSymbolTable {
        &self.symbols
    }

    pub fn assemble(&mut self, source: &str) -> AssemblerResult<AssemblyOutput> {
        let mut program = Vec::new();
        for (index, raw) in source.lines().enumerate() {
            let text = significant(raw);
            if !text.is_empty() {
                program.push((index + 1, Instruction::parse(text, index + 1)?));
            }
        }

        self.bind_labels(&program)?;

        let mut words = Vec::with_capacity(program.len());
        for (line, instruction) in &program {
            match instruction {
                Instruction::Label(_) => {}
                Instruction::Address(value) => words.push(self.encode_address(value, *line)?),
                Instruction::Compute { dest, comp, jump } => {
                    words.push(encode_compute(dest, comp, jump, *line)?)
                }
            }
        }

        let stats = AssemblyStats {
            instructions: words.len(),
            labels: self.symbols.label_count(),
            variables: self.symbols.variable_count(),
        };
        log_debug!("Assembly passes finished",
            "instructions" => stats.instructions,
            "labels" => stats.labels,
            "variables" => stats.variables
        );

        Ok(AssemblyOutput { words, stats })
    }

    fn bind_labels(&mut self, program: &[(usize, Instruction<'_>)]) -> AssemblerResult<()> {
        let mut address = 0usize;
        for (line, instruction) in program {
            match instruction {
                Instruction::Label(label) => {
                    // A trailing label may point one past the last instruction
                    if address > MAX_ROM_SIZE {
                        return Err(AssemblerError::RomOverflow { limit: MAX_ROM_SIZE });
                    }
                    self.symbols.define_label(label, address as u16, *line)?;
                }
                _ => {
                    address += 1;
                    if address > MAX_ROM_SIZE {
                        return Err(AssemblerError::RomOverflow { limit: MAX_ROM_SIZE });
                    }
                }
            }
        }
        Ok(())
    }

    fn encode_address(&mut self, value: &str, line: usize) -> AssemblerResult<String> {
        let address = if value.starts_with(|c: char| c.is_ascii_digit()) {
            match value.parse::<u32>() {
                Ok(number) if number <= MAX_ADDRESS as u32 => number as u16,
                Ok(_) => {
                    return Err(AssemblerError::ConstantOutOfRange {
                        value: value.to_string(),
                        max: MAX_ADDRESS,
                        line,
                    })
                }
                Err(_) if value.chars().all(|c| c.is_ascii_digit()) => {
                    return Err(AssemblerError::ConstantOutOfRange {
                        value: value.to_string(),
                        max: MAX_ADDRESS,
                        line,
                    })
                }
                Err(_) => {
                    return Err(AssemblerError::InvalidSymbol {
                        symbol: value.to_string(),
                        line,
                    })
                }
            }
        } else if is_symbol(value) {
            self.symbols.resolve_or_allocate(value)?
        } else {
            return Err(AssemblerError::InvalidSymbol {
                symbol: value.to_string(),
                line,
            });
        };

        Ok(format!("0{:015b}", address))
    }
}

fn encode_compute(dest: &str, comp: &str, jump: &str, line: usize) -> AssemblerResult<String> {
    let comp_bits = tables::comp_bits(comp).ok_or_else(|| AssemblerError::InvalidComp {
        comp: comp.to_string(),
        line,
    })?;
    let dest_bits = tables::dest_bits(dest).ok_or_else(|| AssemblerError::InvalidDest {
        dest: dest.to_string(),
        line,
    })?;
    let jump_bits = tables::jump_bits(jump).ok_or_else(|| AssemblerError::InvalidJump {
        jump: jump.to_string(),
        line,
    })?;
    Ok(format!("111{}{}{}", comp_bits, dest_bits, jump_bits))
}

/// Assemble a source string with global logging
pub fn assemble_source(source: &str) -> AssemblerResult<AssemblyOutput> {
    let result = Assembler::new().assemble(source);

    match &result {
        Ok(output) => {
            log_success!(
                codes::success::ASSEMBLY_COMPLETE,
                "Assembly completed",
                "instructions" => output.stats.instructions,
                "labels" => output.stats.labels,
                "variables" => output.stats.variables
            );
        }
        Err(error) => {
            let line = error.line().map(|l| l.to_string()).unwrap_or_default();
            log_error!(error.error_code(), "Assembly failed",
                "error" => error,
                "line" => line
            );
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::compile_time::assembler::VARIABLE_BASE_ADDRESS;
    use assert_matches::assert_matches;

    const MAX: &str = "
        // Computes R2 = max(R0, R1)
        @R0
        D=M              // D = first number
        @R1
        D=D-M
        @OUTPUT_FIRST
        D;JGT
        @R1
        D=M
        @OUTPUT_D
        0;JMP
    (OUTPUT_FIRST)
        @R0
        D=M
    (OUTPUT_D)
        @R2
        M=D
    (INFINITE_LOOP)
        @INFINITE_LOOP
        0;JMP
    ";

    #[test]
    fn test_assembles_max_program() {
        let output = Assembler::new().assemble(MAX).unwrap();
        assert_eq!(output.stats.instructions, 16);
        assert_eq!(output.stats.labels, 3);
        assert_eq!(output.stats.variables, 0);
        assert_eq!(
            &output.words[..6],
            &[
                "0000000000000000",
                "1111110000010000",
                "0000000000000001",
                "1111010011010000",
                "0000000000001010",
                "1110001100000001",
            ]
        );
        assert_eq!(output.words[14], "0000000000001110");
        assert_eq!(output.words[15], "1110101010000111");
        assert!(output.to_hack().ends_with("1110101010000111\n"));
    }

    #[test]
    fn test_variables_start_at_base_address() {
        let output = Assembler::new().assemble("@i\nM=1\n@sum\nM=0\n@i\nD=M").unwrap();
        assert_eq!(output.stats.variables, 2);
        assert_eq!(output.words[0], format!("0{:015b}", VARIABLE_BASE_ADDRESS));
        assert_eq!(output.words[2], format!("0{:015b}", VARIABLE_BASE_ADDRESS + 1));
        assert_eq!(output.words[4], output.words[0]);
    }

    #[test]
    fn test_label_used_before_declaration_is_not_a_variable() {
        let mut assembler = Assembler::new();
        let output = assembler.assemble("@END\n0;JMP\n(END)\n@END\n0;JMP").unwrap();
        assert_eq!(output.words[0], "0000000000000010");
        assert_eq!(output.stats.variables, 0);
        assert_eq!(assembler.symbols().get("END"), Some(2));
    }

    #[test]
    fn test_instruction_parsing() {
        assert_eq!(Instruction::parse("(LOOP)", 1).unwrap(), Instruction::Label("LOOP"));
        assert_eq!(Instruction::parse("@17", 1).unwrap(), Instruction::Address("17"));
        assert_eq!(
            Instruction::parse("AM=M+1;JNE", 1).unwrap(),
            Instruction::Compute { dest: "AM", comp: "M+1", jump: "JNE" }
        );
        assert_eq!(
            Instruction::parse("0;JMP", 1).unwrap(),
            Instruction::Compute { dest: "", comp: "0", jump: "JMP" }
        );
        assert!(Instruction::parse("(X)", 1).unwrap().is_label());
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert_matches!(
            Assembler::new().assemble("@1\nD=D*A"),
            Err(AssemblerError::InvalidComp { line: 2, .. })
        );
        assert_matches!(
            Assembler::new().assemble("X=D"),
            Err(AssemblerError::InvalidDest { line: 1, .. })
        );
        assert_matches!(
            Assembler::new().assemble("\n\nD;JUMP"),
            Err(AssemblerError::InvalidJump { line: 3, .. })
        );
        assert_matches!(
            Assembler::new().assemble("(1ABC)"),
            Err(AssemblerError::MalformedLabel { line: 1, .. })
        );
        assert_matches!(
            Assembler::new().assemble("(LOOP"),
            Err(AssemblerError::MalformedLabel { .. })
        );
        assert_matches!(
            Assembler::new().assemble("(A)\n@0\n(A)"),
            Err(AssemblerError::DuplicateLabel { line: 3, first_line: 1, .. })
        );
        assert_matches!(
            Assembler::new().assemble("@12ab"),
            Err(AssemblerError::InvalidSymbol { .. })
        );
        assert_matches!(
            Assembler::new().assemble("@"),
            Err(AssemblerError::InvalidSymbol { .. })
        );
    }

    #[test]
    fn test_constant_range() {
        let output = Assembler::new().assemble("@32767").unwrap();
        assert_eq!(output.words[0], "0111111111111111");
        assert_matches!(
            Assembler::new().assemble("@32768"),
            Err(AssemblerError::ConstantOutOfRange { line: 1, .. })
        );
        assert_matches!(
            Assembler::new().assemble("@99999999999"),
            Err(AssemblerError::ConstantOutOfRange { .. })
        );
    }

    #[test]
    fn test_rom_overflow() {
        let source = "D=0\n".repeat(MAX_ROM_SIZE + 1);
        assert_matches!(
            Assembler::new().assemble(&source),
            Err(AssemblerError::RomOverflow { limit: MAX_ROM_SIZE })
        );
    }

    #[test]
    fn test_blank_and_comment_only_source() {
        let output = assemble_source("// nothing here\n\n   \n").unwrap();
        assert!(output.words.is_empty());
        assert_eq!(output.to_hack(), "");
    }
}
