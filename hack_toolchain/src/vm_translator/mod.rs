//! Stack VM to Hack assembly translator
//!
//! Each `.vm` module is parsed line by line and appended to a shared
//! [`CodeWriter`], so directories translate into a single `.asm` program.

pub mod code_writer;
pub mod command;
pub mod error;

pub use code_writer::CodeWriter;
pub use command::{parse_line, parse_program, ArithmeticOp, Segment, VmCommand, VmLine};
pub use error::{VmError, VmResult};

use crate::config::compile_time::vm::MAX_COMMANDS_PER_FILE;
use crate::config::TranslatorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationStats {
    pub modules: usize,
    pub commands: usize,
    pub functions: usize,
    pub bootstrap: bool,
}

#[derive(Debug, Clone)]
pub struct TranslationOutput {
    pub assembly: String,
    pub stats: TranslationStats,
}

#[derive(Debug)]
pub struct VmTranslator {
    writer: CodeWriter,
    stats: TranslationStats,
}

impl VmTranslator {
    pub fn new(prefs: &TranslatorPreferences) -> Self {
        Self {
            writer: CodeWriter::new().with_annotations(prefs.annotate_commands),
            stats: TranslationStats::default(),
        }
    }

    pub fn write_bootstrap(&mut self) {
        self.writer.write_bootstrap();
        self.stats.bootstrap = true;
    }

    /// Translate one module; returns the number of commands written
    pub fn translate_module(&mut self, module: &str, source: &str) -> VmResult<usize> {
        let program = parse_program(source)?;
        if program.len() > MAX_COMMANDS_PER_FILE {
            return Err(VmError::TooManyCommands {
                module: module.to_string(),
                limit: MAX_COMMANDS_PER_FILE,
            });
        }

        self.writer.set_module(module);
        for VmLine { command, line } in &program {
            self.writer.write(command, *line)?;
            if matches!(command, VmCommand::Function { .. }) {
                self.stats.functions += 1;
            }
        }

        self.stats.modules += 1;
        self.stats.commands += program.len();
        log_debug!("Translated VM module",
            "module" => module,
            "commands" => program.len()
        );
        Ok(program.len())
    }

    pub fn finish(self) -> TranslationOutput {
        TranslationOutput {
            assembly: self.writer.into_output(),
            stats: self.stats,
        }
    }
}

/// Translate `(module name, source)` pairs into one program with global logging
pub fn translate_modules(
    modules: &[(String, String)],
    bootstrap: bool,
    prefs: &TranslatorPreferences,
) -> VmResult<TranslationOutput> {
    let result = translate_all(modules, bootstrap, prefs);

    match &result {
        Ok(output) => {
            log_success!(
                codes::success::TRANSLATION_COMPLETE,
                "VM translation completed",
                "modules" => output.stats.modules,
                "commands" => output.stats.commands,
                "functions" => output.stats.functions
            );
        }
        Err(error) => {
            log_error!(error.error_code(), "VM translation failed",
                "error" => error
            );
        }
    }

    result
}

fn translate_all(
    modules: &[(String, String)],
    bootstrap: bool,
    prefs: &TranslatorPreferences,
) -> VmResult<TranslationOutput> {
    let mut translator = VmTranslator::new(prefs);
    if bootstrap {
        translator.write_bootstrap();
    }
    for (module, source) in modules {
        translator.translate_module(module, source)?;
    }
    Ok(translator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::Assembler;
    use crate::config::compile_time::vm::STACK_BASE_ADDRESS;
    use assert_matches::assert_matches;

    const SP: usize = 0;
    const LCL: usize = 1;

    fn prefs() -> TranslatorPreferences {
        TranslatorPreferences {
            write_bootstrap: true,
            annotate_commands: false,
        }
    }

    /// Assemble and execute on a minimal Hack CPU
    fn execute(asm: &str, ram: &mut [i16], steps: usize) {
        let rom: Vec<u16> = Assembler::new()
            .assemble(asm)
            .unwrap()
            .words
            .iter()
            .map(|word| u16::from_str_radix(word, 2).unwrap())
            .collect();

        let (mut a, mut d, mut pc) = (0i16, 0i16, 0usize);
        for _ in 0..steps {
            let Some(&instruction) = rom.get(pc) else { break };
            if instruction & 0x8000 == 0 {
                a = instruction as i16;
                pc += 1;
                continue;
            }

            let address = a as u16 as usize;
            let control = (instruction >> 6) & 0x3f;
            let mut x = d;
            let mut y = if instruction & 0x1000 != 0 { ram[address] } else { a };
            if control & 0b100000 != 0 {
                x = 0;
            }
            if control & 0b010000 != 0 {
                x = !x;
            }
            if control & 0b001000 != 0 {
                y = 0;
            }
            if control & 0b000100 != 0 {
                y = !y;
            }
            let mut out = if control & 0b000010 != 0 { x.wrapping_add(y) } else { x & y };
            if control & 0b000001 != 0 {
                out = !out;
            }

            let dest = (instruction >> 3) & 0b111;
            if dest & 0b001 != 0 {
                ram[address] = out;
            }
            if dest & 0b010 != 0 {
                d = out;
            }
            if dest & 0b100 != 0 {
                a = out;
            }

            let jump = instruction & 0b111;
            let taken = (jump & 0b100 != 0 && out < 0)
                || (jump & 0b010 != 0 && out == 0)
                || (jump & 0b001 != 0 && out > 0);
            pc = if taken { address } else { pc + 1 };
        }
    }

    fn run_single(source: &str) -> Vec<i16> {
        run_with_registers(source, &[])
    }

    fn run_with_registers(source: &str, registers: &[(usize, i16)]) -> Vec<i16> {
        let output = translate_modules(&[("Test".to_string(), source.to_string())], false, &prefs())
            .unwrap();
        let mut ram = vec![0i16; 32768];
        ram[SP] = STACK_BASE_ADDRESS as i16;
        for &(address, value) in registers {
            ram[address] = value;
        }
        execute(&output.assembly, &mut ram, 10_000);
        ram
    }

    #[test]
    fn test_arithmetic_executes() {
        let ram = run_single("push constant 7\npush constant 8\nadd\npush constant 20\nsub\nneg");
        assert_eq!(ram[SP], 257);
        assert_eq!(ram[256], 5);
    }

    #[test]
    fn test_comparisons_execute() {
        let ram = run_single(
            "push constant 5\npush constant 3\ngt\n\
             push constant 4\npush constant 4\neq\n\
             push constant 9\npush constant 2\nlt\n\
             push constant 12\npush constant 10\nand\n\
             push constant 0\nnot",
        );
        assert_eq!(ram[SP], 261);
        assert_eq!(&ram[256..261], &[-1, -1, 0, 8, -1]);
    }

    #[test]
    fn test_segments_execute() {
        let source = "
            push constant 3000
            pop pointer 0
            push constant 4000
            pop pointer 1
            push constant 11
            pop this 2
            push constant 22
            pop that 3
            push constant 33
            pop temp 6
            push this 2
            push that 3
            add
            push temp 6
            add
            pop static 1
            push static 1
        ";
        let ram = run_single(source);
        assert_eq!(ram[3002], 11);
        assert_eq!(ram[4003], 22);
        assert_eq!(ram[11], 33);
        assert_eq!(ram[256], 66);
        assert_eq!(ram[SP], 257);
    }

    #[test]
    fn test_call_and_return_execute_with_bootstrap() {
        let sys = "
            function Sys.init 0
            push constant 21
            call Main.double 1
            pop static 0
            label HALT
            goto HALT
        ";
        let main = "
            function Main.double 1
            push argument 0
            push argument 0
            add
            pop local 0
            push local 0
            return
        ";
        let modules = vec![
            ("Main".to_string(), main.to_string()),
            ("Sys".to_string(), sys.to_string()),
        ];
        let output = translate_modules(&modules, true, &prefs()).unwrap();
        assert_eq!(output.stats.modules, 2);
        assert_eq!(output.stats.functions, 2);
        assert!(output.stats.bootstrap);

        let mut ram = vec![0i16; 32768];
        execute(&output.assembly, &mut ram, 10_000);
        // Sys.0 is the first variable the assembler allocates
        assert_eq!(ram[16], 42);
        // Sys.init's frame sits above the bootstrap frame
        assert_eq!(ram[SP], 261);
    }

    #[test]
    fn test_loop_executes() {
        let source = "
            function Test.sum 2
            push constant 5
            pop local 0
            label LOOP
            push local 0
            push local 1
            add
            pop local 1
            push local 0
            push constant 1
            sub
            pop local 0
            push local 0
            if-goto LOOP
            push local 1
        ";
        let ram = run_with_registers(source, &[(LCL, 256)]);
        // locals at 256, 257; result pushed at 258
        assert_eq!(ram[258], 15);
    }

    #[test]
    fn test_command_limit_and_errors() {
        let mut translator = VmTranslator::new(&prefs());
        assert_matches!(
            translator.translate_module("Bad", "push constant 1\nfrobnicate"),
            Err(VmError::UnknownCommand { line: 2, .. })
        );
        assert_eq!(translator.translate_module("Ok", "push constant 1\npop temp 0").unwrap(), 2);
        assert_eq!(translator.finish().stats.commands, 2);
    }
}
