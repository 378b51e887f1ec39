//! Hack assembly emission for VM commands

use crate::config::compile_time::vm::{STACK_BASE_ADDRESS, TEMP_BASE_ADDRESS};
use crate::vm_translator::command::{ArithmeticOp, Segment, VmCommand};
use crate::vm_translator::error::{VmError, VmResult};

/// Scratch register for computed pop addresses
const ADDRESS_REGISTER: &str = "R13";
/// Saved `LCL` during `return`
const FRAME_REGISTER: &str = "R14";
/// Saved return address during `return`
const RETURN_REGISTER: &str = "R15";

const POP_TO_D: &str = "@SP\nAM=M-1\nD=M\n";
const PUSH_D: &str = "@SP\nA=M\nM=D\n@SP\nM=M+1\n";

/// Accumulates assembly for one output file. Label counters span every
/// module written through the same writer.
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
    module: String,
    function: Option<String>,
    comparisons: usize,
    calls: usize,
    annotate: bool,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix each command's fragment with `// <command>`
    pub fn with_annotations(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Static variables are named after the module being translated
    pub fn set_module(&mut self, module: &str) {
        self.module = module.to_string();
        self.function = None;
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// `SP = 256`, then `call Sys.init 0`
    pub fn write_bootstrap(&mut self) {
        if self.annotate {
            self.emit("// bootstrap\n");
        }
        self.emit(format!("@{}\nD=A\n@SP\nM=D\n", STACK_BASE_ADDRESS));
        self.write_call("Sys.init", 0);
    }

    pub fn write(&mut self, command: &VmCommand, line: usize) -> VmResult<()> {
        if self.annotate {
            self.emit(format!("// {}\n", command));
        }

        match command {
            VmCommand::Arithmetic(op) => self.write_arithmetic(*op),
            VmCommand::Push { segment, index } => self.write_push(*segment, *index),
            VmCommand::Pop { segment, index } => self.write_pop(*segment, *index, line)?,
            VmCommand::Label(label) => {
                let label = self.scoped_label(label);
                self.emit(format!("({})\n", label));
            }
            VmCommand::Goto(label) => {
                let label = self.scoped_label(label);
                self.emit(format!("@{}\n0;JMP\n", label));
            }
            VmCommand::IfGoto(label) => {
                let label = self.scoped_label(label);
                self.emit(POP_TO_D);
                self.emit(format!("@{}\nD;JNE\n", label));
            }
            VmCommand::Function { name, locals } => self.write_function(name, *locals),
            VmCommand::Call { name, args } => self.write_call(name, *args),
            VmCommand::Return => self.write_return(),
        }
        Ok(())
    }

    pub fn output(&self) -> &str {
        &self.out
    }

    pub fn into_output(self) -> String {
        self.out
    }

    fn emit(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
    }

    fn scoped_label(&self, label: &str) -> String {
        match &self.function {
            Some(function) => format!("{}${}", function, label),
            None => label.to_string(),
        }
    }

    fn write_arithmetic(&mut self, op: ArithmeticOp) {
        match op {
            ArithmeticOp::Neg => self.emit("@SP\nA=M-1\nM=-M\n"),
            ArithmeticOp::Not => self.emit("@SP\nA=M-1\nM=!M\n"),
            ArithmeticOp::Add | ArithmeticOp::Sub | ArithmeticOp::And | ArithmeticOp::Or => {
                let operation = match op {
                    ArithmeticOp::Add => "M+D",
                    ArithmeticOp::Sub => "M-D",
                    ArithmeticOp::And => "M&D",
                    _ => "M|D",
                };
                self.emit(POP_TO_D);
                self.emit(format!("A=A-1\nM={}\n", operation));
            }
            ArithmeticOp::Eq | ArithmeticOp::Gt | ArithmeticOp::Lt => {
                let (name, jump) = match op {
                    ArithmeticOp::Eq => ("EQ", "JEQ"),
                    ArithmeticOp::Gt => ("GT", "JGT"),
                    _ => ("LT", "JLT"),
                };
                let n = self.comparisons;
                self.comparisons += 1;
                self.emit(POP_TO_D);
                self.emit(format!(
                    "A=A-1\nD=M-D\n@IS_{name}_{n}\nD;{jump}\n\
                     @SP\nA=M-1\nM=0\n@END_{name}_{n}\n0;JMP\n\
                     (IS_{name}_{n})\n@SP\nA=M-1\nM=-1\n(END_{name}_{n})\n"
                ));
            }
        }
    }

    fn write_push(&mut self, segment: Segment, index: u16) {
        match segment {
            Segment::Constant => {
                self.emit(format!("@{}\nD=A\n", index));
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = segment.base_register().unwrap_or_default();
                if index == 0 {
                    self.emit(format!("@{}\nA=M\nD=M\n", base));
                } else {
                    self.emit(format!("@{}\nD=A\n@{}\nA=M+D\nD=M\n", index, base));
                }
            }
            Segment::Temp | Segment::Pointer | Segment::Static => {
                let address = self.direct_address(segment, index);
                self.emit(format!("@{}\nD=M\n", address));
            }
        }
        self.emit(PUSH_D);
    }

    fn write_pop(&mut self, segment: Segment, index: u16, line: usize) -> VmResult<()> {
        match segment {
            Segment::Constant => return Err(VmError::PopToConstant { line }),
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = segment.base_register().unwrap_or_default();
                if index == 0 {
                    self.emit(format!("@{}\nD=M\n", base));
                } else {
                    self.emit(format!("@{}\nD=A\n@{}\nD=M+D\n", index, base));
                }
                self.emit(format!("@{r}\nM=D\n", r = ADDRESS_REGISTER));
                self.emit(POP_TO_D);
                self.emit(format!("@{r}\nA=M\nM=D\n", r = ADDRESS_REGISTER));
            }
            Segment::Temp | Segment::Pointer | Segment::Static => {
                let address = self.direct_address(segment, index);
                self.emit(POP_TO_D);
                self.emit(format!("@{}\nM=D\n", address));
            }
        }
        Ok(())
    }

    /// Symbol or literal address for segments that need no pointer arithmetic
    fn direct_address(&self, segment: Segment, index: u16) -> String {
        match segment {
            Segment::Temp => (TEMP_BASE_ADDRESS + index).to_string(),
            Segment::Pointer if index == 0 => "THIS".to_string(),
            Segment::Pointer => "THAT".to_string(),
            _ => format!("{}.{}", self.module, index),
        }
    }

    fn write_function(&mut self, name: &str, locals: u16) {
        self.function = Some(name.to_string());
        self.emit(format!("({})\n", name));
        for _ in 0..locals {
            self.emit("@SP\nA=M\nM=0\n@SP\nM=M+1\n");
        }
    }

    fn write_call(&mut self, name: &str, args: u16) {
        let caller = self.function.as_deref().unwrap_or("bootstrap");
        let return_label = format!("{}$ret.{}", caller, self.calls);
        self.calls += 1;

        self.emit(format!("@{}\nD=A\n{}", return_label, PUSH_D));
        for register in ["LCL", "ARG", "THIS", "THAT"] {
            self.emit(format!("@{}\nD=M\n{}", register, PUSH_D));
        }
        self.emit(format!(
            "@SP\nD=M\n@{}\nD=D-A\n@ARG\nM=D\n@SP\nD=M\n@LCL\nM=D\n@{}\n0;JMP\n({})\n",
            u32::from(args) + 5,
            name,
            return_label
        ));
    }

    fn write_return(&mut self) {
        let frame = FRAME_REGISTER;
        let ret = RETURN_REGISTER;
        self.emit(format!("@LCL\nD=M\n@{frame}\nM=D\n@5\nA=D-A\nD=M\n@{ret}\nM=D\n"));
        self.emit(POP_TO_D);
        self.emit("@ARG\nA=M\nM=D\n@ARG\nD=M+1\n@SP\nM=D\n");
        for register in ["THAT", "THIS", "ARG", "LCL"] {
            self.emit(format!("@{frame}\nAM=M-1\nD=M\n@{register}\nM=D\n"));
        }
        self.emit(format!("@{ret}\nA=M\n0;JMP\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm_translator::command::parse_line;
    use assert_matches::assert_matches;

    fn translate(lines: &[&str]) -> String {
        let mut writer = CodeWriter::new();
        writer.set_module("Test");
        for (n, line) in lines.iter().enumerate() {
            let command = parse_line(line, n + 1).unwrap().unwrap();
            writer.write(&command, n + 1).unwrap();
        }
        writer.into_output()
    }

    #[test]
    fn test_push_constant_and_add() {
        let asm = translate(&["push constant 7", "push constant 8", "add"]);
        assert!(asm.starts_with("@7\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n@8\n"));
        assert!(asm.ends_with("@SP\nAM=M-1\nD=M\nA=A-1\nM=M+D\n"));
    }

    #[test]
    fn test_comparison_labels_are_unique() {
        let asm = translate(&["eq", "eq", "lt"]);
        assert!(asm.contains("(IS_EQ_0)"));
        assert!(asm.contains("(END_EQ_1)"));
        assert!(asm.contains("@IS_LT_2\nD;JLT\n"));
    }

    #[test]
    fn test_comparison_fragment_is_exact() {
        assert_eq!(
            translate(&["eq"]),
            "@SP\nAM=M-1\nD=M\nA=A-1\nD=M-D\n@IS_EQ_0\nD;JEQ\n\
             @SP\nA=M-1\nM=0\n@END_EQ_0\n0;JMP\n\
             (IS_EQ_0)\n@SP\nA=M-1\nM=-1\n(END_EQ_0)\n"
        );
    }

    #[test]
    fn test_every_fragment_ends_its_line() {
        let asm = translate(&[
            "function Main.main 2",
            "push local 1",
            "pop argument 0",
            "label LOOP",
            "if-goto LOOP",
            "call Main.main 0",
            "not",
            "return",
        ]);
        assert!(asm.ends_with('\n'));
        assert!(asm.lines().all(|line| !line.is_empty() && line.trim() == line));
    }

    #[test]
    fn test_segment_addressing() {
        let asm = translate(&["push temp 3", "pop pointer 1", "push static 4", "pop this 0"]);
        assert!(asm.contains(&format!("@{}\nD=M\n", TEMP_BASE_ADDRESS + 3)));
        assert!(asm.contains("@SP\nAM=M-1\nD=M\n@THAT\nM=D\n"));
        assert!(asm.contains("@Test.4\nD=M\n"));
        assert!(asm.contains("@THIS\nD=M\n@R13\nM=D\n"));
    }

    #[test]
    fn test_labels_are_scoped_to_function() {
        let asm = translate(&["label TOP", "function Main.loop 1", "label TOP", "goto TOP"]);
        assert!(asm.starts_with("(TOP)\n(Main.loop)\n@SP\nA=M\nM=0\n"));
        assert!(asm.contains("(Main.loop$TOP)\n@Main.loop$TOP\n0;JMP\n"));
    }

    #[test]
    fn test_call_and_return_fragments() {
        let asm = translate(&["function Main.main 0", "call Math.max 2", "return"]);
        assert!(asm.contains("@Main.main$ret.0\nD=A\n"));
        assert!(asm.contains("@7\nD=D-A\n@ARG\nM=D\n"));
        assert!(asm.contains("@Math.max\n0;JMP\n(Main.main$ret.0)\n"));
        assert!(asm.contains("@LCL\nD=M\n@R14\nM=D\n@5\nA=D-A\nD=M\n@R15\nM=D\n"));
        assert!(asm.ends_with("@R15\nA=M\n0;JMP\n"));
    }

    #[test]
    fn test_bootstrap_and_annotations() {
        let mut writer = CodeWriter::new().with_annotations(true);
        writer.write_bootstrap();
        writer.set_module("Sys");
        writer.write(&VmCommand::Return, 1).unwrap();
        let asm = writer.output();
        assert!(asm.starts_with("// bootstrap\n@256\nD=A\n@SP\nM=D\n@bootstrap$ret.0\n"));
        assert!(asm.contains("@Sys.init\n0;JMP\n"));
        assert!(asm.contains("// return\n@LCL\n"));
    }

    #[test]
    fn test_pop_constant_is_rejected() {
        let mut writer = CodeWriter::new();
        let command = VmCommand::Pop { segment: Segment::Constant, index: 0 };
        assert_matches!(writer.write(&command, 4), Err(VmError::PopToConstant { line: 4 }));
    }
}
