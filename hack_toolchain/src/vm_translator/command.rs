//! VM command model and line parser

use crate::config::compile_time::assembler::MAX_ADDRESS;
use crate::config::compile_time::vm::TEMP_SEGMENT_SIZE;
use crate::vm_translator::error::{VmError, VmResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
}

impl Segment {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "constant" => Some(Segment::Constant),
            "local" => Some(Segment::Local),
            "argument" => Some(Segment::Argument),
            "this" => Some(Segment::This),
            "that" => Some(Segment::That),
            "temp" => Some(Segment::Temp),
            "pointer" => Some(Segment::Pointer),
            "static" => Some(Segment::Static),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Temp => "temp",
            Segment::Pointer => "pointer",
            Segment::Static => "static",
        }
    }

    /// Base pointer register for segments addressed through RAM[0..4]
    pub fn base_register(&self) -> Option<&'static str> {
        match self {
            Segment::Local => Some("LCL"),
            Segment::Argument => Some("ARG"),
            Segment::This => Some("THIS"),
            Segment::That => Some("THAT"),
            _ => None,
        }
    }

    /// Fixed-size segments
    pub fn size(&self) -> Option<u16> {
        match self {
            Segment::Temp => Some(TEMP_SEGMENT_SIZE),
            Segment::Pointer => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "add" => Some(ArithmeticOp::Add),
            "sub" => Some(ArithmeticOp::Sub),
            "neg" => Some(ArithmeticOp::Neg),
            "eq" => Some(ArithmeticOp::Eq),
            "gt" => Some(ArithmeticOp::Gt),
            "lt" => Some(ArithmeticOp::Lt),
            "and" => Some(ArithmeticOp::And),
            "or" => Some(ArithmeticOp::Or),
            "not" => Some(ArithmeticOp::Not),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        }
    }

    pub fn is_unary(&self) -> bool {
        matches!(self, ArithmeticOp::Neg | ArithmeticOp::Not)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    Arithmetic(ArithmeticOp),
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

impl fmt::Display for VmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmCommand::Arithmetic(op) => f.write_str(op.as_str()),
            VmCommand::Push { segment, index } => write!(f, "push {} {}", segment, index),
            VmCommand::Pop { segment, index } => write!(f, "pop {} {}", segment, index),
            VmCommand::Label(label) => write!(f, "label {}", label),
            VmCommand::Goto(label) => write!(f, "goto {}", label),
            VmCommand::IfGoto(label) => write!(f, "if-goto {}", label),
            VmCommand::Function { name, locals } => write!(f, "function {} {}", name, locals),
            VmCommand::Call { name, args } => write!(f, "call {} {}", name, args),
            VmCommand::Return => f.write_str("return"),
        }
    }
}

/// A parsed command with its 1-based source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmLine {
    pub command: VmCommand,
    pub line: usize,
}

/// Parse one source line; blank and comment-only lines yield `None`
pub fn parse_line(raw: &str, line: usize) -> VmResult<Option<VmCommand>> {
    let text = raw.split("//").next().unwrap_or("").trim();
    let words: Vec<&str> = text.split_whitespace().collect();

    let Some((&keyword, operands)) = words.split_first() else {
        return Ok(None);
    };

    let command = match keyword {
        "push" | "pop" => {
            let [segment, index] = expect_operands::<2>(text, operands, line)?;
            let segment = Segment::from_name(segment).ok_or_else(|| VmError::InvalidSegment {
                segment: segment.to_string(),
                line,
            })?;
            let index = parse_index(index, line)?;

            if let Some(size) = segment.size() {
                if index >= size {
                    return Err(VmError::SegmentIndexOutOfRange {
                        segment: segment.to_string(),
                        index,
                        size,
                        line,
                    });
                }
            }

            if keyword == "push" {
                VmCommand::Push { segment, index }
            } else if segment == Segment::Constant {
                return Err(VmError::PopToConstant { line });
            } else {
                VmCommand::Pop { segment, index }
            }
        }
        "label" | "goto" | "if-goto" => {
            let [label] = expect_operands::<1>(text, operands, line)?;
            if !is_label(label) {
                return Err(VmError::malformed(text, "invalid label name", line));
            }
            let label = label.to_string();
            match keyword {
                "label" => VmCommand::Label(label),
                "goto" => VmCommand::Goto(label),
                _ => VmCommand::IfGoto(label),
            }
        }
        "function" | "call" => {
            let [name, count] = expect_operands::<2>(text, operands, line)?;
            if !is_label(name) {
                return Err(VmError::malformed(text, "invalid function name", line));
            }
            let count = parse_index(count, line)?;
            if keyword == "function" {
                VmCommand::Function {
                    name: name.to_string(),
                    locals: count,
                }
            } else {
                VmCommand::Call {
                    name: name.to_string(),
                    args: count,
                }
            }
        }
        "return" => {
            expect_operands::<0>(text, operands, line)?;
            VmCommand::Return
        }
        other => match ArithmeticOp::from_name(other) {
            Some(op) => {
                expect_operands::<0>(text, operands, line)?;
                VmCommand::Arithmetic(op)
            }
            None => {
                return Err(VmError::UnknownCommand {
                    command: other.to_string(),
                    line,
                })
            }
        },
    };

    Ok(Some(command))
}

/// Parse a whole `.vm` source
pub fn parse_program(source: &str) -> VmResult<Vec<VmLine>> {
    let mut commands = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        if let Some(command) = parse_line(raw, index + 1)? {
            commands.push(VmLine {
                command,
                line: index + 1,
            });
        }
    }
    Ok(commands)
}

fn expect_operands<'a, const N: usize>(
    text: &str,
    operands: &[&'a str],
    line: usize,
) -> VmResult<[&'a str; N]> {
    <[&str; N]>::try_from(operands).map_err(|_| {
        VmError::malformed(
            text,
            &format!("expected {} operand(s), found {}", N, operands.len()),
            line,
        )
    })
}

fn parse_index(value: &str, line: usize) -> VmResult<u16> {
    match value.parse::<u16>() {
        Ok(index) if index <= MAX_ADDRESS => Ok(index),
        _ => Err(VmError::InvalidIndex {
            value: value.to_string(),
            line,
        }),
    }
}

fn is_label(name: &str) -> bool {
    !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_memory_commands() {
        assert_eq!(
            parse_line("push constant 7", 1).unwrap(),
            Some(VmCommand::Push { segment: Segment::Constant, index: 7 })
        );
        assert_eq!(
            parse_line("  pop local 2   // store", 1).unwrap(),
            Some(VmCommand::Pop { segment: Segment::Local, index: 2 })
        );
        assert_eq!(
            parse_line("pop pointer 1", 1).unwrap(),
            Some(VmCommand::Pop { segment: Segment::Pointer, index: 1 })
        );
    }

    #[test]
    fn test_parse_flow_and_function_commands() {
        assert_eq!(
            parse_line("if-goto LOOP_START", 1).unwrap(),
            Some(VmCommand::IfGoto("LOOP_START".to_string()))
        );
        assert_eq!(
            parse_line("function Main.fibonacci 2", 1).unwrap(),
            Some(VmCommand::Function { name: "Main.fibonacci".to_string(), locals: 2 })
        );
        assert_eq!(
            parse_line("call Math.multiply 2", 1).unwrap(),
            Some(VmCommand::Call { name: "Math.multiply".to_string(), args: 2 })
        );
        assert_eq!(parse_line("return", 1).unwrap(), Some(VmCommand::Return));
        assert_eq!(parse_line("lt", 1).unwrap(), Some(VmCommand::Arithmetic(ArithmeticOp::Lt)));
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line("", 1).unwrap(), None);
        assert_eq!(parse_line("   // only a comment", 1).unwrap(), None);
        let program = parse_program("// header\npush constant 1\n\nneg\n").unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program[1].line, 4);
    }

    #[test]
    fn test_display_round_trips_source_text() {
        for text in ["push argument 3", "call Sys.init 0", "if-goto END", "not", "return"] {
            assert_eq!(parse_line(text, 1).unwrap().unwrap().to_string(), text);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_matches!(parse_line("jump somewhere", 3), Err(VmError::UnknownCommand { line: 3, .. }));
        assert_matches!(parse_line("push heap 1", 1), Err(VmError::InvalidSegment { .. }));
        assert_matches!(parse_line("pop constant 1", 1), Err(VmError::PopToConstant { line: 1 }));
        assert_matches!(
            parse_line("push temp 8", 1),
            Err(VmError::SegmentIndexOutOfRange { index: 8, size: 8, .. })
        );
        assert_matches!(
            parse_line("pop pointer 2", 1),
            Err(VmError::SegmentIndexOutOfRange { size: 2, .. })
        );
        assert_matches!(parse_line("push local -1", 1), Err(VmError::InvalidIndex { .. }));
        assert_matches!(parse_line("push constant 40000", 1), Err(VmError::InvalidIndex { .. }));
        assert_matches!(parse_line("push local", 1), Err(VmError::MalformedCommand { .. }));
        assert_matches!(parse_line("add 1", 1), Err(VmError::MalformedCommand { .. }));
        assert_matches!(parse_line("label 9lives", 1), Err(VmError::MalformedCommand { .. }));
    }
}
