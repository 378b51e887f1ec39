//! Label and variable bindings for one assembly unit

use crate::assembler::error::{AssemblerError, AssemblerResult};
use crate::assembler::tables::{PREDEFINED_SYMBOLS, SCREEN_ADDRESS};
use crate::config::compile_time::assembler::VARIABLE_BASE_ADDRESS;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    Predefined(u16),
    /// ROM address plus the line that declared it
    Label(u16, usize),
    Variable(u16),
}

impl Binding {
    fn address(&self) -> u16 {
        match self {
            Binding::Predefined(address)
            | Binding::Label(address, _)
            | Binding::Variable(address) => *address,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AsmSymbolTable {
    bindings: HashMap<String, Binding>,
    next_variable: u16,
    variables: usize,
}

impl Default for AsmSymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AsmSymbolTable {
    pub fn new() -> Self {
        let bindings = PREDEFINED_SYMBOLS
            .iter()
            .map(|(name, address)| (name.to_string(), Binding::Predefined(*address)))
            .collect();
        Self {
            bindings,
            next_variable: VARIABLE_BASE_ADDRESS,
            variables: 0,
        }
    }

    /// Bind a `(LABEL)` to the ROM address of the next instruction
    pub fn define_label(&mut self, label: &str, address: u16, line: usize) -> AssemblerResult<()> {
        match self.bindings.get(label) {
            Some(Binding::Label(_, first_line)) => Err(AssemblerError::DuplicateLabel {
                label: label.to_string(),
                line,
                first_line: *first_line,
            }),
            Some(Binding::Predefined(_)) => Err(AssemblerError::MalformedLabel {
                text: format!("({})", label),
                line,
            }),
            _ => {
                self.bindings
                    .insert(label.to_string(), Binding::Label(address, line));
                Ok(())
            }
        }
    }

    /// Address of `symbol`, allocating a fresh variable on first sight
    pub fn resolve_or_allocate(&mut self, symbol: &str) -> AssemblerResult<u16> {
        if let Some(binding) = self.bindings.get(symbol) {
            return Ok(binding.address());
        }

        if self.next_variable >= SCREEN_ADDRESS {
            return Err(AssemblerError::RamExhausted {
                symbol: symbol.to_string(),
                address: self.next_variable,
            });
        }

        let address = self.next_variable;
        self.bindings
            .insert(symbol.to_string(), Binding::Variable(address));
        self.next_variable += 1;
        self.variables += 1;
        Ok(address)
    }

    pub fn get(&self, symbol: &str) -> Option<u16> {
        self.bindings.get(symbol).map(Binding::address)
    }

    pub fn label_count(&self) -> usize {
        self.bindings
            .values()
            .filter(|binding| matches!(binding, Binding::Label(..)))
            .count()
    }

    pub fn variable_count(&self) -> usize {
        self.variables
    }
}
