//! Declarative Jack grammar
//!
//! The grammar is data, not code: [`schema`] declares every rule as ordered
//! field slots and [`dispatch`] says which token opens which sub-rule. The
//! parser in [`crate::syntax`] interprets both.

pub mod dispatch;
pub mod rules;
pub mod schema;

pub use dispatch::{DispatchTable, TERM_FIRST};
pub use rules::{RuleName, RuleState};
pub use schema::{Acceptance, FieldDescriptor, RuleDescriptor, SubsetAdvance};

use crate::tokens::TokenKind;
use std::sync::OnceLock;

/// Immutable rule registry shared by every parser
#[derive(Debug)]
pub struct Grammar {
    rules: Vec<RuleDescriptor>,
    dispatch: DispatchTable,
}

impl Grammar {
    fn build() -> Self {
        Self {
            rules: schema::build_rules(),
            dispatch: dispatch::build_dispatch(),
        }
    }

    pub fn descriptor(&self, rule: RuleName) -> &RuleDescriptor {
        &self.rules[rule.index()]
    }

    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    /// Sub-rule opened by `token` inside `enclosing` while it is in `state`
    pub fn next_rule(
        &self,
        enclosing: Option<RuleName>,
        state: RuleState,
        token: TokenKind,
    ) -> Option<RuleName> {
        self.dispatch.lookup(enclosing, state, token)
    }

    pub fn dispatch_entries(&self) -> usize {
        self.dispatch.len()
    }
}

static GRAMMAR: OnceLock<Grammar> = OnceLock::new();

/// The process-wide grammar, built on first use
pub fn grammar() -> &'static Grammar {
    GRAMMAR.get_or_init(Grammar::build)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_indexed_by_rule() {
        let grammar = grammar();
        for rule in RuleName::ALL {
            assert_eq!(grammar.descriptor(rule).name, rule);
        }
    }

    #[test]
    fn test_every_dispatched_rule_accepts_its_opening_token() {
        // A dispatched rule is seeded with the opening token unless it is
        // primed from its own dispatch row or merged from a term.
        let grammar = grammar();
        for rule in RuleName::ALL {
            for state in [RuleState::Initial, RuleState::InBlock, RuleState::AfterSubroutineName] {
                for (token, opened) in [
                    (TokenKind::Let, RuleName::LetStatement),
                    (TokenKind::Var, RuleName::VarDec),
                    (TokenKind::Static, RuleName::ClassVarDec),
                ] {
                    if grammar.next_rule(Some(rule), state, token) == Some(opened) {
                        let first = &grammar.descriptor(opened).fields[0];
                        assert!(first.required);
                        assert_eq!(first.subset, 0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_statement_rules_end_with_a_closer() {
        let grammar = grammar();
        for rule in RuleName::ALL.iter().filter(|rule| rule.is_statement()) {
            let descriptor = grammar.descriptor(*rule);
            assert!(
                descriptor.fields.iter().any(|field| field.closes_rule),
                "{} has no closing field",
                rule
            );
        }
    }

    #[test]
    fn test_dispatch_table_is_populated() {
        assert!(grammar().dispatch_entries() > 100);
    }
}
