//! Dispatch table: which sub-rule a token opens, given the enclosing rule and its state
//!
//! Lookups that miss mean the token is handed to the enclosing instance as a
//! terminal.

use crate::grammar::rules::{RuleName, RuleState};
use crate::tokens::TokenKind;
use std::collections::HashMap;

pub type DispatchKey = (Option<RuleName>, RuleState, TokenKind);

/// Tokens that can begin a term, and therefore an expression
pub const TERM_FIRST: [TokenKind; 10] = [
    TokenKind::Identifier,
    TokenKind::LParen,
    TokenKind::True,
    TokenKind::Null,
    TokenKind::False,
    TokenKind::This,
    TokenKind::IntegerConstant,
    TokenKind::StringConstant,
    TokenKind::Tilde,
    TokenKind::Minus,
];

const STATEMENT_STARTS: [(TokenKind, RuleName); 5] = [
    (TokenKind::Let, RuleName::LetStatement),
    (TokenKind::If, RuleName::IfStatement),
    (TokenKind::While, RuleName::WhileStatement),
    (TokenKind::Do, RuleName::DoStatement),
    (TokenKind::Return, RuleName::ReturnStatement),
];

#[derive(Debug, Default)]
pub struct DispatchTable {
    entries: HashMap<DispatchKey, RuleName>,
}

impl DispatchTable {
    pub fn lookup(
        &self,
        enclosing: Option<RuleName>,
        state: RuleState,
        token: TokenKind,
    ) -> Option<RuleName> {
        self.entries.get(&(enclosing, state, token)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, enclosing: Option<RuleName>, state: RuleState, token: TokenKind, rule: RuleName) {
        self.entries.insert((enclosing, state, token), rule);
    }

    fn insert_all(
        &mut self,
        enclosing: RuleName,
        state: RuleState,
        tokens: &[TokenKind],
        rule: RuleName,
    ) {
        for token in tokens {
            self.insert(Some(enclosing), state, *token, rule);
        }
    }

    fn insert_statements(&mut self, enclosing: RuleName, state: RuleState) {
        for (token, rule) in STATEMENT_STARTS {
            self.insert(Some(enclosing), state, token, rule);
        }
    }
}

pub(crate) fn build_dispatch() -> DispatchTable {
    use RuleName as R;
    use RuleState as S;
    use TokenKind as T;

    let mut table = DispatchTable::default();

    // top level
    table.insert(None, S::Initial, T::Class, R::Class);

    // class members
    table.insert_all(R::Class, S::Initial, &[T::Static, T::Field], R::ClassVarDec);
    table.insert_all(
        R::Class,
        S::Initial,
        &[T::Constructor, T::Function, T::Method],
        R::SubroutineDec,
    );

    // subroutine signature and body
    table.insert_all(
        R::SubroutineDec,
        S::AfterSubroutineName,
        &[T::Int, T::Char, T::Boolean, T::Identifier],
        R::ParameterList,
    );
    table.insert(
        Some(R::SubroutineDec),
        S::AfterSubroutineName,
        T::LBrace,
        R::SubroutineBody,
    );
    table.insert(Some(R::SubroutineBody), S::Initial, T::Var, R::VarDec);
    table.insert_statements(R::SubroutineBody, S::Initial);

    // statements
    table.insert_all(R::LetStatement, S::ExpectingExpression, &TERM_FIRST, R::Expression);
    table.insert_all(R::IfStatement, S::ExpectingExpression, &TERM_FIRST, R::Expression);
    table.insert_statements(R::IfStatement, S::InBlock);
    table.insert_all(R::WhileStatement, S::ExpectingExpression, &TERM_FIRST, R::Expression);
    table.insert_statements(R::WhileStatement, S::InBlock);
    table.insert(Some(R::DoStatement), S::Initial, T::Identifier, R::SubroutineCall);
    table.insert_all(R::ReturnStatement, S::Initial, &TERM_FIRST, R::Expression);

    // expressions
    table.insert_all(R::Expression, S::Initial, &TERM_FIRST, R::Term);
    table.insert_all(R::Expression, S::AfterOperator, &TERM_FIRST, R::Term);
    table.insert_all(R::ExpressionList, S::Initial, &TERM_FIRST, R::Expression);
    table.insert_all(R::SubroutineCall, S::InArguments, &TERM_FIRST, R::ExpressionList);
    table.insert_all(R::Term, S::AfterUnaryOperator, &TERM_FIRST, R::Term);
    table.insert_all(R::Term, S::InParentheses, &TERM_FIRST, R::Expression);
    table.insert_all(R::Term, S::InSubscript, &TERM_FIRST, R::Expression);
    table.insert_all(
        R::Term,
        S::AfterIdentifier,
        &[T::Dot, T::LParen],
        R::SubroutineCall,
    );

    table
}
