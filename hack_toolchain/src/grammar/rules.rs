//! Rule names and per-instance dispatch states
use serde::{Deserialize, Serialize};
use std::fmt;

/// One named grammar production. Serialized with its tree element name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleName {
    Class,
    ClassVarDec,
    SubroutineDec,
    ParameterList,
    SubroutineBody,
    VarDec,
    LetStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ReturnStatement,
    Expression,
    Term,
    SubroutineCall,
    ExpressionList,
}

impl RuleName {
    pub const ALL: [RuleName; 15] = [
        RuleName::Class,
        RuleName::ClassVarDec,
        RuleName::SubroutineDec,
        RuleName::ParameterList,
        RuleName::SubroutineBody,
        RuleName::VarDec,
        RuleName::LetStatement,
        RuleName::IfStatement,
        RuleName::WhileStatement,
        RuleName::DoStatement,
        RuleName::ReturnStatement,
        RuleName::Expression,
        RuleName::Term,
        RuleName::SubroutineCall,
        RuleName::ExpressionList,
    ];

    /// Position in [`RuleName::ALL`], used as the registry index
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleName::Class => "class",
            RuleName::ClassVarDec => "classVarDec",
            RuleName::SubroutineDec => "subroutineDec",
            RuleName::ParameterList => "parameterList",
            RuleName::SubroutineBody => "subroutineBody",
            RuleName::VarDec => "varDec",
            RuleName::LetStatement => "letStatement",
            RuleName::IfStatement => "ifStatement",
            RuleName::WhileStatement => "whileStatement",
            RuleName::DoStatement => "doStatement",
            RuleName::ReturnStatement => "returnStatement",
            RuleName::Expression => "expression",
            RuleName::Term => "term",
            RuleName::SubroutineCall => "subroutineCall",
            RuleName::ExpressionList => "expressionList",
        }
    }

    pub fn from_name(name: &str) -> Option<RuleName> {
        RuleName::ALL.iter().copied().find(|rule| rule.as_str() == name)
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            RuleName::LetStatement
                | RuleName::IfStatement
                | RuleName::WhileStatement
                | RuleName::DoStatement
                | RuleName::ReturnStatement
        )
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Internal state of a live rule instance.
///
/// States carry no data of their own; they only select which row of the
/// dispatch table applies to the next token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RuleState {
    #[default]
    Initial,
    /// subroutineDec: name read, parameters or body may start
    AfterSubroutineName,
    /// let/if/while: an expression may start
    ExpectingExpression,
    /// let: `a[i` read, waiting for `]`
    AfterIndexExpression,
    /// if/while: statements may start
    InBlock,
    /// if: first block closed, only `else` may follow
    AfterBody,
    /// expression: operand read, only an operator may follow
    AfterTerm,
    /// expression: operator read, an operand must follow
    AfterOperator,
    /// term: unary operator read, an operand must follow
    AfterUnaryOperator,
    /// term: `(` read
    InParentheses,
    /// term: `[` read
    InSubscript,
    /// term: bare identifier read; `.` or `(` turns it into a call
    AfterIdentifier,
    AfterCall,
    /// subroutineCall: `(` read, arguments may start
    InArguments,
}
