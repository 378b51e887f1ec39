//! Rule descriptors: each grammar rule declared as ordered field slots
//!
//! A rule is a list of [`FieldDescriptor`]s partitioned into numbered
//! subsets. Subsets are alternation or continuation blocks that the matcher
//! walks strictly in order; flags on each field say whether it must match,
//! whether it may match repeatedly, and how a match affects the instance.
//!
//! A field that [`demands_next`](FieldDescriptor::demands_next) binds the
//! field declared right after it: that successor only matches directly after
//! it, and the instance stays incomplete until it does. Separators and their
//! operands (`, name`, `+ term`, `[ expression ]`) are written this way.

use crate::grammar::rules::{RuleName, RuleState};
use crate::syntax::Node;
use crate::tokens::{TokenClass, TokenKind};
use std::fmt;

/// What a field slot accepts
#[derive(Debug, Clone)]
pub enum Acceptance {
    Token(TokenKind),
    OneOf(Vec<TokenKind>),
    TokenWhere {
        name: &'static str,
        test: fn(&TokenKind) -> bool,
    },
    Rule(RuleName),
    RuleWhere {
        name: &'static str,
        test: fn(&RuleName) -> bool,
    },
}

impl Acceptance {
    pub fn accepts(&self, node: &Node) -> bool {
        match (self, node) {
            (Acceptance::Token(kind), Node::Terminal(token)) => token.kind == *kind,
            (Acceptance::OneOf(kinds), Node::Terminal(token)) => kinds.contains(&token.kind),
            (Acceptance::TokenWhere { test, .. }, Node::Terminal(token)) => test(&token.kind),
            (Acceptance::Rule(rule), Node::Rule(child)) => child.rule == *rule,
            (Acceptance::RuleWhere { test, .. }, Node::Rule(child)) => test(&child.rule),
            _ => false,
        }
    }
}

impl fmt::Display for Acceptance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Acceptance::Token(kind) => write!(f, "{}", describe_kind(*kind)),
            Acceptance::OneOf(kinds) => {
                let names: Vec<String> = kinds.iter().map(|k| describe_kind(*k)).collect();
                write!(f, "one of {}", names.join(", "))
            }
            Acceptance::TokenWhere { name, .. } | Acceptance::RuleWhere { name, .. } => {
                write!(f, "{}", name)
            }
            Acceptance::Rule(rule) => write!(f, "{}", rule),
        }
    }
}

/// Fixed tokens are quoted, token classes are named
fn describe_kind(kind: TokenKind) -> String {
    match kind.category() {
        TokenClass::Keyword | TokenClass::Symbol => format!("'{}'", kind),
        _ => kind.to_string(),
    }
}

/// Where the subset cursor goes after a successful match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubsetAdvance {
    /// Stay on the matched subset so later fields of it can still match
    #[default]
    Stay,
    /// Move past the matched subset
    Skip,
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub acceptance: Acceptance,
    pub required: bool,
    pub repeatable: bool,
    pub subset: usize,
    pub advance: SubsetAdvance,
    pub next_state: Option<RuleState>,
    pub closes_rule: bool,
    pub chainer: bool,
    pub demands_next: bool,
}

impl FieldDescriptor {
    fn with_acceptance(acceptance: Acceptance) -> Self {
        Self {
            acceptance,
            required: false,
            repeatable: false,
            subset: 0,
            advance: SubsetAdvance::Stay,
            next_state: None,
            closes_rule: false,
            chainer: false,
            demands_next: false,
        }
    }

    pub fn token(kind: TokenKind) -> Self {
        Self::with_acceptance(Acceptance::Token(kind))
    }

    pub fn one_of(kinds: &[TokenKind]) -> Self {
        Self::with_acceptance(Acceptance::OneOf(kinds.to_vec()))
    }

    pub fn token_where(name: &'static str, test: fn(&TokenKind) -> bool) -> Self {
        Self::with_acceptance(Acceptance::TokenWhere { name, test })
    }

    pub fn rule(rule: RuleName) -> Self {
        Self::with_acceptance(Acceptance::Rule(rule))
    }

    pub fn rule_where(name: &'static str, test: fn(&RuleName) -> bool) -> Self {
        Self::with_acceptance(Acceptance::RuleWhere { name, test })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    pub fn in_subset(mut self, subset: usize) -> Self {
        self.subset = subset;
        self
    }

    pub fn sets_state(mut self, state: RuleState) -> Self {
        self.next_state = Some(state);
        self
    }

    pub fn closes_rule(mut self) -> Self {
        self.closes_rule = true;
        self
    }

    pub fn chainer(mut self) -> Self {
        self.chainer = true;
        self
    }

    /// The next field of this subset must match immediately after this one
    pub fn demands_next(mut self) -> Self {
        self.demands_next = true;
        self
    }

    pub fn skips_subset(mut self) -> Self {
        self.advance = SubsetAdvance::Skip;
        self
    }

    pub fn accepts(&self, node: &Node) -> bool {
        self.acceptance.accepts(node)
    }
}

/// One grammar rule: its name and ordered field slots
#[derive(Debug, Clone)]
pub struct RuleDescriptor {
    pub name: RuleName,
    pub fields: Vec<FieldDescriptor>,
}

impl RuleDescriptor {
    pub fn new(name: RuleName, fields: Vec<FieldDescriptor>) -> Self {
        debug_assert!(
            fields.windows(2).all(|pair| pair[0].subset <= pair[1].subset),
            "fields of {} must be declared in subset order",
            name
        );
        debug_assert!(
            fields
                .windows(2)
                .all(|pair| !pair[0].demands_next || pair[0].subset == pair[1].subset)
                && fields.last().map_or(true, |field| !field.demands_next),
            "a demanding field of {} needs a successor in its subset",
            name
        );
        Self { name, fields }
    }

    pub fn subset_count(&self) -> usize {
        self.fields.last().map(|field| field.subset + 1).unwrap_or(0)
    }

    pub fn fields_in_subset(&self, subset: usize) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(move |field| field.subset == subset)
    }

    pub fn has_closer_in_subset(&self, subset: usize) -> bool {
        self.fields_in_subset(subset).any(|field| field.closes_rule)
    }
}

// ============================================================================
// SHARED FIELD SHAPES
// ============================================================================

fn keyword(kind: TokenKind) -> FieldDescriptor {
    FieldDescriptor::token(kind).required()
}

fn identifier() -> FieldDescriptor {
    FieldDescriptor::token(TokenKind::Identifier).required()
}

fn type_name() -> FieldDescriptor {
    FieldDescriptor::token_where("type", TokenKind::is_type).required()
}

fn semicolon() -> FieldDescriptor {
    FieldDescriptor::token(TokenKind::Semicolon)
        .required()
        .closes_rule()
}

fn statements() -> FieldDescriptor {
    FieldDescriptor::rule_where("statement", RuleName::is_statement).repeatable()
}

/// `static int a, b, c;` and `var int a, b, c;` share one shape
fn variable_declaration(name: RuleName, leading: &[TokenKind]) -> RuleDescriptor {
    RuleDescriptor::new(
        name,
        vec![
            FieldDescriptor::one_of(leading).required(),
            type_name(),
            identifier(),
            FieldDescriptor::token(TokenKind::Comma)
                .repeatable()
                .demands_next()
                .in_subset(1),
            FieldDescriptor::token(TokenKind::Identifier).repeatable().in_subset(1),
            semicolon().in_subset(1),
        ],
    )
}

// ============================================================================
// RULE TABLE
// ============================================================================

/// Build every rule descriptor, in [`RuleName::ALL`] order
pub(crate) fn build_rules() -> Vec<RuleDescriptor> {
    RuleName::ALL.iter().map(|rule| build_rule(*rule)).collect()
}

fn build_rule(name: RuleName) -> RuleDescriptor {
    use TokenKind as T;

    match name {
        RuleName::Class => RuleDescriptor::new(
            name,
            vec![
                keyword(T::Class),
                identifier(),
                keyword(T::LBrace),
                FieldDescriptor::rule(RuleName::ClassVarDec).repeatable(),
                FieldDescriptor::rule(RuleName::SubroutineDec)
                    .repeatable()
                    .in_subset(1),
                keyword(T::RBrace).closes_rule().in_subset(1),
            ],
        ),

        RuleName::ClassVarDec => variable_declaration(name, &[T::Static, T::Field]),

        RuleName::SubroutineDec => RuleDescriptor::new(
            name,
            vec![
                FieldDescriptor::one_of(&[T::Constructor, T::Function, T::Method]).required(),
                // return type
                FieldDescriptor::token_where("type", TokenKind::is_type)
                    .in_subset(1)
                    .skips_subset(),
                FieldDescriptor::token(T::Void).in_subset(1).skips_subset(),
                // name ( parameterList? ) subroutineBody
                identifier()
                    .in_subset(2)
                    .sets_state(RuleState::AfterSubroutineName),
                keyword(T::LParen).in_subset(2),
                FieldDescriptor::rule(RuleName::ParameterList).in_subset(2),
                keyword(T::RParen).in_subset(2),
                FieldDescriptor::rule(RuleName::SubroutineBody)
                    .required()
                    .closes_rule()
                    .in_subset(2),
            ],
        ),

        RuleName::ParameterList => RuleDescriptor::new(
            name,
            vec![
                type_name(),
                identifier(),
                FieldDescriptor::token(T::Comma)
                    .repeatable()
                    .demands_next()
                    .in_subset(1),
                FieldDescriptor::token_where("type", TokenKind::is_type)
                    .repeatable()
                    .demands_next()
                    .in_subset(1),
                FieldDescriptor::token(T::Identifier).repeatable().in_subset(1),
            ],
        ),

        RuleName::SubroutineBody => RuleDescriptor::new(
            name,
            vec![
                keyword(T::LBrace),
                FieldDescriptor::rule(RuleName::VarDec).repeatable(),
                statements().in_subset(1),
                keyword(T::RBrace).closes_rule().in_subset(1),
            ],
        ),

        RuleName::VarDec => variable_declaration(name, &[T::Var]),

        RuleName::LetStatement => RuleDescriptor::new(
            name,
            vec![
                keyword(T::Let),
                identifier(),
                // optional [ index ]
                FieldDescriptor::token(T::LBracket)
                    .demands_next()
                    .in_subset(1)
                    .sets_state(RuleState::ExpectingExpression),
                FieldDescriptor::rule(RuleName::Expression)
                    .demands_next()
                    .in_subset(1)
                    .sets_state(RuleState::AfterIndexExpression),
                FieldDescriptor::token(T::RBracket).in_subset(1),
                // = value ;
                keyword(T::Equals)
                    .in_subset(2)
                    .sets_state(RuleState::ExpectingExpression),
                FieldDescriptor::rule(RuleName::Expression)
                    .required()
                    .in_subset(2),
                semicolon().in_subset(2),
            ],
        ),

        RuleName::IfStatement => RuleDescriptor::new(
            name,
            vec![
                keyword(T::If),
                keyword(T::LParen).sets_state(RuleState::ExpectingExpression),
                FieldDescriptor::rule(RuleName::Expression)
                    .required()
                    .sets_state(RuleState::InBlock),
                keyword(T::RParen),
                keyword(T::LBrace),
                statements(),
                keyword(T::RBrace)
                    .sets_state(RuleState::AfterBody)
                    .skips_subset(),
                // optional else { statements }
                FieldDescriptor::token(T::Else)
                    .chainer()
                    .demands_next()
                    .in_subset(1),
                FieldDescriptor::token(T::LBrace)
                    .in_subset(1)
                    .sets_state(RuleState::InBlock),
                statements().in_subset(1),
                FieldDescriptor::token(T::RBrace).closes_rule().in_subset(1),
            ],
        ),

        RuleName::WhileStatement => RuleDescriptor::new(
            name,
            vec![
                keyword(T::While),
                keyword(T::LParen).sets_state(RuleState::ExpectingExpression),
                FieldDescriptor::rule(RuleName::Expression)
                    .required()
                    .sets_state(RuleState::InBlock),
                keyword(T::RParen),
                keyword(T::LBrace),
                statements(),
                keyword(T::RBrace).closes_rule(),
            ],
        ),

        RuleName::DoStatement => RuleDescriptor::new(
            name,
            vec![
                keyword(T::Do),
                FieldDescriptor::rule(RuleName::SubroutineCall).required(),
                semicolon(),
            ],
        ),

        RuleName::ReturnStatement => RuleDescriptor::new(
            name,
            vec![
                keyword(T::Return),
                FieldDescriptor::rule(RuleName::Expression),
                semicolon(),
            ],
        ),

        RuleName::Expression => RuleDescriptor::new(
            name,
            vec![
                FieldDescriptor::rule(RuleName::Term)
                    .required()
                    .sets_state(RuleState::AfterTerm),
                FieldDescriptor::token_where("binary operator", TokenKind::is_binary_operator)
                    .repeatable()
                    .chainer()
                    .demands_next()
                    .in_subset(1)
                    .sets_state(RuleState::AfterOperator),
                FieldDescriptor::rule(RuleName::Term)
                    .repeatable()
                    .in_subset(1)
                    .sets_state(RuleState::AfterTerm),
            ],
        ),

        RuleName::Term => RuleDescriptor::new(
            name,
            vec![
                // unaryOp term
                FieldDescriptor::token_where("unary operator", TokenKind::is_unary_operator)
                    .chainer()
                    .demands_next()
                    .sets_state(RuleState::AfterUnaryOperator),
                FieldDescriptor::rule(RuleName::Term).closes_rule(),
                // ( expression )
                FieldDescriptor::token(T::LParen)
                    .chainer()
                    .demands_next()
                    .in_subset(1)
                    .sets_state(RuleState::InParentheses),
                FieldDescriptor::rule(RuleName::Expression)
                    .demands_next()
                    .in_subset(1),
                FieldDescriptor::token(T::RParen).closes_rule().in_subset(1),
                // varName
                FieldDescriptor::token_where("identifier", TokenKind::is_identifier)
                    .in_subset(2)
                    .sets_state(RuleState::AfterIdentifier),
                // varName [ expression ]
                FieldDescriptor::token(T::LBracket)
                    .chainer()
                    .demands_next()
                    .in_subset(3)
                    .sets_state(RuleState::InSubscript),
                FieldDescriptor::rule(RuleName::Expression)
                    .demands_next()
                    .in_subset(3),
                FieldDescriptor::token(T::RBracket).closes_rule().in_subset(3),
                // subroutineCall
                FieldDescriptor::rule(RuleName::SubroutineCall)
                    .closes_rule()
                    .in_subset(4)
                    .sets_state(RuleState::AfterCall),
                // constant
                FieldDescriptor::token_where("constant", TokenKind::is_literal)
                    .closes_rule()
                    .in_subset(5),
            ],
        ),

        RuleName::SubroutineCall => RuleDescriptor::new(
            name,
            vec![
                identifier(),
                // optional receiver: name . name
                FieldDescriptor::token(T::Dot)
                    .chainer()
                    .demands_next()
                    .in_subset(1),
                FieldDescriptor::token(T::Identifier).in_subset(1),
                // ( expressionList? )
                keyword(T::LParen)
                    .chainer()
                    .in_subset(2)
                    .sets_state(RuleState::InArguments),
                FieldDescriptor::rule(RuleName::ExpressionList).in_subset(2),
                keyword(T::RParen).closes_rule().in_subset(2),
            ],
        ),

        RuleName::ExpressionList => RuleDescriptor::new(
            name,
            vec![
                FieldDescriptor::rule(RuleName::Expression).chainer(),
                FieldDescriptor::token(T::Comma)
                    .repeatable()
                    .demands_next()
                    .in_subset(1),
                FieldDescriptor::rule(RuleName::Expression)
                    .repeatable()
                    .in_subset(1),
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::RuleNode;
    use crate::tokens::Token;

    fn terminal(kind: TokenKind, literal: &str) -> Node {
        Node::Terminal(Token::new(kind, literal))
    }

    fn rule_node(rule: RuleName) -> Node {
        Node::Rule(RuleNode {
            rule,
            children: Vec::new(),
            closed: true,
        })
    }

    #[test]
    fn test_acceptance_kinds() {
        let one_of = FieldDescriptor::one_of(&[TokenKind::Static, TokenKind::Field]);
        assert!(one_of.accepts(&terminal(TokenKind::Field, "field")));
        assert!(!one_of.accepts(&terminal(TokenKind::Var, "var")));

        let typed = FieldDescriptor::token_where("type", TokenKind::is_type);
        assert!(typed.accepts(&terminal(TokenKind::Identifier, "Point")));
        assert!(!typed.accepts(&rule_node(RuleName::Term)));

        let statement = FieldDescriptor::rule_where("statement", RuleName::is_statement);
        assert!(statement.accepts(&rule_node(RuleName::WhileStatement)));
        assert!(!statement.accepts(&rule_node(RuleName::VarDec)));
        assert!(!statement.accepts(&terminal(TokenKind::Let, "let")));
    }

    #[test]
    fn test_builder_flags() {
        let field = FieldDescriptor::token(TokenKind::RBrace)
            .required()
            .in_subset(2)
            .sets_state(RuleState::AfterBody)
            .skips_subset();
        assert!(field.required);
        assert!(!field.repeatable);
        assert_eq!(field.subset, 2);
        assert_eq!(field.advance, SubsetAdvance::Skip);
        assert_eq!(field.next_state, Some(RuleState::AfterBody));
        assert!(!field.closes_rule);
    }

    #[test]
    fn test_every_rule_is_built_in_order() {
        let rules = build_rules();
        assert_eq!(rules.len(), RuleName::ALL.len());
        for (descriptor, name) in rules.iter().zip(RuleName::ALL) {
            assert_eq!(descriptor.name, name);
            assert!(!descriptor.fields.is_empty());
        }
    }

    #[test]
    fn test_subset_layout() {
        let rules = build_rules();
        let term = &rules[RuleName::Term.index()];
        assert_eq!(term.subset_count(), 6);
        assert!(term.has_closer_in_subset(1));
        assert!(!term.has_closer_in_subset(2));

        let if_statement = &rules[RuleName::IfStatement.index()];
        assert_eq!(if_statement.subset_count(), 2);
        assert!(!if_statement.has_closer_in_subset(0));
    }

    #[test]
    fn test_separators_bind_their_operand() {
        let rules = build_rules();
        for rule in [RuleName::ClassVarDec, RuleName::ParameterList, RuleName::ExpressionList] {
            let comma = rules[rule.index()]
                .fields
                .iter()
                .find(|field| field.acceptance.to_string() == "','")
                .unwrap_or_else(|| panic!("{} has no comma", rule));
            assert!(comma.demands_next, "comma of {}", rule);
        }

        let expression = &rules[RuleName::Expression.index()];
        assert!(expression.fields[1].demands_next);
        assert!(!expression.fields[2].demands_next);
    }

    #[test]
    fn test_acceptance_display() {
        assert_eq!(Acceptance::Token(TokenKind::RBrace).to_string(), "'}'");
        assert_eq!(
            Acceptance::OneOf(vec![TokenKind::Static, TokenKind::Field]).to_string(),
            "one of 'static', 'field'"
        );
        assert_eq!(Acceptance::Rule(RuleName::SubroutineBody).to_string(), "subroutineBody");
        assert_eq!(Acceptance::Token(TokenKind::Identifier).to_string(), "identifier");
    }
}
