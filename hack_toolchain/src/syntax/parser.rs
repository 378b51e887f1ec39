//! Table-driven parser driver
//!
//! Pulls tokens from a [`TokenSource`] with one token of pushback, asks the
//! grammar whether the next token opens a nested rule, and feeds the result
//! into the open [`RuleInstance`].

use crate::config::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::grammar::{grammar, RuleName, RuleState};
use crate::lexical::LexerError;
use crate::log_debug;
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::syntax::node::{Node, RuleInstance};
use crate::tokens::{SpannedToken, Token, TokenSource};
use crate::utils::{Span, Spanned};

pub struct Parser<S: TokenSource> {
    source: S,
    current: SpannedToken,
    previous: Option<SpannedToken>,
    pushed_back: Option<SpannedToken>,
    lexical_error: Option<LexerError>,
    depth: usize,
    max_depth: usize,
}

impl<S: TokenSource> Parser<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            current: Spanned::new(Token::eof(), Span::default()),
            previous: None,
            pushed_back: None,
            lexical_error: None,
            depth: 0,
            max_depth: MAX_PARSE_DEPTH,
        }
    }

    /// Lower the nesting limit below the compile-time maximum
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_PARSE_DEPTH);
        self
    }

    /// Parse one construct starting from `initial`, or from the outermost
    /// context when `None`. Empty input yields `Ok(None)`.
    pub fn parse_from_rule(&mut self, initial: Option<RuleName>) -> SyntaxResult<Option<Node>> {
        let result = match initial {
            None => self.parse_next(None),
            Some(rule) => {
                self.advance();
                if self.current.value.is_eof() {
                    Ok(None)
                } else {
                    self.parse_rule(rule, None).map(Some)
                }
            }
        };
        self.finish(result.map(|node| node.map(Spanned::into_inner)))
    }

    /// Parse the next construct as if it appeared at the start of an
    /// `enclosing` rule
    pub fn parse_within(&mut self, enclosing: RuleName) -> SyntaxResult<Option<Node>> {
        let mut context = RuleInstance::new(enclosing);
        let result = self.parse_next(Some(&mut context));
        self.finish(result.map(|node| node.map(Spanned::into_inner)))
    }

    /// Parse a complete class declaration and require the input to end there
    pub fn parse_class(&mut self) -> SyntaxResult<Node> {
        let result = match self.parse_next(None) {
            Ok(None) => Err(SyntaxError::EmptyInput),
            Ok(Some(Spanned {
                value: Node::Terminal(token),
                span,
            })) => Err(SyntaxError::unexpected_token(
                "'class'",
                &token.to_string(),
                span,
            )),
            Ok(Some(class)) => self.expect_end().map(|()| class.value),
            Err(error) => Err(error),
        };
        self.finish(result)
    }

    // ------------------------------------------------------------------------
    // Driver
    // ------------------------------------------------------------------------

    /// Consume one token and turn it into the next candidate child for
    /// `parent`: a nested rule if the dispatch table opens one, otherwise a
    /// bare terminal. End of input yields `None`.
    fn parse_next(
        &mut self,
        parent: Option<&mut RuleInstance>,
    ) -> SyntaxResult<Option<Spanned<Node>>> {
        self.advance();
        if self.current.value.is_eof() {
            return Ok(None);
        }

        let (enclosing, state) = match parent.as_deref() {
            Some(instance) => (Some(instance.rule()), instance.state()),
            None => (None, RuleState::Initial),
        };

        match grammar().next_rule(enclosing, state, self.current.value.kind) {
            Some(rule) => self.parse_rule(rule, parent).map(Some),
            None => Ok(Some(self.current.clone().map(Node::Terminal))),
        }
    }

    fn parse_rule(
        &mut self,
        rule: RuleName,
        parent: Option<&mut RuleInstance>,
    ) -> SyntaxResult<Spanned<Node>> {
        if self.depth >= self.max_depth {
            return Err(SyntaxError::MaxRecursionDepth {
                depth: self.max_depth,
            });
        }

        self.depth += 1;
        let result = self.build_rule(rule, parent);
        self.depth -= 1;
        result
    }

    fn build_rule(
        &mut self,
        rule: RuleName,
        parent: Option<&mut RuleInstance>,
    ) -> SyntaxResult<Spanned<Node>> {
        let opening = self.current.clone();
        let mut instance = RuleInstance::new(rule);
        let mut span = opening.span;

        let merges_callee = rule == RuleName::SubroutineCall
            && parent.as_deref().map(RuleInstance::rule) == Some(RuleName::Term);

        match parent {
            // `name(` and `name.` arrive after the term already took `name`
            Some(term) if merges_callee => {
                if let Some(callee) = term.pop_child() {
                    let callee_span = self
                        .previous
                        .as_ref()
                        .map(|token| token.span)
                        .unwrap_or(opening.span);
                    span = callee_span.merge(span);
                    Self::seed(&mut instance, Spanned::new(callee, callee_span))?;
                }
                Self::seed(&mut instance, opening.map(Node::Terminal))?;
            }
            _ if matches!(rule, RuleName::Expression | RuleName::ExpressionList) => {
                let first = grammar()
                    .next_rule(Some(rule), instance.state(), opening.value.kind)
                    .ok_or_else(|| {
                        SyntaxError::unexpected_token(
                            &format!("start of {}", rule),
                            &opening.value.to_string(),
                            opening.span,
                        )
                    })?;
                let child = self.parse_rule(first, Some(&mut instance))?;
                span = span.merge(child.span);
                Self::seed(&mut instance, child)?;
            }
            _ => Self::seed(&mut instance, opening.map(Node::Terminal))?,
        }

        while !instance.is_closed() {
            let child = match self.parse_next(Some(&mut instance))? {
                Some(child) => child,
                None => break,
            };

            let child_span = child.span;
            match instance.add_node(child.value) {
                Ok(()) => span = span.merge(child_span),
                Err(Node::Terminal(_)) => {
                    let restored = self.push_back();
                    debug_assert!(restored);
                    break;
                }
                Err(Node::Rule(rejected)) => {
                    return Err(SyntaxError::MisplacedRule {
                        rule: rejected.rule,
                        enclosing: rule,
                        span: child_span,
                    });
                }
            }
        }

        if !instance.is_complete() {
            let found = self.lookahead();
            return Err(SyntaxError::incomplete_rule(
                rule,
                &instance.expected(),
                &found.value.to_string(),
                found.span,
            ));
        }

        log_debug!("Rule matched",
            "rule" => rule,
            "children" => instance.children().len(),
            "closed" => instance.is_closed()
        );

        Ok(Spanned::new(instance.into_node(), span))
    }

    /// Offer the first child of a fresh instance
    fn seed(instance: &mut RuleInstance, child: Spanned<Node>) -> SyntaxResult<()> {
        let Spanned { value, span } = child;
        instance.add_node(value).map_err(|rejected| match rejected {
            Node::Terminal(token) => {
                SyntaxError::unexpected_token(&instance.expected(), &token.to_string(), span)
            }
            Node::Rule(node) => SyntaxError::MisplacedRule {
                rule: node.rule,
                enclosing: instance.rule(),
                span,
            },
        })
    }

    fn expect_end(&mut self) -> SyntaxResult<()> {
        self.advance();
        if self.current.value.is_eof() {
            Ok(())
        } else {
            Err(SyntaxError::TrailingInput {
                found: self.current.value.to_string(),
                span: self.current.span,
            })
        }
    }

    /// A lexical failure ends the token stream early; report it over
    /// whatever structural error that caused
    fn finish<T>(&mut self, result: SyntaxResult<T>) -> SyntaxResult<T> {
        match self.lexical_error.take() {
            Some(error) => Err(SyntaxError::Lexical(error)),
            None => result,
        }
    }

    // ------------------------------------------------------------------------
    // Token buffer
    // ------------------------------------------------------------------------

    fn advance(&mut self) {
        let next = match self.pushed_back.take() {
            Some(token) => token,
            None => self.scan(),
        };
        self.previous = Some(std::mem::replace(&mut self.current, next));
    }

    /// Undo the last advance. Only one token can be pushed back before the
    /// next advance.
    fn push_back(&mut self) -> bool {
        match self.previous.take() {
            Some(previous) => {
                self.pushed_back = Some(std::mem::replace(&mut self.current, previous));
                true
            }
            None => false,
        }
    }

    /// The token the next advance will yield, if it has been read already
    fn lookahead(&self) -> &SpannedToken {
        self.pushed_back.as_ref().unwrap_or(&self.current)
    }

    fn scan(&mut self) -> SpannedToken {
        if self.lexical_error.is_none() {
            match self.source.next_token() {
                Ok(token) => return token,
                Err(error) => {
                    log_debug!("Token source failed, ending parse", "error" => &error);
                    self.lexical_error = Some(error);
                }
            }
        }
        Spanned::new(Token::eof(), Span::single(self.current.span.end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::Scanner;
    use crate::syntax::node::RuleNode;
    use crate::tokens::TokenKind;
    use assert_matches::assert_matches;

    fn parser(source: &str) -> Parser<Scanner<'_>> {
        Parser::new(Scanner::new(source))
    }

    fn within(enclosing: RuleName, source: &str) -> RuleNode {
        match parser(source).parse_within(enclosing) {
            Ok(Some(Node::Rule(node))) => node,
            other => panic!("expected a rule node, got {:?}", other),
        }
    }

    fn from_rule(rule: RuleName, source: &str) -> RuleNode {
        match parser(source).parse_from_rule(Some(rule)) {
            Ok(Some(Node::Rule(node))) => node,
            other => panic!("expected a rule node, got {:?}", other),
        }
    }

    /// Compact shape: rule names for sub-trees, literals for terminals
    fn shape(node: &RuleNode) -> Vec<String> {
        node.children
            .iter()
            .map(|child| match child {
                Node::Terminal(token) => token.literal.clone(),
                Node::Rule(rule) => rule.rule.to_string(),
            })
            .collect()
    }

    fn rule_child(node: &RuleNode, index: usize) -> &RuleNode {
        node.children[index]
            .as_rule()
            .unwrap_or_else(|| panic!("child {} of {} is a terminal", index, node.rule))
    }

    #[test]
    fn test_class_root_children() {
        let source = "class Main {
            static int a;
            field boolean b;
            function void main() { return; }
            method int get() { return a; }
        }";
        let node = parser(source).parse_class().unwrap();
        let class = node.as_rule().unwrap();
        assert!(class.closed);
        assert_eq!(
            shape(class),
            vec![
                "class",
                "Main",
                "{",
                "classVarDec",
                "classVarDec",
                "subroutineDec",
                "subroutineDec",
                "}"
            ]
        );
    }

    #[test]
    fn test_bare_token_is_wrapped_unchanged() {
        let node = parser("foo").parse_from_rule(None).unwrap();
        assert_eq!(
            node,
            Some(Node::Terminal(Token::new(TokenKind::Identifier, "foo")))
        );
    }

    #[test]
    fn test_repeated_identifier_list() {
        let dec = within(RuleName::Class, "static int foo, bar, baz;");
        assert_eq!(dec.rule, RuleName::ClassVarDec);
        assert_eq!(
            shape(&dec),
            vec!["static", "int", "foo", ",", "bar", ",", "baz", ";"]
        );
    }

    #[test]
    fn test_call_shares_identifier_prefix() {
        let expression = from_rule(RuleName::Expression, "foo()");
        let term = rule_child(&expression, 0);
        assert_eq!(shape(term), vec!["subroutineCall"]);
        assert_eq!(shape(rule_child(term, 0)), vec!["foo", "(", ")"]);

        let expression = from_rule(RuleName::Expression, "foo");
        assert_eq!(shape(rule_child(&expression, 0)), vec!["foo"]);

        let expression = from_rule(RuleName::Expression, "Output.printInt(x, 1)");
        let call = rule_child(rule_child(&expression, 0), 0);
        assert_eq!(
            shape(call),
            vec!["Output", ".", "printInt", "(", "expressionList", ")"]
        );
        assert_eq!(
            shape(rule_child(call, 4)),
            vec!["expression", ",", "expression"]
        );
    }

    #[test]
    fn test_operator_chain_is_flat() {
        let statement = within(RuleName::SubroutineBody, "return true & 1 - \"baz\";");
        assert_eq!(shape(&statement), vec!["return", "expression", ";"]);
        let expression = rule_child(&statement, 1);
        assert_eq!(
            shape(expression),
            vec!["term", "&", "term", "-", "term"]
        );
        assert_eq!(shape(rule_child(expression, 4)), vec!["baz"]);
    }

    #[test]
    fn test_empty_input_yields_no_tree() {
        assert_eq!(parser("").parse_from_rule(None), Ok(None));
        assert_eq!(parser("  // nothing\n/* here */").parse_from_rule(None), Ok(None));
        assert_matches!(parser("").parse_class(), Err(SyntaxError::EmptyInput));
    }

    #[test]
    fn test_unclosed_class_is_incomplete() {
        let result = parser("class Foo {").parse_class();
        assert_matches!(
            result,
            Err(SyntaxError::IncompleteRule { rule: RuleName::Class, ref expected, ref found, .. })
                if expected == "'}'" && found == "end of input"
        );
    }

    #[test]
    fn test_if_without_else_leaves_next_statement_to_body() {
        let body = from_rule(RuleName::SubroutineBody, "{ if (x) { } let y = 1; }");
        assert_eq!(shape(&body), vec!["{", "ifStatement", "letStatement", "}"]);
        assert_eq!(
            shape(rule_child(&body, 1)),
            vec!["if", "(", "expression", ")", "{", "}"]
        );
    }

    #[test]
    fn test_let_with_index() {
        let statement = within(RuleName::SubroutineBody, "let a[i] = true;");
        assert!(statement.closed);
        assert_eq!(
            shape(&statement),
            vec!["let", "a", "[", "expression", "]", "=", "expression", ";"]
        );
        assert_eq!(shape(rule_child(rule_child(&statement, 3), 0)), vec!["i"]);
    }

    #[test]
    fn test_do_with_arguments() {
        let statement = within(RuleName::SubroutineBody, "do something(this);");
        assert_eq!(shape(&statement), vec!["do", "subroutineCall", ";"]);
        let call = rule_child(&statement, 1);
        assert_eq!(shape(call), vec!["something", "(", "expressionList", ")"]);
        let arguments = rule_child(call, 2);
        assert_eq!(shape(arguments), vec!["expression"]);
    }

    #[test]
    fn test_if_else() {
        let statement = within(
            RuleName::SubroutineBody,
            "if (true) {} else  {let b = true;}",
        );
        assert!(statement.closed);
        assert_eq!(
            shape(&statement),
            vec!["if", "(", "expression", ")", "{", "}", "else", "{", "letStatement", "}"]
        );
    }

    #[test]
    fn test_return_indexed_term() {
        let statement = within(RuleName::SubroutineBody, "return foo[1];");
        let term = rule_child(rule_child(&statement, 1), 0);
        assert!(term.closed);
        assert_eq!(shape(term), vec!["foo", "[", "expression", "]"]);
    }

    #[test]
    fn test_unary_and_parentheses() {
        let expression = from_rule(RuleName::Expression, "-(a + b) * c");
        assert_eq!(shape(&expression), vec!["term", "*", "term"]);
        let negation = rule_child(&expression, 0);
        assert_eq!(shape(negation), vec!["-", "term"]);
        assert_eq!(
            shape(rule_child(negation, 1)),
            vec!["(", "expression", ")"]
        );

        // a closed parenthesized term must not swallow the following operator
        let expression = from_rule(RuleName::Expression, "(a) - b");
        assert_eq!(shape(&expression), vec!["term", "-", "term"]);
    }

    #[test]
    fn test_missing_equals_reports_incomplete_let() {
        let result = parser("let x 5;").parse_within(RuleName::SubroutineBody);
        assert_matches!(
            result,
            Err(SyntaxError::IncompleteRule { rule: RuleName::LetStatement, ref expected, ref found, .. })
                if expected == "'='" && found == "5"
        );
    }

    #[test]
    fn test_unfinished_lists_and_chains_are_incomplete() {
        for (member, rule) in [
            ("static int a b;", RuleName::ClassVarDec),
            ("static int a, ;", RuleName::ClassVarDec),
            ("function void f(int a, ) { return; }", RuleName::ParameterList),
            ("function void f() { return a + ; }", RuleName::Expression),
            ("function void f() { do g(a, ); return; }", RuleName::ExpressionList),
            ("function void f() { let x[] = 1; return; }", RuleName::LetStatement),
            ("function void f() { if (x) { } else ; return; }", RuleName::IfStatement),
            ("function void f() { return (); }", RuleName::Term),
            ("function void f() { do Output.(); return; }", RuleName::SubroutineCall),
        ] {
            let source = format!("class A {{ {} }}", member);
            let result = parser(&source).parse_class();
            assert_matches!(
                result,
                Err(SyntaxError::IncompleteRule { rule: failed, .. }) if failed == rule,
                "{}",
                member
            );
        }
    }

    #[test]
    fn test_finished_lists_and_chains_parse() {
        let source = "class A {
            static int a, b;
            function void f(int x, Point p) {
                let a[x + 1] = -(x * 2) - p.get(a, b[0]);
                return;
            }
        }";
        assert!(parser(source).parse_class().is_ok());
    }

    #[test]
    fn test_declaration_after_subroutine_is_misplaced() {
        let result = parser("class A { function void f() { return; } static int x; }").parse_class();
        assert_matches!(
            result,
            Err(SyntaxError::MisplacedRule {
                rule: RuleName::ClassVarDec,
                enclosing: RuleName::Class,
                ..
            })
        );
    }

    #[test]
    fn test_top_level_must_be_class() {
        assert_matches!(
            parser("let x = 1;").parse_class(),
            Err(SyntaxError::UnexpectedToken { ref found, .. }) if found == "let"
        );
    }

    #[test]
    fn test_trailing_input_after_class() {
        assert_matches!(
            parser("class A {} class B {}").parse_class(),
            Err(SyntaxError::TrailingInput { ref found, .. }) if found == "class"
        );
    }

    #[test]
    fn test_lexical_error_surfaces() {
        assert_matches!(
            parser("class Foo { # }").parse_class(),
            Err(SyntaxError::Lexical(LexerError::InvalidCharacter { character: '#', .. }))
        );
    }

    #[test]
    fn test_nesting_limit() {
        let result = parser("((((((1))))))")
            .with_max_depth(5)
            .parse_from_rule(Some(RuleName::Expression));
        assert_matches!(result, Err(SyntaxError::MaxRecursionDepth { depth: 5 }));
    }

    #[test]
    fn test_parses_from_token_stream() {
        let tokens = crate::lexical::tokenize_source("while (i < 10) { let i = i + 1; }").unwrap();
        let statement = match Parser::new(tokens).parse_within(RuleName::SubroutineBody) {
            Ok(Some(Node::Rule(node))) => node,
            other => panic!("unexpected result {:?}", other),
        };
        assert!(statement.closed);
        assert_eq!(
            shape(&statement),
            vec!["while", "(", "expression", ")", "{", "letStatement", "}"]
        );
    }
}
