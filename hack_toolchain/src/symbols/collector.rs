//! Walks a parsed class into its class-level and per-subroutine tables

use crate::config::compile_time::symbols::MAX_SUBROUTINES_PER_CLASS;
use crate::grammar::RuleName;
use crate::symbols::error::{SymbolError, SymbolResult};
use crate::symbols::table::{Symbol, SymbolKind, SymbolTable, SymbolType};
use crate::syntax::{Node, RuleNode};
use crate::tokens::{Token, TokenKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

impl SubroutineKind {
    fn from_keyword(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Constructor => Some(SubroutineKind::Constructor),
            TokenKind::Function => Some(SubroutineKind::Function),
            TokenKind::Method => Some(SubroutineKind::Method),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubroutineSymbols {
    pub name: String,
    pub kind: SubroutineKind,
    /// `None` for `void`
    pub return_type: Option<SymbolType>,
    pub table: SymbolTable,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassSymbols {
    pub name: String,
    pub table: SymbolTable,
    pub subroutines: Vec<SubroutineSymbols>,
}

impl ClassSymbols {
    pub fn subroutine(&self, name: &str) -> Option<&SubroutineSymbols> {
        self.subroutines.iter().find(|sub| sub.name == name)
    }

    /// Look a name up from inside `subroutine`: locals and arguments shadow
    /// class-level variables
    pub fn resolve(&self, subroutine: &str, name: &str) -> Option<&Symbol> {
        self.subroutine(subroutine)
            .and_then(|sub| sub.table.get(name))
            .or_else(|| self.table.get(name))
    }

    pub fn symbol_count(&self) -> usize {
        self.table.len() + self.subroutines.iter().map(|sub| sub.table.len()).sum::<usize>()
    }
}

pub fn collect_class_symbols(node: &Node) -> SymbolResult<ClassSymbols> {
    let class = match node.as_rule() {
        Some(rule) if rule.rule == RuleName::Class => rule,
        _ => return Err(SymbolError::malformed(RuleName::Class, "root is not a class")),
    };

    let name = class
        .child_tokens()
        .find(|token| token.kind == TokenKind::Identifier)
        .map(|token| token.literal.clone())
        .ok_or_else(|| SymbolError::malformed(RuleName::Class, "missing class name"))?;

    let mut table = SymbolTable::new(name.clone());
    for declaration in class.child_rules(RuleName::ClassVarDec) {
        define_variables(&mut table, declaration)?;
    }

    let mut subroutines = Vec::new();
    for declaration in class.child_rules(RuleName::SubroutineDec) {
        if subroutines.len() >= MAX_SUBROUTINES_PER_CLASS {
            return Err(SymbolError::TooManySymbols {
                scope: format!("subroutines of {}", name),
                limit: MAX_SUBROUTINES_PER_CLASS,
            });
        }
        subroutines.push(collect_subroutine(&name, declaration)?);
    }

    Ok(ClassSymbols {
        name,
        table,
        subroutines,
    })
}

fn collect_subroutine(class_name: &str, declaration: &RuleNode) -> SymbolResult<SubroutineSymbols> {
    let tokens: Vec<&Token> = declaration.child_tokens().collect();
    let malformed = |detail: &str| SymbolError::malformed(RuleName::SubroutineDec, detail);

    let (kind, return_token, name) = match tokens.as_slice() {
        [kind, return_token, name, ..] => (*kind, *return_token, *name),
        _ => return Err(malformed("truncated signature")),
    };
    let kind = SubroutineKind::from_keyword(kind.kind)
        .ok_or_else(|| malformed("expected constructor, function or method"))?;
    let return_type = match return_token.kind {
        TokenKind::Void => None,
        _ => Some(
            SymbolType::from_token(return_token).ok_or_else(|| malformed("invalid return type"))?,
        ),
    };

    let mut table = SymbolTable::new(format!("{}.{}", class_name, name.literal));
    if kind == SubroutineKind::Method {
        table.define(
            "this",
            SymbolKind::Argument,
            SymbolType::ClassName(class_name.to_string()),
        )?;
    }

    for parameters in declaration.child_rules(RuleName::ParameterList) {
        define_parameters(&mut table, parameters)?;
    }

    for body in declaration.child_rules(RuleName::SubroutineBody) {
        for locals in body.child_rules(RuleName::VarDec) {
            define_variables(&mut table, locals)?;
        }
    }

    Ok(SubroutineSymbols {
        name: name.literal.clone(),
        kind,
        return_type,
        table,
    })
}

/// `static|field|var type name (, name)* ;`
fn define_variables(table: &mut SymbolTable, declaration: &RuleNode) -> SymbolResult<()> {
    let tokens: Vec<&Token> = declaration.child_tokens().collect();
    let malformed = |detail: &str| SymbolError::malformed(declaration.rule, detail);

    let (kind, symbol_type, names) = match tokens.as_slice() {
        [keyword, type_token, names @ ..] => (
            SymbolKind::from_keyword(keyword.kind)
                .ok_or_else(|| malformed("unknown declaration keyword"))?,
            SymbolType::from_token(type_token).ok_or_else(|| malformed("invalid type"))?,
            names,
        ),
        _ => return Err(malformed("truncated declaration")),
    };

    for token in names.iter().filter(|token| token.kind == TokenKind::Identifier) {
        table.define(&token.literal, kind, symbol_type.clone())?;
    }
    Ok(())
}

/// `type name (, type name)*`
fn define_parameters(table: &mut SymbolTable, parameters: &RuleNode) -> SymbolResult<()> {
    let tokens: Vec<&Token> = parameters
        .child_tokens()
        .filter(|token| token.kind != TokenKind::Comma)
        .collect();

    if tokens.len() % 2 != 0 {
        return Err(SymbolError::malformed(
            RuleName::ParameterList,
            "parameter without a name",
        ));
    }

    for pair in tokens.chunks(2) {
        let symbol_type = SymbolType::from_token(pair[0]).ok_or_else(|| {
            SymbolError::malformed(RuleName::ParameterList, "invalid parameter type")
        })?;
        table.define(&pair[1].literal, SymbolKind::Argument, symbol_type)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;
    use assert_matches::assert_matches;

    const POINT: &str = "
        class Point {
            field int x, y;
            static int count;

            constructor Point new(int ax, int ay) {
                let x = ax;
                let y = ay;
                let count = count + 1;
                return this;
            }

            method int distance(Point other) {
                var int dx, dy;
                var boolean far;
                let dx = x - other.getX();
                let dy = y - other.getY();
                return Math.sqrt((dx * dx) + (dy * dy));
            }

            function void reset() { let count = 0; return; }
        }";

    #[test]
    fn test_class_level_symbols() {
        let symbols = collect_class_symbols(&parse_source(POINT).unwrap()).unwrap();
        assert_eq!(symbols.name, "Point");
        assert_eq!(symbols.table.count(SymbolKind::Field), 2);
        assert_eq!(symbols.table.get("y").unwrap().index, 1);
        assert_eq!(symbols.table.get("count").unwrap().kind, SymbolKind::Static);
        assert_eq!(symbols.subroutines.len(), 3);
        assert_eq!(symbols.symbol_count(), 3 + 2 + 5);
    }

    #[test]
    fn test_method_receives_this_as_argument_zero() {
        let symbols = collect_class_symbols(&parse_source(POINT).unwrap()).unwrap();
        let distance = symbols.subroutine("distance").unwrap();
        assert_eq!(distance.kind, SubroutineKind::Method);
        assert_eq!(distance.return_type, Some(SymbolType::Int));

        let this = distance.table.get("this").unwrap();
        assert_eq!(this.index, 0);
        assert_eq!(this.symbol_type, SymbolType::ClassName("Point".to_string()));

        let other = distance.table.get("other").unwrap();
        assert_eq!((other.kind, other.index), (SymbolKind::Argument, 1));
        assert_eq!(distance.table.get("far").unwrap().index, 2);
    }

    #[test]
    fn test_constructor_and_function_scopes() {
        let symbols = collect_class_symbols(&parse_source(POINT).unwrap()).unwrap();
        let new = symbols.subroutine("new").unwrap();
        assert_eq!(new.return_type, Some(SymbolType::ClassName("Point".to_string())));
        assert!(!new.table.contains("this"));
        assert_eq!(new.table.get("ay").unwrap().index, 1);

        let reset = symbols.subroutine("reset").unwrap();
        assert_eq!(reset.return_type, None);
        assert!(reset.table.is_empty());

        assert_eq!(symbols.resolve("new", "ax").unwrap().kind, SymbolKind::Argument);
        assert_eq!(symbols.resolve("reset", "x").unwrap().kind, SymbolKind::Field);
        assert!(symbols.resolve("reset", "ax").is_none());
    }

    #[test]
    fn test_duplicate_local_is_reported() {
        let node = parse_source("class A { function void f(int a) { var int a; return; } }").unwrap();
        assert_matches!(
            collect_class_symbols(&node),
            Err(SymbolError::DuplicateSymbol { ref name, ref scope }) if name == "a" && scope == "A.f"
        );
    }

    #[test]
    fn test_non_class_root_is_rejected() {
        let node = Node::Terminal(Token::new(TokenKind::Identifier, "x"));
        assert_matches!(
            collect_class_symbols(&node),
            Err(SymbolError::MalformedDeclaration { rule: RuleName::Class, .. })
        );
    }
}
