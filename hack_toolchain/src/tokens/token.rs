//! Token kinds and categories for the Jack language
//!
//! Every concrete token is its own [`TokenKind`] variant; the grammar tables
//! match on kinds directly and on the category predicates defined here.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenKind {
    // === KEYWORDS ===
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,

    // === SYMBOLS ===
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Comma,
    Semicolon,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Ampersand,
    Pipe,
    LessThan,
    GreaterThan,
    Equals,
    Tilde,

    // === LITERALS AND NAMES ===
    IntegerConstant,
    StringConstant,
    Identifier,

    Eof,
}

/// Token category, as rendered in parse-tree output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    Keyword,
    Symbol,
    Identifier,
    IntegerConstant,
    StringConstant,
    EndOfInput,
}

impl TokenClass {
    /// Element name used by the XML tree writer
    pub fn tag(&self) -> &'static str {
        match self {
            TokenClass::Keyword => "keyword",
            TokenClass::Symbol => "symbol",
            TokenClass::Identifier => "identifier",
            TokenClass::IntegerConstant => "integerConstant",
            TokenClass::StringConstant => "stringConstant",
            TokenClass::EndOfInput => "eof",
        }
    }
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("class", TokenKind::Class),
    ("constructor", TokenKind::Constructor),
    ("function", TokenKind::Function),
    ("method", TokenKind::Method),
    ("field", TokenKind::Field),
    ("static", TokenKind::Static),
    ("var", TokenKind::Var),
    ("int", TokenKind::Int),
    ("char", TokenKind::Char),
    ("boolean", TokenKind::Boolean),
    ("void", TokenKind::Void),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("null", TokenKind::Null),
    ("this", TokenKind::This),
    ("let", TokenKind::Let),
    ("do", TokenKind::Do),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("return", TokenKind::Return),
];

impl TokenKind {
    pub fn keyword(word: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(text, _)| *text == word)
            .map(|(_, kind)| *kind)
    }

    pub fn symbol(ch: char) -> Option<TokenKind> {
        let kind = match ch {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            '&' => TokenKind::Ampersand,
            '|' => TokenKind::Pipe,
            '<' => TokenKind::LessThan,
            '>' => TokenKind::GreaterThan,
            '=' => TokenKind::Equals,
            '~' => TokenKind::Tilde,
            _ => return None,
        };
        Some(kind)
    }

    /// Fixed source text for keywords and symbols, a descriptive name otherwise
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Ampersand => "&",
            TokenKind::Pipe => "|",
            TokenKind::LessThan => "<",
            TokenKind::GreaterThan => ">",
            TokenKind::Equals => "=",
            TokenKind::Tilde => "~",
            TokenKind::IntegerConstant => "integer constant",
            TokenKind::StringConstant => "string constant",
            TokenKind::Identifier => "identifier",
            TokenKind::Eof => "end of input",
            keyword => KEYWORDS
                .iter()
                .find(|(_, kind)| kind == keyword)
                .map(|(text, _)| *text)
                .unwrap_or("keyword"),
        }
    }

    pub fn category(&self) -> TokenClass {
        match self {
            TokenKind::Class
            | TokenKind::Constructor
            | TokenKind::Function
            | TokenKind::Method
            | TokenKind::Field
            | TokenKind::Static
            | TokenKind::Var
            | TokenKind::Int
            | TokenKind::Char
            | TokenKind::Boolean
            | TokenKind::Void
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::This
            | TokenKind::Let
            | TokenKind::Do
            | TokenKind::If
            | TokenKind::Else
            | TokenKind::While
            | TokenKind::Return => TokenClass::Keyword,
            TokenKind::IntegerConstant => TokenClass::IntegerConstant,
            TokenKind::StringConstant => TokenClass::StringConstant,
            TokenKind::Identifier => TokenClass::Identifier,
            TokenKind::Eof => TokenClass::EndOfInput,
            _ => TokenClass::Symbol,
        }
    }

    /// `int`, `char`, `boolean` or a class name
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Int | TokenKind::Char | TokenKind::Boolean | TokenKind::Identifier
        )
    }

    pub fn is_binary_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Asterisk
                | TokenKind::Slash
                | TokenKind::Ampersand
                | TokenKind::Pipe
                | TokenKind::LessThan
                | TokenKind::GreaterThan
                | TokenKind::Equals
        )
    }

    pub fn is_unary_operator(&self) -> bool {
        matches!(self, TokenKind::Tilde | TokenKind::Minus)
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, TokenKind::Identifier)
    }

    pub fn is_keyword_constant(&self) -> bool {
        matches!(
            self,
            TokenKind::True | TokenKind::False | TokenKind::Null | TokenKind::This
        )
    }

    /// Self-contained term values: keyword constants, integers and strings
    pub fn is_literal(&self) -> bool {
        self.is_keyword_constant()
            || matches!(self, TokenKind::IntegerConstant | TokenKind::StringConstant)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scanned token: its kind plus the literal text it was read from.
/// String constants carry their contents without the quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
        }
    }

    /// Token whose literal is the kind's fixed text
    pub fn fixed(kind: TokenKind) -> Self {
        Self::new(kind, kind.as_str())
    }

    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "")
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn category(&self) -> TokenClass {
        self.kind.category()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::StringConstant => write!(f, "\"{}\"", self.literal),
            _ => write!(f, "{}", self.literal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::keyword("class"), Some(TokenKind::Class));
        assert_eq!(TokenKind::keyword("return"), Some(TokenKind::Return));
        assert_eq!(TokenKind::keyword("Class"), None);
        assert_eq!(TokenKind::Constructor.as_str(), "constructor");
    }

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(TokenKind::symbol('~'), Some(TokenKind::Tilde));
        assert_eq!(TokenKind::symbol('#'), None);
        assert_eq!(TokenKind::symbol('<').unwrap().as_str(), "<");
    }

    #[test]
    fn test_categories() {
        assert_eq!(TokenKind::This.category(), TokenClass::Keyword);
        assert_eq!(TokenKind::True.category().tag(), "keyword");
        assert_eq!(TokenKind::Semicolon.category(), TokenClass::Symbol);
        assert_eq!(TokenKind::IntegerConstant.category().tag(), "integerConstant");
        assert_eq!(TokenKind::StringConstant.category().tag(), "stringConstant");
    }

    #[test]
    fn test_predicates() {
        assert!(TokenKind::Identifier.is_type());
        assert!(!TokenKind::Void.is_type());
        assert!(TokenKind::Minus.is_binary_operator());
        assert!(TokenKind::Minus.is_unary_operator());
        assert!(!TokenKind::Tilde.is_binary_operator());
        assert!(TokenKind::Null.is_literal());
        assert!(TokenKind::StringConstant.is_literal());
        assert!(!TokenKind::Identifier.is_literal());
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::new(TokenKind::StringConstant, "hi").to_string(), "\"hi\"");
        assert_eq!(Token::fixed(TokenKind::LBrace).literal, "{");
        assert_eq!(Token::eof().to_string(), "end of input");
    }
}
