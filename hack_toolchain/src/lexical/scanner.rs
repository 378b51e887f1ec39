//! Streaming character-class scanner for Jack source text
//!
//! Produces one token per call. Whitespace, `//` line comments and
//! `/* ... */` block comments (including `/** ... */` doc comments) are
//! skipped before a token is yielded.

use crate::config::compile_time::lexical::*;
use crate::lexical::LexerError;
use crate::tokens::{SpannedToken, Token, TokenKind, TokenSource};
use crate::utils::{Position, Span, Spanned};

pub struct Scanner<'a> {
    source: &'a str,
    position: Position,
    token_count: usize,
    comment_count: usize,
    max_comment_length: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: Position::start(),
            token_count: 0,
            comment_count: 0,
            max_comment_length: 0,
        }
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn comment_count(&self) -> usize {
        self.comment_count
    }

    pub fn max_comment_length(&self) -> usize {
        self.max_comment_length
    }

    fn rest(&self) -> &'a str {
        &self.source[self.position.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position = self.position.advance(ch);
        Some(ch)
    }

    fn skip_trivia(&mut self) -> Result<(), LexerError> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(ch), _) if ch.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => self.skip_line_comment()?,
                (Some('/'), Some('*')) => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_line_comment(&mut self) -> Result<(), LexerError> {
        let start = self.position;
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
        self.record_comment(self.position.offset - start.offset)
    }

    fn skip_block_comment(&mut self) -> Result<(), LexerError> {
        let start = self.position;
        self.bump();
        self.bump();
        loop {
            match (self.peek(), self.peek_second()) {
                (Some('*'), Some('/')) => {
                    self.bump();
                    self.bump();
                    return self.record_comment(self.position.offset - start.offset);
                }
                (Some(_), _) => {
                    self.bump();
                }
                (None, _) => {
                    return Err(LexerError::UnterminatedComment {
                        line: start.line,
                        column: start.column,
                    })
                }
            }
        }
    }

    fn record_comment(&mut self, length: usize) -> Result<(), LexerError> {
        if length > MAX_COMMENT_LENGTH {
            return Err(LexerError::CommentTooLong { length });
        }
        self.comment_count += 1;
        self.max_comment_length = self.max_comment_length.max(length);
        Ok(())
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.position.offset;
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.bump();
        }
        &self.source[start..self.position.offset]
    }

    fn scan_number(&mut self, start: Position) -> Result<Token, LexerError> {
        let digits = self.take_while(|ch| ch.is_ascii_digit());
        if self.peek().map(is_identifier_body).unwrap_or(false) {
            let tail = self.take_while(is_identifier_body);
            return Err(LexerError::InvalidNumber {
                text: format!("{}{}", digits, tail),
                line: start.line,
                column: start.column,
            });
        }

        match digits.parse::<u32>() {
            Ok(value) if value <= MAX_INTEGER_VALUE => {
                Ok(Token::new(TokenKind::IntegerConstant, digits))
            }
            _ => Err(LexerError::InvalidNumber {
                text: digits.to_string(),
                line: start.line,
                column: start.column,
            }),
        }
    }

    fn scan_string(&mut self, start: Position) -> Result<Token, LexerError> {
        self.bump();
        let contents = self.take_while(|ch| ch != '"' && ch != '\n');
        if self.peek() != Some('"') {
            return Err(LexerError::UnterminatedString {
                line: start.line,
                column: start.column,
            });
        }
        self.bump();

        if contents.len() > MAX_STRING_SIZE {
            return Err(LexerError::StringTooLarge {
                size: contents.len(),
            });
        }
        Ok(Token::new(TokenKind::StringConstant, contents))
    }

    fn scan_word(&mut self) -> Result<Token, LexerError> {
        let word = self.take_while(is_identifier_body);
        if word.len() > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong { length: word.len() });
        }
        Ok(match TokenKind::keyword(word) {
            Some(kind) => Token::new(kind, word),
            None => Token::new(TokenKind::Identifier, word),
        })
    }

    fn scan_token(&mut self, start: Position, ch: char) -> Result<Token, LexerError> {
        if let Some(kind) = TokenKind::symbol(ch) {
            self.bump();
            return Ok(Token::fixed(kind));
        }
        match ch {
            '0'..='9' => self.scan_number(start),
            '"' => self.scan_string(start),
            ch if is_identifier_start(ch) => self.scan_word(),
            character => Err(LexerError::InvalidCharacter {
                character,
                line: start.line,
                column: start.column,
            }),
        }
    }
}

impl TokenSource for Scanner<'_> {
    fn next_token(&mut self) -> Result<SpannedToken, LexerError> {
        self.skip_trivia()?;

        let start = self.position;
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Ok(Spanned::new(Token::eof(), Span::single(start))),
        };

        if self.token_count >= MAX_TOKEN_COUNT {
            return Err(LexerError::TooManyTokens {
                count: self.token_count,
            });
        }

        let token = self.scan_token(start, ch)?;
        self.token_count += 1;
        Ok(Spanned::new(token, Span::new(start, self.position)))
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_body(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn scan_all(source: &str) -> Result<Vec<Token>, LexerError> {
        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = scanner.next_token()?.value;
            if token.is_eof() {
                return Ok(tokens);
            }
            tokens.push(token);
        }
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan_all(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_scan_class_header() {
        assert_eq!(
            kinds("class Main {"),
            vec![TokenKind::Class, TokenKind::Identifier, TokenKind::LBrace]
        );
    }

    #[test]
    fn test_scan_symbols_without_spaces() {
        assert_eq!(
            kinds("a[i]=~(x+1);"),
            vec![
                TokenKind::Identifier,
                TokenKind::LBracket,
                TokenKind::Identifier,
                TokenKind::RBracket,
                TokenKind::Equals,
                TokenKind::Tilde,
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::Plus,
                TokenKind::IntegerConstant,
                TokenKind::RParen,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_skip_comments() {
        let source = "// line\n/** doc\n * block */ let /* inline */ x";
        assert_eq!(kinds(source), vec![TokenKind::Let, TokenKind::Identifier]);

        let mut scanner = Scanner::new(source);
        while !scanner.next_token().unwrap().value.is_eof() {}
        assert_eq!(scanner.comment_count(), 3);
    }

    #[test]
    fn test_division_is_not_a_comment() {
        assert_eq!(
            kinds("a / b"),
            vec![TokenKind::Identifier, TokenKind::Slash, TokenKind::Identifier]
        );
    }

    #[test]
    fn test_string_constant() {
        let tokens = scan_all("\"hello world\"").unwrap();
        assert_eq!(tokens, vec![Token::new(TokenKind::StringConstant, "hello world")]);
    }

    #[test]
    fn test_unterminated_string() {
        assert_matches!(
            scan_all("let s = \"abc\n\";"),
            Err(LexerError::UnterminatedString { line: 1, column: 9 })
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_matches!(
            scan_all("let /* never closed"),
            Err(LexerError::UnterminatedComment { line: 1, column: 5 })
        );
    }

    #[test]
    fn test_integer_range() {
        assert_eq!(
            scan_all("32767").unwrap(),
            vec![Token::new(TokenKind::IntegerConstant, "32767")]
        );
        assert_matches!(scan_all("32768"), Err(LexerError::InvalidNumber { .. }));
        assert_matches!(
            scan_all("12abc"),
            Err(LexerError::InvalidNumber { ref text, .. }) if text == "12abc"
        );
    }

    #[test]
    fn test_invalid_character() {
        assert_matches!(
            scan_all("let x = #;"),
            Err(LexerError::InvalidCharacter { character: '#', line: 1, column: 9 })
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = scan_all("this _that while2").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::This);
        assert_eq!(tokens[1], Token::new(TokenKind::Identifier, "_that"));
        assert_eq!(tokens[2], Token::new(TokenKind::Identifier, "while2"));
    }

    #[test]
    fn test_spans_track_lines() {
        let mut scanner = Scanner::new("class\n  Foo");
        scanner.next_token().unwrap();
        let name = scanner.next_token().unwrap();
        assert_eq!(name.span.start.line, 2);
        assert_eq!(name.span.start.column, 3);
        assert_eq!(name.span.len(), 3);
    }

    #[test]
    fn test_eof_is_repeated() {
        let mut scanner = Scanner::new("  ");
        assert!(scanner.next_token().unwrap().value.is_eof());
        assert!(scanner.next_token().unwrap().value.is_eof());
        assert_eq!(scanner.token_count(), 0);
    }
}
