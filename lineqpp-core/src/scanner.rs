//! Lexical scanner for equation blocks.
//!
//! Runs over the text of one `#lineqpp` block (continuation lines are
//! joined with real newlines before scanning, so interior newlines are
//! plain whitespace here and advance the line counter). Whitespace is
//! discarded; any byte that is not part of an identifier, a numeric
//! literal, or the fixed punctuation set is a parse error.
//!
//! | Input            | Token produced          |
//! |------------------|-------------------------|
//! | `y3`, `x_pos`    | `Ident`                 |
//! | `12`, `1.5`, `.5`| `Number`                |
//! | `?`              | `Question`              |
//! | `+ - * / ^ [ , ] ( ) = ;` | one token each |

use crate::error::{ErrorKind, LineqError, LineqResult};
use crate::token::{Token, TokenKind};

/// Lexical scanner for one equation block.
pub struct Scanner {
    /// Source bytes (owned).
    src: Vec<u8>,
    /// Current byte position.
    pos: usize,
    /// Current 1-based input line.
    line: usize,
}

impl Scanner {
    /// Create a scanner over `source`, which begins on input line
    /// `start_line`.
    #[must_use]
    pub fn new(source: &str, start_line: usize) -> Self {
        Self {
            src: source.as_bytes().to_vec(),
            pos: 0,
            line: start_line,
        }
    }

    /// Scan every token through `Eof`.
    pub fn scan_all(mut self) -> LineqResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind.is_eof();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> LineqResult<Token> {
        self.skip_whitespace();

        let Some(&c) = self.src.get(self.pos) else {
            return Ok(Token::new(TokenKind::Eof, self.line));
        };

        if c.is_ascii_digit() || (c == b'.' && self.peek_digit(self.pos + 1)) {
            return Ok(self.scan_number());
        }
        if c.is_ascii_alphabetic() {
            return Ok(self.scan_identifier());
        }

        let kind = match c {
            b'?' => TokenKind::Question,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'^' => TokenKind::Caret,
            b'[' => TokenKind::LeftBracket,
            b']' => TokenKind::RightBracket,
            b'(' => TokenKind::LeftParen,
            b')' => TokenKind::RightParen,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'=' => TokenKind::Equals,
            _ => {
                return Err(LineqError::new(
                    ErrorKind::Parse,
                    "invalid character in equation",
                )
                .with_line(self.line)
                .with_lexeme(String::from_utf8_lossy(&[c]).into_owned()));
            }
        };
        self.pos += 1;
        Ok(Token::new(kind, self.line))
    }

    // -- internal helpers --

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.src.get(self.pos) {
            match c {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn peek_digit(&self, pos: usize) -> bool {
        self.src.get(pos).is_some_and(u8::is_ascii_digit)
    }

    /// Scan `123`, `1.5`, or `.5`.
    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        while self.peek_digit(self.pos) {
            self.pos += 1;
        }
        if self.src.get(self.pos) == Some(&b'.') && self.peek_digit(self.pos + 1) {
            self.pos += 1;
            while self.peek_digit(self.pos) {
                self.pos += 1;
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or("0");
        let value = text.parse::<f64>().unwrap_or(0.0);
        Token::new(TokenKind::Number(value), self.line)
    }

    /// Scan a letter followed by letters, digits, and underscores.
    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        while self
            .src
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == b'_')
        {
            self.pos += 1;
        }
        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        Token::new(TokenKind::Ident(text), self.line)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Scanner::new(input, 1)
            .scan_all()
            .expect("scan should succeed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn whitespace_discarded() {
        assert_eq!(kinds("  \t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn identifiers_include_digits() {
        assert_eq!(
            kinds("z1 y_max"),
            vec![
                TokenKind::Ident("z1".into()),
                TokenKind::Ident("y_max".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_forms() {
        assert_eq!(
            kinds("42 1.5 .5"),
            vec![
                TokenKind::Number(42.0),
                TokenKind::Number(1.5),
                TokenKind::Number(0.5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn negative_is_operator_not_literal() {
        assert_eq!(
            kinds("-3"),
            vec![TokenKind::Minus, TokenKind::Number(3.0), TokenKind::Eof]
        );
    }

    #[test]
    fn full_equation() {
        assert_eq!(
            kinds("z1 = -z2 = .2 ;"),
            vec![
                TokenKind::Ident("z1".into()),
                TokenKind::Equals,
                TokenKind::Minus,
                TokenKind::Ident("z2".into()),
                TokenKind::Equals,
                TokenKind::Number(0.2),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn mediation_and_anonymous_tokens() {
        assert_eq!(
            kinds("?[a,b]"),
            vec![
                TokenKind::Question,
                TokenKind::LeftBracket,
                TokenKind::Ident("a".into()),
                TokenKind::Comma,
                TokenKind::Ident("b".into()),
                TokenKind::RightBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn newline_advances_line_counter() {
        let tokens = Scanner::new("a\nb", 5).scan_all().unwrap();
        assert_eq!(tokens[0].line, 5);
        assert_eq!(tokens[1].line, 6);
    }

    #[test]
    fn invalid_character_is_parse_error() {
        let err = Scanner::new("a @ b", 3).scan_all().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.line, Some(3));
        assert_eq!(err.lexeme.as_deref(), Some("@"));
    }
}
