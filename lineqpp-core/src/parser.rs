//! Recursive-descent parser for equation blocks.
//!
//! Grammar (lowest precedence first; `+ -` and `* /` associate left,
//! `^` right, unary `-` binds between `* /` and `^`):
//!
//! ```text
//! start ::= (cmds (';')?)?
//! cmds  ::= eqns (';' eqns)*
//! eqns  ::= exp ('=' exp)+
//! exp   ::= prim | ID prim | exp op exp | '-' exp
//! prim  ::= NUM | ID | '?' | '(' exp ')' | prim '[' exp ',' exp ']'
//! ```
//!
//! There is no syntax tree. Each production fires the matching
//! [`Evaluator`] builder as it reduces, so the expression stack is the
//! only intermediate state. Errors coming back from the evaluator are
//! tagged with the line and lexeme of the operator token that
//! triggered them.

use crate::error::{ErrorKind, LineqError, LineqResult};
use crate::eval::Evaluator;
use crate::token::{Token, TokenKind};

/// Parser over a scanned token list.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser. `tokens` must end with `Eof`.
    #[must_use]
    pub const fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse the whole block, feeding `eval` as statements reduce.
    pub fn parse(&mut self, eval: &mut Evaluator) -> LineqResult<()> {
        if self.peek().is_eof() {
            return Ok(());
        }
        loop {
            self.equation_chain(eval)?;
            eval.mk_cmd();
            if matches!(self.peek(), TokenKind::Semicolon) {
                self.advance();
            } else if !self.peek().is_eof() {
                return Err(self.unexpected("expected `;` or end of equations"));
            }
            if self.peek().is_eof() {
                return Ok(());
            }
        }
    }

    // -- statements --

    /// `exp ('=' exp)+` — at least one `=` is required.
    fn equation_chain(&mut self, eval: &mut Evaluator) -> LineqResult<()> {
        self.expression(eval)?;
        if !matches!(self.peek(), TokenKind::Equals) {
            return Err(self.unexpected("expected `=`"));
        }
        while matches!(self.peek(), TokenKind::Equals) {
            let eq = self.advance();
            self.expression(eval)?;
            Self::at(eval.mk_eq(), &eq)?;
        }
        Ok(())
    }

    // -- expressions, by precedence level --

    fn expression(&mut self, eval: &mut Evaluator) -> LineqResult<()> {
        self.additive(eval)
    }

    fn additive(&mut self, eval: &mut Evaluator) -> LineqResult<()> {
        self.multiplicative(eval)?;
        loop {
            match self.peek() {
                TokenKind::Plus => {
                    let op = self.advance();
                    self.multiplicative(eval)?;
                    Self::at(eval.mk_add(), &op)?;
                }
                TokenKind::Minus => {
                    let op = self.advance();
                    self.multiplicative(eval)?;
                    Self::at(eval.mk_sub(), &op)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn multiplicative(&mut self, eval: &mut Evaluator) -> LineqResult<()> {
        self.unary(eval)?;
        loop {
            match self.peek() {
                TokenKind::Star => {
                    let op = self.advance();
                    self.unary(eval)?;
                    Self::at(eval.mk_mul(), &op)?;
                }
                TokenKind::Slash => {
                    let op = self.advance();
                    self.unary(eval)?;
                    Self::at(eval.mk_div(), &op)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn unary(&mut self, eval: &mut Evaluator) -> LineqResult<()> {
        if matches!(self.peek(), TokenKind::Minus) {
            let op = self.advance();
            self.unary(eval)?;
            return Self::at(eval.mk_neg(), &op);
        }
        self.power(eval)
    }

    /// `^` is right-associative and binds tighter than unary `-`, so
    /// its right operand re-enters [`Self::unary`].
    fn power(&mut self, eval: &mut Evaluator) -> LineqResult<()> {
        self.application(eval)?;
        if matches!(self.peek(), TokenKind::Caret) {
            let op = self.advance();
            self.unary(eval)?;
            Self::at(eval.mk_pow(), &op)?;
        }
        Ok(())
    }

    /// `ID prim` — an identifier directly followed by a primary is a
    /// function application; the environment decides at `mk_app` time
    /// whether the identifier actually names a built-in.
    fn application(&mut self, eval: &mut Evaluator) -> LineqResult<()> {
        if let TokenKind::Ident(name) = self.peek()
            && self.peek_next().starts_primary()
        {
            let name = name.clone();
            let ident = self.advance();
            eval.mk_var(&name);
            self.primary(eval)?;
            return Self::at(eval.mk_app(), &ident);
        }
        self.primary(eval)
    }

    /// `prim` with any number of mediation suffixes.
    fn primary(&mut self, eval: &mut Evaluator) -> LineqResult<()> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(x) => eval.mk_num(x),
            TokenKind::Ident(name) => eval.mk_var(&name),
            TokenKind::Question => eval.mk_anon(),
            TokenKind::LeftParen => {
                self.expression(eval)?;
                self.expect(&TokenKind::RightParen, "expected `)`")?;
            }
            _ => {
                return Err(LineqError::new(ErrorKind::Parse, "expected an expression")
                    .with_line(token.line)
                    .with_lexeme(token.kind.to_string()));
            }
        }
        self.mediation_suffix(eval)
    }

    /// `prim '[' exp ',' exp ']'` — the value parsed so far is the
    /// mediation scale.
    fn mediation_suffix(&mut self, eval: &mut Evaluator) -> LineqResult<()> {
        while matches!(self.peek(), TokenKind::LeftBracket) {
            let bracket = self.advance();
            self.expression(eval)?;
            self.expect(&TokenKind::Comma, "expected `,`")?;
            self.expression(eval)?;
            self.expect(&TokenKind::RightBracket, "expected `]`")?;
            Self::at(eval.mk_med(), &bracket)?;
        }
        Ok(())
    }

    // -- token plumbing --

    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn peek_next(&self) -> &TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn advance(&mut self) -> Token {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .unwrap_or(Token::new(TokenKind::Eof, 0));
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> LineqResult<Token> {
        if self.peek() == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(message))
        }
    }

    fn unexpected(&self, message: &str) -> LineqError {
        let token = self.tokens.get(self.pos);
        let line = token.map_or(0, |t| t.line);
        let lexeme = token.map_or_else(String::new, |t| t.kind.to_string());
        LineqError::new(ErrorKind::Parse, message)
            .with_line(line)
            .with_lexeme(lexeme)
    }

    /// Tag an evaluator error with the position of `token` when it has
    /// no position of its own.
    fn at(result: LineqResult<()>, token: &Token) -> LineqResult<()> {
        result.map_err(|mut err| {
            if err.line.is_none() {
                err.line = Some(token.line);
            }
            if err.lexeme.is_none() {
                err.lexeme = Some(token.kind.to_string());
            }
            err
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::{Complex, approx_eq};
    use crate::scanner::Scanner;

    fn c(re: f64, im: f64) -> Complex {
        Complex::new(re, im)
    }

    /// Scan and parse `input` on a fresh evaluator.
    fn run(input: &str) -> LineqResult<Evaluator> {
        let mut eval = Evaluator::new();
        let tokens = Scanner::new(input, 1).scan_all()?;
        Parser::new(tokens).parse(&mut eval)?;
        Ok(eval)
    }

    fn value(eval: &Evaluator, name: &str) -> Complex {
        eval.state()
            .known_value(name)
            .unwrap_or_else(|| panic!("{name} should be known"))
    }

    // -- structure --

    #[test]
    fn empty_block() {
        assert!(run("").is_ok());
    }

    #[test]
    fn trailing_semicolon_optional() {
        assert!(run("x = 1").is_ok());
        assert!(run("x = 1 ;").is_ok());
    }

    #[test]
    fn statement_without_equals_fails() {
        let err = run("x + 1 ;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.lexeme.as_deref(), Some(";"));
    }

    #[test]
    fn unbalanced_paren_fails() {
        let err = run("x = (1 + 2 ;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    // -- precedence and associativity --

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let eval = run("x = 2 + 3 * 4 ;").unwrap();
        assert!(approx_eq(value(&eval, "x"), c(14.0, 0.0)));
    }

    #[test]
    fn division_associates_left() {
        let eval = run("x = 8 / 4 / 2 ;").unwrap();
        assert!(approx_eq(value(&eval, "x"), c(1.0, 0.0)));
    }

    #[test]
    fn power_associates_right() {
        let eval = run("x = 2 ^ 3 ^ 2 ;").unwrap();
        assert!(approx_eq(value(&eval, "x"), c(512.0, 0.0)));
    }

    #[test]
    fn power_binds_tighter_than_unary_minus() {
        let eval = run("x = -2 ^ 2 ;").unwrap();
        assert!(approx_eq(value(&eval, "x"), c(-4.0, 0.0)));
    }

    #[test]
    fn unary_minus_in_exponent() {
        let eval = run("x = 2 ^ -1 ;").unwrap();
        assert!(approx_eq(value(&eval, "x"), c(0.5, 0.0)));
    }

    #[test]
    fn parentheses_override() {
        let eval = run("x = (2 + 3) * 4 ;").unwrap();
        assert!(approx_eq(value(&eval, "x"), c(20.0, 0.0)));
    }

    // -- application and mediation --

    #[test]
    fn function_application() {
        let eval = run("x = abs (3 + 4 * i) ;").unwrap();
        assert!(approx_eq(value(&eval, "x"), c(5.0, 0.0)));
    }

    #[test]
    fn application_without_parens() {
        let eval = run("x = cos 0 ;").unwrap();
        assert!(approx_eq(value(&eval, "x"), c(1.0, 0.0)));
    }

    #[test]
    fn application_of_variable_fails() {
        let err = run("x = y 3 ;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotAFunction);
        assert_eq!(err.lexeme.as_deref(), Some("y"));
    }

    #[test]
    fn mediation_suffix() {
        let eval = run("m = .5[2, 4] ;").unwrap();
        assert!(approx_eq(value(&eval, "m"), c(3.0, 0.0)));
    }

    #[test]
    fn mediation_on_variable_scale() {
        // t[0, 4] = 1 forces t = .25 (real part only).
        let eval = run("t[0, 4] = 1 ;").unwrap();
        assert!(eval.state().is_dependent("t"));
    }

    // -- chains and multiple statements --

    #[test]
    fn chain_solves_both() {
        let eval = run("z1 = -z2 = .2 ;").unwrap();
        assert!(approx_eq(value(&eval, "z1"), c(0.2, 0.0)));
        assert!(approx_eq(value(&eval, "z2"), c(-0.2, 0.0)));
    }

    #[test]
    fn statements_accumulate() {
        let eval = run("x = 1 ; y = 2 ; s = x + y ;").unwrap();
        assert!(approx_eq(value(&eval, "s"), c(3.0, 0.0)));
    }

    #[test]
    fn arithmetic_error_is_positioned() {
        let err = run("x = y * z ;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NonLinear);
        assert_eq!(err.line, Some(1));
        assert_eq!(err.lexeme.as_deref(), Some("*"));
    }

    #[test]
    fn redundant_equation_is_fatal() {
        let err = run("x = 1 ; x = 1 ;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::RedundantEquation);
    }

    #[test]
    fn inconsistent_equation_is_fatal() {
        let err = run("x = 1 ; x = 2 ;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InconsistentEquation);
    }
}
