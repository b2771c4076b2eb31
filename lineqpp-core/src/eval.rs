//! Stack-machine expression evaluator.
//!
//! The parser drives this module through a small set of builder entry
//! points (`mk_num`, `mk_var`, `mk_add`, …), one call per semantic
//! action. Operands are linear polynomials, plus function descriptors
//! for the brief moment between looking a built-in up and applying it.
//!
//! `mk_eq` is where equations happen: it hands `left − right` to the
//! solver and pushes the right side back, reduced against the updated
//! environment, so a chain `a = b = c` keeps evaluating against the
//! latest dependency graph. `mk_cmd` ends a statement and clears the
//! stack.

use log::debug;

use crate::complex::Complex;
use crate::error::{ErrorKind, LineqError, LineqResult};
use crate::poly::Poly;
use crate::solver::{Binding, SolverState};

// ---------------------------------------------------------------------------
// Stack operands
// ---------------------------------------------------------------------------

/// A value on the expression stack.
#[derive(Debug, Clone)]
enum Operand {
    /// A linear polynomial.
    Poly(Poly),
    /// A built-in function awaiting its argument.
    Fun(crate::complex::Builtin),
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Expression stack plus the solver state it feeds.
#[derive(Debug, Default)]
pub struct Evaluator {
    state: SolverState,
    stack: Vec<Operand>,
}

impl Evaluator {
    /// Fresh evaluator over a freshly seeded solver state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SolverState::new(),
            stack: Vec::new(),
        }
    }

    /// The solver state (environment and translation table).
    #[must_use]
    pub const fn state(&self) -> &SolverState {
        &self.state
    }

    /// Push the constant polynomial `x + 0i`.
    pub fn mk_num(&mut self, x: f64) {
        self.stack
            .push(Operand::Poly(Poly::number(Complex::new(x, 0.0))));
    }

    /// Push the binding of `name`: its defining polynomial, a function
    /// descriptor, or the canonical bare polynomial when unknown.
    pub fn mk_var(&mut self, name: &str) {
        let operand = match self.state.lookup(name) {
            Some(Binding::Poly(p)) => Operand::Poly(p.clone()),
            Some(Binding::Fun(f)) => Operand::Fun(*f),
            None => Operand::Poly(Poly::variable(name)),
        };
        self.stack.push(operand);
    }

    /// Push a bare polynomial over a fresh anonymous variable.
    pub fn mk_anon(&mut self) {
        let name = self.state.fresh_anonymous();
        self.stack.push(Operand::Poly(Poly::variable(name)));
    }

    /// Apply a built-in: pops the argument, then the function.
    pub fn mk_app(&mut self) -> LineqResult<()> {
        let argument = self.pop_poly()?;
        let function = match self.pop()? {
            Operand::Fun(f) => f,
            Operand::Poly(_) => {
                return Err(LineqError::new(
                    ErrorKind::NotAFunction,
                    "identifier in function position is not a built-in",
                ));
            }
        };
        let Some(value) = argument.as_number() else {
            return Err(LineqError::new(
                ErrorKind::NonConstantArg,
                format!("argument of {} is not constant", function.name()),
            ));
        };
        self.stack
            .push(Operand::Poly(Poly::number(function.apply(value)?)));
        Ok(())
    }

    /// Mediation `t[a, b] = a + re(t)·(b − a)`; pops `b`, `a`, `t`.
    pub fn mk_med(&mut self) -> LineqResult<()> {
        let right = self.pop_poly()?;
        let left = self.pop_poly()?;
        let scale = self.pop_poly()?;
        let span = right.sub(&left);
        let scaled = scale.real_part().mul(&span)?;
        self.stack.push(Operand::Poly(left.add(&scaled)));
        Ok(())
    }

    /// Binary sum.
    pub fn mk_add(&mut self) -> LineqResult<()> {
        let (left, right) = self.pop_pair()?;
        self.stack.push(Operand::Poly(left.add(&right)));
        Ok(())
    }

    /// Binary difference.
    pub fn mk_sub(&mut self) -> LineqResult<()> {
        let (left, right) = self.pop_pair()?;
        self.stack.push(Operand::Poly(left.sub(&right)));
        Ok(())
    }

    /// Binary product; fails unless one operand is constant.
    pub fn mk_mul(&mut self) -> LineqResult<()> {
        let (left, right) = self.pop_pair()?;
        self.stack.push(Operand::Poly(left.mul(&right)?));
        Ok(())
    }

    /// Binary quotient; fails unless the divisor is a non-zero constant.
    pub fn mk_div(&mut self) -> LineqResult<()> {
        let (left, right) = self.pop_pair()?;
        self.stack.push(Operand::Poly(left.div(&right)?));
        Ok(())
    }

    /// Unary negation.
    pub fn mk_neg(&mut self) -> LineqResult<()> {
        let operand = self.pop_poly()?;
        self.stack.push(Operand::Poly(operand.neg()));
        Ok(())
    }

    /// Exponentiation; fails unless both operands are constants.
    pub fn mk_pow(&mut self) -> LineqResult<()> {
        let (left, right) = self.pop_pair()?;
        self.stack.push(Operand::Poly(left.pow(&right)?));
        Ok(())
    }

    /// Equation: pops `right`, `left`, solves `left − right = 0`, and
    /// pushes `right` reduced against the updated environment.
    pub fn mk_eq(&mut self) -> LineqResult<()> {
        let right = self.pop_poly()?;
        let left = self.pop_poly()?;
        debug!("{left} = {right}");
        self.state.solve(left.sub(&right))?;
        let reduced = self.state.reduce(right);
        self.stack.push(Operand::Poly(reduced));
        Ok(())
    }

    /// End of statement: discard whatever the statement left behind.
    pub fn mk_cmd(&mut self) {
        self.stack.clear();
    }

    /// Current stack depth (used by tests).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    // -- internal helpers --

    fn pop(&mut self) -> LineqResult<Operand> {
        self.stack.pop().ok_or_else(|| {
            LineqError::new(ErrorKind::Internal, "expression stack underflow")
        })
    }

    fn pop_poly(&mut self) -> LineqResult<Poly> {
        match self.pop()? {
            Operand::Poly(p) => Ok(p),
            Operand::Fun(f) => Err(LineqError::new(
                ErrorKind::TypeError,
                format!("built-in function {} used as a value", f.name()),
            )),
        }
    }

    fn pop_pair(&mut self) -> LineqResult<(Poly, Poly)> {
        let right = self.pop_poly()?;
        let left = self.pop_poly()?;
        Ok((left, right))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
