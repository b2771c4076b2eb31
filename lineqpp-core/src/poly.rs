//! Linear polynomials over complex coefficients.
//!
//! A [`Poly`] is a constant term plus a map from variable name to
//! complex coefficient: `c + a₁·v₁ + a₂·v₂ + …`. This is the symbolic
//! currency of the solver; every expression in an equation block reduces
//! to one. The operation set is closed under linearity: sums, differences
//! and negation are unrestricted, while products, quotients and powers
//! require enough constant operands to keep the result linear.
//!
//! Terms live in a `BTreeMap`, so variables iterate in lexicographic
//! order. Display output and pivot tie-breaking both rely on this.
//!
//! # Normalization
//!
//! [`Poly::simplify`] drops every term whose coefficient is zero under
//! tolerance and snaps a near-zero constant to exactly zero. All
//! operations return simplified results, so a polynomial is a *number*
//! exactly when its term map is empty.

use std::collections::BTreeMap;
use std::fmt;

use crate::complex::{self, Complex, ONE, ZERO, is_one, is_sum_shaped, is_zero, mag};
use crate::error::{ErrorKind, LineqError, LineqResult};

// ---------------------------------------------------------------------------
// Polynomial
// ---------------------------------------------------------------------------

/// A linear polynomial: constant term plus named first-degree terms.
#[derive(Debug, Clone, PartialEq)]
pub struct Poly {
    constant: Complex,
    terms: BTreeMap<String, Complex>,
}

impl Poly {
    /// The constant polynomial with the given value.
    #[must_use]
    pub const fn number(value: Complex) -> Self {
        Self {
            constant: value,
            terms: BTreeMap::new(),
        }
    }

    /// The zero polynomial.
    #[must_use]
    pub const fn zero() -> Self {
        Self::number(ZERO)
    }

    /// The bare polynomial `0 + 1·name`.
    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(name.into(), ONE);
        Self {
            constant: ZERO,
            terms,
        }
    }

    /// The constant term.
    #[must_use]
    pub const fn constant(&self) -> Complex {
        self.constant
    }

    /// The coefficient of `name`, if present.
    #[must_use]
    pub fn coeff(&self, name: &str) -> Option<Complex> {
        self.terms.get(name).copied()
    }

    /// The constant value, if this polynomial is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<Complex> {
        if self.terms.is_empty() {
            Some(self.constant)
        } else {
            None
        }
    }

    /// Whether this polynomial has no variable terms.
    #[must_use]
    pub fn is_number(&self) -> bool {
        self.terms.is_empty()
    }

    /// The variable name, if this polynomial is a bare variable
    /// (zero constant, single coefficient-one term).
    #[must_use]
    pub fn as_variable(&self) -> Option<&str> {
        if !is_zero(self.constant) || self.terms.len() != 1 {
            return None;
        }
        let (name, k) = self.terms.iter().next()?;
        if is_one(*k) { Some(name) } else { None }
    }

    /// Names of the variables appearing in this polynomial.
    pub fn vars(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    /// Whether `name` appears as a term.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.terms.contains_key(name)
    }

    // -- linear arithmetic --

    /// Term-wise sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.constant += other.constant;
        for (name, k) in &other.terms {
            *result.terms.entry(name.clone()).or_insert(ZERO) += k;
        }
        result.simplify()
    }

    /// Term-wise difference.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Term-wise negation.
    #[must_use]
    pub fn neg(&self) -> Self {
        self.scale(-ONE)
    }

    /// Every term (constant included) multiplied by `k`.
    #[must_use]
    pub fn scale(&self, k: Complex) -> Self {
        let mut result = self.clone();
        result.constant *= k;
        for coeff in result.terms.values_mut() {
            *coeff *= k;
        }
        result.simplify()
    }

    /// Product. At least one operand must be a number, otherwise the
    /// result would be nonlinear.
    pub fn mul(&self, other: &Self) -> LineqResult<Self> {
        if let Some(k) = self.as_number() {
            Ok(other.scale(k))
        } else if let Some(k) = other.as_number() {
            Ok(self.scale(k))
        } else {
            Err(LineqError::new(
                ErrorKind::NonLinear,
                "product of two non-constant expressions",
            ))
        }
    }

    /// Quotient. The divisor must be a non-zero number.
    pub fn div(&self, other: &Self) -> LineqResult<Self> {
        let Some(k) = other.as_number() else {
            return Err(LineqError::new(
                ErrorKind::NonLinear,
                "division by a non-constant expression",
            ));
        };
        Ok(self.scale(complex::div(ONE, k)?))
    }

    /// Power. Both operands must be numbers.
    pub fn pow(&self, other: &Self) -> LineqResult<Self> {
        let (Some(base), Some(exponent)) = (self.as_number(), other.as_number()) else {
            return Err(LineqError::new(
                ErrorKind::NonLinear,
                "exponentiation of a non-constant expression",
            ));
        };
        Ok(Self::number(complex::pow(base, exponent)?))
    }

    /// The polynomial with all imaginary parts discarded.
    ///
    /// Mediation scales by the real part of its scale operand only.
    #[must_use]
    pub fn real_part(&self) -> Self {
        let mut result = self.clone();
        result.constant = Complex::new(result.constant.re, 0.0);
        for coeff in result.terms.values_mut() {
            *coeff = Complex::new(coeff.re, 0.0);
        }
        result.simplify()
    }

    // -- normalization and substitution --

    /// Drop dead terms and snap a near-zero constant to exactly zero.
    ///
    /// Exactly idempotent: simplifying a simplified polynomial is a
    /// no-op, not merely equal under tolerance.
    #[must_use]
    pub fn simplify(mut self) -> Self {
        self.terms.retain(|_, k| !is_zero(*k));
        if is_zero(self.constant) {
            self.constant = ZERO;
        }
        self
    }

    /// Substitute `replacement` for the variable `name`.
    ///
    /// Returns `self` unchanged when `name` is absent; otherwise removes
    /// the term and folds in `coefficient · replacement`.
    #[must_use]
    pub fn subst(&self, name: &str, replacement: &Self) -> Self {
        let Some(k) = self.coeff(name) else {
            return self.clone();
        };
        let mut rest = self.clone();
        rest.terms.remove(name);
        rest.add(&replacement.scale(k))
    }

    /// The copy of `self` with the `name` term removed.
    #[must_use]
    pub fn without(&self, name: &str) -> Self {
        let mut result = self.clone();
        result.terms.remove(name);
        result
    }

    /// Elect the pivot term: maximum coefficient magnitude, ties broken
    /// by lexicographically smallest name.
    #[must_use]
    pub fn pivot(&self) -> Option<(&str, Complex)> {
        let mut best: Option<(&str, Complex)> = None;
        for (name, k) in &self.terms {
            match best {
                Some((_, b)) if mag(*k) <= mag(b) => {}
                _ => best = Some((name, *k)),
            }
        }
        best
    }
}

impl fmt::Display for Poly {
    /// Terms in lexicographic variable order, joined with ` + `.
    /// Coefficient-one terms print bare; sum-shaped coefficients are
    /// parenthesised.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "{}", complex::display(self.constant));
        }

        let mut first = true;
        if !is_zero(self.constant) {
            write!(f, "{}", complex::display(self.constant))?;
            first = false;
        }
        for (name, k) in &self.terms {
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            if is_one(*k) {
                write!(f, "{name}")?;
            } else if is_sum_shaped(*k) {
                write!(f, "({})*{name}", complex::display(*k))?;
            } else {
                write!(f, "{}*{name}", complex::display(*k))?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
