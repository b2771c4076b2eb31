//! Complex scalar arithmetic with tolerance-based predicates.
//!
//! Coefficients and constants in the equation system are complex numbers.
//! The field operations come from [`num_complex::Complex64`]; this module
//! adds the absolute-tolerance predicates the solver depends on, the
//! display format used by the debug trace, and the built-in functions
//! available in equation blocks.
//!
//! All comparisons use the absolute tolerance [`TOLERANCE`]. It is the
//! same constant that decides whether an equation is redundant and
//! whether a coefficient is dead, so changing it changes which systems
//! are solvable.

use std::fmt::Write as _;

use num_complex::Complex64;

use crate::error::{ErrorKind, LineqError, LineqResult};

/// The complex scalar type used throughout the solver.
pub type Complex = Complex64;

/// Absolute tolerance for zero and equality tests.
pub const TOLERANCE: f64 = 1e-6;

/// The additive identity.
pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

/// The multiplicative identity.
pub const ONE: Complex = Complex { re: 1.0, im: 0.0 };

/// The imaginary unit.
pub const I: Complex = Complex { re: 0.0, im: 1.0 };

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Whether both parts of `z` are below tolerance.
#[must_use]
pub fn is_zero(z: Complex) -> bool {
    z.re.abs() < TOLERANCE && z.im.abs() < TOLERANCE
}

/// Whether `z` is one under tolerance.
#[must_use]
pub fn is_one(z: Complex) -> bool {
    (z.re - 1.0).abs() < TOLERANCE && z.im.abs() < TOLERANCE
}

/// Tolerance-based equality.
#[must_use]
pub fn approx_eq(a: Complex, b: Complex) -> bool {
    is_zero(a - b)
}

/// Pivot-selection score: the larger of the two part magnitudes.
#[must_use]
pub fn mag(z: Complex) -> f64 {
    z.re.abs().max(z.im.abs())
}

/// Snap a real value to exactly zero when it is below tolerance.
#[must_use]
pub fn snap(x: f64) -> f64 {
    if x.abs() < TOLERANCE { 0.0 } else { x }
}

// ---------------------------------------------------------------------------
// Checked operations
// ---------------------------------------------------------------------------

/// Divide `a` by `b`, failing when the divisor is zero under tolerance.
pub fn div(a: Complex, b: Complex) -> LineqResult<Complex> {
    if is_zero(b) {
        return Err(LineqError::new(ErrorKind::DivByZero, "division by zero"));
    }
    Ok(a / b)
}

/// Raise `base` to `exponent`.
///
/// The exponent must have a zero imaginary part under tolerance. The
/// result uses the principal branch: `exp(log(base) * exponent)`.
pub fn pow(base: Complex, exponent: Complex) -> LineqResult<Complex> {
    if exponent.im.abs() >= TOLERANCE {
        return Err(LineqError::new(
            ErrorKind::Domain,
            "exponent must be a real number",
        ));
    }
    Ok((base.ln() * exponent).exp())
}

// ---------------------------------------------------------------------------
// Built-in functions
// ---------------------------------------------------------------------------

/// A built-in pure function usable in equation blocks.
///
/// Stored in the environment as a tagged variant and resolved at
/// application time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Abs,
    Exp,
    Log,
    Cos,
    Sin,
    Rad,
    Deg,
}

impl Builtin {
    /// All built-ins, in the order they are seeded into the environment.
    pub const ALL: [Self; 7] = [
        Self::Abs,
        Self::Exp,
        Self::Log,
        Self::Cos,
        Self::Sin,
        Self::Rad,
        Self::Deg,
    ];

    /// The identifier this built-in is bound to.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Cos => "cos",
            Self::Sin => "sin",
            Self::Rad => "rad",
            Self::Deg => "deg",
        }
    }

    /// Apply the function to a constant.
    ///
    /// `rad` and `deg` fail on input with a non-zero imaginary part;
    /// everything else is total over the complex plane.
    pub fn apply(self, z: Complex) -> LineqResult<Complex> {
        match self {
            Self::Abs => Ok(Complex::new(z.norm(), 0.0)),
            Self::Exp => Ok(z.exp()),
            Self::Log => Ok(z.ln()),
            Self::Cos => Ok(z.cos()),
            Self::Sin => Ok(z.sin()),
            Self::Rad => Ok(Complex::new(real_only(self, z)?.to_radians(), 0.0)),
            Self::Deg => Ok(Complex::new(real_only(self, z)?.to_degrees(), 0.0)),
        }
    }
}

/// Extract the real part of `z`, failing when the imaginary part is
/// non-zero under tolerance.
fn real_only(fun: Builtin, z: Complex) -> LineqResult<f64> {
    if z.im.abs() >= TOLERANCE {
        return Err(LineqError::new(
            ErrorKind::Domain,
            format!("{} requires a real argument", fun.name()),
        ));
    }
    Ok(z.re)
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Render `z` for trace output.
///
/// Both parts are snapped before the rules below are tried in order:
/// a real value prints bare, a pure-imaginary value prints as `i` or
/// `{i}*i`, and mixed values print as a sum.
#[must_use]
pub fn display(z: Complex) -> String {
    let re = snap(z.re);
    let im = snap(z.im);

    let mut s = String::new();
    if im == 0.0 {
        let _ = write!(s, "{re}");
    } else if re == 0.0 {
        if (im - 1.0).abs() < TOLERANCE {
            s.push('i');
        } else {
            let _ = write!(s, "{im}*i");
        }
    } else if (im + 1.0).abs() < TOLERANCE {
        let _ = write!(s, "{re} - i");
    } else if (im - 1.0).abs() < TOLERANCE {
        let _ = write!(s, "{re} + i");
    } else {
        let _ = write!(s, "{re} + {im}*i");
    }
    s
}

/// Whether `z` renders as a sum (both parts non-zero under tolerance).
///
/// Sum-shaped coefficients are parenthesised in polynomial output.
#[must_use]
pub fn is_sum_shaped(z: Complex) -> bool {
    snap(z.re) != 0.0 && snap(z.im) != 0.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
