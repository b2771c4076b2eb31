//! Incremental linear-equation solver.
//!
//! The solver keeps a global environment mapping variable names to
//! either a defining polynomial (a *dependent* variable) or a built-in
//! function. Each new equation `P = 0` elects one variable as pivot,
//! rewrites it as a polynomial `Q` over the remaining variables, and
//! substitutes `Q` through every existing definition. The environment is
//! therefore always a fully-reduced substitution closure: right-hand
//! sides mention only *independent* variables, and no recursive lookup
//! is ever needed.
//!
//! Variables whose definition collapses to a constant are reported to
//! the translation table, which is what the text-substitution pass
//! reads.
//!
//! # Invariants after every successful [`SolverState::solve`]
//!
//! - The pivot appears on no right-hand side and exactly once as a key.
//! - `vars(R)` for every dependent definition `R` is a subset of the
//!   independent set.
//! - Function entries are never rewritten.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use log::debug;

use crate::complex::{Builtin, Complex, I, ONE, is_zero};
use crate::error::{ErrorKind, LineqError, LineqResult};
use crate::poly::Poly;
use crate::translate::Translations;

// ---------------------------------------------------------------------------
// Environment entries
// ---------------------------------------------------------------------------

/// What a known name stands for.
#[derive(Debug, Clone)]
pub enum Binding {
    /// A dependent variable defined by a polynomial over independent
    /// variables.
    Poly(Poly),
    /// A built-in pure function.
    Fun(Builtin),
}

// ---------------------------------------------------------------------------
// Solver state
// ---------------------------------------------------------------------------

/// The environment, translation table, and anonymous-name counter.
///
/// One value of this type is threaded through the expression evaluator;
/// there are no process-global singletons. The only mutation sites are
/// [`SolverState::solve`] (environment) and the translation-table
/// recording it performs.
#[derive(Debug)]
pub struct SolverState {
    env: BTreeMap<String, Binding>,
    translations: Translations,
    next_anonymous: u32,
}

impl SolverState {
    /// Fresh state seeded with `i`, `pi`, and the built-in functions.
    #[must_use]
    pub fn new() -> Self {
        let mut env = BTreeMap::new();
        env.insert("i".to_owned(), Binding::Poly(Poly::number(I)));
        env.insert(
            "pi".to_owned(),
            Binding::Poly(Poly::number(Complex::new(PI, 0.0))),
        );
        for builtin in Builtin::ALL {
            env.insert(builtin.name().to_owned(), Binding::Fun(builtin));
        }
        Self {
            env,
            translations: Translations::new(),
            next_anonymous: 0,
        }
    }

    /// The binding for `name`, if any.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.env.get(name)
    }

    /// Whether `name` is a dependent variable.
    #[must_use]
    pub fn is_dependent(&self, name: &str) -> bool {
        matches!(self.env.get(name), Some(Binding::Poly(_)))
    }

    /// All dependent variables and their definitions.
    pub fn dependents(&self) -> impl Iterator<Item = (&str, &Poly)> {
        self.env.iter().filter_map(|(name, binding)| match binding {
            Binding::Poly(p) => Some((name.as_str(), p)),
            Binding::Fun(_) => None,
        })
    }

    /// The constant value of `name`, if it is fully determined.
    #[must_use]
    pub fn known_value(&self, name: &str) -> Option<Complex> {
        match self.env.get(name)? {
            Binding::Poly(p) => p.as_number(),
            Binding::Fun(_) => None,
        }
    }

    /// The translation table populated so far.
    #[must_use]
    pub const fn translations(&self) -> &Translations {
        &self.translations
    }

    /// Mint a fresh anonymous variable name.
    ///
    /// Generated names start with a digit, so they can never collide
    /// with parser identifiers. The counter is never recycled.
    pub fn fresh_anonymous(&mut self) -> String {
        let name = format!("{}z", self.next_anonymous);
        self.next_anonymous += 1;
        name
    }

    /// Substitute every dependent variable of `p` by its definition.
    ///
    /// One pass is complete: definitions mention only independent
    /// variables, so a substitution can never introduce another
    /// dependent name.
    #[must_use]
    pub fn reduce(&self, p: Poly) -> Poly {
        let dependents: Vec<String> = p
            .vars()
            .filter(|v| self.is_dependent(v))
            .map(str::to_owned)
            .collect();
        let mut reduced = p;
        for name in dependents {
            if let Some(Binding::Poly(def)) = self.env.get(&name) {
                reduced = reduced.subst(&name, def);
            }
        }
        reduced.simplify()
    }

    /// Ingest the equation `p = 0`.
    ///
    /// Fails with [`ErrorKind::RedundantEquation`] when `p` reduces to
    /// zero and [`ErrorKind::InconsistentEquation`] when it reduces to a
    /// non-zero constant. On success one more variable has become
    /// dependent, and any definitions that collapsed to constants have
    /// been recorded in the translation table.
    pub fn solve(&mut self, p: Poly) -> LineqResult<()> {
        let p = self.reduce(p);

        if let Some(c) = p.as_number() {
            return Err(if is_zero(c) {
                LineqError::new(ErrorKind::RedundantEquation, "equation is redundant")
            } else {
                LineqError::new(
                    ErrorKind::InconsistentEquation,
                    format!(
                        "inconsistent equation: {} = 0",
                        crate::complex::display(c)
                    ),
                )
            });
        }

        let Some((pivot, k)) = p.pivot() else {
            return Err(LineqError::new(
                ErrorKind::Internal,
                "non-constant polynomial has no pivot term",
            ));
        };
        let pivot = pivot.to_owned();
        let q = p.without(&pivot).scale(-ONE / k);

        // Eliminate the pivot from every existing definition.
        let stale: Vec<String> = self
            .env
            .iter()
            .filter_map(|(name, binding)| match binding {
                Binding::Poly(r) if r.contains(&pivot) => Some(name.clone()),
                _ => None,
            })
            .collect();
        for name in stale {
            let Some(Binding::Poly(r)) = self.env.get(&name) else {
                continue;
            };
            let rewritten = r.subst(&pivot, &q);
            debug!("{name} is {rewritten}");
            if let Some(c) = rewritten.as_number() {
                self.translations.record(&name, c);
            }
            self.env.insert(name, Binding::Poly(rewritten));
        }

        debug!("{pivot} is {q}");
        if let Some(c) = q.as_number() {
            self.translations.record(&pivot, c);
        }
        self.env.insert(pivot, Binding::Poly(q));
        Ok(())
    }
}

impl Default for SolverState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
