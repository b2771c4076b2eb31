//! Property tests for the solver's universal invariants.

use lineqpp_core::complex::{Complex, snap};
use lineqpp_core::poly::Poly;
use lineqpp_core::solver::SolverState;
use proptest::prelude::*;

/// Variable pool for generated equations.
const NAMES: [&str; 4] = ["a", "b", "c", "d"];

/// `coeff * name` as a polynomial.
fn term(name: &str, coeff: Complex) -> Poly {
    Poly::variable(name).scale(coeff)
}

fn real(x: f64) -> Complex {
    Complex::new(x, 0.0)
}

/// A generated linear equation `sum of terms + constant = 0` over the
/// fixed name pool.
fn arb_equation() -> impl Strategy<Value = Poly> {
    (
        prop::collection::vec((0usize..NAMES.len(), -5i32..=5, -5i32..=5), 0..4),
        -5i32..=5,
        -5i32..=5,
    )
        .prop_map(|(terms, cre, cim)| {
            let mut p = Poly::number(Complex::new(f64::from(cre), f64::from(cim)));
            for (idx, re, im) in terms {
                p = p.add(&term(
                    NAMES[idx],
                    Complex::new(f64::from(re), f64::from(im)),
                ));
            }
            p
        })
}

proptest! {
    /// After any sequence of successful solves, no dependent name
    /// appears on any right-hand side.
    #[test]
    fn substitution_closure(equations in prop::collection::vec(arb_equation(), 1..8)) {
        let mut state = SolverState::new();
        for eq in equations {
            // Redundant and inconsistent equations are rejected without
            // touching the environment; only successful solves matter.
            let _ = state.solve(eq);
        }
        for (name, def) in state.dependents() {
            for var in def.vars() {
                prop_assert!(
                    !state.is_dependent(var),
                    "dependent {var} appears in the definition of {name}"
                );
            }
        }
    }

    /// Simplification is exactly idempotent, not merely tolerant.
    #[test]
    fn simplify_idempotent(
        p in arb_equation(),
        tiny_re in -1e-7..1e-7f64,
        tiny_im in -1e-7..1e-7f64,
    ) {
        let noisy = p.add(&term("a", Complex::new(tiny_re, tiny_im)));
        let once = noisy.clone().simplify();
        prop_assert_eq!(once.clone().simplify(), once);
    }

    /// A uniquely solvable pair of equations gives the same constants
    /// in either order.
    #[test]
    fn independent_equations_commute(
        a in -5i32..=5, b in -5i32..=5, c in -5i32..=5,
        d in -5i32..=5, e in -5i32..=5, f in -5i32..=5,
    ) {
        prop_assume!(a * e - b * d != 0);

        let eq1 = || {
            term("x", real(f64::from(a)))
                .add(&term("y", real(f64::from(b))))
                .sub(&Poly::number(real(f64::from(c))))
        };
        let eq2 = || {
            term("x", real(f64::from(d)))
                .add(&term("y", real(f64::from(e))))
                .sub(&Poly::number(real(f64::from(f))))
        };

        let mut forward = SolverState::new();
        forward.solve(eq1()).expect("first equation solves");
        forward.solve(eq2()).expect("second equation solves");

        let mut backward = SolverState::new();
        backward.solve(eq2()).expect("second equation solves");
        backward.solve(eq1()).expect("first equation solves");

        for name in ["x", "y"] {
            let fwd = forward.known_value(name).expect("determined");
            let bwd = backward.known_value(name).expect("determined");
            prop_assert!((fwd - bwd).norm() < 1e-6, "{name}: {fwd} vs {bwd}");
            let ref_key = format!("{}#r", name);
            prop_assert!(forward.translations().lookup(&ref_key).is_some());
            prop_assert!(backward.translations().lookup(&ref_key).is_some());
        }
    }

    /// Exactly one variable of a fresh equation becomes dependent, and
    /// it vanishes from every right-hand side.
    #[test]
    fn pivot_preservation(
        coeffs in prop::collection::vec((1i32..=5, -5i32..=5), 2..=4),
        k in -5i32..=5,
    ) {
        let mut state = SolverState::new();
        let mut p = Poly::number(real(f64::from(k)));
        for (idx, (re, im)) in coeffs.iter().enumerate() {
            p = p.add(&term(NAMES[idx], Complex::new(f64::from(*re), f64::from(*im))));
        }
        let vars: Vec<&str> = NAMES.iter().copied().take(coeffs.len()).collect();
        state.solve(p).expect("equation solves");

        let dependent: Vec<&str> = vars
            .iter()
            .copied()
            .filter(|v| state.is_dependent(v))
            .collect();
        prop_assert_eq!(dependent.len(), 1, "exactly one pivot: {:?}", dependent);

        let pivot = dependent[0];
        for (name, def) in state.dependents() {
            prop_assert!(
                !def.contains(pivot),
                "pivot {pivot} survives in the definition of {name}"
            );
        }
    }

    /// Setting `v = k` populates both part tokens with `k`'s parts.
    #[test]
    fn constant_round_trip(re in -400i32..=400, im in -400i32..=400) {
        let k = Complex::new(f64::from(re) / 4.0, f64::from(im) / 4.0);
        let mut state = SolverState::new();
        state
            .solve(Poly::variable("v").sub(&Poly::number(k)))
            .expect("constant equation solves");

        let expect_re = format!("{:.4}", snap(k.re));
        let expect_im = format!("{:.4}", snap(k.im));
        prop_assert_eq!(state.translations().lookup("v#r"), Some(expect_re.as_str()));
        prop_assert_eq!(state.translations().lookup("v#i"), Some(expect_im.as_str()));
    }
}
