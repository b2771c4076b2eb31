//! Translation table from part tokens to formatted decimal strings.
//!
//! When the solver determines a variable `v` completely, the constant's
//! real and imaginary parts are stored under the tokens `v#r` and `v#i`.
//! The text-substitution pass looks tokens up here; a miss means the
//! source token passes through untouched.
//!
//! Lookups also accept the MetaPost-flavoured spellings `v#x` and `v#y`
//! for the same two parts.

use std::collections::HashMap;

use crate::complex::{Complex, snap};

/// Default number of fractional digits in formatted values.
const DEFAULT_PRECISION: usize = 4;

/// Map from part token (`v#r`, `v#i`) to formatted decimal string.
///
/// Grows monotonically; entries are only ever overwritten with the same
/// value when an equation re-derives a known constant.
#[derive(Debug, Default)]
pub struct Translations {
    entries: HashMap<String, String>,
    precision: usize,
}

impl Translations {
    /// Empty table with the default four fractional digits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_precision(DEFAULT_PRECISION)
    }

    /// Empty table with a custom fractional-digit count.
    #[must_use]
    pub fn with_precision(precision: usize) -> Self {
        Self {
            entries: HashMap::new(),
            precision,
        }
    }

    /// Record the parts of a fully-determined variable.
    pub fn record(&mut self, name: &str, value: Complex) {
        self.entries
            .insert(format!("{name}#r"), self.format(value.re));
        self.entries
            .insert(format!("{name}#i"), self.format(value.im));
    }

    /// Look up a part token, accepting both `r`/`i` and `x`/`y` spellings.
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<&str> {
        let (name, part) = token.rsplit_once('#')?;
        let part = match part {
            "r" | "x" => 'r',
            "i" | "y" => 'i',
            _ => return None,
        };
        self.entries
            .get(&format!("{name}#{part}"))
            .map(String::as_str)
    }

    /// Number of stored tokens (two per solved variable).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no variable has been solved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Locale-independent fixed-point form of a snapped part.
    fn format(&self, part: f64) -> String {
        format!("{:.*}", self.precision, snap(part))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_stores_both_parts() {
        let mut table = Translations::new();
        table.record("z1", Complex::new(0.2, -1.0));
        assert_eq!(table.lookup("z1#r"), Some("0.2000"));
        assert_eq!(table.lookup("z1#i"), Some("-1.0000"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn metapost_spellings_resolve() {
        let mut table = Translations::new();
        table.record("p", Complex::new(1.0, 2.0));
        assert_eq!(table.lookup("p#x"), Some("1.0000"));
        assert_eq!(table.lookup("p#y"), Some("2.0000"));
    }

    #[test]
    fn near_zero_parts_snap_to_plain_zero() {
        let mut table = Translations::new();
        table.record("v", Complex::new(-1e-9, 1e-9));
        assert_eq!(table.lookup("v#r"), Some("0.0000"));
        assert_eq!(table.lookup("v#i"), Some("0.0000"));
    }

    #[test]
    fn miss_returns_none() {
        let table = Translations::new();
        assert!(table.lookup("v#r").is_none());
        assert!(table.lookup("no-hash").is_none());
        assert!(table.lookup("v#q").is_none());
    }

    #[test]
    fn custom_precision() {
        let mut table = Translations::with_precision(2);
        table.record("v", Complex::new(0.875, 0.0));
        assert_eq!(table.lookup("v#r"), Some("0.88"));
    }
}
