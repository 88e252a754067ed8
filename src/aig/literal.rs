//! An AIGER [`Literal`] packs a variable index and a polarity into a single integer.

use std::fmt::Display;
use std::ops::Not;

/// A variable index.
///
/// The constant signal has variable 0 by convention. Every real circuit signal
/// (input or AND gate) uses a variable `>= 1`.
pub type Var = u64;

/// A literal `2 * var + polarity`, the integer AIGER uses everywhere.
///
/// Literal 0 is the constant false, literal 1 the constant true. The low bit
/// carries the polarity (1 means negated), the remaining bits the variable.
///
/// ```rust
/// use aigio::Literal;
///
/// let x = Literal::new(3, false);
/// assert_eq!(x.raw(), 6);
/// assert_eq!(x.var(), 3);
/// assert!(!x.is_negated());
/// assert_eq!((!x).raw(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal(u64);

impl Literal {
    /// The constant false signal.
    pub const FALSE: Literal = Literal(0);
    /// The constant true signal.
    pub const TRUE: Literal = Literal(1);

    /// Builds the literal `2 * var + (negated as u64)`.
    pub const fn new(var: Var, negated: bool) -> Self {
        Literal(2 * var + negated as u64)
    }

    /// Wraps an already-encoded AIGER literal.
    pub const fn from_raw(raw: u64) -> Self {
        Literal(raw)
    }

    /// The encoded integer value, as written to AIGER files.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The variable index, discarding the polarity bit.
    pub const fn var(self) -> Var {
        self.0 >> 1
    }

    /// Whether the literal carries an inverter.
    pub const fn is_negated(self) -> bool {
        self.0 & 1 != 0
    }

    /// Whether the literal refers to the constant signal (variable 0).
    pub const fn is_constant(self) -> bool {
        self.var() == 0
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        Literal(self.0 ^ 1)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literal_codec_test() {
        for var in 0..100 {
            for negated in [false, true] {
                let lit = Literal::new(var, negated);
                assert_eq!(lit.var(), var);
                assert_eq!(lit.is_negated(), negated);
            }
        }
    }

    #[test]
    fn literal_constants_test() {
        assert_eq!(Literal::FALSE.raw(), 0);
        assert_eq!(Literal::TRUE.raw(), 1);
        assert!(Literal::FALSE.is_constant());
        assert!(Literal::TRUE.is_constant());
        assert_eq!(!Literal::FALSE, Literal::TRUE);
    }

    #[test]
    fn literal_not_test() {
        let lit = Literal::new(21, false);
        assert_eq!(!lit, Literal::new(21, true));
        assert_eq!(!!lit, lit);
    }

    #[test]
    fn literal_raw_test() {
        assert_eq!(Literal::from_raw(42).var(), 21);
        assert!(!Literal::from_raw(42).is_negated());
        assert!(Literal::from_raw(19).is_negated());
        assert_eq!(Literal::from_raw(19).to_string(), "19");
    }
}
