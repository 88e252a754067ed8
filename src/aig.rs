//! Module defining the [`Aig`] struct, as well as [`AndGate`], [`Literal`] and the error types.
//!
//! To read or write AIGER files, check [`Aig::from_file`] and [`Aig::write_file`].

mod parser;
mod validate;
mod writer;
pub mod error;
pub mod literal;

use std::collections::HashSet;

pub use error::{AigError, ParserError, Result};
pub use literal::{Literal, Var};

/// An AND gate `lhs = rhs0 & rhs1`.
///
/// `lhs` is the positive literal of the variable the gate defines. The rhs
/// literals may carry inverters (their polarity bit negates the signal before
/// the conjunction).
///
/// Equality treats the rhs pair as unordered, since AND is commutative and
/// the binary AIGER encoding canonicalizes the rhs order anyway.
#[derive(Debug, Clone, Copy, Eq)]
pub struct AndGate {
    pub lhs: Literal,
    pub rhs0: Literal,
    pub rhs1: Literal,
}

impl PartialEq for AndGate {
    fn eq(&self, other: &Self) -> bool {
        self.lhs == other.lhs
            && ((self.rhs0 == other.rhs0 && self.rhs1 == other.rhs1)
                || (self.rhs0 == other.rhs1 && self.rhs1 == other.rhs0))
    }
}

/// A whole combinational AIG.
///
/// The circuit owns an ordered sequence of inputs, an ordered sequence of
/// outputs and an ordered sequence of AND gates. Registration order is
/// significant: it defines the position of each element in the AIGER file.
/// Construction is append-only, nothing can be removed once registered.
///
/// Structural well-formedness (no dangling, forward or self references) is
/// checked by [`Aig::check`], which runs before every serialization.
///
/// ```rust
/// use aigio::{Aig, Literal};
///
/// let mut aig = Aig::new();
/// let x = Literal::new(1, false);
/// let y = Literal::new(2, false);
/// let z = Literal::new(3, false);
/// aig.add_input(x).unwrap();
/// aig.add_input(y).unwrap();
/// aig.add_and(z, x, y).unwrap();
/// aig.add_output(!z);
/// aig.check().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Aig {
    inputs: Vec<Literal>,
    outputs: Vec<Literal>,
    ands: Vec<AndGate>,
    /// Variables already defined by an input or a gate lhs.
    defined: HashSet<Var>,
    /// Largest variable index referenced so far (inputs, outputs and gates).
    maxvar: Var,
}

impl Aig {
    /// Create a brand new empty AIG.
    pub fn new() -> Self {
        Aig {
            inputs: Vec::new(),
            outputs: Vec::new(),
            ands: Vec::new(),
            defined: HashSet::new(),
            maxvar: 0,
        }
    }

    /// Registers a primary input.
    ///
    /// Only positive literals of a fresh non-zero variable denote inputs.
    ///
    /// ```rust
    /// use aigio::{Aig, Literal};
    /// let mut aig = Aig::new();
    /// aig.add_input(Literal::new(1, false)).unwrap();
    /// assert!(aig.add_input(Literal::new(2, true)).is_err()); // negated
    /// assert!(aig.add_input(Literal::new(1, false)).is_err()); // variable reuse
    /// assert!(aig.add_input(Literal::FALSE).is_err()); // reserved variable
    /// ```
    pub fn add_input(&mut self, lit: Literal) -> Result<()> {
        if lit.is_negated() {
            return Err(AigError::InvalidLiteral(
                lit,
                "inputs must be positive literals".to_string(),
            ));
        }
        if lit.var() == 0 {
            return Err(AigError::InvalidLiteral(
                lit,
                "variable 0 is reserved for the constant".to_string(),
            ));
        }
        if !self.defined.insert(lit.var()) {
            return Err(AigError::InvalidLiteral(
                lit,
                format!("variable {} is already defined", lit.var()),
            ));
        }
        self.maxvar = self.maxvar.max(lit.var());
        self.inputs.push(lit);
        Ok(())
    }

    /// Appends an output reference.
    ///
    /// Any literal is accepted here, including one whose variable is not
    /// defined yet. Definedness is checked by [`Aig::check`].
    pub fn add_output(&mut self, lit: Literal) {
        self.maxvar = self.maxvar.max(lit.var());
        self.outputs.push(lit);
    }

    /// Registers a gate `lhs = rhs0 & rhs1`.
    ///
    /// `lhs` must be the positive literal of a fresh non-zero variable. The
    /// rhs literals are not checked here: whether they reference a constant,
    /// an input or an earlier gate is the job of [`Aig::check`].
    pub fn add_and(&mut self, lhs: Literal, rhs0: Literal, rhs1: Literal) -> Result<()> {
        if lhs.is_negated() {
            return Err(AigError::InvalidGate(
                lhs,
                "gate lhs must be a positive literal".to_string(),
            ));
        }
        if lhs.var() == 0 {
            return Err(AigError::InvalidGate(
                lhs,
                "variable 0 is reserved for the constant".to_string(),
            ));
        }
        if !self.defined.insert(lhs.var()) {
            return Err(AigError::InvalidGate(
                lhs,
                format!("variable {} is already defined", lhs.var()),
            ));
        }
        self.maxvar = self.maxvar.max(lhs.var()).max(rhs0.var()).max(rhs1.var());
        self.ands.push(AndGate { lhs, rhs0, rhs1 });
        Ok(())
    }

    /// Retrieves the inputs, in registration order.
    pub fn inputs(&self) -> &[Literal] {
        &self.inputs
    }

    /// Retrieves the outputs, in registration order.
    pub fn outputs(&self) -> &[Literal] {
        &self.outputs
    }

    /// Retrieves the AND gates, in registration order.
    pub fn ands(&self) -> &[AndGate] {
        &self.ands
    }

    /// Number of registered AND gates.
    pub fn and_count(&self) -> usize {
        self.ands.len()
    }

    /// Retrieves the gate at the given position.
    pub fn and_gate(&self, index: usize) -> Result<AndGate> {
        self.ands
            .get(index)
            .copied()
            .ok_or(AigError::IndexOutOfRange {
                index,
                len: self.ands.len(),
            })
    }

    /// Largest variable index referenced anywhere in the circuit.
    pub fn maxvar(&self) -> Var {
        self.maxvar
    }

    /// The fixed literal for the constant true signal.
    pub fn constant_true(&self) -> Literal {
        Literal::TRUE
    }

    /// The fixed literal for the constant false signal.
    pub fn constant_false(&self) -> Literal {
        Literal::FALSE
    }

    pub(crate) fn is_defined(&self, var: Var) -> bool {
        self.defined.contains(&var)
    }
}

impl Default for Aig {
    fn default() -> Self {
        Aig::new()
    }
}

impl PartialEq for Aig {
    /// Compares the two AIGs. They are equal iff their input, output and
    /// gate sequences are equal (the derived fields follow).
    fn eq(&self, other: &Self) -> bool {
        self.inputs == other.inputs && self.outputs == other.outputs && self.ands == other.ands
    }
}

impl Eq for Aig {}
