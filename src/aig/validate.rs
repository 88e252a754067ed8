use std::collections::HashSet;

use crate::{Aig, AigError, Literal, Result, Var};

impl Aig {
    /// Checks that the circuit is structurally well-formed:
    /// - every gate rhs references the constant, an input, or the lhs of an
    ///   earlier gate (no dangling, forward or self references),
    /// - every output references the constant, an input, or a gate lhs,
    /// - no variable index is reused across inputs and gate lhs,
    /// - no referenced variable index exceeds `num_inputs + num_ands`.
    ///
    /// Fails with [`AigError::MalformedCircuit`] on the first violation found.
    /// The check is read-only, calling it twice gives the same result.
    ///
    /// This runs automatically before every serialization.
    pub fn check(&self) -> Result<()> {
        // Variables defined so far, in gate registration order.
        // Inputs are available to every gate regardless of interleaving.
        let mut available: HashSet<Var> = self.inputs().iter().map(|lit| lit.var()).collect();

        for gate in self.ands() {
            for rhs in [gate.rhs0, gate.rhs1] {
                self.check_reference(rhs, &available)?;
            }
            available.insert(gate.lhs.var());
        }

        for &output in self.outputs() {
            if !output.is_constant() && !self.is_defined(output.var()) {
                return Err(AigError::MalformedCircuit(format!(
                    "output {} references undefined variable {}",
                    output,
                    output.var()
                )));
            }
        }

        self.check_unique_definitions()?;

        let bound = (self.inputs().len() + self.and_count()) as Var;
        if self.maxvar() > bound {
            return Err(AigError::MalformedCircuit(format!(
                "maximum variable {} exceeds the {} inputs + {} gates of the circuit",
                self.maxvar(),
                self.inputs().len(),
                self.and_count()
            )));
        }

        Ok(())
    }

    fn check_reference(&self, rhs: Literal, available: &HashSet<Var>) -> Result<()> {
        if rhs.is_constant() || available.contains(&rhs.var()) {
            return Ok(());
        }
        if self.is_defined(rhs.var()) {
            // Defined, but only by a later gate in the list.
            Err(AigError::MalformedCircuit(format!(
                "gate rhs {} references variable {} before it is defined",
                rhs,
                rhs.var()
            )))
        } else {
            Err(AigError::MalformedCircuit(format!(
                "gate rhs {} references undefined variable {}",
                rhs,
                rhs.var()
            )))
        }
    }

    /// Registration already rejects collisions, this recomputes the check
    /// from the stored sequences so that validation stands on its own.
    fn check_unique_definitions(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let definitions = self
            .inputs()
            .iter()
            .copied()
            .chain(self.ands().iter().map(|gate| gate.lhs));
        for lit in definitions {
            if !seen.insert(lit.var()) {
                return Err(AigError::MalformedCircuit(format!(
                    "variable {} is defined more than once",
                    lit.var()
                )));
            }
        }
        Ok(())
    }
}
