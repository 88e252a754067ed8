use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::debug;

use crate::{Aig, AigError, Result};

/// Encodes a variable-length unsigned integer: 7 payload bits per byte,
/// least significant group first, high bit set while more bytes follow.
fn encode_delta(mut x: u64, w: &mut impl Write) -> std::io::Result<()> {
    while x & !0x7f != 0 {
        w.write_all(&[(x & 0x7f) as u8 | 0x80])?;
        x >>= 7;
    }
    w.write_all(&[x as u8])
}

impl Aig {
    /// Writes the circuit in the ASCII (`aag`) AIGER format.
    ///
    /// The circuit is validated first, see [`Aig::check`].
    pub fn write_ascii(&self, mut w: impl Write) -> Result<()> {
        self.check()?;

        writeln!(
            w,
            "aag {} {} 0 {} {}",
            self.maxvar(),
            self.inputs().len(),
            self.outputs().len(),
            self.and_count()
        )?;
        for input in self.inputs() {
            writeln!(w, "{}", input)?;
        }
        for output in self.outputs() {
            writeln!(w, "{}", output)?;
        }
        for gate in self.ands() {
            writeln!(w, "{} {} {}", gate.lhs, gate.rhs0, gate.rhs1)?;
        }
        Ok(())
    }

    /// Writes the circuit in the binary (`aig`) AIGER format.
    ///
    /// The circuit is validated first, see [`Aig::check`]. On top of that,
    /// the binary format leaves inputs implicit and delta-encodes gates, so
    /// it requires a canonical numbering: inputs must be exactly the
    /// variables `1..=num_inputs` in order, and gate lhs literals must
    /// follow contiguously. Fails with [`AigError::UnsupportedLayout`]
    /// otherwise.
    pub fn write_binary(&self, mut w: impl Write) -> Result<()> {
        self.check()?;

        for (k, input) in self.inputs().iter().enumerate() {
            let expected = 2 * (k as u64 + 1);
            if input.raw() != expected {
                return Err(AigError::UnsupportedLayout(format!(
                    "input {} is literal {}, the binary format requires {}",
                    k, input, expected
                )));
            }
        }
        let first_gate = 2 * (self.inputs().len() as u64 + 1);
        for (k, gate) in self.ands().iter().enumerate() {
            let expected = first_gate + 2 * k as u64;
            if gate.lhs.raw() != expected {
                return Err(AigError::UnsupportedLayout(format!(
                    "gate {} has lhs {}, the binary format requires {}",
                    k, gate.lhs, expected
                )));
            }
        }

        writeln!(
            w,
            "aig {} {} 0 {} {}",
            self.maxvar(),
            self.inputs().len(),
            self.outputs().len(),
            self.and_count()
        )?;
        // Outputs remain in the text region even in binary mode.
        for output in self.outputs() {
            writeln!(w, "{}", output)?;
        }
        for gate in self.ands() {
            // Validation plus the canonical numbering guarantee that both
            // rhs literals are strictly below lhs, so the deltas fit.
            let hi = gate.rhs0.raw().max(gate.rhs1.raw());
            let lo = gate.rhs0.raw().min(gate.rhs1.raw());
            encode_delta(gate.lhs.raw() - hi, &mut w)?;
            encode_delta(hi - lo, &mut w)?;
        }
        Ok(())
    }

    /// Writes the circuit to a file, in binary (`aig`) or ASCII (`aag`)
    /// AIGER format according to `binary`.
    ///
    /// On failure the file may be left partially written; callers needing
    /// atomicity should write to a temporary path and rename.
    pub fn write_file<P: AsRef<Path>>(&self, path: P, binary: bool) -> Result<()> {
        debug!(
            "writing {} aiger file {}",
            if binary { "binary" } else { "ascii" },
            path.as_ref().display()
        );
        let f = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(f);
        if binary {
            self.write_binary(&mut writer)?;
        } else {
            self.write_ascii(&mut writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}
