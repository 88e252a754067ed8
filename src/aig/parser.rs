use std::{fs::File, io::BufReader, path::Path};

use log::debug;

use crate::{Aig, Literal, Result, aig::error::ParserError};

fn read_u64(s: &str) -> std::result::Result<u64, ParserError> {
    s.parse::<u64>()
        .map_err(|_| ParserError::InvalidToken(s.to_string() + " expected u64"))
}

fn check_even(x: u64) -> Result<()> {
    if x & 1 == 1 {
        return Err(ParserError::InvalidToken(
            "expected literal to be even, got ".to_string() + &x.to_string(),
        )
        .into());
    }
    Ok(())
}

/// Reads one line, failing if the stream ended.
fn read_line(reader: &mut impl std::io::BufRead, line: &mut String, what: &str) -> Result<()> {
    line.clear();
    if reader.read_line(line)? == 0 {
        return Err(ParserError::UnexpectedEof(format!("expected {}", what)).into());
    }
    Ok(())
}

/// Reads a line holding a single decimal literal (input or output line).
fn read_literal_line(line: &str) -> Result<Literal> {
    let tokens = line.trim().split_whitespace().collect::<Vec<&str>>();

    if tokens.is_empty() {
        return Err(
            ParserError::InvalidToken("expected a literal, got nothing".to_string()).into(),
        );
    }

    if tokens.len() > 1 {
        return Err(ParserError::InvalidToken(
            "expected nothing after literal, got ".to_string() + tokens[1],
        )
        .into());
    }

    Ok(Literal::from_raw(read_u64(tokens[0])?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    binary: bool,
    m: u64,
    i: u64,
    o: u64,
    a: u64,
}

impl TryFrom<&str> for Header {
    type Error = ParserError;

    fn try_from(line: &str) -> std::result::Result<Self, Self::Error> {
        let tokens = line.trim().split_whitespace().collect::<Vec<&str>>();

        if tokens.len() < 6 {
            return Err(ParserError::InvalidToken(
                "missing header tokens".to_string(),
            ));
        }

        let binary = match tokens[0] {
            "aag" => false,
            "aig" => true,
            other => {
                return Err(ParserError::InvalidToken(
                    "expected aag or aig tag, got ".to_string() + other,
                ));
            }
        };

        let m = read_u64(tokens[1])?;
        let i = read_u64(tokens[2])?;
        let l = read_u64(tokens[3])?;
        let o = read_u64(tokens[4])?;
        let a = read_u64(tokens[5])?;

        if tokens.len() > 6 {
            return Err(ParserError::Unsupported(
                "header only supports M I L O A".to_string(),
            ));
        }

        if l != 0 {
            return Err(ParserError::Unsupported(
                "latches are not supported, expected L = 0".to_string(),
            ));
        }

        Ok(Header { binary, m, i, o, a })
    }
}

impl Header {
    /// Checks the reconstructed circuit against the declared maximum
    /// variable index: no parsed literal may reference a variable beyond M.
    fn check_maxvar(&self, aig: &Aig) -> Result<()> {
        if aig.maxvar() > self.m {
            return Err(ParserError::InvalidToken(format!(
                "maximum variable {} exceeds declared bound {}",
                aig.maxvar(),
                self.m
            ))
            .into());
        }
        Ok(())
    }
}

/// Parser for the ASCII AIGER format.
mod ascii {
    use std::io::BufRead;

    use log::debug;

    use crate::{
        Aig, Literal, Result,
        aig::error::ParserError,
        aig::parser::{Header, check_even, read_line, read_literal_line, read_u64},
    };

    fn read_input(line: &str) -> Result<Literal> {
        let lit = read_literal_line(line)?;
        // Negated input literals are rejected on read as on write.
        check_even(lit.raw())?;
        Ok(lit)
    }

    fn read_and(line: &str) -> Result<(Literal, Literal, Literal)> {
        let tokens = line.trim().split_whitespace().collect::<Vec<&str>>();

        if tokens.len() < 3 {
            return Err(ParserError::InvalidToken("not enough and tokens".to_string()).into());
        }

        if tokens.len() > 3 {
            return Err(ParserError::InvalidToken(
                "expected nothing after and tokens, got ".to_string() + tokens[3],
            )
            .into());
        }

        let lhs = read_u64(tokens[0])?;
        let rhs0 = read_u64(tokens[1])?;
        let rhs1 = read_u64(tokens[2])?;

        check_even(lhs)?;
        Ok((
            Literal::from_raw(lhs),
            Literal::from_raw(rhs0),
            Literal::from_raw(rhs1),
        ))
    }

    impl Aig {
        /// Creates an AIG from a reader over the ASCII (`aag`) AIGER format.
        ///
        /// Use this function if the file is already open with a reader,
        /// otherwise see [`Aig::from_file`].
        pub fn from_ascii(mut reader: impl BufRead) -> Result<Self> {
            let mut line = String::new();

            // Reading the header
            read_line(&mut reader, &mut line, "header")?;
            let header = Header::try_from(line.as_str())?;
            if header.binary {
                return Err(ParserError::InvalidToken(
                    "expected aag tag for the ascii format".to_string(),
                )
                .into());
            }
            debug!(
                "parsing ascii aiger: m={} i={} o={} a={}",
                header.m, header.i, header.o, header.a
            );

            let mut aig = Aig::new();

            // Reading inputs, outputs and and gates, in file order.
            // Everything after the gate section (symbol table, comments) is ignored.
            for _ in 0..header.i {
                read_line(&mut reader, &mut line, "an input literal")?;
                aig.add_input(read_input(&line)?)?;
            }
            for _ in 0..header.o {
                read_line(&mut reader, &mut line, "an output literal")?;
                aig.add_output(read_literal_line(&line)?);
            }
            for _ in 0..header.a {
                read_line(&mut reader, &mut line, "an and gate")?;
                let (lhs, rhs0, rhs1) = read_and(&line)?;
                aig.add_and(lhs, rhs0, rhs1)?;
            }

            // Is the AIG okay?
            header.check_maxvar(&aig)?;
            aig.check()?;

            Ok(aig)
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn read_input_test() {
            assert!(read_input("").is_err());
            assert!(read_input(" ").is_err());
            assert!(read_input("-5").is_err());
            assert!(read_input("2 14").is_err());
            assert!(read_input("4 z").is_err());
            assert!(read_input("3").is_err());

            assert_eq!(read_input(" 2").unwrap(), Literal::from_raw(2));
            assert_eq!(read_input("2 ").unwrap(), Literal::from_raw(2));
            assert_eq!(read_input("   42  ").unwrap(), Literal::from_raw(42));
        }

        #[test]
        fn read_and_test() {
            assert!(read_and("").is_err());
            assert!(read_and(" ").is_err());
            assert!(read_and("-5").is_err());
            assert!(read_and("2 14").is_err());
            assert!(read_and("4 18 2 2").is_err());
            assert!(read_and("3 2 1").is_err());

            assert_eq!(
                read_and("6 2 5").unwrap(),
                (
                    Literal::from_raw(6),
                    Literal::from_raw(2),
                    Literal::from_raw(5)
                )
            );
            assert_eq!(
                read_and("   42   5 19   ").unwrap(),
                (
                    Literal::from_raw(42),
                    Literal::from_raw(5),
                    Literal::from_raw(19)
                )
            );
        }

        #[test]
        fn from_ascii_test() {
            let src = "aag 3 2 0 1 1\n2\n4\n6\n6 2 4\n";
            let aig = Aig::from_ascii(src.as_bytes()).unwrap();
            assert_eq!(aig.inputs(), [Literal::from_raw(2), Literal::from_raw(4)]);
            assert_eq!(aig.outputs(), [Literal::from_raw(6)]);
            assert_eq!(aig.and_count(), 1);
            let gate = aig.and_gate(0).unwrap();
            assert_eq!(gate.lhs, Literal::from_raw(6));
            assert_eq!(gate.rhs0, Literal::from_raw(2));
            assert_eq!(gate.rhs1, Literal::from_raw(4));
        }

        #[test]
        fn from_ascii_ignores_symbol_table_test() {
            let src = "aag 1 1 0 1 0\n2\n2\ni0 x\nc\nsome comment\n";
            let aig = Aig::from_ascii(src.as_bytes()).unwrap();
            assert_eq!(aig.inputs(), [Literal::from_raw(2)]);
            assert_eq!(aig.outputs(), [Literal::from_raw(2)]);
        }

        #[test]
        fn from_ascii_rejects_negated_input_test() {
            let src = "aag 1 1 0 0 0\n3\n";
            assert!(Aig::from_ascii(src.as_bytes()).is_err());
        }

        #[test]
        fn from_ascii_beyond_declared_maxvar_test() {
            use crate::AigError;

            // Structurally fine (one input, one gate, maxvar 2), but the
            // header only declares one variable
            let src = "aag 1 1 0 1 1\n2\n4\n4 2 3\n";
            assert!(matches!(
                Aig::from_ascii(src.as_bytes()),
                Err(AigError::Parser(ParserError::InvalidToken(_)))
            ));

            // Same circuit with a consistent header is accepted
            let src = "aag 2 1 0 1 1\n2\n4\n4 2 3\n";
            assert!(Aig::from_ascii(src.as_bytes()).is_ok());
        }

        #[test]
        fn from_ascii_truncated_test() {
            // Two inputs declared, one present
            let src = "aag 2 2 0 0 0\n2\n";
            assert!(Aig::from_ascii(src.as_bytes()).is_err());
        }

        #[test]
        fn from_ascii_wrong_tag_test() {
            let src = "aig 0 0 0 0 0\n";
            assert!(Aig::from_ascii(src.as_bytes()).is_err());
        }
    }
}

/// Parser for the binary AIGER format.
mod bin {
    use std::io::BufRead;

    use log::debug;

    use crate::{
        Aig, Literal, Result,
        aig::error::ParserError,
        aig::parser::{Header, read_line, read_literal_line},
    };

    fn next_byte(buf: &[u8], offset: &mut usize) -> Result<u8> {
        if *offset >= buf.len() {
            return Err(
                ParserError::UnexpectedEof("truncated gate record".to_string()).into(),
            );
        }

        let byte = buf[*offset];
        *offset += 1;
        Ok(byte)
    }

    /// Decodes one variable-length unsigned integer, 7 payload bits per
    /// byte, least significant group first, high bit as continuation flag.
    fn decode_delta(buf: &[u8], offset: &mut usize) -> Result<u64> {
        let mut x = 0u64;
        let mut shift = 0;

        loop {
            let ch = next_byte(buf, offset)?;
            // The 10th byte sits at shift 63: only its low payload bit still
            // fits, anything above would be shifted out silently.
            if shift >= 64 || (shift == 63 && ch & 0x7e != 0) {
                return Err(ParserError::InvalidToken(
                    "varint does not fit in 64 bits".to_string(),
                )
                .into());
            }
            x |= ((ch & 0x7f) as u64) << shift;
            shift += 7;

            if ch & 0x80 == 0 {
                return Ok(x);
            }
        }
    }

    impl Aig {
        /// Creates an AIG from a reader over the binary (`aig`) AIGER format.
        ///
        /// Use this function if the file is already open with a reader,
        /// otherwise see [`Aig::from_file`].
        pub fn from_binary(mut reader: impl BufRead) -> Result<Self> {
            let mut line = String::new();

            // Reading the header
            read_line(&mut reader, &mut line, "header")?;
            let header = Header::try_from(line.as_str())?;
            if !header.binary {
                return Err(ParserError::InvalidToken(
                    "expected aig tag for the binary format".to_string(),
                )
                .into());
            }
            debug!(
                "parsing binary aiger: m={} i={} o={} a={}",
                header.m, header.i, header.o, header.a
            );

            let mut aig = Aig::new();

            // Inputs are implicit: variables 1..=i, in order.
            for var in 1..=header.i {
                aig.add_input(Literal::new(var, false))?;
            }

            // Outputs remain in the text region even in binary mode.
            for _ in 0..header.o {
                read_line(&mut reader, &mut line, "an output literal")?;
                aig.add_output(read_literal_line(&line)?);
            }

            // Gates are delta-encoded in the binary region. Each gate defines
            // the next unused even literal, so lhs is a running counter.
            // Trailing bytes (symbol table, comments) are ignored.
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf)?;

            let mut offset = 0;
            let mut lhs = 2 * (header.i + 1);

            for _ in 0..header.a {
                let delta0 = decode_delta(&buf, &mut offset)?;
                let delta1 = decode_delta(&buf, &mut offset)?;

                let rhs0 = lhs.checked_sub(delta0).ok_or_else(|| {
                    ParserError::InvalidToken(format!(
                        "delta {} exceeds gate literal {}",
                        delta0, lhs
                    ))
                })?;
                let rhs1 = rhs0.checked_sub(delta1).ok_or_else(|| {
                    ParserError::InvalidToken(format!(
                        "delta {} exceeds rhs literal {}",
                        delta1, rhs0
                    ))
                })?;

                aig.add_and(
                    Literal::from_raw(lhs),
                    Literal::from_raw(rhs0),
                    Literal::from_raw(rhs1),
                )?;

                lhs += 2;
            }

            // Is the AIG okay?
            header.check_maxvar(&aig)?;
            aig.check()?;

            Ok(aig)
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;
        use crate::AigError;

        #[test]
        fn decode_delta_test() {
            let mut offset = 0;
            assert_eq!(decode_delta(&[0x00], &mut offset).unwrap(), 0);

            let mut offset = 0;
            assert_eq!(decode_delta(&[0x7f], &mut offset).unwrap(), 127);

            // 128 = 0b1000_0000 -> low group 0 with continuation, then 1
            let mut offset = 0;
            assert_eq!(decode_delta(&[0x80, 0x01], &mut offset).unwrap(), 128);

            let mut offset = 0;
            assert_eq!(decode_delta(&[0xff, 0x01], &mut offset).unwrap(), 255);

            // Truncated: continuation bit set but no byte follows
            let mut offset = 0;
            assert!(decode_delta(&[0x80], &mut offset).is_err());

            // Ten bytes are fine while the payload still fits in 64 bits
            let mut offset = 0;
            let max = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
            assert_eq!(decode_delta(&max, &mut offset).unwrap(), u64::MAX);
        }

        #[test]
        fn decode_delta_overflow_test() {
            // Encodes 2^64 + 2: bit 64 cannot be represented, the decoder
            // must reject it instead of dropping it and returning 2
            let overlong = [0x82, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x02];
            let mut offset = 0;
            assert!(decode_delta(&overlong, &mut offset).is_err());

            // An 11th continuation byte is over-long no matter the payload
            let mut offset = 0;
            assert!(decode_delta(&[0x80; 11], &mut offset).is_err());
        }

        #[test]
        fn from_binary_test() {
            let mut src = b"aig 3 2 0 1 1\n6\n".to_vec();
            src.extend_from_slice(&[0x02, 0x02]);
            let aig = Aig::from_binary(src.as_slice()).unwrap();
            assert_eq!(aig.inputs(), [Literal::from_raw(2), Literal::from_raw(4)]);
            assert_eq!(aig.outputs(), [Literal::from_raw(6)]);
            assert_eq!(aig.and_count(), 1);
            let gate = aig.and_gate(0).unwrap();
            assert_eq!(gate.lhs, Literal::from_raw(6));
            // delta0 = 6 - 4, delta1 = 4 - 2
            assert_eq!(gate.rhs0, Literal::from_raw(4));
            assert_eq!(gate.rhs1, Literal::from_raw(2));
        }

        #[test]
        fn from_binary_truncated_test() {
            // Two gates declared, bytes for one present
            let mut src = b"aig 4 2 0 1 2\n8\n".to_vec();
            src.extend_from_slice(&[0x02, 0x02]);
            let res = Aig::from_binary(src.as_slice());
            assert!(matches!(
                res,
                Err(AigError::Parser(ParserError::UnexpectedEof(_)))
            ));
        }

        #[test]
        fn from_binary_delta_underflow_test() {
            // delta0 = 127 > lhs literal 6
            let mut src = b"aig 3 2 0 0 1\n".to_vec();
            src.extend_from_slice(&[0x7f, 0x00]);
            assert!(Aig::from_binary(src.as_slice()).is_err());
        }

        #[test]
        fn from_binary_overlong_delta_test() {
            // delta0 over-long (2^64 + 2): must fail, not decode to delta 2
            // and build a structurally valid circuit
            let mut src = b"aig 3 2 0 0 1\n".to_vec();
            src.extend_from_slice(&[0x82, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x02]);
            src.extend_from_slice(&[0x00]);
            assert!(matches!(
                Aig::from_binary(src.as_slice()),
                Err(AigError::Parser(ParserError::InvalidToken(_)))
            ));
        }

        #[test]
        fn from_binary_beyond_declared_maxvar_test() {
            // Two implicit inputs but the header only declares one variable
            let src = b"aig 1 2 0 0 0\n".to_vec();
            assert!(matches!(
                Aig::from_binary(src.as_slice()),
                Err(AigError::Parser(ParserError::InvalidToken(_)))
            ));
        }

        #[test]
        fn from_binary_ignores_trailing_bytes_test() {
            let mut src = b"aig 3 2 0 1 1\n6\n".to_vec();
            src.extend_from_slice(&[0x02, 0x02]);
            src.extend_from_slice(b"i0 x\nc\ncomment\n");
            let aig = Aig::from_binary(src.as_slice()).unwrap();
            assert_eq!(aig.and_count(), 1);
        }
    }
}

impl Aig {
    /// Creates an AIG from an `.aig` (resp. `.aag`) file using the binary
    /// (resp. ASCII) AIGER format.
    ///
    /// The extension picks the format; any other extension is rejected.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("reading aiger file {}", path.as_ref().display());
        let f = File::open(path.as_ref())?;
        let reader = BufReader::new(f);
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("aag") => Aig::from_ascii(reader),
            Some("aig") => Aig::from_binary(reader),
            _ => Err(
                ParserError::Unsupported("invalid extension, expected .aag or .aig".to_string())
                    .into(),
            ),
        }
    }
}
