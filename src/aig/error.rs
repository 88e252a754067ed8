use thiserror::Error;

use super::Literal;

/// The result of an AIG operation.
pub type Result<T> = std::result::Result<T, AigError>;

/// Error returned when an AIG operation failed.
#[derive(Debug, Error)]
pub enum AigError {
    /// Invalid literal supplied when registering an input.
    /// Inputs must be positive literals of a fresh, non-zero variable.
    #[error("invalid input literal {0}: {1}")]
    InvalidLiteral(Literal, String),

    /// Invalid gate registration (odd lhs, reserved variable, or variable collision).
    #[error("invalid gate with lhs={0}: {1}")]
    InvalidGate(Literal, String),

    /// The circuit failed a structural validation check before serialization.
    #[error("malformed circuit: {0}")]
    MalformedCircuit(String),

    /// Gate accessor called with an out-of-range index.
    #[error("gate index {index} out of range (circuit has {len} gates)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The circuit layout does not meet the numbering requirements
    /// of the binary AIGER format.
    #[error("unsupported layout for binary aiger: {0}")]
    UnsupportedLayout(String),

    /// Just forwarding a [`ParserError`].
    #[error("{0}")]
    Parser(#[from] ParserError),

    /// An error at the stream level (file could not be opened, read or written).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned when parsing an AIGER stream failed.
///
/// It is defined here because the `parser` module is private.
#[derive(Debug, Error)]
pub enum ParserError {
    /// All features are not supported (in particular latches and symbol tables).
    #[error("unsupported feature: {0}")]
    Unsupported(String),

    /// Invalid token, something else was expected.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The stream ended before the declared contents were read.
    #[error("unexpected end of stream: {0}")]
    UnexpectedEof(String),
}
