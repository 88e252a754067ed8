pub mod aig;

// Re-exporting symbols and modules.
pub use aig::{Aig, AigError, AndGate, Literal, ParserError, Result, Var};
