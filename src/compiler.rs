//! # Compiler
//!
//! The single-pass Pratt parser, type checker and bytecode emitter. Consumes
//! an eagerly-scanned token stream and emits instructions into a fresh
//! [`Chunk`]; see [`parser`] for the actual grammar and dispatch table.

use std::collections::HashMap;

use crate::chunk::Chunk;
use crate::errors::CompileError;
use crate::value::ValueType;

pub mod parser;

/// Precedence levels, ascending. `next()` steps one level up; used by the
/// infix `binary` handler to recurse for its right-hand operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Precedence {
  #[default]
  None,
  Assignment,
  Or,
  And,
  Equality,
  Comparison,
  Term,
  Factor,
  Unary,
  Call,
  Primary,
}

impl Precedence {
  pub fn next(self) -> Self {
    use Precedence::*;
    match self {
      None => Assignment,
      Assignment => Or,
      Or => And,
      And => Equality,
      Equality => Comparison,
      Comparison => Term,
      Term => Factor,
      Factor => Unary,
      Unary => Call,
      Call | Primary => Primary,
    }
  }
}

/// Per-identifier static type, recorded at declaration and consulted by
/// later reads, reassignments, and redeclaration checks.
pub(crate) type DeclaredVariables = HashMap<String, ValueType>;

/// Compiles `source` into a finished [`Chunk`].
///
/// The VM only ever holds a `&Chunk` during `run`; compilation owns the
/// chunk exclusively until it's handed back here.
pub fn compile(source: &str) -> Result<Chunk, CompileError> {
  parser::Parser::new(source).compile()
}
