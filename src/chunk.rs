//! # Chunk
//!
//! A byte-addressed instruction buffer paired with a parallel per-byte line
//! table and an indexed constant pool of [`Value`]s.

use enum_repr::EnumFromU8;

use crate::errors::CompileError;
use crate::value::Value;

/// Stable bytecode ISA. Discriminant values must never be reordered once
/// shipped, since they're the wire format of a [`Chunk`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumFromU8)]
pub enum OpCode {
  // Literals (1-byte constant-pool index operand).
  IntLiteral,
  FloatLiteral,
  TrueLiteral,
  FalseLiteral,
  CharLiteral,
  StringLiteral,
  // Comparison / arithmetic (no operand).
  Equal,
  NotEqual,
  Greater,
  GreaterEqual,
  Less,
  LessEqual,
  Add,
  Subtract,
  Multiply,
  Divide,
  Concatenate,
  Not,
  Negate,
  // Variable ops.
  VarDeclar,
  VarAssign,
  VarDeclarAndAssign,
  Var,
  // Misc.
  Null,
  Return,
}

/// A chunk of bytecode: a flat instruction stream, a parallel line table
/// (one entry per byte in `code`), and an indexed constant pool.
#[derive(Debug, Default, Clone)]
pub struct Chunk {
  pub code: Vec<u8>,
  pub lines: Vec<usize>,
  pub constants: Vec<Value>,
}

impl Chunk {
  /// Append a byte (and the source line that produced it) to the chunk.
  pub fn write_chunk(&mut self, byte: u8, line: usize) {
    self.code.push(byte);
    self.lines.push(line);
  }

  /// Append an opcode to the chunk.
  pub fn write_op(&mut self, op: OpCode, line: usize) {
    self.write_chunk(op as u8, line);
  }

  /// Add a constant to the pool, returning its index. Fails once the pool
  /// holds 256 constants, since indices are single bytes.
  pub fn add_constant(&mut self, value: Value) -> Result<u8, CompileError> {
    self.constants.push(value);
    let index = self.constants.len() - 1;
    u8::try_from(index).map_err(|_| CompileError {
      line: *self.lines.last().unwrap_or(&0),
      at: None,
      message: "Too many constants in one chunk.".to_owned(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lines_track_one_to_one_with_code() {
    let mut chunk = Chunk::default();
    chunk.write_op(OpCode::Null, 1);
    chunk.write_op(OpCode::Return, 2);
    assert_eq!(chunk.code.len(), chunk.lines.len());
    assert_eq!(chunk.lines, vec![1, 2]);
  }

  #[test]
  fn constant_pool_overflows_past_255() {
    let mut chunk = Chunk::default();
    for i in 0..255 {
      chunk.add_constant(Value::Int32(i)).unwrap();
    }
    assert!(chunk.add_constant(Value::Int32(255)).is_ok());
    assert!(chunk.add_constant(Value::Int32(256)).is_err());
  }
}
