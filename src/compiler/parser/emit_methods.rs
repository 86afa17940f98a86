use super::*;
use crate::chunk::OpCode;
use crate::value::Value;

impl Parser {
  pub(crate) fn emit_byte(&mut self, byte: u8) {
    self.chunk.write_chunk(byte, self.previous.line);
  }

  pub(crate) fn emit_bytes(&mut self, bytes: &[u8]) {
    for &byte in bytes {
      self.emit_byte(byte);
    }
  }

  /// Emits a literal opcode followed by its constant-pool index operand.
  pub(crate) fn emit_constant_op(&mut self, op: OpCode, value: Value) {
    let index = self.make_constant(value);
    self.emit_bytes(&[op as u8, index]);
  }

  pub(crate) fn emit_return(&mut self) {
    self.emit_byte(OpCode::Return as u8);
  }

  pub(crate) fn end_compiler(&mut self) {
    self.emit_return();
    #[cfg(feature = "debug_print_code")]
    if !self.had_error {
      use crate::debug::Disassemble;
      self.chunk.disassemble("code");
    }
  }

  /// Adds `value` to the constant pool, reporting (and recovering from)
  /// overflow past 255 constants as a fatal compile error.
  pub(crate) fn make_constant(&mut self, value: Value) -> u8 {
    match self.chunk.add_constant(value) {
      Ok(index) => index,
      Err(err) => {
        self.had_error = true;
        self.panic_mode = true;
        log::error!("{err}");
        0
      }
    }
  }

  /// If the most recently emitted instruction pushed the constant we're
  /// about to narrow/widen, rewrite that constant in place rather than
  /// emitting a cast the ISA has no instruction for. Only literal operands
  /// can be folded this way; a non-literal narrowing keeps its wider
  /// runtime tag, a documented limitation of the fixed instruction set.
  pub(crate) fn coerce_last_literal(&mut self, target: crate::value::ValueType) {
    let Some(&index_byte) = self.chunk.code.last() else { return };
    let Some(&op_byte) = self.chunk.code.len().checked_sub(2).and_then(|i| self.chunk.code.get(i))
    else {
      return;
    };
    let is_literal_push = matches!(
      OpCode::from(op_byte),
      OpCode::IntLiteral | OpCode::FloatLiteral | OpCode::CharLiteral | OpCode::StringLiteral
    );
    if !is_literal_push || index_byte as usize != self.chunk.constants.len().wrapping_sub(1) {
      return;
    }
    if let Some(coerced) = self.chunk.constants[index_byte as usize].coerce_numeric(target) {
      self.chunk.constants[index_byte as usize] = coerced;
    }
  }
}
