//! # Debug
//!
//! Bytecode disassembly, gated behind the `debug_print_code` feature at the
//! compiler end and `debug_trace_execution`/`debug_trace_stack` at the VM
//! end. Output goes through `log::debug!` rather than `println!`, so it
//! shows up (or not) under the same `RUST_LOG` control as the rest of the
//! crate's instrumentation.

use crate::chunk::{Chunk, OpCode};

pub trait Disassemble {
  /// Disassemble every instruction in the chunk under a `== name ==` banner.
  fn disassemble(&self, name: &str);

  /// Disassemble one instruction, returning the offset of the next one.
  fn disassemble_instruction(&self, offset: usize) -> usize;
}

impl Disassemble for Chunk {
  fn disassemble(&self, name: &str) {
    log::debug!("== {name} ==");
    let mut offset = 0;
    while offset < self.code.len() {
      offset = self.disassemble_instruction(offset);
    }
  }

  fn disassemble_instruction(&self, offset: usize) -> usize {
    let line = if offset > 0 && self.lines[offset] == self.lines[offset - 1] {
      "   |".to_owned()
    } else {
      format!("{:4}", self.lines[offset])
    };

    let op = OpCode::from(self.code[offset]);
    match op {
      OpCode::IntLiteral
      | OpCode::FloatLiteral
      | OpCode::TrueLiteral
      | OpCode::FalseLiteral
      | OpCode::CharLiteral
      | OpCode::StringLiteral => constant_instruction(self, &format!("{op:?}"), line, offset),
      OpCode::VarDeclar => {
        let type_tag = self.code[offset + 1];
        let name_index = self.code[offset + 2];
        let name = &self.constants[name_index as usize];
        log::debug!("{offset:04} {line} VAR_DECLAR type={type_tag} {name}");
        offset + 3
      }
      OpCode::VarAssign | OpCode::VarDeclarAndAssign | OpCode::Var => {
        constant_instruction(self, &format!("{op:?}"), line, offset)
      }
      OpCode::Equal
      | OpCode::NotEqual
      | OpCode::Greater
      | OpCode::GreaterEqual
      | OpCode::Less
      | OpCode::LessEqual
      | OpCode::Add
      | OpCode::Subtract
      | OpCode::Multiply
      | OpCode::Divide
      | OpCode::Concatenate
      | OpCode::Not
      | OpCode::Negate
      | OpCode::Null
      | OpCode::Return => simple_instruction(&format!("{op:?}"), line, offset),
    }
  }
}

fn simple_instruction(name: &str, line: String, offset: usize) -> usize {
  log::debug!("{offset:04} {line} {name}");
  offset + 1
}

fn constant_instruction(chunk: &Chunk, name: &str, line: String, offset: usize) -> usize {
  let index = chunk.code[offset + 1];
  let value = &chunk.constants[index as usize];
  log::debug!("{offset:04} {line} {name} {index:4} '{value}'");
  offset + 2
}
