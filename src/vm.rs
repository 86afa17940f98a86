//! # VM
//!
//! The stack machine that executes a compiled [`Chunk`]. Responsible for
//! arithmetic/comparison dispatch, global-variable storage, and turning a
//! failure partway through execution into a [`RuntimeError`] with the
//! source line it happened on.

use std::collections::HashMap;

use crate::chunk::{Chunk, OpCode};
use crate::compiler;
use crate::errors::{InterpretError, RuntimeError};
use crate::value::{Value, ValueType};

/// Storage for one global variable: its declared type (used to validate
/// future assignments mirror what the compiler already checked), whether
/// it has been assigned yet, and its current value.
#[derive(Debug, Clone)]
pub(crate) struct GlobalSlot {
  pub value: Value,
  pub initialized: bool,
  pub declared_type: ValueType,
}

/// The virtual machine: one chunk, an instruction pointer into it, an
/// operand stack, and the global-variable table.
#[derive(Debug, Default)]
pub struct VM {
  pub(crate) chunk: Chunk,
  pub(crate) ip: usize,
  pub(crate) stack: Vec<Value>,
  pub(crate) globals: HashMap<String, GlobalSlot>,
}

impl VM {
  pub fn new() -> Self {
    Self { chunk: Chunk::default(), ip: 0, stack: Vec::with_capacity(256), globals: HashMap::new() }
  }

  /// Compile and run `source`, keeping whatever globals already exist (so a
  /// REPL session accumulates state across lines).
  pub fn interpret(&mut self, source: &str) -> Result<(), InterpretError> {
    let chunk = compiler::compile(source)?;
    self.chunk = chunk;
    self.ip = 0;
    self.run().map_err(InterpretError::from)
  }

  /// Load an already-assembled chunk and run it from offset zero. Mainly
  /// useful for hand-assembled bytecode in tests, bypassing the compiler.
  pub fn load_and_run(&mut self, chunk: Chunk) -> Result<(), RuntimeError> {
    self.chunk = chunk;
    self.ip = 0;
    self.run()
  }

  /// The operand stack, for inspection after `interpret`/`load_and_run`.
  pub fn stack(&self) -> &[Value] {
    &self.stack
  }
}

impl VM {
  fn push(&mut self, value: Value) {
    self.stack.push(value);
  }

  fn pop(&mut self) -> Value {
    self.stack.pop().expect("compiler never emits an instruction on an empty stack")
  }

  fn read_byte(&mut self) -> u8 {
    let byte = self.chunk.code[self.ip];
    self.ip += 1;
    byte
  }

  fn read_constant(&mut self) -> Value {
    let index = self.read_byte();
    self.chunk.constants[index as usize].clone()
  }

  fn read_name(&mut self) -> String {
    match self.read_constant() {
      Value::String(name) => name.to_string(),
      other => unreachable!("compiler only ever emits a string constant as a name operand, got {other:?}"),
    }
  }

  fn current_line(&self) -> usize {
    self.chunk.lines.get(self.ip.saturating_sub(1)).copied().unwrap_or(0)
  }

  fn runtime_error(&mut self, message: impl Into<String>) -> RuntimeError {
    let error = RuntimeError { line: self.current_line(), message: message.into() };
    log::error!("{error}");
    self.stack.clear();
    error
  }

  #[cfg(feature = "debug_trace_stack")]
  fn trace_stack(&self) {
    let rendered: Vec<String> = self.stack.iter().map(|v| format!("{v}")).collect();
    log::trace!("          [{}]", rendered.join(", "));
  }

  fn run(&mut self) -> Result<(), RuntimeError> {
    while self.ip < self.chunk.code.len() {
      #[cfg(feature = "debug_trace_stack")]
      self.trace_stack();
      #[cfg(feature = "debug_trace_execution")]
      {
        use crate::debug::Disassemble;
        self.chunk.disassemble_instruction(self.ip);
      }
      self.run_one_step()?;
    }
    Ok(())
  }

  fn run_one_step(&mut self) -> Result<(), RuntimeError> {
    let op = OpCode::from(self.read_byte());
    match op {
      OpCode::IntLiteral
      | OpCode::FloatLiteral
      | OpCode::TrueLiteral
      | OpCode::FalseLiteral
      | OpCode::CharLiteral
      | OpCode::StringLiteral => {
        let value = match op {
          OpCode::TrueLiteral => Value::Bool(true),
          OpCode::FalseLiteral => Value::Bool(false),
          _ => self.read_constant(),
        };
        self.push(value);
      }
      OpCode::Equal => {
        let (b, a) = (self.pop(), self.pop());
        self.push(Value::Bool(a == b));
      }
      OpCode::NotEqual => {
        let (b, a) = (self.pop(), self.pop());
        self.push(Value::Bool(a != b));
      }
      OpCode::Greater | OpCode::GreaterEqual | OpCode::Less | OpCode::LessEqual => {
        let (b, a) = (self.pop(), self.pop());
        let ordering = a.partial_cmp_numeric(&b).map_err(|e| self.tag_line(e))?;
        let result = match op {
          OpCode::Greater => ordering.is_gt(),
          OpCode::GreaterEqual => ordering.is_ge(),
          OpCode::Less => ordering.is_lt(),
          _ => ordering.is_le(),
        };
        self.push(Value::Bool(result));
      }
      OpCode::Add => {
        let (b, a) = (self.pop(), self.pop());
        let result = a.add(&b).map_err(|e| self.tag_line(e))?;
        self.push(result);
      }
      OpCode::Subtract => {
        let (b, a) = (self.pop(), self.pop());
        let result = a.sub(&b).map_err(|e| self.tag_line(e))?;
        self.push(result);
      }
      OpCode::Multiply => {
        let (b, a) = (self.pop(), self.pop());
        let result = a.mul(&b).map_err(|e| self.tag_line(e))?;
        self.push(result);
      }
      OpCode::Divide => {
        let (b, a) = (self.pop(), self.pop());
        let result = a.div(&b).map_err(|e| self.tag_line(e))?;
        self.push(result);
      }
      OpCode::Concatenate => {
        let (b, a) = (self.pop(), self.pop());
        let result = a.concat(&b).map_err(|e| self.tag_line(e))?;
        self.push(result);
      }
      OpCode::Not => {
        let value = self.pop();
        self.push(value.not());
      }
      OpCode::Negate => {
        let value = self.pop();
        let result = value.negate().map_err(|e| self.tag_line(e))?;
        self.push(result);
      }
      OpCode::VarDeclar => {
        let declared_type = ValueType::from(self.read_byte());
        let name = self.read_name();
        if self.globals.contains_key(&name) {
          return Err(self.runtime_error(format!("Variable '{name}' already declared.")));
        }
        self.globals.insert(
          name,
          GlobalSlot { value: Value::Null, initialized: false, declared_type },
        );
      }
      OpCode::VarDeclarAndAssign => {
        let name = self.read_name();
        let value = self.pop();
        if self.globals.contains_key(&name) {
          return Err(self.runtime_error(format!("Variable '{name}' already declared.")));
        }
        let declared_type = value.value_type();
        self.globals.insert(name, GlobalSlot { value, initialized: true, declared_type });
      }
      OpCode::VarAssign => {
        let name = self.read_name();
        let value = self.pop();
        let declared_type = value.value_type();
        match self.globals.get_mut(&name) {
          Some(slot) => {
            slot.value = value;
            slot.initialized = true;
            slot.declared_type = declared_type;
          }
          None => return Err(self.runtime_error(format!("Undefined variable '{name}'."))),
        }
      }
      OpCode::Var => {
        let name = self.read_name();
        match self.globals.get(&name) {
          Some(slot) if slot.initialized => self.push(slot.value.clone()),
          Some(_) => return Err(self.runtime_error(format!("Identifier '{name}' uninitialized."))),
          None => return Err(self.runtime_error(format!("Undefined variable '{name}'."))),
        }
      }
      OpCode::Null => self.push(Value::Null),
      OpCode::Return => {}
    }
    Ok(())
  }

  /// `Value`'s arithmetic methods don't know the current instruction
  /// pointer, so they report `line: 0`; patch in the real line here.
  fn tag_line(&mut self, mut error: RuntimeError) -> RuntimeError {
    error.line = self.current_line();
    log::error!("{error}");
    self.stack.clear();
    error
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn run(source: &str) -> VM {
    let mut vm = VM::new();
    vm.interpret(source).unwrap();
    vm
  }

  #[test]
  fn precedence_respects_multiply_over_add() {
    let vm = run("1 + 2 * 3;");
    assert_eq!(vm.stack.last(), Some(&Value::Int32(7)));
  }

  #[test]
  fn narrowing_assignment_truncates_at_compile_time() {
    let vm = run("int8 a = 300;");
    let slot = vm.globals.get("a").unwrap();
    assert_eq!(slot.value, Value::Int8(44));
  }

  #[test]
  fn string_concatenation() {
    let vm = run(r#""foo" + "bar";"#);
    match vm.stack.last() {
      Some(Value::String(s)) => assert_eq!(&**s, "foobar"),
      other => panic!("expected a string, got {other:?}"),
    }
  }

  #[test]
  fn reassigning_an_undeclared_name_is_rejected_at_compile_time() {
    let mut vm = VM::new();
    let err = vm.interpret("a = 1;").unwrap_err();
    assert!(matches!(err, InterpretError::Compile(_)));
  }

  /// `a = 1;`'s "undefined variable" rejection happens in the compiler, so
  /// `VarAssign`'s own undefined-name branch is unreachable from any
  /// compiler-emitted program. Exercise it directly with hand-assembled
  /// bytecode instead, the way `tests/vm_hand_compile.rs` does for other
  /// opcode-level behavior.
  #[test]
  fn var_assign_on_an_undefined_name_is_a_runtime_error() {
    let mut chunk = Chunk::default();
    let value_index = chunk.add_constant(Value::Int32(1)).unwrap();
    chunk.write_op(OpCode::IntLiteral, 1);
    chunk.write_chunk(value_index, 1);
    let name_index = chunk.add_constant(Value::String(std::rc::Rc::from("a"))).unwrap();
    chunk.write_op(OpCode::VarAssign, 1);
    chunk.write_chunk(name_index, 1);
    chunk.write_op(OpCode::Return, 1);

    let mut vm = VM::new();
    let err = vm.load_and_run(chunk).unwrap_err();
    assert_eq!(err.message, "Undefined variable 'a'.");
  }

  #[test]
  fn var_read_on_an_undefined_name_is_a_runtime_error() {
    let mut chunk = Chunk::default();
    let name_index = chunk.add_constant(Value::String(std::rc::Rc::from("a"))).unwrap();
    chunk.write_op(OpCode::Var, 1);
    chunk.write_chunk(name_index, 1);
    chunk.write_op(OpCode::Return, 1);

    let mut vm = VM::new();
    let err = vm.load_and_run(chunk).unwrap_err();
    assert_eq!(err.message, "Undefined variable 'a'.");
  }

  #[test]
  fn unary_negation_and_not() {
    let vm = run("-2 * 3;");
    assert_eq!(vm.stack.last(), Some(&Value::Int32(-6)));

    let vm = run("!true;");
    assert_eq!(vm.stack.last(), Some(&Value::Bool(false)));
  }
}
