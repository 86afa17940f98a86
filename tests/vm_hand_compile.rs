use iliad::chunk::{Chunk, OpCode};
use iliad::value::Value;
use iliad::vm::VM;

/// Hand-assembles `1.2 / (2.3 - 5.6)` and checks the VM evaluates it without
/// going through the compiler at all, exercising the opcode dispatch (and
/// stack pop order for `Subtract`/`Divide`) in isolation.
#[test]
fn hand_compiled_arithmetic() {
  let mut chunk = Chunk::default();

  let a = chunk.add_constant(Value::Double(1.2)).unwrap();
  chunk.write_op(OpCode::FloatLiteral, 1);
  chunk.write_chunk(a, 1);

  let b = chunk.add_constant(Value::Double(2.3)).unwrap();
  chunk.write_op(OpCode::FloatLiteral, 1);
  chunk.write_chunk(b, 1);

  let c = chunk.add_constant(Value::Double(5.6)).unwrap();
  chunk.write_op(OpCode::FloatLiteral, 1);
  chunk.write_chunk(c, 1);

  chunk.write_op(OpCode::Subtract, 1);
  chunk.write_op(OpCode::Divide, 1);
  chunk.write_op(OpCode::Return, 1);

  let mut vm = VM::new();
  vm.load_and_run(chunk).unwrap();

  match vm.stack().last() {
    Some(Value::Double(n)) => assert!((n - (1.2 / (2.3 - 5.6))).abs() < 1e-9),
    other => panic!("expected a double on the stack, got {other:?}"),
  }
}

/// A bytecode-level operand-type mismatch the compiler would never itself
/// emit, confirming the VM still rejects it at runtime rather than panicking.
#[test]
fn hand_compiled_type_mismatch_is_a_runtime_error() {
  let mut chunk = Chunk::default();

  let a = chunk.add_constant(Value::Int32(1)).unwrap();
  chunk.write_op(OpCode::IntLiteral, 1);
  chunk.write_chunk(a, 1);

  let b = chunk.add_constant(Value::String(std::rc::Rc::from("x"))).unwrap();
  chunk.write_op(OpCode::StringLiteral, 1);
  chunk.write_chunk(b, 1);

  chunk.write_op(OpCode::Add, 1);
  chunk.write_op(OpCode::Return, 1);

  let mut vm = VM::new();
  assert!(vm.load_and_run(chunk).is_err());
}
