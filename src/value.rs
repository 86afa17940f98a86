//! # Value
//!
//! Tagged runtime values. Per the REDESIGN FLAGS this is a proper Rust sum
//! type rather than the original's untagged byte-buffer-plus-tag; the
//! byte-buffer representation survives only as [`Value::to_bytes`], the
//! serialization path used by the constant pool and by tests that assert
//! big-endianness.

use std::fmt::{self, Display};
use std::rc::Rc;

use crate::errors::RuntimeError;

/// The type tag of a [`Value`]. Ordinal order matters: `smallest_type_needed`
/// picks the larger of two numeric ordinals, so `Int8 < Int16 < Int32 <
/// Int64 < Float < Double` must hold.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, enum_repr::EnumFromU8)]
pub enum ValueType {
  Invalid,
  Null,
  Bool,
  Int8,
  Int16,
  Int32,
  Int64,
  Float,
  Double,
  Char,
  String,
}

impl ValueType {
  pub fn is_number(self) -> bool {
    matches!(
      self,
      ValueType::Int8
        | ValueType::Int16
        | ValueType::Int32
        | ValueType::Int64
        | ValueType::Float
        | ValueType::Double
    )
  }
}

impl Display for ValueType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ValueType::Invalid => "invalid",
      ValueType::Null => "null",
      ValueType::Bool => "bool",
      ValueType::Int8 => "int8",
      ValueType::Int16 => "int16",
      ValueType::Int32 => "int32",
      ValueType::Int64 => "int64",
      ValueType::Float => "float",
      ValueType::Double => "double",
      ValueType::Char => "char",
      ValueType::String => "string",
    };
    f.write_str(name)
  }
}

/// Returns the larger (wider) of two numeric `ValueType`s.
///
/// Used both at compile time (to pick the static result type of `+ - * /`)
/// and at runtime (to pick the tag of the produced `Value`).
pub fn smallest_type_needed(a: ValueType, b: ValueType) -> ValueType {
  if a as u8 >= b as u8 {
    a
  } else {
    b
  }
}

/// A runtime value. `String` is reference-counted so cloning a `Value` (e.g.
/// pushing it back on the stack after an assignment) is cheap.
#[derive(Debug, Clone)]
pub enum Value {
  Invalid,
  Null,
  Bool(bool),
  Int8(i8),
  Int16(i16),
  Int32(i32),
  Int64(i64),
  Float(f32),
  Double(f64),
  Char(u8),
  String(Rc<str>),
}

impl Value {
  pub fn value_type(&self) -> ValueType {
    match self {
      Value::Invalid => ValueType::Invalid,
      Value::Null => ValueType::Null,
      Value::Bool(_) => ValueType::Bool,
      Value::Int8(_) => ValueType::Int8,
      Value::Int16(_) => ValueType::Int16,
      Value::Int32(_) => ValueType::Int32,
      Value::Int64(_) => ValueType::Int64,
      Value::Float(_) => ValueType::Float,
      Value::Double(_) => ValueType::Double,
      Value::Char(_) => ValueType::Char,
      Value::String(_) => ValueType::String,
    }
  }

  pub fn is_number(&self) -> bool {
    self.value_type().is_number()
  }

  pub fn is_string(&self) -> bool {
    matches!(self, Value::String(_))
  }

  /// Boolean coercion used by `Not` and by any future control flow: `Null`
  /// and `Bool(false)` are falsey, everything else (including `0`) is truthy.
  pub fn truthy(&self) -> bool {
    !matches!(self, Value::Null | Value::Bool(false))
  }

  /// Big-endian byte serialization. Size is implied by the variant for
  /// scalars, explicit for strings. `Invalid`/`Null` serialize to zero bytes.
  pub fn to_bytes(&self) -> Vec<u8> {
    match self {
      Value::Invalid | Value::Null => Vec::new(),
      Value::Bool(b) => vec![if *b { 1 } else { 0 }],
      Value::Int8(n) => n.to_be_bytes().to_vec(),
      Value::Int16(n) => n.to_be_bytes().to_vec(),
      Value::Int32(n) => n.to_be_bytes().to_vec(),
      Value::Int64(n) => n.to_be_bytes().to_vec(),
      Value::Float(n) => n.to_bits().to_be_bytes().to_vec(),
      Value::Double(n) => n.to_bits().to_be_bytes().to_vec(),
      Value::Char(c) => vec![*c],
      Value::String(s) => s.as_bytes().to_vec(),
    }
  }

  fn as_i128(&self) -> Option<i128> {
    match self {
      Value::Int8(n) => Some(*n as i128),
      Value::Int16(n) => Some(*n as i128),
      Value::Int32(n) => Some(*n as i128),
      Value::Int64(n) => Some(*n as i128),
      _ => None,
    }
  }

  fn as_f64(&self) -> Option<f64> {
    match self {
      Value::Int8(n) => Some(*n as f64),
      Value::Int16(n) => Some(*n as f64),
      Value::Int32(n) => Some(*n as f64),
      Value::Int64(n) => Some(*n as f64),
      Value::Float(n) => Some(*n as f64),
      Value::Double(n) => Some(*n as f64),
      _ => None,
    }
  }

  fn numeric_binary_op(
    &self,
    rhs: &Value,
    int_op: impl Fn(i128, i128) -> i128,
    float_op: impl Fn(f64, f64) -> f64,
  ) -> Result<Value, RuntimeError> {
    if !self.is_number() || !rhs.is_number() {
      return Err(bad_operand("Operands must be numbers."));
    }
    let target = smallest_type_needed(self.value_type(), rhs.value_type());
    Ok(match target {
      ValueType::Int8 => {
        Value::Int8(int_op(self.as_i128().unwrap(), rhs.as_i128().unwrap()) as i8)
      }
      ValueType::Int16 => {
        Value::Int16(int_op(self.as_i128().unwrap(), rhs.as_i128().unwrap()) as i16)
      }
      ValueType::Int32 => {
        Value::Int32(int_op(self.as_i128().unwrap(), rhs.as_i128().unwrap()) as i32)
      }
      ValueType::Int64 => {
        Value::Int64(int_op(self.as_i128().unwrap(), rhs.as_i128().unwrap()) as i64)
      }
      ValueType::Float => {
        Value::Float(float_op(self.as_f64().unwrap(), rhs.as_f64().unwrap()) as f32)
      }
      ValueType::Double => Value::Double(float_op(self.as_f64().unwrap(), rhs.as_f64().unwrap())),
      _ => unreachable!("smallest_type_needed over two numeric types is numeric"),
    })
  }

  pub fn add(&self, rhs: &Value) -> Result<Value, RuntimeError> {
    self.numeric_binary_op(rhs, |a, b| a + b, |a, b| a + b)
  }

  pub fn sub(&self, rhs: &Value) -> Result<Value, RuntimeError> {
    self.numeric_binary_op(rhs, |a, b| a - b, |a, b| a - b)
  }

  pub fn mul(&self, rhs: &Value) -> Result<Value, RuntimeError> {
    self.numeric_binary_op(rhs, |a, b| a * b, |a, b| a * b)
  }

  pub fn div(&self, rhs: &Value) -> Result<Value, RuntimeError> {
    self.numeric_binary_op(rhs, |a, b| a / b, |a, b| a / b)
  }

  pub fn concat(&self, rhs: &Value) -> Result<Value, RuntimeError> {
    match (self, rhs) {
      (Value::String(a), Value::String(b)) => {
        Ok(Value::String(Rc::from(format!("{a}{b}").as_str())))
      }
      _ => Err(bad_operand("Operands must be strings.")),
    }
  }

  pub fn negate(&self) -> Result<Value, RuntimeError> {
    match self {
      Value::Int8(n) => Ok(Value::Int8(-n)),
      Value::Int16(n) => Ok(Value::Int16(-n)),
      Value::Int32(n) => Ok(Value::Int32(-n)),
      Value::Int64(n) => Ok(Value::Int64(-n)),
      Value::Float(n) => Ok(Value::Float(-n)),
      Value::Double(n) => Ok(Value::Double(-n)),
      _ => Err(bad_operand("Operand must be a number.")),
    }
  }

  pub fn not(&self) -> Value {
    Value::Bool(!self.truthy())
  }

  /// Numeric comparison. The compiler only ever emits `Less`/`Greater`/...
  /// for operands it has statically proven numeric; this still returns a
  /// `Result` because hand-assembled bytecode (see the VM's unit tests) can
  /// violate that invariant.
  pub fn partial_cmp_numeric(&self, rhs: &Value) -> Result<std::cmp::Ordering, RuntimeError> {
    if !self.is_number() || !rhs.is_number() {
      return Err(bad_operand("Operands must be numbers."));
    }
    let (a, b) = (self.as_f64().unwrap(), rhs.as_f64().unwrap());
    a.partial_cmp(&b)
      .ok_or_else(|| bad_operand("Operands are not comparable."))
  }

  /// Re-tags a numeric value to `target`, truncating/widening as the target
  /// representation demands (e.g. `300i32` coerced to `Int8` becomes `44`).
  /// Returns `None` if either `self` or `target` isn't numeric.
  pub fn coerce_numeric(&self, target: ValueType) -> Option<Value> {
    if !self.is_number() || !target.is_number() {
      return None;
    }
    Some(match target {
      ValueType::Int8 => Value::Int8(self.as_i128()? as i8),
      ValueType::Int16 => Value::Int16(self.as_i128()? as i16),
      ValueType::Int32 => Value::Int32(self.as_i128()? as i32),
      ValueType::Int64 => Value::Int64(self.as_i128()? as i64),
      ValueType::Float => Value::Float(self.as_f64()? as f32),
      ValueType::Double => Value::Double(self.as_f64()?),
      _ => unreachable!("target.is_number() excludes all other variants"),
    })
  }
}

fn bad_operand(message: &str) -> RuntimeError {
  // The line is unknown here; the VM fills it in when it catches this error.
  RuntimeError { line: 0, message: message.to_owned() }
}

impl PartialEq for Value {
  /// `Invalid` compares unequal to every value, including other `Invalid`.
  /// Equal numeric widths compare across tags (`2 == 2.0` is `true`).
  fn eq(&self, other: &Self) -> bool {
    if matches!(self, Value::Invalid) || matches!(other, Value::Invalid) {
      return false;
    }
    match (self, other) {
      (Value::Null, Value::Null) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Char(a), Value::Char(b)) => a == b,
      (Value::String(a), Value::String(b)) => a == b,
      (a, b) if a.is_number() && b.is_number() => a.as_f64() == b.as_f64(),
      _ => false,
    }
  }
}

impl Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Invalid => write!(f, "<invalid>"),
      Value::Null => write!(f, "null"),
      Value::Bool(b) => write!(f, "{b}"),
      Value::Int8(n) => write!(f, "{n}"),
      Value::Int16(n) => write!(f, "{n}"),
      Value::Int32(n) => write!(f, "{n}"),
      Value::Int64(n) => write!(f, "{n}"),
      Value::Float(n) => write!(f, "{n}"),
      Value::Double(n) => write!(f, "{n}"),
      Value::Char(c) => write!(f, "'{}'", *c as char),
      Value::String(s) => write!(f, "\"{s}\""),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn invalid_never_equals_anything() {
    assert_ne!(Value::Invalid, Value::Invalid);
    assert_ne!(Value::Invalid, Value::Int32(0));
  }

  #[test]
  fn equality_crosses_numeric_widths() {
    assert_eq!(Value::Int32(2), Value::Double(2.0));
    assert_eq!(Value::Int8(5), Value::Int64(5));
  }

  #[test]
  fn big_endian_serialization() {
    let bytes = Value::Int32(1).to_bytes();
    assert_eq!(bytes, vec![0, 0, 0, 1]);
    assert_eq!(bytes[0], 0);
  }

  #[test]
  fn coercion_picks_wider_tag() {
    let sum = Value::Int8(1).add(&Value::Int32(2)).unwrap();
    assert_eq!(sum.value_type(), ValueType::Int32);
    match sum {
      Value::Int32(3) => {}
      other => panic!("expected Int32(3), got {other:?}"),
    }
  }

  #[test]
  fn string_concat_discipline() {
    let a = Value::String(Rc::from("a"));
    let b = Value::String(Rc::from("b"));
    let joined = a.concat(&b).unwrap();
    match joined {
      Value::String(s) => assert_eq!(&*s, "ab"),
      _ => panic!("expected string"),
    }
    assert!(a.add(&Value::Int32(1)).is_err());
  }

  #[test]
  fn narrowing_coercion_truncates() {
    let coerced = Value::Int32(300).coerce_numeric(ValueType::Int8).unwrap();
    assert_eq!(coerced, Value::Int8(44));
  }
}
