use super::*;
use crate::chunk::OpCode;
use crate::value::{Value, ValueType};

impl Parser {
  /// `varDecl := (int8|...|bool|var) Identifier ('=' expression)? ';'`
  pub(crate) fn var_declaration(&mut self) {
    let declared_type = self.consume_type_decl_keyword();
    self.consume(TokenKind::Identifier, "Expect variable name.");
    let name_token = self.previous.clone();

    if self.declared_variables.contains_key(&name_token.lexeme) {
      self.error(format!("Variable {} already declared.", name_token.lexeme));
    } else {
      self.declared_variables.insert(name_token.lexeme.clone(), declared_type);
    }

    if self.match_token(TokenKind::Equal) {
      let final_type = self.assign_var(declared_type, &name_token);
      self.declared_variables.insert(name_token.lexeme.clone(), final_type);
      self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.");
      let name_index = self.identifier_constant(&name_token.lexeme);
      self.emit_bytes(&[OpCode::VarDeclarAndAssign as u8, name_index]);
    } else {
      if declared_type == ValueType::Null {
        self.error("Variables declared with 'var' keyword must be assigned at declaration.".to_owned());
      }
      self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.");
      let name_index = self.identifier_constant(&name_token.lexeme);
      self.emit_bytes(&[OpCode::VarDeclar as u8, declared_type as u8, name_index]);
    }
  }

  fn consume_type_decl_keyword(&mut self) -> ValueType {
    use TokenKind::*;
    let value_type = match self.current.kind {
      Int8 => ValueType::Int8,
      Int16 => ValueType::Int16,
      Int32 => ValueType::Int32,
      Int64 => ValueType::Int64,
      FloatKw => ValueType::Float,
      Double => ValueType::Double,
      CharKw => ValueType::Char,
      StringKw => ValueType::String,
      Bool => ValueType::Bool,
      Var => ValueType::Null,
      _ => ValueType::Invalid,
    };
    self.advance_token();
    value_type
  }

  /// Parses the right-hand side of an assignment, type-checks it against
  /// `declared_type` (or adopts the inferred type, for plain `var`), and
  /// returns the resolved type to store back into `declared_variables`.
  ///
  /// `char`/`string`/`bool` require an exact match. Numeric-to-numeric
  /// mismatches are accepted; a narrowing one (the target ordinal is
  /// smaller) also folds the literal in place and logs a warning.
  pub(crate) fn assign_var(&mut self, declared_type: ValueType, name_token: &Token) -> ValueType {
    self.parse_precedence(crate::compiler::Precedence::Assignment);
    let inferred = self.current_expression;
    let final_type = if declared_type == ValueType::Null { inferred } else { declared_type };

    if final_type == inferred {
      return final_type;
    }

    if final_type.is_number() && inferred.is_number() {
      self.coerce_last_literal(final_type);
      if (final_type as u8) < (inferred as u8) {
        log::warn!(
          "[line {}] Warning at '{}': Possible loss of data in conversion of {inferred} to {final_type}.",
          name_token.line,
          name_token.lexeme,
        );
      }
    } else {
      self.error(format!("Cannot assign {inferred} to {final_type}."));
    }

    final_type
  }

  pub(crate) fn identifier_constant(&mut self, lexeme: &str) -> u8 {
    self.make_constant(Value::String(std::rc::Rc::from(lexeme)))
  }

  /// `variable := Identifier ('=' expression)?`
  pub(crate) fn variable(&mut self, can_assign: bool) {
    let name_token = self.previous.clone();
    let declared_type = match self.declared_variables.get(&name_token.lexeme) {
      Some(&value_type) => value_type,
      None => {
        self.error(format!("Unknown variable '{}'.", name_token.lexeme));
        self.current_expression = ValueType::Invalid;
        return;
      }
    };

    if can_assign && self.match_token(TokenKind::Equal) {
      let final_type = self.assign_var(declared_type, &name_token);
      self.declared_variables.insert(name_token.lexeme.clone(), final_type);
      let name_index = self.identifier_constant(&name_token.lexeme);
      self.emit_bytes(&[OpCode::VarAssign as u8, name_index]);
    } else {
      self.current_expression = declared_type;
      let name_index = self.identifier_constant(&name_token.lexeme);
      self.emit_bytes(&[OpCode::Var as u8, name_index]);
    }
  }
}
