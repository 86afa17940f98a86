use super::*;

impl Parser {
  fn is_type_decl_keyword(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(kind, Int8 | Int16 | Int32 | Int64 | FloatKw | Double | CharKw | StringKw | Bool | Var)
  }

  /// `declaration := varDecl | statement`, synchronizing on error.
  pub(crate) fn declaration(&mut self) {
    if Self::is_type_decl_keyword(self.current.kind) {
      self.var_declaration();
    } else {
      self.statement();
    }
    if self.panic_mode {
      self.synchronize();
    }
  }

  /// `statement := expression ';'` — the only statement form this grammar
  /// supports; its value is simply left on the stack (there is no `Pop`
  /// opcode in this ISA).
  pub(crate) fn statement(&mut self) {
    self.expression_statement();
  }

  pub(crate) fn expression_statement(&mut self) {
    self.expression();
    self.consume(TokenKind::Semicolon, "Expect ';' after expression.");
  }

  /// Skip tokens until a likely statement boundary, so one error doesn't
  /// cascade into a pile of spurious follow-on errors.
  pub(crate) fn synchronize(&mut self) {
    self.panic_mode = false;
    while self.current.kind != TokenKind::Eof {
      if self.previous.kind == TokenKind::Semicolon {
        return;
      }
      use TokenKind::*;
      match self.current.kind {
        Class | Var | For | If | Return | While | Int8 | Int16 | Int32 | Int64 | FloatKw
        | Double | CharKw | StringKw | Bool => return,
        _ => {}
      }
      self.advance_token();
    }
  }
}
