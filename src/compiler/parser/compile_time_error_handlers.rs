use super::*;
use crate::errors::CompileError;

impl Parser {
  /// Report an error at the current (not yet consumed) token.
  pub(crate) fn error_at_current(&mut self, message: String) {
    self.error_at(true, message);
  }

  /// Report an error at the previous (just consumed) token.
  pub(crate) fn error(&mut self, message: String) {
    self.error_at(false, message);
  }

  fn error_at(&mut self, at_current: bool, message: String) {
    if self.panic_mode {
      return;
    }
    self.panic_mode = true;
    self.had_error = true;

    let token = if at_current { &self.current } else { &self.previous };
    let at = match token.kind {
      TokenKind::Eof => Some("end".to_owned()),
      TokenKind::Error => None,
      _ => Some(token.lexeme.clone()),
    };
    let err = CompileError { line: token.line, at, message };
    log::error!("{err}");
  }
}
