//! # Scanner
//!
//! A character cursor over the source string producing a finite sequence of
//! [`Token`]s terminated by a single `Eof`. The scanner never recovers on
//! its own: lexical failures are encoded as `Error` tokens carrying the
//! message as their lexeme, and it's up to the compiler to raise them at
//! the point they're consumed.

/// Every token kind the language can produce.
#[repr(u8)]
#[derive(Debug, enum_repr::EnumFromU8, PartialEq, Eq, Hash, Clone, Copy)]
pub enum TokenKind {
  // Punctuation.
  LeftParen,
  RightParen,
  LeftBrace,
  RightBrace,
  Comma,
  Dot,
  Minus,
  Plus,
  Semicolon,
  Slash,
  Star,
  // One or two character operators.
  Bang,
  BangEqual,
  Equal,
  EqualEqual,
  Greater,
  GreaterEqual,
  Less,
  LessEqual,
  And,
  Or,
  // Literals.
  Identifier,
  Character,
  String,
  Integer,
  Float,
  // Type-declaration keywords.
  Int8,
  Int16,
  Int32,
  Int64,
  FloatKw,
  Double,
  CharKw,
  StringKw,
  Bool,
  Var,
  // Control keywords (reserved; unused by the supported grammar).
  Class,
  Else,
  False,
  For,
  If,
  Return,
  Super,
  This,
  True,
  While,
  // Terminals.
  Error,
  Eof,
}

/// A scanned lexical unit. `lexeme` is owned (not borrowed) so the compiler
/// can tokenize the whole source up front and hold the token stream past
/// the scanner's lifetime.
#[derive(Debug, Clone)]
pub struct Token {
  pub kind: TokenKind,
  pub lexeme: String,
  pub line: usize,
}

impl Default for Token {
  fn default() -> Self {
    Self { kind: TokenKind::Eof, lexeme: String::new(), line: 1 }
  }
}

fn keyword_kind(lexeme: &str) -> Option<TokenKind> {
  Some(match lexeme {
    "class" => TokenKind::Class,
    "else" => TokenKind::Else,
    "false" => TokenKind::False,
    "for" => TokenKind::For,
    "if" => TokenKind::If,
    "return" => TokenKind::Return,
    "super" => TokenKind::Super,
    "this" => TokenKind::This,
    "true" => TokenKind::True,
    "var" => TokenKind::Var,
    "while" => TokenKind::While,
    "int8" => TokenKind::Int8,
    "int16" => TokenKind::Int16,
    "int32" => TokenKind::Int32,
    "int64" => TokenKind::Int64,
    "float" => TokenKind::FloatKw,
    "double" => TokenKind::Double,
    "char" => TokenKind::CharKw,
    "string" => TokenKind::StringKw,
    "bool" => TokenKind::Bool,
    _ => return None,
  })
}

/// Decodes one character literal body (without the surrounding quotes),
/// honoring the escape table `\\ \n \r \0 \' \"`.
pub(crate) fn decode_char_escape(escape: u8) -> Option<u8> {
  Some(match escape {
    b'\\' => b'\\',
    b'n' => b'\n',
    b'r' => b'\r',
    b'0' => 0,
    b'\'' => b'\'',
    b'"' => b'"',
    _ => return None,
  })
}

/// A character cursor over the source; maintains the current byte offset
/// and the current 1-based source line.
#[derive(Debug)]
pub struct Scanner<'a> {
  source: &'a str,
  start: usize,
  current: usize,
  line: usize,
}

impl<'a> Scanner<'a> {
  pub fn new(source: &'a str) -> Self {
    Self { source, start: 0, current: 0, line: 1 }
  }

  /// Tokenizes the whole source eagerly, terminated by a single `Eof`.
  pub fn tokenize(mut self) -> Vec<Token> {
    let mut tokens = Vec::new();
    loop {
      let token = self.scan_token();
      let done = token.kind == TokenKind::Eof;
      tokens.push(token);
      if done {
        break;
      }
    }
    tokens
  }

  fn is_at_end(&self) -> bool {
    self.current >= self.source.len()
  }

  fn advance(&mut self) -> u8 {
    self.current += 1;
    self.source.as_bytes()[self.current - 1]
  }

  fn match_next(&mut self, expected: u8) -> bool {
    if self.is_at_end() || self.source.as_bytes()[self.current] != expected {
      return false;
    }
    self.current += 1;
    true
  }

  fn peek(&self) -> u8 {
    if self.is_at_end() {
      b'\0'
    } else {
      self.source.as_bytes()[self.current]
    }
  }

  fn peek_next(&self) -> u8 {
    if self.current + 1 >= self.source.len() {
      b'\0'
    } else {
      self.source.as_bytes()[self.current + 1]
    }
  }

  fn skip_whitespace(&mut self) {
    loop {
      match self.peek() {
        b' ' | b'\r' | b'\t' => {
          self.advance();
        }
        b'\n' => {
          self.line += 1;
          self.advance();
        }
        b'/' => {
          if self.peek_next() == b'/' {
            while self.peek() != b'\n' && !self.is_at_end() {
              self.advance();
            }
          } else {
            return;
          }
        }
        _ => return,
      }
    }
  }

  fn make_token(&self, kind: TokenKind) -> Token {
    Token { kind, lexeme: self.source[self.start..self.current].to_owned(), line: self.line }
  }

  fn error_token(&self, message: &str) -> Token {
    Token { kind: TokenKind::Error, lexeme: message.to_owned(), line: self.line }
  }

  fn string(&mut self) -> Token {
    while self.peek() != b'"' && !self.is_at_end() {
      if self.peek() == b'\n' {
        self.line += 1;
      }
      self.advance();
    }
    if self.is_at_end() {
      return self.error_token("Unterminated string.");
    }
    self.advance();
    self.make_token(TokenKind::String)
  }

  fn character(&mut self) -> Token {
    if self.peek() == b'\'' {
      self.advance();
      return self.error_token("Empty character literal.");
    }
    if self.peek() == b'\\' {
      self.advance();
      if decode_char_escape(self.peek()).is_none() {
        return self.error_token("Invalid escape sequence in character literal.");
      }
      self.advance();
    } else if self.is_at_end() {
      return self.error_token("Unterminated character literal.");
    } else {
      self.advance();
    }
    if !self.match_next(b'\'') {
      return self.error_token("Unterminated character literal.");
    }
    self.make_token(TokenKind::Character)
  }

  fn number(&mut self) -> Token {
    while self.peek().is_ascii_digit() {
      self.advance();
    }
    let mut is_float = false;
    if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
      is_float = true;
      self.advance();
      while self.peek().is_ascii_digit() {
        self.advance();
      }
    }
    self.make_token(if is_float { TokenKind::Float } else { TokenKind::Integer })
  }

  fn identifier(&mut self) -> Token {
    while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
      self.advance();
    }
    let lexeme = &self.source[self.start..self.current];
    self.make_token(keyword_kind(lexeme).unwrap_or(TokenKind::Identifier))
  }

  /// Scans and returns the next token, including `Eof` at the end.
  pub fn scan_token(&mut self) -> Token {
    self.skip_whitespace();
    self.start = self.current;

    if self.is_at_end() {
      return self.make_token(TokenKind::Eof);
    }

    let c = self.advance();

    if c.is_ascii_digit() {
      return self.number();
    }
    if c.is_ascii_alphabetic() || c == b'_' {
      return self.identifier();
    }

    match c {
      b'(' => self.make_token(TokenKind::LeftParen),
      b')' => self.make_token(TokenKind::RightParen),
      b'{' => self.make_token(TokenKind::LeftBrace),
      b'}' => self.make_token(TokenKind::RightBrace),
      b';' => self.make_token(TokenKind::Semicolon),
      b',' => self.make_token(TokenKind::Comma),
      b'.' => self.make_token(TokenKind::Dot),
      b'-' => self.make_token(TokenKind::Minus),
      b'+' => self.make_token(TokenKind::Plus),
      b'/' => self.make_token(TokenKind::Slash),
      b'*' => self.make_token(TokenKind::Star),
      b'!' => {
        if self.match_next(b'=') {
          self.make_token(TokenKind::BangEqual)
        } else {
          self.make_token(TokenKind::Bang)
        }
      }
      b'=' => {
        if self.match_next(b'=') {
          self.make_token(TokenKind::EqualEqual)
        } else {
          self.make_token(TokenKind::Equal)
        }
      }
      b'<' => {
        if self.match_next(b'=') {
          self.make_token(TokenKind::LessEqual)
        } else {
          self.make_token(TokenKind::Less)
        }
      }
      b'>' => {
        if self.match_next(b'=') {
          self.make_token(TokenKind::GreaterEqual)
        } else {
          self.make_token(TokenKind::Greater)
        }
      }
      b'&' => {
        if self.match_next(b'&') {
          self.make_token(TokenKind::And)
        } else {
          self.error_token("Expected another '&'")
        }
      }
      b'|' => {
        if self.match_next(b'|') {
          self.make_token(TokenKind::Or)
        } else {
          self.error_token("Expected another '|'")
        }
      }
      b'\'' => self.character(),
      b'"' => self.string(),
      _ => self.error_token("Unexpected character."),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(src: &str) -> Vec<TokenKind> {
    Scanner::new(src).tokenize().into_iter().map(|t| t.kind).collect()
  }

  #[test]
  fn punctuation_and_operators() {
    assert_eq!(
      kinds("( ) { } , . ; + - * / ! != = == < <= > >= && ||"),
      vec![
        TokenKind::LeftParen,
        TokenKind::RightParen,
        TokenKind::LeftBrace,
        TokenKind::RightBrace,
        TokenKind::Comma,
        TokenKind::Dot,
        TokenKind::Semicolon,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::Bang,
        TokenKind::BangEqual,
        TokenKind::Equal,
        TokenKind::EqualEqual,
        TokenKind::Less,
        TokenKind::LessEqual,
        TokenKind::Greater,
        TokenKind::GreaterEqual,
        TokenKind::And,
        TokenKind::Or,
        TokenKind::Eof,
      ]
    );
  }

  #[test]
  fn line_tracking_across_newlines() {
    let tokens = Scanner::new("1;\n2;\n3;").tokenize();
    let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
    assert_eq!(lines, vec![1, 1, 2, 2, 3, 3, 3]);
  }

  #[test]
  fn keywords_and_identifiers() {
    assert_eq!(kinds("var x int32"), vec![TokenKind::Var, TokenKind::Identifier, TokenKind::Int32, TokenKind::Eof]);
  }

  #[test]
  fn empty_char_literal_is_rejected() {
    let tokens = Scanner::new("''").tokenize();
    assert_eq!(tokens[0].kind, TokenKind::Error);
  }

  #[test]
  fn unterminated_string_is_an_error_token() {
    let tokens = Scanner::new("\"abc").tokenize();
    assert_eq!(tokens[0].kind, TokenKind::Error);
  }

  #[test]
  fn integer_vs_float() {
    assert_eq!(kinds("5"), vec![TokenKind::Integer, TokenKind::Eof]);
    assert_eq!(kinds("5.5"), vec![TokenKind::Float, TokenKind::Eof]);
  }
}
