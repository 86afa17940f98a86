//! # Errors
//!
//! Error types surfaced by the scanner, compiler and VM.
//!
//! The scanner never raises an error of its own: it encodes failures as
//! `Token::Error` tokens (see [`crate::scanner`]) and it's the compiler that
//! turns those into a [`CompileError`] at the point they're consumed.

use thiserror::Error;

/// A compile-time failure: unexpected token, type mismatch, constant
/// overflow, redeclared/unknown variable, etc.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[line {line}] Error{}: {message}", at.as_ref().map(|a| format!(" at '{a}'")).unwrap_or_default())]
pub struct CompileError {
    pub line: usize,
    pub at: Option<String>,
    pub message: String,
}

/// A failure discovered while executing bytecode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} [line {line}] in script")]
pub struct RuntimeError {
    pub line: usize,
    pub message: String,
}

/// Top-level result of [`crate::vm::VM::interpret`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
