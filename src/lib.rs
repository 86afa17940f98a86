//! # Iliad
//!
//! A single-pass bytecode compiler and stack VM for a small statically-typed
//! expression/statement language: source goes straight from the scanner
//! through a Pratt-parsing compiler into a [`chunk::Chunk`], which the
//! [`vm::VM`] then executes directly, with no intermediate AST.

pub mod chunk;
pub mod compiler;
pub mod debug;
pub mod errors;
pub mod scanner;
pub mod value;
pub mod vm;
