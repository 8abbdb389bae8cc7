//! Dieter - a statically typed, modular procedural language whose type
//! qualifiers are encapsulated by modules of the same name.
//!
//! This crate is the static checker: lexing, parsing, and a
//! qualifier-aware, directional type checker with multi-dispatch
//! resolution. There is no evaluator; the verdict on a program is either
//! OK or a list of diagnostics.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod types;
