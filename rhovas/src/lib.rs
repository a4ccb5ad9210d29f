//! Rhovas Interpreter Library
//!
//! A tree-walking interpreter for Rhovas, a language for API design and
//! enforcement.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod stdlib;
pub mod util;

pub use ast::Span;
pub use error::{CompileError, Result};
pub use interp::{Config, Failure, Interpreter, Object, RuntimeError};
