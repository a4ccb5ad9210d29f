//! Tree-walking interpreter
//!
//! Evaluation proceeds in two steps. [`Interpreter::evaluate`] declares and
//! defines the types of a source file, then [`Interpreter::invoke_main`]
//! runs the single `main/0` function among them.

mod define;
mod env;
mod error;
mod eval;
mod pattern;
mod scope;
mod value;

pub use env::{Environment, Property, Type, TypeLoader, TypeRef};
pub use error::{EvalResult, Failure, RuntimeError, Signal, Unwind};
pub use eval::Interpreter;
pub use scope::{child_scope, Scope, ScopeRef, Variable, VariableRef};
pub use value::{Function, ListRef, MapRef, NativeFn, Object, Payload};

/// Default limit on nested calls
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Interpreter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Calls nested deeper than this raise a stack overflow error
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
