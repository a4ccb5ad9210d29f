//! Runtime errors and non-local control flow
//!
//! Two channels leave a statement early. [`Signal`] carries language-level
//! exits (`break`, `continue`, `return`, `throw`); only a `try`/`catch` can
//! intercept a throw. [`RuntimeError`] is an internal error that no language
//! construct can catch; it unwinds to the driver, running `finally` blocks on
//! the way out.

use super::value::Object;
use crate::util::{find_similar_name, format_suggestion_hint};
use thiserror::Error;

/// Internal (non-catchable) error raised during evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("undefined variable `{name}`{hint}")]
    UndefinedVariable { name: String, hint: String },

    #[error("undefined function `{name}/{arity}`{hint}")]
    UndefinedFunction {
        name: String,
        arity: usize,
        hint: String,
    },

    #[error("undefined type `{name}`{hint}")]
    UndefinedType { name: String, hint: String },

    #[error("undefined member `{name}{}` on type `{ty}`", arity_suffix(.arity))]
    UndefinedMember {
        ty: String,
        name: String,
        arity: Option<usize>,
    },

    #[error("type mismatch: expected {expected}, received {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("non-exhaustive match: no case matched {subject}")]
    NonExhaustiveMatch { subject: String },

    #[error("invalid assignment target: {target}")]
    InvalidAssignmentTarget { target: String },

    #[error("`{name}` cannot be called with {found} argument(s) (expected {expected})")]
    ArityMismatch {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("property `{name}` on type `{ty}` is read only")]
    ReadOnlyProperty { ty: String, name: String },

    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    #[error("{kind} failed")]
    AssertionFailed { kind: &'static str },

    #[error("invalid control flow: {0}")]
    InvalidControlFlow(String),

    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    #[error("stack overflow: call depth exceeded {0}")]
    StackOverflow(usize),

    #[error("IO error: {0}")]
    Io(String),
}

fn arity_suffix(arity: &Option<usize>) -> String {
    arity.map(|a| format!("/{a}")).unwrap_or_default()
}

/// Edit distance accepted for "did you mean" hints
const SUGGESTION_THRESHOLD: usize = 2;

fn hint(name: &str, candidates: &[String]) -> String {
    let candidates: Vec<&str> = candidates.iter().map(String::as_str).collect();
    format_suggestion_hint(find_similar_name(name, &candidates, SUGGESTION_THRESHOLD))
}

impl RuntimeError {
    pub fn undefined_variable(name: &str, candidates: &[String]) -> Self {
        RuntimeError::UndefinedVariable {
            name: name.to_string(),
            hint: hint(name, candidates),
        }
    }

    pub fn undefined_function(name: &str, arity: usize, candidates: &[String]) -> Self {
        RuntimeError::UndefinedFunction {
            name: name.to_string(),
            arity,
            hint: hint(name, candidates),
        }
    }

    pub fn undefined_type(name: &str, candidates: &[String]) -> Self {
        RuntimeError::UndefinedType {
            name: name.to_string(),
            hint: hint(name, candidates),
        }
    }

    pub fn undefined_member(ty: &str, name: &str, arity: Option<usize>) -> Self {
        RuntimeError::UndefinedMember {
            ty: ty.to_string(),
            name: name.to_string(),
            arity,
        }
    }

    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        RuntimeError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn arity_mismatch(name: &str, expected: &[usize], found: usize) -> Self {
        let expected = expected
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        RuntimeError::ArityMismatch {
            name: name.to_string(),
            expected,
            found,
        }
    }

    pub fn arithmetic(message: impl Into<String>) -> Self {
        RuntimeError::Arithmetic(message.into())
    }

    pub fn index_out_of_bounds(index: i64, len: usize) -> Self {
        RuntimeError::Arithmetic(format!("index {index} out of bounds for length {len}"))
    }

    pub fn invalid_definition(message: impl Into<String>) -> Self {
        RuntimeError::InvalidDefinition(message.into())
    }
}

/// Language-level non-local exit
#[derive(Debug, Clone)]
pub enum Signal {
    Break(Option<String>),
    Continue(Option<String>),
    Return(Object),
    Throw(Object),
}

impl Signal {
    /// Whether a loop carrying `label` handles this break/continue
    pub fn targets(signal_label: &Option<String>, label: Option<&str>) -> bool {
        match signal_label {
            None => true,
            Some(target) => label == Some(target.as_str()),
        }
    }
}

/// Reason a statement stopped before completing normally
#[derive(Debug, Clone)]
pub enum Unwind {
    Signal(Signal),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(err: RuntimeError) -> Self {
        Unwind::Error(err)
    }
}

impl From<Signal> for Unwind {
    fn from(signal: Signal) -> Self {
        Unwind::Signal(signal)
    }
}

/// Result type for evaluation; `Ok` is normal completion
pub type EvalResult<T> = Result<T, Unwind>;

/// Failure surfaced to a driver
#[derive(Debug, Error)]
pub enum Failure {
    /// A thrown object escaped every `try`
    #[error("uncaught exception: {rendered}")]
    Uncaught { rendered: String, object: Object },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("A main/0 function is not defined.")]
    NoMain,

    #[error("Found multiple main/0 functions in types [{}].", .0.join(", "))]
    MultipleMain(Vec<String>),
}
