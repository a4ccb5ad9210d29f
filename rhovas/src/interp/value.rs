//! Runtime values
//!
//! Every value is an [`Object`]: a reference to its [`Type`] plus a
//! [`Payload`]. Lists, maps and instance scopes are shared by reference, so
//! copying an `Object` aliases rather than clones that state.

use super::env::TypeRef;
use super::error::{EvalResult, RuntimeError};
use super::scope::ScopeRef;
use super::Interpreter;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type ListRef = Rc<RefCell<Vec<Object>>>;
pub type MapRef = Rc<RefCell<IndexMap<String, Object>>>;

/// Host-level callable body. Methods and property accessors receive the
/// receiver as the first element of the argument vector.
pub type NativeFn = dyn Fn(&mut Interpreter, Vec<Object>) -> EvalResult<Object>;

/// Callable entry in a scope or type table, resolved by `(name, arity)`
#[derive(Clone)]
pub struct Function {
    pub name: Rc<str>,
    pub arity: usize,
    body: Rc<NativeFn>,
}

impl Function {
    pub fn new(
        name: impl Into<Rc<str>>,
        arity: usize,
        body: impl Fn(&mut Interpreter, Vec<Object>) -> EvalResult<Object> + 'static,
    ) -> Self {
        Function {
            name: name.into(),
            arity,
            body: Rc::new(body),
        }
    }

    /// Runs the body without depth accounting; see [`Interpreter::invoke`].
    pub(crate) fn call(&self, interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
        (self.body)(interp, args)
    }

    pub fn same_body(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// Payload carried by an [`Object`]
#[derive(Clone)]
pub enum Payload {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Character(char),
    String(Rc<str>),
    Atom(Rc<str>),
    List(ListRef),
    Map(MapRef),
    Lambda(Function),
    /// User-defined instance; fields are variables in this scope
    Instance(ScopeRef),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Null => "Null",
            Payload::Boolean(_) => "Boolean",
            Payload::Integer(_) => "Integer",
            Payload::Decimal(_) => "Decimal",
            Payload::Character(_) => "Character",
            Payload::String(_) => "String",
            Payload::Atom(_) => "Atom",
            Payload::List(_) => "List",
            Payload::Map(_) => "Map",
            Payload::Lambda(_) => "Lambda",
            Payload::Instance(_) => "Instance",
        }
    }
}

/// Typed runtime value
#[derive(Clone)]
pub struct Object {
    pub ty: TypeRef,
    pub payload: Payload,
}

impl Object {
    pub fn new(ty: TypeRef, payload: Payload) -> Self {
        Object { ty, payload }
    }

    pub fn type_name(&self) -> &str {
        &self.ty.name
    }

    fn mismatch(&self, expected: &str) -> RuntimeError {
        RuntimeError::type_mismatch(expected, self.type_name())
    }

    pub fn is_null(&self) -> bool {
        matches!(self.payload, Payload::Null)
    }

    pub fn as_boolean(&self) -> Result<bool, RuntimeError> {
        match self.payload {
            Payload::Boolean(b) => Ok(b),
            _ => Err(self.mismatch("Boolean")),
        }
    }

    pub fn as_integer(&self) -> Result<i64, RuntimeError> {
        match self.payload {
            Payload::Integer(n) => Ok(n),
            _ => Err(self.mismatch("Integer")),
        }
    }

    pub fn as_decimal(&self) -> Result<f64, RuntimeError> {
        match self.payload {
            Payload::Decimal(n) => Ok(n),
            _ => Err(self.mismatch("Decimal")),
        }
    }

    pub fn as_character(&self) -> Result<char, RuntimeError> {
        match self.payload {
            Payload::Character(c) => Ok(c),
            _ => Err(self.mismatch("Character")),
        }
    }

    pub fn as_str(&self) -> Result<&str, RuntimeError> {
        match &self.payload {
            Payload::String(s) => Ok(s),
            _ => Err(self.mismatch("String")),
        }
    }

    pub fn as_atom(&self) -> Result<&str, RuntimeError> {
        match &self.payload {
            Payload::Atom(name) => Ok(name),
            _ => Err(self.mismatch("Atom")),
        }
    }

    pub fn as_list(&self) -> Result<&ListRef, RuntimeError> {
        match &self.payload {
            Payload::List(list) => Ok(list),
            _ => Err(self.mismatch("List")),
        }
    }

    pub fn as_map(&self) -> Result<&MapRef, RuntimeError> {
        match &self.payload {
            Payload::Map(map) => Ok(map),
            _ => Err(self.mismatch("Map")),
        }
    }

    pub fn as_lambda(&self) -> Result<&Function, RuntimeError> {
        match &self.payload {
            Payload::Lambda(function) => Ok(function),
            _ => Err(self.mismatch("Lambda")),
        }
    }

    pub fn as_instance(&self) -> Option<&ScopeRef> {
        match &self.payload {
            Payload::Instance(scope) => Some(scope),
            _ => None,
        }
    }

    /// `===`: identity for shared payloads, value equality for primitives.
    /// Never dispatches to user code.
    pub fn identical(&self, other: &Object) -> bool {
        if !Rc::ptr_eq(&self.ty, &other.ty) {
            return false;
        }
        match (&self.payload, &other.payload) {
            (Payload::Null, Payload::Null) => true,
            (Payload::Boolean(a), Payload::Boolean(b)) => a == b,
            (Payload::Integer(a), Payload::Integer(b)) => a == b,
            (Payload::Decimal(a), Payload::Decimal(b)) => a.to_bits() == b.to_bits(),
            (Payload::Character(a), Payload::Character(b)) => a == b,
            (Payload::String(a), Payload::String(b)) => a == b,
            (Payload::Atom(a), Payload::Atom(b)) => a == b,
            (Payload::List(a), Payload::List(b)) => Rc::ptr_eq(a, b),
            (Payload::Map(a), Payload::Map(b)) => Rc::ptr_eq(a, b),
            (Payload::Lambda(a), Payload::Lambda(b)) => a.same_body(b),
            (Payload::Instance(a), Payload::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Null => write!(f, "null"),
            Payload::Boolean(b) => write!(f, "{b}"),
            Payload::Integer(n) => write!(f, "{n}"),
            Payload::Decimal(n) => write!(f, "{n:?}"),
            Payload::Character(c) => write!(f, "{c:?}"),
            Payload::String(s) => write!(f, "{s:?}"),
            Payload::Atom(name) => write!(f, ":{name}"),
            Payload::List(list) => f.debug_list().entries(list.borrow().iter()).finish(),
            Payload::Map(map) => f.debug_map().entries(map.borrow().iter()).finish(),
            Payload::Lambda(function) => write!(f, "<lambda {function:?}>"),
            Payload::Instance(_) => write!(f, "<{}>", self.ty.name),
        }
    }
}
