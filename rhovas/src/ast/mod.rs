//! Abstract Syntax Tree definitions
//!
//! Function, constructor and lambda bodies are reference counted so the
//! interpreter can capture them in closures that outlive a single evaluation.

mod expr;
mod span;
mod stmt;

pub use expr::*;
pub use span::*;
pub use stmt::*;

use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A source file: imports followed by members
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Source {
    pub imports: Vec<Import>,
    pub members: Vec<Member>,
}

/// `import A.B.C [as Name];`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub path: Vec<String>,
    pub alias: Option<String>,
}

impl Import {
    /// Dotted name of the imported type
    pub fn qualified_name(&self) -> String {
        self.path.join(".")
    }

    /// Name the import is bound to in the importing module
    pub fn binding(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.last().map(String::as_str).unwrap_or_default(),
        }
    }
}

/// Type annotation. Parsed and kept for tooling, ignored at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeName {
    pub name: String,
    pub generics: Vec<TypeName>,
}

impl TypeName {
    pub fn simple(name: impl Into<String>) -> Self {
        TypeName {
            name: name.into(),
            generics: Vec::new(),
        }
    }
}

/// Function or constructor parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeName>,
}

/// Member of a source file or component body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Member {
    Component(Rc<Component>),
    Property(Rc<Property>),
    Constructor(Rc<Constructor>),
    Function(Rc<FunctionDef>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentKind {
    Class,
    Interface,
    Struct,
}

impl ComponentKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ComponentKind::Class => "class",
            ComponentKind::Interface => "interface",
            ComponentKind::Struct => "struct",
        }
    }
}

/// `class`, `interface` or `struct` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub kind: ComponentKind,
    pub name: String,
    pub extends: Vec<TypeName>,
    pub members: Vec<Member>,
    pub span: Span,
}

impl Component {
    /// Instance properties in declaration order
    pub fn properties(&self) -> impl Iterator<Item = &Rc<Property>> {
        self.members.iter().filter_map(|member| match member {
            Member::Property(property) => Some(property),
            _ => None,
        })
    }
}

/// `var`/`val` member: a static variable at module level, a field inside a component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub mutable: bool,
    pub name: String,
    pub ty: Option<TypeName>,
    pub value: Option<Rc<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constructor {
    pub params: Vec<Param>,
    pub body: Rc<Stmt>,
    pub span: Span,
}

/// `func name(params) [: Type] body`; `name` may be an operator such as `+` or `[]=`.
/// An interface may declare a function without a body (`func area();`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Option<TypeName>,
    pub body: Option<Rc<Stmt>>,
    pub span: Span,
}

impl FunctionDef {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}
