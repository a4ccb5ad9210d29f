//! Statement and pattern AST nodes

use super::{Expr, TypeName};
use serde::{Deserialize, Serialize};

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// `expr;`
    Expression(Expr),

    /// `{ stmts }`
    Block(Vec<Stmt>),

    /// `label: stmt`
    Label { label: String, stmt: Box<Stmt> },

    /// `var|val name [: Type] [= value];`
    Declaration {
        mutable: bool,
        name: String,
        ty: Option<TypeName>,
        value: Option<Expr>,
    },

    /// `receiver = value;` where the receiver must be an access or index expression
    Assignment { receiver: Expr, value: Expr },

    If {
        cond: Expr,
        then_stmt: Box<Stmt>,
        else_stmt: Option<Box<Stmt>>,
    },

    /// `match [(args)] { patterns: stmt ... }`
    Match { args: Vec<Expr>, cases: Vec<MatchCase> },

    For {
        name: String,
        iterable: Expr,
        body: Box<Stmt>,
    },

    While { cond: Expr, body: Box<Stmt> },

    Try {
        body: Box<Stmt>,
        catches: Vec<CatchClause>,
        finally: Option<Box<Stmt>>,
    },

    Break(Option<String>),
    Continue(Option<String>),
    Throw(Expr),
    Return(Option<Expr>),

    Assert(Expr),
    Require(Expr),
    Ensure(Expr),
}

/// One `patterns: stmt` arm of a match; the arm is taken if any pattern matches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCase {
    pub patterns: Vec<Pattern>,
    pub body: Stmt,
}

/// `catch (name: Type) body`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchClause {
    pub name: String,
    pub ty: TypeName,
    pub body: Stmt,
}

/// Structural pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Pattern {
    /// Matches when the subject is `==` to the value
    Expression(Expr),
    /// Always matches; `None` is the `_` wildcard
    Variable(Option<String>),
    /// `[p1, p2, rest..]`
    List {
        elements: Vec<Pattern>,
        rest: Option<String>,
    },
    /// `{key: p, key, rest..}`
    Map {
        entries: Vec<(String, Pattern)>,
        rest: Option<String>,
    },
    /// `else [pattern]`
    Else(Option<Box<Pattern>>),
}
