//! Statement and expression evaluator

use super::env::{Environment, TypeLoader, TypeRef};
use super::error::{EvalResult, Failure, RuntimeError, Signal, Unwind};
use super::scope::{child_scope, Scope, ScopeRef};
use super::value::{Function, Object, Payload};
use super::Config;
use crate::ast::{BinaryOp, CatchClause, Expr, Lambda, Literal, Stmt};
use crate::stdlib::{self, Primitives, Stdlib};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::io::{self, Write};
use std::rc::Rc;

/// Stack growth parameters for deep recursion
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// The interpreter
pub struct Interpreter {
    /// Type registry and global scope
    env: Rc<Environment>,
    /// Innermost scope of the statement being executed
    scope: ScopeRef,
    /// Resolves types missing from the registry
    loader: Option<Rc<dyn TypeLoader>>,
    types: Primitives,
    config: Config,
    /// Current call depth
    depth: usize,
    out: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter with the standard library installed
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let env = Rc::new(Environment::new(Scope::new().into_ref()));
        let types = stdlib::install(&env);
        let scope = Rc::clone(env.scope());
        Interpreter {
            env,
            scope,
            loader: Some(Rc::new(Stdlib)),
            types,
            config,
            depth: 0,
            out: Box::new(io::stdout()),
        }
    }

    /// Redirect `print` output
    pub fn with_output(mut self, out: Box<dyn Write>) -> Self {
        self.out = out;
        self
    }

    /// Replace the loader consulted for unknown type names
    pub fn with_loader(mut self, loader: Rc<dyn TypeLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn env(&self) -> &Rc<Environment> {
        &self.env
    }

    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ============ Object Construction ============

    pub fn null(&self) -> Object {
        Object::new(Rc::clone(&self.types.null), Payload::Null)
    }

    pub fn boolean(&self, value: bool) -> Object {
        Object::new(Rc::clone(&self.types.boolean), Payload::Boolean(value))
    }

    pub fn integer(&self, value: i64) -> Object {
        Object::new(Rc::clone(&self.types.integer), Payload::Integer(value))
    }

    pub fn decimal(&self, value: f64) -> Object {
        Object::new(Rc::clone(&self.types.decimal), Payload::Decimal(value))
    }

    pub fn character(&self, value: char) -> Object {
        Object::new(Rc::clone(&self.types.character), Payload::Character(value))
    }

    pub fn string(&self, value: impl Into<Rc<str>>) -> Object {
        Object::new(Rc::clone(&self.types.string), Payload::String(value.into()))
    }

    pub fn atom(&self, name: impl Into<Rc<str>>) -> Object {
        Object::new(Rc::clone(&self.types.atom), Payload::Atom(name.into()))
    }

    pub fn list(&self, items: Vec<Object>) -> Object {
        Object::new(
            Rc::clone(&self.types.list),
            Payload::List(Rc::new(RefCell::new(items))),
        )
    }

    pub fn map(&self, entries: IndexMap<String, Object>) -> Object {
        Object::new(
            Rc::clone(&self.types.map),
            Payload::Map(Rc::new(RefCell::new(entries))),
        )
    }

    pub fn lambda(&self, function: Function) -> Object {
        Object::new(Rc::clone(&self.types.lambda), Payload::Lambda(function))
    }

    // ============ Scopes, Calls and Dispatch ============

    /// Runs `f` with `scope` as the current scope, restoring the previous
    /// scope on every exit path
    pub fn scoped<T>(&mut self, scope: ScopeRef, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = previous;
        result
    }

    /// Calls a function, enforcing the configured depth limit
    pub fn invoke(&mut self, function: &Function, args: Vec<Object>) -> EvalResult<Object> {
        if self.depth >= self.config.max_depth {
            return Err(RuntimeError::StackOverflow(self.config.max_depth).into());
        }
        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            function.call(self, args)
        });
        self.depth -= 1;
        result
    }

    /// Converts the outcome of a function body into its return value
    pub(crate) fn complete(&self, result: EvalResult<()>) -> EvalResult<Object> {
        match result {
            Ok(()) => Ok(self.null()),
            Err(Unwind::Signal(Signal::Return(value))) => Ok(value),
            Err(Unwind::Signal(Signal::Break(label))) => Err(escaped("break", &label).into()),
            Err(Unwind::Signal(Signal::Continue(label))) => {
                Err(escaped("continue", &label).into())
            }
            Err(other) => Err(other),
        }
    }

    /// Dispatches `receiver.name(args)` through the receiver's type
    pub fn call_method(
        &mut self,
        receiver: Object,
        name: &str,
        args: Vec<Object>,
    ) -> EvalResult<Object> {
        let Some(method) = receiver.ty.method(name, args.len()) else {
            return Err(
                RuntimeError::undefined_member(receiver.type_name(), name, Some(args.len())).into(),
            );
        };
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(receiver);
        full.extend(args);
        self.invoke(&method, full)
    }

    /// Invokes a lambda object
    pub fn call_lambda(&mut self, lambda: &Object, args: Vec<Object>) -> EvalResult<Object> {
        let function = lambda.as_lambda()?.clone();
        self.invoke(&function, args)
    }

    /// Receiver-less call: scope functions, then a lambda variable, then a
    /// constructor of a type not bound in scope (loading it if necessary)
    pub fn call_function(&mut self, name: &str, args: Vec<Object>) -> EvalResult<Object> {
        let arity = args.len();
        let function = self.scope.borrow().lookup_function(name, arity);
        if let Some(function) = function {
            return self.invoke(&function, args);
        }
        let variable = self.scope.borrow().lookup(name);
        if let Some(Payload::Lambda(function)) = variable.map(|variable| variable.get().payload) {
            return self.invoke(&function, args);
        }
        let known = self
            .scope
            .borrow()
            .lookup_type(name)
            .or_else(|| self.env.lookup_type(name));
        let ty = match known {
            Some(ty) => Some(ty),
            None => self.load_type(name)?,
        };
        if let Some(ty) = ty {
            if let Some(constructor) = ty.constructor(arity) {
                return self.invoke(&constructor, args);
            }
            let arities = ty.constructor_arities();
            if !arities.is_empty() {
                return Err(RuntimeError::arity_mismatch(name, &arities, arity).into());
            }
        }
        let candidates = self.scope.borrow().function_names();
        Err(RuntimeError::undefined_function(name, arity, &candidates).into())
    }

    /// `receiver.name`: an instance field, else a property accessor
    pub fn get_property(&mut self, receiver: &Object, name: &str) -> EvalResult<Object> {
        if let Some(instance) = receiver.as_instance() {
            let field = instance.borrow().local(name);
            if let Some(field) = field {
                return Ok(field.get());
            }
        }
        match receiver.ty.property(name) {
            Some(property) => self.invoke(&property.get, vec![receiver.clone()]),
            None => Err(RuntimeError::undefined_member(receiver.type_name(), name, None).into()),
        }
    }

    pub fn set_property(&mut self, receiver: &Object, name: &str, value: Object) -> EvalResult<()> {
        if let Some(instance) = receiver.as_instance() {
            let field = instance.borrow().local(name);
            if let Some(field) = field {
                field.set(value);
                return Ok(());
            }
        }
        let Some(property) = receiver.ty.property(name) else {
            return Err(RuntimeError::undefined_member(receiver.type_name(), name, None).into());
        };
        match property.set {
            Some(setter) => {
                self.invoke(&setter, vec![receiver.clone(), value])?;
                Ok(())
            }
            None => Err(RuntimeError::ReadOnlyProperty {
                ty: receiver.type_name().to_string(),
                name: name.to_string(),
            }
            .into()),
        }
    }

    /// `left == right` through the `==` method
    pub fn equals(&mut self, left: &Object, right: &Object) -> EvalResult<bool> {
        let result = self.call_method(left.clone(), "==", vec![right.clone()])?;
        Ok(result.as_boolean()?)
    }

    /// Ordering through the `compare` method
    pub fn compare(&mut self, left: &Object, right: &Object) -> EvalResult<Ordering> {
        let result = self.call_method(left.clone(), "compare", vec![right.clone()])?;
        match result.as_atom()? {
            "lt" => Ok(Ordering::Less),
            "eq" => Ok(Ordering::Equal),
            "gt" => Ok(Ordering::Greater),
            other => Err(RuntimeError::type_mismatch(":lt, :eq or :gt", format!(":{other}")).into()),
        }
    }

    /// Renders an object with its `toString` method
    pub fn stringify(&mut self, object: &Object) -> EvalResult<String> {
        if let Payload::String(value) = &object.payload {
            return Ok(value.to_string());
        }
        match object.ty.method("toString", 0) {
            Some(method) => {
                let rendered = self.invoke(&method, vec![object.clone()])?;
                Ok(rendered.as_str()?.to_string())
            }
            None => Ok(format!("<{}>", object.type_name())),
        }
    }

    /// Resolves a type name: lexical bindings, the registry, then the loader
    pub fn require_type(&mut self, name: &str) -> EvalResult<TypeRef> {
        let bound = self.scope.borrow().lookup_type(name);
        if let Some(ty) = bound.or_else(|| self.env.lookup_type(name)) {
            return Ok(ty);
        }
        if let Some(ty) = self.load_type(name)? {
            return Ok(ty);
        }
        let mut candidates = self.scope.borrow().type_names();
        candidates.extend(self.env.type_names());
        Err(RuntimeError::undefined_type(name, &candidates).into())
    }

    fn load_type(&mut self, name: &str) -> EvalResult<Option<TypeRef>> {
        let Some(loader) = self.loader.clone() else {
            return Ok(None);
        };
        loader.get_or_init(self, name)
    }

    pub(crate) fn write_line(&mut self, text: &str) -> Result<(), RuntimeError> {
        writeln!(self.out, "{text}").map_err(|e| RuntimeError::Io(e.to_string()))
    }

    /// Values produced by iterating `iterable` in a `for` loop
    pub fn iteration_items(&self, iterable: &Object) -> Result<Vec<Object>, RuntimeError> {
        match &iterable.payload {
            Payload::List(list) => Ok(list.borrow().clone()),
            Payload::Map(map) => Ok(map
                .borrow()
                .iter()
                .map(|(key, value)| self.list(vec![self.string(key.as_str()), value.clone()]))
                .collect()),
            Payload::String(value) => Ok(value.chars().map(|c| self.character(c)).collect()),
            _ => Err(RuntimeError::type_mismatch(
                "an iterable List, Map or String",
                iterable.type_name(),
            )),
        }
    }

    /// Converts an unwind that escaped evaluation into a driver-facing failure
    pub(crate) fn failure(&mut self, unwind: Unwind) -> Failure {
        match unwind {
            Unwind::Error(err) => Failure::Runtime(err),
            Unwind::Signal(Signal::Throw(object)) => {
                let rendered = self
                    .stringify(&object)
                    .unwrap_or_else(|_| format!("{object:?}"));
                tracing::debug!(%rendered, "uncaught exception");
                Failure::Uncaught { rendered, object }
            }
            Unwind::Signal(Signal::Break(label)) => Failure::Runtime(escaped("break", &label)),
            Unwind::Signal(Signal::Continue(label)) => {
                Failure::Runtime(escaped("continue", &label))
            }
            Unwind::Signal(Signal::Return(_)) => Failure::Runtime(RuntimeError::InvalidControlFlow(
                "`return` outside of a function".to_string(),
            )),
        }
    }

    fn undefined_variable(&self, name: &str) -> RuntimeError {
        RuntimeError::undefined_variable(name, &self.scope.borrow().variable_names())
    }

    // ============ Statements ============

    /// Execute a statement
    pub fn exec(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.eval(expr)?;
                Ok(())
            }
            Stmt::Block(stmts) => {
                let scope = child_scope(&self.scope);
                self.scoped(scope, |interp| {
                    stmts.iter().try_for_each(|stmt| interp.exec(stmt))
                })
            }
            Stmt::Label { label, stmt } => match stmt.as_ref() {
                Stmt::While { cond, body } => self.exec_while(cond, body, Some(label)),
                Stmt::For {
                    name,
                    iterable,
                    body,
                } => self.exec_for(name, iterable, body, Some(label)),
                other => match self.exec(other) {
                    Err(Unwind::Signal(Signal::Break(Some(target)))) if target == *label => Ok(()),
                    result => result,
                },
            },
            Stmt::Declaration { name, value, .. } => {
                let value = match value {
                    Some(value) => self.eval(value)?,
                    None => self.null(),
                };
                self.scope.borrow_mut().define(name.as_str(), value);
                Ok(())
            }
            Stmt::Assignment { receiver, value } => self.exec_assignment(receiver, value),
            Stmt::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                if self.condition(cond, "if")? {
                    self.exec(then_stmt)
                } else if let Some(else_stmt) = else_stmt {
                    self.exec(else_stmt)
                } else {
                    Ok(())
                }
            }
            Stmt::Match { args, cases } => self.exec_match(args, cases),
            Stmt::For {
                name,
                iterable,
                body,
            } => self.exec_for(name, iterable, body, None),
            Stmt::While { cond, body } => self.exec_while(cond, body, None),
            Stmt::Try {
                body,
                catches,
                finally,
            } => self.exec_try(body, catches, finally.as_deref()),
            Stmt::Break(label) => Err(Signal::Break(label.clone()).into()),
            Stmt::Continue(label) => Err(Signal::Continue(label.clone()).into()),
            Stmt::Throw(expr) => {
                let thrown = self.eval(expr)?;
                tracing::trace!(ty = thrown.type_name(), "throw");
                Err(Signal::Throw(thrown).into())
            }
            Stmt::Return(value) => {
                let value = match value {
                    Some(value) => self.eval(value)?,
                    None => self.null(),
                };
                Err(Signal::Return(value).into())
            }
            Stmt::Assert(cond) => self.contract(cond, "assert"),
            Stmt::Require(cond) => self.contract(cond, "require"),
            Stmt::Ensure(cond) => self.contract(cond, "ensure"),
        }
    }

    fn condition(&mut self, cond: &Expr, context: &str) -> EvalResult<bool> {
        let value = self.eval(cond)?;
        match value.payload {
            Payload::Boolean(value) => Ok(value),
            _ => Err(RuntimeError::type_mismatch(
                format!("a Boolean {context} condition"),
                value.type_name(),
            )
            .into()),
        }
    }

    fn contract(&mut self, cond: &Expr, kind: &'static str) -> EvalResult<()> {
        if self.condition(cond, kind)? {
            Ok(())
        } else {
            Err(RuntimeError::AssertionFailed { kind }.into())
        }
    }

    fn exec_assignment(&mut self, receiver: &Expr, value: &Expr) -> EvalResult<()> {
        match receiver {
            Expr::Access {
                receiver: None,
                name,
            } => {
                let variable = self.scope.borrow().lookup(name);
                let Some(variable) = variable else {
                    return Err(self.undefined_variable(name).into());
                };
                let value = self.eval(value)?;
                variable.set(value);
                Ok(())
            }
            Expr::Access {
                receiver: Some(target),
                name,
            } => {
                let target = self.eval(target)?;
                let value = self.eval(value)?;
                self.set_property(&target, name, value)
            }
            Expr::Index { receiver, args } => {
                let target = self.eval(receiver)?;
                let mut args = self.eval_args(args)?;
                args.push(self.eval(value)?);
                self.call_method(target, "[]=", args)?;
                Ok(())
            }
            other => Err(RuntimeError::InvalidAssignmentTarget {
                target: describe(other),
            }
            .into()),
        }
    }

    fn exec_while(&mut self, cond: &Expr, body: &Stmt, label: Option<&str>) -> EvalResult<()> {
        while self.condition(cond, "while")? {
            match self.exec(body) {
                Ok(()) => {}
                Err(Unwind::Signal(Signal::Break(target))) if Signal::targets(&target, label) => {
                    break;
                }
                Err(Unwind::Signal(Signal::Continue(target)))
                    if Signal::targets(&target, label) => {}
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn exec_for(
        &mut self,
        name: &str,
        iterable: &Expr,
        body: &Stmt,
        label: Option<&str>,
    ) -> EvalResult<()> {
        let iterable = self.eval(iterable)?;
        for item in self.iteration_items(&iterable)? {
            let scope = child_scope(&self.scope);
            scope.borrow_mut().define(name, item);
            match self.scoped(scope, |interp| interp.exec(body)) {
                Ok(()) => {}
                Err(Unwind::Signal(Signal::Break(target))) if Signal::targets(&target, label) => {
                    break;
                }
                Err(Unwind::Signal(Signal::Continue(target)))
                    if Signal::targets(&target, label) => {}
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn exec_try(
        &mut self,
        body: &Stmt,
        catches: &[CatchClause],
        finally: Option<&Stmt>,
    ) -> EvalResult<()> {
        let outcome = match self.exec(body) {
            Err(Unwind::Signal(Signal::Throw(thrown))) => self.exec_catch(thrown, catches),
            other => other,
        };
        if let Some(finally) = finally {
            self.exec(finally)?;
        }
        outcome
    }

    fn exec_catch(&mut self, thrown: Object, catches: &[CatchClause]) -> EvalResult<()> {
        for clause in catches {
            let ty = self.require_type(&clause.ty.name)?;
            if thrown.ty.is_subtype_of(&ty) {
                let scope = child_scope(&self.scope);
                scope.borrow_mut().define(clause.name.as_str(), thrown);
                return self.scoped(scope, |interp| interp.exec(&clause.body));
            }
        }
        Err(Signal::Throw(thrown).into())
    }

    // ============ Expressions ============

    /// Evaluate an expression
    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Object> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr))
    }

    fn eval_inner(&mut self, expr: &Expr) -> EvalResult<Object> {
        match expr {
            Expr::Literal(literal) => self.eval_literal(literal),
            Expr::Group(inner) => self.eval(inner),
            Expr::Unary { op, expr } => {
                let operand = self.eval(expr)?;
                self.call_method(operand, op.method(), Vec::new())
            }
            Expr::Binary { left, op, right } => self.eval_binary(left, *op, right),
            Expr::Access {
                receiver: None,
                name,
            } => {
                let variable = self.scope.borrow().lookup(name);
                match variable {
                    Some(variable) => Ok(variable.get()),
                    None => Err(self.undefined_variable(name).into()),
                }
            }
            Expr::Access {
                receiver: Some(receiver),
                name,
            } => {
                let receiver = self.eval(receiver)?;
                self.get_property(&receiver, name)
            }
            Expr::Index { receiver, args } => {
                let receiver = self.eval(receiver)?;
                let args = self.eval_args(args)?;
                self.call_method(receiver, "[]", args)
            }
            Expr::Call {
                receiver: None,
                name,
                args,
            } => {
                let args = self.eval_args(args)?;
                self.call_function(name, args)
            }
            Expr::Call {
                receiver: Some(receiver),
                name,
                args,
            } => {
                let receiver = self.eval(receiver)?;
                let args = self.eval_args(args)?;
                if let (Payload::Lambda(function), "invoke") = (&receiver.payload, name.as_str()) {
                    let function = function.clone();
                    return self.invoke(&function, args);
                }
                self.call_method(receiver, name, args)
            }
            Expr::Lambda(lambda) => Ok(self.eval_lambda(lambda)),
            Expr::Dsl { name, source } => {
                let source = self.string(source.as_str());
                self.call_function(name, vec![source])
            }
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> EvalResult<Vec<Object>> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    fn eval_literal(&mut self, literal: &Literal) -> EvalResult<Object> {
        Ok(match literal {
            Literal::Null => self.null(),
            Literal::Boolean(value) => self.boolean(*value),
            Literal::Integer(value) => self.integer(*value),
            Literal::Decimal(value) => self.decimal(*value),
            Literal::Character(value) => self.character(*value),
            Literal::String(value) => self.string(value.as_str()),
            Literal::Atom(name) => self.atom(name.as_str()),
            Literal::List(items) => {
                let items = self.eval_args(items)?;
                self.list(items)
            }
            Literal::Map(entries) => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let value = self.eval(value)?;
                    map.insert(key.clone(), value);
                }
                self.map(map)
            }
        })
    }

    fn eval_binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr) -> EvalResult<Object> {
        match op {
            BinaryOp::Or | BinaryOp::And => {
                let short_circuit = op == BinaryOp::Or;
                if self.logical_operand(left, op)? == short_circuit {
                    return Ok(self.boolean(short_circuit));
                }
                let result = self.logical_operand(right, op)?;
                Ok(self.boolean(result))
            }
            BinaryOp::Identical | BinaryOp::NotIdentical => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                let identical = left.identical(&right);
                Ok(self.boolean(identical == (op == BinaryOp::Identical)))
            }
            BinaryOp::Eq | BinaryOp::NotEq => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                let equal = self.equals(&left, &right)?;
                Ok(self.boolean(equal == (op == BinaryOp::Eq)))
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                let ordering = self.compare(&left, &right)?;
                let result = match op {
                    BinaryOp::Lt => ordering == Ordering::Less,
                    BinaryOp::LtEq => ordering != Ordering::Greater,
                    BinaryOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                };
                Ok(self.boolean(result))
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                self.call_method(left, op.symbol(), vec![right])
            }
        }
    }

    fn logical_operand(&mut self, expr: &Expr, op: BinaryOp) -> EvalResult<bool> {
        let value = self.eval(expr)?;
        match value.payload {
            Payload::Boolean(value) => Ok(value),
            _ => Err(RuntimeError::type_mismatch(
                format!("a Boolean operand of `{op}`"),
                value.type_name(),
            )
            .into()),
        }
    }

    /// Closure over the current scope. A lambda without parameters accepts
    /// any arguments and binds them to `val`.
    fn eval_lambda(&self, lambda: &Rc<Lambda>) -> Object {
        let captured = Rc::clone(&self.scope);
        let definition = Rc::clone(lambda);
        let arity = lambda.params.len();
        let function = Function::new("lambda", arity, move |interp, mut args| {
            let scope = child_scope(&captured);
            if definition.params.len() == args.len() {
                let mut bindings = scope.borrow_mut();
                for (param, arg) in definition.params.iter().zip(args) {
                    bindings.define(param.name.as_str(), arg);
                }
            } else if definition.params.is_empty() {
                let implicit = if args.len() == 1 {
                    args.swap_remove(0)
                } else {
                    interp.list(args)
                };
                scope.borrow_mut().define("val", implicit);
            } else {
                return Err(RuntimeError::arity_mismatch("lambda", &[arity], args.len()).into());
            }
            let result = interp.scoped(scope, |interp| interp.exec(&definition.body));
            interp.complete(result)
        });
        self.lambda(function)
    }
}

fn escaped(keyword: &str, label: &Option<String>) -> RuntimeError {
    RuntimeError::InvalidControlFlow(match label {
        Some(label) => format!("`{keyword} {label}` has no enclosing statement labeled `{label}`"),
        None => format!("`{keyword}` outside of a loop"),
    })
}

/// Short description of an expression for error messages
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Literal(_) => "literal".to_string(),
        Expr::Group(inner) => describe(inner),
        Expr::Unary { op, .. } => format!("unary `{}` expression", op.method()),
        Expr::Binary { op, .. } => format!("binary `{op}` expression"),
        Expr::Access { name, .. } => format!("access `{name}`"),
        Expr::Index { .. } => "index expression".to_string(),
        Expr::Call { name, .. } => format!("call to `{name}`"),
        Expr::Lambda(_) => "lambda".to_string(),
        Expr::Dsl { name, .. } => format!("DSL block `#{name}`"),
    }
}
