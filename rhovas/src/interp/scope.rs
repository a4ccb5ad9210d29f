//! Lexical scopes for variable and function bindings

use super::env::TypeRef;
use super::value::{Function, Object};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared reference to a scope
pub type ScopeRef = Rc<RefCell<Scope>>;

/// Shared variable cell. Static variables are aliased between a type and the
/// proxies that expose them, so the cell itself is reference counted.
pub type VariableRef = Rc<Variable>;

#[derive(Debug)]
pub struct Variable {
    pub name: String,
    value: RefCell<Object>,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: Object) -> VariableRef {
        Rc::new(Variable {
            name: name.into(),
            value: RefCell::new(value),
        })
    }

    pub fn get(&self) -> Object {
        self.value.borrow().clone()
    }

    pub fn set(&self, value: Object) {
        *self.value.borrow_mut() = value;
    }
}

/// Scope holding variable, function and type-name bindings
#[derive(Default)]
pub struct Scope {
    variables: IndexMap<String, VariableRef>,
    functions: HashMap<(String, usize), Function>,
    types: HashMap<String, TypeRef>,
    parent: Option<ScopeRef>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: ScopeRef) -> Self {
        Scope {
            parent: Some(parent),
            ..Self::default()
        }
    }

    pub fn into_ref(self) -> ScopeRef {
        Rc::new(RefCell::new(self))
    }

    pub fn parent(&self) -> Option<&ScopeRef> {
        self.parent.as_ref()
    }

    /// Binds a new variable, shadowing any binding of the same name
    pub fn define(&mut self, name: impl Into<String>, value: Object) {
        let name = name.into();
        let variable = Variable::new(name.clone(), value);
        self.variables.insert(name, variable);
    }

    /// Binds an existing variable cell
    pub fn define_variable(&mut self, variable: VariableRef) {
        self.variables.insert(variable.name.clone(), variable);
    }

    /// Looks up a variable through the parent chain
    pub fn lookup(&self, name: &str) -> Option<VariableRef> {
        match self.variables.get(name) {
            Some(variable) => Some(Rc::clone(variable)),
            None => self.parent.as_ref()?.borrow().lookup(name),
        }
    }

    /// Looks up a variable bound directly in this scope
    pub fn local(&self, name: &str) -> Option<VariableRef> {
        self.variables.get(name).cloned()
    }

    /// Variables bound directly in this scope, in binding order
    pub fn locals(&self) -> impl Iterator<Item = &VariableRef> {
        self.variables.values()
    }

    pub fn define_function(&mut self, function: Function) {
        let key = (function.name.to_string(), function.arity);
        self.functions.insert(key, function);
    }

    /// Looks up a function by name and arity through the parent chain
    pub fn lookup_function(&self, name: &str, arity: usize) -> Option<Function> {
        match self.functions.get(&(name.to_string(), arity)) {
            Some(function) => Some(function.clone()),
            None => self.parent.as_ref()?.borrow().lookup_function(name, arity),
        }
    }

    /// Binds a short type name (nested component or import alias)
    pub fn define_type(&mut self, name: impl Into<String>, ty: TypeRef) {
        self.types.insert(name.into(), ty);
    }

    pub fn lookup_type(&self, name: &str) -> Option<TypeRef> {
        match self.types.get(name) {
            Some(ty) => Some(Rc::clone(ty)),
            None => self.parent.as_ref()?.borrow().lookup_type(name),
        }
    }

    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        if let Some(parent) = &self.parent {
            names.extend(parent.borrow().type_names());
        }
        names
    }

    /// All variable names visible from this scope
    pub fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.variables.keys().cloned().collect();
        if let Some(parent) = &self.parent {
            names.extend(parent.borrow().variable_names());
        }
        names
    }

    /// All function names visible from this scope
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().map(|(name, _)| name.clone()).collect();
        if let Some(parent) = &self.parent {
            names.extend(parent.borrow().function_names());
        }
        names
    }
}

/// Create a child scope from a parent reference
pub fn child_scope(parent: &ScopeRef) -> ScopeRef {
    Scope::with_parent(Rc::clone(parent)).into_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::Interpreter;

    #[test]
    fn test_define_and_lookup() {
        let interp = Interpreter::new();
        let mut scope = Scope::new();
        scope.define("x", interp.integer(42));
        assert_eq!(scope.lookup("x").unwrap().get().as_integer(), Ok(42));
        assert!(scope.lookup("y").is_none());
    }

    #[test]
    fn test_scope_chain_and_shadowing() {
        let interp = Interpreter::new();
        let parent = Scope::new().into_ref();
        parent.borrow_mut().define("x", interp.integer(1));

        let child = child_scope(&parent);
        assert_eq!(child.borrow().lookup("x").unwrap().get().as_integer(), Ok(1));
        assert!(child.borrow().local("x").is_none());

        child.borrow_mut().define("x", interp.integer(2));
        assert_eq!(child.borrow().lookup("x").unwrap().get().as_integer(), Ok(2));
        assert_eq!(parent.borrow().lookup("x").unwrap().get().as_integer(), Ok(1));
    }

    #[test]
    fn test_variable_cell_is_shared() {
        let interp = Interpreter::new();
        let parent = Scope::new().into_ref();
        parent.borrow_mut().define("count", interp.integer(0));
        let child = child_scope(&parent);

        child.borrow().lookup("count").unwrap().set(interp.integer(5));
        assert_eq!(parent.borrow().lookup("count").unwrap().get().as_integer(), Ok(5));
    }

    #[test]
    fn test_function_lookup_by_arity() {
        let interp = Interpreter::new();
        let root = Scope::new().into_ref();
        let null = interp.null();
        root.borrow_mut()
            .define_function(Function::new("f", 1, move |_, _| Ok(null.clone())));
        let child = child_scope(&root);
        assert!(child.borrow().lookup_function("f", 1).is_some());
        assert!(child.borrow().lookup_function("f", 2).is_none());
        assert_eq!(child.borrow().function_names(), vec!["f".to_string()]);
    }
}
