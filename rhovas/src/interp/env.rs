//! Type registry
//!
//! A [`Type`] owns its static bindings and the instance member tables used
//! for dispatch. Member lookup falls back to supertypes depth-first in
//! declaration order and returns the first match. Types are built during the
//! declare/define bootstrap and are not modified once a program runs.

use super::error::{EvalResult, RuntimeError};
use super::scope::{ScopeRef, Variable, VariableRef};
use super::value::{Function, Object};
use super::Interpreter;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub type TypeRef = Rc<Type>;

/// Accessor pair; `get` takes `[receiver]`, `set` takes `[receiver, value]`
#[derive(Clone, Debug)]
pub struct Property {
    pub name: String,
    pub get: Function,
    pub set: Option<Function>,
}

pub struct Type {
    pub name: String,
    /// Static scope; functions and nested types declared in the type live here
    pub scope: ScopeRef,
    supertypes: RefCell<Vec<TypeRef>>,
    variables: RefCell<IndexMap<String, VariableRef>>,
    fields: RefCell<IndexMap<String, Function>>,
    properties: RefCell<HashMap<String, Property>>,
    functions: RefCell<IndexMap<(String, usize), Function>>,
    methods: RefCell<HashMap<(String, usize), Function>>,
    constructors: RefCell<IndexMap<usize, Function>>,
}

impl Type {
    pub fn new(name: impl Into<String>, scope: ScopeRef) -> TypeRef {
        Rc::new(Type {
            name: name.into(),
            scope,
            supertypes: RefCell::default(),
            variables: RefCell::default(),
            fields: RefCell::default(),
            properties: RefCell::default(),
            functions: RefCell::default(),
            methods: RefCell::default(),
            constructors: RefCell::default(),
        })
    }

    /// Last segment of a dotted type name
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn add_supertype(&self, supertype: TypeRef) {
        self.supertypes.borrow_mut().push(supertype);
    }

    pub fn supertypes(&self) -> Vec<TypeRef> {
        self.supertypes.borrow().clone()
    }

    /// True if the names match or any supertype is a subtype of `other`.
    /// Supertype graphs are assumed to be acyclic.
    pub fn is_subtype_of(&self, other: &Type) -> bool {
        self.name == other.name
            || self
                .supertypes
                .borrow()
                .iter()
                .any(|supertype| supertype.is_subtype_of(other))
    }

    /// Static variable; also bound in the type's scope
    pub fn define_variable(&self, name: &str, value: Object) -> VariableRef {
        let variable = Variable::new(name, value);
        self.scope.borrow_mut().define_variable(Rc::clone(&variable));
        self.variables
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&variable));
        variable
    }

    pub fn variables(&self) -> Vec<VariableRef> {
        self.variables.borrow().values().cloned().collect()
    }

    /// Instance field initializer, called with `[receiver]`
    pub fn define_field(&self, name: &str, initializer: Function) {
        self.fields.borrow_mut().insert(name.to_string(), initializer);
    }

    /// Field initializers with supertypes first, in declaration order
    pub fn fields(&self) -> IndexMap<String, Function> {
        let mut fields = IndexMap::new();
        for supertype in self.supertypes.borrow().iter() {
            fields.extend(supertype.fields());
        }
        for (name, initializer) in self.fields.borrow().iter() {
            fields.insert(name.clone(), initializer.clone());
        }
        fields
    }

    /// Names of fields declared on this type, excluding supertypes
    pub fn own_field_names(&self) -> Vec<String> {
        self.fields.borrow().keys().cloned().collect()
    }

    pub fn define_property(&self, name: &str, get: Function, set: Option<Function>) {
        self.properties.borrow_mut().insert(
            name.to_string(),
            Property {
                name: name.to_string(),
                get,
                set,
            },
        );
    }

    pub fn property(&self, name: &str) -> Option<Property> {
        if let Some(property) = self.properties.borrow().get(name) {
            return Some(property.clone());
        }
        self.supertypes
            .borrow()
            .iter()
            .find_map(|supertype| supertype.property(name))
    }

    /// Static function; also bound in the type's scope
    pub fn define_function(&self, function: Function) {
        self.scope.borrow_mut().define_function(function.clone());
        let key = (function.name.to_string(), function.arity);
        self.functions.borrow_mut().insert(key, function);
    }

    pub fn function(&self, name: &str, arity: usize) -> Option<Function> {
        self.functions
            .borrow()
            .get(&(name.to_string(), arity))
            .cloned()
    }

    pub fn functions(&self) -> Vec<Function> {
        self.functions.borrow().values().cloned().collect()
    }

    /// Instance method, called with `[receiver, args...]`
    pub fn define_method(&self, function: Function) {
        let key = (function.name.to_string(), function.arity);
        self.methods.borrow_mut().insert(key, function);
    }

    pub fn method(&self, name: &str, arity: usize) -> Option<Function> {
        if let Some(method) = self.methods.borrow().get(&(name.to_string(), arity)) {
            return Some(method.clone());
        }
        self.supertypes
            .borrow()
            .iter()
            .find_map(|supertype| supertype.method(name, arity))
    }

    pub fn define_constructor(&self, function: Function) {
        self.constructors
            .borrow_mut()
            .insert(function.arity, function);
    }

    pub fn constructor(&self, arity: usize) -> Option<Function> {
        self.constructors.borrow().get(&arity).cloned()
    }

    pub fn constructors(&self) -> Vec<Function> {
        self.constructors.borrow().values().cloned().collect()
    }

    pub fn constructor_arities(&self) -> Vec<usize> {
        let mut arities: Vec<usize> = self.constructors.borrow().keys().copied().collect();
        arities.sort_unstable();
        arities
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("name", &self.name)
            .field(
                "supertypes",
                &self
                    .supertypes
                    .borrow()
                    .iter()
                    .map(|supertype| supertype.name.clone())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Resolves type names the registry does not know yet
pub trait TypeLoader {
    /// Returns `Ok(None)` when the loader does not provide `name`
    fn get_or_init(&self, interp: &mut Interpreter, name: &str) -> EvalResult<Option<TypeRef>>;
}

/// Registry of all types by fully qualified name, plus the global scope
pub struct Environment {
    types: RefCell<HashMap<String, TypeRef>>,
    scope: ScopeRef,
}

impl Environment {
    pub fn new(scope: ScopeRef) -> Self {
        Environment {
            types: RefCell::default(),
            scope,
        }
    }

    /// Global scope; parent of every module scope
    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    /// Creates and registers a type whose scope is a child of `parent`
    pub fn define_type(&self, name: &str, parent: &ScopeRef) -> TypeRef {
        let ty = Type::new(name, super::scope::child_scope(parent));
        tracing::trace!(name, "defining type");
        self.types
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&ty));
        ty
    }

    pub fn lookup_type(&self, name: &str) -> Option<TypeRef> {
        self.types.borrow().get(name).cloned()
    }

    pub fn require_type(&self, name: &str) -> Result<TypeRef, RuntimeError> {
        self.lookup_type(name)
            .ok_or_else(|| RuntimeError::undefined_type(name, &self.type_names()))
    }

    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}
