//! Declare/define bootstrap
//!
//! A source file becomes a module type. The declare pass creates a type
//! skeleton for every component so members can refer to each other in any
//! order; the define pass then resolves supertypes and fills in fields,
//! properties, constructors, functions and methods. Static properties are
//! initialized last, in declaration order.

use super::env::{Type, TypeRef};
use super::error::{EvalResult, Failure, RuntimeError};
use super::eval::Interpreter;
use super::scope::{child_scope, ScopeRef, VariableRef};
use super::value::{Function, Object, Payload};
use crate::ast::{self, ComponentKind, Import, Member, Source, Stmt};
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Context {
    Module,
    Component(ComponentKind),
}

/// Static property awaiting initialization
struct PendingStatic {
    variable: VariableRef,
    property: Rc<ast::Property>,
    owner: TypeRef,
}

impl Interpreter {
    /// Declares and defines `source` as the module `module`, returning the
    /// module type followed by its nested component types
    pub fn evaluate(&mut self, module: &str, source: &Source) -> Result<Vec<TypeRef>, Failure> {
        let ty = self.define_module(module);
        self.evaluate_into(&ty, source)
    }

    /// Creates an empty module type
    pub fn define_module(&self, name: &str) -> TypeRef {
        let env = Rc::clone(self.env());
        env.define_type(name, env.scope())
    }

    /// Adds the members of `source` to an existing module type
    pub fn evaluate_into(&mut self, module: &TypeRef, source: &Source) -> Result<Vec<TypeRef>, Failure> {
        tracing::debug!(module = %module.name, "evaluating module");
        let result = self.bootstrap(module, source);
        result.map_err(|unwind| self.failure(unwind))
    }

    /// Runs the only `main/0` function among `types`
    pub fn invoke_main(&mut self, types: &[TypeRef]) -> Result<Object, Failure> {
        let mains: Vec<(&TypeRef, Function)> = types
            .iter()
            .filter_map(|ty| ty.function("main", 0).map(|main| (ty, main)))
            .collect();
        match mains.as_slice() {
            [] => Err(Failure::NoMain),
            [(ty, main)] => {
                tracing::debug!(ty = %ty.name, "invoking main");
                let result = self.invoke(main, Vec::new());
                result.map_err(|unwind| self.failure(unwind))
            }
            _ => Err(Failure::MultipleMain(
                mains.iter().map(|(ty, _)| ty.name.clone()).collect(),
            )),
        }
    }

    /// Executes a statement directly in a module scope so declarations
    /// persist. Returns the value to echo, if any.
    pub fn execute(&mut self, module: &TypeRef, stmt: &Stmt) -> Result<Option<Object>, Failure> {
        let scope = Rc::clone(&module.scope);
        let result = self.scoped(scope, |interp| match stmt {
            Stmt::Expression(expr) => interp.eval(expr).map(Some),
            Stmt::Declaration { name, .. }
            | Stmt::Assignment {
                receiver: ast::Expr::Access {
                    receiver: None,
                    name,
                },
                ..
            } => {
                interp.exec(stmt)?;
                let variable = interp.scope().borrow().lookup(name);
                Ok(variable.map(|variable| variable.get()))
            }
            other => interp.exec(other).map(|()| None),
        });
        result.map_err(|unwind| self.failure(unwind))
    }

    /// Wraps a payload scope in a new instance of `ty`, running field
    /// initializers supertypes first
    pub fn instantiate(&mut self, ty: &TypeRef) -> EvalResult<Object> {
        let instance = child_scope(&ty.scope);
        let object = Object::new(Rc::clone(ty), Payload::Instance(Rc::clone(&instance)));
        for (name, initializer) in ty.fields() {
            let value = self.invoke(&initializer, vec![object.clone()])?;
            instance.borrow_mut().define(name, value);
        }
        Ok(object)
    }

    fn bootstrap(&mut self, module: &TypeRef, source: &Source) -> EvalResult<Vec<TypeRef>> {
        let mut types = vec![Rc::clone(module)];
        self.declare(module, &source.members, true, &mut types);
        for import in &source.imports {
            self.import(module, import)?;
        }
        let mut statics = Vec::new();
        self.scoped(Rc::clone(&module.scope), |interp| {
            interp.define_members(module, &source.members, Context::Module, &mut statics)
        })?;
        for pending in statics {
            let value = match &pending.property.value {
                Some(value) => {
                    let scope = child_scope(&pending.owner.scope);
                    self.scoped(scope, |interp| interp.eval(value))?
                }
                None => self.null(),
            };
            pending.variable.set(value);
        }
        Ok(types)
    }

    /// Creates type skeletons for nested components. A top-level component
    /// named like its module is merged into the module type.
    fn declare(&self, parent: &TypeRef, members: &[Member], top_level: bool, types: &mut Vec<TypeRef>) {
        for member in members {
            let Member::Component(component) = member else {
                continue;
            };
            let ty = if top_level && component.name == parent.short_name() {
                Rc::clone(parent)
            } else {
                let name = format!("{}.{}", parent.name, component.name);
                let ty = self.env().define_type(&name, &parent.scope);
                parent
                    .scope
                    .borrow_mut()
                    .define_type(component.name.as_str(), Rc::clone(&ty));
                types.push(Rc::clone(&ty));
                ty
            };
            tracing::trace!(name = %ty.name, kind = component.kind.keyword(), "declared component");
            self.declare(&ty, &component.members, false, types);
        }
    }

    fn import(&mut self, module: &TypeRef, import: &Import) -> EvalResult<()> {
        let name = import.qualified_name();
        let ty = self.require_type(&name)?;
        let alias = import.binding();
        tracing::debug!(%name, alias, "importing type");
        let proxy = self.static_proxy(alias, &ty);
        let mut scope = module.scope.borrow_mut();
        scope.define_type(alias, ty);
        scope.define(alias, proxy);
        Ok(())
    }

    /// `<alias>.Static` object exposing static variables as properties and
    /// static functions as methods
    fn static_proxy(&self, alias: &str, ty: &TypeRef) -> Object {
        let proxy = Type::new(format!("{alias}.Static"), child_scope(self.env().scope()));
        for variable in ty.variables() {
            let cell = Rc::clone(&variable);
            let get = Function::new(variable.name.as_str(), 0, move |_, _| Ok(cell.get()));
            let cell = Rc::clone(&variable);
            let set = Function::new(variable.name.as_str(), 1, move |interp, args| {
                cell.set(args[1].clone());
                Ok(interp.null())
            });
            proxy.define_property(&variable.name, get, Some(set));
        }
        for function in ty.functions() {
            let target = function.clone();
            proxy.define_method(Function::new(
                Rc::clone(&function.name),
                function.arity,
                move |interp, mut args| {
                    args.remove(0);
                    interp.invoke(&target, args)
                },
            ));
        }
        Object::new(proxy, Payload::Null)
    }

    fn define_members(
        &mut self,
        ty: &TypeRef,
        members: &[Member],
        context: Context,
        statics: &mut Vec<PendingStatic>,
    ) -> EvalResult<()> {
        for member in members {
            match member {
                Member::Component(component) => {
                    let nested = if context == Context::Module && component.name == ty.short_name() {
                        Rc::clone(ty)
                    } else {
                        let nested = ty.scope.borrow().lookup_type(&component.name);
                        nested.ok_or_else(|| {
                            RuntimeError::invalid_definition(format!(
                                "component `{}` was not declared",
                                component.name
                            ))
                        })?
                    };
                    self.scoped(Rc::clone(&nested.scope), |interp| {
                        interp.define_component(&nested, component, statics)
                    })?;
                }
                Member::Property(property) => match context {
                    Context::Module => {
                        let variable = ty.define_variable(&property.name, self.null());
                        statics.push(PendingStatic {
                            variable,
                            property: Rc::clone(property),
                            owner: Rc::clone(ty),
                        });
                    }
                    Context::Component(ComponentKind::Interface) => {
                        return Err(RuntimeError::invalid_definition(format!(
                            "interface `{}` cannot declare property `{}`",
                            ty.name, property.name
                        ))
                        .into());
                    }
                    Context::Component(_) => {
                        ty.define_field(&property.name, field_initializer(ty, property));
                    }
                },
                Member::Constructor(constructor) => match context {
                    Context::Component(ComponentKind::Class | ComponentKind::Struct) => {
                        ty.define_constructor(user_constructor(ty, constructor));
                    }
                    _ => {
                        return Err(RuntimeError::invalid_definition(format!(
                            "constructor in `{}` must be declared inside a class or struct",
                            ty.name
                        ))
                        .into());
                    }
                },
                Member::Function(function) => {
                    let Some(body) = &function.body else {
                        if context == Context::Component(ComponentKind::Interface) {
                            continue;
                        }
                        return Err(RuntimeError::invalid_definition(format!(
                            "function `{}/{}` in `{}` has no body",
                            function.name,
                            function.arity(),
                            ty.name
                        ))
                        .into());
                    };
                    match context {
                        Context::Module => ty.define_function(static_function(ty, function, body)),
                        Context::Component(_) => ty.define_method(method(ty, function, body)),
                    }
                }
            }
        }
        Ok(())
    }

    fn define_component(
        &mut self,
        ty: &TypeRef,
        component: &ast::Component,
        statics: &mut Vec<PendingStatic>,
    ) -> EvalResult<()> {
        tracing::debug!(name = %ty.name, kind = component.kind.keyword(), "defining component");
        if component.kind == ComponentKind::Struct {
            ty.add_supertype(self.require_type("Struct")?);
        }
        for supertype in &component.extends {
            ty.add_supertype(self.require_type(&supertype.name)?);
        }
        self.define_members(ty, &component.members, Context::Component(component.kind), statics)?;
        match component.kind {
            ComponentKind::Class if ty.constructors().is_empty() => {
                ty.define_constructor(default_constructor(ty));
            }
            ComponentKind::Struct => {
                let count = ty.fields().len();
                if ty.constructor(count).is_none() {
                    ty.define_constructor(positional_constructor(ty, count));
                }
                if count != 1 && ty.constructor(1).is_none() {
                    ty.define_constructor(map_constructor(ty));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn upgrade(ty: &Weak<Type>) -> Result<TypeRef, RuntimeError> {
    ty.upgrade()
        .ok_or_else(|| RuntimeError::invalid_definition("type is no longer defined"))
}

/// Child scope of the defining type's scope with `this` and the receiver's
/// fields bound. Fields share their cells with the instance.
fn receiver_scope(receiver: &Object, ty: &TypeRef) -> ScopeRef {
    let scope = child_scope(&ty.scope);
    {
        let mut scope = scope.borrow_mut();
        if let Some(instance) = receiver.as_instance() {
            for field in instance.borrow().locals() {
                scope.define_variable(Rc::clone(field));
            }
        }
        scope.define("this", receiver.clone());
    }
    scope
}

fn bind_params(scope: &ScopeRef, params: &[ast::Param], args: impl IntoIterator<Item = Object>) {
    let mut scope = scope.borrow_mut();
    for (param, arg) in params.iter().zip(args) {
        scope.define(param.name.as_str(), arg);
    }
}

fn static_function(ty: &TypeRef, function: &ast::FunctionDef, body: &Rc<Stmt>) -> Function {
    let owner = Rc::downgrade(ty);
    let params = function.params.clone();
    let body = Rc::clone(body);
    Function::new(function.name.as_str(), function.arity(), move |interp, args| {
        let ty = upgrade(&owner)?;
        let scope = child_scope(&ty.scope);
        bind_params(&scope, &params, args);
        let result = interp.scoped(scope, |interp| interp.exec(&body));
        interp.complete(result)
    })
}

fn method(ty: &TypeRef, function: &ast::FunctionDef, body: &Rc<Stmt>) -> Function {
    let owner = Rc::downgrade(ty);
    let params = function.params.clone();
    let body = Rc::clone(body);
    Function::new(function.name.as_str(), function.arity(), move |interp, args| {
        let ty = upgrade(&owner)?;
        let mut args = args.into_iter();
        let receiver = args.next().unwrap_or_else(|| interp.null());
        let scope = receiver_scope(&receiver, &ty);
        bind_params(&scope, &params, args);
        let result = interp.scoped(scope, |interp| interp.exec(&body));
        interp.complete(result)
    })
}

fn field_initializer(ty: &TypeRef, property: &Rc<ast::Property>) -> Function {
    let owner = Rc::downgrade(ty);
    let property = Rc::clone(property);
    let name = property.name.clone();
    Function::new(name.as_str(), 0, move |interp, args| {
        let Some(value) = &property.value else {
            return Ok(interp.null());
        };
        let ty = upgrade(&owner)?;
        let receiver = args.into_iter().next().unwrap_or_else(|| interp.null());
        let scope = receiver_scope(&receiver, &ty);
        interp.scoped(scope, |interp| interp.eval(value))
    })
}

fn user_constructor(ty: &TypeRef, constructor: &Rc<ast::Constructor>) -> Function {
    let owner = Rc::downgrade(ty);
    let constructor = Rc::clone(constructor);
    Function::new(ty.short_name(), constructor.params.len(), move |interp, args| {
        let ty = upgrade(&owner)?;
        let object = interp.instantiate(&ty)?;
        let scope = receiver_scope(&object, &ty);
        bind_params(&scope, &constructor.params, args);
        let result = interp.scoped(scope, |interp| interp.exec(&constructor.body));
        interp.complete(result)?;
        Ok(object)
    })
}

fn default_constructor(ty: &TypeRef) -> Function {
    let owner = Rc::downgrade(ty);
    Function::new(ty.short_name(), 0, move |interp, _| {
        let ty = upgrade(&owner)?;
        interp.instantiate(&ty)
    })
}

/// `Name(f1, ..., fn)` assigning fields in declaration order
fn positional_constructor(ty: &TypeRef, count: usize) -> Function {
    let owner = Rc::downgrade(ty);
    Function::new(ty.short_name(), count, move |_, args| {
        let ty = upgrade(&owner)?;
        let instance = child_scope(&ty.scope);
        {
            let mut fields = instance.borrow_mut();
            for (name, arg) in ty.fields().into_keys().zip(args) {
                fields.define(name, arg);
            }
        }
        Ok(Object::new(ty, Payload::Instance(instance)))
    })
}

/// `Name({field: value})`; omitted fields use their initializers
fn map_constructor(ty: &TypeRef) -> Function {
    let owner = Rc::downgrade(ty);
    Function::new(ty.short_name(), 1, move |interp, args| {
        let ty = upgrade(&owner)?;
        let entries = args[0].as_map()?.borrow().clone();
        let fields = ty.fields();
        if let Some(unknown) = entries.keys().find(|key| !fields.contains_key(*key)) {
            return Err(RuntimeError::undefined_member(&ty.name, unknown, None).into());
        }
        let instance = child_scope(&ty.scope);
        let object = Object::new(Rc::clone(&ty), Payload::Instance(Rc::clone(&instance)));
        for (name, initializer) in fields {
            let value = match entries.get(&name) {
                Some(value) => value.clone(),
                None => interp.invoke(&initializer, vec![object.clone()])?,
            };
            instance.borrow_mut().define(name, value);
        }
        Ok(object)
    })
}
