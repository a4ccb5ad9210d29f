//! Standard library
//!
//! Primitive types are ordinary registry types whose members are host
//! functions registered through [`Type::define_method`]. They are installed
//! when an interpreter is created. Types written in Rhovas itself (the
//! prelude) are materialized by [`Stdlib`] the first time they are requested.

mod collections;
mod kernel;
mod numeric;
mod protocols;
mod scalar;
mod structure;
mod text;

use crate::interp::{Environment, EvalResult, Function, Interpreter, Object, Type, TypeLoader, TypeRef};
use crate::lexer::tokenize;
use crate::parser::parse;
use std::rc::Rc;

/// Host body of a native function or method
pub(crate) type Native = fn(&mut Interpreter, Vec<Object>) -> EvalResult<Object>;

/// Prelude types defined in Rhovas source
const PRELUDE: &[(&str, &str)] = &[("Exception", include_str!("prelude/Exception.rho"))];

/// Types every object literal needs
pub struct Primitives {
    pub null: TypeRef,
    pub boolean: TypeRef,
    pub integer: TypeRef,
    pub decimal: TypeRef,
    pub character: TypeRef,
    pub string: TypeRef,
    pub atom: TypeRef,
    pub list: TypeRef,
    pub map: TypeRef,
    pub lambda: TypeRef,
}

/// Defines the native types and binds the kernel functions globally
pub fn install(env: &Environment) -> Primitives {
    let define = |name: &str| env.define_type(name, env.scope());

    let equatable = define("Equatable");
    protocols::define_equatable(&equatable);
    let comparable = define("Comparable");
    comparable.add_supertype(Rc::clone(&equatable));
    protocols::define_comparable(&comparable);

    let with_supertype = |name: &str, supertype: &TypeRef| {
        let ty = define(name);
        ty.add_supertype(Rc::clone(supertype));
        ty
    };

    let primitives = Primitives {
        null: with_supertype("Null", &equatable),
        boolean: with_supertype("Boolean", &equatable),
        integer: with_supertype("Integer", &comparable),
        decimal: with_supertype("Decimal", &comparable),
        character: with_supertype("Character", &comparable),
        string: with_supertype("String", &comparable),
        atom: with_supertype("Atom", &equatable),
        list: with_supertype("List", &equatable),
        map: with_supertype("Map", &equatable),
        lambda: define("Lambda"),
    };
    scalar::define_null(&primitives.null);
    scalar::define_boolean(&primitives.boolean);
    scalar::define_atom(&primitives.atom);
    numeric::define_integer(&primitives.integer);
    numeric::define_decimal(&primitives.decimal);
    text::define_character(&primitives.character);
    text::define_string(&primitives.string);
    collections::define_list(&primitives.list);
    collections::define_map(&primitives.map);
    structure::define_lambda(&primitives.lambda);
    structure::define_struct(&with_supertype("Struct", &equatable));

    let kernel = define("Kernel");
    kernel::define_kernel(&kernel);
    let mut global = env.scope().borrow_mut();
    for function in kernel.functions() {
        global.define_function(function);
    }
    tracing::trace!(types = env.type_names().len(), "installed native types");
    primitives
}

pub(crate) fn methods(ty: &Type, table: &[(&str, usize, Native)]) {
    for &(name, arity, body) in table {
        ty.define_method(Function::new(name, arity, body));
    }
}

pub(crate) fn functions(ty: &Type, table: &[(&str, usize, Native)]) {
    for &(name, arity, body) in table {
        ty.define_function(Function::new(name, arity, body));
    }
}

/// Property without a setter; assignment raises a read-only error
pub(crate) fn read_only(ty: &Type, name: &str, get: Native) {
    ty.define_property(name, Function::new(name, 0, get), None);
}

/// Loads prelude types written in Rhovas
pub struct Stdlib;

impl TypeLoader for Stdlib {
    fn get_or_init(&self, interp: &mut Interpreter, name: &str) -> EvalResult<Option<TypeRef>> {
        if let Some(ty) = interp.env().lookup_type(name) {
            return Ok(Some(ty));
        }
        let Some((_, source)) = PRELUDE.iter().find(|(prelude, _)| *prelude == name) else {
            return Ok(None);
        };
        tracing::debug!(name, "loading prelude type");
        let ast = tokenize(source)
            .and_then(|tokens| parse(name, source, tokens))
            .map_err(|err| {
                crate::interp::RuntimeError::invalid_definition(format!(
                    "prelude `{name}` failed to parse: {err}"
                ))
            })?;
        let scope = Rc::clone(interp.env().scope());
        let module = interp.define_module(name);
        interp
            .scoped(scope, |interp| interp.evaluate_into(&module, &ast))
            .map_err(|failure| {
                crate::interp::RuntimeError::invalid_definition(format!(
                    "prelude `{name}` failed to load: {failure}"
                ))
            })?;
        Ok(Some(module))
    }
}
