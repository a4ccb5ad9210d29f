//! Struct and Lambda
//!
//! `Struct` implements the value-struct protocol generically over the
//! instance scope: every local of a struct instance is a field, in
//! declaration order.

use super::collections::render_entries;
use super::{methods, read_only};
use crate::interp::{child_scope, EvalResult, Interpreter, Object, Payload, RuntimeError, Type};
use indexmap::IndexMap;
use std::rc::Rc;

pub(super) fn define_struct(ty: &Type) {
    read_only(ty, "fields", struct_fields);
    methods(
        ty,
        &[
            ("copy", 0, struct_copy),
            ("copy", 1, struct_copy),
            ("equals", 1, struct_equals),
            ("toString", 0, struct_to_string),
        ],
    );
}

pub(super) fn define_lambda(ty: &Type) {
    methods(ty, &[("toString", 0, lambda_to_string)]);
}

/// Field values of a struct instance in declaration order
fn fields(object: &Object) -> Result<IndexMap<String, Object>, RuntimeError> {
    let Some(instance) = object.as_instance() else {
        return Err(RuntimeError::type_mismatch("a struct instance", object.type_name()));
    };
    Ok(instance
        .borrow()
        .locals()
        .map(|variable| (variable.name.clone(), variable.get()))
        .collect())
}

fn struct_fields(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let fields = fields(&args[0])?;
    Ok(interp.map(fields))
}

/// Shallow copy, optionally replacing fields from a map argument
fn struct_copy(_: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let receiver = &args[0];
    let mut values = fields(receiver)?;
    if let Some(overrides) = args.get(1) {
        for (name, value) in overrides.as_map()?.borrow().iter() {
            let Some(slot) = values.get_mut(name) else {
                return Err(RuntimeError::undefined_member(receiver.type_name(), name, None).into());
            };
            *slot = value.clone();
        }
    }
    let ty = Rc::clone(&receiver.ty);
    let instance = child_scope(&ty.scope);
    {
        let mut scope = instance.borrow_mut();
        for (name, value) in values {
            scope.define(name, value);
        }
    }
    Ok(Object::new(ty, Payload::Instance(instance)))
}

/// Same struct type and pairwise equal fields
fn struct_equals(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = (&args[0], &args[1]);
    if right.as_instance().is_none() || left.ty.name != right.ty.name {
        return Ok(interp.boolean(false));
    }
    let (left, right) = (fields(left)?, fields(right)?);
    for ((left_name, left), (right_name, right)) in left.iter().zip(&right) {
        if left_name != right_name || !interp.equals(left, right)? {
            return Ok(interp.boolean(false));
        }
    }
    Ok(interp.boolean(left.len() == right.len()))
}

fn struct_to_string(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let rendered = render_entries(interp, &fields(&args[0])?)?;
    Ok(interp.string(format!("{} {{{rendered}}}", args[0].ty.short_name())))
}

fn lambda_to_string(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let arity = args[0].as_lambda()?.arity;
    Ok(interp.string(format!("<lambda/{arity}>")))
}
