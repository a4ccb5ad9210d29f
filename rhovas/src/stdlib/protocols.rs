//! Equatable and Comparable

use super::methods;
use crate::interp::{EvalResult, Interpreter, Object, Type};
use std::cmp::Ordering;

pub(super) fn define_equatable(ty: &Type) {
    methods(ty, &[("==", 1, equatable_eq)]);
}

pub(super) fn define_comparable(ty: &Type) {
    methods(ty, &[("==", 1, equatable_eq), ("equals", 1, comparable_equals)]);
}

fn equatable_eq(interp: &mut Interpreter, mut args: Vec<Object>) -> EvalResult<Object> {
    let receiver = args.remove(0);
    interp.call_method(receiver, "equals", args)
}

/// Default `equals` for comparable types: `compare` reports `:eq`
fn comparable_equals(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let ordering = interp.compare(&args[0], &args[1])?;
    Ok(interp.boolean(ordering == Ordering::Equal))
}

/// Renders an [`Ordering`] as the atom `compare` methods return
pub(super) fn ordering(interp: &Interpreter, ordering: Ordering) -> Object {
    interp.atom(match ordering {
        Ordering::Less => "lt",
        Ordering::Equal => "eq",
        Ordering::Greater => "gt",
    })
}
