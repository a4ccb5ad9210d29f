//! Null, Boolean and Atom

use super::{methods, read_only};
use crate::interp::{EvalResult, Interpreter, Object, Payload, Type};

pub(super) fn define_null(ty: &Type) {
    methods(ty, &[("equals", 1, null_equals), ("toString", 0, null_to_string)]);
}

pub(super) fn define_boolean(ty: &Type) {
    methods(
        ty,
        &[
            ("!", 0, boolean_negate),
            ("negate", 0, boolean_negate),
            ("equals", 1, boolean_equals),
            ("toString", 0, boolean_to_string),
        ],
    );
}

pub(super) fn define_atom(ty: &Type) {
    read_only(ty, "name", atom_name);
    methods(ty, &[("equals", 1, atom_equals), ("toString", 0, atom_to_string)]);
}

fn null_equals(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    Ok(interp.boolean(matches!(args[1].payload, Payload::Null) && args[1].ty.name == "Null"))
}

fn null_to_string(interp: &mut Interpreter, _: Vec<Object>) -> EvalResult<Object> {
    Ok(interp.string("null"))
}

fn boolean_negate(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let value = args[0].as_boolean()?;
    Ok(interp.boolean(!value))
}

fn boolean_equals(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let left = args[0].as_boolean()?;
    let equal = matches!(args[1].payload, Payload::Boolean(right) if right == left);
    Ok(interp.boolean(equal))
}

fn boolean_to_string(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let value = args[0].as_boolean()?;
    Ok(interp.string(value.to_string()))
}

fn atom_name(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let name = args[0].as_atom()?;
    Ok(interp.string(name))
}

fn atom_equals(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let left = args[0].as_atom()?;
    let equal = matches!(&args[1].payload, Payload::Atom(right) if right.as_ref() == left);
    Ok(interp.boolean(equal))
}

fn atom_to_string(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let name = args[0].as_atom()?;
    Ok(interp.string(format!(":{name}")))
}

#[cfg(test)]
mod tests {
    use crate::interp::Interpreter;

    #[test]
    fn test_boolean_negation() {
        let mut interp = Interpreter::new();
        let value = interp.boolean(true);
        let negated = interp.call_method(value, "!", Vec::new()).unwrap();
        assert!(!negated.as_boolean().unwrap());
    }

    #[test]
    fn test_atoms() {
        let mut interp = Interpreter::new();
        let ok = interp.atom("ok");
        assert_eq!(interp.stringify(&ok).unwrap(), ":ok");
        let name = interp.get_property(&ok, "name").unwrap();
        assert_eq!(name.as_str().unwrap(), "ok");
        let other = interp.atom("ok");
        assert!(interp.equals(&ok, &other).unwrap());
        let string = interp.string("ok");
        assert!(!interp.equals(&ok, &string).unwrap());
    }

    #[test]
    fn test_null_only_equals_null() {
        let mut interp = Interpreter::new();
        let null = interp.null();
        let other = interp.null();
        let zero = interp.integer(0);
        assert!(interp.equals(&null, &other).unwrap());
        assert!(!interp.equals(&null, &zero).unwrap());
        assert_eq!(interp.stringify(&null).unwrap(), "null");
    }
}
