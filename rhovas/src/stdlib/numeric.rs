//! Integer and Decimal
//!
//! Integer arithmetic is checked: overflow and division by zero raise an
//! arithmetic error instead of wrapping or panicking. Decimal arithmetic
//! follows IEEE 754.

use super::protocols::ordering;
use super::{methods, Native};
use crate::interp::{EvalResult, Interpreter, Object, Payload, RuntimeError, Type};

pub(super) fn define_integer(ty: &Type) {
    let binary: [(&str, &str, Native); 4] = [
        ("+", "add", integer_add),
        ("-", "sub", integer_sub),
        ("*", "mul", integer_mul),
        ("/", "div", integer_div),
    ];
    for (symbol, name, body) in binary {
        methods(ty, &[(symbol, 1, body), (name, 1, body)]);
    }
    methods(
        ty,
        &[
            ("-", 0, integer_negate),
            ("negate", 0, integer_negate),
            ("mod", 1, integer_mod),
            ("rem", 1, integer_rem),
            ("compare", 1, integer_compare),
            ("equals", 1, integer_equals),
            ("toString", 0, integer_to_string),
            ("toDecimal", 0, integer_to_decimal),
        ],
    );
}

pub(super) fn define_decimal(ty: &Type) {
    let binary: [(&str, &str, Native); 4] = [
        ("+", "add", decimal_add),
        ("-", "sub", decimal_sub),
        ("*", "mul", decimal_mul),
        ("/", "div", decimal_div),
    ];
    for (symbol, name, body) in binary {
        methods(ty, &[(symbol, 1, body), (name, 1, body)]);
    }
    methods(
        ty,
        &[
            ("-", 0, decimal_negate),
            ("negate", 0, decimal_negate),
            ("compare", 1, decimal_compare),
            ("equals", 1, decimal_equals),
            ("toString", 0, decimal_to_string),
            ("toInteger", 0, decimal_to_integer),
        ],
    );
}

fn integers(args: &[Object]) -> Result<(i64, i64), RuntimeError> {
    Ok((args[0].as_integer()?, args[1].as_integer()?))
}

fn checked(
    interp: &Interpreter,
    result: Option<i64>,
    message: impl FnOnce() -> String,
) -> EvalResult<Object> {
    match result {
        Some(value) => Ok(interp.integer(value)),
        None => Err(RuntimeError::arithmetic(message()).into()),
    }
}

fn integer_add(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = integers(&args)?;
    checked(interp, left.checked_add(right), || format!("integer overflow in {left} + {right}"))
}

fn integer_sub(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = integers(&args)?;
    checked(interp, left.checked_sub(right), || format!("integer overflow in {left} - {right}"))
}

fn integer_mul(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = integers(&args)?;
    checked(interp, left.checked_mul(right), || format!("integer overflow in {left} * {right}"))
}

fn integer_div(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = integers(&args)?;
    checked(interp, left.checked_div(right), || division_error(left, "/", right))
}

fn integer_mod(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = integers(&args)?;
    checked(interp, left.checked_rem_euclid(right), || division_error(left, "mod", right))
}

fn integer_rem(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = integers(&args)?;
    checked(interp, left.checked_rem(right), || division_error(left, "rem", right))
}

fn division_error(left: i64, op: &str, right: i64) -> String {
    if right == 0 {
        format!("division by zero in {left} {op} {right}")
    } else {
        format!("integer overflow in {left} {op} {right}")
    }
}

fn integer_negate(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let value = args[0].as_integer()?;
    checked(interp, value.checked_neg(), || format!("integer overflow in -{value}"))
}

fn integer_compare(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = integers(&args)?;
    Ok(ordering(interp, left.cmp(&right)))
}

fn integer_equals(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let left = args[0].as_integer()?;
    let equal = matches!(args[1].payload, Payload::Integer(right) if right == left);
    Ok(interp.boolean(equal))
}

fn integer_to_string(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let value = args[0].as_integer()?;
    Ok(interp.string(value.to_string()))
}

fn integer_to_decimal(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let value = args[0].as_integer()?;
    Ok(interp.decimal(value as f64))
}

fn decimals(args: &[Object]) -> Result<(f64, f64), RuntimeError> {
    Ok((args[0].as_decimal()?, args[1].as_decimal()?))
}

fn decimal_add(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = decimals(&args)?;
    Ok(interp.decimal(left + right))
}

fn decimal_sub(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = decimals(&args)?;
    Ok(interp.decimal(left - right))
}

fn decimal_mul(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = decimals(&args)?;
    Ok(interp.decimal(left * right))
}

fn decimal_div(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = decimals(&args)?;
    Ok(interp.decimal(left / right))
}

fn decimal_negate(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let value = args[0].as_decimal()?;
    Ok(interp.decimal(-value))
}

fn decimal_compare(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = decimals(&args)?;
    match left.partial_cmp(&right) {
        Some(order) => Ok(ordering(interp, order)),
        None => Err(RuntimeError::arithmetic(format!("cannot compare {left:?} and {right:?}")).into()),
    }
}

fn decimal_equals(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let left = args[0].as_decimal()?;
    let equal = matches!(args[1].payload, Payload::Decimal(right) if right == left);
    Ok(interp.boolean(equal))
}

fn decimal_to_string(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let value = args[0].as_decimal()?;
    Ok(interp.string(format!("{value:?}")))
}

/// Truncates toward zero
fn decimal_to_integer(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let value = args[0].as_decimal()?;
    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(RuntimeError::arithmetic(format!("{value:?} is out of Integer range")).into());
    }
    Ok(interp.integer(truncated as i64))
}
