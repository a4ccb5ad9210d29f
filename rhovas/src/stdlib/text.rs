//! Character and String

use super::protocols::ordering;
use super::{methods, read_only};
use crate::interp::{EvalResult, Interpreter, Object, Payload, RuntimeError, Type};

pub(super) fn define_character(ty: &Type) {
    methods(
        ty,
        &[
            ("+", 1, character_concat),
            ("concat", 1, character_concat),
            ("compare", 1, character_compare),
            ("equals", 1, character_equals),
            ("toString", 0, character_to_string),
        ],
    );
}

pub(super) fn define_string(ty: &Type) {
    read_only(ty, "length", string_length);
    read_only(ty, "chars", string_chars);
    methods(
        ty,
        &[
            ("+", 1, string_concat),
            ("concat", 1, string_concat),
            ("contains", 1, string_contains),
            ("substring", 1, string_substring),
            ("substring", 2, string_substring),
            ("compare", 1, string_compare),
            ("equals", 1, string_equals),
            ("toString", 0, string_to_string),
        ],
    );
}

fn character_concat(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let head = args[0].as_character()?;
    let tail = interp.stringify(&args[1])?;
    Ok(interp.string(format!("{head}{tail}")))
}

fn character_compare(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = (args[0].as_character()?, args[1].as_character()?);
    Ok(ordering(interp, left.cmp(&right)))
}

fn character_equals(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let left = args[0].as_character()?;
    let equal = matches!(args[1].payload, Payload::Character(right) if right == left);
    Ok(interp.boolean(equal))
}

fn character_to_string(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let value = args[0].as_character()?;
    Ok(interp.string(value.to_string()))
}

fn string_length(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let length = args[0].as_str()?.chars().count();
    Ok(interp.integer(length as i64))
}

fn string_chars(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let chars = args[0].as_str()?.chars().map(|c| interp.character(c)).collect();
    Ok(interp.list(chars))
}

/// Appends the rendering of any object
fn string_concat(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let tail = interp.stringify(&args[1])?;
    let head = args[0].as_str()?;
    Ok(interp.string(format!("{head}{tail}")))
}

fn string_contains(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (haystack, needle) = (args[0].as_str()?, args[1].as_str()?);
    Ok(interp.boolean(haystack.contains(needle)))
}

/// Character-indexed slice `[start, end)`; `end` defaults to the length
fn string_substring(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let value = args[0].as_str()?;
    let length = value.chars().count();
    let start = args[1].as_integer()?;
    let end = match args.get(2) {
        Some(end) => end.as_integer()?,
        None => length as i64,
    };
    if start < 0 || start as usize > length {
        return Err(RuntimeError::index_out_of_bounds(start, length).into());
    }
    if end < start || end as usize > length {
        return Err(RuntimeError::index_out_of_bounds(end, length).into());
    }
    let slice: String = value
        .chars()
        .skip(start as usize)
        .take((end - start) as usize)
        .collect();
    Ok(interp.string(slice))
}

fn string_compare(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (left, right) = (args[0].as_str()?, args[1].as_str()?);
    Ok(ordering(interp, left.cmp(right)))
}

fn string_equals(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let left = args[0].as_str()?;
    let equal = matches!(&args[1].payload, Payload::String(right) if right.as_ref() == left);
    Ok(interp.boolean(equal))
}

fn string_to_string(_: &mut Interpreter, mut args: Vec<Object>) -> EvalResult<Object> {
    Ok(args.swap_remove(0))
}
