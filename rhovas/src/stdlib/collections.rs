//! List and Map
//!
//! Both are shared by reference. Contents are snapshotted before calling back
//! into the interpreter so a lambda may mutate the collection it iterates.

use super::{methods, read_only};
use crate::interp::{EvalResult, Interpreter, Object, Payload, RuntimeError, Type};
use indexmap::IndexMap;

pub(super) fn define_list(ty: &Type) {
    read_only(ty, "size", list_size);
    methods(
        ty,
        &[
            ("[]", 1, list_get),
            ("get", 1, list_get),
            ("[]=", 2, list_set),
            ("set", 2, list_set),
            ("+", 1, list_concat),
            ("concat", 1, list_concat),
            ("add", 1, list_add),
            ("iterate", 1, list_iterate),
            ("for", 1, list_iterate),
            ("map", 1, list_map),
            ("filter", 1, list_filter),
            ("equals", 1, list_equals),
            ("toString", 0, list_to_string),
        ],
    );
}

pub(super) fn define_map(ty: &Type) {
    read_only(ty, "size", map_size);
    read_only(ty, "keys", map_keys);
    read_only(ty, "values", map_values);
    read_only(ty, "entries", map_entries);
    methods(
        ty,
        &[
            ("[]", 1, map_get),
            ("get", 1, map_get),
            ("[]=", 2, map_set),
            ("set", 2, map_set),
            ("iterate", 1, map_iterate),
            ("for", 1, map_iterate),
            ("map", 1, map_map),
            ("filter", 1, map_filter),
            ("equals", 1, map_equals),
            ("toString", 0, map_to_string),
        ],
    );
}

fn items(list: &Object) -> Result<Vec<Object>, RuntimeError> {
    Ok(list.as_list()?.borrow().clone())
}

/// Validates `index` against `len`
fn position(index: &Object, len: usize) -> Result<usize, RuntimeError> {
    let index = index.as_integer()?;
    if index < 0 || index as usize >= len {
        return Err(RuntimeError::index_out_of_bounds(index, len));
    }
    Ok(index as usize)
}

fn predicate(interp: &mut Interpreter, lambda: &Object, args: Vec<Object>) -> EvalResult<bool> {
    let result = interp.call_lambda(lambda, args)?;
    match result.payload {
        Payload::Boolean(keep) => Ok(keep),
        _ => Err(RuntimeError::type_mismatch("a Boolean filter result", result.type_name()).into()),
    }
}

fn list_size(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let size = args[0].as_list()?.borrow().len();
    Ok(interp.integer(size as i64))
}

fn list_get(_: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let list = args[0].as_list()?.borrow();
    let index = position(&args[1], list.len())?;
    Ok(list[index].clone())
}

fn list_set(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let mut list = args[0].as_list()?.borrow_mut();
    let index = position(&args[1], list.len())?;
    list[index] = args[2].clone();
    Ok(interp.null())
}

fn list_concat(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let mut joined = items(&args[0])?;
    joined.extend(items(&args[1])?);
    Ok(interp.list(joined))
}

fn list_add(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    args[0].as_list()?.borrow_mut().push(args[1].clone());
    Ok(interp.null())
}

fn list_iterate(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    for item in items(&args[0])? {
        interp.call_lambda(&args[1], vec![item])?;
    }
    Ok(interp.null())
}

fn list_map(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let mapped = items(&args[0])?
        .into_iter()
        .map(|item| interp.call_lambda(&args[1], vec![item]))
        .collect::<EvalResult<_>>()?;
    Ok(interp.list(mapped))
}

fn list_filter(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let mut kept = Vec::new();
    for item in items(&args[0])? {
        if predicate(interp, &args[1], vec![item.clone()])? {
            kept.push(item);
        }
    }
    Ok(interp.list(kept))
}

fn list_equals(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let Payload::List(_) = &args[1].payload else {
        return Ok(interp.boolean(false));
    };
    let (left, right) = (items(&args[0])?, items(&args[1])?);
    if left.len() != right.len() {
        return Ok(interp.boolean(false));
    }
    for (left, right) in left.iter().zip(&right) {
        if !interp.equals(left, right)? {
            return Ok(interp.boolean(false));
        }
    }
    Ok(interp.boolean(true))
}

fn list_to_string(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let rendered = items(&args[0])?
        .iter()
        .map(|item| interp.stringify(item))
        .collect::<EvalResult<Vec<_>>>()?;
    Ok(interp.string(format!("[{}]", rendered.join(", "))))
}

fn entries(map: &Object) -> Result<IndexMap<String, Object>, RuntimeError> {
    Ok(map.as_map()?.borrow().clone())
}

/// Arguments for a per-entry lambda: `(key, value)` for a two-parameter
/// lambda, otherwise a single `[key, value]` entry
fn entry_args(interp: &Interpreter, lambda: &Object, key: String, value: Object) -> Result<Vec<Object>, RuntimeError> {
    let key = interp.string(key);
    if lambda.as_lambda()?.arity == 2 {
        Ok(vec![key, value])
    } else {
        Ok(vec![interp.list(vec![key, value])])
    }
}

fn map_size(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let size = args[0].as_map()?.borrow().len();
    Ok(interp.integer(size as i64))
}

fn map_keys(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let keys = args[0]
        .as_map()?
        .borrow()
        .keys()
        .map(|key| interp.string(key.as_str()))
        .collect();
    Ok(interp.list(keys))
}

fn map_values(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let values = args[0].as_map()?.borrow().values().cloned().collect();
    Ok(interp.list(values))
}

fn map_entries(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let entries = args[0]
        .as_map()?
        .borrow()
        .iter()
        .map(|(key, value)| interp.list(vec![interp.string(key.as_str()), value.clone()]))
        .collect();
    Ok(interp.list(entries))
}

/// Missing keys read as `null`
fn map_get(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let key = args[1].as_str()?;
    let value = args[0].as_map()?.borrow().get(key).cloned();
    Ok(value.unwrap_or_else(|| interp.null()))
}

fn map_set(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let key = args[1].as_str()?.to_string();
    args[0].as_map()?.borrow_mut().insert(key, args[2].clone());
    Ok(interp.null())
}

fn map_iterate(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    for (key, value) in entries(&args[0])? {
        let call = entry_args(interp, &args[1], key, value)?;
        interp.call_lambda(&args[1], call)?;
    }
    Ok(interp.null())
}

/// Maps each entry, collecting the results into a list
fn map_map(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let mut mapped = Vec::new();
    for (key, value) in entries(&args[0])? {
        let call = entry_args(interp, &args[1], key, value)?;
        mapped.push(interp.call_lambda(&args[1], call)?);
    }
    Ok(interp.list(mapped))
}

fn map_filter(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let mut kept = IndexMap::new();
    for (key, value) in entries(&args[0])? {
        let call = entry_args(interp, &args[1], key.clone(), value.clone())?;
        if predicate(interp, &args[1], call)? {
            kept.insert(key, value);
        }
    }
    Ok(interp.map(kept))
}

/// Same keys with equal values, in any order
fn map_equals(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let Payload::Map(_) = &args[1].payload else {
        return Ok(interp.boolean(false));
    };
    let (left, right) = (entries(&args[0])?, entries(&args[1])?);
    if left.len() != right.len() {
        return Ok(interp.boolean(false));
    }
    for (key, value) in &left {
        let Some(other) = right.get(key) else {
            return Ok(interp.boolean(false));
        };
        if !interp.equals(value, other)? {
            return Ok(interp.boolean(false));
        }
    }
    Ok(interp.boolean(true))
}

fn map_to_string(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let rendered = render_entries(interp, &entries(&args[0])?)?;
    Ok(interp.string(format!("{{{rendered}}}")))
}

/// `key: value` pairs joined by commas
pub(super) fn render_entries(
    interp: &mut Interpreter,
    entries: &IndexMap<String, Object>,
) -> EvalResult<String> {
    let mut parts = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        parts.push(format!("{key}: {}", interp.stringify(value)?));
    }
    Ok(parts.join(", "))
}

#[cfg(test)]
mod tests {
    use crate::interp::{Failure, Interpreter, RuntimeError};
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn run(body: &str) -> Result<String, Failure> {
        let source = format!("func main() {{ {body} }}");
        let mut interp = Interpreter::new();
        let ast = parse("test.rho", &source, tokenize(&source).unwrap()).unwrap();
        let types = interp.evaluate("Main", &ast)?;
        let result = interp.invoke_main(&types)?;
        Ok(interp.stringify(&result).unwrap())
    }

    #[test]
    fn test_list_operations() {
        assert_eq!(
            run("val xs = [1, 2, 3]; xs.add(4); xs[0] = 10; return xs;").unwrap(),
            "[10, 2, 3, 4]"
        );
        assert_eq!(run("return [1, 2] + [3];").unwrap(), "[1, 2, 3]");
        assert_eq!(run("return [1, 2, 3].size;").unwrap(), "3");
        assert_eq!(run("return [1, 2, 3].map(|x| x * x);").unwrap(), "[1, 4, 9]");
        assert_eq!(run("return [1, 2, 3, 4].filter(|x| x.mod(2) == 0);").unwrap(), "[2, 4]");
    }

    #[test]
    fn test_list_trailing_lambda_with_implicit_val() {
        assert_eq!(
            run("var sum = 0; [1, 2, 3].iterate { sum = sum + val; }; return sum;").unwrap(),
            "6"
        );
    }

    #[test]
    fn test_for_is_an_iterate_alias() {
        assert_eq!(
            run("var sum = 0; [1, 2, 3].for { sum = sum + val; }; return sum;").unwrap(),
            "6"
        );
        assert_eq!(
            run("var keys = \"\"; {a: 1, b: 2}.for |k, v| { keys = keys + k; }; return keys;").unwrap(),
            "ab"
        );
    }

    #[test]
    fn test_list_index_out_of_bounds() {
        match run("return [1][1];") {
            Err(Failure::Runtime(RuntimeError::Arithmetic(message))) => {
                assert_eq!(message, "index 1 out of bounds for length 1");
            }
            other => panic!("expected index error, got {other:?}"),
        }
    }

    #[test]
    fn test_list_structural_equality() {
        assert_eq!(run("return [1, [2, \"a\"]] == [1, [2, \"a\"]];").unwrap(), "true");
        assert_eq!(run("return [1, 2] == [1];").unwrap(), "false");
        assert_eq!(run("val xs = [1]; return xs === [1];").unwrap(), "false");
    }

    #[test]
    fn test_filter_requires_boolean() {
        assert!(matches!(
            run("return [1].filter(|x| x);"),
            Err(Failure::Runtime(RuntimeError::TypeMismatch { .. }))
        ));
    }

    #[test]
    fn test_map_operations() {
        assert_eq!(
            run("val m = {a: 1}; m[\"b\"] = 2; return m;").unwrap(),
            "{a: 1, b: 2}"
        );
        assert_eq!(run("return {a: 1}[\"z\"];").unwrap(), "null");
        assert_eq!(run("return {a: 1, b: 2}.keys;").unwrap(), "[a, b]");
        assert_eq!(run("return {a: 1, b: 2}.values;").unwrap(), "[1, 2]");
        assert_eq!(run("return {a: 1}.entries;").unwrap(), "[[a, 1]]");
    }

    #[test]
    fn test_map_lambdas_receive_entries() {
        assert_eq!(
            run("return {a: 1, b: 2}.map(|k, v| k + v.toString());").unwrap(),
            "[a1, b2]"
        );
        assert_eq!(
            run("return {a: 1, b: 2}.filter(|entry| entry[1] > 1);").unwrap(),
            "{b: 2}"
        );
    }

    #[test]
    fn test_map_equality_ignores_order() {
        assert_eq!(run("return {a: 1, b: 2} == {b: 2, a: 1};").unwrap(), "true");
        assert_eq!(run("return {a: 1} == {a: 2};").unwrap(), "false");
    }

    #[test]
    fn test_map_size_is_read_only() {
        assert!(matches!(
            run("val m = {}; m.size = 3;"),
            Err(Failure::Runtime(RuntimeError::ReadOnlyProperty { .. }))
        ));
    }
}
