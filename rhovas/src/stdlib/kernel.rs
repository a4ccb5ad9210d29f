//! Kernel functions, bound in the global scope

use super::functions;
use crate::interp::{EvalResult, Interpreter, Object, Payload, Type};

pub(super) fn define_kernel(ty: &Type) {
    functions(ty, &[("print", 1, print), ("range", 2, range), ("range", 3, range)]);
}

fn print(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let text = interp.stringify(&args[0])?;
    interp.write_line(&text)?;
    Ok(interp.null())
}

/// `range(start, end)` excludes `end`; a third argument of `true` or
/// `:incl` includes it
fn range(interp: &mut Interpreter, args: Vec<Object>) -> EvalResult<Object> {
    let (start, end) = (args[0].as_integer()?, args[1].as_integer()?);
    let inclusive = match args.get(2).map(|bound| &bound.payload) {
        Some(Payload::Boolean(inclusive)) => *inclusive,
        Some(Payload::Atom(bound)) => bound.as_ref() == "incl",
        _ => false,
    };
    let values: Vec<Object> = if inclusive {
        (start..=end).map(|i| interp.integer(i)).collect()
    } else {
        (start..end).map(|i| interp.integer(i)).collect()
    };
    Ok(interp.list(values))
}
