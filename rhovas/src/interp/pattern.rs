//! Structural pattern matching for `match` statements

use super::error::{EvalResult, RuntimeError};
use super::eval::Interpreter;
use super::scope::child_scope;
use super::value::{Object, Payload};
use crate::ast::{Expr, MatchCase, Pattern};
use indexmap::IndexMap;

impl Interpreter {
    pub(crate) fn exec_match(&mut self, args: &[Expr], cases: &[MatchCase]) -> EvalResult<()> {
        if args.is_empty() {
            return self.exec_conditional_match(cases);
        }
        let subject = match args {
            [single] => self.eval(single)?,
            _ => {
                let values = args.iter().map(|arg| self.eval(arg)).collect::<EvalResult<_>>()?;
                self.list(values)
            }
        };
        for case in cases {
            for pattern in &case.patterns {
                let scope = child_scope(self.scope());
                let matched = self.scoped(scope.clone(), |interp| interp.match_pattern(pattern, &subject))?;
                if matched {
                    return self.scoped(scope, |interp| interp.exec(&case.body));
                }
            }
        }
        let subject = self.stringify(&subject)?;
        Err(RuntimeError::NonExhaustiveMatch { subject }.into())
    }

    /// Cases are Boolean conditions; no matching case is a no-op
    fn exec_conditional_match(&mut self, cases: &[MatchCase]) -> EvalResult<()> {
        for case in cases {
            for pattern in &case.patterns {
                let matched = match pattern {
                    Pattern::Else(_) => true,
                    Pattern::Expression(cond) => {
                        let value = self.eval(cond)?;
                        match value.payload {
                            Payload::Boolean(value) => value,
                            _ => {
                                return Err(RuntimeError::type_mismatch(
                                    "a Boolean match condition",
                                    value.type_name(),
                                )
                                .into());
                            }
                        }
                    }
                    _ => {
                        return Err(RuntimeError::type_mismatch(
                            "a Boolean match condition",
                            "structural pattern",
                        )
                        .into());
                    }
                };
                if matched {
                    return self.exec(&case.body);
                }
            }
        }
        Ok(())
    }

    /// Matches `subject`, binding names into the current scope
    fn match_pattern(&mut self, pattern: &Pattern, subject: &Object) -> EvalResult<bool> {
        match pattern {
            Pattern::Expression(expr) => {
                let value = self.eval(expr)?;
                self.equals(subject, &value)
            }
            Pattern::Variable(name) => {
                if let Some(name) = name {
                    self.scope().borrow_mut().define(name.as_str(), subject.clone());
                }
                Ok(true)
            }
            Pattern::List { elements, rest } => {
                let Some(items) = self.list_view(subject)? else {
                    return Ok(false);
                };
                let fits = match rest {
                    Some(_) => items.len() >= elements.len(),
                    None => items.len() == elements.len(),
                };
                if !fits {
                    return Ok(false);
                }
                for (element, item) in elements.iter().zip(&items) {
                    if !self.match_pattern(element, item)? {
                        return Ok(false);
                    }
                }
                if let Some(rest) = rest {
                    let remainder = self.list(items[elements.len()..].to_vec());
                    self.bind_rest(rest, remainder);
                }
                Ok(true)
            }
            Pattern::Map { entries, rest } => {
                let Some(mut fields) = self.map_view(subject)? else {
                    return Ok(false);
                };
                if rest.is_none() && fields.len() != entries.len() {
                    return Ok(false);
                }
                for (key, entry) in entries {
                    let Some(value) = fields.shift_remove(key) else {
                        return Ok(false);
                    };
                    if !self.match_pattern(entry, &value)? {
                        return Ok(false);
                    }
                }
                if let Some(rest) = rest {
                    let remainder = self.map(fields);
                    self.bind_rest(rest, remainder);
                }
                Ok(true)
            }
            Pattern::Else(None) => Ok(true),
            Pattern::Else(Some(inner)) => {
                if self.match_pattern(inner, subject)? {
                    Ok(true)
                } else {
                    let subject = self.stringify(subject)?;
                    Err(RuntimeError::NonExhaustiveMatch { subject }.into())
                }
            }
        }
    }

    fn bind_rest(&mut self, name: &str, value: Object) {
        if name != "_" {
            self.scope().borrow_mut().define(name, value);
        }
    }

    /// Elements of a list, or the field values of a struct in order
    fn list_view(&mut self, subject: &Object) -> EvalResult<Option<Vec<Object>>> {
        match &subject.payload {
            Payload::List(list) => Ok(Some(list.borrow().clone())),
            _ => Ok(self
                .map_view(subject)?
                .map(|fields| fields.into_values().collect())),
        }
    }

    /// Entries of a map, or the `fields` of an instance exposing them
    fn map_view(&mut self, subject: &Object) -> EvalResult<Option<IndexMap<String, Object>>> {
        match &subject.payload {
            Payload::Map(map) => Ok(Some(map.borrow().clone())),
            Payload::Instance(_) if subject.ty.property("fields").is_some() => {
                let fields = self.get_property(subject, "fields")?;
                Ok(Some(fields.as_map()?.borrow().clone()))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interp::{Failure, Interpreter, RuntimeError};
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    /// Runs `main` of a module built from `source` and renders its result
    fn main_result(source: &str) -> Result<String, Failure> {
        let mut interp = Interpreter::new();
        let tokens = tokenize(source).unwrap();
        let ast = parse("test.rho", source, tokens).unwrap();
        let types = interp.evaluate("Main", &ast)?;
        let result = interp.invoke_main(&types)?;
        Ok(interp.stringify(&result).unwrap())
    }

    fn classify(subject: &str) -> String {
        let source = format!(
            r#"
            func main() {{
                match ({subject}) {{
                    1: return "one";
                    "a", "b": return "letter";
                    []: return "empty";
                    [head, tail..]: return "head " + head.toString() + " tail " + tail.toString();
                    {{x: 0, y}}: return "on axis at " + y.toString();
                    {{kind: :circle, rest..}}: return "circle with " + rest.keys.toString();
                    else: return "other";
                }}
            }}"#
        );
        main_result(&source).unwrap()
    }

    #[test]
    fn test_expression_patterns() {
        assert_eq!(classify("1"), "one");
        assert_eq!(classify("\"b\""), "letter");
        assert_eq!(classify("2"), "other");
    }

    #[test]
    fn test_list_patterns_with_rest() {
        assert_eq!(classify("[]"), "empty");
        assert_eq!(classify("[1, 2, 3]"), "head 1 tail [2, 3]");
        assert_eq!(classify("[1]"), "head 1 tail []");
    }

    #[test]
    fn test_map_patterns() {
        assert_eq!(classify("{x: 0, y: 5}"), "on axis at 5");
        assert_eq!(classify("{x: 1, y: 5}"), "other");
        assert_eq!(classify("{x: 0, y: 5, z: 1}"), "other");
        assert_eq!(classify("{kind: :circle, r: 2, c: 0}"), "circle with [r, c]");
    }

    #[test]
    fn test_non_exhaustive_match_names_subject() {
        let source = r#"
            func main() {
                match (2) {
                    1: return "a";
                }
            }"#;
        match main_result(source) {
            Err(Failure::Runtime(RuntimeError::NonExhaustiveMatch { subject })) => assert_eq!(subject, "2"),
            other => panic!("expected non-exhaustive match, got {other:?}"),
        }
    }

    #[test]
    fn test_else_with_failing_inner_pattern() {
        let source = r#"
            func main() {
                match ([1, 2]) {
                    else [a]: return a;
                    [a, b]: return b;
                }
            }"#;
        assert!(matches!(
            main_result(source),
            Err(Failure::Runtime(RuntimeError::NonExhaustiveMatch { .. }))
        ));
    }

    #[test]
    fn test_multi_argument_match() {
        let source = r#"
            func main() {
                match (1, "x") {
                    [2, _]: return "no";
                    [1, name]: return "yes " + name;
                }
            }"#;
        assert_eq!(main_result(source).unwrap(), "yes x");
    }

    #[test]
    fn test_conditional_match_without_hit_is_noop() {
        let source = r#"
            func main() {
                var result = "none";
                match {
                    1 > 2: result = "first";
                    false: result = "second";
                }
                return result;
            }"#;
        assert_eq!(main_result(source).unwrap(), "none");
    }

    #[test]
    fn test_struct_fields_match_map_and_list_patterns() {
        let source = r#"
            struct Point { val x; val y; }
            func main() {
                val p = Point(3, 4);
                var out = "";
                match (p) { {x, y}: out = out + (x + y).toString(); }
                match (p) { [a, b]: out = out + (a * b).toString(); }
                return out;
            }"#;
        assert_eq!(main_result(source).unwrap(), "712");
    }

    #[test]
    fn test_failed_pattern_bindings_do_not_leak() {
        let source = r#"
            func main() {
                val first = "outer";
                match ([1, 2]) {
                    [first, 3]: return "wrong";
                    else: return first;
                }
            }"#;
        assert_eq!(main_result(source).unwrap(), "outer");
    }
}
