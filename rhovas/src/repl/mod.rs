//! REPL (Read-Eval-Print Loop) for Rhovas
//!
//! Declarations extend a persistent `REPL` module; any other input runs as a
//! statement in that module's scope so variables survive between lines.

use crate::ast::Member;
use crate::error::{report_error, CompileError};
use crate::interp::{Config, Failure, Interpreter, TypeRef};
use crate::lexer::{tokenize, Token};
use crate::parser::{parse_repl, ReplInput};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use thiserror::Error;

const PROMPT: &str = "> ";
const CONTINUATION_PROMPT: &str = "... ";
const HISTORY_FILE: &str = ".rhovas_history";
const MODULE: &str = "REPL";
const SOURCE_NAME: &str = "<repl>";

/// Error from one REPL entry
#[derive(Debug, Error)]
pub enum ReplError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] Failure),
}

/// Interpreter state shared by every entry
pub struct Session {
    interpreter: Interpreter,
    module: TypeRef,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self::with_interpreter(Interpreter::with_config(config))
    }

    pub fn with_interpreter(interpreter: Interpreter) -> Self {
        let module = interpreter.define_module(MODULE);
        Session { interpreter, module }
    }

    /// Evaluates one complete entry, returning the line to echo
    pub fn eval_input(&mut self, input: &str) -> Result<Option<String>, ReplError> {
        let tokens = tokenize(input)?;
        match parse_repl(input, tokens)? {
            ReplInput::Source(source) => {
                let types = self.interpreter.evaluate_into(&self.module, &source)?;
                let defined: Vec<&str> = types
                    .iter()
                    .skip(1)
                    .map(|ty| ty.short_name())
                    .chain(source.members.iter().filter_map(|member| match member {
                        Member::Function(function) => Some(function.name.as_str()),
                        _ => None,
                    }))
                    .collect();
                if defined.is_empty() {
                    return Ok(None);
                }
                Ok(Some(format!(">> {}", defined.join(", "))))
            }
            ReplInput::Statement(stmt) => {
                let Some(value) = self.interpreter.execute(&self.module, &stmt)? else {
                    return Ok(None);
                };
                if value.is_null() {
                    return Ok(None);
                }
                let rendered = self
                    .interpreter
                    .stringify(&value)
                    .map_err(|unwind| self.interpreter.failure(unwind))?;
                Ok(Some(format!(">> {rendered}")))
            }
        }
    }
}

/// Whether `input` has unclosed braces and needs more lines
fn needs_continuation(input: &str) -> bool {
    let Ok(tokens) = tokenize(input) else {
        return false;
    };
    let depth = tokens.iter().fold(0i64, |depth, (token, _)| match token {
        Token::LBrace => depth + 1,
        Token::RBrace => depth - 1,
        _ => depth,
    });
    depth > 0
}

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    session: Session,
    history_path: Option<PathBuf>,
}

impl Repl {
    pub fn new(config: Config) -> RlResult<Self> {
        let mut editor = DefaultEditor::new()?;
        let history_path = dirs_home().map(|home| home.join(HISTORY_FILE));
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }
        Ok(Repl {
            editor,
            session: Session::new(config),
            history_path,
        })
    }

    pub fn run(&mut self) -> RlResult<()> {
        println!("Rhovas REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        while let Some(input) = self.read_entry()? {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                continue;
            }
            let _ = self.editor.add_history_entry(trimmed);
            if trimmed.starts_with(':') {
                if handle_command(trimmed) {
                    break;
                }
                continue;
            }
            match self.session.eval_input(&input) {
                Ok(Some(echo)) => println!("{echo}"),
                Ok(None) => {}
                Err(ReplError::Compile(err)) => report_error(SOURCE_NAME, &input, &err),
                Err(ReplError::Runtime(err)) => eprintln!("Error: {err}"),
            }
        }

        if let Some(path) = &self.history_path {
            let _ = self.editor.save_history(path);
        }
        Ok(())
    }

    /// Reads lines until braces balance. `None` ends the session.
    fn read_entry(&mut self) -> RlResult<Option<String>> {
        let mut input = String::new();
        loop {
            let prompt = if input.is_empty() { PROMPT } else { CONTINUATION_PROMPT };
            match self.editor.readline(prompt) {
                Ok(line) => {
                    input.push_str(&line);
                    input.push('\n');
                    if !needs_continuation(&input) {
                        return Ok(Some(input));
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    input.clear();
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    return Ok(None);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Handles a `:command`; returns true to exit
fn handle_command(cmd: &str) -> bool {
    match cmd {
        ":quit" | ":q" | ":exit" => {
            println!("Goodbye!");
            true
        }
        ":help" | ":h" | ":?" => {
            print_help();
            false
        }
        ":clear" => {
            print!("\x1B[2J\x1B[1;1H");
            false
        }
        _ => {
            println!("Unknown command: {cmd}");
            println!("Type :help for help.");
            false
        }
    }
}

fn print_help() {
    println!("Rhovas REPL Commands:");
    println!("  :help, :h, :?   Show this help");
    println!("  :quit, :q       Exit the REPL");
    println!("  :clear          Clear the screen");
    println!();
    println!("You can enter:");
    println!("  - Statements: var x = 1; print(x + 1);");
    println!("  - Expressions: [1, 2, 3].map(|n| n * 2);");
    println!("  - Declarations: func square(n) {{ return n * n; }}");
    println!("  - Components: struct Point {{ val x; val y; }}");
    println!();
    println!("An unclosed `{{` continues the entry on the next line.");
}

fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::RuntimeError;
    use pretty_assertions::assert_eq;

    fn echo(session: &mut Session, input: &str) -> Option<String> {
        session.eval_input(input).unwrap()
    }

    #[test]
    fn test_expressions_echo_values() {
        let mut session = Session::new(Config::default());
        assert_eq!(echo(&mut session, "1 + 2;"), Some(">> 3".to_string()));
        assert_eq!(echo(&mut session, "\"a\" + 1;"), Some(">> a1".to_string()));
    }

    #[test]
    fn test_variables_persist_between_entries() {
        let mut session = Session::new(Config::default());
        assert_eq!(echo(&mut session, "var x = 40;"), Some(">> 40".to_string()));
        assert_eq!(echo(&mut session, "x = x + 2;"), Some(">> 42".to_string()));
        assert_eq!(echo(&mut session, "x;"), Some(">> 42".to_string()));
    }

    #[test]
    fn test_null_results_are_not_echoed() {
        let mut session = Session::new(Config::default());
        assert_eq!(echo(&mut session, "null;"), None);
        assert_eq!(echo(&mut session, "if (true) { 1; }"), None);
    }

    #[test]
    fn test_declarations_extend_module() {
        let mut session = Session::new(Config::default());
        assert_eq!(
            echo(&mut session, "func square(n) { return n * n; }"),
            Some(">> square".to_string())
        );
        assert_eq!(
            echo(&mut session, "struct Point { val x; val y; }"),
            Some(">> Point".to_string())
        );
        assert_eq!(echo(&mut session, "square(7);"), Some(">> 49".to_string()));
        assert_eq!(
            echo(&mut session, "Point(1, 2);"),
            Some(">> Point {x: 1, y: 2}".to_string())
        );
    }

    #[test]
    fn test_errors_leave_session_usable() {
        let mut session = Session::new(Config::default());
        assert!(matches!(
            session.eval_input("missing;"),
            Err(ReplError::Runtime(Failure::Runtime(RuntimeError::UndefinedVariable { .. })))
        ));
        assert!(matches!(session.eval_input("1 +;"), Err(ReplError::Compile(_))));
        assert_eq!(echo(&mut session, "2;"), Some(">> 2".to_string()));
    }

    #[test]
    fn test_needs_continuation() {
        assert!(needs_continuation("func f() {"));
        assert!(needs_continuation("while (true) {\n if (x) {\n }"));
        assert!(!needs_continuation("func f() { return 1; }"));
        assert!(!needs_continuation("1 + 2;"));
    }

    #[test]
    fn test_handle_command() {
        assert!(handle_command(":quit"));
        assert!(handle_command(":q"));
        assert!(!handle_command(":help"));
        assert!(!handle_command(":unknown"));
    }
}
