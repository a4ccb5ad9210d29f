//! Rhovas CLI

use clap::{Parser, Subcommand};
use rhovas::error::report_error;
use rhovas::interp::{Config, Interpreter};
use rhovas::repl::Repl;
use rhovas::CompileError;
use std::path::{Path, PathBuf};
use std::sync::Once;

#[derive(Parser)]
#[command(name = "rhovas", version, about = "Rhovas - a language for API design and enforcement")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log interpreter activity (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Maximum call depth before a stack overflow error
    #[arg(long, global = true, default_value_t = rhovas::interp::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a source file and run its main/0 function
    Run {
        /// Source file to run
        file: PathBuf,
        /// Module name (defaults to the file stem)
        #[arg(long)]
        module: Option<String>,
    },
    /// Start an interactive session
    Repl,
    /// Parse and dump AST as JSON (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
}

static TRACING_INIT: Once = Once::new();

fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) if verbose => EnvFilter::new("debug"),
            Err(_) => return,
        };
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config {
        max_depth: cli.max_depth,
    };

    let result = match cli.command {
        Command::Run { file, module } => run_file(&file, module, config),
        Command::Repl => run_repl(config),
        Command::Parse { file } => parse_file(&file),
        Command::Tokens { file } => tokenize_file(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Reads and parses a file, reporting front-end errors with source context
fn load(path: &Path) -> Result<rhovas::ast::Source, Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path).map_err(CompileError::from)?;
    let filename = path.display().to_string();
    let parsed = rhovas::lexer::tokenize(&source)
        .and_then(|tokens| rhovas::parser::parse(&filename, &source, tokens));
    match parsed {
        Ok(ast) => Ok(ast),
        Err(err) => {
            report_error(&filename, &source, &err);
            Err(err.into())
        }
    }
}

fn run_file(path: &Path, module: Option<String>, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let ast = load(path)?;
    let module = module.unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Main".to_string())
    });

    let mut interpreter = Interpreter::with_config(config);
    let types = interpreter.evaluate(&module, &ast)?;
    interpreter.invoke_main(&types)?;
    Ok(())
}

fn run_repl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut repl = Repl::new(config)?;
    repl.run()?;
    Ok(())
}

fn parse_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let ast = load(path)?;
    println!("{}", serde_json::to_string_pretty(&ast)?);
    Ok(())
}

fn tokenize_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let tokens = rhovas::lexer::tokenize(&source)?;
    for (tok, span) in &tokens {
        println!("{:?} @ {}..{}", tok, span.start, span.end);
    }
    Ok(())
}
