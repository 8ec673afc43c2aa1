use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    Session,
    error::Error,
    interpreter::{
        evaluator::core::Interpreter,
        lexer::{Token, lex},
        parser::core::{Parsed, Parser},
        preprocessor::preprocess,
        value::core::Value,
    },
};

/// What the driver prints and whether it evaluates.
///
/// Built from the command line. The `print_*` dumps go to standard error so
/// that standard output carries only program output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The script to run. `None` starts the REPL.
    pub file:               Option<PathBuf>,
    /// Dump the preprocessed source.
    pub print_preprocessed: bool,
    /// Dump the token stream.
    pub print_tokens:       bool,
    /// Dump each parsed expression as canonical source.
    pub print_ast:          bool,
    /// Dump this configuration before starting.
    pub print_options:      bool,
    /// Evaluate after parsing.
    pub run:                bool,
    /// Start the REPL even when a file is given.
    pub repl:               bool,
    /// Print the last non-unit value of a script.
    pub pipe_mode:          bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { file:               None,
               print_preprocessed: false,
               print_tokens:       false,
               print_ast:          false,
               print_options:      false,
               run:                true,
               repl:               false,
               pipe_mode:          false, }
    }
}

impl Config {
    /// Returns `true` if any intermediate stage is being dumped.
    #[must_use]
    pub const fn dumps_stages(&self) -> bool {
        self.print_preprocessed || self.print_tokens || self.print_ast
    }

    /// Returns `true` if the REPL should run instead of a script.
    #[must_use]
    pub const fn interactive(&self) -> bool {
        self.repl || self.file.is_none()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.file
                       .as_ref()
                       .map_or_else(|| "-".to_string(), |path| path.display().to_string());
        writeln!(f, "file:                {file}")?;
        writeln!(f, "print tokens:        {}", self.print_tokens)?;
        writeln!(f, "print parsed:        {}", self.print_ast)?;
        writeln!(f, "print pre-processed: {}", self.print_preprocessed)?;
        writeln!(f, "run?                 {}", self.run)?;
        writeln!(f, "repl?                {}", self.repl)?;
        write!(f, "pipe mode?           {}", self.pipe_mode)
    }
}

/// Runs a script file.
///
/// The whole file is preprocessed and parsed first; evaluation starts only
/// once every expression has parsed, and stops at the first runtime error.
///
/// # Parameters
/// - `path`: The script. Includes are resolved against its directory.
/// - `config`: Which stages to dump and whether to evaluate.
///
/// # Returns
/// The value of the last expression, or `None` if the file has none or
/// `config.run` is off.
pub fn run_file(path: &Path, config: &Config) -> Result<Option<Value>, Error> {
    let source = fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(),
                                                                       source })?;
    info!(path = %path.display(), "running script");

    let tokens = tokenize(&source, path, false, config)?;
    let parsed = Parser::new().parse(&tokens)?;
    dump_ast(&parsed, config);

    if !config.run {
        return Ok(None);
    }
    print_banner(config);

    let mut interpreter = Interpreter::with_operators(&parsed.operators)?;
    Ok(interpreter.evaluate_all(&parsed.exprs)?)
}

/// Runs one line of REPL input in a long-lived session.
///
/// # Parameters
/// - `session`: Parser and interpreter state shared by every line.
/// - `line`: The text that was typed.
/// - `root`: Directory that includes are resolved against.
/// - `config`: Which stages to dump and whether to evaluate.
///
/// # Returns
/// The value of the last expression on the line, or `None` if it had none.
pub fn run_line(session: &mut Session,
                line: &str,
                root: &Path,
                config: &Config)
                -> Result<Option<Value>, Error> {
    let tokens = tokenize(line, root, true, config)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let parsed = session.parse(&tokens)?;
    dump_ast(&parsed, config);

    if !config.run {
        return Ok(None);
    }
    print_banner(config);

    session.execute(&parsed)
}

fn tokenize(source: &str,
            root: &Path,
            repl_mode: bool,
            config: &Config)
            -> Result<Vec<Token>, Error> {
    let text = preprocess(source, root, repl_mode)?;
    if config.print_preprocessed {
        eprintln!("{text}");
    }

    let tokens = lex(&text)?;
    if config.print_tokens {
        for token in &tokens {
            eprintln!("{token}");
        }
    }
    Ok(tokens)
}

fn dump_ast(parsed: &Parsed, config: &Config) {
    if config.print_ast {
        for expr in &parsed.exprs {
            eprintln!("{expr};");
        }
    }
}

fn print_banner(config: &Config) {
    if config.dumps_stages() {
        println!("Output:\n");
    }
}
