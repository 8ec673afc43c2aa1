use std::path::PathBuf;

use rustyline::{DefaultEditor, Result as RlResult, error::ReadlineError};
use tracing::debug;

use crate::{
    Session,
    driver::{Config, run_line},
    error::Error,
};

const PROMPT: &str = ">>> ";
const HISTORY_FILE: &str = ".opera_history";

/// An interactive session reading one line at a time.
///
/// Every line is preprocessed, parsed and evaluated in the same [`Session`],
/// so operators and variables carry over between lines. The value of the
/// last expression on a line is printed; errors are printed and the loop
/// goes on.
pub struct Repl {
    editor:       DefaultEditor,
    session:      Session,
    config:       Config,
    root:         PathBuf,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Creates a REPL whose includes resolve against the current directory.
    pub fn new(config: Config) -> RlResult<Self> {
        let mut editor = DefaultEditor::new()?;
        let history_path = std::env::var_os("HOME").map(|home| {
                                                        PathBuf::from(home).join(HISTORY_FILE)
                                                    });
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        Ok(Self { editor,
                  session: Session::new(),
                  config,
                  root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
                  history_path })
    }

    /// Reads and evaluates lines until `:quit` or end of input.
    pub fn run(&mut self) -> RlResult<()> {
        println!("opera {}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(trimmed);

                    if trimmed.starts_with(':') {
                        if self.command(trimmed) {
                            break;
                        }
                        continue;
                    }

                    match run_line(&mut self.session, &line, &self.root, &self.config) {
                        Ok(Some(value)) => println!("{value}"),
                        Ok(None) => {},
                        Err(e) => {
                            if let Some(marker) = caret(&line, &e) {
                                eprintln!("{marker}");
                            }
                            eprintln!("{e}");
                        },
                    }
                },
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                },
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("Error: {e}");
                    break;
                },
            }
        }

        if let Some(path) = &self.history_path
           && let Err(e) = self.editor.save_history(path)
        {
            debug!(error = %e, "could not save history");
        }
        Ok(())
    }

    /// Handles a `:` command. Returns `true` when the REPL should exit.
    fn command(&self, command: &str) -> bool {
        match command {
            ":quit" | ":q" => true,
            ":help" | ":h" => {
                print_help();
                false
            },
            ":operators" | ":ops" => {
                for entry in self.session.operators().entries() {
                    let def = &entry.def;
                    println!("{:<7} {:>2} {}", def.keyword(), def.precedence, def.symbol);
                }
                false
            },
            _ => {
                println!("Unknown command: {command}");
                println!("Type :help for help.");
                false
            },
        }
    }
}

/// Points at the column of `line` an error refers to, counting the prompt
/// so that the marker lines up with the echoed input.
///
/// Returns `None` when the error has no position or points outside `line`.
fn caret(line: &str, error: &Error) -> Option<String> {
    let position = error.position().filter(|position| position.line == 1)?;
    let before = line.get(..position.column.checked_sub(1)?)?;
    Some(format!("{}^", " ".repeat(PROMPT.len() + before.chars().count())))
}

fn print_help() {
    println!("Commands:");
    println!("  :help, :h          Show this help");
    println!("  :operators, :ops   List the operators currently defined");
    println!("  :quit, :q          Exit");
    println!();
    println!("Examples:");
    println!("  let x = 2 ^ 10");
    println!("  infixl 6 <+> (a, b) = a * 10 + b");
    println!("  1 <+> 2 <+> 3");
    println!("  let twice = fn(f, x) f(f(x))");
    println!("  #include \"lib.op\"");
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::evaluate_source;

    #[test]
    fn carets_point_at_the_error_column() {
        let line = "1 + * 2";
        let err = evaluate_source(line).unwrap_err();
        assert_eq!(caret(line, &err).as_deref(), Some("        ^"));

        let line = "let n = 1; n(2)";
        let err = evaluate_source(line).unwrap_err();
        assert_eq!(caret(line, &err).as_deref(), Some("               ^"));
    }

    #[test]
    fn errors_without_a_column_get_no_caret() {
        let line = "#include \"absent.op\"";
        let mut session = Session::new();
        let err = run_line(&mut session, line, Path::new("."), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Preprocess(_)));
        assert_eq!(caret(line, &err), None);
    }
}
