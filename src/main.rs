use std::{path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser};
use opera::{
    driver::{Config, run_file},
    repl::Repl,
};
use tracing_subscriber::EnvFilter;

/// opera runs programs in an expression language where operators, their
/// precedence and their associativity are declared by the program itself.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print the source after `#include` and `#define` expansion.
    #[arg(long)]
    pre: bool,

    /// Print the token stream.
    #[arg(long)]
    token: bool,

    /// Print every parsed expression as canonical source.
    #[arg(long)]
    ast: bool,

    /// Print the effective options before running.
    #[arg(long)]
    opt: bool,

    /// Stop after parsing.
    #[arg(long)]
    no_run: bool,

    /// Start the REPL even when a file is given.
    #[arg(long)]
    repl: bool,

    /// Pipe mode prints the last value of a script if it is not `()`.
    #[arg(short, long)]
    pipe_mode: bool,

    /// Increase logging verbosity (-v: debug, -vv+: trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// The script to run. Without one, the REPL starts.
    file: Option<PathBuf>,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self { file:               args.file,
               print_preprocessed: args.pre,
               print_tokens:       args.token,
               print_ast:          args.ast,
               print_options:      args.opt,
               run:                !args.no_run,
               repl:               args.repl,
               pipe_mode:          args.pipe_mode, }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_directive = directive_for_verbosity(args.verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                                                       EnvFilter::new(default_directive)
                                                   });
    tracing_subscriber::fmt().with_env_filter(filter)
                             .with_writer(std::io::stderr)
                             .init();

    let config = Config::from(args);
    if config.print_options {
        eprintln!("{config}");
    }

    if config.interactive() {
        return match Repl::new(config).and_then(|mut repl| repl.run()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Failed to start the REPL: {e}");
                ExitCode::FAILURE
            },
        };
    }

    let Some(path) = config.file.as_deref() else {
        return ExitCode::FAILURE;
    };
    match run_file(path, &config) {
        Ok(value) => {
            if config.pipe_mode
               && let Some(value) = value.filter(|value| !value.is_unit())
            {
                println!("{value}");
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        },
    }
}

const fn directive_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "opera=debug",
        _ => "opera=trace",
    }
}
