//! forgec - the Forge compiler CLI.
//!
//! ```text
//! forgec compile FILE    type-check FILE and print LLVM IR
//! forgec jit FILE        type-check FILE and run its main() in-process
//! ```
//!
//! Exit code 0 on success, 1 on any failure.

use std::path::PathBuf;
use std::process::ExitCode;

use forge_drv::{Config, Session};

struct Args {
    command: Command,
    input: PathBuf,
    verbose: bool,
}

enum Command {
    Compile,
    Jit,
}

fn print_usage() {
    eprintln!("usage: forgec <compile|jit> FILE [--verbose]");
}

fn parse_args() -> Option<Args> {
    let mut command = None;
    let mut input = None;
    let mut verbose = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "compile" if command.is_none() => command = Some(Command::Compile),
            "jit" if command.is_none() => command = Some(Command::Jit),
            "--verbose" | "-v" => verbose = true,
            _ if input.is_none() && !arg.starts_with('-') => {
                input = Some(PathBuf::from(arg));
            }
            other => {
                eprintln!("unrecognized argument: {other}");
                return None;
            }
        }
    }

    Some(Args {
        command: command?,
        input: input?,
        verbose,
    })
}

fn main() -> ExitCode {
    let Some(args) = parse_args() else {
        print_usage();
        return ExitCode::FAILURE;
    };

    let mut session = Session::new(Config {
        verbose: args.verbose,
        ..Config::new()
    });

    let file = match session.load_file(&args.input) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("error: {error:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Command::Compile => session.compile_ir(file).map(|ir| println!("{ir}")),
        Command::Jit => session.run_jit(file).map(|status| {
            println!("main returned {status}");
        }),
    };

    let report = session.render_diagnostics();
    if !report.is_empty() {
        eprint!("{report}");
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
