//! `lineqpp` CLI — filter text, solving embedded linear equations.
//!
//! Reads the input file (or standard input), copies text through with
//! part-token substitution, and aborts with exit code 1 on the first
//! I/O, parse, or arithmetic error.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use env_logger::Env;

use lineqpp_core::error::LineqError;
use lineqpp_core::preprocess::Preprocessor;

/// Linear-equation text preprocessor.
///
/// Copies the input to the output, replacing `name#r` / `name#i`
/// references with values solved from `#lineqpp` equation lines.
#[derive(Debug, Parser)]
#[command(name = "lineqpp", disable_version_flag = true)]
struct Cli {
    /// Output to FILE (default is standard output).
    #[arg(short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print equation debugging information to standard error.
    #[arg(short = 'd')]
    debug: bool,

    /// Print version information and exit.
    #[arg(short = 'v')]
    version: bool,

    /// Input file (default is standard input).
    input: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage errors exit 1; --help output is not an error.
            let code = i32::from(err.use_stderr());
            let _ = err.print();
            process::exit(code);
        }
    };

    if cli.version {
        eprintln!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    init_logger(cli.debug);

    let (label, source) = match read_input(cli.input.as_ref()) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    let out: Box<dyn Write> = match cli.output.as_ref() {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(file),
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                process::exit(1);
            }
        },
        None => Box::new(io::stdout().lock()),
    };

    let mut pp = Preprocessor::new(BufWriter::new(out));
    if let Err(err) = pp.run(&source) {
        report(&label, &err);
        process::exit(1);
    }
    if let Err(err) = pp.into_inner().flush() {
        eprintln!("{label}: {err}");
        process::exit(1);
    }
}

/// Route the debug trace to stderr as bare message lines.
///
/// `-d` lowers the filter to `debug`; `RUST_LOG` still overrides.
fn init_logger(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

/// Read the whole input, labelled for error reports.
fn read_input(path: Option<&PathBuf>) -> Result<(String, String), String> {
    match path {
        Some(path) => {
            let label = path.display().to_string();
            let source = std::fs::read_to_string(path).map_err(|e| format!("{label}: {e}"))?;
            Ok((label, source))
        }
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| format!("<stdin>: {e}"))?;
            Ok(("<stdin>".to_owned(), source))
        }
    }
}

/// `"{file}:{lineno}: {message} at token {lexeme}"` on stderr.
fn report(label: &str, err: &LineqError) {
    match err.line {
        Some(line) => eprintln!("{label}:{line}: {err}"),
        None => eprintln!("{label}: {err}"),
    }
}
