//! judge -- adjudicates one movement turn.
//!
//! Reads a JSON turn document and writes the result document to stdout.
//!
//! Usage:
//!   judge [PATH]
//!
//! With no PATH, or PATH `-`, the document is read from stdin. Diagnostics
//! go to stderr; set `RUST_LOG` to see them.

use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use thiserror::Error;

use dipjudge::logging;
use dipjudge::protocol::{load_turn, render_result, TurnError};
use dipjudge::AdjudicationError;

#[derive(Debug, Error)]
enum CliError {
    #[error("usage: judge [PATH]")]
    Usage,

    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error("adjudication failed: {0}")]
    Adjudication(#[from] AdjudicationError),

    #[error("cannot write result: {0}")]
    Write(#[from] io::Error),

    #[error("cannot encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

fn read_input(path: Option<&str>) -> Result<String, CliError> {
    match path {
        None | Some("-") => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .map_err(|source| CliError::Read {
                    path: "stdin".to_string(),
                    source,
                })?;
            Ok(input)
        }
        Some(p) => fs::read_to_string(p).map_err(|source| CliError::Read {
            path: p.to_string(),
            source,
        }),
    }
}

fn run(args: &[String]) -> Result<(), CliError> {
    let path = match args {
        [] => None,
        [p] if p != "-h" && p != "--help" => Some(p.as_str()),
        _ => return Err(CliError::Usage),
    };
    let turn = load_turn(&read_input(path)?)?;
    let adjudication = turn.adjudicate()?;
    let doc = render_result(&turn.map, &adjudication);

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    serde_json::to_writer_pretty(&mut out, &doc)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("judge: {}", e);
            ExitCode::FAILURE
        }
    }
}
