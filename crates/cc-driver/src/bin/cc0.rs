//! `cc0` — the lexer stage. Reads a C source file and writes it out as a
//! token stream split across SSTORE (interned text) and TSTORE (the token
//! records themselves).
//!
//! Exit code is 0 whenever EOF was reached, even if lexical errors were
//! recorded along the way (they're printed to stderr and the run is still
//! considered complete); non-zero only on I/O failure or an unreachable
//! EOF (spec.md's simplified two-class exit contract).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use cc_diag::{ErrorSink, TerminalRenderer};
use cc_store::{SStore, TStore};

#[derive(Parser, Debug)]
#[command(name = "cc0", about = "Tokenize a C source file into SSTORE/TSTORE")]
struct Args {
    /// C source file to lex.
    source: PathBuf,
    /// SSTORE file to create (overwritten if present).
    sstore: PathBuf,
    /// TSTORE file to create (overwritten if present).
    tstore: PathBuf,
    #[arg(short, long)]
    verbose: bool,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    cc_driver::init_tracing(args.verbose);

    match run(&args) {
        Ok(had_errors) => {
            if had_errors {
                tracing::warn!("lexing completed with recorded errors");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("cc0: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let config = cc_driver::RuntimeConfig::load(args.config.as_deref())?;

    let source = std::fs::read_to_string(&args.source)
        .with_context(|| format!("reading {}", args.source.display()))?;
    let file_name = args.source.display().to_string();

    let mut sstore = SStore::init(&args.sstore)
        .with_context(|| format!("creating {}", args.sstore.display()))?;
    let mut tstore = TStore::init(&args.tstore)
        .with_context(|| format!("creating {}", args.tstore.display()))?;
    let mut sink = ErrorSink::new(config.error_config());

    cc_lex::lex(&source, &file_name, &mut sstore, &mut tstore, &mut sink).context("lexing source")?;

    sink.print_summary(&TerminalRenderer).context("printing diagnostics")?;
    let had_errors = sink.has_errors();

    sstore.close().context("closing sstore")?;
    tstore.close().context("closing tstore")?;

    Ok(had_errors)
}
