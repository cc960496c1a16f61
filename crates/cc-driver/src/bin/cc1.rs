//! `cc1` — the parser stage. Reads a token stream from SSTORE/TSTORE and
//! drives the recursive-descent grammar, writing the resulting AST and
//! symbol table out through ASTORE/SYMTAB via the node buffer.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use cc_diag::{ErrorSink, TerminalRenderer};
use cc_hb::NodeBuffer;
use cc_store::{SStore, TStore};

#[derive(Parser, Debug)]
#[command(name = "cc1", about = "Parse a token stream into ASTORE/SYMTAB")]
struct Args {
    /// SSTORE file produced by `cc0`.
    sstore: PathBuf,
    /// TSTORE file produced by `cc0`.
    tstore: PathBuf,
    /// ASTORE file to create (overwritten if present).
    astore: PathBuf,
    /// SYMTAB file to create (overwritten if present).
    symtab: PathBuf,
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
                tracing::warn!("parsing completed with recorded errors");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("cc1: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let config = cc_driver::RuntimeConfig::load(args.config.as_deref())?;

    let mut sstore =
        SStore::open(&args.sstore).with_context(|| format!("opening {}", args.sstore.display()))?;
    let mut tstore =
        TStore::open(&args.tstore).with_context(|| format!("opening {}", args.tstore.display()))?;

    let mut hb = NodeBuffer::init(&args.astore, &args.symtab, config.hb_capacity)
        .context("creating ASTORE/SYMTAB")?;
    let mut sink = ErrorSink::new(config.error_config());

    let file_name = args.sstore.display().to_string();
    cc_parse::parse_translation_unit(&mut tstore, &mut sstore, &mut hb, &mut sink, file_name)
        .context("parsing translation unit")?;

    sink.print_summary(&TerminalRenderer).context("printing diagnostics")?;
    let had_errors = sink.has_errors();

    hb.end().context("closing node buffer")?;
    sstore.close().context("closing sstore")?;
    tstore.close().context("closing tstore")?;

    Ok(had_errors)
}
