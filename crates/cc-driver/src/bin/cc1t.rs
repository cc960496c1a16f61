//! `cc1t` — dumps what `cc1` parsed: an indented tree by default, or node
//! counts with `--stats`. Read-only against SSTORE/ASTORE/SYMTAB; never
//! writes back to them.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use cc_hb::NodeBuffer;
use cc_store::{AstId, SStore};
use cc_visit::{walk, Printer, TreeStats};

#[derive(Parser, Debug)]
#[command(name = "cc1t", about = "Dump the AST/symbol table produced by cc1")]
struct Args {
    sstore: PathBuf,
    astore: PathBuf,
    symtab: PathBuf,
    #[arg(short, long)]
    verbose: bool,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print node-kind counts and max depth instead of the indented tree.
    #[arg(long)]
    stats: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    cc_driver::init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("cc1t: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = cc_driver::RuntimeConfig::load(args.config.as_deref())?;

    let mut sstore =
        SStore::open(&args.sstore).with_context(|| format!("opening {}", args.sstore.display()))?;
    let mut hb = NodeBuffer::open(&args.astore, &args.symtab, config.hb_capacity)
        .context("opening node buffer")?;

    let root = AstId(hb.ast_len());
    if root.is_none() {
        anyhow::bail!("astore is empty, nothing to dump");
    }

    if args.stats {
        let mut stats = TreeStats::default();
        walk(&mut hb, root, &mut stats).context("walking tree for stats")?;
        println!("total_nodes = {}", stats.total_nodes);
        println!("max_depth = {}", stats.max_depth);
        let mut by_kind: Vec<_> = stats.by_kind.iter().collect();
        by_kind.sort_by(|a, b| a.0.cmp(b.0));
        for (kind, count) in by_kind {
            println!("  {kind} = {count}");
        }
    } else {
        let mut printer = Printer::new(&mut sstore);
        walk(&mut hb, root, &mut printer).context("walking tree to print")?;
        print!("{}", printer.into_output());
    }

    Ok(())
}
