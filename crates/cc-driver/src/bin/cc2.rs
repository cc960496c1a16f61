//! `cc2` — loads a TAC instruction stream and runs it to completion (or
//! until it faults or exhausts its step budget). Exactly one of
//! `--entry-label`/`--entry-function`/`--entry-point` selects where
//! execution starts; omitting all three starts at instruction 0.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use cc_tac::{State, TacStream, Vm};

#[derive(Parser, Debug)]
#[command(name = "cc2", about = "Execute a TAC instruction stream")]
struct Args {
    /// TAC file produced by an (out-of-scope) code generation stage.
    tacfile: PathBuf,
    #[arg(short, long)]
    verbose: bool,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Jump to this label id before running.
    #[arg(long, conflicts_with_all = ["entry_function", "entry_point"])]
    entry_label: Option<u16>,
    /// Resolve the entry point by function name, per the label-count
    /// heuristic documented on `Vm::set_entry_function`.
    #[arg(long, conflicts_with_all = ["entry_label", "entry_point"])]
    entry_function: Option<String>,
    /// Jump to this raw instruction index before running.
    #[arg(long, conflicts_with_all = ["entry_label", "entry_function"])]
    entry_point: Option<u32>,
    /// Trace each dispatched instruction via `tracing::trace!`.
    #[arg(long)]
    trace: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    cc_driver::init_tracing(args.verbose);

    match run(&args) {
        Ok(State::Finished) => ExitCode::SUCCESS,
        Ok(state) => {
            eprintln!("cc2: program left in unexpected state {state:?}");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("cc2: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<State> {
    let config = cc_driver::RuntimeConfig::load(args.config.as_deref())?;

    let mut stream = TacStream::open_read_only(&args.tacfile)
        .with_context(|| format!("opening {}", args.tacfile.display()))?;
    let code = stream.read_all().context("reading TAC instructions")?;
    stream.close().context("closing TAC stream")?;

    let mut vm = Vm::new(config.vm_config());
    vm.trace(args.trace);
    vm.load(code).context("loading TAC into the interpreter")?;

    if let Some(label) = args.entry_label {
        vm.set_entry_label(label).context("resolving --entry-label")?;
    } else if let Some(name) = &args.entry_function {
        vm.set_entry_function(name).context("resolving --entry-function")?;
    } else if let Some(addr) = args.entry_point {
        vm.set_entry_point(addr);
    }

    if let Err(fault) = vm.run() {
        tracing::error!(?fault, pc = vm.pc(), "VM halted on fault");
        return Ok(vm.state());
    }

    Ok(vm.state())
}
