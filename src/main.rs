use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use shk_emu::cpu::debugger::Debugger;
use shk_emu::cpu::executor::{self, Signal};
use shk_emu::cpu::instructions::decode_instruction;
use shk_emu::error::EmuError;
use shk_emu::loader;

/// An emulator and interactive debugger for the shk 16-bit instruction set.
#[derive(Parser, Debug)]
#[command(name = "shk-emu")]
struct Cli {
    /// Trace every decoded and executed opcode to stdout.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// One or more program images, concatenated in argument order.
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap's own usage errors (missing args, `--help`, `--version`)
            // are printed by `e` itself; map them to the "usage error" exit
            // code reserved for usage errors, rather than clap's own default of 2.
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { 1 } else { 0 });
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(if cli.verbose { "debug" } else { "warn" }))
        .without_time()
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::from(0),
        Err(EmuError::DebuggerQuit) => ExitCode::from(0),
        Err(EmuError::Io(e)) => {
            eprintln!("shk-emu: {e}");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("shk-emu: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<(), EmuError> {
    let mut machine = loader::load_images(&cli.images, cli.verbose)?;
    let mut debugger = Debugger::new();

    // The loader leaves IP parked one past the last word written (its own
    // write-cursor contract); program entry is always word address 0, so
    // the run loop resets IP and SP here before decoding the first
    // instruction.
    machine.set_ip(0);
    machine.set_sp(0);

    loop {
        let instr = decode_instruction(&mut machine)?;
        if machine.verbose {
            debug!(op = %instr.op, "decoded");
        }

        match executor::execute(&mut machine, &instr, &mut debugger)? {
            Signal::Continue => {}
            Signal::Terminate => return Ok(()),
        }
    }
}
