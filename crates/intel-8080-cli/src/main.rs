//! `run <program-file>` — load a raw 8080 program image and execute it on
//! the core until it halts (§6 CLI surface, §10.4).

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use intel_8080::Machine;

#[derive(Parser)]
#[command(name = "intel-8080", about = "Run an Intel 8080 program image")]
struct Args {
    /// Raw binary program image, loaded at address 0.
    program_file: String,

    /// Log verbosity.
    #[arg(long, default_value = "warn")]
    log_level: log::LevelFilter,
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::new().filter_level(args.log_level).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let image = fs::read(&args.program_file)
        .map_err(|e| format!("reading {}: {e}", args.program_file))?;

    let mut machine = Machine::new();
    machine.load(&image).map_err(|e| e.to_string())?;
    machine.start();

    if !machine.is_halted() {
        return Err("program did not halt".to_string());
    }

    log::info!("halted at PC {:#06X}", machine.pc());
    Ok(())
}
