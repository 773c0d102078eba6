use std::{fs, path::PathBuf, process};

use clap::Parser;
use evm_compiler::{CompileOptions, compile_program, init_tracing, input::read_contracts};
use tracing::{error, info};

/// Compile source-machine contracts into one target-machine program listing.
#[derive(Parser, Debug)]
#[command(name = "evm2avm", version, about)]
struct Args {
    /// JSON file describing the contracts to compile.
    input: PathBuf,

    /// Write the listing here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep trailing metadata sections.
    #[arg(long)]
    no_strip_metadata: bool,

    /// Leave `ADDRESS; PUSH20; AND; BALANCE` runs as they are.
    #[arg(long)]
    no_rewrite_self_balance: bool,

    /// Translate contracts one at a time.
    #[arg(long)]
    sequential: bool,
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let contracts = match read_contracts(&args.input) {
        Ok(contracts) => contracts,
        Err(e) => {
            error!("{}: {e}", args.input.display());
            process::exit(1);
        }
    };

    let options = CompileOptions::default()
        .with_strip_metadata(!args.no_strip_metadata)
        .with_rewrite_self_balance(!args.no_rewrite_self_balance)
        .with_parallel(!args.sequential);

    let program = match compile_program(contracts, &options) {
        Ok(program) => program,
        Err(e) => {
            error!("Compilation failed: {e}");
            process::exit(1);
        }
    };

    let listing = program.to_string();
    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, listing) {
                error!("{}: {e}", path.display());
                process::exit(1);
            }
            info!("Wrote {}", path.display());
        }
        None => print!("{listing}"),
    }
}
