use clap::Parser;

use cmips::binio::{read_native, read_v2};
use cmips::error::ToolError;
use cmips::pseudo;

/// Disassemble a native or compressed (v2) instruction stream to
/// MIPS-assembler-like text, one instruction per line.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input is in the compressed (v2) format rather than native
    #[arg(short, long)]
    compressed: bool,

    /// Canonicalize every instruction to its pseudo-op form before printing
    #[arg(short, long)]
    pseudo: bool,

    /// Path to the instruction stream
    input: String,
}

fn run(args: Args) -> Result<(), ToolError> {
    let bytes = std::fs::read(&args.input)?;
    let program = if args.compressed {
        read_v2(&bytes)
    } else {
        read_native(&bytes)
    };

    for instr in &program {
        let shown = if args.pseudo {
            pseudo::to_pseudo(*instr)
        } else {
            *instr
        };
        println!("{shown}");
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("{}: {e}", env!("CARGO_BIN_NAME"));
        std::process::exit(1);
    }
}
