use clap::Parser;

use cmips::binio::{read_native_checked, read_v2_checked};
use cmips::error::ToolError;
use cmips::sim::Simulator;

/// Run a native or compressed (v2) instruction stream against a small
/// interpreter, with an optional UART-backed data file for stdio.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Instruction memory size, in KiB
    #[arg(long = "imem-kib", default_value_t = 64)]
    imem_kib: usize,

    /// Data memory size, in KiB
    #[arg(long = "dmem-kib", default_value_t = 64)]
    dmem_kib: usize,

    /// Maximum number of steps to execute
    #[arg(long, default_value_t = 1_000_000)]
    cycles: u64,

    /// Binary is in the compressed (v2) format rather than native
    #[arg(short, long)]
    compressed: bool,

    /// Print a one-line trace of every step before executing it
    #[arg(short, long)]
    debug: bool,

    /// Path to the instruction binary
    binary: String,

    /// Optional file to use as the UART input stream (stdin otherwise)
    data: Option<String>,
}

fn run(args: Args) -> Result<(), ToolError> {
    let imem = std::fs::read(&args.binary)?;
    if imem.len() > args.imem_kib * 1024 {
        return Err(ToolError::message(format!(
            "binary is {} bytes, larger than the configured {} KiB imem",
            imem.len(),
            args.imem_kib
        )));
    }

    // The simulator treats a decode failure as fatal (unlike the
    // disassembler/analyzer, which tolerate and skip): validate the
    // whole stream up front so a malformed binary is rejected instead
    // of silently executing as a run of no-ops.
    if args.compressed {
        read_v2_checked(&imem)?;
    } else {
        read_native_checked(&imem)?;
    }

    let mut file_input;
    let mut stdin_input;
    let uart_in: &mut dyn std::io::Read = match &args.data {
        Some(path) => {
            file_input = std::fs::File::open(path)?;
            &mut file_input
        }
        None => {
            stdin_input = std::io::stdin();
            &mut stdin_input
        }
    };
    let mut stdout = std::io::stdout();

    let mut sim = Simulator::new(
        imem,
        args.dmem_kib * 1024,
        args.compressed,
        args.debug,
        uart_in,
        &mut stdout,
    );
    sim.run(args.cycles);

    println!("{}", sim.registers());
    println!("pc: 0x{:08x}", sim.pc());

    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("{}: {e}", env!("CARGO_BIN_NAME"));
        std::process::exit(1);
    }
}
