use clap::Parser;

use cmips::analysis::AnalysisContext;
use cmips::binio::{read_native, read_v2};
use cmips::error::ToolError;
use cmips::pseudo;

/// Walk an instruction stream and print summary statistics about its
/// opcode mix, register usage, and immediate/offset distributions.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input is in the compressed (v2) format rather than native
    #[arg(short, long)]
    compressed: bool,

    /// Canonicalize every instruction to its pseudo-op form before counting
    #[arg(short, long)]
    pseudo: bool,

    /// Print the branch-offset histogram
    #[arg(long = "branch-offsets")]
    branch_offsets: bool,

    /// Print the stack-relative memory offset histogram
    #[arg(long = "stack-offsets")]
    stack_offsets: bool,

    /// Print the immediate-value histogram
    #[arg(long)]
    immediates: bool,

    /// Print the delay-slot NOP count
    #[arg(long)]
    nops: bool,

    /// Print the register-usage histogram
    #[arg(long)]
    registers: bool,

    /// Path to the instruction stream
    input: String,
}

fn print_signed_histogram(title: &str, h: &cmips::histogram::Histogram) {
    println!("{title}:");
    for (value, count) in h.sorted_signed() {
        println!("  {value}: {count}");
    }
}

fn run(args: Args) -> Result<(), ToolError> {
    let bytes = std::fs::read(&args.input)?;
    let program = if args.compressed {
        read_v2(&bytes)
    } else {
        read_native(&bytes)
    };

    let mut ctx = AnalysisContext::new();
    if args.pseudo {
        let canonical: Vec<_> = program.iter().map(|i| pseudo::to_pseudo(*i)).collect();
        ctx.observe_all(&canonical);
    } else {
        ctx.observe_all(&program);
    }

    println!("instructions: {}", ctx.instructions_seen());
    println!(
        "estimated compression ratio: {:.3}",
        ctx.estimated_compression_ratio()
    );
    println!("opcode frequency:");
    for (op, count) in &ctx.opcode_freq {
        println!("  {op:?}: {count}");
    }

    if args.nops {
        println!("nop count: {}", ctx.nop_count);
    }
    if args.registers {
        print_signed_histogram("register usage", &ctx.registers);
    }
    if args.branch_offsets {
        print_signed_histogram("branch offsets", &ctx.branch_offsets);
    }
    if args.stack_offsets {
        print_signed_histogram("stack offsets", &ctx.stack_offsets);
    }
    if args.immediates {
        print_signed_histogram("immediates", &ctx.immediates);
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
