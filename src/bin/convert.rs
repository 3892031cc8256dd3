use clap::Parser;

use cmips::binio::{read_native_checked, write_v2};
use cmips::error::ToolError;
use cmips::layout;

/// Convert a native instruction stream to the compressed (v2) format,
/// running the layout solver to decide which instructions keep their
/// short encoding.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the native instruction stream
    input: String,

    /// Path to write the compressed (v2) instruction stream
    output: String,
}

fn run(args: Args) -> Result<(), ToolError> {
    let bytes = std::fs::read(&args.input)?;
    let program = read_native_checked(&bytes)?;

    let canonical: Vec<_> = program
        .iter()
        .map(|i| cmips::pseudo::to_pseudo(*i))
        .map(|mut i| {
            i.compressed = cmips::compressed::is_compressible(&i);
            i
        })
        .collect();

    let (_, laid_out) = layout::solve(&canonical)?;
    let out_bytes = write_v2(&laid_out)?;
    std::fs::write(&args.output, out_bytes)?;

    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("{}: {e}", env!("CARGO_BIN_NAME"));
        std::process::exit(1);
    }
}
