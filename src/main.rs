//! Lanzar CLI — Rust-native flow deployment builder.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "lanzar",
    version,
    about = "Rust-native flow deployment builder — composable annotations, deterministic merge, BLAKE3 fingerprints"
)]
struct Cli {
    #[command(subcommand)]
    command: lanzar::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = lanzar::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
