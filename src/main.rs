mod cli;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cli::check::CheckArgs;
use cli::convert::ConvertArgs;
use cli::dump::DumpArgs;

#[derive(Parser)]
#[command(
    name = "astgen",
    version,
    about = "Convert a directory of Python sources into syntax tree dumps"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse every file of the input directory and write one dump per file
    Convert(ConvertArgs),
    /// Parse one file and print its dump
    Dump(DumpArgs),
    /// Parse every file of a directory without writing anything
    Check(CheckArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Convert(args) => cli::convert::cmd_convert(args),
        Command::Dump(args) => cli::dump::cmd_dump(args),
        Command::Check(args) => cli::check::cmd_check(args),
    }
}
