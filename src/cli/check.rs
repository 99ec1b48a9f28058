use std::path::PathBuf;

use astgen::convert::{list_inputs, parse_file};
use astgen::frontend::PythonParser;
use clap::Args;

use super::exit_with;

#[derive(Args)]
pub struct CheckArgs {
    /// Directory whose entries are parsed; nothing is written
    pub dir: PathBuf,
}

pub fn cmd_check(args: CheckArgs) {
    let names = list_inputs(&args.dir).unwrap_or_else(|err| exit_with(err));
    for name in names {
        let path = args.dir.join(name);
        if let Err(err) = parse_file(&PythonParser, &path) {
            exit_with(err);
        }
        eprintln!("OK: {}", path.display());
    }
}
