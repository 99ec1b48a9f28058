use std::path::PathBuf;
use std::process;

use astgen::convert::parse_file;
use astgen::dump::{render, DumpFormat};
use astgen::frontend::PythonParser;
use clap::Args;

use super::exit_with;

#[derive(Args)]
pub struct DumpArgs {
    /// Source file to parse
    pub file: PathBuf,
    /// Output format: dump or json
    #[arg(long, default_value_t = DumpFormat::Text)]
    pub format: DumpFormat,
}

pub fn cmd_dump(args: DumpArgs) {
    let DumpArgs { file, format } = args;
    let module = match parse_file(&PythonParser, &file) {
        Ok(m) => m,
        Err(err) => exit_with(err),
    };
    match render(&module, format) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("error: cannot serialize '{}': {}", file.display(), e);
            process::exit(1);
        }
    }
}
