use std::path::PathBuf;

use astgen::config::ConvertConfig;
use astgen::dump::DumpFormat;
use astgen::frontend::PythonParser;
use clap::Args;

use super::{exit_with, resolve_config};

#[derive(Args)]
pub struct ConvertArgs {
    /// Configuration file (defaults to astgen.toml in the current directory or above)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory of source files
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Directory for the generated dumps (created if missing)
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Suffix replaced in output names
    #[arg(long)]
    pub source_suffix: Option<String>,
    /// Suffix substituted in output names
    #[arg(long)]
    pub target_suffix: Option<String>,
    /// Output format: dump or json
    #[arg(long)]
    pub format: Option<DumpFormat>,
}

impl ConvertArgs {
    /// Command-line flags take precedence over the configuration file.
    fn apply(self, config: &mut ConvertConfig) {
        if let Some(dir) = self.input {
            config.input_dir = dir;
        }
        if let Some(dir) = self.output {
            config.output_dir = dir;
        }
        if let Some(suffix) = self.source_suffix {
            config.source_suffix = suffix;
        }
        if let Some(suffix) = self.target_suffix {
            config.target_suffix = suffix;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
    }
}

pub fn cmd_convert(args: ConvertArgs) {
    let mut config = resolve_config(args.config.as_deref());
    args.apply(&mut config);

    if let Err(err) = astgen::convert_dir(&config, &PythonParser) {
        exit_with(err);
    }
}
