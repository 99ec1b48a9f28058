pub mod check;
pub mod convert;
pub mod dump;

use std::path::{Path, PathBuf};
use std::process;

use astgen::config::ConvertConfig;
use astgen::convert::ConvertError;
use astgen::diagnostic::render_diagnostics;

/// Load the configuration: an explicit `--config` file, else an
/// `astgen.toml` found from the working directory upwards, else defaults.
pub fn resolve_config(explicit: Option<&Path>) -> ConvertConfig {
    let toml_path: Option<PathBuf> = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => ConvertConfig::find(Path::new(".")),
    };
    match toml_path {
        Some(path) => match ConvertConfig::load(&path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded configuration");
                config
            }
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        },
        None => ConvertConfig::default(),
    }
}

/// Print a conversion error and exit with status 1. Parse errors are
/// rendered against the offending file's text.
pub fn exit_with(err: ConvertError) -> ! {
    match &err {
        ConvertError::Parse {
            path,
            source_text,
            diagnostics,
        } => {
            render_diagnostics(diagnostics, &path.to_string_lossy(), source_text);
        }
        other => eprintln!("error: {}", other),
    }
    process::exit(1);
}
