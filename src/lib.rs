pub mod ast;
pub mod config;
pub mod convert;
pub mod diagnostic;
pub mod dump;
pub mod frontend;
mod printable;
pub mod span;
mod stack;
pub mod syntax;

use diagnostic::Diagnostic;
use frontend::{PythonParser, SourceParser};
use span::Span;

pub use config::ConvertConfig;
pub use convert::{convert_dir, ConvertError, ConvertReport};
pub use dump::{Dump, DumpFormat};

/// Parse Python source and dump it in the default text format.
///
/// Diagnostics are returned, not rendered; `filename` only labels warnings
/// in the log.
pub fn dump_source(source: &str, filename: &str) -> Result<String, Vec<Diagnostic>> {
    let module = PythonParser.parse(source, filename)?;
    dump::render(&module, DumpFormat::Text)
        .map_err(|e| vec![Diagnostic::error(e.to_string(), Span::dummy())])
}
