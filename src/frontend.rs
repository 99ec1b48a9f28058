//! Pluggable source parsers.
//!
//! The batch converter only needs "text in, dumpable tree out"; anything
//! implementing [`SourceParser`] can be plugged into [`crate::convert`].

use serde::Serialize;
use tracing::warn;

use crate::ast::Module;
use crate::diagnostic::Diagnostic;
use crate::dump::Dump;
use crate::syntax::parse_module;

pub trait SourceParser {
    type Tree: Dump + Serialize + Send + Sync;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Parse the full text of one file. `filename` is only used for
    /// diagnostics and logging.
    fn parse(&self, source: &str, filename: &str) -> Result<Self::Tree, Vec<Diagnostic>>;
}

/// The Python frontend: indentation-aware lexer plus recursive-descent parser.
#[derive(Clone, Copy, Debug, Default)]
pub struct PythonParser;

impl SourceParser for PythonParser {
    type Tree = Module;

    fn name(&self) -> &'static str {
        "python"
    }

    fn parse(&self, source: &str, filename: &str) -> Result<Module, Vec<Diagnostic>> {
        let parsed = parse_module(source)?;
        for warning in &parsed.warnings {
            let (line, col) = warning.line_col(source);
            warn!("{}:{}:{}: {}", filename, line, col, warning.message);
        }
        Ok(parsed.module)
    }
}
