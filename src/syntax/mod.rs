pub mod lexeme;
pub mod lexer;
pub(crate) mod parser;

use crate::ast::Module;
use crate::diagnostic::Diagnostic;
use crate::span::Span;
use crate::stack::with_deep_stack;

use lexer::Lexer;
use parser::Parser;

/// Outcome of a successful parse: the tree plus any non-fatal warnings.
#[derive(Debug)]
pub struct Parsed {
    pub module: Module,
    pub warnings: Vec<Diagnostic>,
}

/// Tokenize and parse Python source text.
///
/// Lexer errors stop before parsing; otherwise the first syntax error is
/// returned. Warnings (such as invalid escape sequences) never fail a parse.
pub fn parse_module(source: &str) -> Result<Parsed, Vec<Diagnostic>> {
    with_deep_stack(|| parse_on_current_thread(source)).unwrap_or_else(|e| {
        Err(vec![Diagnostic::error(
            format!("cannot start parser thread: {}", e),
            Span::dummy(),
        )])
    })
}

fn parse_on_current_thread(source: &str) -> Result<Parsed, Vec<Diagnostic>> {
    let (tokens, diagnostics) = Lexer::new(source).tokenize();
    let (errors, warnings): (Vec<_>, Vec<_>) =
        diagnostics.into_iter().partition(Diagnostic::is_error);
    if !errors.is_empty() {
        return Err(errors);
    }
    let module = Parser::new(tokens).parse_module()?;
    Ok(Parsed { module, warnings })
}
