mod expr;
mod params;
mod stmts;


use crate::ast::*;
use crate::diagnostic::Diagnostic;
use crate::span::{Span, Spanned};
use crate::syntax::lexeme::Lexeme;

/// Deepest syntax tree the parser builds. Left-nested chains such as
/// `a + b + c` or `x.y.z` count one level per link.
const MAX_NESTING_DEPTH: u32 = 3000;

type PResult<T> = Result<T, Diagnostic>;

/// Recursive-descent parser over the lexer's token stream.
///
/// Stops at the first syntax error, the same way CPython reports a single
/// `SyntaxError` per file.
pub(crate) struct Parser {
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
    depth: u32,
    /// Deepest level reached since the innermost `measured` call began.
    peak: u32,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Spanned<Lexeme>>) -> Self {
        let mut tokens = tokens;
        if !matches!(tokens.last().map(|t| &t.node), Some(Lexeme::Eof)) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Spanned::new(Lexeme::Eof, Span::new(end, end)));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
            peak: 0,
        }
    }

    pub(crate) fn parse_module(mut self) -> Result<Module, Vec<Diagnostic>> {
        let mut body = Vec::new();
        while !self.at(&Lexeme::Eof) {
            match self.parse_statement() {
                Ok(stmts) => body.extend(stmts),
                Err(diag) => return Err(vec![diag]),
            }
        }
        Ok(Module { body })
    }

    /// Run `f` one nesting level deeper, failing once the limit is hit.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.depth_exceeded());
        }
        self.depth += 1;
        self.peak = self.peak.max(self.depth);
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Run `f` and report how many levels the subtree it built occupies.
    fn measured<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<(T, u32)> {
        let outer = std::mem::replace(&mut self.peak, self.depth);
        let result = f(self);
        let height = self.peak - self.depth;
        self.peak = self.peak.max(outer);
        result.map(|value| (value, height))
    }

    /// Record a chain that reaches `height` levels below the current depth.
    fn reach(&mut self, height: u32) -> PResult<()> {
        let level = self.depth + height;
        if level > MAX_NESTING_DEPTH {
            return Err(self.depth_exceeded());
        }
        self.peak = self.peak.max(level);
        Ok(())
    }

    fn depth_exceeded(&self) -> Diagnostic {
        self.error_with_help(
            &format!("nesting depth exceeded (maximum {} levels)", MAX_NESTING_DEPTH),
            "split long chains and deeply nested code into separate statements",
        )
    }

    // --- Utility methods ---

    fn peek(&self) -> &Lexeme {
        &self.tokens[self.pos].node
    }

    fn peek_at(&self, offset: usize) -> &Lexeme {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].node
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    fn advance(&mut self) -> &Spanned<Lexeme> {
        let tok = &self.tokens[self.pos];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, token: &Lexeme) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn eat(&mut self, token: &Lexeme) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Lexeme) -> PResult<Span> {
        if self.at(token) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.error_at_current(&format!(
                "expected {}, found {}",
                token.description(),
                self.peek().description()
            )))
        }
    }

    fn expect_ident(&mut self) -> PResult<String> {
        if let Lexeme::Ident(name) = self.peek().clone() {
            self.advance();
            Ok(name)
        } else {
            Err(self.error_at_current(&format!(
                "expected identifier, found {}",
                self.peek().description()
            )))
        }
    }

    /// `a.b.c` as used by imports.
    fn parse_dotted_name(&mut self) -> PResult<String> {
        let mut name = self.expect_ident()?;
        while self.eat(&Lexeme::Dot) {
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        Ok(name)
    }

    fn error_at_current(&self, msg: &str) -> Diagnostic {
        Diagnostic::error(msg.to_string(), self.current_span())
    }

    fn error_with_help(&self, msg: &str, help: &str) -> Diagnostic {
        Diagnostic::error(msg.to_string(), self.current_span()).with_help(help.to_string())
    }

    /// Error for a reserved keyword the grammar does not accept.
    fn unsupported_here(&self) -> Diagnostic {
        let what = self.peek().description();
        self.error_with_help(
            &format!("unsupported syntax: {}", what),
            "only the documented Python subset is accepted",
        )
    }
}
