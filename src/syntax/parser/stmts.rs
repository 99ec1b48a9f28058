use crate::ast::*;
use crate::diagnostic::Diagnostic;
use crate::span::Span;
use crate::syntax::lexeme::Lexeme;

use super::{PResult, Parser};

impl Parser {
    /// One statement line. Simple lines separated by `;` yield several
    /// statements.
    pub(super) fn parse_statement(&mut self) -> PResult<Vec<Stmt>> {
        match self.peek() {
            Lexeme::If => Ok(vec![self.parse_if_stmt()?]),
            Lexeme::While => Ok(vec![self.parse_while_stmt()?]),
            Lexeme::For => Ok(vec![self.parse_for_stmt()?]),
            Lexeme::Def => Ok(vec![self.parse_function_def(Vec::new())?]),
            Lexeme::Class => Ok(vec![self.parse_class_def(Vec::new())?]),
            Lexeme::At => Ok(vec![self.parse_decorated()?]),
            Lexeme::Indent => Err(self.error_at_current("unexpected indent")),
            Lexeme::Dedent => Err(self.error_at_current("unindent does not match any block")),
            tok if tok.is_unsupported_keyword() => Err(self.unsupported_here()),
            _ => self.parse_simple_line(),
        }
    }

    /// `small_stmt (';' small_stmt)* [';'] NEWLINE`
    fn parse_simple_line(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = vec![self.parse_small_stmt()?];
        while self.eat(&Lexeme::Semicolon) {
            if self.at(&Lexeme::Newline) || self.at(&Lexeme::Eof) {
                break;
            }
            stmts.push(self.parse_small_stmt()?);
        }
        if !self.eat(&Lexeme::Newline) && !self.at(&Lexeme::Eof) {
            return Err(self.error_at_current(&format!(
                "expected newline, found {}",
                self.peek().description()
            )));
        }
        Ok(stmts)
    }

    /// The body after a `:`: either an indented block or a simple line.
    pub(super) fn parse_block(&mut self) -> PResult<Vec<Stmt>> {
        self.expect(&Lexeme::Colon)?;
        if !self.eat(&Lexeme::Newline) {
            return self.parse_simple_line();
        }
        if !self.at(&Lexeme::Indent) {
            return Err(self.error_at_current("expected an indented block"));
        }
        self.nested(|p| {
            p.advance();
            let mut body = Vec::new();
            while !p.at(&Lexeme::Dedent) && !p.at(&Lexeme::Eof) {
                body.extend(p.parse_statement()?);
            }
            p.eat(&Lexeme::Dedent);
            Ok(body)
        })
    }

    fn parse_small_stmt(&mut self) -> PResult<Stmt> {
        match self.peek() {
            Lexeme::Pass => {
                self.advance();
                Ok(Stmt::Pass)
            }
            Lexeme::Break => {
                self.advance();
                Ok(Stmt::Break)
            }
            Lexeme::Continue => {
                self.advance();
                Ok(Stmt::Continue)
            }
            Lexeme::Return => {
                self.advance();
                let value = if self.at_line_end() {
                    None
                } else {
                    Some(self.parse_star_expr_list()?)
                };
                Ok(Stmt::Return(value))
            }
            Lexeme::Del => self.parse_del_stmt(),
            Lexeme::Assert => {
                self.advance();
                let test = self.parse_test()?;
                let msg = if self.eat(&Lexeme::Comma) {
                    Some(self.parse_test()?)
                } else {
                    None
                };
                Ok(Stmt::Assert { test, msg })
            }
            Lexeme::Raise => {
                self.advance();
                if self.at_line_end() {
                    return Ok(Stmt::Raise {
                        exc: None,
                        cause: None,
                    });
                }
                let exc = self.parse_test()?;
                let cause = if self.eat(&Lexeme::From) {
                    Some(self.parse_test()?)
                } else {
                    None
                };
                Ok(Stmt::Raise {
                    exc: Some(exc),
                    cause,
                })
            }
            Lexeme::Global => {
                self.advance();
                Ok(Stmt::Global(self.parse_name_list()?))
            }
            Lexeme::Nonlocal => {
                self.advance();
                Ok(Stmt::Nonlocal(self.parse_name_list()?))
            }
            Lexeme::Import => self.parse_import_stmt(),
            Lexeme::From => self.parse_import_from_stmt(),
            tok if tok.is_unsupported_keyword() => Err(self.unsupported_here()),
            _ => self.parse_expr_stmt(),
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(
            self.peek(),
            Lexeme::Newline | Lexeme::Semicolon | Lexeme::Eof
        )
    }

    fn parse_name_list(&mut self) -> PResult<Vec<String>> {
        let mut names = vec![self.expect_ident()?];
        while self.eat(&Lexeme::Comma) {
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    fn parse_expr_stmt(&mut self) -> PResult<Stmt> {
        let start = self.current_span();
        let parenthesized = self.at(&Lexeme::LParen);
        let first = self.parse_star_expr_list()?;

        if self.eat(&Lexeme::Colon) {
            if !matches!(
                first,
                Expr::Name { .. } | Expr::Attribute { .. } | Expr::Subscript { .. }
            ) {
                return Err(self.target_error(
                    &format!(
                        "only single target (not {}) can be annotated",
                        first.kind_description()
                    ),
                    start,
                ));
            }
            let simple = !parenthesized && matches!(first, Expr::Name { .. });
            let target = self.store_target(first, start)?;
            let annotation = self.parse_test()?;
            let value = if self.eat(&Lexeme::Eq) {
                Some(self.parse_star_expr_list()?)
            } else {
                None
            };
            return Ok(Stmt::AnnAssign {
                target,
                annotation,
                value,
                simple,
            });
        }

        if let Some(op) = augmented_op(self.peek()) {
            if !matches!(
                first,
                Expr::Name { .. } | Expr::Attribute { .. } | Expr::Subscript { .. }
            ) {
                return Err(self.target_error(
                    &format!(
                        "'{}' is an illegal expression for augmented assignment",
                        first.kind_description()
                    ),
                    start,
                ));
            }
            self.advance();
            let target = self.store_target(first, start)?;
            let value = self.parse_star_expr_list()?;
            return Ok(Stmt::AugAssign { target, op, value });
        }

        if !self.at(&Lexeme::Eq) {
            return Ok(Stmt::Expr(first));
        }

        let mut exprs = vec![(first, start)];
        while self.eat(&Lexeme::Eq) {
            let span = self.current_span();
            exprs.push((self.parse_star_expr_list()?, span));
        }
        let (value, _) = exprs.pop().unwrap_or((Expr::constant(Constant::None), start));
        let targets = exprs
            .into_iter()
            .map(|(expr, span)| self.store_target(expr, span))
            .collect::<PResult<Vec<_>>>()?;
        Ok(Stmt::Assign { targets, value })
    }

    fn store_target(&self, expr: Expr, start: Span) -> PResult<Expr> {
        self.with_context(expr, ExprContext::Store, start)
    }

    /// Rewrite `expr` as an assignment or deletion target.
    fn with_context(&self, expr: Expr, ctx: ExprContext, start: Span) -> PResult<Expr> {
        Ok(match expr {
            Expr::Name { id, .. } => Expr::Name { id, ctx },
            Expr::Attribute { value, attr, .. } => Expr::Attribute { value, attr, ctx },
            Expr::Subscript { value, slice, .. } => Expr::Subscript { value, slice, ctx },
            Expr::Starred { value, .. } if ctx == ExprContext::Store => Expr::Starred {
                value: Box::new(self.with_context(*value, ctx, start)?),
                ctx,
            },
            Expr::Tuple { elts, .. } => Expr::Tuple {
                elts: self.elts_with_context(elts, ctx, start)?,
                ctx,
            },
            Expr::List { elts, .. } => Expr::List {
                elts: self.elts_with_context(elts, ctx, start)?,
                ctx,
            },
            other => {
                let verb = if ctx == ExprContext::Del {
                    "delete"
                } else {
                    "assign to"
                };
                return Err(self.target_error(
                    &format!("cannot {} {}", verb, other.kind_description()),
                    start,
                ));
            }
        })
    }

    fn elts_with_context(
        &self,
        elts: Vec<Expr>,
        ctx: ExprContext,
        start: Span,
    ) -> PResult<Vec<Expr>> {
        elts.into_iter()
            .map(|e| self.with_context(e, ctx, start))
            .collect()
    }

    fn target_error(&self, msg: &str, start: Span) -> Diagnostic {
        Diagnostic::error(msg.to_string(), start.merge(self.prev_span()))
    }

    fn parse_del_stmt(&mut self) -> PResult<Stmt> {
        self.advance();
        let start = self.current_span();
        let mut targets = Vec::new();
        loop {
            let target = self.parse_bitor()?;
            targets.push(self.with_context(target, ExprContext::Del, start)?);
            if !self.eat(&Lexeme::Comma) || self.at_line_end() {
                break;
            }
        }
        Ok(Stmt::Delete(targets))
    }

    fn parse_import_stmt(&mut self) -> PResult<Stmt> {
        self.advance();
        let mut names = Vec::new();
        loop {
            let name = self.parse_dotted_name()?;
            let asname = self.parse_as_name()?;
            names.push(Alias { name, asname });
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        Ok(Stmt::Import(names))
    }

    fn parse_import_from_stmt(&mut self) -> PResult<Stmt> {
        self.advance();
        let mut level = 0u32;
        loop {
            if self.eat(&Lexeme::Dot) {
                level += 1;
            } else if self.eat(&Lexeme::Ellipsis) {
                level += 3;
            } else {
                break;
            }
        }

        let module = if self.at(&Lexeme::Import) {
            None
        } else {
            Some(self.parse_dotted_name()?)
        };
        if module.is_none() && level == 0 {
            return Err(self.error_at_current("expected module name after 'from'"));
        }
        self.expect(&Lexeme::Import)?;

        let names = if self.at(&Lexeme::Star) {
            self.advance();
            vec![Alias {
                name: "*".to_string(),
                asname: None,
            }]
        } else if self.eat(&Lexeme::LParen) {
            let names = self.parse_import_names(true)?;
            self.expect(&Lexeme::RParen)?;
            names
        } else {
            self.parse_import_names(false)?
        };

        Ok(Stmt::ImportFrom {
            module,
            names,
            level,
        })
    }

    fn parse_import_names(&mut self, parenthesized: bool) -> PResult<Vec<Alias>> {
        let mut names = Vec::new();
        loop {
            let name = self.expect_ident()?;
            let asname = self.parse_as_name()?;
            names.push(Alias { name, asname });
            if !self.eat(&Lexeme::Comma) {
                break;
            }
            if parenthesized && self.at(&Lexeme::RParen) {
                break;
            }
            if !parenthesized && self.at_line_end() {
                return Err(self.error_with_help(
                    "trailing comma not allowed without surrounding parentheses",
                    "wrap the imported names in parentheses",
                ));
            }
        }
        Ok(names)
    }

    fn parse_as_name(&mut self) -> PResult<Option<String>> {
        if self.eat(&Lexeme::As) {
            Ok(Some(self.expect_ident()?))
        } else {
            Ok(None)
        }
    }

    fn parse_if_stmt(&mut self) -> PResult<Stmt> {
        // Current token is `if` or `elif`.
        self.advance();
        let test = self.parse_test()?;
        let body = self.parse_block()?;
        let orelse = if self.at(&Lexeme::Elif) {
            vec![self.nested(|p| p.parse_if_stmt())?]
        } else {
            self.parse_else_block()?
        };
        Ok(Stmt::If { test, body, orelse })
    }

    fn parse_else_block(&mut self) -> PResult<Vec<Stmt>> {
        if self.eat(&Lexeme::Else) {
            self.parse_block()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_while_stmt(&mut self) -> PResult<Stmt> {
        self.advance();
        let test = self.parse_test()?;
        let body = self.parse_block()?;
        let orelse = self.parse_else_block()?;
        Ok(Stmt::While { test, body, orelse })
    }

    fn parse_for_stmt(&mut self) -> PResult<Stmt> {
        self.advance();
        let start = self.current_span();
        let target = self.parse_target_list()?;
        let target = self.store_target(target, start)?;
        self.expect(&Lexeme::In)?;
        let iter = self.parse_star_expr_list()?;
        let body = self.parse_block()?;
        let orelse = self.parse_else_block()?;
        Ok(Stmt::For {
            target,
            iter,
            body,
            orelse,
        })
    }

    fn parse_decorated(&mut self) -> PResult<Stmt> {
        let mut decorators = Vec::new();
        while self.eat(&Lexeme::At) {
            decorators.push(self.parse_test()?);
            self.expect(&Lexeme::Newline)?;
        }
        match self.peek() {
            Lexeme::Def => self.parse_function_def(decorators),
            Lexeme::Class => self.parse_class_def(decorators),
            _ => Err(self.error_at_current(&format!(
                "expected 'def' or 'class' after decorator, found {}",
                self.peek().description()
            ))),
        }
    }

    fn parse_function_def(&mut self, decorator_list: Vec<Expr>) -> PResult<Stmt> {
        self.expect(&Lexeme::Def)?;
        let name = self.expect_ident()?;
        self.expect(&Lexeme::LParen)?;
        let args = self.parse_parameters(&Lexeme::RParen, true)?;
        self.expect(&Lexeme::RParen)?;
        let returns = if self.eat(&Lexeme::Arrow) {
            Some(self.parse_test()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(Stmt::FunctionDef(FunctionDef {
            name,
            args,
            body,
            decorator_list,
            returns,
        }))
    }

    fn parse_class_def(&mut self, decorator_list: Vec<Expr>) -> PResult<Stmt> {
        self.expect(&Lexeme::Class)?;
        let name = self.expect_ident()?;
        let (bases, keywords) = if self.eat(&Lexeme::LParen) {
            self.parse_call_args()?
        } else {
            (Vec::new(), Vec::new())
        };
        let body = self.parse_block()?;
        Ok(Stmt::ClassDef(ClassDef {
            name,
            bases,
            keywords,
            body,
            decorator_list,
        }))
    }
}

fn augmented_op(token: &Lexeme) -> Option<Operator> {
    let op = match token {
        Lexeme::PlusEq => Operator::Add,
        Lexeme::MinusEq => Operator::Sub,
        Lexeme::StarEq => Operator::Mult,
        Lexeme::AtEq => Operator::MatMult,
        Lexeme::SlashEq => Operator::Div,
        Lexeme::PercentEq => Operator::Mod,
        Lexeme::DoubleStarEq => Operator::Pow,
        Lexeme::LShiftEq => Operator::LShift,
        Lexeme::RShiftEq => Operator::RShift,
        Lexeme::PipeEq => Operator::BitOr,
        Lexeme::CaretEq => Operator::BitXor,
        Lexeme::AmpEq => Operator::BitAnd,
        Lexeme::DoubleSlashEq => Operator::FloorDiv,
        _ => return None,
    };
    Some(op)
}
