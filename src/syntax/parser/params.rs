use crate::ast::*;
use crate::syntax::lexeme::Lexeme;

use super::{PResult, Parser};

impl Parser {
    /// Parameter list up to (not including) `end`: `)` for `def`, `:` for
    /// `lambda`. Annotations are only accepted in `def`.
    pub(super) fn parse_parameters(&mut self, end: &Lexeme, annotated: bool) -> PResult<Arguments> {
        let mut arguments = Arguments::default();
        let mut seen_slash = false;
        let mut seen_star = false;
        let mut bare_star_pending = false;

        while !self.at(end) {
            if arguments.kwarg.is_some() {
                return Err(self.error_at_current("arguments cannot follow var-keyword argument"));
            }

            if self.eat(&Lexeme::Slash) {
                if seen_slash {
                    return Err(self.error_at_current("/ may appear only once"));
                }
                if seen_star {
                    return Err(self.error_at_current("/ must be ahead of *"));
                }
                if arguments.args.is_empty() {
                    return Err(self.error_at_current("at least one argument must precede /"));
                }
                seen_slash = true;
                arguments.posonlyargs = std::mem::take(&mut arguments.args);
            } else if self.eat(&Lexeme::Star) {
                if seen_star {
                    return Err(self.error_at_current("* argument may appear only once"));
                }
                seen_star = true;
                if matches!(self.peek(), Lexeme::Ident(_)) {
                    arguments.vararg = Some(self.parse_param(annotated)?);
                } else {
                    bare_star_pending = true;
                }
            } else if self.eat(&Lexeme::DoubleStar) {
                if bare_star_pending {
                    return Err(self.error_at_current("named arguments must follow bare *"));
                }
                arguments.kwarg = Some(self.parse_param(annotated)?);
            } else {
                let param = self.parse_param(annotated)?;
                let default = if self.eat(&Lexeme::Eq) {
                    Some(self.parse_test()?)
                } else {
                    None
                };
                if seen_star {
                    bare_star_pending = false;
                    arguments.kwonlyargs.push(param);
                    arguments.kw_defaults.push(default);
                } else {
                    match default {
                        Some(value) => arguments.defaults.push(value),
                        None if !arguments.defaults.is_empty() => {
                            return Err(self.error_at_current(
                                "non-default argument follows default argument",
                            ));
                        }
                        None => {}
                    }
                    arguments.args.push(param);
                }
            }

            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }

        if bare_star_pending {
            return Err(self.error_at_current("named arguments must follow bare *"));
        }
        Ok(arguments)
    }

    fn parse_param(&mut self, annotated: bool) -> PResult<Arg> {
        let arg = self.expect_ident()?;
        let annotation = if annotated && self.eat(&Lexeme::Colon) {
            Some(self.parse_test()?)
        } else {
            None
        };
        Ok(Arg { arg, annotation })
    }
}
