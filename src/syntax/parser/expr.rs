use crate::ast::*;
use crate::syntax::lexeme::Lexeme;

use super::{PResult, Parser};

impl Parser {
    /// `test (',' test)* [',']` where each item may be `*expr`; a comma
    /// makes a tuple.
    pub(super) fn parse_star_expr_list(&mut self) -> PResult<Expr> {
        let first = self.parse_test_or_star()?;
        if !self.at(&Lexeme::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat(&Lexeme::Comma) {
            if !self.starts_expr() {
                break;
            }
            elts.push(self.parse_test_or_star()?);
        }
        Ok(Expr::Tuple {
            elts,
            ctx: ExprContext::Load,
        })
    }

    /// Targets of a `for` loop: `expr (',' expr)* [',']`, stopping at `in`.
    pub(super) fn parse_target_list(&mut self) -> PResult<Expr> {
        let first = self.parse_target_item()?;
        if !self.at(&Lexeme::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat(&Lexeme::Comma) {
            if !self.starts_expr() {
                break;
            }
            elts.push(self.parse_target_item()?);
        }
        Ok(Expr::Tuple {
            elts,
            ctx: ExprContext::Load,
        })
    }

    fn parse_target_item(&mut self) -> PResult<Expr> {
        if self.eat(&Lexeme::Star) {
            let value = self.parse_bitor()?;
            return Ok(Expr::Starred {
                value: Box::new(value),
                ctx: ExprContext::Load,
            });
        }
        self.parse_bitor()
    }

    fn parse_test_or_star(&mut self) -> PResult<Expr> {
        if self.eat(&Lexeme::Star) {
            let value = self.parse_bitor()?;
            return Ok(Expr::Starred {
                value: Box::new(value),
                ctx: ExprContext::Load,
            });
        }
        self.parse_test()
    }

    /// Whether the current token can begin an expression.
    pub(super) fn starts_expr(&self) -> bool {
        matches!(
            self.peek(),
            Lexeme::Ident(_)
                | Lexeme::Integer(_)
                | Lexeme::BigInteger(_)
                | Lexeme::Float(_)
                | Lexeme::Str { .. }
                | Lexeme::Bytes(_)
                | Lexeme::True
                | Lexeme::False
                | Lexeme::None
                | Lexeme::Ellipsis
                | Lexeme::LParen
                | Lexeme::LBracket
                | Lexeme::LBrace
                | Lexeme::Minus
                | Lexeme::Plus
                | Lexeme::Tilde
                | Lexeme::Not
                | Lexeme::Lambda
                | Lexeme::Star
        )
    }

    /// Full expression: conditional, lambda, or boolean expression.
    pub(super) fn parse_test(&mut self) -> PResult<Expr> {
        if self.at(&Lexeme::Lambda) {
            return self.parse_lambda();
        }
        let body = self.parse_or()?;
        if !self.eat(&Lexeme::If) {
            return Ok(body);
        }
        let test = self.parse_or()?;
        self.expect(&Lexeme::Else)?;
        let orelse = self.nested(|p| p.parse_test())?;
        Ok(Expr::IfExp {
            test: Box::new(test),
            body: Box::new(body),
            orelse: Box::new(orelse),
        })
    }

    /// Defaults and body both sit one level below the lambda.
    fn parse_lambda(&mut self) -> PResult<Expr> {
        self.expect(&Lexeme::Lambda)?;
        self.nested(|p| {
            let args = p.parse_parameters(&Lexeme::Colon, false)?;
            p.expect(&Lexeme::Colon)?;
            let body = p.parse_test()?;
            Ok(Expr::Lambda {
                args: Box::new(args),
                body: Box::new(body),
            })
        })
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let first = self.parse_and()?;
        if !self.at(&Lexeme::Or) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&Lexeme::Or) {
            values.push(self.parse_and()?);
        }
        Ok(Expr::BoolOp {
            op: BoolOp::Or,
            values,
        })
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let first = self.parse_not()?;
        if !self.at(&Lexeme::And) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&Lexeme::And) {
            values.push(self.parse_not()?);
        }
        Ok(Expr::BoolOp {
            op: BoolOp::And,
            values,
        })
    }

    fn parse_not(&mut self) -> PResult<Expr> {
        if self.eat(&Lexeme::Not) {
            let operand = self.nested(|p| p.parse_not())?;
            return Ok(Expr::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> PResult<Expr> {
        let left = self.parse_bitor()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        while let Some(op) = self.eat_comparison_op() {
            ops.push(op);
            comparators.push(self.parse_bitor()?);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(Expr::Compare {
            left: Box::new(left),
            ops,
            comparators,
        })
    }

    fn eat_comparison_op(&mut self) -> Option<CmpOp> {
        let op = match self.peek() {
            Lexeme::EqEq => CmpOp::Eq,
            Lexeme::NotEq => CmpOp::NotEq,
            Lexeme::Lt => CmpOp::Lt,
            Lexeme::LtEq => CmpOp::LtE,
            Lexeme::Gt => CmpOp::Gt,
            Lexeme::GtEq => CmpOp::GtE,
            Lexeme::In => CmpOp::In,
            Lexeme::Not if matches!(self.peek_at(1), Lexeme::In) => {
                self.advance();
                CmpOp::NotIn
            }
            Lexeme::Is => {
                if matches!(self.peek_at(1), Lexeme::Not) {
                    self.advance();
                    CmpOp::IsNot
                } else {
                    CmpOp::Is
                }
            }
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    /// Binary operators from `|` down to `* / // % @`.
    pub(super) fn parse_bitor(&mut self) -> PResult<Expr> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, level: usize) -> PResult<Expr> {
        if level == BINARY_LEVELS.len() {
            return self.parse_factor();
        }
        let (mut left, mut height) = self.measured(|p| p.parse_binary(level + 1))?;
        while let Some(op) = binary_op(self.peek(), BINARY_LEVELS[level]) {
            self.advance();
            let (right, right_height) = self.measured(|p| p.parse_binary(level + 1))?;
            height = height.max(right_height) + 1;
            self.reach(height)?;
            left = Expr::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> PResult<Expr> {
        let op = match self.peek() {
            Lexeme::Plus => UnaryOp::UAdd,
            Lexeme::Minus => UnaryOp::USub,
            Lexeme::Tilde => UnaryOp::Invert,
            _ => return self.parse_power(),
        };
        self.advance();
        let operand = self.nested(|p| p.parse_factor())?;
        Ok(Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_power(&mut self) -> PResult<Expr> {
        let base = self.parse_primary()?;
        if !self.eat(&Lexeme::DoubleStar) {
            return Ok(base);
        }
        let exponent = self.nested(|p| p.parse_factor())?;
        Ok(Expr::BinOp {
            left: Box::new(base),
            op: Operator::Pow,
            right: Box::new(exponent),
        })
    }

    /// An atom followed by calls, subscripts, and attribute accesses.
    fn parse_primary(&mut self) -> PResult<Expr> {
        let (mut expr, mut height) = self.measured(|p| p.parse_atom())?;
        loop {
            if self.eat(&Lexeme::LParen) {
                let ((args, keywords), args_height) = self.measured(|p| p.parse_call_args())?;
                height = height.max(args_height);
                expr = Expr::Call {
                    func: Box::new(expr),
                    args,
                    keywords,
                };
            } else if self.eat(&Lexeme::LBracket) {
                let (slice, slice_height) = self.measured(|p| p.parse_subscript())?;
                height = height.max(slice_height);
                self.expect(&Lexeme::RBracket)?;
                expr = Expr::Subscript {
                    value: Box::new(expr),
                    slice: Box::new(slice),
                    ctx: ExprContext::Load,
                };
            } else if self.eat(&Lexeme::Dot) {
                let attr = self.expect_ident()?;
                expr = Expr::Attribute {
                    value: Box::new(expr),
                    attr,
                    ctx: ExprContext::Load,
                };
            } else {
                return Ok(expr);
            }
            height += 1;
            self.reach(height)?;
        }
    }

    /// Arguments after an opening `(`, through the closing `)`.
    pub(super) fn parse_call_args(&mut self) -> PResult<(Vec<Expr>, Vec<Keyword>)> {
        let mut args = Vec::new();
        let mut keywords: Vec<Keyword> = Vec::new();

        while !self.at(&Lexeme::RParen) {
            if self.eat(&Lexeme::Star) {
                let value = self.parse_test()?;
                args.push(Expr::Starred {
                    value: Box::new(value),
                    ctx: ExprContext::Load,
                });
            } else if self.eat(&Lexeme::DoubleStar) {
                let value = self.parse_test()?;
                keywords.push(Keyword { arg: None, value });
            } else if matches!(self.peek(), Lexeme::Ident(_)) && self.peek_at(1) == &Lexeme::Eq
            {
                let arg = self.expect_ident()?;
                self.advance();
                let value = self.parse_test()?;
                keywords.push(Keyword {
                    arg: Some(arg),
                    value,
                });
            } else {
                if !keywords.is_empty() {
                    let msg = if keywords.iter().any(|k| k.arg.is_none()) {
                        "positional argument follows keyword argument unpacking"
                    } else {
                        "positional argument follows keyword argument"
                    };
                    return Err(self.error_at_current(msg));
                }
                args.push(self.parse_test()?);
                self.reject_comprehension()?;
            }

            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        self.expect(&Lexeme::RParen)?;
        Ok((args, keywords))
    }

    /// The contents of `[...]` after a primary.
    fn parse_subscript(&mut self) -> PResult<Expr> {
        let first = self.parse_slice_item()?;
        if !self.at(&Lexeme::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat(&Lexeme::Comma) {
            if self.at(&Lexeme::RBracket) {
                break;
            }
            elts.push(self.parse_slice_item()?);
        }
        Ok(Expr::Tuple {
            elts,
            ctx: ExprContext::Load,
        })
    }

    fn parse_slice_item(&mut self) -> PResult<Expr> {
        let lower = if self.at(&Lexeme::Colon) {
            None
        } else {
            let item = self.parse_test()?;
            if !self.at(&Lexeme::Colon) {
                return Ok(item);
            }
            Some(Box::new(item))
        };
        self.expect(&Lexeme::Colon)?;
        let upper = if self.at_slice_end() {
            None
        } else {
            Some(Box::new(self.parse_test()?))
        };
        let step = if self.eat(&Lexeme::Colon) {
            if self.at_slice_end() {
                None
            } else {
                Some(Box::new(self.parse_test()?))
            }
        } else {
            None
        };
        Ok(Expr::Slice { lower, upper, step })
    }

    fn at_slice_end(&self) -> bool {
        matches!(
            self.peek(),
            Lexeme::Colon | Lexeme::Comma | Lexeme::RBracket
        )
    }

    fn parse_atom(&mut self) -> PResult<Expr> {
        let constant = match self.peek() {
            Lexeme::Ident(name) => {
                let expr = Expr::name(name.clone());
                self.advance();
                return Ok(expr);
            }
            Lexeme::Integer(n) => Constant::Int(*n),
            Lexeme::BigInteger(digits) => Constant::BigInt(digits.clone()),
            Lexeme::Float(f) => Constant::Float(*f),
            Lexeme::Str { value, unicode } => {
                let expr = Expr::Constant {
                    value: Constant::Str(value.clone()),
                    kind: unicode.then(|| "u".to_string()),
                };
                self.advance();
                return Ok(expr);
            }
            Lexeme::Bytes(b) => Constant::Bytes(b.clone()),
            Lexeme::True => Constant::Bool(true),
            Lexeme::False => Constant::Bool(false),
            Lexeme::None => Constant::None,
            Lexeme::Ellipsis => Constant::Ellipsis,
            Lexeme::LParen => return self.nested(|p| p.parse_paren()),
            Lexeme::LBracket => return self.nested(|p| p.parse_list()),
            Lexeme::LBrace => return self.nested(|p| p.parse_brace()),
            tok if tok.is_unsupported_keyword() => return Err(self.unsupported_here()),
            tok => {
                return Err(self.error_at_current(&format!(
                    "expected expression, found {}",
                    tok.description()
                )))
            }
        };
        self.advance();
        Ok(Expr::constant(constant))
    }

    /// `()` is an empty tuple, `(x)` is `x`, `(x,)` is a tuple.
    fn parse_paren(&mut self) -> PResult<Expr> {
        self.expect(&Lexeme::LParen)?;
        if self.eat(&Lexeme::RParen) {
            return Ok(Expr::Tuple {
                elts: Vec::new(),
                ctx: ExprContext::Load,
            });
        }
        let first = self.parse_test_or_star()?;
        self.reject_comprehension()?;
        if self.eat(&Lexeme::RParen) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat(&Lexeme::Comma) {
            if self.at(&Lexeme::RParen) {
                break;
            }
            elts.push(self.parse_test_or_star()?);
        }
        self.expect(&Lexeme::RParen)?;
        Ok(Expr::Tuple {
            elts,
            ctx: ExprContext::Load,
        })
    }

    fn parse_list(&mut self) -> PResult<Expr> {
        self.expect(&Lexeme::LBracket)?;
        let mut elts = Vec::new();
        while !self.at(&Lexeme::RBracket) {
            elts.push(self.parse_test_or_star()?);
            self.reject_comprehension()?;
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        self.expect(&Lexeme::RBracket)?;
        Ok(Expr::List {
            elts,
            ctx: ExprContext::Load,
        })
    }

    /// Dict or set display.
    fn parse_brace(&mut self) -> PResult<Expr> {
        self.expect(&Lexeme::LBrace)?;
        if self.eat(&Lexeme::RBrace) {
            return Ok(Expr::Dict {
                keys: Vec::new(),
                values: Vec::new(),
            });
        }

        let first_is_unpack = self.at(&Lexeme::DoubleStar);
        let first = if first_is_unpack {
            None
        } else {
            Some(self.parse_test_or_star()?)
        };

        if first_is_unpack || self.at(&Lexeme::Colon) {
            let mut keys = Vec::new();
            let mut values = Vec::new();
            let mut pending = first;
            loop {
                match pending.take() {
                    Some(key) => {
                        self.expect(&Lexeme::Colon)?;
                        keys.push(Some(key));
                        values.push(self.parse_test()?);
                    }
                    None => {
                        self.expect(&Lexeme::DoubleStar)?;
                        keys.push(None);
                        values.push(self.parse_bitor()?);
                    }
                }
                self.reject_comprehension()?;
                if !self.eat(&Lexeme::Comma) || self.at(&Lexeme::RBrace) {
                    break;
                }
                if !self.at(&Lexeme::DoubleStar) {
                    pending = Some(self.parse_test()?);
                }
            }
            self.expect(&Lexeme::RBrace)?;
            return Ok(Expr::Dict { keys, values });
        }

        let mut elts = vec![first.unwrap_or(Expr::constant(Constant::None))];
        self.reject_comprehension()?;
        while self.eat(&Lexeme::Comma) {
            if self.at(&Lexeme::RBrace) {
                break;
            }
            elts.push(self.parse_test_or_star()?);
        }
        self.expect(&Lexeme::RBrace)?;
        Ok(Expr::Set(elts))
    }

    fn reject_comprehension(&self) -> PResult<()> {
        if self.at(&Lexeme::For) || self.at(&Lexeme::Async) {
            return Err(self.error_with_help(
                "comprehensions and generator expressions are not supported",
                "write the loop out as a for statement",
            ));
        }
        Ok(())
    }
}

/// Binary operator groups from loosest to tightest binding.
const BINARY_LEVELS: [BinaryLevel; 6] = [
    BinaryLevel::BitOr,
    BinaryLevel::BitXor,
    BinaryLevel::BitAnd,
    BinaryLevel::Shift,
    BinaryLevel::Arith,
    BinaryLevel::Term,
];

#[derive(Clone, Copy)]
enum BinaryLevel {
    BitOr,
    BitXor,
    BitAnd,
    Shift,
    Arith,
    Term,
}

fn binary_op(token: &Lexeme, level: BinaryLevel) -> Option<Operator> {
    let op = match (level, token) {
        (BinaryLevel::BitOr, Lexeme::Pipe) => Operator::BitOr,
        (BinaryLevel::BitXor, Lexeme::Caret) => Operator::BitXor,
        (BinaryLevel::BitAnd, Lexeme::Amp) => Operator::BitAnd,
        (BinaryLevel::Shift, Lexeme::LShift) => Operator::LShift,
        (BinaryLevel::Shift, Lexeme::RShift) => Operator::RShift,
        (BinaryLevel::Arith, Lexeme::Plus) => Operator::Add,
        (BinaryLevel::Arith, Lexeme::Minus) => Operator::Sub,
        (BinaryLevel::Term, Lexeme::Star) => Operator::Mult,
        (BinaryLevel::Term, Lexeme::Slash) => Operator::Div,
        (BinaryLevel::Term, Lexeme::DoubleSlash) => Operator::FloorDiv,
        (BinaryLevel::Term, Lexeme::Percent) => Operator::Mod,
        (BinaryLevel::Term, Lexeme::At) => Operator::MatMult,
        _ => return None,
    };
    Some(op)
}
