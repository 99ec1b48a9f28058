//! Textual dump of the syntax tree.
//!
//! The `dump` format reproduces CPython 3.9-3.11 `ast.dump(tree)` with the
//! default arguments: `Node(field=value, ...)` in CPython field order, no
//! position attributes, optional fields left out when absent, and list
//! fields always shown. The `json` format is the serde encoding of the tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ast::*;
use crate::printable::is_printable;
use crate::stack::with_deep_stack;

/// Serialized form written to output files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpFormat {
    #[default]
    #[serde(rename = "dump", alias = "text")]
    Text,
    Json,
}

impl FromStr for DumpFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "dump" => Ok(DumpFormat::Text),
            "json" => Ok(DumpFormat::Json),
            other => Err(format!(
                "unknown dump format '{}' (expected 'dump' or 'json')",
                other
            )),
        }
    }
}

impl fmt::Display for DumpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpFormat::Text => f.write_str("dump"),
            DumpFormat::Json => f.write_str("json"),
        }
    }
}

/// A tree with a deterministic one-line textual dump.
pub trait Dump {
    fn dump(&self) -> String;
}

impl Dump for Module {
    fn dump(&self) -> String {
        let mut dumper = Dumper::default();
        dumper.node(
            "Module",
            &[
                ("body", Field::Stmts(&self.body)),
                ("type_ignores", Field::Empty),
            ],
        );
        dumper.out
    }
}

/// Render `tree` in `format`, on a large stack when one can be had.
pub fn render<T>(tree: &T, format: DumpFormat) -> Result<String, serde_json::Error>
where
    T: Dump + Serialize + Sync,
{
    let encode = || match format {
        DumpFormat::Text => Ok(tree.dump()),
        DumpFormat::Json => serde_json::to_string(tree),
    };
    with_deep_stack(encode).unwrap_or_else(|e| {
        warn!("rendering on the current thread: {}", e);
        encode()
    })
}

enum Field<'a> {
    Expr(&'a Expr),
    OptExpr(Option<&'a Expr>),
    Exprs(&'a [Expr]),
    OptExprs(&'a [Option<Expr>]),
    Stmts(&'a [Stmt]),
    Str(&'a str),
    OptStr(Option<&'a str>),
    Strs(&'a [String]),
    Int(u64),
    Op(&'static str),
    Arguments(&'a Arguments),
    OptArg(Option<&'a Arg>),
    Args(&'a [Arg]),
    Keywords(&'a [Keyword]),
    Aliases(&'a [Alias]),
    Constant(&'a Constant),
    /// A list field that is always empty in this tree.
    Empty,
}

#[derive(Default)]
struct Dumper {
    out: String,
}

impl Dumper {
    fn node(&mut self, name: &str, fields: &[(&str, Field)]) {
        self.out.push_str(name);
        self.out.push('(');
        let mut first = true;
        for (field_name, field) in fields {
            if matches!(
                field,
                Field::OptExpr(None) | Field::OptStr(None) | Field::OptArg(None)
            ) {
                continue;
            }
            if !first {
                self.out.push_str(", ");
            }
            first = false;
            self.out.push_str(field_name);
            self.out.push('=');
            self.field(field);
        }
        self.out.push(')');
    }

    fn field(&mut self, field: &Field) {
        match field {
            Field::Expr(e) | Field::OptExpr(Some(e)) => self.expr(e),
            Field::Exprs(items) => self.list(items, |d, e| d.expr(e)),
            Field::OptExprs(items) => self.list(items, |d, e| match e {
                Some(e) => d.expr(e),
                None => d.out.push_str("None"),
            }),
            Field::Stmts(items) => self.list(items, |d, s| d.stmt(s)),
            Field::Str(s) | Field::OptStr(Some(s)) => self.out.push_str(&repr_str(s)),
            Field::Strs(items) => self.list(items, |d, s| d.out.push_str(&repr_str(s))),
            Field::Int(n) => self.out.push_str(&n.to_string()),
            Field::Op(name) => {
                self.out.push_str(name);
                self.out.push_str("()");
            }
            Field::Arguments(args) => self.arguments(args),
            Field::OptArg(Some(arg)) => self.arg(arg),
            Field::Args(items) => self.list(items, |d, a| d.arg(a)),
            Field::Keywords(items) => self.list(items, |d, k| d.keyword(k)),
            Field::Aliases(items) => self.list(items, |d, a| d.alias(a)),
            Field::Constant(c) => self.constant(c),
            Field::Empty => self.out.push_str("[]"),
            Field::OptExpr(None) | Field::OptStr(None) | Field::OptArg(None) => {}
        }
    }

    fn list<T>(&mut self, items: &[T], mut each: impl FnMut(&mut Self, &T)) {
        self.out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            each(self, item);
        }
        self.out.push(']');
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDef(f) => self.node(
                "FunctionDef",
                &[
                    ("name", Field::Str(&f.name)),
                    ("args", Field::Arguments(&f.args)),
                    ("body", Field::Stmts(&f.body)),
                    ("decorator_list", Field::Exprs(&f.decorator_list)),
                    ("returns", Field::OptExpr(f.returns.as_ref())),
                ],
            ),
            Stmt::ClassDef(c) => self.node(
                "ClassDef",
                &[
                    ("name", Field::Str(&c.name)),
                    ("bases", Field::Exprs(&c.bases)),
                    ("keywords", Field::Keywords(&c.keywords)),
                    ("body", Field::Stmts(&c.body)),
                    ("decorator_list", Field::Exprs(&c.decorator_list)),
                ],
            ),
            Stmt::Return(value) => self.node("Return", &[("value", Field::OptExpr(value.as_ref()))]),
            Stmt::Delete(targets) => self.node("Delete", &[("targets", Field::Exprs(targets))]),
            Stmt::Assign { targets, value } => self.node(
                "Assign",
                &[("targets", Field::Exprs(targets)), ("value", Field::Expr(value))],
            ),
            Stmt::AugAssign { target, op, value } => self.node(
                "AugAssign",
                &[
                    ("target", Field::Expr(target)),
                    ("op", Field::Op(op.node_name())),
                    ("value", Field::Expr(value)),
                ],
            ),
            Stmt::AnnAssign {
                target,
                annotation,
                value,
                simple,
            } => self.node(
                "AnnAssign",
                &[
                    ("target", Field::Expr(target)),
                    ("annotation", Field::Expr(annotation)),
                    ("value", Field::OptExpr(value.as_ref())),
                    ("simple", Field::Int(u64::from(*simple))),
                ],
            ),
            Stmt::For {
                target,
                iter,
                body,
                orelse,
            } => self.node(
                "For",
                &[
                    ("target", Field::Expr(target)),
                    ("iter", Field::Expr(iter)),
                    ("body", Field::Stmts(body)),
                    ("orelse", Field::Stmts(orelse)),
                ],
            ),
            Stmt::While { test, body, orelse } => self.node(
                "While",
                &[
                    ("test", Field::Expr(test)),
                    ("body", Field::Stmts(body)),
                    ("orelse", Field::Stmts(orelse)),
                ],
            ),
            Stmt::If { test, body, orelse } => self.node(
                "If",
                &[
                    ("test", Field::Expr(test)),
                    ("body", Field::Stmts(body)),
                    ("orelse", Field::Stmts(orelse)),
                ],
            ),
            Stmt::Raise { exc, cause } => self.node(
                "Raise",
                &[
                    ("exc", Field::OptExpr(exc.as_ref())),
                    ("cause", Field::OptExpr(cause.as_ref())),
                ],
            ),
            Stmt::Assert { test, msg } => self.node(
                "Assert",
                &[
                    ("test", Field::Expr(test)),
                    ("msg", Field::OptExpr(msg.as_ref())),
                ],
            ),
            Stmt::Import(names) => self.node("Import", &[("names", Field::Aliases(names))]),
            Stmt::ImportFrom {
                module,
                names,
                level,
            } => self.node(
                "ImportFrom",
                &[
                    ("module", Field::OptStr(module.as_deref())),
                    ("names", Field::Aliases(names)),
                    ("level", Field::Int(u64::from(*level))),
                ],
            ),
            Stmt::Global(names) => self.node("Global", &[("names", Field::Strs(names))]),
            Stmt::Nonlocal(names) => self.node("Nonlocal", &[("names", Field::Strs(names))]),
            Stmt::Expr(value) => self.node("Expr", &[("value", Field::Expr(value))]),
            Stmt::Pass => self.node("Pass", &[]),
            Stmt::Break => self.node("Break", &[]),
            Stmt::Continue => self.node("Continue", &[]),
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::BoolOp { op, values } => self.node(
                "BoolOp",
                &[("op", Field::Op(op.node_name())), ("values", Field::Exprs(values))],
            ),
            Expr::BinOp { left, op, right } => self.node(
                "BinOp",
                &[
                    ("left", Field::Expr(left)),
                    ("op", Field::Op(op.node_name())),
                    ("right", Field::Expr(right)),
                ],
            ),
            Expr::UnaryOp { op, operand } => self.node(
                "UnaryOp",
                &[("op", Field::Op(op.node_name())), ("operand", Field::Expr(operand))],
            ),
            Expr::Lambda { args, body } => self.node(
                "Lambda",
                &[("args", Field::Arguments(args)), ("body", Field::Expr(body))],
            ),
            Expr::IfExp { test, body, orelse } => self.node(
                "IfExp",
                &[
                    ("test", Field::Expr(test)),
                    ("body", Field::Expr(body)),
                    ("orelse", Field::Expr(orelse)),
                ],
            ),
            Expr::Dict { keys, values } => self.node(
                "Dict",
                &[("keys", Field::OptExprs(keys)), ("values", Field::Exprs(values))],
            ),
            Expr::Set(elts) => self.node("Set", &[("elts", Field::Exprs(elts))]),
            Expr::Compare {
                left,
                ops,
                comparators,
            } => {
                self.out.push_str("Compare(left=");
                self.expr(left);
                self.out.push_str(", ops=");
                self.list(ops, |d, op| {
                    d.out.push_str(op.node_name());
                    d.out.push_str("()");
                });
                self.out.push_str(", comparators=");
                self.list(comparators, |d, e| d.expr(e));
                self.out.push(')');
            }
            Expr::Call {
                func,
                args,
                keywords,
            } => self.node(
                "Call",
                &[
                    ("func", Field::Expr(func)),
                    ("args", Field::Exprs(args)),
                    ("keywords", Field::Keywords(keywords)),
                ],
            ),
            Expr::Constant { value, kind } => self.node(
                "Constant",
                &[
                    ("value", Field::Constant(value)),
                    ("kind", Field::OptStr(kind.as_deref())),
                ],
            ),
            Expr::Attribute { value, attr, ctx } => self.node(
                "Attribute",
                &[
                    ("value", Field::Expr(value)),
                    ("attr", Field::Str(attr)),
                    ("ctx", Field::Op(ctx.node_name())),
                ],
            ),
            Expr::Subscript { value, slice, ctx } => self.node(
                "Subscript",
                &[
                    ("value", Field::Expr(value)),
                    ("slice", Field::Expr(slice)),
                    ("ctx", Field::Op(ctx.node_name())),
                ],
            ),
            Expr::Starred { value, ctx } => self.node(
                "Starred",
                &[("value", Field::Expr(value)), ("ctx", Field::Op(ctx.node_name()))],
            ),
            Expr::Name { id, ctx } => self.node(
                "Name",
                &[("id", Field::Str(id)), ("ctx", Field::Op(ctx.node_name()))],
            ),
            Expr::List { elts, ctx } => self.node(
                "List",
                &[("elts", Field::Exprs(elts)), ("ctx", Field::Op(ctx.node_name()))],
            ),
            Expr::Tuple { elts, ctx } => self.node(
                "Tuple",
                &[("elts", Field::Exprs(elts)), ("ctx", Field::Op(ctx.node_name()))],
            ),
            Expr::Slice { lower, upper, step } => self.node(
                "Slice",
                &[
                    ("lower", Field::OptExpr(lower.as_deref())),
                    ("upper", Field::OptExpr(upper.as_deref())),
                    ("step", Field::OptExpr(step.as_deref())),
                ],
            ),
        }
    }

    fn arguments(&mut self, args: &Arguments) {
        self.node(
            "arguments",
            &[
                ("posonlyargs", Field::Args(&args.posonlyargs)),
                ("args", Field::Args(&args.args)),
                ("vararg", Field::OptArg(args.vararg.as_ref())),
                ("kwonlyargs", Field::Args(&args.kwonlyargs)),
                ("kw_defaults", Field::OptExprs(&args.kw_defaults)),
                ("kwarg", Field::OptArg(args.kwarg.as_ref())),
                ("defaults", Field::Exprs(&args.defaults)),
            ],
        );
    }

    fn arg(&mut self, arg: &Arg) {
        self.node(
            "arg",
            &[
                ("arg", Field::Str(&arg.arg)),
                ("annotation", Field::OptExpr(arg.annotation.as_ref())),
            ],
        );
    }

    fn keyword(&mut self, keyword: &Keyword) {
        self.node(
            "keyword",
            &[
                ("arg", Field::OptStr(keyword.arg.as_deref())),
                ("value", Field::Expr(&keyword.value)),
            ],
        );
    }

    fn alias(&mut self, alias: &Alias) {
        self.node(
            "alias",
            &[
                ("name", Field::Str(&alias.name)),
                ("asname", Field::OptStr(alias.asname.as_deref())),
            ],
        );
    }

    fn constant(&mut self, constant: &Constant) {
        let text = match constant {
            Constant::None => "None".to_string(),
            Constant::Bool(true) => "True".to_string(),
            Constant::Bool(false) => "False".to_string(),
            Constant::Int(n) => n.to_string(),
            Constant::BigInt(digits) => digits.clone(),
            Constant::Float(f) => repr_float(*f),
            Constant::Str(s) => repr_str(s),
            Constant::Bytes(b) => repr_bytes(b),
            Constant::Ellipsis => "Ellipsis".to_string(),
        };
        self.out.push_str(&text);
    }
}

/// Python `repr()` of a float: shortest round-trip digits, positional
/// notation for exponents in `-4..16`, otherwise `d.ddde+XX`.
pub fn repr_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:e}", value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };

    if !(-4..16).contains(&exponent) {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}{}e{}{:02}", sign, mantissa, exp_sign, exponent.abs());
    }

    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let body = if exponent < 0 {
        format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
    } else {
        let int_len = exponent as usize + 1;
        if digits.len() <= int_len {
            format!("{}{}.0", digits, "0".repeat(int_len - digits.len()))
        } else {
            format!("{}.{}", &digits[..int_len], &digits[int_len..])
        }
    };
    format!("{}{}", sign, body)
}

/// Python `repr()` of a `str`.
pub fn repr_str(value: &str) -> String {
    let quote = pick_quote(value.contains('\''), value.contains('"'));
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if !is_printable(c) => {
                let code = c as u32;
                if code < 0x100 {
                    out.push_str(&format!("\\x{:02x}", code));
                } else if code < 0x10000 {
                    out.push_str(&format!("\\u{:04x}", code));
                } else {
                    out.push_str(&format!("\\U{:08x}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Python `repr()` of a `bytes` value.
pub fn repr_bytes(value: &[u8]) -> String {
    let quote = pick_quote(value.contains(&b'\''), value.contains(&b'"'));
    let mut out = String::with_capacity(value.len() + 3);
    out.push('b');
    out.push(quote);
    for &b in value {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b as char == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push(quote);
    out
}

/// Single quotes unless the text has a `'` and no `"`.
fn pick_quote(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double {
        '"'
    } else {
        '\''
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_module;

    fn dump(source: &str) -> String {
        match parse_module(source) {
            Ok(parsed) => parsed.module.dump(),
            Err(diags) => panic!("parse errors: {:?}", diags),
        }
    }

    #[test]
    fn test_empty_module() {
        insta::assert_snapshot!(dump(""), @"Module(body=[], type_ignores=[])");
    }

    #[test]
    fn test_function_def_matches_cpython() {
        let source = "def add(x: int, y=2, *a, k, **kw) -> int:\n    return x + y\nx: int = 1\n";
        assert_eq!(
            dump(source),
            "Module(body=[FunctionDef(name='add', args=arguments(posonlyargs=[], \
             args=[arg(arg='x', annotation=Name(id='int', ctx=Load())), arg(arg='y')], \
             vararg=arg(arg='a'), kwonlyargs=[arg(arg='k')], kw_defaults=[None], \
             kwarg=arg(arg='kw'), defaults=[Constant(value=2)]), \
             body=[Return(value=BinOp(left=Name(id='x', ctx=Load()), op=Add(), \
             right=Name(id='y', ctx=Load())))], decorator_list=[], \
             returns=Name(id='int', ctx=Load())), AnnAssign(target=Name(id='x', ctx=Store()), \
             annotation=Name(id='int', ctx=Load()), value=Constant(value=1), simple=1)], \
             type_ignores=[])"
        );
    }

    #[test]
    fn test_constants_match_cpython() {
        assert_eq!(
            dump("None\n...\nTrue"),
            "Module(body=[Expr(value=Constant(value=None)), Expr(value=Constant(value=Ellipsis)), \
             Expr(value=Constant(value=True))], type_ignores=[])"
        );
    }

    #[test]
    fn test_imports_match_cpython() {
        let source = "from . import x\nfrom ..a.b import (c as d, e)\nimport os.path as p, sys\nfrom m import *";
        assert_eq!(
            dump(source),
            "Module(body=[ImportFrom(names=[alias(name='x')], level=1), ImportFrom(module='a.b', \
             names=[alias(name='c', asname='d'), alias(name='e')], level=2), \
             Import(names=[alias(name='os.path', asname='p'), alias(name='sys')]), \
             ImportFrom(module='m', names=[alias(name='*')], level=0)], type_ignores=[])"
        );
    }

    #[test]
    fn test_calls_and_displays_match_cpython() {
        let source = "f(*a, **k, x=1)\n{**d, 1: 2}\n{1, 2}\n()\n[]\n{}";
        assert_eq!(
            dump(source),
            "Module(body=[Expr(value=Call(func=Name(id='f', ctx=Load()), \
             args=[Starred(value=Name(id='a', ctx=Load()), ctx=Load())], \
             keywords=[keyword(value=Name(id='k', ctx=Load())), keyword(arg='x', value=Constant(value=1))])), \
             Expr(value=Dict(keys=[None, Constant(value=1)], values=[Name(id='d', ctx=Load()), Constant(value=2)])), \
             Expr(value=Set(elts=[Constant(value=1), Constant(value=2)])), \
             Expr(value=Tuple(elts=[], ctx=Load())), Expr(value=List(elts=[], ctx=Load())), \
             Expr(value=Dict(keys=[], values=[]))], type_ignores=[])"
        );
    }

    #[test]
    fn test_lambda_matches_cpython() {
        assert_eq!(
            dump("lambda x, *, y=1: x"),
            "Module(body=[Expr(value=Lambda(args=arguments(posonlyargs=[], args=[arg(arg='x')], \
             kwonlyargs=[arg(arg='y')], kw_defaults=[Constant(value=1)], defaults=[]), \
             body=Name(id='x', ctx=Load())))], type_ignores=[])"
        );
    }

    #[test]
    fn test_simple_statements_match_cpython() {
        let source = "del a, b[0]\nassert x, 'm'\nraise E from e\nraise\nglobal a, b\n";
        assert_eq!(
            dump(source),
            "Module(body=[Delete(targets=[Name(id='a', ctx=Del()), Subscript(value=Name(id='b', ctx=Load()), \
             slice=Constant(value=0), ctx=Del())]), Assert(test=Name(id='x', ctx=Load()), msg=Constant(value='m')), \
             Raise(exc=Name(id='E', ctx=Load()), cause=Name(id='e', ctx=Load())), Raise(), \
             Global(names=['a', 'b'])], type_ignores=[])"
        );
    }

    #[test]
    fn test_class_and_decorators_match_cpython() {
        let source = "class A(B, metaclass=M):\n    pass\n@dec\n@d.e(1)\ndef f(a, /, b):\n    return\n";
        assert_eq!(
            dump(source),
            "Module(body=[ClassDef(name='A', bases=[Name(id='B', ctx=Load())], \
             keywords=[keyword(arg='metaclass', value=Name(id='M', ctx=Load()))], body=[Pass()], \
             decorator_list=[]), FunctionDef(name='f', args=arguments(posonlyargs=[arg(arg='a')], \
             args=[arg(arg='b')], kwonlyargs=[], kw_defaults=[], defaults=[]), body=[Return()], \
             decorator_list=[Name(id='dec', ctx=Load()), Call(func=Attribute(value=Name(id='d', ctx=Load()), \
             attr='e', ctx=Load()), args=[Constant(value=1)], keywords=[])])], type_ignores=[])"
        );
    }

    #[test]
    fn test_assignments_match_cpython() {
        let source = "a < b <= c is not d not in e\nx = y = 1\nx += 1\n(a): int\na.b: int\n";
        assert_eq!(
            dump(source),
            "Module(body=[Expr(value=Compare(left=Name(id='a', ctx=Load()), ops=[Lt(), LtE(), IsNot(), NotIn()], \
             comparators=[Name(id='b', ctx=Load()), Name(id='c', ctx=Load()), Name(id='d', ctx=Load()), \
             Name(id='e', ctx=Load())])), Assign(targets=[Name(id='x', ctx=Store()), Name(id='y', ctx=Store())], \
             value=Constant(value=1)), AugAssign(target=Name(id='x', ctx=Store()), op=Add(), value=Constant(value=1)), \
             AnnAssign(target=Name(id='a', ctx=Store()), annotation=Name(id='int', ctx=Load()), simple=0), \
             AnnAssign(target=Attribute(value=Name(id='a', ctx=Load()), attr='b', ctx=Store()), \
             annotation=Name(id='int', ctx=Load()), simple=0)], type_ignores=[])"
        );
    }

    #[test]
    fn test_control_flow_matches_cpython() {
        let source = "for i, j in z:\n    break\nelse:\n    continue\nwhile x:\n    pass\nif a:\n    pass\nelif b:\n    pass\nelse:\n    pass\n";
        assert_eq!(
            dump(source),
            "Module(body=[For(target=Tuple(elts=[Name(id='i', ctx=Store()), Name(id='j', ctx=Store())], ctx=Store()), \
             iter=Name(id='z', ctx=Load()), body=[Break()], orelse=[Continue()]), \
             While(test=Name(id='x', ctx=Load()), body=[Pass()], orelse=[]), \
             If(test=Name(id='a', ctx=Load()), body=[Pass()], orelse=[If(test=Name(id='b', ctx=Load()), \
             body=[Pass()], orelse=[Pass()])])], type_ignores=[])"
        );
    }

    #[test]
    fn test_operators_match_cpython() {
        let source = "x[1:2, ::3]\n-x ** 2\nnot a or b and c\na if b else c\na @ b // c % d / e";
        assert_eq!(
            dump(source),
            "Module(body=[Expr(value=Subscript(value=Name(id='x', ctx=Load()), \
             slice=Tuple(elts=[Slice(lower=Constant(value=1), upper=Constant(value=2)), \
             Slice(step=Constant(value=3))], ctx=Load()), ctx=Load())), \
             Expr(value=UnaryOp(op=USub(), operand=BinOp(left=Name(id='x', ctx=Load()), op=Pow(), \
             right=Constant(value=2)))), Expr(value=BoolOp(op=Or(), values=[UnaryOp(op=Not(), \
             operand=Name(id='a', ctx=Load())), BoolOp(op=And(), values=[Name(id='b', ctx=Load()), \
             Name(id='c', ctx=Load())])])), Expr(value=IfExp(test=Name(id='b', ctx=Load()), \
             body=Name(id='a', ctx=Load()), orelse=Name(id='c', ctx=Load()))), \
             Expr(value=BinOp(left=BinOp(left=BinOp(left=BinOp(left=Name(id='a', ctx=Load()), op=MatMult(), \
             right=Name(id='b', ctx=Load())), op=FloorDiv(), right=Name(id='c', ctx=Load())), op=Mod(), \
             right=Name(id='d', ctx=Load())), op=Div(), right=Name(id='e', ctx=Load())))], type_ignores=[])"
        );
    }

    #[test]
    fn test_starred_targets_match_cpython() {
        assert_eq!(
            dump("a, = b\n[a, *b] = c"),
            "Module(body=[Assign(targets=[Tuple(elts=[Name(id='a', ctx=Store())], ctx=Store())], \
             value=Name(id='b', ctx=Load())), Assign(targets=[List(elts=[Name(id='a', ctx=Store()), \
             Starred(value=Name(id='b', ctx=Store()), ctx=Store())], ctx=Store())], \
             value=Name(id='c', ctx=Load()))], type_ignores=[])"
        );
    }

    #[test]
    fn test_repr_float() {
        assert_eq!(repr_float(1e16), "1e+16");
        assert_eq!(repr_float(1e15), "1000000000000000.0");
        assert_eq!(repr_float(1e-4), "0.0001");
        assert_eq!(repr_float(1e-5), "1e-05");
        assert_eq!(repr_float(0.1), "0.1");
        assert_eq!(repr_float(1.5e300), "1.5e+300");
        assert_eq!(repr_float(123456789012345678.0), "1.2345678901234568e+17");
        assert_eq!(repr_float(3.5e20), "3.5e+20");
        assert_eq!(repr_float(0.0), "0.0");
        assert_eq!(repr_float(2.5), "2.5");
        assert_eq!(repr_float(f64::INFINITY), "inf");
    }

    #[test]
    fn test_repr_str() {
        assert_eq!(repr_str("a\"b"), "'a\"b'");
        assert_eq!(repr_str("a'b"), "\"a'b\"");
        assert_eq!(repr_str("a'\"b"), "'a\\'\"b'");
        assert_eq!(repr_str("\u{0}\u{7f}\u{e9}\t\n\\"), "'\\x00\\x7f\u{e9}\\t\\n\\\\'");
        assert_eq!(repr_str("\u{2028}\u{1f600}"), "'\\u2028\u{1f600}'");
        assert_eq!(
            repr_str("\u{378}\u{1faff}\u{ad}"),
            "'\\u0378\\U0001faff\\xad'"
        );
    }

    #[test]
    fn test_repr_bytes() {
        assert_eq!(repr_bytes(b"\x00a'\xff"), "b\"\\x00a'\\xff\"");
        assert_eq!(repr_bytes(b"plain"), "b'plain'");
    }

    #[test]
    fn test_string_constants_match_cpython() {
        let source = "'a\"b', \"a'b\", 'a\\'\"b', '\\x00\\x7f\\u00e9\\t\\n\\\\', b'\\x00a\\'\\xff'";
        assert_eq!(
            dump(source),
            "Module(body=[Expr(value=Tuple(elts=[Constant(value='a\"b'), Constant(value=\"a'b\"), \
             Constant(value='a\\'\"b'), Constant(value='\\x00\\x7f\u{e9}\\t\\n\\\\'), \
             Constant(value=b\"\\x00a'\\xff\")], ctx=Load()))], type_ignores=[])"
        );
    }

    #[test]
    fn test_u_prefix_kind_matches_cpython() {
        assert_eq!(
            dump("u'x'\nu'a' 'b'\n'a' u'b'\nU'x'\n"),
            "Module(body=[Expr(value=Constant(value='x', kind='u')), \
             Expr(value=Constant(value='ab', kind='u')), Expr(value=Constant(value='ab')), \
             Expr(value=Constant(value='x'))], type_ignores=[])"
        );
    }

    #[test]
    fn test_wide_integers_match_cpython() {
        assert_eq!(
            dump("x = 18446744073709551616\n0x10000000000000000\n"),
            "Module(body=[Assign(targets=[Name(id='x', ctx=Store())], \
             value=Constant(value=18446744073709551616)), \
             Expr(value=Constant(value=18446744073709551616))], type_ignores=[])"
        );
    }

    #[test]
    fn test_json_format() {
        let parsed = parse_module("x = 1\n").unwrap();
        let json = render(&parsed.module, DumpFormat::Json).unwrap();
        assert!(json.starts_with("{\"body\":[{\"Assign\":"), "{}", json);
        assert!(json.contains("\"Int\":1"), "{}", json);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("text".parse::<DumpFormat>(), Ok(DumpFormat::Text));
        assert_eq!("dump".parse::<DumpFormat>(), Ok(DumpFormat::Text));
        assert_eq!("json".parse::<DumpFormat>(), Ok(DumpFormat::Json));
        assert!("yaml".parse::<DumpFormat>().is_err());
    }
}
