#[cfg(test)]
mod tests;

use crate::diagnostic::Diagnostic;
use crate::span::{Span, Spanned};

use super::lexeme::Lexeme;

const TAB_SIZE: usize = 8;

/// Open brackets allowed at once; the next opener is an error.
pub const MAX_BRACKET_DEPTH: u32 = 200;

/// Indented blocks allowed at once; the next indent is an error.
pub const MAX_INDENT_LEVELS: usize = 99;

/// Indentation-aware tokenizer.
///
/// Produces `Newline` at the end of every logical line that carried tokens,
/// `Indent`/`Dedent` when leading whitespace changes, and a final `Eof`.
/// Newlines inside brackets and after a trailing backslash are joined.
pub struct Lexer<'src> {
    source: &'src str,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    tokens: Vec<Spanned<Lexeme>>,
    indents: Vec<usize>,
    bracket_depth: u32,
    at_line_start: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            diagnostics: Vec::new(),
            tokens: Vec::new(),
            indents: vec![0],
            bracket_depth: 0,
            at_line_start: true,
        }
    }

    pub fn tokenize(mut self) -> (Vec<Spanned<Lexeme>>, Vec<Diagnostic>) {
        loop {
            if self.at_line_start && self.bracket_depth == 0 {
                self.at_line_start = false;
                if !self.scan_indentation() {
                    continue;
                }
            }

            self.skip_inline_whitespace();

            let Some(ch) = self.peek_char() else {
                self.finish();
                break;
            };

            match ch {
                '#' => self.skip_comment(),
                '\\' => self.scan_continuation(),
                '\n' | '\r' => {
                    let start = self.pos;
                    self.eat_newline();
                    if self.bracket_depth == 0 {
                        if self.line_has_tokens() {
                            self.push(Lexeme::Newline, start, start + 1);
                        }
                        self.at_line_start = true;
                    }
                }
                c if c == '_' || c.is_alphabetic() => self.scan_ident_or_keyword(),
                c if c.is_ascii_digit() => self.scan_number(),
                '.' if self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit()) => {
                    self.scan_number()
                }
                '\'' | '"' => self.scan_string(self.pos, StrPrefix::default()),
                _ => self.scan_symbol(),
            }
        }
        (self.tokens, self.diagnostics)
    }

    /// Measure leading whitespace of a new physical line and emit
    /// `Indent`/`Dedent` tokens. Returns false when the line is blank or a
    /// comment, in which case it has been consumed entirely.
    fn scan_indentation(&mut self) -> bool {
        let start = self.pos;
        let mut column = 0usize;
        while let Some(b) = self.peek_byte() {
            match b {
                b' ' => column += 1,
                b'\t' => column = (column / TAB_SIZE + 1) * TAB_SIZE,
                b'\x0c' => column = 0,
                _ => break,
            }
            self.pos += 1;
        }

        match self.peek_byte() {
            None => return true,
            Some(b'#') => {
                self.skip_comment();
                self.eat_newline();
                self.at_line_start = true;
                return false;
            }
            Some(b'\n') | Some(b'\r') => {
                self.eat_newline();
                self.at_line_start = true;
                return false;
            }
            Some(_) => {}
        }

        let current = self.indents.last().copied().unwrap_or(0);
        if column > current {
            if self.indents.len() > MAX_INDENT_LEVELS {
                self.error_with_help(
                    "too many levels of indentation",
                    "move the innermost blocks into a separate function",
                    start,
                    self.pos,
                );
            }
            self.indents.push(column);
            self.push(Lexeme::Indent, start, self.pos);
        } else if column < current {
            while self.indents.last().is_some_and(|&level| level > column) {
                self.indents.pop();
                self.push(Lexeme::Dedent, self.pos, self.pos);
            }
            if self.indents.last().copied().unwrap_or(0) != column {
                self.error(
                    "unindent does not match any outer indentation level",
                    start,
                    self.pos,
                );
                self.indents.push(column);
            }
        }
        true
    }

    fn finish(&mut self) {
        let end = self.source.len();
        if self.line_has_tokens() {
            self.push(Lexeme::Newline, end, end);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(Lexeme::Dedent, end, end);
        }
        self.push(Lexeme::Eof, end, end);
    }

    /// Whether the logical line currently being read produced any token.
    fn line_has_tokens(&self) -> bool {
        !matches!(
            self.tokens.last().map(|t| &t.node),
            None | Some(Lexeme::Newline) | Some(Lexeme::Indent) | Some(Lexeme::Dedent)
        )
    }

    fn skip_inline_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\x0c') = self.peek_byte() {
            self.pos += 1;
        }
    }

    fn skip_comment(&mut self) {
        while let Some(b) = self.peek_byte() {
            if b == b'\n' || b == b'\r' {
                break;
            }
            self.pos += 1;
        }
    }

    fn eat_newline(&mut self) {
        match self.peek_byte() {
            Some(b'\r') => {
                self.pos += 1;
                if self.peek_byte() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            Some(b'\n') => self.pos += 1,
            _ => {}
        }
    }

    fn scan_continuation(&mut self) {
        let start = self.pos;
        self.pos += 1;
        match self.peek_byte() {
            Some(b'\n') | Some(b'\r') => self.eat_newline(),
            None => self.error("unexpected end of file after line continuation", start, self.pos),
            Some(_) => {
                self.error(
                    "unexpected character after line continuation character",
                    start,
                    self.pos,
                );
            }
        }
    }

    fn scan_ident_or_keyword(&mut self) {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_alphanumeric() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];

        if let Some(b'\'' | b'"') = self.peek_byte() {
            if let Some(prefix) = StrPrefix::parse(text) {
                if prefix.formatted {
                    self.error_with_help(
                        "f-strings are not supported",
                        "build the string with concatenation or str.format()",
                        start,
                        self.pos,
                    );
                }
                self.scan_string(start, prefix);
                return;
            }
        }

        let token = Lexeme::from_keyword(text).unwrap_or_else(|| Lexeme::Ident(text.to_string()));
        self.push(token, start, self.pos);
    }

    fn scan_number(&mut self) {
        let start = self.pos;

        if self.peek_byte() == Some(b'0') {
            let radix = match self.peek_byte_at(1) {
                Some(b'x' | b'X') => Some(16),
                Some(b'o' | b'O') => Some(8),
                Some(b'b' | b'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                let digits_start = self.pos;
                self.eat_digits(|b| (b as char).is_digit(radix));
                let digits: String = self.source[digits_start..self.pos]
                    .chars()
                    .filter(|&c| c != '_')
                    .collect();
                self.reject_trailing_ident(start);
                let token = if digits.is_empty() {
                    self.error("invalid number literal", start, self.pos);
                    Lexeme::Integer(0)
                } else {
                    integer_lexeme(&digits, radix)
                };
                self.push(token, start, self.pos);
                return;
            }
        }

        self.eat_digits(|b| b.is_ascii_digit());
        let mut is_float = false;

        if self.peek_byte() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            self.eat_digits(|b| b.is_ascii_digit());
        }

        if let Some(b'e' | b'E') = self.peek_byte() {
            let has_digits = match self.peek_byte_at(1) {
                Some(b'+' | b'-') => self.peek_byte_at(2).is_some_and(|b| b.is_ascii_digit()),
                Some(b) => b.is_ascii_digit(),
                None => false,
            };
            if has_digits {
                is_float = true;
                self.pos += 1;
                if let Some(b'+' | b'-') = self.peek_byte() {
                    self.pos += 1;
                }
                self.eat_digits(|b| b.is_ascii_digit());
            }
        }

        if let Some(b'j' | b'J') = self.peek_byte() {
            self.pos += 1;
            self.error("complex literals are not supported", start, self.pos);
            self.push(Lexeme::Float(0.0), start, self.pos);
            return;
        }

        self.reject_trailing_ident(start);
        let text: String = self.source[start..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();

        if is_float {
            match text.parse::<f64>() {
                Ok(f) => self.push(Lexeme::Float(f), start, self.pos),
                Err(_) => {
                    self.error("invalid float literal", start, self.pos);
                    self.push(Lexeme::Float(0.0), start, self.pos);
                }
            }
            return;
        }

        if text.len() > 1 && text.starts_with('0') && text.bytes().any(|b| b != b'0') {
            self.error_with_help(
                "leading zeros in decimal integer literals are not permitted",
                "use an 0o prefix for octal integers",
                start,
                self.pos,
            );
        }
        self.push(integer_lexeme(&text, 10), start, self.pos);
    }

    fn eat_digits(&mut self, is_digit: impl Fn(u8) -> bool) {
        while let Some(b) = self.peek_byte() {
            if is_digit(b) {
                self.pos += 1;
            } else if b == b'_' && self.peek_byte_at(1).is_some_and(&is_digit) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn reject_trailing_ident(&mut self, start: usize) {
        if self
            .peek_char()
            .is_some_and(|c| c == '_' || c.is_alphanumeric())
        {
            while let Some(c) = self.peek_char() {
                if c == '_' || c.is_alphanumeric() {
                    self.pos += c.len_utf8();
                } else {
                    break;
                }
            }
            self.error("invalid number literal", start, self.pos);
        }
    }

    /// Scan a quoted literal starting at the opening quote. `start` points
    /// at the prefix, if any.
    fn scan_string(&mut self, start: usize, prefix: StrPrefix) {
        let Some(quote) = self.peek_byte() else {
            return;
        };
        let triple = self.peek_byte_at(1) == Some(quote) && self.peek_byte_at(2) == Some(quote);
        self.pos += if triple { 3 } else { 1 };

        let mut text = String::new();
        let mut bytes = Vec::new();

        loop {
            let Some(c) = self.peek_char() else {
                let msg = if triple {
                    "unterminated triple-quoted string literal"
                } else {
                    "unterminated string literal"
                };
                self.error(msg, start, self.pos);
                break;
            };

            if c as u32 == quote as u32 {
                if !triple {
                    self.pos += 1;
                    break;
                }
                if self.peek_byte_at(1) == Some(quote) && self.peek_byte_at(2) == Some(quote) {
                    self.pos += 3;
                    break;
                }
            }

            if !triple && (c == '\n' || c == '\r') {
                self.error("unterminated string literal", start, self.pos);
                break;
            }

            if c == '\\' {
                self.scan_escape(&prefix, &mut text, &mut bytes);
                continue;
            }

            self.pos += c.len_utf8();
            if c == '\r' {
                // Universal newlines: \r\n and bare \r read as \n.
                if self.peek_byte() == Some(b'\n') {
                    self.pos += 1;
                }
                text.push('\n');
                bytes.push(b'\n');
                continue;
            }
            if prefix.bytes && !c.is_ascii() {
                self.error(
                    "bytes can only contain ASCII literal characters",
                    self.pos - c.len_utf8(),
                    self.pos,
                );
                continue;
            }
            text.push(c);
            if c.is_ascii() {
                bytes.push(c as u8);
            }
        }

        self.push_string_literal(&prefix, text, bytes, start);
    }

    fn scan_escape(&mut self, prefix: &StrPrefix, text: &mut String, bytes: &mut Vec<u8>) {
        let esc_start = self.pos;
        self.pos += 1;
        let Some(c) = self.peek_char() else {
            return;
        };

        if prefix.raw {
            // Raw literals keep the backslash; it only stops the next
            // character from closing the literal.
            self.pos += c.len_utf8();
            text.push('\\');
            bytes.push(b'\\');
            if c == '\r' && self.peek_byte() == Some(b'\n') {
                self.pos += 1;
            }
            let c = if c == '\r' { '\n' } else { c };
            text.push(c);
            if c.is_ascii() {
                bytes.push(c as u8);
            }
            return;
        }

        self.pos += c.len_utf8();
        let simple = match c {
            '\n' => Some(None),
            '\r' => {
                if self.peek_byte() == Some(b'\n') {
                    self.pos += 1;
                }
                Some(None)
            }
            '\\' => Some(Some('\\')),
            '\'' => Some(Some('\'')),
            '"' => Some(Some('"')),
            'a' => Some(Some('\x07')),
            'b' => Some(Some('\x08')),
            'f' => Some(Some('\x0c')),
            'n' => Some(Some('\n')),
            'r' => Some(Some('\r')),
            't' => Some(Some('\t')),
            'v' => Some(Some('\x0b')),
            _ => None,
        };
        if let Some(value) = simple {
            if let Some(value) = value {
                text.push(value);
                bytes.push(value as u8);
            }
            return;
        }

        match c {
            '0'..='7' => {
                let mut value = c as u32 - '0' as u32;
                for _ in 0..2 {
                    match self.peek_byte() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + (d - b'0') as u32;
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                if prefix.bytes {
                    if value > 0xff {
                        self.error("octal escape value out of range", esc_start, self.pos);
                    }
                    bytes.push((value & 0xff) as u8);
                } else if let Some(ch) = char::from_u32(value) {
                    text.push(ch);
                }
            }
            'x' => {
                if let Some(value) = self.scan_hex_escape(2, esc_start) {
                    if prefix.bytes {
                        bytes.push(value as u8);
                    } else if let Some(ch) = char::from_u32(value) {
                        text.push(ch);
                    }
                }
            }
            'u' | 'U' if !prefix.bytes => {
                let width = if c == 'u' { 4 } else { 8 };
                if let Some(value) = self.scan_hex_escape(width, esc_start) {
                    match char::from_u32(value) {
                        Some(ch) => text.push(ch),
                        None => self.error("illegal Unicode character", esc_start, self.pos),
                    }
                }
            }
            'N' if !prefix.bytes => {
                self.error(
                    "named Unicode escapes are not supported",
                    esc_start,
                    self.pos,
                );
            }
            _ => {
                self.diagnostics.push(Diagnostic::warning(
                    format!("invalid escape sequence '\\{}'", c),
                    self.span(esc_start, self.pos),
                ));
                text.push('\\');
                text.push(c);
                bytes.push(b'\\');
                if c.is_ascii() {
                    bytes.push(c as u8);
                }
            }
        }
    }

    fn scan_hex_escape(&mut self, width: usize, esc_start: usize) -> Option<u32> {
        let digits_start = self.pos;
        for _ in 0..width {
            match self.peek_byte() {
                Some(b) if b.is_ascii_hexdigit() => self.pos += 1,
                _ => {
                    self.error(
                        &format!("truncated \\{} escape", &self.source[esc_start + 1..esc_start + 2]),
                        esc_start,
                        self.pos,
                    );
                    return None;
                }
            }
        }
        u32::from_str_radix(&self.source[digits_start..self.pos], 16).ok()
    }

    /// Adjacent literals concatenate into the previous token, which keeps
    /// its own prefix kind.
    fn push_string_literal(&mut self, prefix: &StrPrefix, text: String, bytes: Vec<u8>, start: usize) {
        let end = self.pos;
        if let Some(last) = self.tokens.last_mut() {
            match (&mut last.node, prefix.bytes) {
                (Lexeme::Str { value, .. }, false) => {
                    value.push_str(&text);
                    last.span = last.span.merge(Span::new(start as u32, end as u32));
                    return;
                }
                (Lexeme::Bytes(prev), true) => {
                    prev.extend_from_slice(&bytes);
                    last.span = last.span.merge(Span::new(start as u32, end as u32));
                    return;
                }
                (Lexeme::Str { .. }, true) | (Lexeme::Bytes(_), false) => {
                    self.error("cannot mix bytes and nonbytes literals", start, end);
                    return;
                }
                _ => {}
            }
        }
        let token = if prefix.bytes {
            Lexeme::Bytes(bytes)
        } else {
            Lexeme::Str {
                value: text,
                unicode: prefix.unicode,
            }
        };
        self.push(token, start, end);
    }

    fn scan_symbol(&mut self) {
        let start = self.pos;
        let rest = &self.source.as_bytes()[self.pos..];

        const THREE: [(&[u8], Lexeme); 5] = [
            (b"**=", Lexeme::DoubleStarEq),
            (b"//=", Lexeme::DoubleSlashEq),
            (b">>=", Lexeme::RShiftEq),
            (b"<<=", Lexeme::LShiftEq),
            (b"...", Lexeme::Ellipsis),
        ];
        const TWO: [(&[u8], Lexeme); 19] = [
            (b"**", Lexeme::DoubleStar),
            (b"//", Lexeme::DoubleSlash),
            (b">>", Lexeme::RShift),
            (b"<<", Lexeme::LShift),
            (b"<=", Lexeme::LtEq),
            (b">=", Lexeme::GtEq),
            (b"==", Lexeme::EqEq),
            (b"!=", Lexeme::NotEq),
            (b"->", Lexeme::Arrow),
            (b"+=", Lexeme::PlusEq),
            (b"-=", Lexeme::MinusEq),
            (b"*=", Lexeme::StarEq),
            (b"/=", Lexeme::SlashEq),
            (b"%=", Lexeme::PercentEq),
            (b"@=", Lexeme::AtEq),
            (b"&=", Lexeme::AmpEq),
            (b"|=", Lexeme::PipeEq),
            (b"^=", Lexeme::CaretEq),
            (b":=", Lexeme::ColonEq),
        ];

        for (text, token) in THREE.iter().chain(TWO.iter()) {
            if rest.starts_with(text) {
                self.pos += text.len();
                self.push(token.clone(), start, self.pos);
                return;
            }
        }

        let Some(ch) = self.peek_char() else {
            return;
        };
        self.pos += ch.len_utf8();

        let token = match ch {
            '(' => Lexeme::LParen,
            ')' => Lexeme::RParen,
            '[' => Lexeme::LBracket,
            ']' => Lexeme::RBracket,
            '{' => Lexeme::LBrace,
            '}' => Lexeme::RBrace,
            ',' => Lexeme::Comma,
            ':' => Lexeme::Colon,
            ';' => Lexeme::Semicolon,
            '.' => Lexeme::Dot,
            '@' => Lexeme::At,
            '+' => Lexeme::Plus,
            '-' => Lexeme::Minus,
            '*' => Lexeme::Star,
            '/' => Lexeme::Slash,
            '%' => Lexeme::Percent,
            '&' => Lexeme::Amp,
            '|' => Lexeme::Pipe,
            '^' => Lexeme::Caret,
            '~' => Lexeme::Tilde,
            '<' => Lexeme::Lt,
            '>' => Lexeme::Gt,
            '=' => Lexeme::Eq,
            _ => {
                self.error(&format!("invalid character '{}'", ch), start, self.pos);
                return;
            }
        };

        match token {
            Lexeme::LParen | Lexeme::LBracket | Lexeme::LBrace => {
                if self.bracket_depth == MAX_BRACKET_DEPTH {
                    self.error("too many nested parentheses", start, self.pos);
                }
                self.bracket_depth += 1;
            }
            Lexeme::RParen | Lexeme::RBracket | Lexeme::RBrace => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1)
            }
            _ => {}
        }

        self.push(token, start, self.pos);
    }

    // --- Utility methods ---

    fn peek_byte(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + offset).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(start as u32, end as u32)
    }

    fn push(&mut self, token: Lexeme, start: usize, end: usize) {
        let span = self.span(start, end);
        self.tokens.push(Spanned::new(token, span));
    }

    fn error(&mut self, msg: &str, start: usize, end: usize) {
        let span = self.span(start, end);
        self.diagnostics.push(Diagnostic::error(msg.to_string(), span));
    }

    fn error_with_help(&mut self, msg: &str, help: &str, start: usize, end: usize) {
        let span = self.span(start, end);
        self.diagnostics
            .push(Diagnostic::error(msg.to_string(), span).with_help(help.to_string()));
    }
}

/// `Integer` when the literal fits in 64 bits, otherwise its decimal text.
fn integer_lexeme(digits: &str, radix: u32) -> Lexeme {
    match u64::from_str_radix(digits, radix) {
        Ok(n) => Lexeme::Integer(n),
        Err(_) => Lexeme::BigInteger(to_decimal(digits, radix)),
    }
}

/// Convert validated `digits` in `radix` to decimal, nine digits per limb.
fn to_decimal(digits: &str, radix: u32) -> String {
    const LIMB: u64 = 1_000_000_000;
    if radix == 10 {
        let trimmed = digits.trim_start_matches('0');
        let text = if trimmed.is_empty() { "0" } else { trimmed };
        return text.to_string();
    }
    // Little-endian limbs.
    let mut limbs: Vec<u64> = vec![0];
    for c in digits.chars() {
        let mut carry = u64::from(c.to_digit(radix).unwrap_or(0));
        for limb in limbs.iter_mut() {
            let value = *limb * u64::from(radix) + carry;
            *limb = value % LIMB;
            carry = value / LIMB;
        }
        while carry > 0 {
            limbs.push(carry % LIMB);
            carry /= LIMB;
        }
    }
    let mut out = String::new();
    let mut iter = limbs.iter().rev();
    if let Some(top) = iter.next() {
        out.push_str(&top.to_string());
    }
    for limb in iter {
        out.push_str(&format!("{:09}", limb));
    }
    out
}

/// String literal prefix flags (`r`, `b`, `f`, `u`, in any case and order).
#[derive(Clone, Copy, Debug, Default)]
struct StrPrefix {
    raw: bool,
    bytes: bool,
    formatted: bool,
    /// A lowercase `u`, which the tree records as the literal's kind.
    unicode: bool,
}

impl StrPrefix {
    fn parse(text: &str) -> Option<StrPrefix> {
        let lower = text.to_ascii_lowercase();
        let prefix = match lower.as_str() {
            "r" => StrPrefix { raw: true, ..Default::default() },
            "u" => StrPrefix {
                unicode: text == "u",
                ..Default::default()
            },
            "b" => StrPrefix { bytes: true, ..Default::default() },
            "rb" | "br" => StrPrefix { raw: true, bytes: true, ..Default::default() },
            "f" => StrPrefix { formatted: true, ..Default::default() },
            "rf" | "fr" => StrPrefix { raw: true, formatted: true, ..Default::default() },
            _ => return None,
        };
        Some(prefix)
    }
}
