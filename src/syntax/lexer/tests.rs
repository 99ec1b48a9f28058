use super::*;

fn lex(source: &str) -> Vec<Lexeme> {
    let (tokens, diags) = Lexer::new(source).tokenize();
    assert!(
        diags.iter().all(|d| !d.is_error()),
        "unexpected errors: {:?}",
        diags
    );
    tokens.into_iter().map(|t| t.node).collect()
}

fn lex_errors(source: &str) -> Vec<String> {
    let (_, diags) = Lexer::new(source).tokenize();
    diags
        .into_iter()
        .filter(|d| d.is_error())
        .map(|d| d.message)
        .collect()
}

#[test]
fn test_keywords() {
    let tokens = lex("def return if elif else while for in not and or is pass");
    assert_eq!(
        tokens,
        vec![
            Lexeme::Def,
            Lexeme::Return,
            Lexeme::If,
            Lexeme::Elif,
            Lexeme::Else,
            Lexeme::While,
            Lexeme::For,
            Lexeme::In,
            Lexeme::Not,
            Lexeme::And,
            Lexeme::Or,
            Lexeme::Is,
            Lexeme::Pass,
            Lexeme::Newline,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_operators_longest_match() {
    let tokens = lex("** **= // //= >> >>= << <<= ... -> != := @=");
    assert_eq!(
        tokens,
        vec![
            Lexeme::DoubleStar,
            Lexeme::DoubleStarEq,
            Lexeme::DoubleSlash,
            Lexeme::DoubleSlashEq,
            Lexeme::RShift,
            Lexeme::RShiftEq,
            Lexeme::LShift,
            Lexeme::LShiftEq,
            Lexeme::Ellipsis,
            Lexeme::Arrow,
            Lexeme::NotEq,
            Lexeme::ColonEq,
            Lexeme::AtEq,
            Lexeme::Newline,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_numbers() {
    let tokens = lex("0 42 1_000 0x1F 0o17 0b101 1.5 .5 2. 1e3 2.5E-2");
    assert_eq!(
        tokens,
        vec![
            Lexeme::Integer(0),
            Lexeme::Integer(42),
            Lexeme::Integer(1000),
            Lexeme::Integer(31),
            Lexeme::Integer(15),
            Lexeme::Integer(5),
            Lexeme::Float(1.5),
            Lexeme::Float(0.5),
            Lexeme::Float(2.0),
            Lexeme::Float(1000.0),
            Lexeme::Float(0.025),
            Lexeme::Newline,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_number_errors() {
    assert_eq!(
        lex_errors("x = 007"),
        vec!["leading zeros in decimal integer literals are not permitted"]
    );
    assert_eq!(lex_errors("x = 3j"), vec!["complex literals are not supported"]);
    assert_eq!(lex_errors("x = 12abc"), vec!["invalid number literal"]);
}

#[test]
fn test_integers_wider_than_64_bits() {
    let tokens = lex("18446744073709551615 18446744073709551616 0x10000000000000000 0o2_000_000_000_000_000_000_000");
    assert_eq!(
        tokens[..4],
        [
            Lexeme::Integer(u64::MAX),
            Lexeme::BigInteger("18446744073709551616".into()),
            Lexeme::BigInteger("18446744073709551616".into()),
            Lexeme::BigInteger("18446744073709551616".into()),
        ]
    );
    let binary = format!("0b1{}", "0".repeat(70));
    assert_eq!(
        lex(&binary)[0],
        Lexeme::BigInteger("1180591620717411303424".into())
    );
}

#[test]
fn test_u_prefix_kind() {
    let tokens = lex("u'a' 'b'");
    assert_eq!(
        tokens[0],
        Lexeme::Str {
            value: "ab".into(),
            unicode: true
        }
    );
    let tokens = lex("'a' u'b' U'c'");
    assert_eq!(
        tokens[0],
        Lexeme::Str {
            value: "abc".into(),
            unicode: false
        }
    );
    let tokens = lex("U'c'");
    assert_eq!(
        tokens[0],
        Lexeme::Str {
            value: "c".into(),
            unicode: false
        }
    );
}

#[test]
fn test_strings_and_escapes() {
    let tokens = lex(r#"'a\tb' "it's" r'\n', b'\x00\xff' B"\101", '\u00e9\101'"#);
    assert_eq!(
        tokens,
        vec![
            // adjacent literals concatenate
            Lexeme::Str { value: "a\tbit's\\n".into(), unicode: false },
            Lexeme::Comma,
            Lexeme::Bytes(vec![0, 255, b'A']),
            Lexeme::Comma,
            Lexeme::Str { value: "\u{e9}A".into(), unicode: false },
            Lexeme::Newline,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_triple_quoted_string_spans_lines() {
    let tokens = lex("s = \"\"\"one\ntwo\"\"\"\n");
    assert_eq!(
        tokens,
        vec![
            Lexeme::Ident("s".into()),
            Lexeme::Eq,
            Lexeme::Str { value: "one\ntwo".into(), unicode: false },
            Lexeme::Newline,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_string_errors() {
    assert_eq!(lex_errors("'abc\n"), vec!["unterminated string literal"]);
    assert_eq!(lex_errors("f'{x}'"), vec!["f-strings are not supported"]);
    assert_eq!(
        lex_errors("'a' b'b'"),
        vec!["cannot mix bytes and nonbytes literals"]
    );
}

#[test]
fn test_invalid_escape_is_a_warning() {
    let (tokens, diags) = Lexer::new(r"'\d'").tokenize();
    assert_eq!(diags.len(), 1);
    assert!(!diags[0].is_error());
    assert_eq!(tokens[0].node, Lexeme::Str { value: "\\d".into(), unicode: false });
}

#[test]
fn test_indent_and_dedent() {
    let tokens = lex("if x:\n    y\n    if z:\n        w\nv\n");
    assert_eq!(
        tokens,
        vec![
            Lexeme::If,
            Lexeme::Ident("x".into()),
            Lexeme::Colon,
            Lexeme::Newline,
            Lexeme::Indent,
            Lexeme::Ident("y".into()),
            Lexeme::Newline,
            Lexeme::If,
            Lexeme::Ident("z".into()),
            Lexeme::Colon,
            Lexeme::Newline,
            Lexeme::Indent,
            Lexeme::Ident("w".into()),
            Lexeme::Newline,
            Lexeme::Dedent,
            Lexeme::Dedent,
            Lexeme::Ident("v".into()),
            Lexeme::Newline,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_blank_lines_and_comments_are_skipped() {
    let tokens = lex("# header\n\nx  # trailing\n   \n  # indented comment\ny");
    assert_eq!(
        tokens,
        vec![
            Lexeme::Ident("x".into()),
            Lexeme::Newline,
            Lexeme::Ident("y".into()),
            Lexeme::Newline,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_brackets_join_lines() {
    let tokens = lex("f(a,\n      b)\n");
    assert_eq!(
        tokens,
        vec![
            Lexeme::Ident("f".into()),
            Lexeme::LParen,
            Lexeme::Ident("a".into()),
            Lexeme::Comma,
            Lexeme::Ident("b".into()),
            Lexeme::RParen,
            Lexeme::Newline,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_backslash_continuation() {
    let tokens = lex("x = 1 + \\\n    2\n");
    assert_eq!(
        tokens,
        vec![
            Lexeme::Ident("x".into()),
            Lexeme::Eq,
            Lexeme::Integer(1),
            Lexeme::Plus,
            Lexeme::Integer(2),
            Lexeme::Newline,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_dedents_closed_at_eof() {
    let tokens = lex("def f():\n    return 1");
    assert_eq!(
        &tokens[tokens.len() - 3..],
        &[Lexeme::Newline, Lexeme::Dedent, Lexeme::Eof]
    );
}

#[test]
fn test_crlf_line_endings() {
    let tokens = lex("x = 1\r\ny = 2\r\n");
    assert_eq!(
        tokens,
        vec![
            Lexeme::Ident("x".into()),
            Lexeme::Eq,
            Lexeme::Integer(1),
            Lexeme::Newline,
            Lexeme::Ident("y".into()),
            Lexeme::Eq,
            Lexeme::Integer(2),
            Lexeme::Newline,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_inconsistent_dedent() {
    assert_eq!(
        lex_errors("if x:\n    y\n  z\n"),
        vec!["unindent does not match any outer indentation level"]
    );
}

#[test]
fn test_invalid_character() {
    assert_eq!(lex_errors("x = $"), vec!["invalid character '$'"]);
}

#[test]
fn test_unicode_identifier() {
    let tokens = lex("café = 1");
    assert_eq!(tokens[0], Lexeme::Ident("café".into()));
}

fn nested_blocks(levels: usize) -> String {
    let mut source = String::new();
    for level in 0..levels {
        source.push_str(&" ".repeat(level));
        source.push_str("if x:\n");
    }
    source.push_str(&" ".repeat(levels));
    source.push_str("pass\n");
    source
}

#[test]
fn test_bracket_depth_limit() {
    let deepest = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    assert!(lex_errors(&deepest).is_empty());

    let too_deep = format!("{}1{}", "[".repeat(201), "]".repeat(201));
    assert_eq!(lex_errors(&too_deep), vec!["too many nested parentheses"]);
}

#[test]
fn test_indentation_limit() {
    assert!(lex_errors(&nested_blocks(99)).is_empty());
    assert_eq!(
        lex_errors(&nested_blocks(100)),
        vec!["too many levels of indentation"]
    );
}
