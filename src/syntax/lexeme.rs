/// Token kinds produced by the lexer.
#[derive(Clone, Debug, PartialEq)]
pub enum Lexeme {
    // Literals
    Integer(u64),
    /// Decimal digits of an integer literal that does not fit in `u64`.
    BigInteger(String),
    Float(f64),
    /// `unicode` is set for a lowercase `u` prefix.
    Str { value: String, unicode: bool },
    Bytes(Vec<u8>),
    Ident(String),

    // Keywords
    False,
    None,
    True,
    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Ellipsis,
    Arrow,
    At,

    // Operators
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    LShift,
    RShift,
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,
    Eq,
    ColonEq,

    // Augmented assignment
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    DoubleSlashEq,
    PercentEq,
    DoubleStarEq,
    AtEq,
    AmpEq,
    PipeEq,
    CaretEq,
    LShiftEq,
    RShiftEq,

    // Layout
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl Lexeme {
    pub fn from_keyword(s: &str) -> Option<Lexeme> {
        match s {
            "False" => Some(Lexeme::False),
            "None" => Some(Lexeme::None),
            "True" => Some(Lexeme::True),
            "and" => Some(Lexeme::And),
            "as" => Some(Lexeme::As),
            "assert" => Some(Lexeme::Assert),
            "async" => Some(Lexeme::Async),
            "await" => Some(Lexeme::Await),
            "break" => Some(Lexeme::Break),
            "class" => Some(Lexeme::Class),
            "continue" => Some(Lexeme::Continue),
            "def" => Some(Lexeme::Def),
            "del" => Some(Lexeme::Del),
            "elif" => Some(Lexeme::Elif),
            "else" => Some(Lexeme::Else),
            "except" => Some(Lexeme::Except),
            "finally" => Some(Lexeme::Finally),
            "for" => Some(Lexeme::For),
            "from" => Some(Lexeme::From),
            "global" => Some(Lexeme::Global),
            "if" => Some(Lexeme::If),
            "import" => Some(Lexeme::Import),
            "in" => Some(Lexeme::In),
            "is" => Some(Lexeme::Is),
            "lambda" => Some(Lexeme::Lambda),
            "nonlocal" => Some(Lexeme::Nonlocal),
            "not" => Some(Lexeme::Not),
            "or" => Some(Lexeme::Or),
            "pass" => Some(Lexeme::Pass),
            "raise" => Some(Lexeme::Raise),
            "return" => Some(Lexeme::Return),
            "try" => Some(Lexeme::Try),
            "while" => Some(Lexeme::While),
            "with" => Some(Lexeme::With),
            "yield" => Some(Lexeme::Yield),
            _ => None,
        }
    }

    /// Keywords the grammar reserves but does not accept.
    pub fn is_unsupported_keyword(&self) -> bool {
        matches!(
            self,
            Lexeme::Async
                | Lexeme::Await
                | Lexeme::Except
                | Lexeme::Finally
                | Lexeme::Try
                | Lexeme::With
                | Lexeme::Yield
        )
    }

    /// Human-readable description for error messages.
    pub fn description(&self) -> &'static str {
        match self {
            Lexeme::Integer(_) | Lexeme::BigInteger(_) => "integer literal",
            Lexeme::Float(_) => "float literal",
            Lexeme::Str { .. } => "string literal",
            Lexeme::Bytes(_) => "bytes literal",
            Lexeme::Ident(_) => "identifier",

            Lexeme::False => "'False'",
            Lexeme::None => "'None'",
            Lexeme::True => "'True'",
            Lexeme::And => "'and'",
            Lexeme::As => "'as'",
            Lexeme::Assert => "'assert'",
            Lexeme::Async => "'async'",
            Lexeme::Await => "'await'",
            Lexeme::Break => "'break'",
            Lexeme::Class => "'class'",
            Lexeme::Continue => "'continue'",
            Lexeme::Def => "'def'",
            Lexeme::Del => "'del'",
            Lexeme::Elif => "'elif'",
            Lexeme::Else => "'else'",
            Lexeme::Except => "'except'",
            Lexeme::Finally => "'finally'",
            Lexeme::For => "'for'",
            Lexeme::From => "'from'",
            Lexeme::Global => "'global'",
            Lexeme::If => "'if'",
            Lexeme::Import => "'import'",
            Lexeme::In => "'in'",
            Lexeme::Is => "'is'",
            Lexeme::Lambda => "'lambda'",
            Lexeme::Nonlocal => "'nonlocal'",
            Lexeme::Not => "'not'",
            Lexeme::Or => "'or'",
            Lexeme::Pass => "'pass'",
            Lexeme::Raise => "'raise'",
            Lexeme::Return => "'return'",
            Lexeme::Try => "'try'",
            Lexeme::While => "'while'",
            Lexeme::With => "'with'",
            Lexeme::Yield => "'yield'",

            Lexeme::LParen => "'('",
            Lexeme::RParen => "')'",
            Lexeme::LBracket => "'['",
            Lexeme::RBracket => "']'",
            Lexeme::LBrace => "'{'",
            Lexeme::RBrace => "'}'",
            Lexeme::Comma => "','",
            Lexeme::Colon => "':'",
            Lexeme::Semicolon => "';'",
            Lexeme::Dot => "'.'",
            Lexeme::Ellipsis => "'...'",
            Lexeme::Arrow => "'->'",
            Lexeme::At => "'@'",

            Lexeme::Plus => "'+'",
            Lexeme::Minus => "'-'",
            Lexeme::Star => "'*'",
            Lexeme::DoubleStar => "'**'",
            Lexeme::Slash => "'/'",
            Lexeme::DoubleSlash => "'//'",
            Lexeme::Percent => "'%'",
            Lexeme::Amp => "'&'",
            Lexeme::Pipe => "'|'",
            Lexeme::Caret => "'^'",
            Lexeme::Tilde => "'~'",
            Lexeme::LShift => "'<<'",
            Lexeme::RShift => "'>>'",
            Lexeme::Lt => "'<'",
            Lexeme::Gt => "'>'",
            Lexeme::LtEq => "'<='",
            Lexeme::GtEq => "'>='",
            Lexeme::EqEq => "'=='",
            Lexeme::NotEq => "'!='",
            Lexeme::Eq => "'='",
            Lexeme::ColonEq => "':='",

            Lexeme::PlusEq => "'+='",
            Lexeme::MinusEq => "'-='",
            Lexeme::StarEq => "'*='",
            Lexeme::SlashEq => "'/='",
            Lexeme::DoubleSlashEq => "'//='",
            Lexeme::PercentEq => "'%='",
            Lexeme::DoubleStarEq => "'**='",
            Lexeme::AtEq => "'@='",
            Lexeme::AmpEq => "'&='",
            Lexeme::PipeEq => "'|='",
            Lexeme::CaretEq => "'^='",
            Lexeme::LShiftEq => "'<<='",
            Lexeme::RShiftEq => "'>>='",

            Lexeme::Newline => "newline",
            Lexeme::Indent => "indent",
            Lexeme::Dedent => "dedent",
            Lexeme::Eof => "end of file",
        }
    }
}
