//! Tokens produced by the BUILD file lexer

/// Prefix flavour of a string literal (`r"..."`, `b'...'`, `f"..."`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFlavor {
    Plain,
    Raw,
    Byte,
    Format,
    Unicode,
    RawByte,
    RawFormat,
}

impl StringFlavor {
    /// Map a literal prefix to its flavour; `None` when the word is not a string prefix
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix.to_ascii_lowercase().as_str() {
            "" => Some(StringFlavor::Plain),
            "r" => Some(StringFlavor::Raw),
            "b" => Some(StringFlavor::Byte),
            "f" => Some(StringFlavor::Format),
            "u" => Some(StringFlavor::Unicode),
            "rb" | "br" => Some(StringFlavor::RawByte),
            "rf" | "fr" => Some(StringFlavor::RawFormat),
            _ => None,
        }
    }

    /// Raw strings keep backslashes verbatim
    pub fn is_raw(self) -> bool {
        matches!(
            self,
            StringFlavor::Raw | StringFlavor::RawByte | StringFlavor::RawFormat
        )
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    /// Identifier at top level directly followed by `(`, i.e. the head of a rule call
    RuleName,
    String(StringFlavor),
    Integer,
    Boolean,
    /// One comment line, or several consecutive own-line comment lines
    Comment,

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

    Assign,
    PlusAssign,
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Pipe,
    Ampersand,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    Eof,
    Illegal,
}

impl TokenKind {
    /// Opening delimiters increase the nesting depth
    pub fn is_opening(self) -> bool {
        matches!(self, TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace)
    }

    pub fn is_closing(self) -> bool {
        matches!(self, TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace)
    }

    pub fn is_word(self) -> bool {
        matches!(self, TokenKind::Identifier | TokenKind::RuleName)
    }
}

/// A lexed token. `literal` is the exact source text (comment groups are
/// stored one line per `\n`, without their indentation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    /// Bracket nesting depth the token occurs at
    pub depth: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in chars
    pub column: usize,
    /// Byte range of the token in the source text
    pub offset: usize,
    pub end_offset: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        literal: impl Into<String>,
        depth: usize,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            kind,
            literal: literal.into(),
            depth,
            line,
            column,
            offset: 0,
            end_offset: 0,
        }
    }

    /// Set the byte range the token was read from
    pub fn at_offsets(mut self, offset: usize, end_offset: usize) -> Self {
        self.offset = offset;
        self.end_offset = end_offset;
        self
    }

    /// Token for nodes built in memory rather than parsed
    pub fn synthetic(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self::new(kind, literal, 0, 0, 0)
    }

    /// Line the token ends on; triple-quoted strings and comment groups span lines
    pub fn end_line(&self) -> usize {
        self.line + self.literal.matches('\n').count()
    }

    /// Column just past the last char of the token
    pub fn end_column(&self) -> usize {
        match self.literal.rfind('\n') {
            Some(idx) => self.literal[idx + 1..].chars().count() + 1,
            None => self.column + self.literal.chars().count(),
        }
    }

    /// True for an identifier spelled exactly `word`
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind.is_word() && self.literal == word
    }
}
