//! Lexer for BUILD files
//!
//! Never fails: characters it cannot place become [`TokenKind::Illegal`]
//! tokens and the parser reports them.

use super::token::{StringFlavor, Token, TokenKind};

/// Tokenize BUILD file text. The returned vector always ends with an
/// [`TokenKind::Eof`] token.
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(text).run()
}

/// Position where a token starts
#[derive(Clone, Copy)]
struct Mark {
    line: usize,
    column: usize,
    offset: usize,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    /// Byte offset of `pos`
    byte: usize,
    line: usize,
    column: usize,
    depth: usize,
    /// Whether a token has already been emitted on the current line
    line_has_token: bool,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            byte: 0,
            line: 1,
            column: 1,
            depth: 0,
            line_has_token: false,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.peek(0) {
            match c {
                '\n' | ' ' | '\t' | '\r' | '\x0c' => {
                    self.bump();
                }
                '\\' if self.peek(1) == Some('\n') => {
                    // explicit line continuation
                    self.bump();
                    self.bump();
                }
                '#' => self.lex_comment(),
                '"' | '\'' => self.lex_string(String::new(), StringFlavor::Plain),
                c if c.is_ascii_digit() => self.lex_number(),
                c if c.is_alphabetic() || c == '_' => self.lex_word(),
                _ => self.lex_punctuation(),
            }
        }

        let (line, column, byte) = (self.line, self.column, self.byte);
        self.tokens.push(
            Token::new(TokenKind::Eof, "", self.depth, line, column).at_offsets(byte, byte),
        );
        self.tokens
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        self.byte += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.line_has_token = false;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn mark(&self) -> Mark {
        Mark {
            line: self.line,
            column: self.column,
            offset: self.byte,
        }
    }

    fn push(&mut self, kind: TokenKind, literal: String, start: Mark) {
        let token = Token::new(kind, literal, self.depth, start.line, start.column)
            .at_offsets(start.offset, self.byte);
        self.tokens.push(token);
        self.line_has_token = true;
    }

    fn read_line_rest(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.bump();
        }
        if text.ends_with('\r') {
            text.pop();
        }
        text
    }

    fn lex_comment(&mut self) {
        let start = self.mark();
        let own_line = !self.line_has_token;
        let mut literal = self.read_line_rest();

        // Consecutive own-line comments form one group
        if own_line {
            while self.peek(0) == Some('\n') {
                let mut offset = 1;
                while matches!(self.peek(offset), Some(' ') | Some('\t') | Some('\r')) {
                    offset += 1;
                }
                if self.peek(offset) != Some('#') {
                    break;
                }
                for _ in 0..offset {
                    self.bump();
                }
                literal.push('\n');
                literal.push_str(&self.read_line_rest());
            }
        }

        self.push(TokenKind::Comment, literal, start);
    }

    fn lex_string(&mut self, prefix: String, flavor: StringFlavor) {
        // Prefix letters were already consumed; the token starts where they did
        let start = Mark {
            line: self.line,
            column: self.column - prefix.chars().count(),
            offset: self.byte - prefix.len(),
        };
        let Some(quote) = self.bump() else {
            return;
        };
        let mut literal = prefix;
        literal.push(quote);

        let triple = self.peek(0) == Some(quote) && self.peek(1) == Some(quote);
        if triple {
            literal.push(quote);
            literal.push(quote);
            self.bump();
            self.bump();
        }

        let mut terminated = false;
        while let Some(c) = self.peek(0) {
            if c == '\n' && !triple {
                break;
            }
            if c == '\\' {
                literal.push(c);
                self.bump();
                if let Some(escaped) = self.peek(0) {
                    if escaped == '\n' && !triple {
                        break;
                    }
                    literal.push(escaped);
                    self.bump();
                }
                continue;
            }
            if c == quote {
                if !triple {
                    literal.push(c);
                    self.bump();
                    terminated = true;
                    break;
                }
                if self.peek(1) == Some(quote) && self.peek(2) == Some(quote) {
                    for _ in 0..3 {
                        literal.push(quote);
                        self.bump();
                    }
                    terminated = true;
                    break;
                }
            }
            literal.push(c);
            self.bump();
        }

        let kind = if terminated {
            TokenKind::String(flavor)
        } else {
            TokenKind::Illegal
        };
        self.push(kind, literal, start);
    }

    fn lex_number(&mut self) {
        let start = self.mark();
        let mut literal = String::new();
        let radix_prefix = self.peek(0) == Some('0')
            && matches!(
                self.peek(1),
                Some('x') | Some('X') | Some('o') | Some('O') | Some('b') | Some('B')
            );
        if radix_prefix {
            for _ in 0..2 {
                if let Some(c) = self.bump() {
                    literal.push(c);
                }
            }
        }
        while let Some(c) = self.peek(0) {
            if c.is_ascii_alphanumeric() || c == '_' {
                literal.push(c);
                self.bump();
            } else {
                break;
            }
        }
        self.push(TokenKind::Integer, literal, start);
    }

    fn lex_word(&mut self) {
        let start = self.mark();
        let mut word = String::new();
        while let Some(c) = self.peek(0) {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }

        if matches!(self.peek(0), Some('"') | Some('\'')) {
            if let Some(flavor) = StringFlavor::from_prefix(&word) {
                self.lex_string(word, flavor);
                return;
            }
        }

        let kind = match word.as_str() {
            "True" | "False" => TokenKind::Boolean,
            _ if self.depth == 0 && self.next_significant() == Some('(') => TokenKind::RuleName,
            _ => TokenKind::Identifier,
        };
        self.push(kind, word, start);
    }

    /// Next char on the current line that is not a space
    fn next_significant(&self) -> Option<char> {
        let mut offset = 0;
        while let Some(c) = self.peek(offset) {
            if c == ' ' || c == '\t' {
                offset += 1;
                continue;
            }
            return Some(c);
        }
        None
    }

    fn lex_punctuation(&mut self) {
        let start = self.mark();
        let Some(c) = self.peek(0) else {
            return;
        };
        let next = self.peek(1);

        let (kind, len) = match (c, next) {
            ('*', Some('*')) => (TokenKind::DoubleStar, 2),
            ('/', Some('/')) => (TokenKind::DoubleSlash, 2),
            ('=', Some('=')) => (TokenKind::Eq, 2),
            ('!', Some('=')) => (TokenKind::NotEq, 2),
            ('<', Some('=')) => (TokenKind::LtEq, 2),
            ('>', Some('=')) => (TokenKind::GtEq, 2),
            ('+', Some('=')) => (TokenKind::PlusAssign, 2),
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            ('[', _) => (TokenKind::LBracket, 1),
            (']', _) => (TokenKind::RBracket, 1),
            ('{', _) => (TokenKind::LBrace, 1),
            ('}', _) => (TokenKind::RBrace, 1),
            (',', _) => (TokenKind::Comma, 1),
            (':', _) => (TokenKind::Colon, 1),
            (';', _) => (TokenKind::Semicolon, 1),
            ('.', _) => (TokenKind::Dot, 1),
            ('=', _) => (TokenKind::Assign, 1),
            ('+', _) => (TokenKind::Plus, 1),
            ('-', _) => (TokenKind::Minus, 1),
            ('*', _) => (TokenKind::Star, 1),
            ('/', _) => (TokenKind::Slash, 1),
            ('%', _) => (TokenKind::Percent, 1),
            ('|', _) => (TokenKind::Pipe, 1),
            ('&', _) => (TokenKind::Ampersand, 1),
            ('<', _) => (TokenKind::Lt, 1),
            ('>', _) => (TokenKind::Gt, 1),
            _ => (TokenKind::Illegal, 1),
        };

        let mut literal = String::new();
        for _ in 0..len {
            if let Some(ch) = self.bump() {
                literal.push(ch);
            }
        }

        if kind.is_closing() {
            self.depth = self.depth.saturating_sub(1);
        }
        self.push(kind, literal, start);
        if kind.is_opening() {
            self.depth += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_rule_call() {
        let tokens = tokenize("ts_library(\n    name = \"lib\",\n)\n");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::RuleName,
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::String(StringFlavor::Plain),
                TokenKind::Comma,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[2].depth, 1);
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[2].column, 5);
        assert_eq!(tokens[6].depth, 0);
        assert_eq!(tokens[7].line, 4);
    }

    #[test]
    fn test_nested_call_name_is_plain_identifier() {
        let tokens = tokenize("x(srcs = glob([\"*.ts\"]))");
        assert_eq!(tokens[0].kind, TokenKind::RuleName);
        let glob = tokens.iter().find(|t| t.literal == "glob").unwrap();
        assert_eq!(glob.kind, TokenKind::Identifier);
    }

    #[test]
    fn test_string_prefixes() {
        let tokens = tokenize(r#"r"a\d" b'x' f"{y}" rb"z" "plain""#);
        let flavors: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t.kind {
                TokenKind::String(flavor) => Some(flavor),
                _ => None,
            })
            .collect();
        assert_eq!(
            flavors,
            vec![
                StringFlavor::Raw,
                StringFlavor::Byte,
                StringFlavor::Format,
                StringFlavor::RawByte,
                StringFlavor::Plain,
            ]
        );
        assert_eq!(tokens[0].literal, r#"r"a\d""#);
        assert_eq!(tokens[0].column, 1);
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        let tokens = tokenize("x = \"\"\"one\ntwo\"\"\"\ny = 1");
        assert_eq!(tokens[2].kind, TokenKind::String(StringFlavor::Plain));
        assert_eq!(tokens[2].end_line(), 2);
        assert_eq!(tokens[3].line, 3);
    }

    #[test]
    fn test_unterminated_string_is_illegal() {
        let tokens = tokenize("x = \"oops\ny = 1");
        assert_eq!(tokens[2].kind, TokenKind::Illegal);
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_comment_grouping() {
        let tokens = tokenize("# one\n  # two\n\n# three\nx = 1  # tail\n# after\n");
        let comments: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Comment)
            .map(|t| t.literal.as_str())
            .collect();
        assert_eq!(comments, vec!["# one\n# two", "# three", "# tail", "# after"]);
    }

    #[test]
    fn test_booleans_and_operators() {
        assert_eq!(
            kinds("True != False ** 2 // 3 += []"),
            vec![
                TokenKind::Boolean,
                TokenKind::NotEq,
                TokenKind::Boolean,
                TokenKind::DoubleStar,
                TokenKind::Integer,
                TokenKind::DoubleSlash,
                TokenKind::Integer,
                TokenKind::PlusAssign,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_illegal_characters_do_not_abort() {
        assert_eq!(
            kinds("a ? b"),
            vec![
                TokenKind::Identifier,
                TokenKind::Illegal,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_byte_offsets() {
        let text = "é = r\"x\"  # note\r\n";
        let tokens = tokenize(text);
        let spans: Vec<_> = tokens
            .iter()
            .map(|t| &text[t.offset..t.end_offset])
            .collect();
        assert_eq!(spans, vec!["é", "=", "r\"x\"", "# note\r", ""]);
        assert_eq!(tokens[3].literal, "# note");
    }

    #[test]
    fn test_comment_keeps_trailing_spaces() {
        let tokens = tokenize("# spaced  \nx = 1\n");
        assert_eq!(tokens[0].literal, "# spaced  ");
    }

    #[test]
    fn test_depth_tracking() {
        let tokens = tokenize("f([{}])");
        let depths: Vec<_> = tokens.iter().map(|t| t.depth).collect();
        assert_eq!(depths, vec![0, 0, 1, 2, 2, 1, 0, 0]);
    }
}
