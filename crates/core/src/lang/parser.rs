//! Pratt parser for BUILD files
//!
//! Parsing never aborts: errors are collected with their position and the
//! parser resumes at the next top-level line.

use std::fmt;

use serde::Serialize;

use super::ast::{
    ArrayLiteral, BooleanLiteral, CallExpression, CommentGroup, CommentStatement, DelimitedList,
    Expression, ExpressionKind, ExpressionStatement, Identifier, IndexExpression, InfixExpression,
    IntegerLiteral, KeyValueExpression, LineEnding, ListItem, ListLayout, MapLiteral,
    PrefixExpression, Root, SingleLineComment, SourceText, Statement, StringLiteral,
    TrailingComment, TupleExpression,
};
use super::lexer::tokenize;
use super::render::Render;
use super::token::{Token, TokenKind};

/// Keywords of the full language this grammar does not accept as statements
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "def", "if", "elif", "else", "for", "while", "return", "lambda", "class", "try", "except",
    "finally", "with", "pass", "break", "continue", "import", "from", "raise", "yield", "global",
    "nonlocal", "assert", "del",
];

/// A recoverable syntax error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    fn at(token: &Token, message: impl Into<String>) -> Self {
        Self {
            line: token.line,
            column: token.column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Result of parsing a whole file
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub root: Root,
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Binding power, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Assign,
    Or,
    And,
    Not,
    Compare,
    BitOr,
    Sum,
    Product,
    Prefix,
    Call,
}

/// Parse a token stream. The tree renders canonically; use [`parse_source`]
/// to keep the original layout of unchanged nodes.
pub fn parse(tokens: Vec<Token>) -> ParseOutput {
    Parser::new(tokens, None).parse_root()
}

/// Tokenize and parse BUILD file text. Nodes remember the text they were
/// read from, so rendering an unchanged tree gives back `text` exactly.
pub fn parse_source(text: &str) -> ParseOutput {
    Parser::new(tokenize(text), Some(text)).parse_root()
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    /// End position of the last consumed token
    prev_end_line: usize,
    prev_end_column: usize,
    prev_end_offset: usize,
    source: Option<&'a str>,
}

impl<'a> Parser<'a> {
    fn new(mut tokens: Vec<Token>, source: Option<&'a str>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, column, offset) = tokens
                .last()
                .map(|t| (t.end_line(), t.end_column(), t.end_offset))
                .unwrap_or((1, 1, 0));
            tokens.push(Token::new(TokenKind::Eof, "", 0, line, column).at_offsets(offset, offset));
        }
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            prev_end_line: 0,
            prev_end_column: 1,
            prev_end_offset: 0,
            source,
        }
    }

    fn current(&self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn peek(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn at_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
            self.prev_end_line = token.end_line();
            self.prev_end_column = token.end_column();
            self.prev_end_offset = token.end_offset;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.current().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        let found = if token.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            format!("`{}`", token.literal)
        };
        ParseError::at(token, format!("expected {expected}, found {found}"))
    }

    fn parse_root(mut self) -> ParseOutput {
        let mut statements = Vec::new();
        let mut last_end_line = 0;
        let mut last_end_offset = 0;
        let mut pending: Option<CommentGroup> = None;

        while !self.at_eof() {
            let token = self.current().clone();
            if token.kind == TokenKind::Comment {
                self.advance();
                let group = CommentGroup::from_token(token);
                let next = self.current();
                // A group directly above a statement leads it
                let attaches = next.kind != TokenKind::Eof
                    && next.kind != TokenKind::Comment
                    && next.line == group.end_line() + 1;
                if attaches {
                    pending = Some(group);
                } else {
                    let end_line = group.end_line();
                    statements.push(self.comment_statement(group, last_end_line, last_end_offset));
                    last_end_line = end_line;
                    last_end_offset = self.prev_end_offset;
                }
                continue;
            }

            if token.kind == TokenKind::Semicolon {
                self.advance();
                continue;
            }

            let (start_line, start_offset) = pending
                .as_ref()
                .map(|group| (group.token.line, group.token.offset))
                .unwrap_or((token.line, token.offset));
            match self.parse_statement() {
                Ok(mut statement) => {
                    statement.blank_lines_before = start_line.saturating_sub(last_end_line + 1);
                    statement.comments.leading = pending.take();
                    let mut statement = Statement::Expression(statement);
                    self.capture_statement(
                        &mut statement,
                        last_end_offset,
                        start_offset,
                        self.prev_end_offset,
                    );
                    statements.push(statement);
                    last_end_line = self.prev_end_line;
                    last_end_offset = self.prev_end_offset;
                }
                Err(error) => {
                    tracing::debug!("parse error: {}", error);
                    let line = error.line;
                    self.errors.push(error);
                    pending = None;
                    self.synchronize(line);
                    last_end_line = self.prev_end_line;
                    last_end_offset = self.prev_end_offset;
                }
            }
        }

        if let Some(group) = pending.take() {
            let end_line = group.end_line();
            let end_offset = group.token.end_offset;
            statements.push(self.comment_statement(group, last_end_line, last_end_offset));
            last_end_line = end_line;
            last_end_offset = end_offset;
        }

        let eof_line = self.current().line;
        let trailing_newlines = if statements.is_empty() {
            eof_line.saturating_sub(1)
        } else {
            eof_line.saturating_sub(last_end_line)
        };

        ParseOutput {
            root: Root {
                statements,
                trailing_newlines,
                trailing_text: self
                    .source
                    .and_then(|source| source.get(last_end_offset..))
                    .map(str::to_string),
                line_ending: self.source.map(LineEnding::detect).unwrap_or_default(),
            },
            errors: self.errors,
        }
    }

    /// A standalone comment group; `last_end_line` and `last_end_offset` end the previous statement
    fn comment_statement(
        &self,
        group: CommentGroup,
        last_end_line: usize,
        last_end_offset: usize,
    ) -> Statement {
        let (start, end) = (group.token.offset, group.token.end_offset);
        let mut statement = Statement::Comment(CommentStatement {
            token: group.token.clone(),
            blank_lines_before: group.token.line.saturating_sub(last_end_line + 1),
            group,
            source: None,
        });
        self.capture_statement(&mut statement, last_end_offset, start, end);
        statement
    }

    /// Remember the text of a statement spanning `start..end` and the
    /// whitespace from `from` up to it
    fn capture_statement(&self, statement: &mut Statement, from: usize, start: usize, end: usize) {
        let Some(source) = self.source else {
            return;
        };
        let (Some(before), Some(text)) = (source.get(from..start), source.get(start..end)) else {
            return;
        };
        let captured = Some(SourceText::new(before, text, &statement.render(0)));
        match statement {
            Statement::Expression(stmt) => stmt.source = captured,
            Statement::Comment(stmt) => stmt.source = captured,
        }
    }

    /// Remember the text of an expression written on one line
    fn capture_expression(&self, expression: &mut Expression, start: usize) {
        let Some(text) = self
            .source
            .and_then(|source| source.get(start..self.prev_end_offset))
        else {
            return;
        };
        if !text.contains('\n') {
            expression.source = Some(SourceText::new("", text, &expression.render(0)));
        }
    }

    /// Skip to the first token of a later top-level line
    fn synchronize(&mut self, error_line: usize) {
        if !self.at_eof() {
            self.advance();
        }
        while !self.at_eof() {
            let token = self.current();
            if token.line > error_line
                && token.column == 1
                && token.depth == 0
                && !token.kind.is_closing()
            {
                break;
            }
            self.advance();
        }
    }

    fn parse_statement(&mut self) -> Result<ExpressionStatement, ParseError> {
        let token = self.current().clone();
        if token.kind.is_word() && UNSUPPORTED_KEYWORDS.contains(&token.literal.as_str()) {
            return Err(ParseError::at(
                &token,
                format!("unsupported statement `{}`", token.literal),
            ));
        }

        let expression = self.parse_expression(Precedence::Lowest)?;
        let mut statement = ExpressionStatement {
            token,
            expression,
            comments: Default::default(),
            blank_lines_before: 0,
            source: None,
        };

        if self.current().kind == TokenKind::Semicolon && self.current().line == self.prev_end_line
        {
            self.advance();
        }

        let next = self.current().clone();
        if next.kind == TokenKind::Comment && next.line == self.prev_end_line {
            statement.comments.trailing = Some(TrailingComment {
                gap: next.column.saturating_sub(self.prev_end_column),
                comment: SingleLineComment {
                    token: self.advance(),
                },
            });
        } else if next.kind != TokenKind::Eof && next.line == self.prev_end_line {
            return Err(self.unexpected("end of statement"));
        }

        Ok(statement)
    }

    /// Operator at the cursor that continues an expression, if any
    fn infix_precedence(&self) -> Option<Precedence> {
        let token = self.current();
        // At top level an expression ends with its line
        if token.depth == 0 && token.line > self.prev_end_line {
            return None;
        }
        let precedence = match token.kind {
            TokenKind::Assign | TokenKind::PlusAssign => Precedence::Assign,
            TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEq
            | TokenKind::GtEq => Precedence::Compare,
            TokenKind::Pipe | TokenKind::Ampersand => Precedence::BitOr,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Star | TokenKind::Slash | TokenKind::DoubleSlash | TokenKind::Percent => {
                Precedence::Product
            }
            TokenKind::DoubleStar => Precedence::Prefix,
            TokenKind::LParen | TokenKind::LBracket | TokenKind::Dot => Precedence::Call,
            TokenKind::Identifier | TokenKind::RuleName => match token.literal.as_str() {
                "or" => Precedence::Or,
                "and" => Precedence::And,
                "in" => Precedence::Compare,
                "not" if self.peek(1).is_keyword("in") => Precedence::Compare,
                _ => return None,
            },
            _ => return None,
        };
        Some(precedence)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression, ParseError> {
        let start = self.current().offset;
        let mut left = self.parse_prefix()?;
        self.capture_expression(&mut left, start);
        while let Some(next) = self.infix_precedence() {
            if next <= precedence {
                break;
            }
            left = self.parse_infix(left, next)?;
            self.capture_expression(&mut left, start);
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expression, ParseError> {
        let token = self.current().clone();
        let kind = match token.kind {
            TokenKind::Identifier | TokenKind::RuleName => {
                if token.literal == "not" {
                    let token = self.advance();
                    let operand = self.parse_expression(Precedence::Not)?;
                    ExpressionKind::Prefix(PrefixExpression {
                        token,
                        operand: Box::new(operand),
                    })
                } else if UNSUPPORTED_KEYWORDS.contains(&token.literal.as_str()) {
                    return Err(ParseError::at(
                        &token,
                        format!("unsupported expression `{}`", token.literal),
                    ));
                } else {
                    ExpressionKind::Identifier(Identifier {
                        token: self.advance(),
                    })
                }
            }
            TokenKind::String(_) => ExpressionKind::String(StringLiteral {
                token: self.advance(),
            }),
            TokenKind::Integer => ExpressionKind::Integer(IntegerLiteral {
                token: self.advance(),
            }),
            TokenKind::Boolean => ExpressionKind::Boolean(BooleanLiteral {
                token: self.advance(),
            }),
            TokenKind::Minus | TokenKind::Plus | TokenKind::Star | TokenKind::DoubleStar => {
                let token = self.advance();
                let operand = self.parse_expression(Precedence::Prefix)?;
                ExpressionKind::Prefix(PrefixExpression {
                    token,
                    operand: Box::new(operand),
                })
            }
            TokenKind::LBracket => {
                let open = self.advance();
                let elements = self.parse_list(&open, TokenKind::RBracket, |p| {
                    p.parse_expression(Precedence::Lowest)
                })?;
                ExpressionKind::Array(ArrayLiteral {
                    token: open,
                    elements,
                })
            }
            TokenKind::LBrace => {
                let open = self.advance();
                let entries =
                    self.parse_list(&open, TokenKind::RBrace, Self::parse_key_value)?;
                ExpressionKind::Map(MapLiteral {
                    token: open,
                    entries,
                })
            }
            TokenKind::LParen => {
                let open = self.advance();
                let elements = self.parse_list(&open, TokenKind::RParen, |p| {
                    p.parse_expression(Precedence::Lowest)
                })?;
                ExpressionKind::Tuple(TupleExpression {
                    token: open,
                    elements,
                })
            }
            TokenKind::Illegal => {
                return Err(ParseError::at(
                    &token,
                    format!("illegal token `{}`", token.literal),
                ));
            }
            _ => return Err(self.unexpected("an expression")),
        };
        Ok(kind.into())
    }

    fn parse_infix(
        &mut self,
        left: Expression,
        precedence: Precedence,
    ) -> Result<Expression, ParseError> {
        let token = self.current().clone();
        let kind = match token.kind {
            TokenKind::LParen => {
                let open = self.advance();
                let arguments = self.parse_list(&open, TokenKind::RParen, |p| {
                    p.parse_expression(Precedence::Lowest)
                })?;
                ExpressionKind::Call(CallExpression {
                    token: open,
                    function: Box::new(left),
                    arguments,
                })
            }
            TokenKind::LBracket => {
                let open = self.advance();
                let index = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::RBracket, "`]`")?;
                ExpressionKind::Index(IndexExpression {
                    token: open,
                    target: Box::new(left),
                    index: Box::new(index),
                })
            }
            _ => {
                let spaced = token.column > self.prev_end_column;
                let mut operator = self.advance();
                if operator.is_keyword("not") {
                    let keyword = self.advance();
                    operator.literal = format!("not {}", keyword.literal);
                }
                if operator.kind == TokenKind::Dot && !self.current().kind.is_word() {
                    return Err(self.unexpected("an attribute name"));
                }
                // Assignment is right associative
                let right_precedence = match precedence {
                    Precedence::Assign => Precedence::Lowest,
                    other => other,
                };
                let right = self.parse_expression(right_precedence)?;
                ExpressionKind::Infix(InfixExpression {
                    token: operator,
                    left: Box::new(left),
                    right: Box::new(right),
                    spaced,
                })
            }
        };
        Ok(kind.into())
    }

    fn parse_key_value(&mut self) -> Result<KeyValueExpression, ParseError> {
        let key = self.parse_expression(Precedence::Lowest)?;
        let token = self.expect(TokenKind::Colon, "`:`")?;
        let value = self.parse_expression(Precedence::Lowest)?;
        Ok(KeyValueExpression {
            token,
            key,
            value,
            comments: Default::default(),
            blank_lines_before: 0,
        })
    }

    /// Parse the items after an already consumed opening delimiter, up to and
    /// including `close`. Comments inside the list are attached to items or
    /// stored on the list.
    fn parse_list<T, F>(
        &mut self,
        open: &Token,
        close: TokenKind,
        mut parse_item: F,
    ) -> Result<DelimitedList<T>, ParseError>
    where
        T: ListItem,
        F: FnMut(&mut Self) -> Result<T, ParseError>,
    {
        let mut list: DelimitedList<T> = DelimitedList::default();
        let mut pending: Option<CommentGroup> = None;
        let mut pending_blank_lines = 0;
        let mut last_end_line = open.line;
        let mut first_content_line: Option<usize> = None;
        let mut expect_item = true;
        let mut trailing_comma = false;

        loop {
            let token = self.current().clone();

            if token.kind == TokenKind::Comment {
                if token.line == self.prev_end_line {
                    let trailing = TrailingComment {
                        gap: token.column.saturating_sub(self.prev_end_column),
                        comment: SingleLineComment {
                            token: self.advance(),
                        },
                    };
                    match list.items.last_mut() {
                        Some(item) => item.comments_mut().trailing = Some(trailing),
                        None => list.opening_comment = Some(trailing),
                    }
                    continue;
                }

                self.advance();
                first_content_line.get_or_insert(token.line);
                let blank_lines = token.line.saturating_sub(last_end_line + 1);
                let group = CommentGroup::from_token(token);
                last_end_line = group.end_line();
                match pending.as_mut() {
                    Some(existing) => existing.merge(group, blank_lines),
                    None => {
                        pending_blank_lines = blank_lines;
                        pending = Some(group);
                    }
                }
                continue;
            }

            if token.kind == close {
                self.advance();
                let blank_lines = token.line.saturating_sub(last_end_line + 1);
                match pending.take() {
                    Some(mut group) => {
                        group.push_blank_lines(blank_lines);
                        list.closing_blank_lines = pending_blank_lines;
                        list.closing_comments = Some(group);
                    }
                    None => list.closing_blank_lines = blank_lines,
                }
                let multiline = match first_content_line {
                    Some(line) => line > open.line,
                    None => token.line > open.line,
                };
                list.layout = ListLayout {
                    multiline,
                    trailing_comma: trailing_comma && !list.items.is_empty(),
                };
                return Ok(list);
            }

            if token.kind == TokenKind::Eof {
                return Err(ParseError::at(
                    open,
                    format!("unclosed `{}`", open.literal),
                ));
            }

            if !expect_item {
                let error = self.unexpected("`,` or a closing delimiter");
                self.errors.push(error);
                self.skip_list_item(open, close);
                expect_item = true;
                continue;
            }

            let start_line = pending
                .as_ref()
                .map(|group| group.token.line)
                .unwrap_or(token.line);
            first_content_line.get_or_insert(start_line);
            let blank_lines = match pending.as_mut() {
                Some(group) => {
                    group.push_blank_lines(token.line.saturating_sub(last_end_line + 1));
                    pending_blank_lines
                }
                None => start_line.saturating_sub(last_end_line + 1),
            };

            match parse_item(self) {
                Ok(mut item) => {
                    item.comments_mut().leading = pending.take();
                    item.set_blank_lines_before(blank_lines);
                    list.items.push(item);
                    last_end_line = self.prev_end_line;
                    if self.current().kind == TokenKind::Comma {
                        self.advance();
                        expect_item = true;
                        trailing_comma = true;
                    } else {
                        expect_item = false;
                        trailing_comma = false;
                    }
                }
                Err(error) => {
                    self.errors.push(error);
                    pending = None;
                    self.skip_list_item(open, close);
                    last_end_line = self.prev_end_line;
                    expect_item = true;
                }
            }
        }
    }

    /// Skip past the next comma of this list, stopping before its closing delimiter
    fn skip_list_item(&mut self, open: &Token, close: TokenKind) {
        let item_depth = open.depth + 1;
        while !self.at_eof() {
            let token = self.current();
            if token.kind == close && token.depth == open.depth {
                return;
            }
            if token.kind == TokenKind::Comma && token.depth == item_depth {
                self.advance();
                return;
            }
            self.advance();
        }
    }
}
