//! Syntax tree for BUILD files
//!
//! Nodes own their children (the tree never shares a node between two
//! parents) and remember enough layout to render the source back exactly.

use super::token::{StringFlavor, Token, TokenKind};

/// Text a parsed node was read from.
///
/// The text is printed back instead of the node's rendering for as long as
/// the node still renders the way it did when it was parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    /// Whitespace between the previous node and this one
    pub before: String,
    pub text: String,
    digest: String,
}

impl SourceText {
    pub fn new(before: &str, text: &str, rendered: &[String]) -> Self {
        Self {
            before: before.to_string(),
            text: text.to_string(),
            digest: digest(rendered),
        }
    }

    /// Whether `rendered` is still the rendering the text was captured with
    pub fn is_current(&self, rendered: &[String]) -> bool {
        self.digest == digest(rendered)
    }

    /// Line breaks in the whitespace before the node
    pub fn newlines_before(&self) -> usize {
        self.before.matches('\n').count()
    }
}

fn digest(rendered: &[String]) -> String {
    format!("{:x}", md5::compute(rendered.join("\n").as_bytes()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// `CrLf` when the text uses `\r\n` line breaks
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A parsed BUILD file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    pub statements: Vec<Statement>,
    /// Newlines after the last statement
    pub trailing_newlines: usize,
    /// Whitespace after the last statement, as read
    pub trailing_text: Option<String>,
    pub line_ending: LineEnding,
}

impl Root {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            trailing_newlines: 1,
            trailing_text: None,
            line_ending: LineEnding::Lf,
        }
    }

    /// Top-level call expressions with their statement index
    pub fn calls(&self) -> impl Iterator<Item = (usize, &CallExpression)> {
        self.statements
            .iter()
            .enumerate()
            .filter_map(|(idx, stmt)| stmt.as_call().map(|call| (idx, call)))
    }

    /// First top-level call to `function`
    pub fn find_call(&self, function: &str) -> Option<(usize, &CallExpression)> {
        self.calls()
            .find(|(_, call)| call.function_name() == Some(function))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(ExpressionStatement),
    Comment(CommentStatement),
}

impl Statement {
    pub fn blank_lines_before(&self) -> usize {
        match self {
            Statement::Expression(stmt) => stmt.blank_lines_before,
            Statement::Comment(stmt) => stmt.blank_lines_before,
        }
    }

    pub fn set_blank_lines_before(&mut self, count: usize) {
        match self {
            Statement::Expression(stmt) => stmt.blank_lines_before = count,
            Statement::Comment(stmt) => stmt.blank_lines_before = count,
        }
    }

    pub fn as_call(&self) -> Option<&CallExpression> {
        match self {
            Statement::Expression(stmt) => stmt.expression.as_call(),
            Statement::Comment(_) => None,
        }
    }

    pub fn as_call_mut(&mut self) -> Option<&mut CallExpression> {
        match self {
            Statement::Expression(stmt) => stmt.expression.as_call_mut(),
            Statement::Comment(_) => None,
        }
    }

    pub fn source(&self) -> Option<&SourceText> {
        match self {
            Statement::Expression(stmt) => stmt.source.as_ref(),
            Statement::Comment(stmt) => stmt.source.as_ref(),
        }
    }

    /// Drop the captured source text so the statement renders canonically
    pub fn forget_source(&mut self) {
        match self {
            Statement::Expression(stmt) => {
                stmt.source = None;
                stmt.expression.forget_source();
            }
            Statement::Comment(stmt) => stmt.source = None,
        }
    }

    /// The comment block written directly above the statement, standalone or attached
    pub fn heading_comment(&self) -> Option<&CommentGroup> {
        match self {
            Statement::Expression(stmt) => stmt.comments.leading.as_ref(),
            Statement::Comment(stmt) => Some(&stmt.group),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub token: Token,
    pub expression: Expression,
    pub comments: CommentMap,
    pub blank_lines_before: usize,
    pub source: Option<SourceText>,
}

impl ExpressionStatement {
    pub fn new(expression: Expression) -> Self {
        Self {
            token: Token::synthetic(TokenKind::Identifier, ""),
            expression,
            comments: CommentMap::default(),
            blank_lines_before: 0,
            source: None,
        }
    }
}

/// A comment block not attached to any statement
#[derive(Debug, Clone, PartialEq)]
pub struct CommentStatement {
    pub token: Token,
    pub group: CommentGroup,
    pub blank_lines_before: usize,
    pub source: Option<SourceText>,
}

/// One `# ...` line; an empty literal stands for a blank line inside a group
#[derive(Debug, Clone, PartialEq)]
pub struct SingleLineComment {
    pub token: Token,
}

impl SingleLineComment {
    /// Build a comment from its text, adding the `#` marker
    pub fn new(text: &str) -> Self {
        let literal = if text.is_empty() {
            "#".to_string()
        } else {
            format!("# {text}")
        };
        Self {
            token: Token::synthetic(TokenKind::Comment, literal),
        }
    }

    pub fn literal(&self) -> &str {
        &self.token.literal
    }

    /// Text without the `#` marker and its following space
    pub fn text(&self) -> &str {
        let body = self.token.literal.trim_start_matches('#');
        body.strip_prefix(' ').unwrap_or(body)
    }
}

/// Consecutive comment lines treated as one unit
#[derive(Debug, Clone, PartialEq)]
pub struct CommentGroup {
    pub token: Token,
    pub comments: Vec<SingleLineComment>,
}

impl CommentGroup {
    /// Split a lexed comment token into its lines
    pub fn from_token(token: Token) -> Self {
        let comments = token
            .literal
            .split('\n')
            .enumerate()
            .map(|(offset, line)| SingleLineComment {
                token: Token::new(
                    TokenKind::Comment,
                    line,
                    token.depth,
                    token.line + offset,
                    token.column,
                ),
            })
            .collect();
        Self { token, comments }
    }

    /// Append another group, keeping `blank_lines` empty lines between the two
    pub fn merge(&mut self, other: CommentGroup, blank_lines: usize) {
        self.push_blank_lines(blank_lines);
        self.token.literal.push('\n');
        self.token.literal.push_str(&other.token.literal);
        self.token.end_offset = other.token.end_offset;
        self.comments.extend(other.comments);
    }

    /// Record blank lines after the last comment
    pub fn push_blank_lines(&mut self, count: usize) {
        for _ in 0..count {
            let line = self.token.end_line() + 1;
            self.token.literal.push('\n');
            self.comments.push(SingleLineComment {
                token: Token::new(TokenKind::Comment, "", self.token.depth, line, 1),
            });
        }
    }

    /// Build a group from plain text, one comment per line
    pub fn from_text(text: &str) -> Self {
        let comments: Vec<_> = text.lines().map(SingleLineComment::new).collect();
        let literal = comments
            .iter()
            .map(|c| c.literal())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            token: Token::synthetic(TokenKind::Comment, literal),
            comments,
        }
    }

    /// Line the group ends on
    pub fn end_line(&self) -> usize {
        self.token.end_line()
    }

    /// The group's text with markers removed, one entry per line
    pub fn text_lines(&self) -> Vec<&str> {
        self.comments.iter().map(|c| c.text()).collect()
    }

    /// Compare against heading text, ignoring trailing whitespace per line
    pub fn matches_text(&self, text: &str) -> bool {
        let ours = self.text_lines();
        let theirs: Vec<_> = text.lines().collect();
        ours.len() == theirs.len()
            && ours
                .iter()
                .zip(theirs.iter())
                .all(|(a, b)| a.trim_end() == b.trim_end())
    }
}

/// A comment on the same line after a node
#[derive(Debug, Clone, PartialEq)]
pub struct TrailingComment {
    pub comment: SingleLineComment,
    /// Spaces between the node and `#`
    pub gap: usize,
}

impl TrailingComment {
    pub fn new(text: &str) -> Self {
        Self {
            comment: SingleLineComment::new(text),
            gap: 2,
        }
    }
}

/// Comments owned by a statement or expression
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentMap {
    pub leading: Option<CommentGroup>,
    pub trailing: Option<TrailingComment>,
}

impl CommentMap {
    pub fn is_empty(&self) -> bool {
        self.leading.is_none() && self.trailing.is_none()
    }
}

/// An expression plus the comments and blank lines around it
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub comments: CommentMap,
    /// Blank lines above the expression inside a multi-line list
    pub blank_lines_before: usize,
    /// Kept for expressions written on a single line
    pub source: Option<SourceText>,
}

impl From<ExpressionKind> for Expression {
    fn from(kind: ExpressionKind) -> Self {
        Self {
            kind,
            comments: CommentMap::default(),
            blank_lines_before: 0,
            source: None,
        }
    }
}

impl Expression {
    /// Drop the captured source text of the expression and everything below it
    pub fn forget_source(&mut self) {
        self.source = None;
        match &mut self.kind {
            ExpressionKind::Identifier(_)
            | ExpressionKind::String(_)
            | ExpressionKind::Integer(_)
            | ExpressionKind::Boolean(_) => {}
            ExpressionKind::Array(node) => {
                node.elements.items.iter_mut().for_each(Self::forget_source)
            }
            ExpressionKind::Tuple(node) => {
                node.elements.items.iter_mut().for_each(Self::forget_source)
            }
            ExpressionKind::Map(node) => {
                for entry in &mut node.entries.items {
                    entry.key.forget_source();
                    entry.value.forget_source();
                }
            }
            ExpressionKind::Call(node) => {
                node.function.forget_source();
                node.arguments.items.iter_mut().for_each(Self::forget_source);
            }
            ExpressionKind::Index(node) => {
                node.target.forget_source();
                node.index.forget_source();
            }
            ExpressionKind::Infix(node) => {
                node.left.forget_source();
                node.right.forget_source();
            }
            ExpressionKind::Prefix(node) => node.operand.forget_source(),
        }
    }

    pub fn token(&self) -> &Token {
        match &self.kind {
            ExpressionKind::Identifier(node) => &node.token,
            ExpressionKind::String(node) => &node.token,
            ExpressionKind::Integer(node) => &node.token,
            ExpressionKind::Boolean(node) => &node.token,
            ExpressionKind::Array(node) => &node.token,
            ExpressionKind::Map(node) => &node.token,
            ExpressionKind::Tuple(node) => &node.token,
            ExpressionKind::Call(node) => &node.token,
            ExpressionKind::Index(node) => &node.token,
            ExpressionKind::Infix(node) => &node.token,
            ExpressionKind::Prefix(node) => &node.token,
        }
    }

    /// Short human name of the variant, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExpressionKind::Identifier(_) => "identifier",
            ExpressionKind::String(_) => "string",
            ExpressionKind::Integer(_) => "integer",
            ExpressionKind::Boolean(_) => "boolean",
            ExpressionKind::Array(_) => "array",
            ExpressionKind::Map(_) => "map",
            ExpressionKind::Tuple(_) => "tuple",
            ExpressionKind::Call(_) => "call",
            ExpressionKind::Index(_) => "index",
            ExpressionKind::Infix(_) => "infix",
            ExpressionKind::Prefix(_) => "prefix",
        }
    }

    pub fn as_call(&self) -> Option<&CallExpression> {
        match &self.kind {
            ExpressionKind::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_call_mut(&mut self) -> Option<&mut CallExpression> {
        match &mut self.kind {
            ExpressionKind::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&StringLiteral> {
        match &self.kind {
            ExpressionKind::String(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayLiteral> {
        match &self.kind {
            ExpressionKind::Array(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExpressionKind::Identifier(node) => Some(node.name()),
            _ => None,
        }
    }

    /// `key = value` keyword argument parts
    pub fn as_keyword_argument(&self) -> Option<(&str, &Expression)> {
        match &self.kind {
            ExpressionKind::Infix(infix) if infix.operator() == "=" => {
                infix.left.as_identifier().map(|key| (key, infix.right.as_ref()))
            }
            _ => None,
        }
    }

    pub fn as_keyword_argument_mut(&mut self) -> Option<(&str, &mut Expression)> {
        match &mut self.kind {
            ExpressionKind::Infix(infix) if infix.token.literal == "=" => {
                let InfixExpression { left, right, .. } = infix;
                match &left.kind {
                    ExpressionKind::Identifier(ident) => Some((ident.name(), right.as_mut())),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Identifier(Identifier),
    String(StringLiteral),
    Integer(IntegerLiteral),
    Boolean(BooleanLiteral),
    Array(ArrayLiteral),
    Map(MapLiteral),
    Tuple(TupleExpression),
    Call(CallExpression),
    Index(IndexExpression),
    Infix(InfixExpression),
    Prefix(PrefixExpression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
}

impl Identifier {
    pub fn new(name: &str) -> Self {
        Self {
            token: Token::synthetic(TokenKind::Identifier, name),
        }
    }

    pub fn name(&self) -> &str {
        &self.token.literal
    }
}

/// A string literal, quotes and prefix included in the token
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub token: Token,
}

impl StringLiteral {
    /// Double-quoted plain string for `value`
    pub fn new(value: &str) -> Self {
        let mut literal = String::with_capacity(value.len() + 2);
        literal.push('"');
        for c in value.chars() {
            match c {
                '"' => literal.push_str("\\\""),
                '\\' => literal.push_str("\\\\"),
                '\n' => literal.push_str("\\n"),
                '\t' => literal.push_str("\\t"),
                other => literal.push(other),
            }
        }
        literal.push('"');
        Self {
            token: Token::synthetic(TokenKind::String(StringFlavor::Plain), literal),
        }
    }

    pub fn flavor(&self) -> StringFlavor {
        match self.token.kind {
            TokenKind::String(flavor) => flavor,
            _ => StringFlavor::Plain,
        }
    }

    /// Unquoted value with simple escapes resolved
    pub fn value(&self) -> String {
        let literal = self.token.literal.as_str();
        let body = literal.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        let quote_len = if body.starts_with("\"\"\"") || body.starts_with("'''") {
            3
        } else {
            1
        };
        if body.len() < quote_len * 2 {
            return String::new();
        }
        let inner = &body[quote_len..body.len() - quote_len];
        if self.flavor().is_raw() {
            return inner.to_string();
        }

        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                value.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('\n') => {}
                Some(other @ ('\\' | '"' | '\'')) => value.push(other),
                Some(other) => {
                    value.push('\\');
                    value.push(other);
                }
                None => value.push('\\'),
            }
        }
        value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub token: Token,
}

impl IntegerLiteral {
    pub fn new(value: i64) -> Self {
        Self {
            token: Token::synthetic(TokenKind::Integer, value.to_string()),
        }
    }

    pub fn value(&self) -> Option<i64> {
        let literal = self.token.literal.replace('_', "");
        let lower = literal.to_ascii_lowercase();
        if let Some(hex) = lower.strip_prefix("0x") {
            i64::from_str_radix(hex, 16).ok()
        } else if let Some(oct) = lower.strip_prefix("0o") {
            i64::from_str_radix(oct, 8).ok()
        } else if let Some(bin) = lower.strip_prefix("0b") {
            i64::from_str_radix(bin, 2).ok()
        } else {
            lower.parse().ok()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub token: Token,
}

impl BooleanLiteral {
    pub fn new(value: bool) -> Self {
        let literal = if value { "True" } else { "False" };
        Self {
            token: Token::synthetic(TokenKind::Boolean, literal),
        }
    }

    pub fn value(&self) -> bool {
        self.token.literal == "True"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub token: Token,
    pub elements: ExpressionList,
}

impl ArrayLiteral {
    pub fn new(elements: ExpressionList) -> Self {
        Self {
            token: Token::synthetic(TokenKind::LBracket, "["),
            elements,
        }
    }

    /// Values of the string elements, in order
    pub fn string_values(&self) -> Vec<String> {
        self.elements
            .items
            .iter()
            .filter_map(|e| e.as_string().map(|s| s.value()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLiteral {
    pub token: Token,
    pub entries: KeyValueExpressionList,
}

/// Parenthesised expression or tuple
#[derive(Debug, Clone, PartialEq)]
pub struct TupleExpression {
    pub token: Token,
    pub elements: ExpressionList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub token: Token,
    pub function: Box<Expression>,
    pub arguments: ExpressionList,
}

impl CallExpression {
    pub fn new(function: &str, arguments: ExpressionList) -> Self {
        Self {
            token: Token::synthetic(TokenKind::LParen, "("),
            function: Box::new(ExpressionKind::Identifier(Identifier::new(function)).into()),
            arguments,
        }
    }

    /// Name of a plain `name(...)` or dotted `a.b(...)` call
    pub fn function_name(&self) -> Option<&str> {
        match &self.function.kind {
            ExpressionKind::Identifier(ident) => Some(ident.name()),
            ExpressionKind::Infix(infix) if infix.operator() == "." => {
                infix.right.as_identifier()
            }
            _ => None,
        }
    }

    /// Keyword arguments as `(position, key, value)`
    pub fn keyword_arguments(&self) -> impl Iterator<Item = (usize, &str, &Expression)> {
        self.arguments
            .items
            .iter()
            .enumerate()
            .filter_map(|(idx, arg)| arg.as_keyword_argument().map(|(k, v)| (idx, k, v)))
    }

    pub fn keyword_argument(&self, key: &str) -> Option<&Expression> {
        self.keyword_arguments()
            .find(|(_, k, _)| *k == key)
            .map(|(_, _, v)| v)
    }

    pub fn positional_arguments(&self) -> impl Iterator<Item = &Expression> {
        self.arguments
            .items
            .iter()
            .filter(|arg| arg.as_keyword_argument().is_none())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub token: Token,
    pub target: Box<Expression>,
    pub index: Box<Expression>,
}

/// Binary operation; `=` for keyword arguments/assignments and `.` for attribute access
#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    pub token: Token,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    /// Whether the operator is surrounded by spaces
    pub spaced: bool,
}

impl InfixExpression {
    pub fn new(operator: TokenKind, literal: &str, left: Expression, right: Expression) -> Self {
        Self {
            token: Token::synthetic(operator, literal),
            left: Box::new(left),
            right: Box::new(right),
            spaced: literal != ".",
        }
    }

    pub fn operator(&self) -> &str {
        &self.token.literal
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub token: Token,
    pub operand: Box<Expression>,
}

impl PrefixExpression {
    pub fn operator(&self) -> &str {
        &self.token.literal
    }
}

/// `key: value` entry of a map literal
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueExpression {
    pub token: Token,
    pub key: Expression,
    pub value: Expression,
    pub comments: CommentMap,
    pub blank_lines_before: usize,
}

/// How a delimited list is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListLayout {
    /// One item per line
    pub multiline: bool,
    /// A comma follows the last item
    pub trailing_comma: bool,
}

impl ListLayout {
    pub fn inline() -> Self {
        Self {
            multiline: false,
            trailing_comma: false,
        }
    }

    pub fn multiline() -> Self {
        Self {
            multiline: true,
            trailing_comma: true,
        }
    }
}

/// Items of a list that can carry comments and blank lines
pub trait ListItem {
    fn comments(&self) -> &CommentMap;
    fn comments_mut(&mut self) -> &mut CommentMap;
    fn blank_lines_before(&self) -> usize;
    fn set_blank_lines_before(&mut self, count: usize);
}

impl ListItem for Expression {
    fn comments(&self) -> &CommentMap {
        &self.comments
    }

    fn comments_mut(&mut self) -> &mut CommentMap {
        &mut self.comments
    }

    fn blank_lines_before(&self) -> usize {
        self.blank_lines_before
    }

    fn set_blank_lines_before(&mut self, count: usize) {
        self.blank_lines_before = count;
    }
}

impl ListItem for KeyValueExpression {
    fn comments(&self) -> &CommentMap {
        &self.comments
    }

    fn comments_mut(&mut self) -> &mut CommentMap {
        &mut self.comments
    }

    fn blank_lines_before(&self) -> usize {
        self.blank_lines_before
    }

    fn set_blank_lines_before(&mut self, count: usize) {
        self.blank_lines_before = count;
    }
}

/// Items between a pair of delimiters
#[derive(Debug, Clone, PartialEq)]
pub struct DelimitedList<T> {
    pub items: Vec<T>,
    pub layout: ListLayout,
    /// Comment on the line of the opening delimiter
    pub opening_comment: Option<TrailingComment>,
    /// Comments between the last item and the closing delimiter
    pub closing_comments: Option<CommentGroup>,
    /// Blank lines before the closing comments or delimiter
    pub closing_blank_lines: usize,
}

impl<T> Default for DelimitedList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            layout: ListLayout::default(),
            opening_comment: None,
            closing_comments: None,
            closing_blank_lines: 0,
        }
    }
}

impl<T: ListItem> DelimitedList<T> {
    pub fn new(items: Vec<T>, layout: ListLayout) -> Self {
        Self {
            items,
            layout,
            opening_comment: None,
            closing_comments: None,
            closing_blank_lines: 0,
        }
    }

    /// Whether the list must be rendered one item per line
    pub fn is_multiline(&self) -> bool {
        self.layout.multiline
            || self.opening_comment.is_some()
            || self.closing_comments.is_some()
            || self.items.iter().any(|item| !item.comments().is_empty())
    }
}

pub type ExpressionList = DelimitedList<Expression>;
pub type KeyValueExpressionList = DelimitedList<KeyValueExpression>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal_round_trip_value() {
        let lit = StringLiteral::new("a \"quoted\" \\ path");
        assert_eq!(lit.token.literal, r#""a \"quoted\" \\ path""#);
        assert_eq!(lit.value(), "a \"quoted\" \\ path");
    }

    #[test]
    fn test_string_literal_value_variants() {
        let raw = StringLiteral {
            token: Token::synthetic(TokenKind::String(StringFlavor::Raw), r#"r"a\d""#),
        };
        assert_eq!(raw.value(), r"a\d");

        let single = StringLiteral {
            token: Token::synthetic(TokenKind::String(StringFlavor::Plain), "'x'"),
        };
        assert_eq!(single.value(), "x");

        let triple = StringLiteral {
            token: Token::synthetic(
                TokenKind::String(StringFlavor::Plain),
                "\"\"\"doc\nstring\"\"\"",
            ),
        };
        assert_eq!(triple.value(), "doc\nstring");
    }

    #[test]
    fn test_integer_literal_radix() {
        let hex = IntegerLiteral {
            token: Token::synthetic(TokenKind::Integer, "0x1F"),
        };
        assert_eq!(hex.value(), Some(31));
        assert_eq!(IntegerLiteral::new(1_000).value(), Some(1000));
    }

    #[test]
    fn test_comment_group_matches_text() {
        let group = CommentGroup::from_text("Generated file\n\nDo not edit");
        assert_eq!(group.text_lines(), vec!["Generated file", "", "Do not edit"]);
        assert!(group.matches_text("Generated file\n\nDo not edit"));
        assert!(!group.matches_text("Generated file"));
    }

    #[test]
    fn test_keyword_argument_accessors() {
        let kwarg: Expression = ExpressionKind::Infix(InfixExpression::new(
            TokenKind::Assign,
            "=",
            ExpressionKind::Identifier(Identifier::new("name")).into(),
            ExpressionKind::String(StringLiteral::new("lib")).into(),
        ))
        .into();
        let (key, value) = kwarg.as_keyword_argument().unwrap();
        assert_eq!(key, "name");
        assert_eq!(value.as_string().unwrap().value(), "lib");
    }
}
