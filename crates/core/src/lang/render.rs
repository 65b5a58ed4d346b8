//! Line rendering for syntax tree nodes
//!
//! Expressions render their first line without indentation (the caller owns
//! the prefix) and every continuation line with absolute indentation.
//! Statements render fully indented.
//!
//! Nodes read by [`parse_source`](super::parse_source) print their original
//! text while their rendering is unchanged, so only edited nodes take the
//! canonical layout.

use super::ast::{
    CommentGroup, DelimitedList, Expression, ExpressionKind, ExpressionList, KeyValueExpression,
    ListItem, ListLayout, Root, SingleLineComment, Statement, TrailingComment,
};

/// One level of indentation
pub const INDENT: &str = "    ";

/// Inline lists wider than this are laid out one item per line
pub const MAX_WIDTH: usize = 80;

pub fn indent(depth: usize) -> String {
    INDENT.repeat(depth)
}

/// Deterministic rendering of a node at a nesting depth
pub trait Render {
    fn render(&self, depth: usize) -> Vec<String>;

    fn render_string(&self, depth: usize) -> String {
        self.render(depth).join("\n")
    }
}

/// Append `sep` and the first tail line to the last head line
fn concat(mut head: Vec<String>, sep: &str, tail: Vec<String>) -> Vec<String> {
    let mut tail = tail.into_iter();
    match (head.last_mut(), tail.next()) {
        (Some(last), Some(first)) => {
            last.push_str(sep);
            last.push_str(&first);
        }
        (Some(last), None) => last.push_str(sep),
        (None, Some(first)) => head.push(format!("{sep}{first}")),
        (None, None) => head.push(sep.to_string()),
    }
    head.extend(tail);
    head
}

fn push_trailing(lines: &mut [String], trailing: &TrailingComment) {
    if let Some(last) = lines.last_mut() {
        last.push_str(&" ".repeat(trailing.gap));
        last.push_str(trailing.comment.literal());
    }
}

/// Comment lines, each indented to `depth`
fn comment_lines(group: &CommentGroup, depth: usize) -> Vec<String> {
    let prefix = indent(depth);
    group
        .comments
        .iter()
        .map(|c| match c.literal() {
            "" => String::new(),
            literal => format!("{prefix}{literal}"),
        })
        .collect()
}

impl Render for SingleLineComment {
    fn render(&self, _depth: usize) -> Vec<String> {
        vec![self.literal().to_string()]
    }
}

impl Render for CommentGroup {
    fn render(&self, depth: usize) -> Vec<String> {
        let mut lines = comment_lines(self, depth);
        if let Some(first) = lines.first_mut() {
            *first = first.trim_start().to_string();
        }
        lines
    }
}

impl Render for Expression {
    fn render(&self, depth: usize) -> Vec<String> {
        let lines = render_kind(&self.kind, depth);
        match &self.source {
            Some(source) if source.is_current(&lines) => vec![source.text.clone()],
            _ => lines,
        }
    }
}

fn render_kind(kind: &ExpressionKind, depth: usize) -> Vec<String> {
    match kind {
        ExpressionKind::Identifier(node) => vec![node.name().to_string()],
        ExpressionKind::String(node) => vec![node.token.literal.clone()],
        ExpressionKind::Integer(node) => vec![node.token.literal.clone()],
        ExpressionKind::Boolean(node) => vec![node.token.literal.clone()],
        ExpressionKind::Array(node) => render_list("[", "]", &node.elements, depth),
        ExpressionKind::Map(node) => render_list("{", "}", &node.entries, depth),
        ExpressionKind::Tuple(node) => render_list("(", ")", &node.elements, depth),
        ExpressionKind::Call(node) => concat(
            node.function.render(depth),
            "",
            render_list("(", ")", &node.arguments, depth),
        ),
        ExpressionKind::Index(node) => {
            let lines = concat(node.target.render(depth), "[", node.index.render(depth));
            concat(lines, "]", Vec::new())
        }
        ExpressionKind::Infix(node) => {
            let sep = if node.spaced {
                format!(" {} ", node.operator())
            } else {
                node.operator().to_string()
            };
            concat(node.left.render(depth), &sep, node.right.render(depth))
        }
        ExpressionKind::Prefix(node) => {
            let op = node.operator();
            let sep = if op.chars().all(|c| c.is_alphabetic()) {
                " "
            } else {
                ""
            };
            concat(vec![op.to_string()], sep, node.operand.render(depth))
        }
    }
}

impl Render for KeyValueExpression {
    fn render(&self, depth: usize) -> Vec<String> {
        concat(self.key.render(depth), ": ", self.value.render(depth))
    }
}

fn render_list<T: Render + ListItem>(
    open: &str,
    close: &str,
    list: &DelimitedList<T>,
    depth: usize,
) -> Vec<String> {
    if !list.is_multiline() {
        let mut lines = vec![open.to_string()];
        for (idx, item) in list.items.iter().enumerate() {
            let sep = if idx == 0 { "" } else { ", " };
            lines = concat(lines, sep, item.render(depth));
        }
        if list.layout.trailing_comma && !list.items.is_empty() {
            lines = concat(lines, ",", Vec::new());
        }
        return concat(lines, close, Vec::new());
    }

    let mut lines = vec![open.to_string()];
    if let Some(opening) = &list.opening_comment {
        push_trailing(&mut lines, opening);
    }

    let inner = indent(depth + 1);
    let count = list.items.len();
    for (idx, item) in list.items.iter().enumerate() {
        lines.extend(std::iter::repeat_n(String::new(), item.blank_lines_before()));
        if let Some(leading) = &item.comments().leading {
            lines.extend(comment_lines(leading, depth + 1));
        }

        let mut item_lines = item.render(depth + 1);
        if let Some(first) = item_lines.first_mut() {
            first.insert_str(0, &inner);
        }
        let is_last = idx + 1 == count;
        if (!is_last || list.layout.trailing_comma || !list.layout.multiline)
            && let Some(last) = item_lines.last_mut()
        {
            last.push(',');
        }
        if let Some(trailing) = &item.comments().trailing {
            push_trailing(&mut item_lines, trailing);
        }
        lines.extend(item_lines);
    }

    lines.extend(std::iter::repeat_n(String::new(), list.closing_blank_lines));
    if let Some(closing) = &list.closing_comments {
        lines.extend(comment_lines(closing, depth + 1));
    }
    lines.push(format!("{}{close}", indent(depth)));
    lines
}

/// Layout for a list that was built or mutated in memory.
///
/// One item per line when any item carries comments or spans several lines,
/// when a rule call has more than one argument, or when the inline form
/// starting at column `prefix_width` would not fit in [`MAX_WIDTH`].
pub fn choose_layout<T: Render + ListItem>(
    list: &DelimitedList<T>,
    depth: usize,
    prefix_width: usize,
    rule_arguments: bool,
) -> ListLayout {
    let has_comments = list.opening_comment.is_some()
        || list.closing_comments.is_some()
        || list.items.iter().any(|item| !item.comments().is_empty());
    let rendered: Vec<Vec<String>> = list.items.iter().map(|item| item.render(depth)).collect();
    let spans_lines = rendered.iter().any(|lines| lines.len() > 1);
    let inline_width = prefix_width
        + 2
        + rendered.iter().map(|lines| lines.concat().chars().count()).sum::<usize>()
        + 2 * list.items.len().saturating_sub(1);

    if has_comments
        || spans_lines
        || (rule_arguments && list.items.len() > 1)
        || inline_width > MAX_WIDTH
    {
        ListLayout::multiline()
    } else {
        ListLayout::inline()
    }
}

/// Apply [`choose_layout`] to a rule call's argument list and to every array
/// among its keyword values
pub fn relayout_rule_arguments(arguments: &mut ExpressionList) {
    for argument in &mut arguments.items {
        if let ExpressionKind::Infix(infix) = &mut argument.kind
            && let ExpressionKind::Array(array) = &mut infix.right.kind
        {
            let prefix = INDENT.len() + infix.left.render_string(1).len() + 3;
            array.elements.layout = choose_layout(&array.elements, 1, prefix, false);
        }
    }
    arguments.layout = choose_layout(arguments, 0, 0, true);
    if arguments.layout.multiline {
        for argument in &mut arguments.items {
            argument.blank_lines_before = 0;
        }
    }
}

impl Render for Statement {
    fn render(&self, depth: usize) -> Vec<String> {
        match self {
            Statement::Expression(stmt) => {
                let mut lines = stmt
                    .comments
                    .leading
                    .as_ref()
                    .map(|group| comment_lines(group, depth))
                    .unwrap_or_default();
                let mut body = stmt.expression.render(depth);
                if let Some(first) = body.first_mut() {
                    first.insert_str(0, &indent(depth));
                }
                if let Some(trailing) = &stmt.comments.trailing {
                    push_trailing(&mut body, trailing);
                }
                lines.extend(body);
                lines
            }
            Statement::Comment(stmt) => comment_lines(&stmt.group, depth),
        }
    }
}

impl Root {
    /// Render the whole file
    pub fn to_source(&self) -> String {
        let newline = self.line_ending.as_str();
        let mut source = String::new();
        for (idx, statement) in self.statements.iter().enumerate() {
            let newlines = usize::from(idx > 0) + statement.blank_lines_before();
            match statement.source() {
                Some(text) if text.newlines_before() == newlines => source.push_str(&text.before),
                _ => source.push_str(&newline.repeat(newlines)),
            }

            let lines = statement.render(0);
            match statement.source() {
                Some(text) if text.is_current(&lines) => source.push_str(&text.text),
                _ => source.push_str(&lines.join(newline)),
            }
        }

        match &self.trailing_text {
            Some(text)
                if text.trim().is_empty() && text.matches('\n').count() == self.trailing_newlines =>
            {
                source.push_str(text)
            }
            _ => source.push_str(&newline.repeat(self.trailing_newlines)),
        }
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ast::{
        ArrayLiteral, CallExpression, ExpressionStatement, Identifier, InfixExpression,
        StringLiteral,
    };
    use crate::lang::token::TokenKind;

    fn string(value: &str) -> Expression {
        ExpressionKind::String(StringLiteral::new(value)).into()
    }

    fn kwarg(key: &str, value: Expression) -> Expression {
        ExpressionKind::Infix(InfixExpression::new(
            TokenKind::Assign,
            "=",
            ExpressionKind::Identifier(Identifier::new(key)).into(),
            value,
        ))
        .into()
    }

    fn array(values: &[&str], layout: ListLayout) -> Expression {
        let items = values.iter().map(|v| string(v)).collect();
        ExpressionKind::Array(ArrayLiteral::new(DelimitedList::new(items, layout))).into()
    }

    #[test]
    fn test_inline_array() {
        let expr = array(&["a", "b"], ListLayout::inline());
        assert_eq!(expr.render(0), vec![r#"["a", "b"]"#]);
    }

    #[test]
    fn test_multiline_array_nested_in_call() {
        let call = CallExpression::new(
            "ts_library",
            DelimitedList::new(
                vec![
                    kwarg("name", string("lib")),
                    kwarg("deps", array(&[":a", ":b"], ListLayout::multiline())),
                ],
                ListLayout::multiline(),
            ),
        );
        let expr: Expression = ExpressionKind::Call(call).into();
        assert_eq!(
            expr.render_string(0),
            "ts_library(\n    name = \"lib\",\n    deps = [\n        \":a\",\n        \":b\",\n    ],\n)"
        );
    }

    #[test]
    fn test_item_comments_force_multiline() {
        let mut first = string(":a");
        first.comments.trailing = Some(TrailingComment::new("keep"));
        let list = DelimitedList::new(vec![first, string(":b")], ListLayout::inline());
        let expr: Expression = ExpressionKind::Array(ArrayLiteral::new(list)).into();
        assert_eq!(
            expr.render(0),
            vec!["[", "    \":a\",  # keep", "    \":b\",", "]"]
        );
    }

    #[test]
    fn test_choose_layout_rules() {
        let short = DelimitedList::new(vec![string(":a"), string(":b")], ListLayout::inline());
        assert!(!choose_layout(&short, 1, 11, false).multiline);
        assert!(choose_layout(&short, 0, 0, true).multiline);

        let long_value = "x".repeat(90);
        let wide = DelimitedList::new(vec![string(&long_value)], ListLayout::inline());
        assert!(choose_layout(&wide, 1, 11, false).multiline);
    }

    #[test]
    fn test_statement_comments() {
        let mut stmt = ExpressionStatement::new(kwarg("x", string("y")));
        stmt.comments.leading = Some(CommentGroup::from_text("first\nsecond"));
        stmt.comments.trailing = Some(TrailingComment::new("tail"));
        let root = Root::new(vec![Statement::Expression(stmt)]);
        assert_eq!(root.to_source(), "# first\n# second\nx = \"y\"  # tail\n");
    }
}
