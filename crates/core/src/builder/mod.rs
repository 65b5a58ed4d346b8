//! Synthesis of new syntax: literals, keyword arguments, globs, whole rules and files

pub mod target_name;

use tracing::debug;

use crate::config::{Config, Field, FieldType, ManagedSchema, RuleTemplate, SrcsMode};
use crate::lang::render::{choose_layout, relayout_rule_arguments};
use crate::lang::{
    ArrayLiteral, BooleanLiteral, CallExpression, CommentGroup, CommentStatement, DelimitedList,
    Expression, ExpressionKind, ExpressionStatement, Identifier, InfixExpression, IntegerLiteral,
    ListLayout, Root, Statement, StringLiteral, Token, TokenKind,
};
use crate::patterns::FileRole;
use crate::qualifier::{FieldValue, GlobValue, TargetFile};

pub use target_name::format_target_name;

pub fn string_literal(value: &str) -> Expression {
    ExpressionKind::String(StringLiteral::new(value)).into()
}

pub fn identifier(name: &str) -> Expression {
    ExpressionKind::Identifier(Identifier::new(name)).into()
}

pub fn bool_literal(value: bool) -> Expression {
    ExpressionKind::Boolean(BooleanLiteral::new(value)).into()
}

pub fn integer_literal(value: i64) -> Expression {
    ExpressionKind::Integer(IntegerLiteral::new(value)).into()
}

/// Inline array of strings
pub fn array_literal(values: &[String]) -> Expression {
    let items = values.iter().map(|v| string_literal(v)).collect();
    ExpressionKind::Array(ArrayLiteral::new(DelimitedList::new(
        items,
        ListLayout::inline(),
    )))
    .into()
}

/// `key = value`
pub fn keyword_argument(key: &str, value: Expression) -> Expression {
    ExpressionKind::Infix(InfixExpression::new(
        TokenKind::Assign,
        "=",
        identifier(key),
        value,
    ))
    .into()
}

/// `function(arguments...)` with inline arguments
pub fn call(function: &str, arguments: Vec<Expression>) -> CallExpression {
    CallExpression::new(function, DelimitedList::new(arguments, ListLayout::inline()))
}

/// `glob(include = [...], exclude = [...])`; `exclude` is left out when empty
pub fn glob_call(glob: &GlobValue) -> Expression {
    let mut arguments = vec![keyword_argument("include", array_literal(&glob.include))];
    if !glob.exclude.is_empty() {
        arguments.push(keyword_argument("exclude", array_literal(&glob.exclude)));
    }
    let mut glob = call("glob", arguments);
    glob.arguments.layout = choose_layout(&glob.arguments, 1, "    srcs = glob".len(), false);
    ExpressionKind::Call(glob).into()
}

/// `subinclude("...", ...)` statement
pub fn subinclude_statement(includes: &[String]) -> Statement {
    let arguments = includes.iter().map(|i| string_literal(i)).collect();
    let mut subinclude = call("subinclude", arguments);
    subinclude.arguments.layout =
        choose_layout(&subinclude.arguments, 0, "subinclude".len(), false);
    Statement::Expression(ExpressionStatement::new(
        ExpressionKind::Call(subinclude).into(),
    ))
}

/// Standalone comment block, one `#` line per text line
pub fn comment_statement(text: &str) -> Statement {
    let group = CommentGroup::from_text(text);
    Statement::Comment(CommentStatement {
        token: Token::synthetic(TokenKind::Comment, group.token.literal.clone()),
        group,
        blank_lines_before: 0,
        source: None,
    })
}

/// Build an expression of `as_type` from a value, converting where it makes sense
pub fn build_value(as_type: FieldType, value: &FieldValue) -> Option<Expression> {
    match (as_type, value) {
        (FieldType::String, FieldValue::String(s)) => Some(string_literal(s)),
        (FieldType::String, FieldValue::Array(items)) if items.len() == 1 => {
            Some(string_literal(&items[0]))
        }
        (FieldType::Array, FieldValue::Array(items)) => Some(array_literal(items)),
        (FieldType::Array, FieldValue::String(s)) => Some(array_literal(std::slice::from_ref(s))),
        (FieldType::Glob, FieldValue::Glob(glob)) => Some(glob_call(glob)),
        (FieldType::Glob, FieldValue::Array(items)) => Some(glob_call(&GlobValue {
            include: items.clone(),
            exclude: Vec::new(),
        })),
        (FieldType::Glob, FieldValue::String(s)) => Some(glob_call(&GlobValue {
            include: vec![s.clone()],
            exclude: Vec::new(),
        })),
        (FieldType::Bool, FieldValue::Bool(b)) => Some(bool_literal(*b)),
        (FieldType::Number, FieldValue::Number(n)) => Some(integer_literal(*n)),
        _ => None,
    }
}

/// Extension of a file name from its first dot, `.test.ts` for `app.test.ts`
fn full_extension(relative_path: &str) -> &str {
    let filename = relative_path.rsplit('/').next().unwrap_or(relative_path);
    match filename.find('.') {
        Some(idx) if idx > 0 => &filename[idx..],
        _ => "",
    }
}

/// Builds rules and files for one target source file
pub struct Builder<'a> {
    config: &'a Config,
    target: &'a TargetFile,
}

impl<'a> Builder<'a> {
    pub fn new(config: &'a Config, target: &'a TargetFile) -> Self {
        Self { config, target }
    }

    /// A rule owning the target file for `role`
    pub fn build_new_rule(&self, deps: &[String], role: FileRole) -> Statement {
        let template = self.config.on_create.template(role);
        let schema = self.config.schema_for(&template.name);
        let omit_empty = self.config.on_create.omit_empty_fields;
        let mut arguments = Vec::new();

        let name = format_target_name(&template.target_format, &self.target.relative_path);
        push_field(&mut arguments, &schema, Field::Name, FieldValue::String(name));

        let (srcs_value, preferred) = match template.srcs_mode {
            SrcsMode::Explicit => (
                FieldValue::Array(vec![self.target.relative_path.clone()]),
                [FieldType::Array, FieldType::String, FieldType::Glob],
            ),
            SrcsMode::Glob => (
                FieldValue::Glob(self.glob_value(template)),
                [FieldType::Glob, FieldType::Array, FieldType::String],
            ),
        };
        let srcs_entry = preferred
            .iter()
            .find_map(|t| schema.entry_of_type(Field::Srcs, *t))
            .unwrap_or_else(|| schema.primary(Field::Srcs));
        match build_value(srcs_entry.as_type, &srcs_value) {
            Some(value) => arguments.push(keyword_argument(&srcs_entry.value, value)),
            None => debug!(
                "Cannot write srcs of {} as {:?}",
                template.name, srcs_entry.as_type
            ),
        }

        if !(deps.is_empty() && omit_empty) {
            push_field(
                &mut arguments,
                &schema,
                Field::Deps,
                FieldValue::Array(deps.to_vec()),
            );
        }
        if !(template.visibility.is_empty() && omit_empty) {
            push_field(
                &mut arguments,
                &schema,
                Field::Visibility,
                FieldValue::Array(template.visibility.clone()),
            );
        }
        match template.test_only {
            Some(test_only) if test_only || !omit_empty => push_field(
                &mut arguments,
                &schema,
                Field::TestOnly,
                FieldValue::Bool(test_only),
            ),
            None if !omit_empty => {
                push_field(&mut arguments, &schema, Field::TestOnly, FieldValue::Bool(false))
            }
            _ => {}
        }

        let mut rule = call(&template.name, arguments);
        relayout_rule_arguments(&mut rule.arguments);
        Statement::Expression(ExpressionStatement::new(ExpressionKind::Call(rule).into()))
    }

    /// A whole declaration file: heading, subinclude and the new rule
    pub fn build_new_file(&self, deps: &[String], role: FileRole) -> Root {
        let mut statements = Vec::new();
        if let Some(heading) = &self.config.on_create.file_heading {
            statements.push(comment_statement(heading));
        }

        let includes = self.config.create_subincludes(role);
        if !includes.is_empty() {
            let mut subinclude = subinclude_statement(&includes);
            subinclude.set_blank_lines_before(usize::from(!statements.is_empty()));
            statements.push(subinclude);
        }

        let mut rule = self.build_new_rule(deps, role);
        rule.set_blank_lines_before(usize::from(!statements.is_empty()));
        statements.push(rule);
        Root::new(statements)
    }

    fn glob_value(&self, template: &RuleTemplate) -> GlobValue {
        match &template.glob_matchers {
            Some(matchers) if !matchers.include.is_empty() => GlobValue {
                include: matchers.include.clone(),
                exclude: matchers.exclude.clone(),
            },
            _ => GlobValue {
                include: vec![format!(
                    "**/*{}",
                    full_extension(&self.target.relative_path)
                )],
                exclude: Vec::new(),
            },
        }
    }
}

fn push_field(arguments: &mut Vec<Expression>, schema: &ManagedSchema, field: Field, value: FieldValue) {
    let entry = schema.primary(field);
    match build_value(entry.as_type, &value) {
        Some(expr) => arguments.push(keyword_argument(&entry.value, expr)),
        None => debug!(
            "Skipping {}: {:?} cannot be written as {:?}",
            field.as_str(),
            value.field_type(),
            entry.as_type
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobMatchers;
    use crate::lang::Render;

    fn render(statement: &Statement) -> String {
        statement.render_string(0)
    }

    #[test]
    fn test_build_new_rule_explicit_srcs() {
        let config = Config::default();
        let target = TargetFile::new("src/app.ts", FileRole::Module);
        let rule = Builder::new(&config, &target)
            .build_new_rule(&["//common:util".to_string(), ":types".to_string()], FileRole::Module);
        insta::assert_snapshot!(render(&rule), @r#"
        ts_library(
            name = "app",
            srcs = ["src/app.ts"],
            deps = ["//common:util", ":types"],
        )
        "#);
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let config = Config::default();
        let target = TargetFile::new("app.test.ts", FileRole::Test);
        let rule = Builder::new(&config, &target).build_new_rule(&[], FileRole::Test);
        assert_eq!(
            render(&rule),
            "ts_test(\n    name = \"app_test\",\n    srcs = [\"app.test.ts\"],\n)"
        );
    }

    #[test]
    fn test_empty_fields_kept_when_requested() {
        let mut config = Config::default();
        config.on_create.omit_empty_fields = false;
        let target = TargetFile::new("a.ts", FileRole::Module);
        let text = render(&Builder::new(&config, &target).build_new_rule(&[], FileRole::Module));
        assert!(text.contains("deps = []"));
        assert!(text.contains("visibility = []"));
        assert!(text.contains("test_only = False"));
    }

    #[test]
    fn test_glob_srcs_with_default_extension() {
        let mut config = Config::default();
        config.on_create.module.srcs_mode = SrcsMode::Glob;
        config.on_create.module.visibility = vec!["PUBLIC".to_string()];
        let target = TargetFile::new("lib/index.d.ts", FileRole::Module);
        let text = render(&Builder::new(&config, &target).build_new_rule(&[], FileRole::Module));
        assert!(text.contains("srcs = glob(include = [\"**/*.d.ts\"]),"), "{text}");
        assert!(text.contains("visibility = [\"PUBLIC\"],"));
    }

    #[test]
    fn test_fixture_rule_uses_matchers() {
        let mut config = Config::default();
        config.on_create.fixture.glob_matchers = Some(GlobMatchers {
            include: vec!["**/*.json".to_string()],
            exclude: vec!["**/big.json".to_string()],
        });
        let target = TargetFile::new("data.json", FileRole::Fixture);
        let text = render(&Builder::new(&config, &target).build_new_rule(&[], FileRole::Fixture));
        assert!(text.starts_with("filegroup(\n    name = \"data_fixture\","));
        assert!(text.contains(
            "srcs = glob(include = [\"**/*.json\"], exclude = [\"**/big.json\"]),"
        ));
        assert!(text.contains("test_only = True,"));
    }

    #[test]
    fn test_build_new_file() {
        let mut config = Config::default();
        config.on_create.file_heading = Some("Generated by autodeps".to_string());
        config.on_create.subinclude = vec!["//build_defs:ts".to_string()];
        let target = TargetFile::new("app.ts", FileRole::Module);
        let root = Builder::new(&config, &target).build_new_file(&[":dep".to_string()], FileRole::Module);
        insta::assert_snapshot!(root.to_source().trim_end(), @r#"
        # Generated by autodeps

        subinclude("//build_defs:ts")

        ts_library(
            name = "app",
            srcs = ["app.ts"],
            deps = [":dep"],
        )
        "#);
    }

    #[test]
    fn test_build_value_coercions() {
        let single = FieldValue::Array(vec!["a.ts".to_string()]);
        assert_eq!(
            build_value(FieldType::String, &single).unwrap().render_string(0),
            "\"a.ts\""
        );
        assert!(build_value(FieldType::Bool, &single).is_none());
        assert_eq!(
            build_value(FieldType::Glob, &single).unwrap().render_string(0),
            "glob(include = [\"a.ts\"])"
        );
        assert_eq!(full_extension("dir/app.test.ts"), ".test.ts");
        assert_eq!(full_extension(".eslintrc"), "");
    }
}
