use tracing::debug;

use crate::builder::{Builder, comment_statement, subinclude_statement};
use crate::config::Config;
use crate::lang::{CommentGroup, Root, Statement, Token, TokenKind};
use crate::patterns::FileRole;

use super::subinclude::{find_subinclude_mut, merge_subinclude};
use super::{VisitContext, VisitResult, Visitor};

/// Appends a new rule owning the target file to an existing tree
#[derive(Debug)]
pub struct RuleInsertionVisitor {
    deps: Vec<String>,
    role: FileRole,
}

impl RuleInsertionVisitor {
    pub fn new(deps: Vec<String>, role: FileRole) -> Self {
        Self { deps, role }
    }
}

impl Visitor for RuleInsertionVisitor {
    type Output = Root;

    fn visit(&mut self, root: &Root, ctx: &VisitContext) -> VisitResult<Root> {
        let _guard = ctx.span.enter();
        let Some(target) = ctx.qualifier.target() else {
            return VisitResult::failed("no target file to build a rule for");
        };

        let mut updated = root.clone();
        apply_heading(&mut updated, &ctx.config);

        let mut required = ctx.config.create_subincludes(self.role);
        for include in &ctx.config.on_update.subinclude {
            if !required.contains(include) {
                required.push(include.clone());
            }
        }
        reconcile_subinclude(&mut updated, &required);

        let mut rule = Builder::new(&ctx.config, target).build_new_rule(&self.deps, self.role);
        rule.set_blank_lines_before(usize::from(!updated.statements.is_empty()));
        updated.statements.push(rule);
        updated.trailing_newlines = 1;
        debug!("Appended {} rule", ctx.config.on_create.template(self.role).name);

        VisitResult::success(updated)
    }
}

/// Replace a heading the tool wrote earlier; prepend the update heading otherwise
fn apply_heading(root: &mut Root, config: &Config) {
    let Some(heading) = &config.on_update.file_heading else {
        return;
    };
    let known = [config.on_create.file_heading.as_deref(), Some(heading.as_str())];
    let ours = root
        .statements
        .first()
        .and_then(Statement::heading_comment)
        .is_some_and(|group| known.iter().flatten().any(|h| group.matches_text(h)));

    if ours {
        let group = CommentGroup::from_text(heading);
        match &mut root.statements[0] {
            Statement::Comment(stmt) => {
                stmt.token = Token::synthetic(TokenKind::Comment, group.token.literal.clone());
                stmt.group = group;
            }
            Statement::Expression(stmt) => stmt.comments.leading = Some(group),
        }
        return;
    }

    if let Some(first) = root.statements.first_mut()
        && first.blank_lines_before() == 0
    {
        first.set_blank_lines_before(1);
    }
    root.statements.insert(0, comment_statement(heading));
}

/// Merge into the existing `subinclude(...)`, or insert one below the leading comments
fn reconcile_subinclude(root: &mut Root, required: &[String]) {
    if required.is_empty() {
        return;
    }
    if let Some(call) = find_subinclude_mut(root) {
        merge_subinclude(call, required);
        return;
    }

    let position = root
        .statements
        .iter()
        .take_while(|s| matches!(s, Statement::Comment(_)))
        .count();
    let mut statement = subinclude_statement(required);
    statement.set_blank_lines_before(usize::from(position > 0));
    if let Some(next) = root.statements.get_mut(position)
        && next.blank_lines_before() == 0
    {
        next.set_blank_lines_before(1);
    }
    root.statements.insert(position, statement);
}
