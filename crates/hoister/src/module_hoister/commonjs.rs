use std::mem;

use hoister_common::GLOBAL_IDENTIFIER;
use hoister_ecmascript::ecma_utils::ExpressionExt;
use oxc::{
  allocator::Vec as ArenaVec,
  ast::ast::{self, AssignmentTarget, Expression, SimpleAssignmentTarget, Statement},
  ast_visit::VisitMut,
  parser::Parser,
  span::{SPAN, SourceType},
  syntax::operator::{AssignmentOperator, UnaryOperator},
};

use super::ModuleHoister;

impl<'ast> ModuleHoister<'_, 'ast> {
  /// `module.exports`, `module.id`, `module.hot`, `module.bundle`, top-level `this` and
  /// `typeof module`/`typeof require`. Wrapped modules keep their own `module` and `this`.
  pub(super) fn try_rewrite_commonjs_expr(
    &mut self,
    expr: &Expression<'ast>,
  ) -> Option<Expression<'ast>> {
    if self.ctx.should_wrap() {
      return None;
    }
    match expr {
      Expression::StaticMemberExpression(member) => {
        let object = member.object.as_identifier()?;
        if object.name != "module" || !self.is_free(object) {
          return None;
        }
        let rewritten = match member.property.name.as_str() {
          "exports" => {
            self.mark_commonjs();
            self.snippet.id_ref_expr(&self.ctx.names.exports(), SPAN)
          }
          "id" => self.module_id_expr(),
          "hot" => self.snippet.null_expr(),
          "bundle" => self.snippet.id_ref_expr("require", SPAN),
          _ => return None,
        };
        Some(rewritten)
      }
      Expression::ThisExpression(_) if self.this_depth == 0 => {
        self.mark_commonjs();
        Some(self.snippet.id_ref_expr(&self.ctx.names.exports(), SPAN))
      }
      Expression::UnaryExpression(unary) if unary.operator == UnaryOperator::Typeof => {
        let argument = unary.argument.as_identifier()?;
        let value = match argument.name.as_str() {
          "module" => "object",
          "require" => "function",
          _ => return None,
        };
        self.is_free(argument).then(|| self.snippet.string_literal_expr(value, SPAN))
      }
      _ => None,
    }
  }

  /// `module.exports = ...`
  pub(super) fn try_rewrite_commonjs_assignment_target(
    &mut self,
    target: &SimpleAssignmentTarget<'ast>,
  ) -> Option<SimpleAssignmentTarget<'ast>> {
    if self.ctx.should_wrap() {
      return None;
    }
    let SimpleAssignmentTarget::StaticMemberExpression(member) = target else {
      return None;
    };
    let object = member.object.as_identifier()?;
    if member.property.name != "exports" || object.name != "module" || !self.is_free(object) {
      return None;
    }
    self.mark_commonjs();
    Some(SimpleAssignmentTarget::AssignmentTargetIdentifier(
      self.snippet.alloc_id_ref(&self.ctx.names.exports(), SPAN),
    ))
  }

  /// Free identifiers: `exports`, `global` and the names with an inline replacement.
  pub(super) fn rewrite_free_identifier(&mut self, ident: &mut ast::IdentifierReference<'ast>) {
    match ident.name.as_str() {
      "exports" => {
        if !self.ctx.should_wrap() {
          ident.name = self.snippet.atom(&self.ctx.names.exports());
          self.mark_commonjs();
        }
      }
      "global" => {
        ident.name = self.snippet.atom(GLOBAL_IDENTIFIER);
        self.globals.shift_remove("global");
      }
      name => self.inject_global(name),
    }
  }

  /// Queues the replacement snippet registered for `name`, once.
  fn inject_global(&mut self, name: &str) {
    let Some(code) = self.globals.shift_remove(name) else {
      return;
    };
    let alloc = self.snippet.alloc();
    let source = alloc.alloc_str(&code);
    let ret = Parser::new(alloc, source, SourceType::mjs()).parse();
    if ret.panicked || !ret.errors.is_empty() {
      tracing::warn!(name, code = code.as_str(), "skipping global replacement that does not parse");
      return;
    }
    tracing::trace!(name, "inject global");
    self.injected_globals.extend(ret.program.body);
  }

  /// Rewrites the queued snippets like module code. A snippet may pull in other globals, those end
  /// up above it.
  pub(super) fn rewrite_injected_globals(&mut self) -> Vec<Statement<'ast>> {
    let mut batches = Vec::new();
    while !self.injected_globals.is_empty() {
      let mut batch = self.snippet.builder.vec_from_iter(mem::take(&mut self.injected_globals));
      self.in_injected_code = true;
      self.visit_statements(&mut batch);
      self.in_injected_code = false;
      batches.push(batch);
    }
    batches.into_iter().rev().flatten().collect()
  }

  /// `exports.foo = value;` at the top level becomes
  /// `var $1$export$foo = value; exports.foo = $1$export$foo;`
  /// so the linker can reach the value without going through the exports object.
  pub(super) fn hoist_exports_assignment(
    &mut self,
    stmts: &mut ArenaVec<'ast, Statement<'ast>>,
    index: usize,
  ) -> bool {
    if self.ctx.should_wrap() {
      return false;
    }
    let Statement::ExpressionStatement(stmt) = &mut stmts[index] else {
      return false;
    };
    let Expression::AssignmentExpression(assign) = &mut stmt.expression else {
      return false;
    };
    if assign.operator != AssignmentOperator::Assign {
      return false;
    }
    let name = match &assign.left {
      AssignmentTarget::StaticMemberExpression(member) if self.is_exports_object(&member.object) => {
        member.property.name.as_str()
      }
      AssignmentTarget::ComputedMemberExpression(member)
        if self.is_exports_object(&member.object) =>
      {
        match &member.expression {
          Expression::StringLiteral(literal) => literal.value.as_str(),
          _ => return false,
        }
      }
      _ => return false,
    };

    let export_name = self.ctx.names.export(name);
    let value = mem::replace(&mut assign.right, self.snippet.id_ref_expr(&export_name, SPAN));
    let declaration = self.snippet.var_decl_stmt(&export_name, value);
    stmts.insert(index, declaration);
    true
  }

  fn is_exports_object(&self, expr: &Expression<'ast>) -> bool {
    expr.as_identifier().is_some_and(|ident| ident.name == "exports" && self.is_free(ident))
  }
}
