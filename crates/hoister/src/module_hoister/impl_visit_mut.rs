use std::mem;

use oxc::{
  allocator::{TakeIn, Vec as ArenaVec},
  ast::ast::{self, Expression, Statement},
  ast_visit::{VisitMut, walk_mut},
  semantic::ScopeFlags,
};

use super::{ModuleHoister, Resolution};

impl<'ast> VisitMut<'ast> for ModuleHoister<'_, 'ast> {
  fn visit_program(&mut self, program: &mut ast::Program<'ast>) {
    // Modules share one scope after concatenation, one strict module must not decide for all.
    program.directives.retain(|directive| directive.expression.value != "use strict");

    self.rewrite_module_declarations(program);
    self.visit_statement_list(&mut program.body, true);

    let injected = self.rewrite_injected_globals();
    program.body.splice(0..0, injected.into_iter().chain(mem::take(&mut self.prelude)));
    program.body.extend(mem::take(&mut self.trailer));
  }

  fn visit_statements(&mut self, stmts: &mut ArenaVec<'ast, Statement<'ast>>) {
    self.visit_statement_list(stmts, false);
  }

  fn visit_statement(&mut self, it: &mut Statement<'ast>) {
    if mem::take(&mut self.in_statement_list) {
      walk_mut::walk_statement(self, it);
      return;
    }

    // `if (a) x = 1;` turns into a block when statements have to follow `x = 1`.
    let outer_pending = mem::take(&mut self.pending_statements);
    walk_mut::walk_statement(self, it);
    let pending = mem::replace(&mut self.pending_statements, outer_pending);
    if !pending.is_empty() {
      let mut body = self.snippet.builder.vec_with_capacity(pending.len() + 1);
      body.push(it.take_in(self.snippet.alloc()));
      body.extend(pending);
      *it = self.snippet.block_stmt(body);
    }
  }

  fn visit_expression_statement(&mut self, it: &mut ast::ExpressionStatement<'ast>) {
    self.statement_level_write = !self.in_arrow_expression_body;
    walk_mut::walk_expression_statement(self, it);
  }

  fn visit_expression(&mut self, expr: &mut Expression<'ast>) {
    let at_statement_level = mem::take(&mut self.statement_level_write);

    if let Some(new_expr) = self.try_rewrite_commonjs_expr(expr) {
      *expr = new_expr;
      return;
    }

    if let Expression::CallExpression(call) = expr {
      if self.ctx.side_effect_free && self.is_top_level() {
        call.pure = true;
      }
      if let Some(marker) = self.try_rewrite_require_call(call) {
        *expr = marker;
        return;
      }
    }

    walk_mut::walk_expression(self, expr);

    if !self.live_exports.is_empty() {
      self.append_export_updates(expr, at_statement_level);
    }
  }

  fn visit_identifier_reference(&mut self, ident: &mut ast::IdentifierReference<'ast>) {
    match self.resolve_reference(ident) {
      Resolution::Bound(symbol_id) => {
        if let Some(name) = self.import_redirects.get(&symbol_id) {
          ident.name = self.snippet.atom(name);
        }
      }
      Resolution::Free => self.rewrite_free_identifier(ident),
      Resolution::Synthesized => {}
    }
  }

  fn visit_simple_assignment_target(&mut self, it: &mut ast::SimpleAssignmentTarget<'ast>) {
    if let Some(target) = self.try_rewrite_commonjs_assignment_target(it) {
      *it = target;
      return;
    }
    walk_mut::walk_simple_assignment_target(self, it);
  }

  fn visit_object_property(&mut self, prop: &mut ast::ObjectProperty<'ast>) {
    walk_mut::walk_object_property(self, prop);
    // Ensure `{ a }` would be rewritten to `{ a: $1$var$_a }` instead of `{ $1$var$_a }`
    if prop.shorthand && !is_same_name_shorthand(prop) {
      prop.shorthand = false;
    }
  }

  fn visit_assignment_target_property(
    &mut self,
    property: &mut ast::AssignmentTargetProperty<'ast>,
  ) {
    let ast::AssignmentTargetProperty::AssignmentTargetPropertyIdentifier(prop) = property else {
      walk_mut::walk_assignment_target_property(self, property);
      return;
    };
    let key = prop.binding.name;
    walk_mut::walk_assignment_target_property_identifier(self, prop);
    if prop.binding.name != key {
      *property = self.snippet.expand_assignment_target_property(prop, &key);
    }
  }

  fn visit_return_statement(&mut self, it: &mut ast::ReturnStatement<'ast>) {
    walk_mut::walk_return_statement(self, it);
    if self.function_depth == 0 && self.ctx.should_wrap() {
      let exports = self.snippet.literal_prop_access_member_expr_expr("module", "exports");
      it.argument = Some(match it.argument.take() {
        Some(argument) => self.snippet.seq_in_paren_expr([argument, exports]),
        None => exports,
      });
    }
  }

  fn visit_for_in_statement(&mut self, it: &mut ast::ForInStatement<'ast>) {
    walk_mut::walk_for_in_statement(self, it);
    if !self.live_exports.is_empty() {
      self.prepend_loop_head_export_updates(&it.left, &mut it.body);
    }
  }

  fn visit_for_of_statement(&mut self, it: &mut ast::ForOfStatement<'ast>) {
    walk_mut::walk_for_of_statement(self, it);
    if !self.live_exports.is_empty() {
      self.prepend_loop_head_export_updates(&it.left, &mut it.body);
    }
  }

  fn visit_function(&mut self, it: &mut ast::Function<'ast>, flags: ScopeFlags) {
    let in_arrow_expression_body = mem::replace(&mut self.in_arrow_expression_body, false);
    self.function_depth += 1;
    self.this_depth += 1;
    walk_mut::walk_function(self, it, flags);
    self.function_depth -= 1;
    self.this_depth -= 1;
    self.in_arrow_expression_body = in_arrow_expression_body;
  }

  fn visit_arrow_function_expression(&mut self, it: &mut ast::ArrowFunctionExpression<'ast>) {
    let in_arrow_expression_body = mem::replace(&mut self.in_arrow_expression_body, it.expression);
    self.function_depth += 1;
    walk_mut::walk_arrow_function_expression(self, it);
    self.function_depth -= 1;
    self.in_arrow_expression_body = in_arrow_expression_body;
  }

  fn visit_class_body(&mut self, it: &mut ast::ClassBody<'ast>) {
    self.function_depth += 1;
    self.this_depth += 1;
    walk_mut::walk_class_body(self, it);
    self.function_depth -= 1;
    self.this_depth -= 1;
  }
}

impl<'ast> ModuleHoister<'_, 'ast> {
  /// Visits every statement of a list, splicing in what has to follow each one.
  fn visit_statement_list(
    &mut self,
    stmts: &mut ArenaVec<'ast, Statement<'ast>>,
    is_program_body: bool,
  ) {
    let mut index = 0;
    while index < stmts.len() {
      if is_program_body && self.hoist_exports_assignment(stmts, index) {
        // The declaration carrying the value now sits at `index`.
        self.visit_statement_at(stmts, &mut index);
      }
      self.visit_statement_at(stmts, &mut index);
    }
  }

  fn visit_statement_at(&mut self, stmts: &mut ArenaVec<'ast, Statement<'ast>>, index: &mut usize) {
    let outer_pending = mem::take(&mut self.pending_statements);
    self.in_statement_list = true;
    self.visit_statement(&mut stmts[*index]);
    let pending = mem::replace(&mut self.pending_statements, outer_pending);
    *index += 1;
    for stmt in pending {
      stmts.insert(*index, stmt);
      *index += 1;
    }
  }
}

fn is_same_name_shorthand(prop: &ast::ObjectProperty) -> bool {
  match (&prop.key, &prop.value) {
    (ast::PropertyKey::StaticIdentifier(key), Expression::Identifier(value)) => key.name == value.name,
    _ => false,
  }
}
