use std::iter;

use hoister_ecmascript::ecma_utils::BindingPatternExt;
use oxc::{
  allocator::TakeIn,
  ast::ast::{self, AssignmentTarget, Expression, ForStatementLeft, Statement},
  ast_visit::Visit,
  semantic::{Scoping, SymbolId},
  span::SPAN,
};

use super::ModuleHoister;

/// Symbols written through an assignment target, destructuring included.
struct WrittenSymbols<'a> {
  scoping: &'a Scoping,
  symbols: Vec<SymbolId>,
}

impl<'a> WrittenSymbols<'a> {
  fn new(scoping: &'a Scoping) -> Self {
    Self { scoping, symbols: Vec::new() }
  }
}

impl<'ast> Visit<'ast> for WrittenSymbols<'_> {
  fn visit_identifier_reference(&mut self, ident: &ast::IdentifierReference<'ast>) {
    let Some(reference_id) = ident.reference_id.get() else {
      return;
    };
    let reference = self.scoping.get_reference(reference_id);
    if reference.is_write() {
      self.symbols.extend(reference.symbol_id());
    }
  }
}

impl<'ast> ModuleHoister<'_, 'ast> {
  /// `EXPORTS.name = local` for every name the written symbols are exported as.
  fn export_updates(&self, symbols: &[SymbolId]) -> Vec<Expression<'ast>> {
    let exports = self.ctx.exports_ident_name();
    let mut updates = Vec::new();
    for symbol_id in symbols {
      let Some(exported_names) = self.live_exports.get(symbol_id) else {
        continue;
      };
      let local = self.ctx.scoping.symbol_name(*symbol_id);
      for exported in exported_names {
        updates.push(self.snippet.member_assign_expr(
          &exports,
          exported,
          self.snippet.id_ref_expr(local, SPAN),
        ));
      }
    }
    updates
  }

  /// Keeps the exports object in sync after a write to an exported binding.
  ///
  /// ```js
  /// x = 1;          // x = 1; $1$exports.x = x;
  /// f(x = 1);       // f((x = 1, $1$exports.x = x));
  /// f(x++);         // f(($1$var$_value = x++, $1$exports.x = x, $1$var$_value));
  /// ```
  pub(super) fn append_export_updates(&mut self, expr: &mut Expression<'ast>, at_statement_level: bool) {
    let mut written = WrittenSymbols::new(self.ctx.scoping);
    // Whether the value of the whole expression is the new value of the binding.
    let yields_binding = match expr {
      Expression::AssignmentExpression(assign) => {
        written.visit_assignment_target(&assign.left);
        matches!(assign.left, AssignmentTarget::AssignmentTargetIdentifier(_))
      }
      Expression::UpdateExpression(update) => {
        written.visit_simple_assignment_target(&update.argument);
        update.prefix
      }
      _ => return,
    };

    let updates = self.export_updates(&written.symbols);
    if updates.is_empty() {
      return;
    }

    if at_statement_level {
      self
        .pending_statements
        .extend(updates.into_iter().map(|update| self.snippet.builder.statement_expression(SPAN, update)));
      return;
    }

    let write = expr.take_in(self.snippet.alloc());
    *expr = if yields_binding {
      self.snippet.seq_in_paren_expr(iter::once(write).chain(updates))
    } else {
      let temp = self.generate_uid("value");
      self.prelude.push(self.snippet.var_decl_stmt_without_init(&temp));
      let value = self.snippet.id_ref_expr(&temp, SPAN);
      self.snippet.seq_in_paren_expr(
        iter::once(self.snippet.id_assign_expr(&temp, write)).chain(updates).chain(iter::once(value)),
      )
    };
  }

  /// `for (x of xs) body` => `for (x of xs) { $1$exports.x = x; body }`
  pub(super) fn prepend_loop_head_export_updates(
    &mut self,
    left: &ForStatementLeft<'ast>,
    body: &mut Statement<'ast>,
  ) {
    let symbols: Vec<SymbolId> = match left {
      ForStatementLeft::VariableDeclaration(decl) => {
        decl.binding_identifiers().iter().filter_map(|id| id.symbol_id.get()).collect()
      }
      left => {
        let mut written = WrittenSymbols::new(self.ctx.scoping);
        if let Some(target) = left.as_assignment_target() {
          written.visit_assignment_target(target);
        }
        written.symbols
      }
    };

    let updates = self.export_updates(&symbols);
    if updates.is_empty() {
      return;
    }
    let mut statements = self.snippet.builder.vec_with_capacity(updates.len() + 1);
    statements.extend(
      updates.into_iter().map(|update| self.snippet.builder.statement_expression(SPAN, update)),
    );
    statements.push(body.take_in(self.snippet.alloc()));
    *body = self.snippet.block_stmt(statements);
  }
}
