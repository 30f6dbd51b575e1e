use hoister_common::HoistFlags;
use hoister_ecmascript::ecma_utils::{BindingPatternExt, StatementExt};
use oxc::{
  allocator::{Box as ArenaBox, TakeIn, Vec as ArenaVec},
  ast::ast::{
    self, Declaration, ExportDefaultDeclarationKind, Expression, ImportDeclarationSpecifier,
    ModuleExportName, Statement,
  },
  semantic::{SymbolFlags, SymbolId},
  span::{SPAN, Span},
};

use super::{ModuleHoister, Resolution};

/// A top-level binding being exported, under the name it carries in the tree.
struct LocalBinding {
  name: String,
  /// `None` for globals, which can't be renamed.
  symbol_id: Option<SymbolId>,
}

impl LocalBinding {
  fn from_binding(id: &ast::BindingIdentifier) -> Self {
    Self { name: id.name.to_string(), symbol_id: id.symbol_id.get() }
  }
}

impl<'ast> ModuleHoister<'_, 'ast> {
  /// Replaces `import` and `export` statements with plain code plus markers for the linker.
  pub(super) fn rewrite_module_declarations(&mut self, program: &mut ast::Program<'ast>) {
    if !program.body.iter().any(|stmt| stmt.is_module_declaration()) {
      return;
    }
    self.meta.flags.insert(HoistFlags::IS_ES6_MODULE);

    // Imports are hoisted, so their variables go first whatever their position.
    for stmt in program.body.iter() {
      if let Statement::ImportDeclaration(decl) = stmt {
        self.rewrite_import_declaration(decl);
      }
    }

    let old_body = program.body.take_in(self.snippet.alloc());
    let mut new_body = self.snippet.builder.vec_with_capacity(old_body.len());
    for mut stmt in old_body {
      match &mut stmt {
        Statement::ImportDeclaration(_) => continue,
        Statement::ExportDefaultDeclaration(decl) => {
          self.rewrite_export_default_declaration(decl, &mut new_body);
          continue;
        }
        Statement::ExportNamedDeclaration(decl) => {
          self.rewrite_export_named_declaration(decl, &mut new_body);
          continue;
        }
        Statement::ExportAllDeclaration(decl) => {
          self.rewrite_export_all_declaration(decl, &mut new_body);
          continue;
        }
        _ => {}
      }
      new_body.push(stmt);
    }
    program.body = new_body;
  }

  fn rewrite_import_declaration(&mut self, decl: &ast::ImportDeclaration<'ast>) {
    if decl.import_kind.is_type() {
      return;
    }
    let source = decl.source.value.as_str();
    let Some(specifiers) = &decl.specifiers else {
      // `import './a'` only orders side effects, which the packager already knows about.
      return;
    };
    for specifier in specifiers.iter() {
      match specifier {
        ImportDeclarationSpecifier::ImportSpecifier(spec) => {
          if !spec.import_kind.is_type() {
            self.redirect_import(&spec.local, source, &spec.imported.name());
          }
        }
        ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
          self.redirect_import(&spec.local, source, "default");
        }
        ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
          // import * as ns from './a' => var ns = $parcel$require(1, './a')
          let declaration =
            self.snippet.var_decl_stmt(&spec.local.name, self.require_marker_expr(source));
          self.prelude.push(declaration);
        }
      }
    }
  }

  /// import { a } from './a' => var $1$var$_a = $parcel$import(1, './a', 'a', true)
  fn redirect_import(&mut self, local: &ast::BindingIdentifier<'ast>, source: &str, imported: &str) {
    let name = self.generate_uid(&local.name);
    let declaration = self.snippet.var_decl_stmt(&name, self.import_marker_expr(source, imported, true));
    self.prelude.push(declaration);
    if let Some(symbol_id) = local.symbol_id.get() {
      self.import_redirects.insert(symbol_id, name);
    }
  }

  fn rewrite_export_default_declaration(
    &mut self,
    decl: &mut ast::ExportDefaultDeclaration<'ast>,
    out: &mut ArenaVec<'ast, Statement<'ast>>,
  ) {
    let alloc = self.snippet.alloc();
    let export_name = self.ctx.names.export("default");
    match &mut decl.declaration {
      kind @ ast::match_expression!(ExportDefaultDeclarationKind) => {
        match kind.to_expression_mut().take_in(alloc) {
          Expression::Identifier(ident) => {
            let local = self.local_binding(&ident);
            self.safe_rename(&local, &export_name, out);
          }
          // "export default 1 + 1" => "var $1$export$default = 1 + 1"
          expr => out.push(self.snippet.var_decl_stmt(&export_name, expr)),
        }
      }
      ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
        let mut func = func.as_mut().take_in(alloc);
        if let Some(local) = func.id.as_ref().map(LocalBinding::from_binding) {
          out.push(Statement::FunctionDeclaration(ArenaBox::new_in(func, alloc)));
          self.safe_rename(&local, &export_name, out);
        } else {
          // "export default function() {}" => "var $1$export$default = function() {}"
          func.r#type = ast::FunctionType::FunctionExpression;
          let expr = Expression::FunctionExpression(ArenaBox::new_in(func, alloc));
          out.push(self.snippet.var_decl_stmt(&export_name, expr));
        }
      }
      ExportDefaultDeclarationKind::ClassDeclaration(class) => {
        let mut class = class.as_mut().take_in(alloc);
        if let Some(local) = class.id.as_ref().map(LocalBinding::from_binding) {
          out.push(Statement::ClassDeclaration(ArenaBox::new_in(class, alloc)));
          self.safe_rename(&local, &export_name, out);
        } else {
          // "export default class {}" => "var $1$export$default = class {}"
          class.r#type = ast::ClassType::ClassExpression;
          let expr = Expression::ClassExpression(ArenaBox::new_in(class, alloc));
          out.push(self.snippet.var_decl_stmt(&export_name, expr));
        }
      }
      ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => return,
    }
    self.push_export_assignment("default", &export_name, out);
    self.record_export(export_name, "default");
  }

  fn rewrite_export_named_declaration(
    &mut self,
    decl: &mut ast::ExportNamedDeclaration<'ast>,
    out: &mut ArenaVec<'ast, Statement<'ast>>,
  ) {
    if decl.export_kind.is_type() {
      return;
    }

    if let Some(source) = &decl.source {
      let source = source.value.as_str();
      for specifier in decl.specifiers.iter() {
        if !specifier.export_kind.is_type() {
          self.rewrite_reexport(source, &specifier.local, &specifier.exported, out);
        }
      }
      return;
    }

    if let Some(declaration) = &mut decl.declaration {
      // `export var foo = 1` => `var foo = 1`
      let declaration = declaration.take_in(self.snippet.alloc());
      let locals: Vec<LocalBinding> = match &declaration {
        Declaration::VariableDeclaration(var_decl) => {
          var_decl.binding_identifiers().into_iter().map(LocalBinding::from_binding).collect()
        }
        Declaration::FunctionDeclaration(func) => {
          func.id.iter().map(LocalBinding::from_binding).collect()
        }
        Declaration::ClassDeclaration(class) => {
          class.id.iter().map(LocalBinding::from_binding).collect()
        }
        _ => return,
      };
      out.push(Statement::from(declaration));
      for local in &locals {
        self.add_export(local, &local.name, decl.span, out);
      }
      return;
    }

    for specifier in decl.specifiers.iter() {
      if specifier.export_kind.is_type() {
        continue;
      }
      let local = match &specifier.local {
        ModuleExportName::IdentifierReference(ident) => self.local_binding(ident),
        name => LocalBinding { name: name.name().to_string(), symbol_id: None },
      };
      self.add_export(&local, &specifier.exported.name(), decl.span, out);
    }
  }

  /// export { a as b } from './a' => var $1$export$b = $parcel$import(1, './a', 'a', false)
  fn rewrite_reexport(
    &mut self,
    source: &str,
    imported: &ModuleExportName<'ast>,
    exported: &ModuleExportName<'ast>,
    out: &mut ArenaVec<'ast, Statement<'ast>>,
  ) {
    let exported = exported.name();
    let export_name = self.ctx.names.export(&exported);
    let marker = self.import_marker_expr(source, &imported.name(), false);
    out.push(self.snippet.var_decl_stmt(&export_name, marker));
    self.push_export_assignment(&exported, &export_name, out);
    self.record_export(export_name, &exported);
  }

  fn rewrite_export_all_declaration(
    &mut self,
    decl: &ast::ExportAllDeclaration<'ast>,
    out: &mut ArenaVec<'ast, Statement<'ast>>,
  ) {
    if decl.export_kind.is_type() {
      return;
    }
    let source = decl.source.value.as_str();

    if let Some(exported) = &decl.exported {
      // export * as ns from './a' => var $1$export$ns = $parcel$require(1, './a')
      let exported = exported.name();
      let export_name = self.ctx.names.export(&exported);
      out.push(self.snippet.var_decl_stmt(&export_name, self.require_marker_expr(source)));
      self.push_export_assignment(&exported, &export_name, out);
      self.record_export(export_name, &exported);
      return;
    }

    self.meta.wildcards.push(source.to_string());

    if self.ctx.should_wrap() {
      // The closure's own `exports` is merged into directly.
      let merge = self.export_wildcard_marker_expr(self.snippet.id_ref_expr("exports", SPAN), source);
      self.prelude.push(self.snippet.builder.statement_expression(SPAN, merge));
      return;
    }

    // `$1$exports = merge($1$exports, ...)` would keep the merge alive for any later use of the
    // exports object. The previous object gets its own name instead and the exports name moves to
    // the merge result.
    let exports_name = self.ctx.names.exports();
    let previous = if self.aliases.contains(&exports_name)
      || self.ctx.scoping.get_root_binding(&exports_name).is_some()
    {
      let alias = self.generate_uid(&exports_name);
      self.aliases.schedule(&alias, &exports_name);
      self.snippet.id_ref_expr(self.aliases.resolve_original(&alias), SPAN)
    } else {
      self.snippet.empty_object_expr()
    };
    let merged = self.generate_uid(&exports_name);
    self.aliases.schedule(&exports_name, &merged);
    let merge = self.export_wildcard_marker_expr(previous, source);
    self.prelude.push(self.snippet.var_decl_stmt(&merged, merge));
  }

  /// Exports `local` as `exported`, preferring to rename the binding over copying it.
  fn add_export(
    &mut self,
    local: &LocalBinding,
    exported: &str,
    site: Span,
    out: &mut ArenaVec<'ast, Statement<'ast>>,
  ) {
    let export_name = self.ctx.names.export(exported);
    let Some(symbol_id) = local.symbol_id else {
      // A global can't be renamed, export its current value.
      out.push(self.snippet.var_decl_stmt(&export_name, self.snippet.id_ref_expr(&local.name, SPAN)));
      self.push_export_assignment(exported, &export_name, out);
      self.record_export(export_name, exported);
      return;
    };

    let assignment = self.snippet.member_assign_stmt(
      &self.ctx.exports_ident_name(),
      exported,
      self.snippet.id_ref_expr(&local.name, SPAN),
    );
    // `export { a }; let a = 1;` must not read `a` before its declaration.
    if self.is_declared_after(symbol_id, site) {
      self.trailer.push(assignment);
    } else {
      out.push(assignment);
    }

    if !self.is_constant(symbol_id) {
      self.live_exports.entry(symbol_id).or_default().push(exported.to_string());
    }

    let current_name = self.aliases.resolve(&local.name);
    if let Some(external) = self.meta.export_name_of(current_name).map(str::to_string) {
      // Exported before under another name, both names stand for the same binding.
      self.record_export(export_name, &external);
    } else {
      self.aliases.schedule(&export_name, &local.name);
      self.record_export(export_name, exported);
    }
  }

  /// Makes `to` hold the value of `local`: by renaming when the binding never changes and has no
  /// other name yet, by copying otherwise.
  fn safe_rename(&mut self, local: &LocalBinding, to: &str, out: &mut ArenaVec<'ast, Statement<'ast>>) {
    let renamable = local.symbol_id.is_some_and(|symbol_id| self.is_constant(symbol_id))
      && !self.aliases.is_scheduled(&local.name);
    if renamable {
      self.aliases.schedule(to, &local.name);
    } else {
      out.push(self.snippet.var_decl_stmt(to, self.snippet.id_ref_expr(&local.name, SPAN)));
    }
  }

  fn local_binding(&self, ident: &ast::IdentifierReference<'ast>) -> LocalBinding {
    match self.resolve_reference(ident) {
      Resolution::Bound(symbol_id) => LocalBinding {
        name: self
          .import_redirects
          .get(&symbol_id)
          .cloned()
          .unwrap_or_else(|| ident.name.to_string()),
        symbol_id: Some(symbol_id),
      },
      Resolution::Free | Resolution::Synthesized => {
        LocalBinding { name: ident.name.to_string(), symbol_id: None }
      }
    }
  }

  /// Whether the binding has no value yet at `site`. Function declarations are hoisted with their
  /// value, a later `var` only holds `undefined` there.
  fn is_declared_after(&self, symbol_id: SymbolId, site: Span) -> bool {
    let scoping = self.ctx.scoping;
    !self.import_redirects.contains_key(&symbol_id)
      && !scoping.symbol_flags(symbol_id).contains(SymbolFlags::Function)
      && scoping.symbol_span(symbol_id).start > site.end
  }

  /// `EXPORTS.exported = value;`
  fn push_export_assignment(
    &self,
    exported: &str,
    value: &str,
    out: &mut ArenaVec<'ast, Statement<'ast>>,
  ) {
    out.push(self.snippet.member_assign_stmt(
      &self.ctx.exports_ident_name(),
      exported,
      self.snippet.id_ref_expr(value, SPAN),
    ));
  }

  fn record_export(&mut self, binding: String, exported: &str) {
    tracing::trace!(binding = binding.as_str(), exported, "export entry");
    self.meta.exports.insert(binding, exported.to_string());
  }
}
