mod commonjs;
mod hoister_context;
mod impl_visit_mut;
mod live_exports;
mod module_declarations;
mod require_call;

use hoister_common::{
  EXPORT_WILDCARD_MARKER, HoistMeta, IMPORT_MARKER, REQUIRE_MARKER, REQUIRE_RESOLVE_MARKER,
};
use hoister_ecmascript::ecma_utils::AstSnippet;
use hoister_utils::indexmap::FxIndexMap;
use oxc::{
  allocator::Allocator,
  ast::ast::{self, Statement},
  semantic::SymbolId,
  span::SPAN,
};
use rustc_hash::FxHashMap;

pub use self::hoister_context::ModuleHoisterContext;
use crate::{symbol_alias_table::SymbolAliasTable, utils::uid_generator::UidGenerator};

/// What an identifier reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
  Bound(SymbolId),
  Free,
  /// Created by the hoister itself, so there is nothing to resolve.
  Synthesized,
}

/// Rewrites one module in a single mutable walk: CommonJS idioms, `require` calls, module
/// declarations and live export bindings. Renaming happens afterwards, driven by `aliases`.
pub struct ModuleHoister<'me, 'ast> {
  pub ctx: ModuleHoisterContext<'me>,
  pub snippet: AstSnippet<'ast>,
  pub meta: &'me mut HoistMeta,
  pub globals: &'me mut FxIndexMap<String, String>,
  pub aliases: SymbolAliasTable,
  uids: UidGenerator,
  /// Import bindings => the variable now holding the import marker.
  import_redirects: FxHashMap<SymbolId, String>,
  /// Exported bindings that are written somewhere => the names they are exported as.
  live_exports: FxHashMap<SymbolId, Vec<String>>,
  /// Declarations placed at the top of the body, in the order they were created.
  prelude: Vec<Statement<'ast>>,
  /// Global snippets waiting to be rewritten and placed above the prelude.
  injected_globals: Vec<Statement<'ast>>,
  /// Statements to place right after the statement being visited.
  pending_statements: Vec<Statement<'ast>>,
  /// Export assignments for bindings declared below their `export { ... }`.
  trailer: Vec<Statement<'ast>>,
  statement_level_write: bool,
  in_statement_list: bool,
  in_arrow_expression_body: bool,
  in_injected_code: bool,
  /// Non-arrow functions and class bodies, which rebind `this`.
  this_depth: u32,
  /// Any function, arrow or class body.
  function_depth: u32,
}

impl<'me, 'ast> ModuleHoister<'me, 'ast> {
  pub fn new(
    ctx: ModuleHoisterContext<'me>,
    alloc: &'ast Allocator,
    meta: &'me mut HoistMeta,
    globals: &'me mut FxIndexMap<String, String>,
  ) -> Self {
    let uids = UidGenerator::new(ctx.scoping, ctx.names);
    Self {
      ctx,
      snippet: AstSnippet::new(alloc),
      meta,
      globals,
      aliases: SymbolAliasTable::default(),
      uids,
      import_redirects: FxHashMap::default(),
      live_exports: FxHashMap::default(),
      prelude: Vec::new(),
      injected_globals: Vec::new(),
      pending_statements: Vec::new(),
      trailer: Vec::new(),
      statement_level_write: false,
      in_statement_list: false,
      in_arrow_expression_body: false,
      in_injected_code: false,
      this_depth: 0,
      function_depth: 0,
    }
  }

  pub fn into_aliases(self) -> SymbolAliasTable {
    self.aliases
  }

  fn resolve_reference(&self, ident: &ast::IdentifierReference) -> Resolution {
    match ident.reference_id.get() {
      Some(reference_id) => self
        .ctx
        .scoping
        .get_reference(reference_id)
        .symbol_id()
        .map_or(Resolution::Free, Resolution::Bound),
      // Injected global snippets were never analyzed; anything they reference that the module
      // doesn't declare at the top level is treated as free.
      None if self.in_injected_code
        && self.ctx.scoping.get_root_binding(ident.name.as_str()).is_none() =>
      {
        Resolution::Free
      }
      None => Resolution::Synthesized,
    }
  }

  #[inline]
  fn is_free(&self, ident: &ast::IdentifierReference) -> bool {
    self.resolve_reference(ident) == Resolution::Free
  }

  /// Never written after its declaration.
  fn is_constant(&self, symbol_id: SymbolId) -> bool {
    let scoping = self.ctx.scoping;
    scoping.symbol_redeclarations(symbol_id).is_empty()
      && scoping
        .get_resolved_reference_ids(symbol_id)
        .iter()
        .all(|reference_id| !scoping.get_reference(*reference_id).is_write())
  }

  fn generate_uid(&mut self, hint: &str) -> String {
    self.uids.generate(self.ctx.names, hint)
  }

  fn is_top_level(&self) -> bool {
    self.function_depth == 0
  }

  fn mark_commonjs(&mut self) {
    self.meta.flags.insert(hoister_common::HoistFlags::IS_COMMONJS);
  }

  fn module_id_expr(&self) -> ast::Expression<'ast> {
    let id = self.ctx.id;
    self.snippet.number_expr(f64::from(id.raw()), itoa::Buffer::new().format(id.raw()))
  }

  /// `$parcel$import(id, source, name, replace)`
  fn import_marker_expr(&self, source: &str, name: &str, replace: bool) -> ast::Expression<'ast> {
    self.snippet.call_expr_with_args(
      IMPORT_MARKER,
      [
        self.module_id_expr(),
        self.snippet.string_literal_expr(source, SPAN),
        self.snippet.string_literal_expr(name, SPAN),
        self.snippet.builder.expression_boolean_literal(SPAN, replace),
      ],
    )
  }

  /// `$parcel$require(id, source)`
  fn require_marker_expr(&self, source: &str) -> ast::Expression<'ast> {
    self.snippet.call_expr_with_args(
      REQUIRE_MARKER,
      [self.module_id_expr(), self.snippet.string_literal_expr(source, SPAN)],
    )
  }

  /// `$parcel$require$resolve(id, source)`
  fn require_resolve_marker_expr(&self, source: &str) -> ast::Expression<'ast> {
    self.snippet.call_expr_with_args(
      REQUIRE_RESOLVE_MARKER,
      [self.module_id_expr(), self.snippet.string_literal_expr(source, SPAN)],
    )
  }

  /// `$parcel$exportWildcard(dest, $parcel$require(id, source))`
  fn export_wildcard_marker_expr(
    &self,
    dest: ast::Expression<'ast>,
    source: &str,
  ) -> ast::Expression<'ast> {
    self.snippet.call_expr_with_args(EXPORT_WILDCARD_MARKER, [dest, self.require_marker_expr(source)])
  }
}
