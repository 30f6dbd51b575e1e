use hoister_common::CanonicalNames;
use hoister_ecmascript::ecma_utils::AstSnippet;
use hoister_utils::concat_string;
use oxc::{
  allocator::{Allocator, TakeIn},
  ast::ast::{self, BindingPatternKind, Expression},
  ast_visit::{VisitMut, walk_mut},
  semantic::{SemanticBuilder, Scoping, SymbolId},
  span::SPAN,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{symbol_alias_table::SymbolAliasTable, wrap_analyzer::WrapVerdict};

/// Last step of the pass: isolate the module in a closure, or move every top-level binding to its
/// module-unique name.
pub fn finalize_module<'ast>(
  program: &mut ast::Program<'ast>,
  alloc: &'ast Allocator,
  names: &CanonicalNames,
  verdict: WrapVerdict,
  aliases: &SymbolAliasTable,
) {
  let snippet = AstSnippet::new(alloc);
  if verdict.already_wrapped {
    return;
  }
  if verdict.should_wrap() {
    // var $1$exports = (function () { ... }).call({});
    let body = program.body.take_in(alloc);
    let call = snippet.isolated_module_call_expr(body);
    program.body.push(snippet.var_decl_stmt(&names.exports(), call));
    return;
  }

  // Bindings were added and moved around, so the scopes are collected again.
  let scoping = SemanticBuilder::new().build(program).semantic.into_scoping();
  let renames = collect_renames(&scoping, names, aliases);

  let exports_name = names.exports();
  let mut renamer = TopLevelRenamer {
    snippet,
    scoping: &scoping,
    renames: &renames,
    exports_name: &exports_name,
    exports_referenced: false,
  };
  renamer.visit_program(program);

  if renamer.exports_referenced && !declares_final_name(&scoping, &renames, &exports_name) {
    program.body.insert(0, renamer.snippet.var_decl_stmt(&exports_name, renamer.snippet.empty_object_expr()));
  }
}

/// Scheduled renames first, then `$<id>$var$<name>` for every other top-level binding that isn't
/// generated already.
fn collect_renames(
  scoping: &Scoping,
  names: &CanonicalNames,
  aliases: &SymbolAliasTable,
) -> FxHashMap<SymbolId, String> {
  let mut renames = FxHashMap::default();
  for (new_name, old_name) in aliases.iter() {
    if let Some(symbol_id) = scoping.get_root_binding(old_name) {
      renames.insert(symbol_id, new_name.to_string());
    }
  }

  let root_scope_id = scoping.root_scope_id();
  for symbol_id in scoping.symbol_ids() {
    if scoping.symbol_scope_id(symbol_id) != root_scope_id || renames.contains_key(&symbol_id) {
      continue;
    }
    let name = scoping.symbol_name(symbol_id);
    if !names.is_generated(name) {
      renames.insert(symbol_id, names.var(name));
    }
  }
  rename_shadowing_bindings(scoping, &mut renames);
  tracing::trace!(count = renames.len(), "top-level renames");
  renames
}

/// An inner binding already called like a final top-level name would capture the references to the
/// renamed binding, so it moves to a fresh name instead.
fn rename_shadowing_bindings(scoping: &Scoping, renames: &mut FxHashMap<SymbolId, String>) {
  let final_names: FxHashSet<&str> = renames.values().map(String::as_str).collect();
  let root_scope_id = scoping.root_scope_id();
  let shadowing: Vec<SymbolId> = scoping
    .symbol_ids()
    .filter(|symbol_id| {
      scoping.symbol_scope_id(*symbol_id) != root_scope_id
        && final_names.contains(scoping.symbol_name(*symbol_id))
    })
    .collect();
  if shadowing.is_empty() {
    return;
  }

  let mut used_names: FxHashSet<String> = scoping.symbol_names().map(ToString::to_string).collect();
  used_names.extend(scoping.root_unresolved_references().keys().map(ToString::to_string));
  used_names.extend(renames.values().cloned());
  for symbol_id in shadowing {
    let name = scoping.symbol_name(symbol_id);
    let mut count = 2u32;
    let mut candidate = concat_string!(name, itoa::Buffer::new().format(count));
    while used_names.contains(&candidate) {
      count += 1;
      candidate = concat_string!(name, itoa::Buffer::new().format(count));
    }
    used_names.insert(candidate.clone());
    renames.insert(symbol_id, candidate);
  }
}

fn declares_final_name(
  scoping: &Scoping,
  renames: &FxHashMap<SymbolId, String>,
  name: &str,
) -> bool {
  renames.values().any(|new_name| new_name == name)
    || scoping.get_root_binding(name).is_some_and(|symbol_id| !renames.contains_key(&symbol_id))
}

/// Applies the renames by symbol, so same-named bindings of inner scopes are left alone.
struct TopLevelRenamer<'me, 'ast> {
  snippet: AstSnippet<'ast>,
  scoping: &'me Scoping,
  renames: &'me FxHashMap<SymbolId, String>,
  exports_name: &'me str,
  exports_referenced: bool,
}

impl<'ast> VisitMut<'ast> for TopLevelRenamer<'_, 'ast> {
  fn visit_binding_identifier(&mut self, ident: &mut ast::BindingIdentifier<'ast>) {
    if let Some(name) = ident.symbol_id.get().and_then(|symbol_id| self.renames.get(&symbol_id)) {
      ident.name = self.snippet.atom(name);
    }
  }

  fn visit_identifier_reference(&mut self, ident: &mut ast::IdentifierReference<'ast>) {
    let Some(reference_id) = ident.reference_id.get() else {
      return;
    };
    match self.scoping.get_reference(reference_id).symbol_id() {
      Some(symbol_id) => {
        if let Some(name) = self.renames.get(&symbol_id) {
          ident.name = self.snippet.atom(name);
        }
      }
      None => {
        if ident.name == self.exports_name {
          self.exports_referenced = true;
        }
      }
    }
  }

  fn visit_object_property(&mut self, prop: &mut ast::ObjectProperty<'ast>) {
    walk_mut::walk_object_property(self, prop);
    if prop.shorthand {
      let same_name = match (&prop.key, &prop.value) {
        (ast::PropertyKey::StaticIdentifier(key), Expression::Identifier(value)) => {
          key.name == value.name
        }
        _ => false,
      };
      prop.shorthand = same_name;
    }
  }

  // `const { a } = obj` => `const { a: $1$var$a } = obj`
  fn visit_binding_property(&mut self, prop: &mut ast::BindingProperty<'ast>) {
    walk_mut::walk_binding_property(self, prop);
    if prop.shorthand {
      let binding = match &prop.value.kind {
        BindingPatternKind::BindingIdentifier(id) => Some(id.name),
        BindingPatternKind::AssignmentPattern(pat) => match &pat.left.kind {
          BindingPatternKind::BindingIdentifier(id) => Some(id.name),
          _ => None,
        },
        _ => None,
      };
      prop.shorthand = matches!(
        (&prop.key, binding),
        (ast::PropertyKey::StaticIdentifier(key), Some(binding)) if key.name == binding
      );
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
}
