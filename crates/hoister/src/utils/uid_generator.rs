use hoister_common::CanonicalNames;
use hoister_utils::{concat_string, ecmascript::to_identifier};
use oxc::semantic::Scoping;
use rustc_hash::FxHashSet;

/// Hands out names that collide with nothing declared or referenced in the module.
///
/// The names already carry the module's `$<id>$var$` prefix, so the final renaming leaves them
/// alone and running the hoister again on its own output keeps them as they are. The names the
/// top-level bindings are renamed to later are reserved as well.
#[derive(Debug)]
pub struct UidGenerator {
  used_names: FxHashSet<String>,
}

impl UidGenerator {
  pub fn new(scoping: &Scoping, names: &CanonicalNames) -> Self {
    let mut used_names: FxHashSet<String> = scoping.symbol_names().map(ToString::to_string).collect();
    used_names.extend(scoping.root_unresolved_references().keys().map(ToString::to_string));

    let root_scope_id = scoping.root_scope_id();
    used_names.extend(
      scoping
        .symbol_ids()
        .filter(|symbol_id| scoping.symbol_scope_id(*symbol_id) == root_scope_id)
        .map(|symbol_id| scoping.symbol_name(symbol_id))
        .filter(|name| !names.is_generated(name))
        .map(|name| names.var(name)),
    );
    Self { used_names }
  }

  /// `$1$var$_hint`, then `$1$var$_hint2`, `$1$var$_hint3`, ...
  pub fn generate(&mut self, names: &CanonicalNames, hint: &str) -> String {
    let hint = to_identifier(hint);
    let base = concat_string!(
      "_",
      hint.trim_start_matches('_').trim_end_matches(|c: char| c.is_ascii_digit())
    );

    let mut candidate = names.var(&base);
    let mut count = 1u32;
    while self.used_names.contains(&candidate) {
      count += 1;
      candidate = names.var(&concat_string!(base, itoa::Buffer::new().format(count)));
    }
    self.used_names.insert(candidate.clone());
    candidate
  }
}

#[cfg(test)]
mod tests {
  use hoister_common::{AssetId, CanonicalNames};
  use hoister_ecmascript::EcmaCompiler;
  use oxc::{semantic::SemanticBuilder, span::SourceType};

  use super::UidGenerator;

  #[test]
  fn skips_names_in_use() {
    let ast = EcmaCompiler::parse("var $1$var$_foo; use($1$var$_foo2);", SourceType::mjs()).unwrap();
    let scoping = SemanticBuilder::new().build(ast.program()).semantic.into_scoping();
    let names = CanonicalNames::new(AssetId::new(1));
    let mut uids = UidGenerator::new(&scoping, &names);

    assert_eq!(uids.generate(&names, "foo"), "$1$var$_foo3");
    assert_eq!(uids.generate(&names, "foo"), "$1$var$_foo4");
    assert_eq!(uids.generate(&names, "default"), "$1$var$_default");
    assert_eq!(uids.generate(&names, "$1$exports"), "$1$var$_$1$exports");
  }

  #[test]
  fn skips_names_top_level_bindings_are_renamed_to() {
    let source = "var _a = 1; var _value; function f() { var _b; }";
    let ast = EcmaCompiler::parse(source, SourceType::mjs()).unwrap();
    let scoping = SemanticBuilder::new().build(ast.program()).semantic.into_scoping();
    let names = CanonicalNames::new(AssetId::new(1));
    let mut uids = UidGenerator::new(&scoping, &names);

    assert_eq!(uids.generate(&names, "a"), "$1$var$_a2");
    assert_eq!(uids.generate(&names, "value"), "$1$var$_value2");
    // Inner bindings keep their names.
    assert_eq!(uids.generate(&names, "b"), "$1$var$_b");
  }
}
