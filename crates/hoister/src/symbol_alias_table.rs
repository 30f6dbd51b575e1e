use hoister_utils::indexmap::FxIndexMap;

/// Renames scheduled for the top-level bindings of one module, keyed by the new name.
///
/// Chains never form: scheduling `C <- B` while `B <- A` is pending leaves a single `C <- A`
/// entry. Every value is therefore the name the binding carries in the tree, and every key is the
/// name it ends up with.
#[derive(Debug, Default)]
pub struct SymbolAliasTable {
  renamings: FxIndexMap<String, String>,
}

impl SymbolAliasTable {
  /// Schedule the binding currently known as `old_name` to be renamed to `new_name`.
  pub fn schedule(&mut self, new_name: &str, old_name: &str) {
    let original = self.renamings.shift_remove(old_name).unwrap_or_else(|| old_name.to_string());
    assert!(
      original != new_name,
      "renaming `{old_name}` to `{new_name}` would bring `{original}` back to itself"
    );
    tracing::trace!(new_name, original = original.as_str(), "schedule rename");
    self.renamings.insert(new_name.to_string(), original);
  }

  /// The tree name of the binding that will be called `new_name`.
  pub fn resolve_original<'a>(&'a self, new_name: &'a str) -> &'a str {
    self.renamings.get(new_name).map_or(new_name, String::as_str)
  }

  /// The name the binding currently called `name` in the tree will end up with.
  pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
    self
      .renamings
      .iter()
      .find_map(|(new_name, old_name)| (old_name == name).then_some(new_name.as_str()))
      .unwrap_or(name)
  }

  /// Whether the binding called `name` in the tree already has a rename pending.
  pub fn is_scheduled(&self, name: &str) -> bool {
    self.renamings.values().any(|old_name| old_name == name)
  }

  /// Whether some binding is going to be called `new_name`.
  pub fn contains(&self, new_name: &str) -> bool {
    self.renamings.contains_key(new_name)
  }

  /// `(new_name, tree_name)` pairs.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.renamings.iter().map(|(new_name, old_name)| (new_name.as_str(), old_name.as_str()))
  }

  pub fn len(&self) -> usize {
    self.renamings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.renamings.is_empty()
  }
}

#[test]
fn chains_collapse_to_the_tree_name() {
  let mut table = SymbolAliasTable::default();
  table.schedule("b", "a");
  table.schedule("c", "b");

  assert_eq!(table.len(), 1);
  assert_eq!(table.iter().collect::<Vec<_>>(), vec![("c", "a")]);
  assert_eq!(table.resolve("a"), "c");
  assert_eq!(table.resolve_original("c"), "a");
  assert!(!table.contains("b"));
}

#[test]
fn unrelated_renames_are_kept_apart() {
  let mut table = SymbolAliasTable::default();
  table.schedule("$1$export$x", "x");
  table.schedule("$1$export$default", "y");

  assert_eq!(table.resolve("x"), "$1$export$x");
  assert_eq!(table.resolve("y"), "$1$export$default");
  assert_eq!(table.resolve("z"), "z");
  assert_eq!(table.resolve_original("z"), "z");
  assert!(table.is_scheduled("x"));
  assert!(!table.is_scheduled("$1$export$x"));
}

#[test]
fn a_name_freed_by_a_rename_can_be_reused() {
  // `exports` moves to an alias, then a new binding takes the freed name.
  let mut table = SymbolAliasTable::default();
  table.schedule("exports", "first");
  table.schedule("alias", "exports");
  table.schedule("exports", "second");

  assert_eq!(table.resolve_original("alias"), "first");
  assert_eq!(table.resolve_original("exports"), "second");
  assert_eq!(table.len(), 2);
}

#[test]
#[should_panic(expected = "back to itself")]
fn cycles_are_rejected() {
  let mut table = SymbolAliasTable::default();
  table.schedule("b", "a");
  table.schedule("a", "b");
}
