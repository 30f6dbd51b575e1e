use hoister_utils::{
  concat_string,
  ecmascript::{is_reserved_keyword, is_validate_identifier_name, to_identifier},
};

use crate::AssetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
  Exports,
  Export,
  Var,
}

impl NameKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Exports => "exports",
      Self::Export => "export",
      Self::Var => "var",
    }
  }
}

/// Generates `$<id>$<kind>$<rest>` names for one module. The linker matches these by shape, so
/// the format is fixed.
#[derive(Debug, Clone)]
pub struct CanonicalNames {
  /// `$<id>$`
  prefix: String,
}

impl CanonicalNames {
  pub fn new(id: AssetId) -> Self {
    Self { prefix: concat_string!("$", itoa::Buffer::new().format(id.raw()), "$") }
  }

  /// `$<id>$exports`
  pub fn exports(&self) -> String {
    self.name(NameKind::Exports, &[])
  }

  /// `$<id>$export$<name>`
  pub fn export(&self, name: &str) -> String {
    self.name(NameKind::Export, &[name])
  }

  /// `$<id>$var$<name>`
  pub fn var(&self, name: &str) -> String {
    self.name(NameKind::Var, &[name])
  }

  pub fn name(&self, kind: NameKind, parts: &[&str]) -> String {
    let mut name = concat_string!(self.prefix, kind.as_str());
    for part in parts {
      name.push('$');
      name.push_str(&Self::sanitize_part(part));
    }
    name
  }

  /// Whether `name` was generated for this module. `$1$` and `$12$` are different prefixes.
  pub fn is_generated(&self, name: &str) -> bool {
    name.starts_with(&self.prefix)
  }

  fn sanitize_part(part: &str) -> String {
    // `default` is an export key, not a variable name.
    if part == "default" || (is_validate_identifier_name(part) && !is_reserved_keyword(part)) {
      part.to_string()
    } else {
      to_identifier(part)
    }
  }
}

#[test]
fn canonical_name_shapes() {
  let names = CanonicalNames::new(AssetId::new(3));
  assert_eq!(names.exports(), "$3$exports");
  assert_eq!(names.export("default"), "$3$export$default");
  assert_eq!(names.export("foo-bar"), "$3$export$fooBar");
  assert_eq!(names.var("x"), "$3$var$x");
  assert_eq!(names.var("ñandú"), "$3$var$ñandú");
  assert_eq!(names.name(NameKind::Var, &["_$3$exports", "class"]), "$3$var$_$3$exports$_class");
}

#[test]
fn generated_prefix_is_exact() {
  let names = CanonicalNames::new(AssetId::new(1));
  assert!(names.is_generated("$1$var$a"));
  assert!(names.is_generated("$1$exports"));
  assert!(!names.is_generated("$12$var$a"));
  assert!(!names.is_generated("a"));
}
