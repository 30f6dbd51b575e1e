use std::sync::LazyLock;

use oxc::syntax::{identifier, keyword::RESERVED_KEYWORDS};
use regex::{Captures, Regex};

static INVALID_IDENTIFIER_CHAR_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9$_]").unwrap());
static LEADING_DASH_OR_DIGIT_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[-0-9]+").unwrap());
static DASH_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+(.)?").unwrap());

pub fn is_validate_identifier_name(name: &str) -> bool {
  identifier::is_identifier_name(name)
}

pub fn is_reserved_keyword(name: &str) -> bool {
  RESERVED_KEYWORDS.iter().any(|keyword| *keyword == name)
}

/// Turns an arbitrary string into something usable as a binding name.
///
/// `foo-bar.js` becomes `fooBarJs`, `1st` becomes `st`, `class` becomes `_class`.
pub fn to_identifier(name: &str) -> String {
  let name = INVALID_IDENTIFIER_CHAR_RE.replace_all(name, "-");
  let name = LEADING_DASH_OR_DIGIT_RE.replace(&name, "");
  let name = DASH_RUN_RE
    .replace_all(&name, |caps: &Captures| caps.get(1).map_or(String::new(), |c| c.as_str().to_uppercase()));

  if name.is_empty() {
    return "_".to_string();
  }

  if is_validate_identifier_name(&name) && !is_reserved_keyword(&name) {
    name.into_owned()
  } else {
    crate::concat_string!("_", name)
  }
}

#[test]
fn test_is_validate_identifier_name() {
  assert!(is_validate_identifier_name("foo"));
  assert!(is_validate_identifier_name("$1$var$foo"));
  assert!(!is_validate_identifier_name("1aaaa"));
  assert!(!is_validate_identifier_name("😈"));
}

#[test]
fn test_to_identifier() {
  assert_eq!(to_identifier("foo"), "foo");
  assert_eq!(to_identifier("foo-bar.js"), "fooBarJs");
  assert_eq!(to_identifier("./lib/a"), "libA");
  assert_eq!(to_identifier("1st"), "st");
  assert_eq!(to_identifier("class"), "_class");
  assert_eq!(to_identifier("---"), "_");
  assert_eq!(to_identifier("$_ok"), "$_ok");
}
