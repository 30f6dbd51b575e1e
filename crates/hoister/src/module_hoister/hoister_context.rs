use hoister_common::{AssetId, CanonicalNames};
use hoister_utils::indexmap::FxIndexSet;
use oxc::semantic::Scoping;

use crate::wrap_analyzer::WrapVerdict;

/// The read-only inputs of one module's rewrite.
pub struct ModuleHoisterContext<'me> {
  pub id: AssetId,
  pub names: &'me CanonicalNames,
  pub scoping: &'me Scoping,
  pub dependencies: &'me FxIndexSet<String>,
  pub side_effect_free: bool,
  pub verdict: WrapVerdict,
}

impl ModuleHoisterContext<'_> {
  #[inline]
  pub fn should_wrap(&self) -> bool {
    self.verdict.should_wrap()
  }

  /// The object exports are written to: the closure's own `exports` when wrapped, the module's
  /// `$<id>$exports` otherwise.
  pub fn exports_ident_name(&self) -> String {
    if self.should_wrap() { "exports".to_string() } else { self.names.exports() }
  }
}
