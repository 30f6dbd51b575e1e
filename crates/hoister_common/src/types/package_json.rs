use serde::{Deserialize, Serialize};

/// The part of a module's `package.json` the hoister cares about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
  /// Only the boolean form of `sideEffects` matters here. Glob lists are decided per file by the
  /// pipeline before the module reaches the hoister.
  #[serde(default)]
  pub side_effects: Option<bool>,
}

impl PackageJson {
  #[must_use]
  pub fn with_side_effects(mut self, value: Option<bool>) -> Self {
    self.side_effects = value;
    self
  }

  /// `"sideEffects": false`
  pub fn is_side_effect_free(&self) -> bool {
    matches!(self.side_effects, Some(false))
  }
}
