use hoister_utils::indexmap::{FxIndexMap, FxIndexSet};
use serde::{Deserialize, Serialize};

use crate::{AssetId, HoistMeta, PackageJson};

/// A module as the pipeline hands it to the hoister.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
  pub id: AssetId,
  /// Requests this module may `require`. Other `require` calls are left alone.
  #[serde(default)]
  pub dependencies: FxIndexSet<String>,
  #[serde(default)]
  pub package: Option<PackageJson>,
  /// Free identifier => code declaring it, e.g. `process` => `var process = require('process');`.
  /// Each entry is injected at most once and then removed.
  #[serde(default)]
  pub globals: FxIndexMap<String, String>,
  #[serde(default)]
  pub meta: HoistMeta,
}

impl Asset {
  pub fn new(id: impl Into<AssetId>) -> Self {
    Self {
      id: id.into(),
      dependencies: FxIndexSet::default(),
      package: None,
      globals: FxIndexMap::default(),
      meta: HoistMeta::default(),
    }
  }

  #[must_use]
  pub fn with_dependencies<S: Into<String>>(mut self, deps: impl IntoIterator<Item = S>) -> Self {
    self.dependencies.extend(deps.into_iter().map(Into::into));
    self
  }

  #[must_use]
  pub fn with_package(mut self, package: PackageJson) -> Self {
    self.package = Some(package);
    self
  }

  #[must_use]
  pub fn with_global(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
    self.globals.insert(name.into(), code.into());
    self
  }

  pub fn is_side_effect_free(&self) -> bool {
    self.package.as_ref().is_some_and(PackageJson::is_side_effect_free)
  }
}

#[test]
fn deserialize_from_pipeline_json() {
  let asset: Asset = serde_json::from_str(
    r#"{
      "id": 7,
      "dependencies": ["./a", "lodash"],
      "package": { "sideEffects": false },
      "globals": { "process": "var process = require('process');" }
    }"#,
  )
  .unwrap();

  assert_eq!(asset.id, AssetId::new(7));
  assert!(asset.dependencies.contains("lodash"));
  assert!(asset.is_side_effect_free());
  assert_eq!(asset.globals.len(), 1);
  assert!(asset.meta.exports.is_empty());
  assert!(!asset.meta.should_wrap());
}
