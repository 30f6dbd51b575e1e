use bitflags::bitflags;
use hoister_utils::indexmap::FxIndexMap;
use serde::{Deserialize, Serialize};

bitflags! {
  #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
  pub struct HoistFlags: u8 {
    /// `module`, `exports` or a top-level `this` was seen.
    const IS_COMMONJS = 1;
    /// `import` or `export` was seen.
    const IS_ES6_MODULE = 1 << 1;
    /// The module body lives inside an isolating closure instead of the shared scope.
    const SHOULD_WRAP = 1 << 2;
  }
}

/// What the hoister leaves behind for the linker.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoistMeta {
  /// Generated binding name => the export name it stands for.
  pub exports: FxIndexMap<String, String>,
  /// Sources of `export * from '...'`, in source order.
  pub wildcards: Vec<String>,
  pub flags: HoistFlags,
}

impl HoistMeta {
  #[inline]
  pub fn is_commonjs(&self) -> bool {
    self.flags.contains(HoistFlags::IS_COMMONJS)
  }

  #[inline]
  pub fn is_es6_module(&self) -> bool {
    self.flags.contains(HoistFlags::IS_ES6_MODULE)
  }

  #[inline]
  pub fn should_wrap(&self) -> bool {
    self.flags.contains(HoistFlags::SHOULD_WRAP)
  }

  /// The name a generated binding is exported as, if any.
  pub fn export_name_of(&self, binding: &str) -> Option<&str> {
    self.exports.get(binding).map(String::as_str)
  }

  /// Every generated binding exported under `exported`.
  pub fn bindings_exported_as<'a>(&'a self, exported: &'a str) -> impl Iterator<Item = &'a str> {
    self
      .exports
      .iter()
      .filter(move |(_, name)| name.as_str() == exported)
      .map(|(binding, _)| binding.as_str())
  }
}
