use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Bundle-wide unique id of a module. Every generated name embeds it, which is what keeps names
/// from different modules apart without a shared registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(u32);

impl AssetId {
  pub const fn new(raw: u32) -> Self {
    Self(raw)
  }

  #[inline]
  pub fn raw(self) -> u32 {
    self.0
  }
}

impl From<u32> for AssetId {
  fn from(raw: u32) -> Self {
    Self(raw)
  }
}

impl Display for AssetId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(itoa::Buffer::new().format(self.0))
  }
}
