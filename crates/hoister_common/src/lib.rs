mod runtime_markers;
mod types;

pub use crate::{
  runtime_markers::{
    EXPORT_WILDCARD_MARKER, GLOBAL_IDENTIFIER, IMPORT_MARKER, REQUIRE_MARKER,
    REQUIRE_RESOLVE_MARKER,
  },
  types::{
    asset::Asset,
    asset_id::AssetId,
    canonical_names::{CanonicalNames, NameKind},
    hoist_meta::{HoistFlags, HoistMeta},
    package_json::PackageJson,
  },
};
