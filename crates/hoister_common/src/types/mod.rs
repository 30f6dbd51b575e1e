pub mod asset;
pub mod asset_id;
pub mod canonical_names;
pub mod hoist_meta;
pub mod package_json;
