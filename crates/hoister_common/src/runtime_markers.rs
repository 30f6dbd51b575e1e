//! Callee names of the placeholder calls left behind for the packager. The packager recognizes
//! them by name, so they must stay bit-exact.

/// `$parcel$import(id, source, name, replace)`
pub const IMPORT_MARKER: &str = "$parcel$import";
/// `$parcel$require(id, source)`
pub const REQUIRE_MARKER: &str = "$parcel$require";
/// `$parcel$require$resolve(id, source)`
pub const REQUIRE_RESOLVE_MARKER: &str = "$parcel$require$resolve";
/// `$parcel$exportWildcard(dest, $parcel$require(id, source))`
pub const EXPORT_WILDCARD_MARKER: &str = "$parcel$exportWildcard";
/// Stands in for the free `global` identifier.
pub const GLOBAL_IDENTIFIER: &str = "$parcel$global";
