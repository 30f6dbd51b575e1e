mod hoist;
mod module_hoister;
mod symbol_alias_table;
mod top_level_renamer;
mod utils;
mod wrap_analyzer;

pub use crate::{
  hoist::{hoist_module, hoist_modules},
  symbol_alias_table::SymbolAliasTable,
  wrap_analyzer::{WrapReason, WrapVerdict},
};
