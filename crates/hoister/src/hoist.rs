use hoister_common::{Asset, CanonicalNames, HoistFlags, HoistMeta, PackageJson};
use hoister_ecmascript::{EcmaAst, WithMutFields};
use hoister_utils::rayon::{IntoParallelRefMutIterator, ParallelIterator};
use oxc::{ast_visit::VisitMut, semantic::SemanticBuilder};

use crate::{
  module_hoister::{ModuleHoister, ModuleHoisterContext},
  top_level_renamer::finalize_module,
  wrap_analyzer::{WrapAnalyzer, WrapVerdict},
};

/// Rewrites one module so it can share the bundle's top-level scope, and records what the linker
/// needs in `asset.meta`.
pub fn hoist_module(ast: &mut EcmaAst, asset: &mut Asset) -> WrapVerdict {
  let Asset { id, dependencies, package, globals, meta } = asset;
  let names = CanonicalNames::new(*id);
  let side_effect_free = package.as_ref().is_some_and(PackageJson::is_side_effect_free);
  *meta = HoistMeta::default();

  ast.program.with_mut(|WithMutFields { allocator, program, .. }| {
    let scoping = SemanticBuilder::new().build(program).semantic.into_scoping();

    // The verdict is final before anything is rewritten.
    let verdict = WrapAnalyzer::new(&scoping).analyze(program, &names.exports());
    if verdict.reason.is_some() {
      meta.flags.insert(HoistFlags::IS_COMMONJS);
    }
    meta.flags.set(HoistFlags::SHOULD_WRAP, verdict.should_wrap());
    tracing::debug!(
      id = %id,
      reason = ?verdict.reason,
      wrapped = verdict.should_wrap(),
      "hoisting module"
    );

    let ctx = ModuleHoisterContext {
      id: *id,
      names: &names,
      scoping: &scoping,
      dependencies,
      side_effect_free,
      verdict,
    };
    let mut hoister = ModuleHoister::new(ctx, allocator, meta, globals);
    hoister.visit_program(program);
    let aliases = hoister.into_aliases();

    finalize_module(program, allocator, &names, verdict, &aliases);
    verdict
  })
}

/// Modules don't share any state while being hoisted, so they are processed in parallel.
pub fn hoist_modules(modules: &mut [(EcmaAst, Asset)]) {
  modules.par_iter_mut().for_each(|(ast, asset)| {
    hoist_module(ast, asset);
  });
}
