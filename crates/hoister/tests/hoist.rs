use hoister::{WrapReason, WrapVerdict, hoist_module, hoist_modules};
use hoister_common::{Asset, PackageJson};
use hoister_ecmascript::EcmaCompiler;
use oxc::{
  ast::ast,
  ast_visit::{Visit, walk},
  span::SourceType,
};

struct Hoisted {
  code: String,
  asset: Asset,
  verdict: WrapVerdict,
}

fn hoist(source: &str, mut asset: Asset) -> Hoisted {
  let mut ast = EcmaCompiler::parse(source, SourceType::mjs()).unwrap();
  let verdict = hoist_module(&mut ast, &mut asset);
  Hoisted { code: EcmaCompiler::print(&ast).code, asset, verdict }
}

/// Prints `code` the same way hoisted code is printed.
fn normalize(code: &str) -> String {
  EcmaCompiler::print(&EcmaCompiler::parse(code, SourceType::mjs()).unwrap()).code
}

fn exports_of(asset: &Asset) -> Vec<(&str, &str)> {
  asset.meta.exports.iter().map(|(binding, exported)| (binding.as_str(), exported.as_str())).collect()
}

#[test]
fn named_imports_and_exports() {
  let hoisted = hoist(
    "import { a } from \"./a\";\nexport const b = a + 1;\n",
    Asset::new(1),
  );
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
var $1$var$_a = $parcel$import(1, \"./a\", \"a\", true);
const $1$export$b = $1$var$_a + 1;
$1$exports.b = $1$export$b;
"
    )
  );
  assert_eq!(exports_of(&hoisted.asset), vec![("$1$export$b", "b")]);
  assert!(hoisted.asset.meta.is_es6_module());
  assert!(!hoisted.asset.meta.is_commonjs());
  assert!(!hoisted.asset.meta.should_wrap());
}

#[test]
fn import_references_follow_scopes() {
  let hoisted = hoist(
    "import { a } from \"./a\";\nfunction f(a) { return a; }\nf(a);\nuse({ a });\n",
    Asset::new(1),
  );
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$var$_a = $parcel$import(1, \"./a\", \"a\", true);
function $1$var$f(a) { return a; }
$1$var$f($1$var$_a);
use({ a: $1$var$_a });
"
    )
  );
}

#[test]
fn generated_names_avoid_renamed_top_level_bindings() {
  let hoisted = hoist("import { a } from \"./a\";\nvar _a = 2;\nuse(a, _a);\n", Asset::new(1));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$var$_a2 = $parcel$import(1, \"./a\", \"a\", true);
var $1$var$_a = 2;
use($1$var$_a2, $1$var$_a);
"
    )
  );

  let hoisted = hoist("export let n = 0;\nvar _value = 5;\nuse(n++, _value);\n", Asset::new(1));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
var $1$var$_value2;
let $1$export$n = 0;
$1$exports.n = $1$export$n;
var $1$var$_value = 5;
use(($1$var$_value2 = $1$export$n++, $1$exports.n = $1$export$n, $1$var$_value2), $1$var$_value);
"
    )
  );
}

#[test]
fn namespace_and_side_effect_imports() {
  let hoisted = hoist(
    "import \"./side\";\nimport * as lib from \"./lib\";\nlib.run();\n",
    Asset::new(2),
  );
  assert_eq!(
    hoisted.code,
    normalize("var $2$var$lib = $parcel$require(2, \"./lib\");\n$2$var$lib.run();\n")
  );
  assert!(hoisted.asset.meta.is_es6_module());
}

#[test]
fn commonjs_exports_are_canonicalized() {
  let hoisted = hoist(
    "const dep = require(\"./dep\");
module.exports.foo = dep.bar;
exports.baz = function () { return this; };
",
    Asset::new(1).with_dependencies(["./dep"]),
  );
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
const $1$var$dep = $parcel$require(1, \"./dep\");
$1$exports.foo = $1$var$dep.bar;
var $1$export$baz = function () { return this; };
$1$exports.baz = $1$export$baz;
"
    )
  );
  assert!(hoisted.asset.meta.is_commonjs());
  assert!(!hoisted.asset.meta.is_es6_module());
  assert_eq!(hoisted.verdict, WrapVerdict::default());
}

#[test]
fn module_exports_assignment() {
  let hoisted = hoist("module.exports = { a: 1 };\n", Asset::new(4));
  assert_eq!(hoisted.code, normalize("var $4$exports = {};\n$4$exports = { a: 1 };\n"));
  assert!(hoisted.asset.meta.is_commonjs());
}

#[test]
fn shadowed_commonjs_names_are_untouched() {
  let hoisted = hoist(
    "function f(exports, module, require) {\n  exports.a = module.id;\n  return require(\"./a\");\n}\n",
    Asset::new(1).with_dependencies(["./a"]),
  );
  assert_eq!(
    hoisted.code,
    normalize(
      "function $1$var$f(exports, module, require) {\n  exports.a = module.id;\n  return require(\"./a\");\n}\n"
    )
  );
  assert!(!hoisted.asset.meta.is_commonjs());
}

#[test]
fn module_properties_and_typeof_checks() {
  let hoisted = hoist(
    "var id = module.id;
if (module.hot) module.hot.accept();
var load = module.bundle;
var t = typeof module + typeof require;
",
    Asset::new(1),
  );
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$var$id = 1;
if (null) null.accept();
var $1$var$load = require;
var $1$var$t = \"object\" + \"function\";
"
    )
  );
  assert!(!hoisted.verdict.should_wrap());
}

#[test]
fn top_level_this_is_the_exports_object() {
  let hoisted = hoist(
    "this.a = 1;\nfunction f() { return this; }\nconst g = () => this;\n",
    Asset::new(1),
  );
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
$1$exports.a = 1;
function $1$var$f() { return this; }
const $1$var$g = () => $1$exports;
"
    )
  );
  assert!(hoisted.asset.meta.is_commonjs());
}

#[test]
fn eval_wraps_the_module() {
  let hoisted = hoist("var x = 1;\neval(\"x\");\nmodule.exports = x;\n", Asset::new(1));
  assert_eq!(hoisted.verdict.reason, Some(WrapReason::Eval));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = (function () {
  var exports = this;
  var module = { exports: this };
  var x = 1;
  eval(\"x\");
  module.exports = x;
  return module.exports;
}).call({});
"
    )
  );
  assert!(hoisted.asset.meta.is_commonjs());
  assert!(hoisted.asset.meta.should_wrap());
}

#[test]
fn shadowed_eval_keeps_the_module_flat() {
  let hoisted = hoist("function eval() {}\neval(\"x\");\n", Asset::new(1));
  assert_eq!(hoisted.verdict, WrapVerdict::default());
  assert!(!hoisted.asset.meta.should_wrap());
  assert_eq!(hoisted.code, normalize("function $1$var$eval() {}\n$1$var$eval(\"x\");\n"));
}

#[test]
fn top_level_return_wraps_the_module() {
  let hoisted = hoist("if (a) return 5;\nexports.x = 1;\n", Asset::new(1));
  assert_eq!(hoisted.verdict.reason, Some(WrapReason::TopLevelReturn));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = (function () {
  var exports = this;
  var module = { exports: this };
  if (a) return (5, module.exports);
  exports.x = 1;
  return module.exports;
}).call({});
"
    )
  );
}

#[test]
fn escaping_module_wraps_the_module() {
  let hoisted = hoist("use(module);\n", Asset::new(1));
  assert_eq!(hoisted.verdict.reason, Some(WrapReason::FreeModuleReference));
  assert!(hoisted.asset.meta.should_wrap());
  assert!(hoisted.code.starts_with("var $1$exports = (function"), "{}", hoisted.code);
}

#[test]
fn default_export_of_a_constant_renames_it() {
  let hoisted = hoist("function foo() {}\nexport default foo;\n", Asset::new(1));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
function $1$export$default() {}
$1$exports.default = $1$export$default;
"
    )
  );
  assert_eq!(exports_of(&hoisted.asset), vec![("$1$export$default", "default")]);
}

#[test]
fn default_export_of_a_mutable_binding_copies_it() {
  let hoisted = hoist("let count = 0;\nexport default count;\ncount++;\n", Asset::new(1));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
let $1$var$count = 0;
var $1$export$default = $1$var$count;
$1$exports.default = $1$export$default;
$1$var$count++;
"
    )
  );
}

#[test]
fn default_export_of_expressions() {
  for (source, declaration) in [
    ("export default 40 + 2;", "var $1$export$default = 40 + 2;"),
    ("export default function () {}", "var $1$export$default = function () {};"),
    ("export default class {}", "var $1$export$default = class {};"),
  ] {
    let hoisted = hoist(source, Asset::new(1));
    assert_eq!(
      hoisted.code,
      normalize(&format!(
        "var $1$exports = {{}};\n{declaration}\n$1$exports.default = $1$export$default;\n"
      )),
      "{source}"
    );
  }
}

#[test]
fn default_export_of_a_named_declaration() {
  let hoisted = hoist("export default class Foo {}\nnew Foo();\n", Asset::new(1));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
class $1$export$default {}
$1$exports.default = $1$export$default;
new $1$export$default();
"
    )
  );
}

#[test]
fn one_binding_exported_under_two_names() {
  let hoisted = hoist("const x = 1;\nexport { x as y, x as z };\n", Asset::new(1));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
const $1$export$y = 1;
$1$exports.y = $1$export$y;
$1$exports.z = $1$export$y;
"
    )
  );
  assert_eq!(exports_of(&hoisted.asset), vec![("$1$export$y", "y"), ("$1$export$z", "y")]);
  let meta = &hoisted.asset.meta;
  assert_eq!(meta.export_name_of("$1$export$z"), Some("y"));
  assert_eq!(meta.export_name_of("$1$var$x"), None);
  assert_eq!(meta.bindings_exported_as("y").collect::<Vec<_>>(), vec!["$1$export$y", "$1$export$z"]);
  assert_eq!(meta.bindings_exported_as("z").count(), 0);
}

#[test]
fn named_then_default_export_keeps_one_rename() {
  let hoisted = hoist("const x = 1;\nexport { x };\nexport default x;\n", Asset::new(1));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
const $1$export$x = 1;
$1$exports.x = $1$export$x;
var $1$export$default = $1$export$x;
$1$exports.default = $1$export$default;
"
    )
  );
}

#[test]
fn export_before_declaration_is_assigned_at_the_end() {
  let hoisted = hoist("export { a };\nlet a = 1;\n", Asset::new(1));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
let $1$export$a = 1;
$1$exports.a = $1$export$a;
"
    )
  );
}

#[test]
fn hoisted_functions_are_exported_in_place() {
  let hoisted = hoist("export { f, v };\nfunction f() {}\nvar v = 1;\n", Asset::new(1));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
$1$exports.f = $1$export$f;
function $1$export$f() {}
var $1$export$v = 1;
$1$exports.v = $1$export$v;
"
    )
  );
  assert_eq!(exports_of(&hoisted.asset), vec![("$1$export$f", "f"), ("$1$export$v", "v")]);
}

#[test]
fn reexports_with_source() {
  let hoisted = hoist(
    "export { a as b, default } from \"./a\";\nexport * as ns from \"./c\";\n",
    Asset::new(1),
  );
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
var $1$export$b = $parcel$import(1, \"./a\", \"a\", false);
$1$exports.b = $1$export$b;
var $1$export$default = $parcel$import(1, \"./a\", \"default\", false);
$1$exports.default = $1$export$default;
var $1$export$ns = $parcel$require(1, \"./c\");
$1$exports.ns = $1$export$ns;
"
    )
  );
  assert_eq!(
    exports_of(&hoisted.asset),
    vec![("$1$export$b", "b"), ("$1$export$default", "default"), ("$1$export$ns", "ns")]
  );
}

#[test]
fn wildcards_merge_in_order() {
  let hoisted = hoist("export * from \"./a\";\nexport * from \"./b\";\n", Asset::new(1));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$var$_$1$exports2 = $parcel$exportWildcard({}, $parcel$require(1, \"./a\"));
var $1$exports = $parcel$exportWildcard($1$var$_$1$exports2, $parcel$require(1, \"./b\"));
"
    )
  );
  assert_eq!(hoisted.asset.meta.wildcards, vec!["./a", "./b"]);
}

#[test]
fn wildcard_in_a_wrapped_module_merges_into_exports() {
  let hoisted = hoist("export * from \"./a\";\neval(\"\");\n", Asset::new(1));
  assert!(hoisted.verdict.should_wrap());
  assert!(
    hoisted.code.contains("$parcel$exportWildcard(exports, $parcel$require(1, \"./a\"));"),
    "{}",
    hoisted.code
  );
  assert_eq!(hoisted.asset.meta.wildcards, vec!["./a"]);
  assert!(hoisted.asset.meta.is_es6_module());
}

#[test]
fn live_bindings_update_the_exports_object() {
  let hoisted = hoist(
    "export let count = 0;\nexport function inc() { count += 1; }\n",
    Asset::new(1),
  );
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
let $1$export$count = 0;
$1$exports.count = $1$export$count;
function $1$export$inc() {
  $1$export$count += 1;
  $1$exports.count = $1$export$count;
}
$1$exports.inc = $1$export$inc;
"
    )
  );
}

#[test]
fn nested_writes_keep_their_value() {
  let hoisted = hoist("export let n = 0;\nuse(n++);\nif (a) n = 2;\n", Asset::new(1));
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$exports = {};
var $1$var$_value;
let $1$export$n = 0;
$1$exports.n = $1$export$n;
use(($1$var$_value = $1$export$n++, $1$exports.n = $1$export$n, $1$var$_value));
if (a) {
  $1$export$n = 2;
  $1$exports.n = $1$export$n;
}
"
    )
  );
}

#[test]
fn require_calls_outside_the_dependency_set_are_kept() {
  let hoisted = hoist(
    "const a = require(\"./a\");\nconst b = require(\"./b\");\nconst p = require.resolve(\"./c\");\n",
    Asset::new(1).with_dependencies(["./a"]),
  );
  assert_eq!(
    hoisted.code,
    normalize(
      "const $1$var$a = $parcel$require(1, \"./a\");
const $1$var$b = require(\"./b\");
const $1$var$p = $parcel$require$resolve(1, \"./c\");
"
    )
  );
}

#[test]
fn require_with_a_computed_request_is_kept() {
  let hoisted = hoist(
    "const name = \"./a\";\nconst m = require(name);\n",
    Asset::new(1).with_dependencies(["./a"]),
  );
  assert_eq!(
    hoisted.code,
    normalize("const $1$var$name = \"./a\";\nconst $1$var$m = require($1$var$name);\n")
  );
}

#[test]
fn globals_are_injected_once() {
  let hoisted = hoist(
    "global.env = process.env.NODE_ENV;\nprocess.exit();\n",
    Asset::new(1)
      .with_dependencies(["process"])
      .with_global("process", "var process = require(\"process\");"),
  );
  assert_eq!(
    hoisted.code,
    normalize(
      "var $1$var$process = $parcel$require(1, \"process\");
$parcel$global.env = $1$var$process.env.NODE_ENV;
$1$var$process.exit();
"
    )
  );
  assert!(hoisted.asset.globals.is_empty());
}

#[test]
fn unparsable_globals_are_skipped() {
  let hoisted =
    hoist("use(Buffer);\n", Asset::new(1).with_global("Buffer", "var Buffer = ;"));
  assert_eq!(hoisted.code, normalize("use(Buffer);\n"));
  assert!(hoisted.asset.globals.is_empty());
}

#[test]
fn use_strict_is_dropped() {
  let hoisted = hoist("\"use strict\";\nvar a = 1;\n", Asset::new(1));
  assert_eq!(hoisted.code, normalize("var $1$var$a = 1;\n"));
}

#[derive(Default)]
struct CallCollector {
  calls: Vec<(String, bool)>,
}

impl<'a> Visit<'a> for CallCollector {
  fn visit_call_expression(&mut self, call: &ast::CallExpression<'a>) {
    if let ast::Expression::Identifier(callee) = &call.callee {
      self.calls.push((callee.name.to_string(), call.pure));
    }
    walk::walk_call_expression(self, call);
  }
}

#[test]
fn side_effect_free_packages_mark_top_level_calls_pure() {
  let source = "const a = create();\nconst r = require(\"./r\");\nfunction f() { return make(); }\n";
  let package = PackageJson::default().with_side_effects(Some(false));
  let mut asset = Asset::new(1).with_dependencies(["./r"]).with_package(package);
  let mut ast = EcmaCompiler::parse(source, SourceType::mjs()).unwrap();
  hoist_module(&mut ast, &mut asset);

  let mut collector = CallCollector::default();
  collector.visit_program(ast.program());
  assert_eq!(
    collector.calls,
    vec![
      ("create".to_string(), true),
      ("$parcel$require".to_string(), true),
      ("make".to_string(), false),
    ]
  );

  let mut ast = EcmaCompiler::parse(source, SourceType::mjs()).unwrap();
  hoist_module(&mut ast, &mut Asset::new(1).with_dependencies(["./r"]));
  let mut collector = CallCollector::default();
  collector.visit_program(ast.program());
  assert!(collector.calls.iter().all(|(_, pure)| !pure));
}

#[test]
fn metadata_is_reset_between_runs() {
  let mut asset = Asset::new(1);
  let mut ast = EcmaCompiler::parse("export const a = 1;\n", SourceType::mjs()).unwrap();
  hoist_module(&mut ast, &mut asset);
  assert_eq!(asset.meta.exports.len(), 1);

  let mut ast = EcmaCompiler::parse("exports.a = 1;\n", SourceType::mjs()).unwrap();
  hoist_module(&mut ast, &mut asset);
  assert!(asset.meta.exports.is_empty());
  assert!(asset.meta.is_commonjs());
  assert!(!asset.meta.is_es6_module());
}

#[test]
fn hoisting_twice_changes_nothing() {
  let sources = [
    "import { a } from \"./a\";\nexport const b = a + 1;\nexport default function () {}\n",
    "const dep = require(\"./dep\");\nexports.x = dep;\nmodule.exports.y = this;\n",
    "export * from \"./a\";\nexport * from \"./b\";\nexport let n = 0;\nn++;\n",
    "var x = 1;\neval(\"x\");\nmodule.exports = x;\n",
    "global.a = process;\n",
  ];
  for source in sources {
    let asset = Asset::new(7)
      .with_dependencies(["./dep", "process"])
      .with_global("process", "var process = require(\"process\");");
    let first = hoist(source, asset.clone());
    let second = hoist(&first.code, asset);
    assert_eq!(first.code, second.code, "{source}");
  }
}

#[test]
fn modules_are_hoisted_in_parallel() {
  let mut modules = (1..=8u32)
    .map(|id| {
      let ast = EcmaCompiler::parse("var a = 1;\nexports.a = a;\n", SourceType::mjs()).unwrap();
      (ast, Asset::new(id))
    })
    .collect::<Vec<_>>();
  hoist_modules(&mut modules);
  for (ast, asset) in &modules {
    let id = asset.id;
    let code = EcmaCompiler::print(ast).code;
    assert!(code.contains(&format!("var ${id}$var$a = 1;")), "{code}");
    assert!(code.contains(&format!("var ${id}$export$a = ${id}$var$a;")), "{code}");
    assert!(asset.meta.is_commonjs());
  }
}
