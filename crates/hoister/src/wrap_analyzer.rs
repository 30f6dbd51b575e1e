use std::fmt::Display;

use oxc::{
  ast::ast::{self, BindingPatternKind, Expression, Statement},
  ast_visit::{Visit, walk},
  semantic::{ScopeFlags, Scoping},
  syntax::operator::UnaryOperator,
};

/// Why a module has to keep its own function scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapReason {
  /// A direct `eval(...)` may read any top-level binding by its source name.
  Eval,
  /// `return` outside of any function only works inside a function wrapper.
  TopLevelReturn,
  /// `module` escapes as a value, so `module.exports` can't be tracked statically.
  FreeModuleReference,
}

impl Display for WrapReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Self::Eval => "eval",
      Self::TopLevelReturn => "top-level return",
      Self::FreeModuleReference => "free `module` reference",
    })
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WrapVerdict {
  pub reason: Option<WrapReason>,
  /// The body already is the isolating closure produced by an earlier run.
  pub already_wrapped: bool,
}

impl WrapVerdict {
  #[inline]
  pub fn should_wrap(self) -> bool {
    self.reason.is_some() || self.already_wrapped
  }
}

/// Read-only walk over a module deciding whether its bindings can join the shared scope. The walk
/// stops descending as soon as a reason is found.
pub struct WrapAnalyzer<'a> {
  scoping: &'a Scoping,
  function_depth: u32,
  reason: Option<WrapReason>,
}

impl<'a> WrapAnalyzer<'a> {
  pub fn new(scoping: &'a Scoping) -> Self {
    Self { scoping, function_depth: 0, reason: None }
  }

  pub fn analyze(mut self, program: &ast::Program<'_>, exports_name: &str) -> WrapVerdict {
    if is_isolated_module_body(program, exports_name) {
      return WrapVerdict { reason: None, already_wrapped: true };
    }
    self.visit_program(program);
    WrapVerdict { reason: self.reason, already_wrapped: false }
  }

  fn is_free(&self, ident: &ast::IdentifierReference) -> bool {
    ident.reference_id.get().is_none_or(|id| self.scoping.get_reference(id).symbol_id().is_none())
  }

  #[inline]
  fn found(&self) -> bool {
    self.reason.is_some()
  }
}

impl<'ast> Visit<'ast> for WrapAnalyzer<'_> {
  fn visit_statement(&mut self, it: &Statement<'ast>) {
    if !self.found() {
      walk::walk_statement(self, it);
    }
  }

  fn visit_expression(&mut self, it: &Expression<'ast>) {
    if !self.found() {
      walk::walk_expression(self, it);
    }
  }

  fn visit_function(&mut self, it: &ast::Function<'ast>, flags: ScopeFlags) {
    self.function_depth += 1;
    walk::walk_function(self, it, flags);
    self.function_depth -= 1;
  }

  fn visit_arrow_function_expression(&mut self, it: &ast::ArrowFunctionExpression<'ast>) {
    self.function_depth += 1;
    walk::walk_arrow_function_expression(self, it);
    self.function_depth -= 1;
  }

  fn visit_return_statement(&mut self, it: &ast::ReturnStatement<'ast>) {
    if self.function_depth == 0 {
      self.reason = Some(WrapReason::TopLevelReturn);
      return;
    }
    walk::walk_return_statement(self, it);
  }

  fn visit_call_expression(&mut self, it: &ast::CallExpression<'ast>) {
    if let Expression::Identifier(callee) = &it.callee {
      if callee.name == "eval" && self.is_free(callee) {
        self.reason = Some(WrapReason::Eval);
        return;
      }
    }
    walk::walk_call_expression(self, it);
  }

  // `module.exports`, `module.id`, ... are rewritten later.
  fn visit_static_member_expression(&mut self, it: &ast::StaticMemberExpression<'ast>) {
    if !matches!(it.object, Expression::Identifier(_)) {
      walk::walk_static_member_expression(self, it);
    }
  }

  // `typeof module`
  fn visit_unary_expression(&mut self, it: &ast::UnaryExpression<'ast>) {
    if !(it.operator == UnaryOperator::Typeof && matches!(it.argument, Expression::Identifier(_))) {
      walk::walk_unary_expression(self, it);
    }
  }

  fn visit_identifier_reference(&mut self, it: &ast::IdentifierReference<'ast>) {
    if it.name == "module" && self.is_free(it) {
      self.reason = Some(WrapReason::FreeModuleReference);
    }
  }
}

/// ```js
/// var $1$exports = (function () { ... }).call({});
/// ```
fn is_isolated_module_body(program: &ast::Program<'_>, exports_name: &str) -> bool {
  let [Statement::VariableDeclaration(decl)] = program.body.as_slice() else {
    return false;
  };
  let [declarator] = decl.declarations.as_slice() else {
    return false;
  };
  let BindingPatternKind::BindingIdentifier(id) = &declarator.id.kind else {
    return false;
  };
  let Some(Expression::CallExpression(call)) = declarator.init.as_ref().map(Expression::without_parentheses) else {
    return false;
  };
  let Expression::StaticMemberExpression(callee) = &call.callee else {
    return false;
  };
  id.name == exports_name
    && callee.property.name == "call"
    && matches!(callee.object.without_parentheses(), Expression::FunctionExpression(_))
}

#[cfg(test)]
mod tests {
  use hoister_ecmascript::EcmaCompiler;
  use oxc::{semantic::SemanticBuilder, span::SourceType};

  use super::{WrapAnalyzer, WrapReason, WrapVerdict};

  fn analyze(source: &str) -> WrapVerdict {
    let ast = EcmaCompiler::parse(source, SourceType::mjs()).unwrap();
    let scoping = SemanticBuilder::new().build(ast.program()).semantic.into_scoping();
    WrapAnalyzer::new(&scoping).analyze(ast.program(), "$1$exports")
  }

  #[test]
  fn plain_modules_are_flattened() {
    let verdict = analyze("const a = require('./a');\nmodule.exports = a + typeof module;\n");
    assert_eq!(verdict, WrapVerdict::default());
    assert!(!verdict.should_wrap());
  }

  #[test]
  fn direct_eval_forces_wrap() {
    assert_eq!(analyze("eval('x');").reason, Some(WrapReason::Eval));
    assert_eq!(analyze("function f() { return obj.eval('x'); }").reason, None);
  }

  #[test]
  fn top_level_return_forces_wrap() {
    assert_eq!(analyze("if (a) return;").reason, Some(WrapReason::TopLevelReturn));
    assert_eq!(analyze("function f() { return 1; }\n() => { return 2; };").reason, None);
  }

  #[test]
  fn escaping_module_forces_wrap() {
    assert_eq!(analyze("foo(module);").reason, Some(WrapReason::FreeModuleReference));
    assert_eq!(analyze("module[key] = 1;").reason, Some(WrapReason::FreeModuleReference));
    assert_eq!(analyze("var module = {}; foo(module);").reason, None);
    assert_eq!(analyze("module.exports.a = module.id;").reason, None);
  }

  #[test]
  fn first_reason_wins() {
    assert_eq!(analyze("eval('x'); foo(module); return;").reason, Some(WrapReason::Eval));
  }

  #[test]
  fn recognizes_an_isolated_body() {
    let verdict = analyze(
      "var $1$exports = (function () {\n  var exports = this;\n  var module = { exports: this };\n  foo(module);\n  return module.exports;\n}).call({});\n",
    );
    assert!(verdict.already_wrapped);
    assert_eq!(verdict.reason, None);
    assert!(verdict.should_wrap());
  }
}
