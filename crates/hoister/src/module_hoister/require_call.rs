use hoister_ecmascript::ecma_utils::ExpressionExt;
use oxc::ast::ast::{Argument, CallExpression, Expression};

use super::ModuleHoister;

impl<'ast> ModuleHoister<'_, 'ast> {
  /// `require('x')` and `require.resolve('x')` with a free `require` and a single string argument.
  pub(super) fn try_rewrite_require_call(
    &self,
    call: &CallExpression<'ast>,
  ) -> Option<Expression<'ast>> {
    let [Argument::StringLiteral(request)] = call.arguments.as_slice() else {
      return None;
    };
    let request = request.value.as_str();

    let mut marker = match &call.callee {
      Expression::Identifier(callee) if callee.name == "require" && self.is_free(callee) => {
        // Requests the pipeline did not resolve are left for later stages.
        if !self.ctx.dependencies.contains(request) {
          return None;
        }
        tracing::trace!(request, "require marker");
        self.require_marker_expr(request)
      }
      Expression::StaticMemberExpression(member)
        if member.property.name == "resolve"
          && member
            .object
            .as_identifier()
            .is_some_and(|object| object.name == "require" && self.is_free(object)) =>
      {
        tracing::trace!(request, "require.resolve marker");
        self.require_resolve_marker_expr(request)
      }
      _ => return None,
    };

    if let Expression::CallExpression(marker_call) = &mut marker {
      marker_call.pure = call.pure;
    }
    Some(marker)
  }
}
