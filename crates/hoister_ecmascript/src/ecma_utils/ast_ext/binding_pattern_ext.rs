use oxc::ast::ast::{self, BindingPatternKind};
use smallvec::SmallVec;

pub trait BindingPatternExt<'ast> {
  fn binding_identifiers(&self) -> SmallVec<[&ast::BindingIdentifier<'ast>; 1]>;
}

impl<'ast> BindingPatternExt<'ast> for ast::BindingPattern<'ast> {
  /// Every identifier bound by the pattern, in source order.
  fn binding_identifiers(&self) -> SmallVec<[&ast::BindingIdentifier<'ast>; 1]> {
    let mut stack = vec![&self.kind];
    let mut ret = SmallVec::default();
    while let Some(kind) = stack.pop() {
      match kind {
        BindingPatternKind::BindingIdentifier(id) => ret.push(&**id),
        BindingPatternKind::ArrayPattern(arr_pat) => {
          if let Some(rest) = &arr_pat.rest {
            stack.push(&rest.argument.kind);
          }
          stack.extend(arr_pat.elements.iter().rev().flatten().map(|pat| &pat.kind));
        }
        BindingPatternKind::ObjectPattern(obj_pat) => {
          if let Some(rest) = &obj_pat.rest {
            stack.push(&rest.argument.kind);
          }
          stack.extend(obj_pat.properties.iter().rev().map(|prop| &prop.value.kind));
        }
        BindingPatternKind::AssignmentPattern(assign_pat) => stack.push(&assign_pat.left.kind),
      }
    }
    ret
  }
}

impl<'ast> BindingPatternExt<'ast> for ast::VariableDeclaration<'ast> {
  fn binding_identifiers(&self) -> SmallVec<[&ast::BindingIdentifier<'ast>; 1]> {
    self.declarations.iter().flat_map(|decl| decl.id.binding_identifiers()).collect()
  }
}
