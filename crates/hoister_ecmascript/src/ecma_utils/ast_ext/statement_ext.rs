use oxc::ast::ast;

pub trait StatementExt<'ast> {
  fn is_module_declaration(&self) -> bool;
}

impl<'ast> StatementExt<'ast> for ast::Statement<'ast> {
  /// `import ...`, `export ...` in any of their forms.
  fn is_module_declaration(&self) -> bool {
    matches!(
      self,
      ast::Statement::ImportDeclaration(_)
        | ast::Statement::ExportAllDeclaration(_)
        | ast::Statement::ExportDefaultDeclaration(_)
        | ast::Statement::ExportNamedDeclaration(_)
    )
  }
}
