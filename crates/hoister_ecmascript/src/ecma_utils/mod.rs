mod ast_ext;
mod ast_snippet;

pub use {
  ast_ext::{
    binding_pattern_ext::BindingPatternExt, expression_ext::ExpressionExt,
    statement_ext::StatementExt,
  },
  ast_snippet::AstSnippet,
};
