use arcstr::ArcStr;
use hoister_error::{BuildError, BuildResult};
use oxc::{
  allocator::Allocator,
  codegen::{Codegen, CodegenReturn},
  parser::{ParseOptions, Parser},
  span::SourceType,
};

use crate::ecma_ast::{
  EcmaAst,
  program_cell::{ProgramCell, ProgramCellDependent, ProgramCellOwner},
};

pub struct EcmaCompiler;

impl EcmaCompiler {
  /// Module code may `return` at the top level (CommonJS assumes a function wrapper), so the
  /// parser is told to accept it and leave the decision to the hoister.
  pub fn parse(source: impl Into<ArcStr>, source_type: SourceType) -> BuildResult<EcmaAst> {
    let owner = ProgramCellOwner { source: source.into(), allocator: Allocator::default() };
    let program = ProgramCell::try_new(owner, |owner| {
      let ret = Parser::new(&owner.allocator, &owner.source, source_type)
        .with_options(ParseOptions { allow_return_outside_function: true, ..ParseOptions::default() })
        .parse();
      if ret.panicked || !ret.errors.is_empty() {
        let errors = ret.errors.iter().map(|error| anyhow::anyhow!("{error}")).collect::<Vec<_>>();
        if errors.is_empty() {
          return Err(BuildError::single("parser panicked without a diagnostic"));
        }
        return Err(BuildError::from(errors));
      }
      Ok(ProgramCellDependent { program: ret.program })
    })?;

    Ok(EcmaAst { program, source_type })
  }

  pub fn print(ast: &EcmaAst) -> CodegenReturn {
    Codegen::new().build(ast.program())
  }
}

#[test]
fn basic_test() {
  let ast = EcmaCompiler::parse("const a = 1;", SourceType::mjs()).unwrap();
  let code = EcmaCompiler::print(&ast).code;
  assert_eq!(code, "const a = 1;\n");
}

#[test]
fn top_level_return_is_accepted() {
  let ast = EcmaCompiler::parse("if (a) return;\nfoo();", SourceType::mjs()).unwrap();
  assert_eq!(ast.program().body.len(), 2);
}

#[test]
fn syntax_errors_are_collected() {
  let error = EcmaCompiler::parse("const = 1;", SourceType::mjs()).unwrap_err();
  assert!(!error.is_empty());
}
