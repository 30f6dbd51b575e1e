use oxc::{
  allocator::{self, Allocator, Box, Dummy, IntoIn, TakeIn},
  ast::{
    AstBuilder, NONE,
    ast::{self, Argument, BindingIdentifier, Statement},
  },
  span::{Atom, SPAN, Span},
  syntax::{number::NumberBase, operator::AssignmentOperator},
};

type PassedStr<'a> = &'a str;

// `AstBuilder` is more suitable name, but it's already used in oxc.
pub struct AstSnippet<'ast> {
  pub builder: AstBuilder<'ast>,
}

impl<'ast> AstSnippet<'ast> {
  pub fn new(alloc: &'ast Allocator) -> Self {
    Self { builder: AstBuilder::new(alloc) }
  }

  #[inline]
  pub fn alloc(&self) -> &'ast Allocator {
    self.builder.allocator
  }

  pub fn atom(&self, value: &str) -> Atom<'ast> {
    self.builder.atom(value)
  }

  #[inline]
  pub fn alloc_id_ref(
    &self,
    name: PassedStr,
    span: Span,
  ) -> Box<'ast, ast::IdentifierReference<'ast>> {
    self.builder.alloc_identifier_reference(span, self.builder.atom(name))
  }

  #[inline]
  pub fn id_name(&self, name: PassedStr, span: Span) -> ast::IdentifierName<'ast> {
    self.builder.identifier_name(span, self.builder.atom(name))
  }

  #[inline]
  pub fn id_ref_expr(&self, name: PassedStr, span: Span) -> ast::Expression<'ast> {
    self.builder.expression_identifier(span, self.builder.atom(name))
  }

  /// `[object].[property]`
  #[inline]
  pub fn literal_prop_access_member_expr_expr(
    &self,
    object: PassedStr,
    property: PassedStr,
  ) -> ast::Expression<'ast> {
    ast::Expression::StaticMemberExpression(self.builder.alloc_static_member_expression(
      SPAN,
      self.id_ref_expr(object, SPAN),
      self.id_name(property, SPAN),
      false,
    ))
  }

  /// `[object].[property] = [value]`, or `[object]["[property]"] = [value]` when the property is
  /// not a valid identifier name.
  pub fn member_assign_expr(
    &self,
    object: PassedStr,
    property: PassedStr,
    value: ast::Expression<'ast>,
  ) -> ast::Expression<'ast> {
    let target = if oxc::syntax::identifier::is_identifier_name(property) {
      ast::AssignmentTarget::StaticMemberExpression(self.builder.alloc_static_member_expression(
        SPAN,
        self.id_ref_expr(object, SPAN),
        self.id_name(property, SPAN),
        false,
      ))
    } else {
      ast::AssignmentTarget::ComputedMemberExpression(
        self.builder.alloc_computed_member_expression(
          SPAN,
          self.id_ref_expr(object, SPAN),
          self.string_literal_expr(property, SPAN),
          false,
        ),
      )
    };
    self.builder.expression_assignment(SPAN, AssignmentOperator::Assign, target, value)
  }

  /// `[object].[property] = [value];`
  pub fn member_assign_stmt(
    &self,
    object: PassedStr,
    property: PassedStr,
    value: ast::Expression<'ast>,
  ) -> ast::Statement<'ast> {
    self.builder.statement_expression(SPAN, self.member_assign_expr(object, property, value))
  }

  /// `[name] = [value]`
  pub fn id_assign_expr(&self, name: PassedStr, value: ast::Expression<'ast>) -> ast::Expression<'ast> {
    self.builder.expression_assignment(
      SPAN,
      AssignmentOperator::Assign,
      self.simple_id_assignment_target(name, SPAN),
      value,
    )
  }

  /// `name(...args)`
  pub fn call_expr_with_args(
    &self,
    name: PassedStr,
    args: impl IntoIterator<Item = ast::Expression<'ast>>,
  ) -> ast::Expression<'ast> {
    let arguments = self.builder.vec_from_iter(args.into_iter().map(Argument::from));
    ast::Expression::CallExpression(self.builder.alloc_call_expression(
      SPAN,
      self.id_ref_expr(name, SPAN),
      NONE,
      arguments,
      false,
    ))
  }

  /// `var [name] = [init]`
  #[inline]
  pub fn var_decl_stmt(
    &self,
    name: PassedStr,
    init: ast::Expression<'ast>,
  ) -> ast::Statement<'ast> {
    self.var_decl_stmt_with_init(name, Some(init))
  }

  /// `var [name]`
  #[inline]
  pub fn var_decl_stmt_without_init(&self, name: PassedStr) -> ast::Statement<'ast> {
    self.var_decl_stmt_with_init(name, None)
  }

  fn var_decl_stmt_with_init(
    &self,
    name: PassedStr,
    init: Option<ast::Expression<'ast>>,
  ) -> ast::Statement<'ast> {
    let declarations = self.builder.vec1(self.builder.variable_declarator(
      SPAN,
      ast::VariableDeclarationKind::Var,
      self.builder.binding_pattern(
        self.builder.binding_pattern_kind_binding_identifier(SPAN, self.builder.atom(name)),
        NONE,
        false,
      ),
      init,
      false,
    ));

    ast::Statement::from(ast::Declaration::VariableDeclaration(
      self.builder.alloc_variable_declaration(
        SPAN,
        ast::VariableDeclarationKind::Var,
        declarations,
        false,
      ),
    ))
  }

  /// ```js
  /// (a, b, ...)
  /// ```
  pub fn seq_in_paren_expr(
    &self,
    expressions: impl IntoIterator<Item = ast::Expression<'ast>>,
  ) -> ast::Expression<'ast> {
    let seq_expr = self.builder.expression_sequence(SPAN, self.builder.vec_from_iter(expressions));
    self.builder.expression_parenthesized(SPAN, seq_expr)
  }

  pub fn number_expr(&self, value: f64, raw: PassedStr) -> ast::Expression<'ast> {
    ast::Expression::NumericLiteral(self.builder.alloc_numeric_literal(
      SPAN,
      value,
      Some(self.builder.atom(raw)),
      NumberBase::Decimal,
    ))
  }

  pub fn null_expr(&self) -> ast::Expression<'ast> {
    self.builder.expression_null_literal(SPAN)
  }

  pub fn string_literal_expr(&self, value: PassedStr, span: Span) -> ast::Expression<'ast> {
    ast::Expression::StringLiteral(self.builder.alloc_string_literal(
      span,
      self.builder.atom(value),
      None,
    ))
  }

  /// `{}`
  pub fn empty_object_expr(&self) -> ast::Expression<'ast> {
    ast::Expression::ObjectExpression(Box::new_in(
      ast::ObjectExpression::dummy(self.alloc()),
      self.alloc(),
    ))
  }

  /// `{ [key]: [value] }`
  pub fn single_prop_object_expr(
    &self,
    key: PassedStr,
    value: ast::Expression<'ast>,
  ) -> ast::Expression<'ast> {
    let mut object = ast::ObjectExpression::dummy(self.alloc());
    object.properties.push(ast::ObjectPropertyKind::ObjectProperty(
      ast::ObjectProperty {
        key: ast::PropertyKey::StaticIdentifier(self.id_name(key, SPAN).into_in(self.alloc())),
        value,
        ..ast::ObjectProperty::dummy(self.alloc())
      }
      .into_in(self.alloc()),
    ));
    ast::Expression::ObjectExpression(Box::new_in(object, self.alloc()))
  }

  /// ```js
  ///  id = ...
  /// ￣￣ AssignmentTarget
  /// ```
  pub fn simple_id_assignment_target(
    &self,
    id: PassedStr,
    span: Span,
  ) -> ast::AssignmentTarget<'ast> {
    ast::AssignmentTarget::AssignmentTargetIdentifier(self.alloc_id_ref(id, span))
  }

  /// Turns a shorthand `{ key = init } = ...` whose binding got renamed into
  /// `{ key: binding = init } = ...`.
  pub fn expand_assignment_target_property(
    &self,
    prop: &mut ast::AssignmentTargetPropertyIdentifier<'ast>,
    key: PassedStr,
  ) -> ast::AssignmentTargetProperty<'ast> {
    let ident = self.builder.alloc(prop.binding.take_in(self.alloc()));
    let binding = match prop.init.take() {
      Some(init) => ast::AssignmentTargetMaybeDefault::AssignmentTargetWithDefault(
        self.builder.alloc_assignment_target_with_default(
          SPAN,
          ast::AssignmentTarget::AssignmentTargetIdentifier(ident),
          init,
        ),
      ),
      None => ast::AssignmentTargetMaybeDefault::AssignmentTargetIdentifier(ident),
    };
    ast::AssignmentTargetProperty::AssignmentTargetPropertyProperty(
      self.builder.alloc_assignment_target_property_property(
        SPAN,
        ast::PropertyKey::StaticIdentifier(self.builder.alloc(self.id_name(key, SPAN))),
        binding,
        false,
      ),
    )
  }

  /// `{ ...statements }`
  pub fn block_stmt(
    &self,
    statements: allocator::Vec<'ast, Statement<'ast>>,
  ) -> ast::Statement<'ast> {
    self.builder.statement_block(SPAN, statements)
  }

  /// ```js
  /// (function () {
  ///   var exports = this;
  ///   var module = { exports: this };
  ///   ...body
  ///   return module.exports;
  /// }).call({})
  /// ```
  pub fn isolated_module_call_expr(
    &self,
    body: allocator::Vec<'ast, Statement<'ast>>,
  ) -> ast::Expression<'ast> {
    let mut statements = self.builder.vec_with_capacity(body.len() + 3);
    statements.push(self.var_decl_stmt("exports", self.builder.expression_this(SPAN)));
    statements.push(self.var_decl_stmt(
      "module",
      self.single_prop_object_expr("exports", self.builder.expression_this(SPAN)),
    ));
    statements.extend(body);
    statements.push(
      self
        .builder
        .statement_return(SPAN, Some(self.literal_prop_access_member_expr_expr("module", "exports"))),
    );

    let function = ast::Expression::FunctionExpression(self.builder.alloc_function(
      SPAN,
      ast::FunctionType::FunctionExpression,
      None::<BindingIdentifier>,
      false,
      false,
      false,
      NONE,
      NONE,
      self.builder.formal_parameters(
        SPAN,
        ast::FormalParameterKind::FormalParameter,
        self.builder.vec(),
        NONE,
      ),
      NONE,
      Some(self.builder.function_body(SPAN, self.builder.vec(), statements)),
    ));

    let callee =
      ast::Expression::StaticMemberExpression(self.builder.alloc_static_member_expression(
        SPAN,
        self.builder.expression_parenthesized(SPAN, function),
        self.id_name("call", SPAN),
        false,
      ));
    ast::Expression::CallExpression(self.builder.alloc_call_expression(
      SPAN,
      callee,
      NONE,
      self.builder.vec1(Argument::from(self.empty_object_expr())),
      false,
    ))
  }
}
