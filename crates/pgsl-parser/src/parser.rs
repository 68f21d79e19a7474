// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation using Pratt parsing for expressions.

use std::collections::HashMap;

use pgsl_ast::decl::{
    AliasDecl, Attribute, Decl, DeclKind, DeclarationType, Document, EnumDecl, EnumValue, FunctionDecl, Param,
    Property, StructDecl, VariableDecl,
};
use pgsl_ast::expr::{BinOp, Expr, ExprKind, Literal, TypeRef, UnaryOp};
use pgsl_ast::stmt::{AssignOp, Block, LocalKind, LocalVariable, Stmt, StmtKind, SwitchCase};
use pgsl_ast::token::{NumberSuffix, Token, TokenKind};
use pgsl_ast::{NodeId, Span, TypeId};
use pgsl_types::{ArrayLength, StructProperty, TemplateArg, TypeFactory, TypeFactoryError, TypeTable};

/// Binding power of prefix operators.
const PREFIX_BP: u8 = 21;

/// The parser for PGSL source code.
///
/// Parsing stops at the first error; no tree is built past it.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Returned when reading past the end of the stream.
    eof: Token,
    /// Build-in declarations parsed ahead of the user's tokens.
    prelude: Option<Vec<Token>>,
    /// Track pending `>` from splitting `>>` in template lists
    pending_gt: bool,
    /// Inside a template list `>` closes the list instead of comparing.
    in_template: bool,
    /// Marks declarations parsed from the prelude.
    build_in: bool,
    /// Counter for generating unique NodeIds
    next_node_id: u32,
    factory: TypeFactory,
    /// Integer literal value of each `Enum.Value` seen so far, if it has one.
    enum_integers: HashMap<(String, String), Option<u64>>,
}

/// A parsed module: its declarations and the types they reference.
#[derive(Debug)]
pub struct ParsedModule {
    pub document: Document,
    pub types: TypeTable,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let end = tokens.last().map_or(0, |t| t.span.end);
        Self {
            tokens,
            pos: 0,
            eof: Token { kind: TokenKind::Eof, span: Span::new(end, end) },
            prelude: None,
            pending_gt: false,
            in_template: false,
            build_in: false,
            next_node_id: 0,
            factory: TypeFactory::new(),
            enum_integers: HashMap::new(),
        }
    }

    /// Parse `tokens` as build-in declarations before the module itself.
    pub fn with_prelude(mut self, tokens: Vec<Token>) -> Self {
        self.prelude = Some(tokens);
        self
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.tokens.get(self.pos + n).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |t| t.span.end)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::expected(
                kind.display_name(),
                self.current_kind(),
                self.current().span,
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::expected(
                "a name",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    /// Handle `>>` splitting in template lists.
    fn expect_gt_in_generic(&mut self) -> Result<(), ParseError> {
        if self.pending_gt {
            self.pending_gt = false;
            return Ok(());
        }

        match self.current_kind() {
            TokenKind::Gt => {
                self.advance();
                Ok(())
            }
            TokenKind::GtGt => {
                self.advance();
                self.pending_gt = true;
                Ok(())
            }
            TokenKind::GtEq | TokenKind::GtGtEq => Err(ParseError::expected(
                "'>'",
                self.current_kind(),
                self.current().span,
            )
            .with_hint("put a space between '>' and '='")),
            _ => Err(ParseError::expected(
                "'>'",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    // =========================================================================
    // Top-Level Parsing
    // =========================================================================

    pub fn parse(mut self) -> Result<ParsedModule, ParseError> {
        let mut declarations = Vec::new();

        if let Some(prelude) = self.prelude.take() {
            let user = std::mem::replace(&mut self.tokens, prelude);
            self.build_in = true;
            self.parse_declarations(&mut declarations)?;
            self.tokens = user;
            self.pos = 0;
            self.build_in = false;
        }
        self.parse_declarations(&mut declarations)?;

        log::debug!(
            "parsed {} declarations, {} types",
            declarations.len(),
            self.factory.table().len()
        );
        Ok(ParsedModule {
            document: Document { declarations },
            types: self.factory.into_table(),
        })
    }

    fn parse_declarations(&mut self, declarations: &mut Vec<Decl>) -> Result<(), ParseError> {
        while !self.at_end() {
            declarations.push(self.parse_decl()?);
        }
        Ok(())
    }

    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        let start = self.current().span.start;
        let attributes = self.parse_attributes()?;

        let kind = match self.current_kind() {
            TokenKind::Alias => self.parse_alias()?,
            TokenKind::Enum => self.parse_enum()?,
            TokenKind::Struct => self.parse_struct()?,
            TokenKind::Function => self.parse_function()?,
            kind if kind.is_module_variable_keyword() => self.parse_module_variable()?,
            _ => {
                return Err(ParseError::expected(
                    "declaration (alias, enum, struct, function, or variable)",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };

        Ok(Decl {
            id: self.next_id(),
            kind,
            attributes,
            build_in: self.build_in,
            span: self.span_from(start),
        })
    }

    /// Zero or more `[Name(args), ...]` lists.
    fn parse_attributes(&mut self) -> Result<Vec<Attribute>, ParseError> {
        let mut attributes = Vec::new();
        while self.match_token(&TokenKind::LBracket) {
            loop {
                let start = self.current().span.start;
                let name = self.expect_ident()?;
                self.expect(&TokenKind::LParen)?;
                let args = self.parse_args()?;
                attributes.push(Attribute {
                    id: self.next_id(),
                    name,
                    args,
                    span: self.span_from(start),
                });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RBracket)?;
        }
        Ok(attributes)
    }

    fn parse_alias(&mut self) -> Result<DeclKind, ParseError> {
        self.expect(&TokenKind::Alias)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Eq)?;
        let ty = self.parse_type()?;
        self.expect(&TokenKind::Semi)?;
        // Registered after the target so an alias can never name itself.
        self.factory.add_alias_predefinition(&name, ty.ty);
        Ok(DeclKind::Alias(AliasDecl { name, ty }))
    }

    fn parse_enum(&mut self) -> Result<DeclKind, ParseError> {
        self.expect(&TokenKind::Enum)?;
        let name = self.expect_ident()?;
        self.factory.add_enum_predefinition(&name);
        self.expect(&TokenKind::LBrace)?;

        let mut values = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let start = self.current().span.start;
            let value_name = self.expect_ident()?;
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expr()?;
            values.push(EnumValue {
                id: self.next_id(),
                name: value_name,
                value,
                span: self.span_from(start),
            });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;

        for value in &values {
            self.enum_integers
                .insert((name.clone(), value.name.clone()), value.value.as_int_literal());
        }
        let underlying = self.enum_underlying(&values);
        self.factory.table_mut().define_enum(&name, underlying);
        Ok(DeclKind::Enum(EnumDecl { name, values }))
    }

    /// The first value decides the enum's type. Unsuffixed integers make
    /// unsigned enums so values can select switch cases.
    fn enum_underlying(&self, values: &[EnumValue]) -> TypeId {
        let p = self.factory.table().primitives();
        let Some(first) = values.first() else {
            return p.unsigned_integer;
        };
        match &first.value.kind {
            ExprKind::String(_) => p.string,
            ExprKind::Literal(Literal::Bool(_)) => p.boolean,
            ExprKind::Literal(Literal::Int { suffix: Some(NumberSuffix::Int), .. }) => p.integer,
            ExprKind::Unary { op: UnaryOp::Neg, operand } if matches!(operand.kind, ExprKind::Literal(Literal::Int { .. })) => {
                p.integer
            }
            ExprKind::Literal(Literal::Float { suffix: Some(NumberSuffix::Half), .. }) => p.float16,
            ExprKind::Literal(Literal::Float { .. }) => p.float,
            _ => p.unsigned_integer,
        }
    }

    fn parse_struct(&mut self) -> Result<DeclKind, ParseError> {
        self.expect(&TokenKind::Struct)?;
        let name = self.expect_ident()?;
        self.factory.add_struct_predefinition(&name);
        self.expect(&TokenKind::LBrace)?;

        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let start = self.current().span.start;
            let attributes = self.parse_attributes()?;
            let property_name = self.expect_ident()?;
            self.expect(&TokenKind::Colon)?;
            let ty = self.parse_type()?;
            properties.push(Property {
                id: self.next_id(),
                name: property_name,
                ty,
                attributes,
                span: self.span_from(start),
            });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;

        let body = properties
            .iter()
            .map(|p| StructProperty { name: p.name.clone(), ty: p.ty.ty })
            .collect();
        self.factory.table_mut().define_struct(&name, body);
        Ok(DeclKind::Struct(StructDecl { name, properties }))
    }

    fn parse_function(&mut self) -> Result<DeclKind, ParseError> {
        self.expect(&TokenKind::Function)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;

        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let start = self.current().span.start;
            let attributes = self.parse_attributes()?;
            let param_name = self.expect_ident()?;
            self.expect(&TokenKind::Colon)?;
            let ty = self.parse_type()?;
            params.push(Param {
                id: self.next_id(),
                name: param_name,
                ty,
                attributes,
                span: self.span_from(start),
            });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Colon)?;
        let return_ty = self.parse_type()?;
        let body = self.parse_block()?;

        Ok(DeclKind::Function(FunctionDecl { name, params, return_ty, body }))
    }

    fn parse_module_variable(&mut self) -> Result<DeclKind, ParseError> {
        let declaration_type = match self.current_kind() {
            TokenKind::Const => DeclarationType::Const,
            TokenKind::Storage => DeclarationType::Storage,
            TokenKind::Uniform => DeclarationType::Uniform,
            TokenKind::Workgroup => DeclarationType::Workgroup,
            TokenKind::Private => DeclarationType::Private,
            TokenKind::Param => DeclarationType::Param,
            _ => {
                return Err(ParseError::expected(
                    "variable declaration",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };
        self.advance();
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let init = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::Semi)?;

        Ok(DeclKind::Variable(VariableDecl { declaration_type, name, ty, init }))
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// `[*] Name [< arg, ... >]`, generated through the type factory.
    fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        let start = self.current().span.start;
        let is_pointer = self.match_token(&TokenKind::Star);
        let name = match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                name
            }
            _ => {
                return Err(ParseError::expected(
                    "type",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };

        let mut args = Vec::new();
        let mut template_exprs = Vec::new();
        if self.match_token(&TokenKind::TemplateListStart) {
            let outer = std::mem::replace(&mut self.in_template, true);
            loop {
                args.push(self.parse_template_arg(&mut template_exprs)?);
                // A split `>>` already closed this list.
                if self.pending_gt || !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.in_template = outer;
            self.expect_gt_in_generic()?;
        }

        let span = self.span_from(start);
        let ty = self.factory.generate(&name, is_pointer, &args, span)?;
        Ok(TypeRef {
            ty,
            name: self.factory.table().name(ty),
            template_exprs,
            span,
        })
    }

    /// A nested type, a string literal, or a value expression.
    fn parse_template_arg(&mut self, exprs: &mut Vec<Expr>) -> Result<TemplateArg, ParseError> {
        match self.current_kind().clone() {
            TokenKind::String(value) => {
                self.advance();
                Ok(TemplateArg::String(value))
            }
            TokenKind::Star => self.parse_nested_type(exprs),
            TokenKind::Ident(name)
                if self.factory.is_type_name(&name)
                    && !(self.factory.is_enum_name(&name) && matches!(self.peek(1), TokenKind::Dot)) =>
            {
                self.parse_nested_type(exprs)
            }
            _ => {
                let expr = self.parse_expr()?;
                let length = self.array_length(&expr)?;
                exprs.push(expr);
                Ok(TemplateArg::Expression(length))
            }
        }
    }

    /// Enum values are inlined so the emitted length is a plain literal.
    fn array_length(&self, expr: &Expr) -> Result<ArrayLength, ParseError> {
        if let Some(n) = expr.as_int_literal() {
            return Ok(ArrayLength::Literal(n));
        }
        let mut inner = expr;
        while let ExprKind::Parenthesized(e) = &inner.kind {
            inner = e;
        }
        if let ExprKind::EnumValue { enum_name, value } = &inner.kind {
            match self.enum_integers.get(&(enum_name.clone(), value.clone())) {
                Some(Some(n)) => return Ok(ArrayLength::Literal(*n)),
                Some(None) => return Err(ParseError::enum_length(expr)),
                // Unknown values are reported by analysis.
                None => return Ok(ArrayLength::Expression(expr.to_string())),
            }
        }
        if expr.mentions_enum_value() {
            return Err(ParseError::enum_length(expr));
        }
        Ok(ArrayLength::Expression(expr.to_string()))
    }

    fn parse_nested_type(&mut self, exprs: &mut Vec<Expr>) -> Result<TemplateArg, ParseError> {
        let ty = self.parse_type()?;
        exprs.extend(ty.template_exprs);
        Ok(TemplateArg::Type(ty.ty))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.current().span.start;
        self.expect(&TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            statements.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Block {
            id: self.next_id(),
            statements,
            span: self.span_from(start),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;

        let kind = match self.current_kind() {
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::If => return self.parse_if(),
            TokenKind::Switch => self.parse_switch()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::While => {
                self.advance();
                let condition = self.parse_condition()?;
                let body = self.parse_block()?;
                StmtKind::While { condition, body }
            }
            TokenKind::Do => {
                self.advance();
                let body = self.parse_block()?;
                self.expect(&TokenKind::While)?;
                let condition = self.parse_condition()?;
                self.expect(&TokenKind::Semi)?;
                StmtKind::DoWhile { body, condition }
            }
            TokenKind::Break => {
                self.advance();
                self.expect(&TokenKind::Semi)?;
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(&TokenKind::Semi)?;
                StmtKind::Continue
            }
            TokenKind::Discard => {
                self.advance();
                self.expect(&TokenKind::Semi)?;
                StmtKind::Discard
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&TokenKind::Semi)?;
                StmtKind::Return(value)
            }
            TokenKind::Let | TokenKind::Const => {
                let variable = self.parse_local_variable()?;
                self.expect(&TokenKind::Semi)?;
                StmtKind::Variable(variable)
            }
            _ => {
                let kind = self.parse_simple_statement()?;
                self.expect(&TokenKind::Semi)?;
                kind
            }
        };

        Ok(Stmt {
            id: self.next_id(),
            kind,
            span: self.span_from(start),
        })
    }

    /// `( expression )`
    fn parse_condition(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;
        self.expect(&TokenKind::If)?;
        let condition = self.parse_condition()?;
        let then_block = self.parse_block()?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                let block = self.parse_block()?;
                let span = block.span;
                Some(Box::new(Stmt {
                    id: self.next_id(),
                    kind: StmtKind::Block(block),
                    span,
                }))
            }
        } else {
            None
        };

        Ok(Stmt {
            id: self.next_id(),
            kind: StmtKind::If { condition, then_block, else_branch },
            span: self.span_from(start),
        })
    }

    fn parse_switch(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Switch)?;
        let selector = self.parse_condition()?;
        self.expect(&TokenKind::LBrace)?;

        let mut cases = Vec::new();
        let mut default = None;
        loop {
            match self.current_kind() {
                TokenKind::Case => {
                    let start = self.current().span.start;
                    self.advance();
                    let mut values = vec![self.parse_expr()?];
                    while self.match_token(&TokenKind::Comma) {
                        values.push(self.parse_expr()?);
                    }
                    let body = self.parse_block()?;
                    cases.push(SwitchCase {
                        id: self.next_id(),
                        values,
                        body,
                        span: self.span_from(start),
                    });
                }
                TokenKind::Default => {
                    if default.is_some() {
                        return Err(ParseError::duplicate_default(self.current().span));
                    }
                    self.advance();
                    default = Some(self.parse_block()?);
                }
                TokenKind::RBrace => break,
                _ => {
                    return Err(ParseError::expected(
                        "'case', 'default' or '}'",
                        self.current_kind(),
                        self.current().span,
                    ))
                }
            }
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(StmtKind::Switch { selector, cases, default })
    }

    fn parse_for(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::For)?;
        self.expect(&TokenKind::LParen)?;

        let init = if self.check(&TokenKind::Semi) {
            None
        } else {
            let start = self.current().span.start;
            let variable = self.parse_local_variable()?;
            Some(Box::new(Stmt {
                id: self.next_id(),
                kind: StmtKind::Variable(variable),
                span: self.span_from(start),
            }))
        };
        self.expect(&TokenKind::Semi)?;

        let condition = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semi)?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            let start = self.current().span.start;
            let kind = self.parse_simple_statement()?;
            Some(Box::new(Stmt {
                id: self.next_id(),
                kind,
                span: self.span_from(start),
            }))
        };
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;

        Ok(StmtKind::For { init, condition, update, body })
    }

    /// `let|const name: Type [= value]` without the terminator.
    fn parse_local_variable(&mut self) -> Result<LocalVariable, ParseError> {
        let kind = match self.current_kind() {
            TokenKind::Let => LocalKind::Let,
            TokenKind::Const => LocalKind::Const,
            _ => {
                return Err(ParseError::expected(
                    "'let' or 'const'",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };
        self.advance();
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let init = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(LocalVariable { kind, name, ty, init })
    }

    /// Assignment, increment/decrement or call, without the terminator.
    fn parse_simple_statement(&mut self) -> Result<StmtKind, ParseError> {
        let target = self.parse_expr()?;

        if let Some(op) = self.match_assign_op() {
            let value = self.parse_expr()?;
            return Ok(StmtKind::Assignment { target, op, value });
        }
        if self.match_token(&TokenKind::PlusPlus) {
            return Ok(StmtKind::IncrementDecrement { target, increment: true });
        }
        if self.match_token(&TokenKind::MinusMinus) {
            return Ok(StmtKind::IncrementDecrement { target, increment: false });
        }

        match target.kind {
            ExprKind::Call { .. } => Ok(StmtKind::Call(target)),
            _ => Err(ParseError::expected(
                "assignment, '++', '--' or a function call",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    fn match_assign_op(&mut self) -> Option<AssignOp> {
        let op = match self.current_kind() {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::Compound(BinOp::Add),
            TokenKind::MinusEq => AssignOp::Compound(BinOp::Sub),
            TokenKind::StarEq => AssignOp::Compound(BinOp::Mul),
            TokenKind::SlashEq => AssignOp::Compound(BinOp::Div),
            TokenKind::PercentEq => AssignOp::Compound(BinOp::Rem),
            TokenKind::AmpEq => AssignOp::Compound(BinOp::BitAnd),
            TokenKind::PipeEq => AssignOp::Compound(BinOp::BitOr),
            TokenKind::CaretEq => AssignOp::Compound(BinOp::BitXor),
            TokenKind::LtLtEq => AssignOp::Compound(BinOp::Shl),
            TokenKind::GtGtEq => AssignOp::Compound(BinOp::Shr),
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let mut lhs = self.parse_prefix()?;

        loop {
            if let Some(bp) = self.postfix_bp() {
                if bp < min_bp {
                    break;
                }
                lhs = self.parse_postfix(lhs, start)?;
                continue;
            }

            if let Some((l_bp, r_bp)) = self.infix_bp() {
                if l_bp < min_bp {
                    break;
                }
                let op = self.parse_binop()?;
                let rhs = self.parse_expr_bp(r_bp)?;
                let end = rhs.span.end;
                lhs = Expr {
                    id: self.next_id(),
                    kind: ExprKind::Binary { op, left: Box::new(lhs), right: Box::new(rhs) },
                    span: Span::new(start, end),
                };
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;

        let kind = match self.current_kind().clone() {
            TokenKind::Int { value, suffix } => {
                self.advance();
                ExprKind::Literal(Literal::Int { value, suffix })
            }
            TokenKind::Float { value, suffix } => {
                self.advance();
                ExprKind::Literal(Literal::Float { value, suffix })
            }
            TokenKind::Bool(b) => {
                self.advance();
                ExprKind::Literal(Literal::Bool(b))
            }
            TokenKind::String(s) => {
                self.advance();
                ExprKind::String(s)
            }
            TokenKind::Ident(name) => {
                self.advance();
                if self.match_token(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    ExprKind::Call { name, args }
                } else if self.factory.is_enum_name(&name) && self.check(&TokenKind::Dot) {
                    self.advance();
                    let value = self.expect_ident()?;
                    ExprKind::EnumValue { enum_name: name, value }
                } else if self.check(&TokenKind::TemplateListStart) {
                    return Err(ParseError::template_outside_type(&name, self.current().span));
                } else {
                    ExprKind::Variable(name)
                }
            }
            TokenKind::New => {
                self.advance();
                let ty = self.parse_type()?;
                self.expect(&TokenKind::LParen)?;
                let args = self.parse_args()?;
                ExprKind::New { ty, args }
            }
            TokenKind::LParen => {
                self.advance();
                let outer = std::mem::replace(&mut self.in_template, false);
                let inner = self.parse_expr()?;
                self.in_template = outer;
                self.expect(&TokenKind::RParen)?;
                ExprKind::Parenthesized(Box::new(inner))
            }
            TokenKind::Minus => self.parse_unary(UnaryOp::Neg)?,
            TokenKind::Bang => self.parse_unary(UnaryOp::Not)?,
            TokenKind::Tilde => self.parse_unary(UnaryOp::BitNot)?,
            TokenKind::Amp => {
                self.advance();
                ExprKind::AddressOf(Box::new(self.parse_expr_bp(PREFIX_BP)?))
            }
            TokenKind::Star => {
                self.advance();
                ExprKind::Deref(Box::new(self.parse_expr_bp(PREFIX_BP)?))
            }
            _ => {
                return Err(ParseError::expected(
                    "expression",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };

        Ok(Expr {
            id: self.next_id(),
            kind,
            span: self.span_from(start),
        })
    }

    fn parse_unary(&mut self, op: UnaryOp) -> Result<ExprKind, ParseError> {
        self.advance();
        let operand = self.parse_expr_bp(PREFIX_BP)?;
        Ok(ExprKind::Unary { op, operand: Box::new(operand) })
    }

    fn parse_postfix(&mut self, lhs: Expr, start: usize) -> Result<Expr, ParseError> {
        let kind = match self.current_kind() {
            TokenKind::LBracket => {
                self.advance();
                let outer = std::mem::replace(&mut self.in_template, false);
                let index = self.parse_expr()?;
                self.in_template = outer;
                self.expect(&TokenKind::RBracket)?;
                ExprKind::Index { value: Box::new(lhs), index: Box::new(index) }
            }
            _ => {
                self.expect(&TokenKind::Dot)?;
                let property = self.expect_ident()?;
                ExprKind::Decomposition { value: Box::new(lhs), property }
            }
        };
        Ok(Expr {
            id: self.next_id(),
            kind,
            span: self.span_from(start),
        })
    }

    /// Arguments after an opening `(`, through the closing `)`.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let outer = std::mem::replace(&mut self.in_template, false);
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.in_template = outer;
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    fn postfix_bp(&self) -> Option<u8> {
        match self.current_kind() {
            TokenKind::LBracket | TokenKind::Dot => Some(25),
            _ => None,
        }
    }

    fn infix_bp(&self) -> Option<(u8, u8)> {
        if self.pending_gt {
            return None;
        }
        match self.current_kind() {
            TokenKind::Gt | TokenKind::GtEq | TokenKind::GtGt if self.in_template => None,
            TokenKind::PipePipe => Some((1, 2)),
            TokenKind::AmpAmp => Some((3, 4)),
            TokenKind::Pipe => Some((5, 6)),
            TokenKind::Caret => Some((7, 8)),
            TokenKind::Amp => Some((9, 10)),
            TokenKind::EqEq | TokenKind::BangEq => Some((11, 12)),
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => Some((13, 14)),
            TokenKind::LtLt | TokenKind::GtGt => Some((15, 16)),
            TokenKind::Plus | TokenKind::Minus => Some((17, 18)),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((19, 20)),
            _ => None,
        }
    }

    fn parse_binop(&mut self) -> Result<BinOp, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Rem,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::BangEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::LtEq => BinOp::Le,
            TokenKind::GtEq => BinOp::Ge,
            TokenKind::AmpAmp => BinOp::And,
            TokenKind::PipePipe => BinOp::Or,
            TokenKind::Amp => BinOp::BitAnd,
            TokenKind::Pipe => BinOp::BitOr,
            TokenKind::Caret => BinOp::BitXor,
            TokenKind::LtLt => BinOp::Shl,
            TokenKind::GtGt => BinOp::Shr,
            _ => return Err(ParseError::expected(
                "operator like '+' or '-'",
                self.current_kind(),
                self.current().span,
            )),
        };
        self.advance();
        Ok(op)
    }
}

/// What kind of failure stopped the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No production matches the current token.
    Syntax,
    /// A type name that is not declared (yet).
    UnknownType,
    /// Wrong number or kind of template arguments.
    TemplateArity,
    /// Template arguments of the right shape but invalid values.
    InvalidTemplate,
}

/// A parser error with location and friendly message.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
    pub kind: ParseErrorKind,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let message = format_expected_message(expected, found);
        let hint = crate::hints::for_expected(expected, found).map(String::from);
        Self { span, message, hint, kind: ParseErrorKind::Syntax }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    fn duplicate_default(span: Span) -> Self {
        Self {
            span,
            message: "Switch already has a 'default' case".to_string(),
            hint: Some("merge the two default blocks".to_string()),
            kind: ParseErrorKind::Syntax,
        }
    }

    fn enum_length(expr: &Expr) -> Self {
        Self {
            span: expr.span,
            message: format!("Array length '{}' must be a single enum value holding an integer literal", expr),
            hint: Some("declare the enum value as an integer literal, or use a constant".to_string()),
            kind: ParseErrorKind::InvalidTemplate,
        }
    }

    fn template_outside_type(name: &str, span: Span) -> Self {
        Self {
            span,
            message: format!("Template list after '{}', which is not a type", name),
            hint: Some("put spaces around '<' for a comparison, or declare the type first".to_string()),
            kind: ParseErrorKind::Syntax,
        }
    }
}

impl From<TypeFactoryError> for ParseError {
    fn from(error: TypeFactoryError) -> Self {
        use pgsl_types::TypeFactoryErrorKind;

        let kind = match &error.kind {
            TypeFactoryErrorKind::UnknownType { .. } => ParseErrorKind::UnknownType,
            _ if error.is_template_arity() => ParseErrorKind::TemplateArity,
            _ => ParseErrorKind::InvalidTemplate,
        };
        let hint = crate::hints::for_type_error(&error.kind).map(String::from);
        Self {
            span: error.span,
            message: error.to_string(),
            hint,
            kind,
        }
    }
}

/// Format a user-friendly "expected X, found Y" message.
fn format_expected_message(expected: &str, found: &TokenKind) -> String {
    match expected {
        "';'" => format!("Expected ';' after statement, found {}", found.display_name()),
        "'{'" => format!("Expected '{{' to start block, found {}", found.display_name()),
        "'}'" => format!("Expected '}}' to close block, found {}", found.display_name()),
        "')'" if matches!(found, TokenKind::Eof) => "Unclosed '(' - missing ')'".to_string(),
        "']'" if matches!(found, TokenKind::Eof) => "Unclosed '[' - missing ']'".to_string(),
        "a name" => format!("Expected name, found {}", found.display_name()),
        s if s.starts_with("declaration (") => {
            format!("Expected declaration, found {}", found.display_name())
        }
        _ => format!("Expected {}, found {}", expected, found.display_name()),
    }
}
