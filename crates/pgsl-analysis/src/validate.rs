// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Context rules run over a document after setup.

use std::collections::HashSet;

use pgsl_ast::decl::{Decl, DeclKind, DeclarationType, Document, EnumDecl, FunctionDecl, StructDecl, VariableDecl};
use pgsl_ast::expr::{Expr, TypeRef};
use pgsl_ast::stmt::{AssignOp, Block, LocalKind, LocalVariable, Stmt, StmtKind};
use pgsl_ast::{NodeId, Span, TypeId};
use pgsl_types::{NumericKind, TypeKind, TypeTable};

use crate::attributes::{is_entry_attribute, AttributeTarget};
use crate::error::{ValidationError, ValidationErrorKind};
use crate::model::{ExpressionRecord, Fixedness, SemanticModel};

/// Check `document` against the records built by [`crate::setup`].
///
/// The result starts with the errors setup found, followed by every
/// context rule violation in declaration order.
pub fn validate(document: &Document, types: &TypeTable, model: &SemanticModel) -> Vec<ValidationError> {
    let mut validator = Validator {
        types,
        model,
        errors: model.setup_errors.clone(),
    };
    for decl in &document.declarations {
        validator.declaration(decl);
    }
    log::debug!("validation: {} errors", validator.errors.len());
    validator.errors
}

pub(crate) struct Validator<'a> {
    pub(crate) types: &'a TypeTable,
    pub(crate) model: &'a SemanticModel,
    pub(crate) errors: Vec<ValidationError>,
}

/// Return type and name of the function being checked.
struct FunctionContext<'a> {
    name: &'a str,
    return_type: TypeId,
}

impl<'a> Validator<'a> {
    pub(crate) fn error(&mut self, kind: ValidationErrorKind, span: Span, node: NodeId) {
        self.errors.push(ValidationError::new(kind, span, node));
    }

    pub(crate) fn record(&self, expr: &Expr) -> Option<&'a ExpressionRecord> {
        self.model.record(expr.id)
    }

    fn type_name(&self, ty: TypeId) -> String {
        self.types.name(ty)
    }

    pub(crate) fn require_fixed(&mut self, expr: &Expr, required: Fixedness) {
        if let Some(record) = self.record(expr) {
            if record.fixedness < required {
                self.error(
                    ValidationErrorKind::NotFixed { required, found: record.fixedness },
                    expr.span,
                    expr.id,
                );
            }
        }
    }

    fn require_assignable(&mut self, expr: &Expr, to: TypeId) {
        if let Some(record) = self.record(expr) {
            if !self.types.is_assignable(record.ty, to) {
                let kind = ValidationErrorKind::TypeMismatch {
                    expected: self.type_name(to),
                    found: self.type_name(record.ty),
                };
                self.error(kind, expr.span, expr.id);
            } else {
                self.check_literal_range(expr, to);
            }
        }
    }

    /// An abstract integer literal converted to a concrete integer must fit it.
    fn check_literal_range(&mut self, expr: &Expr, to: TypeId) {
        let Some(value) = expr.as_signed_int_literal() else {
            return;
        };
        let is_abstract = self
            .record(expr)
            .is_some_and(|r| matches!(self.types.kind(r.ty), TypeKind::Numeric(NumericKind::AbstractInteger)));
        if !is_abstract {
            return;
        }
        let fits = match self.types.kind(self.types.resolve(to)) {
            TypeKind::Numeric(NumericKind::Integer) => i32::try_from(value).is_ok(),
            TypeKind::Numeric(NumericKind::UnsignedInteger) => u32::try_from(value).is_ok(),
            _ => true,
        };
        if !fits {
            let kind = ValidationErrorKind::LiteralOutOfRange { literal: expr.to_string(), ty: self.type_name(to) };
            self.error(kind, expr.span, expr.id);
        }
    }

    pub(crate) fn is_unsigned_compatible(&self, ty: TypeId) -> bool {
        let unsigned = self.types.numeric(NumericKind::UnsignedInteger);
        self.types.is_assignable(ty, unsigned)
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn check_type(&mut self, ty: &TypeRef, node: NodeId) {
        self.check_array_elements(ty.ty, ty.span, node);
        for length in &ty.template_exprs {
            self.require_fixed(length, Fixedness::PipelineCreationFixed);
            if let Some(record) = self.record(length) {
                if !self.is_unsigned_compatible(record.ty) {
                    let kind = ValidationErrorKind::ArrayLengthType { found: self.type_name(record.ty) };
                    self.error(kind, length.span, length.id);
                }
            }
        }
    }

    fn check_array_elements(&mut self, ty: TypeId, span: Span, node: NodeId) {
        match self.types.kind(self.types.resolve_alias(ty)) {
            TypeKind::Array { inner, .. } => {
                let inner = *inner;
                if !self.types.attributes(inner).fixed {
                    let kind = ValidationErrorKind::ArrayElementNotFixed { ty: self.type_name(inner) };
                    self.error(kind, span, node);
                }
                self.check_array_elements(inner, span, node);
            }
            TypeKind::Pointer { inner } => self.check_array_elements(*inner, span, node),
            _ => {}
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn declaration(&mut self, decl: &Decl) {
        let target = match &decl.kind {
            DeclKind::Variable(v) => AttributeTarget::Variable(v.declaration_type),
            DeclKind::Function(_) => AttributeTarget::Function,
            _ => AttributeTarget::Type,
        };
        self.check_attributes(&decl.attributes, target, decl.name(), decl.span, decl.id);

        match &decl.kind {
            DeclKind::Alias(alias) => self.check_type(&alias.ty, decl.id),
            DeclKind::Enum(e) => self.enum_decl(decl, e),
            DeclKind::Struct(s) => self.struct_decl(decl, s),
            DeclKind::Function(f) => self.function(decl, f),
            DeclKind::Variable(v) => self.module_variable(decl, v),
        }
    }

    fn enum_decl(&mut self, decl: &Decl, e: &EnumDecl) {
        let Some(underlying) = self.types.enum_underlying(&e.name) else {
            return;
        };
        let mut seen = HashSet::new();
        for value in &e.values {
            if !seen.insert(value.name.as_str()) {
                let kind = ValidationErrorKind::DuplicateEnumValue { name: value.name.clone() };
                self.error(kind, value.span, value.id);
                continue;
            }
            self.require_fixed(&value.value, Fixedness::Constant);
            if let Some(record) = self.record(&value.value) {
                if !self.types.is_assignable(record.ty, underlying) {
                    let kind = ValidationErrorKind::EnumValueType {
                        name: format!("{}.{}", e.name, value.name),
                        expected: self.type_name(underlying),
                        found: self.type_name(record.ty),
                    };
                    self.error(kind, value.span, decl.id);
                } else {
                    self.check_literal_range(&value.value, underlying);
                }
            }
        }
    }

    fn struct_decl(&mut self, decl: &Decl, s: &StructDecl) {
        let mut seen = HashSet::new();
        let last = s.properties.len().saturating_sub(1);
        let mut recursive = false;

        for (i, property) in s.properties.iter().enumerate() {
            if !seen.insert(property.name.as_str()) {
                let kind = ValidationErrorKind::DuplicateProperty { name: property.name.clone() };
                self.error(kind, property.span, property.id);
            }
            self.check_attributes(
                &property.attributes,
                AttributeTarget::Property,
                &property.name,
                property.span,
                property.id,
            );
            self.check_type(&property.ty, property.id);

            if !recursive && self.types.contains_struct(property.ty.ty, &s.name) {
                recursive = true;
                let kind = ValidationErrorKind::RecursiveStruct { name: s.name.clone() };
                self.error(kind, decl.span, decl.id);
                continue;
            }
            let attributes = self.types.attributes(property.ty.ty);
            if !attributes.fixed && i != last {
                let kind = ValidationErrorKind::RuntimeSizedNotLast { property: property.name.clone() };
                self.error(kind, property.span, property.id);
            }
            if !recursive && !attributes.storable {
                let kind = ValidationErrorKind::InvalidVariableType {
                    name: property.name.clone(),
                    ty: property.ty.name.clone(),
                    reason: "struct properties must be storable",
                };
                self.error(kind, property.span, property.id);
            }
        }
    }

    fn function(&mut self, decl: &Decl, function: &FunctionDecl) {
        let entry = decl.attributes.iter().any(|a| is_entry_attribute(&a.name));
        let target = if entry { AttributeTarget::EntryParameter } else { AttributeTarget::Parameter };
        for param in &function.params {
            self.check_attributes(&param.attributes, target, &param.name, param.span, param.id);
            self.check_type(&param.ty, param.id);
            if !entry {
                self.forbid_build_in(&param.name, &param.ty, param.id);
            }
        }
        self.check_type(&function.return_ty, decl.id);
        if !entry {
            self.forbid_build_in(&function.name, &function.return_ty, decl.id);
        }

        let context = FunctionContext { name: &function.name, return_type: function.return_ty.ty };
        self.statements(&function.body, &context);

        if !self.types.is_void(context.return_type) && !block_returns(&function.body) {
            let kind = ValidationErrorKind::MissingReturn { name: context.name.to_string() };
            self.error(kind, decl.span, decl.id);
        }
    }

    /// Build-in types carry stage IO and only fit entry point signatures.
    fn forbid_build_in(&mut self, name: &str, ty: &TypeRef, node: NodeId) {
        if matches!(self.types.kind(self.types.resolve_alias(ty.ty)), TypeKind::BuildIn { .. }) {
            let kind = ValidationErrorKind::BuildInOutsideEntry { name: name.to_string(), ty: ty.name.clone() };
            self.error(kind, ty.span, node);
        }
    }

    fn module_variable(&mut self, decl: &Decl, variable: &VariableDecl) {
        let declaration = variable.declaration_type;
        self.check_type(&variable.ty, decl.id);

        match (declaration, &variable.init) {
            (DeclarationType::Const, None) => {
                let kind = ValidationErrorKind::MissingInitializer { name: variable.name.clone() };
                self.error(kind, decl.span, decl.id);
            }
            (DeclarationType::Storage | DeclarationType::Uniform | DeclarationType::Workgroup, Some(init)) => {
                let kind = ValidationErrorKind::UnexpectedInitializer {
                    name: variable.name.clone(),
                    declaration: declaration.keyword(),
                };
                self.error(kind, init.span, decl.id);
            }
            _ => {}
        }

        let ty = variable.ty.ty;
        let attributes = self.types.attributes(ty);
        let resolved = self.types.kind(self.types.resolve(ty));
        let is_handle = matches!(resolved, TypeKind::Sampler { .. } | TypeKind::Texture { .. });
        let reason = match declaration {
            DeclarationType::Uniform if is_handle => None,
            DeclarationType::Uniform | DeclarationType::Storage if !attributes.host_shareable => {
                Some("buffer contents must be host-shareable")
            }
            DeclarationType::Param if !matches!(resolved, TypeKind::Numeric(_) | TypeKind::Boolean) => {
                Some("pipeline parameters must be numeric or boolean scalars")
            }
            _ if !attributes.storable => Some("variables must be storable"),
            DeclarationType::Const if !attributes.constructable => Some("constants must be constructable"),
            _ => None,
        };
        if let Some(reason) = reason {
            let kind = ValidationErrorKind::InvalidVariableType {
                name: variable.name.clone(),
                ty: variable.ty.name.clone(),
                reason,
            };
            self.error(kind, decl.span, decl.id);
        }

        if let Some(init) = &variable.init {
            self.require_assignable(init, ty);
            match declaration {
                DeclarationType::Const => self.require_fixed(init, Fixedness::ShaderCreationFixed),
                DeclarationType::Param | DeclarationType::Private => {
                    self.require_fixed(init, Fixedness::PipelineCreationFixed)
                }
                _ => {}
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn statements(&mut self, block: &Block, context: &FunctionContext) {
        for stmt in &block.statements {
            self.statement(stmt, context);
        }
    }

    fn statement(&mut self, stmt: &Stmt, context: &FunctionContext) {
        match &stmt.kind {
            StmtKind::Block(block) => self.statements(block, context),
            StmtKind::If { condition, then_block, else_branch } => {
                self.condition(condition);
                self.statements(then_block, context);
                if let Some(else_branch) = else_branch {
                    self.statement(else_branch, context);
                }
            }
            StmtKind::Switch { selector, cases, default } => {
                if let Some(record) = self.record(selector) {
                    if !self.is_unsigned_compatible(record.ty) {
                        let kind = ValidationErrorKind::SwitchSelector { found: self.type_name(record.ty) };
                        self.error(kind, selector.span, selector.id);
                    }
                }
                for case in cases {
                    for value in &case.values {
                        if let Some(record) = self.record(value) {
                            if !self.is_unsigned_compatible(record.ty) {
                                let kind = ValidationErrorKind::CaseValue { found: self.type_name(record.ty) };
                                self.error(kind, value.span, value.id);
                            }
                        }
                        self.require_fixed(value, Fixedness::ShaderCreationFixed);
                    }
                    self.statements(&case.body, context);
                }
                if let Some(default) = default {
                    self.statements(default, context);
                }
            }
            StmtKind::For { init, condition, update, body } => {
                if let Some(init) = init {
                    if !matches!(&init.kind, StmtKind::Variable(v) if v.kind == LocalKind::Let) {
                        self.error(ValidationErrorKind::ForInitNotLet, init.span, init.id);
                    }
                    self.statement(init, context);
                }
                if let Some(condition) = condition {
                    self.condition(condition);
                }
                if let Some(update) = update {
                    self.statement(update, context);
                }
                self.statements(body, context);
            }
            StmtKind::While { condition, body } | StmtKind::DoWhile { body, condition } => {
                self.condition(condition);
                self.statements(body, context);
            }
            StmtKind::Break | StmtKind::Continue | StmtKind::Discard | StmtKind::Call(_) => {}
            StmtKind::Return(value) => self.return_value(stmt, value.as_ref(), context),
            StmtKind::Assignment { target, op, value } => {
                self.assignment_target(target);
                let produced = match op {
                    AssignOp::Assign => self.record(value),
                    AssignOp::Compound(_) => self.model.record(stmt.id),
                };
                if let (Some(target), Some(produced)) = (self.record(target), produced) {
                    if !self.types.is_assignable(produced.ty, target.ty) {
                        let kind = ValidationErrorKind::TypeMismatch {
                            expected: self.type_name(target.ty),
                            found: self.type_name(produced.ty),
                        };
                        self.error(kind, value.span, stmt.id);
                    } else if matches!(op, AssignOp::Assign) {
                        self.check_literal_range(value, target.ty);
                    }
                }
            }
            StmtKind::IncrementDecrement { target, increment } => {
                self.assignment_target(target);
                if let Some(record) = self.record(target) {
                    let is_integer = self.types.numeric_kind(record.ty).is_some_and(NumericKind::is_integer);
                    if !is_integer {
                        let kind = ValidationErrorKind::InvalidOperand {
                            op: if *increment { "++" } else { "--" },
                            operand: self.type_name(record.ty),
                        };
                        self.error(kind, target.span, stmt.id);
                    }
                }
            }
            StmtKind::Variable(variable) => self.local_variable(stmt, variable),
        }
    }

    fn condition(&mut self, condition: &Expr) {
        if let Some(record) = self.record(condition) {
            if !self.types.is_boolean(record.ty) {
                let kind = ValidationErrorKind::ConditionNotBoolean { found: self.type_name(record.ty) };
                self.error(kind, condition.span, condition.id);
            }
        }
    }

    fn return_value(&mut self, stmt: &Stmt, value: Option<&Expr>, context: &FunctionContext) {
        let is_void = self.types.is_void(context.return_type);
        match value {
            Some(_) if is_void => self.error(ValidationErrorKind::UnexpectedReturnValue, stmt.span, stmt.id),
            Some(value) => self.require_assignable(value, context.return_type),
            None if !is_void => {
                let kind = ValidationErrorKind::MissingReturnValue { expected: self.type_name(context.return_type) };
                self.error(kind, stmt.span, stmt.id);
            }
            None => {}
        }
    }

    fn assignment_target(&mut self, target: &Expr) {
        let Some(record) = self.record(target) else {
            return;
        };
        if !record.is_storage {
            self.error(ValidationErrorKind::NotAssignable, target.span, target.id);
        } else if record.is_constant {
            self.error(ValidationErrorKind::AssignToConstant, target.span, target.id);
        }
    }

    fn local_variable(&mut self, stmt: &Stmt, variable: &LocalVariable) {
        self.check_type(&variable.ty, stmt.id);
        let ty = variable.ty.ty;
        let attributes = self.types.attributes(ty);
        let is_pointer = matches!(self.types.kind(self.types.resolve(ty)), TypeKind::Pointer { .. });

        let reason = match variable.kind {
            LocalKind::Let if !attributes.storable => Some("variables must be storable"),
            LocalKind::Const if !attributes.constructable && !is_pointer => {
                Some("constants must be constructable or pointers")
            }
            _ => None,
        };
        if let Some(reason) = reason {
            let kind = ValidationErrorKind::InvalidVariableType {
                name: variable.name.clone(),
                ty: variable.ty.name.clone(),
                reason,
            };
            self.error(kind, stmt.span, stmt.id);
        }

        match &variable.init {
            Some(init) => self.require_assignable(init, ty),
            None if variable.kind == LocalKind::Const => {
                let kind = ValidationErrorKind::MissingInitializer { name: variable.name.clone() };
                self.error(kind, stmt.span, stmt.id);
            }
            None => {}
        }
    }
}

/// Whether every path through the block ends in `return`.
fn block_returns(block: &Block) -> bool {
    block.statements.iter().any(stmt_returns)
}

fn stmt_returns(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::Block(block) => block_returns(block),
        StmtKind::If { then_block, else_branch: Some(else_branch), .. } => {
            block_returns(then_block) && stmt_returns(else_branch)
        }
        StmtKind::Switch { cases, default: Some(default), .. } => {
            cases.iter().all(|case| block_returns(&case.body)) && block_returns(default)
        }
        _ => false,
    }
}
