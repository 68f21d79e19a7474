// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Setup pass: scopes, name resolution and expression records.

use std::collections::{HashMap, HashSet};

use pgsl_ast::decl::{Attribute, Decl, DeclKind, DeclarationType, Document, FunctionDecl};
use pgsl_ast::expr::{Expr, ExprKind, TypeRef};
use pgsl_ast::stmt::{AssignOp, Block, Stmt, StmtKind};
use pgsl_ast::{NodeId, Span};
use pgsl_types::{TypeFactory, TypeKind, TypeTable};

use crate::buildin;
use crate::error::{ValidationError, ValidationErrorKind};
use crate::model::{CallTarget, ExpressionRecord, FunctionInfo, SemanticModel, VariableInfo, VariableKind};
use crate::rules;
use crate::scope::{ScopeKind, ScopeTree};
use crate::suggest;

/// Build scopes, resolve every name and compute a record for every
/// expression. Errors found on the way are reported again by
/// [`crate::validate`].
pub fn setup(document: &Document, types: &mut TypeTable) -> SemanticModel {
    let mut setup = Setup {
        types,
        scopes: ScopeTree::new(),
        model: SemanticModel::default(),
        enums: HashMap::new(),
    };
    setup.register_module(document);
    for decl in &document.declarations {
        setup.declaration(decl);
    }
    log::debug!(
        "setup: {} expressions, {} variables, {} errors",
        setup.model.expressions.len(),
        setup.model.variables.len(),
        setup.model.setup_errors.len()
    );
    setup.model
}

struct Setup<'a> {
    types: &'a mut TypeTable,
    scopes: ScopeTree,
    model: SemanticModel,
    /// Enum name to its value names.
    enums: HashMap<String, Vec<String>>,
}

impl Setup<'_> {
    fn error(&mut self, kind: ValidationErrorKind, span: Span, node: NodeId) {
        self.model.setup_errors.push(ValidationError::new(kind, span, node));
    }

    // =========================================================================
    // Module names
    // =========================================================================

    /// Module names are visible everywhere in the module, so they are all
    /// registered before any body is walked.
    fn register_module(&mut self, document: &Document) {
        let mut seen = HashSet::new();
        for decl in &document.declarations {
            let name = decl.name();
            if !seen.insert(name) {
                self.error(
                    ValidationErrorKind::DuplicateDeclaration { name: name.to_string() },
                    decl.span,
                    decl.id,
                );
                continue;
            }

            let is_type = matches!(decl.kind, DeclKind::Alias(_) | DeclKind::Enum(_) | DeclKind::Struct(_));
            if is_type && !decl.build_in && TypeFactory::is_builtin_type_name(name) {
                self.error(
                    ValidationErrorKind::ShadowsBuiltinType { name: name.to_string() },
                    decl.span,
                    decl.id,
                );
            }

            match &decl.kind {
                DeclKind::Enum(e) => {
                    let values = e.values.iter().map(|v| v.name.clone()).collect();
                    self.enums.insert(e.name.clone(), values);
                }
                DeclKind::Function(f) => {
                    if buildin::lookup(name).is_some() {
                        self.error(
                            ValidationErrorKind::ShadowsBuiltinFunction { name: name.to_string() },
                            decl.span,
                            decl.id,
                        );
                    }
                    self.model.functions.insert(
                        f.name.clone(),
                        FunctionInfo {
                            node: decl.id,
                            name: f.name.clone(),
                            params: f.params.iter().map(|p| p.ty.ty).collect(),
                            return_type: f.return_ty.ty,
                        },
                    );
                }
                DeclKind::Variable(v) => {
                    let read_only = v.declaration_type == DeclarationType::Storage
                        && decl.attribute("AccessMode").is_some_and(is_read_access);
                    self.define_variable(VariableInfo {
                        node: decl.id,
                        name: v.name.clone(),
                        ty: v.ty.ty,
                        kind: VariableKind::Module(v.declaration_type),
                        span: decl.span,
                        read_only,
                    });
                    self.model.module_variables.insert(v.name.clone(), decl.id);
                }
                DeclKind::Alias(_) | DeclKind::Struct(_) => {}
            }
        }
    }

    fn define_variable(&mut self, info: VariableInfo) {
        if self.scopes.define(&info.name, info.node).is_err() {
            self.error(
                ValidationErrorKind::DuplicateVariable { name: info.name.clone() },
                info.span,
                info.node,
            );
        }
        self.model.variables.insert(info.node, info);
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn declaration(&mut self, decl: &Decl) {
        self.attributes(&decl.attributes, decl.id);
        match &decl.kind {
            DeclKind::Alias(a) => self.type_ref(&a.ty, decl.id),
            DeclKind::Enum(e) => {
                for value in &e.values {
                    self.model.parents.insert(value.id, decl.id);
                    self.expr(&value.value, value.id);
                }
            }
            DeclKind::Struct(s) => {
                for property in &s.properties {
                    self.model.parents.insert(property.id, decl.id);
                    self.attributes(&property.attributes, property.id);
                    self.type_ref(&property.ty, property.id);
                }
            }
            DeclKind::Function(f) => self.function(decl, f),
            DeclKind::Variable(v) => {
                self.type_ref(&v.ty, decl.id);
                if let Some(init) = &v.init {
                    self.expr(init, decl.id);
                }
            }
        }
    }

    fn attributes(&mut self, attributes: &[Attribute], parent: NodeId) {
        for attribute in attributes {
            self.model.parents.insert(attribute.id, parent);
            for arg in &attribute.args {
                self.expr(arg, attribute.id);
            }
        }
    }

    /// Array lengths written inside a type.
    fn type_ref(&mut self, ty: &TypeRef, parent: NodeId) {
        for expr in &ty.template_exprs {
            self.expr(expr, parent);
        }
    }

    fn function(&mut self, decl: &Decl, function: &FunctionDecl) {
        // Parameters and the outermost body statements share one frame.
        self.scopes.push(ScopeKind::Function);
        for param in &function.params {
            self.model.parents.insert(param.id, decl.id);
            self.attributes(&param.attributes, param.id);
            self.type_ref(&param.ty, param.id);
            self.define_variable(VariableInfo {
                node: param.id,
                name: param.name.clone(),
                ty: param.ty.ty,
                kind: VariableKind::Parameter,
                span: param.span,
                read_only: false,
            });
        }
        self.type_ref(&function.return_ty, decl.id);
        self.model.parents.insert(function.body.id, decl.id);
        self.statements(&function.body);
        self.scopes.pop();
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn block(&mut self, block: &Block, kind: ScopeKind, parent: NodeId) {
        self.model.parents.insert(block.id, parent);
        self.scopes.push(kind);
        self.statements(block);
        self.scopes.pop();
    }

    fn statements(&mut self, block: &Block) {
        for stmt in &block.statements {
            self.statement(stmt, block.id);
        }
    }

    fn statement(&mut self, stmt: &Stmt, parent: NodeId) {
        self.model.parents.insert(stmt.id, parent);
        let id = stmt.id;

        match &stmt.kind {
            StmtKind::Block(block) => self.block(block, ScopeKind::Block, id),
            StmtKind::If { condition, then_block, else_branch } => {
                self.expr(condition, id);
                self.block(then_block, ScopeKind::Block, id);
                if let Some(else_branch) = else_branch {
                    self.statement(else_branch, id);
                }
            }
            StmtKind::Switch { selector, cases, default } => {
                self.expr(selector, id);
                for case in cases {
                    self.model.parents.insert(case.id, id);
                    for value in &case.values {
                        self.expr(value, case.id);
                    }
                    self.block(&case.body, ScopeKind::Switch, case.id);
                }
                if let Some(default) = default {
                    self.block(default, ScopeKind::Switch, id);
                }
            }
            StmtKind::For { init, condition, update, body } => {
                // The loop variable lives in its own frame around the body.
                self.scopes.push(ScopeKind::Block);
                if let Some(init) = init {
                    self.statement(init, id);
                }
                if let Some(condition) = condition {
                    self.expr(condition, id);
                }
                if let Some(update) = update {
                    self.statement(update, id);
                }
                self.block(body, ScopeKind::Loop, id);
                self.scopes.pop();
            }
            StmtKind::While { condition, body } => {
                self.expr(condition, id);
                self.block(body, ScopeKind::Loop, id);
            }
            StmtKind::DoWhile { body, condition } => {
                self.block(body, ScopeKind::Loop, id);
                self.expr(condition, id);
            }
            StmtKind::Break => {
                if !self.scopes.in_breakable() {
                    self.error(ValidationErrorKind::InvalidBreak, stmt.span, id);
                }
            }
            StmtKind::Continue => {
                if !self.scopes.in_loop() {
                    self.error(ValidationErrorKind::InvalidContinue, stmt.span, id);
                }
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.expr(value, id);
                }
            }
            StmtKind::Discard => {}
            StmtKind::Assignment { target, op, value } => {
                let target = self.expr(target, id);
                let value = self.expr(value, id);
                if let (AssignOp::Compound(op), Some(target), Some(value)) = (op, target, value) {
                    match rules::binary(self.types, *op, &target, &value) {
                        Ok(record) => {
                            self.model.expressions.insert(id, record);
                        }
                        Err(kind) => self.error(kind, stmt.span, id),
                    }
                }
            }
            StmtKind::IncrementDecrement { target, .. } => {
                self.expr(target, id);
            }
            StmtKind::Call(call) => {
                self.expr(call, id);
            }
            StmtKind::Variable(variable) => {
                // The initializer cannot see the variable it initializes.
                if let Some(init) = &variable.init {
                    self.expr(init, id);
                }
                self.type_ref(&variable.ty, id);
                self.define_variable(VariableInfo {
                    node: id,
                    name: variable.name.clone(),
                    ty: variable.ty.ty,
                    kind: VariableKind::Local(variable.kind),
                    span: stmt.span,
                    read_only: false,
                });
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Record `expr` and its operands. `None` when the expression or one of
    /// its operands is invalid; only the innermost failure is reported.
    fn expr(&mut self, expr: &Expr, parent: NodeId) -> Option<ExpressionRecord> {
        self.model.parents.insert(expr.id, parent);
        let id = expr.id;

        let result = match &expr.kind {
            ExprKind::Literal(literal) => Ok(rules::literal(self.types, literal)),
            ExprKind::String(_) => Ok(ExpressionRecord::literal(self.types.primitives().string)),
            ExprKind::Variable(name) => match self.scopes.lookup(name) {
                Some(node) => {
                    self.model.resolutions.insert(id, node);
                    Ok(self.model.variables.get(&node)?.record())
                }
                None => Err(ValidationErrorKind::UndefinedVariable {
                    name: name.clone(),
                    suggestion: suggest::closest(name, self.scopes.visible_names()),
                }),
            },
            ExprKind::EnumValue { enum_name, value } => self.enum_value(enum_name, value),
            ExprKind::Unary { op, operand } => {
                let operand = self.expr(operand, id)?;
                rules::unary(self.types, *op, &operand)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.expr(left, id);
                let right = self.expr(right, id);
                rules::binary(self.types, *op, &left?, &right?)
            }
            ExprKind::Index { value, index: index_expr } => {
                let value = self.expr(value, id);
                let index = self.expr(index_expr, id);
                rules::index(self.types, &value?, &index?, index_expr.as_signed_int_literal())
            }
            ExprKind::Decomposition { value, property } => {
                let value = self.expr(value, id)?;
                rules::decomposition(self.types, &value, property)
            }
            ExprKind::AddressOf(operand) => {
                let record = self.expr(operand, id)?;
                let is_component = self.is_vector_component(operand);
                rules::address_of(self.types, &record, is_component)
            }
            ExprKind::Deref(operand) => {
                let operand = self.expr(operand, id)?;
                rules::deref(self.types, &operand)
            }
            ExprKind::Call { name, args } => {
                let args = self.args(args, id)?;
                self.call(id, name, &args)
            }
            ExprKind::New { ty, args } => {
                self.type_ref(ty, id);
                let args = self.args(args, id)?;
                rules::construct(self.types, ty.ty, &args)
            }
            ExprKind::Parenthesized(inner) => Ok(self.expr(inner, id)?),
        };

        match result {
            Ok(record) => {
                self.model.expressions.insert(id, record);
                Some(record)
            }
            Err(kind) => {
                self.error(kind, expr.span, id);
                None
            }
        }
    }

    /// Every argument is recorded even when an earlier one fails.
    fn args(&mut self, args: &[Expr], parent: NodeId) -> Option<Vec<ExpressionRecord>> {
        let records: Vec<_> = args.iter().map(|arg| self.expr(arg, parent)).collect();
        records.into_iter().collect()
    }

    fn call(&mut self, id: NodeId, name: &str, args: &[ExpressionRecord]) -> Result<ExpressionRecord, ValidationErrorKind> {
        if let Some(function) = self.model.functions.get(name) {
            self.model.calls.insert(id, CallTarget::User(function.node));
            return rules::user_call(self.types, function, args);
        }
        if let Some(function) = buildin::lookup(name) {
            self.model.calls.insert(id, CallTarget::BuildIn(function));
            return rules::build_in_call(self.types, function, args);
        }
        let mut candidates: Vec<&str> = self.model.functions.keys().map(String::as_str).collect();
        for build_in in buildin::names() {
            candidates.push(build_in);
        }
        Err(ValidationErrorKind::UndefinedFunction {
            name: name.to_string(),
            suggestion: suggest::closest(name, candidates),
        })
    }

    fn enum_value(&mut self, enum_name: &str, value: &str) -> Result<ExpressionRecord, ValidationErrorKind> {
        let known = self
            .enums
            .get(enum_name)
            .is_some_and(|values| values.iter().any(|v| v == value));
        if !known {
            return Err(ValidationErrorKind::UnknownEnumValue {
                enum_name: enum_name.to_string(),
                value: value.to_string(),
            });
        }
        let ty = self.types.intern(TypeKind::Enum { name: enum_name.to_string() });
        Ok(ExpressionRecord::literal(ty))
    }

    /// `v[i]` or `v.x` on a vector `v`.
    fn is_vector_component(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Index { value, .. } | ExprKind::Decomposition { value, .. } => self
                .model
                .record(value.id)
                .is_some_and(|r| matches!(self.types.kind(self.types.resolve(r.ty)), TypeKind::Vector { .. })),
            _ => false,
        }
    }
}

/// `AccessMode(AccessMode.Read)`
fn is_read_access(attribute: &Attribute) -> bool {
    matches!(
        attribute.args.first().map(|a| &a.kind),
        Some(ExprKind::EnumValue { enum_name, value }) if enum_name == "AccessMode" && value == "Read"
    )
}
