// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The semantic model produced by setup.

use std::collections::HashMap;
use std::fmt;

use pgsl_ast::decl::{AddressSpace, DeclarationType};
use pgsl_ast::stmt::LocalKind;
use pgsl_ast::{NodeId, Span, TypeId};
use pgsl_types::{TypeKind, TypeTable};

use crate::buildin::BuildInFunction;
use crate::error::ValidationError;

/// How early the value of an expression is known.
///
/// Ordered from least to most fixed, so contexts compare with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fixedness {
    /// Changes at runtime.
    Variable,
    /// Fixed once the enclosing scope is entered.
    ScopeFixed,
    /// Fixed when the pipeline is created (overrides).
    PipelineCreationFixed,
    /// Fixed when the shader is created.
    ShaderCreationFixed,
    /// A literal.
    Constant,
}

impl fmt::Display for Fixedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fixedness::Variable => "variable",
            Fixedness::ScopeFixed => "scope-fixed",
            Fixedness::PipelineCreationFixed => "fixed at pipeline creation",
            Fixedness::ShaderCreationFixed => "fixed at shader creation",
            Fixedness::Constant => "constant",
        };
        f.write_str(name)
    }
}

/// What setup knows about one expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionRecord {
    pub ty: TypeId,
    /// Refers to memory that can be written or addressed.
    pub is_storage: bool,
    /// Cannot be assigned.
    pub is_constant: bool,
    pub fixedness: Fixedness,
}

impl ExpressionRecord {
    /// A value computed from its operands.
    pub(crate) fn value(ty: TypeId, is_constant: bool, fixedness: Fixedness) -> Self {
        Self { ty, is_storage: false, is_constant, fixedness }
    }

    pub(crate) fn literal(ty: TypeId) -> Self {
        Self::value(ty, true, Fixedness::Constant)
    }
}

/// Where a variable was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Module(DeclarationType),
    Local(LocalKind),
    Parameter,
}

/// A declared variable, module-scope or local.
#[derive(Debug, Clone)]
pub struct VariableInfo {
    /// The declaring decl, statement or parameter.
    pub node: NodeId,
    pub name: String,
    pub ty: TypeId,
    pub kind: VariableKind,
    pub span: Span,
    /// Storage declared with `AccessMode(AccessMode.Read)`.
    pub read_only: bool,
}

impl VariableInfo {
    pub fn is_storage(&self) -> bool {
        match self.kind {
            VariableKind::Module(dt) => !matches!(dt, DeclarationType::Const | DeclarationType::Param),
            VariableKind::Local(kind) => kind == LocalKind::Let,
            VariableKind::Parameter => false,
        }
    }

    pub fn is_constant(&self) -> bool {
        match self.kind {
            VariableKind::Module(DeclarationType::Storage) => self.read_only,
            VariableKind::Module(dt) => matches!(
                dt,
                DeclarationType::Const | DeclarationType::Param | DeclarationType::Uniform
            ),
            VariableKind::Local(kind) => kind == LocalKind::Const,
            VariableKind::Parameter => true,
        }
    }

    pub fn fixedness(&self) -> Fixedness {
        match self.kind {
            VariableKind::Module(DeclarationType::Const) => Fixedness::ShaderCreationFixed,
            VariableKind::Module(DeclarationType::Param) => Fixedness::PipelineCreationFixed,
            VariableKind::Local(LocalKind::Const) | VariableKind::Parameter => Fixedness::ScopeFixed,
            _ => Fixedness::Variable,
        }
    }

    /// Where the variable lives. Samplers and textures declared `uniform`
    /// are handles.
    pub fn address_space(&self, types: &TypeTable) -> AddressSpace {
        match self.kind {
            VariableKind::Module(DeclarationType::Uniform)
                if matches!(
                    types.kind(types.resolve(self.ty)),
                    TypeKind::Sampler { .. } | TypeKind::Texture { .. }
                ) =>
            {
                AddressSpace::Handle
            }
            VariableKind::Module(dt) => dt.address_space(),
            VariableKind::Local(LocalKind::Let) => AddressSpace::Function,
            VariableKind::Local(LocalKind::Const) | VariableKind::Parameter => AddressSpace::None,
        }
    }

    /// Module-scope declaration type, if any.
    pub fn declaration_type(&self) -> Option<DeclarationType> {
        match self.kind {
            VariableKind::Module(dt) => Some(dt),
            _ => None,
        }
    }

    pub(crate) fn record(&self) -> ExpressionRecord {
        ExpressionRecord {
            ty: self.ty,
            is_storage: self.is_storage(),
            is_constant: self.is_constant(),
            fixedness: self.fixedness(),
        }
    }
}

/// Signature of a user function.
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub node: NodeId,
    pub name: String,
    pub params: Vec<TypeId>,
    pub return_type: TypeId,
}

/// What a call expression calls.
#[derive(Debug, Clone, Copy)]
pub enum CallTarget {
    /// The declaring function decl.
    User(NodeId),
    BuildIn(&'static BuildInFunction),
}

/// Results of setup: resolved names and expression records.
#[derive(Debug, Default)]
pub struct SemanticModel {
    /// Expression node to its record. Compound assignments also store the
    /// record of their implied binary operation under the statement id.
    pub expressions: HashMap<NodeId, ExpressionRecord>,
    /// Variable expression to its declaring node.
    pub resolutions: HashMap<NodeId, NodeId>,
    /// Declaring node to variable.
    pub variables: HashMap<NodeId, VariableInfo>,
    pub functions: HashMap<String, FunctionInfo>,
    pub calls: HashMap<NodeId, CallTarget>,
    /// Child node to parent node.
    pub parents: HashMap<NodeId, NodeId>,
    pub(crate) module_variables: HashMap<String, NodeId>,
    pub(crate) setup_errors: Vec<ValidationError>,
}

impl SemanticModel {
    pub fn record(&self, expr: NodeId) -> Option<&ExpressionRecord> {
        self.expressions.get(&expr)
    }

    /// The variable a variable expression refers to.
    pub fn resolved_variable(&self, expr: NodeId) -> Option<&VariableInfo> {
        self.resolutions.get(&expr).and_then(|node| self.variables.get(node))
    }

    pub fn module_variable(&self, name: &str) -> Option<&VariableInfo> {
        self.module_variables.get(name).and_then(|node| self.variables.get(node))
    }

    pub fn function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.get(name)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }
}
