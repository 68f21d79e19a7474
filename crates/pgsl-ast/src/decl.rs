// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration nodes and the document root.

use crate::expr::{Expr, TypeRef};
use crate::stmt::Block;
use crate::{NodeId, Span};

/// Root of a parsed module: top-level declarations in source order.
///
/// Build-in declarations from the prelude come first.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub declarations: Vec<Decl>,
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub struct Decl {
    pub id: NodeId,
    pub kind: DeclKind,
    pub attributes: Vec<Attribute>,
    /// Synthetic declaration: validated, never transpiled.
    pub build_in: bool,
    pub span: Span,
}

/// The kind of declaration.
#[derive(Debug, Clone)]
pub enum DeclKind {
    Alias(AliasDecl),
    Enum(EnumDecl),
    Struct(StructDecl),
    Function(FunctionDecl),
    Variable(VariableDecl),
}

/// `alias Name = Type;`
#[derive(Debug, Clone)]
pub struct AliasDecl {
    pub name: String,
    pub ty: TypeRef,
}

/// `enum Name { A = 1, B = 2 }`
#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub id: NodeId,
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: String,
    pub properties: Vec<Property>,
}

/// A struct property.
#[derive(Debug, Clone)]
pub struct Property {
    pub id: NodeId,
    pub name: String,
    pub ty: TypeRef,
    pub attributes: Vec<Attribute>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_ty: TypeRef,
    pub body: Block,
}

/// A function parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub id: NodeId,
    pub name: String,
    pub ty: TypeRef,
    pub attributes: Vec<Attribute>,
    pub span: Span,
}

/// Module-scope variable.
#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub declaration_type: DeclarationType,
    pub name: String,
    pub ty: TypeRef,
    pub init: Option<Expr>,
}

/// `[Name(arg, ...)]`
#[derive(Debug, Clone)]
pub struct Attribute {
    pub id: NodeId,
    pub name: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// Module-scope declaration keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationType {
    Const,
    Storage,
    Uniform,
    Workgroup,
    Private,
    /// Pipeline-overridable constant.
    Param,
}

/// Storage class of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressSpace {
    Function,
    Private,
    Workgroup,
    Uniform,
    Storage,
    /// Samplers and textures bound through a uniform declaration.
    Handle,
    /// Values with no memory location (`const`, `param`).
    None,
}

impl DeclarationType {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclarationType::Const => "const",
            DeclarationType::Storage => "storage",
            DeclarationType::Uniform => "uniform",
            DeclarationType::Workgroup => "workgroup",
            DeclarationType::Private => "private",
            DeclarationType::Param => "param",
        }
    }

    /// The address space this keyword maps to. Analysis places uniform
    /// samplers and textures in [`AddressSpace::Handle`] instead.
    pub fn address_space(self) -> AddressSpace {
        match self {
            DeclarationType::Const | DeclarationType::Param => AddressSpace::None,
            DeclarationType::Storage => AddressSpace::Storage,
            DeclarationType::Uniform => AddressSpace::Uniform,
            DeclarationType::Workgroup => AddressSpace::Workgroup,
            DeclarationType::Private => AddressSpace::Private,
        }
    }
}

impl Decl {
    pub fn name(&self) -> &str {
        match &self.kind {
            DeclKind::Alias(a) => &a.name,
            DeclKind::Enum(e) => &e.name,
            DeclKind::Struct(s) => &s.name,
            DeclKind::Function(f) => &f.name,
            DeclKind::Variable(v) => &v.name,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

impl Document {
    pub fn resolve_alias(&self, name: &str) -> Option<&AliasDecl> {
        self.declarations.iter().find_map(|d| match &d.kind {
            DeclKind::Alias(a) if a.name == name => Some(a),
            _ => None,
        })
    }

    pub fn resolve_enum(&self, name: &str) -> Option<&EnumDecl> {
        self.declarations.iter().find_map(|d| match &d.kind {
            DeclKind::Enum(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    pub fn resolve_struct(&self, name: &str) -> Option<&StructDecl> {
        self.declarations.iter().find_map(|d| match &d.kind {
            DeclKind::Struct(s) if s.name == name => Some(s),
            _ => None,
        })
    }

    pub fn resolve_function(&self, name: &str) -> Option<&FunctionDecl> {
        self.declarations.iter().find_map(|d| match &d.kind {
            DeclKind::Function(f) if f.name == name => Some(f),
            _ => None,
        })
    }

    pub fn resolve_variable(&self, name: &str) -> Option<&VariableDecl> {
        self.declarations.iter().find_map(|d| match &d.kind {
            DeclKind::Variable(v) if v.name == name => Some(v),
            _ => None,
        })
    }

    /// Declarations written by the user, without the prelude.
    pub fn user_declarations(&self) -> impl Iterator<Item = &Decl> {
        self.declarations.iter().filter(|d| !d.build_in)
    }
}
