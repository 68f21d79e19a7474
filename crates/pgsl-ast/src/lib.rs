// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Syntax tree types for PGSL.
//!
//! This crate defines the tokens and tree nodes shared between the lexer,
//! parser, semantic analysis and transpiler. Every node owns its children;
//! parent links are recorded by analysis in a side table keyed by [`NodeId`].

pub mod span;
pub mod token;
pub mod expr;
pub mod stmt;
pub mod decl;

pub use span::{LineMap, SourceRange, Span};

/// Unique identifier for syntax tree nodes.
///
/// Used by semantic analysis passes to track resolution results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);
}

/// Handle to a type definition owned by the module's type table.
///
/// Two handles are equal exactly when the definitions share a structural
/// identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);
