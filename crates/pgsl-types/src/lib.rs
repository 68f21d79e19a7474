// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type system for PGSL.
//!
//! A [`TypeTable`] owns every type definition of one module and deduplicates
//! them by structural identifier. The [`TypeFactory`] turns type names written
//! in source into table entries while the parser runs.

mod types;
mod table;
mod attributes;
mod cast;
mod factory;
mod error;

pub use types::{
    ArrayLength, BuildInKind, NumericKind, TextureKind, TextureTemplate, TypeAttributes,
    TypeDefinition, TypeKind, ACCESS_MODES, TEXEL_FORMATS,
};
pub use table::{Primitives, Shape, StructProperty, TypeTable};
pub use factory::{TemplateArg, TypeFactory};
pub use error::{TypeFactoryError, TypeFactoryErrorKind};
pub use pgsl_ast::TypeId;
