// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Turning written type names into type definitions.

use std::collections::HashSet;

use pgsl_ast::{Span, TypeId};

use crate::error::{TypeFactoryError, TypeFactoryErrorKind};
use crate::table::TypeTable;
use crate::types::{
    ArrayLength, BuildInKind, NumericKind, TextureKind, TextureTemplate, TypeKind, ACCESS_MODES,
    TEXEL_FORMATS,
};

/// One argument of a template list.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArg {
    Type(TypeId),
    /// A value argument such as an array length.
    Expression(ArrayLength),
    String(String),
}

/// Generates types for one module while it is parsed.
///
/// Struct, alias and enum names become resolvable once the parser registers
/// them, so a name can only be used after its declaration header.
#[derive(Debug, Default)]
pub struct TypeFactory {
    table: TypeTable,
    structs: HashSet<String>,
    aliases: HashSet<String>,
    enums: HashSet<String>,
}

fn vector_dimension(name: &str) -> Option<u8> {
    match name {
        "Vector2" => Some(2),
        "Vector3" => Some(3),
        "Vector4" => Some(4),
        _ => None,
    }
}

/// `MatrixCR` with columns and rows in 2..=4.
fn matrix_shape(name: &str) -> Option<(u8, u8)> {
    let digits = name.strip_prefix("Matrix")?.as_bytes();
    match digits {
        [c @ b'2'..=b'4', r @ b'2'..=b'4'] => Some((c - b'0', r - b'0')),
        _ => None,
    }
}

impl TypeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TypeTable {
        &mut self.table
    }

    pub fn into_table(self) -> TypeTable {
        self.table
    }

    pub fn add_struct_predefinition(&mut self, name: &str) {
        self.structs.insert(name.to_string());
    }

    /// Register an alias together with its target type.
    pub fn add_alias_predefinition(&mut self, name: &str, target: TypeId) {
        self.aliases.insert(name.to_string());
        self.table.define_alias(name, target);
    }

    pub fn add_enum_predefinition(&mut self, name: &str) {
        self.enums.insert(name.to_string());
    }

    pub fn is_enum_name(&self, name: &str) -> bool {
        self.enums.contains(name)
    }

    /// Whether `name` currently resolves to a type.
    pub fn is_type_name(&self, name: &str) -> bool {
        name == "void"
            || self.structs.contains(name)
            || self.aliases.contains(name)
            || self.enums.contains(name)
            || Self::is_builtin_type_name(name)
    }

    /// Names of types provided by the language itself.
    pub fn is_builtin_type_name(name: &str) -> bool {
        matches!(name, "void" | "Boolean" | "String" | "Sampler" | "SamplerComparison" | "Array")
            || BuildInKind::from_name(name).is_some()
            || NumericKind::from_name(name).is_some()
            || vector_dimension(name).is_some()
            || matrix_shape(name).is_some()
            || TextureKind::from_name(name).is_some()
    }

    /// Generate the type for `name` with the given template arguments.
    pub fn generate(
        &mut self,
        name: &str,
        is_pointer: bool,
        args: &[TemplateArg],
        span: Span,
    ) -> Result<TypeId, TypeFactoryError> {
        if is_pointer {
            let inner = self.generate(name, false, args, span)?;
            return Ok(self.table.pointer(inner));
        }

        let primitives = self.table.primitives();
        if name == "void" {
            no_templates(name, args, span)?;
            return Ok(primitives.void);
        }
        if self.structs.contains(name) {
            no_templates(name, args, span)?;
            return Ok(self.table.intern(TypeKind::Struct { name: name.to_string() }));
        }
        if self.aliases.contains(name) {
            no_templates(name, args, span)?;
            return Ok(self.table.intern(TypeKind::Alias { name: name.to_string() }));
        }
        if self.enums.contains(name) {
            no_templates(name, args, span)?;
            return Ok(self.table.intern(TypeKind::Enum { name: name.to_string() }));
        }
        if let Some(kind) = BuildInKind::from_name(name) {
            return self.build_in(kind, args, span);
        }
        if let Some(kind) = NumericKind::from_name(name) {
            no_templates(name, args, span)?;
            return Ok(primitives.numeric(kind));
        }
        match name {
            "Boolean" => {
                no_templates(name, args, span)?;
                return Ok(primitives.boolean);
            }
            "String" => {
                no_templates(name, args, span)?;
                return Ok(primitives.string);
            }
            _ => {}
        }
        if let Some(dimension) = vector_dimension(name) {
            let inner = single_type(name, args, span)?;
            if !matches!(self.resolved_kind(inner), TypeKind::Numeric(_) | TypeKind::Boolean) {
                return Err(self.inner_type_error(name, inner, "a numeric or boolean type", span));
            }
            return Ok(self.table.vector(dimension, inner));
        }
        if let Some((columns, rows)) = matrix_shape(name) {
            let inner = single_type(name, args, span)?;
            if !matches!(self.resolved_kind(inner), TypeKind::Numeric(_)) {
                return Err(self.inner_type_error(name, inner, "a numeric type", span));
            }
            return Ok(self.table.matrix(columns, rows, inner));
        }
        match name {
            "Sampler" | "SamplerComparison" => {
                no_templates(name, args, span)?;
                return Ok(self.table.intern(TypeKind::Sampler { comparison: name == "SamplerComparison" }));
            }
            "Array" => return self.array(args, span),
            _ => {}
        }
        if let Some(kind) = TextureKind::from_name(name) {
            return self.texture(kind, args, span);
        }

        Err(TypeFactoryError::new(
            TypeFactoryErrorKind::UnknownType { name: name.to_string() },
            span,
        ))
    }

    fn resolved_kind(&self, id: TypeId) -> &TypeKind {
        self.table.kind(self.table.resolve_alias(id))
    }

    fn inner_type_error(&self, name: &str, inner: TypeId, expected: &'static str, span: Span) -> TypeFactoryError {
        TypeFactoryError::new(
            TypeFactoryErrorKind::InnerType {
                name: name.to_string(),
                inner: self.table.name(inner),
                expected,
            },
            span,
        )
    }

    fn build_in(&mut self, kind: BuildInKind, args: &[TemplateArg], span: Span) -> Result<TypeId, TypeFactoryError> {
        let p = self.table.primitives();
        let underlying = match kind {
            BuildInKind::ClipDistances => {
                let length = match args {
                    [TemplateArg::Expression(length)] => length.clone(),
                    [_] => return Err(template_kind(kind.name(), 1, "a length expression", span)),
                    _ => return Err(template_count(kind.name(), "exactly one", args.len(), span)),
                };
                self.table.intern(TypeKind::Array { inner: p.float, length: Some(length) })
            }
            _ => {
                no_templates(kind.name(), args, span)?;
                match kind {
                    BuildInKind::Position => self.table.vector(4, p.float),
                    BuildInKind::FrontFacing => p.boolean,
                    BuildInKind::FragDepth => p.float,
                    BuildInKind::LocalInvocationId
                    | BuildInKind::GlobalInvocationId
                    | BuildInKind::WorkgroupId
                    | BuildInKind::NumWorkgroups => self.table.vector(3, p.unsigned_integer),
                    _ => p.unsigned_integer,
                }
            }
        };
        Ok(self.table.intern(TypeKind::BuildIn { kind, underlying }))
    }

    fn array(&mut self, args: &[TemplateArg], span: Span) -> Result<TypeId, TypeFactoryError> {
        let (inner, length) = match args {
            [TemplateArg::Type(inner)] => (*inner, None),
            [TemplateArg::Type(inner), TemplateArg::Expression(length)] => (*inner, Some(length.clone())),
            [TemplateArg::Type(_), _] => return Err(template_kind("Array", 2, "a length expression", span)),
            [_] | [_, _] => return Err(template_kind("Array", 1, "a type", span)),
            _ => return Err(template_count("Array", "one or two", args.len(), span)),
        };
        if matches!(self.resolved_kind(inner), TypeKind::Void) {
            return Err(self.inner_type_error("Array", inner, "a value type", span));
        }
        Ok(self.table.intern(TypeKind::Array { inner, length }))
    }

    fn texture(&mut self, kind: TextureKind, args: &[TemplateArg], span: Span) -> Result<TypeId, TypeFactoryError> {
        let name = kind.name();
        let texture = match kind.template() {
            TextureTemplate::None => {
                no_templates(name, args, span)?;
                TypeKind::Texture { kind, sampled: None, format: None, access: None }
            }
            TextureTemplate::SampledType => {
                let sampled = single_type(name, args, span)?;
                match self.resolved_kind(sampled) {
                    TypeKind::Numeric(n) if !n.is_abstract() && *n != NumericKind::Float16 => {}
                    _ => return Err(self.inner_type_error(name, sampled, "a 32-bit numeric type", span)),
                }
                TypeKind::Texture { kind, sampled: Some(sampled), format: None, access: None }
            }
            TextureTemplate::FormatAccess => {
                let (format, access) = match args {
                    [TemplateArg::String(format), TemplateArg::String(access)] => (format, access),
                    [TemplateArg::String(_), _] => return Err(template_kind(name, 2, "a string", span)),
                    [_, _] => return Err(template_kind(name, 1, "a string", span)),
                    _ => return Err(template_count(name, "exactly two", args.len(), span)),
                };
                if !TEXEL_FORMATS.contains(&format.as_str()) {
                    return Err(TypeFactoryError::new(
                        TypeFactoryErrorKind::UnknownTexelFormat { format: format.clone() },
                        span,
                    ));
                }
                if !ACCESS_MODES.contains(&access.as_str()) {
                    return Err(TypeFactoryError::new(
                        TypeFactoryErrorKind::UnknownAccessMode { access: access.clone() },
                        span,
                    ));
                }
                TypeKind::Texture {
                    kind,
                    sampled: None,
                    format: Some(format.clone()),
                    access: Some(access.clone()),
                }
            }
        };
        Ok(self.table.intern(texture))
    }
}

fn template_count(name: &str, expected: &'static str, found: usize, span: Span) -> TypeFactoryError {
    TypeFactoryError::new(
        TypeFactoryErrorKind::TemplateCount { name: name.to_string(), expected, found },
        span,
    )
}

fn template_kind(name: &str, position: usize, expected: &'static str, span: Span) -> TypeFactoryError {
    TypeFactoryError::new(
        TypeFactoryErrorKind::TemplateKind { name: name.to_string(), position, expected },
        span,
    )
}

fn no_templates(name: &str, args: &[TemplateArg], span: Span) -> Result<(), TypeFactoryError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(template_count(name, "no", args.len(), span))
    }
}

fn single_type(name: &str, args: &[TemplateArg], span: Span) -> Result<TypeId, TypeFactoryError> {
    match args {
        [TemplateArg::Type(inner)] => Ok(*inner),
        [_] => Err(template_kind(name, 1, "a type", span)),
        _ => Err(template_count(name, "exactly one", args.len(), span)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 1)
    }

    #[test]
    fn scalars_and_vectors() {
        let mut factory = TypeFactory::new();
        let float = factory.generate("Float", false, &[], span()).unwrap();
        let v = factory.generate("Vector3", false, &[TemplateArg::Type(float)], span()).unwrap();
        assert_eq!(factory.table().identifier(v), "Vector3<Float>");
    }

    #[test]
    fn array_dedup_across_calls() {
        let mut factory = TypeFactory::new();
        let int = factory.generate("Integer", false, &[], span()).unwrap();
        let args = [TemplateArg::Type(int), TemplateArg::Expression(ArrayLength::Literal(3))];
        let a = factory.generate("Array", false, &args, span()).unwrap();
        let b = factory.generate("Array", false, &args, span()).unwrap();
        assert_eq!(a, b);
        assert_eq!(factory.table().identifier(a), "Array<Integer,3>");
    }

    #[test]
    fn unknown_type() {
        let mut factory = TypeFactory::new();
        let err = factory.generate("Integr", false, &[], span()).unwrap_err();
        assert_eq!(err.kind, TypeFactoryErrorKind::UnknownType { name: "Integr".into() });
    }

    #[test]
    fn vector_template_arity() {
        let mut factory = TypeFactory::new();
        let err = factory.generate("Vector2", false, &[], span()).unwrap_err();
        assert!(err.is_template_arity());
        let float = factory.table().primitives().float;
        let err = factory
            .generate("Float", false, &[TemplateArg::Type(float)], span())
            .unwrap_err();
        assert!(err.is_template_arity());
    }

    #[test]
    fn vector_rejects_non_scalar_inner() {
        let mut factory = TypeFactory::new();
        let sampler = factory.generate("Sampler", false, &[], span()).unwrap();
        let err = factory
            .generate("Vector2", false, &[TemplateArg::Type(sampler)], span())
            .unwrap_err();
        assert!(matches!(err.kind, TypeFactoryErrorKind::InnerType { .. }));
    }

    #[test]
    fn array_length_must_be_an_expression() {
        let mut factory = TypeFactory::new();
        let int = factory.table().primitives().integer;
        let err = factory
            .generate("Array", false, &[TemplateArg::Type(int), TemplateArg::Type(int)], span())
            .unwrap_err();
        assert_eq!(
            err.kind,
            TypeFactoryErrorKind::TemplateKind { name: "Array".into(), position: 2, expected: "a length expression" }
        );
    }

    #[test]
    fn pointer_wraps_resolved_type() {
        let mut factory = TypeFactory::new();
        let p = factory.generate("Integer", true, &[], span()).unwrap();
        assert_eq!(factory.table().identifier(p), "*Integer");
    }

    #[test]
    fn registered_names_resolve_in_order() {
        let mut factory = TypeFactory::new();
        assert!(factory.generate("Light", false, &[], span()).is_err());
        factory.add_struct_predefinition("Light");
        let light = factory.generate("Light", false, &[], span()).unwrap();
        assert_eq!(factory.table().identifier(light), "struct Light");
        assert!(factory.is_type_name("Light"));
    }

    #[test]
    fn struct_names_take_precedence() {
        let mut factory = TypeFactory::new();
        factory.add_struct_predefinition("Position");
        let s = factory.generate("Position", false, &[], span()).unwrap();
        assert!(matches!(factory.table().kind(s), TypeKind::Struct { .. }));
    }

    #[test]
    fn matrices_are_named_columns_rows() {
        let mut factory = TypeFactory::new();
        let float = factory.table().primitives().float;
        let m = factory.generate("Matrix34", false, &[TemplateArg::Type(float)], span()).unwrap();
        assert_eq!(factory.table().kind(m), &TypeKind::Matrix { columns: 3, rows: 4, inner: float });
        assert!(factory.generate("Matrix15", false, &[TemplateArg::Type(float)], span()).is_err());
    }

    #[test]
    fn storage_texture_validates_strings() {
        let mut factory = TypeFactory::new();
        let ok = factory.generate(
            "TextureStorage2d",
            false,
            &[TemplateArg::String("rgba8unorm".into()), TemplateArg::String("write".into())],
            span(),
        );
        assert!(ok.is_ok());
        let err = factory
            .generate(
                "TextureStorage2d",
                false,
                &[TemplateArg::String("rgb9".into()), TemplateArg::String("write".into())],
                span(),
            )
            .unwrap_err();
        assert!(matches!(err.kind, TypeFactoryErrorKind::UnknownTexelFormat { .. }));
    }

    #[test]
    fn clip_distances_carries_length() {
        let mut factory = TypeFactory::new();
        let id = factory
            .generate("ClipDistances", false, &[TemplateArg::Expression(ArrayLength::Literal(4))], span())
            .unwrap();
        assert_eq!(factory.table().identifier(id), "ClipDistances<4>");
        let float = factory.table().primitives().float;
        let resolved = factory.table().resolve(id);
        assert_eq!(
            factory.table().kind(resolved),
            &TypeKind::Array { inner: float, length: Some(ArrayLength::Literal(4)) }
        );
    }
}
