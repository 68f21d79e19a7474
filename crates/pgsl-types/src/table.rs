// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Central type registry for one module.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use pgsl_ast::TypeId;

use crate::types::{NumericKind, TypeAttributes, TypeDefinition, TypeKind};

/// Frequently used leaf types, interned when the table is created.
#[derive(Debug, Clone, Copy)]
pub struct Primitives {
    pub void: TypeId,
    pub boolean: TypeId,
    pub string: TypeId,
    pub integer: TypeId,
    pub unsigned_integer: TypeId,
    pub float: TypeId,
    pub float16: TypeId,
    pub abstract_integer: TypeId,
    pub abstract_float: TypeId,
}

impl Primitives {
    pub fn numeric(&self, kind: NumericKind) -> TypeId {
        match kind {
            NumericKind::Integer => self.integer,
            NumericKind::UnsignedInteger => self.unsigned_integer,
            NumericKind::Float => self.float,
            NumericKind::Float16 => self.float16,
            NumericKind::AbstractInteger => self.abstract_integer,
            NumericKind::AbstractFloat => self.abstract_float,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StructProperty {
    pub name: String,
    pub ty: TypeId,
}

/// A scalar or a vector of scalars, after resolving aliases, enums and
/// build-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub scalar: TypeId,
    pub dimension: Option<u8>,
}

/// Registry of all types in one module.
///
/// Definitions are deduplicated by structural identifier, so comparing two
/// [`TypeId`]s compares the types. A table is created per parse and never
/// shared between modules.
#[derive(Debug)]
pub struct TypeTable {
    definitions: Vec<TypeDefinition>,
    /// Structural identifier to definition.
    identities: HashMap<String, TypeId>,
    alias_targets: HashMap<String, TypeId>,
    struct_properties: HashMap<String, Vec<StructProperty>>,
    enum_underlying: HashMap<String, TypeId>,
    primitives: Primitives,
    pub(crate) attribute_memo: RefCell<HashMap<TypeId, TypeAttributes>>,
    pub(crate) visiting: RefCell<HashSet<TypeId>>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    pub fn new() -> Self {
        let placeholder = TypeId(0);
        let mut table = Self {
            definitions: Vec::new(),
            identities: HashMap::new(),
            alias_targets: HashMap::new(),
            struct_properties: HashMap::new(),
            enum_underlying: HashMap::new(),
            primitives: Primitives {
                void: placeholder,
                boolean: placeholder,
                string: placeholder,
                integer: placeholder,
                unsigned_integer: placeholder,
                float: placeholder,
                float16: placeholder,
                abstract_integer: placeholder,
                abstract_float: placeholder,
            },
            attribute_memo: RefCell::new(HashMap::new()),
            visiting: RefCell::new(HashSet::new()),
        };
        table.primitives = Primitives {
            void: table.intern(TypeKind::Void),
            boolean: table.intern(TypeKind::Boolean),
            string: table.intern(TypeKind::String),
            integer: table.intern(TypeKind::Numeric(NumericKind::Integer)),
            unsigned_integer: table.intern(TypeKind::Numeric(NumericKind::UnsignedInteger)),
            float: table.intern(TypeKind::Numeric(NumericKind::Float)),
            float16: table.intern(TypeKind::Numeric(NumericKind::Float16)),
            abstract_integer: table.intern(TypeKind::Numeric(NumericKind::AbstractInteger)),
            abstract_float: table.intern(TypeKind::Numeric(NumericKind::AbstractFloat)),
        };
        table
    }

    /// Return the definition with this kind's identifier, creating it if new.
    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        let identifier = self.identifier_for(&kind);
        if let Some(&id) = self.identities.get(&identifier) {
            return id;
        }
        let id = TypeId(self.definitions.len() as u32);
        log::trace!("interned type {} as {:?}", identifier, id);
        self.identities.insert(identifier.clone(), id);
        self.definitions.push(TypeDefinition { id, identifier, kind });
        id
    }

    /// Structural identifier of a kind. Aliases used as inner types are
    /// transparent, so `Vector3<A>` and `Vector3<Float>` are one type when
    /// `A` aliases `Float`.
    fn identifier_for(&self, kind: &TypeKind) -> String {
        let inner = |id: TypeId| self.identifier(self.resolve_alias(id)).to_string();
        match kind {
            TypeKind::Void => "void".to_string(),
            TypeKind::Boolean => "Boolean".to_string(),
            TypeKind::String => "String".to_string(),
            TypeKind::Numeric(n) => n.name().to_string(),
            TypeKind::Vector { dimension, inner: i } => format!("Vector{}<{}>", dimension, inner(*i)),
            TypeKind::Matrix { columns, rows, inner: i } => {
                format!("Matrix{}{}<{}>", columns, rows, inner(*i))
            }
            TypeKind::Array { inner: i, length: Some(length) } => format!("Array<{},{}>", inner(*i), length),
            TypeKind::Array { inner: i, length: None } => format!("Array<{}>", inner(*i)),
            TypeKind::Struct { name } => format!("struct {}", name),
            TypeKind::Enum { name } => format!("enum {}", name),
            TypeKind::Alias { name } => format!("alias {}", name),
            TypeKind::Pointer { inner: i } => format!("*{}", inner(*i)),
            TypeKind::Sampler { comparison: false } => "Sampler".to_string(),
            TypeKind::Sampler { comparison: true } => "SamplerComparison".to_string(),
            TypeKind::Texture { kind, sampled, format, access } => match (sampled, format, access) {
                (Some(s), _, _) => format!("{}<{}>", kind.name(), inner(*s)),
                (None, Some(f), Some(a)) => format!("{}<\"{}\",\"{}\">", kind.name(), f, a),
                _ => kind.name().to_string(),
            },
            TypeKind::BuildIn { kind, underlying } => match self.kind(*underlying) {
                TypeKind::Array { length: Some(length), .. } => format!("{}<{}>", kind.name(), length),
                _ => kind.name().to_string(),
            },
        }
    }

    pub fn get(&self, id: TypeId) -> &TypeDefinition {
        &self.definitions[id.0 as usize]
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.get(id).kind
    }

    pub fn identifier(&self, id: TypeId) -> &str {
        &self.get(id).identifier
    }

    /// Name for messages: declared names for user types, identifiers otherwise.
    pub fn name(&self, id: TypeId) -> String {
        match self.kind(id) {
            TypeKind::Struct { name } | TypeKind::Enum { name } | TypeKind::Alias { name } => name.clone(),
            _ => self.identifier(id).to_string(),
        }
    }

    pub fn lookup(&self, identifier: &str) -> Option<TypeId> {
        self.identities.get(identifier).copied()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn primitives(&self) -> Primitives {
        self.primitives
    }

    pub fn numeric(&self, kind: NumericKind) -> TypeId {
        self.primitives.numeric(kind)
    }

    pub fn vector(&mut self, dimension: u8, inner: TypeId) -> TypeId {
        self.intern(TypeKind::Vector { dimension, inner })
    }

    pub fn matrix(&mut self, columns: u8, rows: u8, inner: TypeId) -> TypeId {
        self.intern(TypeKind::Matrix { columns, rows, inner })
    }

    pub fn pointer(&mut self, inner: TypeId) -> TypeId {
        self.intern(TypeKind::Pointer { inner })
    }

    // === Named type bodies ===

    pub fn define_alias(&mut self, name: &str, target: TypeId) {
        self.alias_targets.insert(name.to_string(), target);
    }

    pub fn define_struct(&mut self, name: &str, properties: Vec<StructProperty>) {
        self.struct_properties.insert(name.to_string(), properties);
    }

    pub fn define_enum(&mut self, name: &str, underlying: TypeId) {
        self.enum_underlying.insert(name.to_string(), underlying);
    }

    pub fn alias_target(&self, name: &str) -> Option<TypeId> {
        self.alias_targets.get(name).copied()
    }

    pub fn struct_properties(&self, name: &str) -> Option<&[StructProperty]> {
        self.struct_properties.get(name).map(Vec::as_slice)
    }

    pub fn enum_underlying(&self, name: &str) -> Option<TypeId> {
        self.enum_underlying.get(name).copied()
    }

    /// Type of a struct property. `ty` may be an alias of the struct.
    pub fn property(&self, ty: TypeId, property: &str) -> Option<TypeId> {
        match self.kind(self.resolve_alias(ty)) {
            TypeKind::Struct { name } => self
                .struct_properties(name)?
                .iter()
                .find(|p| p.name == property)
                .map(|p| p.ty),
            _ => None,
        }
    }

    // === Resolution ===

    /// Follow aliases to the aliased type.
    pub fn resolve_alias(&self, mut id: TypeId) -> TypeId {
        for _ in 0..=self.definitions.len() {
            match self.kind(id) {
                TypeKind::Alias { name } => match self.alias_targets.get(name) {
                    Some(&target) => id = target,
                    None => return id,
                },
                _ => return id,
            }
        }
        id
    }

    /// Follow aliases, enums and build-ins to the type that answers
    /// castability and attribute questions.
    pub fn resolve(&self, mut id: TypeId) -> TypeId {
        for _ in 0..=self.definitions.len() {
            let next = match self.kind(id) {
                TypeKind::Alias { name } => self.alias_targets.get(name).copied(),
                TypeKind::Enum { name } => self.enum_underlying.get(name).copied(),
                TypeKind::BuildIn { underlying, .. } => Some(*underlying),
                _ => None,
            };
            match next {
                Some(next) => id = next,
                None => return id,
            }
        }
        id
    }

    pub fn numeric_kind(&self, id: TypeId) -> Option<NumericKind> {
        match self.kind(self.resolve(id)) {
            TypeKind::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_boolean(&self, id: TypeId) -> bool {
        matches!(self.kind(self.resolve(id)), TypeKind::Boolean)
    }

    pub fn is_void(&self, id: TypeId) -> bool {
        matches!(self.kind(self.resolve(id)), TypeKind::Void)
    }

    /// Scalar (numeric or boolean) or vector shape of a type.
    pub fn shape(&self, id: TypeId) -> Option<Shape> {
        let id = self.resolve(id);
        match self.kind(id) {
            TypeKind::Numeric(_) | TypeKind::Boolean => Some(Shape { scalar: id, dimension: None }),
            TypeKind::Vector { dimension, inner } => Some(Shape {
                scalar: self.resolve(*inner),
                dimension: Some(*dimension),
            }),
            _ => None,
        }
    }

    /// Build a type from a shape, interning the vector if needed.
    pub fn from_shape(&mut self, shape: Shape) -> TypeId {
        match shape.dimension {
            Some(dimension) => self.vector(dimension, shape.scalar),
            None => shape.scalar,
        }
    }

    /// Whether the type is or contains the named struct through properties
    /// and array elements.
    pub fn contains_struct(&self, id: TypeId, struct_name: &str) -> bool {
        let mut seen = HashSet::new();
        self.contains_struct_inner(id, struct_name, &mut seen)
    }

    fn contains_struct_inner(&self, id: TypeId, struct_name: &str, seen: &mut HashSet<TypeId>) -> bool {
        let id = self.resolve(id);
        if !seen.insert(id) {
            return false;
        }
        match self.kind(id) {
            TypeKind::Struct { name } => {
                name == struct_name
                    || self.struct_properties(name).is_some_and(|props| {
                        props.iter().any(|p| self.contains_struct_inner(p.ty, struct_name, seen))
                    })
            }
            TypeKind::Array { inner, .. } => self.contains_struct_inner(*inner, struct_name, seen),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArrayLength;

    #[test]
    fn primitives_are_interned_once() {
        let mut table = TypeTable::new();
        let before = table.len();
        let p = table.primitives();
        assert_eq!(table.intern(TypeKind::Numeric(NumericKind::Integer)), p.integer);
        assert_eq!(table.len(), before);
    }

    #[test]
    fn structural_identity_dedups() {
        let mut table = TypeTable::new();
        let int = table.primitives().integer;
        let a = table.intern(TypeKind::Array { inner: int, length: Some(ArrayLength::Literal(3)) });
        let b = table.intern(TypeKind::Array { inner: int, length: Some(ArrayLength::Literal(3)) });
        let c = table.intern(TypeKind::Array { inner: int, length: Some(ArrayLength::Literal(4)) });
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.identifier(a), "Array<Integer,3>");
    }

    #[test]
    fn aliases_are_transparent_inside_composites() {
        let mut table = TypeTable::new();
        let float = table.primitives().float;
        let alias = table.intern(TypeKind::Alias { name: "F".into() });
        table.define_alias("F", float);
        assert_ne!(alias, float);
        assert_eq!(table.vector(3, alias), table.vector(3, float));
        assert_eq!(table.resolve(alias), float);
    }

    #[test]
    fn resolve_strips_enums_and_build_ins() {
        let mut table = TypeTable::new();
        let uint = table.primitives().unsigned_integer;
        let e = table.intern(TypeKind::Enum { name: "Mode".into() });
        table.define_enum("Mode", uint);
        assert_eq!(table.resolve(e), uint);
        assert_eq!(table.resolve_alias(e), e);
    }

    #[test]
    fn separate_tables_do_not_share_identity() {
        let mut first = TypeTable::new();
        let second = TypeTable::new();
        let int = first.primitives().integer;
        let v = first.vector(2, int);
        assert!(second.lookup(first.identifier(v)).is_none());
    }

    #[test]
    fn struct_containment() {
        let mut table = TypeTable::new();
        let node = table.intern(TypeKind::Struct { name: "Node".into() });
        let list = table.intern(TypeKind::Array { inner: node, length: None });
        table.define_struct("Node", vec![StructProperty { name: "children".into(), ty: list }]);
        assert!(table.contains_struct(list, "Node"));
        assert!(!table.contains_struct(table.primitives().float, "Node"));
    }
}
