// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Memoized structural attributes.

use pgsl_ast::TypeId;

use crate::table::TypeTable;
use crate::types::{TypeAttributes, TypeKind};

const LEAF_VALUE: TypeAttributes = TypeAttributes {
    composite: false,
    constructable: true,
    fixed: true,
    indexable: false,
    plain: true,
    host_shareable: true,
    storable: true,
};

/// Samplers, textures, pointers: fixed-size handles nothing else applies to.
const OPAQUE: TypeAttributes = TypeAttributes {
    composite: false,
    constructable: false,
    fixed: true,
    indexable: false,
    plain: false,
    host_shareable: false,
    storable: false,
};

impl TypeTable {
    /// Attributes of a type, computed once and cached.
    ///
    /// Recursive structs see themselves as having no attributes while
    /// their own attributes are computed.
    pub fn attributes(&self, id: TypeId) -> TypeAttributes {
        if let Some(attributes) = self.attribute_memo.borrow().get(&id) {
            return *attributes;
        }
        if !self.visiting.borrow_mut().insert(id) {
            return TypeAttributes::default();
        }
        let attributes = self.compute_attributes(id);
        self.visiting.borrow_mut().remove(&id);
        self.attribute_memo.borrow_mut().insert(id, attributes);
        attributes
    }

    fn compute_attributes(&self, id: TypeId) -> TypeAttributes {
        match self.kind(id) {
            TypeKind::Void => TypeAttributes::default(),
            TypeKind::Boolean => TypeAttributes { host_shareable: false, ..LEAF_VALUE },
            TypeKind::Numeric(kind) if kind.is_abstract() => TypeAttributes {
                constructable: false,
                host_shareable: false,
                storable: false,
                ..LEAF_VALUE
            },
            TypeKind::Numeric(_) => LEAF_VALUE,
            TypeKind::String => TypeAttributes { fixed: true, ..TypeAttributes::default() },
            TypeKind::Vector { inner, .. } | TypeKind::Matrix { inner, .. } => {
                let inner = self.attributes(*inner);
                TypeAttributes { composite: true, indexable: true, ..inner }
            }
            TypeKind::Array { inner, length } => {
                let inner = self.attributes(*inner);
                TypeAttributes {
                    composite: true,
                    indexable: true,
                    constructable: inner.constructable && length.is_some(),
                    fixed: inner.fixed && length.is_some(),
                    ..inner
                }
            }
            TypeKind::Struct { name } => {
                let properties = self.struct_properties(name).unwrap_or(&[]);
                let mut attributes = TypeAttributes {
                    composite: true,
                    constructable: true,
                    fixed: true,
                    indexable: false,
                    plain: true,
                    host_shareable: true,
                    storable: true,
                };
                // Every attribute needs all properties. A struct ending in a
                // runtime-sized array is not fixed, so it can only be the last
                // property of another struct or a buffer's whole type.
                for property in properties {
                    let p = self.attributes(property.ty);
                    attributes.constructable &= p.constructable;
                    attributes.fixed &= p.fixed;
                    attributes.plain &= p.plain;
                    attributes.host_shareable &= p.host_shareable;
                    attributes.storable &= p.storable;
                }
                attributes
            }
            TypeKind::Pointer { .. } | TypeKind::Sampler { .. } | TypeKind::Texture { .. } => OPAQUE,
            TypeKind::Alias { .. } | TypeKind::Enum { .. } | TypeKind::BuildIn { .. } => {
                let resolved = self.resolve(id);
                if resolved == id {
                    // Body never defined.
                    TypeAttributes::default()
                } else {
                    self.attributes(resolved)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::table::{StructProperty, TypeTable};
    use crate::types::{ArrayLength, TypeKind};

    #[test]
    fn runtime_array_is_not_fixed() {
        let mut table = TypeTable::new();
        let int = table.primitives().integer;
        let runtime = table.intern(TypeKind::Array { inner: int, length: None });
        let sized = table.intern(TypeKind::Array { inner: int, length: Some(ArrayLength::Literal(3)) });
        assert!(!table.attributes(runtime).fixed);
        assert!(!table.attributes(runtime).constructable);
        assert!(table.attributes(sized).fixed);
        assert!(table.attributes(sized).composite);
        assert!(table.attributes(sized).indexable);
    }

    #[test]
    fn boolean_is_not_host_shareable() {
        let mut table = TypeTable::new();
        let boolean = table.primitives().boolean;
        let v = table.vector(2, boolean);
        assert!(!table.attributes(v).host_shareable);
        assert!(table.attributes(v).storable);
    }

    #[test]
    fn struct_requires_every_property() {
        let mut table = TypeTable::new();
        let float = table.primitives().float;
        let runtime = table.intern(TypeKind::Array { inner: float, length: None });
        let s = table.intern(TypeKind::Struct { name: "Particles".into() });
        table.define_struct(
            "Particles",
            vec![
                StructProperty { name: "count".into(), ty: float },
                StructProperty { name: "data".into(), ty: runtime },
            ],
        );
        let attributes = table.attributes(s);
        assert!(attributes.composite);
        assert!(attributes.host_shareable);
        assert!(!attributes.fixed);
        assert!(!attributes.constructable);
    }

    #[test]
    fn recursive_struct_terminates() {
        let mut table = TypeTable::new();
        let s = table.intern(TypeKind::Struct { name: "Loop".into() });
        table.define_struct("Loop", vec![StructProperty { name: "next".into(), ty: s }]);
        assert!(!table.attributes(s).storable);
    }

    #[test]
    fn aliases_delegate() {
        let mut table = TypeTable::new();
        let sampler = table.intern(TypeKind::Sampler { comparison: false });
        let alias = table.intern(TypeKind::Alias { name: "S".into() });
        table.define_alias("S", sampler);
        assert_eq!(table.attributes(alias), table.attributes(sampler));
        assert!(!table.attributes(alias).storable);
    }

    #[test]
    fn abstract_literals_are_not_storable() {
        let table = TypeTable::new();
        let p = table.primitives();
        assert!(!table.attributes(p.abstract_integer).storable);
        assert!(table.attributes(p.integer).storable);
    }
}
