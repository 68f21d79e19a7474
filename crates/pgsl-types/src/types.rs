// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type definition kinds.

use std::fmt;

use pgsl_ast::TypeId;

/// One entry of the type table.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub id: TypeId,
    /// Structural identifier. Equal identifiers mean the same type.
    pub identifier: String,
    pub kind: TypeKind,
}

/// The kind of a type definition.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Void,
    Boolean,
    String,
    Numeric(NumericKind),
    Vector { dimension: u8, inner: TypeId },
    /// `MatrixCR`: `columns` column vectors with `rows` components each.
    Matrix { columns: u8, rows: u8, inner: TypeId },
    /// `length` is `None` for runtime-sized arrays.
    Array { inner: TypeId, length: Option<ArrayLength> },
    Struct { name: String },
    Enum { name: String },
    Alias { name: String },
    Pointer { inner: TypeId },
    Sampler { comparison: bool },
    Texture {
        kind: TextureKind,
        sampled: Option<TypeId>,
        format: Option<String>,
        access: Option<String>,
    },
    BuildIn { kind: BuildInKind, underlying: TypeId },
}

/// Scalar numeric kinds. Abstract kinds are the types of unsuffixed literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Integer,
    UnsignedInteger,
    Float,
    Float16,
    AbstractInteger,
    AbstractFloat,
}

impl NumericKind {
    pub const CONCRETE: [NumericKind; 4] = [
        NumericKind::Integer,
        NumericKind::UnsignedInteger,
        NumericKind::Float,
        NumericKind::Float16,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericKind::Integer => "Integer",
            NumericKind::UnsignedInteger => "UnsignedInteger",
            NumericKind::Float => "Float",
            NumericKind::Float16 => "Float16",
            NumericKind::AbstractInteger => "AbstractInteger",
            NumericKind::AbstractFloat => "AbstractFloat",
        }
    }

    /// Only concrete kinds can be written in source.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::CONCRETE.into_iter().find(|k| k.name() == name)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            NumericKind::Integer | NumericKind::UnsignedInteger | NumericKind::AbstractInteger
        )
    }

    pub fn is_float(self) -> bool {
        !self.is_integer()
    }

    pub fn is_signed(self) -> bool {
        self != NumericKind::UnsignedInteger
    }

    pub fn is_abstract(self) -> bool {
        matches!(self, NumericKind::AbstractInteger | NumericKind::AbstractFloat)
    }
}

/// Array length template argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayLength {
    Literal(u64),
    /// A named constant or constant expression, kept as source text.
    Expression(String),
}

impl fmt::Display for ArrayLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayLength::Literal(n) => write!(f, "{}", n),
            ArrayLength::Expression(text) => write!(f, "{}", text),
        }
    }
}

/// Template shape of a texture name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureTemplate {
    None,
    /// One numeric sampled type.
    SampledType,
    /// Texel format and access mode as string literals.
    FormatAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Texture1d,
    Texture2d,
    Texture2dArray,
    Texture3d,
    TextureCube,
    TextureCubeArray,
    TextureMultisampled2d,
    TextureExternal,
    TextureDepth2d,
    TextureDepth2dArray,
    TextureDepthCube,
    TextureDepthCubeArray,
    TextureDepthMultisampled2d,
    TextureStorage1d,
    TextureStorage2d,
    TextureStorage2dArray,
    TextureStorage3d,
}

impl TextureKind {
    const ALL: [TextureKind; 17] = [
        TextureKind::Texture1d,
        TextureKind::Texture2d,
        TextureKind::Texture2dArray,
        TextureKind::Texture3d,
        TextureKind::TextureCube,
        TextureKind::TextureCubeArray,
        TextureKind::TextureMultisampled2d,
        TextureKind::TextureExternal,
        TextureKind::TextureDepth2d,
        TextureKind::TextureDepth2dArray,
        TextureKind::TextureDepthCube,
        TextureKind::TextureDepthCubeArray,
        TextureKind::TextureDepthMultisampled2d,
        TextureKind::TextureStorage1d,
        TextureKind::TextureStorage2d,
        TextureKind::TextureStorage2dArray,
        TextureKind::TextureStorage3d,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            TextureKind::Texture1d => "Texture1d",
            TextureKind::Texture2d => "Texture2d",
            TextureKind::Texture2dArray => "Texture2dArray",
            TextureKind::Texture3d => "Texture3d",
            TextureKind::TextureCube => "TextureCube",
            TextureKind::TextureCubeArray => "TextureCubeArray",
            TextureKind::TextureMultisampled2d => "TextureMultisampled2d",
            TextureKind::TextureExternal => "TextureExternal",
            TextureKind::TextureDepth2d => "TextureDepth2d",
            TextureKind::TextureDepth2dArray => "TextureDepth2dArray",
            TextureKind::TextureDepthCube => "TextureDepthCube",
            TextureKind::TextureDepthCubeArray => "TextureDepthCubeArray",
            TextureKind::TextureDepthMultisampled2d => "TextureDepthMultisampled2d",
            TextureKind::TextureStorage1d => "TextureStorage1d",
            TextureKind::TextureStorage2d => "TextureStorage2d",
            TextureKind::TextureStorage2dArray => "TextureStorage2dArray",
            TextureKind::TextureStorage3d => "TextureStorage3d",
        }
    }

    pub fn wgsl_name(self) -> &'static str {
        match self {
            TextureKind::Texture1d => "texture_1d",
            TextureKind::Texture2d => "texture_2d",
            TextureKind::Texture2dArray => "texture_2d_array",
            TextureKind::Texture3d => "texture_3d",
            TextureKind::TextureCube => "texture_cube",
            TextureKind::TextureCubeArray => "texture_cube_array",
            TextureKind::TextureMultisampled2d => "texture_multisampled_2d",
            TextureKind::TextureExternal => "texture_external",
            TextureKind::TextureDepth2d => "texture_depth_2d",
            TextureKind::TextureDepth2dArray => "texture_depth_2d_array",
            TextureKind::TextureDepthCube => "texture_depth_cube",
            TextureKind::TextureDepthCubeArray => "texture_depth_cube_array",
            TextureKind::TextureDepthMultisampled2d => "texture_depth_multisampled_2d",
            TextureKind::TextureStorage1d => "texture_storage_1d",
            TextureKind::TextureStorage2d => "texture_storage_2d",
            TextureKind::TextureStorage2dArray => "texture_storage_2d_array",
            TextureKind::TextureStorage3d => "texture_storage_3d",
        }
    }

    pub fn template(self) -> TextureTemplate {
        match self {
            TextureKind::Texture1d
            | TextureKind::Texture2d
            | TextureKind::Texture2dArray
            | TextureKind::Texture3d
            | TextureKind::TextureCube
            | TextureKind::TextureCubeArray
            | TextureKind::TextureMultisampled2d => TextureTemplate::SampledType,
            TextureKind::TextureStorage1d
            | TextureKind::TextureStorage2d
            | TextureKind::TextureStorage2dArray
            | TextureKind::TextureStorage3d => TextureTemplate::FormatAccess,
            _ => TextureTemplate::None,
        }
    }
}

/// Texel formats accepted by storage textures.
pub const TEXEL_FORMATS: &[&str] = &[
    "rgba8unorm",
    "rgba8snorm",
    "rgba8uint",
    "rgba8sint",
    "rgba16uint",
    "rgba16sint",
    "rgba16float",
    "r32uint",
    "r32sint",
    "r32float",
    "rg32uint",
    "rg32sint",
    "rg32float",
    "rgba32uint",
    "rgba32sint",
    "rgba32float",
    "bgra8unorm",
];

/// Access modes accepted by storage textures.
pub const ACCESS_MODES: &[&str] = &["read", "write", "read_write"];

/// Pipeline-provided values with a fixed underlying type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildInKind {
    Position,
    VertexIndex,
    InstanceIndex,
    FrontFacing,
    FragDepth,
    SampleIndex,
    SampleMask,
    LocalInvocationId,
    LocalInvocationIndex,
    GlobalInvocationId,
    WorkgroupId,
    NumWorkgroups,
    /// Takes the array length as its only template argument.
    ClipDistances,
}

impl BuildInKind {
    const ALL: [BuildInKind; 13] = [
        BuildInKind::Position,
        BuildInKind::VertexIndex,
        BuildInKind::InstanceIndex,
        BuildInKind::FrontFacing,
        BuildInKind::FragDepth,
        BuildInKind::SampleIndex,
        BuildInKind::SampleMask,
        BuildInKind::LocalInvocationId,
        BuildInKind::LocalInvocationIndex,
        BuildInKind::GlobalInvocationId,
        BuildInKind::WorkgroupId,
        BuildInKind::NumWorkgroups,
        BuildInKind::ClipDistances,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            BuildInKind::Position => "Position",
            BuildInKind::VertexIndex => "VertexIndex",
            BuildInKind::InstanceIndex => "InstanceIndex",
            BuildInKind::FrontFacing => "FrontFacing",
            BuildInKind::FragDepth => "FragDepth",
            BuildInKind::SampleIndex => "SampleIndex",
            BuildInKind::SampleMask => "SampleMask",
            BuildInKind::LocalInvocationId => "LocalInvocationId",
            BuildInKind::LocalInvocationIndex => "LocalInvocationIndex",
            BuildInKind::GlobalInvocationId => "GlobalInvocationId",
            BuildInKind::WorkgroupId => "WorkgroupId",
            BuildInKind::NumWorkgroups => "NumWorkgroups",
            BuildInKind::ClipDistances => "ClipDistances",
        }
    }

    /// Name inside `@builtin(...)`.
    pub fn wgsl_name(self) -> &'static str {
        match self {
            BuildInKind::Position => "position",
            BuildInKind::VertexIndex => "vertex_index",
            BuildInKind::InstanceIndex => "instance_index",
            BuildInKind::FrontFacing => "front_facing",
            BuildInKind::FragDepth => "frag_depth",
            BuildInKind::SampleIndex => "sample_index",
            BuildInKind::SampleMask => "sample_mask",
            BuildInKind::LocalInvocationId => "local_invocation_id",
            BuildInKind::LocalInvocationIndex => "local_invocation_index",
            BuildInKind::GlobalInvocationId => "global_invocation_id",
            BuildInKind::WorkgroupId => "workgroup_id",
            BuildInKind::NumWorkgroups => "num_workgroups",
            BuildInKind::ClipDistances => "clip_distances",
        }
    }
}

/// Structural attributes derived once per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeAttributes {
    pub composite: bool,
    pub constructable: bool,
    /// Size known at shader creation.
    pub fixed: bool,
    pub indexable: bool,
    pub plain: bool,
    pub host_shareable: bool,
    pub storable: bool,
}
