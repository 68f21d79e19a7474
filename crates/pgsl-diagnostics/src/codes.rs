// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps error codes (E0001, E0300, ...) to titles and categories.

use std::collections::HashMap;

use pgsl_analysis::ValidationErrorKind;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: CodeCategory,
}

/// Error category for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCategory {
    Syntax,
    Resolution,
    Type,
    Fixedness,
    ControlFlow,
    Attribute,
}

impl std::fmt::Display for CodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodeCategory::Syntax => write!(f, "Syntax"),
            CodeCategory::Resolution => write!(f, "Resolution"),
            CodeCategory::Type => write!(f, "Type"),
            CodeCategory::Fixedness => write!(f, "Fixedness"),
            CodeCategory::ControlFlow => write!(f, "ControlFlow"),
            CodeCategory::Attribute => write!(f, "Attribute"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use CodeCategory::*;

        Self {
            codes: register_codes! {
                // Lexer (E00xx)
                "E0001" => ("invalid token", Syntax),

                // Parser (E01xx)
                "E0100" => ("syntax error", Syntax),
                "E0101" => ("unknown type", Syntax),
                "E0102" => ("wrong template arity", Syntax),
                "E0103" => ("invalid template argument", Syntax),

                // Name resolution (E02xx)
                "E0200" => ("duplicate declaration", Resolution),
                "E0201" => ("shadows a built-in type", Resolution),
                "E0202" => ("shadows a built-in function", Resolution),
                "E0203" => ("duplicate variable", Resolution),
                "E0204" => ("undefined variable", Resolution),
                "E0205" => ("undefined function", Resolution),
                "E0206" => ("unknown enum value", Resolution),
                "E0207" => ("duplicate struct property", Resolution),
                "E0208" => ("duplicate enum value", Resolution),
                "E0209" => ("unknown property", Resolution),

                // Types (E03xx)
                "E0300" => ("mismatched types", Type),
                "E0301" => ("invalid operands", Type),
                "E0302" => ("invalid operand", Type),
                "E0303" => ("type cannot be indexed", Type),
                "E0304" => ("invalid index type", Type),
                "E0305" => ("invalid swizzle", Type),
                "E0306" => ("expression is not addressable", Type),
                "E0307" => ("not a pointer", Type),
                "E0308" => ("wrong argument count", Type),
                "E0309" => ("wrong argument type", Type),
                "E0310" => ("no matching overload", Type),
                "E0311" => ("type cannot be constructed", Type),
                "E0312" => ("invalid constructor arguments", Type),
                "E0313" => ("condition is not boolean", Type),
                "E0314" => ("invalid switch selector", Type),
                "E0315" => ("invalid case value", Type),
                "E0316" => ("invalid variable type", Type),
                "E0317" => ("invalid enum value type", Type),
                "E0318" => ("array element size is not fixed", Type),
                "E0319" => ("invalid array length", Type),
                "E0320" => ("runtime-sized property is not last", Type),
                "E0321" => ("recursive struct", Type),
                "E0322" => ("index out of range", Type),
                "E0323" => ("literal out of range", Type),

                // Fixedness (E04xx)
                "E0400" => ("expression is not fixed enough", Fixedness),
                "E0401" => ("assignment to a constant", Fixedness),
                "E0402" => ("expression is not assignable", Fixedness),
                "E0403" => ("missing initializer", Fixedness),
                "E0404" => ("unexpected initializer", Fixedness),

                // Control flow (E05xx)
                "E0500" => ("break outside of loop or switch", ControlFlow),
                "E0501" => ("continue outside of loop", ControlFlow),
                "E0502" => ("missing return", ControlFlow),
                "E0503" => ("unexpected return value", ControlFlow),
                "E0504" => ("missing return value", ControlFlow),
                "E0505" => ("for-loop initializer is not `let`", ControlFlow),

                // Attributes (E06xx)
                "E0600" => ("unknown attribute", Attribute),
                "E0601" => ("attribute not allowed here", Attribute),
                "E0602" => ("wrong attribute argument count", Attribute),
                "E0603" => ("invalid attribute argument", Attribute),
                "E0604" => ("duplicate attribute", Attribute),
                "E0605" => ("missing group binding", Attribute),
                "E0606" => ("conflicting entry points", Attribute),
                "E0607" => ("build-in type outside an entry point", Attribute),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        self.codes.values()
    }
}

/// The registered code for a semantic error.
pub fn validation_code(kind: &ValidationErrorKind) -> &'static str {
    use ValidationErrorKind::*;
    match kind {
        DuplicateDeclaration { .. } => "E0200",
        ShadowsBuiltinType { .. } => "E0201",
        ShadowsBuiltinFunction { .. } => "E0202",
        DuplicateVariable { .. } => "E0203",
        UndefinedVariable { .. } => "E0204",
        UndefinedFunction { .. } => "E0205",
        UnknownEnumValue { .. } => "E0206",
        DuplicateProperty { .. } => "E0207",
        DuplicateEnumValue { .. } => "E0208",
        UnknownProperty { .. } => "E0209",

        TypeMismatch { .. } => "E0300",
        InvalidOperands { .. } => "E0301",
        InvalidOperand { .. } => "E0302",
        NotIndexable { .. } => "E0303",
        InvalidIndex { .. } => "E0304",
        InvalidSwizzle { .. } => "E0305",
        NotAddressable => "E0306",
        NotAPointer { .. } => "E0307",
        ArgumentCount { .. } => "E0308",
        ArgumentType { .. } => "E0309",
        NoMatchingOverload { .. } => "E0310",
        NotConstructable { .. } => "E0311",
        InvalidConstructor { .. } => "E0312",
        ConditionNotBoolean { .. } => "E0313",
        SwitchSelector { .. } => "E0314",
        CaseValue { .. } => "E0315",
        InvalidVariableType { .. } => "E0316",
        EnumValueType { .. } => "E0317",
        ArrayElementNotFixed { .. } => "E0318",
        ArrayLengthType { .. } => "E0319",
        RuntimeSizedNotLast { .. } => "E0320",
        RecursiveStruct { .. } => "E0321",
        IndexOutOfRange { .. } => "E0322",
        LiteralOutOfRange { .. } => "E0323",

        NotFixed { .. } => "E0400",
        AssignToConstant => "E0401",
        NotAssignable => "E0402",
        MissingInitializer { .. } => "E0403",
        UnexpectedInitializer { .. } => "E0404",

        InvalidBreak => "E0500",
        InvalidContinue => "E0501",
        MissingReturn { .. } => "E0502",
        UnexpectedReturnValue => "E0503",
        MissingReturnValue { .. } => "E0504",
        ForInitNotLet => "E0505",

        UnknownAttribute { .. } => "E0600",
        AttributeNotAllowed { .. } => "E0601",
        AttributeArity { .. } => "E0602",
        AttributeArgument { .. } => "E0603",
        DuplicateAttribute { .. } => "E0604",
        MissingGroupBinding { .. } => "E0605",
        ConflictingEntry { .. } => "E0606",
        BuildInOutsideEntry { .. } => "E0607",
    }
}
