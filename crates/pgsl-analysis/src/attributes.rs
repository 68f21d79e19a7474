// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rules for the `[Name(args)]` attributes on declarations.

use std::collections::HashSet;

use pgsl_ast::decl::{Attribute, DeclarationType};
use pgsl_ast::expr::ExprKind;
use pgsl_ast::{NodeId, Span};
use pgsl_types::TypeKind;

use crate::error::ValidationErrorKind;
use crate::model::Fixedness;
use crate::validate::Validator;

/// What an attribute list is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttributeTarget {
    Variable(DeclarationType),
    Function,
    Property,
    /// Parameter of an entry point.
    EntryParameter,
    /// Parameter of any other function.
    Parameter,
    /// Alias, enum or struct declarations.
    Type,
}

impl AttributeTarget {
    fn describe(self) -> &'static str {
        match self {
            AttributeTarget::Variable(dt) => dt.keyword(),
            AttributeTarget::Function => "functions",
            AttributeTarget::Property => "struct properties",
            AttributeTarget::EntryParameter => "parameters",
            AttributeTarget::Parameter => "parameters of functions that are not entry points",
            AttributeTarget::Type => "type declarations",
        }
    }

    fn is_buffer(self) -> bool {
        matches!(
            self,
            AttributeTarget::Variable(DeclarationType::Storage | DeclarationType::Uniform)
        )
    }

    fn is_io(self) -> bool {
        matches!(self, AttributeTarget::Property | AttributeTarget::EntryParameter)
    }
}

#[derive(Debug, Clone, Copy)]
enum Argument {
    String,
    Unsigned,
    Enum(&'static str),
}

impl Argument {
    fn describe(self) -> &'static str {
        match self {
            Argument::String => "a string literal",
            Argument::Unsigned => "an unsigned integer",
            Argument::Enum("AccessMode") => "an AccessMode value",
            Argument::Enum("InterpolationType") => "an InterpolationType value",
            Argument::Enum(_) => "an InterpolationSampling value",
        }
    }
}

struct AttributeRule {
    name: &'static str,
    /// Leading arguments that must be present.
    required: usize,
    args: &'static [Argument],
    arity: &'static str,
    allowed: fn(AttributeTarget) -> bool,
}

static RULES: &[AttributeRule] = &[
    AttributeRule {
        name: "GroupBinding",
        required: 2,
        args: &[Argument::String, Argument::String],
        arity: "2",
        allowed: AttributeTarget::is_buffer,
    },
    AttributeRule {
        name: "AccessMode",
        required: 1,
        args: &[Argument::Enum("AccessMode")],
        arity: "1",
        allowed: |target| target == AttributeTarget::Variable(DeclarationType::Storage),
    },
    AttributeRule {
        name: "VertexEntry",
        required: 0,
        args: &[],
        arity: "0",
        allowed: |target| target == AttributeTarget::Function,
    },
    AttributeRule {
        name: "FragmentEntry",
        required: 0,
        args: &[],
        arity: "0",
        allowed: |target| target == AttributeTarget::Function,
    },
    AttributeRule {
        name: "ComputeEntry",
        required: 1,
        args: &[Argument::Unsigned, Argument::Unsigned, Argument::Unsigned],
        arity: "1 to 3",
        allowed: |target| target == AttributeTarget::Function,
    },
    AttributeRule {
        name: "Location",
        required: 1,
        args: &[Argument::String],
        arity: "1",
        allowed: AttributeTarget::is_io,
    },
    AttributeRule {
        name: "Interpolate",
        required: 1,
        args: &[Argument::Enum("InterpolationType"), Argument::Enum("InterpolationSampling")],
        arity: "1 or 2",
        allowed: AttributeTarget::is_io,
    },
];

const ENTRY_ATTRIBUTES: [&str; 3] = ["VertexEntry", "FragmentEntry", "ComputeEntry"];

/// Whether `name` marks a function as a shader entry point.
pub fn is_entry_attribute(name: &str) -> bool {
    ENTRY_ATTRIBUTES.contains(&name)
}

impl Validator<'_> {
    pub(crate) fn check_attributes(
        &mut self,
        attributes: &[Attribute],
        target: AttributeTarget,
        owner: &str,
        span: Span,
        node: NodeId,
    ) {
        let mut seen = HashSet::new();
        for attribute in attributes {
            if !seen.insert(attribute.name.as_str()) {
                let kind = ValidationErrorKind::DuplicateAttribute { name: attribute.name.clone() };
                self.error(kind, attribute.span, attribute.id);
                continue;
            }
            self.check_attribute(attribute, target);
        }

        if target.is_buffer() && !seen.contains("GroupBinding") {
            let kind = ValidationErrorKind::MissingGroupBinding { name: owner.to_string() };
            self.error(kind, span, node);
        }
        if target == AttributeTarget::Function {
            let mut entries = attributes.iter().filter(|a| is_entry_attribute(&a.name));
            if let (Some(_), Some(second)) = (entries.next(), entries.next()) {
                let kind = ValidationErrorKind::ConflictingEntry { name: owner.to_string() };
                self.error(kind, second.span, node);
            }
        }
    }

    fn check_attribute(&mut self, attribute: &Attribute, target: AttributeTarget) {
        let name = attribute.name.as_str();
        let Some(rule) = RULES.iter().find(|rule| rule.name == name) else {
            let kind = ValidationErrorKind::UnknownAttribute { name: name.to_string() };
            self.error(kind, attribute.span, attribute.id);
            return;
        };
        if !(rule.allowed)(target) {
            let kind = ValidationErrorKind::AttributeNotAllowed { name: name.to_string(), target: target.describe() };
            self.error(kind, attribute.span, attribute.id);
            return;
        }
        let count = attribute.args.len();
        if count < rule.required || count > rule.args.len() {
            let kind = ValidationErrorKind::AttributeArity { name: name.to_string(), expected: rule.arity, found: count };
            self.error(kind, attribute.span, attribute.id);
            return;
        }

        for (position, (arg, &expected)) in attribute.args.iter().zip(rule.args).enumerate() {
            let matches = match expected {
                Argument::String => matches!(arg.kind, ExprKind::String(_)),
                Argument::Unsigned => self.record(arg).is_some_and(|r| self.is_unsigned_compatible(r.ty)),
                Argument::Enum(enum_name) => self.record(arg).is_some_and(
                    |r| matches!(self.types.kind(r.ty), TypeKind::Enum { name } if name == enum_name),
                ),
            };
            if !matches {
                let kind = ValidationErrorKind::AttributeArgument {
                    name: name.to_string(),
                    position: position + 1,
                    expected: expected.describe(),
                };
                self.error(kind, arg.span, arg.id);
                continue;
            }
            self.require_fixed(arg, Fixedness::ShaderCreationFixed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_attributes() {
        assert!(is_entry_attribute("ComputeEntry"));
        assert!(!is_entry_attribute("Location"));
    }

    #[test]
    fn targets() {
        assert!(AttributeTarget::Variable(DeclarationType::Uniform).is_buffer());
        assert!(!AttributeTarget::Variable(DeclarationType::Private).is_buffer());
        assert!(AttributeTarget::EntryParameter.is_io());
        assert!(!AttributeTarget::Parameter.is_io());
        assert_eq!(AttributeTarget::Variable(DeclarationType::Storage).describe(), "storage");
    }
}
