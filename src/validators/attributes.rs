//! XSD attribute declarations

use super::builtins::BuiltinType;
use super::simple_types::SimpleTypeRef;
use crate::namespaces::QName;

/// Attribute use mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUse {
    /// The attribute may be omitted
    #[default]
    Optional,
    /// The attribute must be present
    Required,
    /// The attribute must not be present
    Prohibited,
}

impl AttributeUse {
    /// Parse the `use` attribute value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "optional" => Some(Self::Optional),
            "required" => Some(Self::Required),
            "prohibited" => Some(Self::Prohibited),
            _ => None,
        }
    }
}

/// A local attribute declaration
#[derive(Debug, Clone)]
pub struct XsdAttribute {
    /// Attribute name
    pub name: QName,
    /// Value type
    pub simple_type: SimpleTypeRef,
    /// Use mode
    pub use_mode: AttributeUse,
    /// Default value
    pub default: Option<String>,
    /// Fixed value
    pub fixed: Option<String>,
}

impl XsdAttribute {
    /// Create an optional attribute of type xs:anySimpleType
    pub fn new(name: QName) -> Self {
        Self {
            name,
            simple_type: SimpleTypeRef::Builtin(BuiltinType::AnySimpleType),
            use_mode: AttributeUse::Optional,
            default: None,
            fixed: None,
        }
    }

    /// Check if the attribute is required
    pub fn is_required(&self) -> bool {
        self.use_mode == AttributeUse::Required
    }

    /// Check if the attribute is prohibited
    pub fn is_prohibited(&self) -> bool {
        self.use_mode == AttributeUse::Prohibited
    }
}
