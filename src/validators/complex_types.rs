//! XSD complex types

use super::attributes::XsdAttribute;
use super::groups::XsdGroup;
use super::simple_types::SimpleTypeRef;
use crate::namespaces::QName;

/// Content type of a complex type
#[derive(Debug, Clone)]
pub enum ContentType {
    /// No children, no character data
    Empty,
    /// Character data of the given simple type (xs:simpleContent)
    Simple(SimpleTypeRef),
    /// Children only; whitespace between them is ignored
    ElementOnly(XsdGroup),
    /// Children interleaved with character data
    Mixed(XsdGroup),
}

impl ContentType {
    /// Label used in messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Simple(_) => "simple",
            Self::ElementOnly(_) => "element-only",
            Self::Mixed(_) => "mixed",
        }
    }
}

/// A complex type definition
#[derive(Debug, Clone)]
pub struct XsdComplexType {
    /// Type name (None for anonymous types)
    pub name: Option<QName>,
    /// Content type
    pub content: ContentType,
    /// Attribute declarations
    pub attributes: Vec<XsdAttribute>,
    /// Whether xs:anyAttribute admits undeclared attributes
    pub any_attribute: bool,
}

impl XsdComplexType {
    /// Create a complex type with empty content
    pub fn new(name: Option<QName>) -> Self {
        Self {
            name,
            content: ContentType::Empty,
            attributes: Vec::new(),
            any_attribute: false,
        }
    }

    /// Find an attribute declaration by name
    pub fn attribute(&self, name: &QName) -> Option<&XsdAttribute> {
        self.attributes.iter().find(|a| &a.name == name)
    }
}
