//! XSD element declarations

use std::sync::Arc;

use super::builtins::BuiltinType;
use super::complex_types::XsdComplexType;
use super::simple_types::XsdSimpleType;
use crate::namespaces::QName;

/// The type an element declaration points at
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// An XSD built-in (xs:anyType when no type is given)
    Builtin(BuiltinType),
    /// A named global type, resolved at validation time
    Named(QName),
    /// An anonymous simple type
    Simple(Arc<XsdSimpleType>),
    /// An anonymous complex type
    Complex(Arc<XsdComplexType>),
}

/// An element declaration
#[derive(Debug, Clone)]
pub struct XsdElement {
    /// Element name, qualified according to the schema's form rules
    pub name: QName,
    /// Element type
    pub type_ref: TypeRef,
    /// Fixed value for simple content
    pub fixed: Option<String>,
    /// Whether the declaration is abstract (cannot appear in instances)
    pub abstract_element: bool,
}

impl XsdElement {
    /// Create an element of type xs:anyType
    pub fn new(name: QName) -> Self {
        Self {
            name,
            type_ref: TypeRef::Builtin(BuiltinType::AnyType),
            fixed: None,
            abstract_element: false,
        }
    }

    /// Set the element type
    pub fn with_type(mut self, type_ref: TypeRef) -> Self {
        self.type_ref = type_ref;
        self
    }
}
