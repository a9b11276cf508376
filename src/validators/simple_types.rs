//! XSD simple types
//!
//! User-defined simple types are restrictions of a base type (built-in or
//! another named simple type) with additional facets.

use std::sync::Arc;

use super::builtins::BuiltinType;
use super::facets::Facet;
use super::schemas::XsdSchema;
use crate::namespaces::QName;

/// Reference to a simple type
#[derive(Debug, Clone)]
pub enum SimpleTypeRef {
    /// An XSD built-in
    Builtin(BuiltinType),
    /// A named global simple type, resolved at validation time
    Named(QName),
    /// An anonymous type declared in place
    Inline(Arc<XsdSimpleType>),
}

/// A restriction-derived simple type
#[derive(Debug, Clone)]
pub struct XsdSimpleType {
    /// Type name (None for anonymous types)
    pub name: Option<QName>,
    /// Base type of the restriction
    pub base: SimpleTypeRef,
    /// Facets added by this restriction step
    pub facets: Vec<Facet>,
}

impl XsdSimpleType {
    /// Create a restriction of `base` with no facets
    pub fn restriction(name: Option<QName>, base: SimpleTypeRef) -> Self {
        Self {
            name,
            base,
            facets: Vec::new(),
        }
    }

    /// Add a facet
    pub fn with_facet(mut self, facet: Facet) -> Self {
        self.facets.push(facet);
        self
    }

    /// Validate a raw lexical value: the base chain first, then own facets
    pub fn validate_value(&self, schema: &XsdSchema, raw: &str) -> Result<(), String> {
        schema.validate_simple_value(&self.base, raw)?;

        let primitive = schema
            .primitive_of(&self.base)
            .unwrap_or(BuiltinType::AnySimpleType);
        let value = primitive.white_space().normalize(raw);
        for facet in &self.facets {
            facet.check(&value, primitive)?;
        }
        Ok(())
    }
}
