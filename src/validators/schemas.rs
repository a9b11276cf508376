//! XSD schema
//!
//! The global component maps of one loaded schema document plus the lookup
//! helpers the instance validator needs. A schema is immutable once built
//! and can be shared freely between validations.

use std::sync::Arc;

use indexmap::IndexMap;

use super::builtins::BuiltinType;
use super::complex_types::{ContentType, XsdComplexType};
use super::document_validation::validate_document;
use super::elements::{TypeRef, XsdElement};
use super::groups::{ElementRef, GroupParticle, XsdGroup};
use super::simple_types::{SimpleTypeRef, XsdSimpleType};
use super::validation::{SchemaViolation, ValidationContext};
use crate::documents::Document;
use crate::error::ParseError;
use crate::namespaces::QName;

/// Upper bound on simple type derivation chains and group reference nesting
const MAX_DERIVATION_DEPTH: usize = 64;

/// elementFormDefault / attributeFormDefault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormDefault {
    /// Local names are in the target namespace
    Qualified,
    /// Local names are in no namespace
    #[default]
    Unqualified,
}

impl FormDefault {
    /// Parse from attribute value
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "qualified" => Some(Self::Qualified),
            "unqualified" => Some(Self::Unqualified),
            _ => None,
        }
    }
}

impl std::fmt::Display for FormDefault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Qualified => write!(f, "qualified"),
            Self::Unqualified => write!(f, "unqualified"),
        }
    }
}

/// A global type definition
#[derive(Debug, Clone)]
pub enum GlobalType {
    /// Named simple type
    Simple(Arc<XsdSimpleType>),
    /// Named complex type
    Complex(Arc<XsdComplexType>),
}

/// A type reference after lookup
#[derive(Debug, Clone, Copy)]
pub enum ResolvedType<'a> {
    /// XSD built-in
    Builtin(BuiltinType),
    /// User simple type
    Simple(&'a XsdSimpleType),
    /// Complex type
    Complex(&'a XsdComplexType),
}

/// A loaded XSD schema
#[derive(Debug, Clone, Default)]
pub struct XsdSchema {
    /// Target namespace
    pub target_namespace: Option<String>,
    /// Form of local element names
    pub element_form_default: FormDefault,
    /// Form of local attribute names
    pub attribute_form_default: FormDefault,
    /// Where the schema was loaded from, for messages
    pub source: Option<String>,
    elements: IndexMap<QName, Arc<XsdElement>>,
    types: IndexMap<QName, GlobalType>,
    groups: IndexMap<QName, Arc<XsdGroup>>,
}

impl XsdSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty schema for a target namespace
    pub fn with_namespace(namespace: &str) -> Self {
        Self {
            target_namespace: Some(namespace.to_string()),
            ..Self::default()
        }
    }

    /// Register a global element declaration
    pub fn add_element(&mut self, element: XsdElement) -> Result<(), ParseError> {
        let name = element.name.clone();
        if self.elements.insert(name.clone(), Arc::new(element)).is_some() {
            return Err(ParseError::new(format!("Duplicate global element '{}'", name)));
        }
        Ok(())
    }

    /// Register a named type definition
    pub fn add_type(&mut self, name: QName, global_type: GlobalType) -> Result<(), ParseError> {
        if self.types.insert(name.clone(), global_type).is_some() {
            return Err(ParseError::new(format!("Duplicate global type '{}'", name)));
        }
        Ok(())
    }

    /// Register a named model group
    pub fn add_group(&mut self, name: QName, group: XsdGroup) -> Result<(), ParseError> {
        if self.groups.insert(name.clone(), Arc::new(group)).is_some() {
            return Err(ParseError::new(format!("Duplicate model group '{}'", name)));
        }
        Ok(())
    }

    /// Look up a global element declaration
    pub fn lookup_element(&self, qname: &QName) -> Option<&Arc<XsdElement>> {
        self.elements.get(qname)
    }

    /// Look up a named type
    pub fn lookup_type(&self, qname: &QName) -> Option<&GlobalType> {
        self.types.get(qname)
    }

    /// Look up a named model group
    pub fn lookup_group(&self, qname: &QName) -> Option<&Arc<XsdGroup>> {
        self.groups.get(qname)
    }

    /// Global elements in declaration order
    pub fn elements(&self) -> impl Iterator<Item = (&QName, &Arc<XsdElement>)> {
        self.elements.iter()
    }

    /// Named types in declaration order
    pub fn types(&self) -> impl Iterator<Item = (&QName, &GlobalType)> {
        self.types.iter()
    }

    /// Number of global elements
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of named types
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Resolve an element's type reference
    pub fn resolve_type<'a>(&'a self, type_ref: &'a TypeRef) -> Option<ResolvedType<'a>> {
        match type_ref {
            TypeRef::Builtin(builtin) => Some(ResolvedType::Builtin(*builtin)),
            TypeRef::Simple(simple) => Some(ResolvedType::Simple(simple)),
            TypeRef::Complex(complex) => Some(ResolvedType::Complex(complex)),
            TypeRef::Named(qname) => match self.lookup_type(qname)? {
                GlobalType::Simple(simple) => Some(ResolvedType::Simple(simple)),
                GlobalType::Complex(complex) => Some(ResolvedType::Complex(complex)),
            },
        }
    }

    /// Validate a raw value against a simple type reference
    pub fn validate_simple_value(&self, type_ref: &SimpleTypeRef, raw: &str) -> Result<(), String> {
        match type_ref {
            SimpleTypeRef::Builtin(builtin) => {
                builtin.validate(&builtin.white_space().normalize(raw))
            }
            SimpleTypeRef::Inline(simple) => simple.validate_value(self, raw),
            SimpleTypeRef::Named(qname) => match self.lookup_type(qname) {
                Some(GlobalType::Simple(simple)) => simple.validate_value(self, raw),
                _ => Err(format!("The simple type '{}' is not defined.", qname)),
            },
        }
    }

    /// The built-in at the bottom of a derivation chain
    pub fn primitive_of(&self, type_ref: &SimpleTypeRef) -> Option<BuiltinType> {
        let mut current = type_ref.clone();
        for _ in 0..MAX_DERIVATION_DEPTH {
            current = match current {
                SimpleTypeRef::Builtin(builtin) => return Some(builtin),
                SimpleTypeRef::Inline(simple) => simple.base.clone(),
                SimpleTypeRef::Named(qname) => match self.lookup_type(&qname)? {
                    GlobalType::Simple(simple) => simple.base.clone(),
                    GlobalType::Complex(_) => return None,
                },
            };
        }
        None
    }

    /// Validate a parsed document, collecting every complaint
    pub fn validate(&self, doc: &Document) -> Vec<SchemaViolation> {
        let mut context = ValidationContext::new();
        validate_document(self, doc, &mut context);
        context.errors
    }

    /// Check that every reference resolves and no derivation is circular.
    ///
    /// Called once after parsing; validation relies on it.
    pub fn build(&self) -> Result<(), ParseError> {
        if self.elements.is_empty() {
            return Err(ParseError::new("Schema declares no global elements"));
        }
        for element in self.elements.values() {
            self.check_element(element)?;
        }
        for (name, global_type) in &self.types {
            match global_type {
                GlobalType::Simple(simple) => self.check_simple_type(simple, 0).map_err(|e| {
                    ParseError::new(format!("In type '{}': {}", name, e.message))
                })?,
                GlobalType::Complex(complex) => self.check_complex_type(complex)?,
            }
        }
        for (name, group) in &self.groups {
            self.check_group(group, &mut vec![name.clone()])?;
        }
        Ok(())
    }

    fn check_element(&self, element: &XsdElement) -> Result<(), ParseError> {
        match &element.type_ref {
            TypeRef::Builtin(_) => Ok(()),
            TypeRef::Named(qname) => self.lookup_type(qname).map(|_| ()).ok_or_else(|| {
                ParseError::new(format!(
                    "Element '{}' refers to undefined type '{}'",
                    element.name, qname
                ))
            }),
            TypeRef::Simple(simple) => self.check_simple_type(simple, 0),
            TypeRef::Complex(complex) => self.check_complex_type(complex),
        }
    }

    fn check_simple_ref(&self, type_ref: &SimpleTypeRef, depth: usize) -> Result<(), ParseError> {
        if depth > MAX_DERIVATION_DEPTH {
            return Err(ParseError::new("Circular simple type derivation"));
        }
        match type_ref {
            SimpleTypeRef::Builtin(BuiltinType::AnyType) => Err(ParseError::new(
                "xs:anyType cannot be used as a simple type",
            )),
            SimpleTypeRef::Builtin(_) => Ok(()),
            SimpleTypeRef::Inline(simple) => self.check_simple_type(simple, depth + 1),
            SimpleTypeRef::Named(qname) => match self.lookup_type(qname) {
                Some(GlobalType::Simple(simple)) => self.check_simple_type(simple, depth + 1),
                Some(GlobalType::Complex(_)) => Err(ParseError::new(format!(
                    "'{}' is a complex type where a simple type is required",
                    qname
                ))),
                None => Err(ParseError::new(format!("Undefined simple type '{}'", qname))),
            },
        }
    }

    fn check_simple_type(&self, simple: &XsdSimpleType, depth: usize) -> Result<(), ParseError> {
        self.check_simple_ref(&simple.base, depth)
    }

    fn check_complex_type(&self, complex: &XsdComplexType) -> Result<(), ParseError> {
        for attribute in &complex.attributes {
            self.check_simple_ref(&attribute.simple_type, 0)?;
        }
        match &complex.content {
            ContentType::Empty => Ok(()),
            ContentType::Simple(simple) => self.check_simple_ref(simple, 0),
            ContentType::ElementOnly(group) | ContentType::Mixed(group) => {
                self.check_group(group, &mut Vec::new())
            }
        }
    }

    fn check_group(&self, group: &XsdGroup, named_path: &mut Vec<QName>) -> Result<(), ParseError> {
        if named_path.len() > MAX_DERIVATION_DEPTH {
            return Err(ParseError::new("Model groups nested too deeply"));
        }
        for particle in &group.particles {
            match particle {
                GroupParticle::Element(element) => match &element.element {
                    ElementRef::Local(decl) => self.check_element(decl)?,
                    ElementRef::Global(qname) => {
                        if self.lookup_element(qname).is_none() {
                            return Err(ParseError::new(format!(
                                "Reference to undefined element '{}'",
                                qname
                            )));
                        }
                    }
                },
                GroupParticle::Any(_) => {}
                GroupParticle::Group(nested) => self.check_group(nested, named_path)?,
                GroupParticle::GroupRef(qname, _) => {
                    if named_path.contains(qname) {
                        return Err(ParseError::new(format!(
                            "Circular reference to model group '{}'",
                            qname
                        )));
                    }
                    let target = self.lookup_group(qname).ok_or_else(|| {
                        ParseError::new(format!("Reference to undefined model group '{}'", qname))
                    })?;
                    named_path.push(qname.clone());
                    self.check_group(target, named_path)?;
                    named_path.pop();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::groups::{ElementParticle, ModelType};
    use crate::validators::particles::Occurs;

    #[test]
    fn test_empty_schema_does_not_build() {
        assert!(XsdSchema::new().build().is_err());
    }

    #[test]
    fn test_duplicate_element_is_rejected() {
        let mut schema = XsdSchema::new();
        schema.add_element(XsdElement::new(QName::local("a"))).unwrap();
        assert!(schema.add_element(XsdElement::new(QName::local("a"))).is_err());
    }

    #[test]
    fn test_undefined_type_reference_fails_build() {
        let mut schema = XsdSchema::new();
        schema
            .add_element(
                XsdElement::new(QName::local("a")).with_type(TypeRef::Named(QName::local("missing"))),
            )
            .unwrap();
        let err = schema.build().unwrap_err();
        assert!(err.message.contains("undefined type"));
    }

    #[test]
    fn test_undefined_element_reference_fails_build() {
        let mut group = XsdGroup::new(ModelType::Sequence);
        group.push(GroupParticle::Element(ElementParticle {
            element: ElementRef::Global(QName::local("ghost")),
            occurs: Occurs::once(),
        }));
        let mut complex = XsdComplexType::new(None);
        complex.content = ContentType::ElementOnly(group);

        let mut schema = XsdSchema::new();
        schema
            .add_element(
                XsdElement::new(QName::local("root")).with_type(TypeRef::Complex(Arc::new(complex))),
            )
            .unwrap();
        assert!(schema.build().is_err());
    }

    #[test]
    fn test_circular_simple_types_fail_build() {
        let mut schema = XsdSchema::new();
        let a = QName::local("a");
        let b = QName::local("b");
        schema
            .add_type(
                a.clone(),
                GlobalType::Simple(Arc::new(XsdSimpleType::restriction(
                    Some(a.clone()),
                    SimpleTypeRef::Named(b.clone()),
                ))),
            )
            .unwrap();
        schema
            .add_type(
                b.clone(),
                GlobalType::Simple(Arc::new(XsdSimpleType::restriction(
                    Some(b),
                    SimpleTypeRef::Named(a.clone()),
                ))),
            )
            .unwrap();
        schema
            .add_element(XsdElement::new(QName::local("root")).with_type(TypeRef::Named(a)))
            .unwrap();
        assert!(schema.build().is_err());
    }

    #[test]
    fn test_primitive_of_named_chain() {
        let mut schema = XsdSchema::new();
        let points = QName::local("points");
        schema
            .add_type(
                points.clone(),
                GlobalType::Simple(Arc::new(XsdSimpleType::restriction(
                    Some(points.clone()),
                    SimpleTypeRef::Builtin(BuiltinType::NonNegativeInteger),
                ))),
            )
            .unwrap();
        assert_eq!(
            schema.primitive_of(&SimpleTypeRef::Named(points.clone())),
            Some(BuiltinType::NonNegativeInteger)
        );
        assert!(schema.validate_simple_value(&SimpleTypeRef::Named(points), "-3").is_err());
    }
}
