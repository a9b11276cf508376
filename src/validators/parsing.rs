//! XSD Document Parsing
//!
//! This module parses XSD schema documents into [`XsdSchema`] structures.
//! Schemas are read with `roxmltree`, which keeps namespace scopes and
//! source positions for every node. Only single-document schemas are
//! supported: xs:include, xs:import and xs:redefine are rejected.

use std::path::Path;
use std::sync::Arc;

use roxmltree::Node;
use rust_decimal::Decimal;

use super::attributes::{AttributeUse, XsdAttribute};
use super::builtins::{BuiltinType, XSD_NAMESPACE};
use super::complex_types::{ContentType, XsdComplexType};
use super::elements::{TypeRef, XsdElement};
use super::facets::Facet;
use super::groups::{
    AnyParticle, ElementParticle, ElementRef, GroupParticle, ModelType, NamespaceConstraint,
    ProcessContents, XsdGroup,
};
use super::particles::Occurs;
use super::schemas::{FormDefault, GlobalType, XsdSchema};
use super::simple_types::{SimpleTypeRef, XsdSimpleType};
use crate::error::{ParseError, Result};
use crate::namespaces::QName;

type ParseResult<T> = std::result::Result<T, ParseError>;

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const GROUP: &str = "group";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const ANNOTATION: &str = "annotation";
    pub const RESTRICTION: &str = "restriction";
    pub const EXTENSION: &str = "extension";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
    pub const ANY: &str = "any";
    pub const ANY_ATTRIBUTE: &str = "anyAttribute";
}

use xsd_elements::*;

impl XsdSchema {
    /// Parse a schema from XSD text
    pub fn from_string(xsd: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(xsd)
            .map_err(|e| ParseError::new(format!("Schema is not well-formed XML: {}", e)))?;
        let schema = SchemaParser::new(&doc).parse()?;
        schema.build()?;
        tracing::debug!(
            elements = schema.element_count(),
            types = schema.type_count(),
            "schema loaded"
        );
        Ok(schema)
    }

    /// Parse a schema from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let text = std::fs::read_to_string(path)?;
        let mut schema = Self::from_string(&text).map_err(|e| match e {
            crate::error::Error::Parse(err) => err.with_source(source.clone()).into(),
            other => other,
        })?;
        schema.source = Some(source);
        Ok(schema)
    }
}

struct SchemaParser<'a, 'input> {
    doc: &'a roxmltree::Document<'input>,
    target_namespace: Option<String>,
    element_form: FormDefault,
    attribute_form: FormDefault,
}

fn is_xsd(node: &Node, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XSD_NAMESPACE)
        && node.tag_name().name() == local_name
}

/// Element children other than xs:annotation
fn components<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|c| c.is_element() && !is_xsd(c, ANNOTATION))
}

impl<'a, 'input> SchemaParser<'a, 'input> {
    fn new(doc: &'a roxmltree::Document<'input>) -> Self {
        Self {
            doc,
            target_namespace: None,
            element_form: FormDefault::Unqualified,
            attribute_form: FormDefault::Unqualified,
        }
    }

    fn error(&self, node: Node, message: impl Into<String>) -> ParseError {
        let pos = self.doc.text_pos_at(node.range().start);
        ParseError::new(message).with_location(format!("line {}, column {}", pos.row, pos.col))
    }

    fn parse(mut self) -> ParseResult<XsdSchema> {
        let root = self.doc.root_element();
        if !is_xsd(&root, SCHEMA) {
            return Err(self.error(root, "Root element is not xs:schema"));
        }

        self.target_namespace = root
            .attribute("targetNamespace")
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);
        self.element_form = self.form_default(root, "elementFormDefault")?;
        self.attribute_form = self.form_default(root, "attributeFormDefault")?;

        let mut schema = XsdSchema::new();
        schema.target_namespace = self.target_namespace.clone();
        schema.element_form_default = self.element_form;
        schema.attribute_form_default = self.attribute_form;

        for child in components(root) {
            if child.tag_name().namespace() != Some(XSD_NAMESPACE) {
                return Err(self.error(child, "Unexpected non-XSD element at schema level"));
            }
            let located = |e: ParseError| {
                if e.location.is_some() {
                    e
                } else {
                    let pos = self.doc.text_pos_at(child.range().start);
                    e.with_location(format!("line {}, column {}", pos.row, pos.col))
                }
            };
            match child.tag_name().name() {
                ELEMENT => {
                    let element = self.parse_element(child, true)?;
                    schema.add_element(element).map_err(located)?;
                }
                COMPLEX_TYPE => {
                    let name = self.global_name(child)?;
                    let complex = self.parse_complex_type(child, Some(name.clone()))?;
                    schema
                        .add_type(name, GlobalType::Complex(Arc::new(complex)))
                        .map_err(located)?;
                }
                SIMPLE_TYPE => {
                    let name = self.global_name(child)?;
                    let simple = self.parse_simple_type(child, Some(name.clone()))?;
                    schema
                        .add_type(name, GlobalType::Simple(Arc::new(simple)))
                        .map_err(located)?;
                }
                GROUP => {
                    let name = self.global_name(child)?;
                    let model = components(child)
                        .find(|c| ModelType::from_tag(c.tag_name().name()).is_some())
                        .ok_or_else(|| self.error(child, "Named group without a model group"))?;
                    let mut group = self.parse_model_group(model)?;
                    group.name = Some(name.clone());
                    group.occurs = Occurs::once();
                    schema.add_group(name, group).map_err(located)?;
                }
                other => {
                    return Err(self.error(child, format!("Unsupported schema component 'xs:{}'", other)));
                }
            }
        }
        Ok(schema)
    }

    fn form_default(&self, node: Node, attribute: &str) -> ParseResult<FormDefault> {
        match node.attribute(attribute) {
            None => Ok(FormDefault::Unqualified),
            Some(value) => FormDefault::parse(value)
                .ok_or_else(|| self.error(node, format!("Invalid {} '{}'", attribute, value))),
        }
    }

    fn global_name(&self, node: Node) -> ParseResult<QName> {
        let name = node
            .attribute("name")
            .ok_or_else(|| self.error(node, "Global component without a name"))?;
        Ok(QName::new(self.target_namespace.clone(), name))
    }

    fn local_name(&self, node: Node, name: &str, default_form: FormDefault) -> ParseResult<QName> {
        let form = match node.attribute("form") {
            Some(value) => FormDefault::parse(value)
                .ok_or_else(|| self.error(node, format!("Invalid form '{}'", value)))?,
            None => default_form,
        };
        Ok(match form {
            FormDefault::Qualified => QName::new(self.target_namespace.clone(), name),
            FormDefault::Unqualified => QName::local(name),
        })
    }

    /// Resolve a `prefix:name` QName attribute value in the scope of `node`
    fn resolve_qname(&self, node: Node, value: &str) -> ParseResult<QName> {
        let (prefix, local) = match value.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, value),
        };
        let namespace = node.lookup_namespace_uri(prefix);
        if prefix.is_some() && namespace.is_none() {
            return Err(self.error(node, format!("Unknown namespace prefix in '{}'", value)));
        }
        Ok(QName::new(namespace, local))
    }

    fn builtin(&self, node: Node, qname: &QName) -> ParseResult<Option<BuiltinType>> {
        if !qname.is_in(XSD_NAMESPACE) {
            return Ok(None);
        }
        BuiltinType::from_local_name(&qname.local_name)
            .map(Some)
            .ok_or_else(|| self.error(node, format!("Unsupported built-in type 'xs:{}'", qname.local_name)))
    }

    fn type_ref(&self, node: Node, value: &str) -> ParseResult<TypeRef> {
        let qname = self.resolve_qname(node, value)?;
        Ok(match self.builtin(node, &qname)? {
            Some(builtin) => TypeRef::Builtin(builtin),
            None => TypeRef::Named(qname),
        })
    }

    fn simple_type_ref(&self, node: Node, value: &str) -> ParseResult<SimpleTypeRef> {
        let qname = self.resolve_qname(node, value)?;
        Ok(match self.builtin(node, &qname)? {
            Some(BuiltinType::AnyType) => {
                return Err(self.error(node, "xs:anyType is not a simple type"));
            }
            Some(builtin) => SimpleTypeRef::Builtin(builtin),
            None => SimpleTypeRef::Named(qname),
        })
    }

    fn occurs(&self, node: Node) -> ParseResult<Occurs> {
        Occurs::parse(node.attribute("minOccurs"), node.attribute("maxOccurs"))
            .map_err(|message| self.error(node, message))
    }

    fn parse_element(&self, node: Node, global: bool) -> ParseResult<XsdElement> {
        let name = match node.attribute("name") {
            Some(name) if global => QName::new(self.target_namespace.clone(), name),
            Some(name) => self.local_name(node, name, self.element_form)?,
            None => return Err(self.error(node, "Element declaration without a name")),
        };

        let inline = components(node).find(|c| is_xsd(c, COMPLEX_TYPE) || is_xsd(c, SIMPLE_TYPE));
        let type_ref = match (node.attribute("type"), inline) {
            (Some(_), Some(_)) => {
                return Err(self.error(node, "Element has both a 'type' attribute and an inline type"));
            }
            (Some(value), None) => self.type_ref(node, value)?,
            (None, Some(child)) if is_xsd(&child, COMPLEX_TYPE) => {
                TypeRef::Complex(Arc::new(self.parse_complex_type(child, None)?))
            }
            (None, Some(child)) => TypeRef::Simple(Arc::new(self.parse_simple_type(child, None)?)),
            (None, None) => TypeRef::Builtin(BuiltinType::AnyType),
        };

        let mut element = XsdElement::new(name).with_type(type_ref);
        element.fixed = node.attribute("fixed").map(str::to_string);
        element.abstract_element = matches!(node.attribute("abstract"), Some("true" | "1"));
        Ok(element)
    }

    fn parse_complex_type(&self, node: Node, name: Option<QName>) -> ParseResult<XsdComplexType> {
        let mixed = matches!(node.attribute("mixed"), Some("true" | "1"));
        let mut complex = XsdComplexType::new(name);
        let mut model: Option<XsdGroup> = None;

        for child in components(node) {
            let tag = child.tag_name().name();
            match tag {
                SEQUENCE | CHOICE | ALL | GROUP if model.is_none() => {
                    model = Some(if tag == GROUP {
                        let mut wrapper = XsdGroup::new(ModelType::Sequence);
                        wrapper.push(self.parse_group_ref(child)?);
                        wrapper
                    } else {
                        self.parse_model_group(child)?
                    });
                }
                SIMPLE_CONTENT => {
                    complex.content = ContentType::Simple(self.parse_simple_content(child, &mut complex)?);
                    return Ok(complex);
                }
                ATTRIBUTE => complex.attributes.push(self.parse_attribute(child)?),
                ANY_ATTRIBUTE => complex.any_attribute = true,
                other => {
                    return Err(self.error(child, format!("Unsupported complex type content 'xs:{}'", other)));
                }
            }
        }

        complex.content = match (model, mixed) {
            (Some(group), true) => ContentType::Mixed(group),
            (Some(group), false) => ContentType::ElementOnly(group),
            (None, true) => ContentType::Mixed(XsdGroup::new(ModelType::Sequence)),
            (None, false) => ContentType::Empty,
        };
        Ok(complex)
    }

    fn parse_simple_content(
        &self,
        node: Node,
        complex: &mut XsdComplexType,
    ) -> ParseResult<SimpleTypeRef> {
        let derivation = components(node)
            .next()
            .ok_or_else(|| self.error(node, "Empty xs:simpleContent"))?;
        let base = derivation
            .attribute("base")
            .ok_or_else(|| self.error(derivation, "Derivation without a base type"))?;
        let base = self.simple_type_ref(derivation, base)?;

        let mut facets = Vec::new();
        for child in components(derivation) {
            match child.tag_name().name() {
                ATTRIBUTE => complex.attributes.push(self.parse_attribute(child)?),
                ANY_ATTRIBUTE => complex.any_attribute = true,
                _ if is_xsd(&derivation, RESTRICTION) => {
                    if let Some(facet) = self.parse_facet(child, &mut facets)? {
                        facets.push(facet);
                    }
                }
                other => {
                    return Err(self.error(child, format!("Unsupported extension content 'xs:{}'", other)));
                }
            }
        }
        if !is_xsd(&derivation, EXTENSION) && !is_xsd(&derivation, RESTRICTION) {
            return Err(self.error(derivation, "Expected xs:extension or xs:restriction"));
        }
        if facets.is_empty() {
            return Ok(base);
        }
        let mut restricted = XsdSimpleType::restriction(None, base);
        restricted.facets = facets;
        Ok(SimpleTypeRef::Inline(Arc::new(restricted)))
    }

    fn parse_simple_type(&self, node: Node, name: Option<QName>) -> ParseResult<XsdSimpleType> {
        let restriction = components(node)
            .next()
            .ok_or_else(|| self.error(node, "Empty xs:simpleType"))?;
        if !is_xsd(&restriction, RESTRICTION) {
            return Err(self.error(
                restriction,
                format!(
                    "Unsupported simple type derivation 'xs:{}'",
                    restriction.tag_name().name()
                ),
            ));
        }

        let mut facet_nodes = components(restriction).peekable();
        let base = match restriction.attribute("base") {
            Some(base) => self.simple_type_ref(restriction, base)?,
            None => match facet_nodes.next_if(|c| is_xsd(c, SIMPLE_TYPE)) {
                Some(inline) => SimpleTypeRef::Inline(Arc::new(self.parse_simple_type(inline, None)?)),
                None => return Err(self.error(restriction, "Restriction without a base type")),
            },
        };

        let mut simple = XsdSimpleType::restriction(name, base);
        let mut facets = Vec::new();
        for child in facet_nodes {
            if let Some(facet) = self.parse_facet(child, &mut facets)? {
                facets.push(facet);
            }
        }
        simple.facets = facets;
        Ok(simple)
    }

    /// Parse one facet. Enumerations and patterns merge into an existing facet
    /// in `facets` and return None.
    fn parse_facet(&self, node: Node, facets: &mut [Facet]) -> ParseResult<Option<Facet>> {
        let tag = node.tag_name().name();
        let value = node
            .attribute("value")
            .ok_or_else(|| self.error(node, format!("Facet 'xs:{}' without a value", tag)))?;
        let length = || {
            value
                .trim()
                .parse::<usize>()
                .map_err(|_| self.error(node, format!("Invalid {} value '{}'", tag, value)))
        };
        let bound = || {
            value
                .trim()
                .parse::<Decimal>()
                .map_err(|_| self.error(node, format!("Invalid {} value '{}'", tag, value)))
        };

        let facet = match tag {
            "enumeration" => {
                if let Some(Facet::Enumeration(values)) =
                    facets.iter_mut().find(|f| matches!(f, Facet::Enumeration(_)))
                {
                    values.push(value.to_string());
                    return Ok(None);
                }
                Facet::Enumeration(vec![value.to_string()])
            }
            "pattern" => {
                let compiled = Facet::compile_pattern(value).map_err(|e| self.error(node, e.message))?;
                if let Some(Facet::Pattern(patterns)) =
                    facets.iter_mut().find(|f| matches!(f, Facet::Pattern(_)))
                {
                    patterns.push(compiled);
                    return Ok(None);
                }
                Facet::Pattern(vec![compiled])
            }
            "length" => Facet::Length(length()?),
            "minLength" => Facet::MinLength(length()?),
            "maxLength" => Facet::MaxLength(length()?),
            "minInclusive" => Facet::MinInclusive(bound()?),
            "maxInclusive" => Facet::MaxInclusive(bound()?),
            "minExclusive" => Facet::MinExclusive(bound()?),
            "maxExclusive" => Facet::MaxExclusive(bound()?),
            // whitespace handling is fixed by the primitive type
            "whiteSpace" => return Ok(None),
            other => return Err(self.error(node, format!("Unsupported facet 'xs:{}'", other))),
        };
        Ok(Some(facet))
    }

    fn parse_model_group(&self, node: Node) -> ParseResult<XsdGroup> {
        let model = ModelType::from_tag(node.tag_name().name())
            .ok_or_else(|| self.error(node, "Expected xs:sequence, xs:choice or xs:all"))?;
        let mut group = XsdGroup::new(model);
        group.occurs = self.occurs(node)?;

        for child in components(node) {
            let tag = child.tag_name().name();
            let particle = match tag {
                ELEMENT => self.parse_element_particle(child)?,
                ANY => GroupParticle::Any(self.parse_any(child)?),
                GROUP => self.parse_group_ref(child)?,
                SEQUENCE | CHOICE | ALL if model != ModelType::All => {
                    GroupParticle::Group(Arc::new(self.parse_model_group(child)?))
                }
                other => {
                    return Err(self.error(child, format!("Unexpected 'xs:{}' in xs:{}", other, model)));
                }
            };
            if model == ModelType::All && particle.occurs().max.map_or(true, |max| max > 1) {
                return Err(self.error(child, "Particles of xs:all may occur at most once"));
            }
            group.push(particle);
        }
        Ok(group)
    }

    fn parse_element_particle(&self, node: Node) -> ParseResult<GroupParticle> {
        let occurs = self.occurs(node)?;
        let element = match node.attribute("ref") {
            Some(reference) => ElementRef::Global(self.resolve_qname(node, reference)?),
            None => ElementRef::Local(Arc::new(self.parse_element(node, false)?)),
        };
        Ok(GroupParticle::Element(ElementParticle { element, occurs }))
    }

    fn parse_group_ref(&self, node: Node) -> ParseResult<GroupParticle> {
        let reference = node
            .attribute("ref")
            .ok_or_else(|| self.error(node, "Local xs:group without a 'ref'"))?;
        Ok(GroupParticle::GroupRef(
            self.resolve_qname(node, reference)?,
            self.occurs(node)?,
        ))
    }

    fn parse_any(&self, node: Node) -> ParseResult<AnyParticle> {
        let namespace = match node.attribute("namespace").map(str::trim) {
            None | Some("##any") => NamespaceConstraint::Any,
            Some("##other") => NamespaceConstraint::Other(self.target_namespace.clone()),
            Some(list) => NamespaceConstraint::List(
                list.split_whitespace()
                    .map(|token| match token {
                        "##local" => None,
                        "##targetNamespace" => self.target_namespace.clone(),
                        uri => Some(uri.to_string()),
                    })
                    .collect(),
            ),
        };
        let process_contents = match node.attribute("processContents") {
            None | Some("strict") => ProcessContents::Strict,
            Some("lax") => ProcessContents::Lax,
            Some("skip") => ProcessContents::Skip,
            Some(other) => {
                return Err(self.error(node, format!("Invalid processContents '{}'", other)));
            }
        };
        Ok(AnyParticle {
            namespace,
            process_contents,
            occurs: self.occurs(node)?,
        })
    }

    fn parse_attribute(&self, node: Node) -> ParseResult<XsdAttribute> {
        if node.has_attribute("ref") {
            return Err(self.error(node, "Attribute references are not supported"));
        }
        let name = node
            .attribute("name")
            .ok_or_else(|| self.error(node, "Attribute declaration without a name"))?;
        let mut attribute = XsdAttribute::new(self.local_name(node, name, self.attribute_form)?);

        let inline = components(node).find(|c| is_xsd(c, SIMPLE_TYPE));
        attribute.simple_type = match (node.attribute("type"), inline) {
            (Some(value), None) => self.simple_type_ref(node, value)?,
            (None, Some(child)) => SimpleTypeRef::Inline(Arc::new(self.parse_simple_type(child, None)?)),
            (None, None) => SimpleTypeRef::Builtin(BuiltinType::AnySimpleType),
            (Some(_), Some(_)) => {
                return Err(self.error(node, "Attribute has both a 'type' attribute and an inline type"));
            }
        };
        if let Some(value) = node.attribute("use") {
            attribute.use_mode = AttributeUse::parse(value)
                .ok_or_else(|| self.error(node, format!("Invalid use '{}'", value)))?;
        }
        attribute.default = node.attribute("default").map(str::to_string);
        attribute.fixed = node.attribute("fixed").map(str::to_string);
        Ok(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:q="urn:quiz" targetNamespace="urn:quiz"
           elementFormDefault="qualified">
  <xs:simpleType name="level">
    <xs:restriction base="xs:token">
      <xs:enumeration value="easy"/>
      <xs:enumeration value="hard"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:group name="body">
    <xs:sequence>
      <xs:element name="text" type="xs:string"/>
    </xs:sequence>
  </xs:group>
  <xs:element name="quiz">
    <xs:complexType>
      <xs:sequence>
        <xs:group ref="q:body"/>
        <xs:element name="note" minOccurs="0" maxOccurs="unbounded">
          <xs:complexType>
            <xs:simpleContent>
              <xs:extension base="xs:string">
                <xs:attribute name="level" type="q:level"/>
              </xs:extension>
            </xs:simpleContent>
          </xs:complexType>
        </xs:element>
      </xs:sequence>
      <xs:attribute name="points" type="xs:nonNegativeInteger"/>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    #[test]
    fn test_parse_schema_components() {
        let schema = XsdSchema::from_string(SCHEMA).unwrap();
        assert_eq!(schema.target_namespace.as_deref(), Some("urn:quiz"));
        assert_eq!(schema.element_form_default, FormDefault::Qualified);
        assert_eq!(schema.element_count(), 1);
        assert_eq!(schema.type_count(), 1);
        assert!(schema.lookup_group(&QName::namespaced("urn:quiz", "body")).is_some());
        assert!(schema.lookup_element(&QName::namespaced("urn:quiz", "quiz")).is_some());
    }

    #[test]
    fn test_parsed_schema_validates() {
        let schema = XsdSchema::from_string(SCHEMA).unwrap();
        let ok = crate::documents::Document::from_string(
            r#"<quiz xmlns="urn:quiz" points="2"><text>Hi</text><note level="easy">n</note></quiz>"#,
        )
        .unwrap();
        assert!(schema.validate(&ok).is_empty());

        let bad = crate::documents::Document::from_string(
            r#"<quiz xmlns="urn:quiz" points="-1"><note level="medium">n</note></quiz>"#,
        )
        .unwrap();
        let violations = schema.validate(&bad);
        assert_eq!(violations.len(), 3, "{:?}", violations);
    }

    const OPEN_SCHEMA: &str = r###"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="urn:open" elementFormDefault="qualified">
  <xs:element name="base" type="xs:string" abstract="true"/>
  <xs:element name="note" type="xs:string"/>
  <xs:element name="strict">
    <xs:complexType>
      <xs:sequence>
        <xs:any minOccurs="0" maxOccurs="unbounded"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
  <xs:element name="lax">
    <xs:complexType>
      <xs:sequence>
        <xs:any processContents="lax" minOccurs="0" maxOccurs="unbounded"/>
      </xs:sequence>
      <xs:anyAttribute/>
    </xs:complexType>
  </xs:element>
  <xs:element name="skip">
    <xs:complexType>
      <xs:sequence>
        <xs:any namespace="##any" processContents="skip" minOccurs="0" maxOccurs="unbounded"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"###;

    fn open_violations(xml: &str) -> Vec<String> {
        let schema = XsdSchema::from_string(OPEN_SCHEMA).unwrap();
        let doc = crate::documents::Document::from_string(xml).unwrap();
        schema.validate(&doc).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_abstract_root_is_rejected() {
        let violations = open_violations(r#"<base xmlns="urn:open">x</base>"#);
        assert_eq!(
            violations,
            vec!["Line 1: Element '{urn:open}base': The element declaration is abstract."]
        );
    }

    #[test]
    fn test_wildcards_follow_process_contents() {
        let lax = r#"<lax xmlns="urn:open" extra="1"><note>n</note><other xmlns="urn:x"><deep/></other></lax>"#;
        assert!(open_violations(lax).is_empty());

        // a declared element under a lax wildcard is still validated
        let lax_known = r#"<lax xmlns="urn:open"><note><b/></note></lax>"#;
        assert_eq!(open_violations(lax_known).len(), 1);

        let skip = r#"<skip xmlns="urn:open"><note><b/></note><mystery/></skip>"#;
        assert!(open_violations(skip).is_empty());

        let strict = r#"<strict xmlns="urn:open">
  <note>n</note>
  <mystery/>
</strict>"#;
        let violations = open_violations(strict);
        assert_eq!(violations.len(), 1, "{:?}", violations);
        assert!(violations[0].starts_with("Line 3: Element '{urn:open}mystery'"));
        assert!(violations[0].contains("strict wildcard"));
    }

    #[test]
    fn test_undeclared_attribute_needs_any_attribute() {
        assert!(open_violations(r#"<lax xmlns="urn:open" extra="1"/>"#).is_empty());

        let violations = open_violations(r#"<skip xmlns="urn:open" extra="1"/>"#);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("The attribute 'extra' is not allowed."));
    }

    #[test]
    fn test_rejects_include() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:include schemaLocation="other.xsd"/>
</xs:schema>"#;
        let err = XsdSchema::from_string(xsd).unwrap_err();
        assert!(err.to_string().contains("xs:include"));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_rejects_unknown_builtin_and_prefix() {
        let unknown = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="a" type="xs:gYearMonth"/>
</xs:schema>"#;
        assert!(XsdSchema::from_string(unknown).is_err());

        let prefix = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="a" type="nope:thing"/>
</xs:schema>"#;
        assert!(XsdSchema::from_string(prefix).is_err());
    }

    #[test]
    fn test_not_a_schema() {
        assert!(XsdSchema::from_string("<root/>").is_err());
        assert!(XsdSchema::from_string("<xs:schema").is_err());
    }
}
