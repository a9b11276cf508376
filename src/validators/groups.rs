//! XSD Model Group validators
//!
//! This module implements model groups for XSD content models:
//! - xs:sequence - ordered content
//! - xs:choice - alternative content
//! - xs:all - unordered content, each element at most once
//!
//! Reference: https://www.w3.org/TR/xmlschema-1/#Model_Groups

use std::sync::Arc;

use super::elements::XsdElement;
use super::particles::Occurs;
use crate::namespaces::QName;

/// Model group compositor type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelType {
    /// Ordered sequence of particles
    #[default]
    Sequence,
    /// One of multiple alternatives
    Choice,
    /// Unordered set of particles
    All,
}

impl ModelType {
    /// Parse from a local tag name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sequence" => Some(Self::Sequence),
            "choice" => Some(Self::Choice),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequence => write!(f, "sequence"),
            Self::Choice => write!(f, "choice"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Where an element particle's declaration lives
#[derive(Debug, Clone)]
pub enum ElementRef {
    /// Declared in place
    Local(Arc<XsdElement>),
    /// `ref` to a global element declaration
    Global(QName),
}

/// Element particle in a model group
#[derive(Debug, Clone)]
pub struct ElementParticle {
    /// The declaration
    pub element: ElementRef,
    /// Occurrence constraints
    pub occurs: Occurs,
}

impl ElementParticle {
    /// Name that instance elements must carry to match
    pub fn name(&self) -> &QName {
        match &self.element {
            ElementRef::Local(decl) => &decl.name,
            ElementRef::Global(qname) => qname,
        }
    }
}

/// Namespace constraint of an xs:any wildcard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceConstraint {
    /// `##any`
    Any,
    /// `##other`: any namespace except the target namespace (and no namespace)
    Other(Option<String>),
    /// Explicit list; `None` stands for `##local`
    List(Vec<Option<String>>),
}

impl NamespaceConstraint {
    /// Check whether an element namespace is admitted
    pub fn admits(&self, namespace: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Other(target) => namespace.is_some() && namespace != target.as_deref(),
            Self::List(allowed) => allowed.iter().any(|ns| ns.as_deref() == namespace),
        }
    }
}

/// How wildcard-matched content is validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessContents {
    /// A global declaration must exist and is enforced
    #[default]
    Strict,
    /// Validate when a global declaration exists
    Lax,
    /// No validation
    Skip,
}

/// xs:any wildcard particle
#[derive(Debug, Clone)]
pub struct AnyParticle {
    /// Admitted namespaces
    pub namespace: NamespaceConstraint,
    /// Validation of matched content
    pub process_contents: ProcessContents,
    /// Occurrence constraints
    pub occurs: Occurs,
}

/// A particle in a model group (element, wildcard, or nested group)
#[derive(Debug, Clone)]
pub enum GroupParticle {
    /// Element declaration or reference
    Element(ElementParticle),
    /// Wildcard (xs:any)
    Any(AnyParticle),
    /// Nested model group
    Group(Arc<XsdGroup>),
    /// Reference to a named model group, with the occurrence of the reference
    GroupRef(QName, Occurs),
}

impl GroupParticle {
    /// Get the occurrence constraints
    pub fn occurs(&self) -> Occurs {
        match self {
            Self::Element(e) => e.occurs,
            Self::Any(a) => a.occurs,
            Self::Group(g) => g.occurs,
            Self::GroupRef(_, occurs) => *occurs,
        }
    }
}

/// A model group
#[derive(Debug, Clone, Default)]
pub struct XsdGroup {
    /// Group name (named groups only)
    pub name: Option<QName>,
    /// Compositor
    pub model: ModelType,
    /// Particles in declaration order
    pub particles: Vec<GroupParticle>,
    /// Occurrence constraints
    pub occurs: Occurs,
}

impl XsdGroup {
    /// Create an empty group
    pub fn new(model: ModelType) -> Self {
        Self {
            name: None,
            model,
            particles: Vec::new(),
            occurs: Occurs::once(),
        }
    }

    /// Check if the group has no particles
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Append a particle
    pub fn push(&mut self, particle: GroupParticle) {
        self.particles.push(particle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_from_tag() {
        assert_eq!(ModelType::from_tag("choice"), Some(ModelType::Choice));
        assert_eq!(ModelType::from_tag("group"), None);
        assert_eq!(ModelType::All.to_string(), "all");
    }

    #[test]
    fn test_namespace_constraint() {
        let other = NamespaceConstraint::Other(Some("urn:q".into()));
        assert!(other.admits(Some("urn:x")));
        assert!(!other.admits(Some("urn:q")));
        assert!(!other.admits(None));

        let local = NamespaceConstraint::List(vec![None]);
        assert!(local.admits(None));
        assert!(!local.admits(Some("urn:q")));
    }

    #[test]
    fn test_element_particle_name() {
        let particle = ElementParticle {
            element: ElementRef::Global(QName::namespaced("urn:q", "text")),
            occurs: Occurs::optional(),
        };
        assert_eq!(particle.name().local_name, "text");
    }
}
