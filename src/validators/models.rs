//! XSD Content Model Validators
//!
//! Matches the sequence of child element names of one instance element
//! against a model group. The matcher works on sets of reachable child
//! positions rather than a single cursor, so optional and repeated
//! particles never need backtracking.
//!
//! Reference: https://www.w3.org/TR/xmlschema-1/#cvc-particle

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use indexmap::IndexSet;

use super::elements::XsdElement;
use super::groups::{
    AnyParticle, ElementParticle, ElementRef, GroupParticle, ModelType, ProcessContents, XsdGroup,
};
use super::particles::Occurs;
use super::schemas::XsdSchema;
use crate::error::ParseError;
use crate::namespaces::QName;

/// Set of child indices the model can have consumed up to
type Positions = BTreeSet<usize>;

/// Largest xs:all group the matcher tracks (one bit per particle)
pub const MAX_ALL_PARTICLES: usize = 64;

/// Result of matching children against a model group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutcome {
    /// Every child was consumed and the model is satisfied
    Complete,
    /// The child at `index` cannot be placed
    Unexpected {
        /// Index of the first child that does not fit
        index: usize,
        /// Names the model would have accepted there
        expected: Vec<String>,
    },
    /// All children fit but required particles are missing
    Incomplete {
        /// Names the model would accept next
        expected: Vec<String>,
    },
}

/// Position-set matcher for one element's children
pub struct ContentMatcher<'a> {
    schema: &'a XsdSchema,
    names: &'a [QName],
    furthest: usize,
    expected: BTreeMap<usize, IndexSet<String>>,
}

impl<'a> ContentMatcher<'a> {
    /// Create a matcher over the given child names
    pub fn new(schema: &'a XsdSchema, names: &'a [QName]) -> Self {
        Self {
            schema,
            names,
            furthest: 0,
            expected: BTreeMap::new(),
        }
    }

    /// Match all children against `group`
    pub fn run(mut self, group: &XsdGroup) -> Result<ModelOutcome, ParseError> {
        let start: Positions = std::iter::once(0).collect();
        let end = self.match_group(group, group.occurs, &start)?;
        let n = self.names.len();

        if end.contains(&n) {
            return Ok(ModelOutcome::Complete);
        }
        let expected = self
            .expected
            .remove(&self.furthest)
            .map(|names| names.into_iter().collect())
            .unwrap_or_default();
        if self.furthest < n {
            Ok(ModelOutcome::Unexpected {
                index: self.furthest,
                expected,
            })
        } else {
            Ok(ModelOutcome::Incomplete { expected })
        }
    }

    fn reach(&mut self, positions: &Positions) {
        if let Some(&last) = positions.iter().next_back() {
            self.furthest = self.furthest.max(last);
        }
    }

    fn expect(&mut self, position: usize, name: String) {
        self.expected.entry(position).or_default().insert(name);
    }

    fn match_particle(
        &mut self,
        particle: &GroupParticle,
        start: &Positions,
    ) -> Result<Positions, ParseError> {
        match particle {
            GroupParticle::Element(element) => {
                Ok(self.repeat(element.occurs, start, |m, from| Ok(m.step_element(element, from))))
            }
            GroupParticle::Any(any) => {
                Ok(self.repeat(any.occurs, start, |m, from| Ok(m.step_any(any, from))))
            }
            GroupParticle::Group(group) => self.match_group(group, group.occurs, start),
            GroupParticle::GroupRef(qname, occurs) => {
                let group = self.schema.lookup_group(qname).cloned().ok_or_else(|| {
                    ParseError::new(format!("Reference to undefined model group '{}'", qname))
                })?;
                self.match_group(&group, *occurs, start)
            }
        }
    }

    fn match_group(
        &mut self,
        group: &XsdGroup,
        occurs: Occurs,
        start: &Positions,
    ) -> Result<Positions, ParseError> {
        self.try_repeat(occurs, start, |m, from| match group.model {
            ModelType::Sequence => {
                let mut current = from.clone();
                for particle in &group.particles {
                    if current.is_empty() {
                        break;
                    }
                    current = m.match_particle(particle, &current)?;
                }
                Ok(current)
            }
            ModelType::Choice => {
                let mut reached = Positions::new();
                for particle in &group.particles {
                    reached.extend(m.match_particle(particle, from)?);
                }
                Ok(reached)
            }
            ModelType::All => m.match_all(group, from),
        })
    }

    /// Each particle of an xs:all at most once, in any order
    fn match_all(&mut self, group: &XsdGroup, start: &Positions) -> Result<Positions, ParseError> {
        if group.particles.len() > MAX_ALL_PARTICLES {
            return Err(ParseError::new(format!(
                "xs:all group with more than {} particles",
                MAX_ALL_PARTICLES
            )));
        }
        let required: u64 = group
            .particles
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.occurs().is_emptiable())
            .fold(0, |mask, (i, _)| mask | (1 << i));

        let mut seen: BTreeSet<(usize, u64)> = start.iter().map(|&p| (p, 0)).collect();
        let mut queue: Vec<(usize, u64)> = seen.iter().copied().collect();
        let mut reached = Positions::new();

        while let Some((position, used)) = queue.pop() {
            if used & required == required {
                reached.insert(position);
            }
            let from: Positions = std::iter::once(position).collect();
            for (i, particle) in group.particles.iter().enumerate() {
                let bit = 1u64 << i;
                if used & bit != 0 {
                    continue;
                }
                let once = single(particle);
                for next in self.match_particle(&once, &from)? {
                    if next != position && seen.insert((next, used | bit)) {
                        queue.push((next, used | bit));
                    }
                }
            }
        }
        Ok(reached)
    }

    fn step_element(&mut self, particle: &ElementParticle, from: &Positions) -> Positions {
        let mut next = Positions::new();
        for &position in from {
            match self.names.get(position) {
                Some(name) if name == particle.name() => {
                    next.insert(position + 1);
                }
                _ => self.expect(position, particle.name().to_string()),
            }
        }
        self.reach(&next);
        next
    }

    fn step_any(&mut self, any: &AnyParticle, from: &Positions) -> Positions {
        let mut next = Positions::new();
        for &position in from {
            match self.names.get(position) {
                Some(name) if any.namespace.admits(name.namespace.as_deref()) => {
                    next.insert(position + 1);
                }
                _ => self.expect(position, "##any".to_string()),
            }
        }
        self.reach(&next);
        next
    }

    fn repeat(
        &mut self,
        occurs: Occurs,
        start: &Positions,
        mut step: impl FnMut(&mut Self, &Positions) -> Result<Positions, ParseError>,
    ) -> Positions {
        // element and wildcard steps never fail
        self.try_repeat(occurs, start, |m, from| step(m, from))
            .unwrap_or_default()
    }

    /// Apply `step` between `occurs.min` and `occurs.max` times.
    ///
    /// Once the minimum is met, a position already reached is not explored
    /// again: an earlier arrival has at least as many repetitions left.
    fn try_repeat(
        &mut self,
        occurs: Occurs,
        start: &Positions,
        mut step: impl FnMut(&mut Self, &Positions) -> Result<Positions, ParseError>,
    ) -> Result<Positions, ParseError> {
        let mut result = if occurs.min == 0 {
            start.clone()
        } else {
            Positions::new()
        };
        let mut frontier = start.clone();
        let mut count: u32 = 0;

        while !frontier.is_empty() && occurs.max.map_or(true, |max| count < max) {
            let next = step(self, &frontier)?;
            count += 1;
            if count >= occurs.min {
                frontier = next.difference(&result).copied().collect();
                result.extend(next);
            } else {
                frontier = next;
            }
        }
        Ok(result)
    }
}

fn single(particle: &GroupParticle) -> GroupParticle {
    match particle {
        GroupParticle::Element(element) => GroupParticle::Element(ElementParticle {
            element: element.element.clone(),
            occurs: Occurs::once(),
        }),
        GroupParticle::Any(any) => GroupParticle::Any(AnyParticle {
            occurs: Occurs::once(),
            ..any.clone()
        }),
        GroupParticle::Group(group) => {
            let mut group = XsdGroup::clone(group);
            group.occurs = Occurs::once();
            GroupParticle::Group(Arc::new(group))
        }
        GroupParticle::GroupRef(qname, _) => GroupParticle::GroupRef(qname.clone(), Occurs::once()),
    }
}

/// Declaration that governs a matched child
#[derive(Debug, Clone)]
pub enum ChildDeclaration {
    /// An element particle with this name
    Element(Arc<XsdElement>),
    /// A wildcard admitted the child
    Wildcard(ProcessContents),
}

/// Find the declaration for a child named `name` inside `group`.
///
/// Element particles win over wildcards; the first match in document order
/// of the model is used.
pub fn find_declaration(
    schema: &XsdSchema,
    group: &XsdGroup,
    name: &QName,
) -> Option<ChildDeclaration> {
    find_element(schema, group, name, 0)
        .map(ChildDeclaration::Element)
        .or_else(|| find_wildcard(schema, group, name, 0).map(ChildDeclaration::Wildcard))
}

fn find_element(
    schema: &XsdSchema,
    group: &XsdGroup,
    name: &QName,
    depth: usize,
) -> Option<Arc<XsdElement>> {
    if depth > MAX_ALL_PARTICLES {
        return None;
    }
    group.particles.iter().find_map(|particle| match particle {
        GroupParticle::Element(element) if element.name() == name => match &element.element {
            ElementRef::Local(decl) => Some(Arc::clone(decl)),
            ElementRef::Global(qname) => schema.lookup_element(qname).cloned(),
        },
        GroupParticle::Element(_) | GroupParticle::Any(_) => None,
        GroupParticle::Group(nested) => find_element(schema, nested, name, depth + 1),
        GroupParticle::GroupRef(qname, _) => schema
            .lookup_group(qname)
            .and_then(|nested| find_element(schema, nested, name, depth + 1)),
    })
}

fn find_wildcard(
    schema: &XsdSchema,
    group: &XsdGroup,
    name: &QName,
    depth: usize,
) -> Option<ProcessContents> {
    if depth > MAX_ALL_PARTICLES {
        return None;
    }
    group.particles.iter().find_map(|particle| match particle {
        GroupParticle::Any(any) if any.namespace.admits(name.namespace.as_deref()) => {
            Some(any.process_contents)
        }
        GroupParticle::Element(_) | GroupParticle::Any(_) => None,
        GroupParticle::Group(nested) => find_wildcard(schema, nested, name, depth + 1),
        GroupParticle::GroupRef(qname, _) => schema
            .lookup_group(qname)
            .and_then(|nested| find_wildcard(schema, nested, name, depth + 1)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::groups::NamespaceConstraint;

    fn element(name: &str, occurs: Occurs) -> GroupParticle {
        GroupParticle::Element(ElementParticle {
            element: ElementRef::Local(Arc::new(XsdElement::new(QName::local(name)))),
            occurs,
        })
    }

    fn group(model: ModelType, particles: Vec<GroupParticle>) -> XsdGroup {
        let mut group = XsdGroup::new(model);
        particles.into_iter().for_each(|p| group.push(p));
        group
    }

    fn names(list: &[&str]) -> Vec<QName> {
        list.iter().map(|n| QName::local(*n)).collect()
    }

    fn run(group: &XsdGroup, children: &[&str]) -> ModelOutcome {
        let schema = XsdSchema::new();
        let children = names(children);
        ContentMatcher::new(&schema, &children).run(group).unwrap()
    }

    #[test]
    fn test_sequence_with_repetition() {
        let model = group(
            ModelType::Sequence,
            vec![
                element("text", Occurs::once()),
                element("option", Occurs::new(2, None)),
            ],
        );
        assert_eq!(run(&model, &["text", "option", "option", "option"]), ModelOutcome::Complete);
        assert_eq!(
            run(&model, &["text", "option"]),
            ModelOutcome::Incomplete {
                expected: vec!["option".into()]
            }
        );
    }

    #[test]
    fn test_unexpected_reports_position_and_expected_names() {
        let model = group(
            ModelType::Sequence,
            vec![
                element("text", Occurs::optional()),
                element("options", Occurs::once()),
            ],
        );
        assert_eq!(
            run(&model, &["bogus"]),
            ModelOutcome::Unexpected {
                index: 0,
                expected: vec!["text".into(), "options".into()]
            }
        );
        assert_eq!(
            run(&model, &["options", "text"]),
            ModelOutcome::Unexpected {
                index: 1,
                expected: vec![]
            }
        );
    }

    #[test]
    fn test_choice_repeated() {
        let mut model = group(
            ModelType::Choice,
            vec![element("a", Occurs::once()), element("b", Occurs::once())],
        );
        model.occurs = Occurs::one_or_more();
        assert_eq!(run(&model, &["b", "a", "b"]), ModelOutcome::Complete);
        assert!(matches!(run(&model, &[]), ModelOutcome::Incomplete { .. }));
    }

    #[test]
    fn test_all_any_order() {
        let model = group(
            ModelType::All,
            vec![
                element("left", Occurs::once()),
                element("right", Occurs::once()),
                element("note", Occurs::optional()),
            ],
        );
        assert_eq!(run(&model, &["right", "left"]), ModelOutcome::Complete);
        assert_eq!(run(&model, &["note", "left", "right"]), ModelOutcome::Complete);
        assert!(matches!(
            run(&model, &["left", "left"]),
            ModelOutcome::Unexpected { index: 1, .. }
        ));
    }

    #[test]
    fn test_empty_model_rejects_children() {
        let model = XsdGroup::new(ModelType::Sequence);
        assert_eq!(run(&model, &[]), ModelOutcome::Complete);
        assert!(matches!(run(&model, &["x"]), ModelOutcome::Unexpected { index: 0, .. }));
    }

    #[test]
    fn test_emptiable_group_repetition_terminates() {
        let mut inner = group(ModelType::Sequence, vec![element("a", Occurs::optional())]);
        inner.occurs = Occurs::zero_or_more();
        let model = group(ModelType::Sequence, vec![GroupParticle::Group(Arc::new(inner))]);
        assert_eq!(run(&model, &["a", "a", "a"]), ModelOutcome::Complete);
    }

    #[test]
    fn test_wildcard_and_declaration_lookup() {
        let model = group(
            ModelType::Sequence,
            vec![
                element("text", Occurs::once()),
                GroupParticle::Any(AnyParticle {
                    namespace: NamespaceConstraint::Any,
                    process_contents: ProcessContents::Lax,
                    occurs: Occurs::zero_or_more(),
                }),
            ],
        );
        assert_eq!(run(&model, &["text", "extra", "more"]), ModelOutcome::Complete);

        let schema = XsdSchema::new();
        assert!(matches!(
            find_declaration(&schema, &model, &QName::local("text")),
            Some(ChildDeclaration::Element(_))
        ));
        assert!(matches!(
            find_declaration(&schema, &model, &QName::local("extra")),
            Some(ChildDeclaration::Wildcard(ProcessContents::Lax))
        ));
    }
}
