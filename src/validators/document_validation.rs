//! Instance document validation
//!
//! Walks a parsed [`Document`] against an [`XsdSchema`] and records every
//! violation in a [`ValidationContext`]. Messages follow the wording used
//! by libxml2 so reports look familiar to users of `xmllint`.

use super::builtins::{BuiltinType, XSI_NAMESPACE};
use super::complex_types::{ContentType, XsdComplexType};
use super::elements::XsdElement;
use super::groups::{ProcessContents, XsdGroup};
use super::models::{find_declaration, ChildDeclaration, ContentMatcher, ModelOutcome};
use super::schemas::{ResolvedType, XsdSchema};
use super::simple_types::SimpleTypeRef;
use super::validation::ValidationContext;
use crate::documents::{Document, Element};
use crate::namespaces::QName;

/// Validate a whole document starting at its root
pub fn validate_document(schema: &XsdSchema, doc: &Document, context: &mut ValidationContext) {
    let root = &doc.root;
    match schema.lookup_element(&root.qname) {
        Some(decl) => validate_element(schema, root, decl, context),
        None => context.add_error(
            root.line,
            format!(
                "Element '{}': No matching global declaration available for the validation root.",
                root.qname
            ),
        ),
    }
}

/// Validate one element against its declaration
pub fn validate_element(
    schema: &XsdSchema,
    element: &Element,
    decl: &XsdElement,
    context: &mut ValidationContext,
) {
    if decl.abstract_element {
        context.add_error(
            element.line,
            format!("Element '{}': The element declaration is abstract.", element.qname),
        );
        return;
    }

    let Some(resolved) = schema.resolve_type(&decl.type_ref) else {
        context.add_error(
            element.line,
            format!("Element '{}': The type definition is not available.", element.qname),
        );
        return;
    };

    context.push_level();
    match resolved {
        ResolvedType::Builtin(BuiltinType::AnyType) => {}
        ResolvedType::Builtin(builtin) => {
            validate_simple_element(schema, element, decl, &SimpleTypeRef::Builtin(builtin), context)
        }
        ResolvedType::Simple(simple) => {
            let type_ref = SimpleTypeRef::Inline(std::sync::Arc::new(simple.clone()));
            validate_simple_element(schema, element, decl, &type_ref, context)
        }
        ResolvedType::Complex(complex) => validate_complex_element(schema, element, decl, complex, context),
    }
    context.pop_level();
}

fn element_error(element: &Element, message: &str) -> String {
    format!("Element '{}': {}", element.qname, message)
}

fn attribute_error(element: &Element, attribute: &QName, message: &str) -> String {
    format!("Element '{}', attribute '{}': {}", element.qname, attribute, message)
}

/// Attributes other than xsi:* on an element without a complex type
fn reject_attributes(element: &Element, context: &mut ValidationContext) {
    for name in element.attributes.keys().filter(|q| !q.is_in(XSI_NAMESPACE)) {
        context.add_error(
            element.line,
            attribute_error(
                element,
                name,
                &format!("The attribute '{}' is not allowed.", name),
            ),
        );
    }
}

fn validate_simple_element(
    schema: &XsdSchema,
    element: &Element,
    decl: &XsdElement,
    type_ref: &SimpleTypeRef,
    context: &mut ValidationContext,
) {
    reject_attributes(element, context);
    if !element.children.is_empty() {
        context.add_error(
            element.line,
            element_error(
                element,
                "Element content is not allowed, because the type definition is simple.",
            ),
        );
        return;
    }
    check_simple_content(schema, element, decl, type_ref, context);
}

fn check_simple_content(
    schema: &XsdSchema,
    element: &Element,
    decl: &XsdElement,
    type_ref: &SimpleTypeRef,
    context: &mut ValidationContext,
) {
    let value = element.text.as_deref().unwrap_or("");
    if let Err(message) = schema.validate_simple_value(type_ref, value) {
        context.add_error(element.line, element_error(element, &message));
        return;
    }
    if let Some(fixed) = &decl.fixed {
        if value != fixed {
            context.add_error(
                element.line,
                element_error(
                    element,
                    &format!(
                        "The value '{}' does not match the fixed value constraint '{}'.",
                        value, fixed
                    ),
                ),
            );
        }
    }
}

fn validate_complex_element(
    schema: &XsdSchema,
    element: &Element,
    decl: &XsdElement,
    complex: &XsdComplexType,
    context: &mut ValidationContext,
) {
    validate_attributes(schema, element, complex, context);

    match &complex.content {
        ContentType::Empty => {
            if !element.children.is_empty() {
                context.add_error(
                    element.line,
                    element_error(
                        element,
                        "Element content is not allowed, because the content type is empty.",
                    ),
                );
            } else if element.has_character_content() {
                context.add_error(
                    element.line,
                    element_error(
                        element,
                        "Character content is not allowed, because the content type is empty.",
                    ),
                );
            }
        }
        ContentType::Simple(type_ref) => {
            if !element.children.is_empty() {
                context.add_error(
                    element.line,
                    element_error(
                        element,
                        "Element content is not allowed, because the content type is a simple type definition.",
                    ),
                );
                return;
            }
            check_simple_content(schema, element, decl, type_ref, context);
        }
        ContentType::ElementOnly(group) => {
            if element.has_character_content() {
                context.add_error(
                    element.line,
                    element_error(
                        element,
                        "Character content other than whitespace is not allowed because the content type is 'element-only'.",
                    ),
                );
            }
            validate_children(schema, element, group, context);
        }
        ContentType::Mixed(group) => validate_children(schema, element, group, context),
    }
}

fn validate_attributes(
    schema: &XsdSchema,
    element: &Element,
    complex: &XsdComplexType,
    context: &mut ValidationContext,
) {
    for (name, value) in &element.attributes {
        if name.is_in(XSI_NAMESPACE) {
            continue;
        }
        let decl = match complex.attribute(name) {
            Some(decl) if !decl.is_prohibited() => decl,
            _ => {
                if !complex.any_attribute {
                    context.add_error(
                        element.line,
                        attribute_error(
                            element,
                            name,
                            &format!("The attribute '{}' is not allowed.", name),
                        ),
                    );
                }
                continue;
            }
        };
        if let Err(message) = schema.validate_simple_value(&decl.simple_type, value) {
            context.add_error(element.line, attribute_error(element, name, &message));
            continue;
        }
        if let Some(fixed) = &decl.fixed {
            if value != fixed {
                context.add_error(
                    element.line,
                    attribute_error(
                        element,
                        name,
                        &format!(
                            "The value '{}' does not match the fixed value constraint '{}'.",
                            value, fixed
                        ),
                    ),
                );
            }
        }
    }

    for decl in complex.attributes.iter().filter(|a| a.is_required()) {
        if !element.attributes.contains_key(&decl.name) {
            context.add_error(
                element.line,
                element_error(
                    element,
                    &format!("The attribute '{}' is required but missing.", decl.name),
                ),
            );
        }
    }
}

fn expected_list(expected: &[String]) -> String {
    match expected {
        [] => String::new(),
        [single] => format!(" Expected is ( {} ).", single),
        many => format!(" Expected is one of ( {} ).", many.join(", ")),
    }
}

fn validate_children(
    schema: &XsdSchema,
    element: &Element,
    group: &XsdGroup,
    context: &mut ValidationContext,
) {
    let names: Vec<QName> = element.children.iter().map(|c| c.qname.clone()).collect();
    match ContentMatcher::new(schema, &names).run(group) {
        Ok(ModelOutcome::Complete) => {}
        Ok(ModelOutcome::Unexpected { index, expected }) => {
            let child = &element.children[index];
            context.add_error(
                child.line,
                format!(
                    "{}{}",
                    element_error(child, "This element is not expected."),
                    expected_list(&expected)
                ),
            );
        }
        Ok(ModelOutcome::Incomplete { expected }) => {
            context.add_error(
                element.line,
                format!(
                    "{}{}",
                    element_error(element, "Missing child element(s)."),
                    expected_list(&expected)
                ),
            );
        }
        Err(err) => context.add_error(element.line, element_error(element, &err.message)),
    }

    for child in &element.children {
        match find_declaration(schema, group, &child.qname) {
            Some(ChildDeclaration::Element(decl)) => validate_element(schema, child, &decl, context),
            Some(ChildDeclaration::Wildcard(process)) => {
                validate_wildcard_child(schema, child, process, context)
            }
            None => {}
        }
    }
}

fn validate_wildcard_child(
    schema: &XsdSchema,
    child: &Element,
    process: ProcessContents,
    context: &mut ValidationContext,
) {
    match (process, schema.lookup_element(&child.qname)) {
        (ProcessContents::Skip, _) => {}
        (_, Some(decl)) => validate_element(schema, child, decl, context),
        (ProcessContents::Strict, None) => context.add_error(
            child.line,
            element_error(
                child,
                "No matching global element declaration available, but demanded by the strict wildcard.",
            ),
        ),
        (ProcessContents::Lax, None) => {}
    }
}
