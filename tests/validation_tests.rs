//! Validation tests against the bundled question bank schema

use std::path::PathBuf;

use qtipack::documents::Element;
use qtipack::validators::XsdSchema;
use qtipack::{ErrorKind, SchemaValidator};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn validator() -> SchemaValidator {
    SchemaValidator::bundled().expect("bundled schema loads")
}

#[test]
fn test_bundled_schema_components() {
    let schema = XsdSchema::from_string(qtipack::DEFAULT_SCHEMA).unwrap();
    assert_eq!(
        schema.target_namespace.as_deref(),
        Some(qtipack::QUESTIONS_NAMESPACE)
    );
    // the container plus the three question elements
    assert_eq!(schema.element_count(), 4);
    assert_eq!(schema.type_count(), 3);
}

#[test]
fn test_valid_fixtures() {
    for name in ["demo.xml", "demo_mcq_root.xml", "demo_latin1.xml"] {
        let result = validator().validate_file(fixture(name));
        assert!(result.is_valid(), "{}: {:?}", name, result.errors);
        assert!(result.document.is_some());
    }
}

/// Whitespace-only text is insignificant
fn significant(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn assert_same_tree(parsed: &Element, source: roxmltree::Node) {
    let name = source.tag_name();
    assert_eq!(parsed.local_name(), name.name(), "line {}", parsed.line);
    assert_eq!(parsed.namespace(), name.namespace(), "{}", name.name());

    let attributes: Vec<_> = source.attributes().collect();
    assert_eq!(parsed.attributes.len(), attributes.len(), "{}", name.name());
    for attribute in attributes {
        assert_eq!(
            parsed.get_attribute(attribute.name()),
            Some(attribute.value()),
            "{}/@{}",
            name.name(),
            attribute.name()
        );
    }

    assert_eq!(significant(parsed.text.as_deref()), significant(source.text()), "{}", name.name());
    assert_eq!(significant(parsed.tail.as_deref()), significant(source.tail()), "{}", name.name());

    let children: Vec<_> = source.children().filter(|n| n.is_element()).collect();
    assert_eq!(parsed.children.len(), children.len(), "{}", name.name());
    for (child, source_child) in parsed.children.iter().zip(children) {
        assert_same_tree(child, source_child);
    }
}

#[test]
fn test_attached_tree_matches_source() {
    for name in ["demo.xml", "demo_mcq_root.xml"] {
        let path = fixture(name);
        let result = validator().validate_file(&path);
        assert!(result.is_valid(), "{}: {:?}", name, result.errors);

        let text = std::fs::read_to_string(&path).unwrap();
        let source = roxmltree::Document::parse(&text).unwrap();
        assert_same_tree(&result.document.unwrap().root, source.root_element());
    }
}

#[test]
fn test_schema_messages_carry_lines() {
    let result = validator().validate_file(fixture("demo_err.xml"));
    assert!(!result.is_valid());
    assert!(result.document.is_none());

    let messages: Vec<&str> = result.messages().collect();
    assert!(
        messages
            .iter()
            .any(|m| m.starts_with("Line 5: ") && m.contains("Missing child element(s)")),
        "{:#?}",
        messages
    );
    assert!(
        messages
            .iter()
            .any(|m| m.starts_with("Line 6: ") && m.contains("attribute 'correct'")),
        "{:#?}",
        messages
    );
    assert!(
        messages.iter().any(|m| m.starts_with("Line 9: ")
            && m.contains("essay-question")
            && m.contains("This element is not expected")),
        "{:#?}",
        messages
    );
}

#[test]
fn test_negative_points_rejected() {
    let xml = r#"<map-question xmlns="https://github.com/Hananja/multiconverter" points="-3">
  <text>Pairs</text>
  <mappings><mapping><left>a</left><right>b</right></mapping></mappings>
</map-question>"#;
    let result = validator().validate_str(xml);
    assert!(!result.is_valid());
    assert!(result.messages().any(|m| m.contains("attribute 'points'")));
}

#[test]
fn test_fill_in_requires_a_blank() {
    let xml = r#"<fill-in-question xmlns="https://github.com/Hananja/multiconverter">
  <fill-in-text>No blanks at all</fill-in-text>
</fill-in-question>"#;
    let result = validator().validate_str(xml);
    assert!(!result.is_valid());
    assert!(result.messages().any(|m| m.contains("Missing child element(s)")));
}

#[test]
fn test_wrong_namespace_has_no_declaration() {
    let xml = r#"<questions xmlns="urn:other"><map-question/></questions>"#;
    let result = validator().validate_str(xml);
    assert_eq!(
        result.messages().collect::<Vec<_>>(),
        vec!["Line 1: Element '{urn:other}questions': No matching global declaration available for the validation root."]
    );
}

#[test]
fn test_error_kinds_per_failure() {
    let cases = [
        ("demo_not_existent.xml", ErrorKind::FileNotFound),
        ("demo_wrong_ext.txt", ErrorKind::ExtensionMismatch),
        ("demo_malformed.xml", ErrorKind::MalformedXml),
    ];
    for (name, kind) in cases {
        let result = validator().validate_file(fixture(name));
        assert_eq!(result.errors.len(), 1, "{}", name);
        assert_eq!(result.errors[0].0, kind, "{}", name);
    }
}

#[test]
fn test_report_serializes_without_document() {
    let result = validator().validate_file(fixture("demo_mcq_root.xml"));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["valid"], serde_json::json!(true));
    assert!(json.get("document").is_none());

    let failed = validator().validate_file(fixture("demo_wrong_ext.txt"));
    let json = serde_json::to_value(&failed).unwrap();
    assert_eq!(json["errors"][0][0], serde_json::json!("ExtensionMismatch"));
}
