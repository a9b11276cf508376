//! Manifest composition

use uuid::Uuid;

use crate::error::Result;
use crate::templates::{ManifestContext, Renderer};
use crate::transform::ItemRegistry;

/// Default prefix of package identifiers
pub const DEFAULT_MANIFEST_PREFIX: &str = "llm-multiconverter";

/// Builds the package manifest from the fragments in a registry
#[derive(Debug)]
pub struct ManifestBuilder<'r> {
    renderer: &'r Renderer,
    prefix: String,
}

impl<'r> ManifestBuilder<'r> {
    /// Create a builder using the default identifier prefix
    pub fn new(renderer: &'r Renderer) -> Self {
        Self {
            renderer,
            prefix: DEFAULT_MANIFEST_PREFIX.to_string(),
        }
    }

    /// Set the package identifier prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// A fresh, collision resistant package identifier
    pub fn new_identifier(&self) -> String {
        format!("{}-{}", self.prefix, Uuid::new_v4())
    }

    /// Compose the manifest with a newly generated package identifier
    pub fn build(&self, registry: &ItemRegistry) -> Result<String> {
        self.build_with_identifier(registry, &self.new_identifier())
    }

    /// Compose the manifest with the given package identifier
    pub fn build_with_identifier(&self, registry: &ItemRegistry, identifier: &str) -> Result<String> {
        let context = ManifestContext {
            manifest_identifier: identifier.to_string(),
            resources: registry.manifest_fragments().map(str::to_string).collect(),
        };
        let manifest = self.renderer.render_manifest(&context)?;
        tracing::info!(
            identifier,
            resources = registry.len(),
            "manifest built"
        );
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;
    use crate::questions::{ChoiceOption, Question};
    use crate::transform::QuestionTransformer;

    fn registry(renderer: &Renderer, count: usize) -> ItemRegistry {
        let mut transformer = QuestionTransformer::new(renderer);
        for i in 0..count {
            transformer
                .transform(&Question::MultipleChoice {
                    prose: format!("Question {}", i),
                    options: vec![ChoiceOption {
                        correct: true,
                        text: Some("yes".into()),
                    }],
                })
                .unwrap();
        }
        transformer.into_registry()
    }

    #[test]
    fn test_identifier_format() {
        let renderer = Renderer::new().unwrap();
        let builder = ManifestBuilder::new(&renderer);
        let id = builder.new_identifier();
        let uuid = id.strip_prefix("llm-multiconverter-").unwrap();
        assert!(Uuid::parse_str(uuid).is_ok());
        assert_ne!(id, builder.new_identifier());

        let custom = ManifestBuilder::new(&renderer).with_prefix("bank");
        assert!(custom.new_identifier().starts_with("bank-"));
    }

    #[test]
    fn test_manifest_lists_registry_in_order() {
        let renderer = Renderer::new().unwrap();
        let registry = registry(&renderer, 3);
        let manifest = ManifestBuilder::new(&renderer)
            .build_with_identifier(&registry, "pkg-1")
            .unwrap();

        let doc = Document::from_string(&manifest).unwrap();
        assert_eq!(doc.root.get_attribute("identifier"), Some("pkg-1"));
        let hrefs: Vec<_> = doc
            .root
            .find_child("resources")
            .unwrap()
            .find_children("resource")
            .filter_map(|r| r.get_attribute("href"))
            .collect();
        assert_eq!(hrefs, vec!["item-00001.xml", "item-00002.xml", "item-00003.xml"]);
    }

    #[test]
    fn test_empty_registry_renders_empty_resources() {
        let renderer = Renderer::new().unwrap();
        let manifest = ManifestBuilder::new(&renderer)
            .build(&ItemRegistry::new())
            .unwrap();
        let doc = Document::from_string(&manifest).unwrap();
        assert_eq!(
            doc.root.find_child("resources").unwrap().children.len(),
            0
        );
    }
}
