//! Batch conversion
//!
//! All inputs are validated before any of them is transformed. A single
//! invalid input stops the run with [`Error::Validation`] carrying every
//! failing result; otherwise every question of every input is transformed
//! in order and one archive is produced.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::config::ConverterConfig;
use crate::error::{Error, Result};
use crate::manifest::ManifestBuilder;
use crate::package::PackageAssembler;
use crate::templates::Renderer;
use crate::transform::QuestionTransformer;
use crate::validator::{SchemaValidator, ValidationResult};

/// Outcome of a successful conversion
#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// Assessment identifiers in package order
    pub item_identifiers: Vec<String>,
    /// Rendered manifest
    pub manifest: String,
    /// Zip archive bytes
    pub archive: Vec<u8>,
}

/// Validates, transforms and packages question banks
#[derive(Debug)]
pub struct Converter {
    validator: SchemaValidator,
    renderer: Renderer,
    config: ConverterConfig,
}

impl Converter {
    /// Create a converter. Fails when the schema cannot be loaded.
    pub fn new(config: ConverterConfig) -> Result<Self> {
        let validator = match &config.schema_path {
            Some(path) => SchemaValidator::from_file(path)?,
            None => SchemaValidator::bundled()?,
        }
        .with_loader(config.loader());

        Ok(Self {
            validator,
            renderer: Renderer::new()?,
            config,
        })
    }

    /// The schema validator in use
    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    /// Validate every input without converting
    pub fn validate<P: AsRef<Path>>(
        &self,
        paths: impl IntoIterator<Item = P>,
    ) -> IndexMap<PathBuf, ValidationResult> {
        self.validator.validate_many(paths)
    }

    /// Convert the inputs and return the archive bytes
    pub fn convert<P: AsRef<Path>>(&self, paths: impl IntoIterator<Item = P>) -> Result<Vec<u8>> {
        Ok(self.convert_with_report(paths)?.archive)
    }

    /// Convert the inputs, returning identifiers, manifest and archive
    pub fn convert_with_report<P: AsRef<Path>>(
        &self,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<ConversionReport> {
        let results = self.validate(paths);
        let failed: Vec<ValidationResult> = results
            .values()
            .filter(|result| !result.is_valid())
            .cloned()
            .collect();
        if !failed.is_empty() {
            tracing::warn!(failed = failed.len(), total = results.len(), "validation failed");
            return Err(Error::Validation(failed));
        }

        let mut transformer = QuestionTransformer::new(&self.renderer);
        for result in results.values() {
            let document = result.document.as_ref().ok_or_else(|| {
                Error::Other(format!("no parsed document for '{}'", result.source))
            })?;
            transformer.transform_document(document)?;
        }
        let registry = transformer.into_registry();

        let manifest = ManifestBuilder::new(&self.renderer)
            .with_prefix(self.config.manifest_prefix.as_str())
            .build(&registry)?;
        let archive = PackageAssembler::new().assemble(&registry, &manifest)?;

        Ok(ConversionReport {
            item_identifiers: registry.identifiers().map(str::to_string).collect(),
            manifest,
            archive,
        })
    }

    /// Convert the inputs and write the archive to `output`
    pub fn convert_to_file<P: AsRef<Path>>(
        &self,
        output: impl AsRef<Path>,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<ConversionReport> {
        let report = self.convert_with_report(paths)?;
        fs::write(output.as_ref(), &report.archive)?;
        tracing::info!(
            output = %output.as_ref().display(),
            items = report.item_identifiers.len(),
            "archive written"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn bank(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const MATCHING: &str = r#"<map-question xmlns="https://github.com/Hananja/multiconverter">
  <text>Capitals</text>
  <mappings>
    <mapping><left>France</left><right>Paris</right></mapping>
    <mapping><left>Italy</left><right>Rome</right></mapping>
  </mappings>
</map-question>"#;

    #[test]
    fn test_single_question_root_converts() {
        let converter = Converter::new(ConverterConfig::new()).unwrap();
        let file = bank(MATCHING);
        let report = converter.convert_with_report([file.path()]).unwrap();
        assert_eq!(report.item_identifiers, vec!["item-00001"]);
        assert!(report.manifest.contains("llm-multiconverter-"));
        assert!(!report.archive.is_empty());
    }

    #[test]
    fn test_invalid_input_stops_before_transformation() {
        let converter = Converter::new(ConverterConfig::new()).unwrap();
        let good = bank(MATCHING);
        let missing = PathBuf::from("/no/such/input.xml");
        let err = converter
            .convert([good.path().to_path_buf(), missing.clone()])
            .unwrap_err();
        match err {
            Error::Validation(failed) => {
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].source, missing.display().to_string());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_schema_is_fatal() {
        let config = ConverterConfig::new().with_schema_path("/no/such/schema.xsd");
        assert!(Converter::new(config).is_err());
    }

    #[test]
    fn test_manifest_prefix_from_config() {
        let converter =
            Converter::new(ConverterConfig::new().with_manifest_prefix("bank")).unwrap();
        let file = bank(MATCHING);
        let report = converter.convert_with_report([file.path()]).unwrap();
        assert!(report.manifest.contains(r#"identifier="bank-"#));
    }
}
