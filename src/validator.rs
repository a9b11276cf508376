//! Question bank validation
//!
//! [`SchemaValidator`] loads a schema once and checks any number of input
//! files or strings against it. Validation never fails with an error: every
//! problem, from a missing file to a schema violation, is reported inside
//! the returned [`ValidationResult`].

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::documents::Document;
use crate::error::{Error, ErrorKind, Result};
use crate::limits::Limits;
use crate::loaders::Loader;
use crate::validators::XsdSchema;

/// Source name used for string inputs
pub const STRING_SOURCE: &str = "<string>";

/// Outcome of validating one input
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// Path or name of the input
    pub source: String,
    /// Whether the input conforms to the schema
    pub valid: bool,
    /// Problems found, in the order they were detected
    pub errors: Vec<(ErrorKind, String)>,
    /// Parsed document, present only for valid inputs
    #[serde(skip)]
    pub document: Option<Document>,
}

impl ValidationResult {
    fn success(source: impl Into<String>, document: Document) -> Self {
        Self {
            source: source.into(),
            valid: true,
            errors: Vec::new(),
            document: Some(document),
        }
    }

    fn failure(source: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            valid: false,
            errors: vec![(kind, message.into())],
            document: None,
        }
    }

    /// Check if the input is valid
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Kinds of all recorded errors
    pub fn error_kinds(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.errors.iter().map(|(kind, _)| *kind)
    }

    /// Messages of all recorded errors
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(_, message)| message.as_str())
    }
}

/// Validates question bank documents against a loaded schema
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema: Arc<XsdSchema>,
    loader: Loader,
}

impl SchemaValidator {
    /// Load the schema from a file. Failure here is fatal.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_schema(XsdSchema::from_file(path)?))
    }

    /// Load the question bank schema shipped with the crate
    pub fn bundled() -> Result<Self> {
        let mut schema = XsdSchema::from_string(crate::DEFAULT_SCHEMA)?;
        schema.source = Some("questions.xsd".to_string());
        Ok(Self::from_schema(schema))
    }

    /// Wrap an already loaded schema
    pub fn from_schema(schema: XsdSchema) -> Self {
        Self {
            schema: Arc::new(schema),
            loader: Loader::new(),
        }
    }

    /// Use a custom loader (limits and fallback encodings)
    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    /// The loaded schema
    pub fn schema(&self) -> &XsdSchema {
        &self.schema
    }

    fn limits(&self) -> &Limits {
        self.loader.limits()
    }

    /// Validate a file on disk
    pub fn validate_file(&self, path: impl AsRef<Path>) -> ValidationResult {
        let path = path.as_ref();
        let source = path.display().to_string();

        if !path.exists() {
            return ValidationResult::failure(
                &source,
                ErrorKind::FileNotFound,
                format!("File not found: {}", source),
            );
        }
        let is_xml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if !is_xml {
            return ValidationResult::failure(
                &source,
                ErrorKind::ExtensionMismatch,
                format!("File does not have a .xml extension: {}", source),
            );
        }

        let bytes = match self.loader.load_bytes(path) {
            Ok(bytes) => bytes,
            Err(err) => return Self::load_failure(&source, err),
        };

        let result = match self.loader.decode_utf8(&bytes) {
            Some(text) => self.validate_text(&source, &text),
            None => self.validate_legacy(&source, &bytes),
        };
        tracing::debug!(
            source = %result.source,
            valid = result.valid,
            errors = result.errors.len(),
            "validated file"
        );
        result
    }

    fn load_failure(source: &str, err: Error) -> ValidationResult {
        match err {
            Error::Io(io) if io.kind() == io::ErrorKind::PermissionDenied => ValidationResult::failure(
                source,
                ErrorKind::PermissionDenied,
                format!("Permission denied reading file: {}", source),
            ),
            Error::Io(io) if io.kind() == io::ErrorKind::NotFound => ValidationResult::failure(
                source,
                ErrorKind::FileNotFound,
                format!("File not found: {}", source),
            ),
            other => ValidationResult::failure(
                source,
                ErrorKind::Unknown,
                format!("Unexpected error: {}", other),
            ),
        }
    }

    /// Try each fallback encoding until one yields a well-formed document
    fn validate_legacy(&self, source: &str, bytes: &[u8]) -> ValidationResult {
        for (encoding, text) in self.loader.decode_legacy(bytes) {
            match Document::parse_with_limits(&text, self.limits()) {
                Ok(document) => {
                    tracing::warn!(source, encoding, "input is not UTF-8, decoded with fallback encoding");
                    return self.validate_document(source, document);
                }
                Err(err) => {
                    tracing::debug!(source, encoding, error = %err, "fallback encoding rejected");
                }
            }
        }
        ValidationResult::failure(
            source,
            ErrorKind::EncodingFailure,
            "Encoding error: file could not be decoded with any supported encoding",
        )
    }

    /// Validate XML text
    pub fn validate_str(&self, xml: &str) -> ValidationResult {
        self.validate_text(STRING_SOURCE, xml)
    }

    fn validate_text(&self, source: &str, xml: &str) -> ValidationResult {
        if xml.trim().is_empty() {
            return ValidationResult::failure(source, ErrorKind::MalformedXml, "XML document is empty");
        }
        if let Err(err) = self.limits().check_xml_size(xml.len()) {
            return ValidationResult::failure(source, ErrorKind::Unknown, err.to_string());
        }
        match Document::parse_with_limits(xml, self.limits()) {
            Ok(document) => self.validate_document(source, document),
            Err(err) => ValidationResult::failure(
                source,
                ErrorKind::MalformedXml,
                format!("XML syntax error: {}", err),
            ),
        }
    }

    /// Validate an already parsed document
    pub fn validate_document(&self, source: &str, document: Document) -> ValidationResult {
        let violations = self.schema.validate(&document);
        if violations.is_empty() {
            return ValidationResult::success(source, document);
        }
        ValidationResult {
            source: source.to_string(),
            valid: false,
            errors: violations
                .into_iter()
                .map(|v| (ErrorKind::SchemaViolation, v.to_string()))
                .collect(),
            document: None,
        }
    }

    /// Validate every path independently, keeping input order
    pub fn validate_many<P: AsRef<Path>>(
        &self,
        paths: impl IntoIterator<Item = P>,
    ) -> IndexMap<PathBuf, ValidationResult> {
        paths
            .into_iter()
            .map(|path| {
                let path = path.as_ref();
                (path.to_path_buf(), self.validate_file(path))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"<questions xmlns="https://github.com/Hananja/multiconverter">
  <multiple-choice-question>
    <text>Pick one</text>
    <options>
      <option correct="false">A</option>
      <option correct="true">B</option>
    </options>
  </multiple-choice-question>
</questions>"#;

    fn validator() -> SchemaValidator {
        SchemaValidator::bundled().unwrap()
    }

    fn xml_file(content: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_valid_string_attaches_document() {
        let result = validator().validate_str(VALID);
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.errors.is_empty());
        assert_eq!(
            result.document.unwrap().root.local_name(),
            "questions"
        );
    }

    #[test]
    fn test_empty_string_is_malformed() {
        let result = validator().validate_str("   \n");
        assert!(!result.is_valid());
        assert_eq!(result.error_kinds().collect::<Vec<_>>(), vec![ErrorKind::MalformedXml]);
    }

    #[test]
    fn test_schema_violations_carry_lines() {
        let xml = "<questions xmlns=\"https://github.com/Hananja/multiconverter\">\n<essay/>\n</questions>";
        let result = validator().validate_str(xml);
        assert!(!result.is_valid());
        assert!(result.document.is_none());
        assert!(result.error_kinds().all(|k| k == ErrorKind::SchemaViolation));
        assert!(result.messages().next().unwrap().starts_with("Line 2: "));
    }

    #[test]
    fn test_missing_file() {
        let result = validator().validate_file("/no/such/bank.xml");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].0, ErrorKind::FileNotFound);
        assert!(result.document.is_none());
    }

    #[test]
    fn test_wrong_extension() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();
        let result = validator().validate_file(file.path());
        assert_eq!(result.errors[0].0, ErrorKind::ExtensionMismatch);
    }

    #[test]
    fn test_latin1_file_falls_back() {
        let german = VALID.replace("Pick one", "Wähle eine");
        let (encoded, _, _) = encoding_rs::WINDOWS_1252.encode(&german);
        let file = xml_file(&encoded);
        let result = validator().validate_file(file.path());
        assert!(result.is_valid(), "{:?}", result.errors);
        let doc = result.document.unwrap();
        let text = doc.root.children[0].find_child("text").unwrap();
        assert_eq!(text.text.as_deref(), Some("Wähle eine"));
    }

    #[test]
    fn test_undecodable_file_is_encoding_failure() {
        let validator = validator().with_loader(Loader::new().with_legacy_encodings(Vec::new()));
        let file = xml_file(b"<questions>\xff\xfe</questions>");
        let result = validator.validate_file(file.path());
        assert_eq!(result.errors[0].0, ErrorKind::EncodingFailure);
    }

    #[test]
    fn test_load_failures_map_to_kinds() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let result = SchemaValidator::load_failure("bank.xml", Error::Io(denied));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].0, ErrorKind::PermissionDenied);
        assert_eq!(result.errors[0].1, "Permission denied reading file: bank.xml");
        assert!(result.document.is_none());

        let vanished = io::Error::new(io::ErrorKind::NotFound, "gone");
        let result = SchemaValidator::load_failure("bank.xml", Error::Io(vanished));
        assert_eq!(result.errors[0].0, ErrorKind::FileNotFound);

        let result = SchemaValidator::load_failure("bank.xml", Error::Other("boom".into()));
        assert_eq!(result.errors[0].0, ErrorKind::Unknown);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let file = xml_file(VALID.as_bytes());
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o000)).unwrap();
        // root ignores file modes
        if std::fs::read(file.path()).is_ok() {
            return;
        }
        let result = validator().validate_file(file.path());
        assert_eq!(result.errors[0].0, ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_malformed_file() {
        let file = xml_file(b"<questions><unclosed></questions>");
        let result = validator().validate_file(file.path());
        assert_eq!(result.errors[0].0, ErrorKind::MalformedXml);
    }

    #[test]
    fn test_oversized_input_is_unknown() {
        let loader = Loader::new().with_limits(Limits {
            max_xml_size: 16,
            ..Limits::default()
        });
        let result = validator().with_loader(loader).validate_str(VALID);
        assert_eq!(result.errors[0].0, ErrorKind::Unknown);
    }

    #[test]
    fn test_validate_many_keeps_every_input() {
        let good = xml_file(VALID.as_bytes());
        let paths = vec![
            PathBuf::from("/missing/one.xml"),
            good.path().to_path_buf(),
        ];
        let results = validator().validate_many(&paths);
        assert_eq!(results.len(), 2);
        let order: Vec<_> = results.keys().cloned().collect();
        assert_eq!(order, paths);
        assert!(!results[0].is_valid());
        assert!(results[1].is_valid());
    }
}
