//! Converter configuration

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;

use crate::limits::Limits;
use crate::loaders::{default_legacy_encodings, Loader};
use crate::manifest::DEFAULT_MANIFEST_PREFIX;

/// Settings of a [`crate::convert::Converter`]
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Schema file; the bundled schema is used when unset
    pub schema_path: Option<PathBuf>,
    /// Input limits
    pub limits: Limits,
    /// Prefix of the package identifier
    pub manifest_prefix: String,
    /// Encodings tried after UTF-8, in order
    pub legacy_encodings: Vec<&'static Encoding>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            schema_path: None,
            limits: Limits::default(),
            manifest_prefix: DEFAULT_MANIFEST_PREFIX.to_string(),
            legacy_encodings: default_legacy_encodings(),
        }
    }
}

impl ConverterConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate against a schema file instead of the bundled schema
    pub fn with_schema_path(mut self, path: impl AsRef<Path>) -> Self {
        self.schema_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the input limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the package identifier prefix
    pub fn with_manifest_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.manifest_prefix = prefix.into();
        self
    }

    /// Set the fallback encodings
    pub fn with_legacy_encodings(mut self, encodings: Vec<&'static Encoding>) -> Self {
        self.legacy_encodings = encodings;
        self
    }

    /// Loader carrying these limits and encodings
    pub fn loader(&self) -> Loader {
        Loader::new()
            .with_limits(self.limits.clone())
            .with_legacy_encodings(self.legacy_encodings.clone())
    }
}
