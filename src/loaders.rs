//! Resource loading utilities
//!
//! Reads input documents from disk and decodes them. UTF-8 is always tried
//! first; the configured legacy single-byte encodings are offered as
//! fallbacks in order when the bytes are not valid UTF-8.

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, ISO_8859_15, WINDOWS_1252};

use crate::error::Result;
use crate::limits::Limits;

/// UTF-8 byte order mark
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Fallback encodings tried, in order, after UTF-8 fails
pub fn default_legacy_encodings() -> Vec<&'static Encoding> {
    vec![WINDOWS_1252, ISO_8859_15]
}

/// Resource loader for documents
#[derive(Debug, Clone)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
    /// Fallback encodings
    legacy_encodings: Vec<&'static Encoding>,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            legacy_encodings: default_legacy_encodings(),
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the fallback encodings
    pub fn with_legacy_encodings(mut self, encodings: Vec<&'static Encoding>) -> Self {
        self.legacy_encodings = encodings;
        self
    }

    /// The active limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Load a file as raw bytes.
    ///
    /// I/O failures are returned as [`crate::Error::Io`] so callers can
    /// inspect the underlying [`std::io::ErrorKind`].
    pub fn load_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        let metadata = fs::metadata(path)?;
        self.limits.check_xml_size(metadata.len() as usize)?;

        let content = fs::read(path)?;
        self.limits.check_xml_size(content.len())?;
        Ok(content)
    }

    /// Decode bytes as UTF-8, skipping a leading byte order mark.
    ///
    /// Returns `None` when the bytes are not valid UTF-8.
    pub fn decode_utf8(&self, bytes: &[u8]) -> Option<String> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        std::str::from_utf8(bytes).ok().map(str::to_owned)
    }

    /// Decode bytes with each fallback encoding in turn.
    ///
    /// Encodings that cannot represent the input are skipped.
    pub fn decode_legacy<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> impl Iterator<Item = (&'static str, String)> + 'a {
        self.legacy_encodings.iter().filter_map(move |encoding| {
            encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| (encoding.name(), text.into_owned()))
        })
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
