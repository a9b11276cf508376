//! Content package assembly
//!
//! Writes one deflate-compressed zip archive holding every item document
//! and the manifest. The archive is built in memory.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::transform::ItemRegistry;

/// Archive entry name of the manifest
pub const MANIFEST_ENTRY: &str = "imsmanifest.xml";

/// Archive entry name of an item
pub fn item_entry_name(identifier: &str) -> String {
    format!("{}.xml", identifier)
}

/// Bundles items and manifest into a zip archive
#[derive(Debug, Clone, Copy)]
pub struct PackageAssembler {
    compression: CompressionMethod,
}

impl PackageAssembler {
    /// Create an assembler using deflate compression
    pub fn new() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }

    /// Set the compression method
    pub fn with_compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    /// Build the archive: one entry per item in registry order, then the manifest
    pub fn assemble(&self, registry: &ItemRegistry, manifest: &str) -> Result<Vec<u8>> {
        let options = SimpleFileOptions::default().compression_method(self.compression);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for (identifier, fragments) in registry.iter() {
            zip.start_file(item_entry_name(identifier), options)?;
            zip.write_all(fragments.item.as_bytes())?;
        }
        zip.start_file(MANIFEST_ENTRY, options)?;
        zip.write_all(manifest.as_bytes())?;

        let archive = zip.finish()?.into_inner();
        tracing::info!(
            entries = registry.len() + 1,
            bytes = archive.len(),
            "package assembled"
        );
        Ok(archive)
    }
}

impl Default for PackageAssembler {
    fn default() -> Self {
        Self::new()
    }
}
