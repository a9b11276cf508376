//! # qtipack
//!
//! Converts XML question banks into QTI 2.1 content packages.
//!
//! A run validates every input against an XSD schema, turns each question
//! (multiple choice, fill-in-the-blank, matching) into an assessment item,
//! composes the `imsmanifest.xml` listing them and zips everything into a
//! single archive.
//!
//! ## Features
//!
//! - XSD subset validation with line-numbered messages
//! - UTF-8 input with legacy single-byte fallbacks
//! - Deterministic item identifiers (`item-00001`, ...)
//! - Bundled question bank schema
//! - Protection against oversized and deeply nested input
//!
//! ## Example
//!
//! ```rust,ignore
//! use qtipack::{Converter, ConverterConfig};
//!
//! let converter = Converter::new(ConverterConfig::new())?;
//! let archive = converter.convert(["bank.xml"])?;
//! std::fs::write("bank.zip", archive)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;
pub mod namespaces;

// Input
pub mod loaders;
pub mod documents;

// Validation
pub mod validators;
pub mod validator;

// Transformation
pub mod escaping;
pub mod identifiers;
pub mod questions;
pub mod templates;
pub mod transform;

// Packaging
pub mod manifest;
pub mod package;

// Orchestration
pub mod config;
pub mod convert;

// Utilities
pub mod minify;

// Re-exports for convenience
pub use config::ConverterConfig;
pub use convert::{ConversionReport, Converter};
pub use error::{Error, ErrorKind, Result};
pub use validator::{SchemaValidator, ValidationResult};

/// Version of the qtipack library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD 1.0 namespace
pub const XSD_NAMESPACE: &str = validators::XSD_NAMESPACE;

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace of the bundled question bank schema
pub const QUESTIONS_NAMESPACE: &str = "https://github.com/Hananja/multiconverter";

/// The bundled question bank schema
pub const DEFAULT_SCHEMA: &str = include_str!("../schemas/questions.xsd");
