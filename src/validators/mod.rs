//! XML Schema validators
//!
//! This module contains the XSD subset used to check question banks:
//! schema components, the schema parser and the instance validator.

// Type system
pub mod builtins;
pub mod facets;
pub mod particles;
pub mod simple_types;
pub mod attributes;

// Complex structures
pub mod groups;
pub mod models;
pub mod complex_types;
pub mod elements;

// Schema and validation
pub mod schemas;
pub mod parsing;
pub mod validation;
pub mod document_validation;

// Re-exports
pub use builtins::{BuiltinType, XSD_NAMESPACE, XSI_NAMESPACE};
pub use models::{ContentMatcher, ModelOutcome};
pub use schemas::{FormDefault, GlobalType, XsdSchema};
pub use validation::{SchemaViolation, ValidationContext};
