//! Limits for input document processing
//!
//! Question banks are small; these bounds keep a stray multi-gigabyte or
//! pathologically nested file from exhausting memory or stack.

use crate::error::{Error, Result};

/// Input processing limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum element nesting depth
    pub max_xml_depth: usize,

    /// Maximum input size in bytes
    pub max_xml_size: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 256,
            max_xml_size: 64 * 1024 * 1024, // 64 MB
            max_attributes: 256,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 64,
            max_xml_size: 4 * 1024 * 1024, // 4 MB
            max_attributes: 32,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 4096,
            max_xml_size: 1024 * 1024 * 1024, // 1 GB
            max_attributes: 4096,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if XML size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the attribute count of one element is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            Err(Error::LimitExceeded(format!(
                "{} attributes exceed maximum {}",
                count, self.max_attributes
            )))
        } else {
            Ok(())
        }
    }
}
