//! XML Validation Infrastructure
//!
//! The context that collects schema violations while a document is walked.

use std::fmt;

use serde::Serialize;

/// One complaint raised while validating an instance document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    /// 1-based line of the offending element
    pub line: usize,
    /// Human readable message
    pub message: String,
}

impl SchemaViolation {
    /// Create a violation
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

/// Validation context for handling the validation process
///
/// Stores the violations found so far and the current nesting level.
#[derive(Debug, Default)]
pub struct ValidationContext {
    /// Collected validation errors, in document order
    pub errors: Vec<SchemaViolation>,
    /// Current nesting level
    pub level: usize,
}

impl ValidationContext {
    /// Create a new validation context
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation
    pub fn add_error(&mut self, line: usize, message: impl Into<String>) {
        self.errors.push(SchemaViolation::new(line, message));
    }

    /// Check if any violation has been recorded
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Enter a child element
    pub fn push_level(&mut self) {
        self.level += 1;
    }

    /// Leave a child element
    pub fn pop_level(&mut self) {
        self.level = self.level.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display() {
        let violation = SchemaViolation::new(7, "Missing child element(s).");
        assert_eq!(violation.to_string(), "Line 7: Missing child element(s).");
    }

    #[test]
    fn test_context_collects_in_order() {
        let mut context = ValidationContext::new();
        assert!(!context.has_errors());
        context.add_error(3, "first");
        context.add_error(1, "second");
        assert_eq!(context.errors.len(), 2);
        assert_eq!(context.errors[0].message, "first");

        context.push_level();
        context.pop_level();
        context.pop_level();
        assert_eq!(context.level, 0);
    }
}
