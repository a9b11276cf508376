//! XSD constraining facets
//!
//! Facets restrict the value space of a simple type. Facets from different
//! derivation steps are checked independently (all must hold); multiple
//! patterns within one step are alternatives.

use regex::Regex;
use rust_decimal::Decimal;

use super::builtins::BuiltinType;
use crate::error::ParseError;

/// XSD whiteSpace handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteSpace {
    /// Preserve all white space
    Preserve,
    /// Replace tabs and newlines with spaces
    Replace,
    /// Replace and collapse multiple spaces
    Collapse,
}

impl WhiteSpace {
    /// Normalize a value according to this mode
    pub fn normalize(&self, s: &str) -> String {
        match self {
            WhiteSpace::Preserve => s.to_string(),
            WhiteSpace::Replace => s.replace(['\t', '\n', '\r'], " "),
            WhiteSpace::Collapse => s
                .split(|c: char| c == ' ' || c == '\t' || c == '\n' || c == '\r')
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// A single constraining facet
#[derive(Debug, Clone)]
pub enum Facet {
    /// Allowed literal values
    Enumeration(Vec<String>),
    /// Alternative patterns, compiled and anchored
    Pattern(Vec<(String, Regex)>),
    /// Exact length in characters
    Length(usize),
    /// Minimum length in characters
    MinLength(usize),
    /// Maximum length in characters
    MaxLength(usize),
    /// Inclusive lower bound
    MinInclusive(Decimal),
    /// Inclusive upper bound
    MaxInclusive(Decimal),
    /// Exclusive lower bound
    MinExclusive(Decimal),
    /// Exclusive upper bound
    MaxExclusive(Decimal),
}

impl Facet {
    /// Compile an XSD pattern. XSD patterns are implicitly anchored.
    pub fn compile_pattern(source: &str) -> Result<(String, Regex), ParseError> {
        let anchored = format!("^(?:{})$", source);
        Regex::new(&anchored)
            .map(|regex| (source.to_string(), regex))
            .map_err(|e| ParseError::new(format!("Invalid pattern '{}': {}", source, e)))
    }

    /// Check a normalized value against this facet
    pub fn check(&self, value: &str, primitive: BuiltinType) -> Result<(), String> {
        let length = || value.chars().count();
        let number = || {
            primitive.to_decimal(value).ok_or_else(|| {
                format!("'{}' is not a valid value of the atomic type '{}'.", value, primitive.name())
            })
        };

        match self {
            Facet::Enumeration(values) => {
                if values.iter().any(|v| v == value) {
                    return Ok(());
                }
                let set = values
                    .iter()
                    .map(|v| format!("'{}'", v))
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(format!(
                    "[facet 'enumeration'] The value '{}' is not an element of the set {{{}}}.",
                    value, set
                ))
            }
            Facet::Pattern(patterns) => {
                if patterns.iter().any(|(_, regex)| regex.is_match(value)) {
                    return Ok(());
                }
                let sources = patterns
                    .iter()
                    .map(|(source, _)| source.as_str())
                    .collect::<Vec<_>>()
                    .join("|");
                Err(format!(
                    "[facet 'pattern'] The value '{}' is not accepted by the pattern '{}'.",
                    value, sources
                ))
            }
            Facet::Length(expected) => {
                let actual = length();
                if actual == *expected {
                    Ok(())
                } else {
                    Err(format!(
                        "[facet 'length'] The value has a length of '{}'; this differs from the allowed length of '{}'.",
                        actual, expected
                    ))
                }
            }
            Facet::MinLength(min) => {
                let actual = length();
                if actual >= *min {
                    Ok(())
                } else {
                    Err(format!(
                        "[facet 'minLength'] The value has a length of '{}'; this underruns the allowed minimum length of '{}'.",
                        actual, min
                    ))
                }
            }
            Facet::MaxLength(max) => {
                let actual = length();
                if actual <= *max {
                    Ok(())
                } else {
                    Err(format!(
                        "[facet 'maxLength'] The value has a length of '{}'; this exceeds the allowed maximum length of '{}'.",
                        actual, max
                    ))
                }
            }
            Facet::MinInclusive(bound) => {
                if number()? >= *bound {
                    Ok(())
                } else {
                    Err(format!(
                        "[facet 'minInclusive'] The value '{}' is less than the minimum value allowed ('{}').",
                        value, bound
                    ))
                }
            }
            Facet::MaxInclusive(bound) => {
                if number()? <= *bound {
                    Ok(())
                } else {
                    Err(format!(
                        "[facet 'maxInclusive'] The value '{}' is greater than the maximum value allowed ('{}').",
                        value, bound
                    ))
                }
            }
            Facet::MinExclusive(bound) => {
                if number()? > *bound {
                    Ok(())
                } else {
                    Err(format!(
                        "[facet 'minExclusive'] The value '{}' must be greater than '{}'.",
                        value, bound
                    ))
                }
            }
            Facet::MaxExclusive(bound) => {
                if number()? < *bound {
                    Ok(())
                } else {
                    Err(format!(
                        "[facet 'maxExclusive'] The value '{}' must be less than '{}'.",
                        value, bound
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_white_space_normalization() {
        assert_eq!(WhiteSpace::Preserve.normalize(" a\tb "), " a\tb ");
        assert_eq!(WhiteSpace::Replace.normalize("a\tb\n"), "a b ");
        assert_eq!(WhiteSpace::Collapse.normalize("  a \t\n b  "), "a b");
    }

    #[test]
    fn test_enumeration() {
        let facet = Facet::Enumeration(vec!["easy".into(), "hard".into()]);
        assert!(facet.check("easy", BuiltinType::String).is_ok());
        let err = facet.check("medium", BuiltinType::String).unwrap_err();
        assert!(err.contains("{'easy', 'hard'}"));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let facet = Facet::Pattern(vec![Facet::compile_pattern("[A-Z]{2}").unwrap()]);
        assert!(facet.check("AB", BuiltinType::String).is_ok());
        assert!(facet.check("ABC", BuiltinType::String).is_err());
        assert!(Facet::compile_pattern("(").is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(Facet::MaxLength(3).check("äöü", BuiltinType::String).is_ok());
        assert!(Facet::MinLength(1).check("", BuiltinType::String).is_err());
        assert!(Facet::Length(2).check("ab", BuiltinType::String).is_ok());
    }

    #[test]
    fn test_numeric_bounds() {
        let max = Facet::MaxInclusive(Decimal::from_str("10").unwrap());
        assert!(max.check("10", BuiltinType::Integer).is_ok());
        assert!(max.check("11", BuiltinType::Integer).is_err());
        let min = Facet::MinExclusive(Decimal::from_str("0").unwrap());
        assert!(min.check("0", BuiltinType::Integer).is_err());
    }
}
