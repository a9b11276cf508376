//! XSD particle occurrence bounds
//!
//! Reference: https://www.w3.org/TR/xmlschema-1/#p

use std::fmt;

/// Occurrence bounds for a particle (minOccurs, maxOccurs)
/// None for max means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    pub max: Option<u32>,
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// One or more (1, unbounded)
    pub fn one_or_more() -> Self {
        Self { min: 1, max: None }
    }

    /// Check if this particle can be empty (minOccurs == 0)
    pub fn is_emptiable(&self) -> bool {
        self.min == 0
    }

    /// Check if this particle is empty (maxOccurs == 0)
    pub fn is_empty(&self) -> bool {
        self.max == Some(0)
    }

    /// Check if `count` more repetitions are still allowed
    pub fn allows(&self, count: u32) -> bool {
        self.max.map_or(true, |max| count <= max)
    }

    /// Parse minOccurs/maxOccurs attribute values
    pub fn parse(min: Option<&str>, max: Option<&str>) -> Result<Self, String> {
        let min = match min {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid minOccurs '{}'", value))?,
            None => 1,
        };
        let max = match max.map(str::trim) {
            Some("unbounded") => None,
            Some(value) => Some(
                value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid maxOccurs '{}'", value))?,
            ),
            None => Some(1),
        };
        if let Some(max) = max {
            if min > max {
                return Err(format!("minOccurs {} is greater than maxOccurs {}", min, max));
            }
        }
        Ok(Self { min, max })
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{{{}, {}}}", self.min, max),
            None => write!(f, "{{{}, unbounded}}", self.min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        assert_eq!(Occurs::parse(None, None).unwrap(), Occurs::once());
        assert_eq!(Occurs::parse(Some("0"), None).unwrap(), Occurs::optional());
        assert_eq!(
            Occurs::parse(Some("1"), Some("unbounded")).unwrap(),
            Occurs::one_or_more()
        );
    }

    #[test]
    fn test_parse_rejects_bad_bounds() {
        assert!(Occurs::parse(Some("3"), Some("2")).is_err());
        assert!(Occurs::parse(Some("-1"), None).is_err());
        assert!(Occurs::parse(None, Some("many")).is_err());
    }

    #[test]
    fn test_bounds() {
        let occurs = Occurs::new(2, Some(3));
        assert!(!occurs.is_emptiable());
        assert!(occurs.allows(3));
        assert!(!occurs.allows(4));
        assert!(Occurs::zero_or_more().allows(1000));
        assert!(Occurs::new(0, Some(0)).is_empty());
        assert_eq!(Occurs::zero_or_more().to_string(), "{0, unbounded}");
    }
}
