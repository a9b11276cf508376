//! XSD built-in types
//!
//! The subset of the XSD 1.0 built-in datatypes that question-bank schemas
//! use. Each type knows its whitespace normalization and how to check a
//! lexical value.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use super::facets::WhiteSpace;

/// XSD namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XSI namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)$").unwrap());

static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{N}_\-.\u{B7}\u{300}-\u{36F}\u{203F}-\u{2040}]*$").unwrap()
});

static TIMEZONE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Z|[+-](0[0-9]|1[0-4]):[0-5][0-9])$").unwrap());

/// Built-in XSD datatypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// xs:anyType (elements only)
    AnyType,
    /// xs:anySimpleType
    AnySimpleType,
    /// xs:string
    String,
    /// xs:normalizedString
    NormalizedString,
    /// xs:token
    Token,
    /// xs:NCName
    NcName,
    /// xs:anyURI
    AnyUri,
    /// xs:boolean
    Boolean,
    /// xs:decimal
    Decimal,
    /// xs:integer
    Integer,
    /// xs:long
    Long,
    /// xs:int
    Int,
    /// xs:nonNegativeInteger
    NonNegativeInteger,
    /// xs:positiveInteger
    PositiveInteger,
    /// xs:date
    Date,
    /// xs:dateTime
    DateTime,
}

impl BuiltinType {
    /// Look up a built-in by its local name in the XSD namespace
    pub fn from_local_name(name: &str) -> Option<Self> {
        let builtin = match name {
            "anyType" => Self::AnyType,
            "anySimpleType" => Self::AnySimpleType,
            "string" => Self::String,
            "normalizedString" => Self::NormalizedString,
            "token" => Self::Token,
            "NCName" => Self::NcName,
            "anyURI" => Self::AnyUri,
            "boolean" => Self::Boolean,
            "decimal" => Self::Decimal,
            "integer" => Self::Integer,
            "long" => Self::Long,
            "int" => Self::Int,
            "nonNegativeInteger" => Self::NonNegativeInteger,
            "positiveInteger" => Self::PositiveInteger,
            "date" => Self::Date,
            "dateTime" => Self::DateTime,
            _ => return None,
        };
        Some(builtin)
    }

    /// Prefixed name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::AnyType => "xs:anyType",
            Self::AnySimpleType => "xs:anySimpleType",
            Self::String => "xs:string",
            Self::NormalizedString => "xs:normalizedString",
            Self::Token => "xs:token",
            Self::NcName => "xs:NCName",
            Self::AnyUri => "xs:anyURI",
            Self::Boolean => "xs:boolean",
            Self::Decimal => "xs:decimal",
            Self::Integer => "xs:integer",
            Self::Long => "xs:long",
            Self::Int => "xs:int",
            Self::NonNegativeInteger => "xs:nonNegativeInteger",
            Self::PositiveInteger => "xs:positiveInteger",
            Self::Date => "xs:date",
            Self::DateTime => "xs:dateTime",
        }
    }

    /// Whitespace handling applied before lexical checks
    pub fn white_space(&self) -> WhiteSpace {
        match self {
            Self::AnyType | Self::AnySimpleType | Self::String => WhiteSpace::Preserve,
            Self::NormalizedString => WhiteSpace::Replace,
            _ => WhiteSpace::Collapse,
        }
    }

    /// True for types whose values are ordered numbers
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Decimal
                | Self::Integer
                | Self::Long
                | Self::Int
                | Self::NonNegativeInteger
                | Self::PositiveInteger
        )
    }

    /// Check an already normalized lexical value
    pub fn validate(&self, value: &str) -> Result<(), String> {
        let valid = match self {
            Self::AnyType | Self::AnySimpleType | Self::String => true,
            Self::NormalizedString => !value.contains(['\t', '\n', '\r']),
            Self::Token => {
                !value.contains(['\t', '\n', '\r'])
                    && !value.starts_with(' ')
                    && !value.ends_with(' ')
                    && !value.contains("  ")
            }
            Self::NcName => NCNAME.is_match(value),
            Self::AnyUri => !value.chars().any(|c| c.is_control()),
            Self::Boolean => matches!(value, "true" | "false" | "1" | "0"),
            Self::Decimal => DECIMAL.is_match(value),
            Self::Integer => INTEGER.is_match(value),
            Self::Long => INTEGER.is_match(value) && value.parse::<i64>().is_ok(),
            Self::Int => INTEGER.is_match(value) && value.parse::<i32>().is_ok(),
            Self::NonNegativeInteger => {
                INTEGER.is_match(value)
                    && (!value.starts_with('-') || value[1..].bytes().all(|b| b == b'0'))
            }
            Self::PositiveInteger => {
                INTEGER.is_match(value)
                    && !value.starts_with('-')
                    && value.bytes().any(|b| (b'1'..=b'9').contains(&b))
            }
            Self::Date => {
                let date = TIMEZONE_SUFFIX.replace(value, "");
                NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok()
            }
            Self::DateTime => {
                DateTime::parse_from_rfc3339(value).is_ok()
                    || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
            }
        };

        if valid {
            Ok(())
        } else {
            Err(format!(
                "'{}' is not a valid value of the atomic type '{}'.",
                value,
                self.name()
            ))
        }
    }

    /// Numeric value for range facets
    pub fn to_decimal(&self, value: &str) -> Option<Decimal> {
        if !self.is_numeric() {
            return None;
        }
        let value = value.strip_prefix('+').unwrap_or(value);
        let value = if value.starts_with('.') {
            format!("0{}", value)
        } else if let Some(rest) = value.strip_prefix("-.") {
            format!("-0.{}", rest)
        } else {
            value.to_string()
        };
        Decimal::from_str(&value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_local_name() {
        assert_eq!(BuiltinType::from_local_name("boolean"), Some(BuiltinType::Boolean));
        assert_eq!(BuiltinType::from_local_name("NCName"), Some(BuiltinType::NcName));
        assert_eq!(BuiltinType::from_local_name("gYearMonth"), None);
    }

    #[test]
    fn test_boolean_lexical_space() {
        for ok in ["true", "false", "1", "0"] {
            assert!(BuiltinType::Boolean.validate(ok).is_ok(), "{ok}");
        }
        let err = BuiltinType::Boolean.validate("yes").unwrap_err();
        assert!(err.contains("xs:boolean"));
    }

    #[test]
    fn test_integers() {
        assert!(BuiltinType::Integer.validate("-12").is_ok());
        assert!(BuiltinType::Integer.validate("1.5").is_err());
        assert!(BuiltinType::Int.validate("2147483648").is_err());
        assert!(BuiltinType::NonNegativeInteger.validate("0").is_ok());
        assert!(BuiltinType::NonNegativeInteger.validate("-0").is_ok());
        assert!(BuiltinType::NonNegativeInteger.validate("-1").is_err());
        assert!(BuiltinType::PositiveInteger.validate("0").is_err());
        assert!(BuiltinType::PositiveInteger.validate("+7").is_ok());
    }

    #[test]
    fn test_decimal_and_range_value() {
        assert!(BuiltinType::Decimal.validate(".5").is_ok());
        assert!(BuiltinType::Decimal.validate("1e3").is_err());
        assert_eq!(
            BuiltinType::Decimal.to_decimal(".5"),
            Some(Decimal::from_str("0.5").unwrap())
        );
        assert_eq!(BuiltinType::String.to_decimal("5"), None);
    }

    #[test]
    fn test_dates() {
        assert!(BuiltinType::Date.validate("2024-02-29").is_ok());
        assert!(BuiltinType::Date.validate("2024-02-29Z").is_ok());
        assert!(BuiltinType::Date.validate("2023-02-29").is_err());
        assert!(BuiltinType::DateTime.validate("2024-01-01T10:00:00").is_ok());
        assert!(BuiltinType::DateTime.validate("2024-01-01T10:00:00+02:00").is_ok());
        assert!(BuiltinType::DateTime.validate("2024-01-01").is_err());
    }

    #[test]
    fn test_token_and_ncname() {
        assert!(BuiltinType::Token.validate("a b").is_ok());
        assert!(BuiltinType::Token.validate(" a").is_err());
        assert!(BuiltinType::NcName.validate("fill-in").is_ok());
        assert!(BuiltinType::NcName.validate("m:fill").is_err());
        assert!(BuiltinType::NcName.validate("1abc").is_err());
    }
}
