//! iCalendar property parameter types (RFC 5545 §3.2).

use std::fmt;

/// A single iCalendar property parameter.
///
/// Parameters modify or provide metadata for a property value, e.g.
/// `DTSTART;TZID=America/New_York:20151109T100000` carries a `TZID`
/// parameter with value `America/New_York`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    /// Parameter values. Most parameters have one value, but some can have
    /// multiple comma-separated values.
    pub values: Vec<String>,
}

impl Parameter {
    /// Creates a new parameter with a single value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// Creates a new parameter with multiple values.
    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Returns the first (and usually only) value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Returns whether the parameter has the specified value (case-insensitive).
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.eq_ignore_ascii_case(value))
    }

    /// Creates a TZID parameter.
    #[must_use]
    pub fn tzid(tzid: impl Into<String>) -> Self {
        Self::new("TZID", tzid)
    }

    /// Creates a VALUE parameter.
    #[must_use]
    pub fn value_type(value_type: impl Into<String>) -> Self {
        Self::new("VALUE", value_type)
    }

    /// Creates a RELTYPE parameter (RELATED-TO relationship type).
    #[must_use]
    pub fn reltype(reltype: impl Into<String>) -> Self {
        Self::new("RELTYPE", reltype)
    }

    /// Creates a RANGE parameter (RECURRENCE-ID range).
    #[must_use]
    pub fn range(range: impl Into<String>) -> Self {
        Self::new("RANGE", range)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.values.is_empty() {
            write!(f, "=")?;
            for (i, value) in self.values.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                if needs_quoting(value) {
                    write!(f, "\"{value}\"")?;
                } else {
                    write!(f, "{value}")?;
                }
            }
        }
        Ok(())
    }
}

/// Checks if a parameter value needs quoting.
fn needs_quoting(s: &str) -> bool {
    s.chars().any(|c| matches!(c, ':' | ';' | ',' | '"'))
}

/// Common parameter names as constants.
pub mod names {
    /// Language.
    pub const LANGUAGE: &str = "LANGUAGE";
    /// Recurrence identifier range.
    pub const RANGE: &str = "RANGE";
    /// Relationship type.
    pub const RELTYPE: &str = "RELTYPE";
    /// Time zone identifier.
    pub const TZID: &str = "TZID";
    /// Value data type.
    pub const VALUE: &str = "VALUE";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_simple() {
        let param = Parameter::tzid("America/New_York");
        assert_eq!(param.to_string(), "TZID=America/New_York");
    }

    #[test]
    fn display_quoted() {
        let param = Parameter::new("X-LABEL", "Planning; weekly");
        assert_eq!(param.to_string(), "X-LABEL=\"Planning; weekly\"");
    }

    #[test]
    fn display_multiple_values() {
        let param = Parameter::with_values(
            "X-TAGS",
            vec!["team".to_string(), "planning".to_string()],
        );
        assert_eq!(param.to_string(), "X-TAGS=team,planning");
    }

    #[test]
    fn name_normalized() {
        let param = Parameter::new("tzid", "Europe/London");
        assert_eq!(param.name, "TZID");
        assert!(param.has_value("europe/london"));
    }
}
