//! iCalendar property and content line types (RFC 5545 §3.1, §3.8).

use super::{Duration, Parameter, RecurrenceRule, Temporal};

/// A raw content line as parsed from iCalendar text.
///
/// This is the low-level representation before value type resolution.
/// Preserves the original raw value for round-trip fidelity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Raw value string (after unfolding, before unescaping).
    pub raw_value: String,
}

impl ContentLine {
    /// Creates a new content line.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: value.into(),
        }
    }

    /// Creates a content line with parameters.
    #[must_use]
    pub fn with_params(
        name: impl Into<String>,
        params: Vec<Parameter>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params,
            raw_value: value.into(),
        }
    }

    /// Returns the parameter with the given name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&Parameter> {
        let name_upper = name.to_ascii_uppercase();
        self.params.iter().find(|p| p.name == name_upper)
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.get_param(name)?.value()
    }

    /// Returns whether this content line has a parameter with the given name.
    #[must_use]
    pub fn has_param(&self, name: &str) -> bool {
        self.get_param(name).is_some()
    }

    /// Returns the VALUE parameter if present.
    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.get_param_value("VALUE")
    }

    /// Returns the TZID parameter if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.get_param_value("TZID")
    }
}

/// Parsed value of a property (RFC 5545 §3.3).
///
/// The raw string is preserved separately on [`Property`] for round-trip
/// fidelity.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// BINARY value (base64 decoded).
    Binary(Vec<u8>),
    /// BOOLEAN value.
    Boolean(bool),
    /// DURATION value.
    Duration(Duration),
    /// FLOAT value.
    Float(f64),
    /// INTEGER value.
    Integer(i32),
    /// RECUR value (recurrence rule).
    Recur(Box<RecurrenceRule>),
    /// DATE or DATE-TIME value.
    Temporal(Temporal),
    /// Comma-separated DATE or DATE-TIME list (EXDATE, RDATE).
    TemporalList(Vec<Temporal>),
    /// TEXT value (unescaped).
    Text(String),
    /// TEXT-LIST value (comma-separated texts, e.g. CATEGORIES).
    TextList(Vec<String>),
    /// URI or CAL-ADDRESS value.
    Uri(String),
    /// Unknown or unparsed value. Preserved for round-trip.
    Unknown(String),
}

impl PropertyValue {
    /// Returns this value as text, if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns this value as an integer, if it is an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns this value as a temporal, if it is a date or date-time.
    #[must_use]
    pub fn as_temporal(&self) -> Option<&Temporal> {
        match self {
            Self::Temporal(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the temporal list view of this value; a single temporal
    /// reads as a one-element list.
    #[must_use]
    pub fn as_temporal_list(&self) -> Option<Vec<&Temporal>> {
        match self {
            Self::Temporal(t) => Some(vec![t]),
            Self::TemporalList(ts) => Some(ts.iter().collect()),
            _ => None,
        }
    }

    /// Returns this value as a duration, if it is a duration value.
    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Self::Duration(d) => Some(d),
            _ => None,
        }
    }

    /// Returns this value as a recurrence rule, if it is a recur value.
    #[must_use]
    pub fn as_recur(&self) -> Option<&RecurrenceRule> {
        match self {
            Self::Recur(r) => Some(r),
            _ => None,
        }
    }

    /// Returns whether this is an unknown/unparsed value.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

/// A fully parsed iCalendar property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Parsed value.
    pub value: PropertyValue,
    /// Original raw value string (for round-trip).
    pub raw_value: String,
}

impl Property {
    /// Creates a property with a text value.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value_str = value.into();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: PropertyValue::Text(value_str.clone()),
            raw_value: value_str,
        }
    }

    /// Creates a property with a text-list value (e.g. CATEGORIES).
    #[must_use]
    pub fn text_list(name: impl Into<String>, values: Vec<String>) -> Self {
        let raw = values.join(",");
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: PropertyValue::TextList(values),
            raw_value: raw,
        }
    }

    /// Creates a property with an integer value.
    #[must_use]
    pub fn integer(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: PropertyValue::Integer(value),
            raw_value: value.to_string(),
        }
    }

    /// Creates a property with a temporal value.
    ///
    /// Whole-day values get a `VALUE=DATE` parameter, zoned values a `TZID`
    /// parameter, per RFC 5545 property encoding.
    #[must_use]
    pub fn temporal(name: impl Into<String>, t: Temporal) -> Self {
        let raw = t.to_string();
        let mut params = Vec::new();
        if t.is_whole_day() {
            params.push(Parameter::value_type("DATE"));
        }
        if let Some(tzid) = t.tzid() {
            params.push(Parameter::tzid(tzid));
        }
        Self {
            name: name.into().to_ascii_uppercase(),
            params,
            value: PropertyValue::Temporal(t),
            raw_value: raw,
        }
    }

    /// Creates a property carrying a temporal list (EXDATE, RDATE).
    #[must_use]
    pub fn temporal_list(name: impl Into<String>, ts: Vec<Temporal>) -> Self {
        let raw = ts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let mut params = Vec::new();
        if ts.first().is_some_and(Temporal::is_whole_day) {
            params.push(Parameter::value_type("DATE"));
        }
        if let Some(tzid) = ts.first().and_then(Temporal::tzid) {
            params.push(Parameter::tzid(tzid));
        }
        Self {
            name: name.into().to_ascii_uppercase(),
            params,
            value: PropertyValue::TemporalList(ts),
            raw_value: raw,
        }
    }

    /// Creates a property with a duration value.
    #[must_use]
    pub fn duration(name: impl Into<String>, d: Duration) -> Self {
        let raw = d.to_string();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: PropertyValue::Duration(d),
            raw_value: raw,
        }
    }

    /// Creates a property with a recurrence-rule value.
    #[must_use]
    pub fn recur(name: impl Into<String>, rule: RecurrenceRule) -> Self {
        let raw = rule.to_string();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: PropertyValue::Recur(Box::new(rule)),
            raw_value: raw,
        }
    }

    /// Creates a property from a content line with an unparsed value.
    #[must_use]
    pub fn from_content_line(cl: ContentLine) -> Self {
        Self {
            name: cl.name,
            params: cl.params,
            value: PropertyValue::Unknown(cl.raw_value.clone()),
            raw_value: cl.raw_value,
        }
    }

    /// Returns the parameter with the given name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&Parameter> {
        let name_upper = name.to_ascii_uppercase();
        self.params.iter().find(|p| p.name == name_upper)
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.get_param(name)?.value()
    }

    /// Adds a parameter to this property.
    pub fn add_param(&mut self, param: Parameter) {
        self.params.push(param);
    }

    /// Sets a parameter, replacing any existing parameter with the same name.
    pub fn set_param(&mut self, param: Parameter) {
        self.params.retain(|p| p.name != param.name);
        self.params.push(param);
    }

    /// Returns the value as text if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    /// Returns the value as an integer if it is an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        self.value.as_integer()
    }

    /// Returns the value as a temporal if it is a date or date-time value.
    #[must_use]
    pub fn as_temporal(&self) -> Option<&Temporal> {
        self.value.as_temporal()
    }

    /// Returns the value as a duration if it is a duration value.
    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        self.value.as_duration()
    }
}

/// Common property names as constants.
pub mod names {
    // Calendar properties
    pub const CALSCALE: &str = "CALSCALE";
    pub const METHOD: &str = "METHOD";
    pub const PRODID: &str = "PRODID";
    pub const VERSION: &str = "VERSION";

    // Descriptive properties
    pub const CATEGORIES: &str = "CATEGORIES";
    pub const DESCRIPTION: &str = "DESCRIPTION";
    pub const LOCATION: &str = "LOCATION";
    pub const SUMMARY: &str = "SUMMARY";

    // Date and time properties
    pub const DTEND: &str = "DTEND";
    pub const DTSTART: &str = "DTSTART";
    pub const DUE: &str = "DUE";
    pub const DURATION: &str = "DURATION";

    // Relationship properties
    pub const ORGANIZER: &str = "ORGANIZER";
    pub const RECURRENCE_ID: &str = "RECURRENCE-ID";
    pub const RELATED_TO: &str = "RELATED-TO";
    pub const UID: &str = "UID";

    // Recurrence properties
    pub const EXDATE: &str = "EXDATE";
    pub const RDATE: &str = "RDATE";
    pub const RRULE: &str = "RRULE";

    // Change management properties
    pub const DTSTAMP: &str = "DTSTAMP";
    pub const SEQUENCE: &str = "SEQUENCE";
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn content_line_get_param() {
        let cl = ContentLine::with_params(
            "DTSTART",
            vec![Parameter::tzid("America/New_York")],
            "20151109T100000",
        );
        assert_eq!(cl.tzid(), Some("America/New_York"));
        assert!(cl.has_param("TZID"));
        assert!(!cl.has_param("VALUE"));
    }

    #[test]
    fn property_text() {
        let prop = Property::text("SUMMARY", "Meeting");
        assert_eq!(prop.name, "SUMMARY");
        assert_eq!(prop.as_text(), Some("Meeting"));
    }

    #[test]
    fn property_integer() {
        let prop = Property::integer("SEQUENCE", 5);
        assert_eq!(prop.as_integer(), Some(5));
    }

    #[test]
    fn property_temporal_date_gets_value_param() {
        let d = Temporal::date(NaiveDate::from_ymd_opt(2015, 11, 9).unwrap());
        let prop = Property::temporal("DTSTART", d);
        assert_eq!(prop.get_param_value("VALUE"), Some("DATE"));
        assert_eq!(prop.raw_value, "20151109");
    }

    #[test]
    fn property_temporal_zoned_gets_tzid_param() {
        let t = Temporal::zoned(
            NaiveDate::from_ymd_opt(2015, 11, 9)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            "America/New_York",
        );
        let prop = Property::temporal("DTSTART", t);
        assert_eq!(prop.get_param_value("TZID"), Some("America/New_York"));
    }

    #[test]
    fn temporal_list_view() {
        let a = Temporal::date(NaiveDate::from_ymd_opt(2015, 11, 9).unwrap());
        let prop = Property::temporal("EXDATE", a.clone());
        assert_eq!(prop.value.as_temporal_list().unwrap(), vec![&a]);
    }
}
