//! iCalendar document parser (RFC 5545).
//!
//! Parses complete iCalendar documents into typed structures.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use super::values::{
    parse_datetime, parse_duration, parse_integer, parse_rrule, parse_temporal, split_text_list,
    unescape_text,
};
use crate::core::{Component, ComponentKind, ContentLine, ICalendar, Property, PropertyValue, Temporal};

/// Parses an iCalendar document from a string.
///
/// ## Errors
///
/// Returns an error if the input is not valid iCalendar.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<ICalendar> {
    tracing::debug!("Parsing iCalendar document");

    let lines = split_lines(input);

    if lines.is_empty() {
        tracing::warn!("Empty iCalendar input");
        return Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1));
    }

    let content_lines: Vec<(usize, ContentLine)> = lines
        .into_iter()
        .map(|(line_num, line)| parse_content_line(&line, line_num).map(|cl| (line_num, cl)))
        .collect::<ParseResult<_>>()?;

    let mut iter = content_lines.into_iter().peekable();

    let (line_num, begin_line) = iter
        .next()
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingBegin, 1, 1))?;
    if begin_line.name != "BEGIN" {
        return Err(ParseError::new(ParseErrorKind::MissingBegin, line_num, 1));
    }
    let root_name = begin_line.raw_value.to_ascii_uppercase();
    let root = parse_component_body(&mut iter, line_num, &root_name)?;

    if root.kind != Some(ComponentKind::Calendar) {
        tracing::warn!("Root component is not VCALENDAR");
        return Err(
            ParseError::new(ParseErrorKind::MissingBegin, 1, 1).with_context("expected VCALENDAR")
        );
    }

    tracing::debug!(components = root.children.len(), "iCalendar document parsed");

    Ok(ICalendar { root })
}

/// Parses a component body given that its BEGIN line was already consumed.
fn parse_component_body(
    iter: &mut std::iter::Peekable<impl Iterator<Item = (usize, ContentLine)>>,
    begin_line_num: usize,
    component_name: &str,
) -> ParseResult<Component> {
    let kind = ComponentKind::parse(component_name);
    let mut component = Component {
        kind: Some(kind),
        name: component_name.to_string(),
        properties: Vec::new(),
        children: Vec::new(),
    };

    let mut last_line_num = begin_line_num;

    loop {
        let Some((line_num, content_line)) = iter.next() else {
            return Err(ParseError::new(ParseErrorKind::MissingEnd, last_line_num, 1)
                .with_context(format!("missing END:{component_name}")));
        };
        last_line_num = line_num;

        match content_line.name.as_str() {
            "BEGIN" => {
                let nested_name = content_line.raw_value.to_ascii_uppercase();
                let nested = parse_component_body(iter, line_num, &nested_name)?;
                component.children.push(nested);
            }
            "END" => {
                let end_name = content_line.raw_value.to_ascii_uppercase();
                if end_name != component_name {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!(
                                "expected END:{component_name}, got END:{end_name}"
                            )),
                    );
                }
                break;
            }
            _ => {
                let property = parse_property(content_line, line_num)?;
                component.properties.push(property);
            }
        }
    }

    Ok(component)
}

/// Parses a property from a content line, resolving the value type.
fn parse_property(cl: ContentLine, line_num: usize) -> ParseResult<Property> {
    let value_type = determine_value_type(&cl);
    let tzid = cl.tzid().map(ToString::to_string);

    let parsed_value = parse_value(&cl.raw_value, value_type, tzid.as_deref(), line_num)?;

    Ok(Property {
        name: cl.name,
        params: cl.params,
        value: parsed_value,
        raw_value: cl.raw_value,
    })
}

/// Internal enum for value type handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Binary,
    Duration,
    Integer,
    Recur,
    Temporal,
    TemporalList,
    Text,
    TextList,
    Uri,
    Unknown,
}

impl ValueType {
    fn from_param(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "BINARY" => Self::Binary,
            "DATE" | "DATE-TIME" => Self::Temporal,
            "DURATION" => Self::Duration,
            "INTEGER" => Self::Integer,
            "RECUR" => Self::Recur,
            "TEXT" => Self::Text,
            "URI" | "CAL-ADDRESS" => Self::Uri,
            _ => Self::Unknown,
        }
    }
}

/// Determines the value type for a property.
fn determine_value_type(cl: &ContentLine) -> ValueType {
    // Check explicit VALUE parameter first; EXDATE;VALUE=DATE still needs
    // list handling, so re-route the list properties below.
    if let Some(value_type) = cl.value_type() {
        let resolved = ValueType::from_param(value_type);
        if resolved == ValueType::Temporal && matches!(cl.name.as_str(), "EXDATE" | "RDATE") {
            return ValueType::TemporalList;
        }
        return resolved;
    }

    match cl.name.as_str() {
        // Date-time properties
        "DTSTART" | "DTEND" | "DUE" | "DTSTAMP" | "CREATED" | "LAST-MODIFIED" | "COMPLETED"
        | "RECURRENCE-ID" | "UNTIL" => ValueType::Temporal,

        // Comma-separated date or date-time lists
        "EXDATE" | "RDATE" => ValueType::TemporalList,

        // Duration properties
        "DURATION" => ValueType::Duration,

        // Integer properties
        "SEQUENCE" | "PRIORITY" | "REPEAT" => ValueType::Integer,

        // Recurrence rule
        "RRULE" => ValueType::Recur,

        // URI / cal-address properties
        "ORGANIZER" | "ATTENDEE" | "URL" => ValueType::Uri,

        // Multi-valued text
        "CATEGORIES" | "RESOURCES" => ValueType::TextList,

        // Default to text
        _ => ValueType::Text,
    }
}

/// Parses a raw value string into a typed value.
fn parse_value(
    raw: &str,
    value_type: ValueType,
    tzid: Option<&str>,
    line_num: usize,
) -> ParseResult<PropertyValue> {
    match value_type {
        ValueType::Text => Ok(PropertyValue::Text(unescape_text(raw))),
        ValueType::TextList => Ok(PropertyValue::TextList(split_text_list(raw))),
        ValueType::Temporal => {
            // DATE-TIME properties accept DATE form when VALUE=DATE.
            if raw.contains('T') {
                Ok(PropertyValue::Temporal(parse_datetime(
                    raw, tzid, line_num, 1,
                )?))
            } else {
                Ok(PropertyValue::Temporal(parse_temporal(
                    raw, tzid, line_num, 1,
                )?))
            }
        }
        ValueType::TemporalList => {
            let mut temporals: Vec<Temporal> = raw
                .split(',')
                .map(|s| parse_temporal(s.trim(), tzid, line_num, 1))
                .collect::<ParseResult<_>>()?;
            if temporals.len() == 1 {
                Ok(PropertyValue::Temporal(temporals.remove(0)))
            } else {
                Ok(PropertyValue::TemporalList(temporals))
            }
        }
        ValueType::Duration => Ok(PropertyValue::Duration(parse_duration(raw, line_num, 1)?)),
        ValueType::Integer => Ok(PropertyValue::Integer(parse_integer(raw, line_num, 1)?)),
        ValueType::Recur => Ok(PropertyValue::Recur(Box::new(parse_rrule(
            raw, line_num, 1,
        )?))),
        ValueType::Uri => Ok(PropertyValue::Uri(raw.to_string())),
        ValueType::Binary => {
            // RFC 5545 §3.3.1: Base64 decode
            use base64::{Engine, engine::general_purpose::STANDARD};
            let decoded = STANDARD.decode(raw).map_err(|e| {
                ParseError::new(ParseErrorKind::InvalidValue, line_num, 1)
                    .with_context(format!("invalid Base64 encoding: {e}"))
            })?;
            Ok(PropertyValue::Binary(decoded))
        }
        ValueType::Unknown => Ok(PropertyValue::Unknown(raw.to_string())),
    }
}
